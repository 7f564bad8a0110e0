//! 候选编码生成

/// 数字后缀上限（`2..=MAX_NUMERIC_SUFFIX`）
pub const MAX_NUMERIC_SUFFIX: u32 = 99;

/// 兜底编码使用的字母表
pub const FALLBACK_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// 兜底编码的最大长度
pub const MAX_FALLBACK_LEN: usize = 3;

/// 规范化后的标签
///
/// 按空白拆分单词，每个单词只保留 ASCII 字母数字并转为小写，
/// 空单词被丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedLabel {
    words: Vec<String>,
    compact: String,
}

impl NormalizedLabel {
    pub(crate) fn parse(label: &str) -> Self {
        let words: Vec<String> = label
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(char::is_ascii_alphanumeric)
                    .map(|c| c.to_ascii_lowercase())
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty())
            .collect();
        let compact = words.concat();

        Self { words, compact }
    }

    /// 去掉空白后的完整标签
    pub(crate) fn compact(&self) -> &str {
        &self.compact
    }

    /// 按代价从低到高生成主候选：
    ///
    /// 1. 首字符
    /// 2. 各单词首字母拼接（至少两个单词时）
    /// 3. 从位置 0 开始、长度为 2..=len 的片段
    pub(crate) fn primary_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let mut push = |candidate: String| {
            if !candidate.is_empty() && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        };

        if let Some(first) = self.compact.chars().next() {
            push(first.to_string());
        }

        if self.words.len() > 1 {
            let initials: String = self
                .words
                .iter()
                .filter_map(|word| word.chars().next())
                .collect();
            push(initials);
        }

        for len in 2..=self.compact.len() {
            push(self.compact[..len].to_string());
        }

        candidates
    }
}

/// 长度为 `len` 的兜底编码个数
pub(crate) fn fallback_count(len: usize) -> usize {
    FALLBACK_ALPHABET.len().pow(len as u32)
}

/// 长度为 `len` 的第 `index` 个兜底编码（字典序）
pub(crate) fn fallback_code(len: usize, index: usize) -> String {
    let alphabet = FALLBACK_ALPHABET.as_bytes();
    let radix = alphabet.len();
    let mut rest = index;
    let mut code = vec![alphabet[0]; len];
    for slot in code.iter_mut().rev() {
        *slot = alphabet[rest % radix];
        rest /= radix;
    }
    code.into_iter().map(char::from).collect()
}

/// 兜底编码：字母表上长度 1..=MAX_FALLBACK_LEN 的所有串，按长度和字典序
#[cfg(test)]
pub(crate) fn fallback_codes() -> impl Iterator<Item = String> {
    (1..=MAX_FALLBACK_LEN)
        .flat_map(|len| (0..fallback_count(len)).map(move |index| fallback_code(len, index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let label = NormalizedLabel::parse("  Save File! ");
        assert_eq!(label.compact(), "savefile");

        let label = NormalizedLabel::parse("--- 日本");
        assert_eq!(label.compact(), "");
        assert!(label.primary_candidates().is_empty());
    }

    #[test]
    fn test_single_word_candidates() {
        let label = NormalizedLabel::parse("Save");
        assert_eq!(label.primary_candidates(), vec!["s", "sa", "sav", "save"]);
    }

    #[test]
    fn test_multi_word_candidates() {
        let label = NormalizedLabel::parse("new flash card");
        let candidates = label.primary_candidates();
        assert_eq!(candidates[0], "n");
        assert_eq!(candidates[1], "nfc");
        assert_eq!(candidates[2], "ne");
        assert_eq!(candidates.last().map(String::as_str), Some("newflashcard"));
    }

    #[test]
    fn test_initials_deduplicated_against_runs() {
        // 首字母 "ab" 与片段 "ab" 相同，只出现一次
        let label = NormalizedLabel::parse("a b");
        assert_eq!(label.primary_candidates(), vec!["a", "ab"]);
    }

    #[test]
    fn test_fallback_order() {
        let mut codes = fallback_codes();
        assert_eq!(codes.next().as_deref(), Some("a"));
        assert_eq!(codes.nth(34).as_deref(), Some("9"));
        assert_eq!(codes.next().as_deref(), Some("aa"));
        assert_eq!(codes.next().as_deref(), Some("ab"));
        assert_eq!(fallback_codes().count(), 36 + 36 * 36 + 36 * 36 * 36);
    }

    #[test]
    fn test_fallback_code_by_index() {
        assert_eq!(fallback_count(2), 36 * 36);
        assert_eq!(fallback_code(1, 0), "a");
        assert_eq!(fallback_code(2, 36), "ba");
        assert_eq!(fallback_code(3, fallback_count(3) - 1), "999");
    }
}
