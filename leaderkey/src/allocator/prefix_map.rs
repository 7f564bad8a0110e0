//! 前缀映射表

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 判断两个编码是否冲突（相等或一方是另一方的前缀）
pub fn codes_conflict(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// 标签到前缀的映射
///
/// 只包含当前可交互的条目。由分配器构建，保证无前缀冲突：
/// 任何已分配前缀都不是另一个已分配前缀的前缀。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixMap {
    entries: BTreeMap<String, String>,
}

impl PrefixMap {
    /// 创建空映射
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn assign(&mut self, label: impl Into<String>, prefix: impl Into<String>) {
        self.entries.insert(label.into(), prefix.into());
    }

    /// 获取标签的前缀
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// 获取标签的前缀，未知或不可交互时返回空字符串
    pub fn prefix_or_empty(&self, label: &str) -> String {
        self.get(label).unwrap_or_default().to_string()
    }

    /// 所有以 `buffer` 开头的 (标签, 前缀)
    pub fn starting_with<'a>(&'a self, buffer: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.iter().filter(move |(_, prefix)| prefix.starts_with(buffer))
    }

    /// 按标签顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(label, prefix)| (label.as_str(), prefix.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 检查无前缀冲突不变式
    ///
    /// 排序后，若存在冲突，则一定有一对相邻编码冲突
    pub fn is_prefix_free(&self) -> bool {
        let mut prefixes: Vec<&str> = self.entries.values().map(String::as_str).collect();
        prefixes.sort_unstable();
        prefixes.iter().all(|p| !p.is_empty())
            && prefixes.windows(2).all(|pair| !codes_conflict(pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_conflict() {
        assert!(codes_conflict("s", "s"));
        assert!(codes_conflict("s", "se"));
        assert!(codes_conflict("sea", "se"));
        assert!(!codes_conflict("s", "e"));
        assert!(!codes_conflict("sa", "se"));
    }

    #[test]
    fn test_lookup() {
        let mut map = PrefixMap::new();
        map.assign("save", "s");
        map.assign("search", "e");

        assert_eq!(map.get("save"), Some("s"));
        assert_eq!(map.prefix_or_empty("missing"), "");
        assert_eq!(map.prefix_or_empty("search"), "e");
        assert_eq!(map.len(), 2);
        assert!(map.is_prefix_free());
    }

    #[test]
    fn test_starting_with() {
        let mut map = PrefixMap::new();
        map.assign("save file", "sf");
        map.assign("save as", "sa");
        map.assign("delete", "d");

        let matches: Vec<_> = map.starting_with("s").map(|(label, _)| label).collect();
        assert_eq!(matches, vec!["save as", "save file"]);
        assert_eq!(map.starting_with("sf").count(), 1);
        assert_eq!(map.starting_with("x").count(), 0);
    }

    #[test]
    fn test_detects_prefix_violation() {
        let mut map = PrefixMap::new();
        map.assign("save", "s");
        map.assign("search", "se");
        assert!(!map.is_prefix_free());

        // 冲突的一对在字典序上不相邻
        let mut map = PrefixMap::new();
        map.assign("alpha", "a");
        map.assign("amber", "ab");
        map.assign("apple", "aa");
        assert!(!map.is_prefix_free());

        let mut map = PrefixMap::new();
        map.assign("alpha", "ab");
        map.assign("apple", "aa");
        map.assign("beta", "b");
        assert!(map.is_prefix_free());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut map = PrefixMap::new();
        map.assign("save", "s");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"save":"s"}"#);
    }
}
