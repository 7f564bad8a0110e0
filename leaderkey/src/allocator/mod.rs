//! 前缀分配模块
//!
//! 纯函数：`(标签, 优先级, 分组)` 列表 → 无前缀冲突的 [`PrefixMap`]。
//! 相同输入（同样顺序）总是得到相同结果。
//!
//! # 分配顺序
//!
//! 按优先级降序，同优先级按注册顺序；同一优先级内共享分组的条目被
//! 聚到该分组第一个成员的位置连续分配。分组只是提示，不构成命名空间。
//!
//! # 候选编码
//!
//! 每个标签按代价从低到高尝试：
//!
//! 1. 首字符
//! 2. 各单词首字母拼接
//! 3. 从位置 0 开始逐渐变长的片段
//! 4. 在没有被已分配编码前缀覆盖的最短候选后追加数字后缀 `2`, `3`, ...
//! 5. 标签中其余字符的单字符编码
//! 6. 字母表上的兜底编码
//!
//! 第一个能让已分配集合保持无前缀冲突的候选被接受。已分配编码保存在
//! 有序集合里，冲突检查只看候选自身的前缀和集合中紧随候选的编码；
//! 兜底编码在一次分配中按长度各保留一个游标，被冲突淘汰的编码不会
//! 重新检查。
//!
//! ```
//! use leaderkey_lib::allocator::{allocate, AllocationRequest};
//!
//! let map = allocate(&[
//!     AllocationRequest::new("save").with_priority(10),
//!     AllocationRequest::new("search"),
//! ]);
//! assert_eq!(map.get("save"), Some("s"));
//! assert_eq!(map.get("search"), Some("e"));
//! assert!(map.is_prefix_free());
//! ```

mod candidates;
mod prefix_map;

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use candidates::{fallback_code, fallback_count, NormalizedLabel, MAX_NUMERIC_SUFFIX};

pub use candidates::{FALLBACK_ALPHABET, MAX_FALLBACK_LEN};
pub use prefix_map::{codes_conflict, PrefixMap};

/// 分配请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// 标签（调用方保证唯一）
    pub label: String,
    /// 优先级，越高越有资格获得短编码
    pub priority: i32,
    /// 分组提示
    pub group: Option<String>,
}

impl AllocationRequest {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            priority: 0,
            group: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// 为所有请求分配前缀
///
/// 无法找到合法编码的标签不会出现在结果中
pub fn allocate(requests: &[AllocationRequest]) -> PrefixMap {
    let mut space = CodeSpace::new();
    let mut map = PrefixMap::new();
    let order = allocation_order(requests);
    let total = order.len();

    for (position, index) in order.into_iter().enumerate() {
        let request = &requests[index];
        let remaining = total - position - 1;
        match choose_code(&request.label, &mut space, remaining) {
            Some(code) => {
                map.assign(request.label.clone(), code.clone());
                space.insert(code);
            }
            None => {
                tracing::warn!(label = %request.label, "No prefix-free code left for label");
            }
        }
    }

    map
}

/// 计算分配顺序（请求下标）
fn allocation_order(requests: &[AllocationRequest]) -> Vec<usize> {
    let mut by_priority: Vec<usize> = (0..requests.len()).collect();
    // sort_by_key 是稳定排序，同优先级保持注册顺序
    by_priority.sort_by_key(|&index| Reverse(requests[index].priority));

    let mut placed = vec![false; requests.len()];
    let mut order = Vec::with_capacity(requests.len());

    for (position, &index) in by_priority.iter().enumerate() {
        if placed[index] {
            continue;
        }
        placed[index] = true;
        order.push(index);

        let Some(group) = requests[index].group.as_deref() else {
            continue;
        };
        let priority = requests[index].priority;

        for &mate in &by_priority[position + 1..] {
            if requests[mate].priority != priority {
                break;
            }
            if !placed[mate] && requests[mate].group.as_deref() == Some(group) {
                placed[mate] = true;
                order.push(mate);
            }
        }
    }

    order
}

/// 已分配编码占用的编码空间
///
/// 以长度为 `MAX_FALLBACK_LEN` 的编码作为容量单位：长度为 `n` 的编码
/// 占用 `36^(MAX_FALLBACK_LEN - n)` 个单位，更长的编码占用 1 个。
/// 只要剩余单位不少于待分配的标签数，后面的标签总能拿到兜底编码。
struct CodeSpace {
    assigned: BTreeSet<String>,
    free: u64,
    /// 每种长度下第一个尚未因冲突被淘汰的兜底编码下标
    fallback_cursor: [usize; MAX_FALLBACK_LEN],
}

impl CodeSpace {
    fn new() -> Self {
        Self {
            assigned: BTreeSet::new(),
            free: Self::units(0),
            fallback_cursor: [0; MAX_FALLBACK_LEN],
        }
    }

    /// 长度为 `len` 的编码覆盖的单位数
    fn units(len: usize) -> u64 {
        let radix = FALLBACK_ALPHABET.len() as u64;
        radix.pow(MAX_FALLBACK_LEN.saturating_sub(len) as u32)
    }

    /// 某个已分配编码是候选的前缀（包括相等）
    fn covers(&self, candidate: &str) -> bool {
        candidate
            .char_indices()
            .map(|(start, c)| start + c.len_utf8())
            .any(|end| self.assigned.contains(&candidate[..end]))
    }

    /// 某个已分配编码以候选为前缀
    ///
    /// 以候选开头的串在字典序中紧跟在候选之后，只需看第一个不小于候选的编码
    fn extends(&self, candidate: &str) -> bool {
        self.assigned
            .range::<str, _>((Bound::Included(candidate), Bound::Unbounded))
            .next()
            .is_some_and(|code| code.starts_with(candidate))
    }

    /// 与所有已分配编码都不冲突
    fn is_prefix_free_with(&self, candidate: &str) -> bool {
        !candidate.is_empty() && !self.covers(candidate) && !self.extends(candidate)
    }

    /// 接受长度为 `len` 的编码后，之后的 `remaining` 个标签仍放得下
    fn has_room(&self, len: usize, remaining: usize) -> bool {
        self.free.saturating_sub(Self::units(len)) >= remaining as u64
    }

    /// 可以接受候选：无冲突，且容量足够
    fn accepts(&self, candidate: &str, remaining: usize) -> bool {
        self.is_prefix_free_with(candidate) && self.has_room(candidate.len(), remaining)
    }

    fn insert(&mut self, code: String) {
        self.free = self.free.saturating_sub(Self::units(code.len()));
        self.assigned.insert(code);
    }

    /// 按长度和字典序取第一个可用的兜底编码
    ///
    /// 已分配集合只增不减，冲突的编码之后仍然冲突，游标越过它们后不再回退
    fn next_fallback(&mut self, remaining: usize) -> Option<String> {
        for len in 1..=MAX_FALLBACK_LEN {
            if !self.has_room(len, remaining) {
                continue;
            }
            let count = fallback_count(len);
            let mut cursor = self.fallback_cursor[len - 1];
            while cursor < count {
                let code = fallback_code(len, cursor);
                if self.is_prefix_free_with(&code) {
                    self.fallback_cursor[len - 1] = cursor;
                    return Some(code);
                }
                cursor += 1;
            }
            self.fallback_cursor[len - 1] = cursor;
        }
        None
    }
}

/// 为单个标签选择编码
fn choose_code(label: &str, space: &mut CodeSpace, remaining: usize) -> Option<String> {
    let normalized = NormalizedLabel::parse(label);
    let primary = normalized.primary_candidates();

    if let Some(code) = primary.iter().find(|c| space.accepts(c, remaining)) {
        return Some(code.clone());
    }

    // 数字后缀：基于没有被任何已分配编码作为前缀的最短候选
    let base = primary
        .iter()
        .filter(|c| !space.covers(c))
        .min_by_key(|c| c.len());
    if let Some(base) = base {
        for suffix in 2..=MAX_NUMERIC_SUFFIX {
            let code = format!("{base}{suffix}");
            if space.accepts(&code, remaining) {
                return Some(code);
            }
        }
    }

    for c in normalized.compact().chars() {
        let code = c.to_string();
        if space.accepts(&code, remaining) {
            return Some(code);
        }
    }

    space.next_fallback(remaining)
}
