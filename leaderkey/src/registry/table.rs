//! 注册表
//!
//! 使用 ArcSwap 存储条目快照：读取无锁，写入通过 RCU 替换整个列表。
//! 每次内容变化都会递增修订号并唤醒重算循环。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use tokio::sync::Notify;

use super::item::HotkeyItem;

struct RegistryInner {
    /// 条目列表（保持注册顺序）
    items: ArcSwap<Vec<Arc<HotkeyItem>>>,
    next_generation: AtomicU64,
    revision: AtomicU64,
    changed: Arc<Notify>,
}

impl RegistryInner {
    /// 删除满足条件的条目，返回是否有条目被删除
    fn remove_where(&self, label: &str, generation: Option<u64>) -> bool {
        let matches = |item: &HotkeyItem| {
            item.label() == label && generation.is_none_or(|g| item.generation() == g)
        };

        let previous = self.items.rcu(|items| {
            items
                .iter()
                .filter(|item| !matches(item))
                .cloned()
                .collect::<Vec<_>>()
        });

        let removed = previous.iter().any(|item| matches(item));
        if removed {
            tracing::debug!(label = %label, "Unregistered hotkey");
            self.mark_changed();
        }
        removed
    }

    fn mark_changed(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
        self.changed.notify_one();
    }
}

/// 热键注册表
///
/// 克隆得到的是同一张表的另一个引用
///
/// # Examples
///
/// ```
/// use leaderkey_lib::oracle::{ElementKind, ElementNode};
/// use leaderkey_lib::registry::{HotkeyItem, Registry};
///
/// let registry = Registry::new();
/// let button = ElementNode::new(ElementKind::Button);
///
/// let registration = registry.register(HotkeyItem::new("save", button.handle()));
/// assert_eq!(registry.len(), 1);
///
/// registration.release();
/// assert!(registry.is_empty());
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                items: ArcSwap::from_pointee(Vec::new()),
                next_generation: AtomicU64::new(0),
                revision: AtomicU64::new(0),
                changed: Arc::new(Notify::new()),
            }),
        }
    }

    /// 注册条目
    ///
    /// 已存在同名标签时原位替换（后写者胜）。返回的句柄只释放本次注册，
    /// 不会误删之后以同一标签注册的条目。
    pub fn register(&self, item: HotkeyItem) -> Registration {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let item = Arc::new(item.with_generation(generation));
        let label = item.label().to_string();

        let previous = self.inner.items.rcu(|items| {
            let mut next = Vec::clone(items);
            match next.iter().position(|existing| existing.label() == label) {
                Some(position) => next[position] = Arc::clone(&item),
                None => next.push(Arc::clone(&item)),
            }
            next
        });

        if previous.iter().any(|existing| existing.label() == label) {
            tracing::debug!(label = %label, generation, "Replaced existing hotkey registration");
        } else {
            tracing::debug!(label = %label, generation, "Registered hotkey");
        }
        self.inner.mark_changed();

        Registration {
            registry: Arc::downgrade(&self.inner),
            label,
            generation,
            armed: true,
        }
    }

    /// 注销标签（不存在时为空操作）
    ///
    /// 返回是否确实删除了条目
    pub fn unregister(&self, label: &str) -> bool {
        self.inner.remove_where(label, None)
    }

    /// 按标签查找条目
    pub fn get(&self, label: &str) -> Option<Arc<HotkeyItem>> {
        self.inner
            .items
            .load()
            .iter()
            .find(|item| item.label() == label)
            .cloned()
    }

    /// 当前条目快照（注册顺序）
    pub fn snapshot(&self) -> Arc<Vec<Arc<HotkeyItem>>> {
        self.inner.items.load_full()
    }

    /// 当前条目列表（注册顺序）
    pub fn list(&self) -> Vec<Arc<HotkeyItem>> {
        Vec::clone(&self.snapshot())
    }

    pub fn len(&self) -> usize {
        self.inner.items.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 修订号，每次内容变化递增
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    /// 内容变化信号
    pub(crate) fn change_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.inner.changed)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// 注册句柄
///
/// 调用 [`Registration::release`] 或丢弃句柄即注销对应注册；
/// 调用 [`Registration::detach`] 则让注册一直保留。
#[must_use = "dropping a Registration unregisters the hotkey; call detach() to keep it"]
#[derive(Debug)]
pub struct Registration {
    registry: Weak<RegistryInner>,
    label: String,
    generation: u64,
    armed: bool,
}

impl Registration {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 注销本次注册，返回是否确实删除了条目
    pub fn release(mut self) -> bool {
        self.release_inner()
    }

    /// 放弃句柄但保留注册
    pub fn detach(mut self) {
        self.armed = false;
    }

    fn release_inner(&mut self) -> bool {
        if !std::mem::replace(&mut self.armed, false) {
            return false;
        }
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.remove_where(&self.label, Some(self.generation)))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release_inner();
    }
}
