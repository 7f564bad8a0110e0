//! 进程内元素实现
//!
//! 适用于在内存中镜像自身控件树的宿主，也是测试中使用的元素实现

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use super::element::{ElementHandle, ElementKind, UiElement};

/// 内存元素节点
///
/// 所有状态都是原子量，可以在任意线程修改
///
/// # Examples
///
/// ```
/// use leaderkey_lib::oracle::{ElementKind, ElementNode, InteractivityOracle, TreeOracle};
///
/// let toolbar = ElementNode::new(ElementKind::Other);
/// let save = toolbar.child(ElementKind::Button);
///
/// let oracle = TreeOracle::new();
/// assert!(oracle.is_interactive(save.as_ref()));
///
/// toolbar.set_hidden(true);
/// assert!(!oracle.is_interactive(save.as_ref()));
/// ```
#[derive(Debug)]
pub struct ElementNode {
    kind: ElementKind,
    parent: Option<Weak<ElementNode>>,
    attached: AtomicBool,
    hidden: AtomicBool,
    disabled: AtomicBool,
    focused: AtomicBool,
    clicks: AtomicUsize,
}

impl ElementNode {
    /// 创建已挂载、可见、启用的根节点
    pub fn new(kind: ElementKind) -> Arc<Self> {
        Arc::new(Self::with_parent(kind, None))
    }

    /// 创建子节点
    pub fn child(self: &Arc<Self>, kind: ElementKind) -> Arc<Self> {
        Arc::new(Self::with_parent(kind, Some(Arc::downgrade(self))))
    }

    fn with_parent(kind: ElementKind, parent: Option<Weak<ElementNode>>) -> Self {
        Self {
            kind,
            parent,
            attached: AtomicBool::new(true),
            hidden: AtomicBool::new(false),
            disabled: AtomicBool::new(false),
            focused: AtomicBool::new(false),
            clicks: AtomicUsize::new(0),
        }
    }

    /// 获取弱引用句柄
    pub fn handle(self: &Arc<Self>) -> ElementHandle {
        let strong: Arc<dyn UiElement> = self.clone();
        Arc::downgrade(&strong)
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// 从 UI 树上移除
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
        self.focused.store(false, Ordering::SeqCst);
    }

    /// 重新挂载到 UI 树
    pub fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    /// 被点击的次数
    pub fn click_count(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    /// 当前是否持有焦点
    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

impl UiElement for ElementNode {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn parent(&self) -> Option<Arc<dyn UiElement>> {
        let parent = self.parent.as_ref()?.upgrade()?;
        Some(parent)
    }

    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn click(&self) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
    }

    fn focus(&self) {
        self.focused.store(true, Ordering::SeqCst);
    }

    fn blur(&self) {
        self.focused.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_defaults() {
        let node = ElementNode::new(ElementKind::Button);
        assert!(node.is_attached());
        assert!(!node.is_hidden());
        assert!(!node.is_disabled());
        assert!(!node.is_focused());
        assert_eq!(node.click_count(), 0);
        assert!(node.parent().is_none());
    }

    #[test]
    fn test_child_parent_link() {
        let root = ElementNode::new(ElementKind::Other);
        let child = root.child(ElementKind::Link);

        let parent = child.parent().expect("parent should be alive");
        assert_eq!(parent.kind(), ElementKind::Other);

        drop(parent);
        drop(root);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_focus_blur_detach() {
        let input = ElementNode::new(ElementKind::TextArea);
        input.focus();
        assert!(input.is_focused());
        input.blur();
        assert!(!input.is_focused());

        input.focus();
        input.detach();
        assert!(!input.is_focused());
        assert!(!input.is_attached());

        input.attach();
        assert!(input.is_attached());
    }

    #[test]
    fn test_handle_outlives_only_while_strong() {
        let node = ElementNode::new(ElementKind::Button);
        let handle = node.handle();
        assert!(handle.upgrade().is_some());
        drop(node);
        assert!(handle.upgrade().is_none());
    }
}
