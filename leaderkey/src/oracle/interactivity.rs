//! 可交互性判定
//!
//! `InteractivityOracle` 回答两个问题：
//!
//! 1. 某个元素现在能否接收热键前缀（已挂载、可见、未禁用）
//! 2. 当前焦点目标是否为用户正在输入的文本编辑区域

use super::element::{ElementHandle, UiElement};

/// 祖先遍历的最大深度
///
/// 超过该深度的元素视为不可交互，防止宿主实现出现环
pub const MAX_ANCESTOR_DEPTH: usize = 256;

/// 可交互性判定接口
///
/// 实现必须无副作用、不报错，并且足够廉价，以便每次重算时
/// 对所有已注册条目调用
pub trait InteractivityOracle: Send + Sync {
    /// 元素当前是否可交互
    fn is_interactive(&self, element: &dyn UiElement) -> bool;

    /// 焦点目标是否为自由文本编辑区域
    fn is_actively_editing(&self, target: Option<&dyn UiElement>) -> bool;

    /// 通过弱引用句柄判定，已释放的元素返回 `false`
    fn is_handle_interactive(&self, handle: &ElementHandle) -> bool {
        handle
            .upgrade()
            .is_some_and(|element| self.is_interactive(element.as_ref()))
    }
}

/// 基于元素树的默认判定实现
///
/// 元素自身及所有祖先都必须已挂载且未隐藏，元素自身不能被禁用
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOracle;

impl TreeOracle {
    pub fn new() -> Self {
        Self
    }
}

impl InteractivityOracle for TreeOracle {
    fn is_interactive(&self, element: &dyn UiElement) -> bool {
        if !element.is_attached() || element.is_hidden() || element.is_disabled() {
            return false;
        }

        let mut ancestor = element.parent();
        let mut depth = 0;
        while let Some(node) = ancestor {
            if depth >= MAX_ANCESTOR_DEPTH {
                tracing::debug!(depth, "Ancestor chain too deep, treating element as hidden");
                return false;
            }
            if !node.is_attached() || node.is_hidden() {
                return false;
            }
            ancestor = node.parent();
            depth += 1;
        }

        true
    }

    fn is_actively_editing(&self, target: Option<&dyn UiElement>) -> bool {
        target.is_some_and(|element| element.kind().is_text_editing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{ElementKind, ElementNode};

    #[test]
    fn test_visible_element_is_interactive() {
        let oracle = TreeOracle::new();
        let button = ElementNode::new(ElementKind::Button);
        assert!(oracle.is_interactive(button.as_ref()));
    }

    #[test]
    fn test_hidden_disabled_detached() {
        let oracle = TreeOracle::new();

        let hidden = ElementNode::new(ElementKind::Button);
        hidden.set_hidden(true);
        assert!(!oracle.is_interactive(hidden.as_ref()));

        let disabled = ElementNode::new(ElementKind::Button);
        disabled.set_disabled(true);
        assert!(!oracle.is_interactive(disabled.as_ref()));

        let detached = ElementNode::new(ElementKind::Button);
        detached.detach();
        assert!(!oracle.is_interactive(detached.as_ref()));
    }

    #[test]
    fn test_hidden_ancestor() {
        let oracle = TreeOracle::new();
        let panel = ElementNode::new(ElementKind::Other);
        let section = panel.child(ElementKind::Other);
        let button = section.child(ElementKind::Button);

        assert!(oracle.is_interactive(button.as_ref()));

        panel.set_hidden(true);
        assert!(!oracle.is_interactive(button.as_ref()));

        panel.set_hidden(false);
        section.detach();
        assert!(!oracle.is_interactive(button.as_ref()));
    }

    #[test]
    fn test_disabled_ancestor_does_not_disable_child() {
        let oracle = TreeOracle::new();
        let group = ElementNode::new(ElementKind::Other);
        let button = group.child(ElementKind::Button);

        group.set_disabled(true);
        assert!(oracle.is_interactive(button.as_ref()));
    }

    #[test]
    fn test_handle_interactive() {
        let oracle = TreeOracle::new();
        let button = ElementNode::new(ElementKind::Button);
        let handle = button.handle();
        assert!(oracle.is_handle_interactive(&handle));

        drop(button);
        assert!(!oracle.is_handle_interactive(&handle));
    }

    #[test]
    fn test_actively_editing() {
        let oracle = TreeOracle::new();
        let input = ElementNode::new(ElementKind::TextInput);
        let editor = ElementNode::new(ElementKind::RichTextEditor);
        let button = ElementNode::new(ElementKind::Button);

        assert!(oracle.is_actively_editing(Some(input.as_ref())));
        assert!(oracle.is_actively_editing(Some(editor.as_ref())));
        assert!(!oracle.is_actively_editing(Some(button.as_ref())));
        assert!(!oracle.is_actively_editing(None));
    }
}
