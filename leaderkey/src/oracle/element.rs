//! UI 元素抽象

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

/// 元素类别
///
/// 用于判断焦点目标是否为自由文本编辑区域，以及决定默认激活方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// 按钮
    Button,
    /// 链接
    Link,
    /// 单行文本输入框
    TextInput,
    /// 多行文本框
    TextArea,
    /// contenteditable 区域
    ContentEditable,
    /// 富文本编辑器表面
    RichTextEditor,
    /// 其他元素（容器、复选框等）
    Other,
}

impl ElementKind {
    /// 是否为自由文本编辑区域
    pub fn is_text_editing(&self) -> bool {
        matches!(
            self,
            Self::TextInput | Self::TextArea | Self::ContentEditable | Self::RichTextEditor
        )
    }
}

/// 宿主 UI 元素
///
/// 由宿主运行时实现。所有方法都必须是廉价且无副作用的查询，
/// `click` / `focus` / `blur` 除外。
pub trait UiElement: Send + Sync {
    /// 是否仍挂载在活动 UI 树上
    fn is_attached(&self) -> bool;

    /// 元素自身是否被隐藏（不考虑祖先）
    fn is_hidden(&self) -> bool;

    /// 元素是否被禁用
    fn is_disabled(&self) -> bool;

    /// 父元素
    fn parent(&self) -> Option<Arc<dyn UiElement>>;

    /// 元素类别
    fn kind(&self) -> ElementKind;

    /// 模拟点击
    fn click(&self);

    /// 获取输入焦点
    fn focus(&self);

    /// 放弃输入焦点
    fn blur(&self);
}

/// 元素弱引用句柄
///
/// 引擎只观察元素，从不延长其生命周期
pub type ElementHandle = Weak<dyn UiElement>;

/// 对元素执行默认激活操作
///
/// 文本编辑区域获取焦点，其他元素被点击。句柄已失效时返回 `false`。
pub fn activate_default(handle: &ElementHandle) -> bool {
    let Some(element) = handle.upgrade() else {
        return false;
    };

    if element.kind().is_text_editing() {
        element.focus();
    } else {
        element.click();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ElementNode;

    #[test]
    fn test_text_editing_kinds() {
        assert!(ElementKind::TextInput.is_text_editing());
        assert!(ElementKind::TextArea.is_text_editing());
        assert!(ElementKind::ContentEditable.is_text_editing());
        assert!(ElementKind::RichTextEditor.is_text_editing());

        assert!(!ElementKind::Button.is_text_editing());
        assert!(!ElementKind::Link.is_text_editing());
        assert!(!ElementKind::Other.is_text_editing());
    }

    #[test]
    fn test_activate_default_clicks_button() {
        let button = ElementNode::new(ElementKind::Button);
        assert!(activate_default(&button.handle()));
        assert_eq!(button.click_count(), 1);
        assert!(!button.is_focused());
    }

    #[test]
    fn test_activate_default_focuses_input() {
        let input = ElementNode::new(ElementKind::TextInput);
        assert!(activate_default(&input.handle()));
        assert_eq!(input.click_count(), 0);
        assert!(input.is_focused());
    }

    #[test]
    fn test_activate_default_dropped_element() {
        let handle = ElementNode::new(ElementKind::Button).handle();
        // 元素已被释放
        assert!(!activate_default(&handle));
    }
}
