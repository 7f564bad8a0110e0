//! 按键事件模型

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::oracle::UiElement;

/// 按键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// 可打印字符（含空格）
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    /// 其他具名按键（方向键、功能键等）
    Other(String),
}

impl Key {
    /// 从 DOM 风格的按键名称解析
    ///
    /// # Examples
    ///
    /// ```
    /// use leaderkey_lib::machine::Key;
    ///
    /// assert_eq!(Key::from_name("Enter"), Key::Enter);
    /// assert_eq!(Key::from_name("Esc"), Key::Escape);
    /// assert_eq!(Key::from_name("s"), Key::Char('s'));
    /// assert_eq!(Key::from_name(" "), Key::Char(' '));
    /// assert_eq!(Key::from_name("ArrowUp"), Key::Other("ArrowUp".to_string()));
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" | "Return" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            "Space" | "Spacebar" => Self::Char(' '),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(name.to_string()),
                }
            }
        }
    }

    /// ASCII 字母数字键折叠为小写后的字符
    pub fn alphanumeric(&self) -> Option<char> {
        match self {
            Self::Char(c) if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// 修饰键状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// 平台命令键（macOS Cmd / Windows Win）
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    /// 保留给宿主/系统的组合键，状态机完全忽略
    pub fn is_system_combo(&self) -> bool {
        self.meta
    }

    /// 按住后不能参与按键序列的修饰键
    pub fn blocks_sequence(&self) -> bool {
        self.ctrl || self.alt
    }
}

/// 按键按下事件
#[derive(Clone)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// 当前持有输入焦点的元素
    pub target: Option<Arc<dyn UiElement>>,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            target: None,
        }
    }

    /// 字符键事件
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: Arc<dyn UiElement>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn target(&self) -> Option<&dyn UiElement> {
        self.target.as_deref()
    }
}

impl fmt::Debug for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEvent")
            .field("key", &self.key)
            .field("modifiers", &self.modifiers)
            .field("target", &self.target.as_ref().map(|t| t.kind()))
            .finish()
    }
}

/// 按键处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyOutcome {
    /// 事件被引擎消费，宿主应阻止默认处理
    Intercepted,
    /// 事件交还宿主正常处理
    PassThrough,
}

impl KeyOutcome {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Self::Intercepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{ElementKind, ElementNode};

    #[test]
    fn test_alphanumeric_folding() {
        assert_eq!(Key::Char('S').alphanumeric(), Some('s'));
        assert_eq!(Key::Char('7').alphanumeric(), Some('7'));
        assert_eq!(Key::Char(' ').alphanumeric(), None);
        assert_eq!(Key::Char('é').alphanumeric(), None);
        assert_eq!(Key::Enter.alphanumeric(), None);
    }

    #[test]
    fn test_modifier_classes() {
        assert!(Modifiers::meta().is_system_combo());
        assert!(!Modifiers::ctrl().is_system_combo());
        assert!(Modifiers::ctrl().blocks_sequence());
        assert!(Modifiers::alt().blocks_sequence());
        assert!(!Modifiers::shift().blocks_sequence());
        assert!(!Modifiers::NONE.blocks_sequence());
    }

    #[test]
    fn test_event_target() {
        let input = ElementNode::new(ElementKind::TextInput);
        let event = KeyEvent::char('a').with_target(input.clone());
        assert_eq!(event.target().map(|t| t.kind()), Some(ElementKind::TextInput));
        assert!(KeyEvent::new(Key::Tab).target().is_none());
    }

    #[test]
    fn test_modifiers_deserialize_partial() {
        let modifiers: Modifiers = serde_json::from_str(r#"{"ctrl": true}"#).unwrap();
        assert_eq!(modifiers, Modifiers::ctrl());
    }
}
