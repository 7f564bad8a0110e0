use serde::{Deserialize, Serialize};

/// 热键模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// 初始/终止状态，只拦截引导键
    #[default]
    Inactive,

    /// 已按下引导键，缓冲区为空
    Leader,

    /// 缓冲区非空，每次按键都重新匹配
    Active,
}

impl Mode {
    /// 模式名称（用于日志和调试）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Leader => "Leader",
            Self::Active => "Active",
        }
    }
}

/// 引擎状态
///
/// 构造函数保证：`Inactive` 和 `Leader` 的缓冲区为空，`Active` 的缓冲区非空
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineState {
    mode: Mode,
    buffer: String,
}

impl EngineState {
    /// 创建空闲状态
    pub fn inactive() -> Self {
        Self::default()
    }

    /// 创建引导状态
    pub fn leader() -> Self {
        Self {
            mode: Mode::Leader,
            buffer: String::new(),
        }
    }

    /// 创建匹配中状态
    ///
    /// 缓冲区为空时退化为引导状态
    pub fn active(buffer: impl Into<String>) -> Self {
        let buffer = buffer.into();
        if buffer.is_empty() {
            return Self::leader();
        }
        Self {
            mode: Mode::Active,
            buffer,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_inactive(&self) -> bool {
        self.mode == Mode::Inactive
    }

    pub fn is_leader(&self) -> bool {
        self.mode == Mode::Leader
    }

    pub fn is_active(&self) -> bool {
        self.mode == Mode::Active
    }

    /// 状态名称（用于日志和调试）
    pub fn name(&self) -> &'static str {
        self.mode.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_creation() {
        let state = EngineState::inactive();
        assert!(state.is_inactive());
        assert_eq!(state.buffer(), "");
        assert_eq!(state, EngineState::default());

        let state = EngineState::leader();
        assert!(state.is_leader());
        assert_eq!(state.name(), "Leader");

        let state = EngineState::active("se");
        assert!(state.is_active());
        assert_eq!(state.buffer(), "se");
        assert_eq!(state.mode(), Mode::Active);
    }

    #[test]
    fn test_empty_active_is_leader() {
        assert!(EngineState::active("").is_leader());
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&Mode::Leader).unwrap();
        assert_eq!(json, "\"Leader\"");
        let mode: Mode = serde_json::from_str("\"Active\"").unwrap();
        assert_eq!(mode, Mode::Active);
    }
}
