//! 引擎事件模块
//!
//! 引擎通过 `tokio::sync::broadcast` 广播事件，供指示器渲染、
//! 日志或测试观察。没有订阅者时事件被直接丢弃。

use serde::Serialize;
use tokio::sync::broadcast;

use crate::allocator::PrefixMap;
use crate::machine::{EngineState, Mode};

/// 事件通道容量
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 模式变更事件载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeChangeEvent {
    /// 当前模式
    pub mode: Mode,
    /// 当前缓冲区
    pub buffer: String,
    pub is_inactive: bool,
    pub is_leader: bool,
    pub is_active: bool,
}

impl From<&EngineState> for ModeChangeEvent {
    fn from(state: &EngineState) -> Self {
        Self {
            mode: state.mode(),
            buffer: state.buffer().to_string(),
            is_inactive: state.is_inactive(),
            is_leader: state.is_leader(),
            is_active: state.is_active(),
        }
    }
}

/// 引擎事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// 模式或缓冲区发生变化
    ModeChanged(ModeChangeEvent),

    /// 发布了新的前缀映射
    PrefixesChanged { assigned: PrefixMap },

    /// 条目已被激活
    ActionDispatched { label: String },

    /// 条目动作返回错误
    ActionFailed { label: String, message: String },
}

impl EngineEvent {
    /// 事件名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModeChanged(_) => "mode_changed",
            Self::PrefixesChanged { .. } => "prefixes_changed",
            Self::ActionDispatched { .. } => "action_dispatched",
            Self::ActionFailed { .. } => "action_failed",
        }
    }
}

/// 广播事件，没有订阅者时丢弃
pub(crate) fn emit(events: &broadcast::Sender<EngineEvent>, event: EngineEvent) {
    let name = event.name();
    if events.send(event).is_err() {
        tracing::trace!(event = name, "No subscribers, event dropped");
    } else {
        tracing::trace!(event = name, "Event emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_change_from_state() {
        let event = ModeChangeEvent::from(&EngineState::active("se"));
        assert_eq!(event.mode, Mode::Active);
        assert_eq!(event.buffer, "se");
        assert!(event.is_active);
        assert!(!event.is_leader);
        assert!(!event.is_inactive);
    }

    #[test]
    fn test_serialize_tagged() {
        let event = EngineEvent::ActionFailed {
            label: "save".to_string(),
            message: "boom".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "action_failed");
        assert_eq!(json["label"], "save");

        let event = EngineEvent::ModeChanged(ModeChangeEvent::from(&EngineState::leader()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "mode_changed");
        assert_eq!(json["mode"], "Leader");
        assert_eq!(json["is_leader"], true);
    }

    #[test]
    fn test_name_matches_serialized_tag() {
        let events = [
            EngineEvent::ModeChanged(ModeChangeEvent::from(&EngineState::inactive())),
            EngineEvent::PrefixesChanged {
                assigned: PrefixMap::new(),
            },
            EngineEvent::ActionDispatched {
                label: "save".to_string(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.name());
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let (events, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        drop(rx);
        emit(
            &events,
            EngineEvent::ActionDispatched {
                label: "save".to_string(),
            },
        );

        let mut rx = events.subscribe();
        emit(
            &events,
            EngineEvent::ActionDispatched {
                label: "open".to_string(),
            },
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::ActionDispatched {
                label: "open".to_string()
            }
        );
    }
}
