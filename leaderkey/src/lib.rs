//! 引导键热键引擎
//!
//! 让任何当前可见、可交互的界面元素都能通过一小段字母数字序列触达：
//! 按下引导键（默认空格），再输入为该元素分配的最短无歧义前缀。
//!
//! 数据单向流动：注册 → 重算 → 前缀映射 → 按键匹配 → 动作调度。

/// Element abstraction and interactivity checks
pub mod oracle;

/// Prefix allocation
pub mod allocator;

/// Hotkey registration table
pub mod registry;

/// Prefix recompute loop
pub mod liveness;

/// Key-sequence state machine
pub mod machine;

/// Engine service and configuration
pub mod engine;

/// Engine events
pub mod events;

/// Utility modules
pub mod utils;

pub use engine::{EngineConfig, EngineError, HotkeyEngine};
pub use events::EngineEvent;
pub use machine::{Key, KeyEvent, KeyOutcome, Mode, Modifiers};
pub use registry::{RegisterOptions, Registration};
