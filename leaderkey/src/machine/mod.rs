//! 按键序列状态机模块
//!
//! # 模块结构
//!
//! - `keys` - 按键事件、修饰键与处理结果
//! - `state` - 模式 `Mode` 与引擎状态 `EngineState`
//! - `transitions` - 纯函数 `step`：当前状态 + 按键 → 下一状态 + 副作用
//!
//! 状态机本身不持有任何可变状态，提交新状态和执行副作用由
//! [`crate::engine::HotkeyEngine`] 完成。

mod keys;
mod state;
mod transitions;

pub use keys::{Key, KeyEvent, KeyOutcome, Modifiers};
pub use state::{EngineState, Mode};
pub use transitions::{step, Effect, PrefixLookup, PrefixMatch, Transition};
