//! 注册表模块
//!
//! 维护所有已注册的热键条目，按标签去重（后注册者覆盖先注册者）
//!
//! - `item` - 条目 `HotkeyItem`、动作类型与注册选项
//! - `table` - 注册表 `Registry` 与作用域句柄 `Registration`

mod item;
mod table;

pub use item::{HotkeyAction, HotkeyItem, RegisterOptions};
pub use table::{Registration, Registry};
