//! 热键引擎模块
//!
//! # 模块结构
//!
//! - `config` - 引擎配置（JSON 加载/保存、校验）
//! - `error` - 生命周期错误类型
//! - `dispatch` - 延迟动作调度
//! - `service` - `HotkeyEngine` 服务对象

pub mod config;
pub mod error;

mod dispatch;
mod service;

pub use config::{ConfigError, ConfigResult, EngineConfig, DEFAULT_BUFFER_TIMEOUT_MS, DEFAULT_LEADER_KEY};
pub use error::{EngineError, EngineResult};
pub use service::HotkeyEngine;
