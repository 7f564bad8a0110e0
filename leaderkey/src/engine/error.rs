//! 引擎生命周期错误类型
//!
//! 按键处理、注册和查询本身从不失败，这里只覆盖启动、停止和构造

use thiserror::Error;

use super::config::ConfigError;

/// 引擎错误
#[derive(Error, Debug)]
pub enum EngineError {
    /// 引擎已在运行
    #[error("Engine is already running")]
    AlreadyRunning,

    /// 引擎未运行
    #[error("Engine is not running")]
    NotRunning,

    /// 当前线程不在 Tokio 运行时中
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(String),

    /// 配置无效
    #[error("Invalid engine config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// 引擎模块的结果类型
pub type EngineResult<T> = Result<T, EngineError>;
