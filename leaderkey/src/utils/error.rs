//! 全局错误处理模块
//!
//! 提供统一的应用错误类型和用户友好的错误消息
//!
//! 按键处理、注册、查询都不会失败；这里聚合的只有配置加载和
//! 引擎生命周期相关的错误。
//!
//! # 使用示例
//!
//! ```
//! use leaderkey_lib::utils::error::{AppError, ErrorCode};
//! use leaderkey_lib::engine::EngineError;
//!
//! let err = AppError::from(EngineError::NotRunning);
//! assert_eq!(err.code(), ErrorCode::EngineNotRunning);
//! assert!(err.is_recoverable());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{ConfigError, EngineError};

/// 应用错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 引擎错误
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 配置错误
    /// 配置文件读写失败
    ConfigIoFailed,
    /// 配置文件格式错误
    ConfigParseFailed,
    /// 配置值无效
    ConfigInvalid,

    // 引擎错误
    /// 引擎已在运行
    EngineAlreadyRunning,
    /// 引擎未运行
    EngineNotRunning,
    /// 没有可用的异步运行时
    EngineNoRuntime,

    // 通用错误
    /// 内部错误
    InternalError,
}

/// 错误上下文信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// 错误代码
    pub code: ErrorCode,
    /// 用户友好的错误消息
    pub message: String,
    /// 详细错误信息（用于日志）
    pub detail: Option<String>,
    /// 是否可恢复
    pub recoverable: bool,
}

fn config_code(err: &ConfigError) -> ErrorCode {
    match err {
        ConfigError::Io(_) => ErrorCode::ConfigIoFailed,
        ConfigError::Json(_) => ErrorCode::ConfigParseFailed,
        ConfigError::Invalid(_) => ErrorCode::ConfigInvalid,
    }
}

fn config_message(err: &ConfigError) -> String {
    match err {
        ConfigError::Io(_) => "无法读取或写入热键配置文件".to_string(),
        ConfigError::Json(_) => "热键配置文件格式错误".to_string(),
        ConfigError::Invalid(reason) => format!("热键配置无效: {}", reason),
    }
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Config(err) => config_code(err),
            AppError::Engine(EngineError::InvalidConfig(err)) => config_code(err),
            AppError::Engine(EngineError::AlreadyRunning) => ErrorCode::EngineAlreadyRunning,
            AppError::Engine(EngineError::NotRunning) => ErrorCode::EngineNotRunning,
            AppError::Engine(EngineError::NoRuntime(_)) => ErrorCode::EngineNoRuntime,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// 获取用户友好的错误消息
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(err) => config_message(err),
            AppError::Engine(EngineError::InvalidConfig(err)) => config_message(err),
            AppError::Engine(EngineError::AlreadyRunning) => "热键引擎已在运行".to_string(),
            AppError::Engine(EngineError::NotRunning) => "热键引擎未启动".to_string(),
            AppError::Engine(EngineError::NoRuntime(_)) => {
                "热键引擎需要在异步运行时中启动".to_string()
            }
            AppError::Internal(msg) => format!("内部错误: {}", msg),
        }
    }

    /// 获取完整的错误上下文
    pub fn context(&self) -> ErrorContext {
        ErrorContext {
            code: self.code(),
            message: self.user_message(),
            detail: Some(self.to_string()),
            recoverable: self.is_recoverable(),
        }
    }

    /// 检查错误是否可恢复
    ///
    /// 重复启动/停止不影响引擎状态；配置和内部错误需要人工处理
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Engine(EngineError::AlreadyRunning | EngineError::NotRunning)
        )
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
