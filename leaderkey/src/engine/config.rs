//! 引擎配置模块
//!
//! 配置在构造引擎时提供一次，之后只读。可以从 JSON 文件加载，
//! 字段名与宿主侧保持一致（`bufferTimeoutMs`、`leaderKey` 等）。
//!
//! ```json
//! {
//!   "bufferTimeoutMs": 750,
//!   "leaderKey": " ",
//!   "requireConfirmation": false,
//!   "enabled": true
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认缓冲区超时（毫秒）
pub const DEFAULT_BUFFER_TIMEOUT_MS: u64 = 750;

/// 默认引导键
pub const DEFAULT_LEADER_KEY: char = ' ';

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置值无效
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 引擎配置
///
/// # Examples
///
/// ```
/// use leaderkey_lib::engine::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_leader_key(',')
///     .with_require_confirmation(true);
/// assert_eq!(config.buffer_timeout_ms, 750);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// 缓冲区超时（毫秒），期间无按键则回到 Inactive
    pub buffer_timeout_ms: u64,

    /// 引导键
    pub leader_key: char,

    /// 精确匹配后是否需要按 Enter 确认
    pub require_confirmation: bool,

    /// 是否启用
    pub enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_timeout_ms: DEFAULT_BUFFER_TIMEOUT_MS,
            leader_key: DEFAULT_LEADER_KEY,
            require_confirmation: false,
            enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn with_buffer_timeout_ms(mut self, ms: u64) -> Self {
        self.buffer_timeout_ms = ms;
        self
    }

    pub fn with_leader_key(mut self, key: char) -> Self {
        self.leader_key = key;
        self
    }

    pub fn with_require_confirmation(mut self, require: bool) -> Self {
        self.require_confirmation = require;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 缓冲区超时
    pub fn buffer_timeout(&self) -> Duration {
        Duration::from_millis(self.buffer_timeout_ms)
    }

    /// 校验配置
    ///
    /// 引导键不能是字母数字（否则无法输入前缀），超时必须大于 0
    pub fn validate(&self) -> ConfigResult<()> {
        if self.buffer_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "bufferTimeoutMs must be greater than 0".to_string(),
            ));
        }
        if self.leader_key.is_ascii_alphanumeric() {
            return Err(ConfigError::Invalid(format!(
                "leader key '{}' collides with prefix characters",
                self.leader_key
            )));
        }
        if self.leader_key.is_control() {
            return Err(ConfigError::Invalid(
                "leader key must be a printable character".to_string(),
            ));
        }
        Ok(())
    }

    /// 从 JSON 文件加载配置
    ///
    /// 文件不存在时返回默认配置；加载结果会经过校验
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();

        tracing::debug!(path = %path.display(), "Loading engine config");

        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: EngineConfig = serde_json::from_str(&content)?;
            tracing::info!(path = %path.display(), "Engine config loaded");
            config
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            EngineConfig::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到 JSON 文件
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();

        tracing::debug!(path = %path.display(), "Saving engine config");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!(path = %path.display(), "Engine config saved");
        Ok(())
    }
}
