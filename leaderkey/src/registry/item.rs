//! 热键条目

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::allocator::AllocationRequest;
use crate::oracle::{activate_default, ElementHandle};

/// 热键动作
///
/// 返回 `Err` 表示动作失败；引擎只记录失败，不会重试
pub type HotkeyAction = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// 注册选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterOptions {
    /// 分组提示
    pub group: Option<String>,
    /// 优先级（默认 0）
    pub priority: i32,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// 一个已注册的热键目标
#[derive(Clone)]
pub struct HotkeyItem {
    label: String,
    element: ElementHandle,
    action: Option<HotkeyAction>,
    group: Option<String>,
    priority: i32,
    generation: u64,
}

impl HotkeyItem {
    /// 创建没有动作的条目，激活时对元素执行默认操作
    pub fn new(label: impl Into<String>, element: ElementHandle) -> Self {
        Self {
            label: label.into(),
            element,
            action: None,
            group: None,
            priority: 0,
            generation: 0,
        }
    }

    /// 设置激活动作
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// 设置已共享的激活动作
    pub fn with_shared_action(mut self, action: HotkeyAction) -> Self {
        self.action = Some(action);
        self
    }

    /// 应用注册选项
    pub fn with_options(mut self, options: RegisterOptions) -> Self {
        self.group = options.group;
        self.priority = options.priority;
        self
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn element(&self) -> &ElementHandle {
        &self.element
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// 注册代数，每次注册递增
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 转换为分配请求
    pub fn allocation_request(&self) -> AllocationRequest {
        AllocationRequest {
            label: self.label.clone(),
            priority: self.priority,
            group: self.group.clone(),
        }
    }

    /// 激活条目
    ///
    /// 有动作时调用动作；否则对元素执行默认操作（元素已释放时什么也不做）
    pub fn activate(&self) -> anyhow::Result<()> {
        match &self.action {
            Some(action) => action(),
            None => {
                if !activate_default(&self.element) {
                    tracing::debug!(label = %self.label, "Element gone, nothing to activate");
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for HotkeyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeyItem")
            .field("label", &self.label)
            .field("alive", &(self.element.strong_count() > 0))
            .field("has_action", &self.action.is_some())
            .field("group", &self.group)
            .field("priority", &self.priority)
            .field("generation", &self.generation)
            .finish()
    }
}
