//! 热键引擎服务
//!
//! `HotkeyEngine` 把各组件连接起来：
//!
//! - 按键处理：读取当前状态，调用纯函数 [`step`]，用 compare-and-swap
//!   提交新状态，然后执行副作用
//! - 缓冲区超时：每次进入等待状态都启动一个计时任务，到期时只有在
//!   状态仍是启动计时时的那个状态才会回到 Inactive。计时器槽位只接受
//!   为当前状态启动的计时器，多个线程同时处理按键时，落后的一方
//!   不会覆盖较新状态的计时器
//! - 生命周期：`start()` 在当前 Tokio 运行时上启动调度任务和重算监控，
//!   `stop()` 结束它们并重置状态

use std::path::Path;
use std::sync::{Arc, Weak};

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

use crate::allocator::PrefixMap;
use crate::events::{emit, EngineEvent, ModeChangeEvent, EVENT_CHANNEL_CAPACITY};
use crate::liveness::{Liveness, LivenessMonitor, MutationRecord};
use crate::machine::{step, Effect, EngineState, KeyEvent, KeyOutcome, Mode};
use crate::oracle::{ElementHandle, InteractivityOracle};
use crate::registry::{HotkeyAction, HotkeyItem, RegisterOptions, Registration, Registry};
use crate::utils::AppResult;

use super::config::EngineConfig;
use super::dispatch::Dispatcher;
use super::error::{EngineError, EngineResult};

/// 运行期资源，drop 时停止后台任务
struct Running {
    runtime: Handle,
    dispatcher: Dispatcher,
    _monitor: LivenessMonitor,
}

/// 为某个状态启动的超时计时器
struct ArmedTimer {
    armed: Arc<EngineState>,
    task: AbortHandle,
}

struct EngineInner {
    config: EngineConfig,
    oracle: Arc<dyn InteractivityOracle>,
    registry: Registry,
    liveness: Arc<Liveness>,
    state: ArcSwap<EngineState>,
    timer: ArcSwapOption<ArmedTimer>,
    running: ArcSwapOption<Running>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineInner {
    fn emit_mode(&self, state: &EngineState) {
        emit(&self.events, EngineEvent::ModeChanged(ModeChangeEvent::from(state)));
    }

    fn is_current(&self, state: &Arc<EngineState>) -> bool {
        Arc::ptr_eq(&*self.state.load(), state)
    }

    /// 安装为 `armed` 启动的计时器
    ///
    /// 只有 `armed` 仍是当前状态时才安装并中止被替换的计时器；
    /// 否则中止新计时器，槽位保持不变
    fn install_timer(&self, armed: Arc<EngineState>, task: AbortHandle) {
        let timer = Arc::new(ArmedTimer { armed, task });
        let mut installed = false;
        let previous = self.timer.rcu(|current| {
            installed = self.is_current(&timer.armed);
            if installed {
                Some(Arc::clone(&timer))
            } else {
                current.clone()
            }
        });

        if installed {
            if let Some(previous) = previous {
                previous.task.abort();
            }
        } else {
            tracing::trace!("Stale timeout discarded");
            timer.task.abort();
        }
    }

    /// 取消不再对应当前状态的计时器
    fn cancel_timeout(&self) {
        let mut removed = false;
        let previous = self.timer.rcu(|current| match current {
            Some(timer) if !self.is_current(&timer.armed) => {
                removed = true;
                None
            }
            other => {
                removed = false;
                other.clone()
            }
        });

        if removed {
            if let Some(timer) = previous {
                timer.task.abort();
            }
        }
    }

    /// 超时到期：仅当状态仍是 `armed` 时回到 Inactive
    fn expire(&self, armed: &Arc<EngineState>) {
        let next = Arc::new(EngineState::inactive());
        let previous = self.state.compare_and_swap(armed, Arc::clone(&next));
        if Arc::ptr_eq(&*previous, armed) {
            tracing::debug!(buffer = %armed.buffer(), "Buffer timed out");
            self.emit_mode(&next);
        }
    }
}

/// 引导键热键引擎
///
/// 克隆得到的是同一个引擎的另一个引用。每个应用实例构造一个，
/// 测试可以创建互不相干的多个引擎。
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use leaderkey_lib::engine::{EngineConfig, HotkeyEngine};
/// use leaderkey_lib::machine::{KeyEvent, Mode};
/// use leaderkey_lib::oracle::{ElementKind, ElementNode, TreeOracle};
/// use leaderkey_lib::registry::RegisterOptions;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = HotkeyEngine::new(EngineConfig::default(), Arc::new(TreeOracle::new()))?;
/// engine.start()?;
///
/// let button = ElementNode::new(ElementKind::Button);
/// let _save = engine.register("save", button.handle(), None, RegisterOptions::new());
/// engine.recompute();
/// assert_eq!(engine.get_prefix("save"), "s");
///
/// engine.handle_key(&KeyEvent::char(' '));
/// assert_eq!(engine.get_mode(), Mode::Leader);
///
/// engine.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HotkeyEngine {
    inner: Arc<EngineInner>,
}

impl HotkeyEngine {
    /// 创建引擎（未启动）
    pub fn new(config: EngineConfig, oracle: Arc<dyn InteractivityOracle>) -> EngineResult<Self> {
        config.validate()?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let registry = Registry::new();
        let liveness = Arc::new(Liveness::new(
            registry.clone(),
            Arc::clone(&oracle),
            events.clone(),
        ));

        tracing::debug!(
            leader_key = ?config.leader_key,
            buffer_timeout_ms = config.buffer_timeout_ms,
            require_confirmation = config.require_confirmation,
            enabled = config.enabled,
            "HotkeyEngine created"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                oracle,
                registry,
                liveness,
                state: ArcSwap::from_pointee(EngineState::inactive()),
                timer: ArcSwapOption::empty(),
                running: ArcSwapOption::empty(),
                events,
            }),
        })
    }

    /// 从 JSON 配置文件创建引擎
    pub fn from_config_file(
        path: impl AsRef<Path>,
        oracle: Arc<dyn InteractivityOracle>,
    ) -> AppResult<Self> {
        let config = EngineConfig::load(path)?;
        Ok(Self::new(config, oracle)?)
    }

    /// 启动引擎
    ///
    /// 必须在 Tokio 运行时内调用。启动后立即执行一次重算。
    pub fn start(&self) -> EngineResult<()> {
        if self.inner.running.load().is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let runtime = Handle::try_current().map_err(|e| EngineError::NoRuntime(e.to_string()))?;

        let running = Arc::new(Running {
            dispatcher: Dispatcher::start(
                &runtime,
                self.inner.registry.clone(),
                self.inner.events.clone(),
            ),
            _monitor: LivenessMonitor::start(&runtime, Arc::clone(&self.inner.liveness)),
            runtime,
        });

        let previous = self
            .inner
            .running
            .compare_and_swap(&None::<Arc<Running>>, Some(running));
        if previous.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        self.inner.liveness.recompute();
        tracing::info!("HotkeyEngine started");
        Ok(())
    }

    /// 停止引擎
    ///
    /// 取消计时器、结束后台任务并回到 Inactive。注册表保持不变，
    /// 再次启动后前缀会重新计算。
    pub fn stop(&self) -> EngineResult<()> {
        let Some(running) = self.inner.running.swap(None) else {
            return Err(EngineError::NotRunning);
        };
        drop(running);

        let previous = self.inner.state.swap(Arc::new(EngineState::inactive()));
        self.inner.cancel_timeout();
        if !previous.is_inactive() {
            self.inner.emit_mode(&EngineState::inactive());
        }

        tracing::info!("HotkeyEngine stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load().is_some()
    }

    /// 处理一次 keydown 事件
    ///
    /// 返回 `Intercepted` 时宿主应阻止事件的默认处理。引擎未启动或被禁用时
    /// 所有事件都透传。
    pub fn handle_key(&self, event: &KeyEvent) -> KeyOutcome {
        let inner = &self.inner;
        if !inner.config.enabled {
            return KeyOutcome::PassThrough;
        }
        let Some(running) = inner.running.load_full() else {
            return KeyOutcome::PassThrough;
        };

        let editing = inner.oracle.is_actively_editing(event.target());

        loop {
            let current = inner.state.load_full();
            let transition = step(
                &current,
                event,
                editing,
                &inner.config,
                inner.liveness.as_ref(),
            );

            if transition.effects.is_empty() && transition.next == *current {
                return transition.outcome;
            }

            let next = Arc::new(transition.next);
            let previous = inner.state.compare_and_swap(&current, Arc::clone(&next));
            if !Arc::ptr_eq(&*previous, &current) {
                // 并发修改（例如超时），基于最新状态重新计算
                continue;
            }

            if *next != *current {
                tracing::debug!(
                    from = current.name(),
                    to = next.name(),
                    buffer = %next.buffer(),
                    key = ?event.key,
                    "Hotkey state changed"
                );
                inner.emit_mode(&next);
            }

            for effect in transition.effects {
                self.apply(&running, &next, event, effect);
            }
            return transition.outcome;
        }
    }

    fn apply(&self, running: &Running, next: &Arc<EngineState>, event: &KeyEvent, effect: Effect) {
        match effect {
            Effect::ArmTimeout => self.arm_timeout(running, Arc::clone(next)),
            Effect::CancelTimeout => self.inner.cancel_timeout(),
            Effect::Dispatch { label } => match self.inner.registry.get(&label) {
                Some(item) => running.dispatcher.dispatch(item),
                None => tracing::debug!(label = %label, "Matched hotkey already unregistered"),
            },
            Effect::Focus { label } => {
                if let Some(element) = self
                    .inner
                    .registry
                    .get(&label)
                    .and_then(|item| item.element().upgrade())
                {
                    element.focus();
                }
            }
            Effect::BlurTarget => {
                if let Some(target) = event.target() {
                    target.blur();
                }
            }
        }
    }

    fn arm_timeout(&self, running: &Running, armed: Arc<EngineState>) {
        let weak: Weak<EngineInner> = Arc::downgrade(&self.inner);
        let timeout = self.inner.config.buffer_timeout();

        let expired = Arc::clone(&armed);
        let task = running.runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(&expired);
            }
        });

        self.inner.install_timer(armed, task.abort_handle());
    }

    /// 注册热键
    ///
    /// 同名标签会被替换。返回的句柄在 `release()` 或 drop 时注销本次注册。
    pub fn register(
        &self,
        label: impl Into<String>,
        element: ElementHandle,
        action: Option<HotkeyAction>,
        options: RegisterOptions,
    ) -> Registration {
        let mut item = HotkeyItem::new(label, element).with_options(options);
        if let Some(action) = action {
            item = item.with_shared_action(action);
        }
        self.inner.registry.register(item)
    }

    /// 注销标签（不存在时为空操作）
    pub fn unregister(&self, label: &str) -> bool {
        self.inner.registry.unregister(label)
    }

    /// 标签当前的前缀，未知或不可交互时为空字符串
    pub fn get_prefix(&self, label: &str) -> String {
        self.inner.liveness.prefix_for(label)
    }

    pub fn get_mode(&self) -> Mode {
        self.inner.state.load().mode()
    }

    pub fn get_buffer(&self) -> String {
        self.inner.state.load().buffer().to_string()
    }

    /// 当前状态快照
    pub fn state(&self) -> EngineState {
        EngineState::clone(&self.inner.state.load())
    }

    /// 当前发布的前缀映射
    pub fn prefixes(&self) -> Arc<PrefixMap> {
        self.inner.liveness.current()
    }

    /// 立即重算前缀映射
    pub fn recompute(&self) -> Arc<PrefixMap> {
        self.inner.liveness.recompute()
    }

    /// 转发宿主的属性变更记录
    pub fn notify_mutation(&self, records: &[MutationRecord]) -> bool {
        self.inner.liveness.notify_mutation(records)
    }

    /// 订阅引擎事件
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }
}
