//! 可交互性重算模块
//!
//! 监听注册表变化和宿主转发的属性变更，过滤出当前可交互的条目，
//! 调用分配器并发布新的 [`PrefixMap`]。这里是唯一会改变已发布映射的地方，
//! 并且从不修改注册表。
//!
//! # 触发合并
//!
//! 所有触发都落到同一个 `Notify` 上：没有等待者时只保存一个许可，
//! 因此同一调度周期内的多次触发只会引起一次重算。监控任务被唤醒后
//! 先让出一次执行权，再读取注册表快照。

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, Notify};

use crate::allocator::{allocate, AllocationRequest, PrefixMap};
use crate::events::{emit, EngineEvent};
use crate::machine::{PrefixLookup, PrefixMatch};
use crate::oracle::InteractivityOracle;
use crate::registry::Registry;

/// 会影响可交互性的属性
pub const WATCHED_ATTRIBUTES: [&str; 5] = ["style", "class", "hidden", "disabled", "aria-hidden"];

/// 宿主转发的一条属性变更记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// 发生变化的属性名
    pub attribute: String,
}

impl MutationRecord {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    /// 是否为需要关注的属性
    pub fn is_watched(&self) -> bool {
        WATCHED_ATTRIBUTES.contains(&self.attribute.as_str())
    }
}

/// 已发布前缀映射的持有者
pub struct Liveness {
    registry: Registry,
    oracle: Arc<dyn InteractivityOracle>,
    published: ArcSwap<PrefixMap>,
    trigger: Arc<Notify>,
    events: broadcast::Sender<EngineEvent>,
}

impl Liveness {
    pub fn new(
        registry: Registry,
        oracle: Arc<dyn InteractivityOracle>,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        let trigger = registry.change_signal();
        Self {
            registry,
            oracle,
            published: ArcSwap::from_pointee(PrefixMap::new()),
            trigger,
            events,
        }
    }

    /// 转发属性变更
    ///
    /// 只要有一条记录涉及关注的属性就请求重算，返回是否请求了重算
    pub fn notify_mutation(&self, records: &[MutationRecord]) -> bool {
        if !records.iter().any(MutationRecord::is_watched) {
            return false;
        }
        self.request_recompute();
        true
    }

    /// 请求在下一个调度周期重算
    pub fn request_recompute(&self) {
        self.trigger.notify_one();
    }

    /// 立即重算并发布
    ///
    /// 映射有变化时广播 `PrefixesChanged`
    pub fn recompute(&self) -> Arc<PrefixMap> {
        let items = self.registry.snapshot();
        let requests: Vec<AllocationRequest> = items
            .iter()
            .filter(|item| self.oracle.is_handle_interactive(item.element()))
            .map(|item| item.allocation_request())
            .collect();

        let map = Arc::new(allocate(&requests));
        let previous = self.published.swap(Arc::clone(&map));

        if *previous != *map {
            tracing::debug!(
                registered = items.len(),
                interactive = requests.len(),
                assigned = map.len(),
                "Published new prefix map"
            );
            emit(
                &self.events,
                EngineEvent::PrefixesChanged {
                    assigned: PrefixMap::clone(&map),
                },
            );
        }

        map
    }

    /// 当前发布的映射
    pub fn current(&self) -> Arc<PrefixMap> {
        self.published.load_full()
    }

    /// 标签当前的前缀
    ///
    /// 未注册、未分配或此刻不可交互时返回空字符串
    pub fn prefix_for(&self, label: &str) -> String {
        if !self.is_live(label) {
            return String::new();
        }
        self.published.load().prefix_or_empty(label)
    }

    fn is_live(&self, label: &str) -> bool {
        self.registry
            .get(label)
            .is_some_and(|item| self.oracle.is_handle_interactive(item.element()))
    }

    pub(crate) fn trigger(&self) -> Arc<Notify> {
        Arc::clone(&self.trigger)
    }
}

/// 在已发布的映射上查询，并在按键时刻再次确认条目仍可交互
impl PrefixLookup for Liveness {
    fn potential_matches(&self, buffer: &str) -> Vec<PrefixMatch> {
        let map = self.published.load();
        map.starting_with(buffer)
            .filter(|(label, _)| self.is_live(label))
            .map(|(label, prefix)| PrefixMatch {
                label: label.to_string(),
                prefix: prefix.to_string(),
            })
            .collect()
    }
}

/// 重算监控任务
///
/// 在后台等待触发并重算，`stop` 或 drop 时结束
pub struct LivenessMonitor {
    /// 停止信号发送器
    stop_tx: Option<mpsc::Sender<()>>,
}

impl LivenessMonitor {
    /// 在指定运行时上启动监控任务
    pub fn start(runtime: &Handle, liveness: Arc<Liveness>) -> Self {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let trigger = liveness.trigger();

        runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = trigger.notified() => {
                        tokio::task::yield_now().await;
                        liveness.recompute();
                    }
                    _ = stop_rx.recv() => {
                        tracing::debug!("LivenessMonitor stopped");
                        break;
                    }
                }
            }
        });

        tracing::info!("LivenessMonitor started");
        Self {
            stop_tx: Some(stop_tx),
        }
    }

    /// 停止监控任务
    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}

impl Drop for LivenessMonitor {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
    }
}
