//! 延迟调度
//!
//! 匹配成功的条目不会在按键处理函数里直接激活，而是投递到队列，
//! 由运行时上的调度任务在之后的调度周期执行。动作因此不可能重入
//! 触发它的按键处理。
//!
//! 队列里保存的是按键匹配时的那次注册。执行前若该注册已被注销或被
//! 同名的新注册替换，这次激活被丢弃。

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};

use crate::events::{emit, EngineEvent};
use crate::registry::{HotkeyItem, Registry};

/// 动作调度器
pub(crate) struct Dispatcher {
    queue_tx: mpsc::UnboundedSender<Arc<HotkeyItem>>,
    /// 停止信号发送器
    stop_tx: Option<mpsc::Sender<()>>,
}

impl Dispatcher {
    /// 在指定运行时上启动调度任务
    pub(crate) fn start(
        runtime: &Handle,
        registry: Registry,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<Arc<HotkeyItem>>();
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        runtime.spawn(async move {
            loop {
                tokio::select! {
                    Some(item) = queue_rx.recv() => {
                        run_action(&registry, &events, &item);
                    }
                    _ = stop_rx.recv() => {
                        tracing::debug!("Dispatcher stopped");
                        break;
                    }
                }
            }
        });

        tracing::info!("Dispatcher started");
        Self {
            queue_tx,
            stop_tx: Some(stop_tx),
        }
    }

    /// 投递一次激活
    pub(crate) fn dispatch(&self, item: Arc<HotkeyItem>) {
        if let Err(e) = self.queue_tx.send(item) {
            tracing::debug!(label = %e.0.label(), "Dispatcher gone, dropping activation");
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

/// 激活条目
///
/// 动作失败只记录日志并广播事件，不会重试；
/// 动作 panic 同样被视为失败，调度任务继续运行
fn run_action(registry: &Registry, events: &broadcast::Sender<EngineEvent>, item: &HotkeyItem) {
    let label = item.label();
    let current = registry.get(label);
    if current.is_none_or(|current| current.generation() != item.generation()) {
        tracing::debug!(
            label = %label,
            generation = item.generation(),
            "Hotkey registration changed before dispatch"
        );
        return;
    }

    let result = catch_unwind(AssertUnwindSafe(|| item.activate()));
    let event = match result {
        Ok(Ok(())) => {
            tracing::debug!(label = %label, "Hotkey action dispatched");
            EngineEvent::ActionDispatched {
                label: label.to_string(),
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(label = %label, error = %e, "Hotkey action failed");
            EngineEvent::ActionFailed {
                label: label.to_string(),
                message: format!("{:#}", e),
            }
        }
        Err(_) => {
            tracing::error!(label = %label, "Hotkey action panicked");
            EngineEvent::ActionFailed {
                label: label.to_string(),
                message: "action panicked".to_string(),
            }
        }
    };

    emit(events, event);
}
