use std::sync::Arc;

use leaderkey_lib::events::{EngineEvent, EVENT_CHANNEL_CAPACITY};
use leaderkey_lib::liveness::{Liveness, LivenessMonitor, MutationRecord, WATCHED_ATTRIBUTES};
use leaderkey_lib::oracle::{ElementKind, ElementNode, InteractivityOracle, TreeOracle, UiElement};
use leaderkey_lib::registry::{HotkeyItem, RegisterOptions, Registry};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{timeout, Duration};

fn liveness_with(oracle: Arc<dyn InteractivityOracle>) -> (Registry, Arc<Liveness>) {
    let registry = Registry::new();
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let liveness = Arc::new(Liveness::new(registry.clone(), oracle, events));
    (registry, liveness)
}

/// 只把按钮视为可交互的判定实现
struct ButtonsOnly;

impl InteractivityOracle for ButtonsOnly {
    fn is_interactive(&self, element: &dyn UiElement) -> bool {
        element.kind() == ElementKind::Button
    }

    fn is_actively_editing(&self, _target: Option<&dyn UiElement>) -> bool {
        false
    }
}

#[test]
fn test_watched_attribute_list() {
    assert_eq!(
        WATCHED_ATTRIBUTES,
        ["style", "class", "hidden", "disabled", "aria-hidden"]
    );
}

#[test]
fn test_hidden_then_visible_converges() {
    let (registry, liveness) = liveness_with(Arc::new(TreeOracle::new()));
    let dialog = ElementNode::new(ElementKind::Other);
    let confirm = dialog.child(ElementKind::Button);
    let cancel = dialog.child(ElementKind::Button);
    let _confirm = registry.register(HotkeyItem::new("confirm", confirm.handle()));
    let _cancel = registry.register(HotkeyItem::new("cancel", cancel.handle()));

    let before = liveness.recompute();
    assert_eq!(before.len(), 2);

    dialog.set_hidden(true);
    assert!(liveness.recompute().is_empty());

    dialog.set_hidden(false);
    assert_eq!(*liveness.recompute(), *before);
}

#[test]
fn test_detached_and_dropped_elements_are_excluded() {
    let (registry, liveness) = liveness_with(Arc::new(TreeOracle::new()));
    let kept = ElementNode::new(ElementKind::Button);
    let detached = ElementNode::new(ElementKind::Button);
    let dropped = ElementNode::new(ElementKind::Button);
    let _kept = registry.register(HotkeyItem::new("kept", kept.handle()));
    let _detached = registry.register(HotkeyItem::new("detached", detached.handle()));
    let _dropped = registry.register(HotkeyItem::new("dropped", dropped.handle()));

    detached.detach();
    drop(dropped);

    let map = liveness.recompute();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("kept"), Some("k"));
    assert_eq!(liveness.prefix_for("dropped"), "");
}

#[test]
fn test_custom_oracle() {
    let (registry, liveness) = liveness_with(Arc::new(ButtonsOnly));
    let button = ElementNode::new(ElementKind::Button);
    let link = ElementNode::new(ElementKind::Link);
    let _button = registry.register(HotkeyItem::new("button", button.handle()));
    let _link = registry.register(HotkeyItem::new("link", link.handle()));

    let map = liveness.recompute();
    assert_eq!(map.get("button"), Some("b"));
    assert_eq!(map.get("link"), None);
}

#[test]
fn test_priority_survives_filtering() {
    let (registry, liveness) = liveness_with(Arc::new(TreeOracle::new()));
    let search = ElementNode::new(ElementKind::Button);
    let save = ElementNode::new(ElementKind::Button);
    let _search = registry.register(HotkeyItem::new("search", search.handle()));
    let _save = registry.register(
        HotkeyItem::new("save", save.handle())
            .with_options(RegisterOptions::new().with_priority(10)),
    );

    let map = liveness.recompute();
    assert_eq!(map.get("save"), Some("s"));
    assert_eq!(map.get("search"), Some("e"));

    save.set_disabled(true);
    let map = liveness.recompute();
    assert_eq!(map.get("search"), Some("s"));
}

#[tokio::test]
async fn test_monitor_coalesces_mutation_bursts() {
    let registry = Registry::new();
    let (events, mut rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let liveness = Arc::new(Liveness::new(
        registry.clone(),
        Arc::new(TreeOracle::new()),
        events,
    ));
    let node = ElementNode::new(ElementKind::Button);
    let _save = registry.register(HotkeyItem::new("save", node.handle()));

    let mut monitor = LivenessMonitor::start(&Handle::current(), Arc::clone(&liveness));
    for _ in 0..10 {
        liveness.notify_mutation(&[MutationRecord::new("style")]);
    }

    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no recompute")
        .unwrap();
    assert!(matches!(event, EngineEvent::PrefixesChanged { .. }));

    // 一次突发最多带来一次额外重算，且映射未变时不再广播
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert!(rx.try_recv().is_err());

    monitor.stop().await;
}
