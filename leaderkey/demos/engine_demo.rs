//! 引导键引擎演示
//!
//! 构造一个小型界面树，注册若干热键，然后回放一段按键序列并打印事件。
//!
//! ```text
//! cargo run --example engine_demo
//! RUST_LOG=leaderkey_lib=trace cargo run --example engine_demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use leaderkey_lib::engine::{EngineConfig, HotkeyEngine};
use leaderkey_lib::events::EngineEvent;
use leaderkey_lib::liveness::MutationRecord;
use leaderkey_lib::machine::{Key, KeyEvent};
use leaderkey_lib::oracle::{ElementKind, ElementNode, TreeOracle};
use leaderkey_lib::registry::{HotkeyAction, RegisterOptions};
use leaderkey_lib::utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let engine = HotkeyEngine::new(EngineConfig::default(), Arc::new(TreeOracle::new()))?;
    engine.start()?;

    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                EngineEvent::ModeChanged(mode) => {
                    println!("  mode   -> {:?} [{}]", mode.mode, mode.buffer);
                }
                EngineEvent::PrefixesChanged { assigned } => {
                    let pairs: Vec<String> = assigned
                        .iter()
                        .map(|(label, prefix)| format!("{label}={prefix}"))
                        .collect();
                    println!("  hints  -> {}", pairs.join(", "));
                }
                EngineEvent::ActionDispatched { label } => println!("  fired  -> {label}"),
                EngineEvent::ActionFailed { label, message } => {
                    println!("  failed -> {label}: {message}")
                }
            }
        }
    });

    let toolbar = ElementNode::new(ElementKind::Other);
    let save = toolbar.child(ElementKind::Button);
    let search = toolbar.child(ElementKind::TextInput);
    let delete = toolbar.child(ElementKind::Button);

    let say = |text: &'static str| -> HotkeyAction {
        Arc::new(move || -> anyhow::Result<()> {
            println!("  action -> {text}");
            Ok(())
        })
    };

    let _save = engine.register(
        "save",
        save.handle(),
        Some(say("document saved")),
        RegisterOptions::new().with_priority(10),
    );
    let _search = engine.register("search", search.handle(), None, RegisterOptions::new());
    let _delete = engine.register(
        "delete card",
        delete.handle(),
        Some(say("card deleted")),
        RegisterOptions::new().with_group("dangerous"),
    );
    engine.recompute();

    for label in ["save", "search", "delete card"] {
        println!("{label:>12}: {:?}", engine.get_prefix(label));
    }

    let script = [
        KeyEvent::char(' '),
        KeyEvent::char('s'),
        KeyEvent::char(' '),
        KeyEvent::char('e'),
        KeyEvent::char('x'),
        KeyEvent::new(Key::Escape),
    ];
    for key in &script {
        let outcome = engine.handle_key(key);
        println!("{:?} => {:?}", key.key, outcome);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    println!("hiding delete button");
    delete.set_disabled(true);
    engine.notify_mutation(&[MutationRecord::new("disabled")]);
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("delete card: {:?}", engine.get_prefix("delete card"));

    engine.stop()?;
    Ok(())
}
