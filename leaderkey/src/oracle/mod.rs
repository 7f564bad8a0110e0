//! 可交互性判定模块
//!
//! 引擎与宿主 UI 运行时之间的边界：
//!
//! - [`element`] - 元素抽象 `UiElement` 与弱引用句柄 `ElementHandle`
//! - [`interactivity`] - 可交互性判定 `InteractivityOracle` 及默认实现 `TreeOracle`
//! - [`node`] - 进程内元素实现 `ElementNode`
//!
//! 分配器和状态机只通过这里的 trait 观察元素，因此可以脱离任何具体
//! UI 运行时进行测试。

pub mod element;
pub mod interactivity;
pub mod node;

pub use element::{activate_default, ElementHandle, ElementKind, UiElement};
pub use interactivity::{InteractivityOracle, TreeOracle, MAX_ANCESTOR_DEPTH};
pub use node::ElementNode;
