//! 状态转换
//!
//! 每个 keydown 事件按以下优先级处理：
//!
//! 1. 带平台命令键的组合键：完全忽略
//! 2. `Escape`：清空缓冲区回到 `Inactive`，焦点在文本编辑区域时使其失焦
//! 3. 正在编辑文本或按住 Ctrl/Alt：清空缓冲区，事件透传
//! 4. 引导键：进入 `Leader` 并（重新）启动超时计时
//! 5. `Enter`：缓冲区精确匹配某个条目时触发其动作，然后回到 `Inactive`
//! 6. 字母数字键：追加到缓冲区并计算潜在匹配
//!
//! 超时由引擎的计时器处理，不经过这里。

use crate::allocator::PrefixMap;
use crate::engine::EngineConfig;

use super::keys::{Key, KeyEvent, KeyOutcome};
use super::state::EngineState;

/// 潜在匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    pub label: String,
    pub prefix: String,
}

/// 前缀查询接口
///
/// 返回当前可交互、且前缀以 `buffer` 开头的所有条目
pub trait PrefixLookup {
    fn potential_matches(&self, buffer: &str) -> Vec<PrefixMatch>;
}

/// 直接在映射表上查询，视所有条目为可交互
impl PrefixLookup for PrefixMap {
    fn potential_matches(&self, buffer: &str) -> Vec<PrefixMatch> {
        self.starting_with(buffer)
            .map(|(label, prefix)| PrefixMatch {
                label: label.to_string(),
                prefix: prefix.to_string(),
            })
            .collect()
    }
}

/// 转换产生的副作用，由引擎在提交新状态后执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// （重新）启动缓冲区超时计时器
    ArmTimeout,
    /// 取消超时计时器
    CancelTimeout,
    /// 在下一个调度周期激活条目
    Dispatch { label: String },
    /// 让条目元素获取焦点，等待 Enter 确认
    Focus { label: String },
    /// 让事件目标失去焦点
    BlurTarget,
}

/// 一次状态转换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: EngineState,
    pub outcome: KeyOutcome,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// 状态不变，事件透传
    fn unchanged(state: &EngineState) -> Self {
        Self {
            next: state.clone(),
            outcome: KeyOutcome::PassThrough,
            effects: Vec::new(),
        }
    }

    /// 清空缓冲区回到 Inactive
    fn reset(state: &EngineState, outcome: KeyOutcome) -> Self {
        let effects = if state.is_inactive() {
            Vec::new()
        } else {
            vec![Effect::CancelTimeout]
        };
        Self {
            next: EngineState::inactive(),
            outcome,
            effects,
        }
    }

    /// 立即激活条目并回到 Inactive
    fn fire(label: String) -> Self {
        Self {
            next: EngineState::inactive(),
            outcome: KeyOutcome::Intercepted,
            effects: vec![Effect::CancelTimeout, Effect::Dispatch { label }],
        }
    }

    /// 拦截事件并进入（或停留在）等待输入的状态
    fn arm(next: EngineState, extra: Option<Effect>) -> Self {
        let mut effects = vec![Effect::ArmTimeout];
        effects.extend(extra);
        Self {
            next,
            outcome: KeyOutcome::Intercepted,
            effects,
        }
    }
}

/// 计算一次按键的状态转换
///
/// * `editing` - 事件目标是否为正在编辑的文本区域（由判定接口得出）
/// * `lookup` - 当前可交互条目的前缀查询
pub fn step(
    state: &EngineState,
    event: &KeyEvent,
    editing: bool,
    config: &EngineConfig,
    lookup: &dyn PrefixLookup,
) -> Transition {
    if event.modifiers.is_system_combo() {
        return Transition::unchanged(state);
    }

    if event.key == Key::Escape {
        let mut effects = vec![Effect::CancelTimeout];
        if editing {
            effects.push(Effect::BlurTarget);
        }
        let outcome = if state.is_inactive() {
            KeyOutcome::PassThrough
        } else {
            KeyOutcome::Intercepted
        };
        return Transition {
            next: EngineState::inactive(),
            outcome,
            effects,
        };
    }

    if editing || event.modifiers.blocks_sequence() {
        return Transition::reset(state, KeyOutcome::PassThrough);
    }

    if event.key == Key::Char(config.leader_key) {
        return Transition::arm(EngineState::leader(), None);
    }

    if state.is_inactive() {
        return Transition::unchanged(state);
    }

    if event.key == Key::Enter {
        let buffer = state.buffer();
        if buffer.is_empty() {
            return Transition::reset(state, KeyOutcome::PassThrough);
        }
        return match exact_match(lookup.potential_matches(buffer), buffer) {
            Some(label) => Transition::fire(label),
            None => Transition::reset(state, KeyOutcome::PassThrough),
        };
    }

    let Some(c) = event.key.alphanumeric() else {
        return Transition::reset(state, KeyOutcome::PassThrough);
    };

    let mut buffer = state.buffer().to_string();
    buffer.push(c);

    let matches = lookup.potential_matches(&buffer);
    if matches.is_empty() {
        return Transition::reset(state, KeyOutcome::PassThrough);
    }

    match exact_match(matches, &buffer) {
        Some(label) if config.require_confirmation => {
            Transition::arm(EngineState::active(buffer), Some(Effect::Focus { label }))
        }
        Some(label) => Transition::fire(label),
        None => Transition::arm(EngineState::active(buffer), None),
    }
}

fn exact_match(matches: Vec<PrefixMatch>, buffer: &str) -> Option<String> {
    matches
        .into_iter()
        .find(|m| m.prefix == buffer)
        .map(|m| m.label)
}
