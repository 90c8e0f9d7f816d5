//! # Event 模块
//!
//! 可完成事件的生命周期与完成后的续体。
//!
//! ## 核心概念
//!
//! - 事件要么从未播放（`Inert`），要么处于 `Active`/`Completed`/`Stopped` 之一
//! - `complete()` 先把事件置为非活跃，再交出续体；续体最多被交出一次
//! - 续体不是闭包，而是 [`Next`] 值，由引擎在事件离开事件栈之后解释执行

pub mod sequence;
pub mod stack;

use serde::{Deserialize, Serialize};

use crate::engine::Notice;
use crate::scene::SceneCue;

pub use sequence::{Sequence, Step};
pub use stack::EventStack;

/// 事件标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// 事件生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// 已创建但从未播放
    #[default]
    Inert,
    /// 正在运行（在事件栈中）
    Active,
    /// 已完成，续体已交出
    Completed,
    /// 被停止，续体被丢弃
    Stopped,
}

/// 事件完成后要做的事
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Next {
    /// 什么都不做
    #[default]
    Nothing,
    /// 推进序列的游标
    Advance(EventId),
    /// 完成拥有者（其嵌套的后续对话已结束）
    Finish(EventId),
    /// 交给场景状态机
    Scene(SceneCue),
    /// 退出确认框的结果
    ExitPrompt,
    /// 向宿主发布通知
    Emit(Notice),
}

/// 交给续体的完成值
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    None,
    /// 选中的序号（选项、菜单、确认框按钮）
    Index(usize),
    /// 输入的文本（键盘）
    Text(String),
}

impl Outcome {
    pub fn index(&self) -> Option<usize> {
        match self {
            Outcome::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// 事件的生命周期状态与续体
#[derive(Debug, Clone, Default)]
pub struct EventCore {
    lifecycle: Lifecycle,
    on_complete: Next,
}

impl EventCore {
    pub fn new(on_complete: Next) -> Self {
        Self {
            lifecycle: Lifecycle::Inert,
            on_complete,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// 替换续体（序列接管步骤事件时使用）
    pub fn set_on_complete(&mut self, next: Next) {
        self.on_complete = next;
    }

    /// 开始播放，只有从未播放过的事件可以开始
    pub fn play(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Inert {
            return false;
        }
        self.lifecycle = Lifecycle::Active;
        true
    }

    /// 停止，丢弃续体
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.lifecycle = Lifecycle::Stopped;
        self.on_complete = Next::Nothing;
        true
    }

    /// 完成并交出续体；非活跃事件返回 None
    pub fn complete(&mut self) -> Option<Next> {
        if !self.is_active() {
            return None;
        }
        self.lifecycle = Lifecycle::Completed;
        Some(std::mem::take(&mut self.on_complete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_then_complete_fires_once() {
        let mut core = EventCore::new(Next::Advance(EventId(7)));
        assert!(core.play());
        assert!(core.is_active());

        assert_eq!(core.complete(), Some(Next::Advance(EventId(7))));
        assert_eq!(core.lifecycle(), Lifecycle::Completed);
        assert!(!core.is_active());

        // 重复完成是无操作
        assert_eq!(core.complete(), None);
    }

    #[test]
    fn test_complete_inert_is_noop() {
        let mut core = EventCore::new(Next::ExitPrompt);
        assert_eq!(core.complete(), None);
        assert_eq!(core.lifecycle(), Lifecycle::Inert);
    }

    #[test]
    fn test_stop_discards_continuation() {
        let mut core = EventCore::new(Next::ExitPrompt);
        core.play();
        assert!(core.stop());
        assert!(!core.stop());
        assert_eq!(core.complete(), None);
        assert_eq!(core.lifecycle(), Lifecycle::Stopped);
    }

    #[test]
    fn test_play_is_not_replayable() {
        let mut core = EventCore::default();
        assert!(core.play());
        assert!(!core.play());
        core.complete();
        assert!(!core.play());
    }

    #[test]
    fn test_outcome_accessors() {
        assert_eq!(Outcome::Index(2).index(), Some(2));
        assert_eq!(Outcome::Text("ABC".to_string()).text(), Some("ABC"));
        assert_eq!(Outcome::None.index(), None);
    }
}
