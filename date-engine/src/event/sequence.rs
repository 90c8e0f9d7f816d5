//! 序列组合子
//!
//! "先 A，再 B，再 C"：步骤可以是一个事件，也可以是一个立即执行的动作。
//! 序列本身只是游标与步骤表，推进逻辑在引擎里（`Engine::run_sequence`），
//! 因为动作可能创建新事件或切换场景。

use super::{EventId, Next, Outcome};

/// 序列的一个步骤
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// 等待该事件完成
    Event(EventId),
    /// 立即执行，接收上一个事件步骤的完成值
    Action(Next),
}

/// 序列状态
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    steps: Vec<Step>,
    cursor: usize,
    /// 最近一个事件步骤的完成值
    last: Outcome,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            cursor: 0,
            last: Outcome::None,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// 当前步骤
    pub fn current(&self) -> Option<&Step> {
        self.steps.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 游标后移一步
    pub fn step_forward(&mut self) {
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// 记录刚完成的事件步骤的结果
    pub fn set_last(&mut self, outcome: Outcome) {
        self.last = outcome;
    }

    pub fn last(&self) -> &Outcome {
        &self.last
    }

    /// 所有事件步骤（序列拥有它们）
    pub fn event_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.steps.iter().filter_map(|step| match step {
            Step::Event(id) => Some(*id),
            Step::Action(_) => None,
        })
    }
}
