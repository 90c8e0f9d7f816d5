//! 结果页：每关一根柱子

use crate::backend::{Layer, ResultBar, Visual};
use crate::event::Outcome;
use crate::input::InputEvent;
use crate::widget::{Behavior, Ctx, Reaction};

#[derive(Debug, Clone)]
pub struct Results {
    bars: Vec<ResultBar>,
}

impl Results {
    /// `entries` 为 (角色名, 得分)，`best` 为最高分关卡
    pub fn new(entries: Vec<(String, i32)>, best: Option<usize>) -> Self {
        let bars = entries
            .into_iter()
            .enumerate()
            .map(|(index, (name, score))| ResultBar {
                name,
                score,
                best: best == Some(index),
            })
            .collect();
        Self { bars }
    }

    pub fn bars(&self) -> &[ResultBar] {
        &self.bars
    }
}

impl Behavior for Results {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        match event {
            InputEvent::Select | InputEvent::Click(_) => {
                ctx.click();
                Reaction::Complete(Outcome::None)
            }
            _ => Reaction::Pass,
        }
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Results {
            bars: self.bars.clone(),
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Upper)
    }
}
