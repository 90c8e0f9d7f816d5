//! 结局：得分最高的角色登场，说完结局台词后显示结果页

use tracing::info;

use crate::backend::Backend;
use crate::dialogue::Results;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::widget::Widget;

use super::{SceneAction, ScenePlan};

impl<B: Backend> Engine<B> {
    pub(super) fn epilogue_plan(&self) -> EngineResult<ScenePlan> {
        let best = self.state.best_level().unwrap_or(0);
        let script = self.content.level(best)?;
        info!(level = best, name = %script.name, "结局角色");
        Ok(ScenePlan {
            speaker: script.name.clone(),
            voice: script.voice.clone(),
            bitmap: script.bitmap.clone(),
            transparent: script.bitmap_transparent,
            nodes: script.epilogue.clone(),
            shuffle: true,
        })
    }

    pub(super) fn show_results(&mut self) {
        let entries = self
            .content
            .levels()
            .iter()
            .zip(self.state.ledger())
            .map(|(script, score)| (script.name.clone(), *score))
            .collect();
        let results = Widget::Results(Results::new(entries, self.state.best_level()));
        let next = self.scene_cue(SceneAction::ResultsDone);
        let id = self.spawn(results, next);
        self.play(id);
    }
}
