//! 输入路由与时间推进
//!
//! ## 投递规则
//!
//! - 输入按事件栈快照的顺序从前往后投递，第一个不返回 `Pass` 的事件截断传播
//! - 指针移动只用于悬停高亮，组件对它总是返回 `Pass`，所以会投递给所有人
//! - 模态确认框位于栈首并吞掉所有输入，后面的事件收不到任何输入
//! - 投递期间事件可能被完成或丢弃，因此每一步都重新检查是否仍然活跃

use tracing::{debug, info, trace};

use crate::backend::Backend;
use crate::dialogue::Prompt;
use crate::event::{EventId, Next, Outcome};
use crate::input::{InputEvent, InputSample};
use crate::scene::SceneKind;
use crate::widget::{Behavior, Ctx, Reaction, Widget};

use super::{Engine, Owner};

impl<B: Backend> Engine<B> {
    pub(crate) fn route_input(&mut self, sample: &InputSample) {
        let events = sample.events(self.last_pointer);
        if let Some(point) = sample.pointer {
            self.last_pointer = Some(point);
        }
        for event in events {
            self.dispatch(&event);
        }
    }

    /// 投递一个输入事件，返回是否被处理
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        for id in self.stack.snapshot() {
            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            if !slot.core.is_active() {
                continue;
            }
            let mut ctx = Ctx::new(&self.config, &mut self.backend);
            let reaction = slot.widget.on_input(event, &mut ctx);
            if ctx.is_dirty() {
                self.sync_visual(id);
            }
            if reaction.stops() {
                trace!(%id, ?event, ?reaction, "输入被处理");
                self.react(id, reaction);
                return true;
            }
        }
        if !event.is_broadcast() {
            debug!(?event, "没有事件处理该输入");
        }
        false
    }

    /// 推进所有活跃事件的时间
    pub(crate) fn advance_time(&mut self, dt: f32) {
        for id in self.stack.snapshot() {
            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            if !slot.core.is_active() {
                continue;
            }
            let mut ctx = Ctx::new(&self.config, &mut self.backend);
            let reaction = slot.widget.advance(dt, &mut ctx);
            if ctx.is_dirty() {
                self.sync_visual(id);
            }
            if reaction.stops() {
                self.react(id, reaction);
            }
        }
    }

    fn react(&mut self, id: EventId, reaction: Reaction) {
        match reaction {
            Reaction::Pass | Reaction::Handled => {}
            Reaction::Complete(outcome) => {
                self.complete(id, outcome);
            }
            Reaction::Chain(followup) => self.on_choice(id, followup),
            Reaction::ConfirmExit => self.open_exit_prompt(),
        }
    }

    /// 打开"返回标题？"确认框；已有模态框时忽略
    fn open_exit_prompt(&mut self) {
        if self.stack.has_modal() {
            debug!("已有确认框打开，忽略退出请求");
            return;
        }
        let prompt = Widget::Prompt(Prompt::yes_no("Return to title?", &self.config.screen));
        let id = self.insert(prompt, Next::ExitPrompt, Owner::Global);
        self.play(id);
    }

    pub(crate) fn on_exit_prompt(&mut self, outcome: Outcome) {
        if outcome.index() == Some(0) {
            self.exit_to_title();
        } else {
            debug!("取消返回标题");
        }
    }

    /// 拆除除退出按钮外的一切，回到标题
    fn exit_to_title(&mut self) {
        info!("返回标题画面");
        let doomed: Vec<EventId> = self
            .slots
            .keys()
            .copied()
            .filter(|id| Some(*id) != self.exit_button)
            .collect();
        for id in doomed {
            self.discard(id);
        }
        self.stop_scene();
        self.state.reset();
        self.history.clear();
        self.start_scene_logged(SceneKind::Title);
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::RecordingBackend;
    use crate::config::EngineConfig;
    use crate::dialogue::{CharacterScript, ContentLibrary, Prompt};
    use crate::engine::{Engine, Notice};
    use crate::event::{Next, Outcome};
    use crate::input::{Direction, InputEvent, InputSample};
    use crate::widget::Widget;

    fn engine() -> Engine<RecordingBackend> {
        let intro =
            CharacterScript::from_json("intro", r#"{ "name": "Host", "dialogue": ["Hi"] }"#)
                .unwrap();
        let level =
            CharacterScript::from_json("01-a", r#"{ "name": "A", "dialogue": ["Hi"] }"#).unwrap();
        let content = ContentLibrary::new(intro, vec![level]).unwrap();
        Engine::new(EngineConfig::default(), content, RecordingBackend::new()).unwrap()
    }

    #[test]
    fn test_unhandled_input_returns_false() {
        let mut engine = engine();
        assert!(!engine.dispatch(&InputEvent::Direction(Direction::Up)));
        assert!(!engine.dispatch(&InputEvent::Select));
    }

    #[test]
    fn test_modal_prompt_swallows_input() {
        let mut engine = engine();
        let screen = engine.config().screen.clone();
        let background = engine.spawn(
            Widget::Prompt(Prompt::yes_no("bg", &screen)),
            Next::Emit(Notice::Custom("bg".to_string())),
        );
        engine.play(background);
        let front = engine.spawn(
            Widget::Prompt(Prompt::yes_no("front", &screen)),
            Next::Emit(Notice::Custom("front".to_string())),
        );
        engine.play(front);
        assert_eq!(engine.stack().front(), Some(front));

        engine.advance(&InputSample::select(), 0.0);
        assert_eq!(
            engine.drain_notices(),
            vec![Notice::Custom("front".to_string())]
        );
        assert!(engine.is_active(background));
    }

    #[test]
    fn test_escape_opens_single_exit_prompt() {
        let mut engine = engine();
        engine.advance(&InputSample::escape(), 0.0);
        let prompts = engine.find_active("prompt");
        assert_eq!(prompts.len(), 1);

        // 确认框打开时再按 Esc 不会叠加第二个
        engine.advance(&InputSample::escape(), 0.0);
        assert_eq!(engine.find_active("prompt"), prompts);

        // 选 No 关闭确认框
        engine.advance(&InputSample::direction(Direction::Right), 0.0);
        engine.advance(&InputSample::select(), 0.0);
        assert!(engine.find_active("prompt").is_empty());
        assert!(engine.exit_button().is_some_and(|id| engine.is_active(id)));
    }

    #[test]
    fn test_exit_prompt_yes_returns_to_title() {
        let mut engine = engine();
        engine.start().unwrap();
        engine.advance(&InputSample::escape(), 0.0);
        let prompt = engine.find_active("prompt")[0];
        engine.complete(prompt, Outcome::Index(0));
        assert_eq!(
            engine.scene().map(|scene| scene.kind()),
            Some(crate::scene::SceneKind::Title)
        );
        assert!(engine.find_active("prompt").is_empty());
    }
}
