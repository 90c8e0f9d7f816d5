//! 开场：对话结束后用屏幕键盘输入名字

use tracing::{debug, info};

use crate::backend::Backend;
use crate::dialogue::Keyboard;
use crate::engine::{Engine, Notice};
use crate::event::Outcome;
use crate::history::HistoryEvent;
use crate::widget::Widget;

use super::SceneAction;

impl<B: Backend> Engine<B> {
    pub(super) fn open_name_entry(&mut self) {
        let keyboard = Widget::Keyboard(Keyboard::new(&self.config.keyboard, &self.config.screen));
        let next = self.scene_cue(SceneAction::NameEntered);
        let id = self.spawn(keyboard, next);
        self.play(id);
    }

    pub(super) fn on_name_entered(&mut self, outcome: Outcome) {
        let Outcome::Text(name) = outcome else {
            debug!(?outcome, "键盘没有返回文本，忽略");
            return;
        };
        info!(name = %name, "玩家输入了名字");
        self.state.player_name = name.clone();
        self.history.push(HistoryEvent::NameEntered {
            name: name.clone(),
            tick: self.tick,
        });
        self.push_notice(Notice::NameEntered(name));
        self.finish_scene();
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::RecordingBackend;
    use crate::config::EngineConfig;
    use crate::dialogue::{CharacterScript, ContentLibrary};
    use crate::engine::{Engine, Notice};
    use crate::input::InputSample;
    use crate::scene::SceneKind;

    #[test]
    fn test_keyboard_after_intro_dialogue() {
        let intro = CharacterScript::from_json(
            "intro",
            r#"{ "name": "Host", "dialogue": ["What's your name?"] }"#,
        )
        .unwrap();
        let level =
            CharacterScript::from_json("01-a", r#"{ "name": "A", "dialogue": ["Hi"] }"#).unwrap();
        let content = ContentLibrary::new(intro, vec![level]).unwrap();
        let mut engine =
            Engine::new(EngineConfig::default(), content, RecordingBackend::new()).unwrap();

        engine.start_scene(SceneKind::Intro).unwrap();
        engine.advance(&InputSample::none(), 1.0);
        assert_eq!(engine.find_active("voice_dialog").len(), 1);

        engine.advance(&InputSample::select(), 0.0);
        assert_eq!(engine.find_active("keyboard").len(), 1);

        // 空名字时确认无效
        engine.advance(&InputSample::typed("\n"), 0.0);
        assert_eq!(engine.find_active("keyboard").len(), 1);

        engine.advance(&InputSample::typed("ABC\n"), 0.0);
        assert_eq!(engine.state().player_name, "ABC");
        assert!(engine.drain_notices().contains(&Notice::NameEntered("ABC".to_string())));
        assert!(engine.find_active("keyboard").is_empty());
        assert!(engine.scene().unwrap().is_completing());
    }
}
