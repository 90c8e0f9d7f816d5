//! 对话树推进与选项处理
//!
//! Intro、Level 与 Epilogue 共用同一套节点推进逻辑，只有节点耗尽后的
//! 收尾不同。

use rand::seq::SliceRandom;
use tracing::debug;

use crate::backend::Backend;
use crate::dialogue::{DialogueNode, OptionDialog, Speaker, VoiceDialog, substitute};
use crate::engine::{Engine, Owner, StepSpec};
use crate::event::{EventId, Next, Outcome};
use crate::history::HistoryEvent;
use crate::widget::{Followup, Widget};

use super::{SceneAction, SceneKind};

impl<B: Backend> Engine<B> {
    /// 播放下一个对话节点；节点耗尽时进入场景收尾
    pub(super) fn next_dialog(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if scene.completing {
            return;
        }
        let node = scene.nodes.get(scene.cursor).cloned();
        scene.cursor += 1;
        let kind = scene.kind;
        let speaker = Speaker::character(&scene.speaker, scene.voice.clone());
        let shuffle = scene.shuffle;

        let next = self.scene_cue(SceneAction::NextDialog);
        match node {
            Some(DialogueNode::Message(text)) => {
                let rendered = substitute(&text, &self.state.player_name, &self.config.audio);
                let widget = Widget::Voice(VoiceDialog::new(rendered, speaker, &self.config.text));
                let id = self.spawn(widget, next);
                self.play(id);
            }
            Some(DialogueNode::Options(mut options)) => {
                if shuffle {
                    options.shuffle(&mut self.rng);
                }
                let name = &self.state.player_name;
                let rendered = options
                    .into_iter()
                    .map(|mut option| {
                        let shown = substitute(&option.message, name, &self.config.audio);
                        option.message = shown.text;
                        (option, shown.cues)
                    })
                    .collect();
                let widget =
                    Widget::Options(OptionDialog::from_rendered(rendered, &self.config.screen));
                let id = self.spawn(widget, next);
                self.play(id);
            }
            None => match kind {
                SceneKind::Title => {}
                SceneKind::Intro => self.open_name_entry(),
                SceneKind::Level(_) => self.finish_scene(),
                SceneKind::Epilogue => self.show_results(),
            },
        }
    }

    /// 选项被选中
    ///
    /// 关卡场景累计得分；有后续台词时由选项对话框拥有一个序列，
    /// 序列结束后选项对话框才以选中序号完成。
    pub(crate) fn on_choice(&mut self, id: EventId, followup: Followup) {
        let options = match self.widget(id) {
            Some(Widget::Options(dialog)) => dialog.items(),
            _ => Vec::new(),
        };
        self.history.push(HistoryEvent::ChoiceMade {
            options,
            selected_index: followup.index,
            score: followup.score,
            tick: self.tick,
        });

        if let Some(scene) = self.scene.as_mut()
            && matches!(scene.kind, SceneKind::Level(_))
        {
            scene.score += followup.score;
            debug!(delta = followup.score, total = scene.score, "累计得分");
        }

        if followup.is_empty() {
            self.complete(id, Outcome::Index(followup.index));
            return;
        }

        // 选项列表已经选定，先把它从画面上摘掉
        self.sync_visual(id);

        let player = Speaker::player(
            &self.state.player_name,
            self.config.audio.player_voice.clone(),
        );
        let character = match &self.scene {
            Some(scene) => Speaker::character(&scene.speaker, scene.voice.clone()),
            None => Speaker::default(),
        };
        let lines = followup
            .extra
            .iter()
            .map(|line| (line, &player))
            .chain(followup.response.iter().map(|line| (line, &character)));
        let steps: Vec<StepSpec> = lines
            .map(|(line, speaker)| {
                let rendered = substitute(line, &self.state.player_name, &self.config.audio);
                StepSpec::Widget(Widget::Voice(VoiceDialog::new(
                    rendered,
                    speaker.clone(),
                    &self.config.text,
                )))
            })
            .collect();

        let seq = self.build_sequence(steps, Next::Finish(id), Owner::Event(id));
        self.play(seq);
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{RecordingBackend, Visual};
    use crate::config::EngineConfig;
    use crate::dialogue::{CharacterScript, ContentLibrary};
    use crate::engine::Engine;
    use crate::history::HistoryEvent;
    use crate::input::{Direction, InputSample};
    use crate::scene::SceneKind;

    const LEVEL: &str = r#"{
        "name": "Ozzie",
        "voice": "ozzie",
        "dialogue": [
            "Hey {name}.",
            [
                { "message": ["Hi!", "Nice to meet you."], "score": 2, "response": "Likewise." },
                { "message": "Bye.", "score": -1 }
            ],
            "So..."
        ]
    }"#;

    fn engine() -> Engine<RecordingBackend> {
        let intro =
            CharacterScript::from_json("intro", r#"{ "name": "Host", "dialogue": ["Hi"] }"#)
                .unwrap();
        let level = CharacterScript::from_json("01-ozzie", LEVEL).unwrap();
        let content = ContentLibrary::new(intro, vec![level]).unwrap();
        let config = EngineConfig {
            shuffle_seed: Some(7),
            ..EngineConfig::default()
        };
        Engine::new(config, content, RecordingBackend::new()).unwrap()
    }

    fn enter_level(engine: &mut Engine<RecordingBackend>) {
        engine.start_scene(SceneKind::Level(0)).unwrap();
        engine.advance(&InputSample::none(), 1.0);
    }

    #[test]
    fn test_message_substitutes_player_name() {
        let mut engine = engine();
        engine.state_mut().player_name = "Sam".to_string();
        enter_level(&mut engine);
        let dialog = engine.find_active("voice_dialog")[0];
        match engine.visual(dialog) {
            Some(Visual::Dialog { lines, title, .. }) => {
                assert_eq!(lines, vec!["Hey Sam.".to_string()]);
                assert_eq!(title.as_deref(), Some("Ozzie"));
            }
            other => panic!("unexpected visual: {other:?}"),
        }
    }

    #[test]
    fn test_choice_plays_followup_then_continues() {
        let mut engine = engine();
        enter_level(&mut engine);
        engine.advance(&InputSample::select(), 0.0);

        let dialog = engine.find_active("option_dialog")[0];
        let items = match engine.widget(dialog) {
            Some(crate::widget::Widget::Options(options)) => options.items(),
            _ => panic!("expected option dialog"),
        };
        let hi = items.iter().position(|item| item == "Hi!").unwrap();
        let bye = 1 - hi;
        if hi == 1 {
            engine.advance(&InputSample::direction(Direction::Down), 0.0);
        }
        engine.advance(&InputSample::select(), 0.0);
        assert_eq!(engine.scene().unwrap().score(), 2);

        // 选项仍在栈中，直到补充台词与回应都结束
        assert!(engine.is_active(dialog));
        let extra = engine.find_active("voice_dialog");
        assert_eq!(extra.len(), 1);
        match engine.visual(extra[0]) {
            Some(Visual::Dialog { title_right, .. }) => assert!(!title_right),
            other => panic!("unexpected visual: {other:?}"),
        }

        engine.advance(&InputSample::select(), 0.0);
        assert!(engine.is_active(dialog));
        engine.advance(&InputSample::select(), 0.0);
        assert!(!engine.is_active(dialog));

        // 回到主线："So..."
        let next = engine.find_active("voice_dialog");
        assert_eq!(next.len(), 1);
        assert!(matches!(
            engine.visual(next[0]),
            Some(Visual::Dialog { ref lines, .. }) if lines == &vec!["So...".to_string()]
        ));

        let choice = engine.history().choices().next().cloned().unwrap();
        match choice {
            HistoryEvent::ChoiceMade {
                selected_index,
                score,
                ..
            } => {
                assert_eq!(selected_index, hi);
                assert_eq!(score, 2);
                assert_ne!(selected_index, bye);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_level_leaves_after_last_node() {
        let mut engine = engine();
        enter_level(&mut engine);
        engine.advance(&InputSample::select(), 0.0);
        let dialog = engine.find_active("option_dialog")[0];
        // 直接选"Bye."：没有后续台词，立即完成
        let bye = match engine.widget(dialog) {
            Some(crate::widget::Widget::Options(options)) => {
                options.items().iter().position(|item| item == "Bye.").unwrap()
            }
            _ => panic!("expected option dialog"),
        };
        engine.complete(dialog, crate::event::Outcome::Index(bye));
        engine.advance(&InputSample::select(), 0.0);
        assert!(engine.scene().unwrap().is_completing());
    }
}
