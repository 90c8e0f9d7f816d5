//! 标题场景

use tracing::info;

use crate::animation::Fade;
use crate::backend::Backend;
use crate::dialogue::{MENU_PLAY, MENU_QUIT, TitleMenu};
use crate::engine::{Engine, Notice, StepSpec};
use crate::event::{Next, Outcome};
use crate::widget::Widget;

use super::SceneAction;

impl<B: Backend> Engine<B> {
    /// 反向转场后显示菜单
    pub(super) fn enter_title(&mut self) {
        let fade = Widget::Fade(Fade::new(&self.config.fade, &self.config.timing, true));
        let steps = vec![
            StepSpec::Widget(fade),
            StepSpec::Widget(Widget::TitleMenu(TitleMenu::new(&self.config.screen))),
            StepSpec::Action(self.scene_cue(SceneAction::TitleChoice)),
        ];
        let seq = self.sequence(steps, Next::Nothing);
        self.play(seq);
    }

    fn show_title_menu(&mut self) {
        let steps = vec![
            StepSpec::Widget(Widget::TitleMenu(TitleMenu::new(&self.config.screen))),
            StepSpec::Action(self.scene_cue(SceneAction::TitleChoice)),
        ];
        let seq = self.sequence(steps, Next::Nothing);
        self.play(seq);
    }

    pub(super) fn on_title_choice(&mut self, outcome: Outcome) {
        match outcome.index() {
            Some(MENU_PLAY) => self.finish_scene(),
            Some(MENU_QUIT) => {
                info!("玩家选择退出");
                self.push_notice(Notice::QuitRequested);
                // 宿主负责真正退出；不退出时菜单仍然可用
                self.show_title_menu();
            }
            _ => self.show_title_menu(),
        }
    }
}
