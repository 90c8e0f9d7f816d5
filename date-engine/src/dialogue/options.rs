//! 选项对话框
//!
//! 选中后不立即完成：引擎先播放玩家的补充台词与角色回应，
//! 全部结束后才以选中的序号完成。
//! 选项文本中标记触发的音效在该项被选中时播放。

use crate::backend::{Cue, Layer, Visual};
use crate::config::ScreenConfig;
use crate::event::Outcome;
use crate::geometry::{Rect, hit, option_rects};
use crate::input::InputEvent;
use crate::widget::{Behavior, Ctx, Followup, Reaction};

use super::content::DialogOption;
use super::menu::ListCursor;

#[derive(Debug, Clone)]
pub struct OptionDialog {
    /// 显示顺序（可能已洗牌）
    options: Vec<DialogOption>,
    cursor: ListCursor,
    rects: Vec<Rect>,
    /// 与 `options` 一一对应：选中该项时播放的音效
    cues: Vec<Vec<Cue>>,
    chosen: Option<usize>,
}

impl OptionDialog {
    pub fn new(options: Vec<DialogOption>, screen: &ScreenConfig) -> Self {
        let rects = option_rects(screen, options.len());
        Self {
            cursor: ListCursor::new(options.len()),
            cues: vec![Vec::new(); options.len()],
            options,
            rects,
            chosen: None,
        }
    }

    /// 由已替换标记的台词构造，保留每项的音效
    pub fn from_rendered(options: Vec<(DialogOption, Vec<Cue>)>, screen: &ScreenConfig) -> Self {
        let (options, cues): (Vec<_>, Vec<_>) = options.into_iter().unzip();
        Self {
            cues,
            ..Self::new(options, screen)
        }
    }

    pub fn options(&self) -> &[DialogOption] {
        &self.options
    }

    /// 按显示顺序的选项文本
    pub fn items(&self) -> Vec<String> {
        self.options.iter().map(|o| o.message.clone()).collect()
    }

    pub fn highlighted(&self) -> usize {
        self.cursor.index()
    }

    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    /// 选中第 `index` 项，越界时忽略
    pub fn choose(&mut self, index: usize, ctx: &mut Ctx<'_>) -> Reaction {
        let Some(option) = self.options.get(index) else {
            tracing::debug!(index, count = self.options.len(), "选项序号越界，忽略");
            return Reaction::Handled;
        };
        let followup = Followup {
            index,
            score: option.score,
            extra: option.extra.clone(),
            response: option.response.clone(),
        };
        self.chosen = Some(index);
        ctx.click();
        for cue in self.cues.get(index).into_iter().flatten() {
            ctx.play_cue(cue.clone());
        }
        ctx.mark_dirty();
        Reaction::Chain(followup)
    }
}

impl Behavior for OptionDialog {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        // 已选中，正在播放后续台词
        if self.chosen.is_some() {
            return Reaction::Pass;
        }
        match *event {
            InputEvent::PointerMove(point) => {
                // 悬停只高亮，不阻止传播
                if let Some(index) = hit(&self.rects, point)
                    && self.cursor.set(index)
                {
                    ctx.mark_dirty();
                }
                Reaction::Pass
            }
            InputEvent::Click(point) => match hit(&self.rects, point) {
                Some(index) => self.choose(index, ctx),
                None => Reaction::Pass,
            },
            InputEvent::Direction(direction) => {
                if self.cursor.step(direction) {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            InputEvent::Select => self.choose(self.cursor.index(), ctx),
            _ => Reaction::Pass,
        }
    }

    fn visual(&self) -> Option<Visual> {
        if self.chosen.is_some() {
            return None;
        }
        Some(Visual::Options {
            items: self.items(),
            highlighted: self.cursor.index(),
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Upper)
    }

    fn settled(&self) -> Outcome {
        match self.chosen {
            Some(index) => Outcome::Index(index),
            None => Outcome::None,
        }
    }
}
