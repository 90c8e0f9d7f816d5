//! 带语音音节的对话窗口
//!
//! 文字按配置的速度逐字显现，每显现一定数量的字符播放一次语音音节。
//! 没有自动推进：只有玩家按确认或点击才会完成。

use crate::backend::{Cue, Layer, Visual};
use crate::config::TextConfig;
use crate::event::Outcome;
use crate::input::InputEvent;
use crate::widget::{Behavior, Ctx, Reaction};

use super::text::{Rendered, wrap};

/// 台词的说话者
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Speaker {
    /// 标题栏显示的名字（None 表示旁白）
    pub title: Option<String>,
    /// 标题靠右（角色）还是靠左（玩家）
    pub title_right: bool,
    /// 语音库
    pub voice: Option<String>,
}

impl Speaker {
    /// 场景角色
    pub fn character(name: &str, voice: Option<String>) -> Self {
        Self {
            title: Some(name.to_string()),
            title_right: true,
            voice,
        }
    }

    /// 玩家自己
    pub fn player(name: &str, voice: Option<String>) -> Self {
        Self {
            title: (!name.is_empty()).then(|| name.to_string()),
            title_right: false,
            voice,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoiceDialog {
    speaker: Speaker,
    text: String,
    lines: Vec<String>,
    total: usize,
    revealed: f32,
    chars_per_second: f32,
    chars_per_blip: usize,
    /// 已经触发过的音节数（包括因音效占用而跳过的）
    blips: usize,
    cues: Vec<Cue>,
}

impl VoiceDialog {
    pub fn new(rendered: Rendered, speaker: Speaker, config: &TextConfig) -> Self {
        let lines = wrap(&rendered.text, config.line_chars);
        let total = lines.iter().map(|line| line.chars().count()).sum();
        Self {
            speaker,
            text: rendered.text,
            lines,
            total,
            revealed: 0.0,
            chars_per_second: config.chars_per_second,
            chars_per_blip: config.chars_per_blip.max(1),
            blips: 0,
            cues: rendered.cues,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    /// 已显现的字符数
    pub fn shown(&self) -> usize {
        (self.revealed as usize).min(self.total)
    }

    pub fn is_fully_shown(&self) -> bool {
        self.shown() >= self.total
    }

    /// 需要时播放下一个音节；音效仍在播放时跳过，不排队
    fn blip(&mut self, ctx: &mut Ctx<'_>) {
        let due = self.shown() / self.chars_per_blip + 1;
        if due <= self.blips {
            return;
        }
        self.blips = due;
        let Some(bank) = &self.speaker.voice else {
            return;
        };
        if ctx.backend.is_cue_playing() {
            tracing::trace!(blip = due - 1, "音效占用中，跳过语音音节");
            return;
        }
        ctx.play_cue(Cue::Voice {
            bank: bank.clone(),
            blip: due - 1,
        });
    }
}

impl Behavior for VoiceDialog {
    fn on_play(&mut self, ctx: &mut Ctx<'_>) {
        for cue in std::mem::take(&mut self.cues) {
            ctx.play_cue(cue);
        }
        self.blip(ctx);
    }

    fn on_input(&mut self, event: &InputEvent, _ctx: &mut Ctx<'_>) -> Reaction {
        match event {
            InputEvent::Select | InputEvent::Click(_) => Reaction::Complete(Outcome::None),
            _ => Reaction::Pass,
        }
    }

    fn advance(&mut self, dt: f32, ctx: &mut Ctx<'_>) -> Reaction {
        if self.is_fully_shown() {
            return Reaction::Pass;
        }
        let before = self.shown();
        self.revealed += ctx.step_seconds(dt) * self.chars_per_second;
        if self.shown() != before {
            ctx.mark_dirty();
            self.blip(ctx);
        }
        Reaction::Pass
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Dialog {
            title: self.speaker.title.clone(),
            title_right: self.speaker.title_right,
            lines: self.lines.clone(),
            revealed: self.shown(),
            total: self.total,
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Upper)
    }
}
