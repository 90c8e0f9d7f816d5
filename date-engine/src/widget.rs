//! # Widget 模块
//!
//! 所有可以进入事件栈的具体组件的统一能力接口。
//!
//! ## 设计说明
//!
//! - [`Behavior`] 是每种组件各自实现的能力：播放、处理输入、随时间推进、描述画面
//! - [`Widget`] 是所有具体组件的标签枚举，引擎只和它打交道
//! - 组件不直接完成自己，而是返回 [`Reaction`]，由引擎执行完成/续体
//! - 组件只允许触碰自己的渲染句柄（Animator 例外：它驱动场景立绘的位置）

use crate::animation::{Animator, Fade};
use crate::backend::{Backend, Cue, Layer, RenderHandle, Visual};
use crate::config::{EngineConfig, TimingModel};
use crate::dialogue::{
    ExitButton, Keyboard, OptionDialog, Prompt, Results, TitleMenu, VoiceDialog,
};
use crate::event::{Outcome, Sequence};
use crate::input::InputEvent;

/// 组件对一次输入或一次推进的反应
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// 未处理，继续投递给下一个
    Pass,
    /// 已处理，停止传播
    Handled,
    /// 已处理，并以该值完成
    Complete(Outcome),
    /// 已处理，需要先播放后续对话再完成（选项）
    Chain(Followup),
    /// 已处理，请求打开退出确认框
    ConfirmExit,
}

impl Reaction {
    /// 是否阻止继续传播
    pub fn stops(&self) -> bool {
        !matches!(self, Reaction::Pass)
    }
}

/// 选项被选中后的后续内容
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Followup {
    /// 显示顺序中的序号
    pub index: usize,
    /// 得分增量
    pub score: i32,
    /// 玩家自己说的补充台词
    pub extra: Vec<String>,
    /// 角色的回应
    pub response: Vec<String>,
}

impl Followup {
    pub fn is_empty(&self) -> bool {
        self.extra.is_empty() && self.response.is_empty()
    }
}

/// 组件调用期间可用的上下文
pub struct Ctx<'a> {
    pub config: &'a EngineConfig,
    pub backend: &'a mut dyn Backend,
    dirty: bool,
}

impl<'a> Ctx<'a> {
    pub fn new(config: &'a EngineConfig, backend: &'a mut dyn Backend) -> Self {
        Self {
            config,
            backend,
            dirty: false,
        }
    }

    /// 画面内容已变化，需要同步给后端
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 本次推进应计入的时间：按帧模型时固定为一帧
    pub fn step_seconds(&self, dt: f32) -> f32 {
        match self.config.timing.model {
            TimingModel::Frames => self.config.frame_seconds(),
            TimingModel::Delta => dt.max(0.0),
        }
    }

    pub fn play_cue(&mut self, cue: Cue) {
        self.backend.play_cue(&cue);
    }

    /// 确认选择时的点击音
    pub fn click(&mut self) {
        if let Some(name) = &self.config.audio.click {
            self.backend.play_cue(&Cue::Sfx(name.clone()));
        }
    }
}

/// 组件能力
///
/// 所有方法都有默认实现，组件只需覆盖自己关心的部分。
pub trait Behavior {
    /// 被播放时调用（渲染句柄已挂载）
    fn on_play(&mut self, _ctx: &mut Ctx<'_>) {}

    /// 处理一个输入
    fn on_input(&mut self, _event: &InputEvent, _ctx: &mut Ctx<'_>) -> Reaction {
        Reaction::Pass
    }

    /// 随时间推进
    fn advance(&mut self, _dt: f32, _ctx: &mut Ctx<'_>) -> Reaction {
        Reaction::Pass
    }

    /// 当前画面，None 表示不需要挂载
    fn visual(&self) -> Option<Visual> {
        None
    }

    /// 挂载到哪一层
    fn layer(&self) -> Option<Layer> {
        None
    }

    /// 是否为模态（插入事件栈最前面）
    fn is_modal(&self) -> bool {
        false
    }

    /// 嵌套后续内容结束后用来完成自己的值
    fn settled(&self) -> Outcome {
        Outcome::None
    }
}

/// 所有可以进入事件栈的组件
#[derive(Debug, Clone)]
pub enum Widget {
    Animator(Animator),
    Fade(Fade),
    Voice(VoiceDialog),
    Options(OptionDialog),
    Keyboard(Keyboard),
    Prompt(Prompt),
    TitleMenu(TitleMenu),
    Results(Results),
    ExitButton(ExitButton),
    /// 序列由引擎直接推进，自身不处理输入
    Sequence(Sequence),
}

impl Widget {
    /// 种类名，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Animator(_) => "animator",
            Widget::Fade(_) => "fade",
            Widget::Voice(_) => "voice_dialog",
            Widget::Options(_) => "option_dialog",
            Widget::Keyboard(_) => "keyboard",
            Widget::Prompt(_) => "prompt",
            Widget::TitleMenu(_) => "title_menu",
            Widget::Results(_) => "results",
            Widget::ExitButton(_) => "exit_button",
            Widget::Sequence(_) => "sequence",
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Widget::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Widget::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    fn behavior(&self) -> Option<&dyn Behavior> {
        match self {
            Widget::Animator(w) => Some(w),
            Widget::Fade(w) => Some(w),
            Widget::Voice(w) => Some(w),
            Widget::Options(w) => Some(w),
            Widget::Keyboard(w) => Some(w),
            Widget::Prompt(w) => Some(w),
            Widget::TitleMenu(w) => Some(w),
            Widget::Results(w) => Some(w),
            Widget::ExitButton(w) => Some(w),
            Widget::Sequence(_) => None,
        }
    }

    fn behavior_mut(&mut self) -> Option<&mut dyn Behavior> {
        match self {
            Widget::Animator(w) => Some(w),
            Widget::Fade(w) => Some(w),
            Widget::Voice(w) => Some(w),
            Widget::Options(w) => Some(w),
            Widget::Keyboard(w) => Some(w),
            Widget::Prompt(w) => Some(w),
            Widget::TitleMenu(w) => Some(w),
            Widget::Results(w) => Some(w),
            Widget::ExitButton(w) => Some(w),
            Widget::Sequence(_) => None,
        }
    }
}

impl Behavior for Widget {
    fn on_play(&mut self, ctx: &mut Ctx<'_>) {
        if let Some(behavior) = self.behavior_mut() {
            behavior.on_play(ctx);
        }
    }

    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        match self.behavior_mut() {
            Some(behavior) => behavior.on_input(event, ctx),
            None => Reaction::Pass,
        }
    }

    fn advance(&mut self, dt: f32, ctx: &mut Ctx<'_>) -> Reaction {
        match self.behavior_mut() {
            Some(behavior) => behavior.advance(dt, ctx),
            None => Reaction::Pass,
        }
    }

    fn visual(&self) -> Option<Visual> {
        self.behavior().and_then(|behavior| behavior.visual())
    }

    fn layer(&self) -> Option<Layer> {
        self.behavior().and_then(|behavior| behavior.layer())
    }

    fn is_modal(&self) -> bool {
        self.behavior().is_some_and(|behavior| behavior.is_modal())
    }

    fn settled(&self) -> Outcome {
        self.behavior()
            .map(|behavior| behavior.settled())
            .unwrap_or_default()
    }
}

/// 组件挂载信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mount {
    pub handle: RenderHandle,
    pub layer: Layer,
    pub attached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::event::Step;

    #[test]
    fn test_reaction_stops() {
        assert!(!Reaction::Pass.stops());
        assert!(Reaction::Handled.stops());
        assert!(Reaction::Complete(Outcome::None).stops());
        assert!(Reaction::ConfirmExit.stops());
    }

    #[test]
    fn test_sequence_widget_is_inert_to_input() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut widget = Widget::Sequence(Sequence::new(vec![Step::Action(
            crate::event::Next::Nothing,
        )]));
        assert_eq!(widget.on_input(&InputEvent::Select, &mut ctx), Reaction::Pass);
        assert_eq!(widget.visual(), None);
        assert!(!widget.is_modal());
        assert_eq!(widget.kind(), "sequence");
    }

    #[test]
    fn test_step_seconds_follows_timing_model() {
        let mut config = EngineConfig::default();
        let mut backend = RecordingBackend::new();

        config.timing.model = TimingModel::Frames;
        let ctx = Ctx::new(&config, &mut backend);
        assert!((ctx.step_seconds(5.0) - 1.0 / 30.0).abs() < 1e-6);

        let mut config = EngineConfig::default();
        config.timing.model = TimingModel::Delta;
        let ctx = Ctx::new(&config, &mut backend);
        assert_eq!(ctx.step_seconds(0.25), 0.25);
        assert_eq!(ctx.step_seconds(-1.0), 0.0);
    }

    #[test]
    fn test_click_cue_optional() {
        let mut config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        Ctx::new(&config, &mut backend).click();
        assert_eq!(backend.cues().len(), 1);

        config.audio.click = None;
        let mut backend = RecordingBackend::new();
        Ctx::new(&config, &mut backend).click();
        assert!(backend.cues().is_empty());
    }
}
