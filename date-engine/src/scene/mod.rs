//! # Scene 模块
//!
//! 场景状态机：Title → Intro → Level(0..n) → Epilogue → Title。
//!
//! ## 核心概念
//!
//! - 任一时刻最多一个当前场景；`start_scene` 先停止旧场景再进入新场景
//! - 场景拥有它创建的所有事件，停止场景时一并丢弃
//! - 每个场景实例有一个代数标记 [`SceneToken`]，发给场景的续体都带着它；
//!   标记过期（场景已被替换）的续体直接丢弃
//!
//! ## 对话场景的流程
//!
//! ```text
//! 反向转场（揭开画面） → 立绘滑入 → 逐个对话节点 → 立绘滑出 → 正向转场（遮住画面） → 下一场景
//! ```

mod epilogue;
mod intro;
mod level;
mod title;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::animation::{Animator, Fade};
use crate::backend::{Backend, Layer, RenderHandle, Visual};
use crate::dialogue::DialogueNode;
use crate::engine::{Engine, Notice, StepSpec};
use crate::error::EngineResult;
use crate::event::{EventId, Next, Outcome};
use crate::geometry::Point;
use crate::history::HistoryEvent;
use crate::widget::Widget;

/// 场景种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKind {
    Title,
    Intro,
    /// 关卡序号（从 0 开始）
    Level(usize),
    Epilogue,
}

impl std::fmt::Display for SceneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneKind::Title => write!(f, "title"),
            SceneKind::Intro => write!(f, "intro"),
            SceneKind::Level(index) => write!(f, "level[{index}]"),
            SceneKind::Epilogue => write!(f, "epilogue"),
        }
    }
}

/// 场景实例的代数标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneToken(pub u64);

/// 发给场景的续体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCue {
    pub token: SceneToken,
    pub action: SceneAction,
}

/// 场景收到的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneAction {
    /// 入场动画结束
    Entered,
    /// 上一句对话结束
    NextDialog,
    /// 标题菜单做出选择
    TitleChoice,
    /// 键盘输入完成
    NameEntered,
    /// 结果页关闭
    ResultsDone,
    /// 离场动画结束，切换到下一场景
    Leave,
}

/// 当前场景
#[derive(Debug, Clone)]
pub struct Scene {
    kind: SceneKind,
    token: SceneToken,
    /// 场景拥有的事件
    pub(crate) events: Vec<EventId>,
    sprite: Option<RenderHandle>,
    /// 说话者显示名
    speaker: String,
    voice: Option<String>,
    nodes: Vec<DialogueNode>,
    cursor: usize,
    /// 本场景累计得分（只有关卡场景使用）
    score: i32,
    shuffle: bool,
    /// 已经开始离场
    completing: bool,
}

impl Scene {
    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn token(&self) -> SceneToken {
        self.token
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    pub fn sprite(&self) -> Option<RenderHandle> {
        self.sprite
    }

    /// 已经进入（或越过）的对话节点数
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_completing(&self) -> bool {
        self.completing
    }
}

/// 进入场景所需的内容
struct ScenePlan {
    speaker: String,
    voice: Option<String>,
    bitmap: Option<String>,
    transparent: Option<u8>,
    nodes: Vec<DialogueNode>,
    shuffle: bool,
}

impl ScenePlan {
    fn empty() -> Self {
        Self {
            speaker: String::new(),
            voice: None,
            bitmap: None,
            transparent: None,
            nodes: Vec::new(),
            shuffle: true,
        }
    }
}

impl<B: Backend> Engine<B> {
    /// 切换到指定场景
    ///
    /// 内容解析失败时保持当前场景不变并返回错误。
    pub fn start_scene(&mut self, kind: SceneKind) -> EngineResult<()> {
        let plan = match kind {
            SceneKind::Title => ScenePlan::empty(),
            SceneKind::Intro => {
                let script = self.content.intro();
                ScenePlan {
                    speaker: script.name.clone(),
                    voice: script.voice.clone(),
                    bitmap: script.bitmap.clone(),
                    transparent: script.bitmap_transparent,
                    nodes: script.dialogue.clone(),
                    shuffle: false,
                }
            }
            SceneKind::Level(index) => {
                let script = self.content.level(index)?;
                ScenePlan {
                    speaker: script.name.clone(),
                    voice: script.voice.clone(),
                    bitmap: script.bitmap.clone(),
                    transparent: script.bitmap_transparent,
                    nodes: script.dialogue.clone(),
                    shuffle: true,
                }
            }
            SceneKind::Epilogue => self.epilogue_plan()?,
        };

        self.stop_scene();
        self.scene_generation += 1;
        let token = SceneToken(self.scene_generation);
        self.scene = Some(Scene {
            kind,
            token,
            events: Vec::new(),
            sprite: None,
            speaker: plan.speaker,
            voice: plan.voice,
            nodes: plan.nodes,
            cursor: 0,
            score: 0,
            shuffle: plan.shuffle,
            completing: false,
        });

        info!(scene = %kind, token = token.0, "进入场景");
        self.history.push(HistoryEvent::SceneEntered {
            scene: kind,
            tick: self.tick,
        });
        self.push_notice(Notice::SceneStarted(kind));

        match kind {
            SceneKind::Title => self.enter_title(),
            _ => self.enter_dialogue(plan.bitmap, plan.transparent),
        }
        Ok(())
    }

    /// 在续体中切换场景，失败时只记录日志
    pub(crate) fn start_scene_logged(&mut self, kind: SceneKind) {
        if let Err(e) = self.start_scene(kind) {
            error!(scene = %kind, error = %e, "无法进入场景");
        }
    }

    /// 停止当前场景：丢弃它拥有的事件，摘下立绘
    pub fn stop_scene(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        debug!(scene = %scene.kind, events = scene.events.len(), "停止场景");
        for id in &scene.events {
            self.discard(*id);
        }
        if let Some(sprite) = scene.sprite {
            self.backend.detach(sprite, Layer::Lower);
        }
    }

    /// 当前场景的续体
    pub(crate) fn scene_cue(&self, action: SceneAction) -> Next {
        match &self.scene {
            Some(scene) => Next::Scene(SceneCue {
                token: scene.token,
                action,
            }),
            None => Next::Nothing,
        }
    }

    pub(crate) fn on_scene_cue(&mut self, cue: SceneCue, outcome: Outcome) {
        let Some(scene) = &self.scene else {
            debug!(?cue, "没有当前场景，丢弃续体");
            return;
        };
        if scene.token != cue.token {
            debug!(?cue, current = scene.token.0, "场景已被替换，丢弃续体");
            return;
        }
        match cue.action {
            SceneAction::Entered | SceneAction::NextDialog => self.next_dialog(),
            SceneAction::TitleChoice => self.on_title_choice(outcome),
            SceneAction::NameEntered => self.on_name_entered(outcome),
            SceneAction::ResultsDone => self.finish_scene(),
            SceneAction::Leave => self.on_leave(),
        }
    }

    /// 立绘隐藏（屏幕下沿之下）与显示时的位置
    fn sprite_positions(&self) -> (Point, Point) {
        let motion = &self.config.motion;
        let hidden = Point::new(motion.sprite_x, motion.sprite_y);
        let shown = Point::new(motion.sprite_x, motion.sprite_y - motion.sprite_height);
        (hidden, shown)
    }

    /// 对话场景入场：挂上立绘，反向转场，立绘滑入，然后开始第一句
    fn enter_dialogue(&mut self, bitmap: Option<String>, transparent: Option<u8>) {
        let (hidden, shown) = self.sprite_positions();
        let mut steps = vec![StepSpec::Widget(Widget::Fade(Fade::new(
            &self.config.fade,
            &self.config.timing,
            true,
        )))];

        if let Some(bitmap) = bitmap {
            let handle = RenderHandle(self.alloc_id());
            self.backend
                .attach(handle, Layer::Lower, &Visual::Sprite { bitmap, transparent });
            self.backend.set_position(handle, hidden.x, hidden.y);
            if let Some(scene) = self.scene.as_mut() {
                scene.sprite = Some(handle);
            }
            steps.push(StepSpec::Widget(Widget::Animator(Animator::new(
                handle,
                hidden,
                shown,
                self.config.motion.slide_duration,
                &self.config.timing,
            ))));
        }

        steps.push(StepSpec::Action(self.scene_cue(SceneAction::Entered)));
        let seq = self.sequence(steps, Next::Nothing);
        self.play(seq);
    }

    /// 开始离场：立绘滑出，正向转场，然后切换场景
    ///
    /// 只会执行一次。
    pub(crate) fn finish_scene(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if scene.completing {
            return;
        }
        scene.completing = true;
        let sprite = scene.sprite;

        let mut steps = Vec::new();
        if let Some(handle) = sprite {
            let (hidden, shown) = self.sprite_positions();
            steps.push(StepSpec::Widget(Widget::Animator(Animator::new(
                handle,
                shown,
                hidden,
                self.config.motion.slide_duration,
                &self.config.timing,
            ))));
        }
        steps.push(StepSpec::Widget(Widget::Fade(Fade::new(
            &self.config.fade,
            &self.config.timing,
            false,
        ))));
        steps.push(StepSpec::Action(self.scene_cue(SceneAction::Leave)));
        let seq = self.sequence(steps, Next::Nothing);
        self.play(seq);
    }

    /// 离场动画结束，决定下一个场景
    fn on_leave(&mut self) {
        let Some(scene) = &self.scene else {
            return;
        };
        let kind = scene.kind;
        let score = scene.score;

        let next = match kind {
            SceneKind::Title => SceneKind::Intro,
            SceneKind::Intro => SceneKind::Level(0),
            SceneKind::Level(index) => {
                self.state.record(index, score);
                self.push_notice(Notice::LevelScored { index, score });
                self.state.level_index = index + 1;
                if index + 1 < self.content.level_count() {
                    SceneKind::Level(index + 1)
                } else {
                    SceneKind::Epilogue
                }
            }
            SceneKind::Epilogue => {
                self.state.reset();
                self.history.clear();
                SceneKind::Title
            }
        };
        self.start_scene_logged(next);
    }
}
