//! # Engine 模块
//!
//! date-engine 的核心驱动。
//!
//! ## 执行模型
//!
//! ```text
//! advance(sample, dt)
//! ```
//!
//! 1. 把输入采样拆成输入事件，按事件栈顺序路由（见 `routing`）
//! 2. 按事件栈顺序推进所有活跃事件的时间（动画、转场、文字显现）
//! 3. 事件完成时立即执行其续体，续体可以在同一 tick 内创建并播放新事件
//!
//! 宿主在 `advance` 返回后刷新渲染；引擎只通过 [`Backend`] 描述画面。

mod arena;
mod routing;

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{Backend, Cue, Visual};
use crate::config::EngineConfig;
use crate::dialogue::{ContentLibrary, ExitButton};
use crate::error::{EngineError, EngineResult};
use crate::event::{EventId, EventStack, Lifecycle, Next, Outcome, Step};
use crate::geometry::Point;
use crate::history::History;
use crate::input::InputSample;
use crate::scene::{Scene, SceneKind};
use crate::state::GameState;
use crate::widget::{Behavior, Widget};

pub(crate) use arena::{Owner, Slot};

/// 引擎发给宿主的通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// 进入了新场景
    SceneStarted(SceneKind),
    /// 玩家在标题菜单选择退出（进程重置由宿主完成）
    QuitRequested,
    /// 玩家输入了名字
    NameEntered(String),
    /// 一关结束，得分已记入账本
    LevelScored { index: usize, score: i32 },
    /// 由调用者通过 `Next::Emit` 发布的自定义通知
    Custom(String),
}

/// 构造序列时的步骤描述
#[derive(Debug, Clone)]
pub enum StepSpec {
    /// 由序列拥有并等待完成的组件
    Widget(Widget),
    /// 立即执行的动作
    Action(Next),
}

/// date-engine 执行引擎
///
/// 持有所有事件、事件栈、当前场景与跨场景状态，单线程按 tick 驱动。
///
/// # 使用示例
///
/// ```ignore
/// let mut engine = Engine::new(config, content, backend)?;
/// engine.start()?;
///
/// loop {
///     let sample = host.poll_input();
///     engine.advance(&sample, dt);
///     // 宿主刷新渲染、处理 notices...
/// }
/// ```
pub struct Engine<B: Backend> {
    pub(crate) config: EngineConfig,
    pub(crate) content: ContentLibrary,
    pub(crate) backend: B,
    /// 所有尚未丢弃的事件
    pub(crate) slots: HashMap<EventId, Slot>,
    pub(crate) stack: EventStack,
    pub(crate) scene: Option<Scene>,
    pub(crate) state: GameState,
    pub(crate) history: History,
    pub(crate) rng: StdRng,
    pub(crate) exit_button: Option<EventId>,
    pub(crate) next_id: u64,
    pub(crate) scene_generation: u64,
    pub(crate) last_pointer: Option<Point>,
    pub(crate) tick: u64,
    pub(crate) notices: Vec<Notice>,
}

impl<B: Backend> Engine<B> {
    /// 创建引擎
    ///
    /// 校验配置并安装全局退出按钮。
    pub fn new(config: EngineConfig, content: ContentLibrary, backend: B) -> EngineResult<Self> {
        config.validate()?;

        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = GameState::new(content.level_count());

        let mut engine = Self {
            config,
            content,
            backend,
            slots: HashMap::new(),
            stack: EventStack::new(),
            scene: None,
            state,
            history: History::new(),
            rng,
            exit_button: None,
            next_id: 1,
            scene_generation: 0,
            last_pointer: None,
            tick: 0,
            notices: Vec::new(),
        };
        engine.install_exit_button()?;
        Ok(engine)
    }

    /// 安装全局退出按钮，只能有一个
    pub fn install_exit_button(&mut self) -> EngineResult<EventId> {
        if let Some(id) = self.exit_button
            && self.slots.contains_key(&id)
        {
            return Err(EngineError::DuplicateSingleton {
                kind: "exit_button".to_string(),
            });
        }
        let button = Widget::ExitButton(ExitButton::new(&self.config.screen));
        let id = self.insert(button, Next::Nothing, Owner::Global);
        self.exit_button = Some(id);
        self.play(id);
        Ok(id)
    }

    /// 从标题画面开始
    pub fn start(&mut self) -> EngineResult<()> {
        info!(levels = self.content.level_count(), "引擎启动");
        if let Some(music) = &self.config.audio.music {
            debug!(music = %music, "播放背景音乐");
            self.backend.play_cue(&Cue::Music(music.clone()));
        }
        self.start_scene(SceneKind::Title)
    }

    /// 核心驱动函数：每帧调用一次
    ///
    /// 输入路由先于时间推进。
    pub fn advance(&mut self, sample: &InputSample, dt: f32) {
        self.tick += 1;
        self.route_input(sample);
        self.advance_time(dt);
    }

    /// 创建一个事件（尚未播放）
    ///
    /// 当前有场景时事件归场景所有，场景结束时一并丢弃。
    pub fn spawn(&mut self, widget: Widget, on_complete: Next) -> EventId {
        let owner = self.default_owner();
        self.insert(widget, on_complete, owner)
    }

    /// 创建一个序列（尚未播放）
    ///
    /// 组件步骤由序列拥有，其续体被接管为推进序列。
    pub fn sequence(&mut self, steps: Vec<StepSpec>, on_complete: Next) -> EventId {
        let owner = self.default_owner();
        self.build_sequence(steps, on_complete, owner)
    }

    fn default_owner(&self) -> Owner {
        if self.scene.is_some() {
            Owner::Scene
        } else {
            Owner::Global
        }
    }

    /// 取走待处理的通知
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ===== 查询 =====

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentLibrary {
        &self.content
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// 直接修改跨场景状态（宿主读档、调试时使用）
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn stack(&self) -> &EventStack {
        &self.stack
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn exit_button(&self) -> Option<EventId> {
        self.exit_button
    }

    /// 事件是否仍存在且处于活跃状态
    pub fn is_active(&self, id: EventId) -> bool {
        self.slots.get(&id).is_some_and(|slot| slot.core.is_active())
    }

    /// 事件的生命周期；已丢弃的事件返回 None
    pub fn lifecycle(&self, id: EventId) -> Option<Lifecycle> {
        self.slots.get(&id).map(|slot| slot.core.lifecycle())
    }

    pub fn widget(&self, id: EventId) -> Option<&Widget> {
        self.slots.get(&id).map(|slot| &slot.widget)
    }

    /// 事件当前画面
    pub fn visual(&self, id: EventId) -> Option<Visual> {
        self.slots.get(&id).and_then(|slot| slot.widget.visual())
    }

    /// 序列的组件步骤
    pub fn sequence_steps(&self, id: EventId) -> Option<Vec<EventId>> {
        self.widget(id)
            .and_then(Widget::as_sequence)
            .map(|seq| seq.event_ids().collect())
    }

    /// 事件栈中指定种类的活跃事件（按栈顺序）
    pub fn find_active(&self, kind: &str) -> Vec<EventId> {
        self.stack
            .iter()
            .filter(|id| {
                self.slots
                    .get(id)
                    .is_some_and(|slot| slot.core.is_active() && slot.widget.kind() == kind)
            })
            .collect()
    }

    /// 当前存在的事件数（包括尚未播放的序列步骤）
    pub fn event_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        debug!(?notice, "通知宿主");
        self.notices.push(notice);
    }

    /// 推进序列并执行到下一个需要等待的步骤
    fn advance_sequence(&mut self, seq: EventId, outcome: Outcome) {
        let Some(sequence) = self
            .slots
            .get_mut(&seq)
            .filter(|slot| slot.core.is_active())
            .and_then(|slot| slot.widget.as_sequence_mut())
        else {
            return;
        };
        sequence.set_last(outcome);
        sequence.step_forward();
        self.run_sequence(seq);
    }

    /// 执行序列当前步骤
    ///
    /// 连续的动作在本次调用内同步执行完，遇到事件步骤时播放它并返回。
    /// 动作可能切换场景并丢弃序列本身，因此每一步都重新检查。
    pub(crate) fn run_sequence(&mut self, seq: EventId) {
        loop {
            let (step, last) = match self.slots.get(&seq) {
                Some(slot) if slot.core.is_active() => match slot.widget.as_sequence() {
                    Some(sequence) => (sequence.current().cloned(), sequence.last().clone()),
                    None => return,
                },
                _ => return,
            };

            match step {
                None => {
                    self.complete(seq, last);
                    return;
                }
                Some(Step::Action(next)) => {
                    if let Some(sequence) = self
                        .slots
                        .get_mut(&seq)
                        .and_then(|slot| slot.widget.as_sequence_mut())
                    {
                        sequence.step_forward();
                    }
                    self.resume(next, last);
                }
                Some(Step::Event(id)) => {
                    if self.play(id) {
                        return;
                    }
                    debug!(%seq, step = %id, "序列步骤无法播放，跳过");
                    if let Some(sequence) = self
                        .slots
                        .get_mut(&seq)
                        .and_then(|slot| slot.widget.as_sequence_mut())
                    {
                        sequence.step_forward();
                    }
                }
            }
        }
    }

    /// 执行续体
    pub(crate) fn resume(&mut self, next: Next, outcome: Outcome) {
        match next {
            Next::Nothing => {}
            Next::Advance(seq) => self.advance_sequence(seq, outcome),
            Next::Finish(owner) => {
                let settled = self
                    .slots
                    .get(&owner)
                    .map(|slot| slot.widget.settled())
                    .unwrap_or_default();
                self.complete(owner, settled);
            }
            Next::Scene(cue) => self.on_scene_cue(cue, outcome),
            Next::ExitPrompt => self.on_exit_prompt(outcome),
            Next::Emit(notice) => self.push_notice(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::dialogue::CharacterScript;

    fn content() -> ContentLibrary {
        let intro =
            CharacterScript::from_json("intro", r#"{ "name": "Host", "dialogue": ["Welcome"] }"#)
                .unwrap();
        let level =
            CharacterScript::from_json("01-a", r#"{ "name": "A", "dialogue": ["Hi"] }"#).unwrap();
        ContentLibrary::new(intro, vec![level]).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.fade.tiles = 0;
        let result = Engine::new(config, content(), RecordingBackend::new());
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_exit_button_is_singleton() {
        let mut engine = Engine::new(EngineConfig::default(), content(), RecordingBackend::new())
            .unwrap();
        let button = engine.exit_button().unwrap();
        assert!(engine.is_active(button));
        assert_eq!(
            engine.install_exit_button().unwrap_err(),
            EngineError::DuplicateSingleton {
                kind: "exit_button".to_string()
            }
        );
        assert_eq!(engine.find_active("exit_button"), vec![button]);
    }

    #[test]
    fn test_start_plays_music_once() {
        let mut engine = Engine::new(EngineConfig::default(), content(), RecordingBackend::new())
            .unwrap();
        engine.start().unwrap();
        engine.advance(&InputSample::none(), 1.0);
        let music: Vec<_> = engine
            .backend()
            .cues()
            .into_iter()
            .filter(|cue| matches!(cue, Cue::Music(_)))
            .collect();
        assert_eq!(music, vec![&Cue::Music("music".to_string())]);
    }

    #[test]
    fn test_start_without_music() {
        let mut config = EngineConfig::default();
        config.audio.music = None;
        let mut engine = Engine::new(config, content(), RecordingBackend::new()).unwrap();
        engine.start().unwrap();
        assert!(
            !engine
                .backend()
                .cues()
                .iter()
                .any(|cue| matches!(cue, Cue::Music(_)))
        );
    }

    #[test]
    fn test_start_with_null_backend() {
        let mut engine =
            Engine::new(EngineConfig::default(), content(), crate::backend::NullBackend).unwrap();
        engine.start().unwrap();
        assert_eq!(engine.scene().map(|scene| scene.kind()), Some(SceneKind::Title));
    }

    #[test]
    fn test_custom_notice_fires_once() {
        let mut engine = Engine::new(EngineConfig::default(), content(), RecordingBackend::new())
            .unwrap();
        let seq = engine.sequence(
            vec![StepSpec::Action(Next::Emit(Notice::Custom("hello".to_string())))],
            Next::Emit(Notice::Custom("done".to_string())),
        );
        assert!(engine.play(seq));
        assert!(!engine.is_active(seq));
        assert_eq!(
            engine.drain_notices(),
            vec![
                Notice::Custom("hello".to_string()),
                Notice::Custom("done".to_string())
            ]
        );
        assert!(!engine.complete(seq, Outcome::None));
        assert!(engine.drain_notices().is_empty());
    }
}
