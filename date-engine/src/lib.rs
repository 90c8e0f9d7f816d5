//! # Date Engine
//!
//! 对话约会类视觉小说的纯逻辑核心。
//!
//! ## 架构概述
//!
//! `date-engine` 不做任何文件、设备或窗口 IO。它通过两条通道与宿主层（Host）通信：
//!
//! ```text
//! Host                              Engine
//!   │                                  │
//!   │──── InputSample + dt ──────────►│ advance()
//!   │                                  │
//!   │◄─── Backend 调用（attach/...）───│
//!   │◄─── drain_notices() ─────────────│
//!   │                                  │
//! ```
//!
//! ## 核心类型
//!
//! - [`Engine`]：执行引擎，持有事件、事件栈与当前场景
//! - [`Backend`]：宿主实现的渲染/音频能力
//! - [`InputSample`]：宿主每帧采集的原始输入
//! - [`Notice`]：引擎发给宿主的通知
//! - [`GameState`]：跨场景状态（玩家名、关卡得分账本）
//!
//! ## 使用示例
//!
//! ```ignore
//! use date_engine::{ContentLibrary, Engine, EngineConfig, InputSample, NullBackend};
//!
//! let mut engine = Engine::new(EngineConfig::default(), content, NullBackend)?;
//! engine.start()?;
//!
//! loop {
//!     engine.advance(&InputSample::select(), 1.0 / 30.0);
//!     for notice in engine.drain_notices() {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`event`]：事件生命周期、事件栈、序列
//! - [`animation`]：立绘插值与瓦片转场
//! - [`dialogue`]：对话内容与界面组件
//! - [`scene`]：场景状态机
//! - [`engine`]：tick 入口与输入路由
//! - [`backend`]：渲染/音频协作接口
//! - [`config`]：引擎配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod backend;
pub mod config;
pub mod dialogue;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod input;
pub mod scene;
pub mod state;
pub mod widget;

// 重导出核心类型
pub use backend::{
    Backend, BackendCall, Cue, Layer, NullBackend, RecordingBackend, RenderHandle, Visual,
};
pub use config::{EngineConfig, TimingModel};
pub use dialogue::{CharacterScript, ContentLibrary, DialogOption, DialogueNode};
pub use engine::{Engine, Notice, StepSpec};
pub use error::{ConfigError, ContentError, EngineError, EngineResult};
pub use event::{EventId, Lifecycle, Next, Outcome};
pub use geometry::{Point, Rect};
pub use history::{History, HistoryEvent};
pub use input::{Direction, InputEvent, InputSample};
pub use scene::{Scene, SceneKind};
pub use state::GameState;
pub use widget::{Reaction, Widget};
