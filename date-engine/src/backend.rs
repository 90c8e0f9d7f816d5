//! # Backend 模块
//!
//! 引擎与宿主渲染/音频的接缝。
//!
//! 引擎只声明"把这个句柄挂到哪一层、它现在应该画成什么样、放在哪里、
//! 播放哪个音效"，具体怎么画、怎么混音由宿主实现 [`Backend`] 决定。
//!
//! - [`NullBackend`]：无显示无音频，所有调用都是空操作
//! - [`RecordingBackend`]：记录所有调用，供测试与无头宿主使用

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// 渲染句柄
///
/// 由引擎分配，宿主用它关联自己的绘制对象。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

impl std::fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 渲染层（父节点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// 背景与角色立绘
    Lower,
    /// 对话框、选项、键盘等
    Upper,
    /// 转场遮罩、确认框、全局按钮
    Overlay,
}

/// 结果页中的一根柱子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBar {
    /// 角色名
    pub name: String,
    /// 该关得分
    pub score: i32,
    /// 是否为最高分
    pub best: bool,
}

/// 句柄应当呈现的内容
///
/// 只描述图元语义，不包含像素、调色板或字体等渲染细节。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    /// 角色立绘
    Sprite {
        bitmap: String,
        transparent: Option<u8>,
    },
    /// 转场瓦片网格，所有瓦片显示同一帧
    Fade { tile: usize, tiles: usize },
    /// 对话窗口
    Dialog {
        title: Option<String>,
        title_right: bool,
        lines: Vec<String>,
        /// 已显现的字符数
        revealed: usize,
        /// 总字符数
        total: usize,
    },
    /// 选项列表
    Options { items: Vec<String>, highlighted: usize },
    /// 标题菜单
    Menu { items: Vec<String>, highlighted: usize },
    /// 屏幕键盘
    Keyboard {
        text: String,
        rows: Vec<Vec<String>>,
        cursor: (usize, usize),
        uppercase: bool,
        enter_enabled: bool,
    },
    /// 模态确认框
    Prompt {
        text: String,
        buttons: Vec<String>,
        highlighted: usize,
    },
    /// 结果页柱状图
    Results { bars: Vec<ResultBar> },
    /// 单个按钮
    Button { label: String, hovered: bool },
}

/// 音效
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// 语音库中的一个音节
    Voice { bank: String, blip: usize },
    /// 一次性音效
    Sfx(String),
    /// 背景音乐，在独立声道上循环播放，不影响 [`Backend::is_cue_playing`]
    Music(String),
}

/// 宿主渲染/音频能力
pub trait Backend {
    /// 把句柄挂到指定层
    fn attach(&mut self, handle: RenderHandle, layer: Layer, visual: &Visual);

    /// 更新已挂载句柄的内容
    fn update(&mut self, handle: RenderHandle, visual: &Visual);

    /// 从指定层摘下句柄
    fn detach(&mut self, handle: RenderHandle, layer: Layer);

    /// 设置句柄位置
    fn set_position(&mut self, handle: RenderHandle, x: i32, y: i32);

    /// 播放音效（没有音频设备时应为空操作）
    fn play_cue(&mut self, cue: &Cue);

    /// 是否有音效正在播放
    fn is_cue_playing(&self) -> bool;
}

/// 空后端：没有显示也没有音频
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn attach(&mut self, _handle: RenderHandle, _layer: Layer, _visual: &Visual) {}

    fn update(&mut self, _handle: RenderHandle, _visual: &Visual) {}

    fn detach(&mut self, _handle: RenderHandle, _layer: Layer) {}

    fn set_position(&mut self, _handle: RenderHandle, _x: i32, _y: i32) {}

    fn play_cue(&mut self, _cue: &Cue) {}

    fn is_cue_playing(&self) -> bool {
        false
    }
}

/// 后端调用记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendCall {
    Attach {
        handle: RenderHandle,
        layer: Layer,
        visual: Visual,
    },
    Update {
        handle: RenderHandle,
        visual: Visual,
    },
    Detach {
        handle: RenderHandle,
        layer: Layer,
    },
    SetPosition {
        handle: RenderHandle,
        x: i32,
        y: i32,
    },
    PlayCue(Cue),
}

/// 记录型后端
///
/// 保存完整的调用日志，并维护当前已挂载的句柄与位置，
/// 可以据此检查"没有悬挂句柄"之类的约束。
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    attached: BTreeMap<RenderHandle, (Layer, Visual)>,
    positions: HashMap<RenderHandle, Point>,
    cue_busy: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部调用记录
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// 取走调用记录
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// 当前已挂载的句柄数
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// 句柄是否已挂载
    pub fn is_attached(&self, handle: RenderHandle) -> bool {
        self.attached.contains_key(&handle)
    }

    /// 已挂载句柄当前的内容
    pub fn visual_of(&self, handle: RenderHandle) -> Option<&Visual> {
        self.attached.get(&handle).map(|(_, visual)| visual)
    }

    /// 所有已挂载的内容（按句柄排序）
    pub fn attached_visuals(&self) -> impl Iterator<Item = (RenderHandle, Layer, &Visual)> {
        self.attached
            .iter()
            .map(|(handle, (layer, visual))| (*handle, *layer, visual))
    }

    /// 句柄最后一次被设置的位置
    pub fn position_of(&self, handle: RenderHandle) -> Option<Point> {
        self.positions.get(&handle).copied()
    }

    /// 播放过的音效
    pub fn cues(&self) -> Vec<&Cue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::PlayCue(cue) => Some(cue),
                _ => None,
            })
            .collect()
    }

    /// 模拟"音效正在播放"
    pub fn set_cue_busy(&mut self, busy: bool) {
        self.cue_busy = busy;
    }
}

impl Backend for RecordingBackend {
    fn attach(&mut self, handle: RenderHandle, layer: Layer, visual: &Visual) {
        self.attached.insert(handle, (layer, visual.clone()));
        self.calls.push(BackendCall::Attach {
            handle,
            layer,
            visual: visual.clone(),
        });
    }

    fn update(&mut self, handle: RenderHandle, visual: &Visual) {
        if let Some((_, current)) = self.attached.get_mut(&handle) {
            *current = visual.clone();
        }
        self.calls.push(BackendCall::Update {
            handle,
            visual: visual.clone(),
        });
    }

    fn detach(&mut self, handle: RenderHandle, layer: Layer) {
        self.attached.remove(&handle);
        self.calls.push(BackendCall::Detach { handle, layer });
    }

    fn set_position(&mut self, handle: RenderHandle, x: i32, y: i32) {
        self.positions.insert(handle, Point::new(x, y));
        self.calls.push(BackendCall::SetPosition { handle, x, y });
    }

    fn play_cue(&mut self, cue: &Cue) {
        self.calls.push(BackendCall::PlayCue(cue.clone()));
    }

    fn is_cue_playing(&self) -> bool {
        self.cue_busy
    }
}
