//! # Config 模块
//!
//! 引擎配置。所有字段都有默认值，配置文件里只需写想覆盖的项。
//!
//! 读取配置文件属于宿主层的职责，这里只定义结构、默认值与校验。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 时间推进模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingModel {
    /// 按帧计数：每个 tick 视为一帧，忽略 dt
    Frames,
    /// 按真实流逝时间累加
    #[default]
    Delta,
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// 屏幕尺寸
    #[serde(default)]
    pub screen: ScreenConfig,

    /// 时间推进
    #[serde(default)]
    pub timing: TimingConfig,

    /// 转场淡入淡出
    #[serde(default)]
    pub fade: FadeConfig,

    /// 角色立绘的滑入滑出
    #[serde(default)]
    pub motion: MotionConfig,

    /// 对话文本
    #[serde(default)]
    pub text: TextConfig,

    /// 屏幕键盘
    #[serde(default)]
    pub keyboard: KeyboardConfig,

    /// 音效名称
    #[serde(default)]
    pub audio: AudioCueConfig,

    /// 选项洗牌的随机种子（None 表示使用系统熵）
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

/// 屏幕配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width")]
    pub width: i32,
    #[serde(default = "default_screen_height")]
    pub height: i32,
}

/// 时间推进配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// 目标帧率（Hz）
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// 动画与转场使用的时间模型
    #[serde(default)]
    pub model: TimingModel,
}

/// 转场配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadeConfig {
    /// 转场素材中的帧（瓦片）数 N
    #[serde(default = "default_fade_tiles")]
    pub tiles: usize,
    /// 一次完整转场的时长（秒）
    #[serde(default = "default_fade_duration")]
    pub duration: f32,
}

/// 角色立绘运动配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// 立绘隐藏时的 x 坐标
    #[serde(default = "default_sprite_x")]
    pub sprite_x: i32,
    /// 立绘隐藏时的 y 坐标（屏幕下沿之下）
    #[serde(default = "default_sprite_y")]
    pub sprite_y: i32,
    /// 立绘高度，滑入距离等于该值
    #[serde(default = "default_sprite_height")]
    pub sprite_height: i32,
    /// 滑入/滑出时长（秒）
    #[serde(default = "default_slide_duration")]
    pub slide_duration: f32,
}

/// 对话文本配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// 文字显现速度（每秒字符数）
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f32,
    /// 对话框每行字符数
    #[serde(default = "default_line_chars")]
    pub line_chars: usize,
    /// 每显现多少个字符播放一次语音音节
    #[serde(default = "default_chars_per_blip")]
    pub chars_per_blip: usize,
}

/// 屏幕键盘配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardConfig {
    /// 字符行，特殊键（大小写/退格/确认）追加在最后一行
    #[serde(default = "default_keyboard_rows")]
    pub rows: Vec<String>,
    /// 名字最大长度
    #[serde(default = "default_max_name_len")]
    pub max_len: usize,
    /// 左右导航在行首/行尾是否回绕（否则跨到相邻行）
    #[serde(default)]
    pub wrap: bool,
}

/// 音效名称配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioCueConfig {
    /// 确认选择时的点击音
    #[serde(default = "default_click_cue")]
    pub click: Option<String>,
    /// `{buzzer}` 标记触发的音效
    #[serde(default = "default_buzzer_cue")]
    pub buzzer: String,
    /// 玩家自己说话时使用的语音库
    #[serde(default)]
    pub player_voice: Option<String>,
    /// 启动时循环播放的背景音乐
    #[serde(default = "default_music_cue")]
    pub music: Option<String>,
}

// 默认值函数
fn default_screen_width() -> i32 {
    320
}

fn default_screen_height() -> i32 {
    240
}

fn default_frame_rate() -> u32 {
    30
}

fn default_fade_tiles() -> usize {
    8
}

fn default_fade_duration() -> f32 {
    1.0
}

fn default_sprite_x() -> i32 {
    124
}

fn default_sprite_y() -> i32 {
    211
}

fn default_sprite_height() -> i32 {
    96
}

fn default_slide_duration() -> f32 {
    1.0
}

fn default_chars_per_second() -> f32 {
    45.0
}

fn default_line_chars() -> usize {
    40
}

fn default_chars_per_blip() -> usize {
    10
}

fn default_keyboard_rows() -> Vec<String> {
    vec![
        "ABCDEFGHIJ".to_string(),
        "KLMNOPQRST".to_string(),
        "UVWXYZ".to_string(),
    ]
}

fn default_max_name_len() -> usize {
    10
}

fn default_click_cue() -> Option<String> {
    Some("click".to_string())
}

fn default_buzzer_cue() -> String {
    "buzzer".to_string()
}

fn default_music_cue() -> Option<String> {
    Some("music".to_string())
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_screen_width(),
            height: default_screen_height(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            model: TimingModel::default(),
        }
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            tiles: default_fade_tiles(),
            duration: default_fade_duration(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sprite_x: default_sprite_x(),
            sprite_y: default_sprite_y(),
            sprite_height: default_sprite_height(),
            slide_duration: default_slide_duration(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            chars_per_second: default_chars_per_second(),
            line_chars: default_line_chars(),
            chars_per_blip: default_chars_per_blip(),
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            rows: default_keyboard_rows(),
            max_len: default_max_name_len(),
            wrap: false,
        }
    }
}

impl Default for AudioCueConfig {
    fn default() -> Self {
        Self {
            click: default_click_cue(),
            buzzer: default_buzzer_cue(),
            player_voice: None,
            music: default_music_cue(),
        }
    }
}

impl EngineConfig {
    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.width <= 0 || self.screen.height <= 0 {
            return Err(ConfigError::invalid("screen", "宽高必须大于 0"));
        }
        if self.timing.frame_rate == 0 {
            return Err(ConfigError::invalid("timing.frame_rate", "帧率必须大于 0"));
        }
        if self.fade.tiles == 0 {
            return Err(ConfigError::invalid("fade.tiles", "转场帧数必须大于 0"));
        }
        if !(self.fade.duration >= 0.0) {
            return Err(ConfigError::invalid("fade.duration", "时长不能为负"));
        }
        if !(self.motion.slide_duration >= 0.0) {
            return Err(ConfigError::invalid("motion.slide_duration", "时长不能为负"));
        }
        if !(self.text.chars_per_second > 0.0) {
            return Err(ConfigError::invalid(
                "text.chars_per_second",
                "显现速度必须大于 0",
            ));
        }
        if self.text.line_chars < 8 {
            return Err(ConfigError::invalid("text.line_chars", "每行至少 8 个字符"));
        }
        if self.text.chars_per_blip == 0 {
            return Err(ConfigError::invalid("text.chars_per_blip", "必须大于 0"));
        }
        if self.keyboard.rows.iter().all(|row| row.trim().is_empty()) {
            return Err(ConfigError::invalid("keyboard.rows", "键盘布局不能为空"));
        }
        if self.keyboard.max_len == 0 {
            return Err(ConfigError::invalid("keyboard.max_len", "必须大于 0"));
        }
        Ok(())
    }

    /// 单帧时长（秒）
    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.timing.frame_rate.max(1) as f32
    }
}
