//! # Input 模块
//!
//! 定义 Host 每个 tick 交给引擎的原始输入采样，以及引擎内部路由用的输入事件。
//!
//! ## 设计说明
//!
//! - `InputSample` 是宿主采集到的一帧输入（指针位置、按键增量、键入字符）
//! - 引擎不关心输入来自鼠标、手柄还是串口键盘，只处理语义化的通道
//! - 一个采样在 `Engine::advance` 中被拆分为若干 `InputEvent`，按固定顺序路由：
//!   指针移动 → 点击 → 方向 → 确认 → 键入字符 → 退格 → 退出

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// 方向键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// 列表式组件不区分行列：左等同于上，右等同于下
    pub fn as_vertical(self) -> Direction {
        match self {
            Direction::Left => Direction::Up,
            Direction::Right => Direction::Down,
            other => other,
        }
    }

    /// 在列表中是否表示"向后"
    pub fn is_forward(self) -> bool {
        matches!(self.as_vertical(), Direction::Down)
    }
}

/// 一帧的原始输入采样
///
/// 所有按键字段都是"本帧新按下"的增量，而不是持续按住的状态。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    /// 当前指针位置（没有指针设备时为 None）
    pub pointer: Option<Point>,
    /// 本帧是否发生了一次点击（按下沿）
    pub click: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// 确认/激活
    pub select: bool,
    /// 请求退出到标题（Esc / Home）
    pub escape: bool,
    /// 删除一个字符
    pub backspace: bool,
    /// 本帧键入的字符
    pub text: String,
}

impl InputSample {
    /// 空采样
    pub fn none() -> Self {
        Self::default()
    }

    /// 只有确认键
    pub fn select() -> Self {
        Self {
            select: true,
            ..Self::default()
        }
    }

    /// 只有一个方向键
    pub fn direction(direction: Direction) -> Self {
        let mut sample = Self::default();
        match direction {
            Direction::Up => sample.up = true,
            Direction::Down => sample.down = true,
            Direction::Left => sample.left = true,
            Direction::Right => sample.right = true,
        }
        sample
    }

    /// 在指定位置点击
    pub fn click_at(x: i32, y: i32) -> Self {
        Self {
            pointer: Some(Point::new(x, y)),
            click: true,
            ..Self::default()
        }
    }

    /// 指针移动到指定位置
    pub fn pointer_at(x: i32, y: i32) -> Self {
        Self {
            pointer: Some(Point::new(x, y)),
            ..Self::default()
        }
    }

    /// 键入文本
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// 退出请求
    pub fn escape() -> Self {
        Self {
            escape: true,
            ..Self::default()
        }
    }

    /// 退格
    pub fn backspace() -> Self {
        Self {
            backspace: true,
            ..Self::default()
        }
    }

    /// 按路由顺序展开为输入事件
    ///
    /// `last_pointer` 为上一帧的指针位置，指针未移动时不产生移动事件。
    pub fn events(&self, last_pointer: Option<Point>) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if let Some(point) = self.pointer
            && last_pointer != Some(point)
        {
            events.push(InputEvent::PointerMove(point));
        }
        // 本帧没有指针坐标时，点击发生在上一帧的位置
        if self.click
            && let Some(point) = self.pointer.or(last_pointer)
        {
            events.push(InputEvent::Click(point));
        }

        let directions = [
            (self.up, Direction::Up),
            (self.down, Direction::Down),
            (self.left, Direction::Left),
            (self.right, Direction::Right),
        ];
        for (pressed, direction) in directions {
            if pressed {
                events.push(InputEvent::Direction(direction));
            }
        }

        if self.select {
            events.push(InputEvent::Select);
        }
        for c in self.text.chars() {
            events.push(InputEvent::Text(c));
        }
        if self.backspace {
            events.push(InputEvent::Backspace);
        }
        if self.escape {
            events.push(InputEvent::Escape);
        }
        events
    }
}

/// 路由到事件栈的单个输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// 指针移动：依次投递，直到有组件阻止传播
    PointerMove(Point),
    /// 点击：投递到第一个处理它的组件
    Click(Point),
    /// 方向键
    Direction(Direction),
    /// 确认/激活
    Select,
    /// 键入的字符
    Text(char),
    /// 退格
    Backspace,
    /// 退出请求
    Escape,
}

impl InputEvent {
    /// 是否为"广播直到阻止"的通道
    pub fn is_broadcast(&self) -> bool {
        matches!(self, InputEvent::PointerMove(_))
    }
}
