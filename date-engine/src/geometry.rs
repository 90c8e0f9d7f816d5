//! # Geometry 模块
//!
//! 命中测试用的矩形与各组件的布局计算。
//!
//! 布局只用于把指针坐标映射到选项/按钮/按键，真正的绘制由宿主完成，
//! 因此这里的数值只需与宿主约定一致即可。

use serde::{Deserialize, Serialize};

use crate::config::ScreenConfig;

/// 屏幕坐标点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 轴对齐矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// 点是否落在矩形内（含边界）
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.w
            && point.y >= self.y
            && point.y <= self.y + self.h
    }
}

/// 在一组矩形中找出包含该点的第一个
pub fn hit(rects: &[Rect], point: Point) -> Option<usize> {
    rects.iter().position(|r| r.contains(point))
}

const ROW_GAP: i32 = 4;
const BOTTOM_MARGIN: i32 = 16;

/// 选项对话框：自下而上堆叠的窗口
pub fn option_rects(screen: &ScreenConfig, count: usize) -> Vec<Rect> {
    let width = screen.width - 80;
    let height = 24;
    let x = (screen.width - width) / 2;
    (0..count)
        .map(|i| {
            let from_bottom = (count - i) as i32;
            let y = screen.height - BOTTOM_MARGIN - from_bottom * (height + ROW_GAP) + ROW_GAP;
            Rect::new(x, y, width, height)
        })
        .collect()
}

/// 标题菜单：居中的纵向按钮
pub fn menu_rects(screen: &ScreenConfig, count: usize) -> Vec<Rect> {
    let width = 96;
    let height = 20;
    let x = (screen.width - width) / 2;
    let top = screen.height / 2 + 20;
    (0..count)
        .map(|i| Rect::new(x, top + i as i32 * (height + ROW_GAP), width, height))
        .collect()
}

/// 确认框：居中横排按钮
pub fn prompt_rects(screen: &ScreenConfig, count: usize) -> Vec<Rect> {
    let width = 56;
    let height = 20;
    let gap = 8;
    let total = count as i32 * width + (count as i32 - 1).max(0) * gap;
    let left = (screen.width - total) / 2;
    let y = screen.height / 2 + 12;
    (0..count)
        .map(|i| Rect::new(left + i as i32 * (width + gap), y, width, height))
        .collect()
}

/// 屏幕键盘：按行排布的按键
pub fn key_rects(screen: &ScreenConfig, row_lengths: &[usize]) -> Vec<Vec<Rect>> {
    let cell_w = 24;
    let cell_h = 20;
    let widest = row_lengths.iter().copied().max().unwrap_or(0) as i32;
    let left = (screen.width - widest * cell_w) / 2;
    let top = screen.height / 2 - 20;
    row_lengths
        .iter()
        .enumerate()
        .map(|(row, &len)| {
            (0..len)
                .map(|col| {
                    Rect::new(
                        left + col as i32 * cell_w,
                        top + row as i32 * cell_h,
                        cell_w - 2,
                        cell_h - 2,
                    )
                })
                .collect()
        })
        .collect()
}

/// 全局退出按钮：右上角
pub fn exit_button_rect(screen: &ScreenConfig) -> Rect {
    Rect::new(screen.width - 20, 4, 16, 16)
}
