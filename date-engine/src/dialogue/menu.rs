//! 列表式组件共用的光标
//!
//! 选项、标题菜单、确认框都是一维列表：方向键循环移动，左右等同于上下。

use crate::input::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListCursor {
    index: usize,
    len: usize,
}

impl ListCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 按方向循环移动
    pub fn step(&mut self, direction: Direction) -> bool {
        if self.len == 0 {
            return false;
        }
        self.index = if direction.is_forward() {
            (self.index + 1) % self.len
        } else {
            (self.index + self.len - 1) % self.len
        };
        true
    }

    /// 直接定位，越界时忽略
    pub fn set(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.index {
            return false;
        }
        self.index = index;
        true
    }
}
