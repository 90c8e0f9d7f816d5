//! 瓦片转场
//!
//! 一个离散的帧序号从 0 数到 N，到 N 时完成。
//! `reverse` 只改变渲染时的映射（`index → N-1-index`），不改变计数方向。

use crate::backend::{Layer, Visual};
use crate::config::{FadeConfig, TimingConfig, TimingModel};
use crate::event::Outcome;
use crate::widget::{Behavior, Ctx, Reaction};

use super::{TIME_EPSILON, total_frames};

#[derive(Debug, Clone)]
pub struct Fade {
    tiles: usize,
    reverse: bool,
    model: TimingModel,
    /// 按帧模型：每个瓦片停留的帧数
    ticks_per_tile: u32,
    /// 按时间模型：每个瓦片停留的秒数
    quantum: f32,
    index: usize,
    counter: u32,
    elapsed: f64,
}

impl Fade {
    pub fn new(fade: &FadeConfig, timing: &TimingConfig, reverse: bool) -> Self {
        let tiles = fade.tiles.max(1);
        let frames = total_frames(timing.frame_rate, fade.duration);
        let ticks_per_tile = ((frames as f32 / tiles as f32).round() as u32).max(1);
        Self {
            tiles,
            reverse,
            model: timing.model,
            ticks_per_tile,
            quantum: fade.duration.max(0.0) / tiles as f32,
            index: 0,
            counter: 0,
            elapsed: 0.0,
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// 计数器当前值（0..=N）
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.tiles
    }

    /// 当前应显示的瓦片帧
    pub fn tile(&self) -> usize {
        let index = self.index.min(self.tiles - 1);
        if self.reverse {
            self.tiles - 1 - index
        } else {
            index
        }
    }

    /// 推进一次，返回 (序号是否变化, 是否完成)
    pub fn step(&mut self, dt: f32) -> (bool, bool) {
        if self.is_finished() {
            return (false, true);
        }
        let before = self.index;
        match self.model {
            TimingModel::Frames => {
                self.counter += 1;
                if self.counter >= self.ticks_per_tile {
                    self.counter = 0;
                    self.index += 1;
                }
            }
            TimingModel::Delta => {
                self.elapsed += f64::from(dt.max(0.0));
                self.index = if self.quantum <= 0.0 {
                    self.tiles
                } else {
                    let quantum = f64::from(self.quantum);
                    (((self.elapsed + TIME_EPSILON) / quantum).floor() as usize).min(self.tiles)
                };
            }
        }
        (self.index != before, self.is_finished())
    }
}

impl Behavior for Fade {
    fn advance(&mut self, dt: f32, ctx: &mut Ctx<'_>) -> Reaction {
        let (changed, done) = self.step(dt);
        if done {
            return Reaction::Complete(Outcome::None);
        }
        if changed {
            ctx.mark_dirty();
        }
        Reaction::Pass
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Fade {
            tile: self.tile(),
            tiles: self.tiles,
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Overlay)
    }
}
