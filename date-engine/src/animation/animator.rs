//! 位置插值动画
//!
//! 把一个渲染句柄从 `start` 线性移动到 `end`。
//! 无论步长如何，结束时位置都被钉在 `end`，插值不会越过终点。

use crate::backend::RenderHandle;
use crate::config::{TimingConfig, TimingModel};
use crate::event::Outcome;
use crate::geometry::Point;
use crate::widget::{Behavior, Ctx, Reaction};

use super::{TIME_EPSILON, total_frames};

#[derive(Debug, Clone)]
pub struct Animator {
    /// 被移动的句柄（场景立绘）
    target: RenderHandle,
    start: Point,
    end: Point,
    /// 时长（秒）
    duration: f32,
    model: TimingModel,
    total_frames: u32,
    frame: u32,
    /// 按时间模型累计的秒数（f64 累加）
    elapsed: f64,
    position: Point,
    finished: bool,
}

impl Animator {
    pub fn new(
        target: RenderHandle,
        start: Point,
        end: Point,
        duration: f32,
        timing: &TimingConfig,
    ) -> Self {
        let duration = duration.max(0.0);
        Self {
            target,
            start,
            end,
            duration,
            model: timing.model,
            total_frames: total_frames(timing.frame_rate, duration),
            frame: 0,
            elapsed: 0.0,
            position: start,
            finished: false,
        }
    }

    pub fn target(&self) -> RenderHandle {
        self.target
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 交换起止点并重置进度
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        self.frame = 0;
        self.elapsed = 0.0;
        self.position = self.start;
        self.finished = false;
    }

    /// 推进一次，返回是否已到达终点
    ///
    /// 到达终点后再调用是无操作。
    pub fn step(&mut self, dt: f32) -> bool {
        if self.finished {
            return true;
        }
        match self.model {
            TimingModel::Frames => {
                self.frame += 1;
                if self.frame > self.total_frames {
                    self.finish();
                } else {
                    self.position =
                        lerp_frames(self.start, self.end, self.frame, self.total_frames);
                }
            }
            TimingModel::Delta => {
                self.elapsed += f64::from(dt.max(0.0));
                let duration = f64::from(self.duration);
                if self.elapsed + TIME_EPSILON >= duration {
                    self.finish();
                } else {
                    let fraction = (self.elapsed / duration).min(1.0) as f32;
                    self.position = lerp_fraction(self.start, self.end, fraction);
                }
            }
        }
        self.finished
    }

    fn finish(&mut self) {
        self.position = self.end;
        self.finished = true;
    }
}

fn lerp_frames(start: Point, end: Point, frame: u32, total: u32) -> Point {
    let axis = |a: i32, b: i32| a + ((b - a) as i64 * frame as i64 / total.max(1) as i64) as i32;
    Point::new(axis(start.x, end.x), axis(start.y, end.y))
}

fn lerp_fraction(start: Point, end: Point, fraction: f32) -> Point {
    // 偏移量向零截断到整数像素
    let axis = |a: i32, b: i32| a + ((b - a) as f32 * fraction) as i32;
    Point::new(axis(start.x, end.x), axis(start.y, end.y))
}

impl Behavior for Animator {
    fn on_play(&mut self, ctx: &mut Ctx<'_>) {
        ctx.backend.set_position(self.target, self.position.x, self.position.y);
    }

    fn advance(&mut self, dt: f32, ctx: &mut Ctx<'_>) -> Reaction {
        let done = self.step(dt);
        ctx.backend.set_position(self.target, self.position.x, self.position.y);
        if done {
            Reaction::Complete(Outcome::None)
        } else {
            Reaction::Pass
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(model: TimingModel) -> TimingConfig {
        TimingConfig {
            frame_rate: 30,
            model,
        }
    }

    fn slide(model: TimingModel, duration: f32) -> Animator {
        Animator::new(
            RenderHandle(1),
            Point::new(124, 211),
            Point::new(124, 115),
            duration,
            &timing(model),
        )
    }

    #[test]
    fn test_frames_model_completes_after_total_frames() {
        let mut anim = slide(TimingModel::Frames, 1.0);
        for _ in 0..30 {
            assert!(!anim.step(0.0));
        }
        // 第 30 帧恰好到达终点，但第 31 帧才完成
        assert_eq!(anim.position(), Point::new(124, 115));
        assert!(anim.step(0.0));
        assert_eq!(anim.position(), Point::new(124, 115));
    }

    #[test]
    fn test_frames_model_truncates() {
        let mut anim = Animator::new(
            RenderHandle(1),
            Point::new(0, 0),
            Point::new(10, -10),
            0.1,
            &timing(TimingModel::Frames),
        );
        // 3 帧：10 * 1 / 3 = 3
        anim.step(0.0);
        assert_eq!(anim.position(), Point::new(3, -3));
    }

    #[test]
    fn test_delta_model_exact_end_regardless_of_step() {
        for step in [0.001_f32, 0.016, 0.033, 0.3, 0.7, 5.0] {
            let mut anim = slide(TimingModel::Delta, 1.0);
            let mut total = 0.0;
            let mut done = false;
            while !done {
                done = anim.step(step);
                total += step;
                assert!(total < 10.0);
            }
            assert!(total >= 1.0 - 1e-3);
            assert_eq!(anim.position(), Point::new(124, 115));
        }
    }

    #[test]
    fn test_delta_model_equal_steps_finish_on_last_step() {
        for n in [10_u32, 30, 60, 144] {
            let mut anim = slide(TimingModel::Delta, 1.0);
            let dt = 1.0 / n as f32;
            for i in 1..n {
                assert!(!anim.step(dt), "n = {n}: finished early at step {i}");
            }
            assert!(anim.step(dt), "n = {n}: not finished after {n} steps");
            assert_eq!(anim.position(), Point::new(124, 115));
        }
    }

    #[test]
    fn test_delta_model_monotonic() {
        let mut anim = slide(TimingModel::Delta, 1.0);
        let mut last_y = anim.position().y;
        while !anim.step(0.05) {
            assert!(anim.position().y <= last_y);
            last_y = anim.position().y;
        }
    }

    #[test]
    fn test_zero_duration_completes_on_first_step() {
        let mut anim = slide(TimingModel::Delta, 0.0);
        assert!(anim.step(0.0));
        assert_eq!(anim.position(), Point::new(124, 115));

        let mut anim = slide(TimingModel::Frames, 0.0);
        assert!(anim.step(0.0));
    }

    #[test]
    fn test_step_after_finish_is_noop() {
        let mut anim = slide(TimingModel::Delta, 0.1);
        assert!(anim.step(1.0));
        assert!(anim.step(1.0));
        assert_eq!(anim.position(), Point::new(124, 115));
    }

    #[test]
    fn test_reverse() {
        let mut anim = slide(TimingModel::Delta, 0.5);
        anim.step(1.0);
        anim.reverse();
        assert!(!anim.is_finished());
        assert_eq!(anim.start(), Point::new(124, 115));
        assert_eq!(anim.position(), Point::new(124, 115));
        assert!(anim.step(1.0));
        assert_eq!(anim.position(), Point::new(124, 211));
    }
}
