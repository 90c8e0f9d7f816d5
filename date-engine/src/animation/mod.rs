//! # Animation 模块
//!
//! 随时间推进的事件：立绘位置插值与瓦片转场。
//!
//! 两者都不处理输入，只在 `advance` 中推进；支持两种时间模型：
//!
//! - 按帧计数（[`TimingModel::Frames`]）：每个 tick 一帧，忽略 dt
//! - 按流逝时间（[`TimingModel::Delta`]）：累加 dt
//!
//! [`TimingModel::Frames`]: crate::config::TimingModel::Frames
//! [`TimingModel::Delta`]: crate::config::TimingModel::Delta

mod animator;
mod fade;

pub use animator::Animator;
pub use fade::Fade;

/// 按时间模型比较时长时的容差（秒）
///
/// 以等长 dt 推进恰好 `duration` 时，浮点累加可能比 `duration` 差几个 ulp。
pub(crate) const TIME_EPSILON: f64 = 1e-5;

/// 按帧模型下的总帧数：`round(帧率 × 时长)`
pub(crate) fn total_frames(frame_rate: u32, duration: f32) -> u32 {
    (frame_rate as f32 * duration.max(0.0)).round() as u32
}
