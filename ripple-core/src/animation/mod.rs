//! # Animation 模块
//!
//! 涟漪的两段动画（生长 → 淡出）所需的基础类型。
//!
//! ## 核心概念
//!
//! - `AnimationHandle`: 渲染层返回的句柄，可查询完成状态、挂接完成回调
//! - `Keyframe`: 缩放 + 不透明度关键帧
//! - `AnimationTiming`: 时长与缓动
//! - `Animation`: 按帧推进的关键帧插值（模拟渲染层使用）
//! - `EasingFunction`: 缓动函数
//!
//! ## 两段动画
//!
//! ```text
//! GROW_FROM ──grow──► GROW_TO ──fade──► FADE_TO
//! (scale≈0, 不透明)    (scale=1)         (scale=1, 透明)
//! ```

mod easing;
mod handle;
mod timeline;

pub use easing::EasingFunction;
pub use handle::AnimationHandle;
pub use timeline::{Animation, AnimationTiming, Keyframe};

/// 生长起点：接近 0 的缩放，完全不透明
pub const GROW_FROM: Keyframe = Keyframe::new(0.001, 1.0);
/// 生长终点：完整直径
pub const GROW_TO: Keyframe = Keyframe::new(1.0, 1.0);
/// 淡出终点：保持直径，完全透明
pub const FADE_TO: Keyframe = Keyframe::new(1.0, 0.0);

/// 动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    /// 正在播放
    #[default]
    Playing,
    /// 已完成
    Completed,
    /// 已跳过（未播放即结束，如渲染层不支持动画）
    Skipped,
}

impl AnimationState {
    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}
