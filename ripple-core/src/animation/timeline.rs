//! # Timeline 模块
//!
//! 两关键帧动画实例：在 `duration_ms` 内把 `Keyframe` 从 `from` 插值到 `to`。
//!
//! 真实渲染层自带动画引擎，不需要它；模拟渲染层（[`crate::sim`]）
//! 用它按帧推进并在结束时完成对应的 [`AnimationHandle`](super::AnimationHandle)。

use serde::{Deserialize, Serialize};

use super::{AnimationState, EasingFunction};

/// 关键帧：缩放 + 不透明度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// 缩放（1.0 = 完整直径）
    pub scale: f64,
    /// 不透明度 (0.0 - 1.0)
    pub opacity: f64,
}

impl Keyframe {
    /// 创建关键帧
    pub const fn new(scale: f64, opacity: f64) -> Self {
        Self { scale, opacity }
    }

    /// 线性插值，`t` 为已应用缓动的进度
    pub fn lerp(&self, to: &Keyframe, t: f64) -> Keyframe {
        Keyframe {
            scale: self.scale + (to.scale - self.scale) * t,
            opacity: self.opacity + (to.opacity - self.opacity) * t,
        }
    }
}

impl std::fmt::Display for Keyframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scale={} opacity={}", self.scale, self.opacity)
    }
}

/// 动画时长与缓动
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    /// 时长（毫秒），0 表示瞬时
    pub duration_ms: f64,
    /// 缓动函数
    pub easing: EasingFunction,
}

impl AnimationTiming {
    /// 创建时长配置
    pub fn new(duration_ms: f64, easing: EasingFunction) -> Self {
        Self {
            duration_ms: if duration_ms.is_finite() {
                duration_ms.max(0.0)
            } else {
                0.0
            },
            easing,
        }
    }

    /// 瞬时（减少动态效果时使用）
    pub fn instant() -> Self {
        Self::new(0.0, EasingFunction::Linear)
    }

    /// 是否为瞬时动画
    pub fn is_instant(&self) -> bool {
        self.duration_ms <= 0.0
    }
}

/// 关键帧动画实例
#[derive(Debug, Clone)]
pub struct Animation {
    /// 起始帧
    pub from: Keyframe,
    /// 目标帧
    pub to: Keyframe,
    /// 时长与缓动
    pub timing: AnimationTiming,
    /// 当前状态
    pub state: AnimationState,
    /// 当前进度（0.0 - 1.0，已应用缓动）
    pub progress: f64,
    /// 已经过的时间（毫秒）
    elapsed_ms: f64,
}

impl Animation {
    /// 创建动画
    ///
    /// 时长为 0 的动画直接处于 `Completed`，但完成通知仍由驱动方在下一次推进时发出。
    pub fn new(from: Keyframe, to: Keyframe, timing: AnimationTiming) -> Self {
        let (state, progress) = if timing.is_instant() {
            (AnimationState::Completed, 1.0)
        } else {
            (AnimationState::Playing, 0.0)
        };

        Self {
            from,
            to,
            timing,
            state,
            progress,
            elapsed_ms: 0.0,
        }
    }

    /// 更新动画
    ///
    /// # 返回
    /// - `true`: 动画仍在进行中
    /// - `false`: 动画已结束
    pub fn update(&mut self, dt_ms: f64) -> bool {
        if self.state.is_finished() {
            return false;
        }

        self.elapsed_ms += dt_ms.max(0.0);
        let raw_progress = self.elapsed_ms / self.timing.duration_ms;
        if raw_progress >= 1.0 {
            self.progress = 1.0;
            self.state = AnimationState::Completed;
            false
        } else {
            self.progress = self.timing.easing.apply(raw_progress);
            true
        }
    }

    /// 当前帧
    pub fn current(&self) -> Keyframe {
        self.from.lerp(&self.to, self.progress)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_animation() -> Animation {
        Animation::new(
            Keyframe::new(0.0, 1.0),
            Keyframe::new(1.0, 1.0),
            AnimationTiming::new(100.0, EasingFunction::Linear),
        )
    }

    #[test]
    fn test_animation_update() {
        let mut anim = create_test_animation();
        assert_eq!(anim.state, AnimationState::Playing);

        // 进行中
        assert!(anim.update(40.0));
        assert!((anim.current().scale - 0.4).abs() < 1e-9);
        assert_eq!(anim.current().opacity, 1.0);

        // 完成
        assert!(!anim.update(60.0));
        assert_eq!(anim.state, AnimationState::Completed);
        assert_eq!(anim.current(), Keyframe::new(1.0, 1.0));

        // 完成后不再推进
        assert!(!anim.update(10.0));
    }

    #[test]
    fn test_zero_duration() {
        let anim = Animation::new(
            Keyframe::new(1.0, 1.0),
            Keyframe::new(1.0, 0.0),
            AnimationTiming::instant(),
        );
        assert!(anim.is_finished());
        assert_eq!(anim.current().opacity, 0.0);
    }

    #[test]
    fn test_timing_sanitizes_duration() {
        assert!(AnimationTiming::new(-5.0, EasingFunction::Linear).is_instant());
        assert!(AnimationTiming::new(f64::NAN, EasingFunction::Linear).is_instant());
        assert_eq!(
            AnimationTiming::new(120.0, EasingFunction::Linear).duration_ms,
            120.0
        );
    }
}
