//! # Timing 模块
//!
//! 生长/淡出时长策略。
//!
//! 生长时长与半径成正比（恒定速度），再限制在 `[min, max]` 内：
//! 小按钮不会一闪而过，大面板也不会拖太久。
//! 减少动态效果（reduced motion）时两个阶段都是 0。

use crate::animation::AnimationTiming;
use crate::config::RippleConfig;

/// 速度下限（px/ms），避免除零
pub const MIN_VELOCITY: f64 = 1e-3;

/// 计算生长时长（毫秒）
///
/// `ms = radius / max(velocity, ε)`，限制在 `[min_ms, max_ms]`；
/// `reduce_motion` 时恒为 0。
///
/// 参数倒置（`min_ms > max_ms`）或为 NaN 时不会 panic：结果偏向 `max_ms`。
pub fn compute_grow_ms(
    radius: f64,
    velocity: f64,
    min_ms: f64,
    max_ms: f64,
    reduce_motion: bool,
) -> f64 {
    if reduce_motion {
        return 0.0;
    }

    let ms = radius / velocity.max(MIN_VELOCITY);
    ms.max(min_ms).min(max_ms)
}

/// 计算淡出时长（毫秒）
pub fn compute_fade_ms(config: &RippleConfig, reduce_motion: bool) -> f64 {
    if reduce_motion {
        0.0
    } else {
        config.fade_out_ms
    }
}

/// 一次涟漪两个阶段的时长
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimings {
    /// 生长阶段
    pub grow: AnimationTiming,
    /// 淡出阶段
    pub fade: AnimationTiming,
}

/// 根据配置和半径生成两个阶段的时长
pub fn plan(config: &RippleConfig, radius: f64, reduce_motion: bool) -> PhaseTimings {
    let grow_ms = compute_grow_ms(
        radius,
        config.velocity,
        config.min_grow_ms,
        config.max_grow_ms,
        reduce_motion,
    );

    PhaseTimings {
        grow: AnimationTiming::new(grow_ms, config.grow_easing),
        fade: AnimationTiming::new(compute_fade_ms(config, reduce_motion), config.fade_easing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_ms_proportional_inside_range() {
        // 240px / 0.6 = 400ms
        let ms = compute_grow_ms(240.0, 0.6, 260.0, 560.0, false);
        assert!((ms - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_grow_ms_clamped() {
        for radius in [0.5, 1.0, 10.0, 115.8, 300.0, 1_000.0, 1e9] {
            for velocity in [0.01, 0.6, 2.0, 1e6] {
                let ms = compute_grow_ms(radius, velocity, 260.0, 560.0, false);
                assert!((260.0..=560.0).contains(&ms), "r={radius} v={velocity}");
            }
        }
    }

    #[test]
    fn test_reduce_motion_is_zero() {
        assert_eq!(compute_grow_ms(500.0, 0.6, 260.0, 560.0, true), 0.0);
        let config = RippleConfig::default();
        assert_eq!(compute_fade_ms(&config, true), 0.0);
        assert_eq!(compute_fade_ms(&config, false), 200.0);

        let timings = plan(&config, 120.0, true);
        assert!(timings.grow.is_instant());
        assert!(timings.fade.is_instant());
    }

    #[test]
    fn test_degenerate_inputs_do_not_panic() {
        // 速度为 0：取下限，结果被 max 截断
        assert_eq!(compute_grow_ms(100.0, 0.0, 260.0, 560.0, false), 560.0);
        assert_eq!(compute_grow_ms(100.0, f64::NAN, 260.0, 560.0, false), 560.0);
        assert_eq!(compute_grow_ms(f64::NAN, 0.6, 260.0, 560.0, false), 260.0);
        // min > max
        assert_eq!(compute_grow_ms(100.0, 0.6, 600.0, 300.0, false), 300.0);
    }

    #[test]
    fn test_plan_uses_configured_easing() {
        let config = RippleConfig::default();
        let timings = plan(&config, 115.8, false);
        assert_eq!(timings.grow.duration_ms, 260.0);
        assert_eq!(timings.grow.easing, config.grow_easing);
        assert_eq!(timings.fade.duration_ms, 200.0);
        assert_eq!(timings.fade.easing, config.fade_easing);
    }
}
