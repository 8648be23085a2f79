//! # Easing 模块
//!
//! 缓动函数库，用于涟漪生长/淡出的时间插值。

use serde::{Deserialize, Serialize};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 缓入（先慢后快）
    EaseIn,
    /// 缓出（先快后慢）
    EaseOut,
    /// 缓入缓出（两头慢中间快）
    EaseInOut,
    /// 二次缓出
    EaseOutQuad,
    /// 三次缓出（涟漪生长默认曲线）
    EaseOutCubic,
    /// 正弦缓出
    EaseOutSine,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t * t * t,
            EasingFunction::EaseOut | EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseOutSine => (t * std::f64::consts::FRAC_PI_2).sin(),
        }
    }

    /// 名称（与配置文件中的写法一致）
    pub fn name(&self) -> &'static str {
        match self {
            EasingFunction::Linear => "linear",
            EasingFunction::EaseIn => "ease_in",
            EasingFunction::EaseOut => "ease_out",
            EasingFunction::EaseInOut => "ease_in_out",
            EasingFunction::EaseOutQuad => "ease_out_quad",
            EasingFunction::EaseOutCubic => "ease_out_cubic",
            EasingFunction::EaseOutSine => "ease_out_sine",
        }
    }
}

impl std::fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
