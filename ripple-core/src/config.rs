//! # Config 模块
//!
//! 涟漪引擎配置。
//!
//! ## 配置优先级
//!
//! 1. 单次调用的覆盖项（`RippleOverrides`，仅颜色相关）
//! 2. 引擎实例的配置（构造后不可变）
//! 3. 默认值（`RippleConfig::default()`）
//!
//! 配置文件中缺失的字段使用默认值。

use serde::{Deserialize, Serialize};

use crate::animation::EasingFunction;
use crate::error::ConfigError;

/// 自动颜色：按主题上下文选择黑/白
pub const AUTO_COLOR: &str = "auto";

/// 涟漪配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RippleConfig {
    /// 基础颜色：`"auto"` 或任意颜色字符串
    #[serde(default = "default_color")]
    pub color: String,

    /// 默认不透明度 (0.0 - 1.0)
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// 生长速度（px/ms）
    #[serde(default = "default_velocity")]
    pub velocity: f64,

    /// 最短生长时长（毫秒）
    #[serde(default = "default_min_grow_ms")]
    pub min_grow_ms: f64,

    /// 最长生长时长（毫秒）
    #[serde(default = "default_max_grow_ms")]
    pub max_grow_ms: f64,

    /// 淡出时长（毫秒）
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: f64,

    /// 半径额外外扩（像素），避免边角露缝
    #[serde(default = "default_bleed_px")]
    pub bleed_px: f64,

    /// 生长缓动
    #[serde(default = "default_grow_easing")]
    pub grow_easing: EasingFunction,

    /// 淡出缓动
    #[serde(default = "default_fade_easing")]
    pub fade_easing: EasingFunction,
}

// 默认值函数
fn default_color() -> String {
    AUTO_COLOR.to_string()
}

fn default_alpha() -> f64 {
    0.22
}

fn default_velocity() -> f64 {
    0.6
}

fn default_min_grow_ms() -> f64 {
    260.0
}

fn default_max_grow_ms() -> f64 {
    560.0
}

fn default_fade_out_ms() -> f64 {
    200.0
}

fn default_bleed_px() -> f64 {
    4.0
}

fn default_grow_easing() -> EasingFunction {
    EasingFunction::EaseOutCubic
}

fn default_fade_easing() -> EasingFunction {
    EasingFunction::Linear
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            alpha: default_alpha(),
            velocity: default_velocity(),
            min_grow_ms: default_min_grow_ms(),
            max_grow_ms: default_max_grow_ms(),
            fade_out_ms: default_fade_out_ms(),
            bleed_px: default_bleed_px(),
            grow_easing: default_grow_easing(),
            fade_easing: default_fade_easing(),
        }
    }
}

impl RippleConfig {
    /// 从 JSON 解析并校验
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为格式化的 JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 基础颜色是否为自动模式（`"auto"` 或空）
    pub fn is_auto_color(&self) -> bool {
        let color = self.color.trim();
        color.is_empty() || color.eq_ignore_ascii_case(AUTO_COLOR)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(invalid("alpha", "必须在 0.0 - 1.0 之间"));
        }

        if !self.velocity.is_finite() || self.velocity <= 0.0 {
            return Err(invalid("velocity", "必须是正数"));
        }

        for (field, value) in [
            ("min_grow_ms", self.min_grow_ms),
            ("max_grow_ms", self.max_grow_ms),
            ("fade_out_ms", self.fade_out_ms),
            ("bleed_px", self.bleed_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "必须是非负有限数"));
            }
        }

        if self.min_grow_ms > self.max_grow_ms {
            return Err(invalid("min_grow_ms", "不能大于 max_grow_ms"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RippleConfig::default();
        assert_eq!(config.color, "auto");
        assert_eq!(config.alpha, 0.22);
        assert_eq!(config.velocity, 0.6);
        assert_eq!(config.min_grow_ms, 260.0);
        assert_eq!(config.max_grow_ms, 560.0);
        assert_eq!(config.fade_out_ms, 200.0);
        assert_eq!(config.bleed_px, 4.0);
        assert!(config.is_auto_color());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RippleConfig::from_json(r##"{ "color": "#1e88e5", "alpha": 0.3 }"##).unwrap();
        assert_eq!(config.color, "#1e88e5");
        assert_eq!(config.alpha, 0.3);
        assert_eq!(config.fade_out_ms, 200.0);
        assert_eq!(config.grow_easing, EasingFunction::EaseOutCubic);
        assert!(!config.is_auto_color());
    }

    #[test]
    fn test_config_serialization() {
        let config = RippleConfig::default();
        let json = config.to_json_pretty().unwrap();

        // 反序列化
        let loaded = RippleConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_validation() {
        let mut config = RippleConfig::default();

        // 无效透明度
        config.alpha = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field: "alpha", .. })
        ));
        config.alpha = f64::NAN;
        assert!(config.validate().is_err());
        config.alpha = 0.2;

        config.velocity = 0.0;
        assert!(config.validate().is_err());
        config.velocity = 0.6;

        config.min_grow_ms = 600.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation {
                field: "min_grow_ms",
                ..
            })
        ));
        config.min_grow_ms = 260.0;

        config.bleed_px = -1.0;
        assert!(config.validate().is_err());
        config.bleed_px = 4.0;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = RippleConfig::from_json("{ alpha: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = RippleConfig::from_json(r#"{ "velocity": -1 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation {
                field: "velocity",
                ..
            }
        ));
    }

    #[test]
    fn test_auto_color_variants() {
        let mut config = RippleConfig::default();
        for color in ["", "  ", "AUTO", "auto"] {
            config.color = color.to_string();
            assert!(config.is_auto_color(), "{color:?}");
        }
        config.color = "red".to_string();
        assert!(!config.is_auto_color());
    }
}
