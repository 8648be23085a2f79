//! # Color 模块
//!
//! 根据主题上下文与调用方覆盖项决定涟漪颜色。
//!
//! ## 解析顺序
//!
//! 1. 覆盖项给出 `color`：直接使用，完全绕过主题判断
//! 2. 基础颜色为 `"auto"`：深色上下文用白色，否则用黑色
//! 3. 固定基础颜色：按配置的透明度转换
//!
//! 所有输出都带显式 alpha 通道；无法解析的颜色原样返回。

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RippleConfig;
use crate::error::ColorParseError;
use crate::platform::{Platform, Surface};

/// 颜色模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Dark,
    Light,
}

impl ColorMode {
    /// 是否为深色
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl std::str::FromStr for ColorMode {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(ColorParseError::Unsupported {
                input: s.to_string(),
            }),
        }
    }
}

/// 单次调用的颜色覆盖项
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RippleOptions {
    /// 强制颜色模式
    #[serde(default)]
    pub mode: Option<ColorMode>,
    /// 透明度
    #[serde(default)]
    pub alpha: Option<f64>,
    /// 显式颜色（优先级最高）
    #[serde(default)]
    pub color: Option<String>,
}

/// 覆盖项：单独的模式标签，或完整的选项对象
///
/// JSON 中 `"dark"` 与 `{ "mode": "dark", "alpha": 0.3 }` 都可以反序列化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RippleOverrides {
    /// 仅模式
    Mode(ColorMode),
    /// 完整选项
    Options(RippleOptions),
}

impl Default for RippleOverrides {
    fn default() -> Self {
        Self::Options(RippleOptions::default())
    }
}

impl From<ColorMode> for RippleOverrides {
    fn from(mode: ColorMode) -> Self {
        Self::Mode(mode)
    }
}

impl From<RippleOptions> for RippleOverrides {
    fn from(options: RippleOptions) -> Self {
        Self::Options(options)
    }
}

impl RippleOverrides {
    /// 无覆盖
    pub fn none() -> Self {
        Self::default()
    }

    /// 强制的颜色模式
    pub fn mode(&self) -> Option<ColorMode> {
        match self {
            Self::Mode(mode) => Some(*mode),
            Self::Options(options) => options.mode,
        }
    }

    /// 覆盖的透明度（限制在 0.0 - 1.0，非有限值视为未提供）
    pub fn alpha(&self) -> Option<f64> {
        match self {
            Self::Mode(_) => None,
            Self::Options(options) => options
                .alpha
                .filter(|a| a.is_finite())
                .map(|a| a.clamp(0.0, 1.0)),
        }
    }

    /// 显式颜色
    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Mode(_) => None,
            Self::Options(options) => options
                .color
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty()),
        }
    }
}

/// 混合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    /// 正片叠底：浅色背景上的黑色涟漪不会泛白
    Multiply,
}

impl BlendMode {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
        }
    }
}

/// 解析后的绘制参数
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    /// 带 alpha 通道的颜色字符串
    pub color: String,
    /// 混合模式
    pub blend: BlendMode,
}

/// RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 透明度 (0.0 - 1.0)
    pub a: f64,
}

impl Rgba {
    /// 创建颜色
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: normalize_alpha(a),
        }
    }

    /// 白色
    pub fn white(alpha: f64) -> Self {
        Self::new(255, 255, 255, alpha)
    }

    /// 黑色
    pub fn black(alpha: f64) -> Self {
        Self::new(0, 0, 0, alpha)
    }

    /// 解析十六进制颜色（`#rgb` / `#rgba` / `#rrggbb` / `#rrggbbaa`）
    ///
    /// 3/4 位先按通道重复展开；8 位自带的 alpha 覆盖 `fallback_alpha`。
    pub fn from_hex(input: &str, fallback_alpha: f64) -> Result<Self, ColorParseError> {
        let hex = input
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::Unsupported {
                input: input.to_string(),
            })?;

        let mut digits = Vec::with_capacity(8);
        for (index, c) in hex.chars().enumerate() {
            let digit = c
                .to_digit(16)
                .ok_or(ColorParseError::InvalidDigit { index })?;
            digits.push(digit as u8);
        }

        // #rgb / #rgba 展开为 #rrggbb / #rrggbbaa
        let bytes: Vec<u8> = match digits.len() {
            3 | 4 => digits.iter().map(|d| (d << 4) | d).collect(),
            6 | 8 => digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect(),
            len => return Err(ColorParseError::InvalidLength { len }),
        };

        let alpha = match bytes.get(3) {
            Some(a) => f64::from(*a) / 255.0,
            None => fallback_alpha,
        };
        Ok(Self::new(bytes[0], bytes[1], bytes[2], alpha))
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            self.r,
            self.g,
            self.b,
            format_alpha(self.a)
        )
    }
}

fn normalize_alpha(a: f64) -> f64 {
    if a.is_finite() {
        a.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// alpha 保留 3 位小数
fn format_alpha(a: f64) -> String {
    let rounded = (normalize_alpha(a) * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

/// 把颜色转为带显式 alpha 的形式
///
/// - 十六进制：解析为 `rgba(r,g,b,a)`
/// - `rgb()` / `hsl()`：补上 alpha，变为 `rgba()` / `hsla()`
/// - `rgba()` / `hsla()`：已带 alpha，原样返回
/// - 缺省：黑色
/// - 其他（颜色名等）：原样返回
pub fn to_rgba_like(input: Option<&str>, fallback_alpha: f64) -> String {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Rgba::black(fallback_alpha).to_string();
    };

    if raw.starts_with('#') {
        return match Rgba::from_hex(raw, fallback_alpha) {
            Ok(rgba) => rgba.to_string(),
            Err(e) => {
                warn!(color = raw, error = %e, "颜色解析失败，原样使用");
                raw.to_string()
            }
        };
    }

    if let Some(functional) = with_functional_alpha(raw, fallback_alpha) {
        return functional;
    }

    debug!(color = raw, "无法转换的颜色，原样使用");
    raw.to_string()
}

/// 函数式颜色补 alpha；不是 rgb/hsl 系列时返回 `None`
fn with_functional_alpha(raw: &str, alpha: f64) -> Option<String> {
    let open = raw.find('(')?;
    let body = raw[open + 1..].strip_suffix(')')?;
    let name = raw[..open].trim().to_ascii_lowercase();

    let args: Vec<&str> = body
        .split([',', '/', ' '])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();

    match (name.as_str(), args.len()) {
        ("rgb" | "rgba" | "hsl" | "hsla", 4) => Some(raw.to_string()),
        ("rgb" | "rgba", 3) => Some(format!("rgba({},{})", args.join(","), format_alpha(alpha))),
        ("hsl" | "hsla", 3) => Some(format!("hsla({},{})", args.join(","), format_alpha(alpha))),
        _ => None,
    }
}

/// 判断表面是否处于深色上下文
///
/// 依次检查，命中深色即返回：
/// 1. 文档根节点的深色标记
/// 2. 自身或最近祖先的 `data-theme` 恰为 `dark`（区分大小写，其他值继续往下判断）
/// 3. 环境的配色偏好
/// 4. 默认浅色
pub fn is_dark_context(surface: &dyn Surface, platform: &dyn Platform) -> bool {
    if platform.root_dark_marker() {
        return true;
    }

    if surface.theme_attribute().as_deref() == Some("dark") {
        return true;
    }

    platform.prefers_dark_scheme().unwrap_or(false)
}

/// 解析颜色与混合模式
pub fn resolve_paint(
    surface: &dyn Surface,
    overrides: &RippleOverrides,
    config: &RippleConfig,
    platform: &dyn Platform,
) -> Paint {
    let alpha = overrides.alpha().unwrap_or(config.alpha);

    // 显式颜色优先，与主题无关
    if let Some(color) = overrides.color() {
        return Paint {
            color: to_rgba_like(Some(color), alpha),
            blend: BlendMode::Normal,
        };
    }

    if config.is_auto_color() {
        let dark = match overrides.mode() {
            Some(mode) => mode.is_dark(),
            None => is_dark_context(surface, platform),
        };

        return if dark {
            Paint {
                color: Rgba::white(alpha).to_string(),
                blend: BlendMode::Normal,
            }
        } else {
            Paint {
                color: Rgba::black(alpha).to_string(),
                blend: BlendMode::Multiply,
            }
        };
    }

    // 固定颜色只使用配置的透明度，单次调用的 alpha 不生效
    Paint {
        color: to_rgba_like(Some(&config.color), config.alpha),
        blend: BlendMode::Normal,
    }
}

/// 解析颜色字符串
pub fn resolve_color(
    surface: &dyn Surface,
    overrides: &RippleOverrides,
    config: &RippleConfig,
    platform: &dyn Platform,
) -> String {
    resolve_paint(surface, overrides, config, platform).color
}
