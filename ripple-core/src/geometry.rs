//! # Geometry 模块
//!
//! 计算涟漪的原点与半径。
//!
//! 半径取原点到包围盒四个角的最大距离再加 `bleed_px`，
//! 保证完全展开的圆覆盖整个表面（表面裁剪溢出，不会出现露角）。

use serde::{Deserialize, Serialize};

use crate::event::ActivationKind;

/// 二维点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// 创建点
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 两个坐标是否都是有限值
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 到另一点的欧氏距离
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// 表面的包围盒（视口坐标）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// 创建包围盒
    ///
    /// 负数或非有限的尺寸按 0 处理。
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: finite_or_zero(left),
            top: finite_or_zero(top),
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
        }
    }

    /// 位于原点的包围盒
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// 本地坐标系下的中心点
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// 视口坐标转为本地坐标，限制在 `[0, width] × [0, height]`
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(
            (client.x - self.left).clamp(0.0, self.width),
            (client.y - self.top).clamp(0.0, self.height),
        )
    }

    /// 四个角（本地坐标）
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(0.0, self.height),
            Point::new(self.width, self.height),
        ]
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// 计算激活点在表面内的本地坐标
///
/// | 事件类型 | 取点方式 |
/// |----------|----------|
/// | 触摸 | 第一个触点 |
/// | 键盘 | 表面中心 |
/// | 指针 | 视口坐标 |
/// | 坐标缺失 | 表面中心 |
pub fn compute_local_point(kind: &ActivationKind, bounds: &Bounds) -> Point {
    match kind.client_point() {
        Some(client) if client.is_finite() => bounds.to_local(client),
        _ => bounds.center(),
    }
}

/// 计算覆盖整个表面所需的半径
///
/// `r = max(到四个角的距离) + bleed_px`
pub fn compute_radius(x: f64, y: f64, width: f64, height: f64, bleed_px: f64) -> f64 {
    let origin = Point::new(x, y);
    let farthest = Bounds::from_size(width, height)
        .corners()
        .into_iter()
        .map(|corner| origin.distance(corner))
        .fold(0.0, f64::max);
    farthest + bleed_px
}
