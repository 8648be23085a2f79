//! # Event 模块
//!
//! 定义激活事件（触发涟漪）与释放事件（结束涟漪）。
//!
//! ## 设计说明
//!
//! - 指针 / 触摸 / 键盘携带的坐标形状不同，用带标签的枚举区分，
//!   每个变体各自提取坐标，不做运行时字段探测
//! - 事件分发属于宿主 UI 框架，这里只定义引擎消费的语义化事件

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::platform::Surface;

/// 键盘按键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    /// 回车
    Enter,
    /// 空格
    Space,
    /// 其他按键（保留原始名称）
    Other(String),
}

impl Key {
    /// 按 DOM `KeyboardEvent.key` 的写法解析
    pub fn parse(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            other => Key::Other(other.to_string()),
        }
    }

    /// 是否为激活键（只有 Space / Enter 能结束键盘触发的涟漪）
    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }

    /// 按键名称
    pub fn name(&self) -> &str {
        match self {
            Key::Enter => "Enter",
            Key::Space => "Space",
            Key::Other(name) => name,
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::parse(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::parse(&name)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.name().to_string()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 激活事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivationKind {
    /// 指针按下（鼠标 / 笔）
    Pointer {
        /// 视口坐标，缺失时取表面中心
        #[serde(default)]
        client: Option<Point>,
    },

    /// 触摸开始
    Touch {
        /// 触点列表（视口坐标），取第一个
        #[serde(default)]
        touches: Vec<Point>,
    },

    /// 键盘激活，总是以表面中心为原点
    Keyboard { key: Key },
}

impl ActivationKind {
    /// 指针事件
    pub fn pointer(client: Point) -> Self {
        Self::Pointer {
            client: Some(client),
        }
    }

    /// 单点触摸事件
    pub fn touch(point: Point) -> Self {
        Self::Touch {
            touches: vec![point],
        }
    }

    /// 键盘事件
    pub fn keyboard(key: impl Into<Key>) -> Self {
        Self::Keyboard { key: key.into() }
    }

    /// 事件携带的视口坐标
    pub fn client_point(&self) -> Option<Point> {
        match self {
            Self::Pointer { client } => *client,
            Self::Touch { touches } => touches.first().copied(),
            Self::Keyboard { .. } => None,
        }
    }

    /// 事件类型名称（日志用）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pointer { .. } => "pointer",
            Self::Touch { .. } => "touch",
            Self::Keyboard { .. } => "keyboard",
        }
    }
}

/// 激活事件
///
/// `target` 为空表示事件没有可解析的目标表面，引擎直接忽略。
#[derive(Clone)]
pub struct ActivationEvent {
    /// 目标表面
    pub target: Option<Rc<dyn Surface>>,
    /// 事件类型与坐标
    pub kind: ActivationKind,
}

impl std::fmt::Debug for ActivationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationEvent")
            .field("target", &self.target.as_ref().map(|s| s.label()))
            .field("kind", &self.kind)
            .finish()
    }
}

impl ActivationEvent {
    /// 创建激活事件
    pub fn new(target: Rc<dyn Surface>, kind: ActivationKind) -> Self {
        Self {
            target: Some(target),
            kind,
        }
    }

    /// 没有目标表面的事件
    pub fn untargeted(kind: ActivationKind) -> Self {
        Self { target: None, kind }
    }

    /// 指针按下
    pub fn pointer(target: Rc<dyn Surface>, x: f64, y: f64) -> Self {
        Self::new(target, ActivationKind::pointer(Point::new(x, y)))
    }

    /// 触摸开始
    pub fn touch(target: Rc<dyn Surface>, x: f64, y: f64) -> Self {
        Self::new(target, ActivationKind::touch(Point::new(x, y)))
    }

    /// 键盘激活
    pub fn keyboard(target: Rc<dyn Surface>, key: impl Into<Key>) -> Self {
        Self::new(target, ActivationKind::keyboard(key))
    }
}

/// 释放事件
///
/// 全局监听（不仅限于表面），在表面外松开指针同样结束涟漪。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseEvent {
    /// 指针抬起
    PointerUp,
    /// 指针离开表面
    PointerLeave,
    /// 触摸结束
    TouchEnd,
    /// 触摸取消
    TouchCancel,
    /// 键盘按键
    Key { key: Key },
}

impl ReleaseEvent {
    /// 键盘释放事件
    pub fn key(key: impl Into<Key>) -> Self {
        Self::Key { key: key.into() }
    }

    /// 该事件是否结束涟漪
    ///
    /// 键盘事件只有 Space / Enter 生效，其余按键忽略。
    pub fn ends_ripple(&self) -> bool {
        match self {
            Self::Key { key } => key.is_activation(),
            _ => true,
        }
    }
}

impl std::fmt::Display for ReleaseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PointerUp => f.write_str("pointer_up"),
            Self::PointerLeave => f.write_str("pointer_leave"),
            Self::TouchEnd => f.write_str("touch_end"),
            Self::TouchCancel => f.write_str("touch_cancel"),
            Self::Key { key } => write!(f, "key({key})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("Enter"), Key::Enter);
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse("Spacebar"), Key::Space);
        assert_eq!(Key::parse("Tab"), Key::Other("Tab".to_string()));
        assert!(Key::Enter.is_activation());
        assert!(!Key::parse("Tab").is_activation());
    }

    #[test]
    fn test_release_triggers() {
        assert!(ReleaseEvent::PointerUp.ends_ripple());
        assert!(ReleaseEvent::PointerLeave.ends_ripple());
        assert!(ReleaseEvent::TouchEnd.ends_ripple());
        assert!(ReleaseEvent::TouchCancel.ends_ripple());
        assert!(ReleaseEvent::key(" ").ends_ripple());
        assert!(ReleaseEvent::key("Enter").ends_ripple());
        assert!(!ReleaseEvent::key("Tab").ends_ripple());
        assert!(!ReleaseEvent::key("a").ends_ripple());
    }

    #[test]
    fn test_client_point_per_kind() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(ActivationKind::pointer(p).client_point(), Some(p));
        assert_eq!(ActivationKind::touch(p).client_point(), Some(p));
        assert_eq!(ActivationKind::keyboard("Enter").client_point(), None);
    }

    #[test]
    fn test_event_serialization() {
        let kind: ActivationKind =
            serde_json::from_str(r#"{"type":"pointer","client":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(kind, ActivationKind::pointer(Point::new(1.0, 2.0)));

        let kind: ActivationKind =
            serde_json::from_str(r#"{"type":"keyboard","key":" "}"#).unwrap();
        assert_eq!(kind, ActivationKind::Keyboard { key: Key::Space });

        let release: ReleaseEvent = serde_json::from_str(r#"{"type":"key","key":"Tab"}"#).unwrap();
        assert_eq!(release, ReleaseEvent::key("Tab"));
        assert_eq!(release.to_string(), "key(Tab)");

        let json = serde_json::to_string(&ReleaseEvent::TouchCancel).unwrap();
        assert_eq!(json, r#"{"type":"touch_cancel"}"#);
    }
}
