//! # Platform 模块
//!
//! 引擎消费的渲染层契约。
//!
//! ```text
//! RippleEngine
//!   │  bounding_box / theme_attribute / positioning   ──► Surface
//!   │  create_shape / listen / unlisten / 环境偏好     ──► Platform
//!   │  animate / remove                              ──► Shape
//! ```
//!
//! 所有方法都取 `&self`：表面和渲染层由宿主共享持有，内部可变性由实现方负责。
//! 实现方不得在回调 `ReleaseHandler` 或动画完成回调时持有自身的借用。

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::animation::{AnimationHandle, AnimationTiming, Keyframe};
use crate::color::Paint;
use crate::event::ReleaseEvent;
use crate::geometry::Bounds;

/// 表面的定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// 未定位（涟漪无法以其为参照）
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// 承载涟漪的交互表面
pub trait Surface {
    /// 当前包围盒（视口坐标）
    fn bounding_box(&self) -> Bounds;

    /// 自身或最近祖先上的主题标记（`data-theme`）
    fn theme_attribute(&self) -> Option<String>;

    /// 当前定位方式
    fn positioning(&self) -> Positioning;

    /// 设置定位方式
    fn set_positioning(&self, positioning: Positioning);

    /// 裁剪溢出并隔离绘制
    fn clip_overflow(&self);

    /// 日志中显示的名称
    fn label(&self) -> String {
        String::from("surface")
    }
}

/// 涟漪图形的初始样式（本地坐标）
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    /// 左上角 x（= 原点 x - 半径）
    pub left: f64,
    /// 左上角 y（= 原点 y - 半径）
    pub top: f64,
    /// 直径（= 2 × 半径）
    pub diameter: f64,
    /// 颜色与混合模式
    pub paint: Paint,
    /// 初始帧
    pub initial: Keyframe,
}

/// 渲染层中的一个涟漪图形，由 `ActiveRipple` 独占
pub trait Shape {
    /// 播放两关键帧动画
    ///
    /// 渲染层不支持动画时返回 [`AnimationHandle::finished`]。
    fn animate(&self, from: Keyframe, to: Keyframe, timing: AnimationTiming) -> AnimationHandle;

    /// 从表面移除（消耗图形）
    fn remove(self: Box<Self>);
}

/// 全局释放事件回调
pub type ReleaseHandler = Rc<dyn Fn(&ReleaseEvent)>;

/// 监听器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// 渲染层与环境
pub trait Platform {
    /// 是否存在可渲染的上下文（服务端执行等场景为 false）
    fn can_render(&self) -> bool;

    /// 环境是否要求减少动态效果
    fn prefers_reduced_motion(&self) -> bool;

    /// 环境的深色配色偏好，`None` 表示未知
    fn prefers_dark_scheme(&self) -> Option<bool>;

    /// 文档根节点是否带有深色标记
    fn root_dark_marker(&self) -> bool;

    /// 在表面上创建图形
    fn create_shape(&self, surface: &dyn Surface, style: &ShapeStyle) -> Box<dyn Shape>;

    /// 注册全局释放事件监听
    fn listen(&self, handler: ReleaseHandler) -> ListenerId;

    /// 移除监听
    fn unlisten(&self, id: ListenerId);
}

/// 释放事件监听的绑定
///
/// 注册后返回的能力对象：[`unbind`](Self::unbind) 一次移除全部监听，
/// 重复调用无副作用；被丢弃时自动解绑。
pub struct ReleaseBinding {
    platform: Weak<dyn Platform>,
    listener: Cell<Option<ListenerId>>,
}

impl std::fmt::Debug for ReleaseBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseBinding")
            .field("listener", &self.listener.get())
            .finish()
    }
}

impl ReleaseBinding {
    /// 注册监听
    pub fn bind(platform: &Rc<dyn Platform>, handler: ReleaseHandler) -> Self {
        let id = platform.listen(handler);
        Self {
            platform: Rc::downgrade(platform),
            listener: Cell::new(Some(id)),
        }
    }

    /// 解绑（幂等）
    pub fn unbind(&self) {
        let Some(id) = self.listener.take() else {
            return;
        };
        if let Some(platform) = self.platform.upgrade() {
            platform.unlisten(id);
        }
    }

    /// 是否仍处于绑定状态
    pub fn is_bound(&self) -> bool {
        self.listener.get().is_some()
    }
}

impl Drop for ReleaseBinding {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimPlatform;

    #[test]
    fn test_binding_unbind_is_idempotent() {
        let sim = SimPlatform::new();
        let platform: Rc<dyn Platform> = sim.clone();

        let binding = ReleaseBinding::bind(&platform, Rc::new(|_: &ReleaseEvent| {}));
        assert!(binding.is_bound());
        assert_eq!(sim.listener_count(), 1);

        binding.unbind();
        binding.unbind();
        assert!(!binding.is_bound());
        assert_eq!(sim.listener_count(), 0);

        drop(binding);
        assert_eq!(sim.listener_count(), 0);
    }

    #[test]
    fn test_binding_released_on_drop() {
        let sim = SimPlatform::new();
        let platform: Rc<dyn Platform> = sim.clone();

        {
            let _binding = ReleaseBinding::bind(&platform, Rc::new(|_: &ReleaseEvent| {}));
            assert_eq!(sim.listener_count(), 1);
        }
        assert_eq!(sim.listener_count(), 0);
    }

    #[test]
    fn test_binding_outlives_platform() {
        let sim = SimPlatform::new();
        let platform: Rc<dyn Platform> = sim.clone();
        let binding = ReleaseBinding::bind(&platform, Rc::new(|_: &ReleaseEvent| {}));

        drop(platform);
        drop(sim);
        // 渲染层已释放，解绑只清除本地状态
        binding.unbind();
        assert!(!binding.is_bound());
    }
}
