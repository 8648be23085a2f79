//! # Engine 模块
//!
//! 涟漪生命周期状态机。
//!
//! ## 每个表面的状态
//!
//! ```text
//!          create                release                grow 结束
//! Idle ───────────► Growing ───────────► ReleasePending ──────────► Fading ──► Idle
//!                      │                                              ▲   （淡出结束，销毁）
//!                      └──── 生长已结束时 release 直接进入 ────────────┘
//! ```
//!
//! 同一表面上的新激活会把尚未释放的旧涟漪强制释放（打断）：
//! 旧涟漪立即解绑监听，生长结束后照常淡出，不会在生长中途中止。
//!
//! ## 侧表
//!
//! 引擎按表面身份（指针地址）记录至多一个活动涟漪。表面只被弱引用，
//! 已被宿主丢弃的表面会在下一次 `create` 或 [`RippleEngine::prune`] 时清理，
//! 其涟漪被强制释放，图形照常淡出销毁。引擎本身被丢弃时同样释放全部涟漪。

mod ripple;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::animation::{GROW_FROM, GROW_TO};
use crate::color::{RippleOverrides, resolve_paint};
use crate::config::RippleConfig;
use crate::event::ActivationEvent;
use crate::geometry::{compute_local_point, compute_radius};
use crate::platform::{Platform, Positioning, ShapeStyle, Surface};
use crate::timing;

use ripple::ActiveRipple;
pub use ripple::RippleId;

/// 表面身份（指针地址）
type SurfaceKey = usize;

fn surface_key(surface: &dyn Surface) -> SurfaceKey {
    (surface as *const dyn Surface).cast::<()>() as usize
}

/// 表面当前的涟漪阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RipplePhase {
    /// 没有活动涟漪
    Idle,
    /// 正在生长或生长完毕等待释放
    Growing,
    /// 已释放，等待生长结束
    ReleasePending,
    /// 正在淡出
    Fading,
}

struct Tracked {
    surface: Weak<dyn Surface>,
    ripple: Rc<ActiveRipple>,
}

/// 引擎与各涟漪共享的状态
///
/// 借用只在引擎内部短暂持有，从不跨越对渲染层或回调的调用。
struct EngineShared {
    table: RefCell<HashMap<SurfaceKey, Tracked>>,
    next_id: Cell<u64>,
}

/// 涟漪引擎
pub struct RippleEngine {
    platform: Rc<dyn Platform>,
    config: RippleConfig,
    shared: Rc<EngineShared>,
}

impl std::fmt::Debug for RippleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RippleEngine")
            .field("config", &self.config)
            .field("tracked", &self.tracked_count())
            .finish()
    }
}

impl RippleEngine {
    /// 创建引擎
    pub fn new(platform: Rc<dyn Platform>, config: RippleConfig) -> Self {
        Self {
            platform,
            config,
            shared: Rc::new(EngineShared {
                table: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// 使用默认配置创建引擎
    pub fn with_defaults(platform: Rc<dyn Platform>) -> Self {
        Self::new(platform, RippleConfig::default())
    }

    /// 引擎配置
    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    /// 响应激活事件，在目标表面上创建涟漪
    ///
    /// 不会返回错误：渲染层不可用或事件没有目标时直接忽略。
    pub fn create(&self, event: &ActivationEvent, overrides: impl Into<RippleOverrides>) {
        if !self.platform.can_render() {
            trace!("渲染层不可用，忽略激活");
            return;
        }
        let Some(surface) = event.target.as_ref() else {
            trace!(kind = event.kind.name(), "事件没有目标表面，忽略激活");
            return;
        };
        let overrides = overrides.into();

        self.prune();
        prepare_host(surface.as_ref());

        // 几何与时长
        let bounds = surface.bounding_box();
        let origin = compute_local_point(&event.kind, &bounds);
        let radius = compute_radius(
            origin.x,
            origin.y,
            bounds.width,
            bounds.height,
            self.config.bleed_px,
        );
        let timings = timing::plan(&self.config, radius, self.platform.prefers_reduced_motion());

        let key = surface_key(surface.as_ref());
        self.interrupt(key);

        // 图形
        let paint = resolve_paint(
            surface.as_ref(),
            &overrides,
            &self.config,
            self.platform.as_ref(),
        );
        let style = ShapeStyle {
            left: origin.x - radius,
            top: origin.y - radius,
            diameter: radius * 2.0,
            paint,
            initial: GROW_FROM,
        };
        let visual = self.platform.create_shape(surface.as_ref(), &style);
        let grow = visual.animate(GROW_FROM, GROW_TO, timings.grow);

        let id = RippleId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);

        let ripple = ActiveRipple::start(
            id,
            key,
            visual,
            grow,
            timings.fade,
            &self.platform,
            Rc::downgrade(&self.shared),
        );
        let replaced = self.shared.table.borrow_mut().insert(
            key,
            Tracked {
                surface: Rc::downgrade(surface),
                ripple,
            },
        );

        debug!(
            ripple = %id,
            surface = %surface.label(),
            kind = event.kind.name(),
            x = origin.x,
            y = origin.y,
            radius,
            grow_ms = timings.grow.duration_ms,
            "创建涟漪"
        );
        drop(replaced);
    }

    /// 表面当前的涟漪阶段
    pub fn phase(&self, surface: &dyn Surface) -> RipplePhase {
        let Some(ripple) = self.tracked_ripple(surface) else {
            return RipplePhase::Idle;
        };

        if ripple.is_fading() {
            RipplePhase::Fading
        } else if ripple.is_released() {
            RipplePhase::ReleasePending
        } else {
            RipplePhase::Growing
        }
    }

    /// 表面当前记录的涟漪 ID
    pub fn active_ripple(&self, surface: &dyn Surface) -> Option<RippleId> {
        self.tracked_ripple(surface).map(|r| r.id())
    }

    /// 记录中的涟漪数量（每个表面至多一个）
    pub fn tracked_count(&self) -> usize {
        self.shared.table.borrow().len()
    }

    /// 清理已被丢弃的表面，返回清理数量
    ///
    /// 被清理表面上的涟漪会被强制释放，图形照常淡出销毁。
    pub fn prune(&self) -> usize {
        let mut dead = Vec::new();
        self.shared.table.borrow_mut().retain(|_, tracked| {
            if tracked.surface.strong_count() == 0 {
                dead.push(Rc::clone(&tracked.ripple));
                false
            } else {
                true
            }
        });

        for ripple in &dead {
            debug!(ripple = %ripple.id(), "表面已丢弃，清理涟漪");
            ripple.release();
        }
        dead.len()
    }

    fn tracked_ripple(&self, surface: &dyn Surface) -> Option<Rc<ActiveRipple>> {
        self.shared
            .table
            .borrow()
            .get(&surface_key(surface))
            .map(|tracked| Rc::clone(&tracked.ripple))
    }

    fn interrupt(&self, key: SurfaceKey) {
        let previous = self
            .shared
            .table
            .borrow()
            .get(&key)
            .map(|tracked| Rc::clone(&tracked.ripple));

        if let Some(previous) = previous {
            if !previous.is_released() {
                debug!(ripple = %previous.id(), "新激活打断旧涟漪");
                previous.release();
            }
        }
    }
}

impl Drop for RippleEngine {
    fn drop(&mut self) {
        // 记录中的涟漪全部强制释放，图形照常淡出销毁
        let remaining: Vec<Rc<ActiveRipple>> = self
            .shared
            .table
            .borrow_mut()
            .drain()
            .map(|(_, tracked)| tracked.ripple)
            .collect();

        for ripple in &remaining {
            debug!(ripple = %ripple.id(), "引擎销毁，释放涟漪");
            ripple.release();
        }
    }
}

/// 让表面可以承载涟漪：建立定位参照并裁剪溢出
fn prepare_host(surface: &dyn Surface) {
    if surface.positioning() == Positioning::Static {
        surface.set_positioning(Positioning::Relative);
    }
    surface.clip_overflow();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationTiming, EasingFunction};
    use crate::event::ReleaseEvent;
    use crate::geometry::Bounds;
    use crate::sim::{SimPlatform, SimSurface};

    fn setup() -> (Rc<SimPlatform>, RippleEngine, Rc<SimSurface>) {
        let sim = SimPlatform::new();
        let engine = RippleEngine::with_defaults(sim.clone());
        let card = SimSurface::new("card", Bounds::new(10.0, 20.0, 200.0, 100.0));
        (sim, engine, card)
    }

    #[test]
    fn test_create_prepares_host_and_shape() {
        let (sim, engine, card) = setup();
        assert_eq!(card.positioning(), Positioning::Static);

        // 视口 (110, 70) = 本地中心 (100, 50)
        let press = ActivationEvent::pointer(card.clone(), 110.0, 70.0);
        engine.create(&press, RippleOverrides::none());

        assert_eq!(card.positioning(), Positioning::Relative);
        assert!(card.is_clipped());
        assert_eq!(engine.tracked_count(), 1);
        assert_eq!(engine.phase(&*card), RipplePhase::Growing);
        assert_eq!(engine.active_ripple(&*card), Some(RippleId(1)));
        assert_eq!(sim.listener_count(), 1);

        let id = sim.shape_ids()[0];
        let style = sim.shape_style(id).unwrap();
        let radius = style.diameter / 2.0;
        assert!((radius - 115.8).abs() < 0.05);
        assert!((style.left - (100.0 - radius)).abs() < 1e-9);
        assert!((style.top - (50.0 - radius)).abs() < 1e-9);
        assert_eq!(style.initial, GROW_FROM);
    }

    #[test]
    fn test_positioned_host_is_kept() {
        let (_sim, engine, card) = setup();
        card.set_positioning(Positioning::Absolute);
        let press = ActivationEvent::keyboard(card.clone(), "Enter");
        engine.create(&press, RippleOverrides::none());
        assert_eq!(card.positioning(), Positioning::Absolute);
    }

    #[test]
    fn test_phase_transitions() {
        let (sim, engine, card) = setup();
        let press = ActivationEvent::pointer(card.clone(), 20.0, 30.0);
        engine.create(&press, RippleOverrides::none());

        // 生长中释放：等待生长结束
        sim.advance(100.0);
        sim.dispatch(&ReleaseEvent::PointerUp);
        assert_eq!(engine.phase(&*card), RipplePhase::ReleasePending);
        assert_eq!(sim.listener_count(), 0);

        // 生长（约 357ms）结束后开始淡出
        sim.advance(500.0);
        assert_eq!(engine.phase(&*card), RipplePhase::Fading);

        sim.advance(200.0);
        assert_eq!(engine.phase(&*card), RipplePhase::Idle);
        assert_eq!(engine.tracked_count(), 0);
        assert_eq!(sim.live_shapes(), 0);
    }

    #[test]
    fn test_release_after_grow_fades_immediately() {
        let (sim, engine, card) = setup();
        let press = ActivationEvent::pointer(card.clone(), 110.0, 70.0);
        engine.create(&press, RippleOverrides::none());

        sim.advance(1_000.0);
        assert_eq!(engine.phase(&*card), RipplePhase::Growing);

        sim.dispatch(&ReleaseEvent::TouchEnd);
        assert_eq!(engine.phase(&*card), RipplePhase::Fading);
        assert_eq!(sim.running_animations(), 1);
    }

    #[test]
    fn test_second_release_is_ignored() {
        let (sim, engine, card) = setup();
        let press = ActivationEvent::pointer(card.clone(), 110.0, 70.0);
        engine.create(&press, RippleOverrides::none());
        sim.advance(1_000.0);

        sim.dispatch(&ReleaseEvent::PointerUp);
        sim.dispatch(&ReleaseEvent::PointerLeave);
        sim.run_until_idle(16.0);

        let fades = sim
            .journal()
            .iter()
            .filter(|line| line.starts_with("animate #1 scale=1 opacity=1"))
            .count();
        assert_eq!(fades, 1);
    }

    #[test]
    fn test_interrupt_replaces_entry() {
        let (sim, engine, card) = setup();
        let event = ActivationEvent::pointer(card.clone(), 50.0, 50.0);

        engine.create(&event, RippleOverrides::none());
        engine.create(&event, RippleOverrides::none());

        assert_eq!(engine.tracked_count(), 1);
        assert_eq!(engine.active_ripple(&*card), Some(RippleId(2)));
        // 旧涟漪已解绑，只剩新涟漪的监听
        assert_eq!(sim.listener_count(), 1);
        assert_eq!(sim.live_shapes(), 2);

        sim.run_until_idle(16.0);
        assert_eq!(sim.live_shapes(), 1);
        assert_eq!(engine.phase(&*card), RipplePhase::Growing);
    }

    #[test]
    fn test_independent_surfaces() {
        let (sim, engine, card) = setup();
        let other = SimSurface::new("other", Bounds::from_size(40.0, 40.0));

        let on_card = ActivationEvent::pointer(card.clone(), 50.0, 50.0);
        let on_other = ActivationEvent::touch(other.clone(), 5.0, 5.0);
        engine.create(&on_card, RippleOverrides::none());
        engine.create(&on_other, RippleOverrides::none());
        assert_eq!(engine.tracked_count(), 2);
        assert_eq!(sim.listener_count(), 2);

        sim.dispatch(&ReleaseEvent::PointerUp);
        sim.run_until_idle(16.0);
        assert_eq!(engine.tracked_count(), 0);
        assert_eq!(sim.live_shapes(), 0);
    }

    #[test]
    fn test_prune_dropped_surface() {
        let (sim, engine, card) = setup();
        let temp = SimSurface::new("temp", Bounds::from_size(40.0, 40.0));
        let on_temp = ActivationEvent::pointer(temp.clone(), 5.0, 5.0);
        let on_card = ActivationEvent::pointer(card.clone(), 5.0, 5.0);
        engine.create(&on_temp, RippleOverrides::none());
        engine.create(&on_card, RippleOverrides::none());
        assert_eq!(engine.tracked_count(), 2);

        drop(on_temp);
        drop(temp);
        assert_eq!(engine.prune(), 1);
        assert_eq!(engine.tracked_count(), 1);
        assert_eq!(engine.prune(), 0);

        // 被清理的涟漪照常淡出销毁
        sim.run_until_idle(16.0);
        assert_eq!(sim.live_shapes(), 1);
    }

    #[test]
    fn test_configured_timings_reach_platform() {
        let sim = SimPlatform::new();
        let config = RippleConfig {
            min_grow_ms: 100.0,
            max_grow_ms: 100.0,
            fade_out_ms: 50.0,
            grow_easing: EasingFunction::Linear,
            ..RippleConfig::default()
        };
        let engine = RippleEngine::new(sim.clone(), config);
        let card = SimSurface::new("card", Bounds::from_size(100.0, 100.0));

        let press = ActivationEvent::pointer(card.clone(), 50.0, 50.0);
        engine.create(&press, RippleOverrides::none());
        let grow = AnimationTiming::new(100.0, EasingFunction::Linear);
        let expected = format!("in {}ms {}", grow.duration_ms, grow.easing);
        assert!(sim.journal().iter().any(|line| line.ends_with(&expected)));
        assert_eq!(engine.config().fade_out_ms, 50.0);
    }

    #[test]
    fn test_dropping_engine_disposes_ripples() {
        let (sim, engine, card) = setup();
        let other = SimSurface::new("other", Bounds::from_size(40.0, 40.0));
        let on_card = ActivationEvent::pointer(card.clone(), 110.0, 70.0);
        let on_other = ActivationEvent::keyboard(other.clone(), "Enter");
        engine.create(&on_card, RippleOverrides::none());
        engine.create(&on_other, RippleOverrides::none());
        assert_eq!(sim.listener_count(), 2);

        drop(engine);
        assert_eq!(sim.listener_count(), 0);
        assert_eq!(sim.live_shapes(), 2);

        sim.run_until_idle(16.0);
        assert_eq!(sim.live_shapes(), 0);
        assert_eq!(sim.running_animations(), 0);
    }
}
