//! 单个涟漪的生命周期：生长 → 释放 → 淡出 → 销毁

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::{EngineShared, SurfaceKey};
use crate::animation::{AnimationHandle, AnimationTiming, FADE_TO, GROW_TO};
use crate::event::ReleaseEvent;
use crate::platform::{Platform, ReleaseBinding, ReleaseHandler, Shape};

/// 涟漪 ID（引擎内单调递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RippleId(pub u64);

impl std::fmt::Display for RippleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// 表面上的活动涟漪
///
/// `released` 只会从 false 变为 true 一次；之后的释放事件全部忽略。
/// 生长与淡出通过句柄回调串联，淡出永远在生长结束后开始。
pub(super) struct ActiveRipple {
    id: RippleId,
    key: SurfaceKey,
    visual: RefCell<Option<Box<dyn Shape>>>,
    grow: AnimationHandle,
    fade: RefCell<Option<AnimationHandle>>,
    fade_timing: AnimationTiming,
    released: Cell<bool>,
    binding: ReleaseBinding,
    engine: Weak<EngineShared>,
}

impl ActiveRipple {
    /// 接管已开始生长的图形，并注册全局释放监听
    pub(super) fn start(
        id: RippleId,
        key: SurfaceKey,
        visual: Box<dyn Shape>,
        grow: AnimationHandle,
        fade_timing: AnimationTiming,
        platform: &Rc<dyn Platform>,
        engine: Weak<EngineShared>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me: &Weak<ActiveRipple>| {
            let me = me.clone();
            let handler: ReleaseHandler = Rc::new(move |event: &ReleaseEvent| {
                if !event.ends_ripple() {
                    trace!(event = %event, "忽略非释放按键");
                    return;
                }
                if let Some(ripple) = me.upgrade() {
                    ripple.release();
                }
            });

            Self {
                id,
                key,
                visual: RefCell::new(Some(visual)),
                grow,
                fade: RefCell::new(None),
                fade_timing,
                released: Cell::new(false),
                binding: ReleaseBinding::bind(platform, handler),
                engine,
            }
        })
    }

    pub(super) fn id(&self) -> RippleId {
        self.id
    }

    pub(super) fn is_released(&self) -> bool {
        self.released.get()
    }

    pub(super) fn is_fading(&self) -> bool {
        self.fade.borrow().is_some()
    }

    /// 释放：解绑监听，生长结束后开始淡出
    ///
    /// 用户松开与被新激活打断走同一条路径。
    pub(super) fn release(self: &Rc<Self>) {
        if self.released.replace(true) {
            return;
        }
        self.binding.unbind();
        debug!(
            ripple = %self.id,
            grow_finished = self.grow.is_finished(),
            "涟漪释放"
        );

        let me = Rc::clone(self);
        self.grow.on_finish(move || me.start_fade());
    }

    fn start_fade(self: &Rc<Self>) {
        let handle = match self.visual.borrow().as_ref() {
            Some(visual) => visual.animate(GROW_TO, FADE_TO, self.fade_timing),
            None => AnimationHandle::finished(),
        };
        debug!(
            ripple = %self.id,
            fade_ms = self.fade_timing.duration_ms,
            "开始淡出"
        );

        *self.fade.borrow_mut() = Some(handle.clone());
        let me = Rc::clone(self);
        handle.on_finish(move || me.dispose());
    }

    fn dispose(&self) {
        let visual = self.visual.borrow_mut().take();
        if let Some(visual) = visual {
            visual.remove();
        }

        let Some(engine) = self.engine.upgrade() else {
            return;
        };
        let removed = {
            let mut table = engine.table.borrow_mut();
            // 表项可能已被新涟漪替换
            let is_current = table
                .get(&self.key)
                .is_some_and(|tracked| std::ptr::eq(Rc::as_ptr(&tracked.ripple), self));
            if is_current {
                table.remove(&self.key)
            } else {
                None
            }
        };
        debug!(ripple = %self.id, cleared = removed.is_some(), "涟漪销毁");
        drop(removed);
    }
}

impl std::fmt::Debug for ActiveRipple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRipple")
            .field("id", &self.id)
            .field("released", &self.released.get())
            .field("grow", &self.grow.state())
            .field("fading", &self.is_fading())
            .field("binding", &self.binding)
            .finish()
    }
}
