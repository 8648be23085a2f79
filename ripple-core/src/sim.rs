//! # Sim 模块
//!
//! 内存中的模拟渲染层：无窗口宿主与测试替身。
//!
//! - 时间由调用方通过 [`SimPlatform::advance`] 显式推进，结果完全确定
//! - 每个可见操作都写入日志（journal），便于回放与快照对比
//! - 时长为 0 的动画在下一次 `advance`（包括 `advance(0.0)`）时发出完成通知

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::animation::{Animation, AnimationHandle, AnimationTiming, Keyframe};
use crate::event::ReleaseEvent;
use crate::geometry::Bounds;
use crate::platform::{
    ListenerId, Platform, Positioning, ReleaseHandler, Shape, ShapeStyle, Surface,
};

/// 防止 `run_until_idle` 在异常情况下死循环
const MAX_IDLE_STEPS: usize = 100_000;

/// 模拟图形 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u64);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 模拟表面
#[derive(Debug)]
pub struct SimSurface {
    name: String,
    bounds: Cell<Bounds>,
    theme: RefCell<Option<String>>,
    positioning: Cell<Positioning>,
    clipped: Cell<bool>,
    parent: Option<Rc<SimSurface>>,
}

impl SimSurface {
    /// 创建表面
    pub fn new(name: impl Into<String>, bounds: Bounds) -> Rc<Self> {
        Rc::new(Self::build(name.into(), bounds, None))
    }

    /// 创建挂在父表面下的表面（继承父级主题标记）
    pub fn with_parent(
        name: impl Into<String>,
        bounds: Bounds,
        parent: &Rc<SimSurface>,
    ) -> Rc<Self> {
        Rc::new(Self::build(name.into(), bounds, Some(parent.clone())))
    }

    fn build(name: String, bounds: Bounds, parent: Option<Rc<SimSurface>>) -> Self {
        Self {
            name,
            bounds: Cell::new(bounds),
            theme: RefCell::new(None),
            positioning: Cell::new(Positioning::Static),
            clipped: Cell::new(false),
            parent,
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置包围盒（模拟布局变化）
    pub fn set_bounds(&self, bounds: Bounds) {
        self.bounds.set(bounds);
    }

    /// 设置自身的主题标记
    pub fn set_theme(&self, theme: Option<&str>) {
        *self.theme.borrow_mut() = theme.map(str::to_string);
    }

    /// 是否已裁剪溢出
    pub fn is_clipped(&self) -> bool {
        self.clipped.get()
    }
}

impl Surface for SimSurface {
    fn bounding_box(&self) -> Bounds {
        self.bounds.get()
    }

    fn theme_attribute(&self) -> Option<String> {
        if let Some(theme) = self.theme.borrow().clone() {
            return Some(theme);
        }
        self.parent.as_ref().and_then(|p| p.theme_attribute())
    }

    fn positioning(&self) -> Positioning {
        self.positioning.get()
    }

    fn set_positioning(&self, positioning: Positioning) {
        self.positioning.set(positioning);
    }

    fn clip_overflow(&self) {
        self.clipped.set(true);
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// 模拟图形的记录
#[derive(Debug, Clone)]
struct ShapeRecord {
    surface: String,
    style: ShapeStyle,
    frame: Keyframe,
}

/// 运行中的动画
struct RunningAnimation {
    shape: ShapeId,
    animation: Animation,
    handle: AnimationHandle,
}

/// 模拟渲染层状态
struct SimState {
    render: bool,
    animations_supported: bool,
    reduce_motion: bool,
    dark_scheme: Option<bool>,
    root_dark: bool,
    clock_ms: f64,
    next_shape: u64,
    next_listener: u64,
    shapes: BTreeMap<ShapeId, ShapeRecord>,
    running: Vec<RunningAnimation>,
    listeners: BTreeMap<ListenerId, ReleaseHandler>,
    journal: Vec<String>,
}

/// 模拟渲染层
pub struct SimPlatform {
    me: Weak<SimPlatform>,
    state: RefCell<SimState>,
}

impl std::fmt::Debug for SimPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimPlatform")
            .field("clock_ms", &state.clock_ms)
            .field("shapes", &state.shapes.len())
            .field("running", &state.running.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl SimPlatform {
    /// 创建模拟渲染层（可渲染、支持动画、无环境偏好）
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            state: RefCell::new(SimState {
                render: true,
                animations_supported: true,
                reduce_motion: false,
                dark_scheme: None,
                root_dark: false,
                clock_ms: 0.0,
                next_shape: 1,
                next_listener: 1,
                shapes: BTreeMap::new(),
                running: Vec::new(),
                listeners: BTreeMap::new(),
                journal: Vec::new(),
            }),
        })
    }

    // ========== 环境设置 ==========

    /// 设置是否可渲染
    pub fn set_render(&self, render: bool) {
        self.state.borrow_mut().render = render;
    }

    /// 设置是否支持动画
    pub fn set_animations_supported(&self, supported: bool) {
        self.state.borrow_mut().animations_supported = supported;
    }

    /// 设置减少动态效果偏好
    pub fn set_reduced_motion(&self, reduce: bool) {
        self.state.borrow_mut().reduce_motion = reduce;
    }

    /// 设置深色配色偏好
    pub fn set_dark_scheme(&self, dark: Option<bool>) {
        self.state.borrow_mut().dark_scheme = dark;
    }

    /// 设置文档根节点深色标记
    pub fn set_root_dark(&self, dark: bool) {
        self.state.borrow_mut().root_dark = dark;
    }

    // ========== 驱动 ==========

    /// 推进时间，完成到期的动画并执行其回调
    pub fn advance(&self, dt_ms: f64) {
        let finished = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            state.clock_ms += dt_ms.max(0.0);

            let mut finished = Vec::new();
            let shapes = &mut state.shapes;
            state.running.retain_mut(|run| {
                let alive = run.animation.update(dt_ms);
                if let Some(record) = shapes.get_mut(&run.shape) {
                    record.frame = run.animation.current();
                }
                if !alive {
                    finished.push((run.shape, run.handle.clone()));
                }
                alive
            });

            for (shape, _) in &finished {
                state.journal.push(format!("finish {shape}"));
            }
            finished
        };

        // 回调可能再次调用本渲染层，必须在借用释放后执行
        for (_, handle) in finished {
            handle.complete();
        }
    }

    /// 以固定步长推进，直到没有运行中的动画
    ///
    /// 返回推进的步数。
    pub fn run_until_idle(&self, step_ms: f64) -> usize {
        let step_ms = if step_ms > 0.0 { step_ms } else { 16.0 };
        let mut steps = 0;
        while self.running_animations() > 0 && steps < MAX_IDLE_STEPS {
            self.advance(step_ms);
            steps += 1;
        }
        steps
    }

    /// 向所有监听器分发释放事件
    pub fn dispatch(&self, event: &ReleaseEvent) {
        let handlers: Vec<ReleaseHandler> = {
            let mut state = self.state.borrow_mut();
            state.journal.push(format!("dispatch {event}"));
            state.listeners.values().cloned().collect()
        };

        for handler in handlers {
            handler(event);
        }
    }

    // ========== 查询 ==========

    /// 当前时间（毫秒）
    pub fn clock_ms(&self) -> f64 {
        self.state.borrow().clock_ms
    }

    /// 存活的图形数量
    pub fn live_shapes(&self) -> usize {
        self.state.borrow().shapes.len()
    }

    /// 存活的图形 ID
    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.state.borrow().shapes.keys().copied().collect()
    }

    /// 图形当前帧
    pub fn shape_frame(&self, id: ShapeId) -> Option<Keyframe> {
        self.state.borrow().shapes.get(&id).map(|r| r.frame)
    }

    /// 图形的初始样式
    pub fn shape_style(&self, id: ShapeId) -> Option<ShapeStyle> {
        self.state.borrow().shapes.get(&id).map(|r| r.style.clone())
    }

    /// 图形所在表面
    pub fn shape_surface(&self, id: ShapeId) -> Option<String> {
        self.state
            .borrow()
            .shapes
            .get(&id)
            .map(|r| r.surface.clone())
    }

    /// 运行中的动画数量
    pub fn running_animations(&self) -> usize {
        self.state.borrow().running.len()
    }

    /// 已注册的监听器数量
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// 日志副本
    pub fn journal(&self) -> Vec<String> {
        self.state.borrow().journal.clone()
    }

    /// 取出并清空日志
    pub fn take_journal(&self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().journal)
    }

    // ========== 图形操作（供 SimShape 调用） ==========

    fn start_animation(
        &self,
        shape: ShapeId,
        from: Keyframe,
        to: Keyframe,
        timing: AnimationTiming,
    ) -> AnimationHandle {
        let mut state = self.state.borrow_mut();
        if !state.shapes.contains_key(&shape) {
            state
                .journal
                .push(format!("animate {shape} ignored (removed)"));
            return AnimationHandle::finished();
        }

        if !state.animations_supported {
            state.journal.push(format!("animate {shape} unsupported"));
            if let Some(record) = state.shapes.get_mut(&shape) {
                record.frame = to;
            }
            return AnimationHandle::finished();
        }

        state.journal.push(format!(
            "animate {shape} {from} -> {to} in {}ms {}",
            timing.duration_ms, timing.easing
        ));
        trace!(shape = %shape, duration_ms = timing.duration_ms, "模拟动画开始");

        let handle = AnimationHandle::new();
        state.running.push(RunningAnimation {
            shape,
            animation: Animation::new(from, to, timing),
            handle: handle.clone(),
        });
        handle
    }

    fn remove_shape(&self, shape: ShapeId) {
        let mut state = self.state.borrow_mut();
        if state.shapes.remove(&shape).is_some() {
            state.journal.push(format!("remove {shape}"));
        }
    }
}

impl Platform for SimPlatform {
    fn can_render(&self) -> bool {
        self.state.borrow().render
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.state.borrow().reduce_motion
    }

    fn prefers_dark_scheme(&self) -> Option<bool> {
        self.state.borrow().dark_scheme
    }

    fn root_dark_marker(&self) -> bool {
        self.state.borrow().root_dark
    }

    fn create_shape(&self, surface: &dyn Surface, style: &ShapeStyle) -> Box<dyn Shape> {
        let mut state = self.state.borrow_mut();
        let id = ShapeId(state.next_shape);
        state.next_shape += 1;

        let label = surface.label();
        state.journal.push(format!(
            "create {id} on {label} at ({:.1}, {:.1}) d={:.1} {} {}",
            style.left,
            style.top,
            style.diameter,
            style.paint.color,
            style.paint.blend.name()
        ));
        state.shapes.insert(
            id,
            ShapeRecord {
                surface: label,
                style: style.clone(),
                frame: style.initial,
            },
        );

        Box::new(SimShape {
            id,
            platform: self.me.clone(),
        })
    }

    fn listen(&self, handler: ReleaseHandler) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.insert(id, handler);
        state.journal.push(format!("listen {id}"));
        id
    }

    fn unlisten(&self, id: ListenerId) {
        let mut state = self.state.borrow_mut();
        if state.listeners.remove(&id).is_some() {
            state.journal.push(format!("unlisten {id}"));
        }
    }
}

/// 模拟图形
#[derive(Debug)]
pub struct SimShape {
    id: ShapeId,
    platform: Weak<SimPlatform>,
}

impl Shape for SimShape {
    fn animate(&self, from: Keyframe, to: Keyframe, timing: AnimationTiming) -> AnimationHandle {
        match self.platform.upgrade() {
            Some(platform) => platform.start_animation(self.id, from, to, timing),
            None => AnimationHandle::finished(),
        }
    }

    fn remove(self: Box<Self>) {
        if let Some(platform) = self.platform.upgrade() {
            platform.remove_shape(self.id);
        }
    }
}
