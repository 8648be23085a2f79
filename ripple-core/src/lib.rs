//! # Ripple Core
//!
//! 涟漪（ripple）视觉反馈效果的核心库。
//!
//! ## 架构概述
//!
//! `ripple-core` 是纯逻辑核心，不依赖任何具体的 UI 框架或渲染引擎。
//! 它通过 [`Platform`] / [`Surface`] / [`Shape`] 三个 trait 与渲染层通信：
//!
//! ```text
//! Host                            RippleEngine
//!   │                                  │
//!   │──── ActivationEvent ───────────►│ create()
//!   │                                  │   几何 → 颜色 → 时长
//!   │◄─── create_shape / animate ─────│
//!   │                                  │
//!   │──── ReleaseEvent（全局监听）────►│ release → 生长结束后淡出
//!   │◄─── animate / remove ───────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`RippleEngine`]：每个表面至多一个活动涟漪的生命周期状态机
//! - [`RippleConfig`]：引擎配置（颜色、速度、时长）
//! - [`ActivationEvent`] / [`ReleaseEvent`]：输入事件
//! - [`AnimationHandle`]：渲染层返回的动画句柄
//! - [`SimPlatform`]：确定性的模拟渲染层（无窗口宿主与测试替身）
//!
//! ## 使用示例
//!
//! ```ignore
//! use ripple_core::{ActivationEvent, ReleaseEvent, RippleEngine, RippleOverrides, SimPlatform};
//!
//! let sim = SimPlatform::new();
//! let engine = RippleEngine::with_defaults(sim.clone());
//!
//! engine.create(&ActivationEvent::pointer(button, 12.0, 8.0), RippleOverrides::none());
//! sim.dispatch(&ReleaseEvent::PointerUp);
//! sim.run_until_idle(16.0);
//! ```
//!
//! ## 模块结构
//!
//! - [`geometry`]：原点与半径
//! - [`color`]：主题感知的颜色解析
//! - [`timing`]：生长/淡出时长策略
//! - [`engine`]：生命周期状态机
//! - [`event`]：激活/释放事件
//! - [`platform`]：渲染层契约
//! - [`animation`]：动画句柄、关键帧与缓动
//! - [`sim`]：模拟渲染层
//! - [`scenario`]：脚本化场景回放
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod platform;
pub mod scenario;
pub mod sim;
pub mod timing;

// 重导出核心类型
pub use animation::{
    Animation, AnimationHandle, AnimationState, AnimationTiming, EasingFunction, Keyframe,
};
pub use color::{
    BlendMode, ColorMode, Paint, Rgba, RippleOptions, RippleOverrides, is_dark_context,
    resolve_color, resolve_paint, to_rgba_like,
};
pub use config::RippleConfig;
pub use engine::{RippleEngine, RippleId, RipplePhase};
pub use error::{ColorParseError, ConfigError, ScenarioError};
pub use event::{ActivationEvent, ActivationKind, Key, ReleaseEvent};
pub use geometry::{Bounds, Point, compute_local_point, compute_radius};
pub use platform::{
    ListenerId, Platform, Positioning, ReleaseBinding, ReleaseHandler, Shape, ShapeStyle, Surface,
};
pub use scenario::{Scenario, ScenarioEnvironment, ScenarioReport, Step};
pub use sim::{ShapeId, SimPlatform, SimSurface};
pub use timing::{PhaseTimings, compute_fade_ms, compute_grow_ms};
