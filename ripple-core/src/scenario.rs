//! # Scenario 模块
//!
//! 脚本化的交互场景：在模拟渲染层上回放一串激活 / 释放 / 推进时间的步骤。
//!
//! 无窗口宿主（`ripple-cli run`）和开发工具（`xtask scenario-check`）共用。
//!
//! ```json
//! {
//!   "name": "basic",
//!   "environment": { "dark_scheme": true },
//!   "steps": [
//!     { "op": "surface", "id": "card", "bounds": { "left": 0, "top": 0, "width": 200, "height": 100 } },
//!     { "op": "activate", "surface": "card", "event": { "type": "pointer", "client": { "x": 100, "y": 50 } } },
//!     { "op": "release", "event": { "type": "pointer_up" } },
//!     { "op": "settle" }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color::RippleOverrides;
use crate::config::RippleConfig;
use crate::engine::RippleEngine;
use crate::error::ScenarioError;
use crate::event::{ActivationEvent, ActivationKind, ReleaseEvent};
use crate::geometry::Bounds;
use crate::platform::Surface;
use crate::sim::{SimPlatform, SimSurface};

/// 场景
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// 名称
    #[serde(default)]
    pub name: String,

    /// 模拟环境
    #[serde(default)]
    pub environment: ScenarioEnvironment,

    /// 步骤
    pub steps: Vec<Step>,
}

/// 模拟环境
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEnvironment {
    /// 减少动态效果
    #[serde(default)]
    pub reduce_motion: bool,

    /// 深色配色偏好（缺省为未知）
    #[serde(default)]
    pub dark_scheme: Option<bool>,

    /// 文档根节点深色标记
    #[serde(default)]
    pub root_dark: bool,

    /// 是否可渲染
    #[serde(default = "default_true")]
    pub render: bool,

    /// 是否支持动画
    #[serde(default = "default_true")]
    pub animations: bool,
}

fn default_true() -> bool {
    true
}

fn default_step_ms() -> f64 {
    16.0
}

impl Default for ScenarioEnvironment {
    fn default() -> Self {
        Self {
            reduce_motion: false,
            dark_scheme: None,
            root_dark: false,
            render: true,
            animations: true,
        }
    }
}

/// 场景步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// 声明表面
    Surface {
        id: String,
        bounds: Bounds,
        #[serde(default)]
        theme: Option<String>,
        #[serde(default)]
        parent: Option<String>,
    },

    /// 激活（`surface` 缺省表示事件没有目标）
    Activate {
        #[serde(default)]
        surface: Option<String>,
        event: ActivationKind,
        #[serde(default)]
        overrides: Option<RippleOverrides>,
    },

    /// 分发全局释放事件
    Release { event: ReleaseEvent },

    /// 推进时间
    Advance { ms: f64 },

    /// 以固定步长推进直到没有运行中的动画
    Settle {
        #[serde(default = "default_step_ms")]
        step_ms: f64,
    },

    /// 宿主丢弃表面
    #[serde(rename = "drop")]
    DropSurface { surface: String },
}

/// 回放结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    /// 场景名称
    pub name: String,
    /// 模拟渲染层日志
    pub journal: Vec<String>,
    /// 结束时引擎记录的涟漪数
    pub tracked: usize,
    /// 结束时存活的图形数
    pub live_shapes: usize,
    /// 结束时仍注册的监听器数
    pub listeners: usize,
    /// 结束时的模拟时钟（毫秒）
    pub clock_ms: f64,
}

impl ScenarioReport {
    /// 场景结束时是否没有任何残留
    pub fn is_clean(&self) -> bool {
        self.tracked == 0 && self.live_shapes == 0 && self.listeners == 0
    }

    /// 一行摘要
    pub fn summary(&self) -> String {
        format!(
            "{}: tracked={} live_shapes={} listeners={} clock={}ms",
            self.name, self.tracked, self.live_shapes, self.listeners, self.clock_ms
        )
    }
}

impl Scenario {
    /// 从 JSON 解析并校验
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self =
            serde_json::from_str(json).map_err(|e| ScenarioError::Parse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// 校验表面引用：先声明后使用，不得重复声明
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut alive: HashSet<&str> = HashSet::new();

        for (index, step) in self.steps.iter().enumerate() {
            let step_no = index + 1;
            let require = |surface: &str, alive: &HashSet<&str>| {
                if alive.contains(surface) {
                    Ok(())
                } else {
                    Err(ScenarioError::UnknownSurface {
                        step: step_no,
                        surface: surface.to_string(),
                    })
                }
            };

            match step {
                Step::Surface { id, parent, .. } => {
                    if let Some(parent) = parent {
                        require(parent.as_str(), &alive)?;
                    }
                    if !alive.insert(id.as_str()) {
                        return Err(ScenarioError::DuplicateSurface {
                            step: step_no,
                            surface: id.clone(),
                        });
                    }
                }
                Step::Activate {
                    surface: Some(surface),
                    ..
                } => require(surface.as_str(), &alive)?,
                Step::DropSurface { surface } => {
                    require(surface.as_str(), &alive)?;
                    alive.remove(surface.as_str());
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// 在新的模拟渲染层上回放
    pub fn run(&self, config: RippleConfig) -> Result<ScenarioReport, ScenarioError> {
        config.validate()?;
        self.validate()?;

        let sim = SimPlatform::new();
        let env = &self.environment;
        sim.set_render(env.render);
        sim.set_animations_supported(env.animations);
        sim.set_reduced_motion(env.reduce_motion);
        sim.set_dark_scheme(env.dark_scheme);
        sim.set_root_dark(env.root_dark);

        let engine = RippleEngine::new(sim.clone(), config);
        let mut surfaces: HashMap<String, Rc<SimSurface>> = HashMap::new();

        info!(scenario = %self.name, steps = self.steps.len(), "开始回放场景");
        for step in &self.steps {
            debug!(step = ?step, "执行步骤");
            match step {
                Step::Surface {
                    id,
                    bounds,
                    theme,
                    parent,
                } => {
                    let bounds = Bounds::new(bounds.left, bounds.top, bounds.width, bounds.height);
                    let surface = match parent.as_ref().and_then(|p| surfaces.get(p)) {
                        Some(parent) => SimSurface::with_parent(id.as_str(), bounds, parent),
                        None => SimSurface::new(id.as_str(), bounds),
                    };
                    surface.set_theme(theme.as_deref());
                    surfaces.insert(id.clone(), surface);
                }
                Step::Activate {
                    surface,
                    event,
                    overrides,
                } => {
                    let target = surface
                        .as_ref()
                        .and_then(|id| surfaces.get(id))
                        .map(|s| Rc::clone(s) as Rc<dyn Surface>);
                    let activation = ActivationEvent {
                        target,
                        kind: event.clone(),
                    };
                    engine.create(&activation, overrides.clone().unwrap_or_default());
                }
                Step::Release { event } => sim.dispatch(event),
                Step::Advance { ms } => sim.advance(*ms),
                Step::Settle { step_ms } => {
                    sim.run_until_idle(*step_ms);
                }
                Step::DropSurface { surface } => {
                    surfaces.remove(surface);
                    engine.prune();
                }
            }
        }

        let report = ScenarioReport {
            name: self.name.clone(),
            journal: sim.take_journal(),
            tracked: engine.tracked_count(),
            live_shapes: sim.live_shapes(),
            listeners: sim.listener_count(),
            clock_ms: sim.clock_ms(),
        };
        info!(summary = %report.summary(), clean = report.is_clean(), "场景回放结束");
        Ok(report)
    }
}
