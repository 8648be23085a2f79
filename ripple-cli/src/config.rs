//! 配置与场景文件加载
//!
//! 配置优先级：命令行参数 > 配置文件 > 默认值。

use std::fs;
use std::path::Path;

use anyhow::Context;
use ripple_core::{RippleConfig, Scenario};
use tracing::{info, warn};

/// 默认配置文件路径（相对于当前目录）
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// 加载引擎配置
///
/// - 显式指定的文件必须存在
/// - 未指定时读取 `config.json`，不存在则使用默认配置并打印警告
/// - 文件存在但解析或校验失败时返回错误
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RippleConfig> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };

    if !path.exists() {
        if explicit {
            anyhow::bail!("配置文件不存在: {}", path.display());
        }
        warn!(path = %path.display(), "配置文件不存在，使用默认配置");
        return Ok(RippleConfig::default());
    }

    let content = read_file(path, "配置文件")?;
    let config = RippleConfig::from_json(&content)
        .with_context(|| format!("配置文件无效: {}", path.display()))?;

    info!(path = %path.display(), "配置文件加载成功");
    Ok(config)
}

/// 保存配置到文件
pub fn save_config(config: &RippleConfig, path: &Path) -> anyhow::Result<()> {
    let json = config.to_json_pretty()?;
    fs::write(path, json).with_context(|| format!("写入配置文件失败: {}", path.display()))?;
    Ok(())
}

/// 加载场景文件
pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let content = read_file(path, "场景文件")?;
    let mut scenario =
        Scenario::from_json(&content).with_context(|| format!("场景无效: {}", path.display()))?;

    if scenario.name.is_empty() {
        scenario.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(scenario)
}

fn read_file(path: &Path, kind: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("读取{kind}失败: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::EasingFunction;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "fade_out_ms": 120, "grow_easing": "linear" }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.fade_out_ms, 120.0);
        assert_eq!(config.grow_easing, EasingFunction::Linear);
        assert_eq!(config.alpha, 0.22);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.json");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(Some(&path)).is_err());

        fs::write(&path, r#"{ "alpha": 3 }"#).unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("alpha"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = RippleConfig {
            color: "#1e88e5".to_string(),
            ..RippleConfig::default()
        };

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_scenario_name_defaults_to_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("press.json");
        fs::write(
            &path,
            r#"{ "steps": [ { "op": "surface", "id": "a", "bounds": { "left": 0, "top": 0, "width": 10, "height": 10 } } ] }"#,
        )
        .unwrap();

        let scenario = load_scenario(&path).unwrap();
        assert_eq!(scenario.name, "press");
        assert_eq!(scenario.steps.len(), 1);
    }
}
