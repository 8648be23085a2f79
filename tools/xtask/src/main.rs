//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 ripple-core 覆盖率
//! - `scenario-check`: 回放场景文件，检查解析错误与残留

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ripple_core::{RippleConfig, Scenario, ScenarioReport};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

fn run(step: &str, cmd: xshell::Cmd<'_>) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    cmd.run().map_err(|e| anyhow::anyhow!("{step} failed: {e}"))
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    match cmd!(sh, "cargo llvm-cov --version").quiet().ignore_stdout().run() {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());
    let sh = Shell::new()?;

    match sub.as_str() {
        "check-all" => {
            run(
                "cargo fmt --all -- --check",
                cmd!(sh, "cargo fmt --all -- --check"),
            )?;
            run(
                "cargo clippy --workspace --all-targets",
                cmd!(sh, "cargo clippy --workspace --all-targets"),
            )?;
            run("cargo test --workspace", cmd!(sh, "cargo test --workspace"))?;
        }
        "cov-core" => {
            ensure_cargo_llvm_cov_available(&sh)?;
            run(
                "cargo llvm-cov -p ripple-core --html",
                cmd!(sh, "cargo llvm-cov -p ripple-core --html"),
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scenario-check" => {
            let path = args.next();
            scenario_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-core        运行 ripple-core 覆盖率报告
  scenario-check  回放场景文件

SCENARIO-CHECK:
  cargo xtask scenario-check [path]

  不带参数：检查 scenarios/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - 场景解析错误（未声明 / 重复声明的表面）
    - 场景结束时的残留（涟漪、图形、监听器）

ALIASES (in .cargo/config.toml):
  cargo check-all      -> cargo xtask check-all
  cargo cov-core       -> cargo xtask cov-core
  cargo scenario-check -> cargo xtask scenario-check
"#
    );
}

//=============================================================================
// scenario-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENARIOS_DIR: &str = "scenarios";

/// 场景检查结果
#[derive(Default)]
struct ScenarioCheckResult {
    /// 检查的场景数量
    checked: usize,
    /// 解析或回放失败
    failures: Vec<(PathBuf, String)>,
    /// 结束时有残留
    unclean: Vec<(PathBuf, ScenarioReport)>,
}

/// 执行场景检查
fn scenario_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scenario_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCENARIOS_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scenario_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 回放 {} 个场景文件...\n", files.len());

    let mut result = ScenarioCheckResult::default();
    for file in &files {
        check_scenario_file(file, &mut result);
    }

    print_check_result(&result);

    if !result.failures.is_empty() || !result.unclean.is_empty() {
        anyhow::bail!("场景检查发现问题");
    }

    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scenario_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个场景文件
fn check_scenario_file(file: &Path, result: &mut ScenarioCheckResult) {
    result.checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            result
                .failures
                .push((file.to_path_buf(), format!("无法读取文件 - {e}")));
            return;
        }
    };

    let config = RippleConfig::default();
    let report = Scenario::from_json(&content).and_then(|scenario| scenario.run(config));
    match report {
        Ok(report) if report.is_clean() => {
            eprintln!("[OK] {}", file.display());
        }
        Ok(report) => {
            result.unclean.push((file.to_path_buf(), report));
        }
        Err(e) => {
            result.failures.push((file.to_path_buf(), e.to_string()));
        }
    }
}

/// 输出检查结果
fn print_check_result(result: &ScenarioCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景", result.checked);
    eprintln!();

    for (file, message) in &result.failures {
        eprintln!("[ERROR] {}: {}", file.display(), message);
    }

    for (file, report) in &result.unclean {
        eprintln!(
            "[WARN] {}: 结束时有残留 - {}",
            file.display(),
            report.summary()
        );
    }

    eprintln!();
    if !result.failures.is_empty() {
        eprintln!(
            "❌ {} 个错误, {} 个残留",
            result.failures.len(),
            result.unclean.len()
        );
    } else if !result.unclean.is_empty() {
        eprintln!("⚠️  0 个错误, {} 个残留", result.unclean.len());
    } else {
        eprintln!("✅ 检查通过，无残留");
    }
}
