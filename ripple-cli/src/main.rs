//! # Ripple CLI
//!
//! 无窗口宿主：在模拟渲染层上回放交互场景，输出渲染层日志。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p ripple-cli -- run scenarios/basic.json
//! cargo run -p ripple-cli -- run scenarios/basic.json --config config.json --dark -v
//! cargo run -p ripple-cli -- defaults
//! cargo run -p ripple-cli -- defaults --output config.json
//! ```

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ripple-cli")]
#[command(about = "涟漪效果无窗口宿主 - 在模拟渲染层上回放交互场景")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 日志详细程度（-v: debug，-vv: trace）
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 回放场景文件
    Run {
        /// 场景文件（JSON）
        scenario: PathBuf,

        /// 配置文件（默认：config.json，不存在时使用默认配置）
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 模拟“减少动态效果”偏好
        #[arg(long)]
        reduce_motion: bool,

        /// 模拟深色配色偏好
        #[arg(long)]
        dark: bool,

        /// 场景结束时有残留（涟漪、图形、监听器）则返回错误
        #[arg(long)]
        strict: bool,
    },

    /// 输出默认配置
    Defaults {
        /// 写入文件而不是标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = real_main(cli) {
        eprintln!("ripple-cli error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            scenario,
            config,
            reduce_motion,
            dark,
            strict,
        } => {
            let engine_config = config::load_config(config.as_deref())?;
            let mut scenario = config::load_scenario(&scenario)?;

            // 命令行参数优先于场景文件
            if reduce_motion {
                scenario.environment.reduce_motion = true;
            }
            if dark {
                scenario.environment.dark_scheme = Some(true);
            }

            let report = scenario.run(engine_config)?;
            for line in &report.journal {
                println!("{line}");
            }
            println!("--");
            println!("{}", report.summary());

            if strict && !report.is_clean() {
                anyhow::bail!("场景 '{}' 结束时仍有残留", report.name);
            }
        }
        Commands::Defaults { output } => {
            let defaults = ripple_core::RippleConfig::default();
            match output {
                Some(path) => {
                    config::save_config(&defaults, &path)?;
                    eprintln!("默认配置已写入: {}", path.display());
                }
                None => println!("{}", defaults.to_json_pretty()?),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let args = ["ripple-cli", "run", "basic.json", "--dark", "-vv"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                scenario,
                config,
                reduce_motion,
                dark,
                strict,
            } => {
                assert_eq!(scenario, PathBuf::from("basic.json"));
                assert!(config.is_none());
                assert!(dark);
                assert!(!reduce_motion);
                assert!(!strict);
            }
            Commands::Defaults { .. } => panic!("应解析为 run"),
        }
    }
}
