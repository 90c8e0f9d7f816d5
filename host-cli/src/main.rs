//! # date-cli
//!
//! date-engine 的终端宿主：读取配置与对话资源，按输入脚本逐帧驱动引擎，
//! 把渲染调用打印到 stdout，日志写到 stderr。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host-cli -- --script demos/playthrough.txt
//! cargo run -p host-cli -- --content assets/content --seed 7 --log-level debug
//! echo "wait 2" | cargo run -p host-cli
//! ```

mod config;
mod content;
mod script;
mod terminal;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use date_engine::{Engine, InputSample, Notice};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

use config::AppConfig;
use script::{ScriptLine, parse_line};
use terminal::TerminalBackend;

#[derive(Parser)]
#[command(name = "date-cli")]
#[command(about = "对话约会视觉小说的终端宿主")]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "assets/config.json")]
    config: PathBuf,

    /// 对话资源目录（覆盖配置文件）
    #[arg(long)]
    content: Option<PathBuf>,

    /// 输入脚本（默认从 stdin 读取）
    #[arg(long)]
    script: Option<PathBuf>,

    /// 选项洗牌的随机种子（覆盖配置文件）
    #[arg(long)]
    seed: Option<u64>,

    /// 日志过滤（覆盖配置文件与 RUST_LOG）
    #[arg(long)]
    log_level: Option<String>,

    /// 最多运行的 tick 数
    #[arg(long)]
    max_ticks: Option<u64>,
}

/// 日志过滤器的热更新句柄
type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// 初始化日志：先用 RUST_LOG（或 info），读完配置后再按配置调整
fn init_tracing() -> FilterHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
    handle
}

fn apply_log_level(handle: &FilterHandle, level: &str) {
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!(error = %e, "无法更新日志过滤");
            }
        }
        Err(e) => warn!(level, error = %e, "无效的日志过滤，保持原设置"),
    }
}

/// 本轮是否应当结束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_notices<B: date_engine::Backend>(engine: &mut Engine<B>) -> Flow {
    let mut flow = Flow::Continue;
    for notice in engine.drain_notices() {
        match notice {
            Notice::SceneStarted(kind) => info!(scene = %kind, "场景开始"),
            Notice::NameEntered(name) => info!(name = %name, "玩家名字"),
            Notice::LevelScored { index, score } => info!(level = index, score, "关卡得分"),
            Notice::Custom(message) => info!(message = %message, "通知"),
            Notice::QuitRequested => {
                info!("收到退出请求");
                flow = Flow::Quit;
            }
        }
    }
    flow
}

fn run(cli: Cli, filter: &FilterHandle) -> anyhow::Result<()> {
    let mut config = AppConfig::load(&cli.config);
    match &cli.log_level {
        Some(level) => apply_log_level(filter, level),
        None if std::env::var_os("RUST_LOG").is_none() => {
            apply_log_level(filter, &config.log_level)
        }
        None => {}
    }
    if let Some(dir) = cli.content {
        config.content_dir = dir;
    }
    if let Some(seed) = cli.seed {
        config.engine.shuffle_seed = Some(seed);
    }

    let library = content::load_library(&config.content_dir)
        .with_context(|| format!("无法加载对话资源: {:?}", config.content_dir))?;
    let dt = config.engine.frame_seconds();
    let mut engine = Engine::new(config.engine, library, TerminalBackend::new(io::stdout()))?;
    engine.start()?;

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("无法打开输入脚本: {path:?}"))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let max_ticks = cli.max_ticks.unwrap_or(u64::MAX);

    for (number, line) in input.lines().enumerate() {
        let line = line.context("读取输入失败")?;
        let parsed = parse_line(&line).with_context(|| format!("第 {} 行", number + 1))?;
        let frames = match parsed {
            None => continue,
            Some(ScriptLine::Input(sample)) => {
                engine.advance(&sample, dt);
                1
            }
            Some(ScriptLine::Wait(seconds)) => {
                let frames = (seconds / dt).ceil() as u64;
                for _ in 0..frames {
                    engine.advance(&InputSample::none(), dt);
                    if engine.tick() >= max_ticks {
                        break;
                    }
                }
                frames
            }
        };
        tracing::trace!(frames, tick = engine.tick(), "执行一行输入");

        if handle_notices(&mut engine) == Flow::Quit {
            return Ok(());
        }
        if engine.tick() >= max_ticks {
            info!(ticks = engine.tick(), "达到最大 tick 数");
            return Ok(());
        }
    }
    info!(ticks = engine.tick(), "输入结束");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let filter = init_tracing();
    if let Err(e) = run(cli, &filter) {
        error!(error = %format!("{e:#}"), "运行失败");
        std::process::exit(1);
    }
}
