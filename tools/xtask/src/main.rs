//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与资源检查命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `content-check`: 检查对话资源（JSON 结构、节点字段、关卡数量）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use date_engine::CharacterScript;
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 检查对话资源目录（默认 assets/content）
    ContentCheck {
        /// 资源目录或单个 JSON 文件
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::CheckAll => check_all(),
        Command::ContentCheck { path } => content_check(path.as_deref()),
    }
}

fn check_all() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    eprintln!("\n==> cargo fmt --all -- --check");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    eprintln!("\n==> cargo clippy --workspace --all-targets");
    cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

    eprintln!("\n==> cargo test --workspace");
    cmd!(sh, "cargo test --workspace").run()?;

    Ok(())
}

//=============================================================================
// content-check 命令实现
//=============================================================================

const DEFAULT_CONTENT_DIR: &str = "assets/content";
const INTRO_FILE: &str = "intro.json";

/// 资源检查结果
#[derive(Default)]
struct ContentCheckResult {
    /// 检查的文件数量
    checked: usize,
    /// 关卡数量（intro.json 以外的文件）
    levels: usize,
    /// 是否找到 intro.json
    has_intro: bool,
    /// (文件, 错误信息)
    errors: Vec<(String, String)>,
}

fn content_check(path: Option<&Path>) -> anyhow::Result<()> {
    let root = path.unwrap_or(Path::new(DEFAULT_CONTENT_DIR));
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定资源路径",
            root.display()
        );
    }

    let files = collect_json_files(root)?;
    if files.is_empty() {
        eprintln!("未找到资源文件（.json）");
        return Ok(());
    }
    eprintln!("==> 检查 {} 个资源文件...\n", files.len());

    let mut result = ContentCheckResult::default();
    for file in &files {
        check_file(file, &mut result);
    }
    print_check_result(&result, root.is_dir());

    if !result.errors.is_empty() {
        anyhow::bail!("资源检查发现错误");
    }
    if root.is_dir() && (!result.has_intro || result.levels == 0) {
        anyhow::bail!("资源目录需要 {INTRO_FILE} 和至少一个关卡");
    }
    Ok(())
}

fn collect_json_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn check_file(file: &Path, result: &mut ContentCheckResult) {
    let id = file.display().to_string();
    result.checked += 1;
    if file.file_name().is_some_and(|name| name == INTRO_FILE) {
        result.has_intro = true;
    } else {
        result.levels += 1;
    }

    let asset = file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            result.errors.push((id, format!("无法读取文件 - {e}")));
            return;
        }
    };
    match CharacterScript::from_json(asset, &text) {
        Ok(script) => eprintln!(
            "[OK] {id}: {} ({} 个节点, {} 个结局节点)",
            script.name,
            script.dialogue.len(),
            script.epilogue.len()
        ),
        Err(e) => result.errors.push((id, e.to_string())),
    }
}

fn print_check_result(result: &ContentCheckResult, is_dir: bool) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个文件", result.checked);
    eprintln!();

    for (id, message) in &result.errors {
        eprintln!("[ERROR] {id}: {message}");
    }
    if is_dir && !result.has_intro {
        eprintln!("[ERROR] 缺少 {INTRO_FILE}");
    }
    if is_dir && result.levels == 0 {
        eprintln!("[ERROR] 没有关卡资源");
    }

    eprintln!();
    if result.errors.is_empty() {
        eprintln!("✅ 检查通过，{} 个关卡", result.levels);
    } else {
        eprintln!("❌ {} 个错误", result.errors.len());
    }
}
