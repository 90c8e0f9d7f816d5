//! 从目录加载对话资源
//!
//! 目录中必须有 `intro.json`；其余 `*.json` 按文件名排序作为关卡。

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use date_engine::{CharacterScript, ContentLibrary};
use tracing::{debug, info};
use walkdir::WalkDir;

const INTRO_FILE: &str = "intro.json";

fn load_script(path: &Path) -> anyhow::Result<CharacterScript> {
    let asset = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    let text = fs::read_to_string(path).with_context(|| format!("读取资源失败: {path:?}"))?;
    let script = CharacterScript::from_json(&asset, &text)?;
    debug!(asset = %asset, nodes = script.dialogue.len(), "加载资源");
    Ok(script)
}

/// 加载整个资源目录
pub fn load_library(dir: &Path) -> anyhow::Result<ContentLibrary> {
    if !dir.is_dir() {
        bail!("资源目录不存在: {dir:?}");
    }
    let intro = load_script(&dir.join(INTRO_FILE))?;

    let mut level_paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json && entry.file_name() != INTRO_FILE {
            level_paths.push(path.to_path_buf());
        }
    }
    level_paths.sort();

    let levels = level_paths
        .iter()
        .map(|path| load_script(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let library = ContentLibrary::new(intro, levels)?;
    info!(dir = ?dir, levels = library.level_count(), "资源加载完成");
    Ok(library)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_levels_sorted_by_file_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("intro.json"), r#"{ "name": "Host", "dialogue": [] }"#).unwrap();
        fs::write(dir.join("02-max.json"), r#"{ "name": "Max", "dialogue": [] }"#).unwrap();
        fs::write(dir.join("01-ozzie.json"), r#"{ "name": "Ozzie", "dialogue": [] }"#).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let library = load_library(dir).unwrap();
        let names: Vec<_> = library.levels().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ozzie", "Max"]);
        assert_eq!(library.intro().name, "Host");
    }

    #[test]
    fn test_no_levels_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("intro.json"), r#"{ "name": "Host", "dialogue": [] }"#).unwrap();
        assert!(load_library(temp.path()).is_err());
    }

    #[test]
    fn test_missing_intro_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("01-a.json"), r#"{ "name": "A", "dialogue": [] }"#).unwrap();
        assert!(load_library(temp.path()).is_err());
    }
}
