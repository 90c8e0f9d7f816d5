//! # Config 模块
//!
//! 宿主配置管理。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use date_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 对话资源目录（intro.json 与各关卡 JSON）
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// 日志过滤（`RUST_LOG` 语法）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 引擎配置
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("assets/content")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            log_level: default_log_level(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// 读取配置文件；文件不存在时返回 None
    pub fn read(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("读取配置文件失败: {path:?}"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("配置文件解析失败: {path:?}"))?;
        Ok(Some(config))
    }

    /// 从文件加载配置，失败时使用默认配置
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(Some(config)) => {
                info!(?path, "配置文件加载成功");
                config
            }
            Ok(None) => {
                warn!(?path, "配置文件不存在，使用默认配置");
                Self::default()
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "使用默认配置");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "engine": { "shuffle_seed": 3, "fade": { "tiles": 4 } } }"#)
                .unwrap();
        assert_eq!(config.content_dir, PathBuf::from("assets/content"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.engine.shuffle_seed, Some(3));
        assert_eq!(config.engine.fade.tiles, 4);
        assert_eq!(config.engine.fade.duration, 1.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = AppConfig::load("definitely/not/here.json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_read_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::read(&path).is_err());
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_read_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "content_dir": "content", "log_level": "debug" }"#).unwrap();
        let config = AppConfig::read(&path).unwrap().unwrap();
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.log_level, "debug");
    }
}
