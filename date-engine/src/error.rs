//! # Error 模块
//!
//! 定义 date-engine 中使用的错误类型。
//!
//! 只有"配置/内容在加载时就不合法"才算错误；运行期的越界选择、
//! 重复 complete/stop、未知文本标记等都按无操作处理，不会走到这里。

use thiserror::Error;

/// 对话内容错误（加载期校验）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// JSON 本身无法解析
    #[error("资源 '{asset}'：JSON 解析失败 - {message}")]
    InvalidJson { asset: String, message: String },

    /// 缺少必需字段
    #[error("资源 '{asset}'：缺少字段 '{field}'")]
    MissingField { asset: String, field: String },

    /// 对话节点既不是字符串也不是列表
    #[error("资源 '{asset}' 的节点 {path}：{message}")]
    MalformedNode {
        asset: String,
        path: String,
        message: String,
    },

    /// 没有任何关卡资源
    #[error("没有找到任何关卡资源")]
    NoLevels,

    /// 关卡索引越界
    #[error("关卡索引 {index} 越界，共 {count} 个关卡")]
    LevelOutOfRange { index: usize, count: usize },
}

/// 引擎配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 数值不在合法范围内
    #[error("配置项 '{field}' 无效：{message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// date-engine 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 内容错误
    #[error("内容错误: {0}")]
    Content(#[from] ContentError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 全局单例被重复创建
    #[error("'{kind}' 只能存在一个实例")]
    DuplicateSingleton { kind: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: EngineError = ContentError::NoLevels.into();
        assert!(matches!(err, EngineError::Content(ContentError::NoLevels)));

        let err: EngineError = ConfigError::invalid("fade.tiles", "必须大于 0").into();
        assert!(err.to_string().contains("fade.tiles"));
    }

    #[test]
    fn test_malformed_node_message() {
        let err = ContentError::MalformedNode {
            asset: "01-ozzie".to_string(),
            path: "dialogue[3]".to_string(),
            message: "节点必须是字符串或列表".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("01-ozzie"));
        assert!(text.contains("dialogue[3]"));
    }
}
