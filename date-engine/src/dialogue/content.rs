//! 对话内容：资源结构与加载期校验
//!
//! 资源是每个角色一份 JSON：
//!
//! ```json
//! {
//!   "name": "Ozzie",
//!   "bitmap": "ozzie",
//!   "bitmap_transparent": 0,
//!   "voice": "ozzie",
//!   "dialogue": ["普通台词", [{ "message": "选项", "score": 2, "response": "回应" }]],
//!   "epilogue": ["结局台词"]
//! }
//! ```
//!
//! 节点要么是字符串（台词），要么是选项列表。其他形状在加载时就报错，
//! 错误里带有节点路径（如 `dialogue[3][1].response`）。

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ContentError;

/// 一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogOption {
    /// 显示在选项列表中的文本
    pub message: String,
    /// 选中后玩家继续说的台词
    pub extra: Vec<String>,
    /// 得分增量
    pub score: i32,
    /// 角色的回应
    pub response: Vec<String>,
}

/// 对话节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DialogueNode {
    Message(String),
    Options(Vec<DialogOption>),
}

/// 一个角色（场景）的全部内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterScript {
    /// 资源名（文件名去掉扩展名）
    pub asset: String,
    /// 说话者显示名
    pub name: String,
    /// 立绘资源
    pub bitmap: Option<String>,
    /// 立绘透明色的调色板索引
    pub bitmap_transparent: Option<u8>,
    /// 语音库
    pub voice: Option<String>,
    pub dialogue: Vec<DialogueNode>,
    /// 结局对话（只有部分角色有）
    pub epilogue: Vec<DialogueNode>,
}

impl CharacterScript {
    /// 从 JSON 文本加载
    pub fn from_json(asset: &str, text: &str) -> Result<Self, ContentError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ContentError::InvalidJson {
            asset: asset.to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(asset, &value)
    }

    /// 从 JSON 值加载并校验
    pub fn from_value(asset: &str, value: &Value) -> Result<Self, ContentError> {
        let loader = Loader { asset };
        let object = value
            .as_object()
            .ok_or_else(|| loader.malformed("$", "资源顶层必须是对象"))?;

        let name = match object.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(loader.malformed("name", "必须是字符串")),
            None => return Err(loader.missing("name")),
        };
        let bitmap = loader.optional_string(object, "bitmap")?;
        let voice = loader.optional_string(object, "voice")?;
        let bitmap_transparent = match object.get("bitmap_transparent") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                v.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| loader.malformed("bitmap_transparent", "必须是 0-255 的整数"))?,
            ),
        };

        let dialogue = match object.get("dialogue") {
            Some(v) => loader.nodes(v, "dialogue")?,
            None => return Err(loader.missing("dialogue")),
        };
        let epilogue = match object.get("epilogue") {
            Some(v) => loader.nodes(v, "epilogue")?,
            None => Vec::new(),
        };

        Ok(Self {
            asset: asset.to_string(),
            name,
            bitmap,
            bitmap_transparent,
            voice,
            dialogue,
            epilogue,
        })
    }

    /// 是否带有结局对话
    pub fn has_epilogue(&self) -> bool {
        !self.epilogue.is_empty()
    }
}

struct Loader<'a> {
    asset: &'a str,
}

impl Loader<'_> {
    fn malformed(&self, path: impl Into<String>, message: &str) -> ContentError {
        ContentError::MalformedNode {
            asset: self.asset.to_string(),
            path: path.into(),
            message: message.to_string(),
        }
    }

    fn missing(&self, field: &str) -> ContentError {
        ContentError::MissingField {
            asset: self.asset.to_string(),
            field: field.to_string(),
        }
    }

    fn optional_string(
        &self,
        object: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<String>, ContentError> {
        match object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.malformed(key, "必须是字符串")),
        }
    }

    fn nodes(&self, value: &Value, path: &str) -> Result<Vec<DialogueNode>, ContentError> {
        let items = value
            .as_array()
            .ok_or_else(|| self.malformed(path, "对话必须是列表"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.node(item, &format!("{path}[{i}]")))
            .collect()
    }

    fn node(&self, value: &Value, path: &str) -> Result<DialogueNode, ContentError> {
        match value {
            Value::String(message) => Ok(DialogueNode::Message(message.clone())),
            Value::Array(options) => {
                if options.is_empty() {
                    return Err(self.malformed(path, "选项列表不能为空"));
                }
                let options = options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| self.option(option, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DialogueNode::Options(options))
            }
            _ => Err(self.malformed(path, "节点必须是字符串或选项列表")),
        }
    }

    fn option(&self, value: &Value, path: &str) -> Result<DialogOption, ContentError> {
        let object = value
            .as_object()
            .ok_or_else(|| self.malformed(path, "选项必须是对象"))?;

        let message_path = format!("{path}.message");
        let mut lines = match object.get("message") {
            Some(v) => self.lines(v, &message_path)?,
            None => return Err(self.missing(&message_path)),
        };
        if lines.is_empty() {
            return Err(self.malformed(message_path, "至少需要一行"));
        }
        let message = lines.remove(0);

        let score = match object.get("score") {
            None | Some(Value::Null) => 0,
            Some(v) => v
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| self.malformed(format!("{path}.score"), "必须是整数"))?,
        };

        let response = match object.get("response") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => self.lines(v, &format!("{path}.response"))?,
        };

        Ok(DialogOption {
            message,
            extra: lines,
            score,
            response,
        })
    }

    /// 字符串或字符串列表
    fn lines(&self, value: &Value, path: &str) -> Result<Vec<String>, ContentError> {
        match value {
            Value::String(line) => Ok(vec![line.clone()]),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(line) => Ok(line.clone()),
                    _ => Err(self.malformed(format!("{path}[{i}]"), "必须是字符串")),
                })
                .collect(),
            _ => Err(self.malformed(path, "必须是字符串或字符串列表")),
        }
    }
}

/// 游戏全部内容：开场与按顺序排列的关卡
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLibrary {
    intro: CharacterScript,
    levels: Vec<CharacterScript>,
}

impl ContentLibrary {
    /// 至少需要一个关卡
    pub fn new(intro: CharacterScript, levels: Vec<CharacterScript>) -> Result<Self, ContentError> {
        if levels.is_empty() {
            return Err(ContentError::NoLevels);
        }
        Ok(Self { intro, levels })
    }

    pub fn intro(&self) -> &CharacterScript {
        &self.intro
    }

    pub fn levels(&self) -> &[CharacterScript] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> Result<&CharacterScript, ContentError> {
        self.levels.get(index).ok_or(ContentError::LevelOutOfRange {
            index,
            count: self.levels.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OZZIE: &str = r#"{
        "name": "Ozzie",
        "bitmap": "ozzie",
        "bitmap_transparent": 3,
        "voice": "ozzie",
        "dialogue": [
            "Hi {name}!",
            [
                { "message": "I love meeting new sssnakesss.", "score": 10,
                  "response": ["I admire that.", "Have you found a date?"] },
                { "message": ["Not really.", "I'm just here for the snacks."], "score": -5 },
                { "message": "Maybe." }
            ]
        ],
        "epilogue": ["We should do this again."]
    }"#;

    #[test]
    fn test_load_character() {
        let script = CharacterScript::from_json("01-ozzie", OZZIE).unwrap();
        assert_eq!(script.name, "Ozzie");
        assert_eq!(script.bitmap.as_deref(), Some("ozzie"));
        assert_eq!(script.bitmap_transparent, Some(3));
        assert_eq!(script.dialogue.len(), 2);
        assert!(script.has_epilogue());

        let DialogueNode::Options(options) = &script.dialogue[1] else {
            panic!("expected options");
        };
        assert_eq!(options[0].score, 10);
        assert_eq!(options[0].response.len(), 2);
        assert_eq!(options[1].message, "Not really.");
        assert_eq!(options[1].extra, vec!["I'm just here for the snacks."]);
        assert!(options[1].response.is_empty());
        // score 缺省为 0
        assert_eq!(options[2].score, 0);
    }

    #[test]
    fn test_malformed_node_reports_path() {
        let json = r#"{ "name": "X", "dialogue": ["ok", 42] }"#;
        let err = CharacterScript::from_json("x", json).unwrap_err();
        assert_eq!(
            err,
            ContentError::MalformedNode {
                asset: "x".to_string(),
                path: "dialogue[1]".to_string(),
                message: "节点必须是字符串或选项列表".to_string(),
            }
        );
    }

    #[test]
    fn test_bad_option_fields() {
        let json = r#"{ "name": "X", "dialogue": [[{ "message": "a", "score": "high" }]] }"#;
        let err = CharacterScript::from_json("x", json).unwrap_err();
        assert!(matches!(err, ContentError::MalformedNode { ref path, .. } if path == "dialogue[0][0].score"));

        let json = r#"{ "name": "X", "dialogue": [[{ "score": 1 }]] }"#;
        let err = CharacterScript::from_json("x", json).unwrap_err();
        assert!(matches!(err, ContentError::MissingField { ref field, .. } if field == "dialogue[0][0].message"));

        let json = r#"{ "name": "X", "dialogue": [[{ "message": "a", "response": [1] }]] }"#;
        let err = CharacterScript::from_json("x", json).unwrap_err();
        assert!(matches!(err, ContentError::MalformedNode { ref path, .. } if path == "dialogue[0][0].response[0]"));
    }

    #[test]
    fn test_empty_option_list_rejected() {
        let json = r#"{ "name": "X", "dialogue": [[]] }"#;
        assert!(CharacterScript::from_json("x", json).is_err());
    }

    #[test]
    fn test_missing_fields() {
        let err = CharacterScript::from_json("x", r#"{ "dialogue": [] }"#).unwrap_err();
        assert!(matches!(err, ContentError::MissingField { ref field, .. } if field == "name"));

        let err = CharacterScript::from_json("x", r#"{ "name": "X" }"#).unwrap_err();
        assert!(matches!(err, ContentError::MissingField { ref field, .. } if field == "dialogue"));
    }

    #[test]
    fn test_invalid_json() {
        let err = CharacterScript::from_json("broken", "{ not json").unwrap_err();
        assert!(matches!(err, ContentError::InvalidJson { ref asset, .. } if asset == "broken"));
    }

    #[test]
    fn test_library_requires_levels() {
        let intro = CharacterScript::from_json("intro", r#"{ "name": "Host", "dialogue": [] }"#)
            .unwrap();
        assert_eq!(
            ContentLibrary::new(intro.clone(), Vec::new()).unwrap_err(),
            ContentError::NoLevels
        );

        let level = CharacterScript::from_json("01-ozzie", OZZIE).unwrap();
        let library = ContentLibrary::new(intro, vec![level]).unwrap();
        assert_eq!(library.level_count(), 1);
        assert!(library.level(0).is_ok());
        assert_eq!(
            library.level(3).unwrap_err(),
            ContentError::LevelOutOfRange { index: 3, count: 1 }
        );
    }
}
