//! 台词文本处理：命令标记替换与按列宽折行

use crate::backend::Cue;
use crate::config::AudioCueConfig;

/// 标记替换后的台词
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub text: String,
    /// 标记触发的音效，在台词出现时播放
    pub cues: Vec<Cue>,
}

/// 替换台词中的命令标记
///
/// - `{name}`：玩家名字
/// - `{buzzer}`：播放蜂鸣音效，标记本身被去掉
///
/// 未知标记与未闭合的 `{` 原样保留。
pub fn substitute(text: &str, player_name: &str, audio: &AudioCueConfig) -> Rendered {
    let mut out = String::with_capacity(text.len());
    let mut cues = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let token = &after[..close];
        match token {
            "name" => out.push_str(player_name),
            "buzzer" => cues.push(Cue::Sfx(audio.buzzer.clone())),
            _ => {
                tracing::trace!(token, "未知的台词标记，保留原文");
                out.push('{');
                out.push_str(token);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Rendered { text: out, cues }
}

/// 按列宽折行
///
/// 在空白处断行；单个词超过列宽时强制切断。保留显式换行。
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            // 超长的词先切成整行
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let head: String = word.drain(..width).collect();
                lines.push(head);
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        if line_len > 0 || lines.is_empty() || paragraph.is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_token() {
        let audio = AudioCueConfig::default();
        let rendered = substitute("Hello, {name}!", "ABC", &audio);
        assert_eq!(rendered.text, "Hello, ABC!");
        assert!(rendered.cues.is_empty());
    }

    #[test]
    fn test_buzzer_token_is_stripped() {
        let audio = AudioCueConfig::default();
        let rendered = substitute("{buzzer}Wrong!", "", &audio);
        assert_eq!(rendered.text, "Wrong!");
        assert_eq!(rendered.cues, vec![Cue::Sfx("buzzer".to_string())]);
    }

    #[test]
    fn test_unknown_tokens_stay_literal() {
        let audio = AudioCueConfig::default();
        assert_eq!(substitute("a {mood} b", "X", &audio).text, "a {mood} b");
        assert_eq!(substitute("open { brace", "X", &audio).text, "open { brace");
        assert_eq!(substitute("{}", "X", &audio).text, "{}");
        assert_eq!(substitute("{name", "X", &audio).text, "{name");
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap("the quick brown fox jumps over", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_long_word() {
        let lines = wrap("sssssssssssnake ok", 5);
        assert_eq!(lines, vec!["sssss", "sssss", "snake", "ok"]);
    }

    #[test]
    fn test_wrap_keeps_newlines_and_empty() {
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
