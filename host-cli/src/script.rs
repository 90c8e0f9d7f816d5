//! 输入脚本：每行一条指令，转成引擎的输入采样
//!
//! ```text
//! # 注释
//! wait 1.5
//! down
//! select
//! move 160 140
//! click 160 140
//! type ABC
//! ```

use anyhow::{Context, bail};
use date_engine::{Direction, InputSample};

/// 一行脚本
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    /// 送入一帧输入
    Input(InputSample),
    /// 空转若干秒
    Wait(f32),
}

/// 解析一行；空行与注释返回 None
pub fn parse_line(line: &str) -> anyhow::Result<Option<ScriptLine>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let sample = match command.to_ascii_lowercase().as_str() {
        "up" => InputSample::direction(Direction::Up),
        "down" => InputSample::direction(Direction::Down),
        "left" => InputSample::direction(Direction::Left),
        "right" => InputSample::direction(Direction::Right),
        "select" | "enter" => InputSample::select(),
        "escape" | "esc" => InputSample::escape(),
        "backspace" => InputSample::backspace(),
        "click" => {
            let (x, y) = parse_point(rest)?;
            InputSample::click_at(x, y)
        }
        "move" => {
            let (x, y) = parse_point(rest)?;
            InputSample::pointer_at(x, y)
        }
        "type" => InputSample::typed(format!("{rest}\n")),
        "wait" => {
            let seconds: f32 = rest
                .parse()
                .with_context(|| format!("wait 需要秒数，得到 '{rest}'"))?;
            if !(seconds >= 0.0) {
                bail!("wait 的秒数不能为负: {seconds}");
            }
            return Ok(Some(ScriptLine::Wait(seconds)));
        }
        other => bail!("未知指令 '{other}'"),
    };
    Ok(Some(ScriptLine::Input(sample)))
}

fn parse_point(rest: &str) -> anyhow::Result<(i32, i32)> {
    let mut parts = rest.split_whitespace();
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("需要两个坐标，得到 '{rest}'");
    };
    let x = x.parse().with_context(|| format!("无效的 x 坐标 '{x}'"))?;
    let y = y.parse().with_context(|| format!("无效的 y 坐标 '{y}'"))?;
    Ok((x, y))
}
