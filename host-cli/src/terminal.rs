//! 终端后端：把渲染/音频调用打印成逐行文本
//!
//! 只打印内容有变化的行。文字逐字显现、立绘移动、语音音节这类
//! 逐帧变化只写到 trace 日志。

use std::collections::HashMap;
use std::io::Write;

use date_engine::{Backend, Cue, Layer, RenderHandle, Visual};
use tracing::{trace, warn};

pub struct TerminalBackend<W: Write> {
    out: W,
    /// 每个句柄最后一次打印的内容
    shown: HashMap<RenderHandle, String>,
}

impl<W: Write> TerminalBackend<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: HashMap::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: String) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!(error = %e, "写入输出失败");
        }
    }

    fn show(&mut self, handle: RenderHandle, visual: &Visual) {
        let Some(text) = describe(visual) else {
            return;
        };
        if self.shown.get(&handle) == Some(&text) {
            return;
        }
        self.shown.insert(handle, text.clone());
        self.emit(text);
    }
}

fn layer_name(layer: Layer) -> &'static str {
    match layer {
        Layer::Lower => "lower",
        Layer::Upper => "upper",
        Layer::Overlay => "overlay",
    }
}

/// 一个画面的文字描述；转场帧不打印
fn describe(visual: &Visual) -> Option<String> {
    let text = match visual {
        Visual::Sprite { bitmap, .. } => format!("[sprite] {bitmap}"),
        Visual::Fade { .. } => return None,
        Visual::Dialog {
            title,
            title_right,
            lines,
            ..
        } => {
            let text = lines.join(" ");
            match title {
                Some(title) if *title_right => format!("{text:<40} -- {title}"),
                Some(title) => format!("{title}: {text}"),
                None => text,
            }
        }
        Visual::Options { items, highlighted } | Visual::Menu { items, highlighted } => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let marker = if index == *highlighted { '>' } else { ' ' };
                format!("  {marker} {index}. {item}")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Visual::Keyboard {
            text,
            rows,
            cursor,
            uppercase,
            enter_enabled,
        } => {
            let key = rows
                .get(cursor.0)
                .and_then(|row| row.get(cursor.1))
                .map_or("", String::as_str);
            format!(
                "[keyboard] name: '{text}' key: {key} {} {}",
                if *uppercase { "ABC" } else { "abc" },
                if *enter_enabled { "(OK ready)" } else { "" }
            )
            .trim_end()
            .to_string()
        }
        Visual::Prompt {
            text,
            buttons,
            highlighted,
        } => {
            let buttons = buttons
                .iter()
                .enumerate()
                .map(|(index, label)| {
                    if index == *highlighted {
                        format!("[{label}]")
                    } else {
                        format!(" {label} ")
                    }
                })
                .collect::<String>();
            format!("[prompt] {text} {buttons}")
        }
        Visual::Results { bars } => bars
            .iter()
            .map(|bar| {
                let mark = if bar.best { " *" } else { "" };
                format!("  {:<10} {:>4}{mark}", bar.name, bar.score)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Visual::Button { label, hovered } => {
            if *hovered {
                format!("[button] ({label})")
            } else {
                return None;
            }
        }
    };
    Some(text)
}

impl<W: Write> Backend for TerminalBackend<W> {
    fn attach(&mut self, handle: RenderHandle, layer: Layer, visual: &Visual) {
        trace!(%handle, layer = layer_name(layer), "attach");
        self.show(handle, visual);
    }

    fn update(&mut self, handle: RenderHandle, visual: &Visual) {
        self.show(handle, visual);
    }

    fn detach(&mut self, handle: RenderHandle, layer: Layer) {
        trace!(%handle, layer = layer_name(layer), "detach");
        self.shown.remove(&handle);
    }

    fn set_position(&mut self, handle: RenderHandle, x: i32, y: i32) {
        trace!(%handle, x, y, "set_position");
    }

    fn play_cue(&mut self, cue: &Cue) {
        match cue {
            Cue::Sfx(name) => self.emit(format!("(sfx: {name})")),
            Cue::Music(name) => self.emit(format!("(music: {name}, loop)")),
            Cue::Voice { bank, blip } => trace!(bank = %bank, blip, "voice"),
        }
    }

    fn is_cue_playing(&self) -> bool {
        false
    }
}
