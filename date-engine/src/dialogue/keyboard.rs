//! 屏幕键盘（输入玩家名字）
//!
//! 二维光标导航：上下在行间移动并夹紧列号；左右到行首/行尾时
//! 默认跨到相邻行，只有配置 `wrap` 时才在行内回绕。
//! 确认键只有在至少输入了一个字符后才可用。

use crate::backend::{Layer, Visual};
use crate::config::{KeyboardConfig, ScreenConfig};
use crate::event::Outcome;
use crate::geometry::{Rect, key_rects};
use crate::input::{Direction, InputEvent};
use crate::widget::{Behavior, Ctx, Reaction};

/// 一个按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// 切换大小写
    Shift,
    Backspace,
    Enter,
}

#[derive(Debug, Clone)]
pub struct Keyboard {
    rows: Vec<Vec<Key>>,
    rects: Vec<Vec<Rect>>,
    row: usize,
    col: usize,
    uppercase: bool,
    wrap: bool,
    max_len: usize,
    text: String,
}

impl Keyboard {
    pub fn new(config: &KeyboardConfig, screen: &ScreenConfig) -> Self {
        let mut rows: Vec<Vec<Key>> = config
            .rows
            .iter()
            .map(|row| {
                row.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(Key::Char)
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();
        // 特殊键追加在最后一行
        let specials = [Key::Shift, Key::Backspace, Key::Enter];
        match rows.last_mut() {
            Some(last) => last.extend(specials),
            None => rows.push(specials.to_vec()),
        }
        let lengths: Vec<usize> = rows.iter().map(Vec::len).collect();
        Self {
            rects: key_rects(screen, &lengths),
            rows,
            row: 0,
            col: 0,
            uppercase: true,
            wrap: config.wrap,
            max_len: config.max_len,
            text: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn is_uppercase(&self) -> bool {
        self.uppercase
    }

    /// 光标所在的按键
    pub fn current(&self) -> Option<Key> {
        self.rows.get(self.row).and_then(|row| row.get(self.col)).copied()
    }

    /// 名字里至少有一个非空格字符才能提交
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty()
    }

    fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    /// 移动光标，返回是否移动
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let before = (self.row, self.col);
        let last_row = self.rows.len().saturating_sub(1);
        match direction {
            Direction::Up | Direction::Down => {
                let row = if direction == Direction::Up {
                    self.row.saturating_sub(1)
                } else {
                    (self.row + 1).min(last_row)
                };
                self.row = row;
                self.col = self.col.min(self.row_len(row).saturating_sub(1));
            }
            Direction::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.wrap {
                    self.col = self.row_len(self.row).saturating_sub(1);
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.row_len(self.row).saturating_sub(1);
                }
            }
            Direction::Right => {
                if self.col + 1 < self.row_len(self.row) {
                    self.col += 1;
                } else if self.wrap {
                    self.col = 0;
                } else if self.row < last_row {
                    self.row += 1;
                    self.col = 0;
                }
            }
        }
        (self.row, self.col) != before
    }

    fn append(&mut self, c: char) -> bool {
        if self.text.chars().count() >= self.max_len {
            tracing::trace!(max = self.max_len, "名字已达最大长度");
            return false;
        }
        self.text.push(c);
        true
    }

    fn submit(&mut self, ctx: &mut Ctx<'_>) -> Reaction {
        if !self.can_submit() {
            return Reaction::Handled;
        }
        ctx.click();
        Reaction::Complete(Outcome::Text(self.text.trim().to_string()))
    }

    /// 按下一个键
    pub fn press(&mut self, key: Key, ctx: &mut Ctx<'_>) -> Reaction {
        match key {
            Key::Char(c) => {
                let c = if self.uppercase {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                };
                if self.append(c) {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            Key::Shift => {
                self.uppercase = !self.uppercase;
                ctx.mark_dirty();
                Reaction::Handled
            }
            Key::Backspace => {
                if self.text.pop().is_some() {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            Key::Enter => self.submit(ctx),
        }
    }

    fn hit(&self, point: crate::geometry::Point) -> Option<(usize, usize)> {
        self.rects.iter().enumerate().find_map(|(row, rects)| {
            rects
                .iter()
                .position(|rect| rect.contains(point))
                .map(|col| (row, col))
        })
    }

    fn label(&self, key: Key) -> String {
        match key {
            Key::Char(c) if self.uppercase => c.to_ascii_uppercase().to_string(),
            Key::Char(c) => c.to_ascii_lowercase().to_string(),
            Key::Shift => "aA".to_string(),
            Key::Backspace => "DEL".to_string(),
            Key::Enter => "OK".to_string(),
        }
    }
}

impl Behavior for Keyboard {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        match *event {
            InputEvent::PointerMove(point) => {
                if let Some((row, col)) = self.hit(point)
                    && (row, col) != (self.row, self.col)
                {
                    self.row = row;
                    self.col = col;
                    ctx.mark_dirty();
                }
                Reaction::Pass
            }
            InputEvent::Click(point) => match self.hit(point) {
                Some((row, col)) => {
                    self.row = row;
                    self.col = col;
                    ctx.mark_dirty();
                    match self.current() {
                        Some(key) => self.press(key, ctx),
                        None => Reaction::Handled,
                    }
                }
                None => Reaction::Pass,
            },
            InputEvent::Direction(direction) => {
                if self.navigate(direction) {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            InputEvent::Select => match self.current() {
                Some(key) => self.press(key, ctx),
                None => Reaction::Handled,
            },
            InputEvent::Text('\n' | '\r') => self.submit(ctx),
            InputEvent::Text(c) => {
                if (c.is_alphanumeric() || c == ' ') && self.append(c) {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            InputEvent::Backspace => self.press(Key::Backspace, ctx),
            InputEvent::Escape => Reaction::Pass,
        }
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Keyboard {
            text: self.text.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|&key| self.label(key)).collect())
                .collect(),
            cursor: (self.row, self.col),
            uppercase: self.uppercase,
            enter_enabled: self.can_submit(),
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::config::EngineConfig;
    use crate::geometry::Point;

    fn keyboard(wrap: bool) -> Keyboard {
        let config = KeyboardConfig {
            wrap,
            ..KeyboardConfig::default()
        };
        Keyboard::new(&config, &ScreenConfig::default())
    }

    #[test]
    fn test_layout_appends_specials() {
        let kb = keyboard(false);
        assert_eq!(kb.rows.len(), 3);
        assert_eq!(kb.row_len(2), 9);
        assert_eq!(kb.rows[2][8], Key::Enter);
        assert_eq!(kb.current(), Some(Key::Char('A')));
    }

    #[test]
    fn test_row_crossing_without_wrap() {
        let mut kb = keyboard(false);
        // 行首向左不动
        assert!(!kb.navigate(Direction::Left));
        for _ in 0..9 {
            kb.navigate(Direction::Right);
        }
        assert_eq!(kb.current(), Some(Key::Char('J')));
        // 行尾向右进入下一行
        kb.navigate(Direction::Right);
        assert_eq!(kb.cursor(), (1, 0));
        kb.navigate(Direction::Left);
        assert_eq!(kb.cursor(), (0, 9));
    }

    #[test]
    fn test_wrap_within_row() {
        let mut kb = keyboard(true);
        kb.navigate(Direction::Left);
        assert_eq!(kb.cursor(), (0, 9));
        kb.navigate(Direction::Right);
        assert_eq!(kb.cursor(), (0, 0));
    }

    #[test]
    fn test_vertical_clamps_column() {
        let mut kb = keyboard(false);
        kb.navigate(Direction::Up);
        assert_eq!(kb.cursor(), (0, 0));
        for _ in 0..9 {
            kb.navigate(Direction::Right);
        }
        kb.navigate(Direction::Down);
        kb.navigate(Direction::Down);
        assert_eq!(kb.cursor(), (2, 8));
        assert_eq!(kb.current(), Some(Key::Enter));
        kb.navigate(Direction::Down);
        assert_eq!(kb.cursor(), (2, 8));
    }

    #[test]
    fn test_enter_requires_text() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut kb = keyboard(false);
        assert_eq!(kb.press(Key::Enter, &mut ctx), Reaction::Handled);
        assert!(!kb.can_submit());

        kb.press(Key::Char('a'), &mut ctx);
        assert_eq!(kb.text(), "A");
        kb.press(Key::Shift, &mut ctx);
        kb.press(Key::Char('B'), &mut ctx);
        assert_eq!(kb.text(), "Ab");
        assert_eq!(
            kb.press(Key::Enter, &mut ctx),
            Reaction::Complete(Outcome::Text("Ab".to_string()))
        );
    }

    #[test]
    fn test_blank_name_cannot_submit() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut kb = keyboard(false);
        kb.on_input(&InputEvent::Text(' '), &mut ctx);
        kb.on_input(&InputEvent::Text(' '), &mut ctx);
        assert_eq!(kb.text(), "  ");
        assert!(!kb.can_submit());
        assert_eq!(kb.on_input(&InputEvent::Text('\n'), &mut ctx), Reaction::Handled);
        assert!(backend.cues().is_empty());
    }

    #[test]
    fn test_submitted_name_is_trimmed() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut kb = keyboard(false);
        for c in " Jo ".chars() {
            kb.on_input(&InputEvent::Text(c), &mut ctx);
        }
        assert_eq!(
            kb.press(Key::Enter, &mut ctx),
            Reaction::Complete(Outcome::Text("Jo".to_string()))
        );
    }

    #[test]
    fn test_typed_text_and_backspace() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut kb = keyboard(false);
        for c in "ABX".chars() {
            kb.on_input(&InputEvent::Text(c), &mut ctx);
        }
        kb.on_input(&InputEvent::Backspace, &mut ctx);
        kb.on_input(&InputEvent::Text('C'), &mut ctx);
        // 非法字符被忽略
        kb.on_input(&InputEvent::Text('!'), &mut ctx);
        assert_eq!(
            kb.on_input(&InputEvent::Text('\n'), &mut ctx),
            Reaction::Complete(Outcome::Text("ABC".to_string()))
        );
    }

    #[test]
    fn test_max_len() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut kb = keyboard(false);
        for _ in 0..15 {
            kb.on_input(&InputEvent::Text('z'), &mut ctx);
        }
        assert_eq!(kb.text().len(), 10);
    }

    #[test]
    fn test_click_key() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut kb = keyboard(false);
        let rect = kb.rects[1][2];
        let click = InputEvent::Click(Point::new(rect.x + 1, rect.y + 1));
        let reaction = kb.on_input(&click, &mut ctx);
        assert_eq!(reaction, Reaction::Handled);
        assert_eq!(kb.text(), "M");
        assert_eq!(kb.cursor(), (1, 2));

        assert_eq!(
            kb.on_input(&InputEvent::Click(Point::new(0, 0)), &mut ctx),
            Reaction::Pass
        );
    }

    #[test]
    fn test_visual_reports_enter_state() {
        let kb = keyboard(false);
        let Some(Visual::Keyboard { enter_enabled, rows, .. }) = kb.visual() else {
            panic!("expected keyboard visual");
        };
        assert!(!enter_enabled);
        assert_eq!(rows[2].last().map(String::as_str), Some("OK"));
    }
}
