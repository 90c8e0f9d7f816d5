//! 模态确认框
//!
//! 总是位于事件栈最前面，打开期间独占所有输入：
//! 任何输入都报告"已处理"，即使没有命中任何按钮。

use crate::backend::{Layer, Visual};
use crate::config::ScreenConfig;
use crate::event::Outcome;
use crate::geometry::{Rect, hit, prompt_rects};
use crate::input::InputEvent;
use crate::widget::{Behavior, Ctx, Reaction};

use super::menu::ListCursor;

#[derive(Debug, Clone)]
pub struct Prompt {
    text: String,
    buttons: Vec<String>,
    cursor: ListCursor,
    rects: Vec<Rect>,
}

impl Prompt {
    /// 至少有一个按钮，否则补一个 "OK"
    pub fn new(text: impl Into<String>, buttons: Vec<String>, screen: &ScreenConfig) -> Self {
        let buttons = if buttons.is_empty() {
            vec!["OK".to_string()]
        } else {
            buttons
        };
        Self {
            text: text.into(),
            cursor: ListCursor::new(buttons.len()),
            rects: prompt_rects(screen, buttons.len()),
            buttons,
        }
    }

    /// 是/否确认框
    pub fn yes_no(text: impl Into<String>, screen: &ScreenConfig) -> Self {
        Self::new(text, vec!["Yes".to_string(), "No".to_string()], screen)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn buttons(&self) -> &[String] {
        &self.buttons
    }

    pub fn highlighted(&self) -> usize {
        self.cursor.index()
    }

    fn press(&self, index: usize, ctx: &mut Ctx<'_>) -> Reaction {
        if index >= self.buttons.len() {
            return Reaction::Handled;
        }
        ctx.click();
        Reaction::Complete(Outcome::Index(index))
    }
}

impl Behavior for Prompt {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        match *event {
            InputEvent::PointerMove(point) => {
                if let Some(index) = hit(&self.rects, point)
                    && self.cursor.set(index)
                {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            InputEvent::Click(point) => match hit(&self.rects, point) {
                Some(index) => self.press(index, ctx),
                None => Reaction::Handled,
            },
            InputEvent::Direction(direction) => {
                if self.cursor.step(direction) {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            InputEvent::Select => self.press(self.cursor.index(), ctx),
            InputEvent::Text(_) | InputEvent::Backspace | InputEvent::Escape => Reaction::Handled,
        }
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Prompt {
            text: self.text.clone(),
            buttons: self.buttons.clone(),
            highlighted: self.cursor.index(),
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Overlay)
    }

    fn is_modal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::config::EngineConfig;
    use crate::geometry::Point;
    use crate::input::Direction;

    #[test]
    fn test_prompt_owns_all_input() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut prompt = Prompt::yes_no("Return to title?", &config.screen);
        let inputs = [
            InputEvent::PointerMove(Point::new(0, 0)),
            InputEvent::Click(Point::new(0, 0)),
            InputEvent::Text('x'),
            InputEvent::Backspace,
            InputEvent::Escape,
        ];
        for input in inputs {
            assert_eq!(prompt.on_input(&input, &mut ctx), Reaction::Handled);
        }
        assert!(prompt.is_modal());
    }

    #[test]
    fn test_buttons_wrap_and_complete() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut prompt = Prompt::yes_no("?", &config.screen);
        prompt.on_input(&InputEvent::Direction(Direction::Left), &mut ctx);
        assert_eq!(prompt.highlighted(), 1);
        prompt.on_input(&InputEvent::Direction(Direction::Right), &mut ctx);
        assert_eq!(prompt.highlighted(), 0);
        assert_eq!(
            prompt.on_input(&InputEvent::Select, &mut ctx),
            Reaction::Complete(Outcome::Index(0))
        );
    }

    #[test]
    fn test_click_button() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut prompt = Prompt::yes_no("?", &config.screen);
        let rect = prompt_rects(&config.screen, 2)[1];
        assert_eq!(
            prompt.on_input(&InputEvent::Click(Point::new(rect.x + 3, rect.y + 3)), &mut ctx),
            Reaction::Complete(Outcome::Index(1))
        );
    }

    #[test]
    fn test_empty_buttons_get_default() {
        let prompt = Prompt::new("?", Vec::new(), &ScreenConfig::default());
        assert_eq!(prompt.buttons(), &["OK".to_string()]);
    }
}
