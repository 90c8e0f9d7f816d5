//! 标题菜单：开始 / 退出

use crate::backend::{Layer, Visual};
use crate::config::ScreenConfig;
use crate::event::Outcome;
use crate::geometry::{Rect, hit, menu_rects};
use crate::input::InputEvent;
use crate::widget::{Behavior, Ctx, Reaction};

use super::menu::ListCursor;

/// 开始游戏
pub const MENU_PLAY: usize = 0;
/// 退出（进程重置由宿主完成）
pub const MENU_QUIT: usize = 1;

#[derive(Debug, Clone)]
pub struct TitleMenu {
    items: Vec<String>,
    cursor: ListCursor,
    rects: Vec<Rect>,
}

impl TitleMenu {
    pub fn new(screen: &ScreenConfig) -> Self {
        let items = vec!["Play".to_string(), "Quit".to_string()];
        Self {
            cursor: ListCursor::new(items.len()),
            rects: menu_rects(screen, items.len()),
            items,
        }
    }

    pub fn highlighted(&self) -> usize {
        self.cursor.index()
    }
}

impl Behavior for TitleMenu {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        match *event {
            InputEvent::PointerMove(point) => {
                if let Some(index) = hit(&self.rects, point)
                    && self.cursor.set(index)
                {
                    ctx.mark_dirty();
                }
                Reaction::Pass
            }
            InputEvent::Click(point) => match hit(&self.rects, point) {
                Some(index) => {
                    ctx.click();
                    Reaction::Complete(Outcome::Index(index))
                }
                None => Reaction::Pass,
            },
            InputEvent::Direction(direction) => {
                if self.cursor.step(direction) {
                    ctx.mark_dirty();
                }
                Reaction::Handled
            }
            InputEvent::Select => {
                ctx.click();
                Reaction::Complete(Outcome::Index(self.cursor.index()))
            }
            _ => Reaction::Pass,
        }
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Menu {
            items: self.items.clone(),
            highlighted: self.cursor.index(),
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Upper)
    }
}
