//! 全局退出按钮
//!
//! 位于覆盖层右上角，整个引擎只能有一个。点击它或按 Esc 请求打开
//! "返回标题？"确认框，由引擎决定是否真的打开（已有模态框时不打开）。

use crate::backend::{Layer, Visual};
use crate::config::ScreenConfig;
use crate::geometry::{Rect, exit_button_rect};
use crate::input::InputEvent;
use crate::widget::{Behavior, Ctx, Reaction};

#[derive(Debug, Clone)]
pub struct ExitButton {
    rect: Rect,
    hovered: bool,
}

impl ExitButton {
    pub fn new(screen: &ScreenConfig) -> Self {
        Self {
            rect: exit_button_rect(screen),
            hovered: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

impl Behavior for ExitButton {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut Ctx<'_>) -> Reaction {
        match *event {
            InputEvent::PointerMove(point) => {
                let hovered = self.rect.contains(point);
                if hovered != self.hovered {
                    self.hovered = hovered;
                    ctx.mark_dirty();
                }
                Reaction::Pass
            }
            InputEvent::Click(point) if self.rect.contains(point) => Reaction::ConfirmExit,
            InputEvent::Escape => Reaction::ConfirmExit,
            _ => Reaction::Pass,
        }
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Button {
            label: "X".to_string(),
            hovered: self.hovered,
        })
    }

    fn layer(&self) -> Option<Layer> {
        Some(Layer::Overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::config::EngineConfig;
    use crate::geometry::Point;

    #[test]
    fn test_exit_button_reactions() {
        let config = EngineConfig::default();
        let mut backend = RecordingBackend::new();
        let mut ctx = Ctx::new(&config, &mut backend);

        let mut button = ExitButton::new(&config.screen);
        let inside = Point::new(button.rect().x + 2, button.rect().y + 2);

        assert_eq!(
            button.on_input(&InputEvent::PointerMove(inside), &mut ctx),
            Reaction::Pass
        );
        assert!(matches!(button.visual(), Some(Visual::Button { hovered: true, .. })));
        assert_eq!(
            button.on_input(&InputEvent::Click(inside), &mut ctx),
            Reaction::ConfirmExit
        );
        assert_eq!(
            button.on_input(&InputEvent::Click(Point::new(0, 0)), &mut ctx),
            Reaction::Pass
        );
        assert_eq!(
            button.on_input(&InputEvent::Escape, &mut ctx),
            Reaction::ConfirmExit
        );
        assert_eq!(button.on_input(&InputEvent::Select, &mut ctx), Reaction::Pass);
    }
}
