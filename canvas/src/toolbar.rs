//! Floating toolbar above the active object.
//!
//! The controller owns no DOM. It keeps an anchor point in screen space that
//! the host positions its button cluster at, and forwards button presses to
//! the engine. Call [`ToolbarController::sync`] after any geometry change and
//! after the camera moves.

#[cfg(test)]
#[path = "toolbar_test.rs"]
mod toolbar_test;

use tracing::debug;

use crate::doc::ObjectId;
use crate::engine::EngineCore;
use crate::geom::Point;

/// Toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    Delete,
    Mirror,
    Duplicate,
    Save,
}

/// Visibility and placement of the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarController {
    visible: bool,
    /// Bottom-center of the toolbar in screen pixels.
    anchor: Option<Point>,
    /// Distance kept between the toolbar and the object's top edge.
    gap: f64,
}

impl ToolbarController {
    #[must_use]
    pub fn new(gap: f64) -> Self {
        Self { visible: false, anchor: None, gap }
    }

    /// Controller using the engine's configured gap.
    #[must_use]
    pub fn for_engine(core: &EngineCore) -> Self {
        Self::new(core.config.toolbar_gap_px)
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        self.anchor.filter(|_| self.visible)
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.anchor = None;
    }

    /// Recompute the anchor from the active object's screen-space bounds.
    /// Hidden when nothing is active or the active object is layout-only.
    pub fn sync(&mut self, core: &EngineCore) {
        let Some(obj) = core.active_object().filter(|o| !o.layout_only) else {
            self.hide();
            return;
        };
        let screen = core.camera.rect_to_screen(&obj.bounds());
        self.anchor = Some(Point::new(screen.center().x, screen.top - self.gap));
        self.visible = true;
    }

    /// Run a button's command against the engine and update visibility.
    /// Returns the object the command produced or acted on.
    pub fn press(&mut self, core: &mut EngineCore, button: ToolbarButton) -> Option<ObjectId> {
        let active = core.active();
        debug!(?button, ?active, "toolbar: press");
        let result = match button {
            ToolbarButton::Delete => {
                let id = active?;
                core.remove_object(&id);
                Some(id)
            }
            ToolbarButton::Mirror => {
                core.mirror_active();
                active
            }
            ToolbarButton::Duplicate => {
                let id = core.duplicate_active()?;
                core.select_object(&id);
                Some(id)
            }
            ToolbarButton::Save => core.save_active(),
        };
        match button {
            ToolbarButton::Delete | ToolbarButton::Save => self.hide(),
            ToolbarButton::Mirror | ToolbarButton::Duplicate => self.sync(core),
        }
        result
    }
}
