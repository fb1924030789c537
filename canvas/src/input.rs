//! Input model: modifier keys, wheel deltas, and the gesture state machine.
//!
//! `InputState` is the gesture tracked between pointer-down and pointer-up.
//! Every active variant carries the last known-good geometry of the object it
//! manipulates, so a step that would break the no-overlap invariant can be
//! rolled back instead of applied.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{Geometry, ObjectId, SurfaceObject};
use crate::geom::{EdgeFlags, Point, Size};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Wheel / trackpad scroll delta in pixels.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive = down.
    pub dy: f64,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Straight alignment guide shown while a rotation is near a right angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightGuide {
    pub from: Point,
    pub to: Point,
    /// The right angle the guide belongs to.
    pub target: f64,
}

/// Persistent UI state visible to the renderer and the toolbar.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The active (selected) object, if any.
    pub active_id: Option<ObjectId>,
    /// Text object currently in text-edit mode.
    pub editing_id: Option<ObjectId>,
    pub guide: Option<StraightGuide>,
    /// Edges touched by the object under manipulation, for the dashed highlight.
    pub edges: EdgeFlags,
}

/// The parts of an object a gesture may change and later restore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub geometry: Geometry,
    /// Text box extent before the gesture; zero for images.
    pub text_box: Size,
    pub wrap_width: f64,
    pub min_height: f64,
}

impl Snapshot {
    #[must_use]
    pub fn of(obj: &SurfaceObject) -> Self {
        let (text_box, wrap_width, min_height) = obj
            .as_text()
            .map_or((Size::default(), 0.0, 0.0), |t| (Size::new(t.width, t.height), t.wrap_width, t.min_height));
        Self { geometry: obj.geometry, text_box, wrap_width, min_height }
    }

    /// Write this snapshot back onto `obj`.
    pub fn restore(&self, obj: &mut SurfaceObject) {
        obj.geometry = self.geometry;
        if let Some(t) = obj.as_text_mut() {
            t.width = self.text_box.width;
            t.height = self.text_box.height;
            t.wrap_width = self.wrap_width;
            t.min_height = self.min_height;
        }
    }
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving an object.
    Dragging {
        id: ObjectId,
        /// Pointer position minus object origin at drag start.
        grab: Point,
        start: Snapshot,
        /// Position at drag start or at the last overlap-free step.
        last_good: Snapshot,
    },
    /// Dragging the scale handle.
    Scaling {
        id: ObjectId,
        /// Surface position of the pointer when the gesture began.
        start_pointer: Point,
        /// Object state when the gesture began; scale factors are relative to it.
        start: Snapshot,
        last_good: Snapshot,
    },
    /// Dragging the rotate handle.
    Rotating {
        id: ObjectId,
        /// Rotation pivot (object center).
        center: Point,
        /// Pointer bearing from the center at gesture start, in degrees.
        pointer_start_deg: f64,
        start_angle: f64,
        start: Snapshot,
        last_good: Snapshot,
    },
    /// Panning the view by dragging empty space.
    Panning { last_screen: Point },
}

impl InputState {
    /// Object manipulated by the current gesture.
    #[must_use]
    pub fn target(&self) -> Option<ObjectId> {
        match self {
            Self::Dragging { id, .. } | Self::Scaling { id, .. } | Self::Rotating { id, .. } => Some(*id),
            Self::Idle | Self::Panning { .. } => None,
        }
    }

    /// Object state when the current gesture began.
    #[must_use]
    pub fn start(&self) -> Option<Snapshot> {
        match self {
            Self::Dragging { start, .. } | Self::Scaling { start, .. } | Self::Rotating { start, .. } => Some(*start),
            Self::Idle | Self::Panning { .. } => None,
        }
    }
}
