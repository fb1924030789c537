//! Engine tunables.
//!
//! Every field has a default, so a partial JSON document (or none at all) is a
//! valid configuration. Fixed invariant bounds such as the font-size clamp live
//! in [`crate::consts`] instead.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::error::CanvasError;
use crate::geom::{GridSpec, Size};

pub const DEFAULT_SURFACE_WIDTH: f64 = 800.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 600.0;
pub const DEFAULT_GRID_STEP: f64 = 24.0;
pub const DEFAULT_GRID_PADDING: f64 = 8.0;
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 20.0;
pub const DEFAULT_SNAP_THRESHOLD_DEG: f64 = 2.0;
pub const DEFAULT_GUIDE_MARGIN: f64 = 4.0;
pub const DEFAULT_IMAGE_FIT_FACTOR: f64 = 0.9;
pub const DEFAULT_AUTOPLACE_SHRINK: f64 = 0.85;
pub const DEFAULT_AUTOPLACE_ATTEMPTS: u32 = 6;
pub const DEFAULT_TEXT_LINE_HEIGHT: f64 = 1.16;
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_WRAP_WIDTH: f64 = 260.0;
pub const DEFAULT_ALIGN_MIN_WIDTH: f64 = 200.0;
pub const DEFAULT_TOOLBAR_GAP_PX: f64 = 12.0;

/// Tunable engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial surface width.
    pub surface_width: f64,
    /// Initial surface height.
    pub surface_height: f64,
    /// Step of the free-cell placement grid.
    pub grid_step: f64,
    /// Inset of the free-cell placement grid.
    pub grid_padding: f64,
    /// Offset applied on both axes to a duplicated object.
    pub duplicate_offset: f64,
    /// Maximum distance from a right angle at which the straight guide shows.
    pub snap_threshold_deg: f64,
    /// Extra perpendicular offset of the straight guide beyond half the font size.
    pub guide_margin: f64,
    /// Fraction of the surface a newly added image may fill.
    pub image_fit_factor: f64,
    /// Scale multiplier applied on each failed auto-place attempt.
    pub autoplace_shrink: f64,
    /// Number of auto-place attempts before falling back to the center.
    pub autoplace_attempts: u32,
    /// Line height as a multiple of the font size.
    pub text_line_height: f64,
    /// Font size used when a caller supplies a non-numeric one.
    pub default_font_size: f64,
    /// Wrap width given to new text objects.
    pub default_wrap_width: f64,
    /// Minimum wrap width enforced when alignment is set.
    pub align_min_width: f64,
    /// Screen gap between the toolbar anchor and the object's top edge.
    pub toolbar_gap_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            grid_step: DEFAULT_GRID_STEP,
            grid_padding: DEFAULT_GRID_PADDING,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            snap_threshold_deg: DEFAULT_SNAP_THRESHOLD_DEG,
            guide_margin: DEFAULT_GUIDE_MARGIN,
            image_fit_factor: DEFAULT_IMAGE_FIT_FACTOR,
            autoplace_shrink: DEFAULT_AUTOPLACE_SHRINK,
            autoplace_attempts: DEFAULT_AUTOPLACE_ATTEMPTS,
            text_line_height: DEFAULT_TEXT_LINE_HEIGHT,
            default_font_size: DEFAULT_FONT_SIZE,
            default_wrap_width: DEFAULT_WRAP_WIDTH,
            align_min_width: DEFAULT_ALIGN_MIN_WIDTH,
            toolbar_gap_px: DEFAULT_TOOLBAR_GAP_PX,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Config`] when the document is not valid JSON, has a
    /// mistyped field, or describes an empty surface.
    pub fn from_json(raw: &str) -> Result<Self, CanvasError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| CanvasError::Config(e.to_string()))?;
        if !config.surface_size().is_valid() {
            return Err(CanvasError::Config(format!(
                "surface must be positive, got {}x{}",
                config.surface_width, config.surface_height
            )));
        }
        Ok(config)
    }

    #[must_use]
    pub fn surface_size(&self) -> Size {
        Size::new(self.surface_width, self.surface_height)
    }

    #[must_use]
    pub fn grid(&self) -> GridSpec {
        GridSpec { step: self.grid_step, padding: self.grid_padding }
    }
}
