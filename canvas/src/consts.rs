//! Shared numeric constants for the canvas crate.

// ── Text ────────────────────────────────────────────────────────

/// Smallest font size a text object may carry.
pub const FONT_SIZE_MIN: f64 = 6.0;

/// Largest font size a text object may carry.
pub const FONT_SIZE_MAX: f64 = 200.0;

/// Font family used when a caller does not name one.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Fill color for text glyphs.
pub const TEXT_FILL: &str = "#000";

/// Width bounds for a text box after a scale gesture.
pub const TEXT_WIDTH_MIN: f64 = 60.0;
pub const TEXT_WIDTH_MAX: f64 = 1000.0;

/// Height bounds for a text box after a scale gesture.
pub const TEXT_HEIGHT_MIN: f64 = 20.0;
pub const TEXT_HEIGHT_MAX: f64 = 2000.0;

// ── Geometry ────────────────────────────────────────────────────

/// Overlap depth treated as touching. Separation pushes and rotated bounds
/// land on a neighbour's edge only up to rounding.
pub const OVERLAP_TOLERANCE: f64 = 1e-9;

// ── Images ──────────────────────────────────────────────────────

/// Uniform scale bounds for image objects during a scale gesture.
pub const IMAGE_SCALE_MIN: f64 = 0.02;
pub const IMAGE_SCALE_MAX: f64 = 50.0;

// ── Rotation ────────────────────────────────────────────────────

/// Snap targets for the straight guide, in degrees.
pub const RIGHT_ANGLES: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Font size assumed for the guide offset when the object has none.
pub const GUIDE_FALLBACK_FONT_SIZE: f64 = 16.0;

/// Shortest straight guide ever drawn, in surface units.
pub const GUIDE_MIN_LENGTH: f64 = 2.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Overlays ────────────────────────────────────────────────────

/// Stroke color for touched edges and overlap outlines.
pub const VIOLATION_STROKE: &str = "#ff4d4f";

/// Stroke color for the straight rotation guide.
pub const GUIDE_STROKE: &str = "#7A3FF2";

/// Stroke color for the active-object selection box.
pub const SELECTION_STROKE: &str = "#1E88E5";

/// Dash pattern (on, off) for violation overlays, in pixels.
pub const VIOLATION_DASH: [f64; 2] = [6.0, 3.0];

/// Line width for all overlays, in pixels.
pub const OVERLAY_LINE_WIDTH: f64 = 2.0;
