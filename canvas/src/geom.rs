//! Geometry utilities: pure rectangle and angle algorithms.
//!
//! Everything here is stateless and deterministic. Rectangles are axis-aligned
//! and expressed in surface units with the origin at the top-left corner.
//! Touching edges never count as overlap.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::consts::{OVERLAP_TOLERANCE, RIGHT_ANGLES};
use crate::error::CanvasError;

/// A point in either screen or surface space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Rotate this point about `pivot` by `deg` degrees clockwise (y-down).
    #[must_use]
    pub fn rotated_about(self, pivot: Point, deg: f64) -> Point {
        let (s, c) = deg.to_radians().sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Point { x: pivot.x + dx * c - dy * s, y: pivot.y + dx * s + dy * c }
    }
}

/// Width and height of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    #[must_use]
    pub fn scaled(self, sx: f64, sy: f64) -> Size {
        Size { width: self.width * sx, height: self.height * sy }
    }
}

/// A translation applied to a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    #[must_use]
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Manhattan magnitude; single-axis pushes make this their absolute length.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.dx.abs() + self.dy.abs()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset { dx: self.dx + rhs.dx, dy: self.dy + rhs.dy }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    #[must_use]
    pub fn at(origin: Point, size: Size) -> Self {
        Self { left: origin.x, top: origin.y, width: size.width, height: size.height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    #[must_use]
    pub fn translated(&self, offset: Offset) -> Rect {
        Rect { left: self.left + offset.dx, top: self.top + offset.dy, ..*self }
    }

    /// Whether the rectangle lies within `[0, 0, container.width, container.height]`.
    #[must_use]
    pub fn is_inside(&self, container: Size) -> bool {
        self.left >= 0.0 && self.top >= 0.0 && self.right() <= container.width && self.bottom() <= container.height
    }
}

/// Which surface boundaries a bounding box touches or exceeds.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeFlags {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl EdgeFlags {
    #[must_use]
    pub fn any(&self) -> bool {
        self.left || self.top || self.right || self.bottom
    }
}

/// Grid used by the free-cell scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Distance between neighbouring candidate positions.
    pub step: f64,
    /// Inset kept free on every side of the container.
    pub padding: f64,
}

/// Result of snapping an angle to the nearest right angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RightAngle {
    /// The nearest of 0, 90, 180, 270.
    pub target: f64,
    /// Unsigned angular distance to `target`, in degrees.
    pub delta: f64,
    /// `delta` is within the requested threshold.
    pub within: bool,
}

impl RightAngle {
    /// The guide for this target runs horizontally.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.target == 0.0 || self.target == 180.0
    }
}

/// Overlap test. Shared edges, and intersections no deeper than
/// [`OVERLAP_TOLERANCE`], do not overlap.
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    let t = OVERLAP_TOLERANCE;
    !(a.right() <= b.left + t || b.right() <= a.left + t || a.bottom() <= b.top + t || b.bottom() <= a.top + t)
}

/// Translation that brings `rect` inside `container`.
///
/// A rectangle larger than the container on an axis is pinned to that axis's
/// origin side.
#[must_use]
pub fn clamp_into_bounds(rect: &Rect, container: Size) -> Offset {
    Offset {
        dx: clamp_axis(rect.left, rect.width, container.width),
        dy: clamp_axis(rect.top, rect.height, container.height),
    }
}

fn clamp_axis(start: f64, len: f64, limit: f64) -> f64 {
    if len >= limit || start < 0.0 {
        -start
    } else if start + len > limit {
        limit - (start + len)
    } else {
        0.0
    }
}

/// Smallest single-axis push of `a` that stops it overlapping `b`.
///
/// Candidates are tried shortest first; each is clamped into `container` and
/// accepted only if the result overlaps neither `b` nor anything in
/// `occupied`. The returned offset includes the clamp correction.
///
/// # Errors
///
/// [`CanvasError::SeparationExhausted`] when all four candidates fail.
pub fn minimal_separation(a: &Rect, b: &Rect, container: Size, occupied: &[Rect]) -> Result<Offset, CanvasError> {
    let push_left = a.right() - b.left;
    let push_right = b.right() - a.left;
    let push_up = a.bottom() - b.top;
    let push_down = b.bottom() - a.top;

    let mut candidates = [
        Offset::new(-push_left, 0.0),
        Offset::new(push_right, 0.0),
        Offset::new(0.0, -push_up),
        Offset::new(0.0, push_down),
    ];
    candidates.sort_by(|p, q| p.magnitude().total_cmp(&q.magnitude()));

    for candidate in candidates {
        let moved = a.translated(candidate);
        let fix = clamp_into_bounds(&moved, container);
        let placed = moved.translated(fix);
        if !rects_overlap(&placed, b) && occupied.iter().all(|o| !rects_overlap(&placed, o)) {
            return Ok(candidate + fix);
        }
    }
    Err(CanvasError::SeparationExhausted)
}

/// Grid position nearest the container center where a box of `size` fits
/// without overlapping `occupied`.
///
/// Candidates are scanned row-major from the top-left; among equally near
/// cells the first scanned wins.
///
/// # Errors
///
/// [`CanvasError::PlacementExhausted`] when no grid cell is free.
pub fn nearest_free_cell(size: Size, container: Size, occupied: &[Rect], grid: GridSpec) -> Result<Point, CanvasError> {
    let step = grid.step.max(1.0);
    let pad = grid.padding.max(0.0);
    let target = Point::new(container.width * 0.5, container.height * 0.5);

    let mut best: Option<(f64, Point)> = None;
    let mut y = pad;
    while y + size.height + pad <= container.height {
        let mut x = pad;
        while x + size.width + pad <= container.width {
            let candidate = Rect::new(x, y, size.width, size.height);
            if occupied.iter().all(|o| !rects_overlap(&candidate, o)) {
                let dist = candidate.center().distance_sq(target);
                if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                    best = Some((dist, Point::new(x, y)));
                }
            }
            x += step;
        }
        y += step;
    }

    best.map(|(_, p)| p).ok_or(CanvasError::PlacementExhausted)
}

/// Centered position for a box of `size`, kept `padding` away from the edges
/// where it fits.
#[must_use]
pub fn clamped_center(size: Size, container: Size, padding: f64) -> Point {
    let x = ((container.width - size.width) * 0.5).min(container.width - size.width - padding).max(padding);
    let y = ((container.height - size.height) * 0.5).min(container.height - size.height - padding).max(padding);
    Point::new(x, y)
}

/// Nearest of {0, 90, 180, 270} to `angle_deg` and whether it lies within
/// `threshold_deg`.
#[must_use]
pub fn nearest_right_angle(angle_deg: f64, threshold_deg: f64) -> RightAngle {
    let mut target = RIGHT_ANGLES[0];
    let mut delta = f64::INFINITY;
    for candidate in RIGHT_ANGLES {
        let d = angular_distance(angle_deg, candidate);
        if d < delta {
            delta = d;
            target = candidate;
        }
    }
    RightAngle { target, delta, within: delta <= threshold_deg }
}

/// Unsigned distance between two angles on the circle, in `[0, 180]`.
#[must_use]
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}

/// Normalize degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    if deg.is_finite() { deg.rem_euclid(360.0) } else { 0.0 }
}

/// Axis-aligned bounds of `rect` rotated by `angle_deg` about its center.
#[must_use]
pub fn rotated_bounds(rect: &Rect, angle_deg: f64) -> Rect {
    if angle_deg.rem_euclid(360.0) == 0.0 {
        return *rect;
    }
    let (s, c) = angle_deg.to_radians().sin_cos();
    let hw = rect.width * 0.5;
    let hh = rect.height * 0.5;
    let ex = (hw * c).abs() + (hh * s).abs();
    let ey = (hw * s).abs() + (hh * c).abs();
    let center = rect.center();
    Rect::new(center.x - ex, center.y - ey, ex * 2.0, ey * 2.0)
}

/// Which container edges `rect` touches or exceeds.
#[must_use]
pub fn touched_edges(rect: &Rect, container: Size) -> EdgeFlags {
    EdgeFlags {
        left: rect.left <= 0.0,
        top: rect.top <= 0.0,
        right: rect.right() >= container.width,
        bottom: rect.bottom() >= container.height,
    }
}
