//! Scene object model: surface objects, their attributes, and the store.
//!
//! This module defines what sits on the surface (`SurfaceObject`, a tagged
//! `ObjectKind` of text or image), the shared transform (`Geometry`), and the
//! `Scene` store that owns every live object. The store is private to the
//! composition engine; nothing else mutates it.
//!
//! The renderer and the hit tester read from `Scene` via `ordered`, which
//! yields objects in insertion (draw) order.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CanvasError;
use crate::geom::{EdgeFlags, Point, Rect, Size, rects_overlap, rotated_bounds};

/// Unique identifier for a surface object.
pub type ObjectId = Uuid;

/// Horizontal alignment of text lines within the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Where an image's vector source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    /// Uploaded by the user.
    #[default]
    Upload,
    /// Picked from the built-in library.
    Library,
}

/// Transform shared by every object kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Left edge of the untransformed box.
    pub left: f64,
    /// Top edge of the untransformed box.
    pub top: f64,
    /// Clockwise rotation in degrees around the box center.
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, angle: 0.0, scale_x: 1.0, scale_y: 1.0, flip_x: false, flip_y: false }
    }
}

impl Geometry {
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self { left: position.x, top: position.y, ..Self::default() }
    }
}

/// Text-only attributes, including the laid-out lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAttrs {
    pub text: String,
    pub font_family: String,
    /// Always within `[FONT_SIZE_MIN, FONT_SIZE_MAX]`.
    pub font_size: f64,
    pub align: TextAlign,
    /// Width lines wrap at; every text object has one.
    pub wrap_width: f64,
    /// Lower bound on the box height, set by the scale gesture.
    pub min_height: f64,
    /// Laid-out box width.
    pub width: f64,
    /// Laid-out box height.
    pub height: f64,
    pub lines: Vec<String>,
}

/// Image-only attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttrs {
    /// Sanitized vector source, kept so the object can be exported.
    pub source_markup: String,
    pub origin_kind: OriginKind,
    /// Size of the vector document before scaling.
    pub intrinsic: Size,
    pub drawable_count: usize,
}

/// The two object variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Text(TextAttrs),
    Image(ImageAttrs),
}

/// A renderable item on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub geometry: Geometry,
    /// Excluded from overlap and edge checks, never selectable.
    pub layout_only: bool,
    /// Set when the current gesture step collided with another object, or
    /// when the object was left overlapping because nothing was free.
    pub violates_overlap: bool,
    pub touched_edges: EdgeFlags,
}

impl SurfaceObject {
    #[must_use]
    pub fn new(id: ObjectId, kind: ObjectKind, geometry: Geometry) -> Self {
        Self { id, kind, geometry, layout_only: false, violates_overlap: false, touched_edges: EdgeFlags::default() }
    }

    /// Scaled size of the untransformed box.
    #[must_use]
    pub fn box_size(&self) -> Size {
        let base = match &self.kind {
            ObjectKind::Text(t) => Size::new(t.width, t.height),
            ObjectKind::Image(i) => i.intrinsic,
        };
        base.scaled(self.geometry.scale_x.abs(), self.geometry.scale_y.abs())
    }

    /// The untransformed box in surface coordinates.
    #[must_use]
    pub fn local_rect(&self) -> Rect {
        Rect::at(Point::new(self.geometry.left, self.geometry.top), self.box_size())
    }

    /// Axis-aligned bounding box including rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        rotated_bounds(&self.local_rect(), self.geometry.angle)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.local_rect().center()
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextAttrs> {
        match &self.kind {
            ObjectKind::Text(t) => Some(t),
            ObjectKind::Image(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextAttrs> {
        match &mut self.kind {
            ObjectKind::Text(t) => Some(t),
            ObjectKind::Image(_) => None,
        }
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&ImageAttrs> {
        match &self.kind {
            ObjectKind::Image(i) => Some(i),
            ObjectKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }
}

/// Store of surface objects with draw order and retired ids.
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<ObjectId, SurfaceObject>,
    order: Vec<ObjectId>,
    retired: HashSet<ObjectId>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new object on top of the draw order.
    ///
    /// # Errors
    ///
    /// [`CanvasError::DuplicateObjectId`] when the id is live or was used
    /// before.
    pub fn insert(&mut self, obj: SurfaceObject) -> Result<(), CanvasError> {
        if self.is_known(&obj.id) {
            return Err(CanvasError::DuplicateObjectId(obj.id));
        }
        self.order.push(obj.id);
        self.objects.insert(obj.id, obj);
        Ok(())
    }

    /// Insert under the object's id, or under a fresh one when that id is
    /// already known. Returns the id the object was stored under.
    pub fn insert_fresh(&mut self, mut obj: SurfaceObject) -> ObjectId {
        while self.is_known(&obj.id) {
            obj.id = Uuid::new_v4();
        }
        let id = obj.id;
        self.order.push(id);
        self.objects.insert(id, obj);
        id
    }

    /// Remove an object and retire its id.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SurfaceObject> {
        let obj = self.objects.remove(id)?;
        self.order.retain(|o| o != id);
        self.retired.insert(*id);
        Some(obj)
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&SurfaceObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SurfaceObject> {
        self.objects.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Whether the id is live or has been retired.
    #[must_use]
    pub fn is_known(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id) || self.retired.contains(id)
    }

    /// Objects bottom to top.
    pub fn ordered(&self) -> impl DoubleEndedIterator<Item = &SurfaceObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Bounds of every non-layout object other than `id`.
    #[must_use]
    pub fn bounds_except(&self, id: &ObjectId) -> Vec<Rect> {
        self.ordered().filter(|o| o.id != *id && !o.layout_only).map(SurfaceObject::bounds).collect()
    }

    /// First non-layout object (in draw order) whose bounds overlap `rect`,
    /// ignoring `id`.
    #[must_use]
    pub fn first_overlap(&self, id: &ObjectId, rect: &Rect) -> Option<(ObjectId, Rect)> {
        self.ordered()
            .filter(|o| o.id != *id && !o.layout_only)
            .map(|o| (o.id, o.bounds()))
            .find(|(_, b)| rects_overlap(rect, b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
