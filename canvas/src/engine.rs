use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::consts::{
    DEFAULT_FONT_FAMILY, FONT_SIZE_MAX, FONT_SIZE_MIN, GUIDE_FALLBACK_FONT_SIZE, GUIDE_MIN_LENGTH, IMAGE_SCALE_MAX,
    IMAGE_SCALE_MIN, TEXT_HEIGHT_MAX, TEXT_HEIGHT_MIN, TEXT_WIDTH_MAX, TEXT_WIDTH_MIN,
};
use crate::doc::{Geometry, ImageAttrs, ObjectId, ObjectKind, OriginKind, Scene, SurfaceObject, TextAlign, TextAttrs};
use crate::error::CanvasError;
use crate::geom::{
    EdgeFlags, Offset, Point, Rect, Size, clamp_into_bounds, clamped_center, minimal_separation, nearest_free_cell,
    nearest_right_angle, normalize_degrees, rotated_bounds, touched_edges,
};
use crate::hit::{HitPart, hit_test};
use crate::input::{InputState, Key, Modifiers, Snapshot, StraightGuide, UiState, WheelDelta};
use crate::loader::ResourceLoader;
use crate::render;
use crate::surface::Surface;
use crate::svg;
use crate::text::{ApproxMeasure, LayoutRequest, TextMeasure, layout};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

const ZOOM_MIN: f64 = 0.1;
const ZOOM_MAX: f64 = 8.0;
const WHEEL_ZOOM_RATE: f64 = 0.0015;

/// Change notifications for panels, queued in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// An object was created by an add operation.
    Created(ObjectId),
    /// An object was added by duplication.
    Added(ObjectId),
    Removed(ObjectId),
    /// The toolbar's save button was pressed for this object.
    Save(ObjectId),
    /// Selection changed through pointer input, deletion, or save.
    SelectionChanged(Option<ObjectId>),
    /// A gesture or mirror finished changing this object.
    Modified(ObjectId),
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RenderNeeded,
    SetCursor(String),
}

/// Arguments for [`EngineCore::add_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewText {
    /// Id to use; a fresh one is generated when absent or already used.
    pub id: Option<ObjectId>,
    pub text: String,
    /// Clamped into the font-size bounds; non-finite means the default size.
    pub font_size: f64,
    pub font_family: String,
    pub align: TextAlign,
    /// Exact top-left; auto-placement is used when absent.
    pub position: Option<Point>,
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub wrap_width: Option<f64>,
}

impl NewText {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            id: None,
            text: text.into(),
            font_size,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            align: TextAlign::Left,
            position: None,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            wrap_width: None,
        }
    }
}

/// Arguments for [`EngineCore::add_image_from_vector_markup`].
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ImageOptions {
    pub id: Option<ObjectId>,
    /// Exact top-left; bypasses placement.
    pub position: Option<Point>,
    /// Explicit scale factors; defaults to fitting the surface.
    pub scale: Option<(f64, f64)>,
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Shrink-and-search placement instead of centering.
    pub auto_place: bool,
    pub origin_kind: OriginKind,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub config: EngineConfig,
    pub surface: Surface,
    pub scene: Scene,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    measure: Box<dyn TextMeasure>,
    signals: Vec<Signal>,
    render_pending: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_measure(config, Box::new(ApproxMeasure::default()))
    }

    #[must_use]
    pub fn with_measure(config: EngineConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            surface: Surface::new(config.surface_size()),
            config,
            scene: Scene::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            measure,
            signals: Vec::new(),
            render_pending: true,
        }
    }

    // --- Signals / render coalescing ---

    fn emit(&mut self, signal: Signal) {
        debug!(?signal, "engine: signal");
        self.signals.push(signal);
    }

    fn request_render(&mut self) {
        self.render_pending = true;
    }

    /// Take every queued signal, oldest first.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    /// Whether a paint is owed; clears the request.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::replace(&mut self.render_pending, false)
    }

    // --- Helpers ---

    fn fresh_id(&self, requested: Option<ObjectId>) -> ObjectId {
        match requested {
            Some(id) if !self.scene.is_known(&id) => id,
            Some(id) => {
                debug!(%id, "engine: requested id already used, generating a new one");
                Uuid::new_v4()
            }
            None => Uuid::new_v4(),
        }
    }

    fn clamp_font_size(&self, size: f64) -> f64 {
        if size.is_finite() { size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX) } else { self.config.default_font_size }
    }

    fn centered_position(&self, size: Size) -> Point {
        Point::new((self.surface.width - size.width) * 0.5, (self.surface.height - size.height) * 0.5)
    }

    /// Top-left for a box whose rotated bounds sit in the free grid cell
    /// nearest the surface center.
    fn free_position(&self, id: ObjectId, size: Size, angle: f64) -> Result<Point, CanvasError> {
        let extent = rotated_bounds(&Rect::at(Point::default(), size), angle).size();
        let occupied = self.scene.bounds_except(&id);
        let cell = nearest_free_cell(extent, self.surface.size(), &occupied, self.config.grid())?;
        Ok(top_left_for_center(Rect::at(cell, extent).center(), size))
    }

    fn fallback_position(&self, size: Size, angle: f64) -> Point {
        let extent = rotated_bounds(&Rect::at(Point::default(), size), angle).size();
        let cell = clamped_center(extent, self.surface.size(), self.config.grid_padding);
        top_left_for_center(Rect::at(cell, extent).center(), size)
    }

    /// Centered, or the nearest free cell when the center is taken, or the
    /// clamped center when nothing is free.
    fn initial_position(&self, id: ObjectId, size: Size, angle: f64) -> Point {
        let centered = self.centered_position(size);
        if self.scene.first_overlap(&id, &rotated_bounds(&Rect::at(centered, size), angle)).is_none() {
            return centered;
        }
        match self.free_position(id, size, angle) {
            Ok(p) => p,
            Err(e) => {
                debug!(%id, error = %e, "engine: no free cell, falling back to center");
                self.fallback_position(size, angle)
            }
        }
    }

    /// Insert a freshly built object, clamping it unless its position was
    /// explicit, flag any overlap, make it active, and announce it. Returns
    /// the id the object is stored under.
    fn insert_new(&mut self, mut obj: SurfaceObject, explicit: bool, signal: fn(ObjectId) -> Signal) -> ObjectId {
        if !explicit {
            let fix = clamp_into_bounds(&obj.bounds(), self.surface.size());
            obj.geometry.left += fix.dx;
            obj.geometry.top += fix.dy;
        }
        obj.violates_overlap = self.scene.first_overlap(&obj.id, &obj.bounds()).is_some();
        let requested = obj.id;
        let id = self.scene.insert_fresh(obj);
        if id != requested {
            debug!(%requested, %id, "engine: id already used, re-keyed");
        }
        self.ui.active_id = Some(id);
        self.emit(signal(id));
        self.request_render();
        id
    }

    fn reflow(measure: &dyn TextMeasure, line_height: f64, t: &mut TextAttrs) {
        let out = layout(
            &LayoutRequest {
                text: &t.text,
                family: &t.font_family,
                size: t.font_size,
                line_height,
                wrap_width: t.wrap_width,
                min_height: t.min_height,
            },
            measure,
        );
        t.lines = out.lines;
        t.width = out.width;
        t.height = out.height;
    }

    /// Re-layout a text object keeping its visual center fixed.
    fn reflow_centered(&mut self, id: &ObjectId, edit: impl FnOnce(&mut TextAttrs)) -> bool {
        let line_height = self.config.text_line_height;
        let Some(obj) = self.scene.get_mut(id) else {
            return false;
        };
        let center = obj.center();
        let Some(t) = obj.as_text_mut() else {
            return false;
        };
        edit(t);
        Self::reflow(self.measure.as_ref(), line_height, t);
        let size = obj.box_size();
        let origin = top_left_for_center(center, size);
        obj.geometry.left = origin.x;
        obj.geometry.top = origin.y;
        true
    }

    fn translate(&mut self, id: &ObjectId, offset: Offset) {
        if let Some(obj) = self.scene.get_mut(id) {
            obj.geometry.left += offset.dx;
            obj.geometry.top += offset.dy;
        }
    }

    fn refresh_overlap_flag(&mut self, id: &ObjectId) {
        let violates = self.scene.get(id).is_some_and(|o| self.scene.first_overlap(id, &o.bounds()).is_some());
        if let Some(obj) = self.scene.get_mut(id) {
            obj.violates_overlap = violates;
        }
    }

    /// Clamp into the surface, then push off the first overlapped object;
    /// when no push works the object stays put and is flagged.
    fn settle(&mut self, id: &ObjectId) {
        let container = self.surface.size();
        let Some(bounds) = self.scene.get(id).filter(|o| !o.layout_only).map(SurfaceObject::bounds) else {
            return;
        };
        let fix = clamp_into_bounds(&bounds, container);
        self.translate(id, fix);
        let bounds = bounds.translated(fix);

        let violates = match self.scene.first_overlap(id, &bounds) {
            None => false,
            Some((other_id, other)) => {
                match minimal_separation(&bounds, &other, container, &self.scene.bounds_except(id)) {
                    Ok(push) => {
                        self.translate(id, push);
                        false
                    }
                    Err(e) => {
                        debug!(%id, %other_id, error = %e, "engine: overlap accepted and flagged");
                        true
                    }
                }
            }
        };
        if let Some(obj) = self.scene.get_mut(id) {
            obj.violates_overlap = violates;
        }
    }

    // --- Object lifecycle ---

    /// Create a text object. Without a position it is centered, moved to the
    /// nearest free cell if the center is taken, and flagged if nothing is
    /// free. The new object becomes active.
    pub fn add_text(&mut self, new: NewText) -> ObjectId {
        let id = self.fresh_id(new.id);
        let family = if new.font_family.trim().is_empty() { DEFAULT_FONT_FAMILY.to_string() } else { new.font_family };
        let wrap_width =
            new.wrap_width.filter(|w| w.is_finite() && *w > 0.0).unwrap_or(self.config.default_wrap_width);
        let mut attrs = TextAttrs {
            text: new.text,
            font_family: family,
            font_size: self.clamp_font_size(new.font_size),
            align: new.align,
            wrap_width,
            min_height: 0.0,
            width: 0.0,
            height: 0.0,
            lines: Vec::new(),
        };
        Self::reflow(self.measure.as_ref(), self.config.text_line_height, &mut attrs);

        let angle = normalize_degrees(new.angle);
        let size = Size::new(attrs.width, attrs.height);
        let position = new.position.unwrap_or_else(|| self.initial_position(id, size, angle));
        let geometry = Geometry { angle, flip_x: new.flip_x, flip_y: new.flip_y, ..Geometry::at(position) };
        let obj = SurfaceObject::new(id, ObjectKind::Text(attrs), geometry);
        self.insert_new(obj, new.position.is_some(), Signal::Created)
    }

    /// Parse vector markup and add it as an image object.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidFormat`] or [`CanvasError::UnsupportedContent`]
    /// when the markup cannot be used; nothing is added in that case.
    pub fn add_image_from_vector_markup(&mut self, markup: &str, options: ImageOptions) -> Result<ObjectId, CanvasError> {
        let image = svg::parse(markup)?;
        let id = self.fresh_id(options.id);
        let angle = normalize_degrees(options.angle);
        let fit = (self.surface.width / image.size.width).min(self.surface.height / image.size.height)
            * self.config.image_fit_factor;
        let (mut sx, mut sy) = options
            .scale
            .filter(|(x, y)| x.is_finite() && y.is_finite() && *x > 0.0 && *y > 0.0)
            .unwrap_or((fit, fit));

        let position = if let Some(p) = options.position {
            p
        } else if options.auto_place {
            let mut found = None;
            for attempt in 0..self.config.autoplace_attempts.max(1) {
                if attempt > 0 {
                    sx *= self.config.autoplace_shrink;
                    sy *= self.config.autoplace_shrink;
                }
                if let Ok(p) = self.free_position(id, image.size.scaled(sx, sy), angle) {
                    found = Some(p);
                    break;
                }
            }
            found.unwrap_or_else(|| {
                debug!(%id, "engine: auto-place exhausted, falling back to center");
                self.fallback_position(image.size.scaled(sx, sy), angle)
            })
        } else {
            self.initial_position(id, image.size.scaled(sx, sy), angle)
        };

        info!(%id, drawables = image.drawable_count, "engine: image added");
        let geometry = Geometry {
            angle,
            scale_x: sx,
            scale_y: sy,
            flip_x: options.flip_x,
            flip_y: options.flip_y,
            ..Geometry::at(position)
        };
        let attrs = ImageAttrs {
            source_markup: image.markup,
            origin_kind: options.origin_kind,
            intrinsic: image.size,
            drawable_count: image.drawable_count,
        };
        let obj = SurfaceObject::new(id, ObjectKind::Image(attrs), geometry);
        Ok(self.insert_new(obj, options.position.is_some(), Signal::Created))
    }

    /// Fetch markup through `loader` and add it as an image object.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Load`] when the fetch fails, otherwise as
    /// [`EngineCore::add_image_from_vector_markup`].
    pub async fn add_image_from_reference(
        &mut self,
        loader: &dyn ResourceLoader,
        reference: &str,
        options: ImageOptions,
    ) -> Result<ObjectId, CanvasError> {
        let markup = loader.fetch_text(reference).await?;
        self.add_image_from_vector_markup(&markup, options)
    }

    /// Replace a text object's content. Position is kept; the box reflows.
    pub fn update_text(&mut self, id: &ObjectId, text: &str) {
        let line_height = self.config.text_line_height;
        let Some(t) = self.scene.get_mut(id).and_then(SurfaceObject::as_text_mut) else {
            return;
        };
        t.text = text.to_string();
        Self::reflow(self.measure.as_ref(), line_height, t);
        self.refresh_overlap_flag(id);
        self.request_render();
    }

    /// Clamp and apply a font size, reflowing around the object's center and
    /// settling it afterwards.
    pub fn set_font_size(&mut self, id: &ObjectId, size: f64) {
        let size = self.clamp_font_size(size);
        if self.reflow_centered(id, |t| t.font_size = size) {
            self.settle(id);
            self.request_render();
        }
    }

    pub fn set_font_family(&mut self, id: &ObjectId, family: &str) {
        let family = if family.trim().is_empty() { DEFAULT_FONT_FAMILY } else { family };
        if self.reflow_centered(id, |t| t.font_family = family.to_string()) {
            self.settle(id);
            self.request_render();
        }
    }

    /// Set alignment; the wrap width is raised to the configured minimum so
    /// the alignment is visible.
    pub fn set_text_align(&mut self, id: &ObjectId, align: TextAlign) {
        let line_height = self.config.text_line_height;
        let min_width = self.config.align_min_width;
        let Some(t) = self.scene.get_mut(id).and_then(SurfaceObject::as_text_mut) else {
            return;
        };
        t.align = align;
        t.wrap_width = t.wrap_width.max(min_width);
        Self::reflow(self.measure.as_ref(), line_height, t);
        self.settle(id);
        self.request_render();
    }

    pub fn remove_object(&mut self, id: &ObjectId) {
        if self.scene.remove(id).is_none() {
            return;
        }
        if self.input.target() == Some(*id) {
            self.input = InputState::Idle;
            self.ui.guide = None;
            self.ui.edges = EdgeFlags::default();
        }
        if self.ui.editing_id == Some(*id) {
            self.ui.editing_id = None;
        }
        self.emit(Signal::Removed(*id));
        if self.ui.active_id == Some(*id) {
            self.ui.active_id = None;
            self.emit(Signal::SelectionChanged(None));
        }
        self.request_render();
    }

    /// Make `id` active. Unknown and layout-only ids are ignored.
    pub fn select_object(&mut self, id: &ObjectId) {
        if self.scene.get(id).is_some_and(|o| !o.layout_only) {
            self.ui.active_id = Some(*id);
            self.request_render();
        }
    }

    /// Clone the active object with a fixed offset, keep it inside the
    /// surface and off other objects, and make the clone active.
    pub fn duplicate_active(&mut self) -> Option<ObjectId> {
        let source = self.ui.active_id.and_then(|id| self.scene.get(&id))?;
        let id = Uuid::new_v4();
        let offset = self.config.duplicate_offset;
        let mut obj = SurfaceObject {
            id,
            violates_overlap: false,
            touched_edges: EdgeFlags::default(),
            ..source.clone()
        };
        obj.geometry.left += offset;
        obj.geometry.top += offset;

        let container = self.surface.size();
        let fix = clamp_into_bounds(&obj.bounds(), container);
        obj.geometry.left += fix.dx;
        obj.geometry.top += fix.dy;

        let bounds = obj.bounds();
        if let Some((_, other)) = self.scene.first_overlap(&id, &bounds) {
            let occupied = self.scene.bounds_except(&id);
            match minimal_separation(&bounds, &other, container, &occupied) {
                Ok(push) => {
                    obj.geometry.left += push.dx;
                    obj.geometry.top += push.dy;
                }
                Err(_) => {
                    let position = self.initial_position(id, obj.box_size(), obj.geometry.angle);
                    obj.geometry.left = position.x;
                    obj.geometry.top = position.y;
                }
            }
        }
        Some(self.insert_new(obj, false, Signal::Added))
    }

    /// Toggle horizontal flip on the active object.
    pub fn mirror_active(&mut self) {
        let Some(id) = self.ui.active_id else {
            return;
        };
        if let Some(obj) = self.scene.get_mut(&id) {
            obj.geometry.flip_x = !obj.geometry.flip_x;
            self.emit(Signal::Modified(id));
            self.request_render();
        }
    }

    // --- Surface ---

    /// Resize the surface and re-fit background and mask. Objects are not
    /// moved.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidSize`] for non-positive or non-finite sizes.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        self.surface.resize(Size::new(width, height))?;
        self.request_render();
        Ok(())
    }

    /// Record the primary size tier.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidSize`] for a non-positive frame.
    pub fn set_frame_size(&mut self, frame: Option<Size>) -> Result<(), CanvasError> {
        self.surface.set_frame(frame)?;
        self.request_render();
        Ok(())
    }

    pub fn set_background_image(&mut self, url: Option<&str>) {
        self.surface.set_background(url);
        self.request_render();
    }

    /// Report the natural size of a loaded background image.
    pub fn background_loaded(&mut self, url: &str, natural: Size) -> bool {
        let applied = self.surface.background_loaded(url, natural);
        if applied {
            self.request_render();
        }
        applied
    }

    #[must_use]
    pub fn background_url(&self) -> Option<&str> {
        self.surface.current_background_url()
    }

    pub fn set_rounded_rect_mask(&mut self, percent: f64) {
        self.surface.set_rounded_mask(percent);
        self.request_render();
    }

    /// Use the outline of a vector document as the clip mask.
    ///
    /// # Errors
    ///
    /// As [`svg::silhouette`]; the current mask is kept on failure.
    pub fn set_clip_mask_from_markup(&mut self, markup: &str, reference: Option<String>) -> Result<(), CanvasError> {
        let silhouette = svg::silhouette(markup)?;
        self.surface.set_vector_mask(reference, silhouette);
        self.request_render();
        Ok(())
    }

    /// Fetch a vector mask by reference and apply it.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Load`] or any parse error; the current mask is kept.
    pub async fn set_clip_mask_from_reference(
        &mut self,
        loader: &dyn ResourceLoader,
        reference: &str,
    ) -> Result<(), CanvasError> {
        let markup = loader.fetch_text(reference).await?;
        self.set_clip_mask_from_markup(&markup, Some(reference.to_string()))
    }

    pub fn clear_clip_mask(&mut self) {
        self.surface.clear_mask();
        self.request_render();
    }

    // --- Text edit / save ---

    /// Enter text-edit mode on a text object, making it active.
    pub fn enter_text_edit(&mut self, id: &ObjectId) -> bool {
        if !self.scene.get(id).is_some_and(SurfaceObject::is_text) {
            return false;
        }
        self.ui.editing_id = Some(*id);
        self.ui.active_id = Some(*id);
        self.request_render();
        true
    }

    pub fn exit_text_edit(&mut self) {
        if self.ui.editing_id.take().is_some() {
            self.request_render();
        }
    }

    /// Leave text-edit mode, deselect, and announce a save for the active
    /// object.
    pub fn save_active(&mut self) -> Option<ObjectId> {
        let id = self.ui.active_id?;
        self.exit_text_edit();
        self.deselect();
        self.emit(Signal::Save(id));
        Some(id)
    }

    /// Clear the active object, announcing the change if there was one.
    pub fn deselect(&mut self) {
        if self.ui.active_id.take().is_some() {
            self.ui.editing_id = None;
            self.input = InputState::Idle;
            self.ui.guide = None;
            self.emit(Signal::SelectionChanged(None));
            self.request_render();
        }
    }

    // --- Gestures (surface coordinates) ---

    /// Start moving `id` with the pointer at `pointer`.
    pub fn begin_drag(&mut self, id: &ObjectId, pointer: Point) -> bool {
        let Some(obj) = self.scene.get(id).filter(|o| !o.layout_only) else {
            return false;
        };
        let grab = Point::new(pointer.x - obj.geometry.left, pointer.y - obj.geometry.top);
        let snap = Snapshot::of(obj);
        self.input = InputState::Dragging { id: *id, grab, start: snap, last_good: snap };
        true
    }

    /// One drag step: clamp, separate on overlap, or stick at the last
    /// known-good position.
    pub fn drag_to(&mut self, pointer: Point) {
        let InputState::Dragging { id, grab, last_good, .. } = self.input else {
            return;
        };
        let Some(obj) = self.scene.get_mut(&id) else {
            return;
        };
        obj.geometry.left = pointer.x - grab.x;
        obj.geometry.top = pointer.y - grab.y;
        self.finish_step(id, last_good, true);
    }

    /// Start a scale gesture on `id`.
    pub fn begin_scale(&mut self, id: &ObjectId, pointer: Point) -> bool {
        let Some(obj) = self.scene.get(id).filter(|o| !o.layout_only) else {
            return false;
        };
        let snap = Snapshot::of(obj);
        self.input = InputState::Scaling { id: *id, start_pointer: pointer, start: snap, last_good: snap };
        true
    }

    /// Scale step driven by the pointer, relative to the box's top-left in
    /// the object's own frame.
    pub fn scale_to(&mut self, pointer: Point) {
        let InputState::Scaling { id, start_pointer, start, .. } = self.input else {
            return;
        };
        let Some(obj) = self.scene.get(&id) else {
            return;
        };
        let start_rect = Rect::at(Point::new(start.geometry.left, start.geometry.top), box_at(obj, &start));
        let center = start_rect.center();
        let local_now = pointer.rotated_about(center, -start.geometry.angle);
        let local_start = start_pointer.rotated_about(center, -start.geometry.angle);
        let ratio = |now: f64, from: f64, origin: f64| {
            let base = from - origin;
            if base.abs() < f64::EPSILON { 1.0 } else { (now - origin) / base }
        };
        let sx = ratio(local_now.x, local_start.x, start_rect.left);
        let sy = ratio(local_now.y, local_start.y, start_rect.top);
        self.scale_by(sx, sy);
    }

    /// Apply scale factors relative to the gesture start. Text bakes the
    /// factors into its box; images scale uniformly.
    pub fn scale_by(&mut self, sx: f64, sy: f64) {
        let InputState::Scaling { id, start, last_good, .. } = self.input else {
            return;
        };
        let line_height = self.config.text_line_height;
        let Some(obj) = self.scene.get_mut(&id) else {
            return;
        };
        let (sx, sy) = (finite_or_one(sx), finite_or_one(sy));
        obj.geometry = start.geometry;
        match &mut obj.kind {
            ObjectKind::Text(t) => {
                t.wrap_width = (start.text_box.width * sx).clamp(TEXT_WIDTH_MIN, TEXT_WIDTH_MAX);
                t.min_height = (start.text_box.height * sy).clamp(TEXT_HEIGHT_MIN, TEXT_HEIGHT_MAX);
                Self::reflow(self.measure.as_ref(), line_height, t);
                obj.geometry.scale_x = 1.0;
                obj.geometry.scale_y = 1.0;
            }
            ObjectKind::Image(_) => {
                let uniform = ((sx + sy) * 0.5).abs();
                obj.geometry.scale_x = (start.geometry.scale_x * uniform).clamp(IMAGE_SCALE_MIN, IMAGE_SCALE_MAX);
                obj.geometry.scale_y = (start.geometry.scale_y * uniform).clamp(IMAGE_SCALE_MIN, IMAGE_SCALE_MAX);
            }
        }
        self.finish_step(id, last_good, false);
    }

    /// Start a rotate gesture on `id`.
    pub fn begin_rotate(&mut self, id: &ObjectId, pointer: Point) -> bool {
        let Some(obj) = self.scene.get(id).filter(|o| !o.layout_only) else {
            return false;
        };
        let center = obj.center();
        let snap = Snapshot::of(obj);
        self.input = InputState::Rotating {
            id: *id,
            center,
            pointer_start_deg: bearing(center, pointer),
            start_angle: obj.geometry.angle,
            start: snap,
            last_good: snap,
        };
        true
    }

    /// Rotate step driven by the pointer's bearing around the object center.
    pub fn rotate_to(&mut self, pointer: Point) {
        let InputState::Rotating { center, pointer_start_deg, start_angle, .. } = self.input else {
            return;
        };
        self.rotate_to_angle(start_angle + bearing(center, pointer) - pointer_start_deg);
    }

    /// Set the rotation of the object being rotated and update the straight
    /// guide.
    pub fn rotate_to_angle(&mut self, angle: f64) {
        let InputState::Rotating { id, last_good, .. } = self.input else {
            return;
        };
        let Some(obj) = self.scene.get_mut(&id) else {
            return;
        };
        obj.geometry.angle = normalize_degrees(angle);
        self.finish_step(id, last_good, true);
        let guide = self.scene.get(&id).and_then(|o| self.straight_guide(o));
        self.ui.guide = guide;
    }

    fn straight_guide(&self, obj: &SurfaceObject) -> Option<StraightGuide> {
        let snap = nearest_right_angle(obj.geometry.angle, self.config.snap_threshold_deg);
        if !snap.within {
            return None;
        }
        let font_size = obj.as_text().map_or(GUIDE_FALLBACK_FONT_SIZE, |t| t.font_size);
        let offset = font_size * 0.5 + self.config.guide_margin;
        let half = obj.box_size().width.max(GUIDE_MIN_LENGTH) * 0.5;
        let c = obj.center();
        let (from, to) = if snap.is_horizontal() {
            (Point::new(c.x - half, c.y + offset), Point::new(c.x + half, c.y + offset))
        } else {
            (Point::new(c.x - offset, c.y - half), Point::new(c.x - offset, c.y + half))
        };
        Some(StraightGuide { from, to, target: snap.target })
    }

    /// Shared tail of every gesture step: clamp, resolve overlap (by
    /// separation when `separate`, else by reverting), refresh flags, and
    /// record the new known-good state. A box larger than the surface is
    /// always reverted.
    fn finish_step(&mut self, id: ObjectId, last_good: Snapshot, separate: bool) {
        let container = self.surface.size();
        let Some(bounds) = self.scene.get(&id).map(SurfaceObject::bounds) else {
            return;
        };
        let fix = clamp_into_bounds(&bounds, container);
        self.translate(&id, fix);
        let bounds = bounds.translated(fix);
        let fits = bounds.width <= container.width && bounds.height <= container.height;

        let collided = match self.scene.first_overlap(&id, &bounds) {
            _ if !fits => Some(true),
            None => None,
            Some((_, other)) if separate => {
                match minimal_separation(&bounds, &other, container, &self.scene.bounds_except(&id)) {
                    Ok(push) => {
                        self.translate(&id, push);
                        Some(false)
                    }
                    Err(_) => Some(true),
                }
            }
            Some(_) => Some(true),
        };

        let line_height = self.config.text_line_height;
        let Some(obj) = self.scene.get_mut(&id) else {
            return;
        };
        if collided == Some(true) {
            debug!(%id, "engine: step rejected, reverting to last good state");
            last_good.restore(obj);
            if let Some(t) = obj.as_text_mut() {
                Self::reflow(self.measure.as_ref(), line_height, t);
            }
        }
        obj.violates_overlap = collided.is_some();
        obj.touched_edges = touched_edges(&obj.bounds(), container);
        self.ui.edges = obj.touched_edges;
        let good = Snapshot::of(obj);
        match &mut self.input {
            InputState::Dragging { last_good, .. }
            | InputState::Scaling { last_good, .. }
            | InputState::Rotating { last_good, .. } => *last_good = good,
            InputState::Idle | InputState::Panning { .. } => {}
        }
        self.request_render();
    }

    /// Finish the current gesture: snap a rotation whose guide is showing,
    /// recompute the overlap flag from where the object ended up, and
    /// announce the change if anything moved.
    pub fn end_gesture(&mut self) {
        let state = std::mem::take(&mut self.input);
        let (Some(id), Some(start)) = (state.target(), state.start()) else {
            return;
        };
        if let (InputState::Rotating { .. }, Some(guide)) = (&state, self.ui.guide) {
            self.snap_rotation(&id, guide.target);
        }
        self.refresh_overlap_flag(&id);
        let changed = match self.scene.get_mut(&id) {
            Some(obj) => {
                obj.touched_edges = EdgeFlags::default();
                Snapshot::of(obj) != start
            }
            None => false,
        };
        self.ui.guide = None;
        self.ui.edges = EdgeFlags::default();
        if changed {
            self.emit(Signal::Modified(id));
        }
        self.request_render();
    }

    /// Set the angle to `target` and settle. A snap that cannot be settled
    /// without overlap is dropped.
    fn snap_rotation(&mut self, id: &ObjectId, target: f64) {
        let Some(obj) = self.scene.get_mut(id) else {
            return;
        };
        let before = Snapshot::of(obj);
        obj.geometry.angle = target;
        self.settle(id);
        let container = self.surface.size();
        let line_height = self.config.text_line_height;
        let Some(obj) = self.scene.get_mut(id) else {
            return;
        };
        let bounds = obj.bounds();
        if obj.violates_overlap || bounds.width > container.width || bounds.height > container.height {
            debug!(%id, "engine: right-angle snap would overlap, keeping free angle");
            before.restore(obj);
            if let Some(t) = obj.as_text_mut() {
                Self::reflow(self.measure.as_ref(), line_height, t);
            }
        }
    }

    // --- Pointer / wheel / keyboard (screen coordinates) ---

    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let Some(hit) = hit_test(world, &self.scene, &self.camera, self.ui.active_id) else {
            self.deselect();
            self.input = InputState::Panning { last_screen: screen_pt };
            return vec![Action::RenderNeeded];
        };
        let id = hit.object_id;
        match hit.part {
            HitPart::RotateHandle => {
                self.begin_rotate(&id, world);
            }
            HitPart::ScaleHandle => {
                self.begin_scale(&id, world);
            }
            HitPart::Body => {
                if self.ui.active_id != Some(id) {
                    self.ui.editing_id = None;
                    self.ui.active_id = Some(id);
                    self.emit(Signal::SelectionChanged(Some(id)));
                }
                self.begin_drag(&id, world);
            }
        }
        self.request_render();
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match self.input {
            InputState::Dragging { .. } => self.drag_to(world),
            InputState::Scaling { .. } => self.scale_to(world),
            InputState::Rotating { .. } => self.rotate_to(world),
            InputState::Panning { last_screen } => {
                self.camera.pan_x += screen_pt.x - last_screen.x;
                self.camera.pan_y += screen_pt.y - last_screen.y;
                self.input = InputState::Panning { last_screen: screen_pt };
                self.request_render();
            }
            InputState::Idle => {
                let cursor = match hit_test(world, &self.scene, &self.camera, self.ui.active_id).map(|h| h.part) {
                    Some(HitPart::Body) => "move",
                    Some(HitPart::ScaleHandle) => "nwse-resize",
                    Some(HitPart::RotateHandle) => "grab",
                    None => "default",
                };
                return vec![Action::SetCursor(cursor.to_string())];
            }
        }
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => {
                self.input = InputState::Idle;
                Vec::new()
            }
            _ => {
                self.end_gesture();
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Zoom about the pointer with ctrl/meta held, otherwise pan.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.ctrl || modifiers.meta {
            let world = self.camera.screen_to_world(screen_pt);
            let zoom = (self.camera.zoom * (-delta.dy * WHEEL_ZOOM_RATE).exp()).clamp(ZOOM_MIN, ZOOM_MAX);
            self.camera.zoom = zoom;
            self.camera.pan_x = screen_pt.x - world.x * zoom;
            self.camera.pan_y = screen_pt.y - world.y * zoom;
        } else {
            self.camera.pan_x -= delta.dx;
            self.camera.pan_y -= delta.dy;
        }
        self.request_render();
        vec![Action::RenderNeeded]
    }

    /// Escape leaves text edit, then deselects; Delete/Backspace removes the
    /// active object outside text edit.
    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" if self.ui.editing_id.is_some() => self.exit_text_edit(),
            "Escape" if self.ui.active_id.is_some() => self.deselect(),
            "Delete" | "Backspace" if self.ui.editing_id.is_none() => match self.ui.active_id {
                Some(id) => self.remove_object(&id),
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        }
        vec![Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn active(&self) -> Option<ObjectId> {
        self.ui.active_id
    }

    #[must_use]
    pub fn active_object(&self) -> Option<&SurfaceObject> {
        self.ui.active_id.and_then(|id| self.scene.get(&id))
    }

    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&SurfaceObject> {
        self.scene.get(id)
    }

    #[must_use]
    pub fn editing(&self) -> Option<ObjectId> {
        self.ui.editing_id
    }

    #[must_use]
    pub fn guide(&self) -> Option<StraightGuide> {
        self.ui.guide
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }
}

fn top_left_for_center(center: Point, size: Size) -> Point {
    Point::new(center.x - size.width * 0.5, center.y - size.height * 0.5)
}

fn box_at(obj: &SurfaceObject, snap: &Snapshot) -> Size {
    match &obj.kind {
        ObjectKind::Image(i) => i.intrinsic.scaled(snap.geometry.scale_x, snap.geometry.scale_y),
        ObjectKind::Text(_) => snap.text_box,
    }
}

fn finite_or_one(v: f64) -> f64 {
    if v.is_finite() { v } else { 1.0 }
}

/// Clockwise bearing of `p` around `center` in degrees (y-down).
fn bearing(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}

/// Text measurement through the browser's 2D context.
struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
    fallback: ApproxMeasure,
}

impl TextMeasure for CanvasMeasure {
    fn advance(&self, text: &str, family: &str, size: f64) -> f64 {
        self.ctx.set_font(&render::font_css(size, family));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(_) => self.fallback.advance(text, family, size),
        }
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
    images: HashMap<ObjectId, HtmlImageElement>,
    background: Option<(String, HtmlImageElement)>,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Fails when the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, config: EngineConfig) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let measure = CanvasMeasure { ctx: ctx.clone(), fallback: ApproxMeasure::default() };
        let core = EngineCore::with_measure(config, Box::new(measure));
        canvas.set_width(to_px(core.surface.width));
        canvas.set_height(to_px(core.surface.height));
        Ok(Self { canvas, ctx, core, images: HashMap::new(), background: None })
    }

    // --- Delegated input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Surface ---

    /// Resize the surface and the backing canvas together.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidSize`] for non-positive sizes.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        self.core.set_canvas_size(width, height)?;
        self.canvas.set_width(to_px(width));
        self.canvas.set_height(to_px(height));
        Ok(())
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.core.drain_signals()
    }

    // --- Render ---

    /// Paint if anything changed since the last paint. Call once per
    /// animation frame.
    ///
    /// # Errors
    ///
    /// Propagates 2D-context failures.
    pub fn render_if_pending(&mut self) -> Result<(), JsValue> {
        self.sync_images()?;
        if self.core.take_render_request() {
            self.render()?;
        }
        Ok(())
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Propagates 2D-context failures.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.sync_images()?;
        let plan = render::plan(&self.core);
        let background = self.background.as_ref().map(|(_, img)| img);
        render::draw(&self.ctx, &plan, &self.images, background)
    }

    /// Keep the element cache in step with the scene and report background
    /// loads to the core.
    fn sync_images(&mut self) -> Result<(), JsValue> {
        let scene = &self.core.scene;
        self.images.retain(|id, _| scene.contains(id));
        for obj in self.core.scene.ordered() {
            if let (Some(image), false) = (obj.as_image(), self.images.contains_key(&obj.id)) {
                let el = HtmlImageElement::new()?;
                el.set_src(&svg_data_url(&image.source_markup));
                self.images.insert(obj.id, el);
            }
        }

        let wanted = self.core.background_url().map(str::to_string);
        let current = self.background.as_ref().map(|(url, _)| url.clone());
        if wanted != current {
            self.background = match wanted {
                Some(url) => {
                    let el = HtmlImageElement::new()?;
                    el.set_src(&url);
                    Some((url, el))
                }
                None => None,
            };
        }
        let pending = self.core.surface.background.as_ref().is_some_and(|b| b.natural.is_none());
        if let Some((url, el)) = &self.background
            && pending
            && el.complete()
            && el.natural_width() > 0
        {
            let natural = Size::new(f64::from(el.natural_width()), f64::from(el.natural_height()));
            self.core.background_loaded(url, natural);
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_px(v: f64) -> u32 {
    v.round().max(1.0) as u32
}

fn svg_data_url(markup: &str) -> String {
    format!("data:image/svg+xml;charset=utf-8,{}", js_sys::encode_uri_component(markup))
}
