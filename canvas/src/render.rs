//! Rendering: turns engine state into a frame plan and paints it.
//!
//! [`plan`] is pure: it reads the engine core and produces a [`FramePlan`]
//! describing every layer of the frame. [`draw`] is the only place that
//! touches [`web_sys::CanvasRenderingContext2d`]; it paints a plan and never
//! mutates application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;
use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, Path2d};

use crate::camera::Camera;
use crate::consts::{
    GUIDE_STROKE, HANDLE_RADIUS_PX, OVERLAY_LINE_WIDTH, SELECTION_STROKE, TEXT_FILL, VIOLATION_DASH, VIOLATION_STROKE,
};
use crate::doc::{ObjectId, ObjectKind, TextAlign};
use crate::engine::EngineCore;
use crate::geom::{EdgeFlags, Point, Rect};
use crate::hit::handle_positions;
use crate::input::StraightGuide;
use crate::surface::{ClipMask, Fit};
use crate::svg;

/// CSS font shorthand for a size and family.
#[must_use]
pub fn font_css(size: f64, family: &str) -> String {
    format!("{size}px \"{family}\"")
}

/// Clip applied to the background and every object.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipPlan {
    Rounded { radius: f64 },
    /// SVG path data in silhouette units, placed by `fit`.
    Path { data: String, fit: Fit },
}

/// Background image placement.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPlan {
    pub url: String,
    pub fit: Fit,
}

/// What to paint inside an item's box.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawContent {
    Text { lines: Vec<String>, font: String, size: f64, line_height: f64, align: TextAlign },
    Image,
}

/// One object, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: ObjectId,
    /// Untransformed box in surface coordinates.
    pub rect: Rect,
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub content: DrawContent,
}

/// Outline and handles of the active object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPlan {
    pub id: ObjectId,
    pub rect: Rect,
    pub angle: f64,
    pub scale_handle: Point,
    pub rotate_handle: Point,
    /// Text edit in progress; handles are hidden.
    pub editing: bool,
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub width: f64,
    pub height: f64,
    pub camera: Camera,
    pub clip: Option<ClipPlan>,
    pub background: Option<BackgroundPlan>,
    pub items: Vec<DrawItem>,
    /// Surface edges the object under a gesture is touching.
    pub edges: EdgeFlags,
    /// Bounds of objects currently flagged as overlapping.
    pub violations: Vec<Rect>,
    pub guide: Option<StraightGuide>,
    pub selection: Option<SelectionPlan>,
}

/// Build the frame plan for the current state.
#[must_use]
pub fn plan(core: &EngineCore) -> FramePlan {
    let surface = &core.surface;
    let clip = surface.clip.as_ref().map(|mask| match mask {
        ClipMask::RoundedRect { radius, .. } => ClipPlan::Rounded { radius: *radius },
        ClipMask::Vector { silhouette, fit, .. } => ClipPlan::Path {
            data: silhouette.paths.iter().map(|p| svg::path_data(p)).collect::<Vec<_>>().join(" "),
            fit: *fit,
        },
    });
    let background = surface
        .background
        .as_ref()
        .and_then(|bg| bg.fit.map(|fit| BackgroundPlan { url: bg.url.clone(), fit }));

    let line_height = core.config.text_line_height;
    let items = core
        .scene
        .ordered()
        .map(|obj| {
            let content = match &obj.kind {
                ObjectKind::Text(t) => DrawContent::Text {
                    lines: t.lines.clone(),
                    font: font_css(t.font_size, &t.font_family),
                    size: t.font_size,
                    line_height,
                    align: t.align,
                },
                ObjectKind::Image(_) => DrawContent::Image,
            };
            DrawItem {
                id: obj.id,
                rect: obj.local_rect(),
                angle: obj.geometry.angle,
                flip_x: obj.geometry.flip_x,
                flip_y: obj.geometry.flip_y,
                content,
            }
        })
        .collect();

    let violations = core.scene.ordered().filter(|o| o.violates_overlap).map(|o| o.bounds()).collect();

    let selection = core.active_object().filter(|o| !o.layout_only).map(|obj| {
        let (scale_handle, rotate_handle) = handle_positions(obj, &core.camera);
        SelectionPlan {
            id: obj.id,
            rect: obj.local_rect(),
            angle: obj.geometry.angle,
            scale_handle,
            rotate_handle,
            editing: core.editing() == Some(obj.id),
        }
    });

    FramePlan {
        width: surface.width,
        height: surface.height,
        camera: core.camera,
        clip,
        background,
        items,
        edges: core.ui.edges,
        violations,
        guide: core.ui.guide,
        selection,
    }
}

/// Paint a frame plan.
///
/// `images` holds decoded elements for image objects; items without a
/// ready element are skipped this frame. `background` is the element for
/// the plan's background URL.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    plan: &FramePlan,
    images: &HashMap<ObjectId, HtmlImageElement>,
    background: Option<&HtmlImageElement>,
) -> Result<(), JsValue> {
    let cam = plan.camera;

    // Layer 1: clear and set up the camera.
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, plan.width, plan.height);
    ctx.set_transform(cam.zoom, 0.0, 0.0, cam.zoom, cam.pan_x, cam.pan_y)?;

    // Layer 2: clipped content.
    ctx.save();
    if let Some(clip) = &plan.clip {
        apply_clip(ctx, clip, plan)?;
        ctx.set_transform(cam.zoom, 0.0, 0.0, cam.zoom, cam.pan_x, cam.pan_y)?;
    }
    if let (Some(bg), Some(el)) = (&plan.background, background)
        && el.complete()
    {
        ctx.draw_image_with_html_image_element_and_dw_and_dh(el, bg.fit.left, bg.fit.top, bg.fit.width, bg.fit.height)?;
    }
    for item in &plan.items {
        draw_item(ctx, item, images.get(&item.id))?;
    }
    ctx.restore();

    // Layer 3: overlays, never clipped.
    draw_edges(ctx, plan)?;
    for rect in &plan.violations {
        dashed(ctx, VIOLATION_STROKE, &VIOLATION_DASH)?;
        ctx.stroke_rect(rect.left, rect.top, rect.width, rect.height);
    }
    if let Some(guide) = &plan.guide {
        solid(ctx, GUIDE_STROKE)?;
        ctx.begin_path();
        ctx.move_to(guide.from.x, guide.from.y);
        ctx.line_to(guide.to.x, guide.to.y);
        ctx.stroke();
    }
    if let Some(sel) = &plan.selection {
        draw_selection(ctx, sel, cam.zoom)?;
    }
    Ok(())
}

fn apply_clip(ctx: &CanvasRenderingContext2d, clip: &ClipPlan, plan: &FramePlan) -> Result<(), JsValue> {
    match clip {
        ClipPlan::Rounded { radius } => {
            let (w, h, r) = (plan.width, plan.height, *radius);
            ctx.begin_path();
            ctx.move_to(r, 0.0);
            ctx.arc_to(w, 0.0, w, h, r)?;
            ctx.arc_to(w, h, 0.0, h, r)?;
            ctx.arc_to(0.0, h, 0.0, 0.0, r)?;
            ctx.arc_to(0.0, 0.0, w, 0.0, r)?;
            ctx.close_path();
            ctx.clip();
        }
        ClipPlan::Path { data, fit } => {
            let path = Path2d::new_with_path_string(data)?;
            ctx.translate(fit.left, fit.top)?;
            ctx.scale(fit.scale, fit.scale)?;
            ctx.clip_with_path_2d(&path);
        }
    }
    Ok(())
}

fn draw_item(ctx: &CanvasRenderingContext2d, item: &DrawItem, image: Option<&HtmlImageElement>) -> Result<(), JsValue> {
    let c = item.rect.center();
    let (w, h) = (item.rect.width, item.rect.height);
    ctx.save();
    ctx.translate(c.x, c.y)?;
    ctx.rotate(item.angle.to_radians())?;
    ctx.scale(if item.flip_x { -1.0 } else { 1.0 }, if item.flip_y { -1.0 } else { 1.0 })?;

    match &item.content {
        DrawContent::Text { lines, font, size, line_height, align } => {
            ctx.set_font(font);
            ctx.set_fill_style_str(TEXT_FILL);
            ctx.set_text_baseline("top");
            let (css_align, x) = match align {
                TextAlign::Left => ("left", -w / 2.0),
                TextAlign::Center => ("center", 0.0),
                TextAlign::Right => ("right", w / 2.0),
            };
            ctx.set_text_align(css_align);
            let step = size * line_height;
            let mut y = -h / 2.0;
            for line in lines {
                ctx.fill_text(line, x, y)?;
                y += step;
            }
        }
        DrawContent::Image => {
            if let Some(el) = image.filter(|el| el.complete()) {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(el, -w / 2.0, -h / 2.0, w, h)?;
            }
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_edges(ctx: &CanvasRenderingContext2d, plan: &FramePlan) -> Result<(), JsValue> {
    if !plan.edges.any() {
        return Ok(());
    }
    let (w, h) = (plan.width, plan.height);
    let lines = [
        (plan.edges.left, (0.0, 0.0), (0.0, h)),
        (plan.edges.top, (0.0, 0.0), (w, 0.0)),
        (plan.edges.right, (w, 0.0), (w, h)),
        (plan.edges.bottom, (0.0, h), (w, h)),
    ];
    dashed(ctx, VIOLATION_STROKE, &VIOLATION_DASH)?;
    ctx.begin_path();
    for (on, from, to) in lines {
        if on {
            ctx.move_to(from.0, from.1);
            ctx.line_to(to.0, to.1);
        }
    }
    ctx.stroke();
    Ok(())
}

fn draw_selection(ctx: &CanvasRenderingContext2d, sel: &SelectionPlan, zoom: f64) -> Result<(), JsValue> {
    let c = sel.rect.center();
    ctx.save();
    ctx.translate(c.x, c.y)?;
    ctx.rotate(sel.angle.to_radians())?;
    if sel.editing {
        dashed(ctx, SELECTION_STROKE, &VIOLATION_DASH)?;
    } else {
        solid(ctx, SELECTION_STROKE)?;
    }
    ctx.set_line_width(OVERLAY_LINE_WIDTH / zoom);
    ctx.stroke_rect(-sel.rect.width / 2.0, -sel.rect.height / 2.0, sel.rect.width, sel.rect.height);
    ctx.restore();

    if sel.editing {
        return Ok(());
    }
    let r = HANDLE_RADIUS_PX / zoom * 0.6;
    solid(ctx, SELECTION_STROKE)?;
    ctx.set_fill_style_str("#fff");
    for p in [sel.scale_handle, sel.rotate_handle] {
        ctx.begin_path();
        ctx.arc(p.x, p.y, r, 0.0, TAU)?;
        ctx.fill();
        ctx.stroke();
    }
    Ok(())
}

fn solid(ctx: &CanvasRenderingContext2d, color: &str) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(OVERLAY_LINE_WIDTH);
    ctx.set_line_dash(&js_sys::Array::new())
}

fn dashed(ctx: &CanvasRenderingContext2d, color: &str, pattern: &[f64]) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(OVERLAY_LINE_WIDTH);
    let dash: js_sys::Array = pattern.iter().map(|v| JsValue::from_f64(*v)).collect();
    ctx.set_line_dash(&dash)
}
