//! Rebuild a surface from a persisted scene.
//!
//! Steps run in a fixed order so later layers draw on top: background, size
//! tiers, shape mask, fonts, text items, image items. Every step fails soft.
//! A bad size or mask is logged and skipped, font failures are ignored, and
//! a text or image item that cannot be rebuilt is skipped without stopping
//! the rest.

#[cfg(test)]
#[path = "rehydrate_test.rs"]
mod rehydrate_test;

use futures::future::join_all;
use tracing::{info, warn};

use crate::engine::{EngineCore, ImageOptions, NewText};
use crate::fonts::FontCache;
use crate::geom::{Point, Size};
use crate::loader::ResourceLoader;
use crate::scene::{SavedImage, SavedScene, SavedShape, SavedSize, SavedText};

/// What a rehydration pass restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RehydrateReport {
    pub texts: usize,
    pub images: usize,
    /// Text and image items that could not be rebuilt.
    pub skipped: usize,
    /// Size and mask were applied without error.
    pub size_applied: bool,
    pub mask_applied: bool,
    pub fonts_failed: usize,
}

/// Apply `scene` to `core`. Objects are placed exactly where they were
/// saved, nothing is left selected afterwards, and the usual creation signals
/// are queued for each restored object.
pub async fn rehydrate(
    core: &mut EngineCore,
    loader: &dyn ResourceLoader,
    fonts: &mut FontCache,
    scene: &SavedScene,
) -> RehydrateReport {
    let mut report = RehydrateReport::default();

    if let Some(url) = scene.background.as_deref() {
        core.set_background_image(Some(url));
    }

    if let Some(size) = &scene.size {
        report.size_applied = apply_size(core, size);
        report.mask_applied = apply_shape(core, loader, size).await;
    }

    for font in &scene.fonts {
        fonts.register(&font.family, &font.reference);
    }
    let mut families: Vec<&str> = scene.texts.iter().map(|t| t.font_family.as_str()).collect();
    families.sort_unstable();
    families.dedup();
    let loads: Vec<_> = families.into_iter().map(|f| fonts.ensure_loaded(f, loader)).collect();
    report.fonts_failed = join_all(loads).await.iter().filter(|r| r.is_err()).count();

    for text in &scene.texts {
        if restore_text(core, text) {
            report.texts += 1;
        } else {
            report.skipped += 1;
        }
    }
    for image in &scene.images {
        if restore_image(core, image) {
            report.images += 1;
        } else {
            report.skipped += 1;
        }
    }

    core.deselect();
    info!(
        texts = report.texts,
        images = report.images,
        skipped = report.skipped,
        fonts_failed = report.fonts_failed,
        "rehydrate: done"
    );
    report
}

/// Primary tier becomes the frame; the secondary tier, when present, drives
/// the surface itself.
fn apply_size(core: &mut EngineCore, size: &SavedSize) -> bool {
    if let Err(e) = size.validate() {
        warn!(error = %e, "rehydrate: size skipped");
        return false;
    }
    let primary = Size::new(size.width_primary, size.height_primary);
    let (frame, surface) = match size.secondary() {
        Some((w, h)) => (Some(primary), Size::new(w, h)),
        None => (None, primary),
    };
    let result = core.set_frame_size(frame).and_then(|()| core.set_canvas_size(surface.width, surface.height));
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "rehydrate: size skipped");
            false
        }
    }
}

async fn apply_shape(core: &mut EngineCore, loader: &dyn ResourceLoader, size: &SavedSize) -> bool {
    match (&size.shape, size.mask_reference.as_deref()) {
        (SavedShape::Rectangle, _) => {
            match size.rounded_percent.filter(|p| *p > 0.0) {
                Some(p) => core.set_rounded_rect_mask(p),
                None => core.clear_clip_mask(),
            }
            true
        }
        (SavedShape::Named(name), Some(reference)) => {
            match core.set_clip_mask_from_reference(loader, reference).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(shape = %name, %reference, error = %e, "rehydrate: mask skipped");
                    core.clear_clip_mask();
                    false
                }
            }
        }
        (SavedShape::Named(name), None) => {
            warn!(shape = %name, "rehydrate: shape has no mask reference");
            core.clear_clip_mask();
            false
        }
    }
}

fn restore_text(core: &mut EngineCore, saved: &SavedText) -> bool {
    if !(saved.left.is_finite() && saved.top.is_finite()) {
        warn!(id = ?saved.id, "rehydrate: text item has no usable position");
        return false;
    }
    core.add_text(NewText {
        id: saved.id,
        font_family: saved.font_family.clone(),
        align: saved.align,
        position: Some(Point::new(saved.left, saved.top)),
        angle: saved.angle,
        flip_x: saved.flip_x,
        flip_y: saved.flip_y,
        ..NewText::new(saved.text.clone(), saved.font_size)
    });
    true
}

fn restore_image(core: &mut EngineCore, saved: &SavedImage) -> bool {
    if !(saved.left.is_finite() && saved.top.is_finite()) {
        warn!(id = ?saved.id, "rehydrate: image item has no usable position");
        return false;
    }
    let options = ImageOptions {
        id: saved.id,
        position: Some(Point::new(saved.left, saved.top)),
        scale: Some((saved.scale_x, saved.scale_y)),
        angle: saved.angle,
        flip_x: saved.flip_x,
        flip_y: saved.flip_y,
        auto_place: false,
        origin_kind: saved.origin_kind,
    };
    match core.add_image_from_vector_markup(&saved.source_markup, options) {
        Ok(_) => true,
        Err(e) => {
            warn!(id = ?saved.id, error = %e, "rehydrate: image item skipped");
            false
        }
    }
}
