//! Offscreen thumbnails of image objects.
//!
//! Renders an image's stored vector source with `resvg` into an RGBA buffer
//! whose longer side is at most the requested size. Panels use these for
//! their item cards.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use resvg::tiny_skia::{Pixmap, Transform};
use tracing::debug;

use crate::doc::ObjectId;
use crate::engine::EngineCore;
use crate::error::CanvasError;
use crate::svg;

/// Premultiplied RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    /// Alpha of the pixel at (`x`, `y`), or `None` outside the buffer.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4 + 3;
        self.rgba.get(idx).copied()
    }
}

/// Render `markup` so that its longer side is `max_side` pixels.
///
/// # Errors
///
/// Parse errors from [`svg::parse_tree`], or [`CanvasError::InvalidSize`]
/// when `max_side` is zero or the document has no area.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn render_thumbnail(markup: &str, max_side: u32) -> Result<Thumbnail, CanvasError> {
    let (_, tree) = svg::parse_tree(markup)?;
    let size = tree.size();
    let longest = size.width().max(size.height());
    if max_side == 0 || longest <= 0.0 {
        return Err(CanvasError::InvalidSize(format!("thumbnail {max_side}px of {}x{}", size.width(), size.height())));
    }
    let scale = max_side as f32 / longest;
    let width = (size.width() * scale).round().max(1.0) as u32;
    let height = (size.height() * scale).round().max(1.0) as u32;
    let mut pixmap =
        Pixmap::new(width, height).ok_or_else(|| CanvasError::InvalidSize(format!("thumbnail {width}x{height}")))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    debug!(width, height, "preview: rendered");
    Ok(Thumbnail { width, height, rgba: pixmap.take() })
}

impl EngineCore {
    /// Thumbnail of an image object.
    ///
    /// # Errors
    ///
    /// [`CanvasError::UnknownObjectId`] when `id` is not live,
    /// [`CanvasError::UnsupportedContent`] for text objects, otherwise as
    /// [`render_thumbnail`].
    pub fn thumbnail(&self, id: &ObjectId, max_side: u32) -> Result<Thumbnail, CanvasError> {
        let obj = self.object(id).ok_or(CanvasError::UnknownObjectId(*id))?;
        let image = obj.as_image().ok_or(CanvasError::UnsupportedContent)?;
        render_thumbnail(&image.source_markup, max_side)
    }
}
