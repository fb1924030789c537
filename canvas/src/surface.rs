//! The bounded drawing surface with its background and clip mask.
//!
//! Neither the background nor the mask is a surface object: both are layout
//! only, never hit-tested, and never part of overlap or edge checks. Both are
//! re-fitted whenever the surface is resized.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use tracing::debug;

use crate::error::CanvasError;
use crate::geom::Size;
use crate::svg::Silhouette;

/// Placement of an image scaled into a target area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale `image` to fully cover `target`, centered; overflow is cropped.
#[must_use]
pub fn cover_fit(image: Size, target: Size) -> Fit {
    fit_with(image, target, f64::max)
}

/// Scale `image` to fit entirely inside `target`, centered.
#[must_use]
pub fn contain_fit(image: Size, target: Size) -> Fit {
    fit_with(image, target, f64::min)
}

fn fit_with(image: Size, target: Size, pick: fn(f64, f64) -> f64) -> Fit {
    let scale = if image.is_valid() { pick(target.width / image.width, target.height / image.height) } else { 1.0 };
    let width = image.width * scale;
    let height = image.height * scale;
    Fit { scale, left: (target.width - width) * 0.5, top: (target.height - height) * 0.5, width, height }
}

/// Cover-fitted background image.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub url: String,
    /// Natural image size, known once the host has loaded it.
    pub natural: Option<Size>,
    pub fit: Option<Fit>,
}

/// Clip silhouette restricting everything drawn on the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipMask {
    /// Rounded rectangle covering the surface.
    RoundedRect { percent: f64, radius: f64 },
    /// Arbitrary vector outline, fitted uniformly and centered.
    Vector { reference: Option<String>, silhouette: Silhouette, fit: Fit },
}

/// The drawing area.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    /// Primary size tier, when a secondary tier drives the surface itself.
    pub frame: Option<Size>,
    pub background: Option<Background>,
    pub clip: Option<ClipMask>,
}

impl Surface {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self { width: size.width, height: size.height, frame: None, background: None, clip: None }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Resize and re-fit background and mask. Existing objects are left where
    /// they are.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidSize`] when either dimension is not a positive,
    /// finite number.
    pub fn resize(&mut self, size: Size) -> Result<(), CanvasError> {
        if !size.is_valid() {
            return Err(CanvasError::InvalidSize(format!("{}x{}", size.width, size.height)));
        }
        self.width = size.width;
        self.height = size.height;
        self.refit();
        Ok(())
    }

    /// Record the primary size tier.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidSize`] for a non-positive frame.
    pub fn set_frame(&mut self, frame: Option<Size>) -> Result<(), CanvasError> {
        if let Some(f) = frame
            && !f.is_valid()
        {
            return Err(CanvasError::InvalidSize(format!("{}x{}", f.width, f.height)));
        }
        self.frame = frame;
        Ok(())
    }

    /// Recompute background and mask placement for the current size.
    pub fn refit(&mut self) {
        let size = self.size();
        if let Some(bg) = &mut self.background {
            bg.fit = bg.natural.map(|n| cover_fit(n, size));
        }
        match &mut self.clip {
            Some(ClipMask::RoundedRect { percent, radius }) => *radius = rounded_radius(*percent, size),
            Some(ClipMask::Vector { silhouette, fit, .. }) => *fit = contain_fit(silhouette.size, size),
            None => {}
        }
    }

    /// Set or clear the background. The fit is unknown until
    /// [`Surface::background_loaded`] reports the natural size.
    pub fn set_background(&mut self, url: Option<&str>) {
        self.background = url.map(|u| Background { url: u.to_string(), natural: None, fit: None });
    }

    /// Record the natural size of a loaded background.
    ///
    /// Returns `false` when `url` is no longer the current background, which
    /// happens when loads complete out of order.
    pub fn background_loaded(&mut self, url: &str, natural: Size) -> bool {
        let size = self.size();
        match &mut self.background {
            Some(bg) if bg.url == url && natural.is_valid() => {
                bg.natural = Some(natural);
                bg.fit = Some(cover_fit(natural, size));
                true
            }
            _ => {
                debug!(%url, "surface: stale background load ignored");
                false
            }
        }
    }

    #[must_use]
    pub fn current_background_url(&self) -> Option<&str> {
        self.background.as_ref().map(|b| b.url.as_str())
    }

    /// Rounded-rectangle mask; 0 clears the mask.
    pub fn set_rounded_mask(&mut self, percent: f64) {
        let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        if percent == 0.0 {
            self.clip = None;
            return;
        }
        self.clip = Some(ClipMask::RoundedRect { percent, radius: rounded_radius(percent, self.size()) });
    }

    pub fn set_vector_mask(&mut self, reference: Option<String>, silhouette: Silhouette) {
        let fit = contain_fit(silhouette.size, self.size());
        self.clip = Some(ClipMask::Vector { reference, silhouette, fit });
    }

    pub fn clear_mask(&mut self) {
        self.clip = None;
    }

    /// Corner radius of the rounded mask, if one is set.
    #[must_use]
    pub fn corner_radius(&self) -> Option<f64> {
        match &self.clip {
            Some(ClipMask::RoundedRect { radius, .. }) => Some(*radius),
            _ => None,
        }
    }
}

/// `percent / 100 * min(width, height) / 2`.
#[must_use]
pub fn rounded_radius(percent: f64, size: Size) -> f64 {
    percent.clamp(0.0, 100.0) / 100.0 * size.width.min(size.height) * 0.5
}
