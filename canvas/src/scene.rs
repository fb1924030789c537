//! Persisted scene representation.
//!
//! These are the per-step payloads the persistence layer stores between
//! sessions. Field names are camelCase on the wire. [`EngineCore::export_scene`]
//! produces one from live state; [`crate::rehydrate`] consumes one.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};

use crate::doc::{ObjectId, ObjectKind, OriginKind, TextAlign};
use crate::engine::EngineCore;
use crate::error::CanvasError;
use crate::surface::ClipMask;

/// Smallest accepted size-tier dimension.
pub const SIZE_MIN: f64 = 30.0;
/// Largest accepted size-tier dimension.
pub const SIZE_MAX: f64 = 3000.0;

/// Surface outline chosen in the size step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SavedShape {
    /// Plain rectangle, optionally with rounded corners.
    #[default]
    Rectangle,
    /// Any other outline, clipped by a vector mask.
    Named(String),
}

impl From<String> for SavedShape {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("rectangle") { Self::Rectangle } else { Self::Named(s) }
    }
}

impl From<SavedShape> for String {
    fn from(shape: SavedShape) -> Self {
        match shape {
            SavedShape::Rectangle => "rectangle".to_string(),
            SavedShape::Named(name) => name,
        }
    }
}

/// Size tiers and shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSize {
    pub width_primary: f64,
    pub height_primary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_secondary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_secondary: Option<f64>,
    #[serde(default)]
    pub shape: SavedShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounded_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_reference: Option<String>,
}

impl SavedSize {
    /// The secondary tier, when both of its dimensions are present.
    #[must_use]
    pub fn secondary(&self) -> Option<(f64, f64)> {
        self.width_secondary.zip(self.height_secondary)
    }

    /// Check every dimension lies in `[SIZE_MIN, SIZE_MAX]` and that a
    /// secondary tier is strictly smaller than the primary on both axes.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidSize`] naming the first failing check.
    pub fn validate(&self) -> Result<(), CanvasError> {
        let in_range = |v: f64| v.is_finite() && (SIZE_MIN..=SIZE_MAX).contains(&v);
        let mut dims = vec![("widthPrimary", self.width_primary), ("heightPrimary", self.height_primary)];
        dims.extend(self.width_secondary.map(|w| ("widthSecondary", w)));
        dims.extend(self.height_secondary.map(|h| ("heightSecondary", h)));
        if let Some((name, v)) = dims.into_iter().find(|(_, v)| !in_range(*v)) {
            return Err(CanvasError::InvalidSize(format!("{name} {v} outside {SIZE_MIN}..={SIZE_MAX}")));
        }
        if let Some((w, h)) = self.secondary()
            && (w >= self.width_primary || h >= self.height_primary)
        {
            return Err(CanvasError::InvalidSize(format!(
                "secondary {w}x{h} must be smaller than primary {}x{}",
                self.width_primary, self.height_primary
            )));
        }
        Ok(())
    }
}

/// One text item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedText {
    #[serde(default)]
    pub id: Option<ObjectId>,
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub left: f64,
    pub top: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
}

/// One image item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedImage {
    #[serde(default)]
    pub id: Option<ObjectId>,
    #[serde(alias = "svg")]
    pub source_markup: String,
    #[serde(default)]
    pub origin_kind: OriginKind,
    pub left: f64,
    pub top: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
}

fn unit_scale() -> f64 {
    1.0
}

/// Every persisted step, as one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedScene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SavedSize>,
    /// Font family to font file reference, loaded before text items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<SavedFont>,
    #[serde(default)]
    pub texts: Vec<SavedText>,
    #[serde(default)]
    pub images: Vec<SavedImage>,
}

/// A custom font the text items depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFont {
    pub family: String,
    pub reference: String,
}

impl SavedScene {
    /// Parse a scene document.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidFormat`] when the JSON does not match.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        serde_json::from_str(json).map_err(|e| CanvasError::InvalidFormat(format!("scene: {e}")))
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidFormat`] if serialization fails.
    pub fn to_json(&self) -> Result<String, CanvasError> {
        serde_json::to_string_pretty(self).map_err(|e| CanvasError::InvalidFormat(format!("scene: {e}")))
    }
}

/// Shape name for a mask reference: the file stem of its last path segment.
fn shape_name(reference: &str) -> String {
    let file = reference.rsplit('/').next().unwrap_or(reference);
    let stem = file.split('.').next().unwrap_or(file);
    if stem.is_empty() { "custom".to_string() } else { stem.to_string() }
}

impl EngineCore {
    /// Snapshot live state in the persisted representation. Layout-only
    /// objects are not exported.
    #[must_use]
    pub fn export_scene(&self) -> SavedScene {
        let surface = &self.surface;
        let (primary, secondary) = match surface.frame {
            Some(frame) => (frame, Some(surface.size())),
            None => (surface.size(), None),
        };
        let (shape, rounded_percent, mask_reference) = match &surface.clip {
            None => (SavedShape::Rectangle, None, None),
            Some(ClipMask::RoundedRect { percent, .. }) => (SavedShape::Rectangle, Some(*percent), None),
            Some(ClipMask::Vector { reference, .. }) => (
                SavedShape::Named(reference.as_deref().map_or_else(|| "custom".to_string(), shape_name)),
                None,
                reference.clone(),
            ),
        };
        let size = SavedSize {
            width_primary: primary.width,
            height_primary: primary.height,
            width_secondary: secondary.map(|s| s.width),
            height_secondary: secondary.map(|s| s.height),
            shape,
            rounded_percent,
            mask_reference,
        };

        let mut texts = Vec::new();
        let mut images = Vec::new();
        for obj in self.scene.ordered().filter(|o| !o.layout_only) {
            let g = &obj.geometry;
            match &obj.kind {
                ObjectKind::Text(t) => texts.push(SavedText {
                    id: Some(obj.id),
                    text: t.text.clone(),
                    font_size: t.font_size,
                    font_family: t.font_family.clone(),
                    left: g.left,
                    top: g.top,
                    angle: g.angle,
                    align: t.align,
                    flip_x: g.flip_x,
                    flip_y: g.flip_y,
                }),
                ObjectKind::Image(i) => images.push(SavedImage {
                    id: Some(obj.id),
                    source_markup: i.source_markup.clone(),
                    origin_kind: i.origin_kind,
                    left: g.left,
                    top: g.top,
                    angle: g.angle,
                    scale_x: g.scale_x,
                    scale_y: g.scale_y,
                    flip_x: g.flip_x,
                    flip_y: g.flip_y,
                }),
            }
        }

        SavedScene {
            background: surface.current_background_url().map(str::to_string),
            size: Some(size),
            fonts: Vec::new(),
            texts,
            images,
        }
    }
}
