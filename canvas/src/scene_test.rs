#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::engine::{ImageOptions, NewText};
use crate::geom::{Point, Size};

const DOT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20"><circle cx="10" cy="10" r="8"/></svg>"#;

fn size(wp: f64, hp: f64, secondary: Option<(f64, f64)>) -> SavedSize {
    SavedSize {
        width_primary: wp,
        height_primary: hp,
        width_secondary: secondary.map(|s| s.0),
        height_secondary: secondary.map(|s| s.1),
        shape: SavedShape::Rectangle,
        rounded_percent: None,
        mask_reference: None,
    }
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn parses_camel_case_payload() {
    let doc = json!({
        "background": "/bg/wood.jpg",
        "size": { "widthPrimary": 600, "heightPrimary": 400, "shape": "heart", "maskReference": "/masks/heart.svg" },
        "texts": [{ "text": "Hi", "fontSize": 24, "fontFamily": "Lobster", "left": 10, "top": 20, "align": "center", "flipX": true }],
        "images": [{ "svg": "<svg/>", "originKind": "library", "left": 1, "top": 2, "scaleX": 0.5, "scaleY": 0.5 }]
    });
    let scene = SavedScene::from_json(&doc.to_string()).unwrap();
    assert_eq!(scene.background.as_deref(), Some("/bg/wood.jpg"));
    let size = scene.size.unwrap();
    assert_eq!(size.shape, SavedShape::Named("heart".into()));
    assert_eq!(size.mask_reference.as_deref(), Some("/masks/heart.svg"));
    let t = &scene.texts[0];
    assert_eq!(t.align, TextAlign::Center);
    assert!(t.flip_x && !t.flip_y);
    assert_eq!(t.angle, 0.0);
    let i = &scene.images[0];
    assert_eq!(i.source_markup, "<svg/>");
    assert_eq!(i.origin_kind, OriginKind::Library);
}

#[test]
fn missing_image_scale_defaults_to_one() {
    let doc = json!({ "images": [{ "sourceMarkup": "<svg/>", "left": 0, "top": 0 }] });
    let scene = SavedScene::from_json(&doc.to_string()).unwrap();
    assert_eq!((scene.images[0].scale_x, scene.images[0].scale_y), (1.0, 1.0));
}

#[test]
fn malformed_json_is_invalid_format() {
    let err = SavedScene::from_json("{ texts: ").unwrap_err();
    assert!(matches!(err, CanvasError::InvalidFormat(_)));
}

#[test]
fn shape_name_is_case_insensitive_for_rectangle() {
    let s: SavedShape = serde_json::from_value(json!("Rectangle")).unwrap();
    assert_eq!(s, SavedShape::Rectangle);
    assert_eq!(serde_json::to_value(SavedShape::Named("star".into())).unwrap(), json!("star"));
}

// =============================================================
// Size validation
// =============================================================

#[test]
fn primary_in_range_is_valid() {
    assert!(size(30.0, 3000.0, None).validate().is_ok());
}

#[test]
fn dimension_out_of_range_is_rejected() {
    assert!(size(29.0, 400.0, None).validate().is_err());
    assert!(size(400.0, 3001.0, None).validate().is_err());
    assert!(size(400.0, 400.0, Some((20.0, 100.0))).validate().is_err());
}

#[test]
fn secondary_must_be_strictly_smaller() {
    assert!(size(600.0, 400.0, Some((500.0, 300.0))).validate().is_ok());
    assert!(size(600.0, 400.0, Some((600.0, 300.0))).validate().is_err());
    assert!(size(600.0, 400.0, Some((500.0, 450.0))).validate().is_err());
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_captures_objects_in_draw_order() {
    let mut core = EngineCore::default();
    let t = core.add_text(NewText { position: Some(Point::new(10.0, 10.0)), ..NewText::new("Top", 30.0) });
    let options = ImageOptions { position: Some(Point::new(400.0, 300.0)), scale: Some((2.0, 2.0)), ..Default::default() };
    let i = core.add_image_from_vector_markup(DOT, options).unwrap();
    core.set_background_image(Some("/bg.png"));

    let saved = core.export_scene();
    assert_eq!(saved.background.as_deref(), Some("/bg.png"));
    assert_eq!(saved.texts.len(), 1);
    assert_eq!(saved.texts[0].id, Some(t));
    assert_eq!((saved.texts[0].left, saved.texts[0].top), (10.0, 10.0));
    assert_eq!(saved.images[0].id, Some(i));
    assert_eq!(saved.images[0].scale_x, 2.0);
    assert!(saved.images[0].source_markup.contains("<circle"));
}

#[test]
fn export_reports_size_tiers_and_mask() {
    let mut core = EngineCore::default();
    core.set_frame_size(Some(Size::new(1000.0, 800.0))).unwrap();
    core.set_rounded_rect_mask(25.0);
    let size = core.export_scene().size.unwrap();
    assert_eq!((size.width_primary, size.height_primary), (1000.0, 800.0));
    assert_eq!(size.secondary(), Some((800.0, 600.0)));
    assert_eq!(size.shape, SavedShape::Rectangle);
    assert_eq!(size.rounded_percent, Some(25.0));
}

#[test]
fn vector_mask_exports_shape_from_reference() {
    let mut core = EngineCore::default();
    core.set_clip_mask_from_markup(DOT, Some("/masks/oval.svg".into())).unwrap();
    let size = core.export_scene().size.unwrap();
    assert_eq!(size.shape, SavedShape::Named("oval".into()));
    assert_eq!(size.mask_reference.as_deref(), Some("/masks/oval.svg"));
}

#[test]
fn exported_json_parses_back() {
    let mut core = EngineCore::default();
    core.add_text(NewText::new("Round", 18.0));
    let saved = core.export_scene();
    assert_eq!(SavedScene::from_json(&saved.to_json().unwrap()).unwrap(), saved);
}
