#![allow(clippy::float_cmp)]

use super::*;
use crate::geom::Point;
use crate::svg::PathCmd;

fn surface() -> Surface {
    Surface::new(Size::new(800.0, 600.0))
}

fn silhouette(w: f64, h: f64) -> Silhouette {
    Silhouette {
        size: Size::new(w, h),
        paths: vec![vec![PathCmd::MoveTo(Point::new(0.0, 0.0)), PathCmd::LineTo(Point::new(w, h)), PathCmd::Close]],
    }
}

// =============================================================
// Fits
// =============================================================

#[test]
fn cover_fit_fills_and_crops() {
    let fit = cover_fit(Size::new(400.0, 400.0), Size::new(800.0, 600.0));
    assert_eq!(fit.scale, 2.0);
    assert_eq!((fit.width, fit.height), (800.0, 800.0));
    assert_eq!((fit.left, fit.top), (0.0, -100.0));
}

#[test]
fn contain_fit_letterboxes() {
    let fit = contain_fit(Size::new(400.0, 400.0), Size::new(800.0, 600.0));
    assert_eq!(fit.scale, 1.5);
    assert_eq!((fit.left, fit.top), (100.0, 0.0));
}

#[test]
fn degenerate_image_keeps_unit_scale() {
    assert_eq!(cover_fit(Size::new(0.0, 10.0), Size::new(800.0, 600.0)).scale, 1.0);
}

// =============================================================
// Rounded mask
// =============================================================

#[test]
fn rounded_mask_fifty_percent_is_150() {
    let mut s = surface();
    s.set_rounded_mask(50.0);
    assert_eq!(s.corner_radius(), Some(150.0));
}

#[test]
fn rounded_mask_zero_clears() {
    let mut s = surface();
    s.set_rounded_mask(40.0);
    s.set_rounded_mask(0.0);
    assert!(s.clip.is_none());
}

#[test]
fn rounded_mask_full_is_half_short_side() {
    let mut s = Surface::new(Size::new(500.0, 500.0));
    s.set_rounded_mask(100.0);
    assert_eq!(s.corner_radius(), Some(250.0));
    s.set_rounded_mask(250.0);
    assert_eq!(s.corner_radius(), Some(250.0));
}

#[test]
fn rounded_radius_is_monotonic() {
    let size = Size::new(800.0, 600.0);
    let mut prev = 0.0;
    for p in 0..=100 {
        let r = rounded_radius(f64::from(p), size);
        assert!(r >= prev);
        prev = r;
    }
}

#[test]
fn non_finite_percent_clears() {
    let mut s = surface();
    s.set_rounded_mask(30.0);
    s.set_rounded_mask(f64::NAN);
    assert!(s.clip.is_none());
}

// =============================================================
// Resize / refit
// =============================================================

#[test]
fn resize_refits_mask_and_background() {
    let mut s = surface();
    s.set_rounded_mask(50.0);
    s.set_background(Some("/bg/wood.png"));
    assert!(s.background_loaded("/bg/wood.png", Size::new(100.0, 100.0)));
    s.resize(Size::new(400.0, 200.0)).unwrap();
    assert_eq!(s.corner_radius(), Some(50.0));
    let fit = s.background.as_ref().and_then(|b| b.fit).unwrap();
    assert_eq!(fit.scale, 4.0);
}

#[test]
fn resize_rejects_invalid_size() {
    let mut s = surface();
    assert!(matches!(s.resize(Size::new(0.0, 100.0)), Err(CanvasError::InvalidSize(_))));
    assert!(matches!(s.resize(Size::new(f64::INFINITY, 100.0)), Err(CanvasError::InvalidSize(_))));
    assert_eq!(s.size(), Size::new(800.0, 600.0));
}

#[test]
fn vector_mask_is_contained_and_refit() {
    let mut s = surface();
    s.set_vector_mask(Some("/masks/heart.svg".into()), silhouette(100.0, 100.0));
    match &s.clip {
        Some(ClipMask::Vector { fit, reference, .. }) => {
            assert_eq!(fit.scale, 6.0);
            assert_eq!(reference.as_deref(), Some("/masks/heart.svg"));
        }
        other => panic!("expected vector mask, got {other:?}"),
    }
    s.resize(Size::new(200.0, 300.0)).unwrap();
    match &s.clip {
        Some(ClipMask::Vector { fit, .. }) => assert_eq!(fit.scale, 2.0),
        other => panic!("expected vector mask, got {other:?}"),
    }
    s.clear_mask();
    assert!(s.clip.is_none());
}

// =============================================================
// Background
// =============================================================

#[test]
fn background_url_is_reported() {
    let mut s = surface();
    assert_eq!(s.current_background_url(), None);
    s.set_background(Some("/bg/a.png"));
    assert_eq!(s.current_background_url(), Some("/bg/a.png"));
    s.set_background(None);
    assert_eq!(s.current_background_url(), None);
}

#[test]
fn stale_background_load_is_ignored() {
    let mut s = surface();
    s.set_background(Some("/bg/a.png"));
    s.set_background(Some("/bg/b.png"));
    assert!(!s.background_loaded("/bg/a.png", Size::new(10.0, 10.0)));
    assert!(s.background.as_ref().is_some_and(|b| b.fit.is_none()));
}

#[test]
fn frame_must_be_positive() {
    let mut s = surface();
    assert!(s.set_frame(Some(Size::new(1000.0, 800.0))).is_ok());
    assert!(s.set_frame(Some(Size::new(-1.0, 800.0))).is_err());
    assert_eq!(s.frame, Some(Size::new(1000.0, 800.0)));
}
