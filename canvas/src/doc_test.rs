#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

fn text_object(left: f64, top: f64, width: f64, height: f64) -> SurfaceObject {
    let attrs = TextAttrs {
        text: "hello".into(),
        font_family: "Arial".into(),
        font_size: 20.0,
        align: TextAlign::Left,
        wrap_width: width,
        min_height: 0.0,
        width,
        height,
        lines: vec!["hello".into()],
    };
    SurfaceObject::new(Uuid::new_v4(), ObjectKind::Text(attrs), Geometry::at(Point::new(left, top)))
}

fn image_object(left: f64, top: f64, scale: f64) -> SurfaceObject {
    let attrs = ImageAttrs {
        source_markup: "<svg/>".into(),
        origin_kind: OriginKind::Library,
        intrinsic: Size::new(100.0, 50.0),
        drawable_count: 1,
    };
    let mut geometry = Geometry::at(Point::new(left, top));
    geometry.scale_x = scale;
    geometry.scale_y = scale;
    SurfaceObject::new(Uuid::new_v4(), ObjectKind::Image(attrs), geometry)
}

// =============================================================
// Serde names
// =============================================================

#[test]
fn align_and_origin_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&TextAlign::Center).unwrap(), "\"center\"");
    assert_eq!(serde_json::to_string(&OriginKind::Library).unwrap(), "\"library\"");
    let back: TextAlign = serde_json::from_str("\"right\"").unwrap();
    assert_eq!(back, TextAlign::Right);
}

#[test]
fn defaults_are_left_and_upload() {
    assert_eq!(TextAlign::default(), TextAlign::Left);
    assert_eq!(OriginKind::default(), OriginKind::Upload);
}

// =============================================================
// SurfaceObject geometry
// =============================================================

#[test]
fn geometry_default_scale_is_one() {
    let g = Geometry::default();
    assert_eq!((g.scale_x, g.scale_y), (1.0, 1.0));
    assert!(!g.flip_x && !g.flip_y);
}

#[test]
fn image_box_uses_intrinsic_times_scale() {
    let obj = image_object(10.0, 20.0, 2.0);
    assert_eq!(obj.box_size(), Size::new(200.0, 100.0));
    assert_eq!(obj.local_rect(), Rect::new(10.0, 20.0, 200.0, 100.0));
    assert_eq!(obj.center(), Point::new(110.0, 70.0));
}

#[test]
fn mirrored_image_keeps_positive_extent() {
    let mut obj = image_object(0.0, 0.0, 1.0);
    obj.geometry.scale_x = -1.0;
    assert_eq!(obj.box_size(), Size::new(100.0, 50.0));
}

#[test]
fn bounds_grow_with_rotation() {
    let mut obj = text_object(100.0, 100.0, 200.0, 100.0);
    obj.geometry.angle = 90.0;
    let b = obj.bounds();
    assert!((b.width - 100.0).abs() < 1e-9);
    assert!((b.height - 200.0).abs() < 1e-9);
    assert_eq!(b.center(), obj.center());
}

#[test]
fn kind_accessors() {
    let t = text_object(0.0, 0.0, 10.0, 10.0);
    assert!(t.is_text());
    assert!(t.as_text().is_some());
    assert!(t.as_image().is_none());
    let i = image_object(0.0, 0.0, 1.0);
    assert!(!i.is_text());
    assert!(i.as_image().is_some());
}

// =============================================================
// Scene
// =============================================================

#[test]
fn insert_and_get() {
    let mut scene = Scene::new();
    let obj = text_object(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    scene.insert(obj).unwrap();
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.get(&id).map(|o| o.id), Some(id));
    assert!(scene.contains(&id));
}

#[test]
fn duplicate_live_id_is_rejected() {
    let mut scene = Scene::new();
    let obj = text_object(0.0, 0.0, 10.0, 10.0);
    scene.insert(obj.clone()).unwrap();
    assert_eq!(scene.insert(obj.clone()), Err(CanvasError::DuplicateObjectId(obj.id)));
    assert_eq!(scene.len(), 1);
}

#[test]
fn insert_fresh_rekeys_known_ids() {
    let mut scene = Scene::new();
    let obj = text_object(0.0, 0.0, 10.0, 10.0);
    let first = scene.insert_fresh(obj.clone());
    assert_eq!(first, obj.id);
    let second = scene.insert_fresh(obj.clone());
    assert_ne!(second, obj.id);
    assert_eq!(scene.get(&second).map(|o| o.id), Some(second));

    scene.remove(&first);
    let third = scene.insert_fresh(obj);
    assert_ne!(third, first);
    assert_eq!(scene.len(), 2);
}

#[test]
fn removed_id_is_never_reused() {
    let mut scene = Scene::new();
    let obj = text_object(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    scene.insert(obj.clone()).unwrap();
    assert!(scene.remove(&id).is_some());
    assert!(!scene.contains(&id));
    assert!(scene.is_known(&id));
    assert!(scene.insert(obj).is_err());
    assert!(scene.is_empty());
}

#[test]
fn remove_unknown_is_none() {
    let mut scene = Scene::new();
    assert!(scene.remove(&Uuid::new_v4()).is_none());
}

#[test]
fn ordered_follows_insertion() {
    let mut scene = Scene::new();
    let a = text_object(0.0, 0.0, 10.0, 10.0);
    let b = image_object(50.0, 50.0, 1.0);
    let c = text_object(200.0, 0.0, 10.0, 10.0);
    let ids = [a.id, b.id, c.id];
    scene.insert(a).unwrap();
    scene.insert(b).unwrap();
    scene.insert(c).unwrap();
    let got: Vec<_> = scene.ordered().map(|o| o.id).collect();
    assert_eq!(got, ids);
    let top = scene.ordered().next_back().map(|o| o.id);
    assert_eq!(top, Some(ids[2]));

    scene.remove(&ids[1]);
    let got: Vec<_> = scene.ordered().map(|o| o.id).collect();
    assert_eq!(got, [ids[0], ids[2]]);
}

#[test]
fn layout_only_objects_are_ignored_by_overlap_queries() {
    let mut scene = Scene::new();
    let mut backdrop = image_object(0.0, 0.0, 8.0);
    backdrop.layout_only = true;
    let a = text_object(100.0, 100.0, 50.0, 50.0);
    let a_id = a.id;
    scene.insert(backdrop).unwrap();
    scene.insert(a).unwrap();

    let probe = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert!(scene.first_overlap(&Uuid::new_v4(), &probe).is_none());
    assert_eq!(scene.bounds_except(&Uuid::new_v4()).len(), 1);

    let hit = scene.first_overlap(&Uuid::new_v4(), &Rect::new(120.0, 120.0, 10.0, 10.0));
    assert_eq!(hit.map(|(id, _)| id), Some(a_id));
}

#[test]
fn first_overlap_skips_self() {
    let mut scene = Scene::new();
    let a = text_object(100.0, 100.0, 50.0, 50.0);
    let id = a.id;
    let rect = a.bounds();
    scene.insert(a).unwrap();
    assert!(scene.first_overlap(&id, &rect).is_none());
    assert!(scene.bounds_except(&id).is_empty());
}
