#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

#[test]
fn default_camera_maps_surface_one_to_one() {
    let cam = Camera::default();
    assert_eq!(cam.zoom, 1.0);
    assert!(close(cam.screen_to_world(Point::new(120.0, 45.0)), Point::new(120.0, 45.0)));
    assert!(close(cam.world_to_screen(Point::new(120.0, 45.0)), Point::new(120.0, 45.0)));
}

#[test]
fn screen_to_world_removes_pan_then_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: 30.0, zoom: 2.0 };
    assert!(close(cam.screen_to_world(Point::new(0.0, 0.0)), Point::new(-25.0, -15.0)));
    assert!(close(cam.screen_to_world(Point::new(250.0, 130.0)), Point::new(100.0, 50.0)));
}

#[test]
fn world_to_screen_applies_zoom_then_pan() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    // 5*3 + 20 = 35, 5*3 + 10 = 25
    assert!(close(cam.world_to_screen(Point::new(5.0, 5.0)), Point::new(35.0, 25.0)));
}

#[test]
fn conversions_invert_each_other() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let world = Point::new(333.3, 599.9);
    assert!(close(cam.screen_to_world(cam.world_to_screen(world)), world));
    let screen = Point::new(400.0, 300.0);
    assert!(close(cam.world_to_screen(cam.screen_to_world(screen)), screen));
}

#[test]
fn handle_radius_shrinks_in_surface_units_when_zoomed_in() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!((cam.screen_dist_to_world(8.0) - 2.0).abs() < EPSILON);
    let half = Camera { zoom: 0.5, ..Camera::default() };
    assert!((half.screen_dist_to_world(8.0) - 16.0).abs() < EPSILON);
}

#[test]
fn rect_to_screen_scales_extent() {
    let cam = Camera { pan_x: 10.0, pan_y: 20.0, zoom: 2.0 };
    let r = cam.rect_to_screen(&Rect::new(5.0, 5.0, 100.0, 40.0));
    assert_eq!(r, Rect::new(20.0, 30.0, 200.0, 80.0));
}
