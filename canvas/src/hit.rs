#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Camera;
use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{ObjectId, Scene, SurfaceObject};
use crate::geom::Point;

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ScaleHandle,
    RotateHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

/// Surface positions of an object's scale and rotate handles.
#[must_use]
pub fn handle_positions(obj: &SurfaceObject, camera: &Camera) -> (Point, Point) {
    let rect = obj.local_rect();
    let center = rect.center();
    let angle = obj.geometry.angle;
    let scale = Point::new(rect.right(), rect.bottom()).rotated_about(center, angle);
    let rotate = Point::new(center.x, rect.top - camera.screen_dist_to_world(ROTATE_HANDLE_OFFSET_PX))
        .rotated_about(center, angle);
    (scale, rotate)
}

/// Object and part under `world_pt`, checking the active object's handles
/// first and then bodies from the top of the draw order down. Layout-only
/// objects are never hit.
#[must_use]
pub fn hit_test(world_pt: Point, scene: &Scene, camera: &Camera, active: Option<ObjectId>) -> Option<Hit> {
    let radius = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
    let radius_sq = radius * radius;

    if let Some(obj) = active.and_then(|id| scene.get(&id)).filter(|o| !o.layout_only) {
        let (scale, rotate) = handle_positions(obj, camera);
        if world_pt.distance_sq(rotate) <= radius_sq {
            return Some(Hit { object_id: obj.id, part: HitPart::RotateHandle });
        }
        if world_pt.distance_sq(scale) <= radius_sq {
            return Some(Hit { object_id: obj.id, part: HitPart::ScaleHandle });
        }
    }

    scene
        .ordered()
        .rev()
        .filter(|o| !o.layout_only)
        .find(|o| body_contains(o, world_pt))
        .map(|o| Hit { object_id: o.id, part: HitPart::Body })
}

fn body_contains(obj: &SurfaceObject, world_pt: Point) -> bool {
    let rect = obj.local_rect();
    let local = world_pt.rotated_about(rect.center(), -obj.geometry.angle);
    local.x >= rect.left && local.x <= rect.right() && local.y >= rect.top && local.y <= rect.bottom()
}
