#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::Camera;
use crate::engine::{NewText, Signal};

fn core_with_text() -> (EngineCore, ObjectId) {
    let mut core = EngineCore::default();
    let id = core.add_text(NewText { position: Some(Point::new(100.0, 200.0)), ..NewText::new("Label", 20.0) });
    core.drain_signals();
    (core, id)
}

#[test]
fn hidden_without_active_object() {
    let core = EngineCore::default();
    let mut bar = ToolbarController::for_engine(&core);
    bar.sync(&core);
    assert!(!bar.visible());
    assert!(bar.anchor().is_none());
}

#[test]
fn anchor_sits_above_top_center() {
    let (core, id) = core_with_text();
    let mut bar = ToolbarController::for_engine(&core);
    bar.sync(&core);
    let bounds = core.object(&id).unwrap().bounds();
    let anchor = bar.anchor().unwrap();
    assert_eq!(anchor.x, bounds.center().x);
    assert_eq!(anchor.y, 200.0 - 12.0);
}

#[test]
fn anchor_follows_camera() {
    let (mut core, _) = core_with_text();
    let mut bar = ToolbarController::new(10.0);
    core.camera = Camera { pan_x: 50.0, pan_y: -20.0, zoom: 2.0 };
    bar.sync(&core);
    // top 200 * 2 - 20 = 380, minus the gap.
    assert_eq!(bar.anchor().unwrap().y, 370.0);
}

#[test]
fn delete_removes_and_hides() {
    let (mut core, id) = core_with_text();
    let mut bar = ToolbarController::for_engine(&core);
    bar.sync(&core);
    assert_eq!(bar.press(&mut core, ToolbarButton::Delete), Some(id));
    assert!(!bar.visible());
    assert!(core.object(&id).is_none());
    assert_eq!(core.drain_signals(), vec![Signal::Removed(id), Signal::SelectionChanged(None)]);
}

#[test]
fn mirror_toggles_flip_and_stays_visible() {
    let (mut core, id) = core_with_text();
    let mut bar = ToolbarController::for_engine(&core);
    bar.press(&mut core, ToolbarButton::Mirror);
    assert!(core.object(&id).unwrap().geometry.flip_x);
    assert!(bar.visible());
}

#[test]
fn duplicate_selects_clone_and_shows() {
    let (mut core, id) = core_with_text();
    let mut bar = ToolbarController::for_engine(&core);
    let clone = bar.press(&mut core, ToolbarButton::Duplicate).unwrap();
    assert_ne!(clone, id);
    assert_eq!(core.active(), Some(clone));
    assert!(bar.visible());
    let b = core.object(&clone).unwrap().bounds();
    assert_eq!(bar.anchor().unwrap().x, b.center().x);
}

#[test]
fn save_exits_edit_deselects_and_hides() {
    let (mut core, id) = core_with_text();
    core.enter_text_edit(&id);
    let mut bar = ToolbarController::for_engine(&core);
    bar.sync(&core);
    assert_eq!(bar.press(&mut core, ToolbarButton::Save), Some(id));
    assert!(!bar.visible());
    assert!(core.active().is_none());
    assert!(core.editing().is_none());
    assert_eq!(core.drain_signals(), vec![Signal::SelectionChanged(None), Signal::Save(id)]);
}

#[test]
fn press_without_active_is_noop() {
    let mut core = EngineCore::default();
    let mut bar = ToolbarController::for_engine(&core);
    assert!(bar.press(&mut core, ToolbarButton::Delete).is_none());
    assert!(bar.press(&mut core, ToolbarButton::Duplicate).is_none());
    assert!(core.drain_signals().is_empty());
}
