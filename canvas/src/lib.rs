//! Composition engine for the product configurator work-surface.
//!
//! This crate is compiled to WebAssembly and runs in the browser, and natively
//! for tests and the offline host. It owns a single bounded surface and every
//! text/image object placed on it: adding and removing objects, keeping them
//! inside the surface and away from each other while they are dragged, scaled
//! or rotated, compositing the background and clip mask, and rebuilding the
//! surface from a persisted scene. Panels talk to it only through
//! [`engine::EngineCore`] operations and observe it through drained
//! [`engine::Signal`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Surface objects and the scene store |
//! | [`geom`] | Pure rectangle/angle algorithms (overlap, separation, free cells) |
//! | [`surface`] | Surface size, cover-fit background and clip mask |
//! | [`text`] | Text measurement seam and word-wrap layout |
//! | [`svg`] | Vector markup sanitizing, parsing and silhouettes |
//! | [`input`] | Gesture state machine and transient UI state |
//! | [`hit`] | Hit-testing against surface objects and handles |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`toolbar`] | Floating contextual toolbar controller |
//! | [`render`] | Frame planning and 2D-context painting |
//! | [`scene`] | Persisted scene representation and export |
//! | [`rehydrate`] | Replays a persisted scene into the engine |
//! | [`fonts`] | Memoized per-family font loading |
//! | [`loader`] | Resource loading seam implemented by the host |
//! | [`preview`] | Offscreen thumbnail rendering |
//! | [`config`] | Engine tunables |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Fixed numeric bounds and overlay styling |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod geom;
pub mod hit;
pub mod input;
pub mod loader;
pub mod preview;
pub mod rehydrate;
pub mod render;
pub mod scene;
pub mod surface;
pub mod svg;
pub mod text;
pub mod toolbar;
