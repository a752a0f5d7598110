//! Scenepaint: a small desktop scene editor.
//!
//! Add primitive shapes, move/rotate/scale them with an on-screen gizmo,
//! paint flat colors or uploaded textures onto them, and drop background or
//! reference images into the scene. Rendering is done with egui meshes on
//! top of a wgpu surface.

mod app;
mod assets;
mod config;
mod editor;
mod render;
mod scene;
mod ui;

fn main() {
    if let Err(err) = app::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
