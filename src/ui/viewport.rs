use crate::assets::TextureStore;
use crate::editor::EditorState;
use crate::render::{
    paint_scene, raycast, GizmoAxis, OrbitCamera, PaintOptions, ScreenProjector,
};
use crate::scene::{ObjectId, SceneSession};
use egui::{PointerButton, Sense};
use glam::{Vec2, Vec3};

const ORBIT_RADIANS_PER_PIXEL: f32 = 0.008;
const ZOOM_PER_SCROLL_POINT: f32 = 0.002;

/// Nearest object under a screen position.
pub fn pick_at(
    camera: &OrbitCamera,
    projector: &ScreenProjector,
    session: &SceneSession,
    pointer: Vec2,
) -> Option<ObjectId> {
    let ray = camera.ray_from_ndc(projector.ndc_of(pointer), projector.aspect());
    raycast(&ray, session.objects()).map(|hit| hit.object)
}

/// Central 3D view: camera controls, picking, gizmo drags, then the scene itself.
pub fn show_viewport(
    ctx: &egui::Context,
    camera: &mut OrbitCamera,
    session: &mut SceneSession,
    editor: &mut EditorState,
    textures: &TextureStore,
    options: &PaintOptions,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
            let projector = ScreenProjector::new(camera, vec2(rect.min.to_vec2()), vec2(rect.size()));
            let gizmo_origin = editor
                .gizmo
                .attached()
                .and_then(|id| session.object(id))
                .map(|object| object.position());
            if !editor.gizmo.is_dragging() {
                let hovered = response
                    .hover_pos()
                    .and_then(|pos| handle_under(editor, camera, &projector, gizmo_origin, pos));
                editor.gizmo.set_hovered(hovered);
            }

            if response.drag_started_by(PointerButton::Primary) {
                let start = ui
                    .input(|input| input.pointer.press_origin())
                    .or(response.interact_pointer_pos());
                let target = editor
                    .gizmo
                    .attached()
                    .and_then(|id| session.object(id))
                    .map(|object| object.transform);
                if let (Some(start), Some(transform)) = (start, target) {
                    if let Some(axis) =
                        handle_under(editor, camera, &projector, gizmo_origin, start)
                    {
                        editor.gizmo.begin_drag(
                            axis,
                            vec2(start.to_vec2()),
                            transform,
                            camera,
                            &projector,
                        );
                    }
                }
            }

            if response.dragged_by(PointerButton::Primary) {
                if editor.gizmo.is_dragging() {
                    let attached = editor.gizmo.attached();
                    let dragged = response
                        .interact_pointer_pos()
                        .and_then(|pos| editor.gizmo.drag_to(vec2(pos.to_vec2())));
                    if let (Some(transform), Some(object)) =
                        (dragged, attached.and_then(|id| session.object_mut(id)))
                    {
                        object.transform = transform;
                    }
                } else {
                    let delta = response.drag_delta();
                    camera.orbit(
                        -delta.x * ORBIT_RADIANS_PER_PIXEL,
                        delta.y * ORBIT_RADIANS_PER_PIXEL,
                    );
                }
            }

            if response.dragged_by(PointerButton::Secondary)
                || response.dragged_by(PointerButton::Middle)
            {
                let delta = response.drag_delta();
                let per_pixel = camera.world_per_pixel(camera.distance, rect.height());
                camera.pan(-delta.x * per_pixel, delta.y * per_pixel);
            }

            if response.drag_stopped() {
                editor.gizmo.end_drag();
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if handle_under(editor, camera, &projector, gizmo_origin, pos).is_none() {
                        let target = pick_at(camera, &projector, session, vec2(pos.to_vec2()));
                        editor.handle_click(session, target);
                    }
                }
            }

            if response.hovered() {
                let scroll = ui.input(|input| input.smooth_scroll_delta.y);
                if scroll != 0.0 {
                    camera.zoom((-scroll * ZOOM_PER_SCROLL_POINT).exp());
                }
            }

            let painter = ui.painter_at(rect);
            let projector = ScreenProjector::new(camera, vec2(rect.min.to_vec2()), vec2(rect.size()));
            paint_scene(
                &painter,
                camera,
                &projector,
                session,
                textures,
                &editor.gizmo,
                editor.selection(),
                options,
            );
        });
}

fn handle_under(
    editor: &EditorState,
    camera: &OrbitCamera,
    projector: &ScreenProjector,
    origin: Option<Vec3>,
    pointer: egui::Pos2,
) -> Option<GizmoAxis> {
    let origin = origin?;
    editor
        .gizmo
        .hit_test(camera, projector, origin, vec2(pointer.to_vec2()))
}

fn vec2(v: egui::Vec2) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene_painter::{collect_triangles, TriangleSource};
    use crate::scene::ShapeKind;

    fn drawn_and_picked(eye: Vec3) -> (usize, Option<ObjectId>) {
        let camera = OrbitCamera::looking_at(eye, Vec3::new(0.0, 0.5, 0.0));
        let projector = ScreenProjector::new(&camera, Vec2::ZERO, Vec2::new(800.0, 600.0));
        let mut session = SceneSession::with_seed(8);
        let id = session.add_shape(ShapeKind::Triangle);

        let drawn = collect_triangles(
            &camera,
            &projector,
            &session,
            &TextureStore::new(),
            None,
            &PaintOptions::default(),
        )
        .iter()
        .filter(|t| t.source == TriangleSource::Object(id))
        .count();
        let center = projector.project(Vec3::new(0.0, 0.5, 0.0)).unwrap().pos;
        (drawn, pick_at(&camera, &projector, &session, center))
    }

    #[test]
    fn single_sided_shape_is_picked_only_where_drawn() {
        let (drawn, picked) = drawn_and_picked(Vec3::new(0.0, 0.5, 10.0));
        assert!(drawn > 0);
        assert!(picked.is_some());

        let (drawn, picked) = drawn_and_picked(Vec3::new(0.0, 0.5, -10.0));
        assert_eq!(drawn, 0);
        assert_eq!(picked, None);
    }

    #[test]
    fn clicking_the_cube_center_picks_it() {
        let camera = OrbitCamera::default();
        let projector = ScreenProjector::new(&camera, Vec2::new(200.0, 30.0), Vec2::new(800.0, 600.0));
        let mut session = SceneSession::with_seed(8);
        let id = session.add_shape(ShapeKind::Cube);

        let center = projector
            .project(session.object(id).unwrap().position())
            .unwrap()
            .pos;
        assert_eq!(pick_at(&camera, &projector, &session, center), Some(id));
        assert_eq!(
            pick_at(&camera, &projector, &session, Vec2::new(205.0, 35.0)),
            None
        );
    }
}
