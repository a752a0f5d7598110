mod viewport;

pub use viewport::show_viewport;

use crate::assets::upload::UploadTarget;
use crate::assets::TextureStore;
use crate::editor::{BrushKind, EditorState, PlaceholderTool};
use crate::render::TransformMode;
use crate::scene::{AuxiliaryPair, ObjectId, Rgb, SceneObject, SceneSession, ShapeCategory, Transform};
use glam::Vec3;

/// Something the user asked for through the panels, applied after the UI pass.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    AddShape(&'static str),
    Upload(UploadTarget),
    TogglePaintingMode,
    SetBrushKind(BrushKind),
    SetBrushColor(Rgb),
    SetObjectColor(Rgb),
    SetTransformMode(TransformMode),
    SetTransform(ObjectId, Transform),
    Placeholder(PlaceholderTool),
    DismissNotice,
}

/// Applies one action. Returns the upload target when a file still has to be picked.
pub fn apply_action(
    action: UiAction,
    session: &mut SceneSession,
    editor: &mut EditorState,
) -> Option<UploadTarget> {
    match action {
        UiAction::AddShape(tag) => {
            session.add_object(tag);
        }
        UiAction::Upload(target) => {
            if editor.request_upload(target) {
                return Some(target);
            }
        }
        UiAction::TogglePaintingMode => {
            editor.toggle_painting_mode();
        }
        UiAction::SetBrushKind(kind) => editor.set_brush_kind(kind),
        UiAction::SetBrushColor(color) => editor.set_brush_color(color),
        UiAction::SetObjectColor(color) => editor.set_object_color(session, color),
        UiAction::SetTransformMode(mode) => editor.set_transform_mode(mode),
        UiAction::SetTransform(id, transform) => {
            if let Some(object) = session.object_mut(id) {
                object.transform = transform;
            }
        }
        UiAction::Placeholder(tool) => editor.use_placeholder(tool),
        UiAction::DismissNotice => {
            editor.dismiss_notice();
        }
    }
    None
}

pub fn show_panels(
    ctx: &egui::Context,
    session: &SceneSession,
    editor: &EditorState,
    textures: &TextureStore,
    pending_uploads: usize,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            add_shape_menu(ui, &mut actions);
            ui.menu_button("Upload", |ui| {
                for target in [
                    UploadTarget::Background,
                    UploadTarget::Reference,
                    UploadTarget::Model,
                    UploadTarget::Shader,
                ] {
                    if ui.button(target.label()).clicked() {
                        actions.push(UiAction::Upload(target));
                        ui.close_menu();
                    }
                }
            });
            ui.separator();
            ui.label(status_text(session, textures, pending_uploads));
        });
    });

    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            painting_section(ui, editor, textures, &mut actions);
            ui.separator();
            placeholder_section(ui, "Tools", &PlaceholderTool::TOOLS, &mut actions);
            ui.separator();
            placeholder_section(ui, "Modifiers", &PlaceholderTool::MODIFIERS, &mut actions);
        });

    if editor.properties_visible() {
        if let Some(object) = editor.selection().and_then(|id| session.object(id)) {
            egui::SidePanel::right("object_properties")
                .resizable(false)
                .default_width(220.0)
                .show(ctx, |ui| {
                    object_properties(
                        ui,
                        editor,
                        object,
                        session.auxiliary(object.id),
                        &mut actions,
                    );
                });
        }
    }

    if let Some(notice) = editor.current_notice() {
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(notice);
                if ui.button("OK").clicked() {
                    actions.push(UiAction::DismissNotice);
                }
            });
    }

    actions
}

fn status_text(session: &SceneSession, textures: &TextureStore, pending_uploads: usize) -> String {
    let mut text = format!("{} objects", session.objects().len());
    if !textures.is_empty() {
        text.push_str(&format!(", {} images", textures.len()));
    }
    if pending_uploads > 0 {
        text.push_str(&format!(", loading {pending_uploads}\u{2026}"));
    }
    text
}

fn object_summary(object: &SceneObject) -> String {
    format!(
        "{} shape, {} vertices, {} triangles",
        object.kind.category().title(),
        object.mesh.vertex_count(),
        object.mesh.triangle_count()
    )
}

fn add_shape_menu(ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
    ui.menu_button("Add Shape", |ui| {
        for category in ShapeCategory::ALL {
            ui.menu_button(category.title(), |ui| {
                for kind in category.kinds() {
                    if ui.button(kind.display_name()).clicked() {
                        actions.push(UiAction::AddShape(kind.tag()));
                        ui.close_menu();
                    }
                }
            });
        }
    });
}

fn painting_section(
    ui: &mut egui::Ui,
    editor: &EditorState,
    textures: &TextureStore,
    actions: &mut Vec<UiAction>,
) {
    ui.heading("Painting");
    let label = if editor.painting_mode() {
        "Exit Painting Mode"
    } else {
        "Enter Painting Mode"
    };
    if ui
        .add(egui::Button::new(label).selected(editor.painting_mode()))
        .clicked()
    {
        actions.push(UiAction::TogglePaintingMode);
    }

    for kind in BrushKind::ALL {
        if ui
            .selectable_label(editor.brush.kind == kind, kind.label())
            .clicked()
        {
            actions.push(UiAction::SetBrushKind(kind));
        }
    }

    ui.horizontal(|ui| {
        ui.label("Paint color");
        let mut color = editor.brush.color;
        if egui::color_picker::color_edit_button_srgb(ui, &mut color).changed() {
            actions.push(UiAction::SetBrushColor(color));
        }
    });

    ui.horizontal(|ui| {
        let texture = editor
            .brush
            .texture
            .and_then(|key| textures.name(key))
            .unwrap_or("none");
        ui.label(format!("Texture: {texture}"));
    });
    if ui.button("Upload Brush Texture").clicked() {
        actions.push(UiAction::Upload(UploadTarget::BrushTexture));
    }
}

fn placeholder_section(
    ui: &mut egui::Ui,
    title: &str,
    tools: &[PlaceholderTool],
    actions: &mut Vec<UiAction>,
) {
    ui.heading(title);
    ui.horizontal_wrapped(|ui| {
        for tool in tools {
            if ui.button(tool.label()).clicked() {
                actions.push(UiAction::Placeholder(*tool));
            }
        }
    });
}

fn object_properties(
    ui: &mut egui::Ui,
    editor: &EditorState,
    object: &SceneObject,
    auxiliary: Option<&AuxiliaryPair>,
    actions: &mut Vec<UiAction>,
) {
    ui.heading(object.name.as_str());
    ui.weak(object_summary(object));
    if let Some(pair) = auxiliary {
        let light = pair.light.position;
        ui.weak(format!("Light at ({:.2}, {:.2}, {:.2})", light.x, light.y, light.z));
    }
    ui.horizontal(|ui| {
        ui.label("Color");
        let mut color = editor.object_color();
        if egui::color_picker::color_edit_button_srgb(ui, &mut color).changed() {
            actions.push(UiAction::SetObjectColor(color));
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        for mode in TransformMode::ALL {
            if ui
                .selectable_label(editor.transform_mode() == mode, mode.label())
                .clicked()
            {
                actions.push(UiAction::SetTransformMode(mode));
            }
        }
    });

    let mut edited = object.transform;
    let mut position = edited.translation.to_array();
    let mut rotation = edited.rotation_deg().to_array();
    let mut scale = edited.scale.to_array();
    let mut changed = false;
    egui::Grid::new("transform_grid").num_columns(4).show(ui, |ui| {
        changed |= vec3_row(ui, "Position", &mut position, 0.05);
        changed |= vec3_row(ui, "Rotation", &mut rotation, 1.0);
        changed |= vec3_row(ui, "Scale", &mut scale, 0.05);
    });
    if changed {
        edited.translation = Vec3::from_array(position);
        edited.set_rotation_deg(Vec3::from_array(rotation));
        edited.scale = Vec3::from_array(scale).max(Vec3::splat(0.01));
        actions.push(UiAction::SetTransform(object.id, edited));
    }
}

fn vec3_row(ui: &mut egui::Ui, label: &str, values: &mut [f32; 3], speed: f64) -> bool {
    ui.label(label);
    let mut changed = false;
    for value in values.iter_mut() {
        changed |= ui
            .add(egui::DragValue::new(value).speed(speed).max_decimals(3))
            .changed();
    }
    ui.end_row();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ShapeKind;

    #[test]
    fn add_shape_action_uses_menu_tag() {
        let mut session = SceneSession::with_seed(3);
        let mut editor = EditorState::default();
        apply_action(UiAction::AddShape(ShapeKind::HollowTube.tag()), &mut session, &mut editor);
        assert_eq!(session.objects()[0].kind, ShapeKind::HollowTube);
        assert_eq!(session.auxiliaries().len(), 1);
    }

    #[test]
    fn image_uploads_need_a_file_and_stubs_do_not() {
        let mut session = SceneSession::with_seed(3);
        let mut editor = EditorState::default();
        assert_eq!(
            apply_action(UiAction::Upload(UploadTarget::Reference), &mut session, &mut editor),
            Some(UploadTarget::Reference)
        );
        assert_eq!(
            apply_action(UiAction::Upload(UploadTarget::Model), &mut session, &mut editor),
            None
        );
        assert!(editor.current_notice().is_some());
        apply_action(UiAction::DismissNotice, &mut session, &mut editor);
        assert!(editor.current_notice().is_none());
    }

    #[test]
    fn status_line_counts_images_and_pending_uploads() {
        let mut session = SceneSession::with_seed(3);
        session.add_shape(ShapeKind::Cube);
        let mut textures = TextureStore::new();
        assert_eq!(status_text(&session, &textures, 0), "1 objects");

        let bytes = crate::assets::tests::png_bytes([1, 2, 3, 255]);
        textures.insert(crate::assets::decode_image_bytes("tile.png", &bytes).unwrap());
        assert_eq!(
            status_text(&session, &textures, 2),
            "1 objects, 1 images, loading 2\u{2026}"
        );
    }

    #[test]
    fn summary_names_category_and_mesh_size() {
        let mut session = SceneSession::with_seed(3);
        let id = session.add_shape(ShapeKind::Triangle);
        assert_eq!(
            object_summary(session.object(id).unwrap()),
            "Basic shape, 3 vertices, 1 triangles"
        );
    }

    #[test]
    fn transform_edits_apply_to_the_object() {
        let mut session = SceneSession::with_seed(3);
        let mut editor = EditorState::default();
        let id = session.add_shape(ShapeKind::Cube);
        let moved = Transform::from_translation(Vec3::new(2.0, 0.5, 0.0));
        apply_action(UiAction::SetTransform(id, moved), &mut session, &mut editor);
        session.sync_auxiliaries();
        assert_eq!(session.object(id).unwrap().transform, moved);
        assert_eq!(session.auxiliary(id).unwrap().shadow.position.x, 2.0);
    }
}
