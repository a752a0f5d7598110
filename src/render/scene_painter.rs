//! Paints the scene through egui: triangles are lit per face on the CPU,
//! projected, sorted back to front and emitted as textured egui meshes.

use super::camera::{OrbitCamera, ScreenProjector};
use super::gizmo::{TransformGizmo, TransformMode};
use super::light_helpers;
use crate::assets::{TextureKey, TextureStore};
use crate::scene::shapes::{self, MeshData};
use crate::scene::{
    Background, ObjectId, PointLightProxy, Rgb, SceneSession, Transform, DEFAULT_BACKGROUND,
};
use egui::epaint::{Mesh, Vertex, WHITE_UV};
use egui::{Color32, Pos2, Rect, Shape, Stroke, TextureId};
use glam::{Mat4, Quat, Vec2, Vec3};

const AMBIENT: f32 = 0.5;
const DIRECTIONAL: f32 = 0.5;
/// Direction towards the overhead directional light at (0, 10, 0).
const DIRECTIONAL_DIR: Vec3 = Vec3::Y;
const GRID_CENTER_COLOR: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
const GRID_COLOR: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);
const GRID_SUBDIVISIONS: usize = 16;
const HIGHLIGHT: Color32 = Color32::from_rgb(0xff, 0xe0, 0x40);
const OUTLINE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct PaintOptions {
    pub show_light_helpers: bool,
    pub grid_size: f32,
    pub grid_divisions: u32,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            show_light_helpers: false,
            grid_size: 20.0,
            grid_divisions: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleSource {
    Object(ObjectId),
    Shadow(ObjectId),
    Reference,
    LightHelper,
}

#[derive(Debug, Clone, Copy)]
pub struct PaintTriangle {
    pub source: TriangleSource,
    pub points: [Vec2; 3],
    pub uvs: [Vec2; 3],
    pub color: Color32,
    pub depth: f32,
    pub texture: TextureId,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Faces {
    Front,
    Double,
}

enum Surface {
    Lit { color: Rgb, receive_shadow: bool },
    Unlit(Color32),
}

/// Bounding sphere of an object that casts a shadow.
#[derive(Debug, Clone, Copy)]
struct Occluder {
    object: ObjectId,
    center: Vec3,
    radius: f32,
}

impl Occluder {
    /// Whether this object sits between `point` and the overhead light.
    fn covers(&self, point: Vec3) -> bool {
        let dx = self.center.x - point.x;
        let dz = self.center.z - point.z;
        self.center.y > point.y && dx * dx + dz * dz < self.radius * self.radius
    }
}

struct Lighting<'a> {
    lights: &'a [PointLightProxy],
    occluders: &'a [Occluder],
}

struct DrawItem<'a> {
    source: TriangleSource,
    mesh: &'a MeshData,
    model: Mat4,
    surface: Surface,
    texture: Option<TextureId>,
    faces: Faces,
}

pub fn paint_scene(
    painter: &egui::Painter,
    camera: &OrbitCamera,
    projector: &ScreenProjector,
    session: &SceneSession,
    textures: &TextureStore,
    gizmo: &TransformGizmo,
    selection: Option<ObjectId>,
    options: &PaintOptions,
) {
    let rect = painter.clip_rect();
    paint_background(painter, rect, session.background(), textures);
    paint_grid(painter, projector, options);

    let triangles = collect_triangles(camera, projector, session, textures, selection, options);
    for mesh in batch_meshes(&triangles) {
        painter.add(Shape::mesh(mesh));
    }
    if let Some(selected) = selection {
        painter.extend(selection_outline(&triangles, selected));
    }

    if let Some(object) = gizmo.attached().and_then(|id| session.object(id)) {
        paint_gizmo(painter, camera, projector, gizmo, object.position());
    }
}

/// Wireframe over the selected object's visible triangles.
fn selection_outline(triangles: &[PaintTriangle], selected: ObjectId) -> Vec<Shape> {
    let stroke = Stroke::new(OUTLINE_WIDTH, HIGHLIGHT.gamma_multiply(0.5));
    triangles
        .iter()
        .filter(|triangle| triangle.source == TriangleSource::Object(selected))
        .map(|triangle| Shape::closed_line(triangle.points.map(pos2).to_vec(), stroke))
        .collect()
}

fn paint_background(
    painter: &egui::Painter,
    rect: Rect,
    background: Background,
    textures: &TextureStore,
) {
    let fallback = color32(DEFAULT_BACKGROUND);
    match background {
        Background::Color(rgb) => {
            painter.rect_filled(rect, 0.0, color32(rgb));
        }
        Background::Texture(key) => match textures.texture_id(key) {
            Some(texture) => {
                painter.image(
                    texture,
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                painter.rect_filled(rect, 0.0, fallback);
            }
        },
    }
}

fn paint_grid(painter: &egui::Painter, projector: &ScreenProjector, options: &PaintOptions) {
    let divisions = options.grid_divisions.max(1);
    let half = options.grid_size * 0.5;
    let step = options.grid_size / divisions as f32;
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        let color = if i * 2 == divisions {
            GRID_CENTER_COLOR
        } else {
            GRID_COLOR
        };
        let stroke = Stroke::new(1.0, color);
        paint_world_line(
            painter,
            projector,
            Vec3::new(offset, 0.0, -half),
            Vec3::new(offset, 0.0, half),
            stroke,
        );
        paint_world_line(
            painter,
            projector,
            Vec3::new(-half, 0.0, offset),
            Vec3::new(half, 0.0, offset),
            stroke,
        );
    }
}

/// Splits the line so the parts in front of the camera still draw when an end is behind it.
fn paint_world_line(
    painter: &egui::Painter,
    projector: &ScreenProjector,
    from: Vec3,
    to: Vec3,
    stroke: Stroke,
) {
    let mut previous: Option<Vec2> = None;
    for step in 0..=GRID_SUBDIVISIONS {
        let t = step as f32 / GRID_SUBDIVISIONS as f32;
        let current = projector.project(from.lerp(to, t)).map(|p| p.pos);
        if let (Some(a), Some(b)) = (previous, current) {
            painter.line_segment([pos2(a), pos2(b)], stroke);
        }
        previous = current;
    }
}

pub fn collect_triangles(
    camera: &OrbitCamera,
    projector: &ScreenProjector,
    session: &SceneSession,
    textures: &TextureStore,
    selection: Option<ObjectId>,
    options: &PaintOptions,
) -> Vec<PaintTriangle> {
    let lights: Vec<PointLightProxy> = session.auxiliaries().iter().map(|pair| pair.light).collect();
    let occluders: Vec<Occluder> = session
        .objects()
        .iter()
        .filter(|object| object.cast_shadow)
        .map(|object| Occluder {
            object: object.id,
            center: object.position(),
            radius: object.mesh.bounding_radius() * object.transform.scale.max_element(),
        })
        .collect();
    let disc = shapes::circle_mesh(1.0, 32);
    let plane = shapes::plane_mesh(1.0, 1.0);
    let helper = light_helpers::octahedron();
    let texture_of = |key: Option<TextureKey>| key.and_then(|key| textures.texture_id(key));

    let mut items: Vec<DrawItem<'_>> = Vec::new();
    for object in session.objects() {
        items.push(DrawItem {
            source: TriangleSource::Object(object.id),
            mesh: &object.mesh,
            model: object.transform.matrix(),
            surface: Surface::Lit {
                color: object.material.color,
                receive_shadow: object.receive_shadow,
            },
            texture: texture_of(object.material.map),
            faces: Faces::Front,
        });
    }
    let flat = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
    for pair in session.auxiliaries() {
        if !session.object(pair.object).is_some_and(|object| object.cast_shadow) {
            continue;
        }
        let shadow = Transform {
            translation: pair.shadow.position,
            rotation: flat,
            scale: Vec3::splat(pair.shadow.radius),
        };
        items.push(DrawItem {
            source: TriangleSource::Shadow(pair.object),
            mesh: &disc,
            model: shadow.matrix(),
            surface: Surface::Unlit(Color32::from_black_alpha(
                (pair.shadow.opacity * 255.0) as u8,
            )),
            texture: None,
            faces: Faces::Front,
        });
    }
    for reference in session.reference_planes() {
        let transform = Transform {
            translation: reference.position,
            scale: Vec3::new(reference.size, reference.size, 1.0),
            ..Transform::default()
        };
        items.push(DrawItem {
            source: TriangleSource::Reference,
            mesh: &plane,
            model: transform.matrix(),
            surface: Surface::Unlit(Color32::WHITE),
            texture: texture_of(Some(reference.texture)),
            faces: Faces::Double,
        });
    }
    let helper_specs = if options.show_light_helpers {
        let selected = session
            .auxiliaries()
            .iter()
            .position(|pair| Some(pair.object) == selection);
        light_helpers::helper_specs(&lights, camera.eye(), selected)
    } else {
        Vec::new()
    };
    for spec in &helper_specs {
        items.push(DrawItem {
            source: TriangleSource::LightHelper,
            mesh: &helper,
            model: spec.transform.matrix(),
            surface: Surface::Unlit(color32(spec.color)),
            texture: None,
            faces: Faces::Front,
        });
    }

    let eye = camera.eye();
    let lighting = Lighting {
        lights: &lights,
        occluders: &occluders,
    };
    let mut triangles = Vec::new();
    for item in &items {
        emit_triangles(item, eye, projector, &lighting, &mut triangles);
    }
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    triangles
}

fn emit_triangles(
    item: &DrawItem<'_>,
    eye: Vec3,
    projector: &ScreenProjector,
    lighting: &Lighting<'_>,
    out: &mut Vec<PaintTriangle>,
) {
    let Some(normal_matrix) = shapes::normal_matrix(&item.model) else {
        return;
    };
    let world: Vec<Vec3> = item
        .mesh
        .positions
        .iter()
        .map(|p| item.model.transform_point3(*p))
        .collect();
    let projected: Vec<_> = world.iter().map(|p| projector.project(*p)).collect();

    for [a, b, c] in item.mesh.triangles() {
        let (Some(pa), Some(pb), Some(pc)) = (projected[a], projected[b], projected[c]) else {
            continue;
        };
        let center = (world[a] + world[b] + world[c]) / 3.0;
        let mut normal = (normal_matrix * item.mesh.face_normal([a, b, c])).normalize_or_zero();
        let facing_away = (center - eye).dot(normal) >= 0.0;
        if facing_away {
            match item.faces {
                Faces::Front => continue,
                Faces::Double => normal = -normal,
            }
        }
        let color = match item.surface {
            Surface::Lit {
                color,
                receive_shadow,
            } => {
                let shadowed = receive_shadow
                    && lighting.occluders.iter().any(|occluder| {
                        item.source != TriangleSource::Object(occluder.object)
                            && occluder.covers(center)
                    });
                let light = light_intensity(center, normal, !shadowed, lighting.lights);
                shade(color, light)
            }
            Surface::Unlit(color) => color,
        };
        let (texture, uvs) = match item.texture {
            Some(texture) => (
                texture,
                [item.mesh.uvs[a], item.mesh.uvs[b], item.mesh.uvs[c]],
            ),
            None => {
                let white = Vec2::new(WHITE_UV.x, WHITE_UV.y);
                (TextureId::default(), [white; 3])
            }
        };
        out.push(PaintTriangle {
            source: item.source,
            points: [pa.pos, pb.pos, pc.pos],
            uvs,
            color,
            depth: (pa.depth + pb.depth + pc.depth) / 3.0,
            texture,
        });
    }
}

/// Per-channel light reaching a surface: white ambient, the overhead
/// directional light unless it is blocked, and tinted point lights.
pub fn light_intensity(
    point: Vec3,
    normal: Vec3,
    sun_visible: bool,
    lights: &[PointLightProxy],
) -> Vec3 {
    let mut white = AMBIENT;
    if sun_visible {
        white += DIRECTIONAL * normal.dot(DIRECTIONAL_DIR).max(0.0);
    }
    let mut intensity = Vec3::splat(white);
    for light in lights {
        let to_light = light.position - point;
        let distance = to_light.length();
        if distance <= f32::EPSILON || distance >= light.range {
            continue;
        }
        let falloff = (1.0 - distance / light.range).powi(2);
        let lambert = normal.dot(to_light / distance).max(0.0);
        let tint = Vec3::from_array(light.color.map(|c| c as f32 / 255.0));
        intensity += tint * (light.intensity * lambert * falloff);
    }
    intensity
}

fn shade(rgb: Rgb, light: Vec3) -> Color32 {
    let lit = Vec3::from_array(rgb.map(f32::from)) * light;
    let [r, g, b] = lit.to_array().map(|c| c.round().clamp(0.0, 255.0) as u8);
    Color32::from_rgb(r, g, b)
}

/// Groups consecutive triangles sharing a texture into egui meshes, preserving order.
pub fn batch_meshes(triangles: &[PaintTriangle]) -> Vec<Mesh> {
    let mut meshes: Vec<Mesh> = Vec::new();
    for triangle in triangles {
        let reuse = meshes
            .last()
            .is_some_and(|mesh| mesh.texture_id == triangle.texture);
        if !reuse {
            meshes.push(Mesh::with_texture(triangle.texture));
        }
        let Some(mesh) = meshes.last_mut() else {
            continue;
        };
        let base = mesh.vertices.len() as u32;
        for (point, uv) in triangle.points.iter().zip(triangle.uvs.iter()) {
            mesh.vertices.push(Vertex {
                pos: pos2(*point),
                uv: pos2(*uv),
                color: triangle.color,
            });
        }
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    meshes
}

fn paint_gizmo(
    painter: &egui::Painter,
    camera: &OrbitCamera,
    projector: &ScreenProjector,
    gizmo: &TransformGizmo,
    origin: Vec3,
) {
    let highlighted = gizmo.highlighted();
    for handle in gizmo.handles(camera, projector, origin) {
        let color = if highlighted == Some(handle.axis) {
            HIGHLIGHT
        } else {
            color32(handle.axis.color())
        };
        let stroke = Stroke::new(3.0, color);
        let points: Vec<Pos2> = handle.points.iter().map(|p| pos2(*p)).collect();
        let Some(tip) = points.last().copied() else {
            continue;
        };
        painter.add(Shape::line(points, stroke));
        match gizmo.mode() {
            TransformMode::Translate => {
                painter.circle_filled(tip, 5.0, color);
            }
            TransformMode::Scale => {
                painter.rect_filled(Rect::from_center_size(tip, egui::vec2(9.0, 9.0)), 0.0, color);
            }
            TransformMode::Rotate => {}
        }
    }
}

pub fn color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

fn pos2(v: Vec2) -> Pos2 {
    Pos2::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ShapeKind;

    fn projector(camera: &OrbitCamera) -> ScreenProjector {
        ScreenProjector::new(camera, Vec2::ZERO, Vec2::new(800.0, 600.0))
    }

    fn triangles_for(session: &SceneSession, selection: Option<ObjectId>) -> Vec<PaintTriangle> {
        let camera = OrbitCamera::default();
        collect_triangles(
            &camera,
            &projector(&camera),
            session,
            &TextureStore::new(),
            selection,
            &PaintOptions::default(),
        )
    }

    fn white_light(position: Vec3) -> PointLightProxy {
        PointLightProxy {
            position,
            color: [255, 255, 255],
            intensity: 0.5,
            range: 10.0,
        }
    }

    #[test]
    fn cube_shows_at_most_three_faces() {
        let mut session = SceneSession::with_seed(4);
        let id = session.add_shape(ShapeKind::Cube);
        let triangles = triangles_for(&session, None);
        let cube = triangles
            .iter()
            .filter(|t| t.source == TriangleSource::Object(id))
            .count();
        assert!(cube > 0 && cube <= 6);
        assert!(triangles
            .iter()
            .any(|t| t.source == TriangleSource::Shadow(id)));
        assert!(!triangles
            .iter()
            .any(|t| t.source == TriangleSource::LightHelper));
    }

    #[test]
    fn shadow_disc_follows_cast_shadow_flag() {
        let mut session = SceneSession::with_seed(4);
        let id = session.add_shape(ShapeKind::Cube);
        session.object_mut(id).unwrap().cast_shadow = false;
        let triangles = triangles_for(&session, None);
        assert!(!triangles
            .iter()
            .any(|t| t.source == TriangleSource::Shadow(id)));
        assert!(triangles
            .iter()
            .any(|t| t.source == TriangleSource::Object(id)));
    }

    #[test]
    fn objects_under_a_caster_lose_the_overhead_light() {
        let mut session = SceneSession::with_seed(4);
        let below = session.add_shape(ShapeKind::Cube);
        let above = session.add_shape(ShapeKind::Cube);
        session.object_mut(above).unwrap().transform.translation = Vec3::new(0.0, 2.5, 0.0);
        session.object_mut(below).unwrap().material.color = [100, 100, 100];
        let top_face = |triangles: &[PaintTriangle]| {
            triangles
                .iter()
                .filter(|t| t.source == TriangleSource::Object(below))
                .map(|t| t.color.r())
                .max()
                .unwrap()
        };

        let shaded = top_face(&triangles_for(&session, None));
        session.object_mut(below).unwrap().receive_shadow = false;
        let unshaded = top_face(&triangles_for(&session, None));
        assert!(shaded < unshaded);

        session.object_mut(below).unwrap().receive_shadow = true;
        session.object_mut(above).unwrap().cast_shadow = false;
        assert_eq!(top_face(&triangles_for(&session, None)), unshaded);
    }

    #[test]
    fn triangles_are_sorted_far_to_near() {
        let camera = OrbitCamera::default();
        let mut session = SceneSession::with_seed(4);
        session.add_shape(ShapeKind::Sphere);
        let options = PaintOptions {
            show_light_helpers: true,
            ..PaintOptions::default()
        };
        let triangles = collect_triangles(
            &camera,
            &projector(&camera),
            &session,
            &TextureStore::new(),
            None,
            &options,
        );
        assert!(triangles.windows(2).all(|w| w[0].depth >= w[1].depth));
        assert!(triangles
            .iter()
            .any(|t| t.source == TriangleSource::LightHelper));
    }

    #[test]
    fn outline_covers_only_the_selected_object() {
        let mut session = SceneSession::with_seed(4);
        let cube = session.add_shape(ShapeKind::Cube);
        let other = session.add_shape(ShapeKind::Sphere);
        session.object_mut(other).unwrap().transform.translation = Vec3::new(3.0, 0.5, 0.0);
        let triangles = triangles_for(&session, Some(cube));

        let visible = triangles
            .iter()
            .filter(|t| t.source == TriangleSource::Object(cube))
            .count();
        assert_eq!(selection_outline(&triangles, cube).len(), visible);
        let missing = session.add_shape(ShapeKind::Cube);
        assert!(selection_outline(&triangles, missing).is_empty());
    }

    #[test]
    fn lighting_combines_ambient_directional_and_points() {
        let up = light_intensity(Vec3::ZERO, Vec3::Y, true, &[]);
        let down = light_intensity(Vec3::ZERO, Vec3::NEG_Y, true, &[]);
        assert!((up - Vec3::ONE).abs().max_element() < 1e-6);
        assert!((down - Vec3::splat(0.5)).abs().max_element() < 1e-6);
        let blocked = light_intensity(Vec3::ZERO, Vec3::Y, false, &[]);
        assert!((blocked - Vec3::splat(0.5)).abs().max_element() < 1e-6);

        let light = white_light(Vec3::new(0.0, -3.0, 0.0));
        let lit = light_intensity(Vec3::ZERO, Vec3::NEG_Y, true, &[light]);
        // (1 - 3/10)^2 * 0.5 on every channel
        assert!((lit - Vec3::splat(0.5 + 0.245)).abs().max_element() < 1e-5);
        let out_of_range = white_light(Vec3::new(0.0, -30.0, 0.0));
        assert_eq!(
            light_intensity(Vec3::ZERO, Vec3::NEG_Y, true, &[out_of_range]),
            down
        );
    }

    #[test]
    fn point_lights_tint_by_their_color() {
        let red = PointLightProxy {
            color: [255, 0, 0],
            ..white_light(Vec3::new(0.0, 3.0, 0.0))
        };
        let light = light_intensity(Vec3::ZERO, Vec3::Y, true, &[red]);
        assert!(light.x > light.y);
        assert!((light.y - light.z).abs() < 1e-6);

        let grey = shade([100, 100, 100], light);
        assert!(grey.r() > grey.g());
        assert_eq!(grey.g(), grey.b());
    }

    #[test]
    fn batching_splits_on_texture_changes() {
        let tri = |texture| PaintTriangle {
            source: TriangleSource::Reference,
            points: [Vec2::ZERO, Vec2::X, Vec2::Y],
            uvs: [Vec2::ZERO; 3],
            color: Color32::WHITE,
            depth: 1.0,
            texture,
        };
        let a = TextureId::default();
        let b = TextureId::User(7);
        let meshes = batch_meshes(&[tri(a), tri(a), tri(b), tri(a)]);
        assert_eq!(meshes.len(), 3);
        assert_eq!(meshes[0].indices.len(), 6);
        assert_eq!(meshes[1].texture_id, b);
    }
}
