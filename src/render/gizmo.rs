use super::camera::{OrbitCamera, ScreenProjector};
use crate::scene::{ObjectId, Transform};
use glam::{Quat, Vec2, Vec3};

/// On-screen handle length in pixels.
const HANDLE_PIXELS: f32 = 90.0;
/// Pointer distance in pixels that still counts as touching a handle.
const HIT_RADIUS: f32 = 8.0;
const RING_SEGMENTS: usize = 48;
const MIN_SCALE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [Self::Translate, Self::Rotate, Self::Scale];

    pub fn label(self) -> &'static str {
        match self {
            Self::Translate => "Move",
            Self::Rotate => "Rotate",
            Self::Scale => "Scale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [Self::X, Self::Y, Self::Z];

    pub fn vector(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            Self::X => [0xe0, 0x40, 0x40],
            Self::Y => [0x40, 0xd0, 0x40],
            Self::Z => [0x40, 0x70, 0xf0],
        }
    }

    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Screen-space polyline for one handle.
#[derive(Debug, Clone)]
pub struct GizmoHandle {
    pub axis: GizmoAxis,
    pub points: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    axis: GizmoAxis,
    start_pointer: Vec2,
    start_transform: Transform,
    origin_screen: Vec2,
    /// Screen displacement of one handle length along the axis.
    axis_screen: Vec2,
    handle_len: f32,
    facing_camera: bool,
}

/// Translate/rotate/scale handles attached to at most one object.
#[derive(Debug, Default)]
pub struct TransformGizmo {
    mode: TransformMode,
    attached: Option<ObjectId>,
    hovered: Option<GizmoAxis>,
    drag: Option<DragState>,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
        self.drag = None;
    }

    pub fn attach(&mut self, object: ObjectId) {
        if self.attached != Some(object) {
            self.drag = None;
        }
        self.attached = Some(object);
    }

    pub fn detach(&mut self) {
        self.attached = None;
        self.hovered = None;
        self.drag = None;
    }

    pub fn attached(&self) -> Option<ObjectId> {
        self.attached
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Axis being dragged, else the hovered one.
    pub fn highlighted(&self) -> Option<GizmoAxis> {
        self.drag.map(|drag| drag.axis).or(self.hovered)
    }

    pub fn set_hovered(&mut self, axis: Option<GizmoAxis>) {
        self.hovered = axis;
    }

    pub fn handle_length(camera: &OrbitCamera, projector: &ScreenProjector, origin: Vec3) -> f32 {
        let depth = (origin - camera.eye()).dot(camera.forward());
        camera.world_per_pixel(depth, projector.size().y) * HANDLE_PIXELS
    }

    pub fn handles(
        &self,
        camera: &OrbitCamera,
        projector: &ScreenProjector,
        origin: Vec3,
    ) -> Vec<GizmoHandle> {
        let len = Self::handle_length(camera, projector, origin);
        GizmoAxis::ALL
            .into_iter()
            .filter_map(|axis| {
                let points = match self.mode {
                    TransformMode::Translate | TransformMode::Scale => {
                        let start = projector.project(origin)?.pos;
                        let end = projector.project(origin + axis.vector() * len)?.pos;
                        vec![start, end]
                    }
                    TransformMode::Rotate => ring_points(axis, origin, len, projector)?,
                };
                Some(GizmoHandle { axis, points })
            })
            .collect()
    }

    pub fn hit_test(
        &self,
        camera: &OrbitCamera,
        projector: &ScreenProjector,
        origin: Vec3,
        pointer: Vec2,
    ) -> Option<GizmoAxis> {
        self.attached?;
        self.handles(camera, projector, origin)
            .into_iter()
            .map(|handle| (handle.axis, polyline_distance(&handle.points, pointer)))
            .filter(|(_, distance)| *distance <= HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }

    /// Starts dragging `axis`; fails when the axis points straight at the camera.
    pub fn begin_drag(
        &mut self,
        axis: GizmoAxis,
        pointer: Vec2,
        transform: Transform,
        camera: &OrbitCamera,
        projector: &ScreenProjector,
    ) -> bool {
        if self.attached.is_none() {
            return false;
        }
        let origin = transform.translation;
        let handle_len = Self::handle_length(camera, projector, origin);
        let (Some(start), Some(end)) = (
            projector.project(origin),
            projector.project(origin + axis.vector() * handle_len),
        ) else {
            return false;
        };
        let axis_screen = end.pos - start.pos;
        if self.mode != TransformMode::Rotate && axis_screen.length() < 1e-3 {
            return false;
        }
        self.drag = Some(DragState {
            axis,
            start_pointer: pointer,
            start_transform: transform,
            origin_screen: start.pos,
            axis_screen,
            handle_len,
            facing_camera: axis.vector().dot(camera.eye() - origin) > 0.0,
        });
        true
    }

    /// Transform implied by the pointer's current position, relative to the drag start.
    pub fn drag_to(&self, pointer: Vec2) -> Option<Transform> {
        let drag = self.drag?;
        let mut transform = drag.start_transform;
        match self.mode {
            TransformMode::Translate => {
                let along = axis_travel(&drag, pointer);
                transform.translation += drag.axis.vector() * along;
            }
            TransformMode::Scale => {
                let factor = 1.0 + axis_travel(&drag, pointer) / drag.handle_len;
                let index = drag.axis.index();
                transform.scale[index] = (drag.start_transform.scale[index] * factor).max(MIN_SCALE);
            }
            TransformMode::Rotate => {
                let from = drag.start_pointer - drag.origin_screen;
                let to = pointer - drag.origin_screen;
                if from.length() < 1.0 || to.length() < 1.0 {
                    return Some(transform);
                }
                // screen y points down, so a positive perp_dot is a clockwise sweep
                let clockwise = from.perp_dot(to).atan2(from.dot(to));
                let sign = if drag.facing_camera { -1.0 } else { 1.0 };
                let rotation = Quat::from_axis_angle(drag.axis.vector(), clockwise * sign);
                transform.rotation = (rotation * drag.start_transform.rotation).normalize();
            }
        }
        Some(transform)
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

fn axis_travel(drag: &DragState, pointer: Vec2) -> f32 {
    let pixels_per_len = drag.axis_screen.length();
    if pixels_per_len < 1e-3 {
        return 0.0;
    }
    let along_px = (pointer - drag.start_pointer).dot(drag.axis_screen / pixels_per_len);
    along_px / pixels_per_len * drag.handle_len
}

fn ring_points(
    axis: GizmoAxis,
    origin: Vec3,
    radius: f32,
    projector: &ScreenProjector,
) -> Option<Vec<Vec2>> {
    let normal = axis.vector();
    let u = normal.any_orthonormal_vector();
    let v = normal.cross(u);
    let mut points = Vec::with_capacity(RING_SEGMENTS + 1);
    for i in 0..=RING_SEGMENTS {
        let angle = i as f32 / RING_SEGMENTS as f32 * std::f32::consts::TAU;
        let world = origin + (u * angle.cos() + v * angle.sin()) * radius;
        points.push(projector.project(world)?.pos);
    }
    Some(points)
}

fn polyline_distance(points: &[Vec2], pointer: Vec2) -> f32 {
    points
        .windows(2)
        .map(|segment| segment_distance(segment[0], segment[1], pointer))
        .fold(f32::INFINITY, f32::min)
}

fn segment_distance(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
