use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use super::pick::Ray;

pub const FOV_Y_DEG: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 200.0;
const PITCH_LIMIT: f32 = 1.55;

#[derive(Debug, Clone, Copy, Default)]
pub struct CameraMovement {
    pub aim_left: bool,
    pub aim_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
}

/// Camera orbiting a target point; yaw/pitch describe the direction from target to eye.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
}

impl OrbitCamera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(MIN_DISTANCE);
        let (yaw, pitch) = offset_to_yaw_pitch(offset);
        Self {
            target,
            yaw,
            pitch,
            distance,
            fov_y: FOV_Y_DEG.to_radians(),
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.offset_dir() * self.distance
    }

    pub fn forward(&self) -> Vec3 {
        -self.offset_dir()
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (forward, right, up)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), NEAR, FAR)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = wrap_angle(self.yaw + yaw_delta);
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Multiplies the orbit distance; factors below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Slides the target in the view plane; deltas are in world units at the target.
    pub fn pan(&mut self, right: f32, up: f32) {
        let (_, right_dir, up_dir) = self.basis();
        self.target += right_dir * right + up_dir * up;
    }

    pub fn update_movement(&mut self, input: &CameraMovement, frame_dt: f32) -> bool {
        let aim_speed = 1.8 * frame_dt;
        let mut yaw = 0.0;
        let mut pitch = 0.0;
        if input.aim_left {
            yaw -= aim_speed;
        }
        if input.aim_right {
            yaw += aim_speed;
        }
        if input.aim_up {
            pitch += aim_speed;
        }
        if input.aim_down {
            pitch -= aim_speed;
        }
        if yaw == 0.0 && pitch == 0.0 {
            return false;
        }
        self.orbit(yaw, pitch);
        true
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let inverse = self.view_projection(aspect).inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        Ray::new(near, far - near)
    }

    /// World units covered by one screen pixel at the given depth along the view axis.
    pub fn world_per_pixel(&self, depth: f32, viewport_height: f32) -> f32 {
        2.0 * depth.max(NEAR) * (self.fov_y * 0.5).tan() / viewport_height.max(1.0)
    }

    fn offset_dir(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        Vec3::new(
            self.yaw.sin() * cos_pitch,
            self.pitch.sin(),
            self.yaw.cos() * cos_pitch,
        )
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub pos: Vec2,
    /// Clip-space w, i.e. distance along the view axis.
    pub depth: f32,
}

/// Maps world points onto a screen rectangle for one camera.
#[derive(Debug, Clone, Copy)]
pub struct ScreenProjector {
    view_proj: Mat4,
    origin: Vec2,
    size: Vec2,
}

impl ScreenProjector {
    pub fn new(camera: &OrbitCamera, origin: Vec2, size: Vec2) -> Self {
        let size = size.max(Vec2::ONE);
        Self {
            view_proj: camera.view_projection(size.x / size.y),
            origin,
            size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn aspect(&self) -> f32 {
        self.size.x / self.size.y
    }

    /// `None` for points at or behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<ProjectedPoint> {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w <= NEAR * 0.5 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(ProjectedPoint {
            pos: self.origin
                + Vec2::new(
                    (ndc.x + 1.0) * 0.5 * self.size.x,
                    (1.0 - ndc.y) * 0.5 * self.size.y,
                ),
            depth: clip.w,
        })
    }

    pub fn ndc_of(&self, screen: Vec2) -> Vec2 {
        pointer_to_ndc(screen - self.origin, self.size)
    }
}

/// Pointer position in pixels to normalized device coordinates (+Y up).
pub fn pointer_to_ndc(pointer: Vec2, viewport_size: Vec2) -> Vec2 {
    let size = viewport_size.max(Vec2::ONE);
    Vec2::new(
        pointer.x / size.x * 2.0 - 1.0,
        -(pointer.y / size.y) * 2.0 + 1.0,
    )
}

fn offset_to_yaw_pitch(offset: Vec3) -> (f32, f32) {
    let dir = offset.normalize_or_zero();
    if dir == Vec3::ZERO {
        return (0.0, 0.0);
    }
    let yaw = dir.x.atan2(dir.z);
    let pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    (yaw, pitch)
}

fn wrap_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        (angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_matches_editor_start() {
        let camera = OrbitCamera::default();
        assert!((camera.eye() - Vec3::new(0.0, 5.0, 10.0)).length() < 1e-4);
        assert!(camera.target.length() < 1e-6);
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = OrbitCamera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO, 16.0 / 9.0);
        let expected = (camera.target - camera.eye()).normalize();
        assert!(ray.direction.dot(expected) > 0.9999);
        assert!((ray.origin - camera.eye()).length() < 0.2);
    }

    #[test]
    fn movement_update_keeps_finite_values() {
        let mut camera = OrbitCamera::default();
        let movement = CameraMovement {
            aim_left: false,
            aim_right: true,
            aim_up: true,
            aim_down: false,
        };
        assert!(camera.update_movement(&movement, 1.0 / 60.0));
        assert!(camera.eye().is_finite());
        assert!(!camera.update_movement(&CameraMovement::default(), 1.0 / 60.0));
    }

    #[test]
    fn orbit_preserves_distance_and_clamps_pitch() {
        let mut camera = OrbitCamera::default();
        let before = camera.distance;
        camera.orbit(0.7, 10.0);
        assert!(((camera.eye() - camera.target).length() - before).abs() < 1e-4);
        assert!(camera.pitch <= PITCH_LIMIT);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1e-6);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(f32::NAN);
        assert_eq!(camera.distance, MIN_DISTANCE);
    }

    #[test]
    fn projector_puts_target_at_viewport_center() {
        let camera = OrbitCamera::default();
        let projector =
            ScreenProjector::new(&camera, Vec2::new(100.0, 50.0), Vec2::new(800.0, 600.0));
        let projected = projector.project(camera.target).unwrap();
        assert!((projected.pos - Vec2::new(500.0, 350.0)).length() < 1e-3);
        assert!((projected.depth - camera.distance).abs() < 1e-3);
        assert!(projector.project(camera.eye() + camera.forward() * -1.0).is_none());
    }

    #[test]
    fn pointer_ndc_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(size, size), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(size * 0.5, size), Vec2::ZERO);
    }
}
