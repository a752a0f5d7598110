//! CPU ray casting against scene objects.
//!
//! Rays are tested against each object's world-space triangles after a
//! bounding-sphere reject. Only faces turned towards the ray count, the same
//! faces the scene painter draws.

use crate::scene::shapes::normal_matrix;
use crate::scene::{ObjectId, SceneObject};
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance to the nearest intersection with a sphere, if any lies ahead.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(0.0)
        } else {
            None
        }
    }

    /// Möller–Trumbore intersection, double-sided.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1e-7;
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let t_vec = self.origin - a;
        let u = t_vec.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = t_vec.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub object: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

pub fn intersect_object(ray: &Ray, object: &SceneObject) -> Option<f32> {
    let model = object.transform.matrix();
    let scale = object.transform.scale.abs().max_element();
    let radius = object.mesh.bounding_radius() * scale;
    ray.intersect_sphere(object.transform.translation, radius)?;
    intersect_mesh(ray, &model, object)
}

fn intersect_mesh(ray: &Ray, model: &Mat4, object: &SceneObject) -> Option<f32> {
    let normals = normal_matrix(model)?;
    let mesh = &object.mesh;
    let world: Vec<Vec3> = mesh
        .positions
        .iter()
        .map(|p| model.transform_point3(*p))
        .collect();
    mesh.triangles()
        .filter(|tri| ray.direction.dot(normals * mesh.face_normal(*tri)) < 0.0)
        .filter_map(|[a, b, c]| ray.intersect_triangle(world[a], world[b], world[c]))
        .min_by(f32::total_cmp)
}

/// Nearest object along the ray.
pub fn raycast<'a>(ray: &Ray, objects: impl IntoIterator<Item = &'a SceneObject>) -> Option<PickHit> {
    objects
        .into_iter()
        .filter_map(|object| {
            intersect_object(ray, object).map(|distance| PickHit {
                object: object.id,
                distance,
                point: ray.at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneSession, ShapeKind};

    #[test]
    fn triangle_hit_from_both_sides() {
        let (a, b, c) = (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!((front.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);
        assert!((back.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);

        let miss = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(miss.intersect_triangle(a, b, c).is_none());
        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(behind.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn ray_hits_cube_top_face() {
        let mut session = SceneSession::with_seed(5);
        let id = session.add_shape(ShapeKind::Cube);
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        let hit = raycast(&ray, session.objects()).expect("cube under the ray");
        assert_eq!(hit.object, id);
        // cube spans y in [0, 1]
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert!((hit.point.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn back_of_a_single_face_is_not_hit() {
        let mut session = SceneSession::with_seed(5);
        let id = session.add_shape(ShapeKind::Triangle);
        let front = Ray::new(Vec3::new(0.0, 0.5, 10.0), Vec3::NEG_Z);
        let behind = Ray::new(Vec3::new(0.0, 0.5, -10.0), Vec3::Z);
        assert_eq!(raycast(&front, session.objects()).unwrap().object, id);
        assert!(raycast(&behind, session.objects()).is_none());
    }

    #[test]
    fn nearest_object_wins() {
        let mut session = SceneSession::with_seed(5);
        let far = session.add_shape(ShapeKind::Sphere);
        let near = session.add_shape(ShapeKind::Cube);
        session.object_mut(far).unwrap().transform.translation = Vec3::new(0.0, 0.5, -4.0);
        session.object_mut(near).unwrap().transform.translation = Vec3::new(0.0, 0.5, 2.0);

        let ray = Ray::new(Vec3::new(0.0, 0.5, 10.0), Vec3::NEG_Z);
        assert_eq!(raycast(&ray, session.objects()).unwrap().object, near);
    }

    #[test]
    fn empty_space_misses() {
        let mut session = SceneSession::with_seed(5);
        session.add_shape(ShapeKind::Cube);
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::Y);
        assert!(raycast(&ray, session.objects()).is_none());
    }

    #[test]
    fn scaled_objects_grow_their_hit_area() {
        let mut session = SceneSession::with_seed(5);
        let id = session.add_shape(ShapeKind::Cube);
        let ray = Ray::new(Vec3::new(1.5, 10.0, 0.0), Vec3::NEG_Y);
        assert!(raycast(&ray, session.objects()).is_none());

        session.object_mut(id).unwrap().transform.scale = Vec3::splat(4.0);
        assert!(raycast(&ray, session.objects()).is_some());
    }
}
