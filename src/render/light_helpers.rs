use crate::scene::shapes::MeshData;
use crate::scene::{PointLightProxy, Rgb, Transform};
use glam::{Vec2, Vec3};

/// Placement and tint of one point-light marker.
#[derive(Debug, Clone, Copy)]
pub struct LightHelperSpec {
    pub transform: Transform,
    pub color: Rgb,
}

pub fn helper_specs(lights: &[PointLightProxy], camera_position: Vec3, selected: Option<usize>) -> Vec<LightHelperSpec> {
    lights
        .iter()
        .enumerate()
        .map(|(index, light)| {
            let distance = (light.position - camera_position).length().max(0.1);
            let scale = (distance * 0.075).clamp(0.12, 3.0) * 0.5;
            let boost = if selected == Some(index) { 1.20 } else { 1.0 };
            let base = [0.45f32, 0.90, 1.0];
            LightHelperSpec {
                transform: Transform {
                    translation: light.position,
                    scale: Vec3::splat(scale),
                    ..Transform::default()
                },
                color: base.map(|c| ((c * boost).clamp(0.0, 1.0) * 255.0) as u8),
            }
        })
        .collect()
}

pub fn octahedron() -> MeshData {
    let positions = [
        Vec3::new(0.0, 0.6, 0.0),
        Vec3::new(0.0, -0.6, 0.0),
        Vec3::new(0.6, 0.0, 0.0),
        Vec3::new(-0.6, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.6),
        Vec3::new(0.0, 0.0, -0.6),
    ];
    let indices: [u32; 24] = [
        0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 4, 2, 1, 3, 4, 1, 5, 3, 1, 2, 5,
    ];
    MeshData {
        normals: positions.iter().map(|p| p.normalize()).collect(),
        uvs: vec![Vec2::ZERO; positions.len()],
        positions: positions.to_vec(),
        indices: indices.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_scale_grows_with_distance() {
        let light = |z: f32| PointLightProxy {
            position: Vec3::new(0.0, 0.0, z),
            color: [255, 255, 255],
            intensity: 0.5,
            range: 10.0,
        };
        let specs = helper_specs(&[light(-5.0), light(-30.0)], Vec3::ZERO, Some(1));
        assert_eq!(specs.len(), 2);
        assert!(specs[1].transform.scale.x > specs[0].transform.scale.x);
        assert!(specs[1].color[0] > specs[0].color[0]);
    }

    #[test]
    fn octahedron_is_closed() {
        let mesh = octahedron();
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.vertex_count(), 6);
    }
}
