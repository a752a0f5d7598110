use super::ShapeKind;
use glam::{Mat3, Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Local-space triangle mesh with per-vertex normals and UVs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
    }

    /// Radius of the smallest origin-centred sphere containing every vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }

    /// Unnormalised local face normal from the corner normals.
    pub fn face_normal(&self, [a, b, c]: [usize; 3]) -> Vec3 {
        self.normals[a] + self.normals[b] + self.normals[c]
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        index
    }
}

/// Inverse-transpose of the model's linear part; `None` for degenerate scales.
pub fn normal_matrix(model: &Mat4) -> Option<Mat3> {
    let linear = Mat3::from_mat4(*model);
    (linear.determinant().abs() > f32::EPSILON).then(|| linear.inverse().transpose())
}

pub fn build(kind: ShapeKind) -> MeshData {
    match kind {
        ShapeKind::Cube | ShapeKind::Hypercube => box_mesh(1.0, 1.0, 1.0),
        ShapeKind::Sphere => sphere_mesh(0.5, 32, 32),
        ShapeKind::Cylinder => cylinder_mesh(0.5, 0.5, 1.0, 32),
        ShapeKind::Triangle => triangle_mesh(),
        ShapeKind::MetaballSphere | ShapeKind::MetaballBlob => sphere_mesh(0.6, 32, 32),
        ShapeKind::HollowTube => ring_tube_mesh(1.0, 0.2, 20, 8),
        ShapeKind::Pyramid => cylinder_mesh(0.0, 1.0, 1.5, 4),
        ShapeKind::IsoSphere => sphere_mesh(0.5, 64, 64),
    }
}

pub fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width, height, depth) * 0.5;
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut mesh = MeshData::default();
    for (normal, u_axis, v_axis) in faces {
        let center = normal * half;
        let u_extent = u_axis * half;
        let v_extent = v_axis * half;
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = center + u_extent * su + v_extent * sv;
            let uv = Vec2::new((su + 1.0) * 0.5, (1.0 - sv) * 0.5);
            mesh.push_vertex(position, normal, uv);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

pub fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut mesh = MeshData::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(h as usize + 1);

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let mut row = Vec::with_capacity(w as usize + 1);
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let direction = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            row.push(mesh.push_vertex(direction * radius, direction, Vec2::new(u, v)));
        }
        grid.push(row);
    }

    for iy in 0..h as usize {
        for ix in 0..w as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            // poles collapse to a single triangle per quad
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h as usize - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Capped cylinder; a zero top radius yields a cone.
pub fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> MeshData {
    let segments = radial_segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);
    let mut mesh = MeshData::default();

    let mut rows: [Vec<u32>; 2] = [Vec::new(), Vec::new()];
    for (row, (radius, y, v)) in [(radius_top, half, 0.0), (radius_bottom, -half, 1.0)]
        .into_iter()
        .enumerate()
    {
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let position = Vec3::new(radius * sin, y, radius * cos);
            let normal = Vec3::new(sin, slope, cos).normalize();
            rows[row].push(mesh.push_vertex(position, normal, Vec2::new(u, v)));
        }
    }
    for x in 0..segments as usize {
        let a = rows[0][x];
        let b = rows[1][x];
        let c = rows[1][x + 1];
        let d = rows[0][x + 1];
        if radius_top > 0.0 {
            mesh.indices.extend_from_slice(&[a, b, d]);
        }
        mesh.indices.extend_from_slice(&[b, c, d]);
    }

    if radius_top > 0.0 {
        push_cap(&mut mesh, radius_top, half, Vec3::Y, segments);
    }
    if radius_bottom > 0.0 {
        push_cap(&mut mesh, radius_bottom, -half, Vec3::NEG_Y, segments);
    }
    mesh
}

fn push_cap(mesh: &mut MeshData, radius: f32, y: f32, normal: Vec3, segments: u32) {
    let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
    let ring_start = mesh.positions.len() as u32;
    for x in 0..=segments {
        let theta = x as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            Vec3::new(radius * sin, y, radius * cos),
            normal,
            Vec2::new(cos * 0.5 + 0.5, sin * 0.5 * normal.y + 0.5),
        );
    }
    for x in 0..segments {
        mesh.indices
            .extend_from_slice(&[center, ring_start + x, ring_start + x + 1]);
    }
}

pub fn triangle_mesh() -> MeshData {
    let mut mesh = MeshData::default();
    let corners = [
        (Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.5, 0.0)),
        (Vec3::new(-1.0, -1.0, 0.0), Vec2::new(0.0, 1.0)),
        (Vec3::new(1.0, -1.0, 0.0), Vec2::new(1.0, 1.0)),
    ];
    for (position, uv) in corners {
        mesh.push_vertex(position, Vec3::Z, uv);
    }
    mesh.indices.extend_from_slice(&[0, 1, 2]);
    mesh
}

/// Tube swept along a closed circle of `path_radius` lying in the XZ plane.
pub fn ring_tube_mesh(
    path_radius: f32,
    tube_radius: f32,
    tubular_segments: u32,
    radial_segments: u32,
) -> MeshData {
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let mut mesh = MeshData::default();

    for i in 0..=tubular {
        // the last ring repeats the first so the tube closes on itself
        let t = (i % tubular) as f32 / tubular as f32;
        let angle = t * TAU;
        let (sin, cos) = angle.sin_cos();
        let center = Vec3::new(cos, 0.0, sin) * path_radius;
        let outward = Vec3::new(cos, 0.0, sin);
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let normal = (outward * -v.cos() + Vec3::Y * v.sin()).normalize();
            mesh.push_vertex(
                center + normal * tube_radius,
                normal,
                Vec2::new(i as f32 / tubular as f32, j as f32 / radial as f32),
            );
        }
    }

    let stride = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = stride * (j - 1) + (i - 1);
            let b = stride * j + (i - 1);
            let c = stride * j + i;
            let d = stride * (j - 1) + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Flat disc in the XY plane facing +Z.
pub fn circle_mesh(radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut mesh = MeshData::default();
    let center = mesh.push_vertex(Vec3::ZERO, Vec3::Z, Vec2::splat(0.5));
    for s in 0..=segments {
        let theta = s as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            Vec3::new(cos * radius, sin * radius, 0.0),
            Vec3::Z,
            Vec2::new((cos + 1.0) * 0.5, (1.0 - sin) * 0.5),
        );
    }
    for s in 1..=segments {
        mesh.indices.extend_from_slice(&[center, s, s + 1]);
    }
    mesh
}

/// Rectangle in the XY plane facing +Z.
pub fn plane_mesh(width: f32, height: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let (hw, hh) = (width * 0.5, height * 0.5);
    for (x, y, u, v) in [
        (-hw, -hh, 0.0, 1.0),
        (hw, -hh, 1.0, 1.0),
        (hw, hh, 1.0, 0.0),
        (-hw, hh, 0.0, 0.0),
    ] {
        mesh.push_vertex(Vec3::new(x, y, 0.0), Vec3::Z, Vec2::new(u, v));
    }
    mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    mesh
}
