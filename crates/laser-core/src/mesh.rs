use crate::geometry::RayHit;
use crate::scene::{Face, TargetModel};
use glam::Vec3;

const PARALLEL_EPSILON: f32 = 1e-7;

/// Ray/triangle intersection (Möller–Trumbore). Returns the ray parameter `t`
/// of the hit for a unit-length `dir`, or `None` on a miss or a hit behind the
/// origin. Both faces of the triangle count.
#[inline]
pub fn ray_triangle(origin: Vec3, dir: Vec3, face: &Face) -> Option<f32> {
    let [a, b, c] = face.vertices;
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}

/// All hits of a ray against a model, sorted nearest first.
pub fn raycast_model(model: &TargetModel, object: u32, origin: Vec3, dir: Vec3) -> Vec<RayHit> {
    let dir = dir.normalize_or_zero();
    if dir == Vec3::ZERO {
        return Vec::new();
    }
    let mut hits: Vec<RayHit> = model
        .faces
        .iter()
        .filter_map(|face| {
            ray_triangle(origin, dir, face).map(|t| RayHit {
                point: origin + dir * t,
                normal: face.normal,
                object,
                distance: t,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Axis-aligned box of the given half extents, as twelve outward-facing triangles.
pub fn box_model(center: Vec3, half: Vec3) -> TargetModel {
    let corner = |x: f32, y: f32, z: f32| center + Vec3::new(x * half.x, y * half.y, z * half.z);
    let quads = [
        // +X, -X, +Y, -Y, +Z, -Z (counter-clockwise seen from outside)
        [(1., -1., -1.), (1., 1., -1.), (1., 1., 1.), (1., -1., 1.)],
        [(-1., -1., 1.), (-1., 1., 1.), (-1., 1., -1.), (-1., -1., -1.)],
        [(-1., 1., -1.), (-1., 1., 1.), (1., 1., 1.), (1., 1., -1.)],
        [(-1., -1., 1.), (-1., -1., -1.), (1., -1., -1.), (1., -1., 1.)],
        [(-1., -1., 1.), (1., -1., 1.), (1., 1., 1.), (-1., 1., 1.)],
        [(1., -1., -1.), (-1., -1., -1.), (-1., 1., -1.), (1., 1., -1.)],
    ];
    let mut faces = Vec::with_capacity(12);
    for q in quads {
        let [a, b, c, d] = q.map(|(x, y, z)| corner(x, y, z));
        faces.push(Face::new(a, b, c));
        faces.push(Face::new(a, c, d));
    }
    TargetModel::new(center, faces)
}

/// Single square in the plane through `center` with unit `normal`.
pub fn plane_model(center: Vec3, normal: Vec3, half_size: f32) -> TargetModel {
    let normal = normal.normalize_or_zero();
    let reference = if normal.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
    let u = normal.cross(reference).normalize() * half_size;
    let v = normal.cross(u).normalize() * half_size;
    let (a, b, c, d) = (center - u - v, center + u - v, center + u + v, center - u + v);
    let mut faces = vec![Face::new(a, b, c), Face::new(a, c, d)];
    for f in &mut faces {
        f.normal = normal;
    }
    TargetModel::new(center, faces)
}
