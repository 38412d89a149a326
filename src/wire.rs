// Flat-array encodings shared with the JS host. Kept free of wasm types so
// the host-side tests can include it directly.
use crate::constants::*;
use glam::Vec3;
use laser_core::{Beam, Face, RayHit, TargetModel};

/// Line-strip vertices of `beam`, `VERTEX_FLOATS` per point.
pub fn beam_floats(beam: &Beam) -> Vec<f32> {
    let vertices = beam.vertices();
    bytemuck::cast_slice(&vertices).to_vec()
}

/// Decode packed raycast hits, nearest first as the host reports them.
/// A trailing partial record is ignored.
pub fn unpack_hits(raw: &[f32]) -> Vec<RayHit> {
    raw.chunks_exact(HIT_STRIDE)
        .map(|c| RayHit {
            point: Vec3::from_slice(&c[HIT_POINT..HIT_POINT + 3]),
            normal: Vec3::from_slice(&c[HIT_NORMAL..HIT_NORMAL + 3]),
            object: c[HIT_OBJECT] as u32,
            distance: c[HIT_DISTANCE],
        })
        .collect()
}

/// World-space triangle soup, `TRIANGLE_FLOATS` per face.
pub fn model_from_triangles(center: Vec3, raw: &[f32]) -> TargetModel {
    let faces = raw
        .chunks_exact(TRIANGLE_FLOATS)
        .map(|c| {
            Face::new(
                Vec3::from_slice(&c[0..3]),
                Vec3::from_slice(&c[3..6]),
                Vec3::from_slice(&c[6..9]),
            )
        })
        .collect();
    TargetModel::new(center, faces)
}
