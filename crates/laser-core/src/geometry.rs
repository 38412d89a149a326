//! Ray-bounce solver and the small vector helpers the behaviors share.
//!
//! Nothing in here knows about scenes or beams: the solver receives the
//! raycaster as a closure, so it can be driven by a real mesh, a JS bridge or
//! a test oracle alike.

use crate::constants::BOUNCE_EPSILON;
use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};

/// Polyline followed by one beam. Most beams bounce a handful of times, so the
/// points stay inline.
pub type BeamPath = SmallVec<[Vec3; 8]>;

/// One intersection reported by a raycast.
///
/// `normal` is the world-space face normal of the hit surface; its sign is not
/// significant, the solver flips it to face the incoming ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub object: u32,
    pub distance: f32,
}

/// Mirror `direction` across the plane with unit `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Nearest hit by distance. Raycasters usually sort already, but the solver
/// must not depend on it.
#[inline]
pub fn nearest_hit(hits: &[RayHit]) -> Option<RayHit> {
    hits.iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .copied()
}

/// Trace a beam from `origin` along `direction`, reflecting off whatever the
/// raycaster reports, for at most `bounce_limit` bounces.
///
/// The returned path always has at least two points and always ends in a
/// drawn segment of `max_length`, never at a bare hit point. A raycaster error
/// aborts the trace and is handed back to the caller untouched.
pub fn compute_bounce_path<E, F>(
    origin: Vec3,
    direction: Vec3,
    bounce_limit: u32,
    max_length: f32,
    mut raycast: F,
) -> Result<BeamPath, E>
where
    F: FnMut(Vec3, Vec3) -> Result<Vec<RayHit>, E>,
{
    let mut points = BeamPath::new();
    points.push(origin);

    let mut current_origin = origin;
    let mut current_direction = direction.normalize();

    if bounce_limit == 0 {
        points.push(origin + current_direction * max_length);
        return Ok(points);
    }

    for bounce in 0..bounce_limit {
        let hits = raycast(current_origin, current_direction)?;
        let Some(hit) = nearest_hit(&hits) else {
            points.push(current_origin + current_direction * max_length);
            break;
        };

        points.push(hit.point);

        let mut normal = hit.normal.normalize_or_zero();
        if current_direction.dot(normal) > 0.0 {
            normal = -normal;
        }
        current_direction = reflect(current_direction, normal);
        current_origin = hit.point + current_direction * BOUNCE_EPSILON;

        if bounce + 1 == bounce_limit {
            points.push(current_origin + current_direction * max_length);
        }
    }

    Ok(points)
}

/// Uniformly distributed point on the sphere of `radius` around `center`.
pub fn random_point_on_sphere<R: Rng + ?Sized>(center: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let ring = (1.0 - z * z).max(0.0).sqrt();
    center + Vec3::new(ring * theta.cos(), ring * theta.sin(), z) * radius
}

/// Unit direction from `from` to `to`; falls back to -Z when the points coincide.
#[inline]
pub fn aim(from: Vec3, to: Vec3) -> Vec3 {
    let d = (to - from).normalize_or_zero();
    if d == Vec3::ZERO {
        Vec3::NEG_Z
    } else {
        d
    }
}

/// Point reflection of `point` through `center`.
#[inline]
pub fn mirror_through(point: Vec3, center: Vec3) -> Vec3 {
    center - (point - center)
}

/// Cubic ease-in-out on `[0, 1]`.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Brightness of a sinusoidal pulse at `elapsed` seconds, mapped from the
/// sine's `[-1, 1]` onto `[min, max]`.
#[inline]
pub fn pulse_brightness(elapsed: f32, frequency: f32, min: f32, max: f32) -> f32 {
    let intensity = ((elapsed * frequency * 2.0 * PI).sin() + 1.0) / 2.0;
    min + intensity * (max - min)
}

/// Local frame on a hit surface: the hit point plus two tangents spanning the
/// surface plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceFrame {
    pub center: Vec3,
    pub tangent1: Vec3,
    pub tangent2: Vec3,
    pub normal: Vec3,
}

impl SurfaceFrame {
    pub fn from_normal(center: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        if normal == Vec3::ZERO {
            return Self::flat(center);
        }
        let reference = if normal.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
        let tangent1 = normal.cross(reference).normalize();
        let tangent2 = normal.cross(tangent1).normalize();
        Self {
            center,
            tangent1,
            tangent2,
            normal,
        }
    }

    /// Horizontal frame used when nothing was hit.
    pub fn flat(center: Vec3) -> Self {
        Self {
            center,
            tangent1: Vec3::X,
            tangent2: Vec3::Z,
            normal: Vec3::Y,
        }
    }

    /// Offset on the surface for normalized grid coordinates in `[-1, 1]`.
    #[inline]
    pub fn offset(&self, col: f32, row: f32, spread: f32) -> Vec3 {
        self.tangent1 * (col * spread) + self.tangent2 * (row * spread)
    }
}
