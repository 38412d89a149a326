//! Animated behaviors: each one owns a set of beams and moves them every frame.

mod corner_array;
mod default;
mod start;
mod wireframe;

pub use corner_array::{CornerArrayBehavior, CornerTimeline};
pub use default::DefaultBehavior;
pub use start::StartBehavior;
pub use wireframe::WireframeBehavior;

use crate::beam::Beam;
use crate::config::{BehaviorKind, LaserParams};
use crate::constants::{CAMERA_POSITION_THRESHOLD, CAMERA_ROTATION_THRESHOLD_DEG};
use crate::engine::Stage;
use crate::error::BehaviorError;
use crate::geometry::aim;
use crate::scene::Camera;
use glam::{Quat, Vec3};

/// Lifecycle every animated rule implements.
///
/// `init` acquires beams through the [`Stage`], `update` moves them, `cleanup`
/// hands every one of them back. The engine removes anything a behavior
/// forgets to release, but well-behaved variants never rely on that.
pub trait Behavior {
    /// Name the behavior was loaded under (`"my_blue"`, `"red_default"`...).
    fn id(&self) -> &str;
    fn kind(&self) -> BehaviorKind;
    fn params(&self) -> &LaserParams;
    /// Beams currently owned, visible or not.
    fn beam_count(&self) -> usize;

    fn init(&mut self, stage: &mut Stage<'_>);
    fn update(&mut self, dt: f32, elapsed: f32, stage: &mut Stage<'_>) -> Result<(), BehaviorError>;
    fn cleanup(&mut self, stage: &mut Stage<'_>);
}

/// One bouncing laser: its beam plus where it starts and what it aims at.
#[derive(Debug)]
pub(crate) struct Laser {
    pub beam: Beam,
    pub origin: Vec3,
    pub target: Vec3,
}

impl Laser {
    #[inline]
    pub fn direction(&self) -> Vec3 {
        aim(self.origin, self.target)
    }
}

/// Re-trace every laser through the scene and push the result to the renderer.
pub(crate) fn trace_lasers(
    lasers: &mut [Laser],
    params: &LaserParams,
    brightness: f32,
    stage: &mut Stage<'_>,
) -> Result<(), BehaviorError> {
    for laser in lasers.iter_mut() {
        let path = stage.trace(
            laser.origin,
            laser.direction(),
            params.max_bounces,
            params.max_length,
        )?;
        laser.beam.set_path(path);
        laser.beam.set_tint(params.color, brightness);
        stage.draw(&laser.beam);
    }
    Ok(())
}

pub(crate) fn release_lasers(lasers: &mut Vec<Laser>, stage: &mut Stage<'_>) {
    for laser in lasers.drain(..) {
        stage.despawn(laser.beam);
    }
}

/// Watches the camera and reports when it has been still for long enough.
///
/// Moving more than [`CAMERA_POSITION_THRESHOLD`] or turning more than
/// [`CAMERA_ROTATION_THRESHOLD_DEG`] since the last reference pose resets the
/// timer and takes the new pose as reference.
#[derive(Clone, Debug, Default)]
pub struct StillnessTracker {
    position: Vec3,
    orientation: Quat,
    timer: f32,
    primed: bool,
}

impl StillnessTracker {
    pub fn prime(&mut self, camera: Option<&Camera>) {
        if let Some(cam) = camera {
            self.position = cam.eye;
            self.orientation = cam.orientation();
            self.primed = true;
        }
        self.timer = 0.0;
    }

    /// Advance by `dt`; `true` means the limit was reached and the timer was reset.
    /// Without a camera nothing accumulates.
    pub fn advance(&mut self, camera: Option<&Camera>, dt: f32, limit: f32) -> bool {
        let Some(cam) = camera else {
            return false;
        };
        if !self.primed {
            self.prime(Some(cam));
        }

        let orientation = cam.orientation();
        let moved = cam.eye.distance(self.position) > CAMERA_POSITION_THRESHOLD;
        let turned =
            self.orientation.angle_between(orientation) > CAMERA_ROTATION_THRESHOLD_DEG.to_radians();

        if moved || turned {
            self.position = cam.eye;
            self.orientation = orientation;
            self.timer = 0.0;
            return false;
        }

        self.timer += dt;
        if self.timer >= limit {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn timer(&self) -> f32 {
        self.timer
    }
}
