use super::{release_lasers, trace_lasers, Behavior, Laser, StillnessTracker};
use crate::config::{BehaviorConfig, BehaviorKind, LaserParams};
use crate::engine::Stage;
use crate::error::BehaviorError;
use crate::geometry::{pulse_brightness, random_point_on_sphere};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Lasers launched from random points on a sphere around the orbit focus,
/// all aimed at the world origin. When the camera rests for
/// `STILLNESS_LIMIT` seconds every origin jumps somewhere new.
pub struct DefaultBehavior {
    name: String,
    config: BehaviorConfig,
    params: LaserParams,
    lasers: Vec<Laser>,
    stillness: StillnessTracker,
    rng: StdRng,
    jumps: u32,
}

impl DefaultBehavior {
    pub fn new(name: impl Into<String>, config: BehaviorConfig, seed: u64) -> Self {
        Self::with_base(name, config, LaserParams::default(), seed)
    }

    /// Like [`DefaultBehavior::new`] but overlaying `config` onto custom base values.
    pub fn with_base(
        name: impl Into<String>,
        config: BehaviorConfig,
        base: LaserParams,
        seed: u64,
    ) -> Self {
        let params = LaserParams::resolve(&config, base);
        Self {
            name: name.into(),
            config,
            params,
            lasers: Vec::new(),
            stillness: StillnessTracker::default(),
            rng: StdRng::seed_from_u64(seed),
            jumps: 0,
        }
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn origins(&self) -> Vec<Vec3> {
        self.lasers.iter().map(|l| l.origin).collect()
    }

    /// Number of times the origins were re-randomized since `init`.
    pub fn jumps(&self) -> u32 {
        self.jumps
    }

    fn jump(&mut self, center: Vec3) {
        let radius = self.params.origin_sphere_radius;
        for laser in &mut self.lasers {
            laser.origin = random_point_on_sphere(center, radius, &mut self.rng);
            laser.target = Vec3::ZERO;
        }
    }
}

impl Behavior for DefaultBehavior {
    fn id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Default
    }

    fn params(&self) -> &LaserParams {
        &self.params
    }

    fn beam_count(&self) -> usize {
        self.lasers.len()
    }

    fn init(&mut self, stage: &mut Stage<'_>) {
        release_lasers(&mut self.lasers, stage);
        self.lasers = (0..self.params.laser_count)
            .map(|_| Laser {
                beam: stage.spawn_beam(self.params.color),
                origin: Vec3::ZERO,
                target: Vec3::ZERO,
            })
            .collect();
        self.jump(stage.controls_target());
        self.jumps = 0;
        self.stillness.prime(stage.camera());
        log::info!(
            "{}: {} lasers, {} bounces, color {}",
            self.name,
            self.lasers.len(),
            self.params.max_bounces,
            self.params.color
        );
    }

    fn update(&mut self, dt: f32, elapsed: f32, stage: &mut Stage<'_>) -> Result<(), BehaviorError> {
        if self.lasers.is_empty() {
            return Ok(());
        }
        if self
            .stillness
            .advance(stage.camera(), dt, self.params.stillness_limit)
        {
            self.jump(stage.controls_target());
            self.jumps += 1;
            log::debug!("{}: jump #{}", self.name, self.jumps);
        }

        let p = &self.params;
        let brightness = pulse_brightness(elapsed, p.pulse_frequency, p.min_brightness, p.max_brightness);
        trace_lasers(&mut self.lasers, &self.params, brightness, stage)
    }

    fn cleanup(&mut self, stage: &mut Stage<'_>) {
        release_lasers(&mut self.lasers, stage);
    }
}
