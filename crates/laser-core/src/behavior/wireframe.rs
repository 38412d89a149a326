use super::{release_lasers, trace_lasers, Behavior, Laser, StillnessTracker};
use crate::config::{BehaviorConfig, BehaviorKind, LaserParams};
use crate::beam::Color;
use crate::constants::{GREEN, WIREFRAME_STILLNESS_LIMIT};
use crate::engine::Stage;
use crate::error::BehaviorError;
use crate::geometry::{pulse_brightness, random_point_on_sphere};
use crate::scene::{Face, TargetModel};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sphere-launched lasers that aim at random faces of the target model.
/// Every jump picks a fresh face per laser, so the model is slowly traced out.
pub struct WireframeBehavior {
    name: String,
    config: BehaviorConfig,
    params: LaserParams,
    lasers: Vec<Laser>,
    stillness: StillnessTracker,
    rng: StdRng,
    aimed_at_model: bool,
}

impl WireframeBehavior {
    pub fn new(name: impl Into<String>, config: BehaviorConfig, seed: u64) -> Self {
        let base = LaserParams {
            color: Color(GREEN),
            stillness_limit: WIREFRAME_STILLNESS_LIMIT,
            ..LaserParams::default()
        };
        let params = LaserParams::resolve(&config, base);
        Self {
            name: name.into(),
            config,
            params,
            lasers: Vec::new(),
            stillness: StillnessTracker::default(),
            rng: StdRng::seed_from_u64(seed),
            aimed_at_model: false,
        }
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn targets(&self) -> Vec<Vec3> {
        self.lasers.iter().map(|l| l.target).collect()
    }

    fn jump(&mut self, center: Vec3, model: Option<&TargetModel>) {
        self.aimed_at_model = model.is_some_and(|m| !m.faces.is_empty());
        let radius = self.params.origin_sphere_radius;
        for laser in &mut self.lasers {
            laser.origin = random_point_on_sphere(center, radius, &mut self.rng);
            laser.target = random_face(model, &mut self.rng).centroid();
        }
    }
}

fn random_face<R: Rng + ?Sized>(model: Option<&TargetModel>, rng: &mut R) -> Face {
    match model {
        Some(m) if !m.faces.is_empty() => m.faces[rng.gen_range(0..m.faces.len())],
        _ => Face::fallback(),
    }
}

impl Behavior for WireframeBehavior {
    fn id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Wireframe
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
        if stage.model().is_none() {
            log::warn!("{}: no model yet, aiming at the fallback face", self.name);
        }
        self.jump(stage.controls_target(), stage.model());
        self.stillness.prime(stage.camera());
        log::info!("{}: {} wireframe lasers", self.name, self.lasers.len());
    }

    fn update(&mut self, dt: f32, elapsed: f32, stage: &mut Stage<'_>) -> Result<(), BehaviorError> {
        if self.lasers.is_empty() {
            return Ok(());
        }
        let jumped = self
            .stillness
            .advance(stage.camera(), dt, self.params.stillness_limit);
        let model_arrived = !self.aimed_at_model && stage.model().is_some_and(|m| !m.faces.is_empty());
        if jumped || model_arrived {
            if model_arrived {
                log::info!("{}: model arrived, retargeting", self.name);
            }
            self.jump(stage.controls_target(), stage.model());
        }

        let p = &self.params;
        let brightness = pulse_brightness(elapsed, p.pulse_frequency, p.min_brightness, p.max_brightness);
        trace_lasers(&mut self.lasers, &self.params, brightness, stage)
    }

    fn cleanup(&mut self, stage: &mut Stage<'_>) {
        release_lasers(&mut self.lasers, stage);
    }
}
