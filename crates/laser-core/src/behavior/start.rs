use super::Behavior;
use crate::beam::{Beam, Color};
use crate::config::{BehaviorConfig, BehaviorKind, LaserParams};
use crate::constants::{fallback_corners, BLUE};
use crate::engine::Stage;
use crate::error::BehaviorError;
use glam::Vec3;

const CORNER_BEAMS: u32 = 4;

/// Four straight beams from the screen corners to the model center.
/// No bounces, no jumps, no pulse.
pub struct StartBehavior {
    name: String,
    params: LaserParams,
    beams: Vec<Beam>,
}

impl StartBehavior {
    pub fn new(name: impl Into<String>, config: &BehaviorConfig) -> Self {
        let base = LaserParams {
            color: Color(BLUE),
            laser_count: CORNER_BEAMS,
            max_bounces: 0,
            ..LaserParams::default()
        };
        let mut params = LaserParams::resolve(config, base);
        params.laser_count = CORNER_BEAMS;
        Self {
            name: name.into(),
            params,
            beams: Vec::new(),
        }
    }

    fn place(&mut self, stage: &mut Stage<'_>) {
        let corners = stage
            .camera()
            .map(|c| c.near_plane_corners())
            .unwrap_or_else(fallback_corners);
        let center = stage.model().map(|m| m.center).unwrap_or(Vec3::ZERO);
        for (beam, corner) in self.beams.iter_mut().zip(corners) {
            beam.set_segment(corner, center);
            beam.set_tint(self.params.color, 1.0);
            stage.draw(beam);
        }
    }
}

impl Behavior for StartBehavior {
    fn id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Start
    }

    fn params(&self) -> &LaserParams {
        &self.params
    }

    fn beam_count(&self) -> usize {
        self.beams.len()
    }

    fn init(&mut self, stage: &mut Stage<'_>) {
        for beam in self.beams.drain(..) {
            stage.despawn(beam);
        }
        self.beams = (0..CORNER_BEAMS)
            .map(|_| stage.spawn_beam(self.params.color))
            .collect();
        self.place(stage);
    }

    fn update(&mut self, _dt: f32, _elapsed: f32, stage: &mut Stage<'_>) -> Result<(), BehaviorError> {
        self.place(stage);
        Ok(())
    }

    fn cleanup(&mut self, stage: &mut Stage<'_>) {
        for beam in self.beams.drain(..) {
            stage.despawn(beam);
        }
    }
}
