use super::Behavior;
use crate::beam::{Beam, Color};
use crate::config::{clamp_count, keys, BehaviorConfig, BehaviorKind, LaserParams};
use crate::constants::*;
use crate::engine::Stage;
use crate::error::BehaviorError;
use crate::geometry::{aim, ease_in_out_cubic, mirror_through, nearest_hit, SurfaceFrame};
use glam::Vec3;

const ANCHOR_COUNT: usize = 8;

/// Phase timings and grid shape of the corner array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerTimeline {
    pub static_duration: f32,
    pub spread_duration: f32,
    pub lasers_per_corner: u32,
    pub spread_distance: f32,
}

impl Default for CornerTimeline {
    fn default() -> Self {
        Self {
            static_duration: CORNER_STATIC_DURATION,
            spread_duration: CORNER_SPREAD_DURATION,
            lasers_per_corner: CORNER_LASERS_PER_CORNER,
            spread_distance: CORNER_SPREAD_DISTANCE,
        }
    }
}

impl CornerTimeline {
    pub fn from_config(config: &BehaviorConfig) -> Self {
        let d = Self::default();
        let secs = |key: &str, fallback: f32| {
            config
                .get_f64(key)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as f32)
                .unwrap_or(fallback)
        };
        Self {
            static_duration: secs(keys::STATIC_DURATION, d.static_duration),
            spread_duration: secs(keys::SPREAD_DURATION, d.spread_duration),
            lasers_per_corner: config
                .get_f64(keys::LASERS_PER_CORNER)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| clamp_count(keys::LASERS_PER_CORNER, v))
                .unwrap_or(d.lasers_per_corner),
            spread_distance: secs(keys::SPREAD_DISTANCE, d.spread_distance),
        }
    }

    /// Raw spread progress in `[0, 1]` at `t` seconds after the first update,
    /// or `None` while the array is still static.
    pub fn progress(&self, t: f32) -> Option<f32> {
        if t < self.static_duration {
            None
        } else if self.spread_duration <= 0.0 {
            Some(1.0)
        } else {
            Some(((t - self.static_duration) / self.spread_duration).min(1.0))
        }
    }
}

/// Normalized `(col, row)` in `[-1, 1]` for beam `index` of a square-ish grid
/// holding `count` beams.
pub fn grid_coords(index: u32, count: u32) -> (f32, f32) {
    let size = ((count as f32).sqrt().ceil() as u32).max(1);
    let row = index / size;
    let col = index % size;
    let norm = |x: u32| {
        if size > 1 {
            x as f32 / (size - 1) as f32 * 2.0 - 1.0
        } else {
            0.0
        }
    };
    (norm(col), norm(row))
}

#[derive(Debug)]
struct Anchor {
    beam: Beam,
    frame: SurfaceFrame,
}

#[derive(Debug)]
struct ArrayBeam {
    beam: Beam,
    anchor: usize,
    index: u32,
}

/// Four beams from the view-frustum corners plus their point reflections
/// through the model center. After a static hold they fan out into a grid of
/// beams across the surface each anchor first hit.
pub struct CornerArrayBehavior {
    name: String,
    params: LaserParams,
    timeline: CornerTimeline,
    anchors: Vec<Anchor>,
    array: Vec<ArrayBeam>,
    center_at_init: Vec3,
    start_time: Option<f32>,
    progress: f32,
    expanded: bool,
}

impl CornerArrayBehavior {
    pub fn new(name: impl Into<String>, config: &BehaviorConfig) -> Self {
        let base = LaserParams {
            color: Color(BLUE),
            max_bounces: 1,
            ..LaserParams::default()
        };
        Self {
            name: name.into(),
            params: LaserParams::resolve(config, base),
            timeline: CornerTimeline::from_config(config),
            anchors: Vec::new(),
            array: Vec::new(),
            center_at_init: Vec3::ZERO,
            start_time: None,
            progress: 0.0,
            expanded: false,
        }
    }

    pub fn timeline(&self) -> &CornerTimeline {
        &self.timeline
    }

    /// Raw spread progress; `0` while static, `1` once fully spread.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn visible_beams(&self) -> usize {
        self.anchors
            .iter()
            .map(|a| &a.beam)
            .chain(self.array.iter().map(|a| &a.beam))
            .filter(|b| b.is_visible())
            .count()
    }

    /// Hit points recorded at init, frustum corners first.
    pub fn hit_points(&self) -> Vec<Vec3> {
        self.anchors.iter().map(|a| a.frame.center).collect()
    }

    fn origins(stage: &Stage<'_>, center: Vec3) -> [Vec3; ANCHOR_COUNT] {
        let corners = stage
            .camera()
            .map(|c| c.near_plane_corners())
            .unwrap_or_else(fallback_corners);
        let mut out = [Vec3::ZERO; ANCHOR_COUNT];
        for (i, corner) in corners.into_iter().enumerate() {
            out[i] = corner;
            out[i + 4] = mirror_through(corner, center);
        }
        out
    }

    fn center(stage: &Stage<'_>) -> Vec3 {
        stage.model().map(|m| m.center).unwrap_or(Vec3::ZERO)
    }

    fn release(&mut self, stage: &mut Stage<'_>) {
        for anchor in self.anchors.drain(..) {
            stage.despawn(anchor.beam);
        }
        for ab in self.array.drain(..) {
            stage.despawn(ab.beam);
        }
    }

    fn hold(&mut self, stage: &mut Stage<'_>, origins: &[Vec3; ANCHOR_COUNT], center: Vec3) {
        for (anchor, origin) in self.anchors.iter_mut().zip(origins) {
            anchor.beam.set_segment(*origin, center);
            anchor.beam.set_tint(self.params.color, 1.0);
            stage.draw(&anchor.beam);
        }
    }

    fn expand(&mut self, stage: &mut Stage<'_>) {
        for anchor in &mut self.anchors {
            anchor.beam.set_visible(false);
            stage.draw(&anchor.beam);
        }
        for ab in &mut self.array {
            ab.beam.set_visible(true);
        }
        self.expanded = true;
        log::debug!("{}: spreading {} array beams", self.name, self.array.len());
    }

    fn spread(&mut self, stage: &mut Stage<'_>, origins: &[Vec3; ANCHOR_COUNT], drift: Vec3, progress: f32) {
        let eased = ease_in_out_cubic(progress);
        let spread = self.timeline.spread_distance * eased;
        let per_corner = self.timeline.lasers_per_corner;
        for ab in &mut self.array {
            let frame = &self.anchors[ab.anchor].frame;
            let origin = origins[ab.anchor];
            let hit = frame.center + drift;
            let start = origin + aim(origin, hit) * (eased * CORNER_ORIGIN_ADVANCE);
            let (col, row) = grid_coords(ab.index, per_corner);
            ab.beam.set_segment(start, hit + frame.offset(col, row, spread));
            ab.beam.set_tint(self.params.color, 1.0);
            stage.draw(&ab.beam);
        }
    }
}

impl Behavior for CornerArrayBehavior {
    fn id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BehaviorKind {
        BehaviorKind::CornerArray
    }

    fn params(&self) -> &LaserParams {
        &self.params
    }

    fn beam_count(&self) -> usize {
        self.anchors.len() + self.array.len()
    }

    fn init(&mut self, stage: &mut Stage<'_>) {
        self.release(stage);
        self.start_time = None;
        self.progress = 0.0;
        self.expanded = false;

        let center = Self::center(stage);
        self.center_at_init = center;
        let origins = Self::origins(stage, center);

        for (i, origin) in origins.iter().enumerate() {
            let frame = match stage.raycast(*origin, aim(*origin, center)) {
                Ok(hits) => match nearest_hit(&hits) {
                    Some(hit) => SurfaceFrame::from_normal(hit.point, hit.normal),
                    None => {
                        log::warn!("{}: anchor {i} hit nothing, using a flat frame", self.name);
                        SurfaceFrame::flat(center)
                    }
                },
                Err(e) => {
                    log::warn!("{}: anchor {i} raycast failed ({e}), using a flat frame", self.name);
                    SurfaceFrame::flat(center)
                }
            };
            let beam = stage.spawn_beam(self.params.color);
            self.anchors.push(Anchor { beam, frame });
        }

        for anchor in 0..ANCHOR_COUNT {
            for index in 0..self.timeline.lasers_per_corner {
                let mut beam = stage.spawn_beam(self.params.color);
                beam.set_visible(false);
                stage.draw(&beam);
                self.array.push(ArrayBeam { beam, anchor, index });
            }
        }

        self.hold(stage, &origins, center);
        log::info!(
            "{}: {} anchors, {} array beams",
            self.name,
            self.anchors.len(),
            self.array.len()
        );
    }

    fn update(&mut self, _dt: f32, elapsed: f32, stage: &mut Stage<'_>) -> Result<(), BehaviorError> {
        if self.anchors.is_empty() {
            return Ok(());
        }
        let start = *self.start_time.get_or_insert(elapsed);
        let center = Self::center(stage);
        let origins = Self::origins(stage, center);

        match self.timeline.progress(elapsed - start) {
            None => self.hold(stage, &origins, center),
            Some(progress) => {
                if !self.expanded {
                    self.expand(stage);
                }
                self.progress = progress;
                let drift = center - self.center_at_init;
                self.spread(stage, &origins, drift, progress);
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, stage: &mut Stage<'_>) {
        self.release(stage);
        self.start_time = None;
        self.expanded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_of_eight_spans_three_by_three() {
        let coords: Vec<_> = (0..8).map(|i| grid_coords(i, 8)).collect();
        assert_eq!(coords[0], (-1.0, -1.0));
        assert_eq!(coords[2], (1.0, -1.0));
        assert_eq!(coords[4], (0.0, 0.0));
        assert_eq!(coords[7], (0.0, 1.0));
    }

    #[test]
    fn single_beam_grid_sits_at_center() {
        assert_eq!(grid_coords(0, 1), (0.0, 0.0));
    }

    #[test]
    fn timeline_phases() {
        let t = CornerTimeline::default();
        assert_eq!(t.progress(0.5), None);
        assert_eq!(t.progress(1.0), Some(0.0));
        assert!((t.progress(2.5).unwrap_or_default() - 0.5).abs() < 1e-6);
        assert_eq!(t.progress(10.0), Some(1.0));
    }

    #[test]
    fn oversized_grid_is_capped() {
        let cfg = BehaviorConfig::new().with(keys::LASERS_PER_CORNER, 1e10);
        assert_eq!(CornerTimeline::from_config(&cfg).lasers_per_corner, MAX_CONFIG_COUNT);
    }
}
