use crate::beam::{Beam, BeamId};
use crate::error::SceneError;
use crate::mesh;
use crate::scene::{Camera, RayHit, Scene, TargetModel};
use fnv::FnvHashMap;
use glam::Vec3;

const MODEL_OBJECT_ID: u32 = 1;

/// In-memory [`Scene`]: keeps the attached beams in a map and raycasts
/// against an optional triangle model. Used by the native runner and tests.
#[derive(Default)]
pub struct HeadlessScene {
    beams: FnvHashMap<BeamId, Beam>,
    camera: Option<Camera>,
    model: Option<TargetModel>,
    controls_target: Vec3,
    helpers_visible: bool,
}

impl HeadlessScene {
    pub fn new(camera: Option<Camera>, model: Option<TargetModel>) -> Self {
        Self {
            camera,
            model,
            ..Self::default()
        }
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Late model arrival, as after an asynchronous asset load.
    pub fn set_model(&mut self, model: Option<TargetModel>) {
        self.model = model;
    }

    pub fn set_controls_target(&mut self, target: Vec3) {
        self.controls_target = target;
    }

    /// Number of drawables currently attached.
    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    pub fn beam(&self, id: BeamId) -> Option<&Beam> {
        self.beams.get(&id)
    }

    pub fn beams(&self) -> impl Iterator<Item = &Beam> {
        self.beams.values()
    }

    pub fn helpers_visible(&self) -> bool {
        self.helpers_visible
    }
}

impl Scene for HeadlessScene {
    fn add_beam(&mut self, beam: &Beam) {
        self.beams.insert(beam.id(), beam.clone());
    }

    fn update_beam(&mut self, beam: &Beam) {
        if let Some(slot) = self.beams.get_mut(&beam.id()) {
            slot.clone_from(beam);
        } else {
            log::warn!("update for unattached {}", beam.id());
        }
    }

    fn remove_beam(&mut self, id: BeamId) {
        self.beams.remove(&id);
    }

    fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn model(&self) -> Option<&TargetModel> {
        self.model.as_ref()
    }

    fn controls_target(&self) -> Vec3 {
        self.controls_target
    }

    fn raycast(&self, origin: Vec3, direction: Vec3) -> Result<Vec<RayHit>, SceneError> {
        Ok(self
            .model
            .as_ref()
            .map(|m| mesh::raycast_model(m, MODEL_OBJECT_ID, origin, direction))
            .unwrap_or_default())
    }

    fn set_helpers_visible(&mut self, visible: bool) {
        self.helpers_visible = visible;
    }
}
