//! Behavior host: keeps the active behaviors, hands each one a [`Stage`] and
//! guarantees no beam outlives the behavior that spawned it.

use crate::beam::{Beam, BeamId, Color};
use crate::behavior::Behavior;
use crate::error::SceneError;
use crate::geometry::{compute_bounce_path, BeamPath, RayHit};
use crate::scene::{Camera, Scene, TargetModel};
use fnv::FnvHashSet;
use glam::Vec3;

/// The view of the world a behavior gets during `init`, `update` and `cleanup`.
///
/// Every beam spawned through a stage is recorded in the owning behavior's
/// ledger, so the engine can sweep up anything left behind.
pub struct Stage<'a> {
    scene: &'a mut dyn Scene,
    ledger: &'a mut FnvHashSet<BeamId>,
    next_beam: &'a mut u64,
}

impl<'a> Stage<'a> {
    pub fn new(
        scene: &'a mut dyn Scene,
        ledger: &'a mut FnvHashSet<BeamId>,
        next_beam: &'a mut u64,
    ) -> Self {
        Self {
            scene,
            ledger,
            next_beam,
        }
    }

    /// Create a beam and attach it to the scene.
    pub fn spawn_beam(&mut self, color: Color) -> Beam {
        let id = BeamId(*self.next_beam);
        *self.next_beam += 1;
        let beam = Beam::new(id, color);
        self.scene.add_beam(&beam);
        self.ledger.insert(id);
        beam
    }

    /// Push the beam's current path and tint to the renderer.
    pub fn draw(&mut self, beam: &Beam) {
        self.scene.update_beam(beam);
    }

    pub fn despawn(&mut self, beam: Beam) {
        let id = beam.id();
        if self.ledger.remove(&id) {
            self.scene.remove_beam(id);
        } else {
            log::warn!("despawn of foreign {id}");
        }
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.scene.camera()
    }

    pub fn model(&self) -> Option<&TargetModel> {
        self.scene.model()
    }

    pub fn controls_target(&self) -> Vec3 {
        self.scene.controls_target()
    }

    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Result<Vec<RayHit>, SceneError> {
        self.scene.raycast(origin, direction)
    }

    /// Bounce path through the scene's geometry.
    pub fn trace(
        &self,
        origin: Vec3,
        direction: Vec3,
        bounce_limit: u32,
        max_length: f32,
    ) -> Result<BeamPath, SceneError> {
        compute_bounce_path(origin, direction, bounce_limit, max_length, |o, d| {
            self.scene.raycast(o, d)
        })
    }

    pub fn owned_beams(&self) -> usize {
        self.ledger.len()
    }
}

struct Slot {
    behavior: Box<dyn Behavior>,
    beams: FnvHashSet<BeamId>,
}

/// Ordered list of active behaviors.
#[derive(Default)]
pub struct Engine {
    slots: Vec<Slot>,
    next_beam: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn behaviors(&self) -> impl Iterator<Item = &dyn Behavior> {
        self.slots.iter().map(|s| s.behavior.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.behavior.id()).collect()
    }

    /// Beams currently attached on behalf of all active behaviors.
    pub fn attached_beams(&self) -> usize {
        self.slots.iter().map(|s| s.beams.len()).sum()
    }

    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>, scene: &mut dyn Scene) {
        let mut slot = Slot {
            behavior,
            beams: FnvHashSet::default(),
        };
        {
            let mut stage = Stage::new(scene, &mut slot.beams, &mut self.next_beam);
            slot.behavior.init(&mut stage);
        }
        log::info!(
            "added `{}` ({}, {} beams)",
            slot.behavior.id(),
            slot.behavior.kind(),
            slot.beams.len()
        );
        self.slots.push(slot);
    }

    /// Remove the first behavior with this id. Returns `false` when none matched.
    pub fn remove_behavior(&mut self, id: &str, scene: &mut dyn Scene) -> bool {
        let Some(pos) = self.slots.iter().position(|s| s.behavior.id() == id) else {
            return false;
        };
        let slot = self.slots.remove(pos);
        Self::release(slot, &mut self.next_beam, scene);
        true
    }

    pub fn replace_all(&mut self, behaviors: Vec<Box<dyn Behavior>>, scene: &mut dyn Scene) {
        self.clear(scene);
        for b in behaviors {
            self.add_behavior(b, scene);
        }
    }

    pub fn clear(&mut self, scene: &mut dyn Scene) {
        for slot in std::mem::take(&mut self.slots) {
            Self::release(slot, &mut self.next_beam, scene);
        }
    }

    /// Update every behavior in order. A failing behavior is logged and skipped.
    pub fn tick(&mut self, dt: f32, elapsed: f32, scene: &mut dyn Scene) {
        for slot in &mut self.slots {
            let mut stage = Stage::new(scene, &mut slot.beams, &mut self.next_beam);
            if let Err(e) = slot.behavior.update(dt, elapsed, &mut stage) {
                log::warn!("`{}` update failed: {e}", slot.behavior.id());
            }
        }
    }

    fn release(mut slot: Slot, next_beam: &mut u64, scene: &mut dyn Scene) {
        {
            let mut stage = Stage::new(scene, &mut slot.beams, next_beam);
            slot.behavior.cleanup(&mut stage);
        }
        if !slot.beams.is_empty() {
            log::warn!(
                "`{}` left {} beams attached, removing them",
                slot.behavior.id(),
                slot.beams.len()
            );
            for id in slot.beams.drain() {
                scene.remove_beam(id);
            }
        }
    }
}
