//! Picks what runs: at startup by walking the pointer tiers, afterwards on
//! every explicit load. Also the command surface frontends call into.

use crate::behavior::Behavior;
use crate::config::{BehaviorConfig, BehaviorKind};
use crate::engine::Engine;
use crate::error::ConfigError;
use crate::registry;
use crate::scene::Scene;
use crate::store::{ConfigStore, KeyValueStore, Pointer, PointerKind, Tier};

/// Which tier startup resolution ended on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    SceneDefault(Pointer),
    Default(Pointer),
    Fallback,
}

pub struct Resolver<S> {
    store: ConfigStore<S>,
    engine: Engine,
    seed: u64,
    spawned: u64,
}

impl<S: KeyValueStore> Resolver<S> {
    /// `seed` feeds every behavior RNG this resolver creates.
    pub fn new(store: ConfigStore<S>, seed: u64) -> Self {
        Self {
            store,
            engine: Engine::new(),
            seed,
            spawned: 0,
        }
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore<S> {
        &mut self.store
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn active(&self) -> impl Iterator<Item = &dyn Behavior> {
        self.engine.behaviors()
    }

    fn next_seed(&mut self) -> u64 {
        let mix = self.seed ^ self.spawned.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        self.spawned += 1;
        mix
    }

    fn build(&mut self, name: &str, config: &BehaviorConfig) -> Box<dyn Behavior> {
        let seed = self.next_seed();
        registry::from_config(name, config, seed)
    }

    /// Behaviors a pointer names, or `None` when nothing it names exists.
    fn expand(&mut self, pointer: &Pointer) -> Option<Vec<Box<dyn Behavior>>> {
        match pointer.kind {
            PointerKind::Behavior => {
                let config = self.store.load_behavior(&pointer.name)?;
                Some(vec![self.build(&pointer.name, &config)])
            }
            PointerKind::Bank => {
                let members = self.store.load_bank(&pointer.name)?;
                let mut out = Vec::with_capacity(members.len());
                for member in &members {
                    match self.store.load_behavior(member) {
                        Some(config) => out.push(self.build(member, &config)),
                        None => log::warn!("bank `{}`: skipping missing behavior `{member}`", pointer.name),
                    }
                }
                if out.is_empty() {
                    log::warn!("bank `{}` has no loadable members", pointer.name);
                    None
                } else {
                    Some(out)
                }
            }
        }
    }

    fn apply_helpers(&self, scene: &mut dyn Scene) {
        scene.set_helpers_visible(self.store.helper_visibility());
    }

    /// Scene-default, then default, then the built-in fallback. Dangling
    /// pointers are cleared on the way. Always leaves something running.
    pub fn startup(&mut self, scene: &mut dyn Scene) -> Resolution {
        for tier in [Tier::SceneDefault, Tier::Default] {
            let Some(pointer) = self.store.pointer(tier) else {
                if self.store.has_pointer_type(tier) {
                    log::warn!("startup: {tier:?} pointer is incomplete, clearing it");
                    self.store.clear_pointer(tier);
                }
                continue;
            };
            match self.expand(&pointer) {
                Some(behaviors) => {
                    log::info!("startup: {tier:?} {pointer}");
                    self.engine.replace_all(behaviors, scene);
                    self.apply_helpers(scene);
                    return match tier {
                        Tier::SceneDefault => Resolution::SceneDefault(pointer),
                        Tier::Default => Resolution::Default(pointer),
                    };
                }
                None => {
                    log::warn!("startup: {tier:?} points at missing {pointer}, clearing it");
                    self.store.clear_pointer(tier);
                }
            }
        }

        let (name, config) = registry::fallback();
        log::info!("startup: nothing saved to resume, using built-in `{name}`");
        let behavior = self.build(name, &config);
        self.engine.replace_all(vec![behavior], scene);
        self.apply_helpers(scene);
        Resolution::Fallback
    }

    /// Activate the saved behavior `name` and remember it as scene-default.
    /// Leaves everything untouched and returns `false` if it does not exist.
    pub fn load_behavior(&mut self, name: &str, scene: &mut dyn Scene) -> bool {
        self.load(&Pointer::behavior(name), scene)
    }

    /// Activate every loadable member of bank `name`, in order.
    pub fn load_bank(&mut self, name: &str, scene: &mut dyn Scene) -> bool {
        self.load(&Pointer::bank(name), scene)
    }

    fn load(&mut self, pointer: &Pointer, scene: &mut dyn Scene) -> bool {
        let Some(behaviors) = self.expand(pointer) else {
            log::warn!("{pointer} not found");
            return false;
        };
        self.engine.replace_all(behaviors, scene);
        self.store.set_scene_default(pointer);
        self.apply_helpers(scene);
        log::info!("loaded {pointer}");
        true
    }

    /// Run `config` under `name` without saving it or touching any pointer.
    pub fn activate(&mut self, name: &str, config: &BehaviorConfig, scene: &mut dyn Scene) {
        let behavior = self.build(name, config);
        self.engine.replace_all(vec![behavior], scene);
    }

    pub fn tick(&mut self, dt: f32, elapsed: f32, scene: &mut dyn Scene) {
        self.engine.tick(dt, elapsed, scene);
    }

    pub fn save_behavior(&mut self, name: &str, config: &BehaviorConfig, kind: Option<BehaviorKind>) -> bool {
        self.store.save_behavior(name, config, kind)
    }

    pub fn save_bank<N: AsRef<str>>(&mut self, name: &str, members: &[N]) -> bool {
        self.store.save_bank(name, members)
    }

    pub fn delete_behavior(&mut self, name: &str) -> bool {
        self.store.delete_behavior(name)
    }

    pub fn delete_bank(&mut self, name: &str) -> bool {
        self.store.delete_bank(name)
    }

    pub fn list_behaviors(&self) -> Vec<String> {
        self.store.list_behaviors()
    }

    pub fn list_banks(&self) -> Vec<String> {
        self.store.list_banks()
    }

    pub fn bank_members(&self, name: &str) -> Option<Vec<String>> {
        self.store.load_bank(name)
    }

    /// Point the default tier at an existing behavior or bank.
    pub fn set_default(&mut self, pointer: &Pointer) -> bool {
        let exists = match pointer.kind {
            PointerKind::Behavior => self.store.has_behavior(&pointer.name),
            PointerKind::Bank => self.store.load_bank(&pointer.name).is_some(),
        };
        if !exists {
            log::warn!("cannot make missing {pointer} the default");
            return false;
        }
        self.store.set_default(pointer)
    }

    pub fn get_default(&self) -> Option<Pointer> {
        self.store.default_pointer()
    }

    pub fn clear_default(&mut self) -> bool {
        self.store.clear_default()
    }

    pub fn get_scene_default(&self) -> Option<Pointer> {
        self.store.scene_default()
    }

    pub fn clear_scene_default(&mut self) -> bool {
        self.store.clear_scene_default()
    }

    /// Persist and apply the helper-overlay flag.
    pub fn set_helper_visibility(&mut self, visible: bool, scene: &mut dyn Scene) -> bool {
        scene.set_helpers_visible(visible);
        self.store.set_helper_visibility(visible)
    }

    pub fn helper_visibility(&self) -> bool {
        self.store.helper_visibility()
    }

    /// Stop everything, forget the scene-default and the helper flag.
    pub fn clear_all(&mut self, scene: &mut dyn Scene) {
        self.engine.clear(scene);
        self.store.clear_scene_default();
        self.store.clear_helper_visibility();
        scene.set_helpers_visible(false);
        log::info!("cleared all behaviors");
    }

    pub fn export_json(&self, exported: &str) -> Result<String, ConfigError> {
        self.store.export_json(exported)
    }

    pub fn import_json(&mut self, text: &str) -> Result<(usize, usize), ConfigError> {
        self.store.import_json(text)
    }
}
