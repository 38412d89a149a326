// Host-side tests for startup resolution and the load/save command surface.

use glam::Vec3;
use laser_core::{
    keys, mesh, BehaviorConfig, BehaviorKind, Camera, Color, ConfigStore, HeadlessScene,
    KeyValueStore, MemoryStore, Pointer, Resolution, Resolver, StoreError,
};

/// Memory backend that records every key removed through it.
#[derive(Default)]
struct SpyStore {
    inner: MemoryStore,
    removed: Vec<String>,
}

impl KeyValueStore for SpyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.removed.push(key.to_string());
        self.inner.remove(key)
    }
}

fn scene() -> HeadlessScene {
    let model = mesh::box_model(Vec3::ZERO, Vec3::splat(2.0));
    HeadlessScene::new(Some(Camera::default()), Some(model))
}

fn resolver() -> Resolver<MemoryStore> {
    Resolver::new(ConfigStore::new(MemoryStore::new(), "laser"), 42)
}

fn spy_resolver() -> Resolver<SpyStore> {
    Resolver::new(ConfigStore::new(SpyStore::default(), "laser"), 42)
}

fn colored(hex: u32) -> BehaviorConfig {
    BehaviorConfig::new().with_color(hex)
}

fn active_colors<S: KeyValueStore>(r: &Resolver<S>) -> Vec<Color> {
    r.active().map(|b| b.params().color).collect()
}

#[test]
fn fresh_start_runs_exactly_the_fallback() {
    let mut scene = scene();
    let mut r = resolver();
    assert_eq!(r.startup(&mut scene), Resolution::Fallback);
    assert_eq!(r.engine().ids(), vec!["fallback"]);
    assert_eq!(scene.beam_count(), r.engine().attached_beams());
    assert!(scene.beam_count() > 0);
}

#[test]
fn first_run_with_seeded_store_still_falls_back() {
    let mut scene = scene();
    let mut r = Resolver::new(ConfigStore::open(MemoryStore::new(), "laser"), 42);
    assert!(!r.list_behaviors().is_empty());
    assert_eq!(r.startup(&mut scene), Resolution::Fallback);
    assert_eq!(r.engine().len(), 1);
}

#[test]
fn scene_default_beats_default() {
    let mut scene = scene();
    let mut r = resolver();
    r.save_behavior("green", &colored(0x00ff00), None);
    r.save_behavior("blue", &colored(0x0000ff), None);
    assert!(r.set_default(&Pointer::behavior("green")));
    r.store_mut().set_scene_default(&Pointer::behavior("blue"));

    let resolution = r.startup(&mut scene);
    assert_eq!(resolution, Resolution::SceneDefault(Pointer::behavior("blue")));
    assert_eq!(active_colors(&r), vec![Color(0x0000ff)]);
}

#[test]
fn dangling_scene_default_is_cleared_and_default_takes_over() {
    let mut scene = scene();
    let mut r = spy_resolver();
    r.save_behavior("gone", &colored(0x123456), None);
    r.save_behavior("green", &colored(0x00ff00), None);
    r.set_default(&Pointer::behavior("green"));
    r.store_mut().set_scene_default(&Pointer::behavior("gone"));
    assert!(r.delete_behavior("gone"));
    r.store_mut().backend_mut().removed.clear();

    let resolution = r.startup(&mut scene);

    let removed = &r.store().backend().removed;
    for key in [
        "laser_scene_default_behavior",
        "laser_scene_default_bank",
        "laser_scene_default_type",
    ] {
        assert!(removed.iter().any(|k| k == key), "{key} not cleared");
    }
    assert!(!removed.iter().any(|k| k.starts_with("laser_default_")));
    assert_eq!(resolution, Resolution::Default(Pointer::behavior("green")));
    assert_eq!(r.get_scene_default(), None);
    assert_eq!(active_colors(&r), vec![Color(0x00ff00)]);
}

#[test]
fn both_tiers_dangling_ends_on_fallback() {
    let mut scene = scene();
    let mut r = resolver();
    r.store_mut().set_scene_default(&Pointer::bank("nope"));
    r.store_mut().set_default(&Pointer::behavior("missing"));
    assert_eq!(r.startup(&mut scene), Resolution::Fallback);
    assert_eq!(r.get_default(), None);
    assert_eq!(r.get_scene_default(), None);
    assert_eq!(r.engine().ids(), vec!["fallback"]);
}

#[test]
fn loading_my_blue_applies_its_saved_values() {
    let mut scene = scene();
    let mut r = resolver();
    let cfg = colored(0x0080ff).with(keys::MAX_BOUNCES, 5u32);
    assert!(r.save_behavior("my_blue", &cfg, None));
    assert!(r.load_behavior("my_blue", &mut scene));

    let active: Vec<_> = r.active().collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id(), "my_blue");
    assert_eq!(active[0].params().max_bounces, 5);
    assert_eq!(active[0].params().color, Color(0x0080ff));
    assert_eq!(r.get_scene_default(), Some(Pointer::behavior("my_blue")));
}

#[test]
fn loading_a_bank_activates_members_in_order() {
    let mut scene = scene();
    let mut r = Resolver::new(ConfigStore::open(MemoryStore::new(), "laser"), 42);
    r.save_behavior("my_blue", &colored(0x0080ff).with(keys::MAX_BOUNCES, 5u32), None);
    assert!(r.save_bank("mix", &["my_blue", "red_default"]));
    assert!(r.load_bank("mix", &mut scene));

    assert_eq!(r.engine().ids(), vec!["my_blue", "red_default"]);
    assert_eq!(active_colors(&r), vec![Color(0x0080ff), Color(0xff0000)]);
    let bounces: Vec<u32> = r.active().map(|b| b.params().max_bounces).collect();
    assert_eq!(bounces, vec![5, 3]);
    assert_eq!(r.get_scene_default(), Some(Pointer::bank("mix")));
}

#[test]
fn loading_something_missing_changes_nothing() {
    let mut scene = scene();
    let mut r = resolver();
    r.save_behavior("keep", &colored(0x00ff00), None);
    r.load_behavior("keep", &mut scene);
    let beams = scene.beam_count();

    assert!(!r.load_behavior("ghost", &mut scene));
    assert!(!r.load_bank("ghost_bank", &mut scene));
    assert_eq!(r.engine().ids(), vec!["keep"]);
    assert_eq!(scene.beam_count(), beams);
    assert_eq!(r.get_scene_default(), Some(Pointer::behavior("keep")));
}

#[test]
fn bank_with_deleted_member_loads_the_rest() {
    let mut scene = scene();
    let mut r = resolver();
    r.save_behavior("a", &colored(0x00ff00), None);
    r.save_behavior("b", &colored(0x0000ff), None);
    r.save_bank("ab", &["a", "b"]);
    r.delete_behavior("a");

    assert!(r.load_bank("ab", &mut scene));
    assert_eq!(r.engine().ids(), vec!["b"]);
}

#[test]
fn bank_with_no_loadable_members_counts_as_dangling() {
    let mut scene = scene();
    let mut r = resolver();
    r.save_behavior("a", &colored(0x00ff00), None);
    r.save_bank("only_a", &["a"]);
    r.store_mut().set_scene_default(&Pointer::bank("only_a"));
    r.delete_behavior("a");

    assert_eq!(r.startup(&mut scene), Resolution::Fallback);
    assert_eq!(r.get_scene_default(), None);
}

#[test]
fn default_must_name_something_saved() {
    let mut r = resolver();
    assert!(!r.set_default(&Pointer::behavior("nothing")));
    assert!(!r.set_default(&Pointer::bank("nothing")));
    assert_eq!(r.get_default(), None);

    r.save_behavior("x", &BehaviorConfig::new(), None);
    assert!(r.set_default(&Pointer::behavior("x")));
    assert_eq!(r.get_default(), Some(Pointer::behavior("x")));
    assert!(r.clear_default());
    assert_eq!(r.get_default(), None);
}

#[test]
fn saved_kind_picks_the_algorithm() {
    let mut scene = scene();
    let mut r = resolver();
    r.save_behavior("walls", &BehaviorConfig::new(), Some(BehaviorKind::Wireframe));
    r.load_behavior("walls", &mut scene);
    assert_eq!(r.active().next().map(|b| b.kind()), Some(BehaviorKind::Wireframe));
}

#[test]
fn helper_flag_is_persisted_and_reapplied() {
    let mut scene = scene();
    let mut r = resolver();
    assert!(r.set_helper_visibility(true, &mut scene));
    assert!(scene.helpers_visible());

    let store = ConfigStore::new(r.store().backend().clone(), "laser");
    let mut reopened = Resolver::new(store, 1);
    let mut fresh = HeadlessScene::new(None, None);
    reopened.startup(&mut fresh);
    assert!(fresh.helpers_visible());
}

#[test]
fn clear_all_stops_everything_and_forgets_the_session() {
    let mut scene = scene();
    let mut r = resolver();
    r.save_behavior("x", &colored(0x00ff00), None);
    r.set_default(&Pointer::behavior("x"));
    r.load_behavior("x", &mut scene);
    r.set_helper_visibility(true, &mut scene);

    r.clear_all(&mut scene);
    assert!(r.engine().is_empty());
    assert_eq!(scene.beam_count(), 0);
    assert_eq!(r.get_scene_default(), None);
    assert!(!r.helper_visibility());
    assert!(!scene.helpers_visible());
    assert_eq!(r.get_default(), Some(Pointer::behavior("x")));
    assert_eq!(r.list_behaviors(), vec!["x"]);
}

#[test]
fn resolver_survives_a_read_only_store() {
    let mut scene = scene();
    let mut r = Resolver::new(ConfigStore::open(MemoryStore::read_only(), "laser"), 7);
    assert_eq!(r.startup(&mut scene), Resolution::Fallback);
    assert!(!r.save_behavior("x", &BehaviorConfig::new(), None));
    assert!(!r.load_behavior("x", &mut scene));
    assert_eq!(r.engine().ids(), vec!["fallback"]);
}

#[test]
fn pointer_type_without_a_name_is_cleared_at_startup() {
    let mut scene = scene();
    let mut r = spy_resolver();
    r.store_mut()
        .backend_mut()
        .set("laser_default_type", "behavior")
        .unwrap();
    assert_eq!(r.startup(&mut scene), Resolution::Fallback);
    assert!(!r.store().has_pointer_type(laser_core::Tier::Default));
    assert!(r
        .store()
        .backend()
        .removed
        .contains(&"laser_default_type".to_string()));
}
