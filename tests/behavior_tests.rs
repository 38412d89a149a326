// Host-side tests for the four behavior variants driven through the engine.

use fnv::FnvHashSet;
use glam::Vec3;
use laser_core::behavior::{CornerArrayBehavior, DefaultBehavior, StartBehavior, WireframeBehavior};
use laser_core::constants::{fallback_corners, CORNER_LASERS_PER_CORNER};
use laser_core::scene::Face;
use laser_core::{
    keys, mesh, Behavior, BehaviorConfig, Camera, Color, Engine, FrameClock, HeadlessScene, Stage,
};

const DT: f32 = 1.0 / 60.0;

fn boxed_scene() -> HeadlessScene {
    let model = mesh::box_model(Vec3::ZERO, Vec3::splat(2.0));
    HeadlessScene::new(Some(Camera::default()), Some(model))
}

/// Run `f` against a stage over `scene` with a throwaway ledger.
fn with_stage<R>(scene: &mut HeadlessScene, f: impl FnOnce(&mut Stage<'_>) -> R) -> R {
    let mut ledger = FnvHashSet::default();
    let mut next = 0;
    let mut stage = Stage::new(scene, &mut ledger, &mut next);
    f(&mut stage)
}

#[test]
fn default_origins_lie_on_the_sphere_around_the_orbit_focus() {
    let mut scene = boxed_scene();
    let focus = Vec3::new(1.0, 0.5, -2.0);
    scene.set_controls_target(focus);
    let cfg = BehaviorConfig::new().with(keys::ORIGIN_SPHERE_RADIUS, 12.0);
    let mut b = DefaultBehavior::new("d", cfg, 9);
    with_stage(&mut scene, |stage| b.init(stage));

    assert_eq!(b.beam_count(), 4);
    for origin in b.origins() {
        assert!((origin.distance(focus) - 12.0).abs() < 1e-3);
    }
}

#[test]
fn default_jumps_only_while_the_camera_rests() {
    let mut scene = boxed_scene();
    let mut b = DefaultBehavior::new("d", BehaviorConfig::new(), 5);
    let mut clock = FrameClock::new();
    with_stage(&mut scene, |stage| {
        b.init(stage);
        let first = b.origins();
        for _ in 0..30 {
            let (dt, t) = clock.advance(DT);
            b.update(dt, t, stage).unwrap();
        }
        assert!(b.jumps() > 0);
        assert_ne!(b.origins(), first);
    });

    let before = b.jumps();
    let mut angle = 0.0f32;
    for _ in 0..30 {
        angle += 0.5;
        if let Some(cam) = scene.camera_mut() {
            cam.eye = glam::Quat::from_rotation_y(angle) * Vec3::new(0.0, 0.0, 15.0);
        }
        let (dt, t) = clock.advance(DT);
        with_stage(&mut scene, |stage| b.update(dt, t, stage).unwrap());
    }
    assert_eq!(b.jumps(), before);
}

#[test]
fn default_paths_bounce_off_the_model() {
    let mut scene = boxed_scene();
    let cfg = BehaviorConfig::new().with(keys::MAX_BOUNCES, 2u32);
    let mut engine = Engine::new();
    engine.add_behavior(Box::new(DefaultBehavior::new("d", cfg, 11)), &mut scene);
    engine.tick(DT, 0.25, &mut scene);
    for beam in scene.beams() {
        // Aimed at the box center: one reflection off the outside of a
        // convex box, then open space.
        assert_eq!(beam.path().len(), 3);
        assert_eq!(beam.color(), Color(0xff0000));
    }
}

#[test]
fn zero_count_config_spawns_nothing() {
    let mut scene = boxed_scene();
    let cfg = BehaviorConfig::new().with(keys::LASER_COUNT, 0u32);
    let mut engine = Engine::new();
    engine.add_behavior(Box::new(DefaultBehavior::new("none", cfg, 1)), &mut scene);
    engine.tick(DT, DT, &mut scene);
    assert_eq!(scene.beam_count(), 0);
}

#[test]
fn behavior_without_camera_or_model_still_runs() {
    let mut scene = HeadlessScene::new(None, None);
    let mut engine = Engine::new();
    engine.add_behavior(Box::new(DefaultBehavior::new("d", BehaviorConfig::new(), 1)), &mut scene);
    engine.add_behavior(
        Box::new(WireframeBehavior::new("w", BehaviorConfig::new(), 2)),
        &mut scene,
    );
    engine.add_behavior(Box::new(StartBehavior::new("s", &BehaviorConfig::new())), &mut scene);
    engine.add_behavior(
        Box::new(CornerArrayBehavior::new("c", &BehaviorConfig::new())),
        &mut scene,
    );
    for i in 1..=120 {
        engine.tick(DT, i as f32 * DT, &mut scene);
    }
    assert_eq!(scene.beam_count(), engine.attached_beams());
    // Straight segments everywhere: nothing to bounce off.
    assert!(scene.beams().all(|b| b.path().len() == 2));
}

#[test]
fn wireframe_without_model_aims_at_the_fallback_face() {
    let mut scene = HeadlessScene::new(Some(Camera::default()), None);
    let mut b = WireframeBehavior::new("w", BehaviorConfig::new(), 3);
    with_stage(&mut scene, |stage| b.init(stage));
    let centroid = Face::fallback().centroid();
    assert!(b.targets().iter().all(|t| *t == centroid));
}

#[test]
fn wireframe_targets_are_face_centroids() {
    let model = mesh::box_model(Vec3::ZERO, Vec3::splat(2.0));
    let centroids: Vec<Vec3> = model.faces.iter().map(Face::centroid).collect();
    let mut scene = HeadlessScene::new(Some(Camera::default()), Some(model));
    let mut b = WireframeBehavior::new("w", BehaviorConfig::new(), 4);
    with_stage(&mut scene, |stage| b.init(stage));
    assert_eq!(b.params().color, Color(0x00ff00));
    for t in b.targets() {
        assert!(centroids.contains(&t), "{t} is not a face centroid");
    }
}

#[test]
fn start_draws_four_corner_beams_to_the_model_center() {
    let center = Vec3::new(0.5, 0.0, 0.0);
    let model = mesh::box_model(center, Vec3::ONE);
    let camera = Camera::default();
    let corners = camera.near_plane_corners();
    let mut scene = HeadlessScene::new(Some(camera), Some(model));

    let cfg = BehaviorConfig::new().with(keys::LASER_COUNT, 9u32);
    let mut engine = Engine::new();
    engine.add_behavior(Box::new(StartBehavior::new("s", &cfg)), &mut scene);
    engine.tick(DT, DT, &mut scene);

    assert_eq!(scene.beam_count(), 4);
    let starts: Vec<Vec3> = scene.beams().map(|b| b.path()[0]).collect();
    for beam in scene.beams() {
        assert_eq!(beam.path().len(), 2);
        assert_eq!(beam.path()[1], center);
        assert_eq!(beam.color(), Color(0x0000ff));
    }
    for corner in corners {
        assert!(
            starts.iter().any(|s| s.abs_diff_eq(corner, 1e-5)),
            "missing corner {corner}"
        );
    }
}

#[test]
fn start_without_camera_uses_fallback_corners() {
    let mut scene = HeadlessScene::new(None, None);
    let mut engine = Engine::new();
    engine.add_behavior(Box::new(StartBehavior::new("s", &BehaviorConfig::new())), &mut scene);
    let starts: Vec<Vec3> = scene.beams().map(|b| b.path()[0]).collect();
    for corner in fallback_corners() {
        assert!(starts.contains(&corner));
    }
}

#[test]
fn corner_array_holds_then_spreads_its_seventy_two_beams() {
    let mut scene = boxed_scene();
    let mut engine = Engine::new();
    engine.add_behavior(
        Box::new(CornerArrayBehavior::new("c", &BehaviorConfig::new())),
        &mut scene,
    );
    let total = 8 + 8 * CORNER_LASERS_PER_CORNER as usize;
    assert_eq!(total, 72);
    assert_eq!(scene.beam_count(), total);

    let visible = |scene: &HeadlessScene| scene.beams().filter(|b| b.is_visible()).count();
    assert_eq!(visible(&scene), 8);

    // Static hold: anchors run corner to center.
    let mut t = 0.0;
    for _ in 0..30 {
        t += DT;
        engine.tick(DT, t, &mut scene);
    }
    assert_eq!(visible(&scene), 8);
    for beam in scene.beams().filter(|b| b.is_visible()) {
        assert_eq!(beam.path()[1], Vec3::ZERO);
    }

    // Past the static duration only the array shows.
    while t < 1.5 {
        t += DT;
        engine.tick(DT, t, &mut scene);
    }
    assert_eq!(visible(&scene), 64);

    while t < 5.0 {
        t += DT;
        engine.tick(DT, t, &mut scene);
    }
    assert_eq!(visible(&scene), 64);
    assert_eq!(scene.beam_count(), total);
}

#[test]
fn corner_array_progress_follows_the_timeline() {
    let mut scene = boxed_scene();
    let cfg = BehaviorConfig::new()
        .with(keys::STATIC_DURATION, 0.5)
        .with(keys::SPREAD_DURATION, 1.0)
        .with(keys::LASERS_PER_CORNER, 4u32);
    let mut b = CornerArrayBehavior::new("c", &cfg);
    with_stage(&mut scene, |stage| {
        b.init(stage);
        assert_eq!(b.beam_count(), 8 + 32);

        b.update(DT, 10.0, stage).unwrap();
        assert!(!b.is_expanded());
        b.update(DT, 10.4, stage).unwrap();
        assert_eq!(b.progress(), 0.0);

        b.update(DT, 11.0, stage).unwrap();
        assert!(b.is_expanded());
        assert!((b.progress() - 0.5).abs() < 1e-4);
        assert_eq!(b.visible_beams(), 32);

        b.update(DT, 20.0, stage).unwrap();
        assert_eq!(b.progress(), 1.0);
    });
}

#[test]
fn corner_array_anchors_land_on_the_model_surface() {
    let mut scene = boxed_scene();
    let mut b = CornerArrayBehavior::new("c", &BehaviorConfig::new());
    with_stage(&mut scene, |stage| b.init(stage));
    let hits = b.hit_points();
    assert_eq!(hits.len(), 8);
    for hit in hits {
        // On the surface of a half-extent-2 box: one coordinate at +-2.
        let max = hit.abs().max_element();
        assert!((max - 2.0).abs() < 1e-3, "{hit} is off the box surface");
    }
}

#[test]
fn corner_array_without_model_uses_flat_frames_at_origin() {
    let mut scene = HeadlessScene::new(Some(Camera::default()), None);
    let mut b = CornerArrayBehavior::new("c", &BehaviorConfig::new());
    with_stage(&mut scene, |stage| b.init(stage));
    assert!(b.hit_points().iter().all(|p| *p == Vec3::ZERO));
}

#[test]
fn cleanup_releases_every_variant() {
    let mut scene = boxed_scene();
    let mut engine = Engine::new();
    let behaviors: Vec<Box<dyn Behavior>> = vec![
        Box::new(DefaultBehavior::new("d", BehaviorConfig::new(), 1)),
        Box::new(WireframeBehavior::new("w", BehaviorConfig::new(), 2)),
        Box::new(StartBehavior::new("s", &BehaviorConfig::new())),
        Box::new(CornerArrayBehavior::new("c", &BehaviorConfig::new())),
    ];
    engine.replace_all(behaviors, &mut scene);
    for i in 1..=10 {
        engine.tick(DT, i as f32 * DT, &mut scene);
    }
    assert!(scene.beam_count() > 0);
    engine.clear(&mut scene);
    assert_eq!(scene.beam_count(), 0);
}

#[test]
fn model_arriving_after_init_is_picked_up() {
    let model = mesh::box_model(Vec3::ZERO, Vec3::splat(2.0));
    let centroids: Vec<Vec3> = model.faces.iter().map(Face::centroid).collect();

    let mut scene = HeadlessScene::new(None, None);
    let mut engine = Engine::new();
    let bounces = BehaviorConfig::new().with(keys::MAX_BOUNCES, 2u32);
    engine.add_behavior(Box::new(DefaultBehavior::new("d", bounces, 6)), &mut scene);
    engine.tick(DT, DT, &mut scene);
    assert!(scene.beams().all(|b| b.path().len() == 2));
    scene.set_model(Some(model.clone()));
    engine.tick(DT, 2.0 * DT, &mut scene);
    assert!(scene.beams().all(|b| b.path().len() > 2));

    // No camera either, so stillness never triggers a jump.
    let mut scene = HeadlessScene::new(None, None);
    let mut wire = WireframeBehavior::new("w", BehaviorConfig::new(), 8);
    with_stage(&mut scene, |stage| {
        wire.init(stage);
        wire.update(DT, DT, stage).unwrap();
    });
    assert!(wire.targets().iter().all(|t| *t == Face::fallback().centroid()));
    scene.set_model(Some(model));
    with_stage(&mut scene, |stage| wire.update(DT, 2.0 * DT, stage).unwrap());
    for t in wire.targets() {
        assert!(centroids.contains(&t), "{t} is not a face centroid");
    }
}
