// Host-side tests for the bounce solver and the geometry helpers.

use glam::Vec3;
use laser_core::constants::BOUNCE_EPSILON;
use laser_core::geometry::{
    ease_in_out_cubic, mirror_through, pulse_brightness, random_point_on_sphere, reflect,
};
use laser_core::{compute_bounce_path, mesh, HeadlessScene, RayHit, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, 1e-4)
}

// A mirror one unit ahead of every ray, tilted so reflections never repeat.
fn always_hit(origin: Vec3, dir: Vec3) -> Result<Vec<RayHit>, ()> {
    Ok(vec![RayHit {
        point: origin + dir,
        normal: Vec3::new(0.3, 1.0, 0.2).normalize(),
        object: 1,
        distance: 1.0,
    }])
}

fn never_hit(_: Vec3, _: Vec3) -> Result<Vec<RayHit>, ()> {
    Ok(Vec::new())
}

#[test]
fn path_has_bounce_limit_plus_two_points_when_everything_hits() {
    let origin = Vec3::new(1.0, 2.0, 3.0);
    let dir = Vec3::new(0.0, -1.0, -1.0);
    for n in 0..8 {
        let path = compute_bounce_path(origin, dir, n, 20.0, always_hit).unwrap();
        assert_eq!(path.len(), n as usize + 2, "bounce limit {n}");
        assert_eq!(path[0], origin);
    }
}

#[test]
fn no_hit_gives_a_single_straight_segment() {
    let origin = Vec3::new(-4.0, 0.5, 2.0);
    let dir = Vec3::new(1.0, 0.0, 0.0);
    for n in 0..6 {
        let path = compute_bounce_path(origin, dir, n, 12.5, never_hit).unwrap();
        assert_eq!(path.len(), 2, "bounce limit {n}");
        assert_eq!(path[0], origin);
        assert!(approx(path[1], origin + dir * 12.5));
    }
}

#[test]
fn unnormalized_direction_is_normalized_before_extending() {
    let path = compute_bounce_path(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0), 3, 10.0, never_hit).unwrap();
    assert!(approx(path[1], Vec3::new(0.0, 0.0, -10.0)));
}

#[test]
fn every_bounce_obeys_the_reflection_law() {
    let normal = Vec3::new(0.3, 1.0, 0.2).normalize();
    let path = compute_bounce_path(Vec3::ZERO, Vec3::new(0.2, -1.0, 0.1), 5, 20.0, always_hit).unwrap();
    let dirs: Vec<Vec3> = path.windows(2).map(|w| (w[1] - w[0]).normalize()).collect();
    for pair in dirs.windows(2) {
        let (incoming, outgoing) = (pair[0], pair[1]);
        let n = if incoming.dot(normal) > 0.0 { -normal } else { normal };
        let expected = incoming - 2.0 * incoming.dot(n) * n;
        assert!(approx(outgoing, expected), "{incoming} -> {outgoing}");
    }
}

#[test]
fn reflection_ignores_normal_orientation() {
    let d = Vec3::new(1.0, -1.0, 0.0).normalize();
    assert!(approx(reflect(d, Vec3::Y), reflect(d, -Vec3::Y)));
    assert!(approx(reflect(d, Vec3::Y), Vec3::new(1.0, 1.0, 0.0).normalize()));
}

#[test]
fn nearest_hit_wins_even_if_unsorted() {
    let hits = |o: Vec3, _d: Vec3| -> Result<Vec<RayHit>, ()> {
        Ok(vec![
            RayHit { point: o + Vec3::new(0.0, 0.0, -5.0), normal: Vec3::Z, object: 2, distance: 5.0 },
            RayHit { point: o + Vec3::new(0.0, 0.0, -2.0), normal: Vec3::Z, object: 1, distance: 2.0 },
        ])
    };
    let path = compute_bounce_path(Vec3::ZERO, -Vec3::Z, 1, 10.0, hits).unwrap();
    assert!(approx(path[1], Vec3::new(0.0, 0.0, -2.0)));
}

#[test]
fn raycast_error_aborts_the_trace() {
    let mut calls = 0;
    let result = compute_bounce_path(Vec3::ZERO, Vec3::X, 4, 10.0, |o, d| {
        calls += 1;
        if calls == 2 {
            Err("raycaster gone")
        } else {
            Ok(vec![RayHit { point: o + d, normal: -Vec3::X, object: 1, distance: 1.0 }])
        }
    });
    assert_eq!(result.unwrap_err(), "raycaster gone");
    assert_eq!(calls, 2);
}

#[test]
fn beam_bounces_straight_back_off_a_box_face() {
    let model = mesh::box_model(Vec3::ZERO, Vec3::splat(2.0));
    let scene = HeadlessScene::new(None, Some(model));
    // Off the face diagonal so exactly one triangle is crossed.
    let origin = Vec3::new(0.5, -0.5, 10.0);
    let path = compute_bounce_path(origin, -Vec3::Z, 1, 5.0, |o, d| scene.raycast(o, d)).unwrap();
    assert_eq!(path.len(), 3);
    assert!(approx(path[1], Vec3::new(0.5, -0.5, 2.0)));
    assert!(approx(path[2], Vec3::new(0.5, -0.5, 2.0 + BOUNCE_EPSILON + 5.0)));
}

#[test]
fn sphere_samples_sit_on_the_sphere() {
    let mut rng = StdRng::seed_from_u64(7);
    let center = Vec3::new(1.0, -2.0, 0.5);
    for _ in 0..200 {
        let p = random_point_on_sphere(center, 10.0, &mut rng);
        assert!((p.distance(center) - 10.0).abs() < 1e-3);
    }
}

#[test]
fn easing_and_pulse_stay_in_range() {
    assert_eq!(ease_in_out_cubic(0.0), 0.0);
    assert_eq!(ease_in_out_cubic(1.0), 1.0);
    assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    for i in 0..100 {
        let b = pulse_brightness(i as f32 * 0.13, 0.5, 0.3, 2.5);
        assert!(b > 0.3 - 1e-5 && b < 2.5 + 1e-5, "{b}");
    }
}

#[test]
fn mirror_through_center_is_point_reflection() {
    let c = Vec3::new(1.0, 1.0, 1.0);
    assert!(approx(mirror_through(Vec3::new(3.0, 0.0, 1.0), c), Vec3::new(-1.0, 2.0, 1.0)));
}
