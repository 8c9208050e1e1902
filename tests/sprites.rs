/// Sprite state tests.  Everything here is CPU-only; randomness comes from a
/// seeded `fastrand::Rng` so runs are reproducible.
use flock::flock::{Flock, REDIRECT_PROBABILITY, Sprite, frame_index, heading, wrap_axis};
use glam::Vec2;

fn bird(x: f32, y: f32, vx: f32, vy: f32, scale: f32, move_speed: f32) -> Sprite {
    Sprite::new(Vec2::new(x, y), Vec2::new(vx, vy), scale, 0.8, 12.0, move_speed)
}

// ── Wrapping ─────────────────────────────────────────────────────────────────

#[test]
fn crossing_right_edge_resets_to_exact_left_edge() {
    let scale = 0.12_f32;
    let mut s = bird(1.0 + scale - 0.0001, 0.0, 1.0, 0.0, scale, 1.0);
    // Seed chosen arbitrarily; redirection does not touch position.
    let mut rng = fastrand::Rng::with_seed(7);
    s.update(&mut rng);
    assert_eq!(s.position.x, -1.0 - scale);
}

#[test]
fn crossing_bottom_edge_resets_to_top_edge() {
    let scale = 0.08_f32;
    let mut s = bird(0.0, -1.0 - scale + 0.0001, 0.0, -1.0, scale, 1.0);
    let mut rng = fastrand::Rng::with_seed(11);
    s.update(&mut rng);
    assert_eq!(s.position.y, 1.0 + scale);
}

#[test]
fn wrap_axis_is_exact_at_boundary() {
    // On the edge itself nothing happens; only strictly past it.
    assert_eq!(wrap_axis(1.1, 0.1), 1.1);
    assert_eq!(wrap_axis(1.1001, 0.1), -1.1);
}

#[test]
fn positions_stay_in_padded_band_for_many_ticks() {
    let mut flock = Flock::new(vec![
        bird(0.9, 0.9, 1.0, 1.0, 0.12, 2.9),
        bird(-0.5, 0.2, -1.0, 0.3, 0.07, 50.0),
        bird(0.0, 0.0, 0.2, -0.9, 0.01, 400.0),
    ])
    .unwrap();
    let mut rng = fastrand::Rng::with_seed(42);

    for tick in 0..20_000 {
        flock.update(&mut rng);
        for s in flock.sprites() {
            let edge = 1.0 + s.scale;
            assert!(
                (-edge..=edge).contains(&s.position.x) && (-edge..=edge).contains(&s.position.y),
                "tick {tick}: {:?} outside ±{edge}",
                s.position
            );
        }
    }
}

// ── Rotation ─────────────────────────────────────────────────────────────────

#[test]
fn rotation_tracks_velocity_after_every_update() {
    let mut flock = Flock::default_flock().unwrap();
    let mut rng = fastrand::Rng::with_seed(3);
    for _ in 0..50_000 {
        flock.update(&mut rng);
        for s in flock.sprites() {
            assert_eq!(s.rotation, heading(s.velocity));
        }
    }
}

#[test]
fn heading_of_upward_velocity_is_quarter_turn() {
    let r = heading(Vec2::new(0.0, 1.0));
    assert!((r - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
}

// ── Redirection ──────────────────────────────────────────────────────────────

#[test]
fn redirect_rate_approximates_probability() {
    let mut s = bird(0.0, 0.0, 0.5, 0.5, 0.1, 1.0);
    let mut rng = fastrand::Rng::with_seed(2024);
    let ticks = 200_000;
    let mut changes = 0;
    for _ in 0..ticks {
        let before = s.velocity;
        s.update(&mut rng);
        if s.velocity != before {
            changes += 1;
        }
    }
    let rate = changes as f32 / ticks as f32;
    // Expected 400 redirections, σ ≈ 20.  ±0.0005 is five sigma.
    assert!(
        (rate - REDIRECT_PROBABILITY).abs() < 0.0005,
        "observed redirect rate {rate}"
    );
}

#[test]
fn redirected_velocity_is_within_unit_square() {
    let mut s = bird(0.0, 0.0, 0.5, 0.5, 0.1, 1.0);
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..100_000 {
        s.update(&mut rng);
        assert!((-1.0..=1.0).contains(&s.velocity.x));
        assert!((-1.0..=1.0).contains(&s.velocity.y));
    }
}

#[test]
fn sprites_are_independent() {
    let template = bird(0.1, 0.1, 0.3, 0.4, 0.1, 1.0);
    let mut flock = Flock::new(vec![template.clone(), bird(0.5, 0.5, -0.3, 0.0, 0.1, 2.0)]).unwrap();
    let mut rng = fastrand::Rng::with_seed(5);
    flock.update(&mut rng);

    let mut alone = template;
    let mut rng = fastrand::Rng::with_seed(5);
    alone.update(&mut rng);
    // The first sprite consumes the same random draws in both runs.
    assert_eq!(flock.sprites()[0], alone);
}

// ── Frame selection ──────────────────────────────────────────────────────────

#[test]
fn frame_index_is_pure() {
    for elapsed in [0.0, 1.0, 83.4, 999.9, 123_456.7] {
        assert_eq!(frame_index(elapsed, 12.0, 8), frame_index(elapsed, 12.0, 8));
    }
}

#[test]
fn frame_index_cycles_with_anim_speed() {
    // 12 fps → a new frame every 83.3 ms.
    assert_eq!(frame_index(0.0, 12.0, 8), 0);
    assert_eq!(frame_index(83.0, 12.0, 8), 0);
    assert_eq!(frame_index(84.0, 12.0, 8), 1);
    assert_eq!(frame_index(1000.0, 12.0, 8), 4);
    // 20 fps → 50 ms per frame, wraps after 400 ms.
    assert_eq!(frame_index(400.0, 20.0, 8), 0);
    assert_eq!(frame_index(450.0, 20.0, 8), 1);
}

#[test]
fn frame_index_always_in_range() {
    for speed in [0.5_f32, 10.0, 12.0, 20.0, 144.0] {
        for step in 0..5_000 {
            let elapsed = step as f64 * 7.3;
            assert!(frame_index(elapsed, speed, 8) < 8);
        }
    }
}

#[test]
fn negative_elapsed_clamps_to_first_frame() {
    assert_eq!(frame_index(-500.0, 12.0, 8), 0);
}

// ── Construction ─────────────────────────────────────────────────────────────

#[test]
fn default_flock_matches_shipped_birds() {
    let flock = Flock::default_flock().unwrap();
    let s = flock.sprites();
    assert_eq!(s.len(), 3);
    assert_eq!(s[1].velocity, Vec2::new(-0.25, -0.1));
    assert_eq!(s[1].scale, 0.08);
    assert_eq!(s[2].anim_speed, 20.0);
    assert_eq!(s[2].move_speed, 2.9);
}

#[test]
fn from_json_ignores_rotation_and_derives_it() {
    let json = r#"[{"position":[0,0],"velocity":[0,-1],"scale":0.1,"alpha":1,
                    "anim_speed":10,"move_speed":1}]"#;
    let flock = Flock::from_json(json).unwrap();
    let r = flock.sprites()[0].rotation;
    assert!((r + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
}

#[test]
fn empty_flock_is_rejected() {
    assert!(Flock::new(Vec::new()).is_err());
    assert!(Flock::from_json("[]").is_err());
}

#[test]
fn invalid_sprite_values_are_rejected() {
    let mut s = bird(0.0, 0.0, 1.0, 0.0, 0.1, 1.0);
    s.alpha = 1.5;
    assert!(Flock::new(vec![s]).is_err());

    let s = bird(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);
    assert!(Flock::new(vec![s]).is_err());

    let mut s = bird(0.0, 0.0, 1.0, 0.0, 0.1, 1.0);
    s.anim_speed = 0.0;
    assert!(Flock::new(vec![s]).is_err());
}

#[test]
fn malformed_json_is_a_preset_error() {
    let err = Flock::from_json("{ not json").unwrap_err();
    assert!(matches!(err, flock::Error::Preset(_)));
}
