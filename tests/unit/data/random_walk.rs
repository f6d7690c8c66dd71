use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn uniform_samples_stay_in_unit_interval() {
    let mut rng = Rng64::new(7);
    for _ in 0..1000 {
        let v = rng.next_f64_01();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn normal_samples_have_plausible_moments() {
    let mut rng = Rng64::new(42);
    let n = 20_000;
    let draws: Vec<f64> = (0..n).map(|_| rng.next_normal(2.0, 0.5)).collect();
    let mean = draws.iter().sum::<f64>() / n as f64;
    let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
    assert!((mean - 2.0).abs() < 0.05, "mean {mean}");
    assert!((var.sqrt() - 0.5).abs() < 0.05, "sd {}", var.sqrt());
}

#[test]
fn same_seed_reproduces_identical_sequence() {
    let params = RandomWalkParams::default();
    let a = generate(&params).unwrap();
    let b = generate(&params).unwrap();
    for (p, q) in a.points().iter().zip(b.points()) {
        assert_eq!(p.x.to_bits(), q.x.to_bits());
        assert_eq!(p.y.to_bits(), q.y.to_bits());
    }
}

#[test]
fn different_seeds_diverge() {
    let a = generate(&RandomWalkParams::default()).unwrap();
    let b = generate(&RandomWalkParams {
        seed: 124,
        ..RandomWalkParams::default()
    })
    .unwrap();
    assert_ne!(a.points()[0].x, b.points()[0].x);
}

#[test]
fn count_and_times_match_request() {
    let t = generate(&RandomWalkParams::default()).unwrap();
    assert_eq!(t.len(), 100);
    for (i, p) in t.points().iter().enumerate() {
        assert_eq!(p.time, (i + 1) as f64);
    }
    assert!(t.points().windows(2).all(|w| w[0].time < w[1].time));
    assert_eq!(t.points()[99].time, 100.0);
}

#[test]
fn first_point_is_single_draw_offset_by_means() {
    let params = RandomWalkParams::default();
    let t = generate(&params).unwrap();

    let mut rng = Rng64::new(params.seed);
    let x1 = 0.5 + 0.3 * rng.next_standard_normal();
    for _ in 1..params.count {
        rng.next_standard_normal();
    }
    let y1 = 0.3 + 0.2 * rng.next_standard_normal();

    assert_eq!(t.points()[0].x, x1);
    assert_eq!(t.points()[0].y, y1);
}

#[test]
fn coordinates_are_running_sums() {
    let params = RandomWalkParams {
        count: 5,
        ..RandomWalkParams::default()
    };
    let t = generate(&params).unwrap();
    let mut rng = Rng64::new(params.seed);
    let steps: Vec<f64> = (0..5).map(|_| rng.next_normal(0.5, 0.3)).collect();
    let mut acc = 0.0;
    for (p, s) in t.points().iter().zip(steps) {
        acc += s;
        assert_eq!(p.x, acc);
    }
}

#[test]
fn zero_sd_walk_is_a_straight_line() {
    let t = generate(&RandomWalkParams {
        seed: 1,
        count: 4,
        x: Drift::new(1.0, 0.0),
        y: Drift::new(-2.0, 0.0),
    })
    .unwrap();
    let xs: Vec<f64> = t.points().iter().map(|p| p.x).collect();
    let ys: Vec<f64> = t.points().iter().map(|p| p.y).collect();
    assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(ys, vec![-2.0, -4.0, -6.0, -8.0]);
}

#[test]
fn invalid_parameters_fail_fast() {
    let zero = RandomWalkParams {
        count: 0,
        ..RandomWalkParams::default()
    };
    assert!(matches!(generate(&zero), Err(TrailError::Validation(_))));

    let neg_sd = RandomWalkParams {
        x: Drift::new(0.0, -1.0),
        ..RandomWalkParams::default()
    };
    assert!(generate(&neg_sd).is_err());

    let nan_mean = RandomWalkParams {
        y: Drift::new(f64::NAN, 1.0),
        ..RandomWalkParams::default()
    };
    assert!(generate(&nan_mean).is_err());
}

#[test]
fn points_carry_time_labels() {
    let t = generate(&RandomWalkParams::default()).unwrap();
    assert_eq!(t.points()[0].label.as_deref(), Some("1"));
    assert_eq!(t.points()[99].label.as_deref(), Some("100"));
}
