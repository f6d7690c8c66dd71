use super::*;

fn line() -> Trajectory {
    Trajectory::new(vec![
        TrajectoryPoint::new(1.0, 0.0, 0.0),
        TrajectoryPoint::new(2.0, 10.0, 0.0),
        TrajectoryPoint::new(4.0, 10.0, 20.0),
    ])
    .unwrap()
}

#[test]
fn rejects_empty_and_unordered_sequences() {
    assert!(Trajectory::new(Vec::new()).is_err());
    assert!(
        Trajectory::new(vec![
            TrajectoryPoint::new(2.0, 0.0, 0.0),
            TrajectoryPoint::new(1.0, 0.0, 0.0),
        ])
        .is_err()
    );
    assert!(Trajectory::new(vec![TrajectoryPoint::new(1.0, f64::NAN, 0.0)]).is_err());
}

#[test]
fn equal_times_are_allowed() {
    let t = Trajectory::new(vec![
        TrajectoryPoint::new(1.0, 0.0, 0.0),
        TrajectoryPoint::new(1.0, 1.0, 1.0),
    ])
    .unwrap();
    assert_eq!(t.count_at_or_before(1.0), 2);
}

#[test]
fn bounds_and_spans() {
    let t = line();
    assert_eq!(t.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
    assert_eq!(t.time_span(), (1.0, 4.0));
    assert_eq!(t.magnitude_span(), None);
    assert!(!t.has_magnitudes());
}

#[test]
fn magnitude_span_covers_all_values() {
    let t = Trajectory::new(vec![
        TrajectoryPoint::new(1.0, 0.0, 0.0).with_magnitude(30.0),
        TrajectoryPoint::new(2.0, 0.0, 0.0).with_magnitude(150.0),
        TrajectoryPoint::new(3.0, 0.0, 0.0).with_magnitude(45.0),
    ])
    .unwrap();
    assert_eq!(t.magnitude_span(), Some((30.0, 150.0)));
    assert!(t.has_magnitudes());
}

#[test]
fn position_at_interpolates_and_clamps() {
    let t = line();
    assert_eq!(t.position_at(0.0), Point::new(0.0, 0.0));
    assert_eq!(t.position_at(1.5), Point::new(5.0, 0.0));
    assert_eq!(t.position_at(3.0), Point::new(10.0, 10.0));
    assert_eq!(t.position_at(9.0), Point::new(10.0, 20.0));
}

#[test]
fn count_at_or_before_is_inclusive() {
    let t = line();
    assert_eq!(t.count_at_or_before(0.5), 0);
    assert_eq!(t.count_at_or_before(2.0), 2);
    assert_eq!(t.count_at_or_before(3.9), 2);
    assert_eq!(t.count_at_or_before(4.0), 3);
}
