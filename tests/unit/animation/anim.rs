use super::*;

fn times(n: u32) -> Vec<f64> {
    (1..=n).map(f64::from).collect()
}

#[test]
fn linear_track_spreads_frames_over_the_span() {
    let track = TimeTrack::new(times(5), 9, Ease::Linear).unwrap();
    assert_eq!(track.span(), (1.0, 5.0));
    let got: Vec<f64> = (0..9).map(|f| track.sample(FrameIndex(f))).collect();
    assert_eq!(got, vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0]);
}

#[test]
fn fewer_frames_than_times_still_start_and_end_on_the_data() {
    let track = TimeTrack::new(times(100), 20, Ease::Linear).unwrap();
    assert_eq!(track.sample(FrameIndex(0)), 1.0);
    assert_eq!(track.sample(FrameIndex(19)), 100.0);

    let eased = TimeTrack::new(times(100), 7, Ease::InOutCubic).unwrap();
    assert_eq!(eased.sample(FrameIndex(0)), 1.0);
    assert_eq!(eased.sample(FrameIndex(6)), 100.0);
}

#[test]
fn ease_applies_between_consecutive_times() {
    let track = TimeTrack::new(times(3), 5, Ease::InQuad).unwrap();
    // Frame 1 sits halfway between times 1 and 2.
    assert_eq!(track.sample(FrameIndex(1)), 1.25);
    assert_eq!(track.sample(FrameIndex(2)), 2.0);
    assert_eq!(track.sample(FrameIndex(3)), 2.25);
}

#[test]
fn uneven_times_keep_time_proportional_frames() {
    let track = TimeTrack::new(vec![0.0, 1.0, 10.0], 11, Ease::Linear).unwrap();
    assert_eq!(track.sample(FrameIndex(1)), 1.0);
    assert!((track.sample(FrameIndex(5)) - 5.0).abs() < 1e-12);
}

#[test]
fn frames_past_the_end_and_degenerate_tracks_hold_the_last_time() {
    let track = TimeTrack::new(times(4), 4, Ease::Linear).unwrap();
    assert_eq!(track.sample(FrameIndex(10)), 4.0);

    let single_frame = TimeTrack::new(times(4), 1, Ease::Linear).unwrap();
    assert_eq!(single_frame.sample(FrameIndex(0)), 4.0);

    let repeated = TimeTrack::new(vec![2.0, 2.0, 2.0], 5, Ease::Linear).unwrap();
    assert_eq!(repeated.sample(FrameIndex(0)), 2.0);
}

#[test]
fn invalid_tracks_are_rejected() {
    assert!(TimeTrack::new(Vec::new(), 5, Ease::Linear).is_err());
    assert!(TimeTrack::new(times(3), 0, Ease::Linear).is_err());
    assert!(TimeTrack::new(vec![2.0, 1.0], 5, Ease::Linear).is_err());
    assert!(TimeTrack::new(vec![1.0, f64::NAN], 5, Ease::Linear).is_err());
}
