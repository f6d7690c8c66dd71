use super::*;
use crate::animation::spec::{AnimationBuilder, Timing, Trail};
use crate::data::point::{Trajectory, TrajectoryPoint};
use crate::foundation::core::Fps;
use crate::plot::builder::PlotBuilder;
use crate::plot::spec::{PathStyle, PointStyle};

fn builder(points: Vec<TrajectoryPoint>) -> AnimationBuilder {
    let plot = PlotBuilder::new(Trajectory::new(points).unwrap())
        .path(PathStyle::default())
        .points(PointStyle::default())
        .build()
        .unwrap();
    AnimationBuilder::new(plot).timing(Timing {
        fps: Fps { num: 10, den: 1 },
        frames: 9,
        end_pause: 2,
    })
}

fn squares() -> Vec<TrajectoryPoint> {
    (1..=5)
        .map(|i| TrajectoryPoint::new(f64::from(i), f64::from(i), f64::from(i * i)))
        .collect()
}

#[test]
fn cumulative_reveal_is_monotonic() {
    let spec = builder(squares()).cumulative_reveal().build().unwrap();
    let mut prev = 0;
    for f in 0..spec.total_frames() {
        let state = spec.evaluate(FrameIndex(f)).unwrap();
        assert!(state.points.len() >= prev);
        prev = state.points.len();
        for vp in &state.points {
            assert!(spec.plot.trajectory.points()[vp.index].time <= state.time);
            assert_eq!(vp.opacity, 1.0);
        }
    }
    assert_eq!(prev, 5);
}

#[test]
fn cumulative_reveal_extends_path_to_head() {
    let spec = builder(squares()).build().unwrap();
    let state = spec.evaluate(FrameIndex(1)).unwrap();
    assert_eq!(state.time, 1.5);
    assert_eq!(state.points.len(), 1);
    assert_eq!(state.head.index, 0);
    assert_eq!(state.head.position, Point::new(1.5, 2.5));
    assert_eq!(state.segments.len(), 1);
    assert_eq!(state.segments[0].from, Point::new(1.0, 1.0));
    assert_eq!(state.segments[0].to, state.head.position);

    let last = spec.evaluate(FrameIndex(10)).unwrap();
    assert_eq!(last.segments.len(), 4);
    assert_eq!(last.head.position, Point::new(5.0, 25.0));
}

#[test]
fn time_indexed_without_trail_shows_only_head() {
    let spec = builder(squares()).time_indexed().build().unwrap();
    let state = spec.evaluate(FrameIndex(4)).unwrap();
    assert!(state.points.is_empty());
    assert!(state.segments.is_empty());
    assert_eq!(state.head.position, Point::new(3.0, 9.0));
}

#[test]
fn trail_keeps_only_recent_points_with_fading_opacity() {
    let trail = Trail {
        alpha: 0.8,
        color: Some(Rgba8::rgb(200, 0, 0)),
        ..Trail::new(2.0)
    };
    let spec = builder(squares()).time_indexed().trail(trail).build().unwrap();

    let state = spec.evaluate(FrameIndex(8)).unwrap();
    assert_eq!(state.time, 5.0);
    let indices: Vec<usize> = state.points.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![3, 4]);
    assert_eq!(state.points[0].opacity, 0.4);
    assert_eq!(state.points[1].opacity, 0.8);
    assert!(state.points.iter().all(|p| p.tint == trail.color));
    assert_eq!(state.segments.len(), 1);

    for f in 0..spec.total_frames() {
        let state = spec.evaluate(FrameIndex(f)).unwrap();
        for w in state.points.windows(2) {
            assert!(w[0].opacity < w[1].opacity);
        }
        for vp in &state.points {
            let age = state.time - spec.plot.trajectory.points()[vp.index].time;
            assert!((0.0..2.0).contains(&age));
        }
    }
}

#[test]
fn numeric_time_labels() {
    let spec = builder(squares()).build().unwrap();
    assert_eq!(spec.evaluate(FrameIndex(0)).unwrap().time_label, "1");
    let mid = spec.evaluate(FrameIndex(1)).unwrap();
    assert_eq!(mid.time_label, "1.5");
    assert_eq!(mid.fill_template("t = {time}"), "t = 1.5");
}

#[test]
fn calendar_time_labels() {
    let start = chrono::NaiveDate::from_ymd_opt(2005, 8, 23)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    let points = (0..3)
        .map(|i| {
            let ts = start + chrono::Duration::hours(6 * i);
            let t = (ts.and_utc().timestamp() / 3600) as f64;
            TrajectoryPoint::new(t, -75.0 - i as f64, 23.0 + i as f64).with_timestamp(ts)
        })
        .collect();
    let spec = builder(points).build().unwrap();
    assert_eq!(
        spec.evaluate(FrameIndex(0)).unwrap().time_label,
        "2005-08-23 18:00"
    );
    assert_eq!(
        spec.evaluate(FrameIndex(10)).unwrap().time_label,
        "2005-08-24 06:00"
    );
}
