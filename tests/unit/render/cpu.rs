use super::*;
use crate::animation::spec::{AnimationBuilder, Timing, Trail};
use crate::data::point::{Trajectory, TrajectoryPoint};
use crate::foundation::core::{Fps, FrameIndex};
use crate::plot::builder::PlotBuilder;
use crate::plot::spec::{PathStyle, PointStyle, Theme};

const RED: Rgba8 = Rgba8::rgb(200, 0, 0);

fn backend() -> CpuBackend {
    CpuBackend::new(RenderSettings {
        draw_text: false,
        ..RenderSettings::default()
    })
}

fn builder() -> PlotBuilder {
    let points = (0..6)
        .map(|i| TrajectoryPoint::new(f64::from(i), f64::from(i), f64::from(i % 3)))
        .collect();
    PlotBuilder::new(Trajectory::new(points).unwrap())
        .canvas(96, 64)
        .theme(Theme {
            grid: None,
            ..Theme::default()
        })
        .path(PathStyle::default())
        .points(PointStyle {
            color: RED,
            radius: 4.0,
        })
}

fn timing() -> Timing {
    Timing {
        fps: Fps { num: 10, den: 1 },
        frames: 6,
        end_pause: 0,
    }
}

fn pixel_at(frame: &FrameRGBA, p: Point) -> [u8; 4] {
    frame
        .pixel(p.x.floor() as u32, p.y.floor() as u32)
        .unwrap()
}

#[test]
fn renders_canvas_sized_premultiplied_frame() {
    let spec = AnimationBuilder::new(builder().build().unwrap())
        .timing(timing())
        .build()
        .unwrap();
    let state = spec.evaluate(FrameIndex(0)).unwrap();
    let frame = backend().render_state(&spec.plot, &state).unwrap();

    assert_eq!((frame.width, frame.height), (96, 64));
    assert_eq!(frame.data.len(), 96 * 64 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn head_marker_is_drawn_at_current_position() {
    let spec = AnimationBuilder::new(builder().build().unwrap())
        .time_indexed()
        .timing(timing())
        .build()
        .unwrap();
    let mut backend = backend();
    for f in 0..spec.total_frames() {
        let state = spec.evaluate(FrameIndex(f)).unwrap();
        let frame = backend.render_state(&spec.plot, &state).unwrap();
        let at = spec.plot.to_screen(state.head.position);
        assert_eq!(pixel_at(&frame, at), [200, 0, 0, 255]);
    }
}

#[test]
fn time_indexed_hides_past_points() {
    let spec = AnimationBuilder::new(builder().build().unwrap())
        .time_indexed()
        .timing(timing())
        .build()
        .unwrap();
    let state = spec.evaluate(FrameIndex(5)).unwrap();
    let frame = backend().render_state(&spec.plot, &state).unwrap();
    let first = spec
        .plot
        .to_screen(spec.plot.trajectory.points()[0].position());
    let panel = spec.plot.theme.panel;
    assert_eq!(pixel_at(&frame, first), [panel.r, panel.g, panel.b, 255]);
}

#[test]
fn trail_marks_are_tinted_and_faded() {
    let trail = Trail {
        window: 3.0,
        alpha: 0.5,
        color: Some(Rgba8::rgb(0, 0, 255)),
        shrink: false,
        ..Trail::new(3.0)
    };
    let spec = AnimationBuilder::new(builder().build().unwrap())
        .time_indexed()
        .trail(trail)
        .timing(timing())
        .build()
        .unwrap();
    let state = spec.evaluate(FrameIndex(5)).unwrap();
    let frame = backend().render_state(&spec.plot, &state).unwrap();

    // Point 3 is two time units old: opacity 0.5 * (1 - 2/3), blue over the panel.
    let older = spec
        .plot
        .to_screen(spec.plot.trajectory.points()[3].position());
    let [r, g, b, a] = pixel_at(&frame, older);
    // The u8 pipeline may land one step short of opaque over the panel.
    assert!(a >= 254);
    assert!(b > r && b > g);
    assert!(r > 100, "faded mark should still show the panel through it");
}

#[test]
fn identical_states_render_identical_pixels() {
    let spec = AnimationBuilder::new(builder().build().unwrap())
        .timing(timing())
        .build()
        .unwrap();
    let state = spec.evaluate(FrameIndex(3)).unwrap();
    let mut backend = backend();
    let a = backend.render_state(&spec.plot, &state).unwrap();
    let b = backend.render_state(&spec.plot, &state).unwrap();
    assert_eq!(a, b);
}
