use super::*;
use crate::animation::spec::{AnimationBuilder, Timing};
use crate::data::point::{Trajectory, TrajectoryPoint};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Fps;
use crate::plot::builder::PlotBuilder;
use crate::plot::spec::{PathStyle, PointStyle};
use image::AnimationDecoder as _;

fn spec(frames: u64, end_pause: u64) -> AnimationSpec {
    let points = (1..=5)
        .map(|i| TrajectoryPoint::new(f64::from(i), f64::from(i), f64::from(i * i)))
        .collect();
    let plot = PlotBuilder::new(Trajectory::new(points).unwrap())
        .canvas(48, 40)
        .path(PathStyle::default())
        .points(PointStyle::default())
        .build()
        .unwrap();
    AnimationBuilder::new(plot)
        .timing(Timing {
            fps: Fps { num: 10, den: 1 },
            frames,
            end_pause,
        })
        .build()
        .unwrap()
}

fn backend() -> CpuBackend {
    CpuBackend::new(RenderSettings {
        draw_text: false,
        ..RenderSettings::default()
    })
}

fn full(spec: &AnimationSpec) -> FrameRange {
    spec.frame_range()
}

#[test]
fn render_frames_returns_every_frame_in_order() {
    let spec = spec(5, 0);
    let mut backend = backend();
    let frames = render_frames(&spec, full(&spec), &mut backend).unwrap();
    assert_eq!(frames.len(), 5);
    for (i, frame) in frames.iter().enumerate() {
        let single = render_frame(&spec, FrameIndex(i as u64), &mut backend).unwrap();
        assert_eq!(*frame, single);
    }
    assert_ne!(frames[0], frames[4]);
}

#[test]
fn parallel_render_matches_sequential() {
    let spec = spec(7, 0);
    let mut backend = backend();
    let (seq, seq_stats) =
        render_frames_with_stats(&spec, full(&spec), &mut backend, &RenderThreading::default())
            .unwrap();
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 3,
        threads: Some(2),
        static_frame_elision: false,
    };
    let (par, par_stats) =
        render_frames_with_stats(&spec, full(&spec), &mut backend, &threading).unwrap();
    assert_eq!(seq, par);
    assert_eq!(seq_stats, par_stats);
    assert_eq!(
        par_stats,
        RenderStats {
            frames_total: 7,
            frames_rendered: 7,
            frames_elided: 0,
        }
    );
}

#[test]
fn static_frame_elision_skips_end_pause_frames() {
    let spec = spec(5, 3);
    let mut backend = backend();
    let threading = RenderThreading {
        static_frame_elision: true,
        ..RenderThreading::default()
    };
    let (frames, stats) =
        render_frames_with_stats(&spec, full(&spec), &mut backend, &threading).unwrap();
    assert_eq!(frames.len(), 8);
    assert_eq!(
        stats,
        RenderStats {
            frames_total: 8,
            frames_rendered: 5,
            frames_elided: 3,
        }
    );
    assert_eq!(frames[4], frames[7]);
}

#[test]
fn render_to_sink_pushes_increasing_indices() {
    let spec = spec(4, 0);
    let mut sink = InMemorySink::new();
    let range = FrameRange::new(FrameIndex(1), FrameIndex(4)).unwrap();
    render_to_sink(
        &spec,
        range,
        &mut backend(),
        &RenderThreading {
            chunk_size: 2,
            ..RenderThreading::default()
        },
        &mut sink,
    )
    .unwrap();

    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![1, 2, 3]);
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (48, 40));
}

#[test]
fn invalid_ranges_and_threads_are_rejected() {
    let spec = spec(4, 0);
    let mut sink = InMemorySink::new();
    let empty = FrameRange::new(FrameIndex(2), FrameIndex(2)).unwrap();
    assert!(
        render_to_sink(&spec, empty, &mut backend(), &RenderThreading::default(), &mut sink)
            .is_err()
    );
    let too_long = FrameRange::new(FrameIndex(0), FrameIndex(5)).unwrap();
    assert!(
        render_to_sink(&spec, too_long, &mut backend(), &RenderThreading::default(), &mut sink)
            .is_err()
    );
    let zero_threads = RenderThreading {
        parallel: true,
        threads: Some(0),
        ..RenderThreading::default()
    };
    assert!(
        render_to_sink(&spec, full(&spec), &mut backend(), &zero_threads, &mut sink).is_err()
    );
}

#[test]
fn render_to_gif_writes_decodable_animation() {
    let spec = spec(6, 2);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("anim.gif");
    let stats = render_to_gif(&spec, &out, RenderToGifOpts::default(), &mut backend()).unwrap();
    assert_eq!(stats.frames_total, 8);

    let file = std::io::BufReader::new(std::fs::File::open(&out).unwrap());
    let frames = image::codecs::gif::GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[0].buffer().dimensions(), (48, 40));
}

#[test]
fn write_png_round_trips_dimensions() {
    let spec = spec(3, 0);
    let frame = render_frame(&spec, FrameIndex(2), &mut backend()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("png").join("frame.png");
    write_png(&frame, &out).unwrap();

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (48, 40));
    assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
}
