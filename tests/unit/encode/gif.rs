use std::fs::File;

use super::*;
use crate::foundation::core::Fps;
use image::AnimationDecoder as _;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps { num: 10, den: 1 },
    }
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: rgba.repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn decode(path: &Path) -> Vec<image::Frame> {
    let file = std::io::BufReader::new(File::open(path).unwrap());
    image::codecs::gif::GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
}

#[test]
fn writes_one_gif_frame_per_pushed_frame() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("out.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&out));

    sink.begin(cfg(8, 6)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(8, 6, [255, 0, 0, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid(8, 6, [0, 0, 255, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(2), &solid(8, 6, [0, 0, 0, 0]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.frames_written(), 3);

    let frames = decode(&out);
    assert_eq!(frames.len(), 3);
    for f in &frames {
        assert_eq!(f.buffer().dimensions(), (8, 6));
        let (num, den) = f.delay().numer_denom_ms();
        assert_eq!(f64::from(num) / f64::from(den), 100.0);
    }
    assert_eq!(frames[0].buffer().get_pixel(0, 0).0, [255, 0, 0, 255]);
    // Transparent pixels are flattened over the white default background.
    assert_eq!(frames[2].buffer().get_pixel(3, 3).0, [255, 255, 255, 255]);
}

#[test]
fn merges_identical_frames_into_longer_delay() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.gif");
    let mut sink = GifSink::new(GifSinkOpts {
        merge_identical: true,
        ..GifSinkOpts::new(&out)
    });

    sink.begin(cfg(4, 4)).unwrap();
    let red = solid(4, 4, [255, 0, 0, 255]);
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &red).unwrap();
    }
    sink.push_frame(FrameIndex(3), &solid(4, 4, [0, 255, 0, 255]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.frames_written(), 2);

    let frames = decode(&out);
    assert_eq!(frames.len(), 2);
    let (num, den) = frames[0].delay().numer_denom_ms();
    assert_eq!(f64::from(num) / f64::from(den), 300.0);
}

#[test]
fn rejects_out_of_order_and_mismatched_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = GifSink::new(GifSinkOpts::new(dir.path().join("bad.gif")));

    assert!(
        sink.push_frame(FrameIndex(0), &solid(2, 2, [0, 0, 0, 255]))
            .is_err()
    );

    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &solid(2, 2, [0, 0, 0, 255]))
        .unwrap();
    assert!(
        sink.push_frame(FrameIndex(1), &solid(2, 2, [0, 0, 0, 255]))
            .is_err()
    );
    assert!(
        sink.push_frame(FrameIndex(2), &solid(3, 2, [0, 0, 0, 255]))
            .is_err()
    );
}

#[test]
fn write_failure_at_end_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("blocked.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&out));

    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(2, 2, [0, 0, 0, 255]))
        .unwrap();
    // Nothing is on disk until `end`; a directory in the way makes the write fail.
    assert!(!out.exists());
    std::fs::create_dir(&out).unwrap();

    assert!(matches!(sink.end(), Err(TrailError::Other(_))));
}

#[test]
fn refuses_to_overwrite_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("exists.gif");
    std::fs::write(&out, b"x").unwrap();

    let mut sink = GifSink::new(GifSinkOpts {
        overwrite: false,
        ..GifSinkOpts::new(&out)
    });
    assert!(matches!(
        sink.begin(cfg(2, 2)),
        Err(TrailError::Validation(_))
    ));
}

#[test]
fn rejects_zero_sizes_and_bad_speed() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = GifSink::new(GifSinkOpts::new(dir.path().join("a.gif")));
    assert!(sink.begin(cfg(0, 2)).is_err());

    let mut slow = GifSink::new(GifSinkOpts {
        speed: 0,
        ..GifSinkOpts::new(dir.path().join("b.gif"))
    });
    assert!(slow.begin(cfg(2, 2)).is_err());
}

#[test]
fn ensure_parent_dir_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a").join("b").join("c.gif");
    ensure_parent_dir(&target).unwrap();
    assert!(dir.path().join("a").join("b").is_dir());
    ensure_parent_dir(Path::new("relative.gif")).unwrap();
}
