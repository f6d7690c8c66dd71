use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(10, 0).is_err());
}

#[test]
fn fps_secs_to_frames_rounds() {
    let fps = Fps::new(10, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(5.0), 50);
    assert_eq!(fps.secs_to_frames_round(0.04), 0);
    assert_eq!(fps.secs_to_frames_round(0.06), 1);
}

#[test]
fn canvas_validate_bounds() {
    assert!(Canvas { width: 0, height: 10 }.validate().is_err());
    assert!(
        Canvas {
            width: MAX_CANVAS_DIM + 1,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(Canvas { width: 480, height: 480 }.validate().is_ok());
}

#[test]
fn rgba_hex_parses_with_and_without_alpha() {
    assert_eq!(Rgba8::from_hex("#ff8000").unwrap(), Rgba8::rgb(255, 128, 0));
    assert_eq!(
        Rgba8::from_hex("00ff0080").unwrap(),
        Rgba8::rgba(0, 255, 0, 128)
    );
    assert!(Rgba8::from_hex("#abc").is_err());
    assert_eq!(Rgba8::rgb(1, 2, 255).to_hex_rgb(), "#0102ff");
}

#[test]
fn premul_scales_channels_by_alpha() {
    assert_eq!(Rgba8::rgba(255, 255, 255, 0).premul(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::rgba(255, 0, 0, 128).premul(), [128, 0, 0, 128]);
}

#[test]
fn with_opacity_scales_alpha_only() {
    let c = Rgba8::rgb(10, 20, 30).with_opacity(0.5);
    assert_eq!((c.r, c.g, c.b, c.a), (10, 20, 30, 128));
}
