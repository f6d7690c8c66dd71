use super::*;

#[test]
fn straight_conversion_unpremultiplies() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![100, 50, 0, 128, 10, 20, 30, 255],
        premultiplied: true,
    };
    assert_eq!(
        frame.to_straight_rgba8(),
        vec![199, 100, 0, 128, 10, 20, 30, 255]
    );
}

#[test]
fn opaque_conversion_flattens_over_background() {
    let premul = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 0, 0, 0],
        premultiplied: true,
    };
    assert_eq!(premul.to_opaque_rgba8([255, 255, 255, 0]), vec![255; 4]);

    let straight = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![255, 0, 0, 128],
        premultiplied: false,
    };
    assert_eq!(straight.to_opaque_rgba8([0, 0, 0, 255]), vec![128, 0, 0, 255]);
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.pixel(0, 1), None);
}

#[test]
fn cpu_backend_exposes_worker_settings() {
    let settings = RenderSettings {
        draw_text: false,
        ..RenderSettings::default()
    };
    let backend = create_backend(BackendKind::Cpu, &settings).unwrap();
    assert_eq!(backend.worker_render_settings(), Some(settings));
}
