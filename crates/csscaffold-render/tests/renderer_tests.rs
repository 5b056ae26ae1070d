//! Integration tests for PNG gradient output.

use csscaffold_render::{
    GradientAxis, GradientRenderer, ImageGradientRenderer, LinearGradient, RenderError,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn test_three_stop_gradient_round_trips_through_png() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("horizontal_11_ff0000_0000ff.png");
    let gradient = LinearGradient::new(11, 50, GradientAxis::Horizontal, [255, 0, 0], [0, 0, 255])
        .with_stop(0.5, [0, 255, 0]);

    ImageGradientRenderer::new().render(&gradient, &path).unwrap();

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (11, 50));
    assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
    assert_eq!(image.get_pixel(5, 25).0, [0, 255, 0]);
    assert_eq!(image.get_pixel(10, 49).0, [0, 0, 255]);
}

#[test]
fn test_rendering_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vertical_4_fff_000.png");
    std::fs::write(&path, b"stale").unwrap();

    let gradient = LinearGradient::new(50, 4, GradientAxis::Vertical, [255, 255, 255], [0, 0, 0]);
    ImageGradientRenderer::new().render(&gradient, &path).unwrap();

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (50, 4));
}

#[test]
fn test_concurrent_writers_leave_complete_image() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vertical_64_123456_abcdef.png");
    let gradient =
        LinearGradient::new(50, 64, GradientAxis::Vertical, [0x12, 0x34, 0x56], [0xab, 0xcd, 0xef]);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| ImageGradientRenderer::new().render(&gradient, &path).unwrap());
        }
    });

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (50, 64));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent/gradient.png");
    let gradient = LinearGradient::new(2, 2, GradientAxis::Horizontal, [0, 0, 0], [1, 1, 1]);

    let err = ImageGradientRenderer::new().render(&gradient, &path).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
    assert!(!path.exists());
}
