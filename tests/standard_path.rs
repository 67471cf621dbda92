mod common;

use common::{dimensions_of, gradient, noise, sniff, transparent_with_patch, Workspace};
use image::ImageFormat;
use upload_image_optimizer::{
    Dimensions, ImageOptimizer, LocalUpload, OptimizeOptions, Outcome, SkipReason,
};

fn eager(ws: &Workspace) -> ImageOptimizer {
    let mut settings = ws.settings();
    settings.standard.min_bytes = 0;
    ImageOptimizer::new(settings)
}

#[test]
fn small_files_pass_through_regardless_of_format() {
    let ws = Workspace::new();
    let optimizer = ImageOptimizer::new(ws.settings());

    for (name, format) in [("a.jpg", ImageFormat::Jpeg), ("b.png", ImageFormat::Png), ("c.bmp", ImageFormat::Bmp)] {
        let path = ws.write_image(name, &gradient(64, 64), format);
        let upload = ws.upload(&path);
        assert!(upload_size(&upload) < 512_000);

        let result = optimizer.optimize(&upload, OptimizeOptions::default());
        assert_eq!(result.path(), path.as_path());
        assert!(matches!(
            result.outcome,
            Outcome::PassThrough(SkipReason::BelowSizeThreshold { threshold: 512_000, .. })
        ));
    }
    assert_eq!(ws.scratch_files(), 0);
}

#[test]
fn size_threshold_is_exclusive() {
    let ws = Workspace::new();
    let optimizer = ImageOptimizer::new(ws.settings());

    let below = ws.write_bytes("below.jpg", &vec![0xAB; 511_999]);
    let result = optimizer.optimize(&ws.upload(&below), OptimizeOptions::default());
    assert!(matches!(result.outcome, Outcome::PassThrough(_)));

    // At the threshold the file is decoded; garbage bytes then degrade to a fallback.
    let at = ws.write_bytes("at.jpg", &vec![0xAB; 512_000]);
    let result = optimizer.optimize(&ws.upload(&at), OptimizeOptions::default());
    assert_eq!(result.path(), at.as_path());
    assert!(result.used_fallback());
    assert_eq!(ws.scratch_files(), 0);
}

#[test]
fn unsupported_extensions_pass_through() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);

    for name in ["anim.gif", "scan.bmp", "doc.tiff", "noext"] {
        let path = ws.write_bytes(name, &vec![0u8; 600_000]);
        let upload = ws.upload(&path);
        let result = optimizer.optimize(&upload, OptimizeOptions::default());
        assert_eq!(result.path(), path.as_path(), "{name}");
        assert!(
            matches!(result.outcome, Outcome::PassThrough(SkipReason::UnsupportedFormat { .. })),
            "{name}"
        );
        assert_eq!(optimizer.optimize(&upload, OptimizeOptions::default()), result, "{name}");
    }
    assert_eq!(ws.scratch_files(), 0);
}

#[test]
fn large_noise_png_is_processed_with_default_threshold() {
    let ws = Workspace::new();
    let optimizer = ImageOptimizer::new(ws.settings());

    let path = ws.write_image("noise.png", &noise(600, 600, 7), ImageFormat::Png);
    let upload = ws.upload(&path);
    assert!(upload_size(&upload) >= 512_000);

    let result = optimizer.optimize(&upload, OptimizeOptions::default());
    let report = result.report().expect("noise PNG should be optimized");
    assert_eq!(report.output, Dimensions::new(600, 600));
    assert_eq!(sniff(result.path()), ImageFormat::Png);
    assert_ne!(result.path(), path.as_path());
}

#[test]
fn wide_jpeg_is_downscaled_proportionally() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);
    let path = ws.write_image("wide.jpg", &gradient(2400, 800), ImageFormat::Jpeg);
    let original_bytes = std::fs::read(&path).unwrap();

    let result = optimizer.optimize(&ws.upload(&path), OptimizeOptions::default());
    let report = result.report().unwrap();

    assert_eq!(report.original, Dimensions::new(2400, 800));
    assert_eq!(report.output, Dimensions::new(1920, 640));
    assert_eq!(report.quality, 85);
    assert!(!report.pre_shrunk && !report.corrective_pass);
    assert_eq!(dimensions_of(result.path()), (1920, 640));
    assert_eq!(sniff(result.path()), ImageFormat::Jpeg);
    assert!(result.path().starts_with(ws.scratch.path()));

    // The upload itself is never touched.
    assert_eq!(std::fs::read(&path).unwrap(), original_bytes);
}

#[test]
fn explicit_options_override_defaults() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);
    let path = ws.write_image("photo.jpeg", &gradient(1000, 500), ImageFormat::Jpeg);

    let result = optimizer.optimize(&ws.upload(&path), OptimizeOptions::new(300, 60));
    let report = result.report().unwrap();
    assert_eq!(report.output, Dimensions::new(300, 150));
    assert_eq!(report.quality, 60);
}

#[test]
fn narrow_images_keep_their_dimensions_and_format() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);

    let png = ws.write_image("logo.png", &transparent_with_patch(300, 200), ImageFormat::Png);
    let result = optimizer.optimize(&ws.upload(&png), OptimizeOptions::default());
    assert_eq!(result.report().unwrap().output, Dimensions::new(300, 200));
    assert_eq!(sniff(result.path()), ImageFormat::Png);
    assert_eq!(dimensions_of(result.path()), (300, 200));

    let webp = ws.write_image("hero.webp", &gradient(320, 240), ImageFormat::WebP);
    let result = optimizer.optimize(&ws.upload(&webp), OptimizeOptions::default());
    assert_eq!(sniff(result.path()), ImageFormat::WebP);
    assert_eq!(dimensions_of(result.path()), (320, 240));
}

#[test]
fn client_name_decides_the_format_for_spooled_uploads() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);
    let spooled = ws.write_image("phpX9aQ2", &gradient(2000, 1000), ImageFormat::Jpeg);

    let upload = LocalUpload::with_client_name(&spooled, "Banner.JPG").unwrap();
    let result = optimizer.optimize(&upload, OptimizeOptions::default());
    let report = result.report().unwrap();
    assert_eq!(report.output, Dimensions::new(1920, 960));
    assert_eq!(result.path().extension().unwrap(), "jpg");

    let upload = LocalUpload::with_client_name(&spooled, "banner.heic").unwrap();
    let result = optimizer.optimize(&upload, OptimizeOptions::default());
    assert_eq!(result.path(), spooled.as_path());
}

#[test]
fn corrupt_input_falls_back_to_original() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);

    let mut truncated = std::fs::read(ws.write_image("full.jpg", &noise(200, 200, 3), ImageFormat::Jpeg)).unwrap();
    truncated.truncate(64);
    let path = ws.write_bytes("broken.jpg", &truncated);

    let result = optimizer.optimize(&ws.upload(&path), OptimizeOptions::default());
    assert_eq!(result.path(), path.as_path());
    match &result.outcome {
        Outcome::Fallback { error } => assert!(!error.is_empty()),
        other => panic!("expected fallback, got {other:?}"),
    }
    assert_eq!(ws.scratch_files(), 0);
}

#[test]
fn no_op_paths_are_idempotent() {
    let ws = Workspace::new();
    let optimizer = ImageOptimizer::new(ws.settings());
    let small = ws.write_image("small.jpg", &gradient(32, 32), ImageFormat::Jpeg);
    let upload = ws.upload(&small);

    let first = optimizer.optimize(&upload, OptimizeOptions::default());
    let second = optimizer.optimize(&upload, OptimizeOptions::default());
    assert_eq!(first, second);
    assert_eq!(first.into_path(), small);
    assert_eq!(ws.scratch_files(), 0);
}

#[test]
fn each_call_writes_a_distinct_temp_file() {
    let ws = Workspace::new();
    let optimizer = eager(&ws);
    let path = ws.write_image("twice.jpg", &gradient(400, 300), ImageFormat::Jpeg);
    let upload = ws.upload(&path);

    let a = optimizer.optimize(&upload, OptimizeOptions::default());
    let b = optimizer.optimize(&upload, OptimizeOptions::default());
    assert_ne!(a.path(), b.path());
    assert_eq!(a.report(), b.report());
    assert_eq!(ws.scratch_files(), 2);
}

fn upload_size(upload: &LocalUpload) -> u64 {
    use upload_image_optimizer::UploadedFile;
    upload.size()
}
