use bottle_detect::common::{AppConfig, BottleDetection};
use bottle_detect::preprocessing::{self, PreprocessConfig};
use bottle_detect::{run_detection, DetectError, ObjectDetector, Renderer, SampleSource, StatusMessage};
use image::{Rgb, RgbImage};

/// Returns canned boxes and remembers the size of the image it was given.
struct CannedDetector {
    boxes: Vec<BottleDetection>,
    seen: Option<(u32, u32)>,
}

impl CannedDetector {
    fn new(n: usize) -> Self {
        let boxes = (0..n)
            .map(|i| {
                BottleDetection::default()
                    .with_x1y1_wh(4. + i as f32 * 9., 4., 6., 20.)
                    .with_confidence(0.5 + i as f32 * 0.05)
                    .with_label("bottle")
            })
            .collect();
        Self { boxes, seen: None }
    }
}

impl ObjectDetector for CannedDetector {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<BottleDetection>> {
        self.seen = Some(image.dimensions());
        Ok(self.boxes.clone())
    }
}

fn sample_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let img = RgbImage::from_fn(64, 32, |x, y| Rgb([(x * 4) as u8, (y * 8) as u8, 180]));
    img.save(dir.path().join("Data_Bottles.png")).unwrap();
    dir
}

#[test]
fn six_bottles_are_reported() {
    let dir = sample_dir();
    let config = AppConfig::default().with_sample_dir(dir.path());
    let source = SampleSource::from_config(&config);
    let mut detector = CannedDetector::new(6);

    let outcome = run_detection(&mut detector, &source, "Data_Bottles.png", &config.preprocess, &Renderer::new()).unwrap();

    assert_eq!(outcome.count, 6);
    assert_eq!(outcome.caption(), "Detected Bottles: 6");
    assert_eq!(outcome.status.to_string(), "Successfully detected 6 blue water bottles!");
    assert_ne!(outcome.rendered, preprocessing::preprocess(&outcome.original));
    assert_eq!(detector.seen, Some((64, 32)));
}

#[test]
fn nothing_found_leaves_image_untouched() {
    let dir = sample_dir();
    let config = AppConfig::default().with_sample_dir(dir.path());
    let source = SampleSource::from_config(&config);

    let outcome = run_detection(&mut CannedDetector::new(0), &source, "Data_Bottles.png", &config.preprocess, &Renderer::new()).unwrap();

    assert_eq!(outcome.count, 0);
    assert_eq!(outcome.status, StatusMessage::NoDetections);
    assert_eq!(outcome.status.to_string(), "No bottles detected.");
    assert_eq!(outcome.rendered, preprocessing::preprocess(&outcome.original));
}

#[test]
fn missing_sample_is_reported_not_panicked() {
    let dir = sample_dir();
    let config = AppConfig::default().with_sample_dir(dir.path());
    let source = SampleSource::from_config(&config);

    let err = run_detection(&mut CannedDetector::new(1), &source, "Example_Test_Bottles.png", &config.preprocess, &Renderer::new())
        .unwrap_err();
    assert!(matches!(err, DetectError::ImageNotFound { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn preprocess_keeps_shape_and_range() {
    let img = RgbImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, ((x + y) * 3) as u8]));
    let out = preprocessing::preprocess(&img);
    assert_eq!(out.dimensions(), img.dimensions());
    assert!(out.pixels().flat_map(|p| p.0).all(|v| v <= 175));
}

#[test]
fn normalisation_hits_both_ends() {
    let mut img = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
    img.put_pixel(0, 0, Rgb([10, 20, 30]));
    img.put_pixel(7, 7, Rgb([240, 250, 200]));

    let config = PreprocessConfig::default();
    let out = preprocessing::normalize_min_max(&img, config.normalize_min, config.normalize_max);
    let values: Vec<u8> = out.pixels().flat_map(|p| p.0).collect();
    assert_eq!(values.iter().min(), Some(&0));
    assert_eq!(values.iter().max(), Some(&175));
}
