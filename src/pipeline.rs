//! One user action: load -> preprocess -> detect -> render.

use std::time::{Duration, Instant};
use image::RgbImage;
use crate::common::BottleDetection;
use crate::detectors::ObjectDetector;
use crate::error::DetectError;
use crate::preprocessing::{self, PreprocessConfig};
use crate::render::Renderer;
use crate::sample_source::SampleSource;
use crate::utils;

/// Status line shown under the result.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Success(usize),
    NoDetections,
    Error(String),
}

impl StatusMessage {
    pub fn from_count(count: usize) -> Self {
        if count > 0 {
            StatusMessage::Success(count)
        } else {
            StatusMessage::NoDetections
        }
    }

    /// `success`, `warning` or `error`.
    pub fn level(&self) -> &'static str {
        match self {
            StatusMessage::Success(_) => "success",
            StatusMessage::NoDetections => "warning",
            StatusMessage::Error(_) => "error",
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusMessage::Success(n) => write!(f, "Successfully detected {} blue water bottles!", n),
            StatusMessage::NoDetections => write!(f, "No bottles detected."),
            StatusMessage::Error(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<&DetectError> for StatusMessage {
    fn from(err: &DetectError) -> Self {
        StatusMessage::Error(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub original: RgbImage,
    pub rendered: RgbImage,
    pub count: usize,
    pub status: StatusMessage,
}

impl DetectionOutcome {
    pub fn caption(&self) -> String {
        format!("Detected Bottles: {}", self.count)
    }
}

/// A loaded sample and the filtered image the detector runs on.
#[derive(Debug, Clone)]
pub struct PreparedSample {
    pub name: String,
    pub original: RgbImage,
    pub processed: RgbImage,
}

impl PreparedSample {
    /// Draws `detections` on the preprocessed image the detector saw.
    pub fn into_outcome(self, detections: &[BottleDetection], renderer: &Renderer) -> DetectionOutcome {
        let (rendered, count) = renderer.render(&self.processed, detections);
        log::info!("Detected {} objects in {}", count, self.name);

        DetectionOutcome {
            original: self.original,
            rendered,
            count,
            status: StatusMessage::from_count(count),
        }
    }
}

/// Load and preprocess. Needs no detector, so it can run outside the detector lock.
pub fn prepare_sample(
    source: &SampleSource,
    name: &str,
    preprocess: &PreprocessConfig,
) -> Result<PreparedSample, DetectError> {
    let start = Instant::now();
    let mut elapsed = start.elapsed();

    let sample = source.load(name)?;
    elapsed = utils::trace("TIME", "Load sample", start, elapsed);

    let processed = preprocessing::preprocess_with(&sample, preprocess);
    utils::trace("TIME", "Preprocess", start, elapsed);

    Ok(PreparedSample {
        name: name.to_string(),
        original: sample.into_rgb8(),
        processed,
    })
}

pub fn detect_prepared(
    detector: &mut dyn ObjectDetector,
    prepared: &PreparedSample,
) -> Result<Vec<BottleDetection>, DetectError> {
    let start = Instant::now();
    let detections = detector
        .detect(&prepared.processed)
        .map_err(|e| DetectError::Inference(format!("{e:#}")))?;
    utils::trace("TIME", "Detect", start, Duration::ZERO);
    Ok(detections)
}

/// Runs the whole chain for sample `name`.
pub fn run_detection(
    detector: &mut dyn ObjectDetector,
    source: &SampleSource,
    name: &str,
    preprocess: &PreprocessConfig,
    renderer: &Renderer,
) -> Result<DetectionOutcome, DetectError> {
    let prepared = prepare_sample(source, name, preprocess)?;
    let detections = detect_prepared(detector, &prepared)?;
    Ok(prepared.into_outcome(&detections, renderer))
}
