mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod detectors;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod render;
pub mod sample_source;
pub mod web;

pub use crate::common::{AppConfig, BottleBox, BottleDetection, InferenceDevice, ModelConfig, SampleImage};
pub use crate::detection_runners::OrtYOLO;
pub use crate::detectors::{init_detector, ObjectDetector};
pub use crate::error::DetectError;
pub use crate::pipeline::{run_detection, DetectionOutcome, StatusMessage};
pub use crate::render::Renderer;
pub use crate::sample_source::SampleSource;

pub type Result<T, E = DetectError> = std::result::Result<T, E>;
