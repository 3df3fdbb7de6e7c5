use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::common::inference_device::InferenceDevice;

pub const DEFAULT_WEIGHTS_PATH: &str = "best11s.onnx";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.1;
pub const DEFAULT_OVERLAP_THRESHOLD: f32 = 0.1;
pub const DEFAULT_INFERENCE_SIZE: u32 = 1280;

/// Everything needed to load the detector and run it with the deployment thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights_path: PathBuf,
    /// Optional labels file, one class name per line.
    pub labels_path: Option<PathBuf>,
    /// Fallback names when neither the ONNX metadata nor `labels_path` provide any.
    pub class_names: Vec<String>,
    pub inference_device: InferenceDevice,
    pub confidence_threshold: f32,
    pub overlap_threshold: f32,
    /// Square side the image is letterboxed to before inference.
    pub inference_size: u32,
    pub num_dry_run: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::from(DEFAULT_WEIGHTS_PATH),
            labels_path: None,
            class_names: vec!["bottle".to_string()],
            inference_device: InferenceDevice::CPU,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            inference_size: DEFAULT_INFERENCE_SIZE,
            num_dry_run: 1,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_weights_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.weights_path = path.into();
        self
    }

    pub fn with_labels_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.labels_path = Some(path.into());
        self
    }

    pub fn with_class_names(mut self, names: &[&str]) -> Self {
        self.class_names = names.iter().map(|x| x.to_string()).collect();
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_confidence_threshold(mut self, x: f32) -> Self {
        self.confidence_threshold = x;
        self
    }

    pub fn with_overlap_threshold(mut self, x: f32) -> Self {
        self.overlap_threshold = x;
        self
    }

    pub fn with_inference_size(mut self, x: u32) -> Self {
        self.inference_size = x;
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Confidence Threshold: {}\n\
        IoU Threshold: {}",
               self.weights_path.display(), self.inference_device,
               self.inference_size, self.inference_size,
               self.confidence_threshold, self.overlap_threshold)
    }
}
