//! Options for building the ONNX Runtime detector.

use std::path::PathBuf;
use crate::common::{InferenceDevice, ModelConfig};

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: PathBuf,
    pub device: InferenceDevice,
    pub model_size: u32,
    pub profile: bool,

    pub conf: f32,
    pub iou: f32,
    pub max_det: usize,
    pub names: Option<Vec<String>>,
    pub letterbox_fill: u8,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: PathBuf::new(),
            device: InferenceDevice::CPU,
            model_size: 640,
            profile: false,

            conf: 0.25,
            iou: 0.45,
            max_det: 300,
            names: None,
            letterbox_fill: 114,
        }
    }
}

impl From<&ModelConfig> for ConfigOrt {
    fn from(model: &ModelConfig) -> Self {
        let names = if model.class_names.is_empty() {
            None
        } else {
            Some(model.class_names.clone())
        };
        Self::new()
            .with_model(model.weights_path.clone())
            .with_device(model.inference_device)
            .with_model_size(model.inference_size)
            .with_conf(model.confidence_threshold)
            .with_iou(model.overlap_threshold)
            .with_opt_names(names)
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model<P: Into<PathBuf>>(mut self, onnx_path: P) -> Self {
        self.onnx_path = onnx_path.into();
        self
    }

    pub fn with_model_size(mut self, n: u32) -> Self {
        self.model_size = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|x| x.to_string()).collect::<Vec<String>>());
        self
    }

    fn with_opt_names(mut self, names: Option<Vec<String>>) -> Self {
        self.names = names;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = x;
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.conf = x;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_from_model_config() {
        let model = ModelConfig::new()
            .with_weights_path("weights/bottles.onnx")
            .with_class_names(&["bottle"]);
        let config = ConfigOrt::from(&model);
        assert_eq!(config.onnx_path, PathBuf::from("weights/bottles.onnx"));
        assert_eq!(config.model_size, 1280);
        assert_eq!(config.conf, 0.1);
        assert_eq!(config.iou, 0.1);
        assert_eq!(config.names, Some(vec!["bottle".to_string()]));
        assert_eq!(config.max_det, 300);
    }

    #[test]
    fn model_overrides_reach_the_engine_options() {
        let model = ModelConfig::new()
            .with_device(InferenceDevice::CUDA(1))
            .with_confidence_threshold(0.3)
            .with_overlap_threshold(0.45)
            .with_inference_size(640)
            .with_dry_run(0);
        let config = ConfigOrt::from(&model);
        assert_eq!(config.device, InferenceDevice::CUDA(1));
        assert_eq!((config.conf, config.iou), (0.3, 0.45));
        assert_eq!(config.model_size, 640);
        assert_eq!(model.num_dry_run, 0);
    }

    #[test]
    fn empty_class_list_means_no_names() {
        let model = ModelConfig { class_names: vec![], ..Default::default() };
        assert!(ConfigOrt::from(&model).names.is_none());
    }
}
