//! Detector construction and the seam the web layer talks to.

use image::RgbImage;
use crate::common::{BottleDetection, ModelConfig};
use crate::data::ConfigOrt;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;
use crate::error::DetectError;
use crate::utils;

/// Anything that turns one preprocessed RGB image into detections in that
/// image's pixel coordinates.
pub trait ObjectDetector: Send {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<BottleDetection>>;
}

impl ObjectDetector for OrtYOLO {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<BottleDetection>> {
        let ys = self.run(std::slice::from_ref(image))?;
        Ok(ys.into_iter().flat_map(|y| y.into_detections()).collect())
    }
}

/// Builds the ONNX detector once. A missing weights file or a model that
/// ONNX Runtime refuses to load is reported as a fatal [`DetectError`].
pub fn init_detector(model: &ModelConfig) -> Result<OrtYOLO, DetectError> {
    if !model.weights_path.is_file() {
        return Err(DetectError::ModelNotFound { path: model.weights_path.clone() });
    }

    let names = fallback_class_names(model);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let options = ConfigOrt::from(model)
        .with_names(&names)
        .with_profile(log::log_enabled!(log::Level::Debug));

    log::info!("Initializing ORT session with ({}) execution provider", model.inference_device);
    let mut yolo = OrtYOLO::new(options).map_err(|e| DetectError::ModelLoad(format!("{e:#}")))?;

    let size = yolo.size();
    for _ in 0..model.num_dry_run {
        yolo.detect(&RgbImage::new(size, size))
            .map_err(|e| DetectError::ModelLoad(format!("{e:#}")))?;
    }

    Ok(yolo)
}

/// Names used when the model carries no `names` metadata: the labels file
/// when it is readable and non-empty, otherwise the configured list.
fn fallback_class_names(model: &ModelConfig) -> Vec<String> {
    if let Some(labels_path) = &model.labels_path {
        match utils::file_to_vec(labels_path) {
            Ok(names) if !names.is_empty() => return names,
            Ok(_) => log::warn!("Labels file {} is empty, keeping configured class names", labels_path.display()),
            Err(err) => log::warn!("Unable to read labels file {}: {}", labels_path.display(), err),
        }
    }
    model.class_names.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn labels_file_replaces_configured_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blue bottle\ncap").unwrap();
        let model = ModelConfig::new().with_labels_path(file.path());
        assert_eq!(fallback_class_names(&model), vec!["blue bottle", "cap"]);
    }

    #[test]
    fn unreadable_labels_file_keeps_configured_names() {
        let model = ModelConfig::new().with_labels_path("/nonexistent/labels.txt");
        assert_eq!(fallback_class_names(&model), vec!["bottle"]);
    }

    #[test]
    fn missing_weights_are_reported_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelConfig::new().with_weights_path(dir.path().join("best11s.onnx"));
        match init_detector(&model) {
            Err(err @ DetectError::ModelNotFound { .. }) => assert!(err.is_fatal()),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unreadable_model_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let model = ModelConfig::new().with_weights_path(&path);
        assert!(matches!(init_detector(&model), Err(DetectError::ModelLoad(_))));
    }
}
