use std::sync::Arc;
use parking_lot::Mutex;
use crate::common::AppConfig;
use crate::detectors::ObjectDetector;
use crate::error::DetectError;
use crate::render::Renderer;
use crate::sample_source::SampleSource;

/// The loaded model, shared by every request. The lock serialises inference.
pub type SharedDetector = Arc<Mutex<Box<dyn ObjectDetector>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub source: SampleSource,
    pub renderer: Arc<Renderer>,
    detector: Result<SharedDetector, String>,
}

impl AppState {
    /// `detector` is the outcome of start-up loading. A load error is kept
    /// and shown instead of the controls for the lifetime of the process.
    pub fn new(config: AppConfig, detector: Result<Box<dyn ObjectDetector>, DetectError>) -> Self {
        let detector = detector
            .map(|d| Arc::new(Mutex::new(d)))
            .map_err(|e| e.to_string());
        let renderer = Renderer::with_font_path(config.font_path.as_deref());
        Self {
            source: SampleSource::from_config(&config),
            config: Arc::new(config),
            renderer: Arc::new(renderer),
            detector,
        }
    }

    pub fn detector(&self) -> Result<&SharedDetector, &str> {
        self.detector.as_ref().map_err(String::as_str)
    }

    pub fn model_error(&self) -> Option<&str> {
        self.detector().err()
    }

    /// The requested sample when it is one of ours, otherwise the first one.
    pub fn resolve_sample<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(name) if self.source.contains(name) => name,
            _ => self.source.default_name().unwrap_or_default(),
        }
    }
}
