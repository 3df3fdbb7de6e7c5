use std::path::{Path, PathBuf};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::common::ModelConfig;
use crate::preprocessing::PreprocessConfig;

pub const DEFAULT_CONFIG_FILE: &str = "bottle_detect.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8501";
pub const DEFAULT_SAMPLES: [&str; 2] = ["Data_Bottles.png", "Example_Test_Bottles.png"];

/// Top level configuration of the demo server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sample file names offered in the selection control, in display order.
    pub samples: Vec<String>,
    pub sample_dir: PathBuf,
    pub model: ModelConfig,
    pub preprocess: PreprocessConfig,
    /// TTF used for box labels instead of the bundled DejaVu Sans.
    pub font_path: Option<PathBuf>,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES.iter().map(|x| x.to_string()).collect(),
            sample_dir: PathBuf::from("."),
            model: ModelConfig::default(),
            preprocess: PreprocessConfig::default(),
            font_path: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Rejects values the detector cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model.inference_size == 0 {
            anyhow::bail!("`model.inference_size` must be greater than 0");
        }
        Ok(())
    }

    /// Reads `path` when it exists, otherwise falls back to the built-in deployment values.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_json_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_samples(mut self, samples: &[&str]) -> Self {
        self.samples = samples.iter().map(|x| x.to_string()).collect();
        self
    }

    pub fn with_sample_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.sample_dir = dir.into();
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessConfig) -> Self {
        self.preprocess = preprocess;
        self
    }

    pub fn with_font_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn with_bind_addr(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }
}
