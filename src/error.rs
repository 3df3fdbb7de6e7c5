use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the user. Each one is rendered as a status message and
/// none of them stops the server.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Model file not found at `{}`. Please ensure the model is in the correct directory.", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Error loading model: {0}")]
    ModelLoad(String),

    #[error("Image `{name}` not found in the current directory.")]
    ImageNotFound { name: String, path: PathBuf },

    #[error("Image `{name}` could not be decoded: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("`{0}` is not one of the available sample images.")]
    UnknownSample(String),

    #[error("Detection failed: {0}")]
    Inference(String),
}

impl DetectError {
    /// Model errors disable detection for the lifetime of the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DetectError::ModelNotFound { .. } | DetectError::ModelLoad(_))
    }
}
