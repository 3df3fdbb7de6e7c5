use std::path::PathBuf;
use crate::common::{AppConfig, SampleImage};
use crate::error::DetectError;

/// The fixed set of sample images a visitor can pick from.
#[derive(Debug, Clone)]
pub struct SampleSource {
    names: Vec<String>,
    dir: PathBuf,
}

impl SampleSource {
    pub fn new<P: Into<PathBuf>>(names: &[String], dir: P) -> Self {
        Self {
            names: names.to_vec(),
            dir: dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.samples, config.sample_dir.clone())
    }

    /// Names in display order. The first one is the default selection.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn default_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Reads and decodes `name` from the sample directory, converted to RGB.
    pub fn load(&self, name: &str) -> Result<SampleImage, DetectError> {
        if !self.contains(name) {
            return Err(DetectError::UnknownSample(name.to_string()));
        }

        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(DetectError::ImageNotFound { name: name.to_string(), path });
        }

        let image = image::open(&path).map_err(|source| DetectError::ImageDecode {
            name: name.to_string(),
            source,
        })?;
        log::debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());

        Ok(SampleImage::new(name, &path, image.to_rgb8()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn source(dir: &std::path::Path) -> SampleSource {
        SampleSource::new(&["a.png".to_string(), "b.png".to_string()], dir)
    }

    #[test]
    fn loads_rgb_sample_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(6, 4, Rgb([10, 20, 30])).save(dir.path().join("a.png")).unwrap();

        let sample = source(dir.path()).load("a.png").unwrap();
        assert_eq!(sample.dimensions(), (6, 4));
        assert_eq!(sample.name, "a.png");
        assert_eq!(sample.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn missing_file_is_image_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = source(dir.path()).load("b.png").unwrap_err();
        assert!(matches!(err, DetectError::ImageNotFound { .. }));
        assert_eq!(err.to_string(), "Image `b.png` not found in the current directory.");
    }

    #[test]
    fn names_outside_the_list_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::new(2, 2).save(dir.path().join("c.png")).unwrap();
        assert!(matches!(source(dir.path()).load("c.png"), Err(DetectError::UnknownSample(_))));
        assert!(matches!(source(dir.path()).load("../a.png"), Err(DetectError::UnknownSample(_))));
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"definitely not a png").unwrap();
        assert!(matches!(source(dir.path()).load("a.png"), Err(DetectError::ImageDecode { .. })));
    }

    #[test]
    fn first_name_is_default() {
        let src = source(std::path::Path::new("."));
        assert_eq!(src.default_name(), Some("a.png"));
        assert_eq!(src.names().len(), 2);
    }
}
