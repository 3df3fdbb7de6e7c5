use std::path::{Path, PathBuf};
use image::RgbImage;

/// A decoded sample, kept in the decoder's native (RGB) channel order.
#[derive(Debug, Clone, Default)]
pub struct SampleImage {
    pub name: String,
    pub path: PathBuf,
    pub image: RgbImage,
    pub img_width: u32,
    pub img_height: u32,
}

impl std::ops::Deref for SampleImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl SampleImage {
    pub fn new(name: &str, path: &Path, image: RgbImage) -> Self {
        let (img_width, img_height) = image.dimensions();
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            image,
            img_width,
            img_height,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.img_width, self.img_height)
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.image
    }
}
