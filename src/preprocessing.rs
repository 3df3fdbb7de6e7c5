//! Fixed filter chain applied before detection: colour denoise, min/max
//! normalisation and Gaussian smoothing.

mod denoise;
mod lab;
mod normalize;
mod smooth;

use std::time::Instant;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use crate::utils;

pub use denoise::{denoise_colored, DenoiseParams};
pub use normalize::normalize_min_max;
pub use smooth::{auto_sigma, gaussian_kernel, gaussian_smooth};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub denoise_h: f32,
    pub denoise_h_color: f32,
    pub template_window: usize,
    pub search_window: usize,
    pub normalize_min: u8,
    /// Upper bound of the normalised range. 175, not 255.
    pub normalize_max: u8,
    pub blur_kernel_size: usize,
    /// `0` derives sigma from the kernel size.
    pub blur_sigma: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        let denoise = DenoiseParams::default();
        Self {
            denoise_h: denoise.h,
            denoise_h_color: denoise.h_color,
            template_window: denoise.template_window,
            search_window: denoise.search_window,
            normalize_min: 0,
            normalize_max: 175,
            blur_kernel_size: 5,
            blur_sigma: 0.,
        }
    }
}

impl PreprocessConfig {
    pub fn denoise_params(&self) -> DenoiseParams {
        DenoiseParams {
            h: self.denoise_h,
            h_color: self.denoise_h_color,
            template_window: self.template_window,
            search_window: self.search_window,
        }
    }
}

/// Runs the chain with the deployment parameters.
pub fn preprocess(image: &RgbImage) -> RgbImage {
    preprocess_with(image, &PreprocessConfig::default())
}

pub fn preprocess_with(image: &RgbImage, config: &PreprocessConfig) -> RgbImage {
    let start = Instant::now();
    let mut elapsed = start.elapsed();

    let denoised = denoise_colored(image, &config.denoise_params());
    elapsed = utils::trace("TIME", "Denoise", start, elapsed);

    let normalized = normalize_min_max(&denoised, config.normalize_min, config.normalize_max);
    elapsed = utils::trace("TIME", "Normalize", start, elapsed);

    let smoothed = gaussian_smooth(&normalized, config.blur_kernel_size, config.blur_sigma);
    utils::trace("TIME", "Smooth", start, elapsed);

    smoothed
}
