use image::{DynamicImage, RgbImage};
use imageproc::filter::separable_filter_equal;

// Fixed binomial kernels used for small odd sizes when sigma is not given.
const SMALL_GAUSSIAN_TAB: [&[f32]; 4] = [
    &[1.],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Sigma derived from the kernel size when none is given.
pub fn auto_sigma(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.) * 0.5 - 1.) + 0.8
}

/// 1-D normalised Gaussian kernel. Even sizes are bumped to the next odd size.
pub fn gaussian_kernel(ksize: usize, sigma: f32) -> Vec<f32> {
    let ksize = ksize.max(1) | 1;
    if sigma <= 0. && ksize <= 7 {
        return SMALL_GAUSSIAN_TAB[ksize / 2].to_vec();
    }

    let sigma = if sigma > 0. { sigma } else { auto_sigma(ksize) };
    let center = (ksize / 2) as f32;
    let scale = -0.5 / (sigma * sigma);
    let kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.into_iter().map(|k| k / sum).collect()
}

/// Separable Gaussian blur. Filtering runs in floating point and is rounded back to 8 bits.
pub fn gaussian_smooth(image: &RgbImage, ksize: usize, sigma: f32) -> RgbImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let kernel = gaussian_kernel(ksize, sigma);
    let float = DynamicImage::ImageRgb8(image.clone()).into_rgb32f();
    let blurred = separable_filter_equal(&float, &kernel);
    DynamicImage::ImageRgb32F(blurred).into_rgb8()
}
