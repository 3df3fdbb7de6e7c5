//! Letterboxing and tensor packing for the detector input.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use rayon::prelude::*;
use crate::data::X;

/// How a source image was placed inside the square model input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageTransformInfo {
    pub width_src: u32,
    pub height_src: u32,
    pub width_dst: u32,
    pub height_dst: u32,
    pub scale: f32,
    pub width_pad: f32,
    pub height_pad: f32,
}

impl ImageTransformInfo {
    /// Aspect-preserving fit of `(width_src, height_src)` into `(width_dst, height_dst)`,
    /// centred with the padding split evenly on both sides.
    pub fn letterbox(width_src: u32, height_src: u32, width_dst: u32, height_dst: u32) -> Self {
        let scale = (width_dst as f32 / width_src as f32).min(height_dst as f32 / height_src as f32);
        let new_w = ((width_src as f32 * scale).round() as u32).clamp(1, width_dst);
        let new_h = ((height_src as f32 * scale).round() as u32).clamp(1, height_dst);
        let dw = (width_dst - new_w) as f32 / 2.;
        let dh = (height_dst - new_h) as f32 / 2.;
        Self {
            width_src,
            height_src,
            width_dst,
            height_dst,
            scale,
            width_pad: (dw - 0.1).round().max(0.),
            height_pad: (dh - 0.1).round().max(0.),
        }
    }

    pub fn resized_width(&self) -> u32 {
        ((self.width_src as f32 * self.scale).round() as u32).clamp(1, self.width_dst)
    }

    pub fn resized_height(&self) -> u32 {
        ((self.height_src as f32 * self.scale).round() as u32).clamp(1, self.height_dst)
    }

    /// Maps a point from model-input space back to the source image.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.width_pad) / self.scale, (y - self.height_pad) / self.scale)
    }
}

pub fn to_fir_image<'a>(image: &RgbImage) -> Result<FirImage<'a>> {
    let (width, height) = image.dimensions();
    Ok(FirImage::from_vec_u8(width, height, image.as_raw().clone(), PixelType::U8x3)?)
}

/// Letterboxes `image` into a `target` x `target` canvas filled with `bg` and
/// returns the `[1, 3, target, target]` input tensor scaled to `[0, 1]`.
pub fn preprocess(image: &RgbImage, target: u32, bg: u8) -> Result<(X, ImageTransformInfo)> {
    let (w0, h0) = image.dimensions();
    if w0 == 0 || h0 == 0 {
        bail!("Cannot run detection on an empty {}x{} image", w0, h0);
    }
    if target == 0 {
        bail!("Inference size must be greater than 0");
    }

    let info = ImageTransformInfo::letterbox(w0, h0, target, target);
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();
    let src = to_fir_image(image)?;
    let padded = letterbox_image(&src, &info, bg, &mut resizer, &options)?;

    let flat = nchw_normalize_flat(&padded)?;
    let x = X::from_shape_vec(&[1, 3, target as usize, target as usize], flat)?;
    Ok((x, info))
}

fn letterbox_image<'a>(
    img: &FirImage,
    info: &ImageTransformInfo,
    bg: u8,
    resizer: &mut Resizer,
    resize_options: &ResizeOptions,
) -> Result<FirImage<'a>> {
    let (target_w, target_h) = (info.width_dst, info.height_dst);

    let mut padded = FirImage::from_vec_u8(
        target_w,
        target_h,
        vec![bg; (target_w * target_h * 3) as usize],
        PixelType::U8x3,
    )?;

    let mut cropped = CroppedImageMut::new(
        &mut padded,
        info.width_pad as u32,
        info.height_pad as u32,
        info.resized_width(),
        info.resized_height(),
    )?;
    resizer.resize(img, &mut cropped, resize_options)?;

    Ok(padded)
}

fn nchw_normalize_flat(img: &FirImage) -> Result<Vec<f32>> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let hw = w * h;
    let mut out = vec![0.0f32; buf.len()];
    out.par_chunks_mut(hw)
        .enumerate()
        .for_each(|(c, plane)| {
            for (i, v) in plane.iter_mut().enumerate() {
                *v = buf[3 * i + c] as f32 / 255.0;
            }
        });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn wide_image_is_padded_vertically() {
        let info = ImageTransformInfo::letterbox(1920, 1080, 1280, 1280);
        assert!((info.scale - 2. / 3.).abs() < 1e-6);
        assert_eq!(info.resized_width(), 1280);
        assert_eq!(info.resized_height(), 720);
        assert_eq!(info.width_pad, 0.);
        assert_eq!(info.height_pad, 280.);
    }

    #[test]
    fn model_points_map_back_to_source() {
        let info = ImageTransformInfo::letterbox(1920, 1080, 1280, 1280);
        let (x, y) = info.to_source(640., 280. + 360.);
        assert!((x - 960.).abs() < 1e-3);
        assert!((y - 540.).abs() < 1e-3);
    }

    #[test]
    fn tensor_is_nchw_and_padded_with_fill() {
        let image = RgbImage::from_pixel(8, 4, Rgb([255, 0, 51]));
        let (x, info) = preprocess(&image, 8, 114).unwrap();
        assert_eq!(x.shape(), &[1, 3, 8, 8]);
        assert_eq!(info.height_pad, 2.);

        // padding rows
        assert!((x[[0, 0, 0, 0]] - 114. / 255.).abs() < 1e-6);
        assert!((x[[0, 2, 7, 7]] - 114. / 255.).abs() < 1e-6);
        // image rows, one value per channel plane
        let tol = 1.5 / 255.;
        assert!((x[[0, 0, 3, 3]] - 1.).abs() < tol);
        assert!(x[[0, 1, 3, 3]].abs() < tol);
        assert!((x[[0, 2, 3, 3]] - 0.2).abs() < tol);
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(preprocess(&RgbImage::new(0, 0), 32, 114).is_err());
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(preprocess(&RgbImage::new(4, 4), 0, 114).is_err());
    }
}
