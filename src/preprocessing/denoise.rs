//! Non-local means denoising for colour images.
//!
//! The image is moved to 8-bit CIELAB; luminance is filtered with `h` and the
//! two chroma planes are filtered jointly with `h_color`. For every offset in
//! the search window the squared patch distance of all pixels is read off an
//! integral image, so the cost per offset is linear in the pixel count.

use image::RgbImage;
use rayon::prelude::*;
use crate::preprocessing::lab;

/// Filter strengths and window sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseParams {
    pub h: f32,
    pub h_color: f32,
    pub template_window: usize,
    pub search_window: usize,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            h: 3.,
            h_color: 3.,
            template_window: 7,
            search_window: 21,
        }
    }
}

pub fn denoise_colored(image: &RgbImage, params: &DenoiseParams) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let (w, h) = (width as usize, height as usize);

    let [l, a, b] = lab::rgb_to_lab_planes(image);
    let l = nl_means(&[&l], w, h, params.h, params.template_window, params.search_window);
    let ab = nl_means(&[&a, &b], w, h, params.h_color, params.template_window, params.search_window);

    lab::lab_planes_to_rgb(&l[0], &ab[0], &ab[1], width, height)
}

/// Filters a group of planes that share one set of patch weights.
pub(crate) fn nl_means(
    planes: &[&[u8]],
    width: usize,
    height: usize,
    h: f32,
    template_window: usize,
    search_window: usize,
) -> Vec<Vec<u8>> {
    let cn = planes.len();
    let n = width * height;
    let tr = (template_window / 2) as isize;
    let sr = (search_window / 2) as isize;
    let inv_h2 = 1. / (h * h).max(f32::EPSILON);

    let mut weight_sum = vec![0f32; n];
    let mut acc = vec![0f32; n * cn];
    let mut diff = vec![0u64; n];
    let mut integral = vec![0u64; (width + 1) * (height + 1)];

    let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

    for dy in -sr..=sr {
        for dx in -sr..=sr {
            diff.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    let qy = clamp(y as isize + dy, height);
                    for (x, d) in row.iter_mut().enumerate() {
                        let qx = clamp(x as isize + dx, width);
                        let mut sum = 0u64;
                        for p in planes {
                            let v = p[y * width + x] as i64 - p[qy * width + qx] as i64;
                            sum += (v * v) as u64;
                        }
                        *d = sum;
                    }
                });

            let stride = width + 1;
            for y in 0..height {
                let mut row_sum = 0u64;
                for x in 0..width {
                    row_sum += diff[y * width + x];
                    integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
                }
            }

            let integral = &integral;
            weight_sum
                .par_chunks_mut(width)
                .zip(acc.par_chunks_mut(width * cn))
                .enumerate()
                .for_each(|(y, (w_row, acc_row))| {
                    let y0 = clamp(y as isize - tr, height);
                    let y1 = clamp(y as isize + tr, height) + 1;
                    let qy = clamp(y as isize + dy, height);
                    for x in 0..width {
                        let x0 = clamp(x as isize - tr, width);
                        let x1 = clamp(x as isize + tr, width) + 1;
                        let ssd = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                            - integral[y0 * stride + x1]
                            - integral[y1 * stride + x0];
                        let count = ((y1 - y0) * (x1 - x0) * cn) as f32;
                        let weight = (-(ssd as f32 / count) * inv_h2).exp();

                        let qx = clamp(x as isize + dx, width);
                        w_row[x] += weight;
                        for (c, p) in planes.iter().enumerate() {
                            acc_row[x * cn + c] += weight * p[qy * width + qx] as f32;
                        }
                    }
                });
        }
    }

    let mut out = vec![vec![0u8; n]; cn];
    for (c, plane) in out.iter_mut().enumerate() {
        plane
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, v)| {
                *v = (acc[i * cn + c] / weight_sum[i]).round().clamp(0., 255.) as u8;
            });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn flat_image_is_unchanged() {
        let image = RgbImage::from_pixel(24, 16, Rgb([0, 0, 0]));
        let out = denoise_colored(&image, &DenoiseParams::default());
        assert_eq!(out, image);
    }

    #[test]
    fn preserves_dimensions() {
        let image = RgbImage::from_fn(33, 17, |x, y| Rgb([(x * 7) as u8, (y * 13) as u8, 90]));
        let out = denoise_colored(&image, &DenoiseParams::default());
        assert_eq!(out.dimensions(), (33, 17));
    }

    #[test]
    fn isolated_spike_is_attenuated() {
        let mut plane = vec![100u8; 15 * 15];
        plane[7 * 15 + 7] = 160;
        let out = nl_means(&[&plane], 15, 15, 30., 3, 7);
        assert!(out[0][7 * 15 + 7] < 160);
        assert_eq!(out[0][0], 100);
    }

    #[test]
    fn strong_edges_survive_weak_filtering() {
        let plane: Vec<u8> = (0..20 * 20).map(|i| if i % 20 < 10 { 0 } else { 200 }).collect();
        let out = nl_means(&[&plane], 20, 20, 3., 7, 21);
        assert_eq!(out[0][5 * 20 + 2], 0);
        assert_eq!(out[0][5 * 20 + 17], 200);
    }
}
