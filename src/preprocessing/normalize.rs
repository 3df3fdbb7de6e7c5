use image::RgbImage;

/// Linearly maps the global minimum sample (over all channels) to `lo` and
/// the global maximum to `hi`. A flat image maps entirely to `lo`.
pub fn normalize_min_max(image: &RgbImage, lo: u8, hi: u8) -> RgbImage {
    let (min, max) = image
        .as_raw()
        .iter()
        .fold((u8::MAX, u8::MIN), |(mn, mx), &v| (mn.min(v), mx.max(v)));

    let range = max as f64 - min as f64;
    let scale = if range > f64::EPSILON {
        (hi as f64 - lo as f64) / range
    } else {
        0.
    };
    let shift = lo as f64 - min as f64 * scale;

    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        *out = (v as f64 * scale + shift).round().clamp(0., 255.) as u8;
    }

    let mut out = image.clone();
    out.iter_mut().for_each(|v| *v = lut[*v as usize]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn extrema(image: &RgbImage) -> (u8, u8) {
        let raw = image.as_raw();
        (*raw.iter().min().unwrap(), *raw.iter().max().unwrap())
    }

    #[test]
    fn maps_extrema_to_target_range() {
        let image = RgbImage::from_fn(16, 8, |x, y| Rgb([20 + x as u8 * 10, 40 + y as u8, 60]));
        let out = normalize_min_max(&image, 0, 175);
        assert_eq!(extrema(&out), (0, 175));
    }

    #[test]
    fn range_is_shared_across_channels() {
        let image = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([10, 50, 110]) } else { Rgb([60, 100, 210]) });
        let out = normalize_min_max(&image, 0, 175);
        // min 10 and max 210 are global, so channel extrema differ per channel
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 35, 88]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([44, 79, 175]));
    }

    #[test]
    fn flat_image_goes_to_lower_bound() {
        let image = RgbImage::from_pixel(4, 4, Rgb([90, 90, 90]));
        let out = normalize_min_max(&image, 0, 175);
        assert_eq!(extrema(&out), (0, 0));
    }
}
