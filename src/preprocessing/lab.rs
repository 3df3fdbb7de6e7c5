//! 8-bit CIELAB conversion (D65 white point).
//!
//! `L` is scaled from `0..=100` to `0..=255`, `a` and `b` are offset by 128.

use image::RgbImage;
use rayon::prelude::*;

const XN: f32 = 0.950456;
const ZN: f32 = 1.088754;
const LAB_EPS: f32 = 0.008856;
const LAB_INV_EPS: f32 = 0.206893;
const LAB_K: f32 = 7.787;
const LAB_OFFSET: f32 = 16. / 116.;

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1. / 2.4) - 0.055
    }
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_EPS {
        t.cbrt()
    } else {
        LAB_K * t + LAB_OFFSET
    }
}

fn lab_f_inv(t: f32) -> f32 {
    if t > LAB_INV_EPS {
        t * t * t
    } else {
        (t - LAB_OFFSET) / LAB_K
    }
}

fn to_u8(x: f32) -> u8 {
    x.round().clamp(0., 255.) as u8
}

fn linear_lut() -> [f32; 256] {
    let mut lut = [0f32; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = srgb_to_linear(i as f32 / 255.);
    }
    lut
}

pub(crate) fn rgb_to_lab_pixel(rgb: [u8; 3], lut: &[f32; 256]) -> [u8; 3] {
    let r = lut[rgb[0] as usize];
    let g = lut[rgb[1] as usize];
    let b = lut[rgb[2] as usize];

    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / XN;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / ZN;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    let l = if y > LAB_EPS { 116. * fy - 16. } else { 903.3 * y };
    let a = 500. * (fx - fy);
    let bb = 200. * (fy - fz);

    [to_u8(l * 255. / 100.), to_u8(a + 128.), to_u8(bb + 128.)]
}

pub(crate) fn lab_to_rgb_pixel(lab: [u8; 3]) -> [u8; 3] {
    let l = lab[0] as f32 * 100. / 255.;
    let a = lab[1] as f32 - 128.;
    let b = lab[2] as f32 - 128.;

    let fy = (l + 16.) / 116.;
    let fx = fy + a / 500.;
    let fz = fy - b / 200.;

    let x = lab_f_inv(fx) * XN;
    let y = lab_f_inv(fy);
    let z = lab_f_inv(fz) * ZN;

    let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
    let g = -0.969256 * x + 1.875991 * y + 0.041556 * z;
    let bl = 0.055648 * x - 0.204043 * y + 1.057311 * z;

    [
        to_u8(linear_to_srgb(r.clamp(0., 1.)) * 255.),
        to_u8(linear_to_srgb(g.clamp(0., 1.)) * 255.),
        to_u8(linear_to_srgb(bl.clamp(0., 1.)) * 255.),
    ]
}

/// Splits an RGB image into its `L`, `a` and `b` planes.
pub(crate) fn rgb_to_lab_planes(image: &RgbImage) -> [Vec<u8>; 3] {
    let lut = linear_lut();
    let lab: Vec<[u8; 3]> = image
        .as_raw()
        .par_chunks(3)
        .map(|c| rgb_to_lab_pixel([c[0], c[1], c[2]], &lut))
        .collect();

    let mut planes = [
        Vec::with_capacity(lab.len()),
        Vec::with_capacity(lab.len()),
        Vec::with_capacity(lab.len()),
    ];
    for px in lab {
        planes[0].push(px[0]);
        planes[1].push(px[1]);
        planes[2].push(px[2]);
    }
    planes
}

pub(crate) fn lab_planes_to_rgb(l: &[u8], a: &[u8], b: &[u8], width: u32, height: u32) -> RgbImage {
    let mut out = RgbImage::new(width, height);
    out.par_chunks_mut(3)
        .enumerate()
        .for_each(|(i, px)| {
            let rgb = lab_to_rgb_pixel([l[i], a[i], b[i]]);
            px.copy_from_slice(&rgb);
        });
    out
}
