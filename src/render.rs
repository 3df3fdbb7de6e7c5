//! Draws detections onto a copy of the image shown to the user.

use std::path::Path;
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use crate::common::BottleDetection;

const BOX_THICKNESS: i32 = 2;
const LABEL_HEIGHT: f32 = 18.;
const LABEL_TEXT_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

pub fn get_class_colour(class: usize) -> Rgb<u8> {
    match class {
        0 => Rgb([0, 0, 255]),      // blue (bottles)
        1 => Rgb([0, 255, 0]),      // green
        2 => Rgb([255, 0, 0]),      // red
        _ => Rgb([128, 0, 128]),    // purple (everything else)
    }
}

pub struct Renderer {
    /// Labels are only drawn when a font is available.
    font: Option<FontArc>,
}

impl Default for Renderer {
    fn default() -> Self {
        let font = match FontArc::try_from_slice(BUNDLED_FONT) {
            Ok(font) => Some(font),
            Err(_) => {
                log::warn!("Bundled label font failed to parse, labels disabled");
                None
            }
        };
        Self { font }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").field("labels", &self.font.is_some()).finish()
    }
}

impl Renderer {
    /// Renderer with the bundled DejaVu Sans label font.
    pub fn new() -> Self {
        Default::default()
    }

    /// Uses the TTF at `path` for labels. Without a path, or when it cannot
    /// be loaded, the bundled font is kept.
    pub fn with_font_path(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        let font = match std::fs::read(path) {
            Ok(data) => match FontArc::try_from_vec(data) {
                Ok(font) => Some(font),
                Err(_) => {
                    log::warn!("Failed to parse font file {}, using the bundled font", path.display());
                    None
                }
            },
            Err(err) => {
                log::warn!("Unable to read font file {}: {}, using the bundled font", path.display(), err);
                None
            }
        };
        match font {
            Some(font) => Self { font: Some(font) },
            None => Self::default(),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Returns the annotated copy and the number of detections.
    pub fn render(&self, image: &RgbImage, detections: &[BottleDetection]) -> (RgbImage, usize) {
        let mut canvas = image.clone();
        let (width, height) = canvas.dimensions();

        for det in detections {
            let Some(rect) = det_to_rect(det, width, height) else {
                continue;
            };
            let colour = get_class_colour(det.class_id.max(0) as usize);

            for t in 0..BOX_THICKNESS {
                let (w, h) = (rect.width() as i32 - 2 * t, rect.height() as i32 - 2 * t);
                if w <= 0 || h <= 0 {
                    break;
                }
                let inner = Rect::at(rect.left() + t, rect.top() + t).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, inner, colour);
            }

            if let Some(font) = &self.font {
                self.draw_label(&mut canvas, font, &rect, colour, &det.caption());
            }
        }

        (canvas, detections.len())
    }

    fn draw_label(&self, canvas: &mut RgbImage, font: &FontArc, rect: &Rect, colour: Rgb<u8>, caption: &str) {
        let scale = PxScale::from(LABEL_HEIGHT);
        let (text_w, text_h) = text_size(scale, font, caption);
        let strip_h = text_h as i32 + 4;

        // above the box when there is room, inside it otherwise
        let top = if rect.top() >= strip_h { rect.top() - strip_h } else { rect.top() };
        let strip = Rect::at(rect.left(), top).of_size(text_w + 4, strip_h as u32);

        draw_filled_rect_mut(canvas, strip, colour);
        draw_text_mut(canvas, LABEL_TEXT_COLOUR, rect.left() + 2, top + 2, scale, font, caption);
    }
}

/// Pixel rectangle of a detection clamped to the image, `None` when nothing is left.
fn det_to_rect(det: &BottleDetection, width: u32, height: u32) -> Option<Rect> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x1, y1, x2, y2) = det.bbox.xy1_xy2();
    if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
        return None;
    }

    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);
    let left = x1.round().clamp(0., max_x) as i32;
    let top = y1.round().clamp(0., max_y) as i32;
    let right = x2.round().clamp(0., max_x) as i32;
    let bottom = y2.round().clamp(0., max_y) as i32;

    (right > left && bottom > top)
        .then(|| Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32))
}
