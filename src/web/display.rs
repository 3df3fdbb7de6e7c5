use std::io::Cursor;
use anyhow::Result;
use base64::Engine;
use image::{ImageFormat, RgbImage};

/// Encodes an RGB image as a PNG `data:` URI for an `<img src>`.
pub fn png_data_uri(image: &RgbImage) -> Result<String> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buf)
    ))
}
