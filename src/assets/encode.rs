use image::RgbaImage;

use crate::foundation::error::{CardError, CardResult};

/// Encode a straight-alpha raster as a PNG byte stream.
pub fn encode_png(image: &RgbaImage) -> CardResult<Vec<u8>> {
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| CardError::serde(format!("png encode: {e}")))?;
    Ok(out.into_inner())
}
