use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{CardError, CardResult};
use crate::foundation::math::unpremultiply;

/// Largest SVG raster edge.
const MAX_SVG_DIM: u32 = 8_192;

/// Decode encoded raster bytes (PNG, JPEG, WebP, ...) into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> CardResult<RgbaImage> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| CardError::decode(format!("image: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Load an image file, rasterizing `.svg` files.
///
/// SVGs are rasterized at their intrinsic size, scaled up so the result covers `min_size` when
/// given. A nonexistent file is [`CardError::AssetMissing`]; unreadable or undecodable bytes are
/// [`CardError::Decode`] or [`CardError::Other`].
pub fn load_image_file(path: &Path, min_size: Option<(u32, u32)>) -> CardResult<RgbaImage> {
    if !path.is_file() {
        return Err(CardError::asset_missing(path.display().to_string()));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;

    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let tree = parse_svg(&bytes)?;
        let (w, h) = svg_raster_size(&tree, min_size)?;
        return rasterize_svg(&tree, w, h);
    }

    decode_image(&bytes)
}

/// Parse SVG bytes into a `usvg` tree.
pub(crate) fn parse_svg(bytes: &[u8]) -> CardResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts).map_err(|e| CardError::decode(format!("svg: {e}")))
}

fn svg_raster_size(tree: &usvg::Tree, min_size: Option<(u32, u32)>) -> CardResult<(u32, u32)> {
    let size = tree.size();
    let (sw, sh) = (size.width(), size.height());
    if !(sw.is_finite() && sh.is_finite() && sw > 0.0 && sh > 0.0) {
        return Err(CardError::decode("svg has invalid width/height"));
    }

    let scale = min_size.map_or(1.0, |(w, h)| (w as f32 / sw).max(h as f32 / sh).max(1.0));
    let w = (sw * scale).ceil().max(1.0) as u32;
    let h = (sh * scale).ceil().max(1.0) as u32;
    if w > MAX_SVG_DIM || h > MAX_SVG_DIM {
        return Err(CardError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize `tree` stretched to `width x height`, returning straight RGBA8.
pub(crate) fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> CardResult<RgbaImage> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CardError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    let mut data = pixmap.take();
    for px in data.chunks_exact_mut(4) {
        let straight = unpremultiply([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&straight);
    }
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| CardError::decode("svg raster has unexpected length"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
