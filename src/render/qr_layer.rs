use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use crate::binding::resolve_qr_content;
use crate::foundation::error::{CardError, CardResult};
use crate::model::template::{ErrorCorrection, QrCodeLayer};
use crate::render::compositor::{LayerOutcome, SkipReason};
use crate::render::surface::Surface;
use crate::render::{LayerContext, pixel_box};

/// Pixels per module in the unscaled symbol.
pub(crate) const MODULE_PX: u32 = 10;
/// Quiet zone around the symbol, in modules.
pub(crate) const QUIET_ZONE: u32 = 1;

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Draw a QR layer. The symbol and its quiet zone replace every pixel of the layer box.
pub(crate) fn render_qr(
    layer: &QrCodeLayer,
    cx: &mut LayerContext<'_>,
    target: &mut Surface,
) -> CardResult<LayerOutcome> {
    let content = resolve_qr_content(layer, cx.record);
    if content.is_empty() {
        return Ok(LayerOutcome::Skipped(SkipReason::EmptyContent));
    }
    let Some((x, y, bw, bh)) = pixel_box(&layer.common) else {
        return Ok(LayerOutcome::Skipped(SkipReason::EmptyBox));
    };

    let symbol = qr_symbol(&content, layer)?;
    let symbol = if symbol.dimensions() == (bw, bh) {
        symbol
    } else {
        imageops::resize(&symbol, bw, bh, FilterType::Lanczos3)
    };
    target.replace(&Surface::from_rgba_image(&symbol)?, x, y);
    Ok(LayerOutcome::Painted)
}

/// Unscaled symbol raster: `MODULE_PX` pixels per module plus the quiet zone.
pub(crate) fn qr_symbol(content: &str, layer: &QrCodeLayer) -> CardResult<RgbaImage> {
    let level = EcLevel::from(layer.error_correction_level);
    let code = QrCode::with_error_correction_level(content.as_bytes(), level)
        .map_err(|e| CardError::layer_render(format!("qr encode failed: {e}")))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * MODULE_PX;

    let fg = Rgba(layer.foreground_color.to_array());
    let bg = Rgba(layer.background_color.to_array());
    Ok(RgbaImage::from_fn(side, side, |px, py| {
        let (mx, my) = (px / MODULE_PX, py / MODULE_PX);
        let inside = (QUIET_ZONE..QUIET_ZONE + modules).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + modules).contains(&my);
        if !inside {
            return bg;
        }
        let i = ((my - QUIET_ZONE) * modules + (mx - QUIET_ZONE)) as usize;
        match colors.get(i) {
            Some(qrcode::Color::Dark) => fg,
            _ => bg,
        }
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/render/qr_layer.rs"]
mod tests;
