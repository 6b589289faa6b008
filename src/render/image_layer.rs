use std::borrow::Cow;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use kurbo::{Rect, Shape as _, Stroke};

use crate::assets::decode::load_image_file;
use crate::assets::resolve::AssetLookup;
use crate::binding::{ImageSource, resolve_image_source};
use crate::foundation::error::CardResult;
use crate::model::template::{BorderStyle, ImageBorder, ImageLayer, ImageShadow, ObjectFit};
use crate::render::blur::kernel_for_blur;
use crate::render::compositor::{LayerOutcome, SkipReason};
use crate::render::shape_layer::stroke_outline;
use crate::render::surface::{PATH_TOLERANCE, Surface, bezpath_to_cpu};
use crate::render::{LayerContext, pixel_box};

/// Draw an image layer: resolve the bitmap, fit it to the box, mask, shadow, paste, border.
pub(crate) fn render_image(
    layer: &ImageLayer,
    cx: &mut LayerContext<'_>,
    target: &mut Surface,
) -> CardResult<LayerOutcome> {
    let Some((x, y, bw, bh)) = pixel_box(&layer.common) else {
        return Ok(LayerOutcome::Skipped(SkipReason::EmptyBox));
    };

    let source: Cow<'_, RgbaImage> = match resolve_image_source(layer, cx.record, cx.photo) {
        ImageSource::Empty => return Ok(LayerOutcome::Skipped(SkipReason::EmptyContent)),
        ImageSource::Portrait(img) => Cow::Borrowed(img),
        ImageSource::Reference(reference) => match cx.assets.resolve(reference) {
            AssetLookup::Found(path) => Cow::Owned(load_image_file(&path, Some((bw, bh)))?),
            AssetLookup::Missing(path) => {
                let missing = path.display().to_string();
                return Ok(LayerOutcome::Skipped(SkipReason::AssetMissing(missing)));
            }
            AssetLookup::Unsupported(msg) => {
                return Ok(LayerOutcome::Skipped(SkipReason::AssetMissing(msg)));
            }
        },
    };
    if source.width() == 0 || source.height() == 0 {
        return Ok(LayerOutcome::Skipped(SkipReason::EmptyContent));
    }

    let fitted = fit_image(&source, layer.object_fit, bw, bh);
    let mut picture = Surface::from_rgba_image(&fitted)?;
    let radius = f64::from(layer.border_radius);
    if radius > 0.0 {
        picture.apply_rounded_mask(radius)?;
    }

    if let Some(shadow) = layer.shadow.as_ref().filter(|s| s.color.a > 0) {
        paint_shadow(target, shadow, x, y, picture.width(), picture.height(), radius)?;
    }
    target.draw_over(&picture, x, y, 1.0);

    if let Some(border) = layer.border.as_ref() {
        let rect = Rect::new(x as f64, y as f64, x as f64 + f64::from(bw), y as f64 + f64::from(bh));
        paint_border(target, border, rect)?;
    }
    Ok(LayerOutcome::Painted)
}

/// Fit `img` into a `bw` x `bh` box.
///
/// `None` keeps the native size; every other mode returns exactly the box size.
pub(crate) fn fit_image(img: &RgbaImage, fit: ObjectFit, bw: u32, bh: u32) -> RgbaImage {
    let (iw, ih) = img.dimensions();
    match fit {
        ObjectFit::None => img.clone(),
        _ if (iw, ih) == (bw, bh) => img.clone(),
        ObjectFit::Fill => imageops::resize(img, bw, bh, FilterType::Lanczos3),
        ObjectFit::Cover => {
            let scale = (f64::from(bw) / f64::from(iw)).max(f64::from(bh) / f64::from(ih));
            let cw = ((f64::from(bw) / scale).round() as u32).clamp(1, iw);
            let ch = ((f64::from(bh) / scale).round() as u32).clamp(1, ih);
            let cropped = imageops::crop_imm(img, (iw - cw) / 2, (ih - ch) / 2, cw, ch).to_image();
            imageops::resize(&cropped, bw, bh, FilterType::Lanczos3)
        }
        ObjectFit::Contain => {
            let scale = (f64::from(bw) / f64::from(iw)).min(f64::from(bh) / f64::from(ih));
            let nw = ((f64::from(iw) * scale).round() as u32).clamp(1, bw);
            let nh = ((f64::from(ih) * scale).round() as u32).clamp(1, bh);
            let scaled = imageops::resize(img, nw, nh, FilterType::Lanczos3);
            let mut boxed = RgbaImage::new(bw, bh);
            imageops::replace(
                &mut boxed,
                &scaled,
                i64::from((bw - nw) / 2),
                i64::from((bh - nh) / 2),
            );
            boxed
        }
    }
}

fn paint_shadow(
    target: &mut Surface,
    shadow: &ImageShadow,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    radius: f64,
) -> CardResult<()> {
    let spread = f64::from(shadow.spread).max(0.0);
    let margin = kernel_for_blur(shadow.blur).map_or(0.0, |(r, _)| f64::from(r) + 2.0);
    let pad = spread + margin;
    let sw = (f64::from(w) + 2.0 * pad).ceil() as u32;
    let sh = (f64::from(h) + 2.0 * pad).ceil() as u32;

    let mut buf = Surface::new(sw, sh)?;
    let shape = Rect::from_origin_size(
        (margin, margin),
        (f64::from(w) + 2.0 * spread, f64::from(h) + 2.0 * spread),
    );
    let r = if radius > 0.0 { radius + spread } else { 0.0 };
    let r = r.min(shape.width().min(shape.height()) / 2.0);
    let path = kurbo::RoundedRect::from_rect(shape, r).to_path(PATH_TOLERANCE);
    buf.paint(|ctx| {
        ctx.set_paint(shadow.color.to_cpu());
        ctx.fill_path(&bezpath_to_cpu(&path));
        Ok(())
    })?;

    let blurred = buf.blurred(shadow.blur)?;
    let ox = (x as f64 + f64::from(shadow.offset_x) - pad).floor() as i64;
    let oy = (y as f64 + f64::from(shadow.offset_y) - pad).floor() as i64;
    target.draw_over(&blurred, ox, oy, 1.0);
    Ok(())
}

/// Rectangle border stroked inside `rect`, on top of the image and ignoring its corner radius.
fn paint_border(target: &mut Surface, border: &ImageBorder, rect: Rect) -> CardResult<()> {
    let width = f64::from(border.width);
    if width.is_nan() || width <= 0.0 || border.color.a == 0 {
        return Ok(());
    }
    let inner = rect.inset(-width / 2.0);
    let path = if inner.width() > 0.0 && inner.height() > 0.0 {
        let style = match border.style {
            BorderStyle::Solid => Stroke::new(width),
            BorderStyle::Dashed => {
                Stroke::new(width).with_dashes(0.0, [3.0 * width, 2.0 * width])
            }
            BorderStyle::Dotted => Stroke::new(width).with_dashes(0.0, [width, width]),
        };
        stroke_outline(&inner.to_path(PATH_TOLERANCE), &style)
    } else {
        bezpath_to_cpu(&rect.to_path(PATH_TOLERANCE))
    };

    target.paint(|ctx| {
        ctx.set_paint(border.color.to_cpu());
        ctx.fill_path(&path);
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/image_layer.rs"]
mod tests;
