use std::sync::Arc;

use image::RgbaImage;
use kurbo::Shape as _;

use crate::foundation::color::Color;
use crate::foundation::error::{CardError, CardResult};
use crate::foundation::math::{premultiply, unpremultiply};
use crate::render::blur::{blur_rgba8_premul, kernel_for_blur};
use crate::render::composite::{mask, over, over_in_place};

/// Flattening tolerance for curves, in pixels.
pub(crate) const PATH_TOLERANCE: f64 = 0.1;

/// Premultiplied RGBA8 raster that layers draw into.
///
/// Vector content is rasterized by `vello_cpu` into a scratch pixmap and blended onto the
/// surface with source-over; bitmaps are blended or replaced at integer offsets, clipped to
/// the surface bounds.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    /// Transparent surface.
    pub fn new(width: u32, height: u32) -> CardResult<Self> {
        let (w, h) = surface_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Surface filled with a flat color.
    pub fn filled(width: u32, height: u32, color: Color) -> CardResult<Self> {
        let mut s = Self::new(width, height)?;
        let px = color.to_premul();
        for d in s.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
        Ok(s)
    }

    /// Surface holding a straight-alpha image.
    pub fn from_rgba_image(img: &RgbaImage) -> CardResult<Self> {
        let (w, h) = surface_dims(img.width(), img.height())?;
        let mut may_have_opacities = false;
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = premultiply(p.0);
                may_have_opacities |= a != 255;
                vello_cpu::peniko::color::PremulRgba8 { r, g, b, a }
            })
            .collect::<Vec<_>>();
        Ok(Self {
            pixmap: vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities),
        })
    }

    /// Straight-alpha copy of the surface.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        for px in data.chunks_exact_mut(4) {
            let straight = unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&straight);
        }
        RgbaImage::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn premul_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let d = self.pixmap.data_as_u8_slice();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Straight-alpha pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.premul_pixel(x, y).map(unpremultiply)
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Rasterize vector content drawn by `draw` and blend it over the surface.
    pub(crate) fn paint<F>(&mut self, draw: F) -> CardResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> CardResult<()>,
    {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        draw(&mut ctx)?;
        ctx.flush();

        let mut scratch = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut scratch);
        over_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            scratch.data_as_u8_slice(),
            1.0,
        )
    }

    /// Blend `src` over this surface with its top-left at `(x, y)`.
    pub fn draw_over(&mut self, src: &Surface, x: i64, y: i64, opacity: f32) {
        self.blit(src, x, y, |d, s| over(d, s, opacity));
    }

    /// Overwrite pixels with `src` at `(x, y)`, alpha included.
    pub fn replace(&mut self, src: &Surface, x: i64, y: i64) {
        self.blit(src, x, y, |_, s| s);
    }

    fn blit(&mut self, src: &Surface, x: i64, y: i64, op: impl Fn([u8; 4], [u8; 4]) -> [u8; 4]) {
        let (dw, dh) = (i64::from(self.width()), i64::from(self.height()));
        let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + sw).min(dw);
        let y1 = (y + sh).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src_data = src.pixmap.data_as_u8_slice();
        let dst_data = self.pixmap.data_as_u8_slice_mut();
        for dy in y0..y1 {
            let sy = dy - y;
            for dx in x0..x1 {
                let sx = dx - x;
                let si = ((sy * sw + sx) * 4) as usize;
                let di = ((dy * dw + dx) * 4) as usize;
                let s = [src_data[si], src_data[si + 1], src_data[si + 2], src_data[si + 3]];
                let d = [dst_data[di], dst_data[di + 1], dst_data[di + 2], dst_data[di + 3]];
                dst_data[di..di + 4].copy_from_slice(&op(d, s));
            }
        }
    }

    /// Multiply the surface by a rounded-rectangle coverage mask spanning its bounds.
    pub fn apply_rounded_mask(&mut self, radius: f64) -> CardResult<()> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let radius = radius.min(f64::from(w.min(h)) / 2.0).max(0.0);
        let shape = kurbo::RoundedRect::new(0.0, 0.0, f64::from(w), f64::from(h), radius);

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(Color::WHITE.to_cpu());
        ctx.fill_path(&bezpath_to_cpu(&shape.to_path(PATH_TOLERANCE)));
        ctx.flush();
        let mut coverage = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut coverage);

        for (d, m) in self
            .pixmap
            .data_as_u8_slice_mut()
            .chunks_exact_mut(4)
            .zip(coverage.data_as_u8_slice().chunks_exact(4))
        {
            let out = mask([d[0], d[1], d[2], d[3]], m[3]);
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Gaussian-blurred copy; `blur_px` is a CSS-style blur radius.
    pub fn blurred(&self, blur_px: f32) -> CardResult<Surface> {
        let Some((radius, sigma)) = kernel_for_blur(blur_px) else {
            return self.try_clone();
        };
        let out = blur_rgba8_premul(self.data(), self.width(), self.height(), radius, sigma)?;
        let mut s = Self::new(self.width(), self.height())?;
        s.pixmap.data_as_u8_slice_mut().copy_from_slice(&out);
        Ok(s)
    }

    /// Copy of the surface.
    pub fn try_clone(&self) -> CardResult<Surface> {
        let mut s = Self::new(self.width(), self.height())?;
        s.pixmap
            .data_as_u8_slice_mut()
            .copy_from_slice(self.pixmap.data_as_u8_slice());
        Ok(s)
    }

    /// Rotate clockwise by `degrees` about the centre, growing the output to hold every corner.
    ///
    /// Resampling uses the high-quality (bicubic) image filter.
    pub fn rotated_expand(&self, degrees: f64) -> CardResult<Surface> {
        let (w, h) = (f64::from(self.width()), f64::from(self.height()));
        let theta = degrees.to_radians();
        let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
        let out_w = expanded_edge(w * cos + h * sin);
        let out_h = expanded_edge(w * sin + h * cos);

        let mut out = Self::new(out_w, out_h)?;
        let xf = kurbo::Affine::translate((f64::from(out_w) / 2.0, f64::from(out_h) / 2.0))
            * kurbo::Affine::rotate(theta)
            * kurbo::Affine::translate((-w / 2.0, -h / 2.0));

        let paint = self.image_paint(vello_cpu::peniko::ImageQuality::High)?;
        out.paint(|ctx| {
            ctx.set_transform(affine_to_cpu(xf));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            Ok(())
        })?;
        Ok(out)
    }

    fn image_paint(&self, quality: vello_cpu::peniko::ImageQuality) -> CardResult<vello_cpu::Image> {
        let pixels = self
            .data()
            .chunks_exact(4)
            .map(|px| vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            })
            .collect::<Vec<_>>();
        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(
            pixels,
            self.pixmap.width(),
            self.pixmap.height(),
            true,
        );
        Ok(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler {
                quality,
                ..vello_cpu::peniko::ImageSampler::default()
            },
        })
    }
}

fn surface_dims(width: u32, height: u32) -> CardResult<(u16, u16)> {
    let w = u16::try_from(width).ok().filter(|w| *w > 0);
    let h = u16::try_from(height).ok().filter(|h| *h > 0);
    match (w, h) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(CardError::layer_render(format!(
            "surface size {width}x{height} must be within 1..=65535"
        ))),
    }
}

/// Edge length of a rotated extent, tolerant of floating-point noise at right angles.
fn expanded_edge(v: f64) -> u32 {
    ((v - 1e-6).ceil().max(1.0)) as u32
}

pub(crate) fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
