use crate::binding::resolve_text;
use crate::fonts::FontResource;
use crate::foundation::color::Color;
use crate::foundation::error::{CardError, CardResult};
use crate::foundation::math::floor_div;
use crate::model::template::{TextAlign, TextDecoration, TextLayer, TextShadow};
use crate::render::LayerContext;
use crate::render::blur::kernel_for_blur;
use crate::render::compositor::{LayerOutcome, SkipReason};
use crate::render::surface::Surface;
use crate::text::{LineGlyphs, ShapedLine, split_lines};

/// Transparent margin around a text block before it is rotated.
pub(crate) const ROTATION_PADDING: f64 = 20.0;

/// Lines placed inside the layer box, in box-relative pixels.
struct TextBlock {
    lines: Vec<(f64, ShapedLine)>,
    spacing: f64,
    /// Leftmost ink extent; negative when a line overflows a centred or right-aligned box.
    left: f64,
    right: f64,
    bottom: f64,
}

impl TextBlock {
    fn layout(lines: Vec<ShapedLine>, align: TextAlign, box_w: f64, box_h: f64, spacing: f64) -> Self {
        let count = lines.len();
        let lines = lines
            .into_iter()
            .map(|line| {
                let w = f64::from(line.width);
                let offset = match align {
                    TextAlign::Center => ((box_w - w) / 2.0).floor(),
                    TextAlign::Right => box_w - w,
                    TextAlign::Left | TextAlign::Justify => 0.0,
                };
                (offset, line)
            })
            .collect::<Vec<_>>();

        let left = lines.iter().map(|(o, _)| *o).fold(0.0, f64::min);
        let right = lines
            .iter()
            .map(|(o, l)| o + f64::from(l.width))
            .fold(box_w, f64::max);
        let content = lines.last().map_or(0.0, |(_, l)| {
            (count - 1) as f64 * spacing + f64::from(l.ascent + l.descent)
        });

        Self {
            lines,
            spacing,
            left,
            right,
            bottom: content.max(box_h),
        }
    }

    fn line_origins(&self, ox: f64, oy: f64) -> impl Iterator<Item = (f64, f64, &ShapedLine)> {
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, (off, line))| (ox + off, oy + i as f64 * self.spacing, line))
    }
}

/// Draw a text layer.
///
/// Unrotated text is drawn straight onto the canvas at the layer origin. Rotated text is drawn
/// into a padded buffer, rotated with expansion and pasted so the block centre stays put.
pub(crate) fn render_text(
    layer: &TextLayer,
    cx: &mut LayerContext<'_>,
    canvas: &mut Surface,
) -> CardResult<LayerOutcome> {
    let text = resolve_text(layer, cx.record);
    if text.trim().is_empty() {
        return Ok(LayerOutcome::Skipped(SkipReason::EmptyContent));
    }

    let c = &layer.common;
    let font = cx
        .fonts
        .get_font(&layer.font_family, layer.font_size, layer.font_weight);
    tracing::trace!(
        family = %layer.font_family,
        resolved = %font.family(),
        resolution = ?font.resolution(),
        "text font"
    );

    let wrap_width = layer
        .max_width
        .filter(|w| w.is_finite() && *w > 0.0)
        .unwrap_or(c.width as f32);
    let lines = split_lines(&text, layer.word_wrap, wrap_width, layer.font_size)
        .iter()
        .map(|line| cx.shaper.shape_line(&font, line, layer.letter_spacing))
        .collect::<CardResult<Vec<_>>>()?;

    let spacing = f64::from(layer.font_size * layer.line_height).floor();
    let block = TextBlock::layout(lines, layer.text_align, c.width, c.height, spacing);

    let rotation = c.rotation.rem_euclid(360.0);
    if rotation == 0.0 {
        draw_block(canvas, &block, &font, layer, c.x, c.y)?;
        return Ok(LayerOutcome::Painted);
    }

    let pad = ROTATION_PADDING;
    let tw = ((block.right - block.left).ceil() + 2.0 * pad) as u32;
    let th = (block.bottom.ceil() + 2.0 * pad) as u32;
    let mut buf = Surface::new(tw, th)?;
    draw_block(&mut buf, &block, &font, layer, pad - block.left, pad)?;

    let rotated = buf.rotated_expand(rotation)?;
    let dx = floor_div(i64::from(rotated.width()) - i64::from(tw), 2);
    let dy = floor_div(i64::from(rotated.height()) - i64::from(th), 2);
    let px = (c.x + block.left - pad).floor() as i64 - dx;
    let py = (c.y - pad).floor() as i64 - dy;
    canvas.draw_over(&rotated, px, py, 1.0);
    Ok(LayerOutcome::Painted)
}

fn draw_block(
    target: &mut Surface,
    block: &TextBlock,
    font: &FontResource,
    layer: &TextLayer,
    ox: f64,
    oy: f64,
) -> CardResult<()> {
    let shadow = layer.text_shadow.filter(|s| s.color.a > 0);
    let flat_shadow = shadow.filter(|s| kernel_for_blur(s.blur).is_none());
    if let Some(s) = shadow.filter(|s| kernel_for_blur(s.blur).is_some()) {
        paint_blurred_shadow(target, block, font, layer.text_decoration, &s, ox, oy)?;
    }

    target.paint(|ctx| {
        for (x, y, line) in block.line_origins(ox, oy) {
            if let Some(s) = flat_shadow {
                let (sx, sy) = (x + f64::from(s.offset_x), y + f64::from(s.offset_y));
                draw_line(ctx, line, font, sx, sy, s.color, layer.text_decoration)?;
            }
            draw_line(ctx, line, font, x, y, layer.color, layer.text_decoration)?;
        }
        Ok(())
    })
}

fn paint_blurred_shadow(
    target: &mut Surface,
    block: &TextBlock,
    font: &FontResource,
    decoration: TextDecoration,
    shadow: &TextShadow,
    ox: f64,
    oy: f64,
) -> CardResult<()> {
    let Some((radius, _)) = kernel_for_blur(shadow.blur) else {
        return Ok(());
    };
    let margin = f64::from(radius) + 2.0;
    let sx = ox + f64::from(shadow.offset_x);
    let sy = oy + f64::from(shadow.offset_y);

    let bx = (sx + block.left - margin).floor();
    let by = (sy - margin).floor();
    let bw = (block.right - block.left + 2.0 * margin).ceil() as u32 + 1;
    let bh = (block.bottom + 2.0 * margin).ceil() as u32 + 1;

    let mut buf = Surface::new(bw, bh)?;
    buf.paint(|ctx| {
        for (x, y, line) in block.line_origins(sx - bx, sy - by) {
            draw_line(ctx, line, font, x, y, shadow.color, decoration)?;
        }
        Ok(())
    })?;

    let blurred = buf.blurred(shadow.blur)?;
    target.draw_over(&blurred, bx as i64, by as i64, 1.0);
    Ok(())
}

fn draw_line(
    ctx: &mut vello_cpu::RenderContext,
    line: &ShapedLine,
    font: &FontResource,
    x: f64,
    y: f64,
    color: Color,
    decoration: TextDecoration,
) -> CardResult<()> {
    ctx.set_paint(color.to_cpu());

    match &line.glyphs {
        LineGlyphs::Outline(glyphs) => {
            let cpu_font = font
                .cpu_font()
                .ok_or_else(|| CardError::layer_render("outline glyphs without font data"))?;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
            ctx.glyph_run(cpu_font)
                .font_size(font.size())
                .fill_glyphs(glyphs.iter().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        }
        LineGlyphs::Cells {
            dot_w,
            dot_h,
            origins,
        } => {
            let (dw, dh) = (f64::from(*dot_w), f64::from(*dot_h));
            for &(cx, cy) in origins {
                let (cx, cy) = (x + f64::from(cx), y + f64::from(cy));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(cx, cy, cx + dw, cy + dh));
            }
        }
    }

    let thickness = f64::from(font.size() / 16.0).max(1.0);
    let baseline = y + f64::from(line.ascent);
    let bar_top = match decoration {
        TextDecoration::None => return Ok(()),
        TextDecoration::Underline => baseline + thickness,
        TextDecoration::LineThrough => baseline - f64::from(line.ascent) * 0.35 - thickness / 2.0,
    };
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        x,
        bar_top,
        x + f64::from(line.width),
        bar_top + thickness,
    ));
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text_layer.rs"]
mod tests;
