use kurbo::{BezPath, Ellipse, Line, Rect, RoundedRect, Shape as _, Stroke, StrokeOpts};

use crate::foundation::color::Color;
use crate::foundation::error::CardResult;
use crate::model::template::{ShapeKind, ShapeLayer};
use crate::render::compositor::{LayerOutcome, SkipReason};
use crate::render::surface::{PATH_TOLERANCE, Surface, bezpath_to_cpu};

/// Outline of `path` stroked with `style`, as a fillable path.
pub(crate) fn stroke_outline(path: &BezPath, style: &Stroke) -> vello_cpu::kurbo::BezPath {
    let outline = kurbo::stroke(path.iter(), style, &StrokeOpts::default(), PATH_TOLERANCE);
    bezpath_to_cpu(&outline)
}

/// Draw a rectangle, ellipse or line.
///
/// Rectangle and ellipse strokes sit inside the layer box. A line runs from `(x, y)` to
/// `(x + width, y + height)` and takes the stroke color, or the fill color when there is none.
pub(crate) fn render_shape(layer: &ShapeLayer, target: &mut Surface) -> CardResult<LayerOutcome> {
    let c = &layer.common;
    let visible = |color: Option<Color>| color.filter(|c| c.a > 0);
    let stroke_width = f64::from(layer.stroke_width);
    let stroke_width = (stroke_width.is_finite() && stroke_width > 0.0).then_some(stroke_width);

    let (fill, stroke) = match layer.shape {
        ShapeKind::Line => {
            let (Some(color), Some(width)) = (visible(layer.stroke.or(layer.fill)), stroke_width)
            else {
                return Ok(LayerOutcome::Skipped(SkipReason::EmptyContent));
            };
            if c.width == 0.0 && c.height == 0.0 {
                return Ok(LayerOutcome::Skipped(SkipReason::EmptyBox));
            }
            let line = Line::new((c.x, c.y), (c.x + c.width, c.y + c.height));
            let path = stroke_outline(&line.to_path(PATH_TOLERANCE), &Stroke::new(width));
            (None, Some((color, path)))
        }
        kind => {
            let rect = Rect::new(c.x, c.y, c.x + c.width, c.y + c.height).abs();
            if rect.area() == 0.0 {
                return Ok(LayerOutcome::Skipped(SkipReason::EmptyBox));
            }
            let radius = f64::from(layer.border_radius);
            let fill = visible(layer.fill).map(|color| (color, outline(kind, rect, radius)));
            let stroke = visible(layer.stroke)
                .zip(stroke_width)
                .map(|(color, width)| (color, inner_stroke(kind, rect, radius, width)));
            (fill.map(|(c, p)| (c, bezpath_to_cpu(&p))), stroke)
        }
    };

    if fill.is_none() && stroke.is_none() {
        return Ok(LayerOutcome::Skipped(SkipReason::EmptyContent));
    }

    target.paint(|ctx| {
        for (color, path) in fill.iter().chain(stroke.iter()) {
            ctx.set_paint(color.to_cpu());
            ctx.fill_path(path);
        }
        Ok(())
    })?;
    Ok(LayerOutcome::Painted)
}

fn outline(kind: ShapeKind, rect: Rect, radius: f64) -> BezPath {
    match kind {
        ShapeKind::Circle => Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
        _ if radius > 0.0 => {
            let r = radius.min(rect.width().min(rect.height()) / 2.0);
            RoundedRect::from_rect(rect, r).to_path(PATH_TOLERANCE)
        }
        _ => rect.to_path(PATH_TOLERANCE),
    }
}

/// Stroke of `width` drawn entirely inside `rect`.
fn inner_stroke(
    kind: ShapeKind,
    rect: Rect,
    radius: f64,
    width: f64,
) -> vello_cpu::kurbo::BezPath {
    let half = width / 2.0;
    let inner = rect.inset(-half);
    if inner.width() <= 0.0 || inner.height() <= 0.0 {
        return bezpath_to_cpu(&outline(kind, rect, radius));
    }
    let path = outline(kind, inner, (radius - half).max(0.0));
    stroke_outline(&path, &Stroke::new(width))
}

#[cfg(test)]
#[path = "../../tests/unit/render/shape_layer.rs"]
mod tests;
