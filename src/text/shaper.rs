use std::collections::HashMap;

use usvg::fontdb;

use crate::fonts::{FontResource, builtin};
use crate::foundation::error::{CardError, CardResult};

/// A glyph placed relative to the top-left of its line; `y` is the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    /// Glyph id in the font.
    pub id: u32,
    /// Pen x.
    pub x: f32,
    /// Baseline y.
    pub y: f32,
}

/// Drawable content of one shaped line.
#[derive(Clone, Debug, PartialEq)]
pub enum LineGlyphs {
    /// Outline glyphs from a real face.
    Outline(Vec<PositionedGlyph>),
    /// Lit cells of the built-in bitmap font, as top-left corners.
    Cells {
        /// Cell width in pixels.
        dot_w: f32,
        /// Cell height in pixels.
        dot_h: f32,
        /// Top-left corner of every lit cell.
        origins: Vec<(f32, f32)>,
    },
}

/// One line of text, shaped and measured.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedLine {
    /// Advance width in pixels.
    pub width: f32,
    /// Distance from the line top to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the line bottom.
    pub descent: f32,
    /// Glyphs to draw.
    pub glyphs: LineGlyphs,
}

impl ShapedLine {
    /// Whether the line has nothing to draw.
    pub fn is_blank(&self) -> bool {
        match &self.glyphs {
            LineGlyphs::Outline(g) => g.is_empty(),
            LineGlyphs::Cells { origins, .. } => origins.is_empty(),
        }
    }
}

struct FaceContext {
    font_ctx: parley::FontContext,
    family: String,
}

/// Shapes single lines with parley, one font context per face.
///
/// Shapers hold mutable layout scratch space and are created per render call.
pub struct TextShaper {
    layout_ctx: parley::LayoutContext<[u8; 4]>,
    faces: HashMap<fontdb::ID, FaceContext>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    /// Fresh shaper without registered faces.
    pub fn new() -> Self {
        Self {
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// Shape `text` as a single unbroken line.
    pub fn shape_line(
        &mut self,
        font: &FontResource,
        text: &str,
        letter_spacing: f32,
    ) -> CardResult<ShapedLine> {
        let size = font.size();
        if !size.is_finite() || size <= 0.0 {
            return Err(CardError::layer_render("font size must be finite and > 0"));
        }

        match (font.face_id(), font.font_bytes()) {
            (Some(id), Some(bytes)) => self.shape_outline(id, bytes, font, text, letter_spacing),
            _ => Ok(shape_builtin(size, font.bold(), text, letter_spacing)),
        }
    }

    fn shape_outline(
        &mut self,
        id: fontdb::ID,
        bytes: &[u8],
        font: &FontResource,
        text: &str,
        letter_spacing: f32,
    ) -> CardResult<ShapedLine> {
        let face = match self.faces.entry(id) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let mut font_ctx = parley::FontContext::default();
                let families = font_ctx
                    .collection
                    .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
                let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                    CardError::layer_render(format!(
                        "no font families registered for '{}'",
                        font.family()
                    ))
                })?;
                let family = font_ctx
                    .collection
                    .family_name(family_id)
                    .ok_or_else(|| CardError::layer_render("registered font family has no name"))?
                    .to_string();
                e.insert(FaceContext { font_ctx, family })
            }
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size()));
        if letter_spacing != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(letter_spacing));
        }
        if font.bold() {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<[u8; 4]> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        for line in layout.lines() {
            let m = line.metrics();
            ascent = ascent.max(m.baseline);
            descent = descent.max(m.descent);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PositionedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        if ascent <= 0.0 {
            ascent = font.size() * 0.8;
            descent = font.size() * 0.2;
        }

        Ok(ShapedLine {
            width: layout.width(),
            ascent,
            descent,
            glyphs: LineGlyphs::Outline(glyphs),
        })
    }
}

fn shape_builtin(size: f32, bold: bool, text: &str, letter_spacing: f32) -> ShapedLine {
    let unit = builtin::unit(size);
    let advance = builtin::ADVANCE as f32 * unit + letter_spacing;
    let dot_w = if bold { unit * 1.5 } else { unit };

    let mut origins = Vec::new();
    let mut count = 0usize;
    for (i, ch) in text.chars().enumerate() {
        count = i + 1;
        let pen = i as f32 * advance;
        origins.extend(
            builtin::lit_cells(ch).map(|(col, row)| (pen + col as f32 * unit, row as f32 * unit)),
        );
    }

    let width = if count == 0 {
        0.0
    } else {
        (count as f32 * advance - unit - letter_spacing).max(0.0)
    };

    ShapedLine {
        width,
        ascent: builtin::CELL_H as f32 * unit,
        descent: unit,
        glyphs: LineGlyphs::Cells {
            dot_w,
            dot_h: unit,
            origins,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
