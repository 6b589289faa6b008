/// Glyph shaping and line measurement.
pub mod shaper;
/// Line splitting heuristic.
pub mod wrap;

pub use shaper::{LineGlyphs, PositionedGlyph, ShapedLine, TextShaper};
pub use wrap::{split_lines, wrap_columns, wrap_text};
