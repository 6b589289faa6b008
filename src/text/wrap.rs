//! Line splitting.
//!
//! Wrapping estimates a column count from the font size instead of measuring glyphs: average
//! glyph advance is taken as `0.6 * fontSize`.

/// Average glyph advance as a fraction of the font size.
pub const AVG_ADVANCE_FACTOR: f32 = 0.6;

/// Character columns that fit in `wrap_width` pixels, at least one.
pub fn wrap_columns(wrap_width: f32, font_size: f32) -> usize {
    let est = (wrap_width / (font_size * AVG_ADVANCE_FACTOR)).floor();
    if est.is_finite() && est >= 1.0 {
        est as usize
    } else {
        1
    }
}

/// Greedy whitespace wrap to `columns` characters.
///
/// Runs of whitespace collapse to a single space. Words longer than a line are broken, the
/// head filling whatever room is left on the current line.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in text.split_whitespace() {
        let mut rest = word.chars().collect::<Vec<_>>();
        loop {
            let sep = usize::from(cur_len > 0);
            if cur_len + sep + rest.len() <= columns {
                if sep == 1 {
                    cur.push(' ');
                }
                cur.extend(rest.iter());
                cur_len += sep + rest.len();
                break;
            }

            if rest.len() > columns {
                let room = columns.saturating_sub(cur_len + sep);
                if room > 0 {
                    if sep == 1 {
                        cur.push(' ');
                    }
                    cur.extend(rest.drain(..room));
                }
            }
            lines.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
    }

    if cur_len > 0 {
        lines.push(cur);
    }
    lines
}

/// Split display text into lines.
///
/// Explicit newlines always break. With `word_wrap` and a positive `wrap_width`, each
/// paragraph is wrapped at [`wrap_columns`]; otherwise a paragraph is one line.
pub fn split_lines(text: &str, word_wrap: bool, wrap_width: f32, font_size: f32) -> Vec<String> {
    let paragraphs = text.split('\n').map(|p| p.trim_end_matches('\r'));

    if word_wrap && wrap_width > 0.0 {
        let columns = wrap_columns(wrap_width, font_size);
        paragraphs.flat_map(|p| wrap_text(p, columns)).collect()
    } else {
        paragraphs.map(str::to_string).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
