//! Text measurement and line wrapping
//!
//! Glyph widths depend on the rendering environment, so the layout engine
//! asks a host-supplied [`TextMeasure`] for them. [`HelveticaMetrics`] is the
//! built-in approximation matching the fonts the PDF backend declares.

/// Millimetres per typographic point
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Points per millimetre
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// Measures rendered text width
pub trait TextMeasure: Send + Sync {
    /// Width of `text` in millimetres when set at `font_size` points
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> f32 + Send + Sync,
{
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self(text, font_size)
    }
}

/// Approximate Helvetica advance widths
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    /// Advance width in thousandths of an em
    fn glyph_width(c: char) -> u32 {
        match c {
            ' ' | 'I' | 'f' | 't' | '.' | ',' | ':' | ';' | '!' | '/' | '[' | ']' => 278,
            'i' | 'j' | 'l' | '\'' | '|' => 222,
            'r' | '-' | '(' | ')' | '`' => 333,
            'm' | 'M' => 833,
            'w' | 'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
            'W' => 944,
            'G' | 'O' | 'Q' => 778,
            'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
            'F' | 'T' | 'Z' => 611,
            'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | '*' => 500,
            'L' | '0'..='9' | 'a'..='z' | '$' | '#' | '?' => 556,
            '%' => 889,
            '&' => 667,
            '@' => 1015,
            _ => 556,
        }
    }
}

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(Self::glyph_width).sum();
        units as f32 / 1000.0 * font_size * PT_TO_MM
    }
}

/// Greedy word wrap of `text` to `max_width` millimetres.
///
/// Words wider than a whole line are broken between characters. Always
/// returns at least one line.
pub fn wrap_text(measure: &dyn TextMeasure, text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if measure.text_width(&candidate, font_size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if measure.text_width(word, font_size) <= max_width {
            current = word.to_string();
        } else {
            let mut pieces = break_word(measure, word, font_size, max_width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_word(measure: &dyn TextMeasure, word: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();

    for c in word.chars() {
        piece.push(c);
        // A single glyph wider than the line still gets a line of its own
        if piece.chars().count() > 1 && measure.text_width(&piece, font_size) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }

    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every glyph is 1mm wide regardless of size
    fn unit_width(text: &str, _size: f32) -> f32 {
        text.chars().count() as f32
    }

    #[test]
    fn test_helvetica_width_scales_with_size() {
        let metrics = HelveticaMetrics;
        let small = metrics.text_width("Summary", 10.0);
        let large = metrics.text_width("Summary", 20.0);
        assert!((large - small * 2.0).abs() < 1e-4);
        assert_eq!(metrics.text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_wrap_fits_words() {
        let lines = wrap_text(&unit_width, "aaa bbb ccc", 11.0, 7.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_breaks_long_word() {
        let lines = wrap_text(&unit_width, "abcdefghij xy", 11.0, 4.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_wrap_empty_gives_one_line() {
        assert_eq!(wrap_text(&unit_width, "", 11.0, 10.0), vec![String::new()]);
    }

    #[test]
    fn test_wrapped_lines_fit_width() {
        let metrics = HelveticaMetrics;
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        for line in wrap_text(&metrics, &text, 11.0, 170.0) {
            assert!(metrics.text_width(&line, 11.0) <= 170.0);
        }
    }
}
