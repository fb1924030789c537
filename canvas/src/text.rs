//! Text layout: greedy word wrapping into a fixed-width box.
//!
//! Glyph advances come from a [`TextMeasure`]. The browser engine measures
//! through the 2D context; everything else (tests, the native host) uses the
//! em-based [`ApproxMeasure`].

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

/// Horizontal advance of a run of text.
pub trait TextMeasure {
    /// Width of `text` set in `family` at `size`.
    fn advance(&self, text: &str, family: &str, size: f64) -> f64;
}

/// Fixed average glyph width as a fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxMeasure {
    pub em_ratio: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { em_ratio: 0.55 }
    }
}

impl TextMeasure for ApproxMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn advance(&self, text: &str, _family: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * self.em_ratio
    }
}

/// Inputs to a layout pass.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'a> {
    pub text: &'a str,
    pub family: &'a str,
    pub size: f64,
    pub line_height: f64,
    pub wrap_width: f64,
    pub min_height: f64,
}

/// Lines and box extent produced by [`layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub width: f64,
    pub height: f64,
}

/// Wrap `req.text` into lines no wider than the wrap width.
///
/// Explicit newlines always break. A single word wider than the wrap width
/// stays on its own line and widens the box. Empty text still occupies one
/// line.
#[must_use]
pub fn layout(req: &LayoutRequest<'_>, measure: &dyn TextMeasure) -> TextLayout {
    let advance = |s: &str| measure.advance(s, req.family, req.size);
    let mut lines = Vec::new();
    let mut widest_word: f64 = 0.0;

    for paragraph in req.text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            widest_word = widest_word.max(advance(word));
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if advance(&candidate) <= req.wrap_width {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        lines.push(line);
    }

    #[allow(clippy::cast_precision_loss)]
    let natural = lines.len().max(1) as f64 * req.size * req.line_height;
    TextLayout {
        lines,
        width: req.wrap_width.max(widest_word),
        height: natural.max(req.min_height),
    }
}
