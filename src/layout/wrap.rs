use std::borrow::Cow;

use crate::assets::fonts::TextMeasure;

/// Appended to scripts cut at the character cap.
pub const ELLIPSIS: &str = "...";

/// Horizontal space kept free across the canvas width.
pub const WRAP_MARGIN_PX: f32 = 100.0;

/// Limits applied while wrapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrapOptions {
    /// Characters kept from the script before wrapping.
    pub max_chars: usize,
    /// Lines kept after wrapping.
    pub max_lines: usize,
    /// Widest allowed line in pixels.
    pub max_width_px: f32,
}

impl WrapOptions {
    /// Options for a canvas `canvas_width` pixels wide.
    pub fn for_canvas_width(canvas_width: u32, max_chars: usize, max_lines: usize) -> Self {
        Self {
            max_chars,
            max_lines,
            max_width_px: canvas_width as f32 - WRAP_MARGIN_PX,
        }
    }
}

/// Ordered, width-bounded lines of script text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedText {
    lines: Vec<String>,
    truncated: bool,
}

impl WrappedText {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the script was cut at the character cap.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl From<Vec<String>> for WrappedText {
    fn from(lines: Vec<String>) -> Self {
        Self {
            lines,
            truncated: false,
        }
    }
}

/// Keep the first `max_chars` characters, marking a cut with [`ELLIPSIS`].
pub fn truncate_script(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len());
            out.push_str(&text[..cut]);
            out.push_str(ELLIPSIS);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Wrap `text` into lines no wider than `opts.max_width_px`.
///
/// Tokens are whitespace-separated words and are never split; a word wider than the limit gets a
/// line of its own. Lines past `opts.max_lines` are dropped.
pub fn wrap_text(text: &str, opts: WrapOptions, measure: &mut impl TextMeasure) -> WrappedText {
    let prepared = truncate_script(text, opts.max_chars);
    let truncated = matches!(prepared, Cow::Owned(_));

    let mut lines = Vec::<String>::new();
    let mut current = String::new();

    for word in prepared.split_whitespace() {
        if lines.len() >= opts.max_lines {
            break;
        }

        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure.measure(&candidate) <= opts.max_width_px {
            current = candidate;
        } else if current.is_empty() {
            lines.push(candidate);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.truncate(opts.max_lines);

    WrappedText { lines, truncated }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
