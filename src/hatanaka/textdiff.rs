//! Y. Hatanaka lossless TextDiff algorithm
use itertools::{EitherOrBoth, Itertools};

/// [TextDiff] recovers text that was compressed with the text diff
/// algorithm designed by Y. Hatanaka: each new line is overlaid onto the
/// previous one. Blanks mean "unchanged", `&` means "now a blank",
/// any other byte replaces the previous one. New content may be longer
/// than the history, shorter content leaves the trailing history untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDiff {
    buffer: String,
}

impl TextDiff {
    /// Creates a new [TextDiff] with this initial content
    pub fn new(data: &str) -> Self {
        Self {
            buffer: data.to_string(),
        }
    }

    /// Force kernel reset using new content. `&` are whitened.
    pub fn force_init(&mut self, data: &str) {
        self.buffer = data.replace('&', " ");
    }

    /// Decompresses given data. Returns recovered content.
    pub fn decompress(&mut self, data: &str) -> &str {
        self.buffer = self
            .buffer
            .chars()
            .zip_longest(data.chars())
            .map(|pair| match pair {
                EitherOrBoth::Both(old, ' ') | EitherOrBoth::Left(old) => old,
                EitherOrBoth::Both(_, new) | EitherOrBoth::Right(new) => {
                    if new == '&' {
                        ' '
                    } else {
                        new
                    }
                },
            })
            .collect();
        &self.buffer
    }

    /// Returns recovered content
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

/// [CharArc] tracks one LLI or STR flag in Compact RINEX.
/// Only changes are given, blanks meaning "unchanged".
#[derive(Debug, Clone, PartialEq)]
pub struct CharArc {
    diff: TextDiff,
}

impl Default for CharArc {
    /// Defaults to "no flag"
    fn default() -> Self {
        Self {
            diff: TextDiff::new("0"),
        }
    }
}

impl CharArc {
    /// Overlays non blank characters of this token
    pub fn update(&mut self, token: &str) {
        let _ = self.diff.decompress(token);
    }
    /// Returns the overlay as is
    pub fn as_str(&self) -> &str {
        self.diff.as_str()
    }
    /// Returns the flag digit, blanks standing for 0
    pub fn value(&self) -> u8 {
        self.diff
            .as_str()
            .trim()
            .parse::<u8>()
            .unwrap_or(0)
    }
}
