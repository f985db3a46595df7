//! Text measurement, wrapping and glyph drawing.

use chatshot_common::error::{ChatshotError, ChatshotResult};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};

use crate::canvas::{Canvas, Color};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Something that can measure and draw a run of text.
///
/// Sizes and positions are in logical pixels; implementations apply the
/// canvas scale themselves.
pub trait GlyphSource: Send + Sync {
    /// Horizontal advance of `text` at `px`.
    fn advance(&self, text: &str, px: f32) -> f32;

    fn line_height(&self, px: f32) -> f32 {
        px * LINE_HEIGHT_FACTOR
    }

    /// Draw a single line with its top edge at `y`.
    fn draw(&self, canvas: &mut Canvas, x: f32, y: f32, text: &str, px: f32, color: Color);
}

/// A TrueType/OpenType face rasterized with fontdue.
pub struct FontFace {
    font: Font,
    name: String,
}

impl FontFace {
    pub fn from_bytes(bytes: Vec<u8>, name: impl Into<String>) -> ChatshotResult<Self> {
        let name = name.into();
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| ChatshotError::asset_load(format!("invalid font {name}: {e}")))?;
        Ok(Self { font, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("name", &self.name).finish()
    }
}

impl GlyphSource for FontFace {
    fn advance(&self, text: &str, px: f32) -> f32 {
        text.chars()
            .map(|c| self.font.metrics(c, px).advance_width)
            .sum()
    }

    fn draw(&self, canvas: &mut Canvas, x: f32, y: f32, text: &str, px: f32, color: Color) {
        if text.is_empty() {
            return;
        }
        let (dx, dy) = canvas.to_device(x, y);
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: dx,
            y: dy,
            ..LayoutSettings::default()
        });
        layout.append(&[&self.font], &TextStyle::new(text, px * canvas.scale(), 0));

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (metrics, bitmap) = self.font.rasterize_config(glyph.key);
            let gx = glyph.x.round() as i32;
            let gy = glyph.y.round() as i32;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    if coverage == 0 {
                        continue;
                    }
                    canvas.blend(
                        gx + col as i32,
                        gy + row as i32,
                        color,
                        f32::from(coverage) / 255.0,
                    );
                }
            }
        }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Hard line breaks are kept. Lines break at spaces; a single word wider
/// than `max_width` is split between characters. Blank input lines survive
/// as empty strings.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for hard_line in text.split('\n') {
        let mut current = String::new();

        for word in hard_line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if measure(&current) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let lines = wrap_text("the quick brown fox", 10.0, chars);
        assert_eq!(lines, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn test_wrap_keeps_hard_breaks_and_blank_lines() {
        let lines = wrap_text("Oi!\n\nTudo bem?", 40.0, chars);
        assert_eq!(lines, vec!["Oi!", "", "Tudo bem?"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text("abcdefghij xy", 4.0, chars);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_wrap_long_word_continues_on_its_last_line() {
        let lines = wrap_text("abcdef g", 4.0, chars);
        assert_eq!(lines, vec!["abcd", "ef g"]);
    }

    #[test]
    fn test_font_face_rejects_garbage() {
        let err = FontFace::from_bytes(vec![0, 1, 2, 3], "broken.ttf").unwrap_err();
        assert!(err.to_string().contains("broken.ttf"));
    }

    proptest! {
        #[test]
        fn prop_wrapped_lines_fit(text in "[a-z]{1,12}( [a-z]{1,12}){0,10}(\n[a-z ]{0,20}){0,3}", width in 1.0f32..30.0) {
            let width = width.floor().max(1.0);
            for line in wrap_text(&text, width, chars) {
                prop_assert!(chars(&line) <= width, "line {:?} wider than {}", line, width);
            }
        }

        #[test]
        fn prop_wrapping_preserves_hard_breaks_and_words(text in "[a-z]{1,6}( [a-z]{1,6}){0,6}(\n[a-z]{1,6}( [a-z]{1,6}){0,4}){0,3}", width in 6.0f32..40.0) {
            let lines = wrap_text(&text, width.floor(), chars);
            prop_assert!(lines.len() >= text.split('\n').count());
            let joined: String = lines.concat().chars().filter(|c| !c.is_whitespace()).collect();
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(joined, original);
        }
    }
}
