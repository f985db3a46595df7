//! Phone-frame geometry and bubble layout.
//!
//! All values are logical pixels. Screen-relative positions use the screen's
//! top-left corner as origin.

use chatshot_chat_model::{Message, Sender};

use crate::canvas::Rect;
use crate::text::{wrap_text, GlyphSource};

pub const CANVAS_WIDTH: f32 = 390.0;
pub const CANVAS_HEIGHT: f32 = 790.0;

pub const OUTER_FRAME: f32 = 3.0;
pub const RIM: f32 = 2.0;
pub const BEZEL: f32 = 8.0;
pub const BODY: Rect = Rect::new(
    OUTER_FRAME + RIM,
    OUTER_FRAME + RIM,
    CANVAS_WIDTH - 2.0 * (OUTER_FRAME + RIM),
    CANVAS_HEIGHT - 2.0 * (OUTER_FRAME + RIM),
);
pub const BODY_RADIUS: f32 = 55.0;

/// Screen area inside the bezel, in canvas coordinates.
pub const SCREEN: Rect = Rect::new(
    BODY.x + BEZEL,
    BODY.y + BEZEL,
    BODY.w - 2.0 * BEZEL,
    BODY.h - 2.0 * BEZEL,
);
pub const SCREEN_RADIUS: f32 = BODY_RADIUS - BEZEL;

pub const STATUS_BAR_HEIGHT: f32 = 44.0;
pub const HEADER_HEIGHT: f32 = 96.0;
pub const INPUT_BAR_HEIGHT: f32 = 50.0;
pub const HOME_STRIP_HEIGHT: f32 = 12.0;

pub const AVATAR_SIZE: f32 = 40.0;
pub const AVATAR_ORIGIN: (f32, f32) = (16.0, 48.0);
pub const NAME_X: f32 = 68.0;
pub const NAME_PX: f32 = 18.0;
pub const CLOCK_PX: f32 = 15.0;

pub const ISLAND_WIDTH: f32 = 126.0;
pub const ISLAND_HEIGHT: f32 = 32.0;
pub const HOME_BAR_WIDTH: f32 = 134.0;
pub const HOME_BAR_HEIGHT: f32 = 5.0;

/// Visible message area, screen-relative.
pub const MESSAGE_AREA: Rect = Rect::new(
    0.0,
    HEADER_HEIGHT,
    SCREEN.w,
    SCREEN.h - (HEADER_HEIGHT + INPUT_BAR_HEIGHT + HOME_STRIP_HEIGHT),
);

pub const MESSAGE_PADDING: f32 = 16.0;
pub const BUBBLE_MAX_WIDTH_RATIO: f32 = 0.85;
pub const BUBBLE_PAD_X: f32 = 16.0;
pub const BUBBLE_PAD_Y: f32 = 12.0;
pub const BUBBLE_SPACING: f32 = 16.0;
pub const BUBBLE_RADIUS: f32 = 8.0;

/// One positioned bubble. `frame` is relative to the top of the message
/// area's scrollable content.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleLayout {
    pub sender: Sender,
    pub lines: Vec<String>,
    pub frame: Rect,
}

/// Bubble positions for every message of a conversation.
///
/// Bubble `i` depends only on messages `0..=i`, so laying out the whole
/// conversation once serves every prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLayout {
    bubbles: Vec<BubbleLayout>,
    font_px: f32,
    line_height: f32,
}

impl ChatLayout {
    pub fn compute(messages: &[Message], glyphs: &dyn GlyphSource, font_px: f32) -> Self {
        let inner_width = MESSAGE_AREA.w - 2.0 * MESSAGE_PADDING;
        let max_bubble = inner_width * BUBBLE_MAX_WIDTH_RATIO;
        let max_text = max_bubble - 2.0 * BUBBLE_PAD_X;
        let line_height = glyphs.line_height(font_px);

        let mut y = MESSAGE_PADDING;
        let mut bubbles = Vec::with_capacity(messages.len());
        for message in messages {
            let lines = wrap_text(message.text(), max_text, |s| glyphs.advance(s, font_px));
            let text_width = lines
                .iter()
                .map(|l| glyphs.advance(l, font_px))
                .fold(0.0f32, f32::max)
                .min(max_text);
            let w = text_width + 2.0 * BUBBLE_PAD_X;
            let h = lines.len() as f32 * line_height + 2.0 * BUBBLE_PAD_Y;
            let x = match message.sender() {
                Sender::Assistant => MESSAGE_PADDING,
                Sender::User => MESSAGE_AREA.w - MESSAGE_PADDING - w,
            };
            bubbles.push(BubbleLayout {
                sender: message.sender(),
                lines,
                frame: Rect::new(x, y, w, h),
            });
            y += h + BUBBLE_SPACING;
        }

        Self {
            bubbles,
            font_px,
            line_height,
        }
    }

    /// Layouts of the first `prefix` bubbles.
    pub fn bubbles(&self, prefix: usize) -> &[BubbleLayout] {
        &self.bubbles[..prefix.min(self.bubbles.len())]
    }

    pub fn font_px(&self) -> f32 {
        self.font_px
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Height of the scrollable content when `prefix` messages are shown.
    pub fn content_height(&self, prefix: usize) -> f32 {
        match self.bubbles(prefix).last() {
            Some(last) => last.frame.bottom() + BUBBLE_SPACING,
            None => 0.0,
        }
    }

    /// Scroll offset that brings the last shown bubble fully into view.
    pub fn max_scroll(&self, prefix: usize) -> f32 {
        (self.content_height(prefix) - MESSAGE_AREA.h).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BlockGlyphs;

    fn messages(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::assistant(format!("assistant {i}")).unwrap()
                } else {
                    Message::user(format!("user {i}")).unwrap()
                }
            })
            .collect()
    }

    #[test]
    fn test_screen_geometry() {
        assert_eq!(SCREEN, Rect::new(13.0, 13.0, 364.0, 764.0));
        assert_eq!(MESSAGE_AREA.h, 606.0);
        assert_eq!(SCREEN_RADIUS, 47.0);
    }

    #[test]
    fn test_bubbles_alternate_sides_and_stack() {
        let layout = ChatLayout::compute(&messages(2), &BlockGlyphs, 15.0);
        let b = layout.bubbles(2);

        assert_eq!(b[0].frame.x, MESSAGE_PADDING);
        assert!((b[1].frame.right() - (MESSAGE_AREA.w - MESSAGE_PADDING)).abs() < 1e-3);
        assert_eq!(b[0].frame.y, MESSAGE_PADDING);
        assert!((b[1].frame.y - (b[0].frame.bottom() + BUBBLE_SPACING)).abs() < 1e-3);
    }

    #[test]
    fn test_bubble_width_is_capped() {
        let long = Message::user("word ".repeat(80)).unwrap();
        let layout = ChatLayout::compute(&[long], &BlockGlyphs, 15.0);
        let max = (MESSAGE_AREA.w - 2.0 * MESSAGE_PADDING) * BUBBLE_MAX_WIDTH_RATIO;

        let bubble = &layout.bubbles(1)[0];
        assert!(bubble.frame.w <= max + 1e-3);
        assert!(bubble.lines.len() > 1);
    }

    #[test]
    fn test_scroll_only_when_content_overflows() {
        let layout = ChatLayout::compute(&messages(30), &BlockGlyphs, 15.0);
        assert_eq!(layout.max_scroll(0), 0.0);
        assert_eq!(layout.max_scroll(1), 0.0);
        assert!(layout.max_scroll(30) > 0.0);

        let first_overflow = (1..=30).find(|&i| layout.max_scroll(i) > 0.0).unwrap();
        assert!(layout.content_height(first_overflow) > MESSAGE_AREA.h);
        assert!(layout.content_height(first_overflow - 1) <= MESSAGE_AREA.h);
    }

    #[test]
    fn test_prefix_is_clamped() {
        let layout = ChatLayout::compute(&messages(3), &BlockGlyphs, 15.0);
        assert_eq!(layout.bubbles(10).len(), 3);
    }
}
