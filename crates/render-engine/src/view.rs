//! Renderable views.
//!
//! A view is a pure function of (conversation snapshot, shown prefix, scroll
//! offset, loaded assets): painting the same state twice yields identical
//! pixels. Views never scroll on their own; callers decide when to call
//! [`RenderableView::scroll_to_bottom`].

use std::sync::Arc;

use chatshot_chat_model::{Background, Conversation, HexColor, Message, Sender};
use chatshot_common::error::ChatshotResult;

use crate::assets::AssetSet;
use crate::canvas::{Canvas, Color, Corners, Rect};
use crate::layout::*;

/// A surface the export pipeline can drive through message prefixes.
pub trait RenderableView: Send + Sync {
    /// Full surface size in logical pixels.
    fn logical_size(&self) -> (f32, f32);

    /// Show only the first `len` messages.
    fn set_prefix(&mut self, len: usize);

    fn prefix_len(&self) -> usize;

    /// Messages currently shown.
    fn visible(&self) -> &[Message];

    /// Whether the shown messages no longer fit in the visible message area.
    fn overflows(&self) -> bool;

    fn scroll_to_bottom(&mut self);

    fn paint(&self, canvas: &mut Canvas);
}

/// Creates a fresh, exclusively owned view for one export run.
pub trait ViewBuilder: Send + Sync {
    fn build(
        &self,
        snapshot: Arc<Conversation>,
        assets: AssetSet,
    ) -> ChatshotResult<Box<dyn RenderableView>>;
}

/// Builds [`PhoneView`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneViewBuilder;

impl ViewBuilder for PhoneViewBuilder {
    fn build(
        &self,
        snapshot: Arc<Conversation>,
        assets: AssetSet,
    ) -> ChatshotResult<Box<dyn RenderableView>> {
        Ok(Box::new(PhoneView::new(snapshot, assets)))
    }
}

const FRAME_BLACK: Color = [0, 0, 0, 255];
const RIM_GREY: Color = [0x80, 0x80, 0x80, 255];
const BEZEL_COLOR: Color = [0x15, 0x15, 0x15, 255];
const WHITE: Color = [255, 255, 255, 255];
const ICON_GREY: Color = [0x9c, 0xa3, 0xaf, 255];
const HOME_BAR: Color = [0xe5, 0xe7, 0xeb, 255];
const SHADOW: Color = [0, 0, 0, 40];
const FALLBACK_BACKGROUND: HexColor = HexColor::rgb(0xe5, 0xdd, 0xd5);

/// Messenger screen inside a phone frame.
pub struct PhoneView {
    conversation: Arc<Conversation>,
    assets: AssetSet,
    layout: ChatLayout,
    prefix: usize,
    scroll: f32,
}

impl PhoneView {
    pub fn new(conversation: Arc<Conversation>, assets: AssetSet) -> Self {
        let font_px = conversation.font_size.px();
        let layout = ChatLayout::compute(conversation.messages(), assets.glyphs.as_ref(), font_px);
        Self {
            conversation,
            assets,
            layout,
            prefix: 0,
            scroll: 0.0,
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    fn paint_body(&self, canvas: &mut Canvas) {
        let outer = Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
        canvas.fill_round_rect(outer, Corners::all(BODY_RADIUS + OUTER_FRAME + RIM), FRAME_BLACK);
        canvas.fill_round_rect(outer.inset(OUTER_FRAME), Corners::all(BODY_RADIUS + RIM), RIM_GREY);
        canvas.fill_round_rect(BODY, Corners::all(BODY_RADIUS), BEZEL_COLOR);
    }

    fn paint_messages(&self, canvas: &mut Canvas) {
        let conv = &self.conversation;
        canvas.clipped(MESSAGE_AREA, |canvas| {
            match (&conv.background, &self.assets.background) {
                (Background::Solid(color), _) => canvas.fill_rect(MESSAGE_AREA, color.to_rgba()),
                (_, Some(image)) => canvas.tile_image(image, MESSAGE_AREA),
                (_, None) => canvas.fill_rect(MESSAGE_AREA, FALLBACK_BACKGROUND.to_rgba()),
            }

            let top = MESSAGE_AREA.y - self.scroll;
            canvas.translated(MESSAGE_AREA.x, top, |canvas| {
                for bubble in self.layout.bubbles(self.prefix) {
                    self.paint_bubble(canvas, bubble);
                }
            });
        });
    }

    fn paint_bubble(&self, canvas: &mut Canvas, bubble: &BubbleLayout) {
        let colors = &self.conversation.bubbles;
        let (fill, text, corners) = match bubble.sender {
            Sender::Assistant => (
                colors.assistant_fill,
                colors.assistant_text,
                Corners {
                    top_left: 0.0,
                    ..Corners::all(BUBBLE_RADIUS)
                },
            ),
            Sender::User => (
                colors.user_fill,
                colors.user_text,
                Corners {
                    top_right: 0.0,
                    ..Corners::all(BUBBLE_RADIUS)
                },
            ),
        };

        // Two offset passes approximate a 2px drop shadow with 4px blur.
        canvas.fill_round_rect(bubble.frame.offset(0.0, 1.0), corners, SHADOW);
        canvas.fill_round_rect(bubble.frame.offset(0.0, 2.0), corners, SHADOW);
        canvas.fill_round_rect(bubble.frame, corners, fill.to_rgba());

        let px = self.layout.font_px();
        let line_height = self.layout.line_height();
        let glyphs = self.assets.glyphs.as_ref();
        for (i, line) in bubble.lines.iter().enumerate() {
            let y = bubble.frame.y + BUBBLE_PAD_Y + i as f32 * line_height;
            let baseline_pad = (line_height - px) / 2.0;
            glyphs.draw(
                canvas,
                bubble.frame.x + BUBBLE_PAD_X,
                y + baseline_pad,
                line,
                px,
                text.to_rgba(),
            );
        }
    }

    fn paint_header(&self, canvas: &mut Canvas) {
        let conv = &self.conversation;
        let glyphs = self.assets.glyphs.as_ref();
        let header = Rect::new(0.0, 0.0, SCREEN.w, HEADER_HEIGHT);
        canvas.fill_rect(header, conv.header_color.to_rgba());

        // Status bar.
        glyphs.draw(canvas, 40.0, 12.0, &conv.clock.label(), CLOCK_PX, WHITE);
        let island = Rect::new((SCREEN.w - ISLAND_WIDTH) / 2.0, 8.0, ISLAND_WIDTH, ISLAND_HEIGHT);
        canvas.fill_round_rect(island, Corners::all(20.0), BEZEL_COLOR);
        paint_status_icons(canvas, SCREEN.w - 12.0, 20.0);

        // Avatar and name.
        let radius = AVATAR_SIZE / 2.0;
        let (cx, cy) = (AVATAR_ORIGIN.0 + radius, AVATAR_ORIGIN.1 + radius);
        match &self.assets.avatar {
            Some(image) => canvas.draw_image_circle(image, cx, cy, radius),
            None => paint_avatar_placeholder(canvas, cx, cy, radius),
        }
        glyphs.draw(canvas, NAME_X, cy - NAME_PX / 2.0, &conv.assistant_name, NAME_PX, WHITE);
    }

    fn paint_input_bar(&self, canvas: &mut Canvas) {
        let bar_color = self.conversation.input_bar_color.to_rgba();
        let top = MESSAGE_AREA.bottom();
        canvas.fill_rect(Rect::new(0.0, top, SCREEN.w, INPUT_BAR_HEIGHT), bar_color);

        let mid = top + INPUT_BAR_HEIGHT / 2.0;
        paint_plus(canvas, 28.0, mid);
        let pill = Rect::new(52.0, mid - 18.0, SCREEN.w - 52.0 - 96.0, 36.0);
        canvas.fill_round_rect(pill, Corners::all(18.0), WHITE);
        paint_camera(canvas, SCREEN.w - 72.0, mid, bar_color);
        paint_mic(canvas, SCREEN.w - 28.0, mid, bar_color);

        let strip = Rect::new(0.0, top + INPUT_BAR_HEIGHT, SCREEN.w, HOME_STRIP_HEIGHT);
        canvas.fill_rect(strip, bar_color);
        let home_bar = Rect::new(
            (SCREEN.w - HOME_BAR_WIDTH) / 2.0,
            strip.y + (HOME_STRIP_HEIGHT - HOME_BAR_HEIGHT) / 2.0,
            HOME_BAR_WIDTH,
            HOME_BAR_HEIGHT,
        );
        canvas.fill_round_rect(home_bar, Corners::all(HOME_BAR_HEIGHT / 2.0), HOME_BAR);
    }
}

impl RenderableView for PhoneView {
    fn logical_size(&self) -> (f32, f32) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    fn set_prefix(&mut self, len: usize) {
        self.prefix = len.min(self.conversation.len());
        self.scroll = self.scroll.min(self.layout.max_scroll(self.prefix));
    }

    fn prefix_len(&self) -> usize {
        self.prefix
    }

    fn visible(&self) -> &[Message] {
        self.conversation.prefix(self.prefix)
    }

    fn overflows(&self) -> bool {
        self.layout.max_scroll(self.prefix) > 0.0
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = self.layout.max_scroll(self.prefix);
    }

    fn paint(&self, canvas: &mut Canvas) {
        self.paint_body(canvas);
        canvas.translated(SCREEN.x, SCREEN.y, |canvas| {
            canvas.clipped(Rect::new(0.0, 0.0, SCREEN.w, SCREEN.h), |canvas| {
                self.paint_messages(canvas);
                self.paint_header(canvas);
                self.paint_input_bar(canvas);
            });
            let screen = Rect::new(0.0, 0.0, SCREEN.w, SCREEN.h);
            canvas.fill_corner_cutouts(screen, Corners::all(SCREEN_RADIUS), BEZEL_COLOR);
        });
    }
}

fn paint_status_icons(canvas: &mut Canvas, right: f32, top: f32) {
    // Battery.
    let battery = Rect::new(right - 27.0, top, 24.0, 11.0);
    canvas.fill_round_rect(battery, Corners::all(3.0), [255, 255, 255, 110]);
    canvas.fill_round_rect(battery.inset(2.0), Corners::all(1.5), WHITE);
    canvas.fill_rect(Rect::new(battery.right() + 1.0, top + 3.5, 1.5, 4.0), [255, 255, 255, 110]);

    // Wi-Fi as three stacked arcs approximated by shrinking pills.
    let wifi_x = battery.x - 22.0;
    for (i, w) in [15.0f32, 10.0, 5.0].iter().enumerate() {
        let y = top + i as f32 * 3.5;
        canvas.fill_round_rect(
            Rect::new(wifi_x + (15.0 - w) / 2.0, y, *w, 2.5),
            Corners::all(1.25),
            WHITE,
        );
    }

    // Signal bars.
    let signal_x = wifi_x - 22.0;
    for i in 0..4 {
        let h = 4.0 + i as f32 * 2.5;
        canvas.fill_round_rect(
            Rect::new(signal_x + i as f32 * 4.5, top + 11.5 - h, 3.0, h),
            Corners::all(1.0),
            WHITE,
        );
    }
}

fn paint_avatar_placeholder(canvas: &mut Canvas, cx: f32, cy: f32, radius: f32) {
    canvas.fill_circle(cx, cy, radius, [255, 255, 255, 26]);

    // Bot face.
    let head = Rect::new(cx - 9.0, cy - 5.0, 18.0, 13.0);
    canvas.fill_rect(Rect::new(cx - 1.0, cy - 10.0, 2.0, 5.0), WHITE);
    canvas.fill_circle(cx, cy - 10.0, 1.8, WHITE);
    canvas.fill_round_rect(head, Corners::all(3.0), WHITE);
    canvas.fill_circle(cx - 4.0, cy + 1.0, 1.8, [0, 0, 0, 120]);
    canvas.fill_circle(cx + 4.0, cy + 1.0, 1.8, [0, 0, 0, 120]);
}

fn paint_plus(canvas: &mut Canvas, cx: f32, cy: f32) {
    canvas.fill_round_rect(Rect::new(cx - 9.0, cy - 1.0, 18.0, 2.0), Corners::all(1.0), ICON_GREY);
    canvas.fill_round_rect(Rect::new(cx - 1.0, cy - 9.0, 2.0, 18.0), Corners::all(1.0), ICON_GREY);
}

fn paint_camera(canvas: &mut Canvas, cx: f32, cy: f32, backdrop: Color) {
    let body = Rect::new(cx - 10.0, cy - 6.5, 20.0, 15.0);
    canvas.fill_round_rect(Rect::new(cx - 4.0, cy - 9.0, 8.0, 4.0), Corners::top(1.5), ICON_GREY);
    canvas.fill_round_rect(body, Corners::all(3.0), ICON_GREY);
    canvas.fill_circle(cx, cy + 1.0, 4.0, backdrop);
    canvas.fill_circle(cx, cy + 1.0, 2.5, ICON_GREY);
}

fn paint_mic(canvas: &mut Canvas, cx: f32, cy: f32, backdrop: Color) {
    canvas.fill_round_rect(Rect::new(cx - 7.0, cy - 3.0, 14.0, 9.0), Corners::bottom(7.0), ICON_GREY);
    canvas.fill_round_rect(Rect::new(cx - 5.0, cy - 3.0, 10.0, 7.0), Corners::bottom(5.0), backdrop);
    canvas.fill_round_rect(Rect::new(cx - 3.5, cy - 10.0, 7.0, 13.0), Corners::all(3.5), ICON_GREY);
    canvas.fill_rect(Rect::new(cx - 1.0, cy + 6.0, 2.0, 3.0), ICON_GREY);
    canvas.fill_rect(Rect::new(cx - 4.0, cy + 9.0, 8.0, 1.5), ICON_GREY);
}
