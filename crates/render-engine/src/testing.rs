//! Test doubles for the export pipeline.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatshot_chat_model::{Conversation, Message, Sender};
use chatshot_common::error::{ChatshotError, ChatshotResult};
use image::{Rgba, RgbaImage};
use tokio::sync::Notify;

use crate::assets::{AssetLoader, AssetSet};
use crate::canvas::{Canvas, Color, Rect};
use crate::encode::{AnimationEncoder, EncodeOptions};
use crate::raster::{CaptureOptions, Rasterizer};
use crate::text::GlyphSource;
use crate::view::{RenderableView, ViewBuilder};

/// Monospace glyphs drawn as solid blocks; needs no font file.
pub struct BlockGlyphs;

impl BlockGlyphs {
    const ADVANCE: f32 = 0.5;
}

impl GlyphSource for BlockGlyphs {
    fn advance(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * Self::ADVANCE
    }

    fn draw(&self, canvas: &mut Canvas, x: f32, y: f32, text: &str, px: f32, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x + i as f32 * px * Self::ADVANCE;
            canvas.fill_rect(Rect::new(gx, y, px * 0.4, px), color);
        }
    }
}

pub fn block_assets() -> AssetSet {
    AssetSet {
        glyphs: Arc::new(BlockGlyphs),
        avatar: None,
        background: None,
    }
}

pub fn conversation_of(messages: &[(&str, Sender)]) -> Conversation {
    let mut conversation = Conversation::new("Bot");
    for (text, sender) in messages {
        conversation.push(Message::new(*text, *sender).unwrap());
    }
    conversation
}

/// Returns a fixed asset set, optionally after a delay.
pub struct StaticAssetLoader {
    assets: AssetSet,
    delay: Duration,
    missing: Mutex<Option<PathBuf>>,
}

impl StaticAssetLoader {
    pub fn new(assets: AssetSet) -> Self {
        Self {
            assets,
            delay: Duration::ZERO,
            missing: Mutex::new(None),
        }
    }

    /// Fail the first load with `FileNotFound` for `path`; later loads
    /// succeed.
    pub fn failing_once(path: impl Into<PathBuf>) -> Self {
        Self {
            missing: Mutex::new(Some(path.into())),
            ..Self::new(block_assets())
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl AssetLoader for StaticAssetLoader {
    async fn load(&self, _conversation: &Conversation) -> ChatshotResult<AssetSet> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let missing = self.missing.lock().unwrap().take();
        if let Some(path) = missing {
            return Err(ChatshotError::FileNotFound { path });
        }
        Ok(self.assets.clone())
    }
}

#[derive(Default)]
pub struct ViewLog {
    pub events: Mutex<Vec<String>>,
}

/// Builds [`RecordingView`]s that share one log.
pub struct RecordingViewBuilder {
    overflow_after: usize,
    log: Arc<ViewLog>,
}

impl RecordingViewBuilder {
    pub fn overflowing_after(overflow_after: usize) -> Self {
        Self {
            overflow_after,
            log: Arc::default(),
        }
    }

    pub fn log(&self) -> Arc<ViewLog> {
        Arc::clone(&self.log)
    }
}

impl ViewBuilder for RecordingViewBuilder {
    fn build(
        &self,
        snapshot: Arc<Conversation>,
        _assets: AssetSet,
    ) -> ChatshotResult<Box<dyn RenderableView>> {
        Ok(Box::new(RecordingView {
            conversation: snapshot,
            prefix: 0,
            overflow_after: self.overflow_after,
            log: Arc::clone(&self.log),
        }))
    }
}

/// 1×1 logical view that records how it is driven.
pub struct RecordingView {
    conversation: Arc<Conversation>,
    prefix: usize,
    overflow_after: usize,
    log: Arc<ViewLog>,
}

impl RenderableView for RecordingView {
    fn logical_size(&self) -> (f32, f32) {
        (1.0, 1.0)
    }

    fn set_prefix(&mut self, len: usize) {
        self.prefix = len.min(self.conversation.len());
        self.log.events.lock().unwrap().push(format!("prefix {len}"));
    }

    fn prefix_len(&self) -> usize {
        self.prefix
    }

    fn visible(&self) -> &[Message] {
        self.conversation.prefix(self.prefix)
    }

    fn overflows(&self) -> bool {
        self.prefix > self.overflow_after
    }

    fn scroll_to_bottom(&mut self) {
        self.log.events.lock().unwrap().push("scroll".to_string());
    }

    fn paint(&self, canvas: &mut Canvas) {
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), [self.prefix as u8, 0, 0, 255]);
    }
}

/// Emits a 1×1 frame whose red channel is the shown prefix length.
pub struct ScriptedRasterizer {
    calls: AtomicUsize,
    fail_on: Option<usize>,
    gate: Option<Arc<Notify>>,
    captured: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedRasterizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: None,
            gate: None,
            captured: Arc::default(),
        }
    }

    /// Fail the `n`th call (1-based, counted across runs).
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::new()
        }
    }

    /// Block the first call until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    /// Visible message texts at each successful capture.
    pub fn captured(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        Arc::clone(&self.captured)
    }
}

#[async_trait::async_trait]
impl Rasterizer for ScriptedRasterizer {
    async fn capture(
        &self,
        view: &dyn RenderableView,
        _options: &CaptureOptions,
    ) -> ChatshotResult<RgbaImage> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == 1 {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
        if self.fail_on == Some(call) {
            return Err(ChatshotError::render("surface lost"));
        }
        let texts = view.visible().iter().map(|m| m.text().to_string()).collect();
        self.captured.lock().unwrap().push(texts);
        Ok(RgbaImage::from_pixel(
            1,
            1,
            Rgba([view.prefix_len() as u8, 0, 0, 255]),
        ))
    }
}

#[derive(Default)]
pub struct RecordingEncoderLog {
    /// Frame count and options of each call.
    pub calls: Mutex<Vec<(usize, EncodeOptions)>>,
}

/// Returns the red channel of each frame as the "encoded" bytes.
pub struct RecordingEncoder {
    fail: bool,
    log: Arc<RecordingEncoderLog>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self {
            fail: false,
            log: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn log(&self) -> Arc<RecordingEncoderLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait::async_trait]
impl AnimationEncoder for RecordingEncoder {
    async fn encode(
        &self,
        frames: Vec<RgbaImage>,
        options: &EncodeOptions,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> ChatshotResult<Vec<u8>> {
        if self.fail {
            return Err(ChatshotError::encode("quantizer exploded"));
        }
        self.log
            .calls
            .lock()
            .unwrap()
            .push((frames.len(), options.clone()));
        on_progress(0.5);
        tokio::task::yield_now().await;
        on_progress(1.0);
        Ok(frames.iter().map(|f| f.get_pixel(0, 0)[0]).collect())
    }
}
