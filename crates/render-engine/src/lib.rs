//! Chatshot Render Engine
//!
//! Offscreen rendering and the frame-capture-and-encode pipeline that turns
//! a conversation into a screenshot or a looping animation.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Conversation ──snapshot──┐
//!                          ├── Asset barrier (font, avatar, background)
//!                          │
//!                          ├── PhoneView, prefix 1..=N
//!                          │         │
//!                          │         ├── scroll to bottom on overflow
//!                          │         ▼
//!                          │   Rasterizer ── frame i
//!                          ▼
//!                    Animation encoder (GIF, looping)
//!                          │
//!                          ▼
//!                  chat-animation.gif
//! ```

pub mod assets;
pub mod canvas;
pub mod encode;
pub mod export;
pub mod layout;
pub mod progress;
pub mod raster;
pub mod text;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::{AssetLoader, AssetSet, FsAssetLoader};
pub use encode::{encode_png, AnimationEncoder, EncodeOptions, GifAnimationEncoder};
pub use export::*;
pub use progress::*;
pub use raster::{CaptureOptions, Rasterizer, SoftwareRasterizer};
pub use view::{PhoneView, PhoneViewBuilder, RenderableView, ViewBuilder};
