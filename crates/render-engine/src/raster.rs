//! View → bitmap conversion.

use chatshot_common::error::{ChatshotError, ChatshotResult};
use image::RgbaImage;

use crate::canvas::{Canvas, Color, TRANSPARENT};
use crate::view::RenderableView;

/// Largest accepted output edge in device pixels.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

/// Capture parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Backing colour; `None` leaves unpainted pixels transparent.
    pub background: Option<Color>,

    /// Device pixels per logical pixel.
    pub scale: f32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            background: None,
            scale: 1.0,
        }
    }
}

/// Turns a view's current appearance into pixels.
#[async_trait::async_trait]
pub trait Rasterizer: Send + Sync {
    async fn capture(
        &self,
        view: &dyn RenderableView,
        options: &CaptureOptions,
    ) -> ChatshotResult<RgbaImage>;
}

/// Paints views on a CPU canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRasterizer;

/// Device size of a view at `scale`, or an error when the surface is
/// empty or too large.
pub fn surface_size(logical: (f32, f32), scale: f32) -> ChatshotResult<(u32, u32)> {
    let w = (logical.0 * scale).round();
    let h = (logical.1 * scale).round();
    if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 {
        return Err(ChatshotError::render(format!(
            "cannot capture a zero-area surface ({}x{} at scale {scale})",
            logical.0, logical.1
        )));
    }
    if w > MAX_SURFACE_EDGE as f32 || h > MAX_SURFACE_EDGE as f32 {
        return Err(ChatshotError::render(format!(
            "surface {w}x{h} exceeds the {MAX_SURFACE_EDGE}px limit"
        )));
    }
    Ok((w as u32, h as u32))
}

#[async_trait::async_trait]
impl Rasterizer for SoftwareRasterizer {
    async fn capture(
        &self,
        view: &dyn RenderableView,
        options: &CaptureOptions,
    ) -> ChatshotResult<RgbaImage> {
        let (width, height) = surface_size(view.logical_size(), options.scale)?;
        let mut canvas = Canvas::new(
            width,
            height,
            options.scale,
            options.background.unwrap_or(TRANSPARENT),
        );
        view.paint(&mut canvas);
        Ok(canvas.into_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{block_assets, conversation_of};
    use crate::view::PhoneView;
    use chatshot_chat_model::Sender;
    use std::sync::Arc;

    #[test]
    fn test_surface_size_limits() {
        assert_eq!(surface_size((390.0, 790.0), 2.0).unwrap(), (780, 1580));
        assert!(surface_size((0.0, 790.0), 2.0).is_err());
        assert!(surface_size((390.0, 790.0), 0.0).is_err());
        assert!(surface_size((390.0, 790.0), 100.0).is_err());
    }

    #[tokio::test]
    async fn test_capture_scales_output() {
        let mut view = PhoneView::new(
            Arc::new(conversation_of(&[("Oi!", Sender::Assistant)])),
            block_assets(),
        );
        view.set_prefix(1);

        let image = SoftwareRasterizer
            .capture(
                &view,
                &CaptureOptions {
                    background: None,
                    scale: 2.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(image.dimensions(), (780, 1580));
        assert_eq!(image.get_pixel(0, 0)[3], 0);
    }

    #[tokio::test]
    async fn test_opaque_background_fills_corners() {
        let view = PhoneView::new(Arc::new(conversation_of(&[])), block_assets());
        let image = SoftwareRasterizer
            .capture(
                &view,
                &CaptureOptions {
                    background: Some([255, 255, 255, 255]),
                    scale: 1.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }
}
