//! Bitmap sequence → animated container.

use std::io::Cursor;
use std::time::Duration;

use chatshot_common::error::{ChatshotError, ChatshotResult};
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::FilterType;
use image::{Delay, Frame, ImageFormat, RgbaImage};

/// Output parameters for an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Output width in pixels; frames are resampled to fit.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// How long each frame is shown.
    pub frame_interval: Duration,

    /// Repeat forever.
    pub looping: bool,

    /// Quantizer speed hint, 1 (best) to 30 (fastest).
    pub quality: u8,
}

/// Assembles frames into one animated image.
///
/// `on_progress` receives the fraction of frames encoded so far, in
/// `[0.0, 1.0]`, and is always invoked on the caller's task.
#[async_trait::async_trait]
pub trait AnimationEncoder: Send + Sync {
    async fn encode(
        &self,
        frames: Vec<RgbaImage>,
        options: &EncodeOptions,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> ChatshotResult<Vec<u8>>;
}

/// GIF encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifAnimationEncoder;

#[async_trait::async_trait]
impl AnimationEncoder for GifAnimationEncoder {
    async fn encode(
        &self,
        frames: Vec<RgbaImage>,
        options: &EncodeOptions,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> ChatshotResult<Vec<u8>> {
        check_frames(&frames, options)?;

        let total = frames.len();
        let options = options.clone();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<usize>();

        let worker = tokio::task::spawn_blocking(move || {
            encode_gif(frames, &options, |done| {
                // The receiver only goes away if the caller stopped waiting.
                let _ = tx.send(done);
            })
        });

        while let Some(done) = rx.recv().await {
            on_progress(done as f64 / total as f64);
        }

        worker
            .await
            .map_err(|e| ChatshotError::encode(format!("encoder task failed: {e}")))?
    }
}

fn check_frames(frames: &[RgbaImage], options: &EncodeOptions) -> ChatshotResult<()> {
    let Some(first) = frames.first() else {
        return Err(ChatshotError::encode("no frames to encode"));
    };
    if options.width == 0 || options.height == 0 {
        return Err(ChatshotError::encode(format!(
            "invalid output size {}x{}",
            options.width, options.height
        )));
    }
    let size = first.dimensions();
    if let Some((i, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.dimensions() != size)
    {
        return Err(ChatshotError::encode(format!(
            "frame {} is {}x{}, expected {}x{}",
            i + 1,
            frame.width(),
            frame.height(),
            size.0,
            size.1
        )));
    }
    Ok(())
}

fn encode_gif(
    frames: Vec<RgbaImage>,
    options: &EncodeOptions,
    mut progress: impl FnMut(usize),
) -> ChatshotResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let speed = i32::from(options.quality.clamp(1, 30));
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, speed);
        if options.looping {
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| ChatshotError::encode(e.to_string()))?;
        }

        let delay = Delay::from_saturating_duration(options.frame_interval);
        for (i, frame) in frames.into_iter().enumerate() {
            let frame = fit_to(frame, options.width, options.height);
            encoder
                .encode_frame(Frame::from_parts(frame, 0, 0, delay))
                .map_err(|e| ChatshotError::encode(format!("frame {}: {e}", i + 1)))?;
            progress(i + 1);
        }
    }
    tracing::debug!(bytes = bytes.len(), "GIF encoded");
    Ok(bytes)
}

fn fit_to(frame: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        image::imageops::resize(&frame, width, height, FilterType::Triangle)
    }
}

/// Encode a single bitmap as PNG.
pub fn encode_png(image: &RgbaImage) -> ChatshotResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ChatshotError::encode(format!("PNG: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};

    fn options(width: u32, height: u32) -> EncodeOptions {
        EncodeOptions {
            width,
            height,
            frame_interval: Duration::from_secs(1),
            looping: true,
            quality: 10,
        }
    }

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    #[tokio::test]
    async fn test_gif_preserves_frame_count_and_delay() {
        let frames = vec![solid(8, 8, 0), solid(8, 8, 255), solid(8, 8, 128)];
        let mut seen = Vec::new();
        let bytes = GifAnimationEncoder
            .encode(frames, &options(8, 8), &mut |p| seen.push(p))
            .await
            .unwrap();

        let decoded = GifDecoder::new(Cursor::new(bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded.len(), 3);
        let (numer, denom) = decoded[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 1000);
        assert!(decoded[1].buffer().get_pixel(0, 0)[0] > 200);

        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last().copied(), Some(1.0));
    }

    #[tokio::test]
    async fn test_frames_are_resampled_to_output_size() {
        let bytes = GifAnimationEncoder
            .encode(vec![solid(4, 4, 10), solid(4, 4, 20)], &options(8, 6), &mut |_| {})
            .await
            .unwrap();
        let decoded = GifDecoder::new(Cursor::new(bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded[0].buffer().dimensions(), (8, 6));
    }

    #[tokio::test]
    async fn test_mismatched_frames_are_rejected() {
        let err = GifAnimationEncoder
            .encode(vec![solid(4, 4, 0), solid(5, 4, 0)], &options(4, 4), &mut |_| {})
            .await
            .unwrap_err();
        assert!(err.to_string().contains("frame 2"));
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let err = GifAnimationEncoder
            .encode(vec![], &options(4, 4), &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ChatshotError::Encode { .. }));
    }

    #[test]
    fn test_png_signature() {
        let bytes = encode_png(&solid(2, 2, 7)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
