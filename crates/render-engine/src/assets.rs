//! Render-blocking assets: the font, the avatar and the background image.
//!
//! Everything a view needs is loaded up front so painting never touches the
//! filesystem and every frame sees the same resources.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chatshot_chat_model::{Background, Conversation};
use chatshot_common::config::AssetConfig;
use chatshot_common::error::{ChatshotError, ChatshotResult};
use image::RgbaImage;

use crate::text::{FontFace, GlyphSource};

/// Decoded assets for one render.
#[derive(Clone)]
pub struct AssetSet {
    pub glyphs: Arc<dyn GlyphSource>,
    pub avatar: Option<Arc<RgbaImage>>,
    pub background: Option<Arc<RgbaImage>>,
}

impl std::fmt::Debug for AssetSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSet")
            .field("avatar", &self.avatar.as_ref().map(|i| i.dimensions()))
            .field("background", &self.background.as_ref().map(|i| i.dimensions()))
            .finish_non_exhaustive()
    }
}

/// Loads every asset a conversation's view depends on.
#[async_trait::async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, conversation: &Conversation) -> ChatshotResult<AssetSet>;
}

/// Loads assets from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    config: AssetConfig,
}

impl FsAssetLoader {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    /// Where a background image would be read from, if the background is an
    /// image at all.
    pub fn background_path(&self, background: &Background) -> Option<PathBuf> {
        match background {
            Background::Solid(_) => None,
            Background::Preset(name) => Some(self.config.preset_path(name)),
            Background::Image(path) => Some(path.clone()),
        }
    }

    async fn load_font(&self) -> ChatshotResult<FontFace> {
        let path = self.config.resolve_font().ok_or_else(|| {
            ChatshotError::asset_load("no usable font found; set assets.font_path or pass --font")
        })?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            ChatshotError::asset_load(format!("cannot read font {}: {e}", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tokio::task::spawn_blocking(move || FontFace::from_bytes(bytes, name))
            .await
            .map_err(|e| ChatshotError::asset_load(format!("font task failed: {e}")))?
    }
}

#[async_trait::async_trait]
impl AssetLoader for FsAssetLoader {
    async fn load(&self, conversation: &Conversation) -> ChatshotResult<AssetSet> {
        let font = self.load_font().await?;
        tracing::debug!(font = font.name(), "Font loaded");

        // A broken avatar falls back to the placeholder instead of failing
        // the whole render.
        let avatar = match &conversation.avatar {
            Some(path) => match decode_image(path).await {
                Ok(image) => Some(Arc::new(image)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Avatar unavailable, using placeholder");
                    None
                }
            },
            None => None,
        };

        let background = match self.background_path(&conversation.background) {
            Some(path) => Some(Arc::new(decode_image(&path).await?)),
            None => None,
        };

        Ok(AssetSet {
            glyphs: Arc::new(font),
            avatar,
            background,
        })
    }
}

/// Decode an image file to RGBA on a blocking worker.
pub async fn decode_image(path: &Path) -> ChatshotResult<RgbaImage> {
    if !path.exists() {
        return Err(ChatshotError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        image::open(&path)
            .map(|img| img.to_rgba8())
            .map_err(|e| ChatshotError::asset_load(format!("cannot decode {}: {e}", path.display())))
    })
    .await
    .map_err(|e| ChatshotError::asset_load(format!("image decode task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatshot_chat_model::HexColor;

    fn loader_with_font(font: &Path, presets: &Path) -> FsAssetLoader {
        FsAssetLoader::new(AssetConfig {
            font_path: Some(font.to_path_buf()),
            font_candidates: vec![],
            presets_dir: presets.to_path_buf(),
        })
    }

    #[tokio::test]
    async fn test_missing_font_is_an_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_with_font(&dir.path().join("missing.ttf"), dir.path());

        let err = loader.load(&Conversation::sample()).await.unwrap_err();
        assert!(matches!(err, ChatshotError::AssetLoad { .. }));
    }

    #[tokio::test]
    async fn test_no_font_candidates_is_an_asset_error() {
        let loader = FsAssetLoader::new(AssetConfig {
            font_path: None,
            font_candidates: vec![PathBuf::from("/nonexistent/font.ttf")],
            presets_dir: PathBuf::from("/nonexistent"),
        });
        let err = loader.load(&Conversation::sample()).await.unwrap_err();
        assert!(err.to_string().contains("no usable font"));
    }

    #[tokio::test]
    async fn test_decode_image_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let decoded = decode_image(&path).await.unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);

        let err = decode_image(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, ChatshotError::FileNotFound { .. }));
    }

    #[test]
    fn test_background_path_resolution() {
        let loader = loader_with_font(Path::new("/f.ttf"), Path::new("/presets"));
        assert_eq!(
            loader.background_path(&Background::Solid(HexColor::WHITE)),
            None
        );
        assert_eq!(
            loader.background_path(&Background::Preset("Whatsapp_1.png".into())),
            Some(PathBuf::from("/presets/Whatsapp_1.png"))
        );
        assert_eq!(
            loader.background_path(&Background::Image("/tmp/bg.jpg".into())),
            Some(PathBuf::from("/tmp/bg.jpg"))
        );
    }
}
