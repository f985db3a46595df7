//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Export pipeline tuning.
    pub export: ExportSettings,

    /// Where render-blocking assets come from.
    pub assets: AssetConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Tuning constants for the export pipeline.
///
/// None of these change which frames are produced; they only affect pacing,
/// progress reporting and output resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Multiplier applied to the conversation's reveal delay (seconds) to get
    /// the per-frame settle pause before capture. In `[0.0, 1.0]`.
    pub reveal_pacing_factor: f64,

    /// Extra pause after force-scrolling an overflowing view (ms).
    pub scroll_settle_ms: u64,

    /// Upper bound for the asset barrier (seconds).
    pub asset_timeout_secs: u64,

    /// Share of overall progress assigned to frame capture, in `(0.0, 1.0)`.
    /// The remainder is assigned to encoding.
    pub capture_weight: f64,

    /// Output resolution multiplier for animated exports.
    pub resolution_scale: u32,

    /// Output resolution multiplier for still exports.
    pub still_scale: u32,

    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    pub gif_quality: u8,
}

/// Asset locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Explicit font file. Takes precedence over `font_candidates`.
    pub font_path: Option<PathBuf>,

    /// Font files tried in order when `font_path` is unset.
    pub font_candidates: Vec<PathBuf>,

    /// Directory holding bundled background presets.
    pub presets_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "chatshot=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            reveal_pacing_factor: 0.1,
            scroll_settle_ms: 50,
            asset_timeout_secs: 10,
            capture_weight: 0.8,
            resolution_scale: 4,
            still_scale: 2,
            gif_quality: 10,
        }
    }
}

impl ExportSettings {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.reveal_pacing_factor) {
            return Err("export.reveal_pacing_factor must be in [0.0, 1.0]".into());
        }
        if !(self.capture_weight > 0.0 && self.capture_weight < 1.0) {
            return Err("export.capture_weight must be in (0.0, 1.0)".into());
        }
        if self.resolution_scale == 0 || self.still_scale == 0 {
            return Err("export scales must be >= 1".into());
        }
        if !(1..=30).contains(&self.gif_quality) {
            return Err("export.gif_quality must be in 1..=30".into());
        }
        Ok(())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_candidates: default_font_candidates(),
            presets_dir: default_presets_dir(),
        }
    }
}

impl AssetConfig {
    /// The font file that will be used, if any exists on disk.
    pub fn resolve_font(&self) -> Option<PathBuf> {
        if let Some(path) = &self.font_path {
            return Some(path.clone());
        }
        self.font_candidates.iter().find(|p| p.exists()).cloned()
    }

    /// Path of a named background preset.
    pub fn preset_path(&self, name: &str) -> PathBuf {
        self.presets_dir.join(name)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                    Ok(config) => match config.export.validate() {
                        Ok(()) => return config,
                        Err(e) => {
                            tracing::warn!("Ignoring invalid config at {:?}: {}", config_path, e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    config_base().join("chatshot").join("config.json")
}

fn config_base() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Default background presets directory.
fn default_presets_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    base.join("chatshot").join("backgrounds")
}

fn default_font_candidates() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_settings_are_valid() {
        let settings = ExportSettings::default();
        assert!(settings.validate().is_ok());
        assert!((settings.capture_weight - 0.8).abs() < 1e-9);
        assert_eq!(settings.resolution_scale, 4);
    }

    #[test]
    fn test_capture_weight_bounds_are_enforced() {
        let settings = ExportSettings {
            capture_weight: 1.0,
            ..ExportSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = ExportSettings {
            capture_weight: 0.0,
            ..ExportSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_reveal_pacing_factor_is_bounded() {
        for factor in [1e20, 1.5, -0.1, f64::NAN, f64::INFINITY] {
            let settings = ExportSettings {
                reveal_pacing_factor: factor,
                ..ExportSettings::default()
            };
            assert!(settings.validate().is_err(), "accepted {factor}");
        }

        let settings = ExportSettings {
            reveal_pacing_factor: 1.0,
            ..ExportSettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"export":{"resolution_scale":2}}"#).unwrap();
        assert_eq!(config.export.resolution_scale, 2);
        assert_eq!(config.export.scroll_settle_ms, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.export.gif_quality = 20;
        config.assets.font_path = Some(PathBuf::from("/fonts/Inter.ttf"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.export.gif_quality, 20);
        assert_eq!(loaded.assets.resolve_font(), Some(PathBuf::from("/fonts/Inter.ttf")));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export":{"gif_quality":99}}"#).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.export.gif_quality, 10);
    }

    #[test]
    fn test_preset_path_joins_presets_dir() {
        let assets = AssetConfig {
            presets_dir: PathBuf::from("/data/backgrounds"),
            ..AssetConfig::default()
        };
        assert_eq!(
            assets.preset_path("Whatsapp_2.png"),
            PathBuf::from("/data/backgrounds/Whatsapp_2.png")
        );
    }
}
