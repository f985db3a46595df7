//! Presentation settings for a conversation.
//!
//! Every value here is validated on construction and on deserialization, so a
//! loaded [`crate::Conversation`] never carries an out-of-range setting.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Header color swatches offered by the editor.
pub const HEADER_COLOR_PRESETS: [&str; 12] = [
    "#008069", "#128c7e", "#6d5bee", "#dd2a7b", "#075e54", "#128c7e", "#34b7f1", "#833ab4",
    "#405de6", "#5851db", "#c13584", "#fd1d1d",
];

/// Solid background swatches offered by the editor.
pub const BACKGROUND_COLOR_PRESETS: [&str; 12] = [
    "#e5ddd5", "#dcf8c6", "#ffffff", "#f0f2f5", "#efffde", "#d1f4ff", "#fff3c7", "#ffe9e9",
    "#f5e6ff", "#e8e8e8", "#dbddbb", "#b9d9eb",
];

/// Bundled background image presets.
pub const BACKGROUND_IMAGE_PRESETS: [&str; 5] = [
    "Whatsapp_2.png",
    "Whatsapp_3.png",
    "Whatsapp_4.jpg",
    "Whatsapp_5.jpg",
    "Whatsapp_6.jpg",
];

/// Errors raised when a presentation value is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("invalid color '{0}': expected 6 hex digits like #128c7e")]
    InvalidColor(String),

    #[error("font size {0} out of range {min}..={max}", min = FontSize::MIN, max = FontSize::MAX)]
    FontSizeOutOfRange(u8),

    #[error("invalid clock {hour}:{minute}: hour must be 0-23 and minute 0-59")]
    InvalidClock { hour: u8, minute: u8 },

    #[error("delay of {0}s not supported: choose 1, 2 or 3")]
    InvalidDelay(u8),
}

/// An opaque RGB color parsed from a 6-hex-digit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor::rgb(0, 0, 0);
    pub const WHITE: HexColor = HexColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with full opacity.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// RGBA bytes with the given alpha.
    pub fn with_alpha(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl FromStr for HexColor {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StyleError::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| StyleError::InvalidColor(s.into()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for HexColor {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// What fills the message area behind the bubbles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Background {
    /// Flat color.
    Solid(HexColor),
    /// One of [`BACKGROUND_IMAGE_PRESETS`], resolved against the presets directory.
    Preset(String),
    /// A user-supplied image file, tiled.
    Image(PathBuf),
}

impl Background {
    /// Whether rendering this background needs an image load.
    pub fn needs_image(&self) -> bool {
        !matches!(self, Background::Solid(_))
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(HexColor::rgb(0xe5, 0xdd, 0xd5))
    }
}

/// Fill and text colors for both bubble kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleColors {
    pub assistant_fill: HexColor,
    pub assistant_text: HexColor,
    pub user_fill: HexColor,
    pub user_text: HexColor,
}

impl Default for BubbleColors {
    fn default() -> Self {
        Self {
            assistant_fill: HexColor::WHITE,
            assistant_text: HexColor::rgb(0x30, 0x30, 0x30),
            user_fill: HexColor::rgb(0xdc, 0xf8, 0xc6),
            user_text: HexColor::rgb(0x30, 0x30, 0x30),
        }
    }
}

/// Bubble text size in points (one point = one logical pixel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FontSize(u8);

impl FontSize {
    pub const MIN: u8 = 12;
    pub const MAX: u8 = 24;

    pub fn new(pt: u8) -> Result<Self, StyleError> {
        if (Self::MIN..=Self::MAX).contains(&pt) {
            Ok(Self(pt))
        } else {
            Err(StyleError::FontSizeOutOfRange(pt))
        }
    }

    pub fn pt(self) -> u8 {
        self.0
    }

    pub fn px(self) -> f32 {
        f32::from(self.0)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self(15)
    }
}

impl TryFrom<u8> for FontSize {
    type Error = StyleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FontSize> for u8 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// The fixed time shown in the status bar. Not a live clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClockFields", into = "ClockFields")]
pub struct StatusClock(NaiveTime);

/// Wire form of [`StatusClock`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClockFields {
    pub hour: u8,
    pub minute: u8,
}

impl StatusClock {
    pub fn new(hour: u8, minute: u8) -> Result<Self, StyleError> {
        NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0)
            .map(Self)
            .ok_or(StyleError::InvalidClock { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.0.hour() as u8
    }

    pub fn minute(&self) -> u8 {
        self.0.minute() as u8
    }

    /// Status-bar label, e.g. `09:41`.
    pub fn label(&self) -> String {
        self.0.format("%H:%M").to_string()
    }
}

impl Default for StatusClock {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
    }
}

impl TryFrom<ClockFields> for StatusClock {
    type Error = StyleError;

    fn try_from(fields: ClockFields) -> Result<Self, Self::Error> {
        Self::new(fields.hour, fields.minute)
    }
}

impl From<StatusClock> for ClockFields {
    fn from(clock: StatusClock) -> Self {
        Self {
            hour: clock.hour(),
            minute: clock.minute(),
        }
    }
}

/// A delay selectable in the editor: one, two or three seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum StepDelay {
    #[default]
    One,
    Two,
    Three,
}

impl StepDelay {
    pub fn secs(self) -> u8 {
        match self {
            StepDelay::One => 1,
            StepDelay::Two => 2,
            StepDelay::Three => 3,
        }
    }

    pub fn duration(self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.secs()))
    }
}

impl TryFrom<u8> for StepDelay {
    type Error = StyleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StepDelay::One),
            2 => Ok(StepDelay::Two),
            3 => Ok(StepDelay::Three),
            other => Err(StyleError::InvalidDelay(other)),
        }
    }
}

impl From<StepDelay> for u8 {
    fn from(delay: StepDelay) -> Self {
        delay.secs()
    }
}

/// Animation timing for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RevealTiming {
    /// Delay between message reveals in the editor preview.
    pub reveal_delay: StepDelay,

    /// How long each frame stays on screen in the exported animation.
    pub frame_hold: StepDelay,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_color_parses_with_and_without_hash() {
        assert_eq!(
            "#128c7e".parse::<HexColor>().unwrap(),
            HexColor::rgb(0x12, 0x8c, 0x7e)
        );
        assert_eq!(
            "DCF8C6".parse::<HexColor>().unwrap(),
            HexColor::rgb(0xdc, 0xf8, 0xc6)
        );
    }

    #[test]
    fn test_hex_color_rejects_short_and_non_hex() {
        assert!("#fff".parse::<HexColor>().is_err());
        assert!("#12345g".parse::<HexColor>().is_err());
        assert!("".parse::<HexColor>().is_err());
        assert!("#1234567".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_hex_color_serializes_lowercase_with_hash() {
        let json = serde_json::to_string(&HexColor::rgb(0xDC, 0xF8, 0xC6)).unwrap();
        assert_eq!(json, "\"#dcf8c6\"");
    }

    #[test]
    fn test_presets_are_valid_colors() {
        for preset in HEADER_COLOR_PRESETS.iter().chain(BACKGROUND_COLOR_PRESETS.iter()) {
            assert!(preset.parse::<HexColor>().is_ok(), "{preset}");
        }
    }

    #[test]
    fn test_font_size_bounds() {
        assert!(FontSize::new(11).is_err());
        assert!(FontSize::new(12).is_ok());
        assert!(FontSize::new(24).is_ok());
        assert!(FontSize::new(25).is_err());
        assert!(serde_json::from_str::<FontSize>("30").is_err());
    }

    #[test]
    fn test_status_clock_label_and_validation() {
        let clock = StatusClock::new(9, 5).unwrap();
        assert_eq!(clock.label(), "09:05");
        assert_eq!(StatusClock::default().label(), "12:00");
        assert!(StatusClock::new(24, 0).is_err());
        assert!(StatusClock::new(23, 60).is_err());
    }

    #[test]
    fn test_status_clock_serde_uses_fields() {
        let clock = StatusClock::new(18, 30).unwrap();
        let json = serde_json::to_value(clock).unwrap();
        assert_eq!(json, serde_json::json!({"hour": 18, "minute": 30}));
        assert!(serde_json::from_value::<StatusClock>(serde_json::json!({"hour": 7, "minute": 99})).is_err());
    }

    #[test]
    fn test_step_delay_accepts_one_to_three() {
        assert_eq!(StepDelay::try_from(2).unwrap(), StepDelay::Two);
        assert!(StepDelay::try_from(0).is_err());
        assert!(StepDelay::try_from(4).is_err());
        assert_eq!(StepDelay::Three.duration().as_secs(), 3);
    }

    #[test]
    fn test_background_serde_shape() {
        let bg = Background::Preset("Whatsapp_2.png".into());
        let json = serde_json::to_value(&bg).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "preset", "value": "Whatsapp_2.png"}));
        assert!(bg.needs_image());
        assert!(!Background::default().needs_image());
    }

    proptest! {
        #[test]
        fn prop_hex_color_display_parses_back(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let color = HexColor::rgb(r, g, b);
            prop_assert_eq!(color.to_string().parse::<HexColor>().unwrap(), color);
        }

        #[test]
        fn prop_font_size_accepts_exactly_the_range(pt in any::<u8>()) {
            prop_assert_eq!(FontSize::new(pt).is_ok(), (12..=24).contains(&pt));
        }
    }
}
