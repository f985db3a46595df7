//! Conversation document: messages plus presentation settings.
//!
//! Messages are append-only. Once pushed, a message's text and sender never
//! change, and display order is append order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::style::{Background, BubbleColors, FontSize, HexColor, RevealTiming, StatusClock};

/// Who sent a message. Assistant bubbles sit on the left, user bubbles on the
/// right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Assistant,
    User,
}

/// One chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    text: String,
    sender: Sender,
}

#[derive(Deserialize)]
struct RawMessage {
    text: String,
    sender: Sender,
}

impl Message {
    /// Create a message. Text must contain something other than whitespace;
    /// embedded line breaks are kept verbatim.
    pub fn new(text: impl Into<String>, sender: Sender) -> Result<Self, ModelError> {
        let text = text.into().replace("\r\n", "\n");
        if text.trim().is_empty() {
            return Err(ModelError::ValidationError {
                message: "message text must not be empty".to_string(),
            });
        }
        Ok(Self { text, sender })
    }

    pub fn assistant(text: impl Into<String>) -> Result<Self, ModelError> {
        Self::new(text, Sender::Assistant)
    }

    pub fn user(text: impl Into<String>) -> Result<Self, ModelError> {
        Self::new(text, Sender::User)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Text split on hard line breaks.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = ModelError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        Message::new(raw.text, raw.sender)
    }
}

/// The complete conversation document (`*.chat.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    /// Schema version.
    pub version: String,

    messages: Vec<Message>,

    /// Name shown in the header.
    pub assistant_name: String,

    /// Avatar image shown next to the name.
    pub avatar: Option<PathBuf>,

    /// Header and status-bar background.
    pub header_color: HexColor,

    /// Input bar and home-indicator strip background.
    pub input_bar_color: HexColor,

    /// Message area background.
    pub background: Background,

    /// Bubble fill and text colors.
    pub bubbles: BubbleColors,

    /// Bubble text size.
    pub font_size: FontSize,

    /// Time shown in the status bar.
    pub clock: StatusClock,

    /// Animated export timing.
    pub timing: RevealTiming,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            messages: Vec::new(),
            assistant_name: "Assistente".to_string(),
            avatar: None,
            header_color: HexColor::rgb(0x12, 0x8c, 0x7e),
            input_bar_color: HexColor::rgb(0xf0, 0xf0, 0xf0),
            background: Background::default(),
            bubbles: BubbleColors::default(),
            font_size: FontSize::default(),
            clock: StatusClock::default(),
            timing: RevealTiming::default(),
        }
    }
}

impl Conversation {
    /// Create an empty conversation with default styling.
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            ..Self::default()
        }
    }

    /// A short two-sided exchange used by `chatshot init`.
    pub fn sample() -> Self {
        let mut conversation = Self::default();
        for (text, sender) in [
            ("Oi! Como posso ajudar?", Sender::Assistant),
            ("Quero agendar uma consulta.", Sender::User),
            ("Claro! Qual dia fica melhor\npara você?", Sender::Assistant),
            ("Sexta de manhã.", Sender::User),
        ] {
            conversation.messages.push(Message {
                text: text.to_string(),
                sender,
            });
        }
        conversation
    }

    /// Append a message to the end of the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Validate and append a message.
    pub fn say(&mut self, sender: Sender, text: impl Into<String>) -> Result<(), ModelError> {
        self.push(Message::new(text, sender)?);
        Ok(())
    }

    /// Remove every message, keeping the presentation settings.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The first `len` messages (clamped to the conversation length).
    pub fn prefix(&self, len: usize) -> &[Message] {
        &self.messages[..len.min(self.messages.len())]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Count of messages per sender: `(assistant, user)`.
    pub fn sender_counts(&self) -> (usize, usize) {
        let assistant = self
            .messages
            .iter()
            .filter(|m| m.sender == Sender::Assistant)
            .count();
        (assistant, self.messages.len() - assistant)
    }

    /// Collect problems a renderer would trip over.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if self.assistant_name.trim().is_empty() {
            errors.push("Assistant name is empty".to_string());
        }

        if let Some(avatar) = &self.avatar {
            if !avatar.exists() {
                errors.push(format!("Avatar image missing: {}", avatar.display()));
            }
        }

        if let Background::Image(path) = &self.background {
            if !path.exists() {
                errors.push(format!("Background image missing: {}", path.display()));
            }
        }

        if let Background::Preset(name) = &self.background {
            if !crate::style::BACKGROUND_IMAGE_PRESETS.contains(&name.as_str()) {
                errors.push(format!("Unknown background preset: {name}"));
            }
        }

        errors
    }

    /// Load a conversation document.
    ///
    /// Relative avatar and background paths are resolved against the
    /// document's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut conversation: Conversation =
            serde_json::from_str(&json).map_err(|e| ModelError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        if let Some(base) = path.parent() {
            conversation.resolve_paths(base);
        }
        Ok(conversation)
    }

    /// Write the document as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(avatar) = self.avatar.as_mut() {
            if avatar.is_relative() {
                *avatar = base.join(&*avatar);
            }
        }
        if let Background::Image(image) = &mut self.background {
            if image.is_relative() {
                *image = base.join(&*image);
            }
        }
    }
}

/// Errors that can occur when working with conversation documents.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid conversation: {message}")]
    ValidationError { message: String },
}
