//! Chatshot Chat Model
//!
//! Defines the data contracts for a mock messenger conversation:
//! - **Messages:** Ordered, immutable text bubbles from the assistant or the user
//! - **Style:** Colors, background, font size, status-bar clock
//! - **Timing:** Reveal delay and per-frame hold used by animated exports
//!
//! A [`Conversation`] is plain data. Exporters take a snapshot of it and never
//! write back.

pub mod conversation;
pub mod style;

pub use conversation::*;
pub use style::*;
