//! Chatshot Common Utilities
//!
//! Shared infrastructure for all Chatshot crates:
//! - Error types and result aliases
//! - Run clock and reveal pacing helpers for the export pipeline
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
