//! # Lobby Tools
//!
//! Command-line tools for working with lobby descriptions:
//! - Rank and validation reports
//! - Spawn file generation
//! - JSON statistics output

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod inspect;
pub mod recorder;

use thiserror::Error;

/// Errors surfaced by the tools.
#[derive(Debug, Error)]
pub enum ToolsError {
    /// Lobby engine failure.
    #[error(transparent)]
    Lobby(#[from] lobby_core::error::LobbyError),

    /// Report serialization failure.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolsError>;
