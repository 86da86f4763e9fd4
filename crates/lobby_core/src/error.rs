//! Error types for the lobby core.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using [`LobbyError`].
pub type Result<T> = std::result::Result<T, LobbyError>;

/// Top-level error type for all lobby session errors.
#[derive(Debug, Error)]
pub enum LobbyError {
    /// The launch gate rejected the current configuration.
    #[error("Cannot start game: {0}")]
    Validation(#[from] ValidationError),

    /// No option with the given name exists.
    #[error("Unknown game option: {0}")]
    UnknownOption(String),

    /// The option is currently forced by the map or game mode.
    #[error("Game option '{0}' is forced and cannot be changed")]
    OptionLocked(String),

    /// The value does not fit the option's kind or range.
    #[error("Game option '{name}' does not accept value {value}")]
    InvalidOptionValue {
        /// Option name.
        name: String,
        /// Rejected value, rendered for display.
        value: String,
    },

    /// The roster already holds the maximum number of participants.
    #[error("Roster is full ({0} participants)")]
    RosterFull(usize),

    /// A participant index did not refer to anyone in the roster.
    #[error("No participant at index {0}")]
    InvalidParticipant(usize),

    /// A participant attribute points outside the session's tables.
    #[error("Invalid participant attribute: {0}")]
    InvalidAttribute(String),

    /// No map / game mode is selected.
    #[error("No map selected")]
    NoMapSelected,

    /// Malformed INI text.
    #[error("Failed to parse INI at line {line}: {message}")]
    IniParse {
        /// One-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Filesystem failure.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File the operation was acting on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing launch files or starting the game process failed.
    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    /// An internal precondition was broken (e.g. an exhausted color pool
    /// after validation passed). Never a user-facing condition.
    #[error("Internal consistency failure: {0}")]
    InvariantViolation(String),
}

impl LobbyError {
    /// Wrap an IO error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
