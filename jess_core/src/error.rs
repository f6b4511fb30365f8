use std::fmt::Display;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DialogError>;

/// Closed set of failures the dialog engine distinguishes.
#[derive(Debug, Error)]
pub enum DialogError {
    /// Network or IO failure talking to the completion endpoint, including
    /// non-success statuses and undecodable bodies.
    #[error("transport error: {0}")]
    Transport(String),

    /// Well-formed completion response carrying zero choices.
    #[error("empty response: the completion endpoint returned no choices")]
    EmptyResponse,

    /// Reply content had an unexpected shape.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Reading the user's input or writing the transcript failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogError {
    pub fn transport(err: impl Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn storage(err: impl Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Storage and terminal failures end the session; the rest are local to a turn.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }
}
