//! Error types for the tubefetch library.

use thiserror::Error;

/// Errors that can occur while talking to the download backend.
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Backend {
        /// HTTP status code of the response.
        status: u16,
        /// Error message reported by the backend (or a per-endpoint fallback).
        message: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Metadata response carried a `type` that is neither `video` nor `playlist`.
    #[error("Unrecognized response type: {0}")]
    UnrecognizedResponse(String),

    /// I/O error while reading or writing local files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized.
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl Error {
    /// Returns the text to show the user for this error.
    ///
    /// Validation and backend errors carry a message meant for display and are
    /// returned verbatim. Transport and parse failures have no useful text for
    /// the user, so `fallback` is returned instead.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(msg) | Self::Backend { message: msg, .. } => msg.clone(),
            Self::UnrecognizedResponse(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Returns true for failures of the transport itself (network or parse).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Decode(_))
    }
}

/// A specialized `Result` type for tubefetch operations.
pub type Result<T> = std::result::Result<T, Error>;
