//! Error types.

use std::io;
use thiserror::Error;

/// Failures between this client and the generation service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection dropped.
    #[error("could not reach the generation service")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("generation service responded with status {0}")]
    Status(u16),

    /// Reading the response body failed.
    #[error("reading the event stream failed")]
    Read(#[from] io::Error),
}

/// Top-level error for setting up and running the client.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal or file I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Building the HTTP client failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The prompt is empty, too short or too long.
    #[error("the description must be between {min} and {max} characters")]
    PromptRejected {
        /// Minimum characters.
        min: usize,
        /// Maximum characters.
        max: usize,
    },

    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Result alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
