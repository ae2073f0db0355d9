//! Error types for the control-port client.
//!
//! Each dispatch stage has its own error kind; the dispatch entry points
//! wrap whichever stage failed in [`Error::Dispatch`] so callers always see
//! a single error kind with the original cause chained.

use thiserror::Error;

/// Core error type for control-port operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The transport connection to the control port could not be established.
    #[error("failed to connect to control port: {0}")]
    Connection(String),

    /// The control port rejected the supplied authentication secret.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Malformed or unexpected response during a command exchange.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A command dispatch failed. The stage that failed is the source.
    #[error("command dispatch failed")]
    Dispatch(#[source] Box<Error>),

    /// Operation invoked outside the supported surface of the stream adapter.
    #[error("{0} is not supported on a partially buffered stream")]
    NotSupported(&'static str),
}

/// Result type alias using this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The stage error behind a [`Error::Dispatch`], if this is one.
    pub fn dispatch_cause(&self) -> Option<&Error> {
        match self {
            Error::Dispatch(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        // Raw I/O failures mid-exchange are protocol-stage failures; the
        // connect and authenticate stages map their errors explicitly.
        Error::Protocol(e.to_string())
    }
}
