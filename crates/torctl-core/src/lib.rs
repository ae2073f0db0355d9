//! # torctl-core
//!
//! A client-side protocol layer for controlling a running Tor daemon.
//!
//! The crate has two independent pieces:
//!
//! - [`control`]: a command dispatch framework for the ControlPort protocol
//!   (spec: control-spec.txt). A [`control::Command`] describes one
//!   protocol exchange; [`control::dispatch`] runs the fixed
//!   connect/authenticate/exchange/close lifecycle around it and returns a
//!   typed response.
//! - [`stream`]: a byte-stream adapter that replays bytes already consumed
//!   from a socket (for example during protocol sniffing) before continuing
//!   to read from the live connection.
//!
//! ## Example
//!
//! ```rust,no_run
//! use torctl_core::control::{dispatch, GetVersion};
//!
//! #[tokio::main]
//! async fn main() -> torctl_core::Result<()> {
//!     let reply = dispatch(&GetVersion, "127.0.0.1", 9051, "").await?;
//!     println!("Tor version: {}", reply.version());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod control;
pub mod error;
pub mod logging;
pub mod stream;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
