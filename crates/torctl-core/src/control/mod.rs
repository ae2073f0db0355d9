//! ControlPort command dispatch.
//!
//! Communicates with Tor via the ControlPort protocol (spec:
//! control-spec.txt). A [`Command`] describes a single protocol exchange;
//! [`dispatch`] wraps it in the fixed lifecycle: open a connection,
//! authenticate, run the exchange, and close the connection on every exit
//! path. [`dispatch_and_return`] is the fire-and-forget form that reduces
//! the whole outcome to a boolean.

mod commands;
mod connection;
mod dispatch;
mod response;

pub use commands::{GetInfo, GetInfoResponse, GetVersion, Signal, VersionResponse};
pub use connection::{escape_control_string, read_reply, ControlConnection, ControlSocket};
pub use dispatch::{dispatch, dispatch_and_return, dispatch_and_return_over, dispatch_over, Command};
pub use response::{CommandReply, CommandResponse, ResponsePairs};

/// Default control port for Tor.
pub const DEFAULT_CONTROL_PORT: u16 = 9051;
