//! The command dispatch lifecycle.
//!
//! Every dispatch call runs the same fixed sequence over a connection it
//! owns exclusively: connect, authenticate, run the command's exchange,
//! close. The connection is closed on every exit path and any stage
//! failure is returned as a single [`Error::Dispatch`] with the stage
//! error as its source.

use super::connection::{ControlConnection, ControlSocket};
use super::response::CommandReply;
use crate::error::{Error, Result};

/// A single control-port exchange producing a typed response.
///
/// Implementations only write their command line(s) and parse the reply;
/// the connect/authenticate/close sequencing belongs to [`dispatch_over`].
#[allow(async_fn_in_trait)]
pub trait Command {
    /// The typed response a successful exchange produces.
    type Response;

    /// Run the exchange over an already-authenticated connection.
    async fn exchange<C: ControlConnection>(&self, conn: &mut C) -> Result<Self::Response>;
}

/// Dispatch `command` to the control port at `addr:control_port`.
///
/// Opens exactly one connection for the duration of the call and closes it
/// on every exit path. No retry is performed. All failures come back as
/// [`Error::Dispatch`] with the stage error chained as the source.
pub async fn dispatch<Cmd: Command>(
    command: &Cmd,
    addr: &str,
    control_port: u16,
    secret: &str,
) -> Result<Cmd::Response> {
    dispatch_over(ControlSocket::new(addr, control_port), secret, command).await
}

/// Run the dispatch lifecycle over an already-constructed connection.
///
/// This is the seam [`dispatch`] is built on; tests drive it with scripted
/// connections.
pub async fn dispatch_over<C, Cmd>(mut conn: C, secret: &str, command: &Cmd) -> Result<Cmd::Response>
where
    C: ControlConnection,
    Cmd: Command,
{
    let outcome = run_stages(&mut conn, secret, command).await;
    conn.close().await;
    outcome.map_err(|e| Error::Dispatch(Box::new(e)))
}

async fn run_stages<C, Cmd>(conn: &mut C, secret: &str, command: &Cmd) -> Result<Cmd::Response>
where
    C: ControlConnection,
    Cmd: Command,
{
    conn.connect().await?;
    conn.authenticate(secret).await?;
    command.exchange(conn).await
}

/// Best-effort dispatch of a command built with its default arguments.
///
/// Returns `true` iff a response was obtained and it reports success.
/// Every failure, at any stage, is absorbed into `false`; callers that
/// need diagnostics must use [`dispatch`] instead.
pub async fn dispatch_and_return<Cmd>(addr: &str, control_port: u16, secret: &str) -> bool
where
    Cmd: Command + Default,
    Cmd::Response: CommandReply,
{
    dispatch_and_return_over::<_, Cmd>(ControlSocket::new(addr, control_port), secret).await
}

/// Best-effort dispatch over an already-constructed connection.
pub async fn dispatch_and_return_over<C, Cmd>(conn: C, secret: &str) -> bool
where
    C: ControlConnection,
    Cmd: Command + Default,
    Cmd::Response: CommandReply,
{
    match dispatch_over(conn, secret, &Cmd::default()).await {
        Ok(reply) => reply.is_success(),
        Err(e) => {
            tracing::debug!(error = %e, "best-effort dispatch failed");
            false
        }
    }
}
