//! Control connection primitive.
//!
//! [`ControlConnection`] is the transport seam the dispatch lifecycle runs
//! over; [`ControlSocket`] is the TCP implementation used against a real
//! Tor daemon.

use crate::error::{Error, Result};
use crate::logging::Redacted;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// A line-based control-port transport, scoped to one dispatch call.
///
/// `connect` failures must surface as [`Error::Connection`] and
/// `authenticate` failures as [`Error::Authentication`]; the dispatch
/// lifecycle propagates them unchanged.
#[allow(async_fn_in_trait)]
pub trait ControlConnection {
    /// Establish the transport connection.
    async fn connect(&mut self) -> Result<()>;

    /// Authenticate with the given secret. An empty secret requests
    /// NULL authentication.
    async fn authenticate(&mut self, secret: &str) -> Result<()>;

    /// Write one protocol line (terminator added by the implementation).
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Read one protocol line with the terminator stripped.
    async fn read_line(&mut self) -> Result<String>;

    /// Release the transport. Must be idempotent.
    async fn close(&mut self);
}

/// TCP control connection to a Tor daemon.
pub struct ControlSocket {
    addr: String,
    port: u16,
    io: Option<(BufReader<OwnedReadHalf>, OwnedWriteHalf)>,
}

impl ControlSocket {
    /// Create an unconnected socket for `addr:port`.
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            io: None,
        }
    }
}

impl ControlConnection for ControlSocket {
    async fn connect(&mut self) -> Result<()> {
        let stream = TcpStream::connect((self.addr.as_str(), self.port))
            .await
            .map_err(|e| Error::Connection(format!("{}:{}: {}", self.addr, self.port, e)))?;

        let (read_half, write_half) = stream.into_split();
        self.io = Some((BufReader::new(read_half), write_half));

        tracing::debug!(addr = %self.addr, port = self.port, "connected to control port");
        Ok(())
    }

    async fn authenticate(&mut self, secret: &str) -> Result<()> {
        let line = if secret.is_empty() {
            "AUTHENTICATE".to_string()
        } else {
            format!("AUTHENTICATE \"{}\"", escape_control_string(secret))
        };

        tracing::trace!(secret = %Redacted(secret), "authenticating");

        self.write_line(&line)
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;
        let reply = self
            .read_line()
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;

        if reply.starts_with("250") {
            tracing::debug!("authenticated with control port");
            Ok(())
        } else {
            Err(Error::Authentication(format!("control port replied: {}", reply)))
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let (_, writer) = self
            .io
            .as_mut()
            .ok_or_else(|| Error::Protocol("connection not established".into()))?;

        writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        let (reader, _) = self
            .io
            .as_mut()
            .ok_or_else(|| Error::Protocol("connection not established".into()))?;

        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(Error::Protocol("control connection closed".into()));
        }
        Ok(line.trim_end().to_string())
    }

    async fn close(&mut self) {
        if let Some((_, mut writer)) = self.io.take() {
            let _ = writer.shutdown().await;
            tracing::debug!("closed control connection");
        }
    }
}

/// Read one complete reply from the control port.
///
/// Collects the payload of `250-` (and `250+`) continuation lines until the
/// `250 ` final line. Any 4xx/5xx line is a protocol error carrying the
/// full reply line.
pub async fn read_reply<C: ControlConnection>(conn: &mut C) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let line = conn.read_line().await?;

        if line.is_empty() {
            continue;
        }

        // Response format: "250-..." for continuation, "250 ..." for final.
        // Error responses: "5xx ..." or "4xx ...". Work on bytes: the
        // status prefix must be ASCII, and a reply with a multi-byte
        // character after the code must not panic the slice below.
        let bytes = line.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return Err(Error::Protocol(format!("malformed reply line: {}", line)));
        }
        if bytes[0] != b'2' {
            return Err(Error::Protocol(format!("control port error: {}", line)));
        }

        let separator = bytes.get(3).copied().unwrap_or(b' ');
        if !matches!(separator, b' ' | b'-' | b'+') {
            return Err(Error::Protocol(format!("malformed reply line: {}", line)));
        }

        // The separator is a single ASCII byte, so index 4 is a char boundary.
        lines.push(line.get(4..).unwrap_or("").to_string());

        if separator == b' ' {
            break;
        }
    }
    Ok(lines)
}

/// Escape a string for a quoted control-protocol argument.
pub fn escape_control_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
