//! Concrete control-port commands.

use super::connection::{read_reply, ControlConnection};
use super::dispatch::Command;
use super::response::{CommandReply, CommandResponse, ResponsePairs};
use crate::error::{Error, Result};

/// `GETINFO version` — query the daemon's version string.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetVersion;

/// Reply to [`GetVersion`].
#[derive(Debug, Clone)]
pub struct VersionResponse {
    success: bool,
    version: String,
}

impl VersionResponse {
    /// The daemon's version string, e.g. `0.4.8.12`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl CommandReply for VersionResponse {
    fn is_success(&self) -> bool {
        self.success
    }
}

impl Command for GetVersion {
    type Response = VersionResponse;

    async fn exchange<C: ControlConnection>(&self, conn: &mut C) -> Result<VersionResponse> {
        conn.write_line("GETINFO version").await?;
        let lines = read_reply(conn).await?;
        let pairs = ResponsePairs::parse(&lines);
        let version = pairs
            .get("version")
            .ok_or_else(|| Error::Protocol("no version in reply".into()))?
            .to_string();

        tracing::debug!(version = %version, "queried daemon version");
        Ok(VersionResponse {
            success: true,
            version,
        })
    }
}

/// `GETINFO key…` — query arbitrary daemon info keys.
#[derive(Debug, Clone)]
pub struct GetInfo {
    keys: Vec<String>,
}

impl GetInfo {
    /// Query the given info keys in one exchange.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reply to [`GetInfo`]: the parsed key/value pairs.
#[derive(Debug, Clone)]
pub struct GetInfoResponse {
    success: bool,
    pairs: ResponsePairs,
}

impl GetInfoResponse {
    /// The parsed pairs, one per requested key.
    pub fn pairs(&self) -> &ResponsePairs {
        &self.pairs
    }
}

impl CommandReply for GetInfoResponse {
    fn is_success(&self) -> bool {
        self.success
    }
}

impl Command for GetInfo {
    type Response = GetInfoResponse;

    async fn exchange<C: ControlConnection>(&self, conn: &mut C) -> Result<GetInfoResponse> {
        if self.keys.is_empty() {
            return Err(Error::Protocol("GETINFO requires at least one key".into()));
        }

        conn.write_line(&format!("GETINFO {}", self.keys.join(" "))).await?;
        let lines = read_reply(conn).await?;

        Ok(GetInfoResponse {
            success: true,
            pairs: ResponsePairs::parse(&lines),
        })
    }
}

/// `SIGNAL name` — send a signal to the daemon.
#[derive(Debug, Clone)]
pub struct Signal {
    name: String,
}

impl Signal {
    /// Send an arbitrary signal, e.g. `RELOAD` or `SHUTDOWN`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `SIGNAL NEWNYM` — request a fresh circuit for new connections.
    pub fn newnym() -> Self {
        Self::new("NEWNYM")
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::newnym()
    }
}

impl Command for Signal {
    type Response = CommandResponse;

    async fn exchange<C: ControlConnection>(&self, conn: &mut C) -> Result<CommandResponse> {
        conn.write_line(&format!("SIGNAL {}", self.name)).await?;
        read_reply(conn).await?;

        tracing::debug!(signal = %self.name, "signal accepted");
        Ok(CommandResponse::new(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_default_is_newnym() {
        assert_eq!(Signal::default().name, "NEWNYM");
    }

    #[test]
    fn test_get_info_collects_keys() {
        let cmd = GetInfo::new(["version", "network-status"]);
        assert_eq!(cmd.keys, vec!["version", "network-status"]);
    }
}
