//! Integration tests for the command dispatch lifecycle.
//!
//! These drive `dispatch_over` with a scripted connection and verify the
//! stage ordering, error wrapping, and cleanup guarantees.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use torctl_core::control::{
    dispatch_and_return_over, dispatch_over, ControlConnection, GetInfo, GetVersion, Signal,
};
use torctl_core::{Error, Result};

/// A scripted control connection that records every call.
struct MockConnection {
    refuse_connect: bool,
    refuse_auth: bool,
    replies: VecDeque<&'static str>,
    events: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl MockConnection {
    fn new(replies: &[&'static str]) -> (Self, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let closes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                refuse_connect: false,
                refuse_auth: false,
                replies: replies.iter().copied().collect(),
                events: Arc::clone(&events),
                closes: Arc::clone(&closes),
            },
            events,
            closes,
        )
    }

    fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    fn refusing_auth(mut self) -> Self {
        self.refuse_auth = true;
        self
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().expect("events lock").push(event.into());
    }
}

impl ControlConnection for MockConnection {
    async fn connect(&mut self) -> Result<()> {
        self.record("connect");
        if self.refuse_connect {
            Err(Error::Connection("connection refused".into()))
        } else {
            Ok(())
        }
    }

    async fn authenticate(&mut self, secret: &str) -> Result<()> {
        self.record(format!("authenticate {secret}"));
        if self.refuse_auth {
            Err(Error::Authentication("515 Bad authentication".into()))
        } else {
            Ok(())
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.record(format!("write {line}"));
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        self.replies
            .pop_front()
            .map(str::to_string)
            .ok_or_else(|| Error::Protocol("out of scripted replies".into()))
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn connect_failure_skips_authentication() {
    let (conn, events, closes) = MockConnection::new(&[]);
    let conn = conn.refusing_connect();

    let err = dispatch_over(conn, "pw", &GetVersion)
        .await
        .expect_err("dispatch should fail");

    assert!(matches!(
        err.dispatch_cause(),
        Some(Error::Connection(_))
    ));
    assert_eq!(*events.lock().expect("events lock"), vec!["connect"]);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn auth_failure_skips_exchange() {
    let (conn, events, closes) = MockConnection::new(&["250 OK"]);
    let conn = conn.refusing_auth();

    let err = dispatch_over(conn, "wrong", &GetVersion)
        .await
        .expect_err("dispatch should fail");

    assert!(matches!(
        err.dispatch_cause(),
        Some(Error::Authentication(_))
    ));
    let events = events.lock().expect("events lock");
    assert_eq!(*events, vec!["connect", "authenticate wrong"]);
    assert!(!events.iter().any(|e| e.starts_with("write")));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_dispatch_closes_exactly_once() {
    let (conn, events, closes) = MockConnection::new(&["250-version=0.4.8.12", "250 OK"]);

    let reply = dispatch_over(conn, "pw", &GetVersion)
        .await
        .expect("dispatch should succeed");

    assert_eq!(reply.version(), "0.4.8.12");
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    let events = events.lock().expect("events lock");
    assert_eq!(
        *events,
        vec!["connect", "authenticate pw", "write GETINFO version"]
    );
}

#[tokio::test]
async fn exchange_failure_still_closes_connection() {
    let (conn, _, closes) = MockConnection::new(&["551 Internal error"]);

    let err = dispatch_over(conn, "pw", &GetVersion)
        .await
        .expect_err("dispatch should fail");

    assert!(matches!(err.dispatch_cause(), Some(Error::Protocol(_))));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn multibyte_garbage_in_reply_surfaces_as_protocol_error() {
    let (conn, _, closes) = MockConnection::new(&["250\u{e9} OK"]);

    let err = dispatch_over(conn, "pw", &GetVersion)
        .await
        .expect_err("dispatch should fail");

    assert!(matches!(err.dispatch_cause(), Some(Error::Protocol(_))));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dispatch_error_chains_the_cause() {
    let (conn, _, _) = MockConnection::new(&[]);
    let conn = conn.refusing_connect();

    let err = dispatch_over(conn, "pw", &GetVersion)
        .await
        .expect_err("dispatch should fail");

    assert!(matches!(err, Error::Dispatch(_)));
    let source = std::error::Error::source(&err).expect("cause should be chained");
    assert!(source.to_string().contains("connect"));
}

#[tokio::test]
async fn get_info_parses_all_requested_keys() {
    let (conn, _, closes) = MockConnection::new(&[
        "250-version=0.4.8.12",
        "250-net/listeners/socks=\"127.0.0.1:9050\"",
        "250 OK",
    ]);

    let cmd = GetInfo::new(["version", "net/listeners/socks"]);
    let reply = dispatch_over(conn, "pw", &cmd)
        .await
        .expect("dispatch should succeed");

    assert_eq!(reply.pairs().len(), 2);
    assert_eq!(reply.pairs().get("version"), Some("0.4.8.12"));
    assert_eq!(
        reply.pairs().get("net/listeners/socks"),
        Some("\"127.0.0.1:9050\"")
    );
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn custom_signal_writes_its_name() {
    let (conn, events, _) = MockConnection::new(&["250 OK"]);

    dispatch_over(conn, "pw", &Signal::new("RELOAD"))
        .await
        .expect("dispatch should succeed");

    let events = events.lock().expect("events lock");
    assert!(events.contains(&"write SIGNAL RELOAD".to_string()));
}

#[tokio::test]
async fn best_effort_returns_true_on_success() {
    let (conn, events, _) = MockConnection::new(&["250 OK"]);

    // Default-constructed Signal is NEWNYM.
    assert!(dispatch_and_return_over::<_, Signal>(conn, "pw").await);
    let events = events.lock().expect("events lock");
    assert!(events.contains(&"write SIGNAL NEWNYM".to_string()));
}

#[tokio::test]
async fn best_effort_absorbs_every_failure() {
    let (conn, _, closes) = MockConnection::new(&[]);
    let conn = conn.refusing_connect();
    assert!(!dispatch_and_return_over::<_, Signal>(conn, "pw").await);
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    let (conn, _, _) = MockConnection::new(&[]);
    let conn = conn.refusing_auth();
    assert!(!dispatch_and_return_over::<_, Signal>(conn, "pw").await);

    let (conn, _, _) = MockConnection::new(&["552 Unrecognized signal"]);
    assert!(!dispatch_and_return_over::<_, Signal>(conn, "pw").await);
}
