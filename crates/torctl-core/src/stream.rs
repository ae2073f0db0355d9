//! Byte-stream adapter that replays bytes consumed out of band.
//!
//! When a caller has already read a few bytes from a socket (for example
//! while sniffing a handshake) the socket can be wrapped in
//! [`PartiallyBufferedStream`] so downstream readers see one contiguous
//! stream: first the captured bytes, then the live connection.

use std::cmp;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, ReadBuf};

use crate::error::Error;

/// A read-only, forward-only stream that drains a fixed replay buffer
/// before delegating to the inner stream.
///
/// The buffer holds exactly the bytes read before the wrapper was
/// constructed and is never refilled; the inner stream must already be
/// positioned immediately after those bytes. While any buffered byte
/// remains, a read returns buffered data only and never touches the inner
/// stream.
pub struct PartiallyBufferedStream<S> {
    buffer: Vec<u8>,
    pos: usize,
    inner: Option<S>,
}

impl<S> PartiallyBufferedStream<S> {
    /// Wrap `inner`, replaying `buffered` before any byte is read from it.
    pub fn new(buffered: Vec<u8>, inner: S) -> Self {
        Self {
            buffer: buffered,
            pos: 0,
            inner: Some(inner),
        }
    }

    /// Number of replay bytes not yet handed out.
    pub fn remaining_buffered(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Release the inner stream. A second call is a no-op; after closing,
    /// reads fail with [`io::ErrorKind::NotConnected`].
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!("released inner stream");
        }
    }

    fn drain(&mut self, dest: &mut [u8]) -> usize {
        let n = cmp::min(dest.len(), self.remaining_buffered());
        dest[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    fn unsupported(op: &'static str) -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, Error::NotSupported(op))
    }

    fn closed() -> io::Error {
        io::Error::new(io::ErrorKind::NotConnected, "stream has been closed")
    }
}

impl<S: Read> Read for PartiallyBufferedStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.remaining_buffered() > 0 {
            return Ok(self.drain(buf));
        }
        match self.inner.as_mut() {
            Some(inner) => inner.read(buf),
            None => Err(Self::closed()),
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for PartiallyBufferedStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let remaining = this.remaining_buffered();
        if remaining > 0 {
            // Draining never suspends and never touches the inner stream.
            let n = cmp::min(buf.remaining(), remaining);
            buf.put_slice(&this.buffer[this.pos..this.pos + n]);
            this.pos += n;
            return Poll::Ready(Ok(()));
        }
        match this.inner.as_mut() {
            Some(inner) => Pin::new(inner).poll_read(cx, buf),
            None => Poll::Ready(Err(Self::closed())),
        }
    }
}

// The stream is read-only and forward-only; everything below fails fast
// instead of silently doing nothing.

impl<S> Seek for PartiallyBufferedStream<S> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(Self::unsupported("seek"))
    }
}

impl<S> Write for PartiallyBufferedStream<S> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(Self::unsupported("write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(Self::unsupported("flush"))
    }
}

impl<S> AsyncSeek for PartiallyBufferedStream<S> {
    fn start_seek(self: Pin<&mut Self>, _position: SeekFrom) -> io::Result<()> {
        Err(Self::unsupported("seek"))
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Err(Self::unsupported("seek")))
    }
}

impl<S> AsyncWrite for PartiallyBufferedStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(Self::unsupported("write")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(Self::unsupported("flush")))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(Self::unsupported("shutdown")))
    }
}
