use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};

/// A connected management stream (Unix domain socket or TCP).
///
/// On Unix this wraps either a Unix domain socket or a TCP stream.
pub struct IpcStream {
    inner: IpcStreamInner,
}

enum IpcStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    Tcp(TcpStream),
}

impl Read for IpcStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.read(buf),
            IpcStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for IpcStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.write(buf),
            IpcStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.flush(),
            IpcStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

#[cfg(unix)]
impl From<std::os::unix::net::UnixStream> for IpcStream {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: IpcStreamInner::Unix(stream),
        }
    }
}

impl From<TcpStream> for IpcStream {
    fn from(stream: TcpStream) -> Self {
        Self {
            inner: IpcStreamInner::Tcp(stream),
        }
    }
}

impl IpcStream {
    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            IpcStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            IpcStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => Ok(stream.try_clone()?.into()),
            IpcStreamInner::Tcp(stream) => Ok(stream.try_clone()?.into()),
        }
    }

    /// Block until the stream is readable or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout. Hang-up counts as readable: the next
    /// read reports end-of-stream. Never returns `Ok(false)` before the full
    /// `timeout` has elapsed.
    #[cfg(unix)]
    pub fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        use std::os::fd::AsRawFd;
        use std::time::Instant;

        let fd = match &self.inner {
            IpcStreamInner::Unix(stream) => stream.as_raw_fd(),
            IpcStreamInner::Tcp(stream) => stream.as_raw_fd(),
        };
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };

            // SAFETY: `pfd` is a single valid, writable pollfd and `fd` is an
            // open socket descriptor owned by this stream for the whole call.
            let rc = unsafe { libc::poll(&mut pfd, 1, poll_timeout_ms(remaining)) };

            if rc > 0 {
                return Ok(true);
            }
            if rc == 0 {
                if Instant::now() >= deadline {
                    return Ok(false);
                }
                continue;
            }

            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }
    }

    /// Block until the stream is readable or `timeout` elapses.
    #[cfg(not(unix))]
    pub fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let IpcStreamInner::Tcp(stream) = &self.inner;
        let previous = stream.read_timeout()?;
        stream.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        let mut peeked = [0u8; 1];
        let outcome = match stream.peek(&mut peeked) {
            Ok(_) => Ok(true),
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(false)
            }
            Err(err) => Err(err.into()),
        };
        stream.set_read_timeout(previous)?;
        outcome
    }

    /// Shut down both halves of the connection.
    pub fn shutdown(&self) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.shutdown(std::net::Shutdown::Both)?,
            IpcStreamInner::Tcp(stream) => stream.shutdown(std::net::Shutdown::Both)?,
        }
        Ok(())
    }
}

impl std::fmt::Debug for IpcStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(_) => f.debug_struct("IpcStream").field("type", &"unix").finish(),
            IpcStreamInner::Tcp(stream) => f
                .debug_struct("IpcStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}

/// Connect to an endpoint (blocking, OS default connect timeout).
pub fn connect(endpoint: &Endpoint) -> Result<IpcStream> {
    connect_inner(endpoint, None)
}

/// Connect to an endpoint, bounding each TCP connection attempt by `timeout`.
pub fn connect_timeout(endpoint: &Endpoint, timeout: Duration) -> Result<IpcStream> {
    connect_inner(endpoint, Some(timeout))
}

fn connect_inner(endpoint: &Endpoint, timeout: Option<Duration>) -> Result<IpcStream> {
    let connect_err = |source: std::io::Error| TransportError::Connect {
        endpoint: endpoint.to_string(),
        source,
    };

    let stream = match endpoint {
        #[cfg(unix)]
        Endpoint::Unix(path) => IpcStream::from(
            std::os::unix::net::UnixStream::connect(path).map_err(connect_err)?,
        ),
        #[cfg(not(unix))]
        Endpoint::Unix(_) => {
            return Err(connect_err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "unix domain sockets are not available on this platform",
            )));
        }
        Endpoint::Tcp(authority) => {
            let stream = match timeout {
                None => TcpStream::connect(authority.as_str()).map_err(connect_err)?,
                Some(timeout) => connect_tcp_timeout(authority, timeout).map_err(connect_err)?,
            };
            stream.set_nodelay(true).map_err(connect_err)?;
            IpcStream::from(stream)
        }
    };

    debug!(%endpoint, "connected");
    Ok(stream)
}

fn connect_tcp_timeout(authority: &str, timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in authority.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "endpoint resolved to no addresses",
        )
    }))
}

#[cfg(unix)]
fn poll_timeout_ms(remaining: Duration) -> libc::c_int {
    // Round up so a sub-millisecond remainder never turns into a zero wait.
    let millis = remaining.as_nanos().div_ceil(1_000_000);
    millis.min(libc::c_int::MAX as u128) as libc::c_int
}
