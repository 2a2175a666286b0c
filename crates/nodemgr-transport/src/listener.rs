use std::net::TcpListener;

use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::stream::IpcStream;

/// Accepts connections on a management endpoint.
///
/// Clients never need this; it exists for service-side tooling and for
/// standing up fake services in tests and demos. Filesystem sockets created
/// by `bind` are removed again on drop.
pub struct Listener {
    inner: ListenerInner,
    endpoint: Endpoint,
}

enum ListenerInner {
    #[cfg(unix)]
    Unix(unix::BoundSocket),
    Tcp(TcpListener),
}

impl Listener {
    /// Bind and listen on `endpoint`.
    ///
    /// For TCP, port `0` picks an ephemeral port; [`Listener::endpoint`]
    /// reports the resolved address.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let bind_err = |source: std::io::Error| TransportError::Bind {
            endpoint: endpoint.to_string(),
            source,
        };

        let (inner, endpoint) = match endpoint {
            #[cfg(unix)]
            Endpoint::Unix(path) => (
                ListenerInner::Unix(unix::BoundSocket::bind(path)?),
                endpoint.clone(),
            ),
            #[cfg(not(unix))]
            Endpoint::Unix(_) => {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "unix domain sockets are not available on this platform",
                )));
            }
            Endpoint::Tcp(authority) => {
                let listener = TcpListener::bind(authority.as_str()).map_err(bind_err)?;
                let local = listener.local_addr().map_err(bind_err)?;
                (
                    ListenerInner::Tcp(listener),
                    Endpoint::tcp(&local.ip().to_string(), local.port()),
                )
            }
        };

        info!(%endpoint, "listening");
        Ok(Self { inner, endpoint })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<IpcStream> {
        let stream = match &self.inner {
            #[cfg(unix)]
            ListenerInner::Unix(socket) => socket.accept()?,
            ListenerInner::Tcp(listener) => {
                let (stream, peer) = listener.accept().map_err(TransportError::Accept)?;
                debug!(%peer, "accepted tcp connection");
                IpcStream::from(stream)
            }
        };
        Ok(stream)
    }

    /// The endpoint this listener is bound to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[cfg(unix)]
mod unix {
    use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
    use std::os::unix::net::UnixListener;
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use crate::error::{Result, TransportError};
    use crate::stream::IpcStream;

    /// Permission mode applied to created socket paths.
    const SOCKET_MODE: u32 = 0o600;

    /// `sockaddr_un.sun_path` capacity: 108 bytes on Linux, 104 elsewhere.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    pub(super) struct BoundSocket {
        listener: UnixListener,
        path: PathBuf,
        /// `(dev, ino)` of the socket file we created.
        identity: (u64, u64),
    }

    impl BoundSocket {
        pub(super) fn bind(path: &Path) -> Result<Self> {
            let len = path.as_os_str().len();
            if len >= MAX_PATH_LEN {
                return Err(TransportError::PathTooLong {
                    path: path.to_path_buf(),
                    len,
                    max: MAX_PATH_LEN,
                });
            }

            let bind_err = |source: std::io::Error| TransportError::Bind {
                endpoint: path.display().to_string(),
                source,
            };

            if let Ok(metadata) = std::fs::symlink_metadata(path) {
                if !metadata.file_type().is_socket() {
                    return Err(bind_err(std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    )));
                }
                debug!(?path, "removing stale socket");
                std::fs::remove_file(path).map_err(bind_err)?;
            }

            let listener = UnixListener::bind(path).map_err(bind_err)?;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(SOCKET_MODE))
                .map_err(bind_err)?;
            let metadata = std::fs::symlink_metadata(path).map_err(bind_err)?;

            Ok(Self {
                listener,
                path: path.to_path_buf(),
                identity: (metadata.dev(), metadata.ino()),
            })
        }

        pub(super) fn accept(&self) -> Result<IpcStream> {
            let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
            debug!(path = ?self.path, "accepted unix connection");
            Ok(IpcStream::from(stream))
        }
    }

    impl Drop for BoundSocket {
        fn drop(&mut self) {
            let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
                return;
            };
            // Only remove the file if it is still the socket we created.
            if metadata.file_type().is_socket() && (metadata.dev(), metadata.ino()) == self.identity
            {
                debug!(path = ?self.path, "cleaning up socket file");
                let _ = std::fs::remove_file(&self.path);
            } else {
                debug!(path = ?self.path, "socket path identity changed; skipping cleanup");
            }
        }
    }
}
