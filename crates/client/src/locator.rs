//! Connection strategy descriptors.
//!
//! A [`ServerLocator`] tells the transport layer how to obtain a connection
//! to a cache server: a fixed remote address, dynamic discovery through the
//! coordination service, or a direct in-process binding. Exactly one
//! variant is produced per resolution.
//!
//! The variants are plain data with all parameters fixed at construction;
//! the wire protocol and reconnection behavior behind each strategy belong
//! to the transport components that consume them.

use std::sync::Arc;
use std::time::Duration;

use crate::server::CacheServer;

/// A connection strategy for reaching a cache server.
#[derive(Debug, Clone)]
pub enum ServerLocator {
    /// One statically addressed remote server.
    FixedRemote {
        /// Server host name or address.
        host: String,
        /// Server port.
        port: u16,
        /// Whether to connect over TLS.
        ssl: bool,
        /// Timeout for establishing the connection.
        connect_timeout: Duration,
        /// Socket read timeout; zero means no timeout.
        socket_timeout: Duration,
    },

    /// The active server, discovered dynamically through the coordination
    /// service.
    Discovered {
        /// Coordination service connection string.
        coordination_endpoint: String,
        /// Coordination session liveness timeout.
        session_timeout: Duration,
        /// Namespace path under which servers register themselves.
        registration_path: String,
        /// Timeout for establishing the connection.
        connect_timeout: Duration,
        /// Socket read timeout; zero means no timeout.
        socket_timeout: Duration,
    },

    /// Direct binding to a server in the current process.
    InProcess {
        /// The embedded server to bind to.
        server: Arc<CacheServer>,
        /// Whether the resolution that produced this locator started the
        /// server and its lifetime is therefore tied to the client.
        owns_lifecycle: bool,
    },
}

impl ServerLocator {
    /// Returns whether this strategy crosses a process boundary.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::InProcess { .. })
    }

    /// Returns the connect timeout; `None` for in-process bindings.
    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        match self {
            Self::FixedRemote { connect_timeout, .. }
            | Self::Discovered { connect_timeout, .. } => Some(*connect_timeout),
            Self::InProcess { .. } => None,
        }
    }

    /// Returns the socket timeout; `None` for in-process bindings.
    #[must_use]
    pub fn socket_timeout(&self) -> Option<Duration> {
        match self {
            Self::FixedRemote { socket_timeout, .. }
            | Self::Discovered { socket_timeout, .. } => Some(*socket_timeout),
            Self::InProcess { .. } => None,
        }
    }

    /// Returns the lifecycle-ownership flag; `None` for remote strategies.
    #[must_use]
    pub fn owns_lifecycle(&self) -> Option<bool> {
        match self {
            Self::InProcess { owns_lifecycle, .. } => Some(*owns_lifecycle),
            _ => None,
        }
    }
}
