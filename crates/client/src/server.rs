//! In-process cache server handle and process-wide registry.
//!
//! LOCAL-mode resolutions bind the client directly to a server running in
//! the same process. This module models that server's identity and
//! lifecycle; cache storage, eviction, and request handling live in the
//! server implementation proper and are out of scope here.
//!
//! # Registry
//!
//! Started servers claim their id in a process-wide registry, the
//! in-process analogue of binding a listener socket. The registration is
//! what an in-process locator resolves against, and a claimed id is the
//! one way `start()` can fail beyond misuse of the handle itself.
//!
//! Registrations are released on [`CacheServer::stop`] and on drop, so a
//! server that started but whose resolution later failed cannot leak its
//! slot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::LazyLock;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use snafu::{ensure, Snafu};
use tracing::{debug, info};

/// Process-wide counter making generated server ids unique.
static SERVER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Process-wide registry of started embedded servers, keyed by server id.
static REGISTRY: LazyLock<DashMap<String, ()>> = LazyLock::new(DashMap::new);

/// Returns whether a server id is currently registered in this process.
///
/// This is the discovery hook in-process locators use to find a running
/// embedded server.
#[must_use]
pub fn is_registered(server_id: &str) -> bool {
    REGISTRY.contains_key(server_id)
}

/// Network identity of a cache server.
///
/// For embedded servers the descriptor is nominal: [`ServerHostData::local`]
/// names the local host with port 0 because no listener is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHostData {
    /// Host name or address.
    host: String,
    /// Listener port; 0 for in-process servers.
    port: u16,
    /// Whether the listener expects TLS.
    ssl: bool,
}

impl ServerHostData {
    /// Creates a host descriptor for an addressable server.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, ssl: bool) -> Self {
        Self { host: host.into(), port, ssl }
    }

    /// Creates the descriptor for an in-process server.
    #[must_use]
    pub fn local() -> Self {
        Self::new("localhost", 0, false)
    }

    /// Returns the host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the listener port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether the listener expects TLS.
    #[must_use]
    pub fn ssl(&self) -> bool {
        self.ssl
    }
}

/// Errors from embedded server lifecycle operations.
#[derive(Debug, Snafu)]
pub enum ServerError {
    /// The shared secret was empty.
    #[snafu(display("server '{server_id}' requires a non-empty shared secret"))]
    EmptySecret {
        /// Id of the server that rejected its secret.
        server_id: String,
    },

    /// `start()` was called on a server that is already running.
    #[snafu(display("server '{server_id}' is already started"))]
    AlreadyStarted {
        /// Id of the already-running server.
        server_id: String,
    },

    /// Another server in this process already claimed the id.
    #[snafu(display("server id '{server_id}' is already registered in this process"))]
    IdInUse {
        /// The contested server id.
        server_id: String,
    },
}

/// Handle to a cache server embedded in the current process.
///
/// The handle owns identity (`server_id`, shared secret, host descriptor)
/// and the started/stopped lifecycle. Start and stop are thread-safe;
/// whether two handles may share a `server_id` is decided by the registry
/// at start time, not at construction.
#[derive(Debug)]
pub struct CacheServer {
    /// Process-unique server id used for registry claims.
    server_id: String,
    /// Shared secret clients must present.
    secret: String,
    /// Nominal network identity.
    host_data: ServerHostData,
    /// Whether the server is currently started.
    started: AtomicBool,
}

impl CacheServer {
    /// Creates a server handle with a generated process-unique id.
    #[must_use]
    pub fn new(secret: impl Into<String>, host_data: ServerHostData) -> Self {
        let sequence = SERVER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let server_id = format!("{}:{}#{}", host_data.host, host_data.port, sequence);
        Self::with_server_id(server_id, secret, host_data)
    }

    /// Creates a server handle with an explicit id.
    ///
    /// Callers embedding several servers can pick stable ids; collisions
    /// are detected when the second server starts.
    #[must_use]
    pub fn with_server_id(
        server_id: impl Into<String>,
        secret: impl Into<String>,
        host_data: ServerHostData,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            secret: secret.into(),
            host_data,
            started: AtomicBool::new(false),
        }
    }

    /// Starts the server and claims its id in the process registry.
    ///
    /// # Errors
    ///
    /// - [`ServerError::EmptySecret`] if constructed with an empty secret.
    /// - [`ServerError::AlreadyStarted`] if this handle is already running.
    /// - [`ServerError::IdInUse`] if another server holds the id; the
    ///   handle is rolled back to the stopped state.
    pub fn start(&self) -> Result<(), ServerError> {
        ensure!(!self.secret.is_empty(), EmptySecretSnafu { server_id: self.server_id.clone() });

        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return AlreadyStartedSnafu { server_id: self.server_id.clone() }.fail();
        }

        match REGISTRY.entry(self.server_id.clone()) {
            Entry::Occupied(_) => {
                self.started.store(false, Ordering::SeqCst);
                IdInUseSnafu { server_id: self.server_id.clone() }.fail()
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                info!(server_id = %self.server_id, "embedded cache server started");
                Ok(())
            }
        }
    }

    /// Stops the server and releases its registration.
    ///
    /// Stopping a server that is not running is a no-op.
    pub fn stop(&self) {
        if self.started.swap(false, Ordering::SeqCst) {
            REGISTRY.remove(&self.server_id);
            debug!(server_id = %self.server_id, "embedded cache server stopped");
        }
    }

    /// Returns whether the server is currently started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Returns the process-unique server id.
    #[must_use]
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Returns the shared secret clients must present.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Returns the nominal network identity.
    #[must_use]
    pub fn host_data(&self) -> &ServerHostData {
        &self.host_data
    }
}

impl Drop for CacheServer {
    fn drop(&mut self) {
        self.stop();
    }
}
