//! Client configuration with builder pattern.
//!
//! [`ClientConfig`] is an immutable staging area for everything a
//! resolution needs: client identity, the topology [`Mode`], per-mode
//! connection parameters, and the cross-cutting client settings.
//!
//! Setters stage values without validating them; misconfiguration inside a
//! branch (unreachable host, bad coordination endpoint) surfaces later from
//! the transport components, not here. The one thing that is rejected
//! eagerly is an unrecognized mode name in [`Mode::from_str`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{ClientError, UnknownModeSnafu};
use crate::server::CacheServer;

/// Default timeout for establishing remote connections (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default socket read timeout; zero means no timeout.
const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::ZERO;

/// Default coordination session liveness timeout (40 seconds).
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(40);

/// Default server host for single-server mode.
const DEFAULT_HOST: &str = "localhost";

/// Default server port for single-server mode.
const DEFAULT_PORT: u16 = 1025;

/// Default coordination service connection string.
const DEFAULT_COORDINATION_ENDPOINT: &str = "localhost:2181";

/// Default namespace path for server registrations.
const DEFAULT_REGISTRATION_PATH: &str = "/embercache";

/// Default shared secret.
const DEFAULT_SECRET: &str = "embercache";

/// Derives a client id unique to this process and instant.
fn default_client_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("client-{}-{nanos}", std::process::id())
}

/// Connection topology selection.
///
/// Exactly one of three mutually exclusive strategies; the resolver
/// branches solely on this value and ignores fields irrelevant to the
/// chosen mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One fixed remote server, addressed by host and port.
    SingleServer,
    /// The active server is discovered through the coordination service.
    Clustered,
    /// An in-process server, supplied by the caller or started here.
    #[default]
    Local,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SingleServer => "singleserver",
            Self::Clustered => "clustered",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = ClientError;

    /// Parses a mode name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownMode`] for any name outside the
    /// enumerated set; an unrecognized mode never falls back to a default
    /// branch.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "singleserver" => Ok(Self::SingleServer),
            "clustered" => Ok(Self::Clustered),
            "local" => Ok(Self::Local),
            _ => UnknownModeSnafu { value }.fail(),
        }
    }
}

/// Immutable configuration consumed by a single resolution.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Client identity, unique per participant on the network.
    pub(crate) client_id: String,

    /// Shared secret matching the target server's.
    pub(crate) client_secret: String,

    /// Topology selection.
    pub(crate) mode: Mode,

    /// Memory limit for the produced client in bytes; 0 means unbounded.
    pub(crate) max_memory: u64,

    /// Connect timeout handed to remote locators.
    pub(crate) connect_timeout: Duration,

    /// Socket read timeout handed to remote locators; zero disables it.
    pub(crate) socket_timeout: Duration,

    /// Server host, single-server mode only.
    pub(crate) host: String,

    /// Server port, single-server mode only.
    pub(crate) port: u16,

    /// TLS flag, single-server mode only.
    pub(crate) ssl: bool,

    /// Coordination service connection string, clustered mode only.
    pub(crate) coordination_endpoint: String,

    /// Coordination session liveness timeout, clustered mode only.
    pub(crate) session_timeout: Duration,

    /// Registration namespace path, clustered mode only.
    pub(crate) registration_path: String,

    /// Externally supplied in-process server, local mode only.
    pub(crate) local_server: Option<Arc<CacheServer>>,

    /// Whether to enable statistics publication on the produced client.
    pub(crate) metrics: bool,
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the client identity.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the shared secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the topology selection.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the client memory limit in bytes; 0 means unbounded.
    #[must_use]
    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Returns the connect timeout for remote locators.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the socket timeout for remote locators.
    #[must_use]
    pub fn socket_timeout(&self) -> Duration {
        self.socket_timeout
    }

    /// Returns the single-server host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the single-server port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the single-server TLS flag.
    #[must_use]
    pub fn ssl(&self) -> bool {
        self.ssl
    }

    /// Returns the coordination service connection string.
    #[must_use]
    pub fn coordination_endpoint(&self) -> &str {
        &self.coordination_endpoint
    }

    /// Returns the coordination session timeout.
    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Returns the registration namespace path.
    #[must_use]
    pub fn registration_path(&self) -> &str {
        &self.registration_path
    }

    /// Returns the externally supplied in-process server, if any.
    #[must_use]
    pub fn local_server(&self) -> Option<&Arc<CacheServer>> {
        self.local_server.as_ref()
    }

    /// Returns whether statistics publication is enabled.
    #[must_use]
    pub fn metrics(&self) -> bool {
        self.metrics
    }
}

/// Builder for [`ClientConfig`].
///
/// A pure staging area: every setter stores its value unchecked and
/// returns the builder for chaining; [`build`](Self::build) only fills in
/// defaults and cannot fail.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    mode: Mode,
    max_memory: u64,
    connect_timeout: Option<Duration>,
    socket_timeout: Option<Duration>,
    host: Option<String>,
    port: Option<u16>,
    ssl: bool,
    coordination_endpoint: Option<String>,
    session_timeout: Option<Duration>,
    registration_path: Option<String>,
    local_server: Option<Arc<CacheServer>>,
    metrics: bool,
}

impl ClientConfigBuilder {
    /// Sets the client identity.
    ///
    /// Must be unique per participant on the network. Default: a
    /// process/time-derived value.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the shared secret used to authenticate to the server.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the topology selection. Default: [`Mode::Local`].
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the client memory limit in bytes. Default: 0 (unbounded).
    ///
    /// Applies to the produced client, never to an embedded server.
    #[must_use]
    pub fn with_max_memory(mut self, max_memory: u64) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Sets the connect timeout for remote locators. Default: 10 seconds.
    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// Sets the socket read timeout for remote locators. Default: zero
    /// (no timeout).
    #[must_use]
    pub fn with_socket_timeout(mut self, socket_timeout: Duration) -> Self {
        self.socket_timeout = Some(socket_timeout);
        self
    }

    /// Sets the server host for single-server mode.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the server port for single-server mode.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the TLS flag for single-server mode.
    #[must_use]
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    /// Sets the coordination service connection string for clustered mode.
    #[must_use]
    pub fn with_coordination_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.coordination_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the coordination session liveness timeout for clustered mode.
    /// Default: 40 seconds.
    #[must_use]
    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = Some(session_timeout);
        self
    }

    /// Sets the namespace path under which server registrations are
    /// discovered, for clustered mode.
    #[must_use]
    pub fn with_registration_path(mut self, path: impl Into<String>) -> Self {
        self.registration_path = Some(path.into());
        self
    }

    /// Supplies an already-running in-process server for local mode.
    ///
    /// The resolution will bind to it without starting it; lifecycle
    /// management stays entirely with the caller.
    #[must_use]
    pub fn with_local_server(mut self, server: Arc<CacheServer>) -> Self {
        self.local_server = Some(server);
        self
    }

    /// Enables statistics publication on the produced client.
    /// Default: disabled.
    #[must_use]
    pub fn with_metrics(mut self, metrics: bool) -> Self {
        self.metrics = metrics;
        self
    }

    /// Builds the configuration, filling unset fields with defaults.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            client_id: self.client_id.unwrap_or_else(default_client_id),
            client_secret: self.client_secret.unwrap_or_else(|| DEFAULT_SECRET.to_owned()),
            mode: self.mode,
            max_memory: self.max_memory,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            socket_timeout: self.socket_timeout.unwrap_or(DEFAULT_SOCKET_TIMEOUT),
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            ssl: self.ssl,
            coordination_endpoint: self
                .coordination_endpoint
                .unwrap_or_else(|| DEFAULT_COORDINATION_ENDPOINT.to_owned()),
            session_timeout: self.session_timeout.unwrap_or(DEFAULT_SESSION_TIMEOUT),
            registration_path: self
                .registration_path
                .unwrap_or_else(|| DEFAULT_REGISTRATION_PATH.to_owned()),
            local_server: self.local_server,
            metrics: self.metrics,
        }
    }
}
