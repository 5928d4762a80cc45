//! Topology resolution: maps a configuration to exactly one locator.
//!
//! The dispatch is split in two so tests can exercise branch selection
//! without triggering startup:
//!
//! - [`select`] is the pure branch decision, a function of the
//!   configuration alone.
//! - [`resolve`] executes the decision, which in the owned-local branch
//!   means creating and starting an embedded server. That start is the
//!   only I/O-causing step in the whole bootstrap; the call blocks for
//!   its duration and a failure is fatal to the resolution.
//!
//! Fields irrelevant to the selected branch are ignored; there is no
//! cross-validation between modes.

use std::sync::Arc;

use snafu::ResultExt;
use tracing::{debug, info};

use crate::config::{ClientConfig, Mode};
use crate::error::{Result, ServerStartSnafu};
use crate::locator::ServerLocator;
use crate::server::{CacheServer, ServerHostData};

/// Branch-selection outcome, free of side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Bind to one fixed remote server.
    FixedRemote,
    /// Discover the active server through the coordination service.
    Discovered,
    /// Start a new embedded server and own its lifecycle.
    InProcessOwned,
    /// Bind to a caller-supplied embedded server without owning it.
    InProcessSupplied,
}

/// Decides which connection strategy a configuration selects.
///
/// Pure: looks only at `mode` and the presence of a supplied server.
#[must_use]
pub fn select(config: &ClientConfig) -> Topology {
    match config.mode {
        Mode::SingleServer => Topology::FixedRemote,
        Mode::Clustered => Topology::Discovered,
        Mode::Local => {
            if config.local_server.is_some() {
                Topology::InProcessSupplied
            } else {
                Topology::InProcessOwned
            }
        }
    }
}

/// Resolves a configuration into exactly one [`ServerLocator`].
///
/// In the owned-local branch this creates an embedded server with the
/// configured secret and a local host descriptor, starts it, and records
/// lifecycle ownership in the locator. A supplied server is never started
/// here; its lifecycle stays with the caller.
///
/// # Errors
///
/// Returns [`ClientError::ServerStart`](crate::ClientError::ServerStart)
/// if the embedded server fails to start. The failure is fatal: no locator
/// is returned and the partially constructed server is dropped, releasing
/// anything it registered.
pub fn resolve(config: &ClientConfig) -> Result<ServerLocator> {
    debug!(mode = %config.mode, topology = ?select(config), "resolving connection topology");

    match config.mode {
        Mode::SingleServer => Ok(ServerLocator::FixedRemote {
            host: config.host.clone(),
            port: config.port,
            ssl: config.ssl,
            connect_timeout: config.connect_timeout,
            socket_timeout: config.socket_timeout,
        }),
        Mode::Clustered => Ok(ServerLocator::Discovered {
            coordination_endpoint: config.coordination_endpoint.clone(),
            session_timeout: config.session_timeout,
            registration_path: config.registration_path.clone(),
            connect_timeout: config.connect_timeout,
            socket_timeout: config.socket_timeout,
        }),
        Mode::Local => match &config.local_server {
            Some(server) => Ok(ServerLocator::InProcess {
                server: Arc::clone(server),
                owns_lifecycle: false,
            }),
            None => {
                let server =
                    CacheServer::new(config.client_secret.clone(), ServerHostData::local());
                server.start().context(ServerStartSnafu)?;
                info!(server_id = %server.server_id(), "started embedded cache server");
                Ok(ServerLocator::InProcess { server: Arc::new(server), owns_lifecycle: true })
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::server::is_registered;
    use std::time::Duration;

    #[test]
    fn select_is_pure_per_mode() {
        let single = ClientConfig::builder().with_mode(Mode::SingleServer).build();
        assert_eq!(select(&single), Topology::FixedRemote);

        let clustered = ClientConfig::builder().with_mode(Mode::Clustered).build();
        assert_eq!(select(&clustered), Topology::Discovered);

        let owned = ClientConfig::builder().with_mode(Mode::Local).build();
        assert_eq!(select(&owned), Topology::InProcessOwned);

        let server = Arc::new(CacheServer::new("secret", ServerHostData::local()));
        let supplied = ClientConfig::builder()
            .with_mode(Mode::Local)
            .with_local_server(server)
            .build();
        assert_eq!(select(&supplied), Topology::InProcessSupplied);
    }

    #[test]
    fn single_server_parameters_propagate_verbatim() {
        let config = ClientConfig::builder()
            .with_mode(Mode::SingleServer)
            .with_host("h")
            .with_port(7000)
            .with_ssl(true)
            .with_connect_timeout(Duration::from_millis(5000))
            .with_socket_timeout(Duration::from_millis(3000))
            .build();

        let locator = resolve(&config).unwrap();
        match locator {
            ServerLocator::FixedRemote { host, port, ssl, connect_timeout, socket_timeout } => {
                assert_eq!(host, "h");
                assert_eq!(port, 7000);
                assert!(ssl);
                assert_eq!(connect_timeout, Duration::from_millis(5000));
                assert_eq!(socket_timeout, Duration::from_millis(3000));
            }
            other => panic!("expected FixedRemote, got {other:?}"),
        }
    }

    #[test]
    fn clustered_parameters_propagate_verbatim() {
        let config = ClientConfig::builder()
            .with_mode(Mode::Clustered)
            .with_coordination_endpoint("zk1:2181,zk2:2181")
            .with_session_timeout(Duration::from_secs(15))
            .with_registration_path("/caches/orders")
            .with_connect_timeout(Duration::from_secs(5))
            .with_socket_timeout(Duration::from_secs(3))
            // Single-server fields are staged but must not leak into the
            // discovered locator.
            .with_host("ignored")
            .with_port(9999)
            .with_ssl(true)
            .build();

        let locator = resolve(&config).unwrap();
        match locator {
            ServerLocator::Discovered {
                coordination_endpoint,
                session_timeout,
                registration_path,
                connect_timeout,
                socket_timeout,
            } => {
                assert_eq!(coordination_endpoint, "zk1:2181,zk2:2181");
                assert_eq!(session_timeout, Duration::from_secs(15));
                assert_eq!(registration_path, "/caches/orders");
                assert_eq!(connect_timeout, Duration::from_secs(5));
                assert_eq!(socket_timeout, Duration::from_secs(3));
            }
            other => panic!("expected Discovered, got {other:?}"),
        }
    }

    #[test]
    fn owned_local_resolution_starts_a_new_server() {
        let config = ClientConfig::builder().with_mode(Mode::Local).build();
        let locator = resolve(&config).unwrap();
        match locator {
            ServerLocator::InProcess { server, owns_lifecycle } => {
                assert!(owns_lifecycle);
                assert!(server.is_started());
                assert!(is_registered(server.server_id()));
                assert_eq!(server.secret(), config.client_secret());
                assert_eq!(server.host_data(), &ServerHostData::local());
            }
            other => panic!("expected InProcess, got {other:?}"),
        }
    }

    #[test]
    fn supplied_local_server_is_never_started() {
        let server = Arc::new(CacheServer::new("secret", ServerHostData::local()));
        let config = ClientConfig::builder()
            .with_mode(Mode::Local)
            .with_local_server(Arc::clone(&server))
            .build();

        let locator = resolve(&config).unwrap();
        match locator {
            ServerLocator::InProcess { server: bound, owns_lifecycle } => {
                assert!(!owns_lifecycle);
                assert!(Arc::ptr_eq(&bound, &server));
                assert!(!bound.is_started());
            }
            other => panic!("expected InProcess, got {other:?}"),
        }
    }

    #[test]
    fn startup_failure_is_fatal_and_wrapped() {
        // An empty secret is rejected by the embedded server itself.
        let config = ClientConfig::builder()
            .with_mode(Mode::Local)
            .with_client_secret("")
            .build();

        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, ClientError::ServerStart { .. }));
    }

    #[test]
    fn independent_resolutions_never_share_servers() {
        let first = resolve(&ClientConfig::builder().with_mode(Mode::Local).build()).unwrap();
        let second = resolve(&ClientConfig::builder().with_mode(Mode::Local).build()).unwrap();

        match (first, second) {
            (
                ServerLocator::InProcess { server: a, .. },
                ServerLocator::InProcess { server: b, .. },
            ) => {
                assert!(!Arc::ptr_eq(&a, &b));
                assert_ne!(a.server_id(), b.server_id());
            }
            other => panic!("expected two InProcess locators, got {other:?}"),
        }
    }
}
