//! Client assembly.
//!
//! [`CacheClient::assemble`] is the terminal bootstrap operation: it
//! resolves the configured topology into a locator, constructs the client
//! from the identity fields, and applies the two cross-cutting settings
//! (memory limit, statistics publication). The returned client is fully
//! parameterized but **unstarted**; connecting and waiting for the
//! connection belong to the transport layer.
//!
//! The configuration is consumed by value, so a second resolution from the
//! same settings requires an explicit `clone()` and always yields fully
//! independent locator and client instances.

use tracing::debug;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::error::Result;
use crate::locator::ServerLocator;
use crate::topology;

/// A cache client bound to exactly one connection strategy.
#[derive(Debug, Clone)]
pub struct CacheClient {
    /// Client identity, unique per participant on the network.
    client_id: String,

    /// Shared secret presented to the server.
    client_secret: String,

    /// The resolved connection strategy.
    locator: ServerLocator,

    /// Memory limit in bytes; 0 means unbounded.
    max_memory: u64,

    /// Whether statistics publication is enabled.
    metrics: bool,
}

impl CacheClient {
    /// Creates a configuration builder for a new client.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfig::builder()
    }

    /// Constructs a client from identity fields and a resolved locator.
    ///
    /// The memory limit starts unbounded and statistics publication
    /// disabled; both are applied afterwards.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        locator: ServerLocator,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            locator,
            max_memory: 0,
            metrics: false,
        }
    }

    /// Resolves the configured topology and assembles an unstarted client.
    ///
    /// In local mode without a supplied server this starts an embedded
    /// server whose lifecycle the produced locator records as owned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ServerStart`](crate::ClientError::ServerStart)
    /// if the embedded server fails to start; no client is returned.
    pub fn assemble(config: ClientConfig) -> Result<Self> {
        let locator = topology::resolve(&config)?;

        let mut client = Self::new(config.client_id, config.client_secret, locator);
        client.set_max_memory(config.max_memory);
        if config.metrics {
            client.enable_metrics(true);
        }

        debug!(client_id = %client.client_id, "cache client assembled");
        Ok(client)
    }

    /// Sets the memory limit in bytes; 0 means unbounded.
    ///
    /// Positive values are recorded verbatim. The limit applies to this
    /// client's cache, never to an embedded server.
    pub fn set_max_memory(&mut self, max_memory: u64) {
        self.max_memory = max_memory;
    }

    /// Enables or disables statistics publication.
    pub fn enable_metrics(&mut self, enabled: bool) {
        self.metrics = enabled;
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

    /// Returns the connection strategy this client is bound to.
    #[must_use]
    pub fn locator(&self) -> &ServerLocator {
        &self.locator
    }

    /// Returns the memory limit in bytes; 0 means unbounded.
    #[must_use]
    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Returns whether statistics publication is enabled.
    #[must_use]
    pub fn metrics_enabled(&self) -> bool {
        self.metrics
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::error::ClientError;
    use std::time::Duration;

    #[test]
    fn identity_matches_the_configuration_for_every_mode() {
        for mode in [Mode::SingleServer, Mode::Clustered, Mode::Local] {
            let config = CacheClient::builder()
                .with_mode(mode)
                .with_client_id("node-42")
                .with_client_secret("hunter2")
                .build();

            let client = CacheClient::assemble(config).unwrap();
            assert_eq!(client.client_id(), "node-42");
            assert_eq!(client.client_secret(), "hunter2");
        }
    }

    #[test]
    fn max_memory_zero_stays_unbounded() {
        let config = CacheClient::builder().with_mode(Mode::SingleServer).build();
        let client = CacheClient::assemble(config).unwrap();
        assert_eq!(client.max_memory(), 0);
    }

    #[test]
    fn positive_max_memory_propagates_verbatim() {
        let config = CacheClient::builder()
            .with_mode(Mode::SingleServer)
            .with_max_memory(512 * 1024 * 1024)
            .build();
        let client = CacheClient::assemble(config).unwrap();
        assert_eq!(client.max_memory(), 512 * 1024 * 1024);
    }

    #[test]
    fn metrics_flag_propagates() {
        let enabled = CacheClient::builder()
            .with_mode(Mode::SingleServer)
            .with_metrics(true)
            .build();
        assert!(CacheClient::assemble(enabled).unwrap().metrics_enabled());

        let disabled = CacheClient::builder().with_mode(Mode::SingleServer).build();
        assert!(!CacheClient::assemble(disabled).unwrap().metrics_enabled());
    }

    #[test]
    fn assembled_client_is_bound_to_the_selected_strategy() {
        let config = CacheClient::builder()
            .with_mode(Mode::SingleServer)
            .with_host("h")
            .with_port(7000)
            .with_ssl(true)
            .with_connect_timeout(Duration::from_millis(5000))
            .with_socket_timeout(Duration::from_millis(3000))
            .build();

        let client = CacheClient::assemble(config).unwrap();
        match client.locator() {
            ServerLocator::FixedRemote { host, port, ssl, connect_timeout, socket_timeout } => {
                assert_eq!(host, "h");
                assert_eq!(*port, 7000);
                assert!(*ssl);
                assert_eq!(*connect_timeout, Duration::from_millis(5000));
                assert_eq!(*socket_timeout, Duration::from_millis(3000));
            }
            other => panic!("expected FixedRemote, got {other:?}"),
        }
    }

    #[test]
    fn failed_assembly_returns_no_client() {
        let config = CacheClient::builder()
            .with_mode(Mode::Local)
            .with_client_secret("")
            .build();

        let err = CacheClient::assemble(config).unwrap_err();
        assert!(matches!(err, ClientError::ServerStart { .. }));
    }

    #[test]
    fn cloned_configs_assemble_independent_clients() {
        let config = CacheClient::builder().with_mode(Mode::Local).build();
        let first = CacheClient::assemble(config.clone()).unwrap();
        let second = CacheClient::assemble(config).unwrap();

        match (first.locator(), second.locator()) {
            (
                ServerLocator::InProcess { server: a, .. },
                ServerLocator::InProcess { server: b, .. },
            ) => assert!(!std::sync::Arc::ptr_eq(a, b)),
            other => panic!("expected two InProcess locators, got {other:?}"),
        }
    }
}
