//! Bootstrap error types.
//!
//! Resolution either returns a fully parameterized client or fails with one
//! fatal error; there is no partial-success value and no retry at this
//! layer. Only two failure classes exist:
//!
//! - **Invalid topology selection**: a mode name that does not parse.
//! - **Embedded server startup failure**: the only I/O-causing step of the
//!   bootstrap, wrapped with its original cause and source location.
//!
//! Misconfiguration within a branch (unreachable host, bad coordination
//! endpoint, zero timeouts) is deliberately not validated here; it surfaces
//! later from the transport components that consume the locator.

use snafu::{Location, Snafu};

use crate::server::ServerError;

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while resolving a topology and assembling a client.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    /// A topology mode name could not be parsed.
    #[snafu(display("unknown topology mode '{value}'"))]
    UnknownMode {
        /// The unrecognized mode name.
        value: String,
    },

    /// The embedded server failed to start.
    ///
    /// Fatal to the whole resolution; no locator or client is returned and
    /// the partially constructed server is dropped.
    #[snafu(display("embedded server failed to start at {location}: {source}"))]
    ServerStart {
        /// The underlying server error.
        source: ServerError,
        /// Source location of the failed start.
        #[snafu(implicit)]
        location: Location,
    },
}
