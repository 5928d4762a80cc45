//! Connection-topology resolver and bootstrap for EmberCache clients.
//!
//! Turns a declarative configuration into a ready-to-start cache client
//! bound to exactly one of three mutually exclusive connection strategies:
//! a fixed remote server, a server discovered dynamically through the
//! coordination service, or a server embedded in the current process.
//!
//! # Quick Start
//!
//! ```
//! use embercache_client::{CacheClient, Mode};
//! use std::time::Duration;
//!
//! # fn main() -> embercache_client::Result<()> {
//! let config = CacheClient::builder()
//!     .with_client_id("orders-frontend-1")
//!     .with_client_secret("s3cret")
//!     .with_mode(Mode::SingleServer)
//!     .with_host("cache.internal")
//!     .with_port(7000)
//!     .with_connect_timeout(Duration::from_secs(5))
//!     .build();
//!
//! let client = CacheClient::assemble(config)?;
//! // Hand the unstarted client to the transport layer.
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                ClientConfig (staged settings)               │
//! │   identity │ mode │ per-mode parameters │ client settings   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   Topology Resolver                         │
//! │   select() pure branch choice │ resolve() → ServerLocator   │
//! │   (may create + start an owned embedded server)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   Client Assembler                          │
//! │   CacheClient::assemble() │ max_memory │ metrics            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution is synchronous and performs no network I/O; the only
//! side-effecting step is starting an owned embedded server in local mode.
//! The produced [`CacheClient`] is unstarted: connecting, retries, and the
//! wire protocol belong to the transport components that consume the
//! resolved [`ServerLocator`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod locator;
mod server;
mod topology;

pub use client::CacheClient;
pub use config::{ClientConfig, ClientConfigBuilder, Mode};
pub use error::{ClientError, Result};
pub use locator::ServerLocator;
pub use server::{is_registered, CacheServer, ServerError, ServerHostData};
pub use topology::{resolve, select, Topology};
