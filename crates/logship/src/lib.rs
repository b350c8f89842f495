//! # logship
//!
//! An embedded log-shipping agent: collects structured log events from the
//! host application, buffers them in a bounded in-memory queue, ships them
//! in batches to a remote collector over HTTP, and persists unsent events
//! to durable local storage so they survive process termination.
//!
//! ## Overview
//!
//! Delivery is best-effort by design: the buffer is bounded (sustained
//! overload sheds the oldest records), sends are retried across flush
//! cycles rather than guaranteed, and everything that fails is either
//! recovered locally or logged — no error from this crate ever propagates
//! into the host application's control flow through a logging call.
//!
//! ## Architecture
//!
//! - [`queue`]: bounded FIFO buffer with oldest-drop eviction
//! - [`store`]: sled-backed persistence of the pending-record snapshot
//! - [`transport`]: batch HTTP delivery to the collector
//! - [`agent`]: actor-pattern coordinator owning all of the above
//! - [`global`]: optional process-wide singleton facade
//! - [`facts`]: per-launch environment fact collection (injected seam)
//!
//! ## Usage
//!
//! Handle-based (preferred; testable, no global state):
//!
//! ```rust,ignore
//! use logship::{Agent, AgentConfig, HostFacts};
//!
//! let handle = Agent::initialize(
//!     "https://collector.example.com",
//!     "api-key",
//!     "shop-backend",
//!     AgentConfig::default(),
//!     &HostFacts::new("shop", "1.2.3", "42", "com.example.shop"),
//! )
//! .await?;
//!
//! handle.info("checkout started", None);
//! handle.error("checkout failed", None); // flushes immediately
//! handle.dispose().await; // final flush + persistence
//! ```
//!
//! Ambient (static convenience functions delegating to one shared handle):
//!
//! ```rust,ignore
//! logship::global::initialize(base_url, api_key, app_id, config).await?;
//! logship::global::log_info("ready", None);
//! logship::global::dispose().await;
//! ```

#![deny(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![deny(unreachable_pub)]
#![deny(unused_extern_crates)]

/// Agent lifecycle, coordination, and the public handle.
pub mod agent;

/// Immutable agent configuration.
pub mod config;

/// Environment fact collection (injected collaborator).
pub mod facts;

/// Process-wide singleton facade.
pub mod global;

/// Diagnostics subscriber setup.
pub mod logger;

/// Bounded FIFO queue of pending records.
pub mod queue;

/// Log record model and severity levels.
pub mod record;

/// Durable storage for unsent records.
pub mod store;

/// Batch HTTP delivery.
pub mod transport;

pub use agent::{Agent, AgentError, AgentHandle};
pub use config::{AgentConfig, ConfigError};
pub use facts::{EnvironmentFacts, FactsProvider, HostFacts};
pub use queue::RecordQueue;
pub use record::{LogRecord, Metadata, SeverityLevel};
pub use store::{DurableStore, StoreError};
pub use transport::{HttpTransport, Transport, TransportError};
