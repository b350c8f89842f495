//! Process-wide convenience facade over a single agent instance.
//!
//! The core agent is handle-based and usable without any global state (see
//! [`crate::agent`]); this module adds the ambient-style static API for
//! hosts that want to sprinkle log calls anywhere without threading a
//! handle. It is a thin wrapper around an `Option<AgentHandle>` slot:
//!
//! - the slot itself is a `std::sync::RwLock` so the hot path — `log()`
//!   looking up the handle — is a cheap read lock;
//! - `initialize`/`dispose` are additionally serialized by an async mutex so
//!   two concurrent initializers can never both believe they installed the
//!   instance, and a `log()` call can never observe a half-disposed one.
//!
//! Misuse is deliberately boring: logging before `initialize` or after
//! `dispose` is a silent no-op, a second `initialize` while an instance is
//! running keeps the existing instance and discards the new parameters, and
//! `dispose` without an instance does nothing. Log calls must be safe to
//! leave in place everywhere without defensive checks by the caller.

use std::sync::RwLock;

use tokio::sync::Mutex;
use tracing::debug;

use crate::agent::{Agent, AgentError, AgentHandle};
use crate::config::AgentConfig;
use crate::facts::{FactsProvider, HostFacts};
use crate::record::{Metadata, SeverityLevel};

/// The singleton slot. `None` both before `initialize` and after `dispose`.
static AGENT: RwLock<Option<AgentHandle>> = RwLock::new(None);

/// Serializes `initialize`/`dispose` so installation is atomic without
/// holding the slot lock across awaits.
static LIFECYCLE: Mutex<()> = Mutex::const_new(());

#[allow(clippy::expect_used)]
fn read_slot() -> Option<AgentHandle> {
    AGENT.read().expect("agent slot poisoned").clone()
}

/// Initializes the process-wide agent with default host fact collection.
///
/// A no-op if an instance is already running: the existing instance keeps
/// running and the new parameters are discarded.
pub async fn initialize(
    base_url: &str,
    api_key: &str,
    app_id: &str,
    config: AgentConfig,
) -> Result<(), AgentError> {
    initialize_with_provider(base_url, api_key, app_id, config, &HostFacts::default()).await
}

/// Initializes the process-wide agent with a custom facts provider.
#[allow(clippy::expect_used)]
pub async fn initialize_with_provider(
    base_url: &str,
    api_key: &str,
    app_id: &str,
    config: AgentConfig,
    facts_provider: &dyn FactsProvider,
) -> Result<(), AgentError> {
    let _guard = LIFECYCLE.lock().await;

    if read_slot().is_some() {
        debug!("log agent already initialized, ignoring repeated initialize");
        return Ok(());
    }

    let handle = Agent::initialize(base_url, api_key, app_id, config, facts_provider).await?;
    *AGENT.write().expect("agent slot poisoned") = Some(handle);
    Ok(())
}

/// True while an instance is installed.
#[must_use]
pub fn is_initialized() -> bool {
    read_slot().is_some()
}

/// Logs a record at the given severity. Silent no-op when no agent is
/// running.
pub fn log(level: SeverityLevel, message: impl Into<String>, metadata: Option<Metadata>) {
    match read_slot() {
        Some(handle) => handle.log(level, message, metadata),
        None => debug!("log call ignored: agent not initialized"),
    }
}

/// Logs at debug severity.
pub fn debug(message: impl Into<String>, metadata: Option<Metadata>) {
    log(SeverityLevel::Debug, message, metadata);
}

/// Logs at info severity.
pub fn info(message: impl Into<String>, metadata: Option<Metadata>) {
    log(SeverityLevel::Info, message, metadata);
}

/// Logs at warn severity.
pub fn warn(message: impl Into<String>, metadata: Option<Metadata>) {
    log(SeverityLevel::Warn, message, metadata);
}

/// Logs at error severity, triggering an immediate flush.
pub fn error(message: impl Into<String>, metadata: Option<Metadata>) {
    log(SeverityLevel::Error, message, metadata);
}

/// Manually drains and ships the queue. No-op when no agent is running.
pub async fn flush() {
    if let Some(handle) = read_slot() {
        handle.flush().await;
    }
}

/// Disposes the process-wide agent.
///
/// The singleton reference is detached first, so concurrent `log` calls
/// from this point on see "no agent" and no-op; the instance then stops its
/// timer, final-flushes, and persists leftovers. Must be awaited to
/// guarantee persistence before process exit. A later `initialize`
/// constructs a brand-new instance.
#[allow(clippy::expect_used)]
pub async fn dispose() {
    let _guard = LIFECYCLE.lock().await;

    let detached = AGENT.write().expect("agent slot poisoned").take();
    match detached {
        Some(handle) => handle.dispose().await,
        None => debug!("dispose ignored: agent not initialized"),
    }
}
