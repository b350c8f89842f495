//! Agent coordinator: actor-pattern service owning the full pipeline.
//!
//! The agent ties the queue, the durable store, and the transport together
//! behind a single service task using the actor pattern:
//!
//! ```text
//!    ┌──────────────┐
//!    │ AgentHandle  │ (Clone; many producers)
//!    └──────┬───────┘
//!           │ commands via channel
//!           v
//!    ┌──────────────┐     ┌────────────┐
//!    │ AgentService │────>│ Transport  │ POST batch
//!    │  (one task)  │     └────────────┘
//!    └──────┬───────┘
//!           │ owns queue + store exclusively
//!           v
//!    ┌──────────────┐     ┌────────────┐
//!    │ RecordQueue  │     │DurableStore│ save on failure/shutdown
//!    └──────────────┘     └────────────┘
//! ```
//!
//! Because the service task is the only owner of the queue and the store, no
//! two operations ever interleave their state mutation: enqueues, flushes,
//! the periodic timer tick, and disposal are all serialized through one
//! `select!` loop. A timer tick cannot race a concurrent disposal — both are
//! arms of the same loop.
//!
//! `AgentHandle::log` is synchronous and never blocks the caller: it builds
//! the record (stamping the current time and the cached environment facts)
//! and hands it to the channel; the service task performs the enqueue and
//! any triggered flush.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::{AgentConfig, ConfigError};
use crate::facts::{EnvironmentFacts, FactsProvider};
use crate::queue::RecordQueue;
use crate::record::{LogRecord, Metadata, SeverityLevel};
use crate::store::{DurableStore, StoreError};
use crate::transport::{HttpTransport, Transport, TransportError};

/// Errors surfaced by [`Agent::initialize`].
///
/// Initialization is the only operation that reports errors to the caller;
/// once the agent is running, every failure is recovered or logged
/// internally and nothing propagates into the host application.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Commands sent from handles to the service task.
pub(crate) enum AgentCommand {
    /// Enqueue one record (and flush immediately for error severity).
    Record(LogRecord),
    /// Drain the queue and attempt delivery; acknowledge when done.
    Flush(oneshot::Sender<()>),
    /// Report the current queue length.
    QueueLen(oneshot::Sender<usize>),
    /// Stop the timer, drain the channel, final-flush, persist leftovers.
    Dispose(oneshot::Sender<()>),
}

/// Cloneable handle to a running agent.
///
/// The handle is the public surface consumed by the host application. It can
/// be cloned freely and used from any task or thread; all mutations funnel
/// through the service task's command channel.
#[derive(Clone)]
pub struct AgentHandle {
    tx: mpsc::UnboundedSender<AgentCommand>,
    app_id: Arc<str>,
    facts: Arc<EnvironmentFacts>,
}

impl AgentHandle {
    /// Builds a record and submits it for buffering. Fire-and-forget: never
    /// blocks, never fails. A record logged after disposal is silently
    /// dropped.
    pub fn log(&self, level: SeverityLevel, message: impl Into<String>, metadata: Option<Metadata>) {
        let record = LogRecord::new(&self.app_id, level, message, metadata, &self.facts);
        if self.tx.send(AgentCommand::Record(record)).is_err() {
            debug!("agent is disposed, dropping log record");
        }
    }

    /// Logs at debug severity.
    pub fn debug(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(SeverityLevel::Debug, message, metadata);
    }

    /// Logs at info severity.
    pub fn info(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(SeverityLevel::Info, message, metadata);
    }

    /// Logs at warn severity.
    pub fn warn(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(SeverityLevel::Warn, message, metadata);
    }

    /// Logs at error severity, triggering an immediate flush.
    pub fn error(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.log(SeverityLevel::Error, message, metadata);
    }

    /// Drains the queue and attempts one delivery, waiting for completion.
    /// A no-op after disposal.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(AgentCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Current number of buffered records (0 after disposal).
    pub async fn queue_len(&self) -> usize {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(AgentCommand::QueueLen(ack_tx)).is_err() {
            return 0;
        }
        ack_rx.await.unwrap_or(0)
    }

    /// Disposes the agent: stops the periodic flush, drains records already
    /// submitted, performs one final flush attempt, and persists whatever
    /// remains. Must be awaited to guarantee persistence before process
    /// exit. Terminal; repeated calls are no-ops.
    pub async fn dispose(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(AgentCommand::Dispose(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// True while the service task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Agent constructors.
///
/// [`Agent::initialize`] wires the default HTTP transport and sled store;
/// [`Agent::with_parts`] accepts pre-built components (the seam tests and
/// embedders use for dependency injection).
pub struct Agent;

impl Agent {
    /// Builds and starts an agent against an HTTP collector.
    ///
    /// On entry this captures the environment facts once (cached for the
    /// instance's lifetime), recovers any persisted records from the durable
    /// store into the queue, and starts the periodic flush task.
    pub async fn initialize(
        base_url: &str,
        api_key: &str,
        app_id: &str,
        config: AgentConfig,
        facts_provider: &dyn FactsProvider,
    ) -> Result<AgentHandle, AgentError> {
        config.validate()?;
        let transport = HttpTransport::new(base_url, api_key, config.http_timeout)?;
        let store = DurableStore::open(&config.storage_dir)?;
        Ok(Self::with_parts(
            Arc::new(transport),
            store,
            app_id,
            config,
            facts_provider,
        ))
    }

    /// Starts an agent from pre-built components.
    ///
    /// Recovery is best-effort: a store read failure is logged and treated
    /// as nothing-to-recover.
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        store: DurableStore,
        app_id: &str,
        config: AgentConfig,
        facts_provider: &dyn FactsProvider,
    ) -> AgentHandle {
        let facts = Arc::new(facts_provider.collect());

        let mut queue = RecordQueue::new(config.max_queue_size);
        match store.load_and_clear() {
            Ok(recovered) if !recovered.is_empty() => {
                debug!("recovered {} persisted log record(s)", recovered.len());
                queue.set_queue(recovered);
            }
            Ok(_) => {}
            Err(e) => error!("failed to recover persisted log records: {e}"),
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let service = AgentService {
            queue,
            store,
            transport,
            config,
            rx,
        };
        tokio::spawn(service.run());

        AgentHandle {
            tx,
            app_id: Arc::from(app_id),
            facts,
        }
    }
}

/// Service task exclusively owning the queue, store, and transport.
struct AgentService {
    queue: RecordQueue,
    store: DurableStore,
    transport: Arc<dyn Transport>,
    config: AgentConfig,
    rx: mpsc::UnboundedReceiver<AgentCommand>,
}

impl AgentService {
    /// Processes commands and timer ticks until disposal.
    async fn run(mut self) {
        debug!("log agent service started");

        let mut ticker = interval(self.config.flush_interval);
        ticker.tick().await; // discard the immediate first tick

        let mut dispose_acks = Vec::new();
        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(AgentCommand::Record(record)) => self.ingest(record).await,
                    Some(AgentCommand::Flush(ack)) => {
                        self.flush().await;
                        let _ = ack.send(());
                    }
                    Some(AgentCommand::QueueLen(ack)) => {
                        let _ = ack.send(self.queue.len());
                    }
                    Some(AgentCommand::Dispose(ack)) => {
                        dispose_acks = self.shutdown(ack).await;
                        break;
                    }
                    // All handles dropped: shut down as if disposed so
                    // pending records still reach the store.
                    None => {
                        self.flush().await;
                        self.persist();
                        break;
                    }
                },
                _ = ticker.tick() => self.flush().await,
            }
        }

        // Release the database before acknowledging so a successor agent can
        // reopen it immediately.
        drop(self.store);
        for ack in dispose_acks {
            let _ = ack.send(());
        }
        debug!("log agent service stopped");
    }

    /// Enqueues one record; error severity flushes immediately instead of
    /// waiting for the next timer tick.
    async fn ingest(&mut self, record: LogRecord) {
        self.echo(&record);
        let immediate = record.level == SeverityLevel::Error;
        self.queue.enqueue(record);
        if immediate {
            self.flush().await;
        }
    }

    /// Echoes a record through `tracing` at its own severity.
    ///
    /// Active in debug builds only; release builds never echo regardless of
    /// configuration.
    fn echo(&self, record: &LogRecord) {
        if !self.config.print_to_console || !cfg!(debug_assertions) {
            return;
        }
        match record.level {
            SeverityLevel::Debug => {
                debug!(target: "logship::echo", app_id = %record.app_id, "{}", record.message);
            }
            SeverityLevel::Info => {
                info!(target: "logship::echo", app_id = %record.app_id, "{}", record.message);
            }
            SeverityLevel::Warn => {
                warn!(target: "logship::echo", app_id = %record.app_id, "{}", record.message);
            }
            SeverityLevel::Error => {
                error!(target: "logship::echo", app_id = %record.app_id, "{}", record.message);
            }
        }
    }

    /// Drains the queue wholesale and attempts one delivery.
    ///
    /// On failure the exact drained records are pushed back to the head of
    /// the queue — records enqueued during the in-flight send are neither
    /// lost nor reordered ahead of them — and the queue's full contents are
    /// persisted so a crash before the next successful flush loses nothing
    /// beyond the bounded-capacity policy.
    async fn flush(&mut self) {
        let records = self.queue.dequeue_all();
        if records.is_empty() {
            return;
        }

        let count = records.len();
        debug!("flushing {count} log record(s)");
        match self.transport.send(&records).await {
            Ok(()) => debug!("delivered {count} log record(s)"),
            Err(e) => {
                error!("failed to deliver {count} log record(s), keeping for retry: {e}");
                self.queue.requeue(records);
                self.persist();
            }
        }
    }

    /// Saves the queue's current contents, swallowing store errors: the
    /// in-memory queue remains the source of truth.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.queue.peek_all()) {
            error!("failed to persist pending log records: {e}");
        }
    }

    /// Moves records already submitted on the channel into the queue.
    /// Flush/dispose acknowledgments encountered while draining are answered
    /// after the final flush completes.
    fn drain_pending(&mut self) -> Vec<oneshot::Sender<()>> {
        let mut acks = Vec::new();
        while let Ok(command) = self.rx.try_recv() {
            match command {
                AgentCommand::Record(record) => {
                    self.echo(&record);
                    self.queue.enqueue(record);
                }
                AgentCommand::Flush(ack) | AgentCommand::Dispose(ack) => acks.push(ack),
                AgentCommand::QueueLen(ack) => {
                    let _ = ack.send(self.queue.len());
                }
            }
        }
        acks
    }

    /// Disposal: the ticker is already out of play (this runs in its place
    /// in the loop), so drain submitted records, final-flush, and persist
    /// the leftovers. The persisted snapshot is only non-empty if the final
    /// flush itself failed; an empty save clears the storage key.
    async fn shutdown(&mut self, ack: oneshot::Sender<()>) -> Vec<oneshot::Sender<()>> {
        debug!("disposing log agent");
        let mut acks = vec![ack];
        acks.extend(self.drain_pending());

        self.flush().await;
        self.persist();
        acks
    }
}
