//! Bounded FIFO buffer of pending log records.
//!
//! The queue is the agent's in-memory staging area: insertion order is
//! arrival order, capacity is fixed, and overflow silently evicts records
//! rather than erroring. Which end loses records depends on the operation:
//!
//! - [`RecordQueue::enqueue`] drops from the **head** (oldest first), so a
//!   steady overload sheds the stalest data.
//! - [`RecordQueue::requeue`] and [`RecordQueue::set_queue`] keep the
//!   **tail** (most recent) when the combined contents exceed capacity: on
//!   retry, fresh records are considered more valuable than an old batch
//!   that already failed to ship once.
//!
//! The queue itself is a plain data structure with no interior locking; the
//! agent's service task owns it exclusively, which serializes all access.

use std::collections::VecDeque;

use tracing::warn;

use crate::record::LogRecord;

/// Bounded FIFO queue with oldest-drop eviction.
#[derive(Debug)]
pub struct RecordQueue {
    records: VecDeque<LogRecord>,
    capacity: usize,
}

impl RecordQueue {
    /// Creates an empty queue bounded at `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        RecordQueue {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record to the tail, evicting from the head on overflow.
    ///
    /// Overflow is silent by design: a data-loss warning is emitted through
    /// `tracing`, but no error reaches the caller.
    pub fn enqueue(&mut self, record: LogRecord) {
        self.records.push_back(record);
        self.trim_front();
    }

    /// Atomically returns the full contents in arrival order and empties the
    /// queue. Used only by flush.
    pub fn dequeue_all(&mut self) -> Vec<LogRecord> {
        self.records.drain(..).collect()
    }

    /// Returns a copy of the contents without mutating state. Used for
    /// persistence snapshots.
    #[must_use]
    pub fn peek_all(&self) -> Vec<LogRecord> {
        self.records.iter().cloned().collect()
    }

    /// Prepends a previously dequeued-but-undelivered batch, then re-applies
    /// the capacity bound keeping the most recent records.
    ///
    /// The requeued batch regains head position ahead of anything enqueued
    /// since it was drained, so relative order survives a failed flush. If
    /// the combined length exceeds capacity the surplus is dropped from the
    /// head, which preferentially discards the failed batch before freshly
    /// arrived records.
    pub fn requeue(&mut self, records: Vec<LogRecord>) {
        for record in records.into_iter().rev() {
            self.records.push_front(record);
        }
        self.trim_front();
    }

    /// Replaces the contents wholesale, trimmed to capacity keeping the most
    /// recent records. Used once, at startup, to load persisted records.
    pub fn set_queue(&mut self, records: Vec<LogRecord>) {
        self.records = records.into();
        self.trim_front();
    }

    /// Number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn trim_front(&mut self) {
        if self.records.len() <= self.capacity {
            return;
        }
        let dropped = self.records.len() - self.capacity;
        self.records.drain(..dropped);
        warn!(
            "log queue full ({} records), dropped {} oldest record(s)",
            self.capacity, dropped
        );
    }
}
