//! Log record model and severity levels.
//!
//! A [`LogRecord`] is the immutable unit of data flowing through the agent:
//! created at the logging call site, buffered by the queue, serialized by the
//! transport and the durable store, and destroyed on successful delivery or
//! final eviction.
//!
//! # Wire Format
//!
//! Records serialize to flat snake_case JSON objects. The environment facts
//! captured at initialization are flattened into the same object:
//!
//! ```json
//! {
//!   "app_id": "shop-backend",
//!   "level": "error",
//!   "message": "checkout failed",
//!   "timestamp": "2026-08-06T12:34:56.123456Z",
//!   "metadata": {"order_id": 4711},
//!   "app_name": "shop",
//!   "platform": "linux",
//!   ...
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::facts::EnvironmentFacts;

/// Severity of a log record, ordered from least to most severe.
///
/// The ordering `Debug < Info < Warn < Error` is total and strict. Severity
/// never filters what gets queued; the agent only uses it for console echoing
/// and to trigger an immediate flush on [`SeverityLevel::Error`].
///
/// # Parsing
///
/// Levels parse from strings case-insensitively:
/// ```
/// use logship::record::SeverityLevel;
/// use std::str::FromStr;
///
/// assert_eq!(SeverityLevel::from_str("WARN").unwrap(), SeverityLevel::Warn);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// Low-priority diagnostic information.
    Debug,
    /// Useful information about normal operation.
    Info,
    /// Hazardous situations that may lead to errors.
    Warn,
    /// Serious failures. Triggers an immediate out-of-band flush.
    Error,
}

impl SeverityLevel {
    /// Returns the lowercase wire representation of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::Debug => "debug",
            SeverityLevel::Info => "info",
            SeverityLevel::Warn => "warn",
            SeverityLevel::Error => "error",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized severity string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized severity level '{0}', expected one of: debug, info, warn, error")]
pub struct InvalidSeverity(pub String);

impl FromStr for SeverityLevel {
    type Err = InvalidSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(SeverityLevel::Debug),
            "info" => Ok(SeverityLevel::Info),
            "warn" => Ok(SeverityLevel::Warn),
            "error" => Ok(SeverityLevel::Error),
            _ => Err(InvalidSeverity(s.to_string())),
        }
    }
}

/// Arbitrary structured metadata attached to a record.
///
/// Values may be strings, numbers, booleans, arrays, or nested objects;
/// `serde_json` dispatches (de)serialization per variant.
pub type Metadata = Map<String, Value>;

/// One immutable log event.
///
/// Constructed synchronously at the logging call site via [`LogRecord::new`],
/// which stamps the current UTC time and the cached environment facts. Never
/// mutated after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Identifier of the application that emitted the record.
    pub app_id: String,
    /// Severity level.
    pub level: SeverityLevel,
    /// Free-text message.
    pub message: String,
    /// UTC timestamp, ISO-8601 with fixed microsecond precision.
    pub timestamp: String,
    /// Optional structured metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Environment facts snapshot, flattened into the record on the wire.
    #[serde(flatten)]
    pub facts: EnvironmentFacts,
}

impl LogRecord {
    /// Builds a record, stamping the current UTC time and the given facts.
    ///
    /// The facts are cloned into the record: they are a snapshot taken at
    /// record-creation time, not a live reference.
    #[must_use]
    pub fn new(
        app_id: &str,
        level: SeverityLevel,
        message: impl Into<String>,
        metadata: Option<Metadata>,
        facts: &EnvironmentFacts,
    ) -> Self {
        LogRecord {
            app_id: app_id.to_string(),
            level,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            metadata,
            facts: facts.clone(),
        }
    }
}
