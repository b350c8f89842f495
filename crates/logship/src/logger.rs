//! Diagnostics subscriber for the agent's own operational logging.
//!
//! The agent reports its internal activity (flush outcomes, eviction,
//! recovery, persistence failures) through `tracing`, and echoes buffered
//! records under the `logship::echo` target. Hosts that already install a
//! subscriber see both streams automatically; hosts that do not can call
//! [`init`] once at startup to get a minimal console subscriber.
//!
//! # Format
//!
//! ```text
//! LOGSHIP | LEVEL | message {event_fields}
//! ```

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Log formatter prefixing agent diagnostics with `LOGSHIP` so they are
/// easy to separate from the host application's own output.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "LOGSHIP | {} | ", metadata.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs a console subscriber for agent diagnostics.
///
/// `log_level` follows `EnvFilter` directive syntax ("debug", "info",
/// "logship=debug", ...). Returns an error if a global subscriber is
/// already installed, which hosts with their own tracing setup can ignore.
pub fn init(log_level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .event_format(Formatter)
        .with_env_filter(
            EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_installs_subscriber_once() {
        assert!(init("debug").is_ok());
        // A second install fails; callers are told they may ignore this.
        assert!(init("info").is_err());
    }

    #[test]
    fn test_formatter_is_copy() {
        let formatter = Formatter;
        let copied = formatter;
        let _ = (formatter, copied);
    }
}
