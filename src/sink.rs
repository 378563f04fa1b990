//! # Sinks
//!
//! Caller-supplied side channels that receive trace output.
//!
//! - **[`LogSink`]**: `(tag, message)`, one call per notification
//! - **[`AnalyticsSink`]**: `(event_name, params)`, one call per reportable notification
//!
//! Sinks are invoked synchronously from inside the traced stream's poll. A
//! panicking sink is caught, reported through `tracing`, and otherwise
//! ignored: it never interrupts value delivery.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Receives rendered log lines.
pub type LogSink = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Receives analytics events.
pub type AnalyticsSink = Arc<dyn Fn(&str, &AnalyticsParams) + Send + Sync>;

/// Analytics event parameters. Always contains `flow_tag`.
pub type AnalyticsParams = Map<String, Value>;

/// Analytics event: a subscription started.
pub const EVENT_START: &str = "flow_trace_start";
/// Analytics event: a value was emitted.
pub const EVENT_EMIT: &str = "flow_trace_emit";
/// Analytics event: the source failed.
pub const EVENT_ERROR: &str = "flow_trace_error";
/// Analytics event: the subscription was cancelled.
pub const EVENT_CANCEL: &str = "flow_trace_cancel";
/// Analytics event: the source completed.
pub const EVENT_COMPLETE: &str = "flow_trace_complete";

static CONSOLE_LOG_SINK: Lazy<LogSink> = Lazy::new(|| {
  Arc::new(|tag: &str, message: &str| {
    println!("{}: {}", tag, message);
  })
});

/// Default log sink: prints `"<tag>: <message>"` to stdout.
///
/// Every call returns the same shared sink.
pub fn console_log_sink() -> LogSink {
  Arc::clone(&CONSOLE_LOG_SINK)
}

/// Returns `true` if `sink` is the default console sink.
pub fn is_console_log_sink(sink: &LogSink) -> bool {
  std::ptr::addr_eq(Arc::as_ptr(sink), Arc::as_ptr(&CONSOLE_LOG_SINK))
}

/// Wraps a closure as a [`LogSink`].
pub fn log_sink<F>(f: F) -> LogSink
where
  F: Fn(&str, &str) + Send + Sync + 'static,
{
  Arc::new(f)
}

/// Wraps a closure as an [`AnalyticsSink`].
pub fn analytics_sink<F>(f: F) -> AnalyticsSink
where
  F: Fn(&str, &AnalyticsParams) + Send + Sync + 'static,
{
  Arc::new(f)
}

pub(crate) fn deliver_log(sink: &LogSink, tag: &str, message: &str) {
  if panic::catch_unwind(AssertUnwindSafe(|| sink(tag, message))).is_err() {
    warn!(tag = %tag, "log sink panicked; line dropped");
  }
}

pub(crate) fn deliver_analytics(
  sink: &AnalyticsSink,
  tag: &str,
  event: &str,
  params: &AnalyticsParams,
) {
  if panic::catch_unwind(AssertUnwindSafe(|| sink(event, params))).is_err() {
    warn!(tag = %tag, event = %event, "analytics sink panicked; event dropped");
  }
}
