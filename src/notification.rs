//! # Lifecycle Notifications
//!
//! A [`Notification`] describes one lifecycle event of a traced subscription.
//! Notifications are never stored: each is rendered into a log line and,
//! when it has an analytics form, into one analytics event, then dropped.
//!
//! ## Log Line Format
//!
//! ```text
//! <MARKER>[ +<elapsed>ms][ -> <detail>][ [T: <thread>]]
//! ```
//!
//! Elapsed time is absent for `START` and `HOT_STREAM`. The thread segment is
//! present only when context info is enabled.
//!
//! ```text
//! START [T: main]
//! HOT_STREAM -> StateHolder current value: 42 [T: main]
//! EMIT +12ms -> 7 [T: tokio-runtime-worker]
//! ERROR +30ms -> disk full (std::io::error::Error) [T: main]
//! CANCELLED +31ms -> subscription dropped [T: main]
//! COMPLETE +40ms [T: main]
//! ```

use crate::flow::HotStream;
use crate::sink::{
  AnalyticsParams, EVENT_CANCEL, EVENT_COMPLETE, EVENT_EMIT, EVENT_ERROR, EVENT_START,
};
use serde_json::{Value, json};
use std::fmt;

/// Placeholder shown instead of a value when value logging is off.
pub const REDACTED: &str = "<hidden>";

/// One lifecycle event of a traced subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
  /// The subscription started.
  Start,
  /// The source is a hot stream.
  HotStreamInfo(HotStream),
  /// The source produced a value.
  Emit {
    /// Milliseconds since the subscription started.
    elapsed_ms: u64,
    /// String form of the value, or [`REDACTED`].
    value: String,
  },
  /// The source failed.
  Error {
    /// Milliseconds since the subscription started.
    elapsed_ms: u64,
    /// The error's message.
    message: String,
    /// The error's type name.
    kind: String,
  },
  /// The subscription was cancelled.
  Cancelled {
    /// Milliseconds since the subscription started.
    elapsed_ms: u64,
    /// Cancellation reason, if one was given.
    reason: Option<String>,
  },
  /// The source completed.
  Complete {
    /// Milliseconds since the subscription started.
    elapsed_ms: u64,
  },
}

impl Notification {
  /// The event marker at the start of the log line.
  pub fn marker(&self) -> &'static str {
    match self {
      Notification::Start => "START",
      Notification::HotStreamInfo(_) => "HOT_STREAM",
      Notification::Emit { .. } => "EMIT",
      Notification::Error { .. } => "ERROR",
      Notification::Cancelled { .. } => "CANCELLED",
      Notification::Complete { .. } => "COMPLETE",
    }
  }

  /// Elapsed time, for notifications that carry one.
  pub fn elapsed_ms(&self) -> Option<u64> {
    match self {
      Notification::Start | Notification::HotStreamInfo(_) => None,
      Notification::Emit { elapsed_ms, .. }
      | Notification::Error { elapsed_ms, .. }
      | Notification::Cancelled { elapsed_ms, .. }
      | Notification::Complete { elapsed_ms } => Some(*elapsed_ms),
    }
  }

  /// Returns `true` for `Error`, `Cancelled` and `Complete`.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      Notification::Error { .. } | Notification::Cancelled { .. } | Notification::Complete { .. }
    )
  }

  fn detail(&self) -> Option<String> {
    match self {
      Notification::Start | Notification::Complete { .. } => None,
      Notification::HotStreamInfo(hot) => Some(hot.to_string()),
      Notification::Emit { value, .. } => Some(value.clone()),
      Notification::Error { message, kind, .. } => Some(format!("{} ({})", message, kind)),
      Notification::Cancelled { reason, .. } => reason.clone(),
    }
  }

  /// Renders the log line. `context` is the executing thread's name, or
  /// `None` when context info is disabled.
  pub fn render(&self, context: Option<&str>) -> String {
    let mut line = String::from(self.marker());
    if let Some(ms) = self.elapsed_ms() {
      line.push_str(&format!(" +{}ms", ms));
    }
    if let Some(detail) = self.detail() {
      line.push_str(" -> ");
      line.push_str(&detail);
    }
    if let Some(name) = context {
      line.push_str(&format!(" [T: {}]", name));
    }
    line
  }

  /// Analytics event name and parameters, including `flow_tag`.
  ///
  /// `HotStreamInfo` has no analytics form. `Emit` does, but callers only
  /// report it when emission reporting is on.
  pub fn analytics_event(&self, tag: &str) -> Option<(&'static str, AnalyticsParams)> {
    let (event, fields) = match self {
      Notification::HotStreamInfo(_) => return None,
      Notification::Start => (EVENT_START, json!({})),
      Notification::Emit { elapsed_ms, value } => {
        (EVENT_EMIT, json!({ "elapsed_ms": elapsed_ms, "value": value }))
      }
      Notification::Error {
        elapsed_ms,
        message,
        kind,
      } => (
        EVENT_ERROR,
        json!({
          "elapsed_ms": elapsed_ms,
          "error_message": message,
          "exception_class": kind,
        }),
      ),
      Notification::Cancelled { elapsed_ms, .. } => {
        (EVENT_CANCEL, json!({ "elapsed_ms": elapsed_ms }))
      }
      Notification::Complete { elapsed_ms } => (EVENT_COMPLETE, json!({ "elapsed_ms": elapsed_ms })),
    };

    let mut params = AnalyticsParams::new();
    params.insert("flow_tag".to_string(), Value::String(tag.to_string()));
    if let Value::Object(fields) = fields {
      params.extend(fields);
    }
    Some((event, params))
  }
}

/// String form of a value for log lines and analytics.
///
/// Values are rendered with `Debug`. A quoted string literal is unquoted and
/// unescaped, so `"hello"` logs as `hello`.
pub fn value_string<T: fmt::Debug + ?Sized>(value: &T) -> String {
  let debug = format!("{:?}", value);
  if debug.len() >= 2 && debug.starts_with('"') && debug.ends_with('"') {
    // Escapes JSON cannot read (`\u{..}`) keep the Debug form.
    if let Ok(plain) = serde_json::from_str::<String>(&debug) {
      return plain;
    }
  }
  debug
}

/// Name of the thread running the current callback.
pub fn current_context_name() -> String {
  let thread = std::thread::current();
  match thread.name() {
    Some(name) => name.to_string(),
    None => format!("{:?}", thread.id()),
  }
}
