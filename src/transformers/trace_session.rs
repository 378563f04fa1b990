//! Per-subscription tracing state.
//!
//! A [`TraceSession`] wraps one subscription stream. It owns the start
//! timestamp, so elapsed times are measured per subscriber, and it guarantees
//! exactly one terminal notification: on completion, on error, on upstream
//! cancellation, or when the consumer drops it early.

use crate::config::TraceConfig;
use crate::error::{FlowError, Outcome};
use crate::flow::HotStream;
use crate::notification::{Notification, REDACTED, current_context_name, value_string};
use crate::sink::{deliver_analytics, deliver_log};
use futures::Stream;
use pin_project::{pin_project, pinned_drop};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tokio::time::Instant;
use tracing::debug;

/// Cancellation reason used when the consumer drops a live subscription.
pub const DROPPED_REASON: &str = "subscription dropped";

/// Per-call decorator options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOptions {
  /// Log each value's string form. When off, values are redacted.
  pub log_values: bool,
  /// Send a `flow_trace_emit` analytics event per value.
  pub report_emissions: bool,
}

impl Default for TraceOptions {
  fn default() -> Self {
    Self {
      log_values: true,
      report_emissions: false,
    }
  }
}

impl TraceOptions {
  /// Sets whether values appear in log lines.
  pub fn with_log_values(mut self, log_values: bool) -> Self {
    self.log_values = log_values;
    self
  }

  /// Sets whether every value is reported to analytics.
  pub fn with_report_emissions(mut self, report_emissions: bool) -> Self {
    self.report_emissions = report_emissions;
    self
  }
}

/// Routes notifications of one session to the configured sinks.
#[derive(Clone)]
pub(crate) struct Reporter {
  pub(crate) tag: Arc<str>,
  pub(crate) options: TraceOptions,
  pub(crate) config: TraceConfig,
}

impl Reporter {
  fn notify(&self, notification: Notification) {
    let context = self
      .config
      .show_context_info()
      .then(current_context_name);
    let line = notification.render(context.as_deref());
    deliver_log(&self.config.log_sink(), &self.tag, &line);

    let reportable = match notification {
      Notification::HotStreamInfo(_) => false,
      Notification::Emit { .. } => self.options.report_emissions,
      _ => true,
    };
    if !reportable {
      return;
    }
    if let Some(sink) = self.config.analytics_sink()
      && let Some((event, params)) = notification.analytics_event(&self.tag)
    {
      deliver_analytics(&sink, &self.tag, event, &params);
    }
  }

  fn render_value<T: fmt::Debug>(&self, value: &T) -> String {
    if self.options.log_values {
      value_string(value)
    } else {
      REDACTED.to_string()
    }
  }
}

/// One traced subscription.
#[pin_project(PinnedDrop)]
pub struct TraceSession<S> {
  #[pin]
  source: Option<S>,
  reporter: Reporter,
  started: Instant,
  finished: bool,
}

impl<S> TraceSession<S> {
  /// Emits `Start` and, for hot sources, the hot-stream info, then opens the
  /// source with `subscribe`. The source is not touched before both
  /// notifications have been delivered.
  pub(crate) fn start<F>(reporter: Reporter, hot: Option<HotStream>, subscribe: F) -> Self
  where
    F: FnOnce() -> S,
  {
    let started = Instant::now();
    reporter.notify(Notification::Start);
    if let Some(hot) = hot {
      reporter.notify(Notification::HotStreamInfo(hot));
    }
    Self {
      source: Some(subscribe()),
      reporter,
      started,
      finished: false,
    }
  }

  /// The tag this session reports under.
  pub fn tag(&self) -> &str {
    &self.reporter.tag
  }

  /// Returns `true` once the terminal notification has been sent.
  pub fn is_finished(&self) -> bool {
    self.finished
  }

  fn elapsed_ms(started: &Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
  }

  fn finish(reporter: &Reporter, started: &Instant, outcome: Outcome) {
    let elapsed_ms = Self::elapsed_ms(started);
    let notification = match outcome {
      Outcome::Completed => Notification::Complete { elapsed_ms },
      Outcome::Failed(failure) => Notification::Error {
        elapsed_ms,
        message: failure.message,
        kind: failure.kind,
      },
      Outcome::Cancelled(reason) => Notification::Cancelled { elapsed_ms, reason },
    };
    reporter.notify(notification);
  }
}

impl<S, T> Stream for TraceSession<S>
where
  S: Stream<Item = Result<T, FlowError>>,
  T: fmt::Debug,
{
  type Item = Result<T, FlowError>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let mut this = self.project();
    if *this.finished {
      return Poll::Ready(None);
    }
    let Some(source) = this.source.as_mut().as_pin_mut() else {
      return Poll::Ready(None);
    };

    match ready!(source.poll_next(cx)) {
      Some(Ok(value)) => {
        this.reporter.notify(Notification::Emit {
          elapsed_ms: Self::elapsed_ms(this.started),
          value: this.reporter.render_value(&value),
        });
        Poll::Ready(Some(Ok(value)))
      }
      Some(Err(error)) => {
        *this.finished = true;
        this.source.set(None);
        Self::finish(this.reporter, this.started, Outcome::classify(Some(&error)));
        Poll::Ready(Some(Err(error)))
      }
      None => {
        *this.finished = true;
        this.source.set(None);
        Self::finish(this.reporter, this.started, Outcome::Completed);
        Poll::Ready(None)
      }
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    match &self.source {
      Some(source) if !self.finished => source.size_hint(),
      _ => (0, Some(0)),
    }
  }
}

#[pinned_drop]
impl<S> PinnedDrop for TraceSession<S> {
  fn drop(self: Pin<&mut Self>) {
    let this = self.project();
    if *this.finished {
      return;
    }
    *this.finished = true;
    debug!(tag = %this.reporter.tag, "traced subscription dropped before termination");
    Self::finish(
      this.reporter,
      this.started,
      Outcome::Cancelled(Some(DROPPED_REASON.to_string())),
    );
  }
}
