//! # Trace Transformer
//!
//! Decorates a flow so that every subscription reports its lifecycle to the
//! configured sinks, while values, ordering and termination pass through
//! untouched.
//!
//! ## Overview
//!
//! For every subscription the decorated flow:
//!
//! - **Starts**: logs `START` (and reports `flow_trace_start`) before the source is opened
//! - **Introspects**: logs one `HOT_STREAM` line if the source is a state holder or replay buffer
//! - **Emits**: logs `EMIT` with elapsed time and value (or `<hidden>`), then forwards the value
//! - **Terminates**: logs exactly one of `COMPLETE`, `ERROR` or `CANCELLED`, then relays
//!   the same termination to the consumer
//!
//! ## Enabled Switch
//!
//! [`TraceConfig::is_enabled`] is read once, when the flow is decorated. A flow
//! decorated while tracing is disabled is returned as-is (the very same
//! `Arc`) and is never traced, even if tracing is enabled later. A flow
//! decorated while enabled keeps tracing after tracing is disabled.
//!
//! ## Example
//!
//! ```rust
//! use flowtrace::config::TraceConfig;
//! use flowtrace::flow::Flow;
//! use flowtrace::producers::iter_flow;
//! use flowtrace::transformers::{TraceOptions, trace_with};
//! use futures::StreamExt;
//!
//! # async fn example() {
//! let config = TraceConfig::new();
//! let traced = trace_with(
//!   &config,
//!   iter_flow(vec![1, 2, 3]),
//!   "numbers",
//!   TraceOptions::default().with_log_values(false),
//! );
//! let values: Vec<_> = traced.subscribe().collect().await;
//! assert_eq!(values.len(), 3);
//! # }
//! ```

use super::trace_session::{Reporter, TraceOptions, TraceSession};
use crate::config::TraceConfig;
use crate::flow::{Flow, FlowStream, SharedFlow};
use std::fmt;
use std::sync::Arc;

/// A flow whose subscriptions are traced.
pub struct TracedFlow<T> {
  source: SharedFlow<T>,
  reporter: Reporter,
}

impl<T> TracedFlow<T>
where
  T: fmt::Debug + Send + 'static,
{
  /// Wraps `source` unconditionally. Prefer [`trace_with`], which honours
  /// the enabled switch.
  pub fn new(
    config: TraceConfig,
    source: SharedFlow<T>,
    tag: impl Into<String>,
    options: TraceOptions,
  ) -> Self {
    let tag: String = tag.into();
    debug_assert!(!tag.is_empty(), "trace tag must not be empty");
    Self {
      source,
      reporter: Reporter {
        tag: Arc::from(tag),
        options,
        config,
      },
    }
  }

  /// The tag this flow reports under.
  pub fn tag(&self) -> &str {
    &self.reporter.tag
  }

  /// The options this flow was decorated with.
  pub fn options(&self) -> TraceOptions {
    self.reporter.options
  }
}

impl<T> Flow for TracedFlow<T>
where
  T: fmt::Debug + Send + 'static,
{
  type Item = T;

  fn subscribe(&self) -> FlowStream<T> {
    let source = Arc::clone(&self.source);
    let session = TraceSession::start(self.reporter.clone(), self.source.hot_stream(), move || {
      source.subscribe()
    });
    Box::pin(session)
  }
}

/// Decorates `source` using `config`.
///
/// Returns `source` itself when `config` is disabled at the time of the call.
pub fn trace_with<T>(
  config: &TraceConfig,
  source: SharedFlow<T>,
  tag: impl Into<String>,
  options: TraceOptions,
) -> SharedFlow<T>
where
  T: fmt::Debug + Send + 'static,
{
  if !config.is_enabled() {
    return source;
  }
  Arc::new(TracedFlow::new(config.clone(), source, tag, options))
}

/// Decorates `source` with the global configuration and default options.
pub fn trace<T>(source: SharedFlow<T>, tag: impl Into<String>) -> SharedFlow<T>
where
  T: fmt::Debug + Send + 'static,
{
  trace_with(&TraceConfig::global(), source, tag, TraceOptions::default())
}

/// Decorates `source` with the global configuration and the given options.
pub fn trace_with_options<T>(
  source: SharedFlow<T>,
  tag: impl Into<String>,
  options: TraceOptions,
) -> SharedFlow<T>
where
  T: fmt::Debug + Send + 'static,
{
  trace_with(&TraceConfig::global(), source, tag, options)
}

/// Method-style access to the decorator.
pub trait FlowTraceExt<T> {
  /// See [`trace`].
  fn traced(self, tag: impl Into<String>) -> SharedFlow<T>;

  /// See [`trace_with`].
  fn traced_with(
    self,
    config: &TraceConfig,
    tag: impl Into<String>,
    options: TraceOptions,
  ) -> SharedFlow<T>;
}

impl<T> FlowTraceExt<T> for SharedFlow<T>
where
  T: fmt::Debug + Send + 'static,
{
  fn traced(self, tag: impl Into<String>) -> SharedFlow<T> {
    trace(self, tag)
  }

  fn traced_with(
    self,
    config: &TraceConfig,
    tag: impl Into<String>,
    options: TraceOptions,
  ) -> SharedFlow<T> {
    trace_with(config, self, tag, options)
  }
}
