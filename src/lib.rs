//! # flowtrace
//!
//! Lifecycle tracing for asynchronous streams.
//!
//! `flowtrace` decorates a [`Flow`](flow::Flow), a re-subscribable stream
//! source, so that every subscription reports its start, each emission, and
//! its termination to caller-supplied sinks. Values, ordering and
//! termination (completion, error or cancellation) pass through unchanged.
//!
//! ## Key Features
//!
//! - **Transparent**: same values, same order, same error identity, same cancellation
//! - **Per-Subscription Timing**: elapsed milliseconds measured from each subscription's start
//! - **Hot-Stream Introspection**: state holders log their current value, replay buffers their size
//! - **Side Channels**: a log sink for rendered lines and an optional analytics sink for events
//! - **Zero Overhead When Disabled**: decorating while disabled returns the source itself
//!
//! ## Quick Start
//!
//! ```rust
//! use flowtrace::config::TraceConfig;
//! use flowtrace::flow::Flow;
//! use flowtrace::producers::iter_flow;
//! use flowtrace::sink::log_sink;
//! use flowtrace::transformers::{TraceOptions, trace_with};
//! use futures::StreamExt;
//!
//! # async fn example() {
//! let config = TraceConfig::new();
//! config.set_log_sink(log_sink(|tag, line| eprintln!("[{tag}] {line}")));
//!
//! let flow = trace_with(&config, iter_flow(vec![1, 2, 3]), "numbers", TraceOptions::default());
//! let values: Vec<i32> = flow.subscribe().map(|item| item.unwrap()).collect().await;
//! assert_eq!(values, vec![1, 2, 3]);
//! # }
//! ```

#![deny(missing_docs)]

/// Shared trace settings and the process-wide instance.
pub mod config;
/// Subscribe-and-forget helpers.
pub mod consumers;
/// Termination types.
pub mod error;
/// The stream abstraction being traced.
pub mod flow;
/// Lifecycle notifications and their rendering.
pub mod notification;
/// Source adapters.
pub mod producers;
/// Log and analytics sinks.
pub mod sink;
/// The trace decorator.
pub mod transformers;

pub use config::{InitOptions, TraceConfig, initialize, reset_to_defaults};
pub use consumers::{WatchHandle, watch_in};
pub use error::{FlowError, Outcome};
pub use flow::{Flow, FlowStream, SharedFlow};
pub use transformers::{FlowTraceExt, TraceOptions, trace, trace_with, trace_with_options};

#[cfg(test)]
mod producers_test;
#[cfg(test)]
mod test_support;
