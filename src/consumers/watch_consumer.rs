//! Subscribe-and-forget consumer.
//!
//! [`watch_in`] traces a flow with default options and drives one
//! subscription to completion on a runtime, discarding its values. The
//! returned [`WatchHandle`] cancels the subscription; the traced session then
//! logs `CANCELLED`.
//!
//! ```rust,no_run
//! use flowtrace::consumers::watch_in;
//! use flowtrace::producers::iter_flow;
//!
//! # async fn example() {
//! let handle = watch_in(iter_flow(vec![1, 2, 3]), &tokio::runtime::Handle::current(), "numbers");
//! handle.join().await;
//! # }
//! ```

use crate::config::TraceConfig;
use crate::flow::{Flow, SharedFlow};
use crate::transformers::{TraceOptions, trace_with};
use futures::StreamExt;
use std::fmt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A running subscription started by [`watch_in`].
#[derive(Debug)]
pub struct WatchHandle {
  tag: String,
  token: CancellationToken,
  task: JoinHandle<()>,
}

impl WatchHandle {
  /// The tag the subscription is traced under.
  pub fn tag(&self) -> &str {
    &self.tag
  }

  /// Requests cancellation. Does nothing if the subscription already ended.
  pub fn cancel(&self) {
    self.token.cancel();
  }

  /// Returns `true` once cancellation has been requested.
  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }

  /// Returns `true` once the driving task has finished.
  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }

  /// Waits for the subscription to end.
  pub async fn join(self) {
    if let Err(error) = self.task.await {
      debug!(tag = %self.tag, error = %error, "watch task did not finish cleanly");
    }
  }

  /// Cancels the subscription and waits for it to end.
  pub async fn cancel_and_join(self) {
    self.cancel();
    self.join().await;
  }
}

/// Traces `source` with the global configuration and runs it on `runtime`.
pub fn watch_in<T>(source: SharedFlow<T>, runtime: &Handle, tag: impl Into<String>) -> WatchHandle
where
  T: fmt::Debug + Send + 'static,
{
  watch_in_with(&TraceConfig::global(), source, runtime, tag)
}

/// Like [`watch_in`], with an explicit configuration.
pub fn watch_in_with<T>(
  config: &TraceConfig,
  source: SharedFlow<T>,
  runtime: &Handle,
  tag: impl Into<String>,
) -> WatchHandle
where
  T: fmt::Debug + Send + 'static,
{
  let tag: String = tag.into();
  let flow = trace_with(config, source, tag.clone(), TraceOptions::default());
  let token = CancellationToken::new();
  let cancelled = token.clone();
  let task_tag = tag.clone();

  let task = runtime.spawn(async move {
    let mut subscription = flow.subscribe();
    loop {
      tokio::select! {
        biased;
        _ = cancelled.cancelled() => {
          trace!(tag = %task_tag, "watch cancelled");
          break;
        }
        next = subscription.next() => match next {
          Some(Ok(_)) => {}
          Some(Err(error)) => {
            trace!(tag = %task_tag, error = %error, "watched flow ended with an error");
            break;
          }
          None => break,
        },
      }
    }
  });

  WatchHandle { tag, token, task }
}
