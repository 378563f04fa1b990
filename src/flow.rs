//! # Flow Abstraction
//!
//! The seam between traced code and whatever stream implementation drives it.
//! A [`Flow`] is a re-subscribable, push-based sequence of values: every call
//! to [`Flow::subscribe`] starts one independent subscription, returned as a
//! boxed [`futures::Stream`] of `Result<T, FlowError>`.
//!
//! ## Termination
//!
//! - **Completion**: the subscription stream returns `None`
//! - **Failure**: it yields `Err(FlowError::Failed(..))`
//! - **Cancellation**: it yields `Err(FlowError::Cancelled(..))`, or the
//!   consumer drops the subscription stream
//!
//! Nothing after the first `Err` is observed.
//!
//! ## Hot-Stream Capabilities
//!
//! Hot flows may expose one of two optional capabilities, discovered through
//! [`Flow::as_state_holder`] and [`Flow::as_replay_buffered`]:
//!
//! - **[`StateHolder`]**: always has a current value readable without subscribing
//! - **[`ReplayBuffered`]**: replays its most recent values to new subscribers

use crate::error::FlowError;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

/// One subscription to a flow.
pub type FlowStream<T> = Pin<Box<dyn Stream<Item = Result<T, FlowError>> + Send>>;

/// Shared handle to a type-erased flow.
pub type SharedFlow<T> = Arc<dyn Flow<Item = T>>;

/// A re-subscribable source of values.
pub trait Flow: Send + Sync + 'static {
  /// The element type.
  type Item: Send + 'static;

  /// Starts a new, independent subscription.
  fn subscribe(&self) -> FlowStream<Self::Item>;

  /// Returns the state-holder capability, if this flow has one.
  fn as_state_holder(&self) -> Option<&dyn StateHolder> {
    None
  }

  /// Returns the replay-buffer capability, if this flow has one.
  fn as_replay_buffered(&self) -> Option<&dyn ReplayBuffered> {
    None
  }

  /// Snapshot of the hot-stream capability. State holders win if a flow
  /// reports both.
  fn hot_stream(&self) -> Option<HotStream> {
    if let Some(holder) = self.as_state_holder() {
      return Some(HotStream::StateHolder {
        current_value: holder.current_value(),
      });
    }
    self
      .as_replay_buffered()
      .map(|replay| HotStream::ReplayBuffered {
        buffer_size: replay.replay_buffer_size(),
      })
  }
}

/// A flow that always has a current value.
pub trait StateHolder: Send + Sync {
  /// String form of the current value.
  fn current_value(&self) -> String;
}

/// A multicast flow that replays its most recent values to new subscribers.
pub trait ReplayBuffered: Send + Sync {
  /// Number of values currently held in the replay buffer.
  fn replay_buffer_size(&self) -> usize;
}

/// Hot-stream introspection result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotStream {
  /// The source is a state holder.
  StateHolder {
    /// String form of the current value.
    current_value: String,
  },
  /// The source is a replay-buffered multicast.
  ReplayBuffered {
    /// Number of buffered values.
    buffer_size: usize,
  },
}

impl HotStream {
  /// Label used in rendered log lines.
  pub fn kind(&self) -> &'static str {
    match self {
      HotStream::StateHolder { .. } => "StateHolder",
      HotStream::ReplayBuffered { .. } => "ReplayBuffer",
    }
  }

  /// Human-readable detail for rendered log lines.
  pub fn detail(&self) -> String {
    match self {
      HotStream::StateHolder { current_value } => format!("current value: {}", current_value),
      HotStream::ReplayBuffered { buffer_size } => format!("replay buffer size: {}", buffer_size),
    }
  }
}

impl fmt::Display for HotStream {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.kind(), self.detail())
  }
}

impl<F> Flow for Arc<F>
where
  F: Flow + ?Sized,
{
  type Item = F::Item;

  fn subscribe(&self) -> FlowStream<Self::Item> {
    (**self).subscribe()
  }

  fn as_state_holder(&self) -> Option<&dyn StateHolder> {
    (**self).as_state_holder()
  }

  fn as_replay_buffered(&self) -> Option<&dyn ReplayBuffered> {
    (**self).as_replay_buffered()
  }
}
