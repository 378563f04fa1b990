//! Replay-buffered multicast flow.
//!
//! [`ReplayProducer<T>`] is a hot flow: values are pushed with
//! [`ReplayProducer::emit`] whether or not anyone is subscribed. The most
//! recent `replay` values are cached, and every new subscriber receives that
//! cache before any live value. Live delivery uses a
//! `tokio::sync::broadcast` channel; a subscriber that falls more than the
//! channel capacity behind skips the values it missed.
//!
//! The producer exposes the [`ReplayBuffered`] capability, so a traced
//! subscription logs the cache size before the first emission.
//!
//! The flow completes for all subscribers when the producer is dropped.

use crate::error::FlowError;
use crate::flow::{Flow, FlowStream, ReplayBuffered};
use async_stream::stream;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Default capacity of the live broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

struct ReplayState<T> {
  buffer: VecDeque<T>,
  replay: usize,
}

/// Hot multicast flow with a replay cache.
pub struct ReplayProducer<T> {
  state: Mutex<ReplayState<T>>,
  sender: broadcast::Sender<T>,
}

impl<T> ReplayProducer<T>
where
  T: Clone + Send + Sync + 'static,
{
  /// Creates a producer caching the last `replay` values.
  pub fn new(replay: usize) -> Self {
    Self::with_channel_capacity(replay, DEFAULT_CHANNEL_CAPACITY)
  }

  /// Creates a producer with an explicit live channel capacity.
  pub fn with_channel_capacity(replay: usize, capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity.max(1));
    Self {
      state: Mutex::new(ReplayState {
        buffer: VecDeque::with_capacity(replay),
        replay,
      }),
      sender,
    }
  }

  /// Publishes `value` to live subscribers and records it in the cache.
  pub fn emit(&self, value: T) {
    let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.replay > 0 {
      if state.buffer.len() == state.replay {
        state.buffer.pop_front();
      }
      state.buffer.push_back(value.clone());
    }
    // No receivers is not an error for a hot flow.
    let _ = self.sender.send(value);
  }

  /// A copy of the replay cache, oldest first.
  pub fn replay_cache(&self) -> Vec<T> {
    let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
    state.buffer.iter().cloned().collect()
  }

  /// Number of live subscriptions.
  pub fn subscriber_count(&self) -> usize {
    self.sender.receiver_count()
  }
}

impl<T> Flow for ReplayProducer<T>
where
  T: Clone + Send + Sync + 'static,
{
  type Item = T;

  fn subscribe(&self) -> FlowStream<T> {
    // Snapshot and receiver are taken under the same lock as `emit`, so no
    // value is both replayed and received live, and none falls in between.
    let (replayed, mut receiver) = {
      let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
      let replayed: Vec<T> = state.buffer.iter().cloned().collect();
      (replayed, self.sender.subscribe())
    };

    Box::pin(stream! {
      for value in replayed {
        yield Ok::<T, FlowError>(value);
      }
      loop {
        match receiver.recv().await {
          Ok(value) => {
            yield Ok(value);
          }
          Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "replay subscriber lagged behind; values skipped");
          }
          Err(RecvError::Closed) => break,
        }
      }
    })
  }

  fn as_replay_buffered(&self) -> Option<&dyn ReplayBuffered> {
    Some(self)
  }
}

impl<T> ReplayBuffered for ReplayProducer<T>
where
  T: Clone + Send + Sync + 'static,
{
  fn replay_buffer_size(&self) -> usize {
    self
      .state
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .buffer
      .len()
  }
}
