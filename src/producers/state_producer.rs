//! State-holder flow backed by a `tokio::sync::watch` channel.
//!
//! [`StateProducer<T>`] always holds a current value. Each subscriber first
//! receives the current value, then every later update. Updates that land
//! while a subscriber is busy are conflated, as with any watch channel. The
//! flow never completes on its own; subscribers end it by dropping their
//! stream.
//!
//! The producer exposes the [`StateHolder`] capability, so a traced
//! subscription logs its current value before the first emission.

use crate::flow::{Flow, FlowStream, StateHolder};
use crate::notification::value_string;
use futures::StreamExt;
use std::fmt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A flow with a current value.
pub struct StateProducer<T> {
  sender: watch::Sender<T>,
}

impl<T> StateProducer<T>
where
  T: Clone + fmt::Debug + Send + Sync + 'static,
{
  /// Creates a state holder with an initial value.
  pub fn new(initial: T) -> Self {
    let (sender, _) = watch::channel(initial);
    Self { sender }
  }

  /// Replaces the current value and notifies subscribers.
  pub fn set(&self, value: T) {
    self.sender.send_replace(value);
  }

  /// A copy of the current value.
  pub fn current(&self) -> T {
    self.sender.borrow().clone()
  }

  /// Number of live subscriptions.
  pub fn subscriber_count(&self) -> usize {
    self.sender.receiver_count()
  }
}

impl<T> Flow for StateProducer<T>
where
  T: Clone + fmt::Debug + Send + Sync + 'static,
{
  type Item = T;

  fn subscribe(&self) -> FlowStream<T> {
    Box::pin(WatchStream::new(self.sender.subscribe()).map(Ok))
  }

  fn as_state_holder(&self) -> Option<&dyn StateHolder> {
    Some(self)
  }
}

impl<T> StateHolder for StateProducer<T>
where
  T: Clone + fmt::Debug + Send + Sync + 'static,
{
  fn current_value(&self) -> String {
    value_string(&*self.sender.borrow())
  }
}
