//! Cold flows built fresh for every subscription.
//!
//! This module provides [`VecProducer<T>`], which replays a fixed `Vec` to
//! each subscriber, and [`FnProducer`], which builds a new stream from a
//! closure for each subscriber.
//!
//! # Key Concepts
//!
//! - **Cold**: nothing happens until a subscription is polled
//! - **Independent**: every subscription sees the full sequence from the start
//! - **Reusable**: the producer clones its data, so it can be subscribed repeatedly
//!
//! # Quick Start
//!
//! ```rust
//! use flowtrace::error::FlowError;
//! use flowtrace::flow::Flow;
//! use flowtrace::producers::{flow_fn, iter_flow};
//! use futures::{StreamExt, stream};
//!
//! # async fn example() {
//! let numbers = iter_flow(vec![1, 2, 3]);
//! let failing = flow_fn(|| {
//!   stream::iter(vec![Ok(1), Err(FlowError::failed(std::io::Error::other("boom")))])
//! });
//!
//! assert_eq!(numbers.subscribe().count().await, 3);
//! assert_eq!(failing.subscribe().count().await, 2);
//! # }
//! ```

use crate::error::FlowError;
use crate::flow::{Flow, FlowStream, SharedFlow};
use futures::{Stream, StreamExt, stream};
use std::sync::Arc;

/// A cold flow that yields the items of a `Vec` in order, then completes.
#[derive(Debug, Clone)]
pub struct VecProducer<T> {
  items: Vec<T>,
}

impl<T> VecProducer<T>
where
  T: Clone + Send + Sync + 'static,
{
  /// Creates a producer over `items`.
  pub fn new(items: Vec<T>) -> Self {
    Self { items }
  }

  /// The items every subscription yields.
  pub fn items(&self) -> &[T] {
    &self.items
  }
}

impl<T> Flow for VecProducer<T>
where
  T: Clone + Send + Sync + 'static,
{
  type Item = T;

  fn subscribe(&self) -> FlowStream<T> {
    Box::pin(stream::iter(self.items.clone()).map(Ok))
  }
}

/// A cold flow whose subscriptions are built by a closure.
pub struct FnProducer<F> {
  factory: F,
}

impl<F, S, T> FnProducer<F>
where
  F: Fn() -> S + Send + Sync + 'static,
  S: Stream<Item = Result<T, FlowError>> + Send + 'static,
  T: Send + 'static,
{
  /// Creates a producer that calls `factory` once per subscription.
  pub fn new(factory: F) -> Self {
    Self { factory }
  }
}

impl<F, S, T> Flow for FnProducer<F>
where
  F: Fn() -> S + Send + Sync + 'static,
  S: Stream<Item = Result<T, FlowError>> + Send + 'static,
  T: Send + 'static,
{
  type Item = T;

  fn subscribe(&self) -> FlowStream<T> {
    Box::pin((self.factory)())
  }
}

/// Shared cold flow over `items`.
pub fn iter_flow<T>(items: Vec<T>) -> SharedFlow<T>
where
  T: Clone + Send + Sync + 'static,
{
  Arc::new(VecProducer::new(items))
}

/// Shared cold flow built by `factory` for every subscription.
pub fn flow_fn<F, S, T>(factory: F) -> SharedFlow<T>
where
  F: Fn() -> S + Send + Sync + 'static,
  S: Stream<Item = Result<T, FlowError>> + Send + 'static,
  T: Send + 'static,
{
  Arc::new(FnProducer::new(factory))
}
