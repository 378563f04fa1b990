//! # Producer Test Suite
//!
//! Cold producers replay per subscription; the state and replay producers
//! expose their hot-stream capabilities.

use crate::error::FlowError;
use crate::flow::{Flow, HotStream};
use crate::producers::{ReplayProducer, StateProducer, VecProducer, flow_fn, iter_flow};
use futures::{StreamExt, stream};

#[tokio::test]
async fn test_vec_producer_replays_for_every_subscription() {
  let flow = iter_flow(vec![1, 2, 3]);

  let first: Vec<i32> = flow.subscribe().map(|item| item.unwrap()).collect().await;
  let second: Vec<i32> = flow.subscribe().map(|item| item.unwrap()).collect().await;

  assert_eq!(first, vec![1, 2, 3]);
  assert_eq!(second, first);
  assert!(flow.hot_stream().is_none());
}

#[test]
fn test_vec_producer_items() {
  let producer = VecProducer::new(vec!["a", "b"]);

  assert_eq!(producer.items(), &["a", "b"]);
}

#[tokio::test]
async fn test_fn_producer_builds_fresh_streams() {
  let flow = flow_fn(|| stream::iter(vec![Ok::<u8, FlowError>(1), Ok(2)]));

  assert_eq!(flow.subscribe().count().await, 2);
  assert_eq!(flow.subscribe().count().await, 2);
}

#[tokio::test]
async fn test_state_producer_yields_current_then_updates() {
  let state = StateProducer::new(1);
  let mut subscription = state.subscribe();

  assert_eq!(subscription.next().await.unwrap().unwrap(), 1);
  state.set(2);
  assert_eq!(subscription.next().await.unwrap().unwrap(), 2);
  assert_eq!(state.current(), 2);
  assert_eq!(state.subscriber_count(), 1);
}

#[test]
fn test_state_producer_is_a_state_holder() {
  let state = StateProducer::new(42);

  assert_eq!(
    state.hot_stream(),
    Some(HotStream::StateHolder {
      current_value: "42".to_string()
    })
  );
  assert!(state.as_replay_buffered().is_none());
}

#[tokio::test]
async fn test_replay_producer_replays_then_goes_live() {
  let replay = ReplayProducer::new(2);
  replay.emit(1);
  replay.emit(2);
  replay.emit(3);

  let mut subscription = replay.subscribe();
  assert_eq!(subscription.next().await.unwrap().unwrap(), 2);
  assert_eq!(subscription.next().await.unwrap().unwrap(), 3);

  replay.emit(4);
  assert_eq!(subscription.next().await.unwrap().unwrap(), 4);
  assert_eq!(replay.replay_cache(), vec![3, 4]);
}

#[test]
fn test_replay_producer_is_replay_buffered() {
  let replay = ReplayProducer::new(5);
  replay.emit("x");
  replay.emit("y");

  assert_eq!(
    replay.hot_stream(),
    Some(HotStream::ReplayBuffered { buffer_size: 2 })
  );
  assert!(replay.as_state_holder().is_none());
}

#[tokio::test]
async fn test_replay_producer_completes_when_dropped() {
  let replay = ReplayProducer::<i32>::new(0);
  let subscription = replay.subscribe();
  drop(replay);

  assert_eq!(subscription.count().await, 0);
}
