//! # Consumers
//!
//! Ways to run a traced flow without consuming its values yourself.

pub mod watch_consumer;

pub use watch_consumer::{WatchHandle, watch_in, watch_in_with};
