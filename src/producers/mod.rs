//! # Producers
//!
//! Source adapters implementing [`Flow`](crate::flow::Flow) over existing
//! tokio and futures building blocks.
//!
//! - **[`VecProducer`]** / **[`iter_flow`]**: cold flow over a `Vec`
//! - **[`FnProducer`]** / **[`flow_fn`]**: cold flow built by a closure per subscription
//! - **[`StateProducer`]**: state holder over `tokio::sync::watch`
//! - **[`ReplayProducer`]**: replay-buffered multicast over `tokio::sync::broadcast`

pub mod replay_producer;
pub mod state_producer;
pub mod vec_producer;

pub use replay_producer::ReplayProducer;
pub use state_producer::StateProducer;
pub use vec_producer::{FnProducer, VecProducer, flow_fn, iter_flow};
