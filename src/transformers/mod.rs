//! # Transformers
//!
//! Flow decorators. The trace transformer is the only one: it reports the
//! lifecycle of every subscription without altering values or termination.

pub mod trace_session;
pub mod trace_transformer;

pub use trace_session::{DROPPED_REASON, TraceOptions, TraceSession};
pub use trace_transformer::{FlowTraceExt, TracedFlow, trace, trace_with, trace_with_options};
