//! # Error Handling
//!
//! Termination types for traced flows. A flow ends in exactly one of three
//! ways: it completes, it fails with a domain error, or it is cancelled.
//! Cancellation travels through the same error channel as failures (a source
//! yields `Err(FlowError::Cancelled(..))`), but it is a distinct variant and
//! is never reported as a failure.
//!
//! ## Core Types
//!
//! - **FlowError**: the error a [`Flow`](crate::flow::Flow) yields to end a subscription abnormally
//! - **FailedError**: a domain failure, carrying message, kind name and the original error
//! - **CancellationError**: a cancellation signal with an optional reason
//! - **Outcome**: the terminal sum type, decided once when a termination is observed
//!
//! ## Example
//!
//! ```rust
//! use flowtrace::error::{FlowError, Outcome};
//!
//! let err = FlowError::failed(std::io::Error::other("disk full"));
//! assert_eq!(err.message(), "disk full");
//!
//! match Outcome::classify(Some(&FlowError::cancelled("shutdown"))) {
//!   Outcome::Cancelled(reason) => assert_eq!(reason.as_deref(), Some("shutdown")),
//!   other => panic!("unexpected outcome {other:?}"),
//! }
//! ```

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error yielded by a flow subscription to terminate it abnormally.
///
/// Cloning is cheap: the wrapped source error is shared, so a cloned
/// `FlowError` still refers to the same underlying error value.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
  /// The subscription was cancelled. Not a domain error.
  #[error(transparent)]
  Cancelled(#[from] CancellationError),
  /// The source failed with a domain error.
  #[error(transparent)]
  Failed(#[from] FailedError),
}

impl FlowError {
  /// Wraps a domain error, recording its display message and concrete type name.
  ///
  /// A cancellation handed in here stays a cancellation: a
  /// [`CancellationError`] or an existing `FlowError` is not rewrapped.
  pub fn failed<E>(error: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    let any: &dyn Any = &error;
    if let Some(cancellation) = any.downcast_ref::<CancellationError>() {
      return FlowError::Cancelled(cancellation.clone());
    }
    if let Some(existing) = any.downcast_ref::<FlowError>() {
      return existing.clone();
    }
    if let Some(failed) = any.downcast_ref::<FailedError>() {
      return FlowError::Failed(failed.clone());
    }
    FlowError::Failed(FailedError::new(error))
  }

  /// Creates a cancellation carrying `reason`.
  pub fn cancelled(reason: impl Into<String>) -> Self {
    FlowError::Cancelled(CancellationError {
      reason: Some(reason.into()),
    })
  }

  /// Creates a cancellation without a reason.
  pub fn cancelled_silently() -> Self {
    FlowError::Cancelled(CancellationError { reason: None })
  }

  /// Returns `true` if this error represents cancellation.
  pub fn is_cancellation(&self) -> bool {
    match self {
      FlowError::Cancelled(_) => true,
      FlowError::Failed(f) => f.inner().is::<CancellationError>(),
    }
  }

  /// Human-readable message (the failure message, or the cancellation reason).
  pub fn message(&self) -> String {
    match self {
      FlowError::Cancelled(c) => c.reason.clone().unwrap_or_default(),
      FlowError::Failed(f) => f.message.clone(),
    }
  }
}

/// A cancellation signal. Carries an optional reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellationError {
  /// Why the subscription was cancelled, if known.
  pub reason: Option<String>,
}

impl fmt::Display for CancellationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.reason {
      Some(reason) => write!(f, "flow cancelled: {}", reason),
      None => write!(f, "flow cancelled"),
    }
  }
}

impl Error for CancellationError {}

/// A domain failure raised by a source.
#[derive(Clone)]
pub struct FailedError {
  /// The original error's display message.
  pub message: String,
  /// Type name of the original error.
  pub kind: String,
  original: Arc<dyn Error + Send + Sync>,
}

impl FailedError {
  /// Wraps `error`, capturing its message and type name.
  pub fn new<E>(error: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    Self {
      message: error.to_string(),
      kind: std::any::type_name::<E>().to_string(),
      original: Arc::new(error),
    }
  }

  /// The original error.
  pub fn inner(&self) -> &Arc<dyn Error + Send + Sync> {
    &self.original
  }

  /// Returns `true` if both values wrap the very same original error.
  pub fn same_source(&self, other: &FailedError) -> bool {
    Arc::ptr_eq(&self.original, &other.original)
  }
}

impl fmt::Debug for FailedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FailedError")
      .field("message", &self.message)
      .field("kind", &self.kind)
      .finish()
  }
}

impl fmt::Display for FailedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl Error for FailedError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(self.original.as_ref())
  }
}

/// How a traced subscription ended.
#[derive(Debug, Clone)]
pub enum Outcome {
  /// The source finished normally.
  Completed,
  /// The source failed with a domain error.
  Failed(FailedError),
  /// The subscription was cancelled, upstream or by the consumer.
  Cancelled(Option<String>),
}

impl Outcome {
  /// Classifies a termination. `None` means the source ended normally.
  pub fn classify(error: Option<&FlowError>) -> Self {
    match error {
      None => Outcome::Completed,
      Some(FlowError::Cancelled(c)) => Outcome::Cancelled(c.reason.clone()),
      Some(FlowError::Failed(f)) => match f.inner().downcast_ref::<CancellationError>() {
        Some(c) => Outcome::Cancelled(c.reason.clone()),
        None => Outcome::Failed(f.clone()),
      },
    }
  }
}
