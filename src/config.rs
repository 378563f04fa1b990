//! # Trace Configuration
//!
//! Settings shared by every traced flow: the enabled switch, whether log
//! lines carry the executing thread, and the two sinks.
//!
//! ## Overview
//!
//! [`TraceConfig`] is a cheap, cloneable handle. Clones share state, so a
//! setter called on one clone is seen by every flow traced through any other.
//! A single process-wide instance is available through
//! [`TraceConfig::global`]; tests and embedders that need isolation create
//! their own with [`TraceConfig::new`] and pass it to
//! [`trace_with`](crate::transformers::trace_with).
//!
//! Reads are not synchronized across fields. A change made while flows are
//! running takes effect at each flow's next notification.
//!
//! ## Example
//!
//! ```rust
//! use flowtrace::config::{InitOptions, TraceConfig};
//!
//! let config = TraceConfig::new();
//! config.initialize(InitOptions::default().with_show_context_info(false));
//! assert!(config.is_enabled());
//! assert!(!config.show_context_info());
//!
//! config.reset_to_defaults();
//! assert!(config.show_context_info());
//! ```

use crate::sink::{AnalyticsSink, LogSink, console_log_sink, is_console_log_sink};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL_CONFIG: Lazy<TraceConfig> = Lazy::new(TraceConfig::new);

/// Options accepted by [`TraceConfig::initialize`].
///
/// Flags deserialize from e.g. `{"enabled": false}`; missing fields take
/// their defaults. The logger can only be set in code.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct InitOptions {
  /// Whether flows decorated from now on are traced.
  pub enabled: bool,
  /// Whether log lines carry the executing thread.
  pub show_context_info: bool,
  /// Replacement log sink. `None` keeps the current one.
  #[serde(skip)]
  pub custom_logger: Option<LogSink>,
}

impl Default for InitOptions {
  fn default() -> Self {
    Self {
      enabled: true,
      show_context_info: true,
      custom_logger: None,
    }
  }
}

impl InitOptions {
  /// Sets the enabled flag.
  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  /// Sets the context-info flag.
  pub fn with_show_context_info(mut self, show: bool) -> Self {
    self.show_context_info = show;
    self
  }

  /// Replaces the log sink.
  pub fn with_logger(mut self, logger: LogSink) -> Self {
    self.custom_logger = Some(logger);
    self
  }
}

impl fmt::Debug for InitOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InitOptions")
      .field("enabled", &self.enabled)
      .field("show_context_info", &self.show_context_info)
      .field("custom_logger", &self.custom_logger.is_some())
      .finish()
  }
}

struct ConfigState {
  enabled: AtomicBool,
  show_context_info: AtomicBool,
  log_sink: RwLock<LogSink>,
  analytics_sink: RwLock<Option<AnalyticsSink>>,
}

/// Shared trace settings.
#[derive(Clone)]
pub struct TraceConfig {
  inner: Arc<ConfigState>,
}

impl TraceConfig {
  /// Creates an independent configuration with default settings.
  pub fn new() -> Self {
    Self {
      inner: Arc::new(ConfigState {
        enabled: AtomicBool::new(true),
        show_context_info: AtomicBool::new(true),
        log_sink: RwLock::new(console_log_sink()),
        analytics_sink: RwLock::new(None),
      }),
    }
  }

  /// The process-wide configuration.
  pub fn global() -> TraceConfig {
    GLOBAL_CONFIG.clone()
  }

  /// Applies `options`. Calling it twice with the same options is harmless.
  pub fn initialize(&self, options: InitOptions) {
    self.set_enabled(options.enabled);
    self.set_show_context_info(options.show_context_info);
    if let Some(logger) = options.custom_logger {
      self.set_log_sink(logger);
    }
  }

  /// Restores every setting to its default.
  pub fn reset_to_defaults(&self) {
    self.set_enabled(true);
    self.set_show_context_info(true);
    self.set_log_sink(console_log_sink());
    self.clear_analytics_sink();
  }

  /// Whether tracing is enabled.
  pub fn is_enabled(&self) -> bool {
    self.inner.enabled.load(Ordering::Relaxed)
  }

  /// Sets the enabled flag.
  pub fn set_enabled(&self, enabled: bool) {
    self.inner.enabled.store(enabled, Ordering::Relaxed);
  }

  /// Whether log lines carry the executing thread.
  pub fn show_context_info(&self) -> bool {
    self.inner.show_context_info.load(Ordering::Relaxed)
  }

  /// Sets the context-info flag.
  pub fn set_show_context_info(&self, show: bool) {
    self.inner.show_context_info.store(show, Ordering::Relaxed);
  }

  /// The current log sink.
  pub fn log_sink(&self) -> LogSink {
    self
      .inner
      .log_sink
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Returns `true` while the default console sink is installed.
  pub fn has_default_log_sink(&self) -> bool {
    is_console_log_sink(&self.log_sink())
  }

  /// Replaces the log sink.
  pub fn set_log_sink(&self, sink: LogSink) {
    *self
      .inner
      .log_sink
      .write()
      .unwrap_or_else(PoisonError::into_inner) = sink;
  }

  /// The current analytics sink, if any.
  pub fn analytics_sink(&self) -> Option<AnalyticsSink> {
    self
      .inner
      .analytics_sink
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Installs an analytics sink.
  pub fn set_analytics_sink(&self, sink: AnalyticsSink) {
    *self
      .inner
      .analytics_sink
      .write()
      .unwrap_or_else(PoisonError::into_inner) = Some(sink);
  }

  /// Removes the analytics sink. Analytics events are then skipped.
  pub fn clear_analytics_sink(&self) {
    *self
      .inner
      .analytics_sink
      .write()
      .unwrap_or_else(PoisonError::into_inner) = None;
  }

  /// Returns `true` if both handles share the same settings.
  pub fn same_as(&self, other: &TraceConfig) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Default for TraceConfig {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for TraceConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TraceConfig")
      .field("enabled", &self.is_enabled())
      .field("show_context_info", &self.show_context_info())
      .field("analytics_sink", &self.analytics_sink().is_some())
      .finish()
  }
}

/// Applies `options` to the global configuration.
pub fn initialize(options: InitOptions) {
  GLOBAL_CONFIG.initialize(options);
}

/// Resets the global configuration to its defaults.
pub fn reset_to_defaults() {
  GLOBAL_CONFIG.reset_to_defaults();
}
