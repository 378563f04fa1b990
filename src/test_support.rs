//! Recording sinks shared by the unit tests.

use crate::config::TraceConfig;
use crate::sink::{AnalyticsParams, analytics_sink, log_sink};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub(crate) struct Recorder {
  lines: Arc<Mutex<Vec<(String, String)>>>,
  events: Arc<Mutex<Vec<(String, AnalyticsParams)>>>,
}

impl Recorder {
  /// A fresh config wired to a fresh recorder, without thread annotations.
  pub(crate) fn config() -> (TraceConfig, Recorder) {
    let config = TraceConfig::new();
    config.set_show_context_info(false);
    let recorder = Recorder::default();
    recorder.install(&config);
    (config, recorder)
  }

  pub(crate) fn install(&self, config: &TraceConfig) {
    let lines = Arc::clone(&self.lines);
    config.set_log_sink(log_sink(move |tag, message| {
      lines
        .lock()
        .unwrap()
        .push((tag.to_string(), message.to_string()));
    }));
    let events = Arc::clone(&self.events);
    config.set_analytics_sink(analytics_sink(move |event, params| {
      events
        .lock()
        .unwrap()
        .push((event.to_string(), params.clone()));
    }));
  }

  /// Pushes a marker line, for ordering checks against trace output.
  pub(crate) fn mark(&self, message: &str) {
    self
      .lines
      .lock()
      .unwrap()
      .push(("marker".to_string(), message.to_string()));
  }

  pub(crate) fn tags(&self) -> Vec<String> {
    self.lines.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
  }

  pub(crate) fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
  }

  pub(crate) fn markers(&self) -> Vec<String> {
    self
      .lines()
      .iter()
      .map(|line| line.split_whitespace().next().unwrap_or_default().to_string())
      .collect()
  }

  pub(crate) fn events(&self) -> Vec<(String, AnalyticsParams)> {
    self.events.lock().unwrap().clone()
  }

  pub(crate) fn event_names(&self) -> Vec<String> {
    self.events().into_iter().map(|(name, _)| name).collect()
  }
}

/// Parses the `+<n>ms` segment of a rendered line.
pub(crate) fn elapsed_of(line: &str) -> Option<u64> {
  let start = line.find(" +")? + 2;
  let end = start + line[start..].find("ms")?;
  line[start..end].parse().ok()
}
