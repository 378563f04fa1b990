//! End-to-end scenarios against the process-wide configuration.

use flowtrace::error::FlowError;
use flowtrace::flow::{Flow, SharedFlow};
use flowtrace::producers::{ReplayProducer, StateProducer, flow_fn, iter_flow};
use flowtrace::sink::{AnalyticsParams, analytics_sink, log_sink};
use flowtrace::{
  FlowTraceExt, InitOptions, TraceConfig, TraceOptions, initialize, reset_to_defaults, trace,
  trace_with_options, watch_in,
};
use futures::{StreamExt, stream};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

static GLOBAL: AsyncMutex<()> = AsyncMutex::const_new(());

#[derive(Clone, Default)]
struct Captured {
  lines: Arc<Mutex<Vec<String>>>,
  events: Arc<Mutex<Vec<(String, AnalyticsParams)>>>,
}

impl Captured {
  fn markers(&self) -> Vec<String> {
    self
      .lines
      .lock()
      .unwrap()
      .iter()
      .map(|line| line.split_whitespace().next().unwrap().to_string())
      .collect()
  }

  fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().clone()
  }

  fn event_names(&self) -> Vec<String> {
    self
      .events
      .lock()
      .unwrap()
      .iter()
      .map(|(name, _)| name.clone())
      .collect()
  }
}

/// Takes the global lock and points the global sinks at a fresh capture.
async fn capture_global() -> (MutexGuard<'static, ()>, Captured) {
  let guard = GLOBAL.lock().await;
  let _ = tracing_subscriber::fmt().with_test_writer().try_init();
  reset_to_defaults();
  let captured = Captured::default();
  let lines = Arc::clone(&captured.lines);
  initialize(
    InitOptions::default()
      .with_show_context_info(false)
      .with_logger(log_sink(move |_, message| {
        lines.lock().unwrap().push(message.to_string())
      })),
  );
  let events = Arc::clone(&captured.events);
  TraceConfig::global().set_analytics_sink(analytics_sink(move |name, params| {
    events
      .lock()
      .unwrap()
      .push((name.to_string(), params.clone()))
  }));
  (guard, captured)
}

#[derive(Debug)]
struct Rejected(&'static str);

impl std::fmt::Display for Rejected {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "rejected: {}", self.0)
  }
}

impl std::error::Error for Rejected {}

#[tokio::test]
async fn collecting_three_values() {
  let (_guard, captured) = capture_global().await;

  let values: Vec<i32> = trace(iter_flow(vec![1, 2, 3]), "T")
    .subscribe()
    .map(|item| item.unwrap())
    .collect()
    .await;

  assert_eq!(values, vec![1, 2, 3]);
  assert_eq!(
    captured.markers(),
    vec!["START", "EMIT", "EMIT", "EMIT", "COMPLETE"]
  );
  assert_eq!(
    captured.event_names(),
    vec!["flow_trace_start", "flow_trace_complete"]
  );
  reset_to_defaults();
}

#[tokio::test]
async fn reporting_every_emission() {
  let (_guard, captured) = capture_global().await;

  let flow = trace_with_options(
    iter_flow(vec![1, 2, 3]),
    "T",
    TraceOptions::default().with_report_emissions(true),
  );
  let _: Vec<_> = flow.subscribe().collect().await;

  assert_eq!(
    captured.event_names(),
    vec![
      "flow_trace_start",
      "flow_trace_emit",
      "flow_trace_emit",
      "flow_trace_emit",
      "flow_trace_complete"
    ]
  );
  reset_to_defaults();
}

#[tokio::test]
async fn state_holder_reports_current_value() {
  let (_guard, captured) = capture_global().await;
  let source: SharedFlow<i32> = Arc::new(StateProducer::new(42));

  let mut subscription = source.traced("state").subscribe();
  assert_eq!(subscription.next().await.unwrap().unwrap(), 42);
  drop(subscription);

  let lines = captured.lines();
  assert!(lines[1].starts_with("HOT_STREAM"));
  assert!(lines[1].contains("42"));
  assert_eq!(captured.markers(), vec!["START", "HOT_STREAM", "EMIT", "CANCELLED"]);
  reset_to_defaults();
}

#[tokio::test]
async fn replay_buffer_reports_size() {
  let (_guard, captured) = capture_global().await;
  let replay = Arc::new(ReplayProducer::new(8));
  replay.emit(10);
  replay.emit(20);
  let source: SharedFlow<i32> = replay.clone();

  let values: Vec<i32> = trace(source, "replay")
    .subscribe()
    .take(2)
    .map(|item| item.unwrap())
    .collect()
    .await;

  assert_eq!(values, vec![10, 20]);
  assert!(captured.lines()[1].contains("replay buffer size: 2"));
  reset_to_defaults();
}

#[tokio::test]
async fn failing_stream_is_logged_and_reraised() {
  let (_guard, captured) = capture_global().await;
  let source = flow_fn(|| {
    stream::iter(vec![
      Ok(1),
      Err(FlowError::failed(Rejected("bad input"))),
    ])
  });

  let items: Vec<Result<i32, FlowError>> = trace(source, "T").subscribe().collect().await;

  assert_eq!(items.len(), 2);
  match &items[1] {
    Err(FlowError::Failed(failed)) => {
      assert_eq!(failed.message, "rejected: bad input");
      assert!(failed.kind.ends_with("Rejected"));
    }
    other => panic!("unexpected {other:?}"),
  }
  assert_eq!(captured.markers(), vec!["START", "EMIT", "ERROR"]);
  let error_line = &captured.lines()[2];
  assert!(error_line.contains("rejected: bad input"));
  assert!(error_line.contains("Rejected"));
  assert!(!captured.markers().contains(&"COMPLETE".to_string()));
  reset_to_defaults();
}

#[tokio::test]
async fn cancellation_through_the_error_channel() {
  let (_guard, captured) = capture_global().await;
  let source = flow_fn(|| stream::iter(vec![Err::<i32, _>(FlowError::cancelled("timeout"))]));

  let items: Vec<_> = trace(source, "T").subscribe().collect().await;

  assert!(items[0].as_ref().unwrap_err().is_cancellation());
  assert_eq!(captured.markers(), vec!["START", "CANCELLED"]);
  assert_eq!(
    captured.event_names(),
    vec!["flow_trace_start", "flow_trace_cancel"]
  );
  reset_to_defaults();
}

#[tokio::test]
async fn disabled_decoration_is_a_no_op() {
  let (_guard, captured) = capture_global().await;
  initialize(InitOptions::default().with_enabled(false));
  let source = iter_flow(vec![1, 2, 3]);

  let decorated = trace(Arc::clone(&source), "T");
  let _: Vec<_> = decorated.subscribe().collect().await;

  assert!(Arc::ptr_eq(&source, &decorated));
  assert!(captured.lines().is_empty());
  assert!(captured.event_names().is_empty());
  reset_to_defaults();
}

#[tokio::test]
async fn watch_in_cancels_through_handle() {
  let (_guard, captured) = capture_global().await;
  let source: SharedFlow<&'static str> = Arc::new(StateProducer::new("ready"));

  let handle = watch_in(source, &tokio::runtime::Handle::current(), "watch");
  tokio::time::sleep(std::time::Duration::from_millis(20)).await;
  handle.cancel_and_join().await;

  let markers = captured.markers();
  assert_eq!(markers.first().map(String::as_str), Some("START"));
  assert_eq!(markers.last().map(String::as_str), Some("CANCELLED"));
  reset_to_defaults();
}

#[tokio::test]
async fn reset_restores_defaults() {
  let (_guard, _captured) = capture_global().await;

  reset_to_defaults();

  let global = TraceConfig::global();
  assert!(global.is_enabled());
  assert!(global.show_context_info());
  assert!(global.has_default_log_sink());
  assert!(global.analytics_sink().is_none());
}
