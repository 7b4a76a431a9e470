// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use draftline::{
  GenerationService, ItemWorker, Message, Orchestrator, PipelineConfig, Researcher, WorkerInput, WorkerOutput,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Level;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Plan helpers ---
pub fn plan_json(title: &str, names: &[&str]) -> Value {
  json!({
    "title": title,
    "items": names.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
  })
}

pub fn item_names(count: usize) -> Vec<String> {
  (0..count).map(|i| format!("item-{}", i)).collect()
}

// --- Generation service driven by a script of responses ---
pub struct ScriptedService {
  responses: Mutex<VecDeque<Option<Value>>>,
  pub calls: AtomicUsize,
  pub last_messages: Mutex<Vec<Message>>,
}

impl ScriptedService {
  /// Answers with `responses` in order, then with `None` forever.
  pub fn new(responses: Vec<Option<Value>>) -> Self {
    Self {
      responses: Mutex::new(responses.into()),
      calls: AtomicUsize::new(0),
      last_messages: Mutex::new(Vec::new()),
    }
  }

  pub fn returning(value: Value) -> Self {
    Self::new(vec![Some(value)])
  }

  pub fn always_absent() -> Self {
    Self::new(Vec::new())
  }

  pub fn absent_then(absent_count: usize, value: Value) -> Self {
    let mut responses = vec![None; absent_count];
    responses.push(Some(value));
    Self::new(responses)
  }

  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl GenerationService for ScriptedService {
  async fn invoke(&self, messages: &[Message]) -> anyhow::Result<Option<Value>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last_messages.lock() = messages.to_vec();
    Ok(self.responses.lock().pop_front().flatten())
  }
}

/// A service whose transport always fails.
pub struct UnreachableService {
  pub calls: AtomicUsize,
}

impl UnreachableService {
  pub fn new() -> Self {
    Self { calls: AtomicUsize::new(0) }
  }
}

#[async_trait]
impl GenerationService for UnreachableService {
  async fn invoke(&self, _messages: &[Message]) -> anyhow::Result<Option<Value>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    anyhow::bail!("connection refused")
  }
}

// --- Researcher returning a fixed number of findings ---
pub struct StaticResearcher {
  findings: usize,
  fail: bool,
  pub calls: AtomicUsize,
  pub seen_query_count: AtomicUsize,
  pub seen_transcript_len: AtomicUsize,
}

impl StaticResearcher {
  pub fn new(findings: usize) -> Self {
    Self {
      findings,
      fail: false,
      calls: AtomicUsize::new(0),
      seen_query_count: AtomicUsize::new(0),
      seen_transcript_len: AtomicUsize::new(0),
    }
  }

  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::new(0)
    }
  }
}

#[async_trait]
impl Researcher for StaticResearcher {
  async fn research(&self, topic: &str, query_count: usize, transcript: &[Message]) -> anyhow::Result<Vec<Message>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.seen_query_count.store(query_count, Ordering::SeqCst);
    self.seen_transcript_len.store(transcript.len(), Ordering::SeqCst);
    if self.fail {
      anyhow::bail!("search backend unavailable");
    }
    Ok(
      (0..self.findings)
        .map(|i| Message::assistant(format!("Finding {} on {}", i + 1, topic)))
        .collect(),
    )
  }
}

// --- Item worker with per-item latency and failures ---
#[derive(Debug, Clone, Copy)]
pub struct WorkerEvent {
  pub index: usize,
  pub started: Instant,
  pub finished: Instant,
}

pub struct ScriptedWorker {
  delays: HashMap<String, Duration>,
  default_delay: Duration,
  failures: HashSet<String>,
  misindexed: HashSet<String>,
  pub dispatched: AtomicUsize,
  pub completed: AtomicUsize,
  in_flight: AtomicUsize,
  pub max_in_flight: AtomicUsize,
  pub events: Mutex<Vec<WorkerEvent>>,
}

impl ScriptedWorker {
  pub fn new() -> Self {
    Self {
      delays: HashMap::new(),
      default_delay: Duration::ZERO,
      failures: HashSet::new(),
      misindexed: HashSet::new(),
      dispatched: AtomicUsize::new(0),
      completed: AtomicUsize::new(0),
      in_flight: AtomicUsize::new(0),
      max_in_flight: AtomicUsize::new(0),
      events: Mutex::new(Vec::new()),
    }
  }

  pub fn with_default_delay(mut self, delay: Duration) -> Self {
    self.default_delay = delay;
    self
  }

  pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
    self.delays.insert(name.to_string(), delay);
    self
  }

  pub fn failing_on(mut self, name: &str) -> Self {
    self.failures.insert(name.to_string());
    self
  }

  /// The named item completes but echoes an index seven past its own.
  pub fn misindexing(mut self, name: &str) -> Self {
    self.misindexed.insert(name.to_string());
    self
  }

  pub fn dispatch_count(&self) -> usize {
    self.dispatched.load(Ordering::SeqCst)
  }

  pub fn completed_count(&self) -> usize {
    self.completed.load(Ordering::SeqCst)
  }

  /// Indices in the order their invocations finished.
  pub fn completion_order(&self) -> Vec<usize> {
    self.events.lock().iter().map(|e| e.index).collect()
  }
}

#[async_trait]
impl ItemWorker for ScriptedWorker {
  async fn analyze(&self, input: WorkerInput) -> anyhow::Result<WorkerOutput> {
    self.dispatched.fetch_add(1, Ordering::SeqCst);
    let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
    let started = Instant::now();

    let name = input.item.name.clone();
    let delay = self.delays.get(&name).copied().unwrap_or(self.default_delay);
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }

    self.in_flight.fetch_sub(1, Ordering::SeqCst);
    self.events.lock().push(WorkerEvent {
      index: input.index,
      started,
      finished: Instant::now(),
    });

    if self.failures.contains(&name) {
      anyhow::bail!("analysis of {} failed", name);
    }
    self.completed.fetch_add(1, Ordering::SeqCst);
    let mut output = input.complete(format!("{}-analysis", name));
    if self.misindexed.contains(&name) {
      output.index += 7;
    }
    Ok(output)
  }
}

/// Echoes an index one past the one it was given.
pub struct OffByOneWorker;

#[async_trait]
impl ItemWorker for OffByOneWorker {
  async fn analyze(&self, input: WorkerInput) -> anyhow::Result<WorkerOutput> {
    let mut output = input.complete("shifted");
    output.index += 1;
    Ok(output)
  }
}

// --- Orchestrator assembly ---
pub struct Harness {
  pub researcher: Arc<StaticResearcher>,
  pub service: Arc<ScriptedService>,
  pub worker: Arc<ScriptedWorker>,
  pub orchestrator: Orchestrator,
}

impl Harness {
  pub fn new(config: PipelineConfig, service: ScriptedService, worker: ScriptedWorker) -> Self {
    Self::with_researcher(config, StaticResearcher::new(2), service, worker)
  }

  pub fn with_researcher(
    config: PipelineConfig,
    researcher: StaticResearcher,
    service: ScriptedService,
    worker: ScriptedWorker,
  ) -> Self {
    let researcher = Arc::new(researcher);
    let service = Arc::new(service);
    let worker = Arc::new(worker);
    let orchestrator = Orchestrator::new(config, researcher.clone(), service.clone(), worker.clone());
    Self {
      researcher,
      service,
      worker,
      orchestrator,
    }
  }
}
