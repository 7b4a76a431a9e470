// draftline/examples/offline_run.rs

//! Runs the full pipeline against canned collaborators, no network needed.

use async_trait::async_trait;
use draftline::{
  DraftlineError, GenerationService, ItemWorker, Message, Orchestrator, PipelineConfig, Researcher, WorkerInput,
  WorkerOutput,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

// 1. A researcher that returns a couple of fixed notes.
struct CannedResearcher;

#[async_trait]
impl Researcher for CannedResearcher {
  async fn research(&self, topic: &str, query_count: usize, _transcript: &[Message]) -> anyhow::Result<Vec<Message>> {
    Ok(
      (1..=query_count.min(2))
        .map(|i| Message::assistant(format!("Note {} about {}", i, topic)))
        .collect(),
    )
  }
}

// 2. A planner that answers with nothing once, then with a real plan.
//    The first answer exercises the retry loop.
#[derive(Default)]
struct CannedPlanner {
  calls: parking_lot::Mutex<usize>,
}

#[async_trait]
impl GenerationService for CannedPlanner {
  async fn invoke(&self, _messages: &[Message]) -> anyhow::Result<Option<Value>> {
    let mut calls = self.calls.lock();
    *calls += 1;
    if *calls == 1 {
      return Ok(None);
    }
    Ok(Some(json!({
      "title": "Round 4 Wide Receivers",
      "items": [
        { "name": "Receiver A", "rank": 1 },
        { "name": "Receiver B", "rank": 2 },
        { "name": "Receiver C", "rank": 3 }
      ]
    })))
  }
}

// 3. A worker that writes a one-line analysis per item.
struct CannedAnalyst;

#[async_trait]
impl ItemWorker for CannedAnalyst {
  async fn analyze(&self, input: WorkerInput) -> anyhow::Result<WorkerOutput> {
    let content = format!(
      "## {}\n\nSolid pick for {} ({} research notes considered).",
      input.item.name,
      input.topic,
      input.transcript.len()
    );
    Ok(input.complete(content))
  }
}

#[tokio::main]
async fn main() -> Result<(), DraftlineError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Offline Run Example ---");

  // THROTTLE_LLM_CALLS and friends are honoured if set; otherwise defaults apply.
  let config = PipelineConfig::from_env()?.with_queries_per_section(2);

  let orchestrator = Orchestrator::new(
    config,
    Arc::new(CannedResearcher),
    Arc::new(CannedPlanner::default()),
    Arc::new(CannedAnalyst),
  );

  let report = orchestrator.run("Round 4 Wide Receivers", "PPR").await?;

  info!("Pipeline completed.");
  println!("{}", report);
  Ok(())
}
