// demos/draft_agent/src/main.rs

mod config;
mod errors;
mod prompts;
mod services;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use crate::services::{ChatAnalyst, ChatClient, ChatGenerationService, ChatResearcher};

use clap::Parser;
use draftline::{Orchestrator, PipelineConfig, PromptTemplate};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Researches a fantasy draft topic, plans picks, analyzes each pick, and prints the report.
#[derive(Parser, Debug)]
#[command(name = "draft_agent", version)]
struct Args {
  /// What the report should cover
  #[arg(default_value = "Round 4 Wide Receivers")]
  topic: String,

  /// League scoring format passed to the planner
  #[arg(short, long, default_value = "PPR")]
  mode: String,

  /// Analyze picks one at a time with a pause after each (overrides THROTTLE_LLM_CALLS)
  #[arg(long)]
  throttle: bool,

  /// Research queries to run before planning (overrides DRAFTLINE_QUERIES_PER_SECTION)
  #[arg(long)]
  queries: Option<usize>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  let args = Args::parse();
  let app_config = AppConfig::from_env()?;

  let mut pipeline_config = PipelineConfig::from_env()?;
  if args.throttle {
    pipeline_config = pipeline_config.with_throttle(true);
  }
  if let Some(queries) = args.queries {
    pipeline_config = pipeline_config.with_queries_per_section(queries);
  }

  let client = Arc::new(ChatClient::new(&app_config)?);
  let orchestrator = Orchestrator::new(
    pipeline_config,
    Arc::new(ChatResearcher::new(Arc::clone(&client))),
    Arc::new(ChatGenerationService::new(Arc::clone(&client))),
    Arc::new(ChatAnalyst::new(client)),
  )
  .with_prompt(PromptTemplate::new(prompts::PLANNER_PROMPT));

  tracing::info!(topic = %args.topic, mode = %args.mode, "Starting draft run.");
  let report = match orchestrator.run(&args.topic, &args.mode).await {
    Ok(report) => report,
    Err(e) => {
      tracing::error!(error = %e, "Draft run failed.");
      return Err(e.into());
    }
  };

  println!("\n=== Draft Report ===\n");
  println!("{}", report);
  Ok(())
}
