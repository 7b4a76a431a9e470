// draftline/src/orchestrator.rs

//! The `Orchestrator`: runs research, planning, per-item analysis, and report
//! assembly as a four-stage `StagePipeline` over one `PipelineState`.

use crate::config::PipelineConfig;
use crate::core::context_data::ContextData;
use crate::core::stage::Stage;
use crate::error::{DraftlineError, DraftlineResult};
use crate::gather::{dispatch_and_gather, merge_outputs, GatherSettings};
use crate::generation::{GenerationService, StructuredGenerator};
use crate::model::{Message, Plan, PipelineState};
use crate::pipeline::StagePipeline;
use crate::prompt::PromptTemplate;
use crate::research::Researcher;
use crate::summary::assemble_report;
use crate::worker::{ItemWorker, WorkerInput};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Sequences the four stages of a run and owns the run's collaborators.
///
/// Configuration is fixed at construction. Each run takes its own snapshot
/// of it, so the gather mode is decided once per run.
pub struct Orchestrator {
  config: PipelineConfig,
  researcher: Arc<dyn Researcher>,
  generator: StructuredGenerator,
  worker: Arc<dyn ItemWorker>,
  prompt: PromptTemplate,
}

impl Orchestrator {
  pub fn new(
    config: PipelineConfig,
    researcher: Arc<dyn Researcher>,
    service: Arc<dyn GenerationService>,
    worker: Arc<dyn ItemWorker>,
  ) -> Self {
    Self {
      config,
      researcher,
      generator: StructuredGenerator::new(service),
      worker,
      prompt: PromptTemplate::default(),
    }
  }

  /// Replaces the planner's system prompt template.
  pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
    self.prompt = prompt;
    self
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Runs the whole pipeline for `topic` and returns the final report.
  ///
  /// Either every stage succeeds and the full report is returned, or the
  /// first failure is returned unchanged and no report is produced.
  #[instrument(name = "Orchestrator::run", skip(self), err(Display))]
  pub async fn run(&self, topic: &str, mode: &str) -> DraftlineResult<String> {
    let ctx = ContextData::new(PipelineState::new(topic, mode));
    self.run_state(ctx.clone()).await?;

    let state = ctx.into_inner();
    state
      .final_output
      .ok_or_else(|| DraftlineError::Internal("pipeline finished without a report".to_string()))
  }

  /// Blocking form of [`Orchestrator::run`] for synchronous callers.
  ///
  /// Returns `Internal` without running anything when called from inside a
  /// tokio runtime; await [`Orchestrator::run`] there instead.
  pub fn run_blocking(&self, topic: &str, mode: &str) -> DraftlineResult<String> {
    if tokio::runtime::Handle::try_current().is_ok() {
      return Err(DraftlineError::Internal(
        "run_blocking called from inside an async runtime; await Orchestrator::run instead".to_string(),
      ));
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .enable_all()
      .build()
      .map_err(|source| DraftlineError::Runtime { source })?;
    runtime.block_on(self.run(topic, mode))
  }

  /// Runs all four stages against a caller-supplied state.
  pub async fn run_state(&self, ctx: ContextData<PipelineState>) -> DraftlineResult<()> {
    self.stage_pipeline().run(ctx).await
  }

  /// Research stage on its own. Appends the researcher's messages to the transcript.
  pub async fn research(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    self.snapshot().research(ctx).await
  }

  /// Planning stage on its own. Stores the plan on success.
  pub async fn plan(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    self.snapshot().plan(ctx).await
  }

  /// Analysis stage on its own. Fails with `Precondition` and dispatches
  /// nothing if no plan is present.
  pub async fn analyze(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    self.snapshot().analyze(ctx).await
  }

  /// Summary stage on its own. Stores the report in `final_output`.
  pub async fn summarize(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    self.snapshot().summarize(ctx).await
  }

  fn snapshot(&self) -> Arc<RunStages> {
    let gather = self.config.gather_settings();
    event!(Level::DEBUG, gather = ?gather, queries = self.config.queries_per_section, "Run configuration snapshot.");
    Arc::new(RunStages {
      researcher: Arc::clone(&self.researcher),
      generator: self.generator.clone(),
      worker: Arc::clone(&self.worker),
      prompt: self.prompt.clone(),
      gather,
      queries_per_section: self.config.queries_per_section,
    })
  }

  fn stage_pipeline(&self) -> StagePipeline<PipelineState, DraftlineError> {
    let stages = self.snapshot();
    let mut pipeline = StagePipeline::<PipelineState, DraftlineError>::full_sequence();

    let run = Arc::clone(&stages);
    pipeline.on_stage(Stage::Researching, move |ctx| {
      let run = Arc::clone(&run);
      async move { run.research(&ctx).await }
    });

    let run = Arc::clone(&stages);
    pipeline.on_stage(Stage::Planning, move |ctx| {
      let run = Arc::clone(&run);
      async move { run.plan(&ctx).await }
    });
    pipeline.after_stage(Stage::Planning, |ctx: ContextData<PipelineState>| async move {
      if ctx.read().plan.is_none() {
        return Err(DraftlineError::precondition(Stage::Analyzing, "a plan from the planning stage"));
      }
      Ok(())
    });

    let run = Arc::clone(&stages);
    pipeline.on_stage(Stage::Analyzing, move |ctx| {
      let run = Arc::clone(&run);
      async move { run.analyze(&ctx).await }
    });

    pipeline.on_stage(Stage::Summarizing, move |ctx| {
      let run = Arc::clone(&stages);
      async move { run.summarize(&ctx).await }
    });

    pipeline
  }
}

/// Everything one run needs, captured when the run starts.
struct RunStages {
  researcher: Arc<dyn Researcher>,
  generator: StructuredGenerator,
  worker: Arc<dyn ItemWorker>,
  prompt: PromptTemplate,
  gather: GatherSettings,
  queries_per_section: usize,
}

impl RunStages {
  async fn research(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    let topic = ctx.read().topic.clone();
    let transcript = ctx.map_read(|state| &state.transcript).clone();
    event!(Level::INFO, topic = %topic, queries = self.queries_per_section, "Performing research.");

    let found = self
      .researcher
      .research(&topic, self.queries_per_section, &transcript)
      .await
      .map_err(|source| DraftlineError::Research { source })?;

    let appended = found.len();
    ctx.update(|state| state.transcript.extend(found));
    event!(Level::DEBUG, appended, "Research messages appended to the transcript.");
    Ok(())
  }

  async fn plan(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    let (system_prompt, transcript) = {
      let state = ctx.read();
      (self.prompt.render(&state.topic, &state.mode), state.transcript.clone())
    };
    event!(Level::INFO, "Calling planner.");

    let plan: Plan = self.generator.generate(&system_prompt, &transcript).await?;

    event!(Level::INFO, title = %plan.title, items = plan.items.len(), "Plan created.");
    ctx.update(|state| state.plan = Some(plan));
    Ok(())
  }

  async fn analyze(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    let (plan, topic, transcript) = {
      let state = ctx.read();
      let plan = state
        .plan
        .clone()
        .ok_or_else(|| DraftlineError::precondition(Stage::Analyzing, "a plan from the planning stage"))?;
      let topic: Arc<str> = Arc::from(state.topic.as_str());
      let transcript: Arc<[Message]> = Arc::from(state.transcript.as_slice());
      (plan, topic, transcript)
    };
    event!(Level::INFO, items = plan.items.len(), "Analyzing each item in the plan.");

    let inputs: Vec<WorkerInput> = plan
      .items
      .iter()
      .cloned()
      .enumerate()
      .map(|(index, item)| WorkerInput {
        index,
        item,
        topic: Arc::clone(&topic),
        transcript: Arc::clone(&transcript),
      })
      .collect();

    let outputs = dispatch_and_gather(self.worker.as_ref(), inputs, self.gather).await?;

    let mut merged = plan;
    merge_outputs(&mut merged, outputs)?;
    ctx.update(|state| state.plan = Some(merged));
    Ok(())
  }

  async fn summarize(&self, ctx: &ContextData<PipelineState>) -> DraftlineResult<()> {
    let report = ctx
      .read()
      .plan
      .as_ref()
      .map(assemble_report)
      .ok_or_else(|| DraftlineError::precondition(Stage::Summarizing, "a plan from the planning stage"))?;
    event!(Level::INFO, bytes = report.len(), "Writing final report.");

    ctx.update(|state| state.final_output = Some(report));
    Ok(())
  }
}
