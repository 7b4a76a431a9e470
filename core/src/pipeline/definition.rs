// draftline/src/pipeline/definition.rs

//! Contains the `StagePipeline<TData, Err>` struct definition and its construction.

use crate::core::context::StageHandler;
use crate::core::stage::{Stage, StageTracker};
use crate::error::DraftlineError;
use std::collections::HashMap;

/// Runs a fixed sequence of stages over a shared `ContextData<TData>`.
///
/// Each stage has `on` handlers (the stage's work) and `after` handlers
/// (guards that must pass before the next stage may start). Handlers run
/// one at a time, in registration order.
///
/// `Err` must be `From<DraftlineError>` so engine-level failures (a stage
/// with no handlers) can be reported in the pipeline's own error type.
pub struct StagePipeline<TData, Err>
where
  TData: StageTracker + 'static + Send + Sync,
  Err: std::error::Error + From<DraftlineError> + Send + Sync + 'static,
{
  /// Ordered list of stages for this pipeline.
  pub(crate) stages: Vec<Stage>,

  pub(crate) on: HashMap<Stage, Vec<StageHandler<TData, Err>>>,
  pub(crate) after: HashMap<Stage, Vec<StageHandler<TData, Err>>>,
}

impl<TData, Err> StagePipeline<TData, Err>
where
  TData: StageTracker + 'static + Send + Sync,
  Err: std::error::Error + From<DraftlineError> + Send + Sync + 'static,
{
  /// Creates a pipeline over the given stages, in the given order.
  pub fn new(stages: &[Stage]) -> Self {
    let mut ordered: Vec<Stage> = Vec::with_capacity(stages.len());
    for stage in stages {
      if *stage == Stage::Done {
        panic!("Draftline setup error: '{}' is terminal and cannot be a pipeline stage.", stage);
      }
      if ordered.contains(stage) {
        panic!("Draftline setup error: stage '{}' listed twice.", stage);
      }
      ordered.push(*stage);
    }

    Self {
      stages: ordered,
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// A pipeline over the full `Researching -> Planning -> Analyzing -> Summarizing` sequence.
  pub fn full_sequence() -> Self {
    Self::new(&Stage::SEQUENCE)
  }

  /// Panics if the stage is not part of this pipeline.
  /// Registering a handler for a missing stage is a setup bug, not a run-time error.
  pub(crate) fn ensure_stage_exists(&self, stage: Stage) {
    if !self.stages.contains(&stage) {
      panic!("Draftline setup error: stage '{}' not found in pipeline definition.", stage);
    }
  }
}
