// draftline/src/pipeline/hooks.rs

//! Contains methods for registering `on` handlers and `after` guards for stages.

use tracing::{event, Level};

use crate::core::context::boxed_handler;
use crate::core::context_data::ContextData;
use crate::core::stage::{Stage, StageTracker};
use crate::error::DraftlineError;
use crate::pipeline::definition::StagePipeline;
use std::future::Future;

impl<TData, Err> StagePipeline<TData, Err>
where
  TData: StageTracker + 'static + Send + Sync,
  Err: std::error::Error + From<DraftlineError> + Send + Sync + 'static,
{
  /// Registers a handler doing the work of `stage`.
  ///
  /// `handler_fn` takes `ContextData<TData>` and returns a `Future` resolving to
  /// `Result<(), UserErr>`, where `UserErr` converts into the pipeline's `Err`.
  pub fn on_stage<F, UserErr>(&mut self, stage: Stage, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_stage_exists(stage);
    self.on.entry(stage).or_default().push(boxed_handler(handler_fn));
    event!(Level::TRACE, %stage, "'on' handler registered.");
  }

  /// Registers a guard that runs after the `on` handlers of `stage` and must
  /// succeed before the next stage starts.
  pub fn after_stage<F, UserErr>(&mut self, stage: Stage, guard_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_stage_exists(stage);
    self.after.entry(stage).or_default().push(boxed_handler(guard_fn));
    event!(Level::TRACE, %stage, "'after' guard registered.");
  }
}
