// draftline/src/pipeline/execution.rs

//! Contains `StagePipeline::run()`, which executes the stages in order and
//! commits each stage transition on the shared context.

use crate::core::context::StageHandler;
use crate::core::context_data::ContextData;
use crate::core::stage::{Stage, StageTracker};
use crate::error::DraftlineError;
use crate::pipeline::definition::StagePipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> StagePipeline<TData, Err>
where
  TData: StageTracker + 'static + Send + Sync,
  Err: std::error::Error + From<DraftlineError> + Send + Sync + 'static,
{
  /// Executes every stage against the shared context `ctx_data`.
  ///
  /// The active stage is committed on the context before its handlers run.
  /// The first handler or guard error aborts the run and is returned as is;
  /// the context is left on the failed stage. After the last stage succeeds
  /// the context moves to `Stage::Done`.
  #[instrument(
        name = "StagePipeline::run",
        skip_all,
        fields(
            pipeline_data_type = %std::any::type_name::<TData>(),
            num_stages = self.stages.len(),
        ),
        err(Display)
    )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<(), Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (stage_idx, stage) in self.stages.iter().copied().enumerate() {
      let stage_span = span!(Level::INFO, "pipeline_stage", %stage, stage_index = stage_idx);

      async {
        let previous = ctx_data.update(|data| {
          let previous = data.current_stage();
          data.enter_stage(stage);
          previous
        });
        event!(Level::DEBUG, from = %previous, "Stage entered.");

        let on_handlers = self.on.get(&stage).filter(|v| !v.is_empty()).ok_or_else(|| {
          event!(Level::ERROR, "Stage has no handlers.");
          Err::from(DraftlineError::HandlerMissing { stage })
        })?;

        self.run_phase("on", on_handlers, &ctx_data).await?;
        if let Some(guards) = self.after.get(&stage) {
          self.run_phase("after", guards, &ctx_data).await?;
        }

        event!(Level::DEBUG, next = ?stage.next(), "Stage committed.");
        Ok::<(), Err>(())
      }
      .instrument(stage_span)
      .await?;
    }

    ctx_data.update(|data| data.enter_stage(Stage::Done));
    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(())
  }

  async fn run_phase(
    &self,
    phase: &'static str,
    handlers: &[StageHandler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<(), Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      let handler_span = span!(Level::DEBUG, "stage_handler", phase, handler_index = handler_idx);
      if let Err(e) = handler_fn(ctx_data.clone()).instrument(handler_span).await {
        event!(Level::ERROR, error = %e, phase, "Stage handler failed.");
        return Err(e);
      }
    }
    Ok(())
  }
}
