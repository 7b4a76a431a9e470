// draftline/src/gather.rs

//! Fan-out / gather for the analysis stage: dispatch one worker invocation per
//! plan item, wait for them under the configured mode and failure policy, and
//! merge the results back into the plan by index.

use crate::error::{DraftlineError, DraftlineResult, WorkerFault};
use crate::model::Plan;
use crate::worker::{ItemWorker, WorkerInput, WorkerOutput};
use futures::stream::{self, StreamExt};
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{event, Level};

/// How the dispatched invocations are awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatherMode {
  /// Every invocation runs concurrently; the gather completes once all of them have.
  #[default]
  Unthrottled,
  /// Invocations are awaited one at a time in dispatch order, with `delay`
  /// after each one completes. Trades latency for a bounded external call rate.
  Throttled { delay: Duration },
}

/// What a failed item invocation does to the rest of the gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
  /// Let every invocation finish, then report all failures together.
  #[default]
  CollectAll,
  /// Report the first failure at once and cancel the invocations still running.
  FailFast,
}

impl std::str::FromStr for FailurePolicy {
  type Err = DraftlineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
      "collect_all" => Ok(FailurePolicy::CollectAll),
      "fail_fast" => Ok(FailurePolicy::FailFast),
      other => Err(DraftlineError::Config(format!(
        "unknown failure policy '{}' (expected 'collect_all' or 'fail_fast')",
        other
      ))),
    }
  }
}

/// Gather behaviour for one run, fixed when the analysis stage starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatherSettings {
  pub mode: GatherMode,
  pub failure_policy: FailurePolicy,
  /// Upper bound on concurrently running invocations in unthrottled mode.
  /// `None` lets every item run at once.
  pub max_in_flight: Option<NonZeroUsize>,
}

/// Runs `worker` once per input and returns the outputs in completion order.
///
/// Each output is checked to carry the index its input was dispatched with.
/// Worker failures are reported according to `settings.failure_policy`; no
/// partial result set is ever returned.
pub async fn dispatch_and_gather(
  worker: &dyn ItemWorker,
  inputs: Vec<WorkerInput>,
  settings: GatherSettings,
) -> DraftlineResult<Vec<WorkerOutput>> {
  if inputs.is_empty() {
    event!(Level::DEBUG, "No items to dispatch.");
    return Ok(Vec::new());
  }

  match settings.mode {
    GatherMode::Unthrottled => gather_concurrent(worker, inputs, settings).await,
    GatherMode::Throttled { delay } => gather_throttled(worker, inputs, delay, settings.failure_policy).await,
  }
}

async fn gather_concurrent(
  worker: &dyn ItemWorker,
  inputs: Vec<WorkerInput>,
  settings: GatherSettings,
) -> DraftlineResult<Vec<WorkerOutput>> {
  let total = inputs.len();
  let limit = settings.max_in_flight.map_or(total, NonZeroUsize::get);
  event!(Level::DEBUG, total, limit, "Dispatching item workers concurrently.");

  let mut in_flight = stream::iter(inputs.into_iter().map(|input| invoke(worker, input))).buffer_unordered(limit);

  let mut gathered = Gathered::with_capacity(total);
  while let Some(completed) = in_flight.next().await {
    if let Err(err) = gathered.record(completed, settings.failure_policy) {
      event!(Level::WARN, error = %err, "Cancelling the remaining invocations.");
      return Err(err);
    }
  }

  gathered.finish()
}

async fn gather_throttled(
  worker: &dyn ItemWorker,
  inputs: Vec<WorkerInput>,
  delay: Duration,
  failure_policy: FailurePolicy,
) -> DraftlineResult<Vec<WorkerOutput>> {
  event!(Level::INFO, delay_ms = delay.as_millis() as u64, "Throttling item calls.");

  let mut gathered = Gathered::with_capacity(inputs.len());
  for input in inputs {
    let completed = invoke(worker, input).await;
    gathered.record(completed, failure_policy)?;
    tokio::time::sleep(delay).await;
  }

  gathered.finish()
}

enum Invocation {
  Failed(WorkerFault),
  Mismatch(DraftlineError),
}

async fn invoke(worker: &dyn ItemWorker, input: WorkerInput) -> Result<WorkerOutput, Invocation> {
  let index = input.index;
  let item = input.item.name.clone();
  event!(Level::INFO, index, item = %item, "Creating analysis.");

  match worker.analyze(input).await {
    Ok(output) if output.index == index => Ok(output),
    Ok(output) => Err(Invocation::Mismatch(DraftlineError::MergeConflict {
      index,
      reason: format!("worker dispatched for index {} returned index {}", index, output.index),
    })),
    Err(source) => {
      event!(Level::ERROR, index, item = %item, error = %source, "Item worker failed.");
      Err(Invocation::Failed(WorkerFault { index, item, source }))
    }
  }
}

/// Results collected so far in one gather.
struct Gathered {
  outputs: Vec<WorkerOutput>,
  faults: Vec<WorkerFault>,
  conflicts: Vec<DraftlineError>,
}

impl Gathered {
  fn with_capacity(total: usize) -> Self {
    Self {
      outputs: Vec::with_capacity(total),
      faults: Vec::new(),
      conflicts: Vec::new(),
    }
  }

  /// Files one finished invocation. Under `FailFast` a failure or a wrong
  /// echoed index is returned at once; under `CollectAll` it is held until
  /// `finish`.
  fn record(&mut self, completed: Result<WorkerOutput, Invocation>, policy: FailurePolicy) -> DraftlineResult<()> {
    match completed {
      Ok(output) => self.outputs.push(output),
      Err(Invocation::Mismatch(err)) if policy == FailurePolicy::FailFast => return Err(err),
      Err(Invocation::Mismatch(err)) => self.conflicts.push(err),
      Err(Invocation::Failed(fault)) if policy == FailurePolicy::FailFast => return Err(vec![fault].into()),
      Err(Invocation::Failed(fault)) => self.faults.push(fault),
    }
    Ok(())
  }

  /// Reports after every invocation has finished. A wrong echoed index wins
  /// over worker failures, lowest index first.
  fn finish(mut self) -> DraftlineResult<Vec<WorkerOutput>> {
    if !self.conflicts.is_empty() {
      self.conflicts.sort_by_key(conflict_index);
      return Err(self.conflicts.swap_remove(0));
    }
    if self.faults.is_empty() {
      return Ok(self.outputs);
    }
    self.faults.sort_by_key(|f| f.index);
    Err(self.faults.into())
  }
}

fn conflict_index(err: &DraftlineError) -> usize {
  match err {
    DraftlineError::MergeConflict { index, .. } => *index,
    _ => usize::MAX,
  }
}

/// Writes each output's content into `plan.items[output.index]`.
///
/// Order-independent. The plan is only touched once every item has exactly
/// one result; otherwise it is left as it was and `MergeConflict` is returned.
pub fn merge_outputs(plan: &mut Plan, outputs: Vec<WorkerOutput>) -> DraftlineResult<()> {
  let mut merged = plan.items.clone();
  let mut written = vec![false; merged.len()];

  for output in outputs {
    let index = output.index;
    let slot = written.get_mut(index).ok_or_else(|| DraftlineError::MergeConflict {
      index,
      reason: format!("plan has only {} items", merged.len()),
    })?;
    if *slot {
      return Err(DraftlineError::MergeConflict {
        index,
        reason: "more than one result for this item".to_string(),
      });
    }
    *slot = true;
    merged[index].content = output.item.content;
  }

  if let Some(missing) = written.iter().position(|done| !done) {
    return Err(DraftlineError::MergeConflict {
      index: missing,
      reason: "no result for this item".to_string(),
    });
  }

  for item in &merged {
    event!(Level::INFO, item = %item.name, "Finished analysis.");
  }
  plan.items = merged;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Item;

  fn output(index: usize, content: &str) -> WorkerOutput {
    let mut item = Item::new(format!("item-{}", index));
    item.content = content.to_string();
    WorkerOutput { index, item }
  }

  fn plan_of(names: &[&str]) -> Plan {
    Plan::new("Title", names.iter().map(|n| Item::new(*n)).collect())
  }

  #[test]
  fn merge_lands_results_on_their_index_in_any_order() {
    let mut plan = plan_of(&["A", "B", "C"]);
    merge_outputs(&mut plan, vec![output(2, "c"), output(0, "a"), output(1, "b")]).unwrap();

    let contents: Vec<_> = plan.items.iter().map(|i| i.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "b", "c"]);
    // Names stay as planned.
    assert_eq!(plan.items[2].name, "C");
  }

  #[test]
  fn merge_rejects_duplicate_index_and_leaves_plan_untouched() {
    let mut plan = plan_of(&["A", "B"]);
    let err = merge_outputs(&mut plan, vec![output(0, "a"), output(0, "again")]).unwrap_err();
    assert!(matches!(err, DraftlineError::MergeConflict { index: 0, .. }));
    assert!(plan.items.iter().all(|i| i.content.is_empty()));
  }

  #[test]
  fn merge_rejects_out_of_range_and_missing_results() {
    let mut plan = plan_of(&["A", "B"]);
    let err = merge_outputs(&mut plan, vec![output(5, "x")]).unwrap_err();
    assert!(matches!(err, DraftlineError::MergeConflict { index: 5, .. }));

    let err = merge_outputs(&mut plan, vec![output(0, "a")]).unwrap_err();
    assert!(matches!(err, DraftlineError::MergeConflict { index: 1, .. }));
  }

  #[test]
  fn failure_policy_parses_both_spellings() {
    assert_eq!("fail-fast".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailFast);
    assert_eq!("COLLECT_ALL".parse::<FailurePolicy>().unwrap(), FailurePolicy::CollectAll);
    assert!("sometimes".parse::<FailurePolicy>().is_err());
  }
}
