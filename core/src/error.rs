// draftline/src/error.rs
use crate::core::stage::Stage;
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// One failed item invocation, as reported inside [`DraftlineError::WorkerFailures`].
#[derive(Debug)]
pub struct WorkerFault {
  pub index: usize,
  pub item: String,
  pub source: AnyhowError,
}

impl std::fmt::Display for WorkerFault {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "item {} ('{}'): {}", self.index, self.item, self.source)
  }
}

#[derive(Debug, Error)]
pub enum DraftlineError {
  #[error("Stage '{stage}' started without required state: {missing}")]
  Precondition { stage: Stage, missing: String },

  #[error("Structured generation produced no valid result after {attempts} attempts")]
  GenerationFailure { attempts: usize },

  #[error("Worker failed for item {index} ('{item}'). Source: {source}")]
  WorkerFailure {
    index: usize,
    item: String,
    #[source]
    source: AnyhowError,
  },

  #[error("{} item workers failed: {}", .0.len(), format_faults(.0))]
  WorkerFailures(Vec<WorkerFault>),

  #[error("Research collaborator failed. Source: {source}")]
  Research {
    #[source]
    source: AnyhowError,
  },

  #[error("Generation service call failed. Source: {source}")]
  Service {
    #[source]
    source: AnyhowError,
  },

  #[error("Merge conflict at item index {index}: {reason}")]
  MergeConflict { index: usize, reason: String },

  #[error("Handler missing for non-optional stage: {stage}")]
  HandlerMissing { stage: Stage },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to start the pipeline runtime. Source: {source}")]
  Runtime {
    #[source]
    source: std::io::Error,
  },

  #[error("Internal draftline error: {0}")]
  Internal(String),
}

fn format_faults(faults: &[WorkerFault]) -> String {
  faults.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl DraftlineError {
  pub(crate) fn precondition(stage: Stage, missing: impl Into<String>) -> Self {
    DraftlineError::Precondition {
      stage,
      missing: missing.into(),
    }
  }

  /// Every item index that failed, for either worker failure shape.
  pub fn failed_indices(&self) -> Vec<usize> {
    match self {
      DraftlineError::WorkerFailure { index, .. } => vec![*index],
      DraftlineError::WorkerFailures(faults) => faults.iter().map(|f| f.index).collect(),
      _ => Vec::new(),
    }
  }
}

// Collaborators report `anyhow::Error`. If one of them bubbled up a
// DraftlineError through anyhow, hand back the original variant.
impl From<AnyhowError> for DraftlineError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<DraftlineError>() {
      Ok(inner) => inner,
      Err(other) => DraftlineError::Internal(format!("{:#}", other)),
    }
  }
}

impl From<Vec<WorkerFault>> for DraftlineError {
  fn from(mut faults: Vec<WorkerFault>) -> Self {
    if faults.len() == 1 {
      let WorkerFault { index, item, source } = faults.remove(0);
      return DraftlineError::WorkerFailure { index, item, source };
    }
    DraftlineError::WorkerFailures(faults)
  }
}

pub type DraftlineResult<T, E = DraftlineError> = std::result::Result<T, E>;
