// draftline/src/worker.rs

//! The per-item worker contract used by the analysis stage.

use crate::model::{Item, Message};
use async_trait::async_trait;
use std::sync::Arc;

/// Everything one worker invocation receives. Topic and transcript are shared
/// read-only between all invocations of a run.
#[derive(Debug, Clone)]
pub struct WorkerInput {
  pub index: usize,
  pub item: Item,
  pub topic: Arc<str>,
  pub transcript: Arc<[Message]>,
}

impl WorkerInput {
  /// The output for this input with `content` filled in. Echoes the index and
  /// keeps the item's name and attributes.
  pub fn complete(self, content: impl Into<String>) -> WorkerOutput {
    let mut item = self.item;
    item.content = content.into();
    WorkerOutput {
      index: self.index,
      item,
    }
  }
}

/// A finished invocation. `index` must be the index the worker was given.
#[derive(Debug, Clone)]
pub struct WorkerOutput {
  pub index: usize,
  pub item: Item,
}

/// Performs one unit of independent work for one plan item.
#[async_trait]
pub trait ItemWorker: Send + Sync {
  async fn analyze(&self, input: WorkerInput) -> anyhow::Result<WorkerOutput>;
}
