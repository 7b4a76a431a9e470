// draftline/src/model.rs

//! Data threaded through a run: the transcript, the plan, and the pipeline state.

use crate::core::stage::{Stage, StageTracker};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
  Tool,
}

/// One transcript entry. Transcripts are append-only and keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub role: Role,
  pub content: String,
}

impl Message {
  pub fn new(role: Role, content: impl Into<String>) -> Self {
    Self {
      role,
      content: content.into(),
    }
  }

  pub fn system(content: impl Into<String>) -> Self {
    Self::new(Role::System, content)
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self::new(Role::User, content)
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self::new(Role::Assistant, content)
  }
}

/// One unit of the plan. Its identity is its index in [`Plan::items`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub name: String,
  /// Filled in by the analysis stage; empty until then.
  #[serde(default)]
  pub content: String,
  /// Ranking or identity fields the planner attached to the item.
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
}

impl Item {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      content: String::new(),
      attributes: Map::new(),
    }
  }

  pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.attributes.insert(key.into(), value.into());
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
  pub title: String,
  #[serde(alias = "recommendations")]
  pub items: Vec<Item>,
}

impl Plan {
  pub fn new(title: impl Into<String>, items: Vec<Item>) -> Self {
    Self {
      title: title.into(),
      items,
    }
  }
}

/// The record every stage reads from and writes to during one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
  pub topic: String,
  /// Selector passed through to the planner prompt, e.g. a scoring format.
  pub mode: String,
  pub plan: Option<Plan>,
  pub final_output: Option<String>,
  pub transcript: Vec<Message>,
  pub stage: Stage,
}

impl PipelineState {
  pub fn new(topic: impl Into<String>, mode: impl Into<String>) -> Self {
    Self {
      topic: topic.into(),
      mode: mode.into(),
      ..Default::default()
    }
  }
}

impl StageTracker for PipelineState {
  fn current_stage(&self) -> Stage {
    self.stage
  }

  fn enter_stage(&mut self, stage: Stage) {
    self.stage = stage;
  }
}
