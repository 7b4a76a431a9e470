// demos/draft_agent/src/services/analyst.rs

use super::ChatClient;
use crate::prompts::{fill, ANALYST_PROMPT};
use anyhow::bail;
use async_trait::async_trait;
use draftline::{ItemWorker, Message, WorkerInput, WorkerOutput};
use serde_json::Value;
use std::sync::Arc;

/// Writes one player's section of the report.
pub struct ChatAnalyst {
  client: Arc<ChatClient>,
}

impl ChatAnalyst {
  pub fn new(client: Arc<ChatClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl ItemWorker for ChatAnalyst {
  async fn analyze(&self, input: WorkerInput) -> anyhow::Result<WorkerOutput> {
    let notes = Value::Object(input.item.attributes.clone()).to_string();
    let system = fill(
      ANALYST_PROMPT,
      &[("topic", &*input.topic), ("name", input.item.name.as_str()), ("notes", notes.as_str())],
    );

    let mut request = Vec::with_capacity(input.transcript.len() + 2);
    request.push(Message::system(system));
    request.extend(input.transcript.iter().cloned());
    request.push(Message::user(format!("Write the section for {}.", input.item.name)));

    let section = self.client.complete(&request, false).await?;
    if section.trim().is_empty() {
      bail!("model returned an empty analysis for {}", input.item.name);
    }
    Ok(input.complete(section.trim()))
  }
}
