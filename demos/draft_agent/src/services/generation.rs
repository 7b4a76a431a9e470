// demos/draft_agent/src/services/generation.rs

use super::ChatClient;
use async_trait::async_trait;
use draftline::{GenerationService, Message};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Structured planning over the chat endpoint. An answer that is not a JSON
/// object counts as no answer, so the planner retries it.
pub struct ChatGenerationService {
  client: Arc<ChatClient>,
}

impl ChatGenerationService {
  pub fn new(client: Arc<ChatClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl GenerationService for ChatGenerationService {
  async fn invoke(&self, messages: &[Message]) -> anyhow::Result<Option<Value>> {
    let content = self.client.complete(messages, true).await?;
    let parsed = parse_structured(&content);
    if parsed.is_none() {
      debug!(chars = content.len(), "Planner answer was not a JSON object.");
    }
    Ok(parsed)
  }
}

/// Parses a model answer as a JSON object. Tolerates a surrounding markdown
/// code fence.
pub fn parse_structured(content: &str) -> Option<Value> {
  let trimmed = content.trim();
  let unfenced = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .and_then(|rest| rest.strip_suffix("```"))
    .unwrap_or(trimmed)
    .trim();
  if unfenced.is_empty() {
    return None;
  }
  serde_json::from_str::<Value>(unfenced).ok().filter(Value::is_object)
}
