// demos/draft_agent/src/services/researcher.rs

use super::ChatClient;
use crate::prompts::{fill, RESEARCH_ANSWER_PROMPT, RESEARCH_QUERIES_PROMPT};
use async_trait::async_trait;
use draftline::{Message, Researcher};
use std::sync::Arc;
use tracing::info;

/// Asks the model for research questions on the topic, then answers each one.
pub struct ChatResearcher {
  client: Arc<ChatClient>,
}

impl ChatResearcher {
  pub fn new(client: Arc<ChatClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl Researcher for ChatResearcher {
  async fn research(&self, topic: &str, query_count: usize, transcript: &[Message]) -> anyhow::Result<Vec<Message>> {
    if query_count == 0 {
      return Ok(Vec::new());
    }

    let count = query_count.to_string();
    let mut request = vec![Message::system(fill(
      RESEARCH_QUERIES_PROMPT,
      &[("topic", topic), ("count", count.as_str())],
    ))];
    request.extend_from_slice(transcript);
    let queries = parse_queries(&self.client.complete(&request, false).await?, query_count);
    info!(topic = %topic, queries = queries.len(), "Research queries generated.");

    let system = Message::system(fill(RESEARCH_ANSWER_PROMPT, &[("topic", topic)]));
    let mut findings = Vec::with_capacity(queries.len());
    for query in queries {
      let answer = self
        .client
        .complete(&[system.clone(), Message::user(query.as_str())], false)
        .await?;
      findings.push(Message::assistant(format!("Research: {}\n\n{}", query, answer.trim())));
    }
    Ok(findings)
  }
}

/// One query per non-empty line, with list markers stripped, at most `limit`.
fn parse_queries(content: &str, limit: usize) -> Vec<String> {
  content
    .lines()
    .map(|line| {
      line
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*'))
        .trim()
        .to_string()
    })
    .filter(|line| !line.is_empty())
    .take(limit)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn queries_drop_markers_and_blank_lines() {
    let content = "1. Who leads in targets?\n\n- Which WRs are injured?\n* Snap share changes\nExtra question";
    assert_eq!(
      parse_queries(content, 3),
      vec!["Who leads in targets?", "Which WRs are injured?", "Snap share changes"]
    );
  }
}
