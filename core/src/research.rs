// draftline/src/research.rs

use crate::model::Message;
use async_trait::async_trait;

/// The research collaborator run by the first stage.
///
/// Receives the topic, how many queries to run, and the transcript so far.
/// The messages it returns are appended to the transcript; they never
/// replace it.
#[async_trait]
pub trait Researcher: Send + Sync {
  async fn research(&self, topic: &str, query_count: usize, transcript: &[Message]) -> anyhow::Result<Vec<Message>>;
}
