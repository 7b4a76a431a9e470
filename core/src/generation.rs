// draftline/src/generation.rs

//! Structured generation: a fallible call to an external inference service
//! whose answer must parse into a strict typed value.

use crate::error::{DraftlineError, DraftlineResult};
use crate::model::Message;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Number of sequential attempts before structured generation gives up.
pub const MAX_RETRIES: usize = 3;

/// The external inference service.
///
/// `Ok(None)` means the service answered without a usable structured value
/// and the call may be retried. `Err` is a transport-level failure and is
/// never retried.
#[async_trait]
pub trait GenerationService: Send + Sync {
  async fn invoke(&self, messages: &[Message]) -> anyhow::Result<Option<Value>>;
}

/// Wraps a [`GenerationService`] with parse/validate and the bounded retry loop.
#[derive(Clone)]
pub struct StructuredGenerator {
  service: Arc<dyn GenerationService>,
}

impl StructuredGenerator {
  pub fn new(service: Arc<dyn GenerationService>) -> Self {
    Self { service }
  }

  /// Requests `[system(system_prompt)] ++ transcript` until the answer parses
  /// into `T`, at most [`MAX_RETRIES`] times.
  ///
  /// An absent answer and an answer that does not deserialize are treated the
  /// same way: logged at debug level and retried immediately.
  #[instrument(
        name = "StructuredGenerator::generate",
        skip_all,
        fields(target_type = %std::any::type_name::<T>(), transcript_len = transcript.len()),
        err(Display)
    )]
  pub async fn generate<T>(&self, system_prompt: &str, transcript: &[Message]) -> DraftlineResult<T>
  where
    T: DeserializeOwned,
  {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(Message::system(system_prompt));
    messages.extend_from_slice(transcript);

    for attempt in 1..=MAX_RETRIES {
      let response = self
        .service
        .invoke(&messages)
        .await
        .map_err(|source| DraftlineError::Service { source })?;

      match response.map(serde_json::from_value::<T>) {
        Some(Ok(parsed)) => {
          event!(Level::DEBUG, attempt, "Structured generation succeeded.");
          return Ok(parsed);
        }
        Some(Err(parse_err)) => {
          event!(Level::DEBUG, error = %parse_err, "Response did not match the expected shape.");
        }
        None => {
          event!(Level::DEBUG, "Service returned no structured response.");
        }
      }
      event!(Level::DEBUG, "Retrying structured generation. Attempt {} of {}", attempt, MAX_RETRIES);
    }

    Err(DraftlineError::GenerationFailure { attempts: MAX_RETRIES })
  }
}
