// demos/draft_agent/src/errors.rs

use draftline::DraftlineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("HTTP Error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Chat API Error: {status}: {body}")]
  ChatStatus { status: u16, body: String },

  #[error("Chat API Error: {0}")]
  ChatResponse(String),

  #[error("Draft Pipeline Error: {source}")]
  Pipeline {
    #[from]
    source: DraftlineError,
  },
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
