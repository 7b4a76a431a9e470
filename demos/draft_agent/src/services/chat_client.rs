// demos/draft_agent/src/services/chat_client.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use draftline::Message;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Minimal client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatClient {
  http: Client,
  url: String,
  api_key: String,
  model: String,
  temperature: f32,
}

impl ChatClient {
  pub fn new(config: &AppConfig) -> AppResult<Self> {
    let http = Client::builder().timeout(config.request_timeout).build()?;
    Ok(Self {
      http,
      url: format!("{}/chat/completions", config.base_url),
      api_key: config.api_key.clone(),
      model: config.model.clone(),
      temperature: config.temperature,
    })
  }

  /// Sends `messages` and returns the first choice's message content.
  /// With `json_object` set, the endpoint is asked for a JSON object answer.
  pub async fn complete(&self, messages: &[Message], json_object: bool) -> AppResult<String> {
    let body = request_body(&self.model, self.temperature, messages, json_object);
    debug!(url = %self.url, model = %self.model, messages = messages.len(), "Sending chat completion request");

    let response = self
      .http
      .post(&self.url)
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
      return Err(AppError::ChatStatus {
        status: status.as_u16(),
        body: text.chars().take(500).collect(),
      });
    }

    let parsed: Value =
      serde_json::from_str(&text).map_err(|e| AppError::ChatResponse(format!("Invalid JSON: {}", e)))?;
    first_choice_content(&parsed).ok_or_else(|| AppError::ChatResponse("response has no message content".to_string()))
  }
}

fn request_body(model: &str, temperature: f32, messages: &[Message], json_object: bool) -> Value {
  let mut body = json!({
    "model": model,
    "messages": messages,
    "temperature": temperature,
    "stream": false,
  });
  if json_object {
    body["response_format"] = json!({ "type": "json_object" });
  }
  body
}

fn first_choice_content(response: &Value) -> Option<String> {
  response
    .pointer("/choices/0/message/content")
    .and_then(Value::as_str)
    .map(str::to_string)
}
