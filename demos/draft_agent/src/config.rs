// demos/draft_agent/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const DEFAULT_MODEL: &str = "meta/llama-3.3-70b-instruct";

/// Chat-completions endpoint settings.
#[derive(Clone)]
pub struct AppConfig {
  pub base_url: String,
  pub api_key: String,
  pub model: String,
  pub temperature: f32,
  pub request_timeout: Duration,
}

// The key stays out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("base_url", &self.base_url)
      .field("api_key", &"[REDACTED]")
      .field("model", &self.model)
      .field("temperature", &self.temperature)
      .field("request_timeout", &self.request_timeout)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let base_url = get("LLM_BASE_URL")
      .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
      .trim_end_matches('/')
      .to_string();
    let api_key = get("LLM_API_KEY").or_else(|| get("NVIDIA_API_KEY")).ok_or_else(|| {
      AppError::Config("Missing environment variable 'LLM_API_KEY' (or 'NVIDIA_API_KEY')".to_string())
    })?;
    let model = get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let temperature = get("LLM_TEMPERATURE")
      .unwrap_or_else(|| "0".to_string())
      .trim()
      .parse::<f32>()
      .map_err(|e| AppError::Config(format!("Invalid LLM_TEMPERATURE: {}", e)))?;
    let request_timeout = get("LLM_TIMEOUT_SECS")
      .unwrap_or_else(|| "120".to_string())
      .trim()
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid LLM_TIMEOUT_SECS: {}", e)))?;

    let config = Self {
      base_url,
      api_key,
      model,
      temperature,
      request_timeout,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_apply_when_only_a_key_is_set() {
    let config = AppConfig::from_lookup(lookup_from(&[("NVIDIA_API_KEY", "nv-key")])).unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.api_key, "nv-key");
    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.temperature, 0.0);
  }

  #[test]
  fn generic_key_wins_and_trailing_slash_is_dropped() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("LLM_API_KEY", "generic"),
      ("NVIDIA_API_KEY", "nv-key"),
      ("LLM_BASE_URL", "http://localhost:8000/v1/"),
    ]))
    .unwrap();
    assert_eq!(config.api_key, "generic");
    assert_eq!(config.base_url, "http://localhost:8000/v1");
  }

  #[test]
  fn missing_key_and_bad_numbers_are_config_errors() {
    assert!(matches!(AppConfig::from_lookup(lookup_from(&[])), Err(AppError::Config(_))));
    let bad = AppConfig::from_lookup(lookup_from(&[("LLM_API_KEY", "k"), ("LLM_TEMPERATURE", "warm")]));
    assert!(matches!(bad, Err(AppError::Config(_))));
  }

  #[test]
  fn debug_output_redacts_the_key() {
    let config = AppConfig::from_lookup(lookup_from(&[("LLM_API_KEY", "secret-value")])).unwrap();
    assert!(!format!("{:?}", config).contains("secret-value"));
  }
}
