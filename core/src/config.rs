// draftline/src/config.rs

use crate::error::{DraftlineError, DraftlineResult};
use crate::gather::{FailurePolicy, GatherMode, GatherSettings};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default pause after each item in throttled mode.
pub const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_secs(30);
/// Default number of research queries requested per run.
pub const DEFAULT_QUERIES_PER_SECTION: usize = 5;

/// Run configuration handed to the orchestrator at construction.
///
/// The orchestrator takes a snapshot at the start of every run, so a run
/// never sees a mix of old and new settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Serialize item invocations and pause after each one.
  pub throttle: bool,
  pub throttle_delay: Duration,
  pub queries_per_section: usize,
  pub max_in_flight: Option<NonZeroUsize>,
  pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      throttle: false,
      throttle_delay: DEFAULT_THROTTLE_DELAY,
      queries_per_section: DEFAULT_QUERIES_PER_SECTION,
      max_in_flight: None,
      failure_policy: FailurePolicy::default(),
    }
  }
}

impl PipelineConfig {
  pub const THROTTLE_VAR: &'static str = "THROTTLE_LLM_CALLS";
  pub const THROTTLE_DELAY_VAR: &'static str = "DRAFTLINE_THROTTLE_DELAY_SECS";
  pub const QUERIES_VAR: &'static str = "DRAFTLINE_QUERIES_PER_SECTION";
  pub const MAX_IN_FLIGHT_VAR: &'static str = "DRAFTLINE_MAX_IN_FLIGHT";
  pub const FAILURE_POLICY_VAR: &'static str = "DRAFTLINE_FAILURE_POLICY";

  /// Reads the configuration from the process environment.
  pub fn from_env() -> DraftlineResult<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Reads the configuration from any key/value source. Unset keys keep their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DraftlineResult<Self> {
    let mut config = Self::default();

    if let Some(raw) = lookup(Self::THROTTLE_VAR) {
      config.throttle = parse_flag(Self::THROTTLE_VAR, &raw)?;
    }
    if let Some(raw) = lookup(Self::THROTTLE_DELAY_VAR) {
      let secs = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| invalid(Self::THROTTLE_DELAY_VAR, &raw, "a non-negative number of seconds"))?;
      config.throttle_delay = Duration::from_secs_f64(secs);
    }
    if let Some(raw) = lookup(Self::QUERIES_VAR) {
      config.queries_per_section = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| invalid(Self::QUERIES_VAR, &raw, "a whole number"))?;
    }
    if let Some(raw) = lookup(Self::MAX_IN_FLIGHT_VAR) {
      let limit = raw
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| invalid(Self::MAX_IN_FLIGHT_VAR, &raw, "a whole number of at least 1"))?;
      config.max_in_flight = Some(limit);
    }
    if let Some(raw) = lookup(Self::FAILURE_POLICY_VAR) {
      config.failure_policy = raw.parse()?;
    }

    tracing::debug!(config = ?config, "Pipeline configuration loaded.");
    Ok(config)
  }

  pub fn with_throttle(mut self, throttle: bool) -> Self {
    self.throttle = throttle;
    self
  }

  pub fn with_throttle_delay(mut self, delay: Duration) -> Self {
    self.throttle_delay = delay;
    self
  }

  pub fn with_queries_per_section(mut self, queries: usize) -> Self {
    self.queries_per_section = queries;
    self
  }

  pub fn with_max_in_flight(mut self, limit: usize) -> Self {
    self.max_in_flight = NonZeroUsize::new(limit);
    self
  }

  pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
    self.failure_policy = policy;
    self
  }

  /// The gather behaviour this configuration selects.
  pub fn gather_settings(&self) -> GatherSettings {
    let mode = if self.throttle {
      GatherMode::Throttled {
        delay: self.throttle_delay,
      }
    } else {
      GatherMode::Unthrottled
    };
    GatherSettings {
      mode,
      failure_policy: self.failure_policy,
      max_in_flight: self.max_in_flight,
    }
  }
}

fn parse_flag(key: &str, raw: &str) -> DraftlineResult<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "" | "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(invalid(key, raw, "a boolean such as 1 or 0")),
  }
}

fn invalid(key: &str, raw: &str, expected: &str) -> DraftlineError {
  DraftlineError::Config(format!("invalid {} value '{}': expected {}", key, raw, expected))
}
