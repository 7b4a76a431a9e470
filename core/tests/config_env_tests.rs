// tests/config_env_tests.rs
mod common;

use common::*;
use draftline::{GatherMode, Orchestrator, PipelineConfig};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn clear_env() {
  for key in [
    PipelineConfig::THROTTLE_VAR,
    PipelineConfig::THROTTLE_DELAY_VAR,
    PipelineConfig::QUERIES_VAR,
    PipelineConfig::MAX_IN_FLIGHT_VAR,
    PipelineConfig::FAILURE_POLICY_VAR,
  ] {
    std::env::remove_var(key);
  }
}

#[test]
#[serial]
fn test_from_env_reads_the_throttle_flag() {
  setup_tracing();
  clear_env();
  std::env::set_var(PipelineConfig::THROTTLE_VAR, "1");
  std::env::set_var(PipelineConfig::THROTTLE_DELAY_VAR, "2");

  let config = PipelineConfig::from_env().unwrap();
  clear_env();

  assert_eq!(
    config.gather_settings().mode,
    GatherMode::Throttled {
      delay: Duration::from_secs(2)
    }
  );
}

#[test]
#[serial]
fn test_orchestrator_keeps_the_config_it_was_built_with() {
  setup_tracing();
  clear_env();
  let config = PipelineConfig::from_env().unwrap();
  let orchestrator = Orchestrator::new(
    config,
    Arc::new(StaticResearcher::new(0)),
    Arc::new(ScriptedService::always_absent()),
    Arc::new(ScriptedWorker::new()),
  );

  // Changing the environment afterwards has no effect on the built orchestrator.
  std::env::set_var(PipelineConfig::THROTTLE_VAR, "1");
  let throttle = orchestrator.config().throttle;
  clear_env();

  assert!(!throttle);
}
