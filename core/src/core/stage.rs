// draftline/src/core/stage.rs

//! Defines the pipeline's stage state machine.

use std::fmt;

/// Position of a run in the fixed stage sequence.
///
/// `Researching -> Planning -> Analyzing -> Summarizing -> Done`. A run that
/// fails stays on the stage that failed and never reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Stage {
  #[default]
  Researching,
  Planning,
  Analyzing,
  Summarizing,
  Done,
}

impl Stage {
  /// The four working stages, in execution order.
  pub const SEQUENCE: [Stage; 4] = [Stage::Researching, Stage::Planning, Stage::Analyzing, Stage::Summarizing];

  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Researching => "researching",
      Stage::Planning => "planning",
      Stage::Analyzing => "analyzing",
      Stage::Summarizing => "summarizing",
      Stage::Done => "done",
    }
  }

  /// The stage that follows this one. `Done` is terminal.
  pub fn next(&self) -> Option<Stage> {
    match self {
      Stage::Researching => Some(Stage::Planning),
      Stage::Planning => Some(Stage::Analyzing),
      Stage::Analyzing => Some(Stage::Summarizing),
      Stage::Summarizing => Some(Stage::Done),
      Stage::Done => None,
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Implemented by pipeline data that records which stage is active.
///
/// The stage pipeline commits the stage before running its handlers and
/// commits `Stage::Done` once every stage has succeeded.
pub trait StageTracker {
  fn current_stage(&self) -> Stage;
  fn enter_stage(&mut self, stage: Stage);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sequence_follows_next() {
    let mut stage = Stage::SEQUENCE[0];
    for expected in Stage::SEQUENCE.iter().skip(1) {
      stage = stage.next().unwrap();
      assert_eq!(stage, *expected);
    }
    assert_eq!(stage.next(), Some(Stage::Done));
    assert_eq!(Stage::Done.next(), None);
  }

  #[test]
  fn stages_are_ordered() {
    assert!(Stage::Researching < Stage::Planning);
    assert!(Stage::Summarizing < Stage::Done);
  }
}
