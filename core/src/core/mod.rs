pub mod context;
pub mod context_data;
pub mod stage;

// Re-export key types for easier access from other draftline modules (and lib.rs)
pub use context::StageHandler;
pub use context_data::ContextData;
pub use stage::{Stage, StageTracker};
