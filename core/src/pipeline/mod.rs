// draftline/src/pipeline/mod.rs

//! Defines the `StagePipeline` struct, its handler registration, and its execution logic.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::StagePipeline;
