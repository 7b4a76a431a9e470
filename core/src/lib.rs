// src/lib.rs

//! Draftline: an async staged pipeline that turns a topic into a report.
//!
//! A run goes through four stages, strictly in order:
//!  - **Researching**: a [`Researcher`] appends context to the transcript.
//!  - **Planning**: a [`GenerationService`] is asked for a structured [`Plan`],
//!    retried up to [`MAX_RETRIES`] times when the answer is absent or malformed.
//!  - **Analyzing**: one [`ItemWorker`] invocation per plan item, fanned out
//!    concurrently (or throttled), gathered, and merged back by item index.
//!  - **Summarizing**: the plan is folded into the final report.
//!
//! Any failure aborts the run and reaches the caller unchanged; a run never
//! returns a partial report.

pub mod config;
pub mod core;
pub mod error;
pub mod gather;
pub mod generation;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod research;
pub mod summary;
pub mod worker;

// --- Re-exports for the Public API ---

pub use crate::core::context::StageHandler;
pub use crate::core::context_data::ContextData;
pub use crate::core::stage::{Stage, StageTracker};

pub use crate::pipeline::definition::StagePipeline;

pub use crate::config::PipelineConfig;
pub use crate::error::{DraftlineError, DraftlineResult, WorkerFault};
pub use crate::gather::{FailurePolicy, GatherMode, GatherSettings};
pub use crate::generation::{GenerationService, StructuredGenerator, MAX_RETRIES};
pub use crate::model::{Item, Message, PipelineState, Plan, Role};
pub use crate::orchestrator::Orchestrator;
pub use crate::prompt::{fill_placeholders, PromptTemplate};
pub use crate::research::Researcher;
pub use crate::summary::assemble_report;
pub use crate::worker::{ItemWorker, WorkerInput, WorkerOutput};

/*
    Typical use:
    1. Implement `Researcher`, `GenerationService`, and `ItemWorker` for your backends.
    2. Build a `PipelineConfig` (or `PipelineConfig::from_env()`).
    3. `Orchestrator::new(config, researcher, service, worker)`.
    4. `orchestrator.run(topic, mode).await` for the report, or call the stage
       methods one by one against your own `ContextData<PipelineState>`.
*/
