// demos/draft_agent/src/services/mod.rs

pub mod analyst;
pub mod chat_client;
pub mod generation;
pub mod researcher;

pub use analyst::ChatAnalyst;
pub use chat_client::ChatClient;
pub use generation::ChatGenerationService;
pub use researcher::ChatResearcher;
