pub mod ai;
pub mod config;
pub mod controller;
pub mod credential;
pub mod error;
pub mod prompts;
pub mod scenario;
pub mod temperature;

// Re-export main types for convenience
pub use ai::{GeminiClient, GenerationClient, NO_OUTPUT};
pub use config::Config;
pub use controller::{
    Completion, GenerationOutcome, GenerationRequest, PendingGeneration, RequestController,
    ResolvePolicy,
};
pub use credential::Credential;
pub use error::GenerationError;
pub use prompts::PromptStore;
pub use scenario::{Accent, Scenario, ScenarioId};
pub use temperature::{classify, is_recommended, Classification, Rgb, Temperature, Zone};
