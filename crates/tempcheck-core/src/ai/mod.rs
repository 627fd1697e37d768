pub mod gemini;

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::GenerationError;
use crate::temperature::Temperature;

pub use gemini::GeminiClient;

/// Placeholder returned when the upstream call succeeds with no text.
pub const NO_OUTPUT: &str = "No output generated.";

/// One text-generation call against an external model
///
/// Implementations make exactly one attempt. An empty credential must fail
/// with [`GenerationError::MissingCredential`] before any I/O happens.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        temperature: Temperature,
        credential: &Credential,
    ) -> Result<String, GenerationError>;
}
