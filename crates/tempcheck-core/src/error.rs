use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("API key is missing. Please enter your Gemini API key.")]
    MissingCredential,
    /// Any failure from the upstream call: network, auth, quota, bad payload.
    #[error("{message}")]
    UpstreamFailure { message: String },
}

impl GenerationError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            message: message.into(),
        }
    }

    /// Non-technical text for the output panel. The detailed message is for
    /// logs only.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::MissingCredential => {
                "API key is missing. Press K to enter your Gemini API key."
            }
            GenerationError::UpstreamFailure { .. } => "Something went wrong with the generation.",
        }
    }
}
