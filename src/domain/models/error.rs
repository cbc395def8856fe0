#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use thiserror::Error;

/// Failures that end a generation. Parse problems in the model output are
/// never represented here; the demuxer absorbs them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no Gemini API token is configured")]
    MissingCredential,
    #[error("Gemini rejected the configured API token")]
    CredentialRejected,
    #[error("transport failure: {0}")]
    Transport(String),
}

impl GenerationError {
    /// Text shown to the user in the chat.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::MissingCredential => {
                return "Gemini API token is not configured. Please set the CREWFORGE_GEMINI_TOKEN environment variable or gemini-token in the config file.".to_string();
            }
            GenerationError::CredentialRejected => {
                return "Your Gemini API key is invalid. Please check your configuration."
                    .to_string();
            }
            GenerationError::Transport(_) => {
                return "Failed to communicate with the AI model. Please check your connection and try again.".to_string();
            }
        }
    }

    /// Maps a provider status code and body onto the two user-facing failure
    /// classes.
    pub fn from_status(status: u16, body: &str) -> GenerationError {
        let invalid_key = body.contains("API key not valid") || body.contains("API_KEY_INVALID");
        if status == 401 || status == 403 || (status == 400 && invalid_key) {
            return GenerationError::CredentialRejected;
        }

        return GenerationError::Transport(format!("Gemini responded with status {status}"));
    }
}
