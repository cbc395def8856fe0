#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::system_instruction;
use super::GenerationError;

/// Text fragments in arrival order. Fragment boundaries carry no meaning.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

pub struct BackendPrompt {
    pub text: String,
    pub system_instruction: String,
}

impl BackendPrompt {
    pub fn new(text: &str) -> BackendPrompt {
        return BackendPrompt {
            text: text.trim().to_string(),
            system_instruction: system_instruction(),
        };
    }
}

#[async_trait]
pub trait Backend {
    /// Used at startup, and again before every request, to verify all
    /// configurations are available to work with the backend. Must not touch
    /// the network.
    async fn health_check(&self) -> Result<(), GenerationError>;

    /// Opens a streaming completion for the prompt. Transport failures that
    /// happen after the stream is open are yielded as the stream's last item.
    async fn stream_completion(&self, prompt: BackendPrompt)
        -> Result<FragmentStream, GenerationError>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
