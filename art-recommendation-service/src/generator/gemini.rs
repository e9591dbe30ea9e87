use async_trait::async_trait;
use rig::completion::Chat;
use rig::prelude::*;
use rig::providers::gemini;
use tracing::debug;

use super::{GenerationError, TextGenerator, require_text};

/// Gemini via the public Generative Language API, authenticated with an API key.
pub struct GeminiGenerator {
    model: String,
    agent: rig::agent::Agent<gemini::completion::CompletionModel>,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, model: &str) -> Self {
        let client = gemini::Client::new(api_key);
        Self {
            model: model.to_string(),
            agent: client.agent(model).build(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending prompt to Gemini");

        // Single-turn: the mood is the whole prompt, no history is kept
        let text = self
            .agent
            .chat(prompt, vec![])
            .await
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        require_text(text)
    }
}
