pub mod gemini;
pub mod vertex;

pub use gemini::GeminiGenerator;
pub use vertex::{GcpTokenSource, StaticToken, TokenSource, VertexGenerator};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::GeneratorConfig;

/// Errors raised while asking the hosted model for text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to reach model endpoint: {0}")]
    Request(String),

    #[error("Model endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Failed to obtain Google access token: {0}")]
    Auth(String),

    #[error("{0}")]
    Prompt(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

impl From<gcp_auth::Error> for GenerationError {
    fn from(err: gcp_auth::Error) -> Self {
        GenerationError::Auth(err.to_string())
    }
}

/// A hosted generative-text model.
///
/// Implementations are built once at startup and shared by every request.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, reported by the health endpoint
    fn model(&self) -> &str;

    /// Send `prompt` to the model and return its text answer
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// An empty answer is a malformed response, whichever backend produced it.
pub(crate) fn require_text(text: String) -> Result<String, GenerationError> {
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

/// Build the generator selected by configuration.
///
/// Vertex tokens come from, in order: the static `access_token`, the key
/// file at `credentials_file`, then Google's application-default chain.
pub async fn build_generator(
    config: &GeneratorConfig,
    credentials_file: Option<&Path>,
) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    match config {
        GeneratorConfig::Gemini { api_key, model } => {
            Ok(Arc::new(GeminiGenerator::new(api_key, model)))
        }
        GeneratorConfig::Vertex {
            project_id,
            location,
            model,
            access_token,
        } => {
            let tokens: Arc<dyn TokenSource> = match (access_token, credentials_file) {
                (Some(token), _) => Arc::new(StaticToken(token.clone())),
                (None, Some(path)) => Arc::new(GcpTokenSource::from_key_file(path)?),
                (None, None) => Arc::new(GcpTokenSource::application_default().await?),
            };
            Ok(Arc::new(VertexGenerator::new(
                project_id, location, model, tokens,
            )))
        }
    }
}
