use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::{GenerationError, TextGenerator, require_text};

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Supplies the bearer token for each Vertex AI call.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, GenerationError>;
}

/// A fixed token, e.g. one printed by `gcloud auth print-access-token`.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, GenerationError> {
        Ok(self.0.clone())
    }
}

/// Tokens minted from Google credentials. The provider caches each token
/// and refreshes it shortly before it expires.
pub struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl GcpTokenSource {
    /// Service account from a key file, such as the one written from
    /// `GOOGLE_APPLICATION_CREDENTIALS_JSON` at startup.
    pub fn from_key_file(path: &Path) -> Result<Self, GenerationError> {
        let account = gcp_auth::CustomServiceAccount::from_file(path)?;
        Ok(Self {
            provider: Arc::new(account),
        })
    }

    /// Google's application-default chain: `GOOGLE_APPLICATION_CREDENTIALS`,
    /// gcloud user credentials, then the metadata server.
    pub async fn application_default() -> Result<Self, GenerationError> {
        Ok(Self {
            provider: gcp_auth::provider().await?,
        })
    }
}

#[async_trait]
impl TokenSource for GcpTokenSource {
    async fn access_token(&self) -> Result<String, GenerationError> {
        let token = self.provider.token(&[CLOUD_PLATFORM_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }
}

/// Gemini served from a Vertex AI project, authenticated with OAuth bearer tokens.
pub struct VertexGenerator {
    model: String,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
    client: Client,
}

impl VertexGenerator {
    pub fn new(
        project_id: &str,
        location: &str,
        model: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        let endpoint = format!(
            "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model}:generateContent"
        );
        Self::with_endpoint(endpoint, model, tokens)
    }

    /// Point the generator at an explicit `generateContent` URL.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        model: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            model: model.to_string(),
            endpoint: endpoint.into(),
            tokens,
            // no timeout: the call runs until the provider answers or the connection fails
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, GenerationError> {
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or(GenerationError::EmptyResponse)?;

        require_text(content.parts.into_iter().filter_map(|p| p.text).collect())
    }
}

#[async_trait]
impl TextGenerator for VertexGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let access_token = self.tokens.access_token().await?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending prompt to Vertex AI"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Request(format!("Failed to parse response: {e}")))?;

        parsed.into_text()
    }
}
