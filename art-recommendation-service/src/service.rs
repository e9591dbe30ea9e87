use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, Request},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, debug, info};
use uuid::Uuid;

use crate::{
    error::RecommendationError,
    generator::TextGenerator,
    models::{ArtRecommendation, RecommendationRequest},
};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/get-recommendations", post(get_recommendations))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags each request with a correlation ID, runs it inside a span carrying
/// that ID and echoes the ID back on the response.
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderName::from_static(CORRELATION_ID_HEADER);
    let value = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &value {
        request.headers_mut().insert(header.clone(), value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = value {
        response.headers_mut().insert(header, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Art Recommendation Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Turns a mood into a generated art recommendation",
        "endpoints": {
            "POST /get-recommendations": "Recommend art for {\"text\": <mood>}",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model": state.generator.model(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<Vec<ArtRecommendation>>, RecommendationError> {
    // An unreadable body carries no usable text either
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(rejection = %rejection, "Could not parse recommendation request");
            return Err(RecommendationError::MissingText);
        }
    };
    let text = request.input_text().ok_or(RecommendationError::MissingText)?;

    info!(
        text_length = text.len(),
        model = %state.generator.model(),
        "Generating art recommendation"
    );

    let title = state.generator.generate(text).await?;

    info!(title_length = title.len(), "Art recommendation generated");
    Ok(Json(vec![ArtRecommendation::from_generated_title(title)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationError;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Generator stub that records prompts and answers with a fixed result.
    struct StubGenerator {
        answer: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(text.to_string()),
                prompts: Mutex::new(vec![]),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Err(message.to_string()),
                prompts: Mutex::new(vec![]),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn model(&self) -> &str {
            "stub-model"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(GenerationError::Prompt)
        }
    }

    fn app(generator: Arc<StubGenerator>) -> Router {
        build_router(AppState::new(generator))
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/get-recommendations")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_recommendation_uses_model_text_as_title() {
        let generator = StubGenerator::answering("Nocturne in Blue");

        let (status, body) = post_json(
            app(generator.clone()),
            r#"{"text": "melancholy rainy evening"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "id": 1,
                "title": "Nocturne in Blue",
                "description": "Generated art recommendation",
                "imageUrl": "https://example.com/image.jpg",
                "latitude": 48.858844,
                "longitude": 2.294351,
                "material": "Canvas",
                "era": "Modern",
                "origin": "Unknown",
                "lore": "This is a generated piece of art based on your mood."
            }])
        );
        assert_eq!(generator.prompts(), vec!["melancholy rainy evening"]);
    }

    #[tokio::test]
    async fn test_constant_fields_do_not_depend_on_input() {
        let generator = StubGenerator::answering("Still Life");

        let (_, first) = post_json(app(generator.clone()), r#"{"text": "happy"}"#).await;
        let (_, second) = post_json(app(generator.clone()), r#"{"text": "anxious"}"#).await;

        assert_eq!(first, second);
        assert_eq!(first.as_array().unwrap().len(), 1);
        assert_eq!(generator.prompts(), vec!["happy", "anxious"]);
    }

    #[tokio::test]
    async fn test_missing_or_empty_text_is_rejected() {
        for body in [r#"{}"#, r#"{"text": ""}"#, r#"{"text": null}"#, r#"{"mood": "calm"}"#] {
            let generator = StubGenerator::answering("unused");

            let (status, response) = post_json(app(generator.clone()), body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(response, json!({"error": "Input text is required"}));
            assert!(generator.prompts().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_rejected() {
        for body in ["not json", r#"{"text": 42}"#, ""] {
            let generator = StubGenerator::answering("unused");

            let (status, response) = post_json(app(generator.clone()), body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(response, json!({"error": "Input text is required"}));
            assert!(generator.prompts().is_empty());
        }
    }

    #[tokio::test]
    async fn test_contents_body_is_accepted() {
        let generator = StubGenerator::answering("Water Lilies");

        let (status, body) = post_json(
            app(generator.clone()),
            r#"{"contents": [{"role": "user", "parts": [{"text": "serene"}]}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Water Lilies");
        assert_eq!(generator.prompts(), vec!["serene"]);
    }

    #[tokio::test]
    async fn test_model_failure_is_500_and_not_cached() {
        let generator = StubGenerator::failing("429 Resource exhausted");

        for _ in 0..2 {
            let (status, body) = post_json(app(generator.clone()), r#"{"text": "calm"}"#).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"error": "429 Resource exhausted"}));
        }
        assert_eq!(generator.prompts(), vec!["calm", "calm"]);
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app(StubGenerator::answering("x")), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "stub-model");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, body) = send(app(StubGenerator::answering("x")), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["POST /get-recommendations"].is_string());
    }

    #[tokio::test]
    async fn test_responses_carry_correlation_id() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(StubGenerator::answering("x"))
            .oneshot(request)
            .await
            .unwrap();

        let id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
