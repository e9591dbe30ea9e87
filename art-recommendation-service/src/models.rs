use serde::{Deserialize, Serialize};

pub const RECOMMENDATION_ID: i64 = 1;
pub const RECOMMENDATION_DESCRIPTION: &str = "Generated art recommendation";
pub const RECOMMENDATION_IMAGE_URL: &str = "https://example.com/image.jpg";
pub const RECOMMENDATION_LATITUDE: f64 = 48.858844;
pub const RECOMMENDATION_LONGITUDE: f64 = 2.294351;
pub const RECOMMENDATION_MATERIAL: &str = "Canvas";
pub const RECOMMENDATION_ERA: &str = "Modern";
pub const RECOMMENDATION_ORIGIN: &str = "Unknown";
pub const RECOMMENDATION_LORE: &str = "This is a generated piece of art based on your mood.";

/// A single recommended art piece as returned to clients.
///
/// Everything except `title` is placeholder data; the title carries the
/// model's answer for the mood the user typed.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtRecommendation {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub material: String,
    pub era: String,
    pub origin: String,
    pub lore: String,
}

impl ArtRecommendation {
    pub fn from_generated_title(title: impl Into<String>) -> Self {
        Self {
            id: RECOMMENDATION_ID,
            title: title.into(),
            description: RECOMMENDATION_DESCRIPTION.to_string(),
            image_url: RECOMMENDATION_IMAGE_URL.to_string(),
            latitude: RECOMMENDATION_LATITUDE,
            longitude: RECOMMENDATION_LONGITUDE,
            material: RECOMMENDATION_MATERIAL.to_string(),
            era: RECOMMENDATION_ERA.to_string(),
            origin: RECOMMENDATION_ORIGIN.to_string(),
            lore: RECOMMENDATION_LORE.to_string(),
        }
    }
}

/// Body of `POST /get-recommendations`.
///
/// `{"text": "..."}` is the primary shape. The Gemini-style
/// `{"contents": [{"parts": [{"text": "..."}]}]}` body sent by older clients
/// is accepted as a fallback.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub contents: Option<Vec<RequestContent>>,
}

#[derive(Debug, Deserialize)]
pub struct RequestContent {
    #[serde(default)]
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Deserialize)]
pub struct RequestPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl RecommendationRequest {
    /// The user's input text, if the body carries a non-empty one.
    pub fn input_text(&self) -> Option<&str> {
        let text = self.text.as_deref().filter(|t| !t.is_empty());
        text.or_else(|| {
            self.contents
                .as_ref()?
                .first()?
                .parts
                .first()?
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
