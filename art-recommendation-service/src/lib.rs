pub mod config;
pub mod credentials;
pub mod error;
pub mod generator;
pub mod models;
pub mod service;

pub use config::{GeneratorConfig, ServiceConfig};
pub use error::RecommendationError;
pub use generator::{GenerationError, TextGenerator, build_generator};
pub use models::ArtRecommendation;
pub use service::{AppState, build_router};
