//! Environment-driven service configuration.
//!
//! Values come from the process environment after `.env` files have been
//! loaded. Parsing goes through a lookup closure so tests can feed a map
//! instead of mutating the real environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-002";
pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";
pub const DEFAULT_CREDENTIALS_FILE: &str = "service-account-key.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Which hosted model backend to call, with what it needs to authenticate.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorConfig {
    Gemini {
        api_key: String,
        model: String,
    },
    Vertex {
        project_id: String,
        location: String,
        model: String,
        /// Static bearer token; when unset, tokens come from service account credentials
        access_token: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub generator: GeneratorConfig,
    /// Inline service-account JSON to materialize at `credentials_path`
    pub credentials_json: Option<String>,
    pub credentials_path: PathBuf,
    pub log_format: LogFormat,
}

impl ServiceConfig {
    /// Load `.env` from the working directory, falling back to its parent,
    /// then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_path("../.env");
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, matching how .env files are usually written
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let model = get("GENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let provider = get("GENAI_PROVIDER").unwrap_or_else(|| {
            if get("PROJECT_ID").is_some() {
                "vertex".to_string()
            } else {
                "gemini".to_string()
            }
        });

        let generator = match provider.to_lowercase().as_str() {
            "gemini" => GeneratorConfig::Gemini {
                api_key: require("GEMINI_API_KEY")?,
                model,
            },
            "vertex" => GeneratorConfig::Vertex {
                project_id: require("PROJECT_ID")?,
                location: get("VERTEX_LOCATION")
                    .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.to_string()),
                model,
                access_token: get("VERTEX_ACCESS_TOKEN"),
            },
            _ => {
                return Err(ConfigError::Invalid {
                    key: "GENAI_PROVIDER",
                    value: provider,
                })
            }
        };

        let credentials_path = get("GOOGLE_APPLICATION_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_CREDENTIALS_FILE));

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Ok(Self {
            host,
            port,
            generator,
            credentials_json: get("GOOGLE_APPLICATION_CREDENTIALS_JSON"),
            credentials_path,
            log_format,
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: self.host.clone(),
        })
    }
}
