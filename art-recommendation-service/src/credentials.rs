use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::ServiceConfig;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("GOOGLE_APPLICATION_CREDENTIALS_JSON is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("failed to write credentials to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write inline service-account JSON to `path`.
///
/// The content is checked to be a JSON object first so a truncated secret
/// fails at startup rather than on the first model call.
pub fn materialize(json: &str, path: &Path) -> Result<(), CredentialsError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| CredentialsError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(CredentialsError::InvalidJson("expected an object".to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CredentialsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, json).map_err(|source| CredentialsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Materialize configured inline credentials.
///
/// Returns the path of the written key file, which the Vertex generator loads
/// its service account from. `None` when no inline JSON is configured.
pub fn bootstrap(config: &ServiceConfig) -> Result<Option<PathBuf>, CredentialsError> {
    let Some(json) = config.credentials_json.as_deref() else {
        return Ok(None);
    };

    materialize(json, &config.credentials_path)?;

    info!(
        path = %config.credentials_path.display(),
        "Wrote service account credentials"
    );
    Ok(Some(config.credentials_path.clone()))
}
