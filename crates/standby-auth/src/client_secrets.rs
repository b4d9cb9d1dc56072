//! Google OAuth client configuration (`credentials.json`).

use serde::Deserialize;
use std::path::Path;

use crate::error::AuthError;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity downloaded from the Google Cloud console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<SecretsBody>,
    web: Option<SecretsBody>,
}

#[derive(Debug, Deserialize)]
struct SecretsBody {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Read a client secrets file in Google's "installed" or "web" layout.
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AuthError::InvalidCredentials(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let file: SecretsFile =
            serde_json::from_str(json).map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;

        let body = file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidCredentials("expected an `installed` or `web` section".to_string())
        })?;

        if body.client_id.trim().is_empty() || body.client_secret.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "client_id and client_secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client_id: body.client_id,
            client_secret: body.client_secret,
            auth_uri: body.auth_uri.unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: body.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}
