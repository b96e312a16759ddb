// File: taskbot/src/config/secrets.rs
//! Secrets loader for API tokens and OAuth credentials.
//!
//! Secrets live in a separate TOML file (config/secrets.toml) that should be
//! excluded from version control. Environment variables override file values.
//!
//! Example secrets.toml:
//! ```toml
//! [todoist]
//! api_token = "0123456789abcdef"
//!
//! [classroom]
//! client_id = "xxx.apps.googleusercontent.com"
//! client_secret = "secret"
//! refresh_token = "1//refresh"
//! # or a service-account key, raw JSON or base64, optionally impersonating a user
//! # service_account_json = "eyJ0eXBlIjoic2VydmljZV9hY2NvdW50Ii..."
//! # impersonate_user = "student@example.edu"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoistSecrets {
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassroomSecrets {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub service_account_json: Option<String>,
    pub impersonate_user: Option<String>,
}

/// Structure matching the secrets.toml file format
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsFile {
    #[serde(default)]
    pub todoist: TodoistSecrets,
    #[serde(default)]
    pub classroom: ClassroomSecrets,
}

/// Environment variables that override secrets.toml
const ENV_OVERRIDES: [&str; 7] = [
    "TODOIST_API_TOKEN",
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_REFRESH_TOKEN",
    "GOOGLE_ACCESS_TOKEN",
    "GOOGLE_SERVICE_ACCOUNT_JSON",
    "GOOGLE_IMPERSONATE_USER",
];

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, relying on environment variables",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded secrets from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    /// Applies overrides from `lookup`, usually `std::env::var`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for name in ENV_OVERRIDES {
            let Some(value) = lookup(name).filter(|v| !v.is_empty()) else {
                continue;
            };
            let slot = match name {
                "TODOIST_API_TOKEN" => &mut self.secrets.todoist.api_token,
                "GOOGLE_CLIENT_ID" => &mut self.secrets.classroom.client_id,
                "GOOGLE_CLIENT_SECRET" => &mut self.secrets.classroom.client_secret,
                "GOOGLE_REFRESH_TOKEN" => &mut self.secrets.classroom.refresh_token,
                "GOOGLE_SERVICE_ACCOUNT_JSON" => &mut self.secrets.classroom.service_account_json,
                "GOOGLE_IMPERSONATE_USER" => &mut self.secrets.classroom.impersonate_user,
                _ => &mut self.secrets.classroom.access_token,
            };
            info!("Using {} from environment", name);
            *slot = Some(value);
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn into_secrets(self) -> SecretsFile {
        self.secrets
    }
}
