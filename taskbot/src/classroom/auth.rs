// File: taskbot/src/classroom/auth.rs
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ClassroomSecrets;
use crate::constants::classroom::{
    ASSERTION_LIFETIME_SECONDS, JWT_BEARER_GRANT, SCOPES, TOKEN_EXPIRY_MARGIN_SECONDS,
};
use crate::errors::{ConfigError, RemoteError};

const SERVICE: &str = "Google OAuth";
const SERVICE_ACCOUNT_FIELD: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassroomCredentials {
    /// Pre-issued bearer token, used as-is
    AccessToken(String),
    /// OAuth client plus a long-lived refresh token
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    /// Service-account key, optionally acting on behalf of `subject`
    ServiceAccount {
        key: ServiceAccountKey,
        subject: Option<String>,
    },
}

impl ClassroomCredentials {
    /// Picks a service account first, then the refresh-token flow, then a
    /// static token. A service-account payload that does not parse is an
    /// error rather than a fallthrough.
    pub fn from_secrets(secrets: &ClassroomSecrets) -> Result<Self, ConfigError> {
        let present =
            |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(str::to_string);

        if let Some(raw) = present(&secrets.service_account_json) {
            return Ok(ClassroomCredentials::ServiceAccount {
                key: ServiceAccountKey::parse(&raw)?,
                subject: present(&secrets.impersonate_user),
            });
        }

        if let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            present(&secrets.client_id),
            present(&secrets.client_secret),
            present(&secrets.refresh_token),
        ) {
            return Ok(ClassroomCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            });
        }

        present(&secrets.access_token)
            .map(ClassroomCredentials::AccessToken)
            .ok_or_else(|| ConfigError::MissingRequired {
                field: concat!(
                    "classroom credentials (service_account_json, ",
                    "client_id/client_secret/refresh_token or access_token)"
                )
                .to_string(),
            })
    }
}

/// The parts of a Google service-account key file used for token exchange
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

fn malformed(reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field: SERVICE_ACCOUNT_FIELD.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

impl ServiceAccountKey {
    /// Accepts the key file contents as JSON or as base64-encoded JSON
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let json = if trimmed.starts_with('{') {
            trimmed.to_string()
        } else {
            let bytes = STANDARD
                .decode(trimmed)
                .map_err(|e| malformed(format!("neither JSON nor base64: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|e| malformed(format!("decoded payload is not UTF-8: {}", e)))?
        };

        let key: ServiceAccountKey = serde_json::from_str(&json).map_err(malformed)?;
        if key.client_email.trim().is_empty() {
            return Err(malformed("client_email is empty"));
        }
        key.encoding_key()?;
        Ok(key)
    }

    fn encoding_key(&self) -> Result<EncodingKey, ConfigError> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| malformed(format!("private_key: {}", e)))
    }

    /// Signed RS256 assertion for the JWT-bearer grant
    fn assertion(
        &self,
        audience: &str,
        subject: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, ConfigError> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SCOPES.join(" "),
            aud: audience,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECONDS,
            sub: subject,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key()?)
            .map_err(|e| malformed(format!("signing failed: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Hands out bearer tokens for Classroom calls, refreshing when needed
pub struct TokenSource {
    client: Client,
    token_url: String,
    credentials: Result<ClassroomCredentials, ConfigError>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(
        client: Client,
        token_url: &str,
        credentials: Result<ClassroomCredentials, ConfigError>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.to_string(),
            credentials,
            cached: Mutex::new(None),
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        let credentials = self.credentials.as_ref().map_err(|e| e.clone())?;

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let form: Vec<(&str, String)> = match credentials {
            ClassroomCredentials::AccessToken(token) => return Ok(token.clone()),
            ClassroomCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => {
                debug!("Exchanging refresh token for a Classroom access token");
                vec![
                    ("client_id", client_id.clone()),
                    ("client_secret", client_secret.clone()),
                    ("refresh_token", refresh_token.clone()),
                    ("grant_type", "refresh_token".to_string()),
                ]
            }
            ClassroomCredentials::ServiceAccount { key, subject } => {
                debug!("Exchanging service-account assertion for {}", key.client_email);
                let assertion = key.assertion(&self.token_url, subject.as_deref(), Utc::now())?;
                vec![
                    ("grant_type", JWT_BEARER_GRANT.to_string()),
                    ("assertion", assertion),
                ]
            }
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RemoteError::RequestFailed {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::AuthenticationFailed {
                service: SERVICE.to_string(),
                reason: format!("status {}: {}", status, body),
            }
            .into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| RemoteError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })?;

        let expires_at = token.expires_in.and_then(|secs| {
            Duration::try_seconds(secs - TOKEN_EXPIRY_MARGIN_SECONDS)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        });
        info!("Obtained Classroom access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }
}
