//! Bearer token acquisition for the management API.

use crate::config::CredentialsConfig;
use crate::error::{ProbeError, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Scope requested for Azure Resource Manager tokens.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Tokens are renewed this long before the issuer's expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Supplies the `Authorization` header for management requests.
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid header value, e.g. `Bearer eyJ...`.
    ///
    /// Implementations refresh expired credentials before returning.
    fn authorization_header(&self) -> Result<String>;
}

/// A fixed bearer token, for tests and pre-issued tokens.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps a raw access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn authorization_header(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.0))
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// OAuth2 client-credentials flow for a service principal.
pub struct ClientSecretCredential {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientSecretCredential {
    /// Creates a credential from configuration.
    pub fn new(credentials: &CredentialsConfig, client: Client) -> Result<Self> {
        if credentials.tenant_id.trim().is_empty() || credentials.client_id.trim().is_empty() {
            return Err(ProbeError::ConfigError(
                "credentials.tenant_id and credentials.client_id are required".to_string(),
            ));
        }
        if credentials.client_secret.is_empty() {
            return Err(ProbeError::ConfigError(format!(
                "credentials.client_secret is empty; set it or {}",
                crate::config::CLIENT_SECRET_ENV
            )));
        }

        Ok(Self {
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                credentials.authority.trim_end_matches('/'),
                credentials.tenant_id
            ),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            scope: MANAGEMENT_SCOPE.to_string(),
            client,
            cached: Mutex::new(None),
        })
    }

    /// Returns the token endpoint this credential posts to.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn request_token(&self) -> Result<CachedToken> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("scope", &self.scope)
            .finish();

        debug!(url = %self.token_url, "requesting management token");
        let response = self
            .client
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .map_err(|e| ProbeError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ProbeError::Auth(format!("failed to read token response: {}", e)))?;
        if !status.is_success() {
            return Err(ProbeError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProbeError::Auth(format!("malformed token response: {}", e)))?;
        let lifetime = Duration::from_secs(parse_expires_in(token.expires_in.as_ref()));
        info!(expires_in_secs = lifetime.as_secs(), "acquired management token");

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        })
    }
}

impl TokenProvider for ClientSecretCredential {
    fn authorization_header(&self) -> Result<String> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| ProbeError::Auth("token cache poisoned".to_string()))?;

        let token = match cached.as_ref() {
            Some(token) if Instant::now() < token.refresh_at => token.clone(),
            _ => {
                let token = self.request_token()?;
                *cached = Some(token.clone());
                token
            }
        };

        Ok(format!("Bearer {}", token.access_token))
    }
}

/// `expires_in` is a number in v2 responses and a string in v1 responses.
fn parse_expires_in(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
