//! OAuth token client for the Microsoft identity platform
//!
//! Implements the refresh grant and the authorization-code (PKCE) exchange
//! against the v2.0 token endpoint. Classification of failures matters here:
//! `invalid_grant` means the refresh token is revoked or expired and is
//! terminal, while transport failures are transient and must never be read
//! as a revoked token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tempolink_core::ports::TokenClient;
use tempolink_domain::{OAuthSettings, Result, TempoLinkError, TokenGrant};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// OAuth client against the identity provider's token endpoint.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    settings: OAuthSettings,
}

impl IdentityClient {
    pub fn new(client: Client, settings: OAuthSettings) -> Self {
        Self { client, settings }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .client
            .post(&self.settings.token_endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                InfraError(TempoLinkError::Network(format!("token request failed: {e}")))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_token_error(status.as_u16(), &body));
        }

        let grant: TokenResponse = response.json().await.map_err(|e| {
            InfraError(TempoLinkError::Provider(format!("failed to parse token response: {e}")))
        })?;

        debug!(expires_in = grant.expires_in, "token endpoint returned a grant");
        Ok(TokenGrant {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
        })
    }
}

#[async_trait]
impl TokenClient for IdentityClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("client_id", self.settings.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("scope", self.settings.scope.as_str()),
        ])
        .await
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("client_id", self.settings.client_id.as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("scope", self.settings.scope.as_str()),
        ])
        .await
    }
}

/// Map a token endpoint error response onto the domain taxonomy.
///
/// Only `invalid_grant` is terminal. Anything else from the provider is a
/// provider-side failure the caller may retry.
fn classify_token_error(status: u16, body: &str) -> TempoLinkError {
    let parsed: Option<TokenErrorResponse> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().map(|e| e.error.as_str()).unwrap_or_default();
    let description = parsed
        .as_ref()
        .and_then(|e| e.error_description.as_deref())
        .unwrap_or(body)
        .to_string();

    if code == "invalid_grant" {
        warn!("token endpoint rejected grant as invalid");
        return TempoLinkError::TokenInvalid(description);
    }

    match status {
        400..=499 => TempoLinkError::Unauthorized(format!("token request rejected ({status}): {description}")),
        _ => TempoLinkError::Provider(format!("token endpoint error ({status}): {description}")),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}
