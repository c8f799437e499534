//! Google implementation of [`IdentityProvider`] on top of the `oauth2` crate.

use async_trait::async_trait;
use chrono::Utc;
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use reelpost_core::constants::{GOOGLE_AUTH_URI, OAUTH_SCOPES};
use reelpost_core::models::CredentialRecord;
use reelpost_core::ClientSecrets;

use super::{AuthError, AuthorizationRequest, IdentityProvider};

pub struct GoogleIdentityProvider {
    secrets: Option<ClientSecrets>,
    redirect_uri: String,
}

impl std::fmt::Debug for GoogleIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdentityProvider")
            .field("configured", &self.secrets.is_some())
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl GoogleIdentityProvider {
    /// `secrets` may be absent; every operation then fails with [`AuthError::Config`].
    pub fn new(secrets: Option<ClientSecrets>, redirect_uri: impl Into<String>) -> Self {
        Self {
            secrets,
            redirect_uri: redirect_uri.into(),
        }
    }

    fn secrets(&self) -> Result<&ClientSecrets, AuthError> {
        self.secrets.as_ref().ok_or_else(|| {
            AuthError::Config(
                "no client_secret*.json file found and GOOGLE_CLIENT_SECRET is not set"
                    .to_string(),
            )
        })
    }

    fn configured_client(&self) -> Result<BasicClient, AuthError> {
        let secrets = self.secrets()?;
        build_client(
            &secrets.client_id,
            &secrets.client_secret,
            &secrets.auth_uri,
            &secrets.token_uri,
            Some(&self.redirect_uri),
        )
    }
}

fn build_client(
    client_id: &str,
    client_secret: &str,
    auth_uri: &str,
    token_uri: &str,
    redirect_uri: Option<&str>,
) -> Result<BasicClient, AuthError> {
    let auth_url = AuthUrl::new(auth_uri.to_string())
        .map_err(|e| AuthError::Config(format!("invalid auth_uri '{}': {}", auth_uri, e)))?;
    let token_url = TokenUrl::new(token_uri.to_string())
        .map_err(|e| AuthError::Config(format!("invalid token_uri '{}': {}", token_uri, e)))?;

    let client = BasicClient::new(
        ClientId::new(client_id.to_string()),
        Some(ClientSecret::new(client_secret.to_string())),
        auth_url,
        Some(token_url),
    );

    match redirect_uri {
        Some(uri) => {
            let redirect = RedirectUrl::new(uri.to_string())
                .map_err(|e| AuthError::Config(format!("invalid redirect URI '{}': {}", uri, e)))?;
            Ok(client.set_redirect_uri(redirect))
        }
        None => Ok(client),
    }
}

fn describe_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => match response.error_description() {
            Some(description) => format!("{}: {}", response.error(), description),
            None => response.error().to_string(),
        },
        other => other.to_string(),
    }
}

/// Turn a token response into a record; fields the response omits fall back to `previous`.
fn record_from_token(
    token: &BasicTokenResponse,
    client_id: &str,
    client_secret: &str,
    token_uri: &str,
    previous: Option<&CredentialRecord>,
) -> CredentialRecord {
    let expiry = token
        .expires_in()
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .map(|d| Utc::now() + d);

    let scopes = token
        .scopes()
        .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
        .or_else(|| previous.and_then(|p| p.scopes.clone()))
        .or_else(|| Some(OAUTH_SCOPES.iter().map(|s| (*s).to_string()).collect()));

    CredentialRecord {
        token: token.access_token().secret().clone(),
        refresh_token: token
            .refresh_token()
            .map(|t| t.secret().clone())
            .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
        token_uri: token_uri.to_string(),
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        scopes,
        expiry,
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError> {
        let client = self.configured_client()?;
        let (url, state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("include_granted_scopes", "true")
            .add_extra_param("prompt", "consent")
            .url();

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state: state.secret().clone(),
        })
    }

    #[tracing::instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<CredentialRecord, AuthError> {
        let secrets = self.secrets()?;
        let client = self.configured_client()?;

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::Exchange(describe_token_error(e)))?;

        tracing::info!(
            has_refresh_token = token.refresh_token().is_some(),
            "Authorization code exchanged"
        );

        Ok(record_from_token(
            &token,
            &secrets.client_id,
            &secrets.client_secret,
            &secrets.token_uri,
            None,
        ))
    }

    #[tracing::instrument(skip(self, record))]
    async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord, AuthError> {
        let refresh_token = record
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        // The record carries its own client identity; the auth URL is unused here.
        let auth_uri = self
            .secrets
            .as_ref()
            .map(|s| s.auth_uri.as_str())
            .unwrap_or(GOOGLE_AUTH_URI);
        let client = build_client(
            &record.client_id,
            &record.client_secret,
            auth_uri,
            &record.token_uri,
            None,
        )?;

        let token = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::Refresh(describe_token_error(e)))?;

        Ok(record_from_token(
            &token,
            &record.client_id,
            &record.client_secret,
            &record.token_uri,
            Some(record),
        ))
    }
}
