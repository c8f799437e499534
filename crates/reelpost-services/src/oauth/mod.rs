//! OAuth 2.0 authorization for the platform account.
//!
//! [`AuthFlow`] owns the lifecycle of the single stored credential. The token
//! endpoint conversation itself is delegated to an [`IdentityProvider`].

mod flow;
mod google;

use async_trait::async_trait;
use reelpost_core::models::CredentialRecord;
use reelpost_storage::StorageError;
use thiserror::Error;

pub use flow::AuthFlow;
pub use google::GoogleIdentityProvider;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth client is not configured: {0}")]
    Config(String),

    #[error("Authorization was denied by the provider: {0}")]
    ProviderDenied(String),

    #[error("Missing or mismatched state parameter")]
    StateMismatch,

    #[error("Callback did not include an authorization code")]
    MissingCode,

    #[error("Invalid callback URL: {0}")]
    InvalidCallback(String),

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Stored credential has no refresh token")]
    NoRefreshToken,

    #[error("Credential store error: {0}")]
    Store(#[from] StorageError),
}

/// Where to send the user, plus the anti-forgery state to expect back.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Token endpoint operations of an OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the consent URL with a fresh state token
    fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError>;

    /// Trade an authorization code for a new credential record
    async fn exchange_code(&self, code: &str) -> Result<CredentialRecord, AuthError>;

    /// Obtain a fresh access token for `record`, returning the updated record
    async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord, AuthError>;
}
