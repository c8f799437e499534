use std::sync::Arc;

use chrono::Utc;
use reelpost_core::models::{CredentialRecord, CredentialState};
use reelpost_storage::CredentialStore;
use subtle::ConstantTimeEq;

use super::{AuthError, AuthorizationRequest, IdentityProvider};

/// Authorization flow controller for the single stored credential.
///
/// Reads never refresh implicitly: [`AuthFlow::load_credentials`] only classifies
/// the stored record, and [`AuthFlow::refresh`] is the one operation that talks to
/// the token endpoint for an existing grant. [`AuthFlow::get_credentials`] composes
/// the two for callers that just want a usable credential.
#[derive(Clone)]
pub struct AuthFlow {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn CredentialStore>,
}

impl AuthFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn CredentialStore>) -> Self {
        Self { provider, store }
    }

    pub fn get_auth_url(&self) -> Result<AuthorizationRequest, AuthError> {
        self.provider.authorization_url()
    }

    /// Complete the handshake from the full callback URL the provider redirected to.
    #[tracing::instrument(skip_all)]
    pub async fn handle_callback(
        &self,
        callback_url: &str,
        expected_state: Option<&str>,
    ) -> Result<CredentialRecord, AuthError> {
        let url = url::Url::parse(callback_url)
            .map_err(|e| AuthError::InvalidCallback(e.to_string()))?;

        let mut code = None;
        let mut state = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(AuthError::ProviderDenied(error));
        }

        match (expected_state, state.as_deref()) {
            (Some(expected), Some(received))
                if bool::from(expected.as_bytes().ct_eq(received.as_bytes())) => {}
            _ => return Err(AuthError::StateMismatch),
        }

        let code = code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)?;
        let record = self.provider.exchange_code(&code).await?;
        self.store.save(&record).await?;

        tracing::info!("Authorization completed, credential stored");
        Ok(record)
    }

    /// Classify the stored credential without contacting the provider.
    pub async fn load_credentials(&self) -> Result<CredentialState, AuthError> {
        let record = self.store.load().await?;
        Ok(CredentialState::classify(record, Utc::now()))
    }

    /// Exchange the record's refresh token and persist the result.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord, AuthError> {
        if !record.has_refresh_token() {
            return Err(AuthError::NoRefreshToken);
        }
        let refreshed = self.provider.refresh(record).await?;
        self.store.save(&refreshed).await?;
        tracing::info!(expiry = ?refreshed.expiry, "Access token refreshed");
        Ok(refreshed)
    }

    /// A usable credential, refreshing at most once. Any failure yields `None`.
    pub async fn get_credentials(&self) -> Option<CredentialRecord> {
        let state = match self.load_credentials().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored credential");
                return None;
            }
        };

        match state {
            CredentialState::Missing => None,
            CredentialState::Valid(record) => Some(record),
            CredentialState::Expired(record) if record.has_refresh_token() => {
                match self.refresh(&record).await {
                    Ok(refreshed) if !refreshed.is_expired() => Some(refreshed),
                    Ok(_) => {
                        tracing::warn!("Refreshed credential is already expired");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Credential refresh failed");
                        None
                    }
                }
            }
            CredentialState::Expired(_) => {
                tracing::debug!("Stored credential expired and cannot be refreshed");
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get_credentials().await.is_some()
    }

    /// Forget the stored credential. Succeeds when nothing is stored.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.delete().await?;
        Ok(())
    }
}
