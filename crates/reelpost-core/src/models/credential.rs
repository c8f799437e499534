use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::TOKEN_EXPIRY_SKEW_SECS;

/// The persisted OAuth grant: tokens, client identity and granted scopes.
///
/// Field names match the `token.json` layout written by earlier deployments, so
/// existing files keep loading. Records without `expiry` never report as expired.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_empty() {
            return true;
        }
        match self.expiry {
            Some(expiry) => expiry <= now + Duration::seconds(TOKEN_EXPIRY_SKEW_SECS),
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("token", &"<redacted>")
            .field("has_refresh_token", &self.has_refresh_token())
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Validity of the stored credential, as reported by a plain read.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    Missing,
    Valid(CredentialRecord),
    Expired(CredentialRecord),
}

impl CredentialState {
    pub fn classify(record: Option<CredentialRecord>, now: DateTime<Utc>) -> Self {
        match record {
            None => CredentialState::Missing,
            Some(record) if record.is_expired_at(now) => CredentialState::Expired(record),
            Some(record) => CredentialState::Valid(record),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, CredentialState::Valid(_))
    }
}
