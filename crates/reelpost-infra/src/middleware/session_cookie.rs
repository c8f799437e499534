//! HMAC-signed session cookie
//!
//! Cookie value format: `<session_id>.<hex hmac-sha256(session_id)>`. The cookie only
//! carries the id; session data stays server-side in [`crate::SessionStore`].

use axum::http::{header::COOKIE, HeaderMap};
use hmac::{Hmac, Mac};
use reelpost_core::constants::SESSION_COOKIE_NAME;
use reelpost_core::SecretKey;
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SessionCookie {
    mac: HmacSha256,
    secure: bool,
    max_age: Duration,
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("secure", &self.secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl SessionCookie {
    /// `secure` adds the `Secure` attribute; set it when served over HTTPS.
    pub fn new(
        key: &SecretKey,
        secure: bool,
        max_age: Duration,
    ) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(key.as_bytes())?,
            secure,
            max_age,
        })
    }

    fn signature(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn sign(&self, session_id: &str) -> String {
        format!("{}.{}", session_id, self.signature(session_id))
    }

    /// Return the session id if `value` carries a valid signature.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (session_id, signature) = value.rsplit_once('.')?;
        if session_id.is_empty() {
            return None;
        }
        let expected = self.signature(session_id);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Some(session_id.to_string())
        } else {
            None
        }
    }

    /// `Set-Cookie` value establishing the session.
    pub fn set_cookie(&self, session_id: &str) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{}",
            SESSION_COOKIE_NAME,
            self.sign(session_id),
            self.max_age.as_secs(),
            if self.secure { "; Secure" } else { "" }
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{}",
            SESSION_COOKIE_NAME,
            if self.secure { "; Secure" } else { "" }
        )
    }

    /// Verified session id from the request's `Cookie` headers.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE_NAME)
            .and_then(|(_, value)| self.verify(value.trim()))
    }
}
