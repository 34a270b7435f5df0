//! Shared-secret authentication.
//!
//! # Responsibilities
//! - Compare a request's claimed secret against the stored pairing secret
//! - Distinguish "no secret configured yet" (403) from "wrong secret" (401)
//!
//! # Design Decisions
//! - Comparison is exact and case-sensitive, byte for byte, with no
//!   normalization
//! - A stored blank secret counts as not configured, same as no value
//! - Only `/data` and `/command` are protected; `/set-secret` is the
//!   unauthenticated first-use bootstrap and stays that way

use std::sync::Arc;

use crate::http::request::Payload;
use crate::store::{SecretStore, SECRET_KEY};

/// Result of validating a request's claimed secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The claimed secret matches the stored one.
    Authorized,
    /// No secret has been configured on the device yet.
    NotConfigured,
    /// The claimed secret does not match.
    Unauthorized,
}

/// Validates claimed secrets against the [`SecretStore`].
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn SecretStore>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Check the payload's `secretKey` against the stored secret.
    pub fn authorize(&self, payload: &Payload) -> AuthOutcome {
        let stored = match self.store.get(SECRET_KEY) {
            Some(value) if !value.trim().is_empty() => value,
            _ => return AuthOutcome::NotConfigured,
        };

        if payload.secret_key != stored {
            return AuthOutcome::Unauthorized;
        }

        AuthOutcome::Authorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySecretStore;

    fn payload_with_secret(secret: &str) -> Payload {
        Payload {
            secret_key: secret.to_string(),
            ..Payload::default()
        }
    }

    fn authenticator(stored: Option<&str>) -> Authenticator {
        let store = MemorySecretStore::new();
        if let Some(value) = stored {
            store.set(SECRET_KEY, value);
        }
        Authenticator::new(Arc::new(store))
    }

    #[test]
    fn unset_secret_is_not_configured() {
        let auth = authenticator(None);
        assert_eq!(
            auth.authorize(&payload_with_secret("anything")),
            AuthOutcome::NotConfigured
        );
    }

    #[test]
    fn blank_secret_is_not_configured() {
        let auth = authenticator(Some("   "));
        assert_eq!(
            auth.authorize(&payload_with_secret("   ")),
            AuthOutcome::NotConfigured
        );
    }

    #[test]
    fn mismatch_is_unauthorized() {
        let auth = authenticator(Some("correct"));
        assert_eq!(
            auth.authorize(&payload_with_secret("wrong")),
            AuthOutcome::Unauthorized
        );
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let auth = authenticator(Some("Secret"));
        assert_eq!(
            auth.authorize(&payload_with_secret("secret")),
            AuthOutcome::Unauthorized
        );
    }

    #[test]
    fn missing_secret_field_is_unauthorized() {
        let auth = authenticator(Some("correct"));
        assert_eq!(
            auth.authorize(&Payload::default()),
            AuthOutcome::Unauthorized
        );
    }

    #[test]
    fn exact_match_is_authorized() {
        let auth = authenticator(Some("correct"));
        assert_eq!(
            auth.authorize(&payload_with_secret("correct")),
            AuthOutcome::Authorized
        );
    }
}
