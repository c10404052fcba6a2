//! Ambient bearer credential, injected rather than read from a global.
//!
//! Every authenticated call goes through a [`CredentialProvider`] handed to
//! the client at construction, so tests can substitute fixed credentials
//! deterministically and the rest of the code never reaches into process
//! globals for a token.

use std::sync::{PoisonError, RwLock};

use secrecy::SecretString;

/// Holder of the ambient bearer credential.
///
/// Read by every authenticated request; written by the login/logout flow.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if the caller is authenticated.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Store a freshly issued token.
    fn store_token(&self, token: SecretString);

    /// Drop the stored token.
    fn clear_token(&self);
}

/// In-process token holder, written on login and cleared on logout.
///
/// The process-local analog of the browser's token slot: a single mutable
/// cell shared between the auth flow and every authenticated request.
#[derive(Default)]
pub struct SessionTokens {
    token: RwLock<Option<SecretString>>,
}

impl SessionTokens {
    /// Create an empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session pre-loaded with a token.
    #[must_use]
    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }
}

impl CredentialProvider for SessionTokens {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_token(&self, token: SecretString) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear_token(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn starts_unauthenticated() {
        let session = SessionTokens::new();
        assert!(!session.is_authenticated());
        assert!(session.bearer_token().is_none());
    }

    #[test]
    fn set_then_clear_round_trips() {
        let session = SessionTokens::new();
        session.store_token(SecretString::from("tok-123"));
        assert!(session.is_authenticated());
        assert_eq!(
            session
                .bearer_token()
                .map(|t| t.expose_secret().to_string()),
            Some("tok-123".to_string())
        );

        session.clear_token();
        assert!(!session.is_authenticated());
    }
}
