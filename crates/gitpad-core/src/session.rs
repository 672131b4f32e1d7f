//! In-memory session state: the access token and the authenticated login.
//!
//! Nothing here touches disk or the network. A token is never validated when it
//! is stored; the first remote call that fails with an auth error is what
//! reveals an expired token.

use crate::error::{PublishError, Result};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// OAuth access token. Zeroized on drop and redacted in `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Holds the single active access token.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<AccessToken>>,
}

impl TokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current token unconditionally.
    pub fn set_token(&self, token: AccessToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Returns the current token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if no token is stored.
    pub fn get_token(&self) -> Result<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PublishError::Unauthenticated)
    }

    /// Removes the token.
    pub fn clear(&self) {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether a token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// A signed-in user: token plus the login it belongs to.
#[derive(Debug, Default)]
pub struct Session {
    tokens: TokenStore,
    owner_login: RwLock<Option<String>>,
}

impl Session {
    /// Creates a session with no token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session already holding `token`.
    pub fn with_token(token: AccessToken) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Replaces the access token.
    pub fn set_token(&self, token: AccessToken) {
        self.tokens.set_token(token);
    }

    /// Returns the access token or `Unauthenticated`.
    pub fn get_token(&self) -> Result<AccessToken> {
        self.tokens.get_token()
    }

    /// Whether an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Login of the authenticated user, once known.
    pub fn owner_login(&self) -> Option<String> {
        self.owner_login
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records the login of the authenticated user.
    pub fn set_owner_login(&self, login: impl Into<String>) {
        *self
            .owner_login
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(login.into());
    }

    /// Drops the token and the login (logout, or after a fatal auth error).
    pub fn clear(&self) {
        self.tokens.clear();
        self.owner_login
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_unauthenticated() {
        let store = TokenStore::new();
        assert!(!store.is_authenticated());
        assert_eq!(store.get_token(), Err(PublishError::Unauthenticated));
    }

    #[test]
    fn test_set_token_replaces_unconditionally() {
        let store = TokenStore::new();
        store.set_token(AccessToken::new("first"));
        store.set_token(AccessToken::new("second"));
        assert_eq!(store.get_token().unwrap().expose(), "second");
    }

    #[test]
    fn test_clear_removes_token() {
        let store = TokenStore::new();
        store.set_token(AccessToken::new("gho_abc"));
        store.clear();
        assert!(store.get_token().is_err());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("gho_secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("gho_secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_session_clear_drops_login() {
        let session = Session::with_token(AccessToken::new("gho_abc"));
        session.set_owner_login("octocat");
        assert!(session.is_authenticated());
        assert_eq!(session.owner_login().as_deref(), Some("octocat"));

        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.owner_login(), None);
    }
}
