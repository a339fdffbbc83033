//! Bearer session credential.

use secrecy::{ExposeSecret, SecretString};

/// An opaque bearer token issued by the store's auth flow.
///
/// Absence of a token is a guest session: cart operations are gated and
/// the wishlist falls back to the device store. The `Debug` output is
/// redacted.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for the `Authorization` header.
    #[must_use]
    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}
