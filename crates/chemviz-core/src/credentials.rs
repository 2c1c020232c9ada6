//! Raw username/password credentials.
//!
//! The backend uses HTTP Basic authentication on every protected call, so the
//! client keeps the raw pair in memory and re-encodes it per request instead of
//! caching a token.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// A username/password pair held for the lifetime of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the `Authorization` header value, e.g. `Basic YWxpY2U6c2VjcmV0MQ==`.
    pub fn authorization_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}

// Never print the password.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_encodes_basic_pair() {
        let credentials = Credentials::new("alice", "secret1");
        assert_eq!(
            credentials.authorization_header(),
            "Basic YWxpY2U6c2VjcmV0MQ=="
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials::new("alice", "secret1");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("secret1"));
    }
}
