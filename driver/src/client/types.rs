//! Client-side types and error definitions

use std::fmt;
use thiserror::Error;

/// Errors that can occur when talking to the attendance API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Login response is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Login response has no string `token` field")]
    MissingToken,

    #[error("Login response carries an empty token")]
    EmptyToken,
}

/// Bearer token obtained at setup
///
/// Never empty. The value is redacted from `Debug` output so it does not end
/// up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Result<Self, ApiError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ApiError::EmptyToken);
        }
        Ok(Self(token))
    }

    /// Extract the token from a raw login response body
    pub fn from_login_body(body: &str) -> Result<Self, ApiError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let token = value
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or(ApiError::MissingToken)?;
        Self::new(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_login_body() {
        let token = SessionToken::from_login_body(r#"{"token":"abc123"}"#).unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn test_login_body_failures() {
        assert!(matches!(
            SessionToken::from_login_body("<html>502 Bad Gateway</html>"),
            Err(ApiError::InvalidBody(_))
        ));
        assert!(matches!(
            SessionToken::from_login_body(r#"{"message":"invalid credentials"}"#),
            Err(ApiError::MissingToken)
        ));
        assert!(matches!(
            SessionToken::from_login_body(r#"{"token":42}"#),
            Err(ApiError::MissingToken)
        ));
        assert!(matches!(
            SessionToken::from_login_body(r#"{"token":""}"#),
            Err(ApiError::EmptyToken)
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = SessionToken::new("secret-value").unwrap();
        assert!(!format!("{:?}", token).contains("secret-value"));
    }
}
