use serde::{Deserialize, Serialize};
use std::fmt;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer credential obtained at login.
///
/// Holds the complete `Authorization` header value, e.g. `Bearer t1`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Returns `None` for an empty token.
    pub fn from_access_token(access_token: &str) -> Option<Self> {
        let token = access_token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(format!("{BEARER_PREFIX}{token}")))
        }
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }

    pub fn access_token(&self) -> &str {
        &self.0[BEARER_PREFIX.len()..]
    }
}

// Keep tokens out of logs.
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub value: String,
}

/// Login response body. Fields other than the access token are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
