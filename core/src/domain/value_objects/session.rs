//! Session value object returned to the authentication layer.

use serde::{Deserialize, Serialize};

/// Token type tag carried by every session.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Session handed back on login and on every refresh.
///
/// Serializes directly as the login/refresh response body. A session has
/// no identity beyond its two token strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed access token presented on every authenticated request
    pub access_token: String,

    /// Signed refresh token used solely to mint new access tokens
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires: i64,

    /// Always `"bearer"`
    pub token_type: String,
}

impl Session {
    /// Creates a new session value.
    pub fn new(access_token: String, refresh_token: String, expires: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}
