//! Configuration for the session store

/// Configuration for the session store
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_lifetime: i64,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: 900,      // 15 minutes
            refresh_token_lifetime: 604_800, // 7 days
        }
    }
}

impl SessionStoreConfig {
    /// Creates a configuration from raw second values.
    pub fn new(access_token_lifetime: i64, refresh_token_lifetime: i64) -> Self {
        Self {
            access_token_lifetime,
            refresh_token_lifetime,
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_lifetime_minutes(mut self, minutes: i64) -> Self {
        self.access_token_lifetime = minutes * 60;
        self
    }

    /// Set refresh token lifetime in days
    pub fn with_refresh_lifetime_days(mut self, days: i64) -> Self {
        self.refresh_token_lifetime = days * 86_400;
        self
    }
}
