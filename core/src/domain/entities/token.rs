//! Token claim entities for the session subsystem.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the subject (user) a token was issued to.
pub type SubjectId = u64;

/// Signed payload carried by every issued token.
///
/// Claims are immutable once issued; a token is never updated, only
/// replaced by a newly issued one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: SubjectId,

    /// Token ID, unique per issuance
    pub jti: String,

    /// Issued at timestamp (unix seconds)
    pub iat: i64,

    /// Expiration timestamp (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a token issued at `now` that lives for
    /// `lifetime` seconds.
    ///
    /// Every call generates a fresh `jti`, so two tokens minted in the
    /// same second for the same subject are still distinct strings and
    /// individually revocable.
    pub fn new(subject: SubjectId, now: i64, lifetime: i64) -> Self {
        Self {
            sub: subject,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime,
        }
    }

    /// Whether the claims have expired as of `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}
