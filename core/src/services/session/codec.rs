//! Signing and verification of self-describing session tokens.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::{Claims, SubjectId};
use crate::errors::{DomainError, DomainResult};

/// Symmetric signing key injected into the codec at construction.
///
/// Opaque byte sequence; the codec is the only component that ever reads
/// it, and `Debug` output redacts the bytes.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Wraps raw secret bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(secret.as_ref().to_vec())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Outcome of decoding a token string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Signature checks out and the token has not expired.
    Valid {
        /// Subject the token was issued to
        subject: SubjectId,
        /// Expiry timestamp embedded in the token (unix seconds)
        expires_at: i64,
    },
    /// Well-formed and correctly signed, but past its expiry.
    Expired,
    /// Well-formed but not signed with this codec's key.
    BadSignature,
    /// Not a token this codec could have produced.
    Malformed,
}

/// Encodes and verifies signed session tokens.
///
/// Verification is stateless: the codec consults no revocation
/// bookkeeping, that check belongs to the session store.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec signing with `key` using HMAC-SHA256.
    pub fn new(key: SigningKey) -> Self {
        let encoding_key = EncodingKey::from_secret(key.as_bytes());
        let decoding_key = DecodingKey::from_secret(key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller-supplied instant in
        // `decode`, not by the library: its wall-clock check carries a
        // default 60-second leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Signs a token for `subject`, issued at `now` and expiring
    /// `lifetime` seconds later.
    ///
    /// Each call embeds a fresh instance identifier, so two tokens for
    /// the same subject in the same second never collide.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TokenGeneration` if signing fails; caller
    /// input can never trigger this.
    pub fn encode(&self, subject: SubjectId, now: i64, lifetime: i64) -> DomainResult<String> {
        let claims = Claims::new(subject, now, lifetime);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| DomainError::TokenGeneration)
    }

    /// Verifies `token` and classifies the outcome as of `now`.
    ///
    /// Never panics on malformed input: anything that is not a correctly
    /// signed token of ours comes back as `BadSignature` or `Malformed`.
    pub fn decode(&self, token: &str, now: i64) -> Decoded {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(err) => {
                return match err.kind() {
                    ErrorKind::InvalidSignature => Decoded::BadSignature,
                    _ => Decoded::Malformed,
                }
            }
        };

        let claims = data.claims;
        if claims.is_expired(now) {
            Decoded::Expired
        } else {
            Decoded::Valid {
                subject: claims.sub,
                expires_at: claims.exp,
            }
        }
    }
}
