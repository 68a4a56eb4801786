//! # TokenKeep Core
//!
//! Token-session subsystem for the TokenKeep backend. This crate owns the
//! whole lifetime of a bearer session: issuance of paired access/refresh
//! tokens, stateless signature verification, token-family revocation
//! cascades, and cleanup that keeps revocation state bounded by live
//! tokens. The HTTP layer calling into it is a separate concern.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::token::{Claims, SubjectId};
pub use domain::value_objects::session::{Session, TOKEN_TYPE_BEARER};
pub use errors::{DomainError, DomainResult};
pub use services::session::{
    Clock, Decoded, ManualClock, SessionStore, SessionStoreConfig, SessionStoreStats, SigningKey,
    SystemClock, TokenCodec,
};
