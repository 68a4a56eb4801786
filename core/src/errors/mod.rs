//! Domain-specific error types and error handling.
//!
//! Token rejections are not errors: a revoked, expired, malformed, or
//! badly signed token collapses to `None` at the store boundary so a
//! caller learns nothing about which check failed. The error channel
//! carries only construction-time validation and signing faults.

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Token generation failed")]
    TokenGeneration,
}

pub type DomainResult<T> = Result<T, DomainError>;
