//! Session token service module
//!
//! This module handles the whole lifetime of a bearer session:
//! - access/refresh token issuance as one token family
//! - stateless signature verification of access tokens
//! - refresh without rotation, keeping every access token attributable
//!   to the refresh token that minted it
//! - family-wide revocation cascades on logout
//! - cleanup that keeps revocation state bounded by live tokens

mod clock;
mod codec;
mod config;
mod store;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{Decoded, SigningKey, TokenCodec};
pub use config::SessionStoreConfig;
pub use store::{SessionStore, SessionStoreStats};
