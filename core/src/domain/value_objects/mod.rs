//! Value objects returned across the core boundary.

pub mod session;

pub use session::{Session, TOKEN_TYPE_BEARER};
