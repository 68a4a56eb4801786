//! Business services containing the session subsystem.

pub mod session;

// Re-export commonly used types
pub use session::{
    Clock, Decoded, ManualClock, SessionStore, SessionStoreConfig, SessionStoreStats, SigningKey,
    SystemClock, TokenCodec,
};
