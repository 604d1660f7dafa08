//! Shared setup for binaries built on the key derivation crates, such as initializing the tracing
//! framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
