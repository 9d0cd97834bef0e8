//! antrian-lib — Queue announcer engine.
//!
//! Segment clips on disk, rodio playback, clip generation, and HTTP API.
//! Depends on antrian-core for parsing, decomposition, and sequencing.

pub mod assets;
pub mod generate;
pub mod player;
pub mod server;

// Re-export antrian-core for convenience
pub use antrian_core;
