// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod audio;
pub mod config;
pub mod engine;
pub mod ranking;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod ui;
pub mod words;

/// Host tick interval in milliseconds; both engine clocks derive from it.
pub const TICK_RATE_MS: u64 = 100;
