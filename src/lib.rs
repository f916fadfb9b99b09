// Library module for mirrorsync
// Re-exports modules for use in integration tests and the binary

pub mod config;
pub mod fs;
pub mod logging;
pub mod scheduler;
pub mod sync;
