//! Logger setup for binaries built on the engine.
//!
//! The engine itself only talks to the `log` facade; `env_logger` is wired up
//! here once per process.

mod init;

pub use init::{init_logging, LoggingConfig};
