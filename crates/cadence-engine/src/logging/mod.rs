//! Logging utilities.
//!
//! The engine logs through the `log` facade only: run start/finish at `debug`,
//! per-frame detail at `trace`, halted runs at `warn`. This module wires an
//! `env_logger` backend for binaries and tests.

mod init;

pub use init::{init_logging, LoggingConfig};
