//! durcheck CLI library.
//!
//! Command implementations, configuration loading and logging setup for the
//! `durcheck` binary. Each command returns an [`std::process::ExitCode`] so
//! that it can also be driven from tests without spawning a process.

pub mod commands;
pub mod config;
pub mod logging;
