//! durcheck end-to-end test infrastructure
//!
//! - [`fixtures`]: synthetic WAV and MIDI files in a temporary directory
//! - [`harness`]: run the `durcheck` binary and capture its output
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p durcheck-tests
//! ```
//!
//! The binary-level tests live in `durcheck-cli/tests` because only that
//! crate can locate the built executable through `CARGO_BIN_EXE_durcheck`.

pub mod fixtures;
pub mod harness;

pub use fixtures::{MediaFixture, FIXTURE_SAMPLE_RATE};
pub use harness::CliResult;
