//! CLI command implementations

pub mod audio_length;
pub mod check;
pub mod json_output;
pub mod measures;
pub mod midi_length;

mod reporting;
