//! durcheck CLI - verify that rendered media files have matching durations
//!
//! This binary measures audio and MIDI files with independent probes and
//! reports whether their lengths agree.

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

use durcheck_cli::commands;
use durcheck_cli::config::CheckOverrides;
use durcheck_cli::logging;
use durcheck_core::DEFAULT_TEMPO_US_PER_BEAT;
use durcheck_probe::MidiTimingMode;

/// durcheck - Media duration verification
#[derive(Parser)]
#[command(name = "durcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// MIDI tick conversion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MidiTimingArg {
    /// Integrate every tempo change in the file
    TempoMap,
    /// Assume a single tempo for the whole file
    FixedTempo,
}

impl From<MidiTimingArg> for MidiTimingMode {
    fn from(arg: MidiTimingArg) -> Self {
        match arg {
            MidiTimingArg::TempoMap => MidiTimingMode::TempoMap,
            MidiTimingArg::FixedTempo => MidiTimingMode::FixedTempo,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check that audio and MIDI files have the same duration
    Check {
        /// Files to compare (WAV, MP3, OGG, FLAC, MIDI)
        files: Vec<String>,

        /// Maximum allowed difference in seconds (default: 0.01)
        #[arg(short, long, allow_hyphen_values = true)]
        tolerance: Option<f64>,

        /// How MIDI ticks are converted to seconds
        #[arg(long, value_enum)]
        midi_timing: Option<MidiTimingArg>,

        /// Tempo in microseconds per beat used before the first tempo event
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        tempo: Option<u32>,

        /// Path to a JSON config file
        #[arg(short, long)]
        config: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Report tempo-map and fixed-tempo lengths of a MIDI file
    MidiLength {
        /// MIDI file to inspect
        file: String,

        /// Tempo in microseconds per beat for the fixed-tempo estimate
        #[arg(long, default_value_t = DEFAULT_TEMPO_US_PER_BEAT, value_parser = clap::value_parser!(u32).range(1..))]
        tempo: u32,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure an audio file with every available probe
    AudioLength {
        /// Audio file to inspect
        file: String,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify a per-measure timing log
    Measures {
        /// Log file to read (default: stdin)
        #[arg(short, long)]
        input: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            files,
            tolerance,
            midi_timing,
            tempo,
            config,
            json,
        } => {
            let overrides = CheckOverrides {
                tolerance_seconds: tolerance,
                midi_timing: midi_timing.map(MidiTimingMode::from),
                tempo_us_per_beat: tempo,
            };
            commands::check::run(&files, config.as_deref(), &overrides, json)
        }
        Commands::MidiLength { file, tempo, json } => {
            commands::midi_length::run(&file, tempo, json)
        }
        Commands::AudioLength { file, json } => commands::audio_length::run(&file, json),
        Commands::Measures { input, json } => commands::measures::run(input.as_deref(), json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
