// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::sequence::timefmt::{parse_date_time_str, parse_naive_date_time_str};

/// Command-line arguments for `eclipse-sequencer`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "eclipse-sequencer",
    version,
    about = "Compile eclipse timing scripts and replay them against a camera and audio player.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sequencer.toml` in the current working directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ECLIPSE_SEQUENCER_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Compile a script against a contact-timing file into a sequence file.
    Compile(CompileArgs),

    /// Replay a sequence file in real time.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// Script to compile.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Contact-timing export listing C1..C4, MAX and the magnitude table.
    #[arg(short = 't', long, value_name = "FILE")]
    pub timing_file: PathBuf,

    /// Output sequence file; `-` or omitted writes to stdout.
    #[arg(short = 'o', long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Sequence file to replay.
    #[arg(value_name = "SEQUENCE")]
    pub sequence: PathBuf,

    /// Pretend the current local time is this ("YYYY/MM/DD HH:MM:SS.s").
    ///
    /// A trailing `Z` reads the value as UTC instead.
    #[arg(short = 't', long = "time", value_name = "DATETIME", value_parser = parse_time_override)]
    pub time: Option<DateTime<Utc>>,

    /// Skip all sound actions.
    #[arg(long)]
    pub no_sound: bool,

    /// Skip all capture actions and do not connect to a camera.
    #[arg(long)]
    pub no_camera: bool,

    /// Camera model to select (substring match).
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Camera port to select (exact match, e.g. `usb:001,004`).
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,

    /// Directory that sound files are resolved against.
    #[arg(long, value_name = "DIR")]
    pub sounds_dir: Option<PathBuf>,

    /// Print the schedule without touching any device.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_time_override(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    let usage = || {
        format!("expected \"YYYY/MM/DD HH:MM:SS.s\" with an optional trailing Z, got '{text}'")
    };

    if let Some(utc) = text.strip_suffix('Z') {
        return parse_date_time_str(utc).ok_or_else(usage);
    }

    let naive = parse_naive_date_time_str(text).ok_or_else(usage)?;
    // A time skipped by a DST change has no local instant; a repeated one
    // takes the earlier.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("'{text}' does not exist in the local time zone"))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
