// src/lib.rs

pub mod cli;
pub mod config;
pub mod device;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod script;
pub mod sequence;
pub mod types;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand, CompileArgs, RunArgs};
use crate::config::{load_or_default, ConfigFile};
use crate::device::{CommandAudioPlayer, GphotoCamera};
use crate::engine::{spawn_device_worker, DeviceDispatcher, RunReport, Sequencer, VirtualClock};
use crate::events::parse_timing_file;
use crate::script::compile_script_file;
use crate::sequence::timefmt::{format_date, format_time};
use crate::sequence::Sequence;
use crate::types::ActionKind;

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        CliCommand::Compile(compile) => run_compile(&compile),
        CliCommand::Run(run_args) => {
            let mut cfg = load_or_default(args.config.as_deref())?;
            apply_overrides(&mut cfg, &run_args);
            run_sequence(&cfg, &run_args).await.map(|_| ())
        }
    }
}

/// Compile a script against a timing file and write the sequence.
fn run_compile(args: &CompileArgs) -> Result<()> {
    let events = parse_timing_file(&args.timing_file)
        .with_context(|| format!("reading timing file {:?}", args.timing_file))?;
    let script = compile_script_file(&args.script)
        .with_context(|| format!("compiling script {:?}", args.script))?;
    debug!(commands = script.commands().len(), "script compiled");

    let sequence = script.generate_sequence(&events)?;
    info!(actions = sequence.len(), "sequence generated");

    match args.output.as_deref() {
        None => write_stdout(&sequence),
        Some(path) if path == Path::new("-") => write_stdout(&sequence),
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {path:?}"))?;
            sequence.write_csv(BufWriter::new(file))?;
            info!(path = ?path, "sequence written");
            Ok(())
        }
    }
}

fn write_stdout(sequence: &Sequence) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    sequence.write_csv(&mut lock)?;
    lock.flush()?;
    Ok(())
}

/// CLI flags take precedence over the config file.
fn apply_overrides(cfg: &mut ConfigFile, args: &RunArgs) {
    if args.no_camera {
        cfg.run.disable_capture = true;
    }
    if args.no_sound {
        cfg.run.disable_audio = true;
    }
    if let Some(model) = &args.model {
        cfg.device.model = Some(model.clone());
    }
    if let Some(port) = &args.port {
        cfg.device.port = Some(port.clone());
    }
    if let Some(dir) = &args.sounds_dir {
        cfg.run.sounds_dir = dir.clone();
    }
}

/// Replay a sequence file until it ends or Ctrl-C is pressed.
pub async fn run_sequence(cfg: &ConfigFile, args: &RunArgs) -> Result<RunReport> {
    let file = File::open(&args.sequence)
        .with_context(|| format!("opening sequence {:?}", args.sequence))?;
    let sequence = Sequence::read_csv(BufReader::new(file))?;
    info!(actions = sequence.len(), path = ?args.sequence, "sequence loaded");

    let clock = match args.time {
        Some(virtual_now) => {
            print_time_override_banner(&format!(
                "{} {} UTC ({} local)",
                format_date(&virtual_now),
                format_time(&virtual_now),
                virtual_now.with_timezone(&chrono::Local).format("%Y/%m/%d %H:%M:%S")
            ));
            VirtualClock::starting_at(virtual_now)
        }
        None => VirtualClock::system(),
    };

    let disabled = disabled_kinds(cfg);

    if args.dry_run {
        print_dry_run(&sequence, &disabled, &clock);
        return Ok(RunReport::default());
    }

    let mut dispatcher = DeviceDispatcher::new();

    if !cfg.run.disable_capture {
        let camera = GphotoCamera::connect(&cfg.device).await?;
        info!(
            model = %camera.camera().model,
            port = %camera.camera().port,
            "camera connected"
        );
        dispatcher =
            dispatcher.with_device(spawn_device_worker(Box::new(camera), cfg.device.capture_wait()));
    }

    if !cfg.run.disable_audio {
        let player = Arc::new(CommandAudioPlayer::from_config(&cfg.audio));
        dispatcher = dispatcher.with_audio(player, cfg.run.sounds_dir.clone());
    }

    let mut sequencer = Sequencer::new(&sequence, &disabled, clock, dispatcher);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let report = sequencer.run_until(shutdown).await;

    sequencer
        .into_dispatcher()
        .drain(std::time::Duration::from_millis(cfg.run.drain_timeout_ms))
        .await;

    info!(
        dispatched = report.dispatched,
        skipped = report.skipped,
        interrupted = report.interrupted,
        "run complete"
    );
    Ok(report)
}

fn disabled_kinds(cfg: &ConfigFile) -> Vec<ActionKind> {
    let mut disabled = Vec::new();
    if cfg.run.disable_capture {
        disabled.push(ActionKind::Capture);
    }
    if cfg.run.disable_audio {
        disabled.push(ActionKind::Play);
    }
    disabled
}

fn print_time_override_banner(virtual_now: &str) {
    let rule = "*".repeat(60);
    eprintln!("{rule}");
    eprintln!("*  TIME OVERRIDE IN EFFECT");
    eprintln!("*  current time is taken to be {virtual_now}");
    eprintln!("{rule}");
}

/// Simple dry-run output: print what would fire and what is already late.
fn print_dry_run(sequence: &Sequence, disabled: &[ActionKind], clock: &VirtualClock) {
    let now = clock.now();
    let actions = sequence.filtered(disabled);

    println!("eclipse-sequencer dry-run");
    println!("  now = {now}");
    println!("  disabled = {disabled:?}");
    println!();

    println!("actions ({} of {}):", actions.len(), sequence.len());
    for action in &actions {
        let marker = if action.time() < now { "skip" } else { "    " };
        println!("  {marker} {action}");
        if !action.comment().is_empty() {
            println!("         # {}", action.comment());
        }
    }

    debug!("dry-run complete (no execution)");
}
