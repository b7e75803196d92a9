//! Reach Adapt entry point
//!
//! Runs a headless session driven by the synthetic participant and writes the
//! error table on exit.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reach_adapt::driver::{AtomicStop, LogSink, SimulatedClock, SystemClock, run_session};
use reach_adapt::participant::{ParticipantModel, SyntheticParticipant};
use reach_adapt::sim::SessionState;
use reach_adapt::{ProtocolKind, Settings, TargetMode, export};

/// 30 minutes at 60 Hz
const DEFAULT_MAX_TICKS: u64 = 30 * 60 * 60;

#[derive(Debug, Parser)]
#[command(name = "reach-adapt", version, about = "Visuomotor rotation reaching session")]
struct Cli {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// baseline | extended | gradual | free
    #[arg(long, value_parser = parse_protocol)]
    protocol: Option<ProtocolKind>,

    /// fixed | random
    #[arg(long, value_parser = parse_target_mode)]
    target_mode: Option<TargetMode>,

    #[arg(long)]
    seed: Option<u64>,

    /// Hide the cursor away from the center
    #[arg(long)]
    mask: bool,

    /// Directory for the error table
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,

    /// Pace ticks against the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,
}

fn parse_protocol(s: &str) -> Result<ProtocolKind, String> {
    ProtocolKind::from_str(s).ok_or_else(|| format!("unknown protocol: {s}"))
}

fn parse_target_mode(s: &str) -> Result<TargetMode, String> {
    TargetMode::from_str(s).ok_or_else(|| format!("unknown target mode: {s}"))
}

fn settings_from(cli: &Cli) -> reach_adapt::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(protocol) = cli.protocol {
        settings.protocol = protocol;
    }
    if let Some(mode) = cli.target_mode {
        settings.target_mode = mode;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if cli.mask {
        settings.mask_mode = true;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(cli: Cli) -> reach_adapt::Result<()> {
    let settings = settings_from(&cli)?;
    log::info!(
        "Reach Adapt starting: protocol={}, seed={}",
        settings.protocol.as_str(),
        settings.seed
    );

    let tick_hz = settings.tick_hz;
    let mut participant = SyntheticParticipant::new(
        ParticipantModel::default(),
        settings.seed.wrapping_add(1),
        settings.center(),
    );
    let mut state = SessionState::new(settings);
    let mut sink = LogSink::new(tick_hz as u64);
    let stop = AtomicStop::new();
    let ctrlc_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_stop.request_stop()) {
        log::warn!("Ctrl-C handler not installed: {e}");
    }
    let max_ticks = Some(cli.max_ticks);

    let report = if cli.realtime {
        let mut clock = SystemClock::new(tick_hz);
        run_session(&mut state, &mut participant, &mut clock, &mut sink, &stop, max_ticks)
    } else {
        let mut clock = SimulatedClock::new(tick_hz);
        run_session(&mut state, &mut participant, &mut clock, &mut sink, &stop, max_ticks)
    };

    let path = export::export_session(&cli.out_dir, &report.recorder.export())?;
    let summary = report.recorder.summary();
    log::info!(
        "Session {:?}: {} attempts, {} hits, {} invalid samples -> {}",
        report.reason,
        report.attempts,
        report.score,
        summary.invalid,
        path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("reach-adapt: {e}");
            ExitCode::FAILURE
        }
    }
}
