//! Accelerando: play a tempo-ramp metronome on the default output device.
//!
//! The terminal is the UI: it polls the transport at ~30 Hz and prints one
//! line per bar. Ctrl-C stops the run.

mod cli;

use std::error::Error;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use accelerando::audio::{AudioEngine, AudioOutput, ClickSamples, OfflineOutput};
use accelerando::config::{
    default_config_path, default_presets_path, find_preset, load_config, load_presets,
    save_config, EngineConfig, MetronomeConfig, TimingConfig,
};
use accelerando::logging;
use accelerando::tempo::TempoCurve;
use accelerando::transport::{LookAheadScheduler, Metronome, TickOutcome, TransportState};

use cli::Cli;

const UI_REFRESH: Duration = Duration::from_millis(33);
const DRY_RUN_SAMPLE_RATE: u32 = 48000;

fn main() -> ExitCode {
    logging::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path)?;

    if let Some(name) = &cli.preset {
        let presets_path = cli.presets.clone().unwrap_or_else(default_presets_path);
        let presets = load_presets(&presets_path)?;
        let preset = find_preset(&presets, name).ok_or_else(|| {
            format!("no preset named {name:?} in {}", presets_path.display())
        })?;
        config.apply_preset(preset);
    }
    if cli.stop_at_end {
        config.stop_at_end = true;
    }
    if let Some(step) = cli.step {
        config.tempo_step = step.into();
    }

    let curve = config.validate()?;

    if cli.save {
        save_config(&config_path, &config)?;
        info!(path = %config_path.display(), "configuration saved");
    }

    if cli.print_map {
        print_map(&config, &curve);
        return Ok(());
    }

    let engine = EngineConfig::load().unwrap_or_default();
    engine.timing.validate()?;

    match cli.dry_run {
        Some(secs) => dry_run(&config, engine.timing, secs),
        None => play(&config, engine),
    }
}

fn print_map(config: &MetronomeConfig, curve: &TempoCurve) {
    let map = curve.build_tempo_map(
        config.bars_per_cell,
        config.tempo_step,
        config.total_cells,
    );
    let peak = map.iter().copied().fold(0.0, f64::max);

    println!("bar  cell     bpm");
    for (bar, bpm) in map.iter().enumerate() {
        let cell = bar as u32 / config.bars_per_cell;
        let width = if peak > 0.0 {
            (bpm / peak * 40.0).round() as usize
        } else {
            0
        };
        println!(
            "{:>3}  {:>4}  {:>6.1}  {}",
            bar + 1,
            cell + 1,
            bpm,
            "#".repeat(width)
        );
    }
}

/// Run the scheduler against an offline clock and print what it commits.
fn dry_run(
    config: &MetronomeConfig,
    timing: TimingConfig,
    secs: f64,
) -> Result<(), Box<dyn Error>> {
    let mut output = OfflineOutput::new(DRY_RUN_SAMPLE_RATE);
    let samples = ClickSamples::load(&mut output)?;
    let mut scheduler =
        LookAheadScheduler::new(config.clone(), samples, timing.schedule_ahead_secs())?;
    let transport = TransportState::new();
    let poll = timing.poll_interval().as_secs_f64();

    scheduler.begin(output.now());
    let mut last_bar = None;
    while output.now() < secs {
        let outcome = scheduler.tick(&mut output, &transport);

        let snap = transport.snapshot();
        if last_bar != Some(snap.visual_bar) {
            println!("-- bar {} at {:.1} bpm", snap.visual_bar + 1, snap.current_bpm);
            last_bar = Some(snap.visual_bar);
        }
        for click in output.take_clicks() {
            println!("{:>9.4}s  {:?}", click.at, click.sound);
        }

        if outcome == TickOutcome::Finished {
            println!("-- end of grid");
            break;
        }
        output.advance(poll);
    }
    Ok(())
}

fn play(config: &MetronomeConfig, engine: EngineConfig) -> Result<(), Box<dyn Error>> {
    let sounds = engine.sounds.clone();
    let timing = engine.timing;
    let mut metronome =
        Metronome::with_timing(move || AudioEngine::new(sounds.clone()), timing)?;
    let transport = metronome.transport();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    metronome.start(config)?;

    let mut last_bar = None;
    while metronome.is_running() && !interrupted.load(Ordering::SeqCst) {
        let snap = transport.snapshot();
        // current_bpm stays zero until the first bar is scheduled.
        if snap.current_bpm > 0.0 && last_bar != Some(snap.visual_bar) {
            let cell = snap.visual_bar / u64::from(config.bars_per_cell);
            println!(
                "bar {:>3}  cell {:>2}  {:>6.1} bpm",
                snap.visual_bar + 1,
                cell + 1,
                snap.current_bpm
            );
            last_bar = Some(snap.visual_bar);
        }
        thread::sleep(UI_REFRESH);
    }

    if interrupted.load(Ordering::SeqCst) {
        metronome.stop_blocking();
        println!("stopped");
    } else {
        // Let the last committed clicks sound before the output closes.
        thread::sleep(timing.poll_interval() + Duration::from_millis(timing.schedule_ahead_ms));
        metronome.stop_blocking();
        println!("end of grid");
    }
    Ok(())
}
