//! Sand Crack headless runner
//!
//! Runs the simulation for a fixed number of ticks and optionally writes a
//! JSON snapshot of the final state.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;

use sand_crack::{QualityPreset, Settings};
use sand_crack::settings::GrowthMode;
use sand_crack::sim::{SimState, Trigger, tick};

#[derive(Parser)]
#[command(name = "sand-crack")]
#[command(version)]
#[command(about = "Branching crack growth on a sand surface", long_about = None)]
struct Cli {
    /// JSON settings file (missing fields take defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed, overrides the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to run
    #[arg(short, long, default_value = "600")]
    ticks: u64,

    /// Surface width, overrides the config
    #[arg(long)]
    width: Option<f32>,

    /// Surface height, overrides the config
    #[arg(long)]
    height: Option<f32>,

    /// Growth mode: free or target
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<GrowthMode>,

    /// Dust budget: low, medium or high
    #[arg(short, long)]
    quality: Option<QualityPreset>,

    /// Crack origin as x,y, applied before the first tick (repeatable)
    #[arg(long, value_parser = parse_point)]
    click: Vec<Vec2>,

    /// Write the final state as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn parse_mode(s: &str) -> Result<GrowthMode, String> {
    match s.to_lowercase().as_str() {
        "free" | "a" => Ok(GrowthMode::FreeWalk),
        "target" | "b" => Ok(GrowthMode::TargetSeeking),
        _ => Err(format!("unknown mode '{s}', expected free or target")),
    }
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok(Vec2::new(x, y))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(width) = cli.width {
        settings.width = width;
    }
    if let Some(height) = cli.height {
        settings.height = height;
    }
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    if let Some(quality) = cli.quality {
        settings.quality = quality;
    }

    log::info!(
        "Sand Crack starting: seed {}, {} ticks, surface {}x{}, {:?}, {} quality",
        settings.seed,
        cli.ticks,
        settings.width,
        settings.height,
        settings.mode,
        settings.quality.as_str()
    );

    let mut state = SimState::new(settings);
    let surface = state.bounds;
    for &at in &cli.click {
        state.trigger(Trigger::At(at));
    }

    for _ in 0..cli.ticks {
        tick(&mut state, &surface);
    }

    log::info!(
        "Finished after {} ticks: {} cracks ({} growing), {} points, {} particles",
        state.time_ticks,
        state.cracks.len(),
        state.live_cracks().count(),
        state.point_count(),
        state.particles.len()
    );

    if let Some(path) = &cli.snapshot {
        let json = match serde_json::to_string_pretty(&state) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            log::error!("Failed to write snapshot {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        log::info!("Snapshot written to {}", path.display());
    }

    ExitCode::SUCCESS
}
