#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless harness that runs the camera director over a synthetic battle.
//!
//! Every tick the built-in skirmish advances, the director consumes the
//! snapshots, and the resulting directives are routed onto logging camera
//! rigs. Grid telemetry is printed as JSON at a configurable cadence, which
//! makes the selection loop observable without a rendering host.

mod scenario;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use log::{debug, info};

use replay_director_core::{Directive, GridTelemetry, UnitId, ViewportId};
use replay_director_system_director::{
    near_enemy_start_location, CameraDirector, DirectorConfig,
};
use replay_director_viewport::{
    CameraLimits, CameraRig, PlaybackControl, SecondaryViewportLayout, SelectionSink,
    ViewportRouter,
};

/// Command-line options for the headless director harness.
#[derive(Debug, Parser)]
#[command(name = "replay-director", about = "Runs the spectator-camera director over a synthetic skirmish")]
struct Cli {
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Grid resolution in cells per side.
    #[arg(long, default_value_t = 8)]
    grid_size: u32,

    /// Battlefield width and height in world units.
    #[arg(long, default_value_t = 256.0)]
    world_extent: f32,

    /// Seed shared by the skirmish and the framing jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Ticks between telemetry dumps; zero disables them.
    #[arg(long, default_value_t = 120)]
    telemetry_interval: u64,

    /// Simulates a replay seek by resetting the director at this tick.
    #[arg(long)]
    seek_tick: Option<u64>,
}

/// Camera rig that logs every command it receives.
struct LoggingRig {
    name: &'static str,
}

impl CameraRig for LoggingRig {
    fn move_to(&mut self, target: Vec2, smoothed: bool) {
        debug!(
            "{} camera -> ({:.1}, {:.1}) smoothed={smoothed}",
            self.name, target.x, target.y
        );
    }

    fn dolly_to(&mut self, distance: f32, smoothed: bool) {
        debug!("{} dolly -> {distance:.1} smoothed={smoothed}", self.name);
    }

    fn rotate_to(&mut self, polar: f32, azimuth: f32, smoothed: bool) {
        debug!(
            "{} rotate -> polar {polar:.3} azimuth {azimuth:.3} smoothed={smoothed}",
            self.name
        );
    }
}

struct LoggingPlayback;

impl PlaybackControl for LoggingPlayback {
    fn set_speed(&mut self, multiplier: f32) {
        info!("playback speed -> {multiplier:.2}x");
    }
}

struct LoggingSelection;

impl SelectionSink for LoggingSelection {
    fn follow_units(&mut self, units: &[UnitId]) {
        debug!("following {} units", units.len());
    }

    fn select_units(&mut self, units: &[UnitId]) {
        debug!("selecting {} units", units.len());
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = DirectorConfig {
        grid_size: cli.grid_size,
        world_width: cli.world_extent,
        world_height: cli.world_extent,
        seed: cli.seed,
        ..DirectorConfig::default()
    };
    let mut director = CameraDirector::new(config, scenario::scorer())
        .context("invalid director configuration")?;

    let mut skirmish = scenario::Skirmish::new(cli.seed, cli.world_extent);
    let mut router = ViewportRouter::new(
        LoggingRig { name: "primary" },
        LoggingRig { name: "secondary" },
        LoggingPlayback,
        LoggingSelection,
        CameraLimits::default(),
        SecondaryViewportLayout::default(),
    );

    let mut out: Vec<Directive> = Vec::new();
    let mut telemetry = GridTelemetry::default();

    info!(
        "running {} ticks over a {}x{} world, grid {}",
        cli.ticks, cli.world_extent, cli.world_extent, cli.grid_size
    );

    for tick in 0..cli.ticks {
        if cli.seek_tick == Some(tick) {
            info!("seek at tick {tick}, director state cleared");
            director.handle_reset();
        }

        let units: Vec<_> = skirmish.advance().to_vec();

        out.clear();
        director.handle_tick(tick, &units, &mut out, &mut telemetry);

        for fallen in skirmish.casualties() {
            debug!("unit {} destroyed at tick {tick}", fallen.id.get());
            director.handle_unit_destroyed(fallen);
        }

        for directive in &out {
            if let Directive::MoveCamera {
                viewport: ViewportId::Primary,
                target,
                ..
            } = directive
            {
                if near_enemy_start_location(skirmish.roster(), None, *target) {
                    info!("tick {tick}: primary camera cuts to a base assault");
                }
            }
        }

        router.apply(&out);

        if cli.telemetry_interval > 0 && tick % cli.telemetry_interval == 0 {
            let line = serde_json::to_string(&telemetry).context("serialising telemetry")?;
            println!("{line}");
        }
    }

    info!("finished after {} ticks", cli.ticks);
    Ok(())
}
