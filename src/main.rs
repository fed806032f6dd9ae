//! Warp Run headless driver
//!
//! Runs one autopiloted session at a fixed 60 Hz and logs what happens. The
//! browser build drives the simulation through `warp_run::wasm` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use warp_run::sim::{
        ControlScheme, Field, GameEvent, GameMode, GameState, SessionConfig, TickInput, tick,
    };
    use warp_run::Tuning;

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Simulate a Warp Run session without a renderer
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Play the free-motion dash variant instead of lanes
        #[arg(long)]
        dash: bool,
        /// Practice session (99 lives, never ends)
        #[arg(long)]
        practice: bool,
        /// Number of 60 Hz frames to simulate
        #[arg(long, default_value_t = 3600)]
        frames: u32,
        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// JSON tuning overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        snapshot: bool,
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();
        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };

        let scheme = if args.dash {
            ControlScheme::Dash
        } else {
            ControlScheme::Lanes
        };
        let config = if args.practice {
            SessionConfig::practice(scheme, &tuning)
        } else {
            SessionConfig::active(scheme, &tuning)
        };

        log::info!("Warp Run starting: {:?} {:?}, seed {}", config.kind, scheme, args.seed);
        let mut state =
            GameState::with_config(args.seed, tuning, Field::default(), config.with_autopilot());
        let input = TickInput::default();

        for frame in 0..args.frames {
            tick(&mut state, &input, FRAME_DT);
            for event in state.drain_events() {
                match event {
                    GameEvent::PickupCollected(kind) => log::debug!("[{frame}] collected {kind:?}"),
                    GameEvent::GateCleared => log::debug!("[{frame}] gate cleared"),
                    GameEvent::ComboChanged(multiplier) => {
                        log::debug!("[{frame}] combo x{multiplier}")
                    }
                    GameEvent::ObstacleHit(outcome) => log::info!("[{frame}] hit: {outcome:?}"),
                    GameEvent::ModeChanged(mode) => log::info!("[{frame}] mode {mode:?}"),
                    GameEvent::RunOver(stats) => {
                        log::info!(
                            "[{frame}] run over: {} points, {} + {} pickups, {} power-ups, {} gates, best x{}",
                            stats.score,
                            stats.primary,
                            stats.secondary,
                            stats.powerups,
                            stats.gates,
                            stats.best_multiplier
                        );
                    }
                }
            }
            if state.mode() == GameMode::Over {
                break;
            }
        }

        let snapshot = state.snapshot();
        log::info!(
            "Finished in {:?}: score {}, difficulty {:.2}, {:?}",
            snapshot.mode,
            snapshot.score,
            snapshot.difficulty,
            snapshot.vitality
        );
        if args.snapshot {
            let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
            println!("{json}");
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is WarpSim in the library, this is just to satisfy the compiler
}
