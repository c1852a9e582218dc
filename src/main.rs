//! Lane Runner headless runner
//!
//! Loads tuning, then plays the game on autopilot with a fixed timestep
//! accumulator for a given number of simulated seconds. Useful as a soak
//! test and for checking that a tuning file produces a playable track.
//!
//! Usage: `lane-runner [TUNING] [--seed N] [--seconds S]`

use std::path::PathBuf;

use clap::Parser;
use lane_runner::Tuning;
use lane_runner::consts::*;
use lane_runner::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// Host frame time the loop pretends to run at
const FRAME_DT: f32 = 1.0 / 60.0;

/// Tuning used when no file is given
const BUNDLED_TUNING: &str = include_str!("../assets/default_tuning.json");

#[derive(Parser, Debug)]
#[command(version, about = "Play Lane Runner headless on autopilot")]
struct Cli {
    /// Tuning JSON file; the bundled tuning is used when omitted
    tuning: Option<PathBuf>,

    /// Seed for level generation
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
}

/// Counters gathered across runs
#[derive(Debug, Default)]
struct Summary {
    runs: u32,
    deaths: u32,
    completions: u32,
    best_distance: f32,
    best_score: u64,
    collected: u32,
    enemies_killed: u32,
    hits_taken: u32,
}

impl Summary {
    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::RunStarted { .. } => self.runs += 1,
                GameEvent::GameOver => self.deaths += 1,
                GameEvent::LevelComplete => self.completions += 1,
                GameEvent::Collected { .. } => self.collected += 1,
                GameEvent::EnemyDied { .. } => self.enemies_killed += 1,
                GameEvent::PlayerHit { .. } => self.hits_taken += 1,
                _ => {}
            }
        }
    }

    fn finish_run(&mut self, state: &GameState) {
        self.best_distance = self.best_distance.max(state.distance());
        self.best_score = self.best_score.max(state.score);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lane Runner (headless) starting...");

    let cli = Cli::parse();
    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path).unwrap_or_else(|err| {
            log::error!("{err}; falling back to default tuning");
            Tuning::default()
        }),
        None => Tuning::from_json(BUNDLED_TUNING).unwrap_or_else(|err| {
            log::error!("Bundled tuning is invalid: {err}");
            Tuning::default()
        }),
    };

    let mut state = GameState::new(tuning, cli.seed);
    let mut summary = Summary::default();
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    while elapsed < cli.seconds {
        accumulator += FRAME_DT;
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        summary.record(&state.drain_events());
        if matches!(state.phase, GamePhase::GameOver | GamePhase::LevelComplete) {
            log::info!(
                "Run {} ended ({:?}) at {:.1} with score {}",
                summary.runs,
                state.phase,
                state.distance(),
                state.score
            );
            summary.finish_run(&state);
            state.restart();
        }
    }
    summary.finish_run(&state);

    log::info!(
        "Simulated {:.0}s: {} runs, {} deaths, {} completions",
        elapsed,
        summary.runs,
        summary.deaths,
        summary.completions
    );
    log::info!(
        "Best distance {:.1}, best score {}, {} pickups, {} enemies killed, {} hits taken",
        summary.best_distance,
        summary.best_score,
        summary.collected,
        summary.enemies_killed,
        summary.hits_taken
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["lane-runner"]).unwrap();
        assert!(cli.tuning.is_none());
        assert_eq!(cli.seed, 12345);
        assert_eq!(cli.seconds, 120.0);
    }

    #[test]
    fn test_cli_flags_and_path() {
        let cli = Cli::try_parse_from([
            "lane-runner",
            "--seed",
            "7",
            "my_tuning.json",
            "--seconds",
            "2.5",
        ])
        .unwrap();
        assert_eq!(cli.tuning, Some(PathBuf::from("my_tuning.json")));
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.seconds, 2.5);
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["lane-runner", "--seed", "abc"]).is_err());
    }
}
