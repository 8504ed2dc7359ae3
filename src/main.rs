//! Headless runner: plays a round on autopilot through the fixed-step
//! scheduler and prints the end-of-round summary as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use wackman::sim::autopilot;
use wackman::sim::{GameEvent, RoundPhase, RoundSummary};
use wackman::{Command, Game, HighScores, PlayerMode, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Simulated seconds to run before stopping
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Simulated frame time in milliseconds
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f32,
    #[arg(long)]
    seed: Option<u64>,
    /// One agent instead of two
    #[arg(long)]
    single: bool,
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Also print the final snapshot
    #[arg(long)]
    snapshot: bool,
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PelletEaten { .. } | GameEvent::PhaseChanged { .. } => {
            log::trace!("{:?}", event)
        }
        GameEvent::LifeLost { .. }
        | GameEvent::LevelComplete { .. }
        | GameEvent::GameOver { .. } => log::info!("{:?}", event),
        _ => log::debug!("{:?}", event),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = cli.settings.as_deref().map(Settings::load).unwrap_or_default();
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if cli.single {
        settings.player_mode = PlayerMode::Single;
    }

    let mut game = match Game::new(settings) {
        Ok(game) => game,
        Err(err) => {
            log::error!("Cannot start: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let frame_dt = (cli.frame_ms / 1000.0).max(0.001);
    let frames = (cli.seconds.max(0.0) / frame_dt).ceil() as u64;
    game.handle(Command::Start);

    let mut ticks = 0u64;
    for _ in 0..frames {
        for command in autopilot::steer_all(game.round()) {
            game.handle(command);
        }
        ticks += u64::from(game.advance(frame_dt));
        for event in game.drain_events() {
            log_event(&event);
        }
        if game.phase() == RoundPhase::GameOver {
            break;
        }
    }
    log::info!("Ran {} ticks, final phase {:?}", ticks, game.phase());

    let summary = game
        .summary()
        .cloned()
        .unwrap_or_else(|| RoundSummary::from_round(game.round()));
    let mut highscores = HighScores::new();
    if let Some(rank) = highscores.add_summary(&summary) {
        log::info!("Leaderboard rank {}", rank);
    }

    let output = if cli.snapshot {
        serde_json::to_string_pretty(&serde_json::json!({
            "summary": summary,
            "snapshot": game.snapshot(),
        }))
    } else {
        serde_json::to_string_pretty(&summary)
    };
    match output {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Failed to serialize summary: {}", err);
            ExitCode::FAILURE
        }
    }
}
