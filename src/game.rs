//! Game facade
//!
//! Owns one round plus the fixed-step scheduler. Collaborators push
//! [`Command`]s in, feed frame time through [`Game::advance`], and read
//! snapshots, events and the end-of-round summary back out.

use std::sync::Arc;

use crate::consts::SIM_DT;
use crate::scheduler::FixedStepScheduler;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, Maze, MazeError, Round, RoundPhase, RoundSnapshot, RoundSummary, apply_command, tick,
};

pub use crate::sim::Command;

#[derive(Debug, Clone)]
pub struct Game {
    round: Round,
    scheduler: FixedStepScheduler,
}

impl Game {
    /// Game on the arcade layout
    pub fn new(settings: Settings) -> Result<Self, MazeError> {
        Self::with_maze(Maze::classic()?, settings)
    }

    pub fn with_maze(maze: Maze, settings: Settings) -> Result<Self, MazeError> {
        let round = Round::new(Arc::new(maze), &settings)?;
        log::info!(
            "Game ready: {} agent(s), seed {}, level {}",
            round.agents.len(),
            round.settings.seed,
            round.level
        );
        Ok(Self {
            round,
            scheduler: FixedStepScheduler::default(),
        })
    }

    pub fn handle(&mut self, command: Command) {
        if command == Command::Reset {
            self.scheduler.reset();
        }
        apply_command(&mut self.round, command);
    }

    /// Feed one frame of elapsed time; returns the number of ticks run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let round = &mut self.round;
        self.scheduler.advance(frame_dt, |dt| tick(round, dt))
    }

    /// Run exactly one fixed tick, bypassing the accumulator
    pub fn step(&mut self) {
        tick(&mut self.round, SIM_DT);
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.round.snapshot()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.round.drain_events()
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.round.summary.as_ref()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Render interpolation factor between the last two ticks
    pub fn alpha(&self) -> f32 {
        self.scheduler.alpha()
    }
}
