//! Deterministic simulation module
//!
//! All game logic lives here, with no rendering or audio dependencies.

pub mod autopilot;
pub mod maze;
pub mod movement;
pub mod pursuer;
pub mod schedule;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use maze::{Maze, MazeError, Pellets, Tile, Traveler};
pub use movement::Direction;
pub use pursuer::{TargetStrategy, TickView};
pub use schedule::{PhaseSchedule, WaveMode};
pub use snapshot::{RoundSnapshot, RoundSummary};
pub use state::{Agent, GameEvent, Personality, Pursuer, PursuerMode, Round, RoundPhase, RoundStats};
pub use tick::{Command, apply_command, tick};
