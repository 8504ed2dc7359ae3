//! Wackman - a two-player maze chase arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, movement, pursuer AI, scoring, round state)
//! - `scheduler`: Fixed-step accumulator that turns frame time into ticks
//! - `game`: Facade owning a round, the scheduler and command handling
//! - `settings`: Configuration
//! - `highscores`: Leaderboard fed from round summaries

pub mod game;
pub mod highscores;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use game::{Command, Game};
pub use highscores::HighScores;
pub use scheduler::FixedStepScheduler;
pub use settings::{PlayerMode, Settings};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the scheduler will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 24.0;

    /// Agent speed at level 1 (pixels/s)
    pub const AGENT_BASE_SPEED: f32 = 125.0;
    /// Agent speed gained per level
    pub const AGENT_SPEED_PER_LEVEL: f32 = 5.0;
    /// Pursuer speed at level 1 (pixels/s)
    pub const PURSUER_BASE_SPEED: f32 = 110.0;
    /// Pursuer speed gained per level
    pub const PURSUER_SPEED_PER_LEVEL: f32 = 4.0;
    pub const FRIGHTENED_SPEED_FACTOR: f32 = 0.5;
    pub const EATEN_SPEED_FACTOR: f32 = 2.5;
    /// Hard ceiling for any entity (must stay under 2x the decision tolerance per tick)
    pub const MAX_ENTITY_SPEED: f32 = 480.0;

    /// Exponential lane-centering rate (1/s)
    pub const LANE_SNAP_RATE: f32 = 40.0;
    /// Distance from a tile center at which pursuers make decisions (pixels)
    pub const DECISION_TOLERANCE: f32 = TILE_SIZE * 0.1;
    /// Entities closer than this collide (pixels)
    pub const COLLISION_DISTANCE: f32 = TILE_SIZE / 1.5;
    /// Cosmetic trail length per agent
    pub const TRAIL_LENGTH: usize = 8;

    /// Pellet scoring
    pub const PELLET_POINTS: u64 = 10;
    pub const COMBO_BONUS_CAP: u32 = 10;
    pub const COMBO_WINDOW_SECS: f32 = 0.5;
    pub const POWER_PELLET_POINTS: u64 = 50;
    pub const GHOST_BASE_POINTS: u64 = 200;

    /// Extra life thresholds (total score)
    pub const EXTRA_LIFE_FIRST: u64 = 10_000;
    pub const EXTRA_LIFE_INTERVAL: u64 = 50_000;

    /// Round state machine timers (seconds)
    pub const START_READY_SECS: f32 = 2.5;
    pub const RESPAWN_READY_SECS: f32 = 1.5;
    pub const DYING_SECS: f32 = 1.5;
    pub const DEATH_ANIMATION_SECS: f32 = 1.0;
    pub const LEVEL_SUMMARY_SECS: f32 = 3.0;
    pub const RESPAWN_INVINCIBILITY_SECS: f32 = 2.0;

    /// Pursuer pen timers (seconds)
    pub const EXIT_DELAY_PER_PERSONALITY: f32 = 1.5;
    pub const REENTRY_DELAY_SECS: f32 = 0.5;
    pub const POST_EXIT_GRACE_SECS: f32 = 1.0;

    /// Frightened duration: max(BASE - PER_LEVEL * level, MIN)
    pub const FRIGHTENED_BASE_SECS: f32 = 8.0;
    pub const FRIGHTENED_PER_LEVEL_SECS: f32 = 0.5;
    pub const FRIGHTENED_MIN_SECS: f32 = 4.0;

    /// Bonus item spawning
    pub const BONUS_SPAWN_RATE: f32 = 0.12;
    pub const MAX_BONUSES: usize = 2;
    pub const BONUS_MIN_LIFETIME_SECS: f32 = 8.0;
    pub const BONUS_LIFETIME_JITTER_SECS: f32 = 4.0;
}

/// Tile containing a pixel position
#[inline]
pub fn tile_of(pos: Vec2) -> IVec2 {
    IVec2::new(
        (pos.x / consts::TILE_SIZE).floor() as i32,
        (pos.y / consts::TILE_SIZE).floor() as i32,
    )
}

/// Pixel center of a tile
#[inline]
pub fn tile_center(tile: IVec2) -> Vec2 {
    Vec2::new(
        tile.x as f32 * consts::TILE_SIZE + consts::TILE_SIZE / 2.0,
        tile.y as f32 * consts::TILE_SIZE + consts::TILE_SIZE / 2.0,
    )
}
