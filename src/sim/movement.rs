//! Continuous movement over the tile grid
//!
//! Shared by agents and pursuers: advancing along a direction, stopping at
//! walls, lane-centering and horizontal tunnel wrap.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::maze::{Maze, Traveler};
use super::state::Agent;
use crate::consts::*;
use crate::{tile_center, tile_of};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order for intersection decisions (also the tie-break order)
    pub const CARDINALS: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Tile offset (screen space, y grows downward)
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
            Direction::None => IVec2::ZERO,
        }
    }

    pub fn vector(self) -> Vec2 {
        self.offset().as_vec2()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Result of a single movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    /// Next tile impassable; the body was snapped to its tile center
    Blocked,
    Idle,
}

/// Agent speed in pixels/s for a level
pub fn agent_speed(level: u32, modifier: f32) -> f32 {
    let base = AGENT_BASE_SPEED + level.saturating_sub(1) as f32 * AGENT_SPEED_PER_LEVEL;
    (base * modifier.max(0.0)).min(MAX_ENTITY_SPEED)
}

/// Pursuer speed in pixels/s, by level and whether it is eaten or frightened
pub fn pursuer_speed(level: u32, eaten: bool, frightened: bool) -> f32 {
    let speed = if eaten {
        PURSUER_BASE_SPEED * EATEN_SPEED_FACTOR
    } else if frightened {
        PURSUER_BASE_SPEED * FRIGHTENED_SPEED_FACTOR
    } else {
        PURSUER_BASE_SPEED + level.saturating_sub(1) as f32 * PURSUER_SPEED_PER_LEVEL
    };
    speed.min(MAX_ENTITY_SPEED)
}

/// Pull the coordinate perpendicular to travel toward the lane centerline
pub fn center_in_lane(pos: &mut Vec2, dir: Direction, dt: f32) {
    let center = tile_center(tile_of(*pos));
    let blend = 1.0 - (-LANE_SNAP_RATE * dt).exp();
    if dir.is_horizontal() {
        pos.y += (center.y - pos.y) * blend;
    } else if dir.is_vertical() {
        pos.x += (center.x - pos.x) * blend;
    }
}

/// Horizontal tunnel wrap: past either bound reappears at the other edge
pub fn wrap_position(pos: &mut Vec2, pixel_width: f32) {
    if pos.x < 0.0 {
        pos.x += pixel_width;
    } else if pos.x >= pixel_width {
        pos.x -= pixel_width;
    }
}

/// Advance `distance` pixels along `dir`, stopping at the tile center when the
/// next position would fall into an impassable tile.
pub fn advance(
    maze: &Maze,
    pos: &mut Vec2,
    dir: Direction,
    distance: f32,
    traveler: Traveler,
) -> StepOutcome {
    if dir == Direction::None || distance <= 0.0 {
        return StepOutcome::Idle;
    }
    let candidate = *pos + dir.vector() * distance;
    if maze.is_passable(tile_of(candidate), traveler) {
        *pos = candidate;
        wrap_position(pos, maze.pixel_width());
        StepOutcome::Moved
    } else {
        *pos = tile_center(tile_of(*pos));
        StepOutcome::Blocked
    }
}

/// Commit the queued turn when the adjacent tile in that direction is open
pub fn try_turn(maze: &Maze, agent: &mut Agent) -> bool {
    if agent.queued == Direction::None || agent.queued == agent.dir {
        return false;
    }
    let next = tile_of(agent.pos) + agent.queued.offset();
    if maze.is_wall(next) {
        return false;
    }
    agent.dir = agent.queued;
    agent.facing = agent.queued;
    true
}

/// One movement step for an agent: turn, lane-center, advance, wrap
pub fn move_agent(maze: &Maze, agent: &mut Agent, speed: f32, dt: f32) -> StepOutcome {
    try_turn(maze, agent);
    if agent.dir == Direction::None {
        return StepOutcome::Idle;
    }
    center_in_lane(&mut agent.pos, agent.dir, dt);

    let before = agent.pos;
    let outcome = advance(maze, &mut agent.pos, agent.dir, speed * dt, Traveler::Agent);
    match outcome {
        StepOutcome::Moved => agent.record_trail(before),
        StepOutcome::Blocked => agent.dir = Direction::None,
        StepOutcome::Idle => {}
    }
    outcome
}
