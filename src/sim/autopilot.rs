//! Demo/attract-mode steering
//!
//! Picks a direction toward the nearest edible tile while keeping clear of
//! dangerous pursuers. Produces ordinary turn commands, so the round cannot
//! tell an autopilot from a player.

use glam::IVec2;

use super::maze::Traveler;
use super::movement::Direction;
use super::pursuer::first_step_where;
use super::state::{PursuerMode, Round};
use super::tick::Command;
use crate::tile_of;

/// Tiles within this Manhattan distance of a dangerous pursuer are avoided
const DANGER_RADIUS: i32 = 2;
/// Chase frightened pursuers only while this much frightened time remains
const HUNT_MIN_SECS: f32 = 1.5;

/// Direction the autopilot wants for one agent, if any goal is reachable
pub fn steer(round: &Round, agent: usize) -> Option<Direction> {
    let agent = round.agents.get(agent).filter(|a| a.alive)?;
    let maze = &round.maze;
    let from = tile_of(agent.pos);

    let threats: Vec<IVec2> = round
        .pursuers
        .iter()
        .filter(|p| p.is_dangerous())
        .map(|p| tile_of(p.pos))
        .collect();
    // Invincible agents pass through pursuers, so there is nothing to hunt
    let prey: Vec<IVec2> = if round.frightened_timer > HUNT_MIN_SECS && agent.invincible <= 0.0 {
        round
            .pursuers
            .iter()
            .filter(|p| p.mode == PursuerMode::Frightened)
            .map(|p| tile_of(p.pos))
            .collect()
    } else {
        Vec::new()
    };

    let is_goal = |tile: IVec2| {
        round.pellets.has_pellet(tile)
            || round.pellets.has_power(tile)
            || round.bonuses.iter().any(|b| b.tile == tile)
            || prey.contains(&tile)
    };
    let near_threat = |tile: IVec2| {
        threats.iter().any(|t| {
            let d = (maze.wrap(tile) - *t).abs();
            d.x + d.y <= DANGER_RADIUS
        })
    };

    first_step_where(maze, from, Traveler::Agent, is_goal, near_threat)
        .or_else(|| first_step_where(maze, from, Traveler::Agent, is_goal, |_| false))
        .map(|(dir, goal)| {
            log::trace!("Autopilot agent {} heads {:?} toward {}", agent.index, dir, goal);
            dir
        })
}

/// Turn commands for every living agent whose wanted direction changed
pub fn steer_all(round: &Round) -> Vec<Command> {
    round
        .agents
        .iter()
        .filter_map(|agent| {
            let dir = steer(round, agent.index)?;
            (dir != agent.queued).then_some(Command::Turn { agent: agent.index, dir })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::{PlayerMode, Settings};
    use crate::sim::maze::{Maze, Pellets};
    use crate::sim::state::{Personality, Pursuer, RoundPhase};
    use crate::sim::tick::{apply_command, tick};
    use crate::tile_center;

    fn round_with_pellets(tiles: &[IVec2]) -> Round {
        let settings = Settings { player_mode: PlayerMode::Single, ..Settings::default() };
        let mut round = Round::new(Arc::new(Maze::classic().unwrap()), &settings).unwrap();
        round.pellets = Pellets::empty(&round.maze);
        for tile in tiles {
            round.pellets.place_pellet(*tile);
        }
        round
    }

    #[test]
    fn test_heads_for_nearest_pellet() {
        let round = round_with_pellets(&[IVec2::new(10, 22), IVec2::new(17, 22)]);
        assert_eq!(steer(&round, 0), Some(Direction::Left));
    }

    #[test]
    fn test_avoids_dangerous_pursuer() {
        let mut round = round_with_pellets(&[IVec2::new(10, 22), IVec2::new(17, 22)]);
        let mut pursuer = Pursuer::new(Personality::Direct, IVec2::new(11, 22));
        pursuer.in_house = false;
        pursuer.mode = PursuerMode::Chase;
        pursuer.pos = tile_center(IVec2::new(11, 22));
        round.pursuers[0] = pursuer;
        assert_eq!(steer(&round, 0), Some(Direction::Right));
    }

    #[test]
    fn test_no_goal_no_direction() {
        let round = round_with_pellets(&[]);
        assert_eq!(steer(&round, 0), None);
        assert_eq!(steer(&round, 5), None);
        assert!(steer_all(&round).is_empty());
    }

    #[test]
    fn test_autopilot_makes_progress() {
        let settings = Settings { player_mode: PlayerMode::Single, ..Settings::default() };
        let mut round = Round::new(Arc::new(Maze::classic().unwrap()), &settings).unwrap();
        let start = round.pellets.pellet_count();
        apply_command(&mut round, Command::Start);
        for _ in 0..1_200 {
            for cmd in steer_all(&round) {
                apply_command(&mut round, cmd);
            }
            tick(&mut round, SIM_DT);
            if round.phase != RoundPhase::Playing && round.phase != RoundPhase::Ready {
                break;
            }
        }
        assert!(round.pellets.pellet_count() < start);
    }
}
