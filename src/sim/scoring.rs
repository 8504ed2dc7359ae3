//! Collision and scoring rules
//!
//! Pellets, power pellets, bonus items, pursuer collisions and extra lives.

use glam::IVec2;
use rand::Rng;

use super::pursuer::{frighten_all, mark_eaten};
use super::state::{Bonus, BonusKind, GameEvent, PursuerMode, Round};
use crate::consts::*;
use crate::tile_of;

/// Frightened window for a level
pub fn frightened_duration(level: u32) -> f32 {
    (FRIGHTENED_BASE_SECS - FRIGHTENED_PER_LEVEL_SECS * level as f32).max(FRIGHTENED_MIN_SECS)
}

/// Total extra lives earned at a score (step function)
pub fn extra_lives_for_score(score: u64) -> u64 {
    if score < EXTRA_LIFE_FIRST {
        0
    } else {
        1 + (score - EXTRA_LIFE_FIRST) / EXTRA_LIFE_INTERVAL
    }
}

/// Grant any extra lives earned since the last check; returns how many
pub fn check_extra_life(round: &mut Round) -> u32 {
    let earned = extra_lives_for_score(round.total_score());
    if earned <= round.extra_lives_awarded {
        return 0;
    }
    let granted = (earned - round.extra_lives_awarded) as u32;
    round.extra_lives_awarded = earned;
    round.lives += granted;
    log::debug!("Extra life at {} points, lives now {}", round.total_score(), round.lives);
    round.push_event(GameEvent::ExtraLife { lives: round.lives });
    granted
}

/// Credit points to an agent and re-check extra lives
pub fn award(round: &mut Round, agent: usize, points: u64) {
    if let Some(a) = round.agents.get_mut(agent) {
        a.score += points;
    }
    check_extra_life(round);
}

/// Eat whatever lies on the agent's tile
pub fn consume_tile(round: &mut Round, agent: usize) {
    let tile = tile_of(round.agents[agent].pos);

    if round.pellets.take_pellet(tile) {
        round.combo += 1;
        round.combo_timer = COMBO_WINDOW_SECS;
        let points = PELLET_POINTS + u64::from(round.combo.min(COMBO_BONUS_CAP));
        award(round, agent, points);
        round.stats.pellets += 1;
        round.push_event(GameEvent::PelletEaten { agent, tile, points });
    }

    if round.pellets.take_power(tile) {
        let secs = frightened_duration(round.level);
        round.frightened_timer = secs;
        round.ghost_multiplier = 1;
        award(round, agent, POWER_PELLET_POINTS);
        round.stats.power_pellets += 1;
        frighten_all(&mut round.pursuers);
        log::debug!("Power pellet at {}: frightened for {:.1}s", tile, secs);
        round.push_event(GameEvent::PowerPelletEaten { agent, tile, frightened_secs: secs });
    }

    if let Some(idx) = round.bonuses.iter().position(|b| b.tile == tile) {
        let bonus = round.bonuses.remove(idx);
        let points = bonus.kind.base_points() + 100 * u64::from(round.level);
        award(round, agent, points);
        round.stats.bonuses += 1;
        round.push_event(GameEvent::BonusEaten { agent, kind: bonus.kind, points });
    }
}

/// Resolve agent/pursuer overlaps.
///
/// Frightened pursuers are eaten; scatter/chase pursuers outside their grace
/// period kill the agent. Invincible agents touch nothing. Returns the first
/// agent killed, if any.
pub fn resolve_collisions(round: &mut Round) -> Option<usize> {
    for ai in 0..round.agents.len() {
        let agent = &round.agents[ai];
        if !agent.alive || agent.invincible > 0.0 {
            continue;
        }
        for pi in 0..round.pursuers.len() {
            let agent = &round.agents[ai];
            let pursuer = &round.pursuers[pi];
            if pursuer.pos.distance(agent.pos) >= COLLISION_DISTANCE {
                continue;
            }
            let lethal = pursuer.is_dangerous();
            let mode = pursuer.mode;
            match mode {
                PursuerMode::Frightened => eat_pursuer(round, ai, pi),
                PursuerMode::Scatter | PursuerMode::Chase if lethal => return Some(ai),
                _ => {}
            }
        }
    }
    None
}

fn eat_pursuer(round: &mut Round, agent: usize, pursuer: usize) {
    let points = GHOST_BASE_POINTS * round.ghost_multiplier;
    round.ghost_multiplier *= 2;
    mark_eaten(&mut round.pursuers[pursuer]);
    award(round, agent, points);
    round.stats.pursuers_eaten += 1;
    let personality = round.pursuers[pursuer].personality;
    round.push_event(GameEvent::GhostEaten { agent, personality, points });
}

/// Place a bonus item on a random original-pellet tile
pub fn spawn_bonus(round: &mut Round) -> bool {
    if round.bonuses.len() >= MAX_BONUSES {
        return false;
    }
    let candidates: Vec<IVec2> = round
        .maze
        .pellet_tiles()
        .filter(|t| !round.bonuses.iter().any(|b| b.tile == *t))
        .collect();
    if candidates.is_empty() {
        return false;
    }
    let tile = candidates[round.rng.random_range(0..candidates.len())];
    let ttl = BONUS_MIN_LIFETIME_SECS + round.rng.random::<f32>() * BONUS_LIFETIME_JITTER_SECS;
    let kind = BonusKind::for_level(round.level);
    round.bonuses.push(Bonus { tile, kind, ttl });
    log::debug!("Bonus {:?} at {} for {:.1}s", kind, tile, ttl);
    round.push_event(GameEvent::BonusSpawned { tile, kind });
    true
}

/// Age bonus items and roll for a new one
pub fn update_bonuses(round: &mut Round, dt: f32) {
    for bonus in &mut round.bonuses {
        bonus.ttl -= dt;
    }
    round.bonuses.retain(|b| b.ttl > 0.0);
    if round.bonuses.len() < MAX_BONUSES && round.rng.random::<f32>() < BONUS_SPAWN_RATE * dt {
        spawn_bonus(round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PlayerMode, Settings};
    use crate::sim::maze::{Maze, Pellets};
    use crate::sim::state::Pursuer;
    use crate::sim::state::Personality;
    use crate::tile_center;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn single_round() -> Round {
        let settings = Settings { player_mode: PlayerMode::Single, ..Settings::default() };
        let mut round = Round::new(Arc::new(Maze::classic().unwrap()), &settings).unwrap();
        round.pellets = Pellets::empty(&round.maze);
        round
    }

    fn roaming(personality: Personality, tile: IVec2, mode: PursuerMode) -> Pursuer {
        let mut p = Pursuer::new(personality, tile);
        p.in_house = false;
        p.exit_delay = 0.0;
        p.mode = mode;
        p
    }

    #[test]
    fn test_frightened_duration_floor() {
        assert_eq!(frightened_duration(1), 7.5);
        assert_eq!(frightened_duration(4), 6.0);
        assert_eq!(frightened_duration(8), 4.0);
        assert_eq!(frightened_duration(30), 4.0);
    }

    #[test]
    fn test_extra_life_thresholds() {
        assert_eq!(extra_lives_for_score(9_999), 0);
        assert_eq!(extra_lives_for_score(10_000), 1);
        assert_eq!(extra_lives_for_score(59_999), 1);
        assert_eq!(extra_lives_for_score(60_000), 2);
        assert_eq!(extra_lives_for_score(110_000), 3);
    }

    #[test]
    fn test_combo_bonus_caps() {
        let mut round = single_round();
        let start = round.agents[0].spawn;
        for _ in 0..12 {
            round.pellets.place_pellet(start);
            consume_tile(&mut round, 0);
        }
        assert_eq!(round.combo, 12);
        // 11 + 12 + ... + 20 then 20 + 20
        let expected: u64 = (1..=12).map(|c: u64| PELLET_POINTS + c.min(10)).sum();
        assert_eq!(round.agents[0].score, expected);
    }

    #[test]
    fn test_power_pellet_frightens_and_resets_multiplier() {
        let mut round = single_round();
        let tile = round.agents[0].spawn;
        round.pellets.place_power(tile);
        round.ghost_multiplier = 8;
        round.pursuers[0] = roaming(Personality::Direct, IVec2::new(6, 5), PursuerMode::Chase);
        round.pursuers[0].dir = crate::sim::movement::Direction::Left;

        consume_tile(&mut round, 0);
        assert_eq!(round.frightened_timer, frightened_duration(1));
        assert_eq!(round.ghost_multiplier, 1);
        assert_eq!(round.agents[0].score, POWER_PELLET_POINTS);
        assert_eq!(round.pursuers[0].mode, PursuerMode::Frightened);
        assert_eq!(round.pursuers[0].dir, crate::sim::movement::Direction::Right);
        // Still in the pen
        assert_eq!(round.pursuers[1].mode, PursuerMode::Exiting);
    }

    #[test]
    fn test_extra_life_granted_once() {
        let mut round = single_round();
        round.agents[0].score = 10_000;
        assert_eq!(check_extra_life(&mut round), 1);
        assert_eq!(round.lives, 4);
        assert_eq!(check_extra_life(&mut round), 0);
        assert_eq!(round.lives, 4);
        let extra: Vec<_> = round
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ExtraLife { .. }))
            .collect();
        assert_eq!(extra.len(), 1);
    }

    #[test]
    fn test_collision_kills_unless_invincible_or_grace() {
        let mut round = single_round();
        let pos = round.agents[0].pos;
        round.pursuers[0] = roaming(Personality::Direct, IVec2::new(6, 5), PursuerMode::Chase);
        round.pursuers[0].pos = pos;

        round.agents[0].invincible = 1.0;
        assert_eq!(resolve_collisions(&mut round), None);

        round.agents[0].invincible = 0.0;
        round.pursuers[0].collision_grace = 0.5;
        assert_eq!(resolve_collisions(&mut round), None);

        round.pursuers[0].collision_grace = 0.0;
        assert_eq!(resolve_collisions(&mut round), Some(0));
    }

    #[test]
    fn test_invincible_agent_ignores_frightened() {
        let mut round = single_round();
        let pos = round.agents[0].pos;
        round.agents[0].invincible = 2.0;
        round.pursuers[0] =
            roaming(Personality::Flanker, IVec2::new(6, 5), PursuerMode::Frightened);
        round.pursuers[0].pos = pos + glam::Vec2::new(5.0, 0.0);

        assert_eq!(resolve_collisions(&mut round), None);
        assert!(!round.pursuers[0].eaten);
        assert_eq!(round.agents[0].score, 0);
        assert_eq!(round.ghost_multiplier, 1);

        round.agents[0].invincible = 0.0;
        assert_eq!(resolve_collisions(&mut round), None);
        assert!(round.pursuers[0].eaten);
        assert_eq!(round.agents[0].score, GHOST_BASE_POINTS);
        assert_eq!(round.ghost_multiplier, 2);
    }

    #[test]
    fn test_bonus_spawn_and_eat() {
        let mut round = single_round();
        round.level = 3;
        assert!(spawn_bonus(&mut round));
        assert!(spawn_bonus(&mut round));
        assert!(!spawn_bonus(&mut round), "at most two bonuses");
        let bonus = round.bonuses[0].clone();
        assert_eq!(bonus.kind, BonusKind::Melon);
        assert!(bonus.ttl >= BONUS_MIN_LIFETIME_SECS);
        assert!(round.maze.pellet_tiles().any(|t| t == bonus.tile));

        round.agents[0].pos = tile_center(bonus.tile);
        consume_tile(&mut round, 0);
        assert_eq!(round.agents[0].score, 500 + 300);
        assert_eq!(round.bonuses.len(), 1);
        assert_eq!(round.stats.bonuses, 1);
    }

    #[test]
    fn test_bonus_expires() {
        let mut round = single_round();
        assert!(spawn_bonus(&mut round));
        round.bonuses[0].ttl = 0.001;
        update_bonuses(&mut round, SIM_DT);
        assert!(round.bonuses.iter().all(|b| b.ttl > 0.0));
        assert!(round.bonuses.len() <= 1);
    }

    proptest! {
        #[test]
        fn prop_extra_life_check_is_idempotent(score in 0u64..1_000_000) {
            let mut round = single_round();
            round.agents[0].score = score;
            let lives = round.lives;
            let first = check_extra_life(&mut round);
            prop_assert_eq!(first as u64, extra_lives_for_score(score));
            prop_assert_eq!(check_extra_life(&mut round), 0);
            prop_assert_eq!(round.lives, lives + first);
        }

        #[test]
        fn prop_extra_lives_monotonic(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(extra_lives_for_score(lo) <= extra_lives_for_score(hi));
        }
    }
}
