//! Fixed timestep simulation tick
//!
//! Core game loop that advances a round deterministically. Only the playing
//! phase moves entities; the other phases run just the timers that drive the
//! round state machine.

use serde::{Deserialize, Serialize};

use super::maze::Pellets;
use super::movement::{Direction, agent_speed, move_agent};
use super::pursuer::{TickView, apply_wave, end_frightened, update_pursuers};
use super::schedule::PhaseSchedule;
use super::scoring::{consume_tile, resolve_collisions, spawn_bonus, update_bonuses};
use super::snapshot::RoundSummary;
use super::state::{GameEvent, Round, RoundPhase};
use crate::consts::*;

/// Intent pushed into the simulation from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Resume,
    /// Application lost focus (auto-pause)
    FocusLost,
    /// Discard the round and return to idle (honored in any phase)
    Reset,
    /// Queue a turn for one agent
    Turn { agent: usize, dir: Direction },
}

/// Apply a single command between ticks
pub fn apply_command(round: &mut Round, command: Command) {
    match command {
        Command::Start => {
            if round.phase == RoundPhase::Idle {
                log::info!("Round started at level {} with {} lives", round.level, round.lives);
                round.set_phase(RoundPhase::Ready, START_READY_SECS);
            } else {
                log::debug!("Start ignored in {:?}", round.phase);
            }
        }
        Command::Pause | Command::FocusLost => {
            if round.phase == RoundPhase::Playing {
                round.set_phase(RoundPhase::Paused, 0.0);
            }
        }
        Command::Resume => {
            if round.phase == RoundPhase::Paused {
                round.set_phase(RoundPhase::Playing, 0.0);
            }
        }
        Command::Reset => round.reset(),
        Command::Turn { agent, dir } => match round.agents.get_mut(agent) {
            Some(a) => a.queued = dir,
            None => log::warn!("Turn for inactive agent {} ignored", agent),
        },
    }
}

/// Advance the round by one fixed timestep
pub fn tick(round: &mut Round, dt: f32) {
    round.time_ticks += 1;
    match round.phase {
        RoundPhase::Idle | RoundPhase::Paused | RoundPhase::GameOver => {}
        RoundPhase::Ready => tick_ready(round, dt),
        RoundPhase::Playing => tick_playing(round, dt),
        RoundPhase::Dying => tick_dying(round, dt),
        RoundPhase::LevelComplete => tick_level_complete(round, dt),
    }
}

fn tick_ready(round: &mut Round, dt: f32) {
    round.phase_timer -= dt;
    if round.phase_timer <= 0.0 {
        round.set_phase(RoundPhase::Playing, 0.0);
        spawn_bonus(round);
    }
}

fn tick_playing(round: &mut Round, dt: f32) {
    round.level_time += dt;
    round.stats.play_time += dt;

    if round.combo_timer > 0.0 {
        round.combo_timer -= dt;
        if round.combo_timer <= 0.0 {
            round.combo_timer = 0.0;
            round.combo = 0;
        }
    }

    if round.frightened_timer > 0.0 {
        round.frightened_timer -= dt;
        if round.frightened_timer <= 0.0 {
            round.frightened_timer = 0.0;
            round.ghost_multiplier = 1;
            end_frightened(&mut round.pursuers, round.schedule.current());
            log::debug!("Frightened window over");
        }
    }

    if let Some(wave) = round.schedule.advance(dt) {
        log::debug!("Wave switch to {:?} (phase {})", wave, round.schedule.index());
        apply_wave(&mut round.pursuers, wave);
    }

    // Cross-entity queries read positions committed by the previous tick
    let view = TickView::capture(round);

    let speed = agent_speed(round.level, round.settings.agent_speed_modifier);
    for i in 0..round.agents.len() {
        if !round.agents[i].alive {
            continue;
        }
        let agent = &mut round.agents[i];
        agent.invincible = (agent.invincible - dt).max(0.0);
        move_agent(&round.maze, agent, speed, dt);
        consume_tile(round, i);

        if round.pellets.is_cleared() {
            log::info!("Level {} cleared in {:.1}s", round.level, round.level_time);
            round.push_event(GameEvent::LevelComplete { level: round.level });
            round.set_phase(RoundPhase::LevelComplete, LEVEL_SUMMARY_SECS);
            return;
        }
    }

    update_pursuers(round, &view, dt);

    if let Some(victim) = resolve_collisions(round) {
        enter_dying(round, victim);
        return;
    }

    update_bonuses(round, dt);
}

fn enter_dying(round: &mut Round, victim: usize) {
    round.lives = round.lives.saturating_sub(1);
    let agent = &mut round.agents[victim];
    agent.alive = false;
    agent.dir = Direction::None;
    agent.death_timer = DEATH_ANIMATION_SECS;
    round.stats.deaths += 1;
    log::info!("Agent {} caught, {} lives left", victim, round.lives);
    round.push_event(GameEvent::LifeLost { agent: victim, lives_left: round.lives });
    round.set_phase(RoundPhase::Dying, DYING_SECS);
}

fn tick_dying(round: &mut Round, dt: f32) {
    for agent in round.agents.iter_mut().filter(|a| !a.alive) {
        agent.death_timer = (agent.death_timer - dt).max(0.0);
    }
    round.phase_timer -= dt;
    if round.phase_timer > 0.0 {
        return;
    }

    if round.lives == 0 {
        finish_round(round);
        return;
    }
    round.reset_positions();
    round.schedule = PhaseSchedule::for_level(round.level);
    round.set_phase(RoundPhase::Ready, RESPAWN_READY_SECS);
}

fn tick_level_complete(round: &mut Round, dt: f32) {
    round.phase_timer -= dt;
    if round.phase_timer > 0.0 {
        return;
    }

    round.level += 1;
    round.pellets = Pellets::from_maze(&round.maze);
    round.schedule = PhaseSchedule::for_level(round.level);
    round.level_time = 0.0;
    round.bonuses.clear();
    round.reset_positions();
    log::info!("Level {} begins", round.level);
    round.set_phase(RoundPhase::Ready, START_READY_SECS);
}

fn finish_round(round: &mut Round) {
    let summary = RoundSummary::from_round(round);
    log::info!(
        "Game over: {} points, level {}, {} pursuers eaten",
        summary.final_score,
        summary.level_reached,
        summary.stats.pursuers_eaten
    );
    round.push_event(GameEvent::GameOver {
        final_score: summary.final_score,
        level: summary.level_reached,
    });
    round.summary = Some(summary);
    round.set_phase(RoundPhase::GameOver, 0.0);
}
