//! Read-only views handed to renderers and persistence

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::movement::Direction;
use super::schedule::WaveMode;
use super::state::{Bonus, Personality, PursuerMode, Round, RoundPhase, RoundStats};
use crate::tile_of;

#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub index: usize,
    pub pos: Vec2,
    pub tile: IVec2,
    pub dir: Direction,
    pub queued: Direction,
    pub facing: Direction,
    pub alive: bool,
    pub death_timer: f32,
    pub invincible: f32,
    pub score: u64,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PursuerView {
    pub personality: Personality,
    pub pos: Vec2,
    pub tile: IVec2,
    pub dir: Direction,
    pub mode: PursuerMode,
    pub in_house: bool,
    pub eaten: bool,
    pub target: Option<Vec2>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub phase_timer: f32,
    pub level: u32,
    pub lives: u32,
    pub score: u64,
    pub combo: u32,
    pub frightened_remaining: f32,
    pub ghost_multiplier: u64,
    pub wave: WaveMode,
    pub pellets_remaining: usize,
    pub power_remaining: usize,
    pub agents: Vec<AgentView>,
    pub pursuers: Vec<PursuerView>,
    pub bonuses: Vec<Bonus>,
    pub time_ticks: u64,
}

/// End-of-round record for leaderboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub final_score: u64,
    pub agent_scores: Vec<u64>,
    pub level_reached: u32,
    pub stats: RoundStats,
}

impl RoundSummary {
    pub fn from_round(round: &Round) -> Self {
        Self {
            final_score: round.total_score(),
            agent_scores: round.agents.iter().map(|a| a.score).collect(),
            level_reached: round.level,
            stats: round.stats.clone(),
        }
    }
}

impl Round {
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            phase_timer: self.phase_timer.max(0.0),
            level: self.level,
            lives: self.lives,
            score: self.total_score(),
            combo: self.combo,
            frightened_remaining: self.frightened_timer.max(0.0),
            ghost_multiplier: self.ghost_multiplier,
            wave: self.schedule.current(),
            pellets_remaining: self.pellets.pellet_count(),
            power_remaining: self.pellets.power_count(),
            agents: self
                .agents
                .iter()
                .map(|a| AgentView {
                    index: a.index,
                    pos: a.pos,
                    tile: tile_of(a.pos),
                    dir: a.dir,
                    queued: a.queued,
                    facing: a.facing,
                    alive: a.alive,
                    death_timer: a.death_timer,
                    invincible: a.invincible,
                    score: a.score,
                    trail: a.trail.iter().copied().collect(),
                })
                .collect(),
            pursuers: self
                .pursuers
                .iter()
                .map(|p| PursuerView {
                    personality: p.personality,
                    pos: p.pos,
                    tile: tile_of(p.pos),
                    dir: p.dir,
                    mode: p.mode,
                    in_house: p.in_house,
                    eaten: p.eaten,
                    target: p.target,
                })
                .collect(),
            bonuses: self.bonuses.clone(),
            time_ticks: self.time_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::settings::Settings;
    use crate::sim::maze::Maze;

    #[test]
    fn test_snapshot_serializes() {
        let round = Round::new(Arc::new(Maze::classic().unwrap()), &Settings::default()).unwrap();
        let snapshot = round.snapshot();
        assert_eq!(snapshot.agents.len(), 2);
        assert_eq!(snapshot.pursuers.len(), 4);
        assert_eq!(snapshot.power_remaining, 4);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["wave"], "scatter");
        assert_eq!(json["pursuers"][0]["mode"], "exiting");
    }

    #[test]
    fn test_summary_from_round() {
        let maze = Arc::new(Maze::classic().unwrap());
        let mut round = Round::new(maze, &Settings::default()).unwrap();
        round.agents[0].score = 120;
        round.agents[1].score = 30;
        round.level = 2;
        let summary = RoundSummary::from_round(&round);
        assert_eq!(summary.final_score, 150);
        assert_eq!(summary.agent_scores, vec![120, 30]);
        assert_eq!(summary.level_reached, 2);

        let json = serde_json::to_string(&summary).unwrap();
        let back: RoundSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
