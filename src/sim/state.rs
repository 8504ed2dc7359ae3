//! Round state and core simulation types
//!
//! Everything a tick mutates lives in [`Round`]. Nothing here reads wall-clock
//! time; all timers advance by the fixed tick `dt`.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::maze::{
    CLASSIC_SINGLE_AGENT_SPAWN, CLASSIC_TWO_AGENT_SPAWNS, Maze, MazeError, Pellets,
};
use super::movement::Direction;
use super::schedule::PhaseSchedule;
use super::snapshot::RoundSummary;
use crate::consts::*;
use crate::settings::{PlayerMode, Settings};
use crate::tile_center;

/// Top-level round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Waiting for a start command
    Idle,
    /// Countdown before play
    Ready,
    /// Active gameplay (the only phase that simulates)
    Playing,
    Paused,
    /// Death animation after a life was lost
    Dying,
    /// Summary display after the maze was cleared
    LevelComplete,
    GameOver,
}

/// Per-pursuer behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerMode {
    Exiting,
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

/// Targeting personality of a pursuer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    /// Heads straight for the agent
    Direct,
    /// Doubles the vector from the direct pursuer through a pivot ahead of the agent
    Ambush,
    /// Chases until close, then retreats to its corner
    Shy,
    /// Aims a few tiles ahead of the agent
    Flanker,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Direct,
        Personality::Ambush,
        Personality::Shy,
        Personality::Flanker,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn index(self) -> usize {
        match self {
            Personality::Direct => 0,
            Personality::Ambush => 1,
            Personality::Shy => 2,
            Personality::Flanker => 3,
        }
    }
}

/// Player-controlled entity
#[derive(Debug, Clone)]
pub struct Agent {
    pub index: usize,
    pub spawn: IVec2,
    pub pos: Vec2,
    pub dir: Direction,
    /// Desired direction, committed when the way opens
    pub queued: Direction,
    /// Last direction of travel (used by pursuer targeting while stopped)
    pub facing: Direction,
    pub alive: bool,
    pub death_timer: f32,
    pub invincible: f32,
    pub score: u64,
    /// Recent positions for renderers (oldest first)
    pub trail: VecDeque<Vec2>,
}

impl Agent {
    pub fn new(index: usize, spawn: IVec2) -> Self {
        Self {
            index,
            spawn,
            pos: tile_center(spawn),
            dir: Direction::None,
            queued: Direction::None,
            facing: Direction::Left,
            alive: true,
            death_timer: 0.0,
            invincible: 0.0,
            score: 0,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Fresh agent at the spawn tile keeping the accumulated score
    pub fn respawned(&self) -> Self {
        Self {
            score: self.score,
            invincible: RESPAWN_INVINCIBILITY_SECS,
            ..Self::new(self.index, self.spawn)
        }
    }

    pub fn record_trail(&mut self, pos: Vec2) {
        self.trail.push_back(pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }
}

/// Autonomously controlled chaser
#[derive(Debug, Clone)]
pub struct Pursuer {
    pub personality: Personality,
    pub home: IVec2,
    pub pos: Vec2,
    pub dir: Direction,
    pub mode: PursuerMode,
    pub in_house: bool,
    pub eaten: bool,
    /// Tile of the last intersection decision
    pub last_decision_tile: Option<IVec2>,
    pub exit_delay: f32,
    /// Collisions are ignored while positive
    pub collision_grace: f32,
    /// Returned from being eaten; earns a grace period once out of the pen
    pub revived: bool,
    /// Last computed target point, if any
    pub target: Option<Vec2>,
}

impl Pursuer {
    pub fn new(personality: Personality, home: IVec2) -> Self {
        Self {
            personality,
            home,
            pos: tile_center(home),
            dir: Direction::Up,
            mode: PursuerMode::Exiting,
            in_house: true,
            eaten: false,
            last_decision_tile: None,
            exit_delay: personality.index() as f32 * EXIT_DELAY_PER_PERSONALITY,
            collision_grace: 0.0,
            revived: false,
            target: None,
        }
    }

    /// Reversal is only allowed while eaten or inside the pen
    pub fn can_reverse(&self) -> bool {
        self.eaten || self.in_house
    }

    /// Out in the maze and able to touch agents
    pub fn is_dangerous(&self) -> bool {
        matches!(self.mode, PursuerMode::Scatter | PursuerMode::Chase)
            && self.collision_grace <= 0.0
    }
}

/// Bonus item kinds, by level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Cherry,
    Orange,
    Melon,
    Galaxian,
    Bell,
}

impl BonusKind {
    const ORDER: [BonusKind; 5] = [
        BonusKind::Cherry,
        BonusKind::Orange,
        BonusKind::Melon,
        BonusKind::Galaxian,
        BonusKind::Bell,
    ];

    pub fn for_level(level: u32) -> Self {
        let idx = (level.saturating_sub(1) as usize).min(Self::ORDER.len() - 1);
        Self::ORDER[idx]
    }

    pub fn base_points(self) -> u64 {
        match self {
            BonusKind::Cherry => 100,
            BonusKind::Orange => 300,
            BonusKind::Melon => 500,
            BonusKind::Galaxian => 700,
            BonusKind::Bell => 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub tile: IVec2,
    pub kind: BonusKind,
    /// Seconds until it disappears
    pub ttl: f32,
}

/// Discrete notifications for audio/effects collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged {
        from: RoundPhase,
        to: RoundPhase,
    },
    PelletEaten {
        agent: usize,
        tile: IVec2,
        points: u64,
    },
    PowerPelletEaten {
        agent: usize,
        tile: IVec2,
        frightened_secs: f32,
    },
    GhostEaten {
        agent: usize,
        personality: Personality,
        points: u64,
    },
    PursuerRevived {
        personality: Personality,
    },
    LifeLost {
        agent: usize,
        lives_left: u32,
    },
    LevelComplete {
        level: u32,
    },
    ExtraLife {
        lives: u32,
    },
    BonusSpawned {
        tile: IVec2,
        kind: BonusKind,
    },
    BonusEaten {
        agent: usize,
        kind: BonusKind,
        points: u64,
    },
    GameOver {
        final_score: u64,
        level: u32,
    },
}

/// Counters reported in the end-of-round summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub pellets: u32,
    pub power_pellets: u32,
    pub pursuers_eaten: u32,
    pub bonuses: u32,
    pub deaths: u32,
    /// Seconds spent in the playing phase
    pub play_time: f32,
}

/// Complete round state (deterministic for a given seed and command sequence)
#[derive(Debug, Clone)]
pub struct Round {
    pub maze: Arc<Maze>,
    pub settings: Settings,
    pub pellets: Pellets,
    pub agents: Vec<Agent>,
    pub pursuers: Vec<Pursuer>,
    pub bonuses: Vec<Bonus>,
    pub phase: RoundPhase,
    /// Countdown driving Ready/Dying/LevelComplete transitions
    pub phase_timer: f32,
    pub level: u32,
    pub lives: u32,
    pub combo: u32,
    pub combo_timer: f32,
    pub frightened_timer: f32,
    pub ghost_multiplier: u64,
    pub schedule: PhaseSchedule,
    /// Seconds of play on the current level
    pub level_time: f32,
    /// Extra lives granted so far (step function of total score)
    pub extra_lives_awarded: u64,
    pub stats: RoundStats,
    pub time_ticks: u64,
    pub summary: Option<RoundSummary>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl Round {
    /// Build an idle round, validating agent spawns against the maze
    pub fn new(maze: Arc<Maze>, settings: &Settings) -> Result<Self, MazeError> {
        for spawn in spawn_tiles(settings.player_mode) {
            maze.check_spawn(spawn)?;
        }
        Ok(Self::build(maze, settings.clone().sanitized()))
    }

    fn build(maze: Arc<Maze>, settings: Settings) -> Self {
        let agents = spawn_tiles(settings.player_mode)
            .into_iter()
            .enumerate()
            .map(|(i, spawn)| Agent::new(i, spawn).respawned())
            .collect();
        let pursuers = spawn_pursuers(&maze);
        let level = settings.starting_level;
        Self {
            pellets: Pellets::from_maze(&maze),
            agents,
            pursuers,
            bonuses: Vec::new(),
            phase: RoundPhase::Idle,
            phase_timer: 0.0,
            level,
            lives: settings.starting_lives,
            combo: 0,
            combo_timer: 0.0,
            frightened_timer: 0.0,
            ghost_multiplier: 1,
            schedule: PhaseSchedule::for_level(level),
            level_time: 0.0,
            extra_lives_awarded: 0,
            stats: RoundStats::default(),
            time_ticks: 0,
            summary: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            maze,
            settings,
        }
    }

    /// Discard everything and return to an idle round
    pub fn reset(&mut self) {
        let events = std::mem::take(&mut self.events);
        *self = Self::build(self.maze.clone(), self.settings.clone());
        self.events = events;
        log::info!("Round reset");
    }

    /// Recreate agents (keeping scores) and pursuers at their start positions
    pub fn reset_positions(&mut self) {
        for agent in &mut self.agents {
            *agent = agent.respawned();
        }
        self.pursuers = spawn_pursuers(&self.maze);
        self.frightened_timer = 0.0;
        self.ghost_multiplier = 1;
        self.combo = 0;
        self.combo_timer = 0.0;
    }

    pub fn set_phase(&mut self, phase: RoundPhase, timer: f32) {
        let from = self.phase;
        self.phase = phase;
        self.phase_timer = timer;
        if from != phase {
            log::info!(
                "Round phase {:?} -> {:?} (level {}, lives {})",
                from,
                phase,
                self.level,
                self.lives
            );
            self.events.push(GameEvent::PhaseChanged { from, to: phase });
        }
    }

    pub fn total_score(&self) -> u64 {
        self.agents.iter().map(|a| a.score).sum()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

/// Agent start tiles for a player mode
pub fn spawn_tiles(mode: PlayerMode) -> Vec<IVec2> {
    match mode {
        PlayerMode::Single => vec![CLASSIC_SINGLE_AGENT_SPAWN],
        PlayerMode::Two => CLASSIC_TWO_AGENT_SPAWNS.to_vec(),
    }
}

fn spawn_pursuers(maze: &Maze) -> Vec<Pursuer> {
    maze.pursuer_homes()
        .iter()
        .enumerate()
        .map(|(i, home)| Pursuer::new(Personality::from_index(i), *home))
        .collect()
}
