//! Pursuer AI: targeting, intersection decisions, pen exit and return
//!
//! Cross-entity reads go through [`TickView`], captured once at the start of
//! a tick, so the order in which entities move within a tick does not leak
//! into targeting.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::Rng;

use super::maze::{Maze, Traveler};
use super::movement::{Direction, StepOutcome, advance, pursuer_speed};
use super::schedule::WaveMode;
use super::state::{GameEvent, Personality, Pursuer, PursuerMode, Round};
use crate::consts::*;
use crate::{tile_center, tile_of};

/// Shy pursuers retreat when closer than this (tiles)
const SHY_RADIUS_TILES: f32 = 8.0;
/// Ambush pivot distance ahead of the agent (tiles)
const AMBUSH_LEAD_TILES: i32 = 2;
/// Flanker aim distance ahead of the agent (tiles)
const FLANK_LEAD_TILES: i32 = 4;

#[derive(Debug, Clone)]
pub struct AgentSample {
    pub index: usize,
    pub pos: Vec2,
    pub tile: IVec2,
    pub facing: Direction,
}

#[derive(Debug, Clone)]
pub struct PursuerSample {
    pub personality: Personality,
    pub pos: Vec2,
    pub tile: IVec2,
}

/// Positions committed by the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickView {
    /// Living agents only
    pub agents: Vec<AgentSample>,
    pub pursuers: Vec<PursuerSample>,
}

impl TickView {
    pub fn capture(round: &Round) -> Self {
        Self {
            agents: round
                .agents
                .iter()
                .filter(|a| a.alive)
                .map(|a| AgentSample {
                    index: a.index,
                    pos: a.pos,
                    tile: tile_of(a.pos),
                    facing: a.facing,
                })
                .collect(),
            pursuers: round
                .pursuers
                .iter()
                .map(|p| PursuerSample {
                    personality: p.personality,
                    pos: p.pos,
                    tile: tile_of(p.pos),
                })
                .collect(),
        }
    }

    /// Closest living agent (lowest index wins ties)
    pub fn nearest_agent(&self, pos: Vec2) -> Option<&AgentSample> {
        self.agents.iter().min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn pursuer(&self, personality: Personality) -> Option<&PursuerSample> {
        self.pursuers.iter().find(|p| p.personality == personality)
    }
}

/// Inputs to a chase-mode target computation
pub struct TargetInput<'a> {
    pub maze: &'a Maze,
    pub view: &'a TickView,
    pub personality: Personality,
    /// Tile of the pursuer being targeted for
    pub tile: IVec2,
    /// Reference agent
    pub agent: &'a AgentSample,
}

/// Chase-mode targeting rule for one personality
pub trait TargetStrategy {
    fn chase_target(&self, input: &TargetInput<'_>) -> IVec2;
}

pub struct DirectTarget;
pub struct AmbushTarget;
pub struct ShyTarget;
pub struct FlankTarget;

impl TargetStrategy for DirectTarget {
    fn chase_target(&self, input: &TargetInput<'_>) -> IVec2 {
        input.agent.tile
    }
}

impl TargetStrategy for AmbushTarget {
    fn chase_target(&self, input: &TargetInput<'_>) -> IVec2 {
        let pivot = input.agent.tile + input.agent.facing.offset() * AMBUSH_LEAD_TILES;
        match input.view.pursuer(Personality::Direct) {
            Some(direct) => pivot * 2 - direct.tile,
            None => pivot,
        }
    }
}

impl TargetStrategy for ShyTarget {
    fn chase_target(&self, input: &TargetInput<'_>) -> IVec2 {
        let distance = input.tile.as_vec2().distance(input.agent.tile.as_vec2());
        if distance < SHY_RADIUS_TILES {
            input.maze.scatter_corner(input.personality.index())
        } else {
            input.agent.tile
        }
    }
}

impl TargetStrategy for FlankTarget {
    fn chase_target(&self, input: &TargetInput<'_>) -> IVec2 {
        let ahead = match input.agent.facing {
            // Arcade overflow: facing up also shifts the aim left
            Direction::Up => IVec2::new(-FLANK_LEAD_TILES, -FLANK_LEAD_TILES),
            facing => facing.offset() * FLANK_LEAD_TILES,
        };
        input.agent.tile + ahead
    }
}

impl Personality {
    pub fn strategy(self) -> &'static dyn TargetStrategy {
        match self {
            Personality::Direct => &DirectTarget,
            Personality::Ambush => &AmbushTarget,
            Personality::Shy => &ShyTarget,
            Personality::Flanker => &FlankTarget,
        }
    }
}

/// Shared, read-only inputs for one tick of pursuer updates
pub struct PursuerContext<'a> {
    pub maze: &'a Maze,
    pub view: &'a TickView,
    pub wave: WaveMode,
    pub level: u32,
}

/// Target tile for the current mode; `None` while frightened
pub fn select_target(ctx: &PursuerContext<'_>, pursuer: &Pursuer) -> Option<IVec2> {
    let corner = ctx.maze.scatter_corner(pursuer.personality.index());
    match pursuer.mode {
        PursuerMode::Scatter => Some(corner),
        PursuerMode::Chase => {
            let Some(agent) = ctx.view.nearest_agent(pursuer.pos) else {
                return Some(corner);
            };
            let input = TargetInput {
                maze: ctx.maze,
                view: ctx.view,
                personality: pursuer.personality,
                tile: tile_of(pursuer.pos),
                agent,
            };
            Some(pursuer.personality.strategy().chase_target(&input))
        }
        PursuerMode::Frightened | PursuerMode::Exiting | PursuerMode::Eaten => None,
    }
}

/// Pick a direction at an intersection.
///
/// Reversal is excluded unless `can_reverse`; with no valid option every
/// passable direction (reverse included) is considered. Without a target the
/// choice is uniform random, otherwise the neighbor closest to the target
/// wins with ties going to the earliest of right, left, down, up.
pub fn decide<R: Rng>(
    maze: &Maze,
    tile: IVec2,
    current: Direction,
    can_reverse: bool,
    traveler: Traveler,
    target: Option<Vec2>,
    rng: &mut R,
) -> Direction {
    let open = |dir: &Direction| maze.is_passable(tile + dir.offset(), traveler);
    let mut options: Vec<Direction> = Direction::CARDINALS
        .into_iter()
        .filter(|d| can_reverse || current == Direction::None || *d != current.opposite())
        .filter(open)
        .collect();
    if options.is_empty() {
        options = Direction::CARDINALS.into_iter().filter(open).collect();
    }
    if options.is_empty() {
        return current;
    }

    let Some(target) = target else {
        return options[rng.random_range(0..options.len())];
    };
    let mut best = options[0];
    let mut best_dist = f32::INFINITY;
    for dir in options {
        let dist = tile_center(tile + dir.offset()).distance(target);
        if dist < best_dist {
            best = dir;
            best_dist = dist;
        }
    }
    best
}

/// Breadth-first search returning the first step from `from` toward the
/// nearest tile accepted by `is_goal`, plus that goal tile.
pub fn first_step_where(
    maze: &Maze,
    from: IVec2,
    traveler: Traveler,
    is_goal: impl Fn(IVec2) -> bool,
    avoid: impl Fn(IVec2) -> bool,
) -> Option<(Direction, IVec2)> {
    let width = maze.width();
    let height = maze.height();
    let from = maze.wrap(from);
    if from.y < 0 || from.y >= height {
        return None;
    }
    let index = |t: IVec2| (t.y * width + t.x) as usize;
    let mut first = vec![Direction::None; (width * height) as usize];
    let mut seen = vec![false; (width * height) as usize];
    let mut queue = VecDeque::new();
    seen[index(from)] = true;
    queue.push_back(from);

    while let Some(tile) = queue.pop_front() {
        for dir in Direction::CARDINALS {
            let next = maze.wrap(tile + dir.offset());
            if next.y < 0 || next.y >= height || seen[index(next)] {
                continue;
            }
            if !maze.is_passable(next, traveler) || avoid(next) {
                continue;
            }
            seen[index(next)] = true;
            let step = if tile == from { dir } else { first[index(tile)] };
            first[index(next)] = step;
            if is_goal(next) {
                return Some((step, next));
            }
            queue.push_back(next);
        }
    }
    None
}

/// First step of a shortest path between two tiles
pub fn bfs_first_step(
    maze: &Maze,
    from: IVec2,
    to: IVec2,
    traveler: Traveler,
) -> Option<Direction> {
    let to = maze.wrap(to);
    if maze.wrap(from) == to {
        return None;
    }
    first_step_where(maze, from, traveler, |t| t == to, |_| false).map(|(dir, _)| dir)
}

fn traveler_for(mode: PursuerMode) -> Traveler {
    match mode {
        PursuerMode::Exiting | PursuerMode::Eaten => Traveler::PursuerWithGate,
        _ => Traveler::Pursuer,
    }
}

/// One tick of a single pursuer
pub fn update_pursuer<R: Rng>(
    ctx: &PursuerContext<'_>,
    pursuer: &mut Pursuer,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
    dt: f32,
) {
    pursuer.collision_grace = (pursuer.collision_grace - dt).max(0.0);
    let speed = pursuer_speed(
        ctx.level,
        pursuer.eaten,
        pursuer.mode == PursuerMode::Frightened,
    );
    match pursuer.mode {
        PursuerMode::Exiting => update_exiting(ctx, pursuer, speed * dt, dt),
        PursuerMode::Eaten => update_eaten(ctx, pursuer, rng, events, speed * dt),
        PursuerMode::Scatter | PursuerMode::Chase | PursuerMode::Frightened => {
            update_roaming(ctx, pursuer, rng, speed * dt)
        }
    }
}

/// Update every pursuer in the round against a start-of-tick view
pub fn update_pursuers(round: &mut Round, view: &TickView, dt: f32) {
    let Round {
        maze,
        pursuers,
        rng,
        events,
        schedule,
        level,
        ..
    } = round;
    let ctx = PursuerContext {
        maze,
        view,
        wave: schedule.current(),
        level: *level,
    };
    for pursuer in pursuers.iter_mut() {
        update_pursuer(&ctx, pursuer, rng, events, dt);
    }
}

/// Axis-then-axis walk to the pen exit once the delay runs out
fn update_exiting(ctx: &PursuerContext<'_>, pursuer: &mut Pursuer, step: f32, dt: f32) {
    if pursuer.exit_delay > 0.0 {
        pursuer.exit_delay = (pursuer.exit_delay - dt).max(0.0);
        return;
    }
    let exit = tile_center(ctx.maze.pen_exit());

    if pursuer.pos.x != exit.x {
        let dx = exit.x - pursuer.pos.x;
        pursuer.dir = if dx > 0.0 { Direction::Right } else { Direction::Left };
        if dx.abs() <= step {
            pursuer.pos.x = exit.x;
        } else {
            pursuer.pos.x += dx.signum() * step;
        }
        return;
    }

    let dy = exit.y - pursuer.pos.y;
    pursuer.dir = if dy > 0.0 { Direction::Down } else { Direction::Up };
    if dy.abs() > step {
        pursuer.pos.y += dy.signum() * step;
        return;
    }

    pursuer.pos.y = exit.y;
    pursuer.in_house = false;
    pursuer.mode = ctx.wave.pursuer_mode();
    pursuer.last_decision_tile = None;
    if pursuer.revived {
        pursuer.revived = false;
        pursuer.collision_grace = POST_EXIT_GRACE_SECS;
    }
    log::debug!("{:?} left the pen in {:?}", pursuer.personality, pursuer.mode);
}

/// Scatter/chase/frightened movement with intersection decisions
fn update_roaming<R: Rng>(ctx: &PursuerContext<'_>, pursuer: &mut Pursuer, rng: &mut R, step: f32) {
    let target = select_target(ctx, pursuer).map(tile_center);
    pursuer.target = target;
    let traveler = traveler_for(pursuer.mode);

    let tile = tile_of(pursuer.pos);
    let center = tile_center(tile);
    if pursuer.pos.distance(center) <= DECISION_TOLERANCE
        && pursuer.last_decision_tile != Some(tile)
    {
        let dir = decide(
            ctx.maze,
            tile,
            pursuer.dir,
            pursuer.can_reverse(),
            traveler,
            target,
            rng,
        );
        if dir != pursuer.dir {
            log::trace!(
                "{:?} turns {:?} -> {:?} at {}",
                pursuer.personality,
                pursuer.dir,
                dir,
                tile
            );
            pursuer.pos = center;
            pursuer.dir = dir;
        }
        pursuer.last_decision_tile = Some(tile);
    }

    if advance(ctx.maze, &mut pursuer.pos, pursuer.dir, step, traveler) == StepOutcome::Blocked {
        pursuer.last_decision_tile = None;
    }
}

/// Path back to the pen center; revives on arrival
fn update_eaten<R: Rng>(
    ctx: &PursuerContext<'_>,
    pursuer: &mut Pursuer,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
    step: f32,
) {
    let maze = ctx.maze;
    let home = maze.pen_center();
    let home_center = tile_center(home);
    let tile = tile_of(pursuer.pos);

    if tile == home && pursuer.pos.distance(home_center) <= step.max(DECISION_TOLERANCE) {
        revive(pursuer, home_center);
        events.push(GameEvent::PursuerRevived { personality: pursuer.personality });
        return;
    }

    let center = tile_center(tile);
    if pursuer.pos.distance(center) <= DECISION_TOLERANCE
        && pursuer.last_decision_tile != Some(tile)
    {
        let goal = if tile == maze.pen_exit() || maze.in_pen(tile) || maze.is_gate(tile) {
            home
        } else {
            maze.pen_exit()
        };
        pursuer.target = Some(tile_center(goal));

        let mut dir = match bfs_first_step(maze, tile, goal, Traveler::PursuerWithGate) {
            Some(dir) => dir,
            None => {
                log::warn!(
                    "{:?} has no path from {} to {}, keeping course",
                    pursuer.personality,
                    tile,
                    goal
                );
                pursuer.dir
            }
        };
        if dir == Direction::None
            || !maze.is_passable(tile + dir.offset(), Traveler::PursuerWithGate)
        {
            dir = decide(
                maze,
                tile,
                pursuer.dir,
                true,
                Traveler::PursuerWithGate,
                pursuer.target,
                rng,
            );
        }
        if dir != pursuer.dir {
            pursuer.pos = center;
            pursuer.dir = dir;
        }
        pursuer.last_decision_tile = Some(tile);
    }

    let outcome = advance(maze, &mut pursuer.pos, pursuer.dir, step, Traveler::PursuerWithGate);
    if outcome == StepOutcome::Blocked {
        pursuer.last_decision_tile = None;
    }
}

fn revive(pursuer: &mut Pursuer, home_center: Vec2) {
    pursuer.eaten = false;
    pursuer.in_house = true;
    pursuer.mode = PursuerMode::Exiting;
    pursuer.exit_delay = REENTRY_DELAY_SECS;
    pursuer.pos = home_center;
    pursuer.dir = Direction::Up;
    pursuer.revived = true;
    pursuer.last_decision_tile = None;
    pursuer.target = None;
    log::debug!("{:?} revived in the pen", pursuer.personality);
}

/// Power pellet side effect: roaming pursuers turn frightened and reverse once
pub fn frighten_all(pursuers: &mut [Pursuer]) {
    for pursuer in pursuers.iter_mut().filter(|p| !p.in_house && !p.eaten) {
        pursuer.mode = PursuerMode::Frightened;
        pursuer.dir = pursuer.dir.opposite();
        pursuer.last_decision_tile = None;
        pursuer.target = None;
    }
}

/// Frightened window closed: back to the global wave mode
pub fn end_frightened(pursuers: &mut [Pursuer], wave: WaveMode) {
    for pursuer in pursuers.iter_mut().filter(|p| p.mode == PursuerMode::Frightened) {
        pursuer.mode = wave.pursuer_mode();
    }
}

/// Global scatter/chase switch for pursuers currently following the schedule
pub fn apply_wave(pursuers: &mut [Pursuer], wave: WaveMode) {
    for pursuer in pursuers
        .iter_mut()
        .filter(|p| matches!(p.mode, PursuerMode::Scatter | PursuerMode::Chase))
    {
        pursuer.mode = wave.pursuer_mode();
    }
}

/// Transition a frightened pursuer to eaten
pub fn mark_eaten(pursuer: &mut Pursuer) {
    pursuer.eaten = true;
    pursuer.mode = PursuerMode::Eaten;
    pursuer.last_decision_tile = None;
    log::debug!("{:?} eaten at {}", pursuer.personality, tile_of(pursuer.pos));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn classic() -> Maze {
        Maze::classic().unwrap()
    }

    fn sample(tile: IVec2, facing: Direction) -> AgentSample {
        AgentSample { index: 0, pos: tile_center(tile), tile, facing }
    }

    fn view_with(agent: AgentSample, direct_tile: Option<IVec2>) -> TickView {
        TickView {
            agents: vec![agent],
            pursuers: direct_tile
                .map(|tile| PursuerSample {
                    personality: Personality::Direct,
                    pos: tile_center(tile),
                    tile,
                })
                .into_iter()
                .collect(),
        }
    }

    fn target_for(personality: Personality, view: &TickView, pursuer_tile: IVec2) -> IVec2 {
        let maze = classic();
        let input = TargetInput {
            maze: &maze,
            view,
            personality,
            tile: pursuer_tile,
            agent: &view.agents[0],
        };
        personality.strategy().chase_target(&input)
    }

    #[test]
    fn test_direct_targets_agent_tile() {
        let view = view_with(sample(IVec2::new(10, 20), Direction::Left), None);
        assert_eq!(target_for(Personality::Direct, &view, IVec2::new(1, 1)), IVec2::new(10, 20));
    }

    #[test]
    fn test_ambush_doubles_vector_from_direct() {
        let view = view_with(sample(IVec2::new(10, 20), Direction::Right), Some(IVec2::new(8, 18)));
        // pivot (12, 20); 2 * pivot - (8, 18) = (16, 22)
        assert_eq!(target_for(Personality::Ambush, &view, IVec2::new(1, 1)), IVec2::new(16, 22));
    }

    #[test]
    fn test_ambush_without_direct_uses_pivot() {
        let view = view_with(sample(IVec2::new(10, 20), Direction::Down), None);
        assert_eq!(target_for(Personality::Ambush, &view, IVec2::new(1, 1)), IVec2::new(10, 22));
    }

    #[test]
    fn test_shy_retreats_when_close() {
        let maze = classic();
        let view = view_with(sample(IVec2::new(10, 20), Direction::Left), None);
        let near = target_for(Personality::Shy, &view, IVec2::new(12, 22));
        assert_eq!(near, maze.scatter_corner(Personality::Shy.index()));
        let far = target_for(Personality::Shy, &view, IVec2::new(1, 1));
        assert_eq!(far, IVec2::new(10, 20));
    }

    #[test]
    fn test_flanker_leads_and_up_quirk() {
        let view = view_with(sample(IVec2::new(10, 20), Direction::Left), None);
        assert_eq!(target_for(Personality::Flanker, &view, IVec2::new(1, 1)), IVec2::new(6, 20));
        let view = view_with(sample(IVec2::new(10, 20), Direction::Up), None);
        assert_eq!(target_for(Personality::Flanker, &view, IVec2::new(1, 1)), IVec2::new(6, 16));
    }

    #[test]
    fn test_decide_tie_break_and_no_reverse() {
        let maze = classic();
        let mut rng = Pcg32::seed_from_u64(1);
        // (6, 5) is a four-way junction; a target on the tile itself ties all options
        let junction = IVec2::new(6, 5);
        let target = Some(tile_center(junction));
        let dir = decide(
            &maze,
            junction,
            Direction::Up,
            false,
            Traveler::Pursuer,
            target,
            &mut rng,
        );
        assert_eq!(dir, Direction::Right);
        let dir = decide(
            &maze,
            junction,
            Direction::Left,
            false,
            Traveler::Pursuer,
            target,
            &mut rng,
        );
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn test_decide_prefers_closest_neighbor() {
        let maze = classic();
        let mut rng = Pcg32::seed_from_u64(1);
        let junction = IVec2::new(6, 5);
        let target = Some(tile_center(IVec2::new(6, 25)));
        let dir = decide(
            &maze,
            junction,
            Direction::Right,
            false,
            Traveler::Pursuer,
            target,
            &mut rng,
        );
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn test_dead_end_allows_reversal() {
        let rows = ["WWWWWWW", "  ...  ", "W.W-W.W", "W.WGW.W", "W.WWWWW", "W.....W", "WWWWWWW"];
        let maze = Maze::parse(&rows).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        let dir = decide(
            &maze,
            IVec2::new(5,
            3),
            Direction::Down,
            false,
            Traveler::Pursuer,
            None,
            &mut rng,
        );
        assert_eq!(dir, Direction::Up);
    }

    #[test]
    fn test_frightened_choice_is_seeded() {
        let maze = classic();
        let junction = IVec2::new(6, 5);
        let pick = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            (0..16)
                .map(|_| {
                    decide(&maze, junction, Direction::Up, false, Traveler::Pursuer, None, &mut rng)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(7), pick(7));
        assert!(pick(7).iter().all(|d| *d != Direction::Down));
    }

    #[test]
    fn test_bfs_through_gate() {
        let maze = classic();
        let home = maze.pen_center();
        assert_eq!(
            bfs_first_step(&maze, maze.pen_exit(), home, Traveler::PursuerWithGate),
            Some(Direction::Down)
        );
        assert!(bfs_first_step(&maze, IVec2::new(1, 1), home, Traveler::PursuerWithGate).is_some());
        assert_eq!(bfs_first_step(&maze, IVec2::new(1, 1), home, Traveler::Pursuer), None);
        assert_eq!(bfs_first_step(&maze, home, home, Traveler::PursuerWithGate), None);
    }

    #[test]
    fn test_exiting_reaches_exit_and_takes_wave_mode() {
        let maze = classic();
        let view = TickView::default();
        let ctx = PursuerContext { maze: &maze, view: &view, wave: WaveMode::Chase, level: 1 };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut pursuer = Pursuer::new(Personality::Ambush, maze.pursuer_homes()[3]);
        pursuer.exit_delay = 0.5;

        let mut ticks = 0;
        while pursuer.mode == PursuerMode::Exiting {
            update_pursuer(&ctx, &mut pursuer, &mut rng, &mut events, SIM_DT);
            ticks += 1;
            assert!(ticks < 2_000, "pursuer never left the pen");
        }
        assert!(ticks > 60, "exit delay was honored");
        assert_eq!(pursuer.mode, PursuerMode::Chase);
        assert!(!pursuer.in_house);
        assert_eq!(tile_of(pursuer.pos), maze.pen_exit());
        assert_eq!(pursuer.collision_grace, 0.0);
    }

    #[test]
    fn test_roaming_decides_once_per_tile() {
        let maze = classic();
        let view = TickView::default();
        let ctx = PursuerContext { maze: &maze, view: &view, wave: WaveMode::Scatter, level: 1 };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut pursuer = Pursuer::new(Personality::Direct, IVec2::new(6, 5));
        pursuer.in_house = false;
        pursuer.mode = PursuerMode::Scatter;
        pursuer.exit_delay = 0.0;

        let mut last_dir = pursuer.dir;
        let mut last_decision = pursuer.last_decision_tile;
        for _ in 0..2_000 {
            update_pursuer(&ctx, &mut pursuer, &mut rng, &mut events, SIM_DT);
            assert!(!maze.is_wall(tile_of(pursuer.pos)));
            if pursuer.dir != last_dir {
                assert_ne!(
                    pursuer.last_decision_tile, last_decision,
                    "turned without a new decision tile"
                );
            }
            last_dir = pursuer.dir;
            last_decision = pursuer.last_decision_tile;
        }
    }

    #[test]
    fn test_eaten_pursuer_returns_and_revives() {
        let maze = classic();
        let view = TickView::default();
        let ctx = PursuerContext { maze: &maze, view: &view, wave: WaveMode::Scatter, level: 1 };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut pursuer = Pursuer::new(Personality::Shy, IVec2::new(1, 1));
        pursuer.in_house = false;
        pursuer.mode = PursuerMode::Frightened;
        pursuer.dir = Direction::Right;
        mark_eaten(&mut pursuer);

        for _ in 0..20_000 {
            update_pursuer(&ctx, &mut pursuer, &mut rng, &mut events, SIM_DT);
            if !pursuer.eaten {
                break;
            }
        }
        assert!(!pursuer.eaten);
        assert!(pursuer.in_house);
        assert_eq!(pursuer.mode, PursuerMode::Exiting);
        assert_eq!(tile_of(pursuer.pos), maze.pen_center());
        assert_eq!(events, vec![GameEvent::PursuerRevived { personality: Personality::Shy }]);

        // Leaving again grants a short collision grace
        while pursuer.mode == PursuerMode::Exiting {
            update_pursuer(&ctx, &mut pursuer, &mut rng, &mut events, SIM_DT);
        }
        assert_eq!(pursuer.collision_grace, POST_EXIT_GRACE_SECS);
    }

    #[test]
    fn test_eaten_pursuer_without_path_keeps_moving() {
        let maze = classic();
        let view = TickView::default();
        let ctx = PursuerContext { maze: &maze, view: &view, wave: WaveMode::Scatter, level: 1 };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut events = Vec::new();
        // Side pocket behind the tunnel walls: no route to the pen
        let start = IVec2::new(2, 10);
        assert!(!maze.is_reachable(start));
        assert_eq!(bfs_first_step(&maze, start, maze.pen_exit(), Traveler::PursuerWithGate), None);
        let mut pursuer = Pursuer::new(Personality::Shy, start);
        pursuer.in_house = false;
        pursuer.mode = PursuerMode::Frightened;
        pursuer.dir = Direction::Left;
        mark_eaten(&mut pursuer);

        let mut visited = std::collections::BTreeSet::new();
        let mut still = 0;
        for _ in 0..5_000 {
            let before = pursuer.pos;
            update_pursuer(&ctx, &mut pursuer, &mut rng, &mut events, SIM_DT);
            let tile = tile_of(pursuer.pos);
            assert!(maze.is_passable(tile, Traveler::PursuerWithGate), "entered {tile}");
            assert_eq!(pursuer.mode, PursuerMode::Eaten);
            still = if pursuer.pos == before { still + 1 } else { 0 };
            assert!(still < 5, "stuck at {tile}");
            visited.insert((tile.x, tile.y));
        }
        assert!(pursuer.eaten);
        assert!(visited.len() > 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_frighten_all_skips_pen_and_eaten() {
        let mut roaming = Pursuer::new(Personality::Direct, IVec2::new(6, 5));
        roaming.in_house = false;
        roaming.mode = PursuerMode::Chase;
        roaming.dir = Direction::Left;
        roaming.last_decision_tile = Some(IVec2::new(6, 5));
        let housed = Pursuer::new(Personality::Shy, IVec2::new(13, 13));
        let mut eaten = roaming.clone();
        mark_eaten(&mut eaten);

        let mut pursuers = vec![roaming, housed, eaten];
        frighten_all(&mut pursuers);
        assert_eq!(pursuers[0].mode, PursuerMode::Frightened);
        assert_eq!(pursuers[0].dir, Direction::Right);
        assert_eq!(pursuers[0].last_decision_tile, None);
        assert_eq!(pursuers[1].mode, PursuerMode::Exiting);
        assert_eq!(pursuers[2].mode, PursuerMode::Eaten);

        end_frightened(&mut pursuers, WaveMode::Scatter);
        assert_eq!(pursuers[0].mode, PursuerMode::Scatter);
    }
}
