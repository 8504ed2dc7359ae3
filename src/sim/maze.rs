//! Static maze grid and pellet bookkeeping
//!
//! The grid is parsed once from an ASCII layout and never mutated. Pellet and
//! power-pellet presence lives in [`Pellets`], a flat boolean grid mirroring
//! the maze dimensions.

use std::collections::{BTreeSet, VecDeque};

use glam::IVec2;
use thiserror::Error;

use crate::consts::TILE_SIZE;

/// Layout used by the arcade game (28x30 tiles)
///
/// `W` wall, `.` pellet, `o` power pellet, ` ` empty floor, `-` pen gate,
/// `G` pen floor holding a pursuer home (personalities in reading order).
pub const CLASSIC_LAYOUT: [&str; 30] = [
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWW",
    "W............WW............W",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "WoWWWW.WWWWW.WW.WWWWW.WWWWoW",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "W..........................W",
    "W.WWWW.WW.WWWWWWWW.WW.WWWW.W",
    "W......WW....WW....WW......W",
    "WWWWWW.WWWWW WW WWWWW.WWWWWW",
    "     W.WWWWW WW WWWWW.W     ",
    "     W.WW          WW.W     ",
    "     W.WW WWW--WWW WW.W     ",
    "WWWWWW.WW W      W WW.WWWWWW",
    "      .   W GGGG W   .      ",
    "WWWWWW.WW W      W WW.WWWWWW",
    "     W.WW WWWWWWWW WW.W     ",
    "     W.WW          WW.W     ",
    "     W.WW WWWWWWWW WW.W     ",
    "WWWWWW.WW WWWWWWWW WW.WWWWWW",
    "W............WW............W",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "Wo..WW................WW..oW",
    "WWW.WW.WW.WWWWWWWW.WW.WW.WWW",
    "W......WW....WW....WW......W",
    "W.WWWWWWWWWW.WW.WWWWWWWWWW.W",
    "W..........................W",
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWW",
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWW",
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWW",
];

/// Agent start tiles on the classic layout
pub const CLASSIC_TWO_AGENT_SPAWNS: [IVec2; 2] = [IVec2::new(11, 22), IVec2::new(16, 22)];
pub const CLASSIC_SINGLE_AGENT_SPAWN: IVec2 = IVec2::new(13, 22);

/// Maze construction failures. All of them are fatal at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze layout has no rows")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile code {code:?} at ({x}, {y})")]
    UnknownTile { code: char, x: i32, y: i32 },
    #[error("layout has no pursuer home markers")]
    MissingPen,
    #[error("pursuer pen is not enclosed (reaches the border at ({x}, {y}))")]
    OpenPen { x: i32, y: i32 },
    #[error("no gate tile borders the pursuer pen")]
    MissingGate,
    #[error("gate at ({x}, {y}) does not lead into the maze")]
    GateBlocked { x: i32, y: i32 },
    #[error("pellet at ({x}, {y}) is cut off from the pen exit")]
    Disconnected { x: i32, y: i32 },
    #[error("no row forms a horizontal tunnel pair")]
    MissingTunnel,
    #[error("spawn tile ({x}, {y}) is not walkable")]
    BadSpawn { x: i32, y: i32 },
}

/// Cell kinds of the static grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    /// Pen floor
    Floor,
    Pellet,
    PowerPellet,
    Gate,
    Empty,
}

impl Tile {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'W' | '#' => Some(Tile::Wall),
            '.' => Some(Tile::Pellet),
            'o' => Some(Tile::PowerPellet),
            '-' => Some(Tile::Gate),
            'G' => Some(Tile::Floor),
            ' ' => Some(Tile::Empty),
            _ => None,
        }
    }
}

/// Who is asking whether a tile can be entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traveler {
    Agent,
    /// Pursuer roaming the maze (gate closed, pen interior closed)
    Pursuer,
    /// Pursuer leaving the pen or returning to it while eaten
    PursuerWithGate,
}

/// Inclusive tile rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl TileRect {
    pub fn contains(&self, tile: IVec2) -> bool {
        tile.x >= self.min.x && tile.x <= self.max.x && tile.y >= self.min.y && tile.y <= self.max.y
    }
}

#[derive(Debug, Clone)]
pub struct Maze {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    pen: TileRect,
    pen_center: IVec2,
    pen_exit: IVec2,
    gates: Vec<IVec2>,
    pursuer_homes: Vec<IVec2>,
    tunnel_rows: Vec<i32>,
    /// Tiles an agent can reach from the pen exit
    reachable: Vec<bool>,
}

const NEIGHBORS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

impl Maze {
    /// Parse and validate an ASCII layout
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MazeError> {
        let first = rows.first().ok_or(MazeError::Empty)?;
        let expected = first.as_ref().chars().count();
        if expected == 0 {
            return Err(MazeError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        let mut pursuer_homes = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(MazeError::Ragged { row: y, expected, found });
            }
            for (x, code) in row.chars().enumerate() {
                let tile = Tile::from_code(code).ok_or(MazeError::UnknownTile {
                    code,
                    x: x as i32,
                    y: y as i32,
                })?;
                if code == 'G' {
                    pursuer_homes.push(IVec2::new(x as i32, y as i32));
                }
                tiles.push(tile);
            }
        }

        let mut maze = Self {
            width: expected as i32,
            height: rows.len() as i32,
            tiles,
            pen: TileRect { min: IVec2::ZERO, max: IVec2::ZERO },
            pen_center: IVec2::ZERO,
            pen_exit: IVec2::ZERO,
            gates: Vec::new(),
            pursuer_homes,
            tunnel_rows: Vec::new(),
            reachable: Vec::new(),
        };
        maze.locate_pen()?;
        maze.flood_play_area()?;
        maze.locate_tunnels()?;

        log::debug!(
            "Maze {}x{}: pen {:?}, exit {:?}, {} tunnel rows",
            maze.width,
            maze.height,
            maze.pen,
            maze.pen_exit,
            maze.tunnel_rows.len()
        );
        Ok(maze)
    }

    /// The arcade layout
    pub fn classic() -> Result<Self, MazeError> {
        Self::parse(&CLASSIC_LAYOUT)
    }

    fn locate_pen(&mut self) -> Result<(), MazeError> {
        if self.pursuer_homes.is_empty() {
            return Err(MazeError::MissingPen);
        }

        // Flood the pen interior from the home markers without crossing walls or gates
        let mut interior = BTreeSet::new();
        let mut queue = VecDeque::new();
        for home in &self.pursuer_homes {
            if interior.insert((home.x, home.y)) {
                queue.push_back(*home);
            }
        }
        while let Some(tile) = queue.pop_front() {
            if tile.x == 0 || tile.y == 0 || tile.x == self.width - 1 || tile.y == self.height - 1 {
                return Err(MazeError::OpenPen { x: tile.x, y: tile.y });
            }
            for step in NEIGHBORS {
                let next = tile + step;
                if matches!(self.raw(next), Some(Tile::Wall | Tile::Gate) | None) {
                    continue;
                }
                if interior.insert((next.x, next.y)) {
                    queue.push_back(next);
                }
            }
        }

        let mut min = IVec2::splat(i32::MAX);
        let mut max = IVec2::splat(i32::MIN);
        for &(x, y) in &interior {
            min = min.min(IVec2::new(x, y));
            max = max.max(IVec2::new(x, y));
        }
        self.pen = TileRect { min, max };

        for y in 0..self.height {
            for x in 0..self.width {
                let tile = IVec2::new(x, y);
                if self.raw(tile) != Some(Tile::Gate) {
                    continue;
                }
                let borders_pen = NEIGHBORS
                    .iter()
                    .any(|step| interior.contains(&((tile + *step).x, (tile + *step).y)));
                if borders_pen {
                    self.gates.push(tile);
                }
            }
        }
        let gate = *self.gates.first().ok_or(MazeError::MissingGate)?;

        // The exit is the tile on the far side of the gate from the pen
        let inward = NEIGHBORS
            .iter()
            .copied()
            .find(|step| interior.contains(&((gate + *step).x, (gate + *step).y)))
            .ok_or(MazeError::MissingGate)?;
        let exit = gate - inward;
        match self.raw(exit) {
            Some(Tile::Pellet | Tile::PowerPellet | Tile::Empty | Tile::Floor) => {}
            _ => return Err(MazeError::GateBlocked { x: gate.x, y: gate.y }),
        }
        self.pen_exit = exit;

        let middle = IVec2::new(gate.x, (self.pen.min.y + self.pen.max.y) / 2);
        self.pen_center = if interior.contains(&(middle.x, middle.y)) {
            middle
        } else {
            self.pursuer_homes[0]
        };
        Ok(())
    }

    /// Mark the playable region; every pellet must lie inside it
    fn flood_play_area(&mut self) -> Result<(), MazeError> {
        let mut reachable = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        reachable[self.index(self.pen_exit)] = true;
        queue.push_back(self.pen_exit);
        while let Some(tile) = queue.pop_front() {
            for step in NEIGHBORS {
                let next = self.wrap(tile + step);
                if self.is_wall(next) {
                    continue;
                }
                let idx = self.index(next);
                if !reachable[idx] {
                    reachable[idx] = true;
                    queue.push_back(next);
                }
            }
        }

        let stranded = self.tiles.iter().enumerate().find(|(idx, tile)| {
            matches!(tile, Tile::Pellet | Tile::PowerPellet) && !reachable[*idx]
        });
        if let Some((idx, _)) = stranded {
            let idx = idx as i32;
            return Err(MazeError::Disconnected { x: idx % self.width, y: idx / self.width });
        }
        self.reachable = reachable;
        Ok(())
    }

    /// Rows whose border tiles both open onto the playable region
    fn locate_tunnels(&mut self) -> Result<(), MazeError> {
        self.tunnel_rows = (0..self.height)
            .filter(|&y| {
                self.is_reachable(IVec2::new(0, y))
                    && self.is_reachable(IVec2::new(self.width - 1, y))
            })
            .collect();
        if self.tunnel_rows.is_empty() {
            return Err(MazeError::MissingTunnel);
        }
        Ok(())
    }

    fn index(&self, tile: IVec2) -> usize {
        (tile.y * self.width + tile.x) as usize
    }

    /// Unwrapped lookup
    fn raw(&self, tile: IVec2) -> Option<Tile> {
        if tile.x < 0 || tile.y < 0 || tile.x >= self.width || tile.y >= self.height {
            return None;
        }
        Some(self.tiles[(tile.y * self.width + tile.x) as usize])
    }

    /// Tile lookup with horizontal wrap; rows out of range are `None`
    pub fn tile(&self, tile: IVec2) -> Option<Tile> {
        self.raw(self.wrap(tile))
    }

    /// Wrap the column into the grid (tunnel effect)
    #[inline]
    pub fn wrap(&self, tile: IVec2) -> IVec2 {
        IVec2::new(tile.x.rem_euclid(self.width), tile.y)
    }

    pub fn is_passable(&self, tile: IVec2, traveler: Traveler) -> bool {
        let tile = self.wrap(tile);
        match self.raw(tile) {
            None | Some(Tile::Wall) => false,
            Some(Tile::Gate) => traveler == Traveler::PursuerWithGate,
            Some(_) => match traveler {
                Traveler::Agent | Traveler::PursuerWithGate => true,
                Traveler::Pursuer => !self.pen.contains(tile),
            },
        }
    }

    /// Agent-only impassability
    #[inline]
    pub fn is_wall(&self, tile: IVec2) -> bool {
        !self.is_passable(tile, Traveler::Agent)
    }

    pub fn in_pen(&self, tile: IVec2) -> bool {
        self.pen.contains(tile)
    }

    /// Part of the region connected to the pen exit (side pockets are not)
    pub fn is_reachable(&self, tile: IVec2) -> bool {
        let tile = self.wrap(tile);
        self.raw(tile).is_some() && self.reachable[self.index(tile)]
    }

    pub fn is_gate(&self, tile: IVec2) -> bool {
        self.tile(tile) == Some(Tile::Gate)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Width of the maze in pixels (tunnel wrap distance)
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pen(&self) -> TileRect {
        self.pen
    }

    pub fn pen_center(&self) -> IVec2 {
        self.pen_center
    }

    /// Tile just outside the gate
    pub fn pen_exit(&self) -> IVec2 {
        self.pen_exit
    }

    pub fn gates(&self) -> &[IVec2] {
        &self.gates
    }

    pub fn pursuer_homes(&self) -> &[IVec2] {
        &self.pursuer_homes
    }

    pub fn tunnel_rows(&self) -> &[i32] {
        &self.tunnel_rows
    }

    /// Fixed corner each personality heads for in scatter mode
    pub fn scatter_corner(&self, personality: usize) -> IVec2 {
        match personality % 4 {
            0 => IVec2::new(self.width - 3, 1),
            1 => IVec2::new(2, 1),
            2 => IVec2::new(self.width - 3, self.height - 2),
            _ => IVec2::new(2, self.height - 2),
        }
    }

    /// Tiles that started with a pellet (bonus item candidates)
    pub fn pellet_tiles(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.tiles.iter().enumerate().filter_map(|(idx, tile)| {
            let pos = IVec2::new(idx as i32 % self.width, idx as i32 / self.width);
            (*tile == Tile::Pellet && !self.pen.contains(pos)).then_some(pos)
        })
    }

    /// Reject spawn tiles an agent could not stand on or could not leave
    pub fn check_spawn(&self, tile: IVec2) -> Result<(), MazeError> {
        if !self.is_reachable(tile) || self.in_pen(tile) {
            return Err(MazeError::BadSpawn { x: tile.x, y: tile.y });
        }
        Ok(())
    }
}

/// Remaining pellets and power pellets, keyed by tile
#[derive(Debug, Clone)]
pub struct Pellets {
    width: i32,
    height: i32,
    pellets: Vec<bool>,
    power: Vec<bool>,
    pellet_count: usize,
    power_count: usize,
}

impl Pellets {
    /// Fill from the layout
    pub fn from_maze(maze: &Maze) -> Self {
        let pellets: Vec<bool> = maze.tiles.iter().map(|t| *t == Tile::Pellet).collect();
        let power: Vec<bool> = maze.tiles.iter().map(|t| *t == Tile::PowerPellet).collect();
        let pellet_count = pellets.iter().filter(|p| **p).count();
        let power_count = power.iter().filter(|p| **p).count();
        Self {
            width: maze.width,
            height: maze.height,
            pellets,
            power,
            pellet_count,
            power_count,
        }
    }

    /// Empty grid with explicitly placed items (handy for drills and tests)
    pub fn empty(maze: &Maze) -> Self {
        let len = (maze.width * maze.height) as usize;
        Self {
            width: maze.width,
            height: maze.height,
            pellets: vec![false; len],
            power: vec![false; len],
            pellet_count: 0,
            power_count: 0,
        }
    }

    fn index(&self, tile: IVec2) -> Option<usize> {
        let x = tile.x.rem_euclid(self.width);
        if tile.y < 0 || tile.y >= self.height {
            return None;
        }
        Some((tile.y * self.width + x) as usize)
    }

    pub fn has_pellet(&self, tile: IVec2) -> bool {
        self.index(tile).is_some_and(|i| self.pellets[i])
    }

    pub fn has_power(&self, tile: IVec2) -> bool {
        self.index(tile).is_some_and(|i| self.power[i])
    }

    pub fn place_pellet(&mut self, tile: IVec2) {
        if let Some(i) = self.index(tile) {
            if !self.pellets[i] {
                self.pellets[i] = true;
                self.pellet_count += 1;
            }
        }
    }

    pub fn place_power(&mut self, tile: IVec2) {
        if let Some(i) = self.index(tile) {
            if !self.power[i] {
                self.power[i] = true;
                self.power_count += 1;
            }
        }
    }

    /// Remove a pellet; true if one was there
    pub fn take_pellet(&mut self, tile: IVec2) -> bool {
        match self.index(tile) {
            Some(i) if self.pellets[i] => {
                self.pellets[i] = false;
                self.pellet_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Remove a power pellet; true if one was there
    pub fn take_power(&mut self, tile: IVec2) -> bool {
        match self.index(tile) {
            Some(i) if self.power[i] => {
                self.power[i] = false;
                self.power_count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn pellet_count(&self) -> usize {
        self.pellet_count
    }

    pub fn power_count(&self) -> usize {
        self.power_count
    }

    /// Both sets exhausted
    pub fn is_cleared(&self) -> bool {
        self.pellet_count == 0 && self.power_count == 0
    }

    /// Tiles that still hold a pellet or power pellet
    pub fn remaining(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.pellets.len()).filter_map(|i| {
            (self.pellets[i] || self.power[i])
                .then(|| IVec2::new(i as i32 % self.width, i as i32 / self.width))
        })
    }
}
