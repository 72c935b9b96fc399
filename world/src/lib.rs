#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for ASCII Rogue.
//!
//! The world owns the tile grid, the creature registry and the occupancy
//! index. All mutation flows through [`apply`]; read access goes through the
//! [`query`] module.

mod config;
mod generation;

use std::time::Duration;

use ascii_rogue_core::{
    coord_to_index, is_valid, Command, Coord, CreatureId, Event, Glyph, MoveError, Speed,
    TileKind, WELCOME_BANNER,
};
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use config::{
    ConfigError, WorldConfig, DEFAULT_SEED, DEFAULT_TICK_INTERVAL, DEFAULT_WALL_PROBABILITY,
    MAX_CREATURES,
};

use generation::CreatureSeed;

/// One grid cell and its blocking classification.
///
/// Occupancy is tracked separately by the world, so a tile only ever reports
/// floor or wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    position: Coord,
    kind: TileKind,
}

impl Tile {
    pub(crate) const fn new(position: Coord, kind: TileKind) -> Self {
        Self { position, kind }
    }

    /// Coordinate of the tile, redundant with its index in the grid.
    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    /// Blocking classification of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Reports whether the tile is a wall.
    #[must_use]
    pub fn is_wall(&self) -> bool {
        self.kind == TileKind::Wall
    }
}

/// Represents the authoritative ASCII Rogue world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    creatures: Vec<Creature>,
    occupancy: OccupancyGrid,
    tick_interval: Duration,
    accumulator: Duration,
    turn: u64,
}

impl World {
    /// Generates a world from the configuration using its seed.
    pub fn new(config: &WorldConfig) -> Result<Self, ConfigError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::generate(config, &mut rng)
    }

    /// Generates a world drawing every random value from `rng`.
    ///
    /// Walls are scattered first, then the floor cells are shuffled and the
    /// creatures take the front of the shuffled list, all from the same stream.
    pub fn generate<R: Rng>(config: &WorldConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let glyph = config.glyph()?;

        let mut grid =
            generation::scatter_walls(config.width, config.height, config.wall_probability, rng);
        generation::shuffle(&mut grid.candidates, rng);
        let seeds = generation::seed_creatures(
            &grid.candidates,
            config.width,
            config.max_creatures,
            glyph,
            rng,
        );

        debug!(
            "generated {}x{} world: {} floor cells, {} creatures (seed {})",
            config.width,
            config.height,
            grid.candidates.len(),
            seeds.len(),
            config.seed
        );

        Ok(Self::assemble(config, grid.tiles, &seeds))
    }

    /// Builds a world from an explicit layout instead of random generation.
    ///
    /// Creatures receive identifiers in the order they are listed and use the
    /// configured glyph. Seed and wall probability are ignored.
    pub fn from_layout(
        config: &WorldConfig,
        walls: &[Coord],
        creatures: &[(Coord, Speed)],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let glyph = config.glyph()?;
        let (width, height) = (config.width, config.height);

        let mut tiles: Vec<Tile> = (0..config.cell_count())
            .map(|index| {
                Tile::new(
                    ascii_rogue_core::index_to_coord(index, width),
                    TileKind::Floor,
                )
            })
            .collect();
        for &wall in walls {
            let index = layout_index(wall, width, height)?;
            tiles[index].kind = TileKind::Wall;
        }

        let mut taken = vec![false; tiles.len()];
        let mut seeds = Vec::with_capacity(creatures.len());
        for (ordinal, &(position, speed)) in creatures.iter().enumerate() {
            let index = layout_index(position, width, height)?;
            if tiles[index].is_wall() || taken[index] {
                return Err(ConfigError::LayoutBlocked(position));
            }
            taken[index] = true;
            seeds.push(CreatureSeed {
                id: CreatureId::new(ordinal as u32),
                position,
                speed,
                glyph,
            });
        }

        Ok(Self::assemble(config, tiles, &seeds))
    }

    fn assemble(config: &WorldConfig, tiles: Vec<Tile>, seeds: &[CreatureSeed]) -> Self {
        let creatures: Vec<Creature> = seeds.iter().map(Creature::from_seed).collect();
        let mut occupancy = OccupancyGrid::new(config.width, config.height);
        occupancy.fill_with(&creatures);
        let tick_interval = config.tick_interval();

        Self {
            banner: WELCOME_BANNER,
            width: config.width,
            height: config.height,
            tiles,
            creatures,
            occupancy,
            tick_interval,
            // Starts full so the first tick fires a turn immediately.
            accumulator: tick_interval,
            turn: 0,
        }
    }

    fn creature_index(&self, creature: CreatureId) -> Option<usize> {
        self.creatures.iter().position(|entry| entry.id == creature)
    }

    fn is_blocked(&self, coord: Coord) -> bool {
        debug_assert!(
            is_valid(coord, self.width, self.height),
            "occupancy queried outside the grid at {coord}"
        );
        let Some(index) = self.index(coord) else {
            return true;
        };
        self.tiles[index].is_wall() || self.occupancy.occupant(index).is_some()
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if is_valid(coord, self.width, self.height) {
            coord_to_index(coord, self.width)
        } else {
            None
        }
    }

    fn begin_turn(&mut self, out_events: &mut Vec<Event>) {
        // Stable, so equal speeds keep the order left by the previous turn.
        self.creatures.sort_by_key(|creature| creature.speed);
        for creature in &mut self.creatures {
            creature.moved_this_turn = false;
        }
        self.turn = self.turn.saturating_add(1);
        debug!(
            "turn {} started with {} creatures",
            self.turn,
            self.creatures.len()
        );
        out_events.push(Event::TurnStarted { turn: self.turn });
    }

    fn move_creature(&mut self, creature: CreatureId, to: Coord) -> Result<Coord, MoveError> {
        let index = self
            .creature_index(creature)
            .ok_or(MoveError::UnknownCreature)?;
        let from = self.creatures[index].position;

        if self.creatures[index].moved_this_turn {
            return Err(MoveError::AlreadyMoved);
        }
        if !is_valid(to, self.width, self.height) {
            return Err(MoveError::OutOfBounds);
        }
        if !from.is_neighbour_of(to) {
            return Err(MoveError::NotAdjacent);
        }
        if self.is_blocked(to) {
            return Err(MoveError::Blocked);
        }

        let (Some(from_index), Some(to_index)) = (self.index(from), self.index(to)) else {
            return Err(MoveError::OutOfBounds);
        };
        self.occupancy.vacate(from_index);
        self.occupancy.occupy(creature, to_index);
        let entry = &mut self.creatures[index];
        entry.position = to;
        entry.moved_this_turn = true;
        trace!("creature {} moved {from} -> {to}", creature.get());
        Ok(from)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.accumulator = world.accumulator.saturating_add(dt);
            if world.accumulator < world.tick_interval {
                return;
            }
            // At most one turn per tick; any surplus carries into the next one.
            world.accumulator -= world.tick_interval;
            world.begin_turn(out_events);
        }
        Command::MoveCreature { creature, to } => match world.move_creature(creature, to) {
            Ok(from) => out_events.push(Event::CreatureMoved { creature, from, to }),
            Err(reason) => {
                debug!("rejected move of creature {} to {to}: {reason}", creature.get());
                out_events.push(Event::MoveRejected {
                    creature,
                    to,
                    reason,
                });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use ascii_rogue_core::{
        is_valid, Coord, CreatureId, CreatureSnapshot, CreatureView, OccupancyView,
        NEIGHBOUR_OFFSETS,
    };

    use super::{Tile, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.width, world.height)
    }

    /// Number of turns fired so far.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Provides read-only access to the tiles in index order.
    #[must_use]
    pub fn tiles(world: &World) -> &[Tile] {
        &world.tiles
    }

    /// Tile at the provided coordinate, if it lies inside the grid.
    #[must_use]
    pub fn tile_at(world: &World, coord: Coord) -> Option<Tile> {
        world.index(coord).map(|index| world.tiles[index])
    }

    /// Captures the creatures in registry order, which is the current turn order.
    #[must_use]
    pub fn creature_view(world: &World) -> CreatureView {
        CreatureView::from_snapshots(world.creatures.iter().map(|c| c.snapshot()).collect())
    }

    /// Snapshot of a single creature.
    #[must_use]
    pub fn creature(world: &World, creature: CreatureId) -> Option<CreatureSnapshot> {
        world
            .creature_index(creature)
            .map(|index| world.creatures[index].snapshot())
    }

    /// Identifiers of all creatures in the current turn order.
    #[must_use]
    pub fn turn_order(world: &World) -> Vec<CreatureId> {
        world.creatures.iter().map(|creature| creature.id).collect()
    }

    /// Exposes a read-only view of the occupancy index.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView::new(world.occupancy.cells(), world.width, world.height)
    }

    /// Reports whether a cell is a wall or holds a creature.
    ///
    /// The coordinate must be inside the grid; gate with
    /// [`ascii_rogue_core::is_valid`] first.
    #[must_use]
    pub fn is_blocked(world: &World, coord: Coord) -> bool {
        world.is_blocked(coord)
    }

    /// Collects the in-bounds, unblocked neighbours of `origin` into `out`.
    ///
    /// Neighbours are listed in [`NEIGHBOUR_OFFSETS`] order. `out` is cleared
    /// first so callers can reuse one buffer across creatures.
    pub fn open_neighbours_into(world: &World, origin: Coord, out: &mut Vec<Coord>) {
        out.clear();
        for offset in NEIGHBOUR_OFFSETS {
            let candidate = origin + offset;
            if is_valid(candidate, world.width, world.height) && !world.is_blocked(candidate) {
                out.push(candidate);
            }
        }
    }

    /// Allocating variant of [`open_neighbours_into`].
    #[must_use]
    pub fn open_neighbours(world: &World, origin: Coord) -> Vec<Coord> {
        let mut out = Vec::with_capacity(NEIGHBOUR_OFFSETS.len());
        open_neighbours_into(world, origin, &mut out);
        out
    }
}

#[derive(Clone, Debug)]
struct Creature {
    id: CreatureId,
    glyph: Glyph,
    position: Coord,
    speed: Speed,
    moved_this_turn: bool,
}

impl Creature {
    fn from_seed(seed: &CreatureSeed) -> Self {
        Self {
            id: seed.id,
            glyph: seed.glyph,
            position: seed.position,
            speed: seed.speed,
            moved_this_turn: false,
        }
    }

    fn snapshot(&self) -> ascii_rogue_core::CreatureSnapshot {
        ascii_rogue_core::CreatureSnapshot {
            id: self.id,
            position: self.position,
            speed: self.speed,
            glyph: self.glyph,
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    width: u32,
    cells: Vec<Option<CreatureId>>,
}

impl OccupancyGrid {
    fn new(width: u32, height: u32) -> Self {
        let capacity = width as usize * height as usize;
        Self {
            width,
            cells: vec![None; capacity],
        }
    }

    fn fill_with(&mut self, creatures: &[Creature]) {
        self.cells.fill(None);
        for creature in creatures {
            if let Some(slot) = coord_to_index(creature.position, self.width)
                .and_then(|index| self.cells.get_mut(index))
            {
                debug_assert!(slot.is_none(), "two creatures seeded on one cell");
                *slot = Some(creature.id);
            }
        }
    }

    fn occupant(&self, index: usize) -> Option<CreatureId> {
        self.cells.get(index).copied().flatten()
    }

    fn occupy(&mut self, creature: CreatureId, index: usize) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = Some(creature);
        }
    }

    fn vacate(&mut self, index: usize) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = None;
        }
    }

    fn cells(&self) -> &[Option<CreatureId>] {
        &self.cells
    }
}

fn layout_index(coord: Coord, width: u32, height: u32) -> Result<usize, ConfigError> {
    if !is_valid(coord, width, height) {
        return Err(ConfigError::LayoutOutOfBounds(coord));
    }
    coord_to_index(coord, width).ok_or(ConfigError::LayoutOutOfBounds(coord))
}
