#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the ASCII Rogue simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically.

use std::{fmt, ops::Add, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to ASCII Rogue.";

/// Default number of tile columns, matching the 80 column text viewport.
pub const DEFAULT_GRID_WIDTH: u32 = 80;

/// Default number of tile rows, matching the 25 row text viewport.
pub const DEFAULT_GRID_HEIGHT: u32 = 25;

/// Moore neighbourhood offsets in the order the turn scheduler enumerates them.
pub const NEIGHBOUR_OFFSETS: [Coord; 8] = [
    Coord::new(-1, 1),
    Coord::new(0, 1),
    Coord::new(1, 1),
    Coord::new(1, 0),
    Coord::new(1, -1),
    Coord::new(0, -1),
    Coord::new(-1, -1),
    Coord::new(-1, 0),
];

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a creature step onto a neighbouring cell.
    MoveCreature {
        /// Identifier of the creature attempting to move.
        creature: CreatureId,
        /// Destination cell, expected to lie in the creature's Moore neighbourhood.
        to: Coord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that enough time accumulated for a new turn and that the
    /// creature registry has been re-ordered by speed.
    TurnStarted {
        /// One-based index of the turn that just began.
        turn: u64,
    },
    /// Confirms that a creature moved between two cells.
    CreatureMoved {
        /// Identifier of the creature that moved.
        creature: CreatureId,
        /// Cell the creature occupied before moving.
        from: Coord,
        /// Cell the creature occupies after moving.
        to: Coord,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Identifier supplied with the move request.
        creature: CreatureId,
        /// Destination supplied with the move request.
        to: Coord,
        /// Specific reason the move failed.
        reason: MoveError,
    },
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveError {
    /// No creature with the provided identifier exists.
    UnknownCreature,
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is not part of the creature's Moore neighbourhood.
    NotAdjacent,
    /// The destination is a wall or already occupied.
    Blocked,
    /// The creature already moved during the current turn.
    AlreadyMoved,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownCreature => "unknown creature",
            Self::OutOfBounds => "destination out of bounds",
            Self::NotAdjacent => "destination not adjacent",
            Self::Blocked => "destination blocked",
            Self::AlreadyMoved => "creature already moved this turn",
        };
        f.write_str(reason)
    }
}

/// Location of a grid cell, also used as a movement delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Zero-based column.
    pub x: i32,
    /// Zero-based row.
    pub y: i32,
}

impl Coord {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Reports whether `other` is one of the eight cells surrounding `self`.
    #[must_use]
    pub fn is_neighbour_of(self, other: Coord) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Converts a flat storage index into a grid coordinate.
#[must_use]
pub fn index_to_coord(index: usize, width: u32) -> Coord {
    debug_assert!(width > 0, "grid width must be positive");
    let width = width as usize;
    Coord::new((index % width) as i32, (index / width) as i32)
}

/// Converts a coordinate into its flat storage index.
///
/// No bounds are enforced beyond rejecting results that fall below zero, so a
/// coordinate with a negative column can still alias into the previous row.
/// Gate with [`is_valid`] before indexing storage.
#[must_use]
pub fn coord_to_index(coord: Coord, width: u32) -> Option<usize> {
    let flat = i64::from(coord.y) * i64::from(width) + i64::from(coord.x);
    usize::try_from(flat).ok()
}

/// Reports whether the coordinate lies within `[0, width) × [0, height)`.
#[must_use]
pub fn is_valid(coord: Coord, width: u32, height: u32) -> bool {
    coord.x >= 0
        && coord.y >= 0
        && (coord.x as u32) < width
        && (coord.y as u32) < height
}

/// Single display character drawn from the 256-entry code page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Glyph(u8);

impl Glyph {
    /// Glyph drawn for wall tiles.
    pub const WALL: Glyph = Glyph(b'#');
    /// Glyph drawn for empty floor tiles.
    pub const FLOOR: Glyph = Glyph(b'.');
    /// Default glyph assigned to creatures.
    pub const CREATURE: Glyph = Glyph(b'r');

    /// Creates a glyph from its character code.
    #[must_use]
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// Creates a glyph from an ASCII character, rejecting anything else.
    #[must_use]
    pub fn from_char(character: char) -> Option<Self> {
        character.is_ascii().then(|| Self(character as u8))
    }

    /// Character code used to index the glyph table.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.0
    }

    /// Glyph as a displayable character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        self.0 as char
    }
}

/// Unique identifier assigned to a creature at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Movement speed of a creature; lower speeds act earlier within a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Speed(u8);

impl Speed {
    /// Exclusive upper bound of generated speeds.
    pub const LIMIT: u8 = 10;

    /// Creates a speed, clamping the value into `0..LIMIT`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value >= Self::LIMIT {
            Self(Self::LIMIT - 1)
        } else {
            Self(value)
        }
    }

    /// Numeric speed value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Blocking classification stored per grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable floor.
    Floor,
    /// Impassable wall.
    Wall,
}

impl TileKind {
    /// Glyph drawn for this classification when no creature covers it.
    #[must_use]
    pub const fn glyph(self) -> Glyph {
        match self {
            Self::Floor => Glyph::FLOOR,
            Self::Wall => Glyph::WALL,
        }
    }
}

/// Immutable representation of a single creature's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CreatureSnapshot {
    /// Unique identifier assigned to the creature.
    pub id: CreatureId,
    /// Cell currently occupied by the creature.
    pub position: Coord,
    /// Speed that decides the creature's turn priority.
    pub speed: Speed,
    /// Glyph drawn at the creature's position.
    pub glyph: Glyph,
}

/// Read-only snapshot describing all creatures, in registry order.
///
/// Registry order is the turn order after the most recent speed sort.
#[derive(Clone, Debug, Default)]
pub struct CreatureView {
    snapshots: Vec<CreatureSnapshot>,
}

impl CreatureView {
    /// Creates a new creature view, preserving the order of `snapshots`.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CreatureSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &CreatureSnapshot> {
        self.snapshots.iter()
    }

    /// Number of creatures captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no creatures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CreatureSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy index.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<CreatureId>],
    width: u32,
    height: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<CreatureId>], width: u32, height: u32) -> Self {
        Self {
            cells,
            width,
            height,
        }
    }

    /// Returns the creature occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, coord: Coord) -> Option<CreatureId> {
        if !is_valid(coord, self.width, self.height) {
            return None;
        }
        coord_to_index(coord, self.width).and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Returns an iterator over all cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = Option<CreatureId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Row-major character grid produced for the renderer each turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ViewportBuffer {
    width: u32,
    height: u32,
    glyphs: Vec<Glyph>,
}

impl ViewportBuffer {
    /// Creates a buffer of the given size filled with floor glyphs.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            glyphs: vec![Glyph::FLOOR; len],
        }
    }

    /// Width of the buffer in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the buffer in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Glyph stored at the provided coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<Glyph> {
        if !is_valid(coord, self.width, self.height) {
            return None;
        }
        coord_to_index(coord, self.width).and_then(|index| self.glyphs.get(index).copied())
    }

    /// Overwrites the glyph at a flat index. Out of range indices are ignored.
    pub fn set_index(&mut self, index: usize, glyph: Glyph) {
        if let Some(slot) = self.glyphs.get_mut(index) {
            *slot = glyph;
        }
    }

    /// All glyphs in row-major order.
    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Iterator over the buffer's rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Glyph]> {
        self.glyphs.chunks(self.width.max(1) as usize)
    }
}

impl fmt::Display for ViewportBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.rows().enumerate() {
            if row_index > 0 {
                f.write_str("\n")?;
            }
            for glyph in row {
                write!(f, "{}", glyph.as_char())?;
            }
        }
        Ok(())
    }
}
