#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Viewport projector that turns world state into a character buffer.

use ascii_rogue_core::{coord_to_index, is_valid, CreatureView, ViewportBuffer};
use ascii_rogue_world::{query, Tile, World};

/// Produces the character buffer consumed by renderers.
///
/// The buffer is rebuilt from scratch whenever the world has advanced to a
/// turn the projector has not drawn yet, so it must be refreshed after the
/// turn scheduler has resolved movement.
#[derive(Debug, Default)]
pub struct ViewportProjector {
    buffer: Option<ViewportBuffer>,
    projected_turn: Option<u64>,
}

impl ViewportProjector {
    /// Rebuilds the buffer if the world reached a turn that has not been drawn.
    ///
    /// Returns `true` when the buffer changed.
    pub fn refresh(&mut self, world: &World) -> bool {
        let turn = query::turn(world);
        if self.buffer.is_some() && self.projected_turn == Some(turn) {
            return false;
        }
        let _ = self.project(world);
        true
    }

    /// Unconditionally rebuilds the buffer from the current world state.
    pub fn project(&mut self, world: &World) -> &ViewportBuffer {
        let (width, height) = query::dimensions(world);
        let buffer = self
            .buffer
            .get_or_insert_with(|| ViewportBuffer::new(width, height));
        if buffer.width() != width || buffer.height() != height {
            *buffer = ViewportBuffer::new(width, height);
        }
        project_into(query::tiles(world), &query::creature_view(world), buffer);
        self.projected_turn = Some(query::turn(world));
        buffer
    }

    /// Most recently projected buffer, if any.
    #[must_use]
    pub fn buffer(&self) -> Option<&ViewportBuffer> {
        self.buffer.as_ref()
    }

    /// Turn number captured by the most recent projection.
    #[must_use]
    pub fn projected_turn(&self) -> Option<u64> {
        self.projected_turn
    }
}

/// Draws tiles and then creatures into `buffer`.
///
/// Every cell first receives its tile glyph; creature glyphs are written
/// afterwards so they cover walls and floors. Should two creatures ever share
/// a cell the one listed last wins.
pub fn project_into(tiles: &[Tile], creatures: &CreatureView, buffer: &mut ViewportBuffer) {
    for (index, tile) in tiles.iter().enumerate() {
        buffer.set_index(index, tile.kind().glyph());
    }

    let (width, height) = (buffer.width(), buffer.height());
    for creature in creatures.iter() {
        if !is_valid(creature.position, width, height) {
            continue;
        }
        if let Some(index) = coord_to_index(creature.position, width) {
            buffer.set_index(index, creature.glyph);
        }
    }
}
