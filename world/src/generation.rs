//! Seeded level generation: wall scattering and creature placement.
//!
//! Both steps draw from one generator stream in a fixed order (one sample per
//! cell, then the candidate shuffle, then one speed per creature), so a seed
//! fully determines the starting world.

use ascii_rogue_core::{index_to_coord, Coord, CreatureId, Glyph, Speed, TileKind};
use rand::Rng;

use crate::Tile;

/// Grid produced by wall scattering together with the floor cells left over.
#[derive(Debug)]
pub(crate) struct GeneratedGrid {
    pub(crate) tiles: Vec<Tile>,
    /// Flat indices of floor cells in ascending order, before shuffling.
    pub(crate) candidates: Vec<usize>,
}

/// Starting state of a single creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CreatureSeed {
    pub(crate) id: CreatureId,
    pub(crate) position: Coord,
    pub(crate) speed: Speed,
    pub(crate) glyph: Glyph,
}

/// Classifies every cell, drawing exactly one sample per cell in index order.
pub(crate) fn scatter_walls<R: Rng>(
    width: u32,
    height: u32,
    wall_probability: f32,
    rng: &mut R,
) -> GeneratedGrid {
    let cell_count = width as usize * height as usize;
    let threshold = 1.0 - wall_probability;
    let mut tiles = Vec::with_capacity(cell_count);
    let mut candidates = Vec::with_capacity(cell_count);

    for index in 0..cell_count {
        let sample: f32 = rng.gen();
        let kind = if sample > threshold {
            TileKind::Wall
        } else {
            candidates.push(index);
            TileKind::Floor
        };
        tiles.push(Tile::new(index_to_coord(index, width), kind));
    }

    GeneratedGrid { tiles, candidates }
}

/// Forward Fisher–Yates shuffle continuing the generation stream.
pub(crate) fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    let len = items.len();
    if len < 2 {
        return;
    }
    for index in 0..len - 1 {
        let swap_index = rng.gen_range(index..len);
        items.swap(index, swap_index);
    }
}

/// Creates up to `max_creatures` creatures from the front of the shuffled candidates.
pub(crate) fn seed_creatures<R: Rng>(
    candidates: &[usize],
    width: u32,
    max_creatures: usize,
    glyph: Glyph,
    rng: &mut R,
) -> Vec<CreatureSeed> {
    candidates
        .iter()
        .take(max_creatures)
        .enumerate()
        .map(|(ordinal, &index)| CreatureSeed {
            id: CreatureId::new(ordinal as u32),
            position: index_to_coord(index, width),
            speed: Speed::new(rng.gen_range(0..Speed::LIMIT)),
            glyph,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn scatter_walls_respects_probability_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let open = scatter_walls(6, 4, 0.0, &mut rng);
        assert_eq!(open.candidates.len(), 24);
        assert!(open.tiles.iter().all(|tile| tile.kind() == TileKind::Floor));

        let closed = scatter_walls(6, 4, 1.0, &mut rng);
        assert!(closed.candidates.is_empty());
        assert!(closed.tiles.iter().all(|tile| tile.kind() == TileKind::Wall));
    }

    #[test]
    fn scatter_walls_lists_floor_cells_in_index_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let grid = scatter_walls(10, 10, 0.5, &mut rng);
        assert!(grid.candidates.windows(2).all(|pair| pair[0] < pair[1]));
        for &index in &grid.candidates {
            assert_eq!(grid.tiles[index].kind(), TileKind::Floor);
        }
        let walls = grid
            .tiles
            .iter()
            .filter(|tile| tile.kind() == TileKind::Wall)
            .count();
        assert_eq!(walls + grid.candidates.len(), 100);
        assert!(walls > 0, "half the cells should not all come up floor");
    }

    #[test]
    fn tiles_record_their_own_position() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = scatter_walls(5, 3, 0.2, &mut rng);
        assert_eq!(grid.tiles[7].position(), Coord::new(2, 1));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut items: Vec<usize> = (0..50).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(items, sorted, "fifty items should not shuffle to identity");
    }

    #[test]
    fn seed_creatures_caps_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let candidates: Vec<usize> = (0..200).collect();
        let seeds = seed_creatures(&candidates, 20, 150, Glyph::CREATURE, &mut rng);
        assert_eq!(seeds.len(), 150);
        assert!(seeds.iter().all(|seed| seed.speed.get() < Speed::LIMIT));
        assert_eq!(seeds[21].position, Coord::new(1, 1));
        assert_eq!(seeds[149].id, CreatureId::new(149));
    }

    #[test]
    fn seed_creatures_handles_no_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(seed_creatures(&[], 4, 150, Glyph::CREATURE, &mut rng).is_empty());
    }
}
