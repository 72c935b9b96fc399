#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduler that resolves one move per creature each turn.
//!
//! When the world announces a new turn the scheduler walks the creature
//! registry in its speed-sorted order. Each creature looks at its open Moore
//! neighbours, a [`MoveChooser`] picks one, and the move is applied to the
//! world before the next creature decides. Later creatures therefore see the
//! cells earlier creatures just entered as blocked and the cells they left as
//! free.

use ascii_rogue_core::{Command, Coord, CreatureId, CreatureSnapshot, Event};
use ascii_rogue_world::{self as world, query, World};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Strategy that picks a destination among a creature's open neighbours.
pub trait MoveChooser {
    /// Returns the index into `candidates` to move to, or `None` to stay put.
    ///
    /// `candidates` is never empty and lists cells in
    /// [`ascii_rogue_core::NEIGHBOUR_OFFSETS`] order.
    fn choose(&mut self, creature: &CreatureSnapshot, candidates: &[Coord]) -> Option<usize>;
}

/// Picks uniformly among the open neighbours using a seeded generator.
#[derive(Clone, Debug)]
pub struct RandomChooser {
    rng: ChaCha8Rng,
}

impl RandomChooser {
    /// Creates a chooser seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Continues an existing generator stream, typically the one that
    /// generated the world.
    #[must_use]
    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl MoveChooser for RandomChooser {
    fn choose(&mut self, _creature: &CreatureSnapshot, candidates: &[Coord]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..candidates.len()))
    }
}

/// Scripted chooser that always takes the first open neighbour.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstOpen;

impl MoveChooser for FirstOpen {
    fn choose(&mut self, _creature: &CreatureSnapshot, candidates: &[Coord]) -> Option<usize> {
        (!candidates.is_empty()).then_some(0)
    }
}

/// System that reacts to turn events and drives creature movement.
#[derive(Debug)]
pub struct TurnScheduler<C> {
    chooser: C,
    order: Vec<CreatureId>,
    candidates: Vec<Coord>,
}

impl TurnScheduler<RandomChooser> {
    /// Creates a scheduler that moves creatures at random using `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(RandomChooser::seeded(seed))
    }
}

impl<C: MoveChooser> TurnScheduler<C> {
    /// Creates a scheduler that consults the provided chooser.
    #[must_use]
    pub fn new(chooser: C) -> Self {
        Self {
            chooser,
            order: Vec::new(),
            candidates: Vec::with_capacity(ascii_rogue_core::NEIGHBOUR_OFFSETS.len()),
        }
    }

    /// Resolves a turn for every [`Event::TurnStarted`] found in `events`.
    ///
    /// Moves are applied to `world` one at a time and the resulting events are
    /// appended to `out_events`.
    pub fn handle(&mut self, events: &[Event], world: &mut World, out_events: &mut Vec<Event>) {
        for event in events {
            if let Event::TurnStarted { turn } = event {
                self.resolve_turn(*turn, world, out_events);
            }
        }
    }

    fn resolve_turn(&mut self, turn: u64, world: &mut World, out_events: &mut Vec<Event>) {
        let Self {
            chooser,
            order,
            candidates,
        } = self;

        order.clear();
        order.extend(query::turn_order(world));

        let mut moved = 0_usize;
        for &creature in order.iter() {
            let Some(snapshot) = query::creature(world, creature) else {
                continue;
            };

            query::open_neighbours_into(world, snapshot.position, candidates);
            if candidates.is_empty() {
                continue;
            }

            let Some(to) = chooser
                .choose(&snapshot, candidates)
                .and_then(|choice| candidates.get(choice).copied())
            else {
                continue;
            };

            let first_new = out_events.len();
            world::apply(world, Command::MoveCreature { creature, to }, out_events);
            let accepted = matches!(
                out_events.get(first_new),
                Some(Event::CreatureMoved { .. })
            );
            debug_assert!(
                accepted,
                "open neighbour {to} was rejected for creature {creature:?}"
            );
            if accepted {
                moved += 1;
            }
        }

        debug!("turn {turn}: {moved} of {} creatures moved", order.len());
    }
}
