use std::time::Duration;

use ascii_rogue_core::{
    index_to_coord, is_valid, Command, Coord, CreatureId, Event, MoveError, Speed,
};
use ascii_rogue_system_turns::{FirstOpen, MoveChooser, TurnScheduler};
use ascii_rogue_system_viewport::ViewportProjector;
use ascii_rogue_world::{self as world, query, World, WorldConfig};

fn config(width: u32, height: u32) -> WorldConfig {
    WorldConfig {
        width,
        height,
        ..WorldConfig::default()
    }
}

fn run_turn<C: MoveChooser>(world: &mut World, scheduler: &mut TurnScheduler<C>) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(500),
        },
        &mut events,
    );
    let mut moves = Vec::new();
    scheduler.handle(&events, world, &mut moves);
    moves
}

fn position(world: &World, id: u32) -> Coord {
    query::creature(world, CreatureId::new(id))
        .expect("creature exists")
        .position
}

fn assert_invariants(world: &World) {
    let (width, height) = query::dimensions(world);
    let occupancy = query::occupancy_view(world);
    let creatures = query::creature_view(world);

    let mut seen = Vec::new();
    for creature in creatures.iter() {
        assert!(is_valid(creature.position, width, height));
        let tile = query::tile_at(world, creature.position).expect("in bounds");
        assert!(!tile.is_wall(), "creature {:?} on a wall", creature.id);
        assert_eq!(occupancy.occupant(creature.position), Some(creature.id));
        seen.push(creature.position);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), creatures.len(), "two creatures share a cell");

    for (index, tile) in query::tiles(world).iter().enumerate() {
        let coord = index_to_coord(index, width);
        let occupied = occupancy.occupant(coord).is_some();
        assert_eq!(query::is_blocked(world, coord), tile.is_wall() || occupied);
        assert!(!(tile.is_wall() && occupied));
    }
}

#[test]
fn four_by_four_scenario_with_first_open_chooser() {
    let walls: Vec<Coord> = [0, 5, 10, 15]
        .into_iter()
        .map(|index| index_to_coord(index, 4))
        .collect();
    let creatures = [
        (index_to_coord(1, 4), Speed::new(0)),
        (index_to_coord(2, 4), Speed::new(5)),
        (index_to_coord(3, 4), Speed::new(2)),
    ];
    let mut world = World::from_layout(&config(4, 4), &walls, &creatures).expect("valid layout");
    let mut scheduler = TurnScheduler::new(FirstOpen);
    let mut projector = ViewportProjector::default();

    let moves = run_turn(&mut world, &mut scheduler);
    assert!(projector.refresh(&world));

    // Speed order is 0, 2, 1; creature 1 finds (2, 1) already taken by creature 2.
    assert_eq!(
        moves,
        vec![
            Event::CreatureMoved {
                creature: CreatureId::new(0),
                from: Coord::new(1, 0),
                to: Coord::new(0, 1),
            },
            Event::CreatureMoved {
                creature: CreatureId::new(2),
                from: Coord::new(3, 0),
                to: Coord::new(2, 1),
            },
            Event::CreatureMoved {
                creature: CreatureId::new(1),
                from: Coord::new(2, 0),
                to: Coord::new(3, 1),
            },
        ]
    );
    assert_eq!(position(&world, 0), Coord::new(0, 1));
    assert_eq!(position(&world, 1), Coord::new(3, 1));
    assert_eq!(position(&world, 2), Coord::new(2, 1));
    assert_eq!(
        projector.buffer().expect("projected").to_string(),
        "#...\nr#rr\n..#.\n...#"
    );
    assert_invariants(&world);
}

#[test]
fn slower_creature_claims_contested_cell() {
    let creatures = [
        (Coord::new(0, 0), Speed::new(7)),
        (Coord::new(2, 0), Speed::new(1)),
    ];
    let mut world = World::from_layout(&config(3, 1), &[], &creatures).expect("valid layout");
    let mut scheduler = TurnScheduler::seeded(1234);

    let moves = run_turn(&mut world, &mut scheduler);

    assert_eq!(
        moves,
        vec![Event::CreatureMoved {
            creature: CreatureId::new(1),
            from: Coord::new(2, 0),
            to: Coord::new(1, 0),
        }]
    );
    assert_eq!(position(&world, 0), Coord::new(0, 0));
}

#[test]
fn vacated_cell_is_free_for_later_creatures() {
    // The fast creature at (1,0) can only move once the slow one at (2,0) has
    // stepped aside into (3,0).
    let creatures = [
        (Coord::new(1, 0), Speed::new(9)),
        (Coord::new(2, 0), Speed::new(0)),
    ];
    let walls = [Coord::new(0, 0)];
    let mut world = World::from_layout(&config(4, 1), &walls, &creatures).expect("valid layout");
    let mut scheduler = TurnScheduler::new(FirstOpen);

    let _ = run_turn(&mut world, &mut scheduler);

    assert_eq!(position(&world, 1), Coord::new(3, 0));
    assert_eq!(position(&world, 0), Coord::new(2, 0));
    assert_invariants(&world);
}

#[test]
fn enclosed_creature_never_moves() {
    let walls: Vec<Coord> = (0..9)
        .filter(|&index| index != 4)
        .map(|index| index_to_coord(index, 3))
        .collect();
    let mut world = World::from_layout(&config(3, 3), &walls, &[(Coord::new(1, 1), Speed::new(4))])
        .expect("valid layout");
    let mut scheduler = TurnScheduler::seeded(9);

    for _ in 0..25 {
        let moves = run_turn(&mut world, &mut scheduler);
        assert!(moves.is_empty());
        assert_eq!(position(&world, 0), Coord::new(1, 1));
    }
}

#[test]
fn boxed_in_creature_moves_once_neighbour_frees_up() {
    // Creature 0 is hemmed in by walls and creature 1, which walks away first.
    let walls = [Coord::new(0, 1), Coord::new(1, 1)];
    let creatures = [
        (Coord::new(0, 0), Speed::new(5)),
        (Coord::new(1, 0), Speed::new(0)),
    ];
    let mut world = World::from_layout(&config(3, 2), &walls, &creatures).expect("valid layout");
    let mut scheduler = TurnScheduler::new(FirstOpen);

    let _ = run_turn(&mut world, &mut scheduler);

    assert_eq!(position(&world, 1), Coord::new(2, 1));
    assert_eq!(position(&world, 0), Coord::new(1, 0));
}

#[test]
fn empty_registry_turn_is_a_no_op() {
    let mut world = World::from_layout(&config(5, 5), &[], &[]).expect("valid layout");
    let mut scheduler = TurnScheduler::seeded(3);

    assert!(run_turn(&mut world, &mut scheduler).is_empty());
    assert_eq!(query::turn(&world), 1);
}

#[test]
fn no_turn_means_no_movement() {
    let mut world = World::new(&config(10, 6)).expect("valid");
    let mut scheduler = TurnScheduler::seeded(3);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);
    let mut moves = Vec::new();
    scheduler.handle(&events, &mut world, &mut moves);

    events.clear();
    moves.clear();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );
    let settled = query::creature_view(&world).into_vec();
    scheduler.handle(&events, &mut world, &mut moves);

    assert!(moves.is_empty());
    assert_eq!(query::creature_view(&world).into_vec(), settled);
}

#[test]
fn each_creature_moves_at_most_once_per_turn() {
    let mut world = World::new(&config(20, 10)).expect("valid");
    let mut scheduler = TurnScheduler::seeded(77);

    for _ in 0..10 {
        let moves = run_turn(&mut world, &mut scheduler);
        let mut movers: Vec<CreatureId> = moves
            .iter()
            .filter_map(|event| match event {
                Event::CreatureMoved { creature, .. } => Some(*creature),
                _ => None,
            })
            .collect();
        let total = movers.len();
        movers.sort();
        movers.dedup();
        assert_eq!(movers.len(), total);
        assert!(!moves
            .iter()
            .any(|event| matches!(event, Event::MoveRejected { .. })));
    }
}

#[test]
fn invariants_hold_across_many_seeds_and_turns() {
    for seed in 0..12_u64 {
        let config = WorldConfig {
            width: 24,
            height: 12,
            seed,
            wall_probability: 0.35,
            max_creatures: 120,
            ..WorldConfig::default()
        };
        let mut world = World::new(&config).expect("valid");
        let mut scheduler = TurnScheduler::seeded(seed.wrapping_mul(31));
        assert_invariants(&world);

        for _ in 0..30 {
            let _ = run_turn(&mut world, &mut scheduler);
            assert_invariants(&world);
        }
    }
}

#[test]
fn externally_requested_move_into_wall_is_rejected() {
    let mut world = World::from_layout(
        &config(2, 1),
        &[Coord::new(1, 0)],
        &[(Coord::new(0, 0), Speed::new(0))],
    )
    .expect("valid layout");
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::MoveCreature {
            creature: CreatureId::new(0),
            to: Coord::new(1, 0),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::MoveRejected {
            creature: CreatureId::new(0),
            to: Coord::new(1, 0),
            reason: MoveError::Blocked,
        }]
    );
}
