//! Wires the world, the turn scheduler and the viewport projector together.

use std::time::Duration;

use ascii_rogue_core::{Command, Event, ViewportBuffer};
use ascii_rogue_rendering::Frame;
use ascii_rogue_system_turns::{RandomChooser, TurnScheduler};
use ascii_rogue_system_viewport::ViewportProjector;
use ascii_rogue_world::{self as world, query, ConfigError, World, WorldConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One running simulation driven frame by frame by a rendering backend.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    scheduler: TurnScheduler<RandomChooser>,
    projector: ViewportProjector,
    events: Vec<Event>,
    moves: Vec<Event>,
}

impl Session {
    /// Generates the world and hands the rest of the seeded stream to movement.
    pub(crate) fn new(config: &WorldConfig) -> Result<Self, ConfigError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let world = World::generate(config, &mut rng)?;
        let scheduler = TurnScheduler::new(RandomChooser::from_rng(rng));
        let mut projector = ViewportProjector::default();
        let _ = projector.refresh(&world);

        Ok(Self {
            world,
            scheduler,
            projector,
            events: Vec::new(),
            moves: Vec::new(),
        })
    }

    pub(crate) fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        query::dimensions(&self.world)
    }

    /// Frame showing the most recent projection.
    pub(crate) fn frame(&self) -> Frame {
        let viewport = self.projector.buffer().cloned().unwrap_or_else(|| {
            let (width, height) = self.dimensions();
            ViewportBuffer::new(width, height)
        });
        Frame::new(query::turn(&self.world), viewport)
    }

    /// Advances simulated time and refreshes `frame` if a turn fired.
    pub(crate) fn advance(&mut self, dt: Duration, frame: &mut Frame) {
        self.events.clear();
        self.moves.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);
        self.scheduler
            .handle(&self.events, &mut self.world, &mut self.moves);

        if self.projector.refresh(&self.world) {
            if let Some(buffer) = self.projector.buffer() {
                frame.viewport.clone_from(buffer);
            }
            frame.turn = query::turn(&self.world);
        }
    }
}
