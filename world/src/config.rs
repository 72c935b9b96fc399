//! Tunable parameters used to generate and advance the world.

use std::time::Duration;

use ascii_rogue_core::{Coord, Glyph, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use serde::Deserialize;
use thiserror::Error;

/// Seed used when no other seed is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Share of cells that become walls during generation.
pub const DEFAULT_WALL_PROBABILITY: f32 = 0.2;

/// Upper bound on the creature population.
pub const MAX_CREATURES: usize = 150;

/// Simulated time that must accumulate before a turn fires.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Parameters describing how the world is generated and advanced.
///
/// Every field falls back to its default when omitted from a configuration
/// file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Seed feeding the generation stream.
    pub seed: u64,
    /// Probability that a cell becomes a wall, within `0.0..=1.0`.
    pub wall_probability: f32,
    /// Maximum number of creatures placed at startup.
    pub max_creatures: usize,
    /// Glyph drawn for every creature.
    pub creature_glyph: char,
    /// Milliseconds of simulated time between turns.
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            seed: DEFAULT_SEED,
            wall_probability: DEFAULT_WALL_PROBABILITY,
            max_creatures: MAX_CREATURES,
            creature_glyph: Glyph::CREATURE.as_char(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
        }
    }
}

impl WorldConfig {
    /// Checks that the configuration describes a world that can be generated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_probability) {
            return Err(ConfigError::WallProbability(self.wall_probability));
        }
        if self.max_creatures > MAX_CREATURES {
            return Err(ConfigError::TooManyCreatures {
                requested: self.max_creatures,
                limit: MAX_CREATURES,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        let _ = self.glyph()?;
        Ok(())
    }

    /// Glyph assigned to creatures.
    pub fn glyph(&self) -> Result<Glyph, ConfigError> {
        Glyph::from_char(self.creature_glyph).ok_or(ConfigError::NonAsciiGlyph(self.creature_glyph))
    }

    /// Simulated time between turns.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Number of cells in the configured grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Reasons a world configuration or hand-built layout is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Width and height must both be positive.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Dimensions must fit signed coordinates.
    #[error("grid dimensions {width}x{height} exceed the coordinate range")]
    GridTooLarge {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Wall probability must lie within `0.0..=1.0`.
    #[error("wall probability must lie within 0.0..=1.0 (received {0})")]
    WallProbability(f32),
    /// The population cannot exceed [`MAX_CREATURES`].
    #[error("max_creatures must be at most {limit} (received {requested})")]
    TooManyCreatures {
        /// Configured population cap.
        requested: usize,
        /// Largest accepted cap.
        limit: usize,
    },
    /// Creature glyphs must come from the ASCII range covered by the glyph table.
    #[error("creature glyph {0:?} is not ASCII")]
    NonAsciiGlyph(char),
    /// Turns need a positive interval.
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    /// A layout entry lies outside the grid.
    #[error("layout cell {0} lies outside the grid")]
    LayoutOutOfBounds(Coord),
    /// A creature was placed on a wall or on top of another creature.
    #[error("layout cell {0} is already blocked")]
    LayoutBlocked(Coord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_viewport() {
        let config = WorldConfig::default();
        assert_eq!((config.width, config.height), (80, 25));
        assert_eq!(config.cell_count(), 2000);
        assert_eq!(config.max_creatures, 150);
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let config = WorldConfig {
            wall_probability: 1.5,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::WallProbability(1.5)));
    }

    #[test]
    fn rejects_population_above_cap() {
        let config = WorldConfig {
            max_creatures: 500,
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyCreatures {
                requested: 500,
                limit: MAX_CREATURES,
            })
        );

        let at_cap = WorldConfig {
            max_creatures: MAX_CREATURES,
            ..WorldConfig::default()
        };
        assert_eq!(at_cap.validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_grid() {
        let config = WorldConfig {
            height: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid { width: 80, height: 0 })
        ));
    }

    #[test]
    fn rejects_non_ascii_glyph() {
        let config = WorldConfig {
            creature_glyph: 'λ',
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonAsciiGlyph('λ')));
    }

    #[test]
    fn error_messages_name_the_offending_value() {
        let message = ConfigError::LayoutBlocked(Coord::new(2, 3)).to_string();
        assert_eq!(message, "layout cell (2, 3) is already blocked");
    }
}
