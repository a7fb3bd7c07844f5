//! Simulation configuration.
//!
//! Every knob has a default matching the stock simulation; builders
//! override individual values. With the `serde` feature the whole tree can
//! be loaded from JSON, and missing fields fall back to their defaults.
//!
//! # Example
//!
//! ```rust
//! use hex_trainz::config::{GeneratorConfig, SimConfig, TrainConfig};
//!
//! // Use defaults
//! let config = SimConfig::default();
//! assert_eq!(config.train.max_velocity, 3.0);
//!
//! // Or customize
//! let config = SimConfig::default()
//!     .with_train(TrainConfig::default().with_max_velocity(2.0))
//!     .with_generator(GeneratorConfig::default().with_seed(7).with_station_count(2));
//! assert_eq!(config.generator.seed, 7);
//! ```

// ============================================================================
// Main Config
// ============================================================================

/// Complete simulation configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Map geometry and route search
    pub map: MapConfig,
    /// Train kinematics
    pub train: TrainConfig,
    /// Procedural startup map
    pub generator: GeneratorConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            train: TrainConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl SimConfig {
    /// Set map configuration
    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    /// Set train configuration
    pub fn with_train(mut self, train: TrainConfig) -> Self {
        self.train = train;
        self
    }

    /// Set generator configuration
    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }
}

// ============================================================================
// Map Config
// ============================================================================

/// Map geometry and route search limits
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapConfig {
    /// Hexagon edge length in world units
    pub tile_edge_length: f32,
    /// Maximum recursion depth of the route search
    pub route_budget: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_edge_length: 60.0,
            route_budget: 100,
        }
    }
}

impl MapConfig {
    /// Set the hexagon edge length
    pub fn with_tile_edge_length(mut self, length: f32) -> Self {
        self.tile_edge_length = length;
        self
    }

    /// Set the route search depth
    pub fn with_route_budget(mut self, budget: u32) -> Self {
        self.route_budget = budget;
        self
    }
}

// ============================================================================
// Train Config
// ============================================================================

/// Train kinematics
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainConfig {
    /// Top speed in world units per tick
    pub max_velocity: f32,
    /// Speed change per tick
    pub acceleration: f32,
    /// Turn rate is `velocity / turn_rate_divisor` radians per tick
    pub turn_rate_divisor: f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_velocity: 3.0,
            acceleration: 0.02,
            turn_rate_divisor: 80.0,
        }
    }
}

impl TrainConfig {
    /// Set the top speed
    pub fn with_max_velocity(mut self, v: f32) -> Self {
        self.max_velocity = v;
        self
    }

    /// Set the per-tick acceleration
    pub fn with_acceleration(mut self, a: f32) -> Self {
        self.acceleration = a;
        self
    }

    /// Set the turn rate divisor
    pub fn with_turn_rate_divisor(mut self, divisor: f32) -> Self {
        self.turn_rate_divisor = divisor;
        self
    }
}

// ============================================================================
// Generator Config
// ============================================================================

/// Procedural startup map
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorConfig {
    /// RNG seed; the same seed always yields the same map
    pub seed: u64,
    /// Number of station complexes to scatter
    pub station_count: usize,
    /// Parallel platform rows per station
    pub station_tracks: usize,
    /// Platform tiles per row
    pub station_length: usize,
    /// Columns of the grass fill, half-open
    pub fill_columns: (i32, i32),
    /// Rows of the grass fill, half-open
    pub fill_rows: (i32, i32),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            station_count: 5,
            station_tracks: 4,
            station_length: 10,
            fill_columns: (1, 30),
            fill_rows: (2, 20),
        }
    }
}

impl GeneratorConfig {
    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of stations
    pub fn with_station_count(mut self, count: usize) -> Self {
        self.station_count = count;
        self
    }

    /// Set station dimensions
    pub fn with_station_size(mut self, tracks: usize, length: usize) -> Self {
        self.station_tracks = tracks;
        self.station_length = length;
        self
    }

    /// Set the grass fill area
    pub fn with_fill(mut self, columns: (i32, i32), rows: (i32, i32)) -> Self {
        self.fill_columns = columns;
        self.fill_rows = rows;
        self
    }
}
