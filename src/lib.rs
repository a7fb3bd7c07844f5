//! # hex-trainz
//!
//! Autonomous trains on a hexagonal track grid. Each train drives itself to
//! operator-assigned waypoints while a per-tick reservation pass keeps trains
//! sharing the network from running into each other.
//!
//! ## Features
//!
//! - **Hex tile graph**: constant-time grid addressing, symmetric tracks, per-device capacity rules
//! - **Route search**: direction-aware depth-first search that resolves switches geometrically
//! - **Block reservations**: one deterministic pass per tick, lower train ids win contested track
//! - **Train kinematics**: target velocity from claimed track, bounded acceleration and turning
//! - **Editor commands**: every mutation is a command with an explicit outcome, never an error
//! - **Procedural maps**: seeded startup layout with station complexes
//!
//! ## Architecture
//!
//! - `geometry` - Hex coordinates and angle math
//! - `tile` / `map` - Tile records and the tile graph arena
//! - `route` - Route search over the track graph
//! - `reservation` - Per-tick route and reservation resolver
//! - `train` - Train kinematics and lifecycle
//! - `commands` / `queue` - Editor commands, outcomes and the pending queue
//! - `simulation` - Owns the map and the roster, runs ticks
//! - `generator` - Startup map and station complexes
//! - `traits` - Rendering seam; `mock` has a recording renderer for tests
//!
//! ## Example
//!
//! ```rust
//! use hex_trainz::{EditorCommand, SimConfig, Simulation};
//! use hex_trainz::geometry::HexCoord;
//!
//! let mut sim = Simulation::generated(SimConfig::default());
//!
//! // Put a train on the seed line and send it to the end of the branch
//! let map = sim.map();
//! let tile = map.tile_at(HexCoord::new(2, 0)).unwrap();
//! let last_tile = map.tile_at(HexCoord::new(1, 0)).unwrap();
//! let target = map.tile_at(HexCoord::new(6, 1)).unwrap();
//!
//! let train = sim
//!     .apply_command(EditorCommand::SpawnTrain { tile, last_tile })
//!     .train_id()
//!     .unwrap();
//! sim.apply_command(EditorCommand::AddWaypoint { train, tile: target });
//! assert!(!sim.train(train).unwrap().reserved_path().is_empty());
//!
//! // Run the simulation
//! for _ in 0..100 {
//!     sim.tick();
//! }
//! ```

#![warn(missing_docs)]

/// Editor commands, outcomes and rejection reasons.
pub mod commands;
/// Simulation configuration with builders.
pub mod config;
/// Procedural startup map and station complexes.
pub mod generator;
/// Hex grid addressing and angle arithmetic.
pub mod geometry;
/// The tile graph arena.
pub mod map;
/// Recording test doubles for the collaborator traits.
pub mod mock;
/// Bounded queue of pending editor commands.
pub mod queue;
/// Per-tick route and reservation resolver.
pub mod reservation;
/// Route search over the track graph.
pub mod route;
/// Map and roster owner, tick loop.
pub mod simulation;
/// Tile records, terrain and devices.
pub mod tile;
/// Collaborator traits (rendering).
pub mod traits;
/// Train kinematics and lifecycle.
pub mod train;

// Re-exports for convenience
pub use commands::{CommandOutcome, EditorCommand, RejectReason};
pub use config::{GeneratorConfig, MapConfig, SimConfig, TrainConfig};
pub use generator::StationOrientation;
pub use geometry::{HexCoord, Point};
pub use map::{TileEdit, TileMap};
pub use reservation::{resolve, PlanRequest, RoutePlan};
pub use route::{find_next_track, find_route, Turn};
pub use simulation::{Simulation, SimulationSnapshot};
pub use tile::{Device, RailType, SignalLight, Terrain, Tile, TileId};
pub use traits::{render_scene, SceneRenderer};
pub use train::{Train, TrainId, TrainSnapshot, TrainState};
