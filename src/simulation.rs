//! The simulation: map, train roster and the tick loop.
//!
//! [`Simulation`] owns the [`TileMap`] and every [`Train`]. All mutation goes
//! through [`EditorCommand`]s, and any command that changes something is
//! followed by a full route and reservation recompute before the next
//! movement pass.
//!
//! # Tick
//!
//! 1. Apply queued editor commands
//! 2. Replan all trains, so every movement pass runs on fresh reservations
//! 3. For each train in ascending id: [`Train::arrive`], replanning the
//!    whole roster right away if it consumed a waypoint, then
//!    [`Train::drive`]
//!
//! # Example
//!
//! ```rust
//! use hex_trainz::{EditorCommand, SimConfig, Simulation, TrainState};
//! use hex_trainz::geometry::HexCoord;
//! use hex_trainz::tile::Terrain;
//!
//! let mut sim = Simulation::new(SimConfig::default());
//! let ids: Vec<_> = (0..3)
//!     .map(|x| {
//!         sim.apply_command(EditorCommand::PaintTile { coord: HexCoord::new(x, 0), terrain: Terrain::Grass })
//!             .tile_id()
//!             .unwrap()
//!     })
//!     .collect();
//! sim.apply_command(EditorCommand::AddTrack { a: ids[0], b: ids[1] });
//! sim.apply_command(EditorCommand::AddTrack { a: ids[1], b: ids[2] });
//!
//! let train = sim
//!     .apply_command(EditorCommand::SpawnTrain { tile: ids[1], last_tile: ids[0] })
//!     .train_id()
//!     .unwrap();
//! sim.apply_command(EditorCommand::AddWaypoint { train, tile: ids[2] });
//!
//! for _ in 0..300 {
//!     sim.tick();
//! }
//! let t = sim.train(train).unwrap();
//! assert_eq!(t.tile_id(), ids[2]);
//! assert_eq!(t.state(), TrainState::Stopped);
//! ```

use std::collections::BTreeMap;

use crate::commands::{CommandOutcome, EditorCommand, RejectReason};
use crate::config::SimConfig;
use crate::generator::{create_station, generate};
use crate::map::TileMap;
use crate::queue::{EditQueue, DEFAULT_QUEUE_CAPACITY};
use crate::reservation::resolve;
use crate::tile::TileId;
use crate::train::{Train, TrainId, TrainSnapshot};

/// Map, trains and the tick loop.
#[derive(Debug)]
pub struct Simulation {
    map: TileMap,
    trains: BTreeMap<TrainId, Train>,
    next_train_id: u32,
    config: SimConfig,
    tick: u64,
    queue: EditQueue<DEFAULT_QUEUE_CAPACITY>,
}

impl Simulation {
    /// Empty map.
    pub fn new(config: SimConfig) -> Self {
        let map = TileMap::new(config.map.tile_edge_length);
        Self::with_map(map, config)
    }

    /// Procedurally generated startup map.
    pub fn generated(config: SimConfig) -> Self {
        let map = generate(&config);
        Self::with_map(map, config)
    }

    /// Existing map.
    pub fn with_map(map: TileMap, config: SimConfig) -> Self {
        Self {
            map,
            trains: BTreeMap::new(),
            next_train_id: 1,
            config,
            tick: 0,
            queue: EditQueue::new(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Applies a command now. Replans every train if anything changed.
    pub fn apply_command(&mut self, cmd: EditorCommand) -> CommandOutcome {
        let outcome = self.execute(cmd);
        if outcome.changed() {
            self.replan();
        }
        outcome
    }

    /// Queues a command for the start of the next tick.
    ///
    /// Returns false if the queue is full.
    #[must_use]
    pub fn submit(&mut self, cmd: EditorCommand) -> bool {
        self.queue.push(cmd)
    }

    /// Number of queued commands.
    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    fn execute(&mut self, cmd: EditorCommand) -> CommandOutcome {
        let outcome = match cmd {
            EditorCommand::PaintTile { coord, terrain } => {
                self.map.add_or_update_tile(coord, terrain).into()
            }
            EditorCommand::RemoveTile { tile } => match self.map.remove_tile(tile) {
                Some(_) => CommandOutcome::TileRemoved(tile),
                None => RejectReason::UnknownTile.into(),
            },
            EditorCommand::AddTrack { a, b } => self.map.add_track(a, b),
            EditorCommand::RemoveTrack { a, b } => self.map.remove_track(a, b),
            EditorCommand::ToggleSemaphore { tile } => self.map.toggle_semaphore(tile),
            EditorCommand::RemoveSemaphore { tile } => self.map.remove_semaphore(tile),
            EditorCommand::SwitchSignal { tile } => self.map.switch_signal(tile),
            EditorCommand::BuildStation { origin, orientation } => {
                let layout = &self.config.generator;
                CommandOutcome::StationBuilt(create_station(
                    &mut self.map,
                    origin,
                    orientation,
                    layout.station_tracks,
                    layout.station_length,
                ))
            }
            EditorCommand::SpawnTrain { tile, last_tile } => self.spawn(tile, last_tile),
            EditorCommand::SpawnTrainAt { point } => match self.map.track_at_world(point) {
                Some((tile, last_tile)) => self.spawn(tile, last_tile),
                None => RejectReason::NoTrackAtPosition.into(),
            },
            EditorCommand::RemoveTrain { train } => match self.trains.remove(&train) {
                Some(_) => CommandOutcome::TrainsRemoved(1),
                None => RejectReason::UnknownTrain.into(),
            },
            EditorCommand::RemoveTrainsAt { tile } => {
                let before = self.trains.len();
                self.trains
                    .retain(|_, t| t.tile_id() != tile && t.last_tile_id() != tile);
                CommandOutcome::TrainsRemoved(before - self.trains.len())
            }
            EditorCommand::AddWaypoint { train, tile } => {
                if !self.map.contains(tile) {
                    RejectReason::UnknownTile.into()
                } else if let Some(t) = self.trains.get_mut(&train) {
                    t.add_waypoint(tile);
                    CommandOutcome::WaypointAdded
                } else {
                    RejectReason::UnknownTrain.into()
                }
            }
            EditorCommand::RemoveWaypoint { train, tile } => {
                match self.trains.get_mut(&train).map(|t| t.remove_waypoint(tile)) {
                    Some(true) => CommandOutcome::WaypointRemoved,
                    Some(false) => RejectReason::WaypointNotFound.into(),
                    None => RejectReason::UnknownTrain.into(),
                }
            }
            EditorCommand::ToggleLoop { train } => match self.trains.get_mut(&train) {
                Some(t) => CommandOutcome::LoopMode(t.toggle_loop()),
                None => RejectReason::UnknownTrain.into(),
            },
        };

        if let CommandOutcome::Rejected { reason } = outcome {
            log::debug!("{cmd:?} rejected: {reason:?}");
        }
        outcome
    }

    fn spawn(&mut self, tile: TileId, last_tile: TileId) -> CommandOutcome {
        if tile == last_tile {
            return RejectReason::SameTile.into();
        }
        let id = TrainId(self.next_train_id);
        match Train::new(&self.map, id, tile, last_tile, &self.config.train) {
            Some(train) => {
                self.next_train_id += 1;
                self.trains.insert(id, train);
                log::info!("train {id} spawned on tile {tile}");
                CommandOutcome::TrainSpawned(id)
            }
            None => RejectReason::UnknownTile.into(),
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Recomputes every train's route and reservation.
    pub fn replan(&mut self) {
        let requests: Vec<_> = self.trains.values().map(Train::plan_request).collect();
        let plans = resolve(&self.map, &requests, self.config.map.route_budget);
        for (id, plan) in plans {
            if let Some(train) = self.trains.get_mut(&id) {
                train.apply_plan(plan);
            }
        }
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) {
        while let Some(cmd) = self.queue.pop() {
            self.execute(cmd);
        }
        self.replan();

        let ids: Vec<TrainId> = self.trains.keys().copied().collect();
        for id in ids {
            let occupied = self.occupancy();
            let reached = match self.trains.get_mut(&id) {
                Some(train) => train.arrive(&self.map, &occupied),
                None => continue,
            };
            if reached {
                self.replan();
            }
            if let Some(train) = self.trains.get_mut(&id) {
                train.drive(&self.map);
            }
        }

        self.tick += 1;
        log::trace!("tick {} done, {} trains", self.tick, self.trains.len());
    }

    fn occupancy(&self) -> Vec<(TrainId, TileId)> {
        self.trains
            .values()
            .map(|t| (t.id(), t.tile_id()))
            .collect()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The tile graph.
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Train by id.
    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(&id)
    }

    /// All trains in ascending id order.
    pub fn trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.values()
    }

    /// Number of trains.
    pub fn train_count(&self) -> usize {
        self.trains.len()
    }

    /// Ticks elapsed.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Serializable view of the roster.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            tiles: self.map.len(),
            trains: self.trains.values().map(Train::snapshot).collect(),
        }
    }
}

/// Point-in-time view of the simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationSnapshot {
    /// Ticks elapsed.
    pub tick: u64,
    /// Number of tiles on the map.
    pub tiles: usize,
    /// Every train, ascending id.
    pub trains: Vec<TrainSnapshot>,
}
