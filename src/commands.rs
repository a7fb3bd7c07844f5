//! Editor commands and their outcomes.
//!
//! The input/editor layer talks to the simulation only through
//! [`EditorCommand`]s. Every command produces a [`CommandOutcome`]; bad
//! input is never an error, it is reported as
//! [`CommandOutcome::Rejected`] with a [`RejectReason`] and leaves the
//! simulation untouched.
//!
//! # Command Flow
//!
//! 1. The editor builds an [`EditorCommand`] (paint a tile, draw a track,
//!    place a train, add a waypoint, ...)
//! 2. It is applied right away with
//!    [`Simulation::apply_command`](crate::Simulation::apply_command), or
//!    queued with [`Simulation::submit`](crate::Simulation::submit) and
//!    applied at the start of the next tick
//! 3. Any outcome that changed something triggers a full route and
//!    reservation recompute for every train
//!
//! ```rust
//! use hex_trainz::{CommandOutcome, EditorCommand, RejectReason, SimConfig, Simulation};
//! use hex_trainz::geometry::HexCoord;
//! use hex_trainz::tile::Terrain;
//!
//! let mut sim = Simulation::new(SimConfig::default());
//! let a = sim
//!     .apply_command(EditorCommand::PaintTile { coord: HexCoord::new(0, 0), terrain: Terrain::Grass })
//!     .tile_id()
//!     .unwrap();
//!
//! let outcome = sim.apply_command(EditorCommand::AddTrack { a, b: a });
//! assert_eq!(outcome, CommandOutcome::Rejected { reason: RejectReason::SameTile });
//! ```

use crate::generator::StationOrientation;
use crate::geometry::{HexCoord, Point};
use crate::tile::{Terrain, TileId};
use crate::train::TrainId;

// ============================================================================
// Editor Commands
// ============================================================================

/// A mutation requested by the editor layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditorCommand {
    /// Create a tile at `coord`, or repaint the one already there.
    PaintTile {
        /// Grid cell to paint.
        coord: HexCoord,
        /// New ground cover.
        terrain: Terrain,
    },

    /// Delete a tile together with every track touching it.
    RemoveTile {
        /// Tile to delete.
        tile: TileId,
    },

    /// Connect two tiles.
    AddTrack {
        /// First endpoint.
        a: TileId,
        /// Second endpoint.
        b: TileId,
    },

    /// Disconnect two tiles. Refused on stations and semaphores.
    RemoveTrack {
        /// First endpoint.
        a: TileId,
        /// Second endpoint.
        b: TileId,
    },

    /// Place a semaphore on a two-track rail tile, or turn an existing
    /// one around.
    ToggleSemaphore {
        /// Target tile.
        tile: TileId,
    },

    /// Turn a semaphore tile back into plain rail.
    RemoveSemaphore {
        /// Target tile.
        tile: TileId,
    },

    /// Flip a semaphore between red and green.
    SwitchSignal {
        /// Target tile.
        tile: TileId,
    },

    /// Build a station complex using the generator's dimensions.
    BuildStation {
        /// First tile of the first platform row.
        origin: HexCoord,
        /// Which way the rows extend from `origin`.
        orientation: StationOrientation,
    },

    /// Place a train on `tile`, facing away from `last_tile`.
    SpawnTrain {
        /// Tile the train starts on.
        tile: TileId,
        /// Tile the train came from; sets the initial heading.
        last_tile: TileId,
    },

    /// Place a train on the track nearest to a world position.
    SpawnTrainAt {
        /// World position picked by the user.
        point: Point,
    },

    /// Delete a train.
    RemoveTrain {
        /// Train to delete.
        train: TrainId,
    },

    /// Delete every train currently on, or just leaving, `tile`.
    RemoveTrainsAt {
        /// Tile to clear.
        tile: TileId,
    },

    /// Append a waypoint to a train's list.
    AddWaypoint {
        /// Train to route.
        train: TrainId,
        /// Destination tile.
        tile: TileId,
    },

    /// Remove the first occurrence of a waypoint.
    RemoveWaypoint {
        /// Train to edit.
        train: TrainId,
        /// Waypoint to drop.
        tile: TileId,
    },

    /// Toggle re-enqueueing of consumed waypoints.
    ToggleLoop {
        /// Train to edit.
        train: TrainId,
    },
}

// ============================================================================
// Command Outcomes
// ============================================================================

/// What happened when a command was applied.
///
/// # Example
///
/// ```rust
/// use hex_trainz::{CommandOutcome, RejectReason};
///
/// fn describe(outcome: &CommandOutcome) -> &'static str {
///     match outcome {
///         CommandOutcome::Rejected { reason: RejectReason::TrackCapacity } => "tile is full",
///         CommandOutcome::Rejected { .. } => "rejected",
///         CommandOutcome::Unchanged => "nothing to do",
///         _ => "applied",
///     }
/// }
///
/// assert_eq!(describe(&CommandOutcome::TrackAdded), "applied");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandOutcome {
    /// A new tile was created.
    TileCreated(TileId),
    /// An existing tile changed terrain.
    TileUpdated(TileId),
    /// The tile already had this terrain.
    TileUnchanged(TileId),
    /// A tile and its tracks were removed.
    TileRemoved(TileId),
    /// Both endpoints now list each other.
    TrackAdded,
    /// Neither endpoint lists the other any more.
    TrackRemoved,
    /// Semaphore placed, turned, removed or switched.
    SignalChanged,
    /// A station complex was laid down; carries the number of tiles touched.
    StationBuilt(usize),
    /// A train was created.
    TrainSpawned(TrainId),
    /// Number of trains deleted.
    TrainsRemoved(usize),
    /// Waypoint appended.
    WaypointAdded,
    /// Waypoint removed.
    WaypointRemoved,
    /// Loop mode after the toggle.
    LoopMode(bool),
    /// Valid command with nothing to change.
    Unchanged,
    /// Command refused; nothing changed.
    Rejected {
        /// Why the command was refused.
        reason: RejectReason,
    },
}

impl CommandOutcome {
    /// Tile produced or touched by a tile command.
    pub fn tile_id(&self) -> Option<TileId> {
        match self {
            Self::TileCreated(id)
            | Self::TileUpdated(id)
            | Self::TileUnchanged(id)
            | Self::TileRemoved(id) => Some(*id),
            _ => None,
        }
    }

    /// Train created by [`EditorCommand::SpawnTrain`] or
    /// [`EditorCommand::SpawnTrainAt`].
    pub fn train_id(&self) -> Option<TrainId> {
        match self {
            Self::TrainSpawned(id) => Some(*id),
            _ => None,
        }
    }

    /// True for [`CommandOutcome::Rejected`].
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Whether routes and reservations have to be recomputed.
    pub fn changed(&self) -> bool {
        !matches!(
            self,
            Self::Unchanged | Self::TileUnchanged(_) | Self::Rejected { .. } | Self::TrainsRemoved(0)
        )
    }
}

impl From<RejectReason> for CommandOutcome {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }
}

/// Reason a command was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectReason {
    /// A referenced tile does not exist (or was already removed).
    UnknownTile,
    /// A referenced train does not exist.
    UnknownTrain,
    /// Both track endpoints are the same tile.
    SameTile,
    /// An endpoint already carries as many tracks as its device allows.
    TrackCapacity,
    /// Station and semaphore topology cannot be edited by hand.
    ProtectedDevice,
    /// Semaphores need a plain rail tile with exactly two tracks.
    NotSignalCandidate,
    /// No pair of tiles near the picked position.
    NoTrackAtPosition,
    /// The train has no such waypoint.
    WaypointNotFound,
}
