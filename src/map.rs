//! The tile graph: an arena of [`Tile`]s addressed by stable [`TileId`]s.
//!
//! Tiles live in a dense `Vec<Option<Tile>>` indexed by id, with a
//! coordinate index for constant-time [`TileMap::tile_at`]. Neighbour
//! references are plain ids into the same arena, and every edit keeps
//! track edges symmetric: if `a` lists `b`, `b` lists `a`.
//!
//! # Example
//!
//! ```rust
//! use hex_trainz::map::TileMap;
//! use hex_trainz::geometry::HexCoord;
//! use hex_trainz::tile::Terrain;
//! use hex_trainz::CommandOutcome;
//!
//! let mut map = TileMap::new(60.0);
//! let a = map.add_or_update_tile(HexCoord::new(0, 0), Terrain::Grass).id();
//! let b = map.add_or_update_tile(HexCoord::new(1, 0), Terrain::Sand).id();
//!
//! assert_eq!(map.add_track(a, b), CommandOutcome::TrackAdded);
//! assert!(map.tile(a).unwrap().connects_to(b));
//! assert!(map.tile(b).unwrap().connects_to(a));
//! ```

use std::collections::HashMap;

use crate::commands::{CommandOutcome, RejectReason};
use crate::geometry::{angle_to_target, distance, move_point, HexCoord, HexMetrics, Point};
use crate::route::Turn;
use crate::tile::{Device, SignalLight, Terrain, Tile, TileId};

/// Result of [`TileMap::add_or_update_tile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileEdit {
    /// A new tile was created.
    Created(TileId),
    /// The existing tile got a new terrain.
    Updated(TileId),
    /// The existing tile already had this terrain.
    Unchanged(TileId),
}

impl TileEdit {
    /// Id of the created or existing tile.
    pub fn id(&self) -> TileId {
        match *self {
            TileEdit::Created(id) | TileEdit::Updated(id) | TileEdit::Unchanged(id) => id,
        }
    }
}

impl From<TileEdit> for CommandOutcome {
    fn from(edit: TileEdit) -> Self {
        match edit {
            TileEdit::Created(id) => CommandOutcome::TileCreated(id),
            TileEdit::Updated(id) => CommandOutcome::TileUpdated(id),
            TileEdit::Unchanged(id) => CommandOutcome::TileUnchanged(id),
        }
    }
}

/// Hex tile graph.
#[derive(Clone, Debug)]
pub struct TileMap {
    metrics: HexMetrics,
    slots: Vec<Option<Tile>>,
    by_coord: HashMap<HexCoord, TileId>,
    next_id: u32,
    len: usize,
}

impl TileMap {
    /// Creates an empty map whose hexagons have the given edge length.
    pub fn new(tile_edge_length: f32) -> Self {
        Self {
            metrics: HexMetrics::new(tile_edge_length),
            // slot 0 is never used, ids start at 1
            slots: vec![None],
            by_coord: HashMap::new(),
            next_id: 1,
            len: 0,
        }
    }

    /// Hexagon dimensions.
    pub fn metrics(&self) -> &HexMetrics {
        &self.metrics
    }

    /// Number of live tiles.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the map has no tiles.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Id the next created tile will receive.
    pub fn next_id(&self) -> TileId {
        TileId(self.next_id)
    }

    /// Looks up a tile by id.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Whether `id` refers to a live tile.
    pub fn contains(&self, id: TileId) -> bool {
        self.tile(id).is_some()
    }

    /// Tile occupying a grid cell.
    pub fn tile_at(&self, coord: HexCoord) -> Option<TileId> {
        self.by_coord.get(&coord).copied()
    }

    /// Tile whose cell contains a world position.
    pub fn tile_at_world(&self, point: Point) -> Option<TileId> {
        self.tile_at(self.metrics.world_to_id(point))
    }

    /// All live tiles in ascending id order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Every track once, as `(lower id, higher id)` pairs.
    pub fn track_pairs(&self) -> impl Iterator<Item = (TileId, TileId)> + '_ {
        self.tiles().flat_map(|tile| {
            tile.tracks()
                .iter()
                .filter(move |&&other| other > tile.id())
                .map(move |&other| (tile.id(), other))
        })
    }

    /// World centre of a tile.
    pub fn world_of(&self, id: TileId) -> Option<Point> {
        self.tile(id).map(Tile::coord_world)
    }

    // ------------------------------------------------------------------------
    // Tiles
    // ------------------------------------------------------------------------

    /// Creates a tile at `coord`, or repaints the one already there.
    pub fn add_or_update_tile(&mut self, coord: HexCoord, terrain: Terrain) -> TileEdit {
        if let Some(id) = self.tile_at(coord) {
            if let Some(tile) = self.tile_mut(id) {
                if tile.terrain != terrain {
                    tile.terrain = terrain;
                    return TileEdit::Updated(id);
                }
            }
            return TileEdit::Unchanged(id);
        }

        let id = TileId(self.next_id);
        self.next_id += 1;
        let tile = Tile::new(id, coord, self.metrics.id_to_world(coord), terrain);
        self.slots.push(Some(tile));
        self.by_coord.insert(coord, id);
        self.len += 1;
        log::trace!("tile {id} created at {coord:?}");
        TileEdit::Created(id)
    }

    /// Removes a tile and every reciprocal track. Unknown ids are ignored.
    pub fn remove_tile(&mut self, id: TileId) -> Option<Tile> {
        let tile = self.slots.get_mut(id.0 as usize)?.take()?;
        for &neighbor in tile.tracks() {
            if let Some(n) = self.tile_mut(neighbor) {
                n.unlink(id);
            }
        }
        self.by_coord.remove(&tile.coord_id());
        self.len -= 1;
        log::trace!("tile {id} removed");
        Some(tile)
    }

    /// Links two tiles without consulting device capacity. Station layout
    /// uses this; the editor goes through [`add_track`](Self::add_track).
    pub(crate) fn connect(&mut self, a: TileId, b: TileId) {
        if a == b || !self.contains(a) || !self.contains(b) {
            return;
        }
        if let Some(t) = self.tile_mut(a) {
            t.link(b);
        }
        if let Some(t) = self.tile_mut(b) {
            t.link(a);
        }
    }

    /// Detaches every track of a tile, on both sides.
    pub(crate) fn clear_tracks(&mut self, id: TileId) {
        let Some(tile) = self.tile_mut(id) else {
            return;
        };
        let neighbors = core::mem::take(&mut tile.tracks);
        for neighbor in neighbors {
            if let Some(n) = self.tile_mut(neighbor) {
                n.unlink(id);
            }
        }
    }

    pub(crate) fn set_device(&mut self, id: TileId, device: Device) -> bool {
        match self.tile_mut(id) {
            Some(tile) => {
                tile.device = device;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------------

    /// Connects two tiles in both directions.
    ///
    /// Refused when either tile is unknown, when both are the same tile, or
    /// when either endpoint's device cannot take another track.
    pub fn add_track(&mut self, a: TileId, b: TileId) -> CommandOutcome {
        let (Some(ta), Some(tb)) = (self.tile(a), self.tile(b)) else {
            return RejectReason::UnknownTile.into();
        };
        if a == b {
            return RejectReason::SameTile.into();
        }
        if ta.connects_to(b) && tb.connects_to(a) {
            return CommandOutcome::Unchanged;
        }
        if !ta.device().accepts_track(ta.degree()) || !tb.device().accepts_track(tb.degree()) {
            log::debug!("track {a}-{b} rejected: capacity");
            return RejectReason::TrackCapacity.into();
        }

        if let Some(t) = self.tile_mut(a) {
            t.link(b);
        }
        if let Some(t) = self.tile_mut(b) {
            t.link(a);
        }
        CommandOutcome::TrackAdded
    }

    /// Disconnects two tiles. Refused on station and semaphore tiles.
    pub fn remove_track(&mut self, a: TileId, b: TileId) -> CommandOutcome {
        let (Some(ta), Some(tb)) = (self.tile(a), self.tile(b)) else {
            return RejectReason::UnknownTile.into();
        };
        if !ta.device().tracks_removable() || !tb.device().tracks_removable() {
            log::debug!("track {a}-{b} is protected");
            return RejectReason::ProtectedDevice.into();
        }
        if !ta.connects_to(b) && !tb.connects_to(a) {
            return CommandOutcome::Unchanged;
        }

        if let Some(t) = self.tile_mut(a) {
            t.unlink(b);
        }
        if let Some(t) = self.tile_mut(b) {
            t.unlink(a);
        }
        CommandOutcome::TrackRemoved
    }

    /// Picks the tile under `point` and the closest other tile, the pair a
    /// user most likely meant by clicking between two cells.
    pub fn track_at_world(&self, point: Point) -> Option<(TileId, TileId)> {
        let first = self.tile_at_world(point)?;
        let second = self
            .tiles()
            .filter(|t| t.id() != first)
            .map(|t| (t.id(), distance(point, t.coord_world())))
            .min_by(|x, y| x.1.total_cmp(&y.1))?
            .0;
        Some((first, second))
    }

    // ------------------------------------------------------------------------
    // Extrapolation
    // ------------------------------------------------------------------------

    /// Grid cell one step past `cur` when travelling from `prev`, after a
    /// `turn` of 60° right, straight ahead or 60° left.
    pub fn extrapolate(&self, prev: TileId, cur: TileId, turn: Turn) -> Option<HexCoord> {
        let from = self.world_of(prev)?;
        let at = self.world_of(cur)?;
        let heading = angle_to_target(from, at) + turn.delta_angle();
        let ahead = move_point(at, self.metrics.neighbor_spacing(), heading);
        Some(self.metrics.world_to_id(ahead))
    }

    /// Tile at the extrapolated cell, if one exists there.
    ///
    /// This only says where the track would lead geometrically; whether
    /// `cur` actually connects to it is up to the caller.
    pub fn neighbor_toward(&self, prev: TileId, cur: TileId, turn: Turn) -> Option<TileId> {
        self.extrapolate(prev, cur, turn).and_then(|c| self.tile_at(c))
    }

    // ------------------------------------------------------------------------
    // Semaphores
    // ------------------------------------------------------------------------

    /// Places a semaphore facing along the tile's track, or turns an existing
    /// semaphore around.
    pub fn toggle_semaphore(&mut self, id: TileId) -> CommandOutcome {
        let Some(tile) = self.tile(id) else {
            return RejectReason::UnknownTile.into();
        };
        match tile.device() {
            Device::Semaphore { angle_deg, light } => {
                self.set_device(
                    id,
                    Device::Semaphore {
                        angle_deg: (angle_deg + 180).rem_euclid(360),
                        light,
                    },
                );
                CommandOutcome::SignalChanged
            }
            Device::Rail if tile.degree() == 2 => {
                let (Some(first), Some(second)) = (
                    self.world_of(tile.tracks()[0]),
                    self.world_of(tile.tracks()[1]),
                ) else {
                    return RejectReason::UnknownTile.into();
                };
                let angle = angle_to_target(first, second).to_degrees().round() as i32;
                self.place_semaphore(id, angle)
            }
            _ => RejectReason::NotSignalCandidate.into(),
        }
    }

    /// Places a red semaphore facing `angle_deg` on a two-track rail tile.
    pub fn place_semaphore(&mut self, id: TileId, angle_deg: i32) -> CommandOutcome {
        let Some(tile) = self.tile(id) else {
            return RejectReason::UnknownTile.into();
        };
        if tile.device() != Device::Rail || tile.degree() != 2 {
            return RejectReason::NotSignalCandidate.into();
        }
        self.set_device(
            id,
            Device::Semaphore {
                angle_deg: angle_deg.rem_euclid(360),
                light: SignalLight::Red,
            },
        );
        CommandOutcome::SignalChanged
    }

    /// Turns a semaphore back into plain rail.
    pub fn remove_semaphore(&mut self, id: TileId) -> CommandOutcome {
        match self.tile(id).map(Tile::device) {
            None => RejectReason::UnknownTile.into(),
            Some(Device::Semaphore { .. }) => {
                self.set_device(id, Device::Rail);
                CommandOutcome::SignalChanged
            }
            Some(_) => CommandOutcome::Unchanged,
        }
    }

    /// Flips a semaphore between red and green.
    pub fn switch_signal(&mut self, id: TileId) -> CommandOutcome {
        match self.tile(id).map(Tile::device) {
            None => RejectReason::UnknownTile.into(),
            Some(Device::Semaphore { angle_deg, light }) => {
                self.set_device(
                    id,
                    Device::Semaphore {
                        angle_deg,
                        light: light.toggled(),
                    },
                );
                CommandOutcome::SignalChanged
            }
            Some(_) => CommandOutcome::Unchanged,
        }
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(crate::config::MapConfig::default().tile_edge_length)
    }
}
