//! Per-tick reservation of track among all trains.
//!
//! [`resolve`] is a pure function of the map and a snapshot of every train.
//! Trains are processed in ascending id order. Each one gets a fresh
//! [`find_route`] to its next waypoint and then claims the longest prefix of
//! that route that is neither occupied by another train nor already claimed
//! by a lower id. Lower ids therefore always win contested track.
//!
//! # Segments
//!
//! Claims are made a block at a time. Tiles with exactly two tracks are
//! collected into a pending segment; the segment is committed when the walk
//! reaches a tile of any other degree (switch, end) or the train's own
//! waypoint. If the walk stops first, the pending segment is dropped, so a
//! train never holds part of a block between two switches.
//!
//! ```rust
//! use hex_trainz::map::TileMap;
//! use hex_trainz::geometry::HexCoord;
//! use hex_trainz::tile::Terrain;
//! use hex_trainz::reservation::{resolve, PlanRequest};
//! use hex_trainz::TrainId;
//!
//! let mut map = TileMap::new(60.0);
//! let ids: Vec<_> = (0..3)
//!     .map(|x| map.add_or_update_tile(HexCoord::new(x, 0), Terrain::Grass).id())
//!     .collect();
//! map.add_track(ids[0], ids[1]);
//! map.add_track(ids[1], ids[2]);
//!
//! let request = PlanRequest {
//!     train: TrainId(1),
//!     tile: ids[1],
//!     last_tile: ids[0],
//!     next_waypoint: Some(ids[2]),
//! };
//! let plans = resolve(&map, &[request], 100);
//! assert_eq!(plans[&TrainId(1)].reserved_path, vec![ids[2]]);
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::map::TileMap;
use crate::route::find_route;
use crate::tile::TileId;
use crate::train::TrainId;

/// What the resolver needs to know about one train.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanRequest {
    /// Train being planned.
    pub train: TrainId,
    /// Tile the train currently occupies.
    pub tile: TileId,
    /// Tile the train came from.
    pub last_tile: TileId,
    /// Head of the train's waypoint list.
    pub next_waypoint: Option<TileId>,
}

/// Route and claimed prefix computed for one train.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutePlan {
    /// Route to the next waypoint, ignoring other trains.
    pub full_route: Vec<TileId>,
    /// Prefix of `full_route` held exclusively by this train.
    pub reserved_path: Vec<TileId>,
}

/// Tile claims made so far during one resolver pass.
#[derive(Clone, Debug, Default)]
pub struct Reservations {
    claims: HashMap<TileId, TrainId>,
}

impl Reservations {
    /// Empty claim table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Train holding `tile`, if any.
    pub fn claimant(&self, tile: TileId) -> Option<TrainId> {
        self.claims.get(&tile).copied()
    }

    /// Whether a train other than `train` holds `tile`.
    pub fn is_held_by_other(&self, tile: TileId, train: TrainId) -> bool {
        self.claimant(tile).is_some_and(|holder| holder != train)
    }

    /// Records `tiles` as held by `train`.
    pub fn claim(&mut self, train: TrainId, tiles: &[TileId]) {
        for &tile in tiles {
            self.claims.insert(tile, train);
        }
    }

    /// Number of claimed tiles.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// True when nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Walks `full_route` and returns the prefix `request.train` may claim.
///
/// `occupied` lists every train's current tile. The caller is responsible
/// for recording the result in `reservations`.
pub fn free_path(
    map: &TileMap,
    request: &PlanRequest,
    full_route: &[TileId],
    occupied: &[(TrainId, TileId)],
    reservations: &Reservations,
) -> Vec<TileId> {
    let mut free = Vec::new();
    let mut segment = Vec::new();

    for &tile in full_route {
        let degree = map.tile(tile).map_or(0, |t| t.degree());
        if degree != 2 {
            free.append(&mut segment);
        }

        if let Some(&(other, _)) = occupied
            .iter()
            .find(|&&(train, at)| train != request.train && at == tile)
        {
            log::trace!("train {} blocked at tile {tile} by train {other}", request.train);
            break;
        }
        if reservations.is_held_by_other(tile, request.train) {
            log::trace!(
                "train {} lost tile {tile} to train {:?}",
                request.train,
                reservations.claimant(tile)
            );
            break;
        }
        segment.push(tile);

        if request.next_waypoint == Some(tile) {
            free.append(&mut segment);
        }
    }
    free
}

/// Recomputes routes and reservations for every train.
///
/// Requests may arrive in any order; they are processed by ascending train
/// id. The returned plans satisfy two properties: each `reserved_path` is a
/// prefix of its `full_route`, and no tile appears in two trains'
/// `reserved_path`.
pub fn resolve(
    map: &TileMap,
    requests: &[PlanRequest],
    budget: u32,
) -> BTreeMap<TrainId, RoutePlan> {
    let mut ordered = requests.to_vec();
    ordered.sort_by_key(|r| r.train);
    let occupied: Vec<(TrainId, TileId)> = ordered.iter().map(|r| (r.train, r.tile)).collect();

    let mut reservations = Reservations::new();
    let mut plans = BTreeMap::new();

    for request in &ordered {
        let full_route = match request.next_waypoint {
            Some(target) => find_route(map, target, request.last_tile, request.tile, budget),
            None => Vec::new(),
        };
        let reserved_path = free_path(map, request, &full_route, &occupied, &reservations);
        reservations.claim(request.train, &reserved_path);

        plans.insert(
            request.train,
            RoutePlan {
                full_route,
                reserved_path,
            },
        );
    }

    log::debug!(
        "resolved {} trains, {} tiles reserved",
        plans.len(),
        reservations.len()
    );
    plans
}
