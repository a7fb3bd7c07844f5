//! Route search over the track graph.
//!
//! Tracks carry no direction, so the search recovers it geometrically: from
//! the heading `prev → cur` it extrapolates the cell a train would reach by
//! bearing right, going straight or bearing left, and accepts a candidate
//! only when `cur` actually has a track to the tile found there. Candidates
//! are tried in [`Turn::SEARCH_ORDER`]; the first branch that reaches the
//! target wins, so the result is not necessarily the shortest route.
//!
//! # Example
//!
//! ```rust
//! use hex_trainz::map::TileMap;
//! use hex_trainz::geometry::HexCoord;
//! use hex_trainz::tile::Terrain;
//! use hex_trainz::route::{find_route, find_next_track};
//!
//! let mut map = TileMap::new(60.0);
//! let ids: Vec<_> = (0..4)
//!     .map(|x| map.add_or_update_tile(HexCoord::new(x, 0), Terrain::Grass).id())
//!     .collect();
//! for pair in ids.windows(2) {
//!     map.add_track(pair[0], pair[1]);
//! }
//!
//! let route = find_route(&map, ids[3], ids[0], ids[1], 100);
//! assert_eq!(route, vec![ids[2], ids[3]]);
//! assert_eq!(find_next_track(&map, ids[0], ids[1]), Some(ids[2]));
//! ```

use crate::map::TileMap;
use crate::tile::TileId;

/// Direction relative to the current heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    /// Bear 60° clockwise.
    Right,
    /// Straight ahead.
    Center,
    /// Bear 60° counter-clockwise.
    Left,
}

impl Turn {
    /// Order in which candidates are tried at every step.
    pub const SEARCH_ORDER: [Turn; 3] = [Turn::Right, Turn::Center, Turn::Left];

    /// Heading change in radians. World `y` grows downwards, so a positive
    /// rotation is clockwise on screen.
    pub fn delta_angle(self) -> f32 {
        match self {
            Turn::Right => core::f32::consts::FRAC_PI_3,
            Turn::Center => 0.0,
            Turn::Left => -core::f32::consts::FRAC_PI_3,
        }
    }
}

/// Non-straight turns taken on the current search branch.
///
/// Each recursion frame links a new node onto its parent's trail, so
/// siblings never see each other's history.
struct Trail<'a> {
    tile: TileId,
    turn: Turn,
    parent: Option<&'a Trail<'a>>,
}

fn trail_contains(mut trail: Option<&Trail<'_>>, tile: TileId, turn: Turn) -> bool {
    while let Some(node) = trail {
        if node.tile == tile && node.turn == turn {
            return true;
        }
        trail = node.parent;
    }
    false
}

/// Tile reached from `cur` by `turn`, if `cur` has a track there.
fn step(map: &TileMap, prev: TileId, cur: TileId, turn: Turn) -> Option<TileId> {
    let next = map.neighbor_toward(prev, cur, turn)?;
    map.tile(cur)?.connects_to(next).then_some(next)
}

/// Searches for a route from `cur` (entered from `prev`) to `target`.
///
/// The result excludes `cur` and ends with `target`. An empty vector means
/// no route was found within `budget` steps, which includes `budget == 0`,
/// unknown tiles and `cur == target`.
pub fn find_route(
    map: &TileMap,
    target: TileId,
    prev: TileId,
    cur: TileId,
    budget: u32,
) -> Vec<TileId> {
    let mut route = search(map, target, prev, cur, None, budget).unwrap_or_default();
    route.reverse();
    route
}

// Builds the route back to front while unwinding.
fn search(
    map: &TileMap,
    target: TileId,
    prev: TileId,
    cur: TileId,
    trail: Option<&Trail<'_>>,
    budget: u32,
) -> Option<Vec<TileId>> {
    if budget == 0 {
        return None;
    }

    for turn in Turn::SEARCH_ORDER {
        let Some(next) = step(map, prev, cur, turn) else {
            continue;
        };
        if next == target {
            return Some(vec![next]);
        }
        if turn != Turn::Center && trail_contains(trail, cur, turn) {
            // same switch, same branch: this is a loop
            return None;
        }

        let node;
        let child = if turn == Turn::Center {
            trail
        } else {
            node = Trail {
                tile: cur,
                turn,
                parent: trail,
            };
            Some(&node)
        };

        if let Some(mut tail) = search(map, target, cur, next, child, budget - 1) {
            tail.push(next);
            return Some(tail);
        }
    }
    None
}

/// First tile reachable from `cur` in search order, ignoring any target.
///
/// Trains without a reserved path use this to keep rolling along
/// unambiguous track.
pub fn find_next_track(map: &TileMap, prev: TileId, cur: TileId) -> Option<TileId> {
    Turn::SEARCH_ORDER
        .into_iter()
        .find_map(|turn| step(map, prev, cur, turn))
}
