//! Train kinematics and lifecycle.
//!
//! A [`Train`] moves freely in world space; the tile it occupies is derived
//! from its position every tick. Speed follows the reserved path: the
//! target velocity is the number of reserved tiles capped at
//! `max_velocity`, so a train slows down as it runs out of claimed track and
//! stops when it has none.
//!
//! # Tick phases
//!
//! A tick is split in two so the simulation can replan in between:
//!
//! 1. [`Train::arrive`]: detect tile changes, check for collisions and
//!    consume the waypoint the train just reached.
//! 2. [`Train::drive`]: drop passed route tiles, pick the target velocity,
//!    accelerate, steer and advance.
//!
//! # State machine
//!
//! ```text
//!   Stopped ──(velocity > 0)──▶ Moving
//!      ▲                          │
//!      └─(target = velocity = 0)──┘
//!
//!   any ──(another train on the same tile)──▶ Broken (terminal)
//! ```

use std::collections::VecDeque;

use core::fmt;

use crate::config::TrainConfig;
use crate::geometry::{angle_to_target, move_point, turn_toward, Point};
use crate::map::TileMap;
use crate::reservation::{PlanRequest, RoutePlan};
use crate::route::find_next_track;
use crate::tile::{Rgb, TileId};

/// Number of positions kept in a train's trace.
pub const TRACE_CAPACITY: usize = 100;

/// Colours cycled through by train id.
const PALETTE: [Rgb; 5] = [
    [0, 90, 255],
    [255, 220, 0],
    [255, 140, 0],
    [0, 200, 0],
    [255, 105, 180],
];

/// Colour of a broken train.
const BROKEN_COLOR: Rgb = [220, 0, 0];

/// Stable identifier of a train.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TrainId(pub u32);

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrainState {
    /// Standing still.
    #[default]
    Stopped,
    /// Under way.
    Moving,
    /// Collided with another train. Never left.
    Broken,
}

/// A train on the map.
#[derive(Clone, Debug)]
pub struct Train {
    id: TrainId,
    tile_id: TileId,
    last_tile_id: TileId,
    position: Point,
    heading: f32,
    state: TrainState,
    velocity_current: f32,
    velocity_target: f32,
    max_velocity: f32,
    acceleration: f32,
    turn_rate: f32,
    turn_rate_divisor: f32,
    loop_mode: bool,
    waypoints: VecDeque<TileId>,
    full_route: Vec<TileId>,
    reserved_path: Vec<TileId>,
    trace: heapless::Deque<Point, TRACE_CAPACITY>,
}

impl Train {
    /// Places a train on `tile`, heading away from `last_tile`.
    ///
    /// Returns `None` if either tile does not exist.
    pub fn new(
        map: &TileMap,
        id: TrainId,
        tile: TileId,
        last_tile: TileId,
        config: &TrainConfig,
    ) -> Option<Self> {
        let position = map.world_of(tile)?;
        let from = map.world_of(last_tile)?;

        Some(Self {
            id,
            tile_id: tile,
            last_tile_id: last_tile,
            position,
            heading: angle_to_target(from, position),
            state: TrainState::Stopped,
            velocity_current: 0.0,
            velocity_target: 0.0,
            max_velocity: config.max_velocity,
            acceleration: config.acceleration,
            turn_rate: 0.0,
            turn_rate_divisor: config.turn_rate_divisor,
            loop_mode: false,
            waypoints: VecDeque::new(),
            full_route: Vec::new(),
            reserved_path: Vec::new(),
            trace: heapless::Deque::new(),
        })
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// First half of a tick.
    ///
    /// `occupied` holds the current tile of every train, this one included.
    /// Returns true when the head waypoint was reached and consumed; the
    /// caller must then replan every train before calling [`drive`](Self::drive).
    pub fn arrive(&mut self, map: &TileMap, occupied: &[(TrainId, TileId)]) -> bool {
        let here = map.tile_at_world(self.position);
        if let Some(tile) = here {
            if tile != self.tile_id {
                self.last_tile_id = self.tile_id;
                self.tile_id = tile;
            }
        }

        self.check_collisions(occupied);

        match (self.waypoints.front().copied(), here) {
            (Some(waypoint), Some(tile)) if waypoint == tile => {
                self.waypoints.pop_front();
                if self.loop_mode {
                    self.waypoints.push_back(waypoint);
                }
                log::debug!("train {} reached waypoint {waypoint}", self.id);
                true
            }
            _ => false,
        }
    }

    /// Second half of a tick: consume passed tiles, then move.
    pub fn drive(&mut self, map: &TileMap) {
        if let Some(here) = map.tile_at_world(self.position) {
            if self.full_route.first() == Some(&here) {
                self.full_route.remove(0);
            }
            if self.reserved_path.first() == Some(&here) {
                self.reserved_path.remove(0);
            }
        }

        self.velocity_target = (self.reserved_path.len() as f32).min(self.max_velocity);
        self.turn_rate = self.velocity_current / self.turn_rate_divisor;
        self.accelerate();
        self.update_state();

        let aim = match self.reserved_path.first() {
            Some(&next) => map.world_of(next),
            None => find_next_track(map, self.last_tile_id, self.tile_id)
                .and_then(|next| map.world_of(next)),
        };
        if let Some(aim) = aim {
            let wanted = angle_to_target(self.position, aim);
            self.heading = turn_toward(self.heading, wanted, self.turn_rate);
        }

        self.position = move_point(self.position, self.velocity_current, self.heading);
        self.record_trace();
    }

    fn check_collisions(&mut self, occupied: &[(TrainId, TileId)]) {
        let hit = occupied
            .iter()
            .find(|&&(other, tile)| other != self.id && tile == self.tile_id);
        if let Some(&(other, tile)) = hit {
            if self.state != TrainState::Broken {
                log::warn!("train {} collided with train {other} on tile {tile}", self.id);
            }
            self.state = TrainState::Broken;
            self.velocity_target = 0.0;
            self.velocity_current = 0.0;
            self.waypoints.clear();
            self.full_route.clear();
            self.reserved_path.clear();
        }
    }

    fn accelerate(&mut self) {
        if self.state == TrainState::Broken {
            return;
        }
        if self.velocity_target > self.velocity_current {
            self.velocity_current = (self.velocity_current + self.acceleration).min(self.velocity_target);
        } else if self.velocity_target < self.velocity_current {
            self.velocity_current = (self.velocity_current - self.acceleration).max(self.velocity_target);
        }
    }

    fn update_state(&mut self) {
        self.state = match self.state {
            TrainState::Stopped if self.velocity_current != 0.0 => TrainState::Moving,
            TrainState::Moving if self.velocity_target == 0.0 && self.velocity_current == 0.0 => {
                TrainState::Stopped
            }
            other => other,
        };
    }

    fn record_trace(&mut self) {
        if self.trace.is_full() {
            self.trace.pop_front();
        }
        // cannot fail, a slot was just freed
        let _ = self.trace.push_back(self.position);
    }

    // ------------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------------

    /// Snapshot handed to the reservation resolver.
    pub fn plan_request(&self) -> PlanRequest {
        PlanRequest {
            train: self.id,
            tile: self.tile_id,
            last_tile: self.last_tile_id,
            next_waypoint: self.waypoints.front().copied(),
        }
    }

    /// Installs a freshly resolved route and reservation.
    pub fn apply_plan(&mut self, plan: RoutePlan) {
        self.full_route = plan.full_route;
        self.reserved_path = plan.reserved_path;
    }

    // ------------------------------------------------------------------------
    // Waypoints
    // ------------------------------------------------------------------------

    /// Appends a waypoint.
    pub fn add_waypoint(&mut self, tile: TileId) {
        self.waypoints.push_back(tile);
    }

    /// Removes the first occurrence of `tile`. Returns false if absent.
    pub fn remove_waypoint(&mut self, tile: TileId) -> bool {
        match self.waypoints.iter().position(|&w| w == tile) {
            Some(index) => {
                self.waypoints.remove(index);
                true
            }
            None => false,
        }
    }

    /// Flips loop mode and returns the new value.
    pub fn toggle_loop(&mut self) -> bool {
        self.loop_mode = !self.loop_mode;
        self.loop_mode
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Train id.
    pub fn id(&self) -> TrainId {
        self.id
    }

    /// Tile the train is on.
    pub fn tile_id(&self) -> TileId {
        self.tile_id
    }

    /// Tile the train came from.
    pub fn last_tile_id(&self) -> TileId {
        self.last_tile_id
    }

    /// World position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Heading in radians, `[0, 2π)`.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Lifecycle state.
    pub fn state(&self) -> TrainState {
        self.state
    }

    /// True once the train has collided.
    pub fn is_broken(&self) -> bool {
        self.state == TrainState::Broken
    }

    /// Current speed.
    pub fn velocity(&self) -> f32 {
        self.velocity_current
    }

    /// Speed the train is accelerating towards.
    pub fn target_velocity(&self) -> f32 {
        self.velocity_target
    }

    /// Top speed.
    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Speed change per tick.
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Heading change allowed this tick.
    pub fn turn_rate(&self) -> f32 {
        self.turn_rate
    }

    /// Whether consumed waypoints are re-appended.
    pub fn loop_mode(&self) -> bool {
        self.loop_mode
    }

    /// Pending waypoints, next first.
    pub fn waypoints(&self) -> impl Iterator<Item = TileId> + '_ {
        self.waypoints.iter().copied()
    }

    /// Route to the next waypoint.
    pub fn full_route(&self) -> &[TileId] {
        &self.full_route
    }

    /// Claimed prefix of the route.
    pub fn reserved_path(&self) -> &[TileId] {
        &self.reserved_path
    }

    /// Recent positions, oldest first.
    pub fn trace(&self) -> impl Iterator<Item = &Point> + '_ {
        self.trace.iter()
    }

    /// Display colour; red once broken.
    pub fn color(&self) -> Rgb {
        if self.is_broken() {
            BROKEN_COLOR
        } else {
            PALETTE[self.id.0 as usize % PALETTE.len()]
        }
    }

    /// Serializable copy of the train's state.
    pub fn snapshot(&self) -> TrainSnapshot {
        TrainSnapshot {
            id: self.id,
            tile: self.tile_id,
            last_tile: self.last_tile_id,
            position: self.position,
            heading: self.heading,
            state: self.state,
            velocity: self.velocity_current,
            target_velocity: self.velocity_target,
            loop_mode: self.loop_mode,
            waypoints: self.waypoints.iter().copied().collect(),
            full_route: self.full_route.clone(),
            reserved_path: self.reserved_path.clone(),
        }
    }
}

/// Point-in-time view of a train, for UIs and logs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainSnapshot {
    /// Train id.
    pub id: TrainId,
    /// Current tile.
    pub tile: TileId,
    /// Previous tile.
    pub last_tile: TileId,
    /// World position.
    pub position: Point,
    /// Heading in radians.
    pub heading: f32,
    /// Lifecycle state.
    pub state: TrainState,
    /// Current speed.
    pub velocity: f32,
    /// Target speed.
    pub target_velocity: f32,
    /// Loop mode flag.
    pub loop_mode: bool,
    /// Pending waypoints.
    pub waypoints: Vec<TileId>,
    /// Route to the next waypoint.
    pub full_route: Vec<TileId>,
    /// Claimed prefix.
    pub reserved_path: Vec<TileId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HexCoord;
    use crate::reservation::resolve;
    use crate::tile::Terrain;

    fn line(len: i32) -> (TileMap, Vec<TileId>) {
        let mut map = TileMap::new(60.0);
        let ids: Vec<TileId> = (0..len)
            .map(|x| map.add_or_update_tile(HexCoord::new(x, 0), Terrain::Grass).id())
            .collect();
        for pair in ids.windows(2) {
            map.add_track(pair[0], pair[1]);
        }
        (map, ids)
    }

    fn train(map: &TileMap, id: u32, tile: TileId, last: TileId) -> Train {
        Train::new(map, TrainId(id), tile, last, &TrainConfig::default()).unwrap()
    }

    fn replan(map: &TileMap, t: &mut Train) {
        let plans = resolve(map, &[t.plan_request()], 100);
        if let Some(plan) = plans.get(&t.id()).cloned() {
            t.apply_plan(plan);
        }
    }

    #[test]
    fn new_faces_away_from_last_tile() {
        let (map, ids) = line(3);
        let t = train(&map, 1, ids[1], ids[0]);
        assert_eq!(t.heading(), 0.0);
        assert_eq!(t.position(), map.world_of(ids[1]).unwrap());
        assert_eq!(t.state(), TrainState::Stopped);
        assert!(Train::new(&map, TrainId(2), TileId(99), ids[0], &TrainConfig::default()).is_none());
    }

    #[test]
    fn no_reserved_path_means_no_motion() {
        let (map, ids) = line(3);
        let mut t = train(&map, 1, ids[1], ids[0]);
        let start = t.position();
        for _ in 0..10 {
            t.arrive(&map, &[(t.id(), t.tile_id())]);
            t.drive(&map);
        }
        assert_eq!(t.position(), start);
        assert_eq!(t.state(), TrainState::Stopped);
        assert_eq!(t.trace().count(), 10);
    }

    #[test]
    fn accelerates_by_at_most_rate() {
        let (map, ids) = line(8);
        let mut t = train(&map, 1, ids[1], ids[0]);
        t.add_waypoint(ids[7]);
        replan(&map, &mut t);
        assert_eq!(t.reserved_path().len(), 6);

        let mut last = 0.0;
        for _ in 0..30 {
            t.arrive(&map, &[(t.id(), t.tile_id())]);
            t.drive(&map);
            let v = t.velocity();
            assert!(v - last <= t.acceleration() + 1e-6);
            assert!(v <= t.max_velocity());
            last = v;
        }
        assert_eq!(t.state(), TrainState::Moving);
        assert!((t.velocity() - 0.6).abs() < 1e-3);
    }

    #[test]
    fn target_velocity_capped_by_reserved_length() {
        let (map, ids) = line(4);
        let mut t = train(&map, 1, ids[1], ids[0]);
        t.add_waypoint(ids[2]);
        replan(&map, &mut t);
        t.drive(&map);
        assert_eq!(t.target_velocity(), 1.0);
    }

    #[test]
    fn collision_breaks_train() {
        let (map, ids) = line(3);
        let mut t = train(&map, 1, ids[1], ids[0]);
        t.add_waypoint(ids[2]);
        replan(&map, &mut t);

        t.arrive(&map, &[(TrainId(1), ids[1]), (TrainId(2), ids[1])]);
        assert!(t.is_broken());
        assert_eq!(t.waypoints().count(), 0);
        assert!(t.reserved_path().is_empty());
        assert_eq!(t.color(), BROKEN_COLOR);

        // broken trains never accelerate again
        t.apply_plan(RoutePlan {
            full_route: vec![ids[2]],
            reserved_path: vec![ids[2]],
        });
        t.drive(&map);
        assert_eq!(t.velocity(), 0.0);
        assert_eq!(t.state(), TrainState::Broken);
    }

    #[test]
    fn waypoint_loop_mode() {
        let (map, ids) = line(3);
        let mut t = train(&map, 1, ids[1], ids[0]);
        t.add_waypoint(ids[1]);
        t.add_waypoint(ids[2]);
        assert!(t.toggle_loop());

        assert!(t.arrive(&map, &[(t.id(), t.tile_id())]));
        assert_eq!(t.waypoints().collect::<Vec<_>>(), vec![ids[2], ids[1]]);
    }

    #[test]
    fn remove_waypoint_first_occurrence() {
        let (map, ids) = line(3);
        let mut t = train(&map, 1, ids[1], ids[0]);
        for w in [ids[2], ids[0], ids[2]] {
            t.add_waypoint(w);
        }
        assert!(t.remove_waypoint(ids[2]));
        assert_eq!(t.waypoints().collect::<Vec<_>>(), vec![ids[0], ids[2]]);
        assert!(!t.remove_waypoint(TileId(77)));
    }

    #[test]
    fn trace_is_bounded() {
        let (map, ids) = line(2);
        let mut t = train(&map, 1, ids[1], ids[0]);
        for _ in 0..(TRACE_CAPACITY + 20) {
            t.drive(&map);
        }
        assert_eq!(t.trace().count(), TRACE_CAPACITY);
    }

    #[test]
    fn palette_by_id() {
        let (map, ids) = line(2);
        assert_eq!(train(&map, 0, ids[1], ids[0]).color(), PALETTE[0]);
        assert_eq!(train(&map, 6, ids[1], ids[0]).color(), PALETTE[1]);
    }
}
