//! End-to-end scenarios for the simulation: single trains, contested
//! junctions, collisions and topology edits while trains are under way.

use std::collections::HashSet;

use hex_trainz::{
    CommandOutcome, EditorCommand, HexCoord, SimConfig, Simulation, Terrain, TileId, TrainId,
    TrainState,
};

// ============================================================================
// Helpers
// ============================================================================

fn paint(sim: &mut Simulation, x: i32, y: i32) -> TileId {
    sim.apply_command(EditorCommand::PaintTile {
        coord: HexCoord::new(x, y),
        terrain: Terrain::Grass,
    })
    .tile_id()
    .unwrap()
}

fn track(sim: &mut Simulation, a: TileId, b: TileId) {
    assert_eq!(
        sim.apply_command(EditorCommand::AddTrack { a, b }),
        CommandOutcome::TrackAdded
    );
}

fn spawn(sim: &mut Simulation, tile: TileId, last_tile: TileId) -> TrainId {
    sim.apply_command(EditorCommand::SpawnTrain { tile, last_tile })
        .train_id()
        .unwrap()
}

fn waypoint(sim: &mut Simulation, train: TrainId, tile: TileId) {
    assert_eq!(
        sim.apply_command(EditorCommand::AddWaypoint { train, tile }),
        CommandOutcome::WaypointAdded
    );
}

/// Straight line of tiles along row 0, fully tracked.
fn line(sim: &mut Simulation, len: i32) -> Vec<TileId> {
    let ids: Vec<TileId> = (0..len).map(|x| paint(sim, x, 0)).collect();
    for pair in ids.windows(2) {
        track(sim, pair[0], pair[1]);
    }
    ids
}

/// Two branches merging at a switch:
///
/// ```text
///  (0,0)-(1,0)-\
///              S(2,0)-B(3,0)-T(4,0)
///  (1,2)-(1,1)-/
/// ```
struct Junction {
    sim: Simulation,
    first: TrainId,
    second: TrainId,
    switch: TileId,
    block: TileId,
    target: TileId,
}

fn junction() -> Junction {
    let mut sim = Simulation::new(SimConfig::default());
    let west_last = paint(&mut sim, 0, 0);
    let west = paint(&mut sim, 1, 0);
    let south_last = paint(&mut sim, 1, 2);
    let south = paint(&mut sim, 1, 1);
    let switch = paint(&mut sim, 2, 0);
    let block = paint(&mut sim, 3, 0);
    let target = paint(&mut sim, 4, 0);

    track(&mut sim, west_last, west);
    track(&mut sim, south_last, south);
    track(&mut sim, west, switch);
    track(&mut sim, south, switch);
    track(&mut sim, switch, block);
    track(&mut sim, block, target);

    let first = spawn(&mut sim, west, west_last);
    let second = spawn(&mut sim, south, south_last);
    waypoint(&mut sim, first, target);
    waypoint(&mut sim, second, target);

    Junction {
        sim,
        first,
        second,
        switch,
        block,
        target,
    }
}

fn assert_reservations_consistent(sim: &Simulation) {
    let mut claimed = HashSet::new();
    for train in sim.trains() {
        let reserved = train.reserved_path();
        let full = train.full_route();
        assert!(
            full.starts_with(reserved),
            "train {}: {reserved:?} is not a prefix of {full:?}",
            train.id()
        );
        for tile in reserved {
            assert!(
                claimed.insert(*tile),
                "tile {tile} reserved twice at tick {}",
                sim.tick_count()
            );
        }
    }
}

// ============================================================================
// Single Train
// ============================================================================

#[test]
fn train_reaches_adjacent_target_and_stops() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 3);
    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[2]);
    assert_eq!(sim.train(train).unwrap().reserved_path(), &[ids[2]]);

    for _ in 0..300 {
        sim.tick();
    }

    let t = sim.train(train).unwrap();
    assert_eq!(t.tile_id(), ids[2]);
    assert_eq!(t.last_tile_id(), ids[1]);
    assert_eq!(t.state(), TrainState::Stopped);
    assert_eq!(t.velocity(), 0.0);
    assert_eq!(t.waypoints().count(), 0);
    assert!(t.reserved_path().is_empty());
}

#[test]
fn train_moves_once_path_is_reserved() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 6);
    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[5]);

    sim.tick();
    let t = sim.train(train).unwrap();
    assert_eq!(t.state(), TrainState::Moving);
    assert!(t.velocity() > 0.0);
    assert_eq!(t.target_velocity(), t.max_velocity());
}

#[test]
fn loop_mode_keeps_waypoints() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 3);
    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[2]);
    assert_eq!(
        sim.apply_command(EditorCommand::ToggleLoop { train }),
        CommandOutcome::LoopMode(true)
    );

    for _ in 0..300 {
        sim.tick();
    }
    let t = sim.train(train).unwrap();
    assert_eq!(t.tile_id(), ids[2]);
    assert_eq!(t.waypoints().collect::<Vec<_>>(), vec![ids[2]]);
}

// ============================================================================
// Contested Track
// ============================================================================

#[test]
fn lower_id_wins_contested_junction() {
    let j = junction();
    let first = j.sim.train(j.first).unwrap();
    let second = j.sim.train(j.second).unwrap();

    assert_eq!(first.full_route(), &[j.switch, j.block, j.target]);
    assert_eq!(second.full_route(), &[j.switch, j.block, j.target]);
    assert_eq!(first.reserved_path(), &[j.switch, j.block, j.target]);
    assert!(second.reserved_path().is_empty());
}

#[test]
fn head_on_trains_share_single_tile() {
    // both trains head for the plain-rail tile in the middle of the line
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 7);
    let east = spawn(&mut sim, ids[1], ids[0]);
    let west = spawn(&mut sim, ids[5], ids[6]);
    waypoint(&mut sim, east, ids[3]);
    waypoint(&mut sim, west, ids[3]);

    assert_eq!(sim.map().tile(ids[3]).unwrap().degree(), 2);
    assert_eq!(sim.train(east).unwrap().reserved_path(), &[ids[2], ids[3]]);
    assert_eq!(sim.train(west).unwrap().full_route(), &[ids[4], ids[3]]);
    assert!(sim.train(west).unwrap().reserved_path().is_empty());

    let start = sim.train(west).unwrap().position();
    for _ in 0..400 {
        sim.tick();
        assert_reservations_consistent(&sim);
    }

    let t = sim.train(east).unwrap();
    assert_eq!(t.tile_id(), ids[3]);
    assert_eq!(t.state(), TrainState::Stopped);

    // the middle tile stays occupied, so the other train never leaves
    let t = sim.train(west).unwrap();
    assert_eq!(t.position(), start);
    assert_eq!(t.state(), TrainState::Stopped);
    assert!(!sim.trains().any(|t| t.is_broken()));
}

#[test]
fn loser_waits_until_track_clears() {
    let mut j = junction();
    let start = j.sim.train(j.second).unwrap().position();
    j.sim.tick();
    assert_eq!(j.sim.train(j.second).unwrap().position(), start);

    for _ in 0..600 {
        j.sim.tick();
    }
    let first = j.sim.train(j.first).unwrap();
    assert_eq!(first.tile_id(), j.target);
    assert_eq!(first.state(), TrainState::Stopped);

    // the block is only released once the first train sits on the target,
    // and the second train then follows up to the block
    let second = j.sim.train(j.second).unwrap();
    assert_eq!(second.tile_id(), j.block);
    assert_eq!(second.state(), TrainState::Stopped);
}

#[test]
fn reservations_stay_exclusive_and_prefixed() {
    let mut j = junction();
    assert_reservations_consistent(&j.sim);
    for _ in 0..400 {
        j.sim.tick();
        assert_reservations_consistent(&j.sim);
    }
}

#[test]
fn velocity_stays_within_bounds() {
    let mut j = junction();
    let mut last: Vec<(TrainId, f32)> = j.sim.trains().map(|t| (t.id(), t.velocity())).collect();

    for _ in 0..400 {
        j.sim.tick();
        for (train, before) in last.iter_mut() {
            let t = j.sim.train(*train).unwrap();
            assert!(t.velocity() >= 0.0);
            assert!(t.velocity() <= t.max_velocity() + 1e-6);
            if !t.is_broken() {
                assert!((t.velocity() - *before).abs() <= t.acceleration() + 1e-6);
            }
            *before = t.velocity();
        }
    }
}

// ============================================================================
// Collisions
// ============================================================================

#[test]
fn train_placed_on_occupied_tile_breaks_both() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 3);
    let first = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, first, ids[2]);
    let second = spawn(&mut sim, ids[1], ids[2]);

    sim.tick();

    for id in [first, second] {
        let t = sim.train(id).unwrap();
        assert_eq!(t.state(), TrainState::Broken);
        assert_eq!(t.waypoints().count(), 0);
        assert!(t.reserved_path().is_empty());
        assert_eq!(t.velocity(), 0.0);
    }

    // broken is terminal
    for _ in 0..50 {
        sim.tick();
    }
    assert!(sim.trains().all(|t| t.is_broken()));
}

#[test]
fn removing_broken_trains_clears_tile() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 3);
    spawn(&mut sim, ids[1], ids[0]);
    spawn(&mut sim, ids[1], ids[2]);
    sim.tick();

    assert_eq!(
        sim.apply_command(EditorCommand::RemoveTrainsAt { tile: ids[1] }),
        CommandOutcome::TrainsRemoved(2)
    );
    assert_eq!(sim.train_count(), 0);
}

// ============================================================================
// Topology Edits
// ============================================================================

#[test]
fn removed_track_leaves_route() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 6);
    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[5]);
    assert_eq!(sim.train(train).unwrap().full_route(), &ids[2..]);

    assert_eq!(
        sim.apply_command(EditorCommand::RemoveTrack {
            a: ids[3],
            b: ids[4]
        }),
        CommandOutcome::TrackRemoved
    );

    let route = sim.train(train).unwrap().full_route().to_vec();
    assert!(route.is_empty());
    assert!(!route.windows(2).any(|w| w == [ids[3], ids[4]]));
}

#[test]
fn route_takes_remaining_branch_after_edit() {
    // main line with a parallel bypass below it:
    //   (1,0)-(2,0)-(3,0)-(4,0)-(5,0)
    //           \-(2,1)-(3,1)-/
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 6);
    let b1 = paint(&mut sim, 2, 1);
    let b2 = paint(&mut sim, 3, 1);
    track(&mut sim, ids[2], b1);
    track(&mut sim, b1, b2);
    track(&mut sim, b2, ids[4]);

    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[5]);
    let before = sim.train(train).unwrap().full_route().to_vec();
    assert_eq!(before, vec![ids[2], b1, b2, ids[4], ids[5]]);

    sim.apply_command(EditorCommand::RemoveTrack { a: ids[2], b: b1 });
    let after = sim.train(train).unwrap().full_route().to_vec();
    assert_eq!(after, vec![ids[2], ids[3], ids[4], ids[5]]);
    assert!(!after.windows(2).any(|w| w == [ids[2], b1]));
}

#[test]
fn removed_tile_drops_out_of_routes() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 5);
    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[4]);

    assert_eq!(
        sim.apply_command(EditorCommand::RemoveTile { tile: ids[3] }),
        CommandOutcome::TileRemoved(ids[3])
    );
    assert!(sim.train(train).unwrap().full_route().is_empty());
    assert_eq!(sim.map().tile(ids[2]).unwrap().tracks(), &[ids[1]]);
}

// ============================================================================
// Generated Map
// ============================================================================

#[test]
fn generated_map_runs() {
    let mut sim = Simulation::generated(SimConfig::default());
    let map = sim.map();
    let a = map.tile_at(HexCoord::new(1, 0)).unwrap();
    let b = map.tile_at(HexCoord::new(2, 0)).unwrap();
    let target = map.tile_at(HexCoord::new(6, 1)).unwrap();

    let train = spawn(&mut sim, b, a);
    waypoint(&mut sim, train, target);
    for _ in 0..600 {
        sim.tick();
        assert_reservations_consistent(&sim);
    }
    let t = sim.train(train).unwrap();
    assert_eq!(t.tile_id(), target);
    assert_eq!(t.state(), TrainState::Stopped);
}

#[test]
fn spawn_by_world_position() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 3);
    let point = sim.map().world_of(ids[1]).unwrap();
    let outcome = sim.apply_command(EditorCommand::SpawnTrainAt { point });
    let train = sim.train(outcome.train_id().unwrap()).unwrap();
    assert_eq!(train.tile_id(), ids[1]);
}

// ============================================================================
// Snapshots
// ============================================================================

#[cfg(feature = "serde")]
#[test]
fn snapshot_serializes_to_json() {
    let mut sim = Simulation::new(SimConfig::default());
    let ids = line(&mut sim, 3);
    let train = spawn(&mut sim, ids[1], ids[0]);
    waypoint(&mut sim, train, ids[2]);
    sim.tick();

    let value = serde_json::to_value(sim.snapshot()).unwrap();
    assert_eq!(value["tick"], 1);
    assert_eq!(value["trains"][0]["id"], 1);
    assert_eq!(value["trains"][0]["state"], "moving");
    assert_eq!(value["trains"][0]["reserved_path"][0], ids[2].0);
}
