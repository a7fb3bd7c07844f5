//! Procedural startup map.
//!
//! [`generate`] lays down a small hand-made network (a branching line next
//! to a strip of water), fills a rectangle with grass and scatters station
//! complexes using a seeded [`ChaCha8Rng`], so a given seed always produces
//! the same map.
//!
//! # Station layout
//!
//! A station is `tracks` parallel rows of `length + 4` tiles each:
//!
//! ```text
//!  rail  rail+S  station ... station  rail+S  rail
//!   0      1       2    ...  len+1    len+2   len+3
//! ```
//!
//! The two outer tiles at each end are plain rail on grass, the rest are
//! station tiles on concrete. Tiles 1 and `len + 2` carry red semaphores
//! facing out of the station.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::geometry::HexCoord;
use crate::map::TileMap;
use crate::tile::{Device, Terrain};

/// Direction in which station rows extend from their origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StationOrientation {
    /// Rows run towards +x, stacked towards +y.
    #[default]
    Forward,
    /// Rows run towards -x, stacked towards -y.
    Reversed,
}

impl StationOrientation {
    /// Semaphore angle at the far end of a row, in degrees.
    pub const fn angle_deg(self) -> i32 {
        match self {
            StationOrientation::Forward => 0,
            StationOrientation::Reversed => 180,
        }
    }

    fn sign(self) -> i32 {
        match self {
            StationOrientation::Forward => 1,
            StationOrientation::Reversed => -1,
        }
    }
}

/// Tiles of the seed network and their ground cover.
const SEED_TILES: [((i32, i32), Terrain); 19] = [
    ((0, 0), Terrain::Water),
    ((1, 0), Terrain::Grass),
    ((2, 0), Terrain::Snow),
    ((3, 0), Terrain::Grass),
    ((4, 0), Terrain::Snow),
    ((5, 0), Terrain::Grass),
    ((6, 0), Terrain::Grass),
    ((0, 1), Terrain::Grass),
    ((0, 2), Terrain::Snow),
    ((0, 3), Terrain::Grass),
    ((0, 4), Terrain::Grass),
    ((0, 5), Terrain::Grass),
    ((-1, 0), Terrain::Water),
    ((-2, 0), Terrain::Water),
    ((0, -1), Terrain::Water),
    ((0, -2), Terrain::Water),
    ((4, 1), Terrain::Snow),
    ((5, 1), Terrain::Grass),
    ((6, 1), Terrain::Grass),
];

/// Tracks of the seed network.
const SEED_TRACKS: [((i32, i32), (i32, i32)); 13] = [
    ((1, 0), (2, 0)),
    ((1, 0), (0, 1)),
    ((2, 0), (3, 0)),
    ((3, 0), (4, 0)),
    ((4, 0), (5, 0)),
    ((4, 0), (4, 1)),
    ((5, 0), (6, 0)),
    ((0, 1), (0, 2)),
    ((0, 2), (0, 3)),
    ((0, 3), (0, 4)),
    ((0, 4), (0, 5)),
    ((4, 1), (5, 1)),
    ((5, 1), (6, 1)),
];

/// Builds the startup map.
pub fn generate(config: &SimConfig) -> TileMap {
    let mut map = TileMap::new(config.map.tile_edge_length);
    seed_network(&mut map);

    let layout = &config.generator;
    for x in layout.fill_columns.0..layout.fill_columns.1 {
        for y in layout.fill_rows.0..layout.fill_rows.1 {
            let coord = HexCoord::new(x, y);
            if map.tile_at(coord).is_none() {
                map.add_or_update_tile(coord, Terrain::Grass);
            }
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(layout.seed);
    for _ in 0..layout.station_count {
        let origin = HexCoord::new(
            -50 + 10 * rng.gen_range(0..=10),
            -5 - 5 * rng.gen_range(0..=10),
        );
        let orientation = if rng.gen_bool(0.5) {
            StationOrientation::Reversed
        } else {
            StationOrientation::Forward
        };
        create_station(
            &mut map,
            origin,
            orientation,
            layout.station_tracks,
            layout.station_length,
        );
    }

    log::info!(
        "generated map with {} tiles ({} stations, seed {})",
        map.len(),
        layout.station_count,
        layout.seed
    );
    map
}

fn seed_network(map: &mut TileMap) {
    for (coord, terrain) in SEED_TILES {
        map.add_or_update_tile(coord.into(), terrain);
    }
    for (a, b) in SEED_TRACKS {
        if let (Some(a), Some(b)) = (map.tile_at(a.into()), map.tile_at(b.into())) {
            map.add_track(a, b);
        }
    }
}

/// Lays down a station complex starting at `origin`.
///
/// Existing tiles under the complex are reused but lose their old tracks
/// and device. Returns the number of tiles the complex covers.
pub fn create_station(
    map: &mut TileMap,
    origin: HexCoord,
    orientation: StationOrientation,
    tracks: usize,
    length: usize,
) -> usize {
    let row_len = length + 4;
    let sign = orientation.sign();
    let out = orientation.angle_deg();
    let mut covered = 0;

    for track in 0..tracks {
        let mut row = Vec::with_capacity(row_len);
        for tile in 0..row_len {
            let coord = HexCoord::new(
                origin.x + sign * tile as i32,
                origin.y + sign * track as i32,
            );
            let lead = tile < 2 || tile >= length + 2;
            let (terrain, device) = if lead {
                (Terrain::Grass, Device::Rail)
            } else {
                (Terrain::Concrete, Device::Station)
            };

            let id = map.add_or_update_tile(coord, terrain).id();
            map.clear_tracks(id);
            map.set_device(id, device);
            if let Some(&prev) = row.last() {
                map.connect(prev, id);
            }
            row.push(id);
        }

        map.place_semaphore(row[1], out + 180);
        map.place_semaphore(row[length + 2], out);
        covered += row.len();
    }

    log::debug!("station at {origin:?} ({orientation:?}): {covered} tiles");
    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{RailType, SignalLight};

    #[test]
    fn same_seed_same_map() {
        let config = SimConfig::default();
        let a = generate(&config);
        let b = generate(&config);
        assert_eq!(a.len(), b.len());
        let pairs_a: Vec<_> = a.track_pairs().collect();
        let pairs_b: Vec<_> = b.track_pairs().collect();
        assert_eq!(pairs_a, pairs_b);
    }

    #[test]
    fn seed_network_is_connected() {
        let config = SimConfig::default();
        let map = generate(&config);
        let junction = map.tile_at(HexCoord::new(4, 0)).unwrap();
        assert_eq!(map.tile(junction).unwrap().rail_type(), RailType::Switch);
        let end = map.tile_at(HexCoord::new(6, 1)).unwrap();
        assert_eq!(map.tile(end).unwrap().rail_type(), RailType::End);
        assert_eq!(map.tile(junction).unwrap().terrain, Terrain::Snow);
    }

    #[test]
    fn station_rows() {
        let mut map = TileMap::new(60.0);
        let covered = create_station(&mut map, HexCoord::new(0, 0), StationOrientation::Forward, 2, 3);
        assert_eq!(covered, 14);
        assert_eq!(map.len(), 14);

        let at = |x, y| map.tile(map.tile_at(HexCoord::new(x, y)).unwrap()).unwrap();
        assert_eq!(at(0, 0).device(), Device::Rail);
        assert_eq!(at(0, 0).rail_type(), RailType::End);
        assert_eq!(
            at(1, 0).device(),
            Device::Semaphore {
                angle_deg: 180,
                light: SignalLight::Red
            }
        );
        assert_eq!(at(2, 1).device(), Device::Station);
        assert_eq!(at(2, 1).terrain, Terrain::Concrete);
        assert_eq!(
            at(5, 1).device(),
            Device::Semaphore {
                angle_deg: 0,
                light: SignalLight::Red
            }
        );
        // rows are not linked to each other
        assert!(!at(2, 0).connects_to(at(2, 1).id()));
    }

    #[test]
    fn reversed_station_grows_backwards() {
        let mut map = TileMap::new(60.0);
        create_station(&mut map, HexCoord::new(0, 0), StationOrientation::Reversed, 1, 2);
        assert!(map.tile_at(HexCoord::new(-5, 0)).is_some());
        assert!(map.tile_at(HexCoord::new(1, 0)).is_none());
        let first = map.tile(map.tile_at(HexCoord::new(-1, 0)).unwrap()).unwrap();
        assert_eq!(
            first.device(),
            Device::Semaphore {
                angle_deg: 0,
                light: SignalLight::Red
            }
        );
    }

    #[test]
    fn station_over_existing_track() {
        let mut map = TileMap::new(60.0);
        let a = map.add_or_update_tile(HexCoord::new(3, -1), Terrain::Grass).id();
        let b = map.add_or_update_tile(HexCoord::new(3, 0), Terrain::Grass).id();
        map.add_track(a, b);

        create_station(&mut map, HexCoord::new(0, 0), StationOrientation::Forward, 1, 4);
        assert!(map.tile(a).unwrap().tracks().is_empty());
        assert_eq!(map.tile(b).unwrap().device(), Device::Station);
        assert_eq!(map.tile(b).unwrap().degree(), 2);
    }
}
