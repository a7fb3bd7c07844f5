//! Tile records: terrain, device role and track adjacency.
//!
//! A [`Tile`] is one hex cell of the track network. Its [`Device`] decides
//! how many tracks it accepts and whether the editor may remove them; its
//! [`RailType`] is derived from the device and the number of tracks only.
//!
//! # Device rules
//!
//! | Device | Capacity | Editor may add | Editor may remove |
//! |--------|----------|----------------|-------------------|
//! | [`Device::Rail`] | 3 | yes | yes |
//! | [`Device::Station`] | 2 | yes | no |
//! | [`Device::Semaphore`] | 2 | no | no |

use core::fmt;

use crate::geometry::{HexCoord, Point};

/// RGB colour handed to renderers.
pub type Rgb = [u8; 3];

/// Stable identifier of a tile inside a [`TileMap`](crate::map::TileMap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ground cover of a tile. Cosmetic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Terrain {
    /// Default meadow.
    #[default]
    Grass,
    /// Snowfield.
    Snow,
    /// Desert sand.
    Sand,
    /// Deep water.
    Water,
    /// Shallow water.
    Shallow,
    /// Paved ground, used under stations.
    Concrete,
    /// Paved ground under shallow water.
    SubmergedConcrete,
    /// Woodland.
    Forest,
    /// Snow-covered woodland.
    SnowForest,
    /// Red regolith.
    Mars,
}

impl Terrain {
    /// Base colour for rendering this terrain.
    pub const fn base_color(&self) -> Rgb {
        match self {
            Terrain::Grass => [60, 140, 60],
            Terrain::Snow => [235, 240, 245],
            Terrain::Sand => [210, 190, 130],
            Terrain::Water => [20, 60, 140],
            Terrain::Shallow => [60, 120, 170],
            Terrain::Concrete => [130, 130, 130],
            Terrain::SubmergedConcrete => [90, 120, 150],
            Terrain::Forest => [40, 110, 45],
            Terrain::SnowForest => [200, 215, 215],
            Terrain::Mars => [180, 80, 50],
        }
    }
}

/// Light shown by a semaphore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SignalLight {
    /// Stop aspect. New semaphores start red.
    #[default]
    Red,
    /// Proceed aspect.
    Green,
}

impl SignalLight {
    /// The other aspect.
    pub const fn toggled(self) -> Self {
        match self {
            SignalLight::Red => SignalLight::Green,
            SignalLight::Green => SignalLight::Red,
        }
    }
}

/// Role of a tile in the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Device {
    /// Plain track, freely editable.
    #[default]
    Rail,
    /// Platform track. Topology belongs to the station complex.
    Station,
    /// Signal on a two-track rail tile.
    Semaphore {
        /// Direction the light faces, in degrees `[0, 360)`.
        angle_deg: i32,
        /// Current aspect.
        light: SignalLight,
    },
}

impl Device {
    /// Maximum number of tracks this device is meant to carry.
    pub const fn track_capacity(&self) -> usize {
        match self {
            Device::Rail => 3,
            Device::Station | Device::Semaphore { .. } => 2,
        }
    }

    /// Whether the editor may attach one more track to a tile that
    /// currently has `current` tracks.
    pub const fn accepts_track(&self, current: usize) -> bool {
        match self {
            Device::Rail | Device::Station => current < self.track_capacity(),
            Device::Semaphore { .. } => false,
        }
    }

    /// Whether the editor may detach tracks from this tile.
    pub const fn tracks_removable(&self) -> bool {
        matches!(self, Device::Rail)
    }

    /// Classifies a tile carrying `tracks` tracks.
    pub const fn rail_type(&self, tracks: usize) -> RailType {
        if tracks > self.track_capacity() {
            return RailType::Error;
        }
        match tracks {
            0 => RailType::None,
            1 => RailType::End,
            2 => RailType::Rail,
            _ => RailType::Switch,
        }
    }

    /// True for [`Device::Semaphore`].
    pub const fn is_semaphore(&self) -> bool {
        matches!(self, Device::Semaphore { .. })
    }
}

/// Track classification derived from device and degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RailType {
    /// No track.
    None,
    /// Dead end, one track.
    End,
    /// Through track, two tracks.
    Rail,
    /// Junction, three tracks.
    Switch,
    /// More tracks than the device allows. Tolerated, never repaired.
    Error,
}

/// One hex cell of the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    id: TileId,
    coord_id: HexCoord,
    coord_world: Point,
    /// Ground cover.
    pub terrain: Terrain,
    pub(crate) device: Device,
    pub(crate) tracks: Vec<TileId>,
}

impl Tile {
    pub(crate) fn new(id: TileId, coord_id: HexCoord, coord_world: Point, terrain: Terrain) -> Self {
        Self {
            id,
            coord_id,
            coord_world,
            terrain,
            device: Device::Rail,
            tracks: Vec::new(),
        }
    }

    /// Stable id.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Grid coordinate.
    pub fn coord_id(&self) -> HexCoord {
        self.coord_id
    }

    /// World-space centre, derived from the grid coordinate.
    pub fn coord_world(&self) -> Point {
        self.coord_world
    }

    /// Device role.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Tiles this one is connected to, in insertion order.
    pub fn tracks(&self) -> &[TileId] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn degree(&self) -> usize {
        self.tracks.len()
    }

    /// Whether a track to `other` exists.
    pub fn connects_to(&self, other: TileId) -> bool {
        self.tracks.contains(&other)
    }

    /// Derived classification.
    pub fn rail_type(&self) -> RailType {
        self.device.rail_type(self.tracks.len())
    }

    /// Colour for rendering.
    pub fn color(&self) -> Rgb {
        self.terrain.base_color()
    }

    pub(crate) fn link(&mut self, other: TileId) {
        if !self.tracks.contains(&other) {
            self.tracks.push(other);
        }
    }

    pub(crate) fn unlink(&mut self, other: TileId) {
        self.tracks.retain(|&t| t != other);
    }
}
