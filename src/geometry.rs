//! Hex-grid addressing and angle arithmetic.
//!
//! Tiles are pointy-top hexagons addressed by an offset coordinate
//! ([`HexCoord`]). Odd rows are shifted right by one inner radius. World
//! space is continuous ([`Point`]) with `y` growing downwards, so a positive
//! angle turns clockwise on screen.
//!
//! # Example
//!
//! ```rust
//! use hex_trainz::geometry::{HexCoord, HexMetrics};
//!
//! let metrics = HexMetrics::new(60.0);
//! let coord = HexCoord::new(3, -5);
//! let world = metrics.id_to_world(coord);
//! assert_eq!(metrics.world_to_id(world), coord);
//! ```

use core::f32::consts::{FRAC_PI_2, PI, TAU};

/// √3, used for the hexagon inner radius.
pub const SQRT_3: f32 = 1.732_050_8;

/// Grid identifier of a hex cell (offset coordinates, odd rows shifted).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl HexCoord {
    /// Creates a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the row is shifted by one inner radius.
    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.y.rem_euclid(2) == 1
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Continuous world-space position.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal world coordinate.
    pub x: f32,
    /// Vertical world coordinate (grows downwards).
    pub y: f32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Fixed hexagon dimensions shared by every tile of a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexMetrics {
    /// Length of one hexagon edge.
    pub edge_length: f32,
    /// Centre-to-corner distance (equal to the edge length).
    pub outer_radius: f32,
    /// Centre-to-edge distance.
    pub inner_radius: f32,
}

impl HexMetrics {
    /// Derives the radii from an edge length.
    pub fn new(edge_length: f32) -> Self {
        Self {
            edge_length,
            outer_radius: edge_length,
            inner_radius: edge_length * SQRT_3 / 2.0,
        }
    }

    /// Distance between the centres of two neighbouring tiles.
    #[inline]
    pub fn neighbor_spacing(&self) -> f32 {
        2.0 * self.inner_radius
    }

    /// Centre of a grid cell in world space.
    pub fn id_to_world(&self, coord: HexCoord) -> Point {
        let shift = if coord.is_odd_row() { 1.0 } else { 0.0 };
        Point {
            x: (2.0 * coord.x as f32 + shift) * self.inner_radius,
            y: 1.5 * self.outer_radius * coord.y as f32,
        }
    }

    /// Grid cell containing a world position.
    ///
    /// Row first, then column with the row's parity offset. This is the
    /// exact inverse of [`id_to_world`](Self::id_to_world) for cell centres.
    pub fn world_to_id(&self, point: Point) -> HexCoord {
        let y = (2.0 / 3.0 * point.y / self.outer_radius + 0.5).floor() as i32;
        let column = point.x / self.inner_radius / 2.0;
        let x = if y.rem_euclid(2) == 1 {
            column.floor()
        } else {
            (column + 0.5).floor()
        };
        HexCoord { x: x as i32, y }
    }
}

/// Moves a point by `offset` along `angle` (radians).
#[inline]
pub fn move_point(point: Point, offset: f32, angle: f32) -> Point {
    Point {
        x: point.x + offset * angle.cos(),
        y: point.y + offset * angle.sin(),
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Wraps an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Unsigned angular distance between two angles, in `[0, π]`.
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let diff = (normalize_angle(a) - normalize_angle(b)).abs();
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Heading from `origin` towards `target`, normalized to `[0, 2π)`.
pub fn angle_to_target(origin: Point, target: Point) -> f32 {
    normalize_angle((target.y - origin.y).atan2(target.x - origin.x))
}

/// Quadrant of the unit circle an angle in `[0, 2π)` falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    /// `[0, π/2]`
    First,
    /// `(π/2, π]`
    Second,
    /// `(π, 3π/2]`
    Third,
    /// `(3π/2, 2π)`
    Fourth,
}

impl Quadrant {
    /// Classifies a normalized angle.
    pub fn of(angle: f32) -> Self {
        if angle <= FRAC_PI_2 {
            Quadrant::First
        } else if angle <= PI {
            Quadrant::Second
        } else if angle <= 3.0 * FRAC_PI_2 {
            Quadrant::Third
        } else {
            Quadrant::Fourth
        }
    }
}

/// Rotates `current` towards `target` by at most `max_delta` radians.
///
/// The rotation direction is chosen by comparing the quadrants of both
/// angles so the shorter arc is taken. Once the remaining angular distance
/// is within `max_delta` the result snaps onto `target`, so the heading
/// never overshoots.
///
/// ```rust
/// use hex_trainz::geometry::turn_toward;
///
/// // Crossing zero takes the short way round.
/// let next = turn_toward(0.1, 6.2, 0.05);
/// assert!((next - 0.05).abs() < 1e-6);
///
/// // Close enough: snap.
/// assert_eq!(turn_toward(1.0, 1.02, 0.05), 1.02);
/// ```
pub fn turn_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    use Quadrant::*;

    let current = normalize_angle(current);
    let target = normalize_angle(target);

    if angular_distance(current, target) <= max_delta {
        return target;
    }

    let increase = match (Quadrant::of(target), Quadrant::of(current)) {
        (t, c) if t == c => current < target,
        (First, Second) => false,
        (First, Fourth) => true,
        (First, _) => current > target + PI,
        (Second, First) => true,
        (Second, Third) => false,
        (Second, _) => current > target + PI,
        (Third, Second) => true,
        (Third, Fourth) => false,
        (Third, _) => current > target - PI,
        (Fourth, First) => false,
        (Fourth, Third) => true,
        (Fourth, _) => current > target - PI,
    };

    let step = if increase { max_delta } else { -max_delta };
    normalize_angle(current + step)
}
