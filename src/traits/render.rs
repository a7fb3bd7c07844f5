//! Rendering abstraction for the simulation scene.
//!
//! This module defines the [`SceneRenderer`] trait. Renderers only ever get
//! shared references, so they cannot change the map or the trains.

use crate::simulation::Simulation;
use crate::tile::Tile;
use crate::train::Train;

/// Draws a simulation frame.
///
/// Implementors provide backend-specific drawing (a window, a terminal, an
/// image buffer). [`render_scene`] calls the methods in a fixed order:
/// `begin_frame`, every tile, every track once, every train, `end_frame`.
///
/// # Example
///
/// ```rust
/// use hex_trainz::traits::{render_scene, SceneRenderer};
/// use hex_trainz::tile::Tile;
/// use hex_trainz::{SimConfig, Simulation, Train};
///
/// #[derive(Default)]
/// struct Counter {
///     tiles: usize,
/// }
///
/// impl SceneRenderer for Counter {
///     type Error = ();
///
///     fn begin_frame(&mut self) -> Result<(), ()> { Ok(()) }
///     fn draw_tile(&mut self, _tile: &Tile) -> Result<(), ()> {
///         self.tiles += 1;
///         Ok(())
///     }
///     fn draw_track(&mut self, _a: &Tile, _b: &Tile) -> Result<(), ()> { Ok(()) }
///     fn draw_train(&mut self, _train: &Train) -> Result<(), ()> { Ok(()) }
///     fn end_frame(&mut self) -> Result<(), ()> { Ok(()) }
/// }
///
/// let sim = Simulation::generated(SimConfig::default());
/// let mut counter = Counter::default();
/// render_scene(&sim, &mut counter).unwrap();
/// assert_eq!(counter.tiles, sim.map().len());
/// ```
pub trait SceneRenderer {
    /// Error type for drawing operations.
    type Error;

    /// Starts a new frame.
    fn begin_frame(&mut self) -> Result<(), Self::Error>;

    /// Draws one tile: position, colour, device and signal state.
    fn draw_tile(&mut self, tile: &Tile) -> Result<(), Self::Error>;

    /// Draws the track between two tiles. Called once per track.
    fn draw_track(&mut self, a: &Tile, b: &Tile) -> Result<(), Self::Error>;

    /// Draws a train together with its paths, waypoints and trace.
    fn draw_train(&mut self, train: &Train) -> Result<(), Self::Error>;

    /// Finishes the frame.
    fn end_frame(&mut self) -> Result<(), Self::Error>;
}

/// Walks the scene and hands every element to `renderer`.
///
/// Stops at the first drawing error.
pub fn render_scene<R: SceneRenderer>(sim: &Simulation, renderer: &mut R) -> Result<(), R::Error> {
    let map = sim.map();
    renderer.begin_frame()?;

    for tile in map.tiles() {
        renderer.draw_tile(tile)?;
    }
    for (a, b) in map.track_pairs() {
        if let (Some(a), Some(b)) = (map.tile(a), map.tile(b)) {
            renderer.draw_track(a, b)?;
        }
    }
    for train in sim.trains() {
        renderer.draw_train(train)?;
    }

    renderer.end_frame()
}
