//! Test doubles for the collaborator traits.
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockRenderer`] | [`SceneRenderer`] | Records every draw call |
//!
//! # Example
//!
//! ```rust
//! use hex_trainz::mock::MockRenderer;
//! use hex_trainz::traits::render_scene;
//! use hex_trainz::{SimConfig, Simulation};
//!
//! let sim = Simulation::generated(SimConfig::default());
//! let mut renderer = MockRenderer::new();
//! render_scene(&sim, &mut renderer).unwrap();
//!
//! assert_eq!(renderer.frames, 1);
//! assert_eq!(renderer.tiles.len(), sim.map().len());
//! assert_eq!(renderer.tracks.len(), sim.map().track_pairs().count());
//! ```
//!
//! [`SceneRenderer`]: crate::traits::SceneRenderer

use crate::tile::{Device, Rgb, Tile, TileId};
use crate::train::{Train, TrainId, TrainState};

/// What the mock saw of one train.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnTrain {
    /// Train id.
    pub id: TrainId,
    /// Colour at draw time.
    pub color: Rgb,
    /// State at draw time.
    pub state: TrainState,
    /// Length of the reserved path.
    pub reserved: usize,
}

/// Mock renderer for testing.
///
/// Records every call in public fields for inspection.
#[derive(Debug, Default)]
pub struct MockRenderer {
    /// Completed frames.
    pub frames: usize,
    /// Tiles drawn in the current frame, with their device.
    pub tiles: Vec<(TileId, Device)>,
    /// Tracks drawn in the current frame.
    pub tracks: Vec<(TileId, TileId)>,
    /// Trains drawn in the current frame.
    pub trains: Vec<DrawnTrain>,
    /// Whether a frame is open.
    pub in_frame: bool,
    /// Fail the next train draw, to exercise error propagation.
    pub fail_on_train: bool,
}

impl MockRenderer {
    /// Creates a new mock renderer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl crate::traits::SceneRenderer for MockRenderer {
    type Error = ();

    fn begin_frame(&mut self) -> Result<(), ()> {
        self.tiles.clear();
        self.tracks.clear();
        self.trains.clear();
        self.in_frame = true;
        Ok(())
    }

    fn draw_tile(&mut self, tile: &Tile) -> Result<(), ()> {
        self.tiles.push((tile.id(), tile.device()));
        Ok(())
    }

    fn draw_track(&mut self, a: &Tile, b: &Tile) -> Result<(), ()> {
        self.tracks.push((a.id(), b.id()));
        Ok(())
    }

    fn draw_train(&mut self, train: &Train) -> Result<(), ()> {
        if self.fail_on_train {
            return Err(());
        }
        self.trains.push(DrawnTrain {
            id: train.id(),
            color: train.color(),
            state: train.state(),
            reserved: train.reserved_path().len(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), ()> {
        self.in_frame = false;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::EditorCommand;
    use crate::config::SimConfig;
    use crate::simulation::Simulation;
    use crate::traits::render_scene;

    fn sim_with_train() -> Simulation {
        let mut sim = Simulation::generated(SimConfig::default());
        let map = sim.map();
        let tile = map.tile_at((2, 0).into()).unwrap();
        let last = map.tile_at((1, 0).into()).unwrap();
        sim.apply_command(EditorCommand::SpawnTrain {
            tile,
            last_tile: last,
        });
        sim
    }

    #[test]
    fn records_trains() {
        let sim = sim_with_train();
        let mut renderer = MockRenderer::new();
        render_scene(&sim, &mut renderer).unwrap();
        assert_eq!(renderer.trains.len(), 1);
        assert_eq!(renderer.trains[0].state, TrainState::Stopped);
        assert!(!renderer.in_frame);
    }

    #[test]
    fn error_aborts_frame() {
        let sim = sim_with_train();
        let mut renderer = MockRenderer::new();
        renderer.fail_on_train = true;
        assert_eq!(render_scene(&sim, &mut renderer), Err(()));
        assert!(renderer.in_frame);
        assert_eq!(renderer.frames, 0);
    }

    #[test]
    fn semaphores_visible_to_renderer() {
        let sim = Simulation::generated(SimConfig::default());
        let mut renderer = MockRenderer::new();
        render_scene(&sim, &mut renderer).unwrap();
        assert!(renderer.tiles.iter().any(|(_, d)| d.is_semaphore()));
    }
}
