//! Collaborator seams.
//!
//! The simulation core has no window, input or drawing code of its own.
//! Frontends plug in through the traits here and mutate state only via
//! [`EditorCommand`](crate::EditorCommand)s.
//!
//! # Submodules
//!
//! - `render`: [`SceneRenderer`] and the [`render_scene`] walker

pub mod render;

pub use render::*;
