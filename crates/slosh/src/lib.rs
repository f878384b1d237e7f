//! Round-domain PIC/FLIP fluid simulation core.
//!
//! Particles carry position and velocity; a column-major staggered MAC
//! grid carries face velocities; a serial Gauss-Seidel projection
//! enforces incompressibility with a density-based drift compensation
//! term. The scene is a circle inset into the grid, with an optional
//! draggable circular obstacle whose velocity is imposed on adjacent
//! faces and on overlapping particles.
//!
//! This crate is framework-agnostic - it handles simulation only.
//! Rendering and input capture live with the embedding application.

pub mod grid;
pub mod particle;
pub mod physics;
pub mod sim;
pub mod spatial;

pub use grid::{CellType, Domain, FluidGrid, GridGeometry, Obstacle};
pub use particle::Particles;
pub use sim::Simulation;
pub use spatial::ParticleBins;
