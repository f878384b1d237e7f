//! Unified numeric constants for the simulation core.
//!
//! All kernels use these constants instead of defining their own.
//! This prevents drift between subsystems and makes tuning easier.

/// Gravity in world units/s², pointing toward negative y.
///
/// Applied by `Simulation::integrate_particles`; the grid kernels never
/// see it directly.
pub const GRAVITY: f32 = -9.81;

/// Accumulated-weight threshold below which a face velocity is treated
/// as unsampled and forced to zero instead of divided.
pub const WEIGHT_EPS: f32 = 1e-9;

/// Squared-distance threshold below which a particle pair is considered
/// coincident and skipped rather than normalised.
pub const DIST_SQ_EPS: f32 = 1e-12;

/// Per-step colour shift: red and green fade down, blue fades up.
pub const COLOR_FADE_STEP: f32 = 0.01;

/// Relative density below which a particle is recoloured as spray.
pub const LOW_DENSITY_THRESHOLD: f32 = 0.7;

/// Red/green level of the low-density highlight colour.
pub const LOW_DENSITY_HIGHLIGHT: f32 = 0.8;

/// Default PIC/FLIP blend (0 = pure PIC, 1 = pure FLIP).
pub const DEFAULT_FLIP_RATIO: f32 = 0.9;

/// Default Gauss-Seidel over-relaxation factor.
pub const DEFAULT_OVER_RELAXATION: f32 = 1.9;
