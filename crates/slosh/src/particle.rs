//! Fluid particles as parallel struct-of-arrays.
//!
//! Positions and velocities are two floats per particle, colours four
//! (RGBA in [0, 1]); the `glam` vectors used here are pod-castable to the
//! flat `f32` layout external drivers exchange.

use glam::{Vec2, Vec4};

/// Initial colour of freshly spawned water.
pub const SPAWN_COLOR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// Particle collection. Arrays stay index-aligned at all times.
#[derive(Default)]
pub struct Particles {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    pub colors: Vec<Vec4>,
}

impl Particles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn push(&mut self, position: Vec2, velocity: Vec2) {
        self.positions.push(position);
        self.velocities.push(velocity);
        self.colors.push(SPAWN_COLOR);
    }

    /// Positions as the flat `[x0, y0, x1, y1, ..]` buffer layout.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Velocities as the flat two-floats-per-particle layout.
    pub fn velocities_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.velocities)
    }

    /// Colours as the flat RGBA layout.
    pub fn colors_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}
