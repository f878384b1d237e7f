//! Diagnostic accessors for tests and headless drivers.

use super::Simulation;
use crate::grid::CellType;

impl Simulation {
    /// Sum of |divergence| over interior fluid cells.
    pub fn total_divergence(&self) -> f32 {
        self.fold_divergence(0.0, |acc, div| acc + div.abs())
    }

    /// Largest |divergence| over interior fluid cells.
    pub fn max_divergence(&self) -> f32 {
        self.fold_divergence(0.0, |acc, div| acc.max(div.abs()))
    }

    fn fold_divergence(&self, init: f32, fold: impl Fn(f32, f32) -> f32) -> f32 {
        let geom = self.grid.geometry;
        let n = geom.num_y;
        let mut acc = init;
        for i in 1..geom.num_x - 1 {
            for j in 1..geom.num_y - 1 {
                let idx = i * n + j;
                if self.grid.cell_type[idx] != CellType::Fluid {
                    continue;
                }
                let div = (self.grid.u[idx + n] - self.grid.u[idx])
                    + (self.grid.v[idx + 1] - self.grid.v[idx]);
                acc = fold(acc, div);
            }
        }
        acc
    }

    /// Particle kinetic energy, unit mass per particle.
    pub fn kinetic_energy(&self) -> f32 {
        self.particles
            .velocities
            .iter()
            .map(|v| 0.5 * v.length_squared())
            .sum()
    }

    /// Fastest particle speed.
    pub fn max_velocity(&self) -> f32 {
        self.particles
            .velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0f32, f32::max)
    }

    /// CFL number `v_max * dt / h`; below 1 keeps particles from crossing
    /// more than a cell per step.
    pub fn cfl_number(&self, dt: f32) -> f32 {
        self.max_velocity() * dt * self.grid.geometry.inv_h
    }
}
