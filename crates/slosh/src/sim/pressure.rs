//! Pressure projection and face boundary enforcement.
//!
//! Phase A reduces divergence over fluid cells with in-place Gauss-Seidel
//! sweeps. The iteration order defines the solver, so the sweeps are
//! strictly serial; each update pushes the correction onto the four faces
//! of the cell, weighted by the neighbours' `s` values.
//!
//! Phase B stamps the boundary policy onto every face: a face touching a
//! static-wall cell is zeroed, a face touching a draggable-obstacle cell
//! takes the obstacle's velocity, and static wins ties. Faces are written
//! by exactly one task, so phase B parallelises over grid columns.

use rayon::prelude::*;

use super::Simulation;
use crate::grid::CellType;
use crate::physics::WEIGHT_EPS;

impl Simulation {
    /// Full projection: Gauss-Seidel sweeps followed by boundary
    /// enforcement on the face velocities.
    pub fn solve_incompressibility(&mut self, num_iters: usize, dt: f32) {
        self.solve_pressure(num_iters, dt);
        self.enforce_face_boundaries();
    }

    /// Phase A: divergence-reduction sweeps.
    ///
    /// When drift compensation is armed (positive rest density), cells
    /// packed above rest density see their divergence reduced, which
    /// pushes particles apart through the projection itself.
    pub fn solve_pressure(&mut self, num_iters: usize, dt: f32) {
        assert!(dt > 0.0, "time step must be positive");
        let geom = self.grid.geometry;
        let n = geom.num_y;
        let pressure_scale = self.fluid_density * geom.h / dt;
        let over_relaxation = self.over_relaxation;
        let compensate = self.compensate_drift && self.rest_density > 0.0;
        let rest_density = self.rest_density;
        let grid = &mut self.grid;

        for _ in 0..num_iters {
            for i in 1..geom.num_x - 1 {
                for j in 1..geom.num_y - 1 {
                    let idx = i * n + j;
                    if grid.cell_type[idx] != CellType::Fluid {
                        continue;
                    }

                    let left = idx - n;
                    let right = idx + n;
                    let bottom = idx - 1;
                    let top = idx + 1;

                    let sx0 = grid.s[left];
                    let sx1 = grid.s[right];
                    let sy0 = grid.s[bottom];
                    let sy1 = grid.s[top];
                    let sum_s = sx0 + sx1 + sy0 + sy1;
                    if sum_s < WEIGHT_EPS {
                        continue;
                    }

                    let mut div =
                        (grid.u[right] - grid.u[idx]) + (grid.v[top] - grid.v[idx]);
                    if compensate {
                        let compression = grid.particle_density[idx] - rest_density;
                        if compression > 0.0 {
                            div -= compression;
                        }
                    }

                    let correction = -div / sum_s * over_relaxation;
                    grid.pressure[idx] += pressure_scale * correction;

                    grid.u[idx] -= sx0 * correction;
                    grid.u[right] += sx1 * correction;
                    grid.v[idx] -= sy0 * correction;
                    grid.v[top] += sy1 * correction;
                }
            }
        }
    }

    /// Phase B: face boundary policy for the static wall and the
    /// draggable obstacle.
    pub fn enforce_face_boundaries(&mut self) {
        let geom = self.grid.geometry;
        let domain = self.domain;
        let obstacle = self.obstacle;
        let num_y = geom.num_y;

        // u faces adjoin cells (i-1, j) and (i, j)
        self.grid
            .u
            .par_chunks_mut(num_y)
            .enumerate()
            .for_each(|(i, u_col)| {
                let i = i as i32;
                for (j, u) in u_col.iter_mut().enumerate() {
                    let j = j as i32;
                    if domain.is_static_wall(geom, i - 1, j)
                        || domain.is_static_wall(geom, i, j)
                    {
                        *u = 0.0;
                    } else if obstacle.is_draggable_cell(geom, i - 1, j)
                        || obstacle.is_draggable_cell(geom, i, j)
                    {
                        *u = obstacle.velocity.x;
                    }
                }
            });

        // v faces adjoin cells (i, j-1) and (i, j)
        self.grid
            .v
            .par_chunks_mut(num_y)
            .enumerate()
            .for_each(|(i, v_col)| {
                let i = i as i32;
                for (j, v) in v_col.iter_mut().enumerate() {
                    let j = j as i32;
                    if domain.is_static_wall(geom, i, j - 1)
                        || domain.is_static_wall(geom, i, j)
                    {
                        *v = 0.0;
                    } else if obstacle.is_draggable_cell(geom, i, j - 1)
                        || obstacle.is_draggable_cell(geom, i, j)
                    {
                        *v = obstacle.velocity.y;
                    }
                }
            });
    }
}
