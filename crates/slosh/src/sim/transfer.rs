//! Particle-grid velocity transfer (P2G, G2P).
//!
//! Both directions treat the x- and y-components independently with the
//! same staggered bilinear stencil:
//! - x faces sample at `(i*h, (j+0.5)*h)`
//! - y faces sample at `((i+0.5)*h, j*h)`
//!
//! P2G snapshots the grid, reclassifies cells, scatters weighted particle
//! velocities, normalises, and restores solid faces from the snapshot.
//! G2P gathers a PIC velocity and a FLIP correction per particle and
//! blends them with `flip_ratio`.

use glam::Vec2;
use rayon::prelude::*;

use super::Simulation;
use crate::grid::{CellType, GridGeometry};
use crate::physics::WEIGHT_EPS;

/// Bilinear stencil of one velocity component around one particle.
struct FaceStencil {
    nodes: [usize; 4],
    weights: [f32; 4],
}

/// Corner indices and weights for component `comp` (0 = x, 1 = y).
///
/// The position is clamped one cell into the grid so every corner of the
/// containing quad is a valid column-major index.
#[inline]
fn face_stencil(geom: GridGeometry, pos: Vec2, comp: usize) -> FaceStencil {
    let h = geom.h;
    let half = 0.5 * h;
    let (dx_offset, dy_offset) = if comp == 0 { (0.0, half) } else { (half, 0.0) };

    let px = pos.x.clamp(h, (geom.num_x - 1) as f32 * h);
    let py = pos.y.clamp(h, (geom.num_y - 1) as f32 * h);

    let fx = (px - dx_offset) * geom.inv_h;
    let fy = (py - dy_offset) * geom.inv_h;
    let x0 = fx.floor().min((geom.num_x - 2) as f32) as usize;
    let y0 = fy.floor().min((geom.num_y - 2) as f32) as usize;
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;
    let sx = 1.0 - tx;
    let sy = 1.0 - ty;

    let n = geom.num_y;
    let base = x0 * n + y0;
    FaceStencil {
        nodes: [base, base + n, base + n + 1, base + 1],
        weights: [sx * sy, tx * sy, tx * ty, sx * ty],
    }
}

/// Scatter one velocity component into its face grid and the matching
/// weight accumulator. Different particles hit the same faces, so this
/// stays serial.
fn accumulate_component(
    geom: GridGeometry,
    comp: usize,
    f: &mut [f32],
    df: &mut [f32],
    positions: &[Vec2],
    velocities: &[Vec2],
) {
    for (pos, vel) in positions.iter().zip(velocities) {
        let stencil = face_stencil(geom, *pos, comp);
        let pv = vel[comp];
        for k in 0..4 {
            f[stencil.nodes[k]] += pv * stencil.weights[k];
            df[stencil.nodes[k]] += stencil.weights[k];
        }
    }
}

/// A corner sample is usable when the cell it sits in is not air, or the
/// cell on the other side of the face is not air. The face-normal
/// neighbour differs by component: one column for x faces, one row for
/// y faces.
#[inline]
fn sample_is_valid(cell_type: &[CellType], node: usize, face_offset: usize) -> bool {
    if cell_type[node] != CellType::Air {
        return true;
    }
    node >= face_offset && cell_type[node - face_offset] != CellType::Air
}

/// Gather one velocity component back onto the particles, blending the
/// grid value (PIC) with the particle's corrected velocity (FLIP).
fn blend_component(
    geom: GridGeometry,
    comp: usize,
    f: &[f32],
    prev_f: &[f32],
    cell_type: &[CellType],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    flip_ratio: f32,
) {
    let face_offset = if comp == 0 { geom.num_y } else { 1 };

    for (pos, vel) in positions.iter().zip(velocities.iter_mut()) {
        let stencil = face_stencil(geom, *pos, comp);

        let mut weight_sum = 0.0;
        let mut valid = [0.0f32; 4];
        for k in 0..4 {
            if sample_is_valid(cell_type, stencil.nodes[k], face_offset) {
                valid[k] = 1.0;
                weight_sum += stencil.weights[k];
            }
        }

        if weight_sum > WEIGHT_EPS {
            let mut pic = 0.0;
            let mut corr = 0.0;
            for k in 0..4 {
                let vw = valid[k] * stencil.weights[k];
                let node = stencil.nodes[k];
                pic += vw * f[node];
                corr += vw * (f[node] - prev_f[node]);
            }
            pic /= weight_sum;
            corr /= weight_sum;

            let flip = vel[comp] + corr;
            vel[comp] = (1.0 - flip_ratio) * pic + flip_ratio * flip;
        }
        // Otherwise every corner is deep in air; the particle keeps its
        // prior velocity.
    }
}

impl Simulation {
    /// P2G transfer. Also derives this step's cell classification:
    /// solid from the `s` mask first, then fluid from particle occupancy.
    pub fn particles_to_grid(&mut self) {
        let geom = self.grid.geometry;
        let grid = &mut self.grid;

        // 1. Snapshot face velocities and clear the working buffers.
        std::mem::swap(&mut grid.prev_u, &mut grid.u);
        std::mem::swap(&mut grid.prev_v, &mut grid.v);
        grid.u.fill(0.0);
        grid.v.fill(0.0);
        grid.du.fill(0.0);
        grid.dv.fill(0.0);

        // 2. Reclassify: solid where the mask says so, air elsewhere.
        grid.cell_type
            .par_iter_mut()
            .zip(grid.s.par_iter())
            .for_each(|(cell, &s)| {
                *cell = if s == 0.0 { CellType::Solid } else { CellType::Air };
            });

        // 3. Cells containing particles become fluid unless solid.
        for &pos in &self.particles.positions {
            let (xi, yi) = geom.pos_to_cell(pos);
            let cell = geom.cell_index(xi, yi);
            if grid.cell_type[cell] == CellType::Air {
                grid.cell_type[cell] = CellType::Fluid;
            }
        }

        // 4. Scatter particle velocities and bilinear weights.
        accumulate_component(
            geom,
            0,
            &mut grid.u,
            &mut grid.du,
            &self.particles.positions,
            &self.particles.velocities,
        );
        accumulate_component(
            geom,
            1,
            &mut grid.v,
            &mut grid.dv,
            &self.particles.positions,
            &self.particles.velocities,
        );

        // 5. Normalise: a face with no contribution stays zero.
        grid.u
            .par_iter_mut()
            .zip(grid.du.par_iter())
            .for_each(|(f, &w)| {
                *f = if w > WEIGHT_EPS { *f / w } else { 0.0 };
            });
        grid.v
            .par_iter_mut()
            .zip(grid.dv.par_iter())
            .for_each(|(f, &w)| {
                *f = if w > WEIGHT_EPS { *f / w } else { 0.0 };
            });

        // 6. Faces touching solid cells get their snapshot values back.
        let num_y = geom.num_y;
        let cell_type = &grid.cell_type;
        let prev_u = &grid.prev_u;
        let prev_v = &grid.prev_v;

        grid.u
            .par_chunks_mut(num_y)
            .enumerate()
            .for_each(|(i, u_col)| {
                for (j, u) in u_col.iter_mut().enumerate() {
                    let idx = i * num_y + j;
                    let solid = cell_type[idx] == CellType::Solid;
                    let left_solid = i > 0 && cell_type[idx - num_y] == CellType::Solid;
                    if solid || left_solid {
                        *u = prev_u[idx];
                    }
                }
            });
        grid.v
            .par_chunks_mut(num_y)
            .enumerate()
            .for_each(|(i, v_col)| {
                for (j, v) in v_col.iter_mut().enumerate() {
                    let idx = i * num_y + j;
                    let solid = cell_type[idx] == CellType::Solid;
                    let bottom_solid = j > 0 && cell_type[idx - 1] == CellType::Solid;
                    if solid || bottom_solid {
                        *v = prev_v[idx];
                    }
                }
            });
    }

    /// G2P transfer with PIC/FLIP blending.
    ///
    /// `flip_ratio = 0` takes the grid velocity outright; `flip_ratio = 1`
    /// keeps the particle velocity plus the grid's change since P2G.
    /// Reads depend on the fully formed grid, so this runs serially.
    pub fn grid_to_particles(&mut self, flip_ratio: f32) {
        let geom = self.grid.geometry;
        blend_component(
            geom,
            0,
            &self.grid.u,
            &self.grid.prev_u,
            &self.grid.cell_type,
            &self.particles.positions,
            &mut self.particles.velocities,
            flip_ratio,
        );
        blend_component(
            geom,
            1,
            &self.grid.v,
            &self.grid.prev_v,
            &self.grid.cell_type,
            &self.particles.positions,
            &mut self.particles.velocities,
            flip_ratio,
        );
    }
}
