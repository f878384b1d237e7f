//! Particle density estimate on cell centres.
//!
//! Each particle deposits bilinear weights into the four cell centres
//! around it; the per-cell total approximates local particle packing.
//! The projection subtracts `(density - rest_density)` from the
//! divergence of over-packed cells to counter particle drift.

use super::Simulation;
use crate::grid::CellType;

impl Simulation {
    /// Rebuild the cell-centred particle density grid.
    pub fn update_particle_density(&mut self) {
        let geom = self.grid.geometry;
        let h = geom.h;
        let half = 0.5 * h;
        let inv_h = geom.inv_h;
        let n = geom.num_y;
        let density = &mut self.grid.particle_density;

        density.fill(0.0);

        for &pos in &self.particles.positions {
            let x = pos.x.clamp(h, (geom.num_x - 1) as f32 * h) - half;
            let y = pos.y.clamp(h, (geom.num_y - 1) as f32 * h) - half;

            let x0 = (x * inv_h).floor() as i32;
            let y0 = (y * inv_h).floor() as i32;
            let tx = (x - x0 as f32 * h) * inv_h;
            let ty = (y - y0 as f32 * h) * inv_h;

            // The clamps keep the quad inside the grid; float rounding at
            // the rim still gets skipped rather than scattered wild.
            if x0 < 0
                || x0 >= geom.num_x as i32 - 1
                || y0 < 0
                || y0 >= geom.num_y as i32 - 1
            {
                continue;
            }

            let sx = 1.0 - tx;
            let sy = 1.0 - ty;
            let base = x0 as usize * n + y0 as usize;
            density[base] += sx * sy;
            density[base + n] += tx * sy;
            density[base + n + 1] += tx * ty;
            density[base + 1] += sx * ty;
        }
    }

    /// First-step rest-density estimate: the mean density over fluid
    /// cells. Frozen once set; this is what arms drift compensation.
    pub(super) fn bootstrap_rest_density(&mut self) {
        if self.rest_density != 0.0 {
            return;
        }
        let grid = &self.grid;
        let mut sum = 0.0;
        let mut fluid_cells = 0usize;
        for (density, cell) in grid.particle_density.iter().zip(&grid.cell_type) {
            if *cell == CellType::Fluid {
                sum += density;
                fluid_cells += 1;
            }
        }
        if fluid_cells > 0 {
            self.rest_density = sum / fluid_cells as f32;
        }
    }
}
