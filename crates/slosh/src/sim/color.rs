//! Particle colour processing (visual only).
//!
//! Two independent passes. The per-step update fades red/green down and
//! blue up, then recolours particles sitting in low-density cells as
//! spray; it is independent per particle and runs in parallel. Pairwise
//! diffusion blends neighbouring colours toward their mean over the same
//! bin traversal as particle separation and stays serial because both
//! endpoints of a pair are written.

use glam::Vec4;
use rayon::prelude::*;

use super::Simulation;
use crate::physics::{
    COLOR_FADE_STEP, DIST_SQ_EPS, LOW_DENSITY_HIGHLIGHT, LOW_DENSITY_THRESHOLD, WEIGHT_EPS,
};

impl Simulation {
    /// Per-step fade plus low-density highlight.
    pub fn update_particle_colors(&mut self) {
        let geom = self.grid.geometry;
        let rest_density = self.rest_density;
        let density = &self.grid.particle_density;
        let fade = Vec4::new(COLOR_FADE_STEP, COLOR_FADE_STEP, -COLOR_FADE_STEP, 0.0);

        self.particles
            .colors
            .par_iter_mut()
            .zip(self.particles.positions.par_iter())
            .for_each(|(color, &pos)| {
                *color = (*color - fade).clamp(Vec4::ZERO, Vec4::ONE);

                if rest_density > WEIGHT_EPS {
                    let (xi, yi) = geom.pos_to_cell(pos);
                    let relative = density[geom.cell_index(xi, yi)] / rest_density;
                    if relative < LOW_DENSITY_THRESHOLD {
                        *color = Vec4::new(
                            LOW_DENSITY_HIGHLIGHT,
                            LOW_DENSITY_HIGHLIGHT,
                            1.0,
                            1.0,
                        );
                    }
                }
            });
    }

    /// Blend each close pair's colours toward their mean with the given
    /// coefficient in [0, 1].
    pub fn diffuse_particle_colors(&mut self, coeff: f32) {
        if self.particles.is_empty() {
            return;
        }
        let min_dist = 2.0 * self.particle_radius;
        let min_dist_sq = min_dist * min_dist;
        let bins = &self.bins;
        let positions = &self.particles.positions;
        let colors = &mut self.particles.colors;
        let num_particles = positions.len();

        for i in 0..num_particles {
            let (bx, by) = bins.bin_coords(positions[i]);
            let x0 = bx.saturating_sub(1);
            let x1 = (bx + 1).min(bins.num_x - 1);
            let y0 = by.saturating_sub(1);
            let y1 = (by + 1).min(bins.num_y - 1);

            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    let bin = bins.bin_index(cx, cy);
                    let start = bins.first_cell[bin];
                    let end = bins.first_cell[bin + 1];
                    if start < 0 || end < start || end as usize > num_particles {
                        continue;
                    }

                    for k in start..end {
                        let j = bins.cell_ids[k as usize];
                        if j < 0 || j as usize >= num_particles {
                            continue;
                        }
                        let j = j as usize;
                        if j == i {
                            continue;
                        }

                        let dist_sq = (positions[j] - positions[i]).length_squared();
                        if dist_sq < min_dist_sq && dist_sq > DIST_SQ_EPS {
                            let mean = (colors[i] + colors[j]) * 0.5;
                            colors[i] = (colors[i] + (mean - colors[i]) * coeff)
                                .clamp(Vec4::ZERO, Vec4::ONE);
                            colors[j] = (colors[j] + (mean - colors[j]) * coeff)
                                .clamp(Vec4::ZERO, Vec4::ONE);
                        }
                    }
                }
            }
        }
    }
}
