//! PIC/FLIP simulation facade.
//!
//! `Simulation` owns the grid buffers, the particle arrays, and the
//! neighbour bins, and sequences the kernels once per step:
//!
//! 1. Integrate particles (gravity + advection)
//! 2. Rebuild neighbour bins
//! 3. Particle-to-grid transfer (P2G), including cell reclassification
//! 4. Particle density update (arms drift compensation)
//! 5. Pressure projection + face boundary enforcement
//! 6. Grid-to-particle transfer (G2P) with PIC/FLIP blending
//! 7. Particle separation
//! 8. Obstacle/wall collision response
//! 9. Colour update and diffusion
//!
//! Each kernel is also individually callable for drivers and tests that
//! sequence their own steps. Buffers keep the wire-compatible layout
//! throughout.

mod collision;
mod color;
mod density;
mod diagnostics;
mod pressure;
mod separation;
mod transfer;

use glam::Vec2;
use rand::Rng;
use rayon::prelude::*;

use crate::grid::{Domain, FluidGrid, GridGeometry, Obstacle};
use crate::particle::Particles;
use crate::physics::{DEFAULT_FLIP_RATIO, DEFAULT_OVER_RELAXATION, GRAVITY};
use crate::spatial::ParticleBins;

/// Neighbour bins use slightly more than a particle diameter so a 3x3
/// window always covers every pair within `2 * radius`.
const BIN_SPACING_FACTOR: f32 = 2.2;

pub struct Simulation {
    pub domain: Domain,
    pub obstacle: Obstacle,
    pub grid: FluidGrid,
    pub particles: Particles,
    pub bins: ParticleBins,

    pub particle_radius: f32,
    pub gravity: f32,
    pub flip_ratio: f32,
    pub over_relaxation: f32,
    /// Fluid density entering the pressure scale `density * h / dt`
    pub fluid_density: f32,
    pub pressure_iterations: usize,
    pub separation_iterations: usize,
    pub compensate_drift: bool,
    pub dynamic_colors: bool,
    pub color_diffusion_coeff: f32,
    /// Estimated on the first density update when left at zero
    pub rest_density: f32,
}

impl Simulation {
    /// Round scene: a `num_x x num_y` grid of spacing `h` with the
    /// largest inset circle as the static wall.
    pub fn new(num_x: usize, num_y: usize, h: f32, particle_radius: f32) -> Self {
        assert!(particle_radius > 0.0, "particle radius must be positive");
        let geometry = GridGeometry::new(num_x, num_y, h);
        let domain = Domain::inset(geometry);
        let mut grid = FluidGrid::new(geometry);
        grid.set_round_scene(domain);

        let size = geometry.size();
        let bins = ParticleBins::new(size.x, size.y, BIN_SPACING_FACTOR * particle_radius);

        Self {
            domain,
            obstacle: Obstacle::inactive(0.15 * domain.radius),
            grid,
            particles: Particles::new(),
            bins,
            particle_radius,
            gravity: GRAVITY,
            flip_ratio: DEFAULT_FLIP_RATIO,
            over_relaxation: DEFAULT_OVER_RELAXATION,
            fluid_density: 1000.0,
            pressure_iterations: 50,
            separation_iterations: 2,
            compensate_drift: true,
            dynamic_colors: true,
            color_diffusion_coeff: 0.001,
            rest_density: 0.0,
        }
    }

    #[inline]
    pub fn geometry(&self) -> GridGeometry {
        self.grid.geometry
    }

    /// Run one full simulation step.
    pub fn step(&mut self, dt: f32) {
        self.integrate_particles(dt);
        self.bins.build(&self.particles.positions);

        self.particles_to_grid();
        self.update_particle_density();
        self.bootstrap_rest_density();
        self.solve_incompressibility(self.pressure_iterations, dt);
        self.grid_to_particles(self.flip_ratio);

        self.push_particles_apart(self.separation_iterations);
        self.handle_collisions();

        if self.dynamic_colors {
            self.update_particle_colors();
            self.diffuse_particle_colors(self.color_diffusion_coeff);
        }
    }

    /// Semi-implicit Euler under constant gravity.
    pub fn integrate_particles(&mut self, dt: f32) {
        let g = Vec2::new(0.0, self.gravity * dt);
        self.particles
            .positions
            .par_iter_mut()
            .zip(self.particles.velocities.par_iter_mut())
            .for_each(|(pos, vel)| {
                *vel += g;
                *pos += *vel * dt;
            });
    }

    /// Fill a disk with jittered particles at roughly close packing.
    /// Positions landing outside the scene circle are dropped.
    pub fn spawn_disk(&mut self, center: Vec2, radius: f32) {
        let mut rng = rand::thread_rng();
        let spacing = 2.0 * self.particle_radius;
        let steps = (2.0 * radius / spacing).ceil() as i32;
        let wall_radius = self.domain.radius - self.particle_radius;

        for ix in 0..=steps {
            for iy in 0..=steps {
                let jitter = Vec2::new(
                    (rng.gen::<f32>() - 0.5) * 0.2 * spacing,
                    (rng.gen::<f32>() - 0.5) * 0.2 * spacing,
                );
                let pos = center - Vec2::splat(radius)
                    + Vec2::new(ix as f32, iy as f32) * spacing
                    + jitter;
                let in_disk = (pos - center).length_squared() <= radius * radius;
                let in_scene =
                    (pos - self.domain.center).length_squared() <= wall_radius * wall_radius;
                if in_disk && in_scene {
                    self.particles.push(pos, Vec2::ZERO);
                }
            }
        }
    }

    /// Activate the obstacle at a new position. The velocity is whatever
    /// the drag input derived from pointer motion.
    pub fn set_obstacle(&mut self, center: Vec2, velocity: Vec2) {
        self.obstacle.active = true;
        self.obstacle.center = center;
        self.obstacle.velocity = velocity;
    }

    /// Deactivate the obstacle; its cells stop claiming faces immediately.
    pub fn clear_obstacle(&mut self) {
        self.obstacle.active = false;
        self.obstacle.velocity = Vec2::ZERO;
    }
}
