//! Particle collision response against the obstacle and the scene wall.
//!
//! Obstacle first: overlapping particles are pushed radially out to the
//! combined radius and take the obstacle's velocity. Wall second:
//! particles outside the inset circle are projected back onto it with
//! their velocity zeroed, so the wall wins when both fire. Each particle
//! writes only its own state; the kernel parallelises over particles.

use glam::Vec2;
use rayon::prelude::*;

use super::Simulation;
use crate::physics::DIST_SQ_EPS;

impl Simulation {
    pub fn handle_collisions(&mut self) {
        let obstacle = self.obstacle;
        let domain = self.domain;
        let r = self.particle_radius;

        let push_radius = obstacle.radius + r;
        let push_radius_sq = push_radius * push_radius;
        let wall_radius = domain.radius - r;
        let wall_radius_sq = wall_radius * wall_radius;

        self.particles
            .positions
            .par_iter_mut()
            .zip(self.particles.velocities.par_iter_mut())
            .for_each(|(pos, vel)| {
                if obstacle.active {
                    let delta = *pos - obstacle.center;
                    let dist_sq = delta.length_squared();
                    if dist_sq < push_radius_sq && dist_sq > DIST_SQ_EPS {
                        let dist = dist_sq.sqrt();
                        *pos += delta * ((push_radius - dist) / dist);
                        *vel = obstacle.velocity;
                    }
                }

                let delta = *pos - domain.center;
                let dist_sq = delta.length_squared();
                if dist_sq > wall_radius_sq && dist_sq > DIST_SQ_EPS {
                    let dist = dist_sq.sqrt();
                    *pos -= delta * ((dist - wall_radius) / dist);
                    *vel = Vec2::ZERO;
                }
            });
    }
}
