//! Component-level kernel tests.
//!
//! Each test pins one contract of a single kernel: boundary enforcement
//! exactness, transfer round-trips, collision clamping, separation
//! behaviour, and colour clamping.

use glam::{Vec2, Vec4};
use slosh::{CellType, Simulation};

const GRID: usize = 24;
const H: f32 = 1.0;
const RADIUS: f32 = 0.3;

fn round_sim() -> Simulation {
    Simulation::new(GRID, GRID, H, RADIUS)
}

/// Every face adjacent to a static-wall cell is exactly zero after
/// boundary enforcement.
#[test]
fn bc_zeroes_faces_next_to_static_wall() {
    let mut sim = round_sim();
    sim.grid.u.fill(1.0);
    sim.grid.v.fill(1.0);
    sim.enforce_face_boundaries();

    let geom = sim.geometry();
    let mut wall_faces = 0;
    for i in 0..GRID as i32 {
        for j in 0..GRID as i32 {
            let idx = geom.cell_index(i as usize, j as usize);
            if sim.domain.is_static_wall(geom, i - 1, j)
                || sim.domain.is_static_wall(geom, i, j)
            {
                assert_eq!(sim.grid.u[idx], 0.0, "u face ({}, {}) not zeroed", i, j);
                wall_faces += 1;
            }
            if sim.domain.is_static_wall(geom, i, j - 1)
                || sim.domain.is_static_wall(geom, i, j)
            {
                assert_eq!(sim.grid.v[idx], 0.0, "v face ({}, {}) not zeroed", i, j);
            }
        }
    }
    assert!(wall_faces > 0, "round scene should have wall faces");

    // A face deep inside the circle is untouched
    let center = geom.cell_index(GRID / 2, GRID / 2);
    assert_eq!(sim.grid.u[center], 1.0);
    assert_eq!(sim.grid.v[center], 1.0);
}

/// Faces adjacent to obstacle cells (and no static cell) take the
/// obstacle velocity exactly; static wins ties.
#[test]
fn bc_imposes_obstacle_velocity() {
    let mut sim = round_sim();
    sim.set_obstacle(sim.domain.center, Vec2::new(0.5, -0.25));
    sim.obstacle.radius = 3.0;
    sim.grid.u.fill(9.9);
    sim.grid.v.fill(9.9);
    sim.enforce_face_boundaries();

    let geom = sim.geometry();
    let mut obstacle_faces = 0;
    for i in 0..GRID as i32 {
        for j in 0..GRID as i32 {
            let idx = geom.cell_index(i as usize, j as usize);
            let u_static = sim.domain.is_static_wall(geom, i - 1, j)
                || sim.domain.is_static_wall(geom, i, j);
            let u_draggable = sim.obstacle.is_draggable_cell(geom, i - 1, j)
                || sim.obstacle.is_draggable_cell(geom, i, j);
            if u_draggable && !u_static {
                assert_eq!(sim.grid.u[idx], 0.5, "u face ({}, {})", i, j);
                obstacle_faces += 1;
            }

            let v_static = sim.domain.is_static_wall(geom, i, j - 1)
                || sim.domain.is_static_wall(geom, i, j);
            let v_draggable = sim.obstacle.is_draggable_cell(geom, i, j - 1)
                || sim.obstacle.is_draggable_cell(geom, i, j);
            if v_draggable && !v_static {
                assert_eq!(sim.grid.v[idx], -0.25, "v face ({}, {})", i, j);
            }
        }
    }
    assert!(obstacle_faces > 0, "obstacle should claim faces");
}

/// A uniform particle velocity field survives P2G: fluid-interior faces
/// carry the common velocity, and G2P with pure PIC reads it back.
#[test]
fn p2g_uniform_velocity_round_trip() {
    let mut sim = Simulation::new(32, 32, 1.0, RADIUS);
    let velocity = Vec2::new(1.2, -0.4);

    // Dense block well inside the circle, two particles per cell axis
    for ix in 0..16 {
        for iy in 0..16 {
            let pos = Vec2::new(12.25 + ix as f32 * 0.5, 12.25 + iy as f32 * 0.5);
            sim.particles.push(pos, velocity);
        }
    }

    sim.particles_to_grid();

    // Faces inside the block hold the common velocity
    let geom = sim.geometry();
    for i in 14..18 {
        for j in 14..18 {
            let idx = geom.cell_index(i, j);
            assert_eq!(sim.grid.cell_type[idx], CellType::Fluid);
            assert!(
                (sim.grid.u[idx] - velocity.x).abs() < 1e-4,
                "u[{}, {}] = {}",
                i,
                j,
                sim.grid.u[idx]
            );
            assert!(
                (sim.grid.v[idx] - velocity.y).abs() < 1e-4,
                "v[{}, {}] = {}",
                i,
                j,
                sim.grid.v[idx]
            );
        }
    }

    sim.grid_to_particles(0.0);
    for vel in &sim.particles.velocities {
        assert!(
            (*vel - velocity).length() < 1e-3,
            "particle velocity {} drifted from {}",
            vel,
            velocity
        );
    }
}

/// With the grid unchanged since the last P2G, pure FLIP is an identity
/// on particle velocities.
#[test]
fn g2p_pure_flip_is_identity() {
    let mut sim = Simulation::new(32, 32, 1.0, RADIUS);
    for ix in 0..8 {
        for iy in 0..8 {
            let pos = Vec2::new(13.0 + ix as f32 * 0.6, 13.0 + iy as f32 * 0.6);
            let vel = Vec2::new(0.1 * ix as f32, -0.07 * iy as f32);
            sim.particles.push(pos, vel);
        }
    }

    // Two consecutive transfers: the second snapshot equals the second
    // transfer result, so the FLIP correction vanishes.
    sim.particles_to_grid();
    sim.particles_to_grid();

    let before = sim.particles.velocities.clone();
    sim.grid_to_particles(1.0);
    for (after, before) in sim.particles.velocities.iter().zip(&before) {
        assert!(
            (*after - *before).length() < 1e-5,
            "pure FLIP changed velocity {} -> {}",
            before,
            after
        );
    }
}

/// A particle leaving the scene circle is projected back onto it with
/// its velocity zeroed.
#[test]
fn wall_collision_projects_to_boundary() {
    let mut sim = round_sim();
    let wall_radius = sim.domain.radius - RADIUS;
    let pos = sim.domain.center + Vec2::new(sim.domain.radius - 0.5 * RADIUS, 0.0);
    sim.particles.push(pos, Vec2::new(1.0, 0.0));

    sim.handle_collisions();

    let dist = (sim.particles.positions[0] - sim.domain.center).length();
    assert!(
        (dist - wall_radius).abs() < 1e-5,
        "particle at distance {}, wall radius {}",
        dist,
        wall_radius
    );
    assert_eq!(sim.particles.velocities[0], Vec2::ZERO);
}

/// A particle overlapping the obstacle is pushed out radially and takes
/// the obstacle velocity.
#[test]
fn obstacle_collision_expels_particle() {
    let mut sim = round_sim();
    let obstacle_velocity = Vec2::new(0.3, 0.1);
    sim.set_obstacle(sim.domain.center, obstacle_velocity);
    sim.obstacle.radius = 2.0;

    let pos = sim.domain.center + Vec2::new(1.0, 0.0);
    sim.particles.push(pos, Vec2::ZERO);
    sim.handle_collisions();

    let dist = (sim.particles.positions[0] - sim.obstacle.center).length();
    assert!(
        (dist - (sim.obstacle.radius + RADIUS)).abs() < 1e-5,
        "expelled to distance {}",
        dist
    );
    assert_eq!(sim.particles.velocities[0], obstacle_velocity);
}

/// Two particles one radius apart end at least a diameter apart after a
/// single separation pass.
#[test]
fn push_apart_separates_touching_pair() {
    let mut sim = round_sim();
    let center = sim.domain.center;
    sim.particles.push(center, Vec2::ZERO);
    sim.particles.push(center + Vec2::new(RADIUS, 0.0), Vec2::ZERO);

    sim.bins.build(&sim.particles.positions);
    sim.push_particles_apart(1);

    let delta = sim.particles.positions[1] - sim.particles.positions[0];
    assert!(
        delta.x >= 2.0 * RADIUS - 1e-5,
        "pair separation {} below diameter",
        delta.x
    );
    assert!(delta.y.abs() < 1e-6, "pair drifted off the x axis");
}

/// Separation is a no-op when every pair already exceeds the diameter.
#[test]
fn push_apart_is_idempotent_when_separated() {
    let mut sim = round_sim();
    let center = sim.domain.center;
    for k in 0..5 {
        sim.particles
            .push(center + Vec2::new(k as f32 * 3.0 * RADIUS, 0.0), Vec2::ZERO);
    }

    sim.bins.build(&sim.particles.positions);
    let before = sim.particles.positions.clone();
    sim.push_particles_apart(3);

    assert_eq!(sim.particles.positions, before);
}

/// Colour kernels clamp every component to [0, 1].
#[test]
fn color_kernels_clamp_components() {
    let mut sim = round_sim();
    let center = sim.domain.center;
    sim.particles.push(center, Vec2::ZERO);
    sim.particles.push(center + Vec2::new(RADIUS, 0.0), Vec2::ZERO);
    sim.particles.colors[0] = Vec4::new(1.5, -0.2, 2.0, 1.0);
    sim.particles.colors[1] = Vec4::new(-1.0, 0.5, -0.01, 1.0);

    sim.update_particle_colors();
    sim.bins.build(&sim.particles.positions);
    sim.diffuse_particle_colors(0.5);

    for color in &sim.particles.colors {
        for c in 0..4 {
            assert!(
                (0.0..=1.0).contains(&color[c]),
                "colour component {} out of range in {}",
                c,
                color
            );
        }
    }
}

/// One particle deposits bilinear weights summing to one, spread over
/// exactly four cells.
#[test]
fn density_grid_sums_to_particle_count() {
    let mut sim = round_sim();
    sim.particles.push(sim.domain.center, Vec2::ZERO);
    sim.update_particle_density();

    let total: f32 = sim.grid.particle_density.iter().sum();
    assert!((total - 1.0).abs() < 1e-5, "density total {}", total);

    let occupied = sim
        .grid
        .particle_density
        .iter()
        .filter(|&&d| d > 0.0)
        .count();
    assert_eq!(occupied, 4);
}
