//! Headless run of the round tank scene.
//!
//! Run with: cargo run --release --example round_tank -p slosh

use glam::Vec2;
use slosh::Simulation;
use std::time::Instant;

fn main() {
    const GRID: usize = 96;
    const CELL_SIZE: f32 = 1.0 / GRID as f32;
    const FRAMES: usize = 300;
    const DT: f32 = 1.0 / 60.0;

    let mut sim = Simulation::new(GRID, GRID, CELL_SIZE, 0.3 * CELL_SIZE);

    // Drop a blob of water in the upper half of the tank
    let spawn_center = sim.domain.center + Vec2::new(0.0, 0.4 * sim.domain.radius);
    sim.spawn_disk(spawn_center, 0.45 * sim.domain.radius);
    println!(
        "Round tank {}x{} (h = {}), {} particles",
        GRID,
        GRID,
        CELL_SIZE,
        sim.particles.len()
    );

    let start = Instant::now();
    for frame in 0..FRAMES {
        // Sweep the obstacle through the pool for two seconds, then drop it
        if (60..180).contains(&frame) {
            let t = (frame - 60) as f32 * DT;
            let amplitude = 0.3 * sim.domain.radius;
            let center = sim.domain.center + Vec2::new(amplitude * (1.5 * t).sin(), 0.0);
            let velocity = Vec2::new(1.5 * amplitude * (1.5 * t).cos(), 0.0);
            sim.set_obstacle(center, velocity);
        }
        if frame == 180 {
            sim.clear_obstacle();
        }

        sim.step(DT);

        if frame % 60 == 0 {
            println!(
                "  frame {:3}: max |div| = {:.4}, kinetic energy = {:.4}, CFL = {:.2}",
                frame,
                sim.max_divergence(),
                sim.kinetic_energy(),
                sim.cfl_number(DT)
            );
        }
    }

    let elapsed = start.elapsed();
    println!("\n{} frames in {:.2?}", FRAMES, elapsed);
    println!(
        "avg frame time: {:.2}ms",
        elapsed.as_secs_f64() * 1000.0 / FRAMES as f64
    );
}
