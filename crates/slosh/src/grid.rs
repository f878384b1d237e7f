//! Staggered MAC grid storage and scene geometry.
//!
//! Layout follows the wire contract shared with external drivers:
//! - all grid buffers are `num_x * num_y` floats, column-major
//!   (`idx = i * num_y + j`)
//! - `u[i, j]` lives on the left face of cell `(i, j)`, `v[i, j]` on the
//!   bottom face
//! - pressure, the `s` mask, cell types and the particle density estimate
//!   are cell-centred
//!
//! The scene is a circle inset into the grid; cells whose centre falls
//! outside it form the static wall. A second, draggable circle acts as an
//! obstacle whose velocity is imposed on adjacent faces.

use bytemuck::Contiguous;
use glam::Vec2;

/// Cell classification used by the projection and transfer kernels.
///
/// The discriminants are part of the buffer contract with external
/// drivers and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Contiguous)]
#[repr(i32)]
pub enum CellType {
    /// Contains fluid particles
    Fluid = 0,
    /// Empty air
    Air = 1,
    /// Static solid - blocks flow
    Solid = 2,
}

/// Fixed index space of the fluid grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub num_x: usize,
    pub num_y: usize,
    pub h: f32,
    pub inv_h: f32,
}

impl GridGeometry {
    pub fn new(num_x: usize, num_y: usize, h: f32) -> Self {
        assert!(num_x >= 3 && num_y >= 3, "grid must be at least 3x3");
        assert!(h > 0.0, "cell size must be positive");
        Self {
            num_x,
            num_y,
            h,
            inv_h: 1.0 / h,
        }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.num_x * self.num_y
    }

    /// Column-major cell index.
    #[inline]
    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.num_x && j < self.num_y);
        i * self.num_y + j
    }

    /// World position of the centre of cell `(i, j)`.
    #[inline]
    pub fn cell_center(&self, i: i32, j: i32) -> Vec2 {
        Vec2::new(
            (i as f32 + 0.5) * self.h,
            (j as f32 + 0.5) * self.h,
        )
    }

    /// Cell containing a world position, clamped to the index range.
    #[inline]
    pub fn pos_to_cell(&self, pos: Vec2) -> (usize, usize) {
        let i = (pos.x * self.inv_h).floor() as i32;
        let j = (pos.y * self.inv_h).floor() as i32;
        (
            i.clamp(0, self.num_x as i32 - 1) as usize,
            j.clamp(0, self.num_y as i32 - 1) as usize,
        )
    }

    #[inline]
    pub fn in_range(&self, i: i32, j: i32) -> bool {
        i >= 0 && i < self.num_x as i32 && j >= 0 && j < self.num_y as i32
    }

    /// World extent of the grid.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.num_x as f32 * self.h, self.num_y as f32 * self.h)
    }
}

/// The static circular wall enclosing the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub center: Vec2,
    pub radius: f32,
}

impl Domain {
    /// Largest circle that fits the grid with a one-cell inset.
    pub fn inset(geometry: GridGeometry) -> Self {
        let size = geometry.size();
        Self {
            center: size * 0.5,
            radius: 0.5 * size.x.min(size.y) - geometry.h,
        }
    }

    /// A cell is part of the static wall when it is outside the index
    /// range or its centre lies outside the scene circle.
    #[inline]
    pub fn is_static_wall(&self, geometry: GridGeometry, i: i32, j: i32) -> bool {
        if !geometry.in_range(i, j) {
            return true;
        }
        let d = geometry.cell_center(i, j) - self.center;
        d.length_squared() > self.radius * self.radius
    }
}

/// The draggable circular obstacle.
///
/// When active, faces adjacent to cells strictly inside the obstacle take
/// its velocity during boundary enforcement, and overlapping particles are
/// pushed out with their velocity overwritten.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub active: bool,
    pub center: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
}

impl Obstacle {
    pub fn inactive(radius: f32) -> Self {
        Self {
            active: false,
            center: Vec2::ZERO,
            radius,
            velocity: Vec2::ZERO,
        }
    }

    /// A cell is draggable when the obstacle is active, the cell is in
    /// range, and its centre lies strictly inside the obstacle circle.
    #[inline]
    pub fn is_draggable_cell(&self, geometry: GridGeometry, i: i32, j: i32) -> bool {
        if !self.active || !geometry.in_range(i, j) {
            return false;
        }
        let d = geometry.cell_center(i, j) - self.center;
        d.length_squared() < self.radius * self.radius
    }
}

/// The full grid-side buffer set.
///
/// Every buffer keeps the wire-compatible layout; kernels mutate only the
/// buffers their contract designates.
pub struct FluidGrid {
    pub geometry: GridGeometry,

    /// Face velocities (x on left faces, y on bottom faces)
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    /// Snapshot of `u`, `v` taken at the start of P2G; consumed by the
    /// FLIP correction and the solid-face restore
    pub prev_u: Vec<f32>,
    pub prev_v: Vec<f32>,
    /// Bilinear weight accumulators for P2G normalisation
    pub du: Vec<f32>,
    pub dv: Vec<f32>,

    /// Pressure. Never zeroed by the kernels; it warm-starts across steps.
    pub pressure: Vec<f32>,
    /// Static solid mask: 0 = solid, positive = open. Doubles as the
    /// stencil weight in the pressure solve.
    pub s: Vec<f32>,
    /// Per-step classification derived from `s` and particle occupancy
    pub cell_type: Vec<CellType>,
    /// Cell-centred bilinear particle counts
    pub particle_density: Vec<f32>,
}

impl FluidGrid {
    pub fn new(geometry: GridGeometry) -> Self {
        let n = geometry.cell_count();
        Self {
            geometry,
            u: vec![0.0; n],
            v: vec![0.0; n],
            prev_u: vec![0.0; n],
            prev_v: vec![0.0; n],
            du: vec![0.0; n],
            dv: vec![0.0; n],
            pressure: vec![0.0; n],
            s: vec![1.0; n],
            cell_type: vec![CellType::Air; n],
            particle_density: vec![0.0; n],
        }
    }

    /// Write the `s` mask for a round scene: wall cells get 0, everything
    /// inside the circle gets 1.
    pub fn set_round_scene(&mut self, domain: Domain) {
        for i in 0..self.geometry.num_x {
            for j in 0..self.geometry.num_y {
                let idx = self.geometry.cell_index(i, j);
                self.s[idx] = if domain.is_static_wall(self.geometry, i as i32, j as i32) {
                    0.0
                } else {
                    1.0
                };
            }
        }
    }

    /// Cold-start the solver. `step()` never calls this; callers that do
    /// not want the warm-started pressure field opt in explicitly.
    pub fn clear_pressure(&mut self) {
        self.pressure.fill(0.0);
    }

    #[inline]
    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        self.geometry.cell_index(i, j)
    }
}
