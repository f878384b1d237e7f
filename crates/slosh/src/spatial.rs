//! Coarse neighbour bins for particle pair queries.
//!
//! An independent grid of square bins accelerates the pair kernels
//! (separation, colour diffusion). Storage is CSR-style and matches the
//! buffer contract: particles in bin `c` occupy
//! `cell_ids[first_cell[c] .. first_cell[c + 1]]`, with column-major bin
//! indexing (`cx * num_y + cy`).
//!
//! The builder is a counting sort that reuses its allocations across
//! steps; the pair kernels treat the result as read-only.

use glam::Vec2;

pub struct ParticleBins {
    pub num_x: usize,
    pub num_y: usize,
    pub inv_spacing: f32,
    /// CSR offsets, `num_x * num_y + 1` entries
    pub first_cell: Vec<i32>,
    /// Particle indices sorted by bin, one entry per particle
    pub cell_ids: Vec<i32>,
}

impl ParticleBins {
    /// Bin grid covering a `width x height` world with square bins of the
    /// given spacing.
    pub fn new(width: f32, height: f32, spacing: f32) -> Self {
        assert!(spacing > 0.0, "bin spacing must be positive");
        let inv_spacing = 1.0 / spacing;
        let num_x = (width * inv_spacing).floor() as usize + 1;
        let num_y = (height * inv_spacing).floor() as usize + 1;
        Self {
            num_x,
            num_y,
            inv_spacing,
            first_cell: vec![0; num_x * num_y + 1],
            cell_ids: Vec::new(),
        }
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.num_x * self.num_y
    }

    /// Bin coordinates of a world position, clamped to the bin range.
    #[inline]
    pub fn bin_coords(&self, pos: Vec2) -> (usize, usize) {
        let x = (pos.x * self.inv_spacing).floor() as i32;
        let y = (pos.y * self.inv_spacing).floor() as i32;
        (
            x.clamp(0, self.num_x as i32 - 1) as usize,
            y.clamp(0, self.num_y as i32 - 1) as usize,
        )
    }

    #[inline]
    pub fn bin_index(&self, cx: usize, cy: usize) -> usize {
        cx * self.num_y + cy
    }

    /// Rebuild the CSR index with a counting sort over the current
    /// particle positions.
    pub fn build(&mut self, positions: &[Vec2]) {
        let bin_count = self.bin_count();
        self.first_cell.fill(0);
        self.cell_ids.resize(positions.len(), 0);

        // Count particles per bin
        for &pos in positions {
            let (cx, cy) = self.bin_coords(pos);
            let bin = self.bin_index(cx, cy);
            self.first_cell[bin] += 1;
        }

        // Prefix-sum into end offsets
        let mut sum = 0;
        for c in 0..bin_count {
            sum += self.first_cell[c];
            self.first_cell[c] = sum;
        }
        self.first_cell[bin_count] = sum;

        // Scatter ids, rewinding each bin's cursor to its start
        for (id, &pos) in positions.iter().enumerate() {
            let (cx, cy) = self.bin_coords(pos);
            let bin = self.bin_index(cx, cy);
            self.first_cell[bin] -= 1;
            self.cell_ids[self.first_cell[bin] as usize] = id as i32;
        }
    }
}
