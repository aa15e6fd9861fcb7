//! Uniform grid of conflict particles
//!
//! The store partitions the labeling area into cells of a fixed size (usually the largest
//! label box) and keeps one [`CellBucket`] per cell. Range queries return every particle of
//! the covered cells, which is a superset of the particles inside the query rectangle:
//! callers must filter by the literal coordinates themselves.

use crate::CellBucket;
use crate::config::{DEFAULT_BUCKET_CAPACITY_FACTOR, DEFAULT_PARTICLE_CAPACITY};

/// A stored point that marks occupied space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConflictParticle {
    /// Monotonic id, starting at 0 after construction or [`ParticleStore::reset`]
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Grid-based spatial index for conflict particles
#[derive(Clone, Debug)]
pub struct ParticleStore {
    /// Top-left corner of the grid in caller coordinates
    origin_x: f32,
    origin_y: f32,
    width: f32,
    height: f32,
    cell_width: f32,
    cell_height: f32,
    max_col: usize,
    max_row: usize,
    /// Column-major: bucket of (col, row) is at `col * rows + row`
    buckets: Vec<CellBucket>,
    /// Particle table indexed by id
    particles: Vec<ConflictParticle>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ParticleStore {
    /// Create a store covering `[0, width] × [0, height]` with the default capacities
    pub fn new(width: f32, height: f32, cell_width: f32, cell_height: f32) -> Self {
        Self::with_capacity(
            width,
            height,
            cell_width,
            cell_height,
            DEFAULT_PARTICLE_CAPACITY,
            DEFAULT_BUCKET_CAPACITY_FACTOR,
        )
    }

    /// Create a store with explicit initial capacities
    ///
    /// Each bucket starts with room for `cell_width * cell_height * bucket_factor` ids and
    /// the particle table with room for `particle_capacity` particles. Both double on
    /// overflow. Cell sizes below one unit are raised to one.
    pub fn with_capacity(
        width: f32,
        height: f32,
        cell_width: f32,
        cell_height: f32,
        particle_capacity: usize,
        bucket_factor: usize,
    ) -> Self {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);
        let cell_width = sanitize_cell(cell_width);
        let cell_height = sanitize_cell(cell_height);

        let max_col = (width / cell_width).floor() as usize;
        let max_row = (height / cell_height).floor() as usize;
        let cell_count = (max_col + 1) * (max_row + 1);
        let bucket_capacity = (cell_width * cell_height) as usize * bucket_factor;

        tracing::debug!(
            "Creating particle grid {}x{} cells ({}x{} each) for a {}x{} area",
            max_col + 1,
            max_row + 1,
            cell_width,
            cell_height,
            width,
            height
        );

        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width,
            height,
            cell_width,
            cell_height,
            max_col,
            max_row,
            buckets: (0..cell_count)
                .map(|_| CellBucket::new(bucket_capacity))
                .collect(),
            particles: Vec::with_capacity(particle_capacity),
        }
    }

    /// Anchor the grid at `(x, y)` instead of the coordinate origin
    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Insert a particle and return its id
    ///
    /// Returns `None` without touching the store when the coordinate lies outside the grid.
    pub fn add_particle(&mut self, x: f32, y: f32) -> Option<u32> {
        let (col, row) = self.cell_of(x, y)?;
        let id = u32::try_from(self.particles.len()).ok()?;

        if self.particles.len() == self.particles.capacity() {
            self.particles
                .reserve_exact(self.particles.capacity().max(1));
            tracing::trace!(
                "Particle table grown to {} entries",
                self.particles.capacity()
            );
        }

        let index = self.bucket_index(col, row);
        self.buckets[index].append(id);
        self.particles.push(ConflictParticle { id, x, y });

        Some(id)
    }

    /// All particles stored in the cells covering the rectangle `(x1, y1)-(x2, y2)`
    ///
    /// This is a cell-granularity over-approximation; no per-particle filtering happens.
    pub fn get_involved_particles(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<ConflictParticle> {
        self.involved_particles(x1, y1, x2, y2).collect()
    }

    /// Iterator form of [`Self::get_involved_particles`] that does not allocate
    pub fn involved_particles(
        &self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) -> impl Iterator<Item = ConflictParticle> + '_ {
        let cols = cell_range(x1 - self.origin_x, x2 - self.origin_x, self.cell_width, self.max_col);
        let rows = cell_range(y1 - self.origin_y, y2 - self.origin_y, self.cell_height, self.max_row);

        cols.flat_map(move |col| {
            rows.clone().flat_map(move |row| {
                self.buckets[self.bucket_index(col, row)]
                    .ids()
                    .iter()
                    .map(move |&id| self.particles[id as usize])
            })
        })
    }

    /// Particles stored in cell `(col, row)`, or `None` if the cell does not exist
    pub fn get_particles_of_cell(&self, col: usize, row: usize) -> Option<Vec<ConflictParticle>> {
        if col > self.max_col || row > self.max_row {
            return None;
        }
        let bucket = &self.buckets[self.bucket_index(col, row)];
        Some(
            bucket
                .ids()
                .iter()
                .map(|&id| self.particles[id as usize])
                .collect(),
        )
    }

    /// Remove every particle and restart ids at 0, keeping all allocated capacity
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.particles.clear();
    }

    /// Every stored particle in id order
    #[inline]
    pub fn particles(&self) -> &[ConflictParticle] {
        &self.particles
    }

    /// Number of stored particles (also the next id to be assigned)
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of grid columns
    #[inline]
    pub fn columns(&self) -> usize {
        self.max_col + 1
    }

    /// Number of grid rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.max_row + 1
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Cell size as `(width, height)`
    #[inline]
    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }

    /// Grid anchor as `(x, y)`
    #[inline]
    pub fn origin(&self) -> (f32, f32) {
        (self.origin_x, self.origin_y)
    }

    /// Capacity of the particle table
    #[inline]
    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    #[inline]
    fn bucket_index(&self, col: usize, row: usize) -> usize {
        col * (self.max_row + 1) + row
    }

    /// Cell of an insertable coordinate
    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let local_x = x - self.origin_x;
        let local_y = y - self.origin_y;

        if !local_x.is_finite() || !local_y.is_finite() || local_x < 0.0 || local_y < 0.0 {
            return None;
        }

        let col = (local_x / self.cell_width).floor() as usize;
        let row = (local_y / self.cell_height).floor() as usize;

        if col > self.max_col || row > self.max_row {
            return None;
        }

        Some((col, row))
    }
}

/// Cell index range covering `[from, to]` (grid-local), clamped to `0..=max`
#[inline]
fn cell_range(from: f32, to: f32, cell: f32, max: usize) -> std::ops::Range<usize> {
    let first = (from / cell).floor().max(0.0);
    let last = (to / cell).floor().min(max as f32);

    if first.is_nan() || last.is_nan() || first > last {
        return 0..0;
    }

    first as usize..last as usize + 1
}

#[inline]
fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() { value.abs() } else { 0.0 }
}

#[inline]
fn sanitize_cell(value: f32) -> f32 {
    if value.is_finite() {
        value.floor().max(1.0)
    } else {
        1.0
    }
}
