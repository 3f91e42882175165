//! World grid: a 3D array of chunks with world-coordinate routing
//!
//! A lattice point on a chunk boundary is a shared corner of up to 8
//! adjacent chunks (2 per boundary axis). Point edits fan out to every chunk
//! owning the corner, writing the same density at each chunk's own local
//! coordinate, so seams stay watertight across independently regenerated
//! chunks.

use crate::Chunk;
use rayon::prelude::*;
use voxelmarch_core::{EditOp, Error, Point3i, Result, Voxel};

/// What to do with world coordinates outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Report the point as outside the world
    #[default]
    Reject,
    /// Clamp the point onto the nearest boundary sample
    Clamp,
}

/// A fixed extent of chunks partitioning world space
///
/// Chunk `(cx, cy, cz)` owns world cells `[cx*S, (cx+1)*S) × …` for chunk
/// size `S`; its samples span `[cx*S, cx*S + S]` inclusive, overlapping its
/// neighbors on the boundary lattice planes.
#[derive(Debug, Clone)]
pub struct WorldGrid {
    chunks: Vec<Chunk>,
    extent: [usize; 3],
    chunk_size: usize,
    bounds_policy: BoundsPolicy,
}

impl WorldGrid {
    /// Create a world of `extent` chunks per axis, all densities zero
    pub fn new(extent: [usize; 3], chunk_size: usize, isolevel: f32) -> Self {
        assert!(
            chunk_size > 0 && extent.iter().all(|&e| e > 0),
            "world extent and chunk size must be non-zero"
        );

        let mut chunks = Vec::with_capacity(extent[0] * extent[1] * extent[2]);
        for cz in 0..extent[2] {
            for cy in 0..extent[1] {
                for cx in 0..extent[0] {
                    let origin = Point3i::new(
                        (cx * chunk_size) as i32,
                        (cy * chunk_size) as i32,
                        (cz * chunk_size) as i32,
                    );
                    chunks.push(Chunk::new(origin, chunk_size, isolevel));
                }
            }
        }

        Self {
            chunks,
            extent,
            chunk_size,
            bounds_policy: BoundsPolicy::default(),
        }
    }

    /// Set the out-of-bounds policy
    pub fn with_bounds_policy(mut self, policy: BoundsPolicy) -> Self {
        self.bounds_policy = policy;
        self
    }

    /// Number of chunks per axis
    pub fn extent(&self) -> [usize; 3] {
        self.extent
    }

    /// Edge length of each chunk in cells
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// World dimensions in lattice cells per axis
    pub fn world_dimensions(&self) -> [usize; 3] {
        [
            self.extent[0] * self.chunk_size,
            self.extent[1] * self.chunk_size,
            self.extent[2] * self.chunk_size,
        ]
    }

    /// Whether a lattice point lies inside the world (boundary inclusive)
    pub fn contains(&self, point: Point3i) -> bool {
        let [wx, wy, wz] = self.world_dimensions();
        (0..=wx as i32).contains(&point.x)
            && (0..=wy as i32).contains(&point.y)
            && (0..=wz as i32).contains(&point.z)
    }

    /// Apply the bounds policy to a lattice point
    fn resolve(&self, point: Point3i) -> Result<Point3i> {
        if self.contains(point) {
            return Ok(point);
        }
        match self.bounds_policy {
            BoundsPolicy::Reject => Err(Error::OutsideWorld(point.x, point.y, point.z)),
            BoundsPolicy::Clamp => {
                let [wx, wy, wz] = self.world_dimensions();
                Ok(Point3i::new(
                    point.x.clamp(0, wx as i32),
                    point.y.clamp(0, wy as i32),
                    point.z.clamp(0, wz as i32),
                ))
            }
        }
    }

    #[inline]
    fn linear(&self, index: [usize; 3]) -> usize {
        index[0] + self.extent[0] * index[1] + self.extent[0] * self.extent[1] * index[2]
    }

    /// Index of the chunk whose cell range owns the point
    ///
    /// Integer division by the chunk size; the far world boundary belongs to
    /// the last chunk.
    pub fn chunk_index(&self, point: Point3i) -> Result<[usize; 3]> {
        let point = self.resolve(point)?;
        let s = self.chunk_size as i32;
        Ok([
            ((point.x / s) as usize).min(self.extent[0] - 1),
            ((point.y / s) as usize).min(self.extent[1] - 1),
            ((point.z / s) as usize).min(self.extent[2] - 1),
        ])
    }

    /// Chunk-local sample coordinate of a world point within `chunk_index`
    pub fn local_coord(&self, point: Point3i, chunk_index: [usize; 3]) -> [usize; 3] {
        let s = self.chunk_size;
        [
            point.x as usize - chunk_index[0] * s,
            point.y as usize - chunk_index[1] * s,
            point.z as usize - chunk_index[2] * s,
        ]
    }

    /// Chunk coordinates per axis that own a lattice value
    ///
    /// Interior values have one owner; values on a chunk boundary are shared
    /// with the previous chunk along that axis.
    fn axis_owners(&self, value: i32, axis: usize) -> Vec<usize> {
        let s = self.chunk_size as i32;
        let q = value / s;
        let mut owners = Vec::with_capacity(2);
        if value % s == 0 && q > 0 {
            owners.push((q - 1) as usize);
        }
        if (q as usize) < self.extent[axis] {
            owners.push(q as usize);
        }
        owners
    }

    /// Every chunk index owning the lattice point: 1, 2, 4 or 8 chunks
    /// depending on how many axes sit on a chunk boundary
    fn owning_chunks(&self, point: Point3i) -> Vec<[usize; 3]> {
        let xs = self.axis_owners(point.x, 0);
        let ys = self.axis_owners(point.y, 1);
        let zs = self.axis_owners(point.z, 2);

        let mut owners = Vec::with_capacity(xs.len() * ys.len() * zs.len());
        for &cz in &zs {
            for &cy in &ys {
                for &cx in &xs {
                    owners.push([cx, cy, cz]);
                }
            }
        }
        owners
    }

    /// Borrow a chunk by index
    pub fn chunk(&self, index: [usize; 3]) -> Option<&Chunk> {
        (index[0] < self.extent[0] && index[1] < self.extent[1] && index[2] < self.extent[2])
            .then(|| &self.chunks[self.linear(index)])
    }

    /// All chunks in linearization order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Read the sample at a world lattice point
    pub fn voxel_at(&self, point: Point3i) -> Result<Voxel> {
        let point = self.resolve(point)?;
        let index = self.chunk_index(point)?;
        let [x, y, z] = self.local_coord(point, index);
        self.chunks[self.linear(index)].voxel(x, y, z)
    }

    /// Read the density at a world lattice point
    pub fn density_at(&self, point: Point3i) -> Result<f32> {
        Ok(self.voxel_at(point)?.density)
    }

    /// Write one density value at a world lattice point
    ///
    /// Fans out to every chunk sharing the point, writing the same value at
    /// each chunk's local coordinate and marking each dirty.
    pub fn set_density_at(&mut self, point: Point3i, density: f32) -> Result<()> {
        let point = self.resolve(point)?;
        for index in self.owning_chunks(point) {
            let [x, y, z] = self.local_coord(point, index);
            let i = self.linear(index);
            self.chunks[i].set_density(x, y, z, density)?;
        }
        Ok(())
    }

    /// Combine one edit value into a world lattice point
    ///
    /// Every owning chunk holds the same density for a shared corner, so the
    /// combine lands on the same result in each.
    pub fn edit_point(&mut self, point: Point3i, op: EditOp, value: f32) -> Result<()> {
        let point = self.resolve(point)?;
        let current = self.density_at(point)?;
        self.set_density_at(point, op.combine(current, value))
    }

    /// Apply a whole-world density edit, routing it to every chunk
    pub fn apply_edit<F>(&mut self, op: EditOp, f: F)
    where
        F: Fn(Point3i) -> f32,
    {
        for chunk in &mut self.chunks {
            chunk.apply_edit(op, &f);
        }
    }

    /// Indices of all chunks currently marked dirty
    pub fn dirty_chunks(&self) -> Vec<[usize; 3]> {
        let mut dirty = Vec::new();
        for cz in 0..self.extent[2] {
            for cy in 0..self.extent[1] {
                for cx in 0..self.extent[0] {
                    if self.chunks[self.linear([cx, cy, cz])].is_dirty() {
                        dirty.push([cx, cy, cz]);
                    }
                }
            }
        }
        dirty
    }

    /// Regenerate every dirty chunk, returning how many were rebuilt
    pub fn regenerate_dirty(&mut self) -> Result<usize> {
        let mut count = 0;
        for chunk in &mut self.chunks {
            if chunk.is_dirty() {
                chunk.regenerate()?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Regenerate every dirty chunk concurrently
    ///
    /// Chunks share no mutable state, so per-chunk triangulation runs in
    /// parallel; each chunk's own extraction stays sequential.
    pub fn regenerate_dirty_parallel(&mut self) -> Result<usize> {
        self.chunks
            .par_iter_mut()
            .filter(|chunk| chunk.is_dirty())
            .map(|chunk| chunk.regenerate().map(|_| 1usize))
            .try_reduce(|| 0, |a, b| Ok(a + b))
    }
}
