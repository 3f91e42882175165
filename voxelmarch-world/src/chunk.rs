//! A single tile of the density field with its cached surface mesh

use voxelmarch_core::{
    apply_edit, EditOp, FlatMesh, Point3i, Result, Voxel, VoxelGrid,
};
use voxelmarch_extraction::{triangulate, triangulate_parallel};

/// A cubic tile of the voxel field
///
/// Owns one `(chunk_size + 1)³` grid and the mesh most recently extracted
/// from it. Edits only mutate the grid and set the dirty flag; triangulation
/// happens when the owner calls [`Chunk::regenerate`], so any number of edits
/// can be batched before paying the extraction cost. Mesh vertices are in
/// grid-local coordinates; consumers place the mesh at [`Chunk::origin`].
#[derive(Debug, Clone)]
pub struct Chunk {
    grid: VoxelGrid,
    mesh: FlatMesh,
    origin: Point3i,
    chunk_size: usize,
    isolevel: f32,
    dirty: bool,
}

impl Chunk {
    /// Create a chunk with an all-zero density grid, clean and meshless
    pub fn new(origin: Point3i, chunk_size: usize, isolevel: f32) -> Self {
        Self {
            grid: VoxelGrid::cubic(chunk_size),
            mesh: FlatMesh::new(),
            origin,
            chunk_size,
            isolevel,
            dirty: false,
        }
    }

    /// Create a chunk whose grid is filled from a world-coordinate density
    /// function
    ///
    /// Does not triangulate and leaves the chunk clean, like [`Chunk::new`].
    pub fn with_density<F>(origin: Point3i, chunk_size: usize, isolevel: f32, mut f: F) -> Self
    where
        F: FnMut(Point3i) -> f32,
    {
        let mut chunk = Self::new(origin, chunk_size, isolevel);
        chunk.grid.fill(|local| f(local + origin.coords));
        chunk
    }

    /// World-space origin of this chunk in lattice units
    pub fn origin(&self) -> Point3i {
        self.origin
    }

    /// Edge length of this chunk in cells
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Isolevel used for extraction
    pub fn isolevel(&self) -> f32 {
        self.isolevel
    }

    /// Whether the grid has been edited since the last regeneration
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The most recently extracted mesh (empty before the first regeneration)
    pub fn mesh(&self) -> &FlatMesh {
        &self.mesh
    }

    /// The underlying voxel grid
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Apply a density edit from a world-coordinate density function
    ///
    /// Marks the chunk dirty and returns without retriangulating.
    pub fn apply_edit<F>(&mut self, op: EditOp, mut f: F)
    where
        F: FnMut(Point3i) -> f32,
    {
        let origin = self.origin;
        apply_edit(&mut self.grid, op, |local| f(local + origin.coords));
        self.dirty = true;
    }

    /// Read one sample at chunk-local coordinates
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Result<Voxel> {
        self.grid.voxel(x, y, z)
    }

    /// Overwrite one sample's density at chunk-local coordinates, marking the
    /// chunk dirty
    pub fn set_density(&mut self, x: usize, y: usize, z: usize, density: f32) -> Result<()> {
        self.grid.set_density(x, y, z, density)?;
        self.dirty = true;
        Ok(())
    }

    /// Combine one sample's density with an edit value, marking the chunk
    /// dirty
    pub fn edit_density(&mut self, x: usize, y: usize, z: usize, op: EditOp, value: f32) -> Result<()> {
        let current = self.grid.voxel(x, y, z)?.density;
        self.set_density(x, y, z, op.combine(current, value))
    }

    /// Re-extract the surface, replacing the cached mesh and clearing the
    /// dirty flag
    ///
    /// Idempotent: with no intervening edits a second call produces an
    /// identical mesh.
    pub fn regenerate(&mut self) -> Result<&FlatMesh> {
        self.mesh = triangulate(&self.grid, self.isolevel)?;
        self.dirty = false;
        Ok(&self.mesh)
    }

    /// [`Chunk::regenerate`] through the cell-parallel pipeline; same
    /// observable result
    pub fn regenerate_parallel(&mut self) -> Result<&FlatMesh> {
        self.mesh = triangulate_parallel(&self.grid, self.isolevel)?;
        self.dirty = false;
        Ok(&self.mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_chunk_is_clean_and_empty() {
        let chunk = Chunk::new(Point3i::new(0, 0, 0), 8, 0.5);
        assert!(!chunk.is_dirty());
        assert!(chunk.mesh().is_empty());
        assert_eq!(chunk.grid().dimensions(), [9, 9, 9]);
    }

    #[test]
    fn test_with_density_offsets_world_coords() {
        let chunk = Chunk::with_density(Point3i::new(8, 0, 0), 4, 0.5, |p| p.x as f32);
        assert_eq!(chunk.voxel(0, 0, 0).unwrap().density, 8.0);
        assert_eq!(chunk.voxel(4, 0, 0).unwrap().density, 12.0);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_edit_marks_dirty_without_meshing() {
        let mut chunk = Chunk::new(Point3i::new(0, 0, 0), 4, 0.5);
        chunk.apply_edit(EditOp::Set, |p| p.y as f32 - 2.0);
        assert!(chunk.is_dirty());
        assert!(chunk.mesh().is_empty());
    }

    #[test]
    fn test_regenerate_clears_dirty_and_is_idempotent() {
        let mut chunk = Chunk::new(Point3i::new(0, 0, 0), 8, 0.5);
        chunk.apply_edit(EditOp::Set, |p| p.y as f32 - 4.0);

        chunk.regenerate().unwrap();
        assert!(!chunk.is_dirty());
        let first = chunk.mesh().clone();
        assert!(!first.is_empty());

        chunk.regenerate().unwrap();
        assert_eq!(first, *chunk.mesh());
    }

    #[test]
    fn test_parallel_regeneration_matches() {
        let mut chunk = Chunk::new(Point3i::new(0, 0, 0), 8, 0.5);
        chunk.apply_edit(EditOp::Set, |p| p.y as f32 - 4.0);

        let sequential = chunk.regenerate().unwrap().clone();
        let parallel = chunk.regenerate_parallel().unwrap().clone();
        assert_eq!(sequential, parallel);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_point_edits() {
        let mut chunk = Chunk::new(Point3i::new(0, 0, 0), 2, 0.5);
        chunk.set_density(1, 1, 1, 0.8).unwrap();
        assert!(chunk.is_dirty());

        chunk.edit_density(1, 1, 1, EditOp::Subtract, 0.3).unwrap();
        let d = chunk.voxel(1, 1, 1).unwrap().density;
        assert_relative_eq!(d, 0.5, epsilon = 1e-6);

        assert!(chunk.set_density(3, 0, 0, 1.0).is_err());
    }
}
