//! Voxel and voxel grid types

use crate::{Error, Point3i, Result};
use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Offsets of the 8 corners of a cell, in table order.
///
/// The ordering is load-bearing: the edge and triangle lookup tables used by
/// the extraction engine index corners in exactly this order.
pub const CORNER_OFFSETS: [[i32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 0, 1],
    [0, 0, 1],
    [0, 1, 0],
    [1, 1, 0],
    [1, 1, 1],
    [0, 1, 1],
];

/// A single scalar sample of the density field
///
/// Density is a signed scalar; the surface is its isolevel crossing. The
/// convention throughout voxelmarch is higher density = more solid, with a
/// sample counting as "outside" when its density is below the isolevel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Voxel {
    pub local_coord: Point3i,
    pub density: f32,
}

unsafe impl Pod for Voxel {}
unsafe impl Zeroable for Voxel {}

impl Voxel {
    /// Create a voxel at the given local grid coordinate
    pub fn new(local_coord: Point3i, density: f32) -> Self {
        Self {
            local_coord,
            density,
        }
    }

    /// Position of this voxel as a floating point point
    pub fn position(&self) -> Point3<f32> {
        Point3::new(
            self.local_coord.x as f32,
            self.local_coord.y as f32,
            self.local_coord.z as f32,
        )
    }
}

/// A dense 3D grid of density samples
///
/// Samples are stored contiguously in row-major order with the linearization
/// `index = x + sx*y + sx*sy*z`. A cubic chunk of edge length `chunk_size`
/// uses a `(chunk_size + 1)³` grid so that every one of its `chunk_size³`
/// cells has all 8 corners resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelGrid {
    voxels: Vec<Voxel>,
    dimensions: [usize; 3],
}

impl VoxelGrid {
    /// Create a grid of the given dimensions with all densities zero
    pub fn new(dimensions: [usize; 3]) -> Self {
        // x varies fastest to match the linearization.
        let mut voxels = Vec::with_capacity(dimensions[0] * dimensions[1] * dimensions[2]);
        for z in 0..dimensions[2] {
            for y in 0..dimensions[1] {
                for x in 0..dimensions[0] {
                    voxels.push(Voxel::new(Point3::new(x as i32, y as i32, z as i32), 0.0));
                }
            }
        }

        Self { voxels, dimensions }
    }

    /// Create the `(chunk_size + 1)³` grid backing a cubic chunk
    pub fn cubic(chunk_size: usize) -> Self {
        let n = chunk_size + 1;
        Self::new([n, n, n])
    }

    /// Grid dimensions (number of samples per axis)
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Cell dimensions (one less than the sample dimensions per axis)
    pub fn cell_dimensions(&self) -> [usize; 3] {
        [
            self.dimensions[0].saturating_sub(1),
            self.dimensions[1].saturating_sub(1),
            self.dimensions[2].saturating_sub(1),
        ]
    }

    /// Total number of cells in the grid
    pub fn cell_count(&self) -> usize {
        let [cx, cy, cz] = self.cell_dimensions();
        cx * cy * cz
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dimensions[0] * y + self.dimensions[0] * self.dimensions[1] * z
    }

    /// Whether the sample coordinate lies inside the grid
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.dimensions[0] && y < self.dimensions[1] && z < self.dimensions[2]
    }

    /// Get the sample at grid coordinates
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Result<Voxel> {
        if self.contains(x, y, z) {
            Ok(self.voxels[self.index(x, y, z)])
        } else {
            Err(Error::OutOfRange {
                x,
                y,
                z,
                dims: self.dimensions,
            })
        }
    }

    /// Overwrite the density of the sample at grid coordinates
    pub fn set_density(&mut self, x: usize, y: usize, z: usize, density: f32) -> Result<()> {
        if self.contains(x, y, z) {
            let i = self.index(x, y, z);
            self.voxels[i].density = density;
            Ok(())
        } else {
            Err(Error::OutOfRange {
                x,
                y,
                z,
                dims: self.dimensions,
            })
        }
    }

    /// Get the 8 corner samples of the cell at `(x, y, z)`, in table order
    ///
    /// Cell coordinates range over `cell_dimensions()`, one less than the
    /// sample dimensions per axis.
    pub fn corners(&self, x: usize, y: usize, z: usize) -> Result<[Voxel; 8]> {
        let [cx, cy, cz] = self.cell_dimensions();
        if x >= cx || y >= cy || z >= cz {
            return Err(Error::OutOfRange {
                x,
                y,
                z,
                dims: [cx, cy, cz],
            });
        }

        let mut corners = [Voxel::new(Point3::origin(), 0.0); 8];
        for (corner, offset) in corners.iter_mut().zip(CORNER_OFFSETS.iter()) {
            let i = self.index(
                x + offset[0] as usize,
                y + offset[1] as usize,
                z + offset[2] as usize,
            );
            *corner = self.voxels[i];
        }

        Ok(corners)
    }

    /// Rewrite every sample's density from its local coordinate
    ///
    /// This is the bulk form of a `Set` edit; callers that work in world
    /// coordinates compose the chunk origin into `f`.
    pub fn fill<F>(&mut self, mut f: F)
    where
        F: FnMut(Point3i) -> f32,
    {
        for voxel in &mut self.voxels {
            voxel.density = f(voxel.local_coord);
        }
    }

    /// All samples in linearization order
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Mutable access to all samples in linearization order
    pub(crate) fn voxels_mut(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_dimensions() {
        let grid = VoxelGrid::cubic(8);
        assert_eq!(grid.dimensions(), [9, 9, 9]);
        assert_eq!(grid.cell_dimensions(), [8, 8, 8]);
        assert_eq!(grid.cell_count(), 512);
        assert_eq!(grid.voxels().len(), 9 * 9 * 9);
    }

    #[test]
    fn test_linearization_matches_coords() {
        let grid = VoxelGrid::new([3, 4, 5]);
        for z in 0..5 {
            for y in 0..4 {
                for x in 0..3 {
                    let v = grid.voxel(x, y, z).unwrap();
                    assert_eq!(
                        v.local_coord,
                        Point3::new(x as i32, y as i32, z as i32)
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_access() {
        let mut grid = VoxelGrid::cubic(2);
        assert!(grid.voxel(3, 0, 0).is_err());
        assert!(grid.set_density(0, 0, 3, 1.0).is_err());
        assert!(grid.set_density(2, 2, 2, 1.0).is_ok());
    }

    #[test]
    fn test_corners_order() {
        let mut grid = VoxelGrid::cubic(2);
        grid.fill(|p| (p.x + 10 * p.y + 100 * p.z) as f32);

        let corners = grid.corners(1, 1, 1).unwrap();
        for (corner, offset) in corners.iter().zip(CORNER_OFFSETS.iter()) {
            assert_eq!(
                corner.local_coord,
                Point3::new(1 + offset[0], 1 + offset[1], 1 + offset[2])
            );
            let p = corner.local_coord;
            assert_eq!(corner.density, (p.x + 10 * p.y + 100 * p.z) as f32);
        }
    }

    #[test]
    fn test_corners_rejects_boundary_cell() {
        let grid = VoxelGrid::cubic(2);
        // Sample coordinate 2 exists, cell coordinate 2 does not.
        assert!(grid.corners(2, 0, 0).is_err());
        assert!(grid.corners(1, 1, 1).is_ok());
    }
}
