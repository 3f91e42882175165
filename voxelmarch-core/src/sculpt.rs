//! Density edit operators
//!
//! Pure sample-wise rewrites of a grid's densities through a caller-supplied
//! density function. Editing never triangulates; owners of a grid mark
//! themselves dirty and regenerate when they choose, so many edits can be
//! coalesced into one extraction.

use crate::{Point3i, VoxelGrid};
use serde::{Deserialize, Serialize};

/// How an edit's density value combines with the existing sample
///
/// The density convention is higher = more solid, so `Union` grows the solid
/// volume with `max` and `Intersection` shrinks it with `min`. `Subtract`
/// saturates into `[0, 1]` so repeated carving cannot push densities without
/// bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOp {
    /// Full overwrite, used for initial generation
    Set,
    /// `max(current, value)`, adds material
    Union,
    /// `clamp(current - value, 0, 1)`, removes material
    Subtract,
    /// `min(current, value)`, keeps the common volume
    Intersection,
}

impl EditOp {
    /// Combine an existing density with an edit value
    #[inline]
    pub fn combine(self, current: f32, value: f32) -> f32 {
        match self {
            EditOp::Set => value,
            EditOp::Union => current.max(value),
            EditOp::Subtract => (current - value).clamp(0.0, 1.0),
            EditOp::Intersection => current.min(value),
        }
    }
}

/// Apply a density function to every sample of the grid
///
/// `f` is evaluated at each sample's local coordinate; callers working in
/// world space compose their origin offset into `f`.
pub fn apply_edit<F>(grid: &mut VoxelGrid, op: EditOp, mut f: F)
where
    F: FnMut(Point3i) -> f32,
{
    for voxel in grid.voxels_mut() {
        voxel.density = op.combine(voxel.density, f(voxel.local_coord));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let mut grid = VoxelGrid::cubic(2);
        apply_edit(&mut grid, EditOp::Set, |p| p.y as f32);
        assert_eq!(grid.voxel(0, 2, 0).unwrap().density, 2.0);
        assert_eq!(grid.voxel(2, 0, 2).unwrap().density, 0.0);
    }

    #[test]
    fn test_union_takes_max() {
        let mut grid = VoxelGrid::cubic(2);
        apply_edit(&mut grid, EditOp::Set, |_| 0.3);
        apply_edit(&mut grid, EditOp::Union, |p| if p.x == 0 { 0.9 } else { 0.1 });

        assert_eq!(grid.voxel(0, 1, 1).unwrap().density, 0.9);
        assert_eq!(grid.voxel(1, 1, 1).unwrap().density, 0.3);
    }

    #[test]
    fn test_subtract_saturates() {
        let mut grid = VoxelGrid::cubic(2);
        apply_edit(&mut grid, EditOp::Set, |_| 0.4);
        apply_edit(&mut grid, EditOp::Subtract, |_| 1.0);
        apply_edit(&mut grid, EditOp::Subtract, |_| 1.0);

        for v in grid.voxels() {
            assert_eq!(v.density, 0.0);
        }
    }

    #[test]
    fn test_density_stays_bounded() {
        let mut grid = VoxelGrid::cubic(3);
        apply_edit(&mut grid, EditOp::Set, |_| 1.0);
        apply_edit(&mut grid, EditOp::Subtract, |p| 0.2 * p.x as f32);
        apply_edit(&mut grid, EditOp::Intersection, |p| 0.3 * p.y as f32);
        apply_edit(&mut grid, EditOp::Subtract, |_| 0.5);

        for v in grid.voxels() {
            assert!((0.0..=1.0).contains(&v.density), "density {}", v.density);
        }
    }
}
