//! # Voxelmarch Extraction
//!
//! Marching Cubes isosurface extraction for voxel density grids.
//!
//! The engine converts a [`voxelmarch_core::VoxelGrid`] and an isolevel into
//! an unindexed triangle mesh in three phases: classify every cell against
//! the isolevel, count the exact number of vertices the triangle table will
//! emit, then emit into buffers allocated once at that size. [`marching`]
//! runs the phases sequentially; [`parallel`] runs the same algorithm
//! cell-parallel on rayon with precomputed disjoint output ranges.

pub mod marching;
pub mod parallel;
pub mod shapes;
pub mod tables;

pub use marching::*;
pub use parallel::*;
