//! Core data structures for voxelmarch
//!
//! This crate provides the fundamental types for chunked isosurface
//! extraction: voxels, dense voxel grids, flat triangle meshes and the
//! sample-wise density edit operators.

pub mod error;
pub mod mesh;
pub mod sculpt;
pub mod voxel;

pub use error::*;
pub use mesh::*;
pub use sculpt::*;
pub use voxel::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D point with integer coordinates
pub type Point3i = Point3<i32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;
