//! Error types for voxelmarch

use thiserror::Error;

/// Main error type for voxelmarch operations
///
/// Contract violations (a grid whose extents are not `chunk_size + 1` per
/// axis, a cube index outside `0..=255`) are caller bugs and panic instead of
/// surfacing here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("grid coordinates ({x}, {y}, {z}) out of range for dimensions {dims:?}")]
    OutOfRange {
        x: usize,
        y: usize,
        z: usize,
        dims: [usize; 3],
    },

    #[error("world point ({0}, {1}, {2}) is outside the world bounds")]
    OutsideWorld(i32, i32, i32),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for voxelmarch operations
pub type Result<T> = std::result::Result<T, Error>;
