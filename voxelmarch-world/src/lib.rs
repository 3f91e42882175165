//! # Voxelmarch World
//!
//! Partitions an unbounded density field into fixed-size chunks, routes
//! world-coordinate queries and edits to the owning chunk(s), and keeps
//! lattice corners shared by adjacent chunks consistent. Regeneration is
//! caller-driven through each chunk's dirty flag; chunks share no mutable
//! state and can be retriangulated concurrently.

pub mod chunk;
pub mod world;

pub use chunk::*;
pub use world::*;
