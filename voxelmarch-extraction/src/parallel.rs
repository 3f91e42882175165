//! Cell-parallel extraction pipeline
//!
//! The same classify → count → emit algorithm as [`crate::marching`],
//! restructured as data-parallel stages over an immutable grid snapshot.
//! Emission writes concurrently without a shared cursor: the per-cell vertex
//! counts from the count phase partition the output buffer into disjoint
//! slices up front, so every cell owns its write range. Output is
//! bit-identical to the sequential engine.

use crate::marching::{assert_chunk_grid, cell_coords, cube_index, edge_vertices};
use crate::tables::{row_vertex_count, TRIANGLE_TABLE};
use rayon::prelude::*;
use voxelmarch_core::{FlatMesh, Point3f, Result, Vector3f, VoxelGrid};

/// Triangulate a chunk grid at the given isolevel, cell-parallel
pub fn triangulate_parallel(grid: &VoxelGrid, isolevel: f32) -> Result<FlatMesh> {
    assert_chunk_grid(grid);

    let [cx, cy, cz] = grid.cell_dimensions();
    let cell_count = cx * cy * cz;

    // Classify: independent per-cell reads.
    let cube_indexes = (0..cell_count)
        .into_par_iter()
        .map(|i| {
            let (x, y, z) = cell_coords(i, cx, cy);
            Ok(cube_index(&grid.corners(x, y, z)?, isolevel))
        })
        .collect::<Result<Vec<u8>>>()?;

    // Count: per-cell reduction giving the exact output size.
    let counts: Vec<usize> = cube_indexes
        .par_iter()
        .map(|&ci| row_vertex_count(ci))
        .collect();
    let vertex_count: usize = counts.par_iter().sum();
    if vertex_count == 0 {
        return Ok(FlatMesh::new());
    }

    // Partition the vertex buffer into one disjoint slice per cell. Cells
    // with cube index 0 or 255 get an empty slice and fall out of emission.
    let mut vertices = vec![Point3f::origin(); vertex_count];
    let mut slices: Vec<&mut [Point3f]> = Vec::with_capacity(cell_count);
    let mut rest = vertices.as_mut_slice();
    for &count in &counts {
        let (cell_range, tail) = rest.split_at_mut(count);
        slices.push(cell_range);
        rest = tail;
    }

    // Emit: each cell fills only its own range.
    slices
        .into_par_iter()
        .enumerate()
        .try_for_each(|(i, out)| {
            if out.is_empty() {
                return Ok(());
            }
            let ci = cube_indexes[i];
            let (x, y, z) = cell_coords(i, cx, cy);
            let corners = grid.corners(x, y, z)?;
            let vertex_list = edge_vertices(&corners, ci, isolevel);
            let row = &TRIANGLE_TABLE[ci as usize];
            for (slot, &edge) in out.iter_mut().zip(row.iter()) {
                *slot = vertex_list[edge as usize];
            }
            Ok(())
        })?;

    let normals: Vec<Vector3f> = vertices
        .par_chunks(3)
        .flat_map_iter(|tri| {
            // Corner snapping can collapse a triangle to a point; keep the
            // zero normal rather than normalizing a zero cross product.
            let normal = (tri[1] - tri[0])
                .cross(&(tri[2] - tri[0]))
                .try_normalize(0.0)
                .unwrap_or_else(Vector3f::zeros);
            std::iter::repeat(normal).take(3)
        })
        .collect();

    Ok(FlatMesh {
        triangles: (0..vertex_count as u32).collect(),
        vertices,
        normals: Some(normals),
    })
}
