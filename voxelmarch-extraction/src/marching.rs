//! Sequential Marching Cubes triangulation
//!
//! Pure function of `(grid, isolevel)` and the static lookup tables:
//! identical inputs always produce bit-identical meshes.

use crate::tables::{row_vertex_count, EDGE_CORNERS, EDGE_TABLE, TRIANGLE_TABLE};
use voxelmarch_core::{FlatMesh, Point3f, Result, Voxel, VoxelGrid};

/// Snapping threshold for near-degenerate edge interpolation
pub const INTERPOLATION_EPSILON: f32 = 1e-6;

/// Panics unless the grid backs a cubic chunk (`chunk_size + 1` samples per
/// axis). Malformed extents are a caller bug, not a runtime condition.
pub(crate) fn assert_chunk_grid(grid: &VoxelGrid) {
    let [sx, sy, sz] = grid.dimensions();
    assert!(
        sx == sy && sy == sz && sx >= 2,
        "triangulation requires a cubic (chunk_size + 1) grid, got {:?}",
        grid.dimensions()
    );
}

/// Map a linear cell index back to cell coordinates
#[inline]
pub(crate) fn cell_coords(i: usize, cx: usize, cy: usize) -> (usize, usize, usize) {
    (i % cx, (i / cx) % cy, i / (cx * cy))
}

/// Classify one cell: bit `i` set iff corner `i`'s density is below the
/// isolevel
#[inline]
pub fn cube_index(corners: &[Voxel; 8], isolevel: f32) -> u8 {
    let mut index = 0u8;
    for (i, corner) in corners.iter().enumerate() {
        if corner.density < isolevel {
            index |= 1 << i;
        }
    }
    index
}

/// Classify every cell of the grid into a cube-index array
///
/// Total over all cells; skipping happens at emission, not here.
pub fn classify(grid: &VoxelGrid, isolevel: f32) -> Result<Vec<u8>> {
    let [cx, cy, cz] = grid.cell_dimensions();
    let mut cube_indexes = Vec::with_capacity(cx * cy * cz);
    for z in 0..cz {
        for y in 0..cy {
            for x in 0..cx {
                let corners = grid.corners(x, y, z)?;
                cube_indexes.push(cube_index(&corners, isolevel));
            }
        }
    }
    Ok(cube_indexes)
}

/// Exact number of vertices emission will produce for these cube indexes
pub fn count_vertices(cube_indexes: &[u8]) -> usize {
    cube_indexes.iter().map(|&ci| row_vertex_count(ci)).sum()
}

/// Interpolate the surface crossing along one cell edge
///
/// An isolevel within epsilon of either endpoint snaps to that corner, and a
/// near-zero density gradient snaps to the first corner; both guards avoid
/// degenerate slivers and division by ~0.
pub fn interpolate_vertex(p1: Point3f, p2: Point3f, v1: f32, v2: f32, isolevel: f32) -> Point3f {
    if (isolevel - v1).abs() < INTERPOLATION_EPSILON {
        return p1;
    }
    if (isolevel - v2).abs() < INTERPOLATION_EPSILON {
        return p2;
    }
    if (v1 - v2).abs() < INTERPOLATION_EPSILON {
        return p1;
    }

    let mu = (isolevel - v1) / (v2 - v1);
    p1 + (p2 - p1) * mu
}

/// Build the 12-slot edge-vertex list for a cell, filling only the slots the
/// edge table activates for this cube index
pub(crate) fn edge_vertices(corners: &[Voxel; 8], cube_index: u8, isolevel: f32) -> [Point3f; 12] {
    let mut vertex_list = [Point3f::origin(); 12];
    let mask = EDGE_TABLE[cube_index as usize];

    for (i, pair) in EDGE_CORNERS.iter().enumerate() {
        if mask & (1 << i) != 0 {
            let a = corners[pair[0]];
            let b = corners[pair[1]];
            vertex_list[i] =
                interpolate_vertex(a.position(), b.position(), a.density, b.density, isolevel);
        }
    }

    vertex_list
}

/// Emit one cell's triangles, in table order, through the mesh's cursor
pub(crate) fn march_cell(corners: &[Voxel; 8], cube_index: u8, isolevel: f32, mesh: &mut FlatMesh) {
    let vertex_list = edge_vertices(corners, cube_index, isolevel);
    let row = &TRIANGLE_TABLE[cube_index as usize];

    for &edge in &row[..row_vertex_count(cube_index)] {
        mesh.push_vertex(vertex_list[edge as usize]);
    }
}

/// Triangulate a chunk grid at the given isolevel
///
/// Classify → count → emit: the output buffers are allocated once to the
/// exact counted size and never grown. Cells whose cube index is 0 or 255 are
/// skipped at emission. Vertex positions are in grid-local coordinates.
pub fn triangulate(grid: &VoxelGrid, isolevel: f32) -> Result<FlatMesh> {
    assert_chunk_grid(grid);

    let cube_indexes = classify(grid, isolevel)?;
    let vertex_count = count_vertices(&cube_indexes);
    if vertex_count == 0 {
        return Ok(FlatMesh::new());
    }

    let mut mesh = FlatMesh::with_capacity(vertex_count);
    let [cx, cy, cz] = grid.cell_dimensions();
    for z in 0..cz {
        for y in 0..cy {
            for x in 0..cx {
                let ci = cube_indexes[x + cx * y + cx * cy * z];
                if ci == 0 || ci == 255 {
                    continue;
                }
                let corners = grid.corners(x, y, z)?;
                march_cell(&corners, ci, isolevel, &mut mesh);
            }
        }
    }

    assert_eq!(
        mesh.vertex_count(),
        vertex_count,
        "count phase disagrees with emission"
    );

    mesh.recalculate_normals();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use voxelmarch_core::{apply_edit, EditOp};

    #[test]
    fn test_cube_index_bits() {
        let mut grid = VoxelGrid::cubic(1);
        grid.fill(|p| if p.y == 0 { 0.0 } else { 1.0 });

        let corners = grid.corners(0, 0, 0).unwrap();
        // Bottom corners (0..4 in table order) are below the isolevel.
        assert_eq!(cube_index(&corners, 0.5), 0b0000_1111);
        assert_eq!(cube_index(&corners, -1.0), 0);
        assert_eq!(cube_index(&corners, 2.0), 255);
    }

    #[test]
    fn test_uniform_grid_is_empty() {
        let grid = VoxelGrid::cubic(4);
        let mesh = triangulate(&grid, 0.5).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_homogeneous_cells_emit_nothing() {
        let mut grid = VoxelGrid::cubic(4);
        apply_edit(&mut grid, EditOp::Set, |_| 1.0);
        let cube_indexes = classify(&grid, 0.5).unwrap();
        assert!(cube_indexes.iter().all(|&ci| ci == 0));
        assert_eq!(count_vertices(&cube_indexes), 0);
    }

    #[test]
    fn test_interpolation_snaps_to_corners() {
        let p1 = Point3f::new(0.0, 0.0, 0.0);
        let p2 = Point3f::new(1.0, 0.0, 0.0);

        assert_eq!(interpolate_vertex(p1, p2, 0.5, 1.0, 0.5), p1);
        assert_eq!(interpolate_vertex(p1, p2, 0.0, 0.5, 0.5), p2);
        // Degenerate gradient snaps to the first corner.
        assert_eq!(interpolate_vertex(p1, p2, 0.2, 0.2, 0.5), p1);
    }

    #[test]
    fn test_interpolation_midpoint() {
        let p1 = Point3f::new(0.0, 0.0, 0.0);
        let p2 = Point3f::new(1.0, 0.0, 0.0);
        let p = interpolate_vertex(p1, p2, 0.0, 1.0, 0.5);
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let mut grid = VoxelGrid::cubic(8);
        apply_edit(&mut grid, EditOp::Set, |p| {
            ((p.x * 7 + p.y * 13 + p.z * 3) % 11) as f32 / 10.0
        });

        let a = triangulate(&grid, 0.5).unwrap();
        let b = triangulate(&grid, 0.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "cubic")]
    fn test_non_cubic_grid_panics() {
        let grid = VoxelGrid::new([3, 3, 4]);
        let _ = triangulate(&grid, 0.5);
    }
}
