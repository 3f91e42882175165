//! Integration tests for voxelmarch-extraction
//!
//! These exercise the engine's observable guarantees: exact count/emit
//! sizing, the flat-soup output shape, determinism, and agreement between the
//! sequential and parallel pipelines.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxelmarch_core::{apply_edit, EditOp, Point3f, VoxelGrid};
use voxelmarch_extraction::marching::{classify, count_vertices, triangulate};
use voxelmarch_extraction::parallel::triangulate_parallel;
use voxelmarch_extraction::shapes::{half_space, sphere};

fn random_grid(chunk_size: usize, seed: u64) -> VoxelGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = VoxelGrid::cubic(chunk_size);
    grid.fill(|_| rng.gen_range(0.0..1.0));
    grid
}

#[test]
fn test_count_matches_emission_on_random_grids() {
    for seed in 0..8 {
        let grid = random_grid(6, seed);
        let cube_indexes = classify(&grid, 0.5).unwrap();
        let counted = count_vertices(&cube_indexes);

        let mesh = triangulate(&grid, 0.5).unwrap();
        assert_eq!(mesh.vertex_count(), counted, "seed {}", seed);
        assert_eq!(mesh.triangles.len(), counted, "seed {}", seed);
    }
}

#[test]
fn test_flat_soup_invariant_on_random_grids() {
    let mesh = triangulate(&random_grid(6, 99), 0.5).unwrap();
    assert!(!mesh.is_empty());
    assert_eq!(mesh.triangles.len(), mesh.vertices.len());
    assert_eq!(mesh.vertices.len() % 3, 0);
    for (i, t) in mesh.triangles.iter().enumerate() {
        assert_eq!(*t, i as u32);
    }
}

#[test]
fn test_homogeneous_cells_contribute_nothing() {
    // All corners on one side of the isolevel, both directions.
    let mut grid = VoxelGrid::cubic(4);
    assert!(triangulate(&grid, 0.5).unwrap().is_empty());

    apply_edit(&mut grid, EditOp::Set, |_| 1.0);
    assert!(triangulate(&grid, 0.5).unwrap().is_empty());
}

#[test]
fn test_half_space_produces_flat_plane() {
    let mut grid = VoxelGrid::cubic(16);
    apply_edit(&mut grid, EditOp::Set, half_space(8.0));

    let mesh = triangulate(&grid, 0.5).unwrap();
    assert!(!mesh.is_empty());

    // Every vertex sits on the single isolevel crossing plane y = 8.5.
    for v in &mesh.vertices {
        assert_relative_eq!(v.y, 8.5, epsilon = 1e-5);
    }

    // Face normals uniformly point along +y, toward increasing density.
    for n in mesh.face_normals() {
        assert_relative_eq!(n.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(n.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.z, 0.0, epsilon = 1e-5);
    }
}

#[test]
fn test_sphere_mesh_radius() {
    let center = Point3f::new(8.0, 8.0, 8.0);
    let mut grid = VoxelGrid::cubic(16);
    apply_edit(&mut grid, EditOp::Set, sphere(center, 5.0));

    let mesh = triangulate(&grid, 0.5).unwrap();
    assert!(!mesh.is_empty());
    for v in &mesh.vertices {
        let d = (*v - center).norm();
        assert!((d - 5.0).abs() < 1.0, "vertex at distance {}", d);
    }
}

#[test]
fn test_near_isolevel_corner_snaps_with_finite_normals() {
    // One corner within the snapping threshold of the isolevel: every active
    // edge of that cell snaps onto the corner, collapsing its triangle. The
    // mesh must still come out well-formed, with finite (zero) normals.
    let mut grid = VoxelGrid::cubic(1);
    apply_edit(&mut grid, EditOp::Set, |_| 1.0);
    grid.set_density(0, 0, 0, 0.499_999_9).unwrap();

    let mesh = triangulate(&grid, 0.5).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    for v in &mesh.vertices {
        // All three snapped onto the near-isolevel corner.
        assert_eq!(*v, Point3f::new(0.0, 0.0, 0.0));
    }
    for n in mesh.normals.as_ref().unwrap() {
        assert!(n.iter().all(|c| c.is_finite()), "normal {:?}", n);
    }

    let parallel = triangulate_parallel(&grid, 0.5).unwrap();
    assert_eq!(mesh, parallel);
}

#[test]
fn test_parallel_matches_sequential_on_random_grids() {
    for seed in 0..8 {
        let grid = random_grid(6, seed + 100);
        let sequential = triangulate(&grid, 0.5).unwrap();
        let parallel = triangulate_parallel(&grid, 0.5).unwrap();
        assert_eq!(sequential, parallel, "seed {}", seed + 100);
    }
}

#[test]
fn test_determinism_across_runs() {
    let grid = random_grid(8, 7);
    let first = triangulate(&grid, 0.5).unwrap();
    for _ in 0..3 {
        assert_eq!(first, triangulate(&grid, 0.5).unwrap());
    }
}

#[test]
fn test_normals_cover_every_vertex() {
    let mesh = triangulate(&random_grid(5, 3), 0.5).unwrap();
    let normals = mesh.normals.as_ref().expect("normals recomputed");
    assert_eq!(normals.len(), mesh.vertex_count());
    for n in normals {
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-4);
    }
}
