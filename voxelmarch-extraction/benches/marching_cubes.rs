//! Benchmarks comparing the sequential engine and the parallel pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voxelmarch_core::{apply_edit, EditOp, Point3f, VoxelGrid};
use voxelmarch_extraction::parallel::triangulate_parallel;
use voxelmarch_extraction::shapes::sphere;
use voxelmarch_extraction::triangulate;

fn sphere_grid(chunk_size: usize) -> VoxelGrid {
    let half = chunk_size as f32 / 2.0;
    let mut grid = VoxelGrid::cubic(chunk_size);
    apply_edit(
        &mut grid,
        EditOp::Set,
        sphere(Point3f::new(half, half, half), half * 0.75),
    );
    grid
}

fn bench_triangulation(c: &mut Criterion) {
    let sizes = [8, 16, 32];

    let mut group = c.benchmark_group("triangulation");

    for &size in &sizes {
        let grid = sphere_grid(size);

        group.bench_with_input(
            BenchmarkId::new("sequential", format!("{}c", size)),
            &grid,
            |b, grid| {
                b.iter(|| {
                    let mesh = triangulate(black_box(grid), 0.5).unwrap();
                    black_box(mesh);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", format!("{}c", size)),
            &grid,
            |b, grid| {
                b.iter(|| {
                    let mesh = triangulate_parallel(black_box(grid), 0.5).unwrap();
                    black_box(mesh);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_triangulation);
criterion_main!(benches);
