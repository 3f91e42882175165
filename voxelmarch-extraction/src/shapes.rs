//! Stock density functions
//!
//! The engine only ever sees a `Fn(Point3<i32>) -> f32`; these helpers build
//! the two shapes the tests and benches sample. Real terrain generators live
//! outside the core and supply their own closures.

use voxelmarch_core::{Point3f, Point3i};

/// Solid sphere: density 1 at the center, crossing 0.5 at `radius`, clamped
/// to `[0, 1]` with a one-cell falloff band
pub fn sphere(center: Point3f, radius: f32) -> impl Fn(Point3i) -> f32 {
    move |p| {
        let d = (Point3f::new(p.x as f32, p.y as f32, p.z as f32) - center).norm();
        (radius - d + 0.5).clamp(0.0, 1.0)
    }
}

/// Flat half-space along +y: density `p.y - height`, solid above the plane
pub fn half_space(height: f32) -> impl Fn(Point3i) -> f32 {
    move |p| p.y as f32 - height
}
