//! Flat triangle mesh produced by the extraction engine

use crate::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An unindexed triangle mesh
///
/// Every triangle owns its 3 vertex entries, so `triangles[i] == i` always
/// holds. The count/emit sizing of the extraction engine depends on this
/// shape; consumers that want shared vertices can call [`FlatMesh::indexed`]
/// as a post-pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatMesh {
    pub vertices: Vec<Point3f>,
    pub triangles: Vec<u32>,
    pub normals: Option<Vec<Vector3f>>,
}

impl FlatMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            normals: None,
        }
    }

    /// Create an empty mesh with buffers preallocated for `vertex_count`
    /// vertices
    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(vertex_count),
            normals: None,
        }
    }

    /// Append a vertex, extending the flat triangle list with its own index
    pub fn push_vertex(&mut self, vertex: Point3f) {
        self.triangles.push(self.vertices.len() as u32);
        self.vertices.push(vertex);
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Calculate one normal per triangle
    ///
    /// A degenerate triangle (collinear or coincident vertices, which corner
    /// snapping during extraction can produce) gets a zero normal instead of
    /// NaN.
    pub fn face_normals(&self) -> Vec<Vector3f> {
        self.vertices
            .chunks_exact(3)
            .map(|tri| {
                let edge1 = tri[1] - tri[0];
                let edge2 = tri[2] - tri[0];
                edge1
                    .cross(&edge2)
                    .try_normalize(0.0)
                    .unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Recompute per-vertex normals from the triangle soup
    ///
    /// With no shared-vertex topology each vertex belongs to exactly one
    /// triangle, so it takes that triangle's face normal.
    pub fn recalculate_normals(&mut self) {
        let mut normals = Vec::with_capacity(self.vertices.len());
        for face_normal in self.face_normals() {
            normals.push(face_normal);
            normals.push(face_normal);
            normals.push(face_normal);
        }
        self.normals = Some(normals);
    }

    /// Weld coincident vertices into an indexed `(vertices, faces)` pair
    ///
    /// Vertices are merged on exact bit equality of their coordinates. This
    /// is a consumer convenience; the engine contract stays unindexed.
    pub fn indexed(&self) -> (Vec<Point3f>, Vec<[usize; 3]>) {
        let mut unique: Vec<Point3f> = Vec::new();
        let mut remap: HashMap<[u32; 3], usize> = HashMap::new();
        let mut indices = Vec::with_capacity(self.vertices.len());

        for v in &self.vertices {
            let key = [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];
            let index = *remap.entry(key).or_insert_with(|| {
                unique.push(*v);
                unique.len() - 1
            });
            indices.push(index);
        }

        let faces = indices
            .chunks_exact(3)
            .map(|f| [f[0], f[1], f[2]])
            .collect();

        (unique, faces)
    }
}

impl Default for FlatMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> FlatMesh {
        let mut mesh = FlatMesh::new();
        // Two triangles in the z = 0 plane sharing an edge.
        mesh.push_vertex(Point3f::new(0.0, 0.0, 0.0));
        mesh.push_vertex(Point3f::new(1.0, 0.0, 0.0));
        mesh.push_vertex(Point3f::new(1.0, 1.0, 0.0));
        mesh.push_vertex(Point3f::new(0.0, 0.0, 0.0));
        mesh.push_vertex(Point3f::new(1.0, 1.0, 0.0));
        mesh.push_vertex(Point3f::new(0.0, 1.0, 0.0));
        mesh
    }

    #[test]
    fn test_flat_soup_invariant() {
        let mesh = quad();
        assert_eq!(mesh.triangles.len(), mesh.vertices.len());
        for (i, t) in mesh.triangles.iter().enumerate() {
            assert_eq!(*t, i as u32);
        }
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_recalculate_normals() {
        let mut mesh = quad();
        mesh.recalculate_normals();

        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), mesh.vertex_count());
        for n in normals {
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_degenerate_triangle_gets_zero_normal() {
        let mut mesh = FlatMesh::new();
        // All three vertices coincide, as corner snapping can produce.
        let p = Point3f::new(1.0, 2.0, 3.0);
        mesh.push_vertex(p);
        mesh.push_vertex(p);
        mesh.push_vertex(p);
        mesh.recalculate_normals();

        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), 3);
        for n in normals {
            assert!(n.iter().all(|c| c.is_finite()));
            assert_eq!(*n, Vector3f::zeros());
        }
    }

    #[test]
    fn test_indexed_welds_shared_vertices() {
        let (vertices, faces) = quad().indexed();
        assert_eq!(vertices.len(), 4);
        assert_eq!(faces.len(), 2);
        // The shared edge references the same welded indices.
        assert_eq!(faces[0][0], faces[1][0]);
        assert_eq!(faces[0][2], faces[1][1]);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = FlatMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.face_normals().is_empty());
    }
}
