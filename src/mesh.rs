use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Interleaved vertex as uploaded to the GPU.
///
/// The attribute pointers in [`crate::gpu::Mesh`] and the normal pass in
/// [`calculate_average_normals`] both rely on this exact layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Number of floats per vertex.
    pub const STRIDE: usize = 8;
    /// Float offset of the texture coordinate.
    pub const UV_OFFSET: usize = 3;
    /// Float offset of the normal.
    pub const NORMAL_OFFSET: usize = 5;

    pub const fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// CPU-side triangle list ready for upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Replaces every vertex normal with the area-weighted average of the
    /// adjacent face normals.
    pub fn compute_smooth_normals(&mut self) -> Result<(), GeometryError> {
        let floats: &mut [f32] = bytemuck::cast_slice_mut(&mut self.vertices);
        calculate_average_normals(&self.indices, floats, Vertex::STRIDE, Vertex::NORMAL_OFFSET)
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Computes smooth per-vertex normals for an interleaved triangle list.
///
/// `vertices` holds `stride` floats per vertex with the position in the first
/// three and the normal at `normal_offset`. Face normals are accumulated
/// without normalization so larger triangles weigh more.
pub fn calculate_average_normals(
    indices: &[u32],
    vertices: &mut [f32],
    stride: usize,
    normal_offset: usize,
) -> Result<(), GeometryError> {
    if stride < 3 || normal_offset < 3 || normal_offset + 3 > stride {
        return Err(GeometryError::NormalSlotOutOfRange {
            normal_offset,
            stride,
        });
    }
    if vertices.len() % stride != 0 {
        return Err(GeometryError::RaggedVertexBuffer {
            len: vertices.len(),
            stride,
        });
    }
    if indices.len() % 3 != 0 {
        return Err(GeometryError::IncompleteTriangle {
            index_count: indices.len(),
        });
    }

    let vertex_count = vertices.len() / stride;
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(GeometryError::IndexOutOfBounds {
            index,
            vertex_count,
        });
    }

    let positions: Vec<Vec3> = vertices
        .chunks_exact(stride)
        .map(|vertex| Vec3::from_slice(&vertex[..3]))
        .collect();
    let mut accum = vec![Vec3::ZERO; vertex_count];

    for triangle in indices.chunks_exact(3) {
        let i0 = triangle[0] as usize;
        let i1 = triangle[1] as usize;
        let i2 = triangle[2] as usize;
        let p0 = positions[i0];
        let face = (positions[i1] - p0).cross(positions[i2] - p0);
        accum[i0] += face;
        accum[i1] += face;
        accum[i2] += face;
    }

    let mut orphans = 0usize;
    for (i, normal) in accum.into_iter().enumerate() {
        if normal == Vec3::ZERO {
            orphans += 1;
        }
        let normal = normal.normalize_or_zero();
        let slot = i * stride + normal_offset;
        vertices[slot..slot + 3].copy_from_slice(&normal.to_array());
    }
    if orphans > 0 {
        warn!("{orphans} vertex normal(s) have no contributing triangle and were left zero");
    }

    Ok(())
}

/// Four-sided pyramid with smoothed normals.
pub fn pyramid() -> MeshData {
    let vertices = vec![
        Vertex::new([-1.0, -1.0, -0.6], [0.0, 0.0], [0.0; 3]),
        Vertex::new([0.0, -1.0, 1.0], [0.5, 0.0], [0.0; 3]),
        Vertex::new([1.0, -1.0, -0.6], [1.0, 0.0], [0.0; 3]),
        Vertex::new([0.0, 1.0, 0.0], [0.5, 1.0], [0.0; 3]),
    ];
    let indices = vec![
        0, 3, 1, //
        1, 3, 2, //
        2, 3, 0, //
        0, 1, 2,
    ];
    let mut mesh = MeshData::new(vertices, indices);
    if let Err(err) = mesh.compute_smooth_normals() {
        warn!("pyramid normals not computed: {err}");
    }
    mesh
}

/// 20x20 floor quad in the XZ plane with tiled texture coordinates.
///
/// Normals face `-Y`, matching the winding convention of [`pyramid`].
pub fn floor() -> MeshData {
    let vertices = vec![
        Vertex::new([-10.0, 0.0, -10.0], [0.0, 0.0], [0.0, -1.0, 0.0]),
        Vertex::new([10.0, 0.0, -10.0], [10.0, 0.0], [0.0, -1.0, 0.0]),
        Vertex::new([-10.0, 0.0, 10.0], [0.0, 10.0], [0.0, -1.0, 0.0]),
        Vertex::new([10.0, 0.0, 10.0], [10.0, 10.0], [0.0, -1.0, 0.0]),
    ];
    let indices = vec![0, 2, 1, 1, 2, 3];
    MeshData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn normal_of(vertices: &[f32], stride: usize, offset: usize, i: usize) -> Vec3 {
        Vec3::from_slice(&vertices[i * stride + offset..i * stride + offset + 3])
    }

    #[test]
    fn flat_triangle_gets_face_normal_everywhere() {
        let mut vertices = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, 0.0, 0.0, 0.0,
        ];
        calculate_average_normals(&[0, 1, 2], &mut vertices, 6, 3).unwrap();

        let expected = (Vec3::new(2.0, 0.0, 0.0)).cross(Vec3::new(0.0, 3.0, 0.0)).normalize();
        for i in 0..3 {
            let normal = normal_of(&vertices, 6, 3, i);
            assert!((normal - expected).length() < EPSILON, "vertex {i}: {normal}");
        }
    }

    #[test]
    fn coplanar_fan_keeps_plane_normal_on_shared_edge() {
        // Two triangles of different area sharing the edge 0-2.
        let mut mesh = MeshData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0; 2], [0.0; 3]),
                Vertex::new([1.0, 0.0, 0.0], [0.0; 2], [0.0; 3]),
                Vertex::new([1.0, 0.0, -1.0], [0.0; 2], [0.0; 3]),
                Vertex::new([-4.0, 0.0, -1.0], [0.0; 2], [0.0; 3]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        mesh.compute_smooth_normals().unwrap();

        for vertex in &mesh.vertices {
            let normal = Vec3::from(vertex.normal);
            assert!((normal - Vec3::Y).length() < EPSILON, "{normal}");
        }
    }

    #[test]
    fn pyramid_normals_are_unit_length() {
        let mesh = pyramid();
        for vertex in &mesh.vertices {
            let length = Vec3::from(vertex.normal).length();
            assert!((length - 1.0).abs() < EPSILON, "length {length}");
        }
    }

    #[test]
    fn previous_normals_are_discarded() {
        let mut fresh = pyramid();
        let mut dirty = fresh.clone();
        for vertex in &mut dirty.vertices {
            vertex.normal = [5.0, -3.0, 9.0];
        }
        dirty.compute_smooth_normals().unwrap();
        fresh.compute_smooth_normals().unwrap();
        assert_eq!(fresh, dirty);
    }

    #[test]
    fn larger_faces_dominate_the_average() {
        // Vertex 0 touches a large triangle in the XY plane and a tiny one in
        // the XZ plane, so its normal leans toward +Z.
        let mut vertices = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            10.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 10.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.1, 0.0, 0.0, 0.0, //
            0.1, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        calculate_average_normals(&[0, 1, 2, 0, 3, 4], &mut vertices, 6, 3).unwrap();
        let normal = normal_of(&vertices, 6, 3, 0);
        assert!(normal.z > 0.99, "{normal}");
    }

    #[test]
    fn rejects_out_of_bounds_index() {
        let mut vertices = vec![0.0; 18];
        let err = calculate_average_normals(&[0, 1, 7], &mut vertices, 6, 3).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfBounds {
                index: 7,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn rejects_partial_triangle() {
        let mut vertices = vec![0.0; 18];
        let err = calculate_average_normals(&[0, 1], &mut vertices, 6, 3).unwrap_err();
        assert_eq!(err, GeometryError::IncompleteTriangle { index_count: 2 });
    }

    #[test]
    fn rejects_normal_slot_past_stride() {
        let mut vertices = vec![0.0; 18];
        assert!(matches!(
            calculate_average_normals(&[0, 1, 2], &mut vertices, 6, 4),
            Err(GeometryError::NormalSlotOutOfRange { .. })
        ));
    }

    #[test]
    fn unreferenced_vertex_keeps_zero_normal() {
        let mut vertices = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
            5.0, 5.0, 5.0, 1.0, 1.0, 1.0,
        ];
        calculate_average_normals(&[0, 1, 2], &mut vertices, 6, 3).unwrap();
        assert_eq!(normal_of(&vertices, 6, 3, 3), Vec3::ZERO);
    }
}
