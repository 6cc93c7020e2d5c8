//! Geometry: CPU-side vertex/index data plus the backend buffers it was
//! uploaded to.

use bytemuck::{Pod, Zeroable};

use crate::foundation::collections::GeometryHandle;
use crate::foundation::math::Vec3;
use crate::render::{RenderBackend, RenderResult};
use crate::scene::AABB;

/// Interleaved vertex layout: position, normal, texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

/// Mesh description owned by a single renderable
#[derive(Debug)]
pub struct Geometry {
    label: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounds: AABB,
    gpu: Option<GeometryHandle>,
}

impl Geometry {
    /// Create geometry from raw vertex and index data
    pub fn new(label: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounds = bounds_of(&vertices);
        Self {
            label: label.into(),
            vertices,
            indices,
            bounds,
            gpu: None,
        }
    }

    /// Axis-aligned cube centred on the origin, four vertices per face
    ///
    /// Faces wind counter-clockwise when seen from outside; each face maps the
    /// full [0, 1] texture range.
    pub fn cube(label: impl Into<String>, half_extent: f32) -> Self {
        // (normal, u axis, v axis) with u × v = normal
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u_axis, v_axis) in FACES {
            let n = Vec3::from(normal);
            let u = Vec3::from(u_axis);
            let v = Vec3::from(v_axis);
            let base = vertices.len() as u32;

            for (su, sv) in CORNERS {
                let p = (n + u * su + v * sv) * half_extent;
                vertices.push(Vertex {
                    position: [p.x, p.y, p.z],
                    normal,
                    tex_coord: [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(label, vertices, indices)
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index data
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of indices to draw
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Object-space bounding box
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Vertex data as raw bytes, ready for a buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Backend handle if the geometry has been uploaded
    pub fn gpu_handle(&self) -> Option<GeometryHandle> {
        self.gpu
    }

    /// Upload to the backend; a second call reuses the existing buffers
    pub fn upload(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<GeometryHandle> {
        if let Some(handle) = self.gpu {
            return Ok(handle);
        }
        let handle = backend.upload_geometry(&self.label, self.vertex_bytes(), &self.indices)?;
        self.gpu = Some(handle);
        Ok(handle)
    }

    /// Free the backend buffers; returns `false` if nothing was resident
    pub fn release(&mut self, backend: &mut dyn RenderBackend) -> bool {
        match self.gpu.take() {
            Some(handle) => backend.release_geometry(handle),
            None => false,
        }
    }
}

fn bounds_of(vertices: &[Vertex]) -> AABB {
    let Some(first) = vertices.first() else {
        return AABB::new(Vec3::zeros(), Vec3::zeros());
    };

    let start = Vec3::from(first.position);
    let (min, max) = vertices.iter().fold((start, start), |(min, max), vertex| {
        let p = Vec3::from(vertex.position);
        (min.inf(&p), max.sup(&p))
    });
    AABB::new(min, max)
}
