//! Shader programs and the named source library
//!
//! Sources are looked up by name (`"skybox.vertex"`, `"skybox.fragment"`) from
//! a table embedded at compile time, then compiled by the backend.

use crate::foundation::collections::ShaderProgramHandle;
use crate::render::{RenderBackend, RenderError, RenderResult};

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("skybox.vertex", include_str!("../../shaders/skybox.vert")),
    ("skybox.fragment", include_str!("../../shaders/skybox.frag")),
];

/// Look up built-in shader source by name
pub fn shader_source(name: &str) -> Option<&'static str> {
    BUILTIN_SOURCES
        .iter()
        .find(|(source_name, _)| *source_name == name)
        .map(|(_, source)| *source)
}

/// A compiled program
///
/// Immutable once compiled; shared by reference between materials.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    vertex_name: String,
    fragment_name: String,
    handle: ShaderProgramHandle,
}

impl ShaderProgram {
    /// Look up both stages by name and compile them on `backend`
    pub fn compile(
        backend: &mut dyn RenderBackend,
        label: &str,
        vertex_name: &str,
        fragment_name: &str,
    ) -> RenderResult<Self> {
        let vertex = shader_source(vertex_name).ok_or_else(|| {
            RenderError::ResourceCreationFailed(format!("unknown shader source '{vertex_name}'"))
        })?;
        let fragment = shader_source(fragment_name).ok_or_else(|| {
            RenderError::ResourceCreationFailed(format!("unknown shader source '{fragment_name}'"))
        })?;

        let handle = backend.compile_shader(label, vertex, fragment)?;
        Ok(Self {
            label: label.to_string(),
            vertex_name: vertex_name.to_string(),
            fragment_name: fragment_name.to_string(),
            handle,
        })
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the vertex stage source
    pub fn vertex_name(&self) -> &str {
        &self.vertex_name
    }

    /// Name of the fragment stage source
    pub fn fragment_name(&self) -> &str {
        &self.fragment_name
    }

    /// Backend handle of the linked program
    pub fn handle(&self) -> ShaderProgramHandle {
        self.handle
    }
}
