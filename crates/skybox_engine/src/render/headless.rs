//! Headless backend
//!
//! Records every resource allocation and draw on the CPU instead of talking to
//! a GPU. Used by tests, tools and the demo application, and as the reference
//! for what a real backend must track.

use crate::foundation::collections::{GeometryHandle, HandleMap, MaterialHandle, ShaderProgramHandle};
use crate::render::{DrawCommand, RenderBackend, RenderError, RenderResult};

#[derive(Debug)]
struct ShaderRecord {
    label: String,
}

#[derive(Debug)]
struct GeometryRecord {
    label: String,
    vertex_bytes: usize,
    index_count: usize,
}

#[derive(Debug)]
struct MaterialRecord {
    label: String,
    shader: ShaderProgramHandle,
}

/// CPU-side recording backend
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    shaders: HandleMap<ShaderProgramHandle, ShaderRecord>,
    geometries: HandleMap<GeometryHandle, GeometryRecord>,
    materials: HandleMap<MaterialHandle, MaterialRecord>,
    draws: Vec<DrawCommand>,
    shader_compiles: usize,
    fail_allocations: bool,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent allocation fail, to exercise error paths
    pub fn set_fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    /// Number of `compile_shader` calls that succeeded on this backend
    pub fn shader_compile_count(&self) -> usize {
        self.shader_compiles
    }

    /// Number of live geometry allocations
    pub fn live_geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of live material allocations
    pub fn live_material_count(&self) -> usize {
        self.materials.len()
    }

    /// Whether a geometry handle is still allocated
    pub fn is_geometry_live(&self, handle: GeometryHandle) -> bool {
        self.geometries.contains_key(handle)
    }

    /// Whether a material handle is still allocated
    pub fn is_material_live(&self, handle: MaterialHandle) -> bool {
        self.materials.contains_key(handle)
    }

    /// Uploaded vertex buffer size in bytes
    pub fn geometry_vertex_bytes(&self, handle: GeometryHandle) -> Option<usize> {
        self.geometries.get(handle).map(|record| record.vertex_bytes)
    }

    /// Program a material was created for
    pub fn material_shader(&self, handle: MaterialHandle) -> Option<ShaderProgramHandle> {
        self.materials.get(handle).map(|record| record.shader)
    }

    /// All draws recorded so far, in submission order
    pub fn draws(&self) -> &[DrawCommand] {
        &self.draws
    }

    /// Drain the recorded draws
    pub fn take_draws(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.draws)
    }

    fn check_allocation(&self, what: &str, label: &str) -> RenderResult<()> {
        if self.fail_allocations {
            return Err(RenderError::ResourceCreationFailed(format!(
                "headless backend refused {what} allocation for '{label}'"
            )));
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile_shader(&mut self, label: &str, vertex: &str, fragment: &str) -> RenderResult<ShaderProgramHandle> {
        self.check_allocation("shader", label)?;
        if vertex.trim().is_empty() || fragment.trim().is_empty() {
            return Err(RenderError::ResourceCreationFailed(format!(
                "shader '{label}' has an empty stage"
            )));
        }

        self.shader_compiles += 1;
        let handle = self.shaders.insert(ShaderRecord { label: label.to_string() });
        log::debug!("Compiled shader '{}' as {:?}", label, handle);
        Ok(handle)
    }

    fn upload_geometry(&mut self, label: &str, vertex_bytes: &[u8], indices: &[u32]) -> RenderResult<GeometryHandle> {
        self.check_allocation("geometry", label)?;
        let handle = self.geometries.insert(GeometryRecord {
            label: label.to_string(),
            vertex_bytes: vertex_bytes.len(),
            index_count: indices.len(),
        });
        log::trace!("Uploaded geometry '{}' ({} bytes, {} indices)", label, vertex_bytes.len(), indices.len());
        Ok(handle)
    }

    fn create_material(&mut self, label: &str, shader: ShaderProgramHandle) -> RenderResult<MaterialHandle> {
        // Programs are process-wide and may come from another context, so the
        // handle is recorded without validation.
        self.check_allocation("material", label)?;
        Ok(self.materials.insert(MaterialRecord { label: label.to_string(), shader }))
    }

    fn release_geometry(&mut self, handle: GeometryHandle) -> bool {
        match self.geometries.remove(handle) {
            Some(record) => {
                log::trace!("Released geometry '{}' ({} indices)", record.label, record.index_count);
                true
            }
            None => false,
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) -> bool {
        match self.materials.remove(handle) {
            Some(record) => {
                log::trace!("Released material '{}'", record.label);
                true
            }
            None => false,
        }
    }

    fn submit(&mut self, draw: DrawCommand) -> RenderResult<()> {
        if !self.geometries.contains_key(draw.geometry) {
            return Err(RenderError::RenderingFailed(format!(
                "draw '{}' uses released geometry",
                draw.label
            )));
        }
        if !self.materials.contains_key(draw.material) {
            return Err(RenderError::RenderingFailed(format!(
                "draw '{}' uses released material",
                draw.label
            )));
        }
        if let Some(shader) = self.shaders.get(draw.shader) {
            log::trace!("Draw '{}' with '{}' ({:?})", draw.label, shader.label, draw.pass);
        }
        self.draws.push(draw);
        Ok(())
    }
}
