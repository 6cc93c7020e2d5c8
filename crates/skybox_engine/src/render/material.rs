//! Material system
//!
//! A material pairs a shared, compiled [`ShaderProgram`] with per-instance
//! parameters and render state. Parameters and state belong to the material;
//! the program is only referenced.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use bitflags::bitflags;

use crate::foundation::collections::MaterialHandle;
use crate::foundation::math::Vec3;
use crate::render::{RenderBackend, RenderResult, ShaderProgram, TextureCube};

bitflags! {
    /// Fixed-function state a material draws with
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u32 {
        /// Test fragments against the depth buffer
        const DEPTH_TEST = 1;
        /// Write fragment depth to the depth buffer
        const DEPTH_WRITE = 1 << 1;
        /// Alpha-blended; drawn after opaque objects, back to front
        const TRANSPARENT = 1 << 2;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::DEPTH_TEST | Self::DEPTH_WRITE
    }
}

/// Named material parameter value
#[derive(Debug, Clone)]
pub enum MaterialParameter {
    /// Scalar uniform
    Float(f32),
    /// Vector uniform
    Vec3(Vec3),
    /// Cubemap sampler; the texture is owned by the caller
    TextureCube(Rc<TextureCube>),
}

/// Per-instance material
#[derive(Debug)]
pub struct Material {
    label: String,
    shader: Arc<ShaderProgram>,
    render_state: RenderState,
    parameters: BTreeMap<String, MaterialParameter>,
    gpu: Option<MaterialHandle>,
}

impl Material {
    /// Create a material for `shader` with default depth state
    pub fn new(label: impl Into<String>, shader: Arc<ShaderProgram>) -> Self {
        Self {
            label: label.into(),
            shader,
            render_state: RenderState::default(),
            parameters: BTreeMap::new(),
            gpu: None,
        }
    }

    /// Builder form of [`Material::set_depth_write`]
    pub fn with_depth_write(mut self, enabled: bool) -> Self {
        self.set_depth_write(enabled);
        self
    }

    /// Builder form of [`Material::set_transparent`]
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.set_transparent(transparent);
        self
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shared program this material draws with
    pub fn shader(&self) -> &Arc<ShaderProgram> {
        &self.shader
    }

    /// Current render state
    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    /// Enable or disable depth writes
    pub fn set_depth_write(&mut self, enabled: bool) {
        self.render_state.set(RenderState::DEPTH_WRITE, enabled);
    }

    /// Whether depth writes are enabled
    pub fn depth_write(&self) -> bool {
        self.render_state.contains(RenderState::DEPTH_WRITE)
    }

    /// Mark the material as alpha-blended
    pub fn set_transparent(&mut self, transparent: bool) {
        self.render_state.set(RenderState::TRANSPARENT, transparent);
    }

    /// Whether the material is alpha-blended
    pub fn is_transparent(&self) -> bool {
        self.render_state.contains(RenderState::TRANSPARENT)
    }

    /// Set a named parameter, returning the value it replaced
    pub fn set(&mut self, name: impl Into<String>, value: MaterialParameter) -> Option<MaterialParameter> {
        self.parameters.insert(name.into(), value)
    }

    /// Read a named parameter
    pub fn get(&self, name: &str) -> Option<&MaterialParameter> {
        self.parameters.get(name)
    }

    /// Read a named cubemap parameter
    pub fn texture_cube(&self, name: &str) -> Option<&Rc<TextureCube>> {
        match self.parameters.get(name) {
            Some(MaterialParameter::TextureCube(texture)) => Some(texture),
            _ => None,
        }
    }

    /// Backend handle if the uniform block has been created
    pub fn gpu_handle(&self) -> Option<MaterialHandle> {
        self.gpu
    }

    /// Allocate the backend uniform block; a second call reuses it
    pub fn create_resources(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<MaterialHandle> {
        if let Some(handle) = self.gpu {
            return Ok(handle);
        }
        let handle = backend.create_material(&self.label, self.shader.handle())?;
        self.gpu = Some(handle);
        Ok(handle)
    }

    /// Free the backend uniform block; the shared program is left alone
    pub fn release(&mut self, backend: &mut dyn RenderBackend) -> bool {
        match self.gpu.take() {
            Some(handle) => backend.release_material(handle),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    fn program(backend: &mut HeadlessBackend) -> Arc<ShaderProgram> {
        Arc::new(ShaderProgram::compile(backend, "skybox", "skybox.vertex", "skybox.fragment").unwrap())
    }

    #[test]
    fn test_default_render_state() {
        let mut backend = HeadlessBackend::new();
        let material = Material::new("default", program(&mut backend));
        assert!(material.depth_write());
        assert!(material.render_state().contains(RenderState::DEPTH_TEST));
        assert!(!material.is_transparent());
    }

    #[test]
    fn test_depth_write_toggle_keeps_depth_test() {
        let mut backend = HeadlessBackend::new();
        let material = Material::new("sky", program(&mut backend)).with_depth_write(false);
        assert!(!material.depth_write());
        assert!(material.render_state().contains(RenderState::DEPTH_TEST));
    }

    #[test]
    fn test_parameters_replace_previous_value() {
        let mut backend = HeadlessBackend::new();
        let mut material = Material::new("sky", program(&mut backend));
        let first = Rc::new(TextureCube::new("first"));
        let second = Rc::new(TextureCube::new("second"));

        assert!(material.set("environmentMap", MaterialParameter::TextureCube(Rc::clone(&first))).is_none());
        let previous = material.set("environmentMap", MaterialParameter::TextureCube(Rc::clone(&second)));

        assert!(matches!(previous, Some(MaterialParameter::TextureCube(t)) if Rc::ptr_eq(&t, &first)));
        assert!(Rc::ptr_eq(material.texture_cube("environmentMap").unwrap(), &second));

        material.set("exposure", MaterialParameter::Float(1.5));
        assert!(material.texture_cube("exposure").is_none());
    }

    #[test]
    fn test_shared_program_survives_material_release() {
        let mut backend = HeadlessBackend::new();
        let shader = program(&mut backend);
        let mut a = Material::new("a", Arc::clone(&shader));
        let mut b = Material::new("b", Arc::clone(&shader));

        a.create_resources(&mut backend).unwrap();
        b.create_resources(&mut backend).unwrap();
        assert_eq!(backend.live_material_count(), 2);

        assert!(a.release(&mut backend));
        assert!(!a.release(&mut backend));
        assert_eq!(backend.live_material_count(), 1);
        assert_eq!(Arc::strong_count(&shader), 3);
        assert_eq!(b.shader().handle(), shader.handle());
    }
}
