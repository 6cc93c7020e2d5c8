//! Backend abstraction trait for the rendering system
//!
//! A backend owns everything that lives on the GPU: compiled programs, vertex
//! and index buffers, material uniform blocks. The engine only holds handles to
//! them and releases them explicitly.

use crate::foundation::collections::{GeometryHandle, MaterialHandle, ShaderProgramHandle};
use crate::foundation::math::Mat4;
use crate::render::{RenderResult, RenderState};

/// Which part of the frame a draw belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    /// Submitted through the explicit-list entry point, outside scene traversal
    Injected,
    /// Produced by the scene's own visible-object traversal
    Scene,
}

/// A single recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Frame the draw belongs to (starts at 1)
    pub frame: u64,
    /// Monotonic submission order across all frames
    pub sequence: u64,
    /// Pass the draw was issued from
    pub pass: DrawPass,
    /// Label of the drawn object
    pub label: String,
    /// Program used for the draw
    pub shader: ShaderProgramHandle,
    /// Vertex/index buffers
    pub geometry: GeometryHandle,
    /// Material uniform block
    pub material: MaterialHandle,
    /// Number of indices to draw
    pub index_count: u32,
    /// Object-to-world matrix
    pub world: Mat4,
    /// View-projection matrix of the camera the draw is for
    pub view_projection: Mat4,
    /// Depth and blending state
    pub render_state: RenderState,
}

/// Main rendering backend trait
///
/// Abstracts over the graphics API. All methods are called from the frame
/// thread; implementations need not be thread-safe.
pub trait RenderBackend {
    /// Compile and link a shader program from vertex and fragment source
    fn compile_shader(&mut self, label: &str, vertex: &str, fragment: &str) -> RenderResult<ShaderProgramHandle>;

    /// Upload vertex and index data into GPU buffers
    fn upload_geometry(&mut self, label: &str, vertex_bytes: &[u8], indices: &[u32]) -> RenderResult<GeometryHandle>;

    /// Allocate the per-material uniform block for a program
    fn create_material(&mut self, label: &str, shader: ShaderProgramHandle) -> RenderResult<MaterialHandle>;

    /// Free geometry buffers; returns `false` for unknown or already freed handles
    fn release_geometry(&mut self, handle: GeometryHandle) -> bool;

    /// Free a material uniform block; returns `false` for unknown or already freed handles
    fn release_material(&mut self, handle: MaterialHandle) -> bool;

    /// Record a draw
    fn submit(&mut self, draw: DrawCommand) -> RenderResult<()>;
}
