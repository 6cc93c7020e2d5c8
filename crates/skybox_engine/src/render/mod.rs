//! Rendering collaborators
//!
//! The object model the skybox is built from (geometry, material, shader,
//! cubemap texture), the camera, the [`RenderBackend`] seam that owns GPU
//! resources, and the [`Renderer`] draw path with its explicit-list entry
//! point.

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod headless;
pub mod material;
pub mod renderer;
pub mod shader;
pub mod texture;

pub use backend::{DrawCommand, DrawPass, RenderBackend};
pub use camera::Camera;
pub use geometry::{Geometry, Vertex};
pub use headless::HeadlessBackend;
pub use material::{Material, MaterialParameter, RenderState};
pub use renderer::{FrameStats, HeadlessRenderer, Renderer, SceneRenderer};
pub use shader::{shader_source, ShaderProgram};
pub use texture::{CubeFace, TextureCube};

/// Errors raised by the rendering layer
///
/// Construction and attachment failures propagate synchronously to the caller;
/// nothing in this crate retries them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Renderer or backend initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A draw could not be recorded or submitted
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// GPU resource (buffer, uniform block, shader program) creation failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    BackendError(String),

    /// A collaborator does not provide what the caller relies on, e.g. a scene
    /// without a before-render notification point
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
