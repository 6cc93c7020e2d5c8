//! # Skybox Engine
//!
//! Environment backdrop rendering for a small scene renderer.
//!
//! ## Features
//!
//! - **Skybox Plugin**: camera-locked cubemap cube drawn ahead of the scene
//! - **Shared Shader**: one skybox program per process, compiled on first use
//! - **Frame Events**: token-based before-render listeners
//! - **Scene Renderer**: frustum culling, render queues and draw recording
//! - **Headless Backend**: CPU recording backend for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use skybox_engine::prelude::*;
//!
//! fn main() -> Result<(), RenderError> {
//!     let mut renderer = HeadlessRenderer::headless();
//!     let scene = Rc::new(Scene::new("main"));
//!     let sky = Rc::new(TextureCube::new("sky"));
//!
//!     let mut skybox = SkyboxController::new(
//!         renderer.backend_mut(),
//!         SkyboxOptions::new().with_scene(scene.clone()).with_environment_map(sky),
//!     )?;
//!
//!     let camera = Camera::default();
//!     renderer.render(&scene, &camera)?;
//!
//!     skybox.dispose(renderer.backend_mut());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod events;
pub mod foundation;
pub mod plugin;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EngineSettings, SceneRendererConfig, SkyboxSettings},
        events::{FrameEvent, ListenerToken},
        foundation::math::{Mat4, Transform, Vec3},
        plugin::{SkyboxController, SkyboxOptions},
        render::{
            Camera, CubeFace, Geometry, HeadlessBackend, HeadlessRenderer, Material, RenderBackend, RenderError,
            RenderResult, Renderer, SceneRenderer, TextureCube,
        },
        scene::{RenderNotifier, RenderableObject, Scene},
    };
}
