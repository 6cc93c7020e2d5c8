//! Scene plugins
//!
//! Components that hook into a scene's frame lifecycle instead of living in
//! its object list.

pub mod skybox;
pub mod skybox_shader;

pub use skybox::{SkyboxController, SkyboxOptions};
pub use skybox_shader::{
    is_skybox_shader_compiled, reset_skybox_shader, skybox_shader, skybox_shader_compile_count,
    SKYBOX_FRAGMENT_SHADER, SKYBOX_VERTEX_SHADER,
};
