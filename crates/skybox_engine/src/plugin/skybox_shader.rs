//! Process-wide skybox shader program
//!
//! Every skybox draws with the same program. It is compiled on the first
//! controller construction and kept for the rest of the process; controllers
//! only hold `Arc` clones and never free it. [`reset_skybox_shader`] drops the
//! cached program so tests can start from a clean slate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::render::{RenderBackend, RenderResult, ShaderProgram};

/// Name of the vertex stage in the shader library
pub const SKYBOX_VERTEX_SHADER: &str = "skybox.vertex";

/// Name of the fragment stage in the shader library
pub const SKYBOX_FRAGMENT_SHADER: &str = "skybox.fragment";

static SKYBOX_SHADER: Mutex<Option<Arc<ShaderProgram>>> = Mutex::new(None);
static COMPILE_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Shared skybox program, compiling it on `backend` if this is the first use
///
/// A failed compilation leaves the cache empty, so the next call tries again.
pub fn skybox_shader(backend: &mut dyn RenderBackend) -> RenderResult<Arc<ShaderProgram>> {
    let mut cached = SKYBOX_SHADER.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(program) = cached.as_ref() {
        return Ok(Arc::clone(program));
    }

    let program = Arc::new(ShaderProgram::compile(
        backend,
        "skybox",
        SKYBOX_VERTEX_SHADER,
        SKYBOX_FRAGMENT_SHADER,
    )?);
    COMPILE_COUNT.fetch_add(1, Ordering::SeqCst);
    log::info!("Compiled shared skybox shader ({:?})", program.handle());

    *cached = Some(Arc::clone(&program));
    Ok(program)
}

/// Number of times the shared program has been compiled since the last reset
pub fn skybox_shader_compile_count() -> usize {
    COMPILE_COUNT.load(Ordering::SeqCst)
}

/// Whether the shared program currently exists
pub fn is_skybox_shader_compiled() -> bool {
    SKYBOX_SHADER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Drop the cached program and zero the compile counter
///
/// Returns the previous program. Materials still holding it keep it alive;
/// the next construction compiles a fresh one.
pub fn reset_skybox_shader() -> Option<Arc<ShaderProgram>> {
    let previous = SKYBOX_SHADER.lock().unwrap_or_else(PoisonError::into_inner).take();
    COMPILE_COUNT.store(0, Ordering::SeqCst);
    if previous.is_some() {
        log::debug!("Shared skybox shader reset");
    }
    previous
}
