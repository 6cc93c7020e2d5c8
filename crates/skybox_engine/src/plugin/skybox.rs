//! Skybox controller
//!
//! Owns a unit cube with a cubemap material and keeps it centred on whatever
//! camera the attached scene is rendered from. The cube is drawn from the
//! scene's before-render event through [`Renderer::render_queue`], so it lands
//! ahead of every object the scene traversal produces. With depth writes off,
//! later scene draws always cover it, which makes it read as infinitely far
//! away.
//!
//! ```no_run
//! # use std::rc::Rc;
//! # use skybox_engine::plugin::{SkyboxController, SkyboxOptions};
//! # use skybox_engine::render::{HeadlessRenderer, TextureCube};
//! # use skybox_engine::scene::Scene;
//! let mut renderer = HeadlessRenderer::headless();
//! let scene = Rc::new(Scene::new("main"));
//! let sky = Rc::new(TextureCube::new("sky"));
//!
//! let mut skybox = SkyboxController::new(
//!     renderer.backend_mut(),
//!     SkyboxOptions::new().with_scene(scene.clone()).with_environment_map(sky),
//! )?;
//! // ... renderer.render(&scene, &camera) each frame ...
//! skybox.dispose(renderer.backend_mut());
//! # Ok::<(), skybox_engine::render::RenderError>(())
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::SkyboxSettings;
use crate::events::ListenerToken;
use crate::foundation::math::{Mat4, Vec3};
use crate::plugin::skybox_shader;
use crate::render::{
    Camera, Geometry, Material, MaterialParameter, RenderBackend, RenderError, RenderResult, Renderer, TextureCube,
};
use crate::scene::{RenderNotifier, RenderableObject};

const SKYBOX_LABEL: &str = "skybox";

/// Construction options
#[derive(Clone, Default)]
pub struct SkyboxOptions {
    /// Scene to attach to right away
    pub scene: Option<Rc<dyn RenderNotifier>>,
    /// Cubemap to sample
    pub environment_map: Option<Rc<TextureCube>>,
    /// Geometry and material settings
    pub settings: SkyboxSettings,
}

impl SkyboxOptions {
    /// Options with no scene, no cubemap and default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to `scene` on construction
    pub fn with_scene(mut self, scene: Rc<dyn RenderNotifier>) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Bind `texture` on construction
    pub fn with_environment_map(mut self, texture: Rc<TextureCube>) -> Self {
        self.environment_map = Some(texture);
        self
    }

    /// Override the default settings
    pub fn with_settings(mut self, settings: SkyboxSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl fmt::Debug for SkyboxOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkyboxOptions")
            .field("scene", &self.scene.as_ref().map(|scene| scene.name().to_string()))
            .field("environment_map", &self.environment_map.as_ref().map(|t| t.label().to_string()))
            .field("settings", &self.settings)
            .finish()
    }
}

/// State the per-frame listener touches
#[derive(Debug)]
struct SkyboxState {
    renderable: RenderableObject,
    injections: u64,
}

impl SkyboxState {
    fn before_render(&mut self, renderer: &mut dyn Renderer, camera: &Camera) {
        self.renderable.transform.position = camera.world_position();
        self.renderable.update_world_matrix();

        match renderer.render_queue(&[&self.renderable], camera) {
            Ok(0) => log::warn!("Skybox not drawn (frame {})", renderer.frame_index()),
            Ok(_) => {
                self.injections += 1;
                log::trace!(
                    "Skybox drawn at {:?} (frame {})",
                    self.renderable.transform.position,
                    renderer.frame_index()
                );
            }
            Err(err) => log::error!("Skybox draw failed: {}", err),
        }
    }
}

struct SceneAttachment {
    scene: Weak<dyn RenderNotifier>,
    scene_name: String,
    token: ListenerToken,
}

/// Environment backdrop locked to the rendering camera
///
/// Attached to at most one scene at a time. GPU resources are released by
/// [`SkyboxController::dispose`] only; dropping a controller detaches it but
/// leaves its buffers to the backend.
pub struct SkyboxController {
    state: Rc<RefCell<SkyboxState>>,
    attachment: Option<SceneAttachment>,
    settings: SkyboxSettings,
    disposed: bool,
}

impl SkyboxController {
    /// Build the cube and material, then apply the optional scene and cubemap
    ///
    /// Compiles the shared skybox shader on first use. Allocation failures
    /// release whatever was already created before returning.
    pub fn new(backend: &mut dyn RenderBackend, options: SkyboxOptions) -> RenderResult<Self> {
        let SkyboxOptions {
            scene,
            environment_map,
            settings,
        } = options;

        let shader = skybox_shader::skybox_shader(backend)?;

        let mut material = Material::new(SKYBOX_LABEL, shader).with_depth_write(false);
        material.create_resources(backend)?;

        let mut geometry = Geometry::cube(SKYBOX_LABEL, settings.half_extent);
        if let Err(err) = geometry.upload(backend) {
            material.release(backend);
            return Err(err);
        }

        let mut renderable = RenderableObject::new(SKYBOX_LABEL, geometry, material);
        renderable.culling = false;

        let mut controller = Self {
            state: Rc::new(RefCell::new(SkyboxState {
                renderable,
                injections: 0,
            })),
            attachment: None,
            settings,
            disposed: false,
        };
        log::debug!("Skybox created (half extent {})", controller.settings.half_extent);

        if let Some(scene) = scene {
            if let Err(err) = controller.attach_scene(scene) {
                controller.dispose(backend);
                return Err(err);
            }
        }
        if let Some(texture) = environment_map {
            controller.set_env_map(texture);
        }

        Ok(controller)
    }

    /// Attach to `scene`, detaching from the current scene first
    ///
    /// Fails with [`RenderError::Configuration`] if the scene has no
    /// before-render event; the controller is left detached.
    pub fn attach_scene(&mut self, scene: Rc<dyn RenderNotifier>) -> RenderResult<()> {
        if self.disposed {
            return Err(RenderError::Configuration(format!(
                "disposed skybox cannot attach to scene '{}'",
                scene.name()
            )));
        }

        self.detach_scene();

        let Some(event) = scene.before_render() else {
            return Err(RenderError::Configuration(format!(
                "scene '{}' has no before-render event",
                scene.name()
            )));
        };

        let state = Rc::downgrade(&self.state);
        let token = event.subscribe(move |renderer, _scene, camera| {
            let Some(shared) = state.upgrade() else {
                return;
            };
            shared.borrow_mut().before_render(renderer, camera);
        });

        log::debug!("Skybox attached to scene '{}'", scene.name());
        self.attachment = Some(SceneAttachment {
            scene: Rc::downgrade(&scene),
            scene_name: scene.name().to_string(),
            token,
        });
        Ok(())
    }

    /// Stop drawing into the attached scene
    ///
    /// Returns `true` if a listener was removed. Calling this when detached,
    /// or after the scene was dropped, does nothing.
    pub fn detach_scene(&mut self) -> bool {
        let Some(attachment) = self.attachment.take() else {
            return false;
        };

        let Some(scene) = attachment.scene.upgrade() else {
            log::debug!("Skybox scene '{}' already dropped", attachment.scene_name);
            return false;
        };

        let removed = scene
            .before_render()
            .is_some_and(|event| event.unsubscribe(attachment.token));
        log::debug!("Skybox detached from scene '{}'", attachment.scene_name);
        removed
    }

    /// Bind `texture` as the environment map, replacing the previous one
    ///
    /// The texture does not need to be loaded yet.
    pub fn set_env_map(&mut self, texture: Rc<TextureCube>) {
        log::debug!("Skybox environment map set to '{}'", texture.label());
        self.state.borrow_mut().renderable.material.set(
            self.settings.environment_map_parameter.clone(),
            MaterialParameter::TextureCube(texture),
        );
    }

    /// Currently bound environment map
    pub fn environment_map(&self) -> Option<Rc<TextureCube>> {
        self.state
            .borrow()
            .renderable
            .material
            .texture_cube(&self.settings.environment_map_parameter)
            .cloned()
    }

    /// Whether a scene attachment is held
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// The attached scene, if attached and still alive
    pub fn scene(&self) -> Option<Rc<dyn RenderNotifier>> {
        self.attachment.as_ref().and_then(|attachment| attachment.scene.upgrade())
    }

    /// Whether the controller is attached to exactly `scene`
    pub fn is_attached_to(&self, scene: &dyn RenderNotifier) -> bool {
        self.scene().is_some_and(|attached| {
            Rc::as_ptr(&attached).cast::<()>() == (scene as *const dyn RenderNotifier).cast::<()>()
        })
    }

    /// Position of the cube, i.e. the last camera position it was drawn at
    pub fn position(&self) -> Vec3 {
        self.state.borrow().renderable.transform.position
    }

    /// World matrix the cube was last drawn with
    pub fn world_matrix(&self) -> Mat4 {
        *self.state.borrow().renderable.world_matrix()
    }

    /// Number of frames the cube was submitted for
    pub fn injection_count(&self) -> u64 {
        self.state.borrow().injections
    }

    /// The cube renderable
    pub fn renderable(&self) -> Ref<'_, RenderableObject> {
        Ref::map(self.state.borrow(), |state| &state.renderable)
    }

    /// Settings the controller was built with
    pub fn settings(&self) -> &SkyboxSettings {
        &self.settings
    }

    /// Whether [`SkyboxController::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Detach and release the cube's geometry and material resources
    ///
    /// The shared shader stays alive. A second call does nothing.
    pub fn dispose(&mut self, backend: &mut dyn RenderBackend) {
        if self.disposed {
            log::debug!("Skybox already disposed");
            return;
        }

        self.detach_scene();

        let mut state = self.state.borrow_mut();
        let geometry = state.renderable.geometry.release(backend);
        let material = state.renderable.material.release(backend);
        self.disposed = true;
        log::debug!(
            "Skybox disposed (geometry released: {}, material released: {})",
            geometry,
            material
        );
    }
}

impl fmt::Debug for SkyboxController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkyboxController")
            .field("scene", &self.attachment.as_ref().map(|a| a.scene_name.as_str()))
            .field("position", &self.position())
            .field("settings", &self.settings)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Drop for SkyboxController {
    fn drop(&mut self) {
        if !self.disposed {
            log::warn!("Skybox dropped without dispose(); GPU resources are left to the backend");
            self.detach_scene();
        }
    }
}
