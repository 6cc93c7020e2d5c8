//! Scene Renderer
//!
//! Drives one frame: emits the scene's before-render event, then walks the
//! scene's objects (visibility, optional frustum culling, per-frame object
//! limit, render queue) and submits draws to the backend.
//!
//! The [`Renderer`] trait is the narrow surface frame listeners see. Its
//! [`Renderer::render_queue`] entry point draws an explicit list immediately,
//! outside the scene traversal, which is how plugins inject draws that must
//! land before the scene's own.

use crate::config::SceneRendererConfig;
use crate::foundation::math::Mat4;
use crate::render::{Camera, DrawCommand, DrawPass, HeadlessBackend, RenderBackend, RenderError, RenderResult};
use crate::scene::{Frustum, RenderNotifier, RenderQueue, RenderableObject, Scene};

/// Draw entry point exposed to frame listeners
pub trait Renderer {
    /// Draw `objects` for `camera` right now, independent of any scene
    ///
    /// Invisible objects are skipped; objects with culling enabled are
    /// frustum-tested if the renderer culls. The per-frame object limit does
    /// not apply. Returns the number of draws submitted.
    fn render_queue(&mut self, objects: &[&RenderableObject], camera: &Camera) -> RenderResult<usize>;

    /// Index of the frame being rendered (starts at 1; 0 before the first frame)
    fn frame_index(&self) -> u64;
}

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame these counters belong to
    pub frame_index: u64,
    /// Before-render listeners that ran
    pub listeners_notified: usize,
    /// Draws submitted through [`Renderer::render_queue`]
    pub injected_draws: usize,
    /// Draws produced by the scene traversal
    pub scene_draws: usize,
    /// Objects skipped by the frustum test
    pub culled_objects: usize,
}

/// Scene renderer over a [`RenderBackend`]
pub struct SceneRenderer<B: RenderBackend> {
    backend: B,
    config: SceneRendererConfig,
    frame_index: u64,
    next_sequence: u64,
    stats: FrameStats,
}

/// Scene renderer recording into a [`HeadlessBackend`]
pub type HeadlessRenderer = SceneRenderer<HeadlessBackend>;

impl<B: RenderBackend> SceneRenderer<B> {
    /// Create a new scene renderer wrapping a backend
    pub fn new(backend: B, config: SceneRendererConfig) -> Self {
        log::debug!(
            "Scene renderer created (frustum culling: {}, max objects per frame: {})",
            config.enable_frustum_culling,
            config.max_objects_per_frame
        );
        Self {
            backend,
            config,
            frame_index: 0,
            next_sequence: 0,
            stats: FrameStats::default(),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(backend: B) -> Self {
        Self::new(backend, SceneRendererConfig::default())
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get mutable access to the underlying backend, e.g. to create resources
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Active configuration
    pub fn config(&self) -> &SceneRendererConfig {
        &self.config
    }

    /// Counters of the most recent frame
    pub fn last_stats(&self) -> FrameStats {
        self.stats
    }

    /// Render a frame of `scene` from `camera`
    ///
    /// 1. Refreshes world matrices
    /// 2. Emits the scene's before-render event with this renderer
    /// 3. Draws the scene's visible objects
    ///
    /// Everything submitted in step 2 precedes the traversal draws.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> RenderResult<FrameStats> {
        self.frame_index += 1;
        self.stats = FrameStats {
            frame_index: self.frame_index,
            ..FrameStats::default()
        };

        scene.update();

        if let Some(event) = scene.before_render() {
            let notified = event.emit(self, scene, camera);
            self.stats.listeners_notified = notified;
        }

        let objects = scene.objects();
        let list: Vec<&RenderableObject> = objects.iter().collect();
        self.draw_list(&list, camera, DrawPass::Scene)?;

        log::trace!("Frame {} of '{}': {:?}", self.frame_index, RenderNotifier::name(scene), self.stats);
        Ok(self.stats)
    }

    fn draw_list(&mut self, objects: &[&RenderableObject], camera: &Camera, pass: DrawPass) -> RenderResult<usize> {
        let view_projection = camera.view_projection_matrix();
        let frustum = self
            .config
            .enable_frustum_culling
            .then(|| Frustum::from_matrix(&view_projection));

        let mut visible: Vec<&RenderableObject> = Vec::with_capacity(objects.len());
        for &obj in objects {
            if !obj.should_render() {
                continue;
            }
            if let (true, Some(frustum)) = (obj.culling, &frustum) {
                if !frustum.intersects_aabb(&obj.world_bounds()) {
                    self.stats.culled_objects += 1;
                    continue;
                }
            }
            visible.push(obj);
        }

        // The per-frame limit only caps the scene traversal
        if pass == DrawPass::Scene {
            let budget = self.config.max_objects_per_frame.saturating_sub(self.stats.scene_draws);
            if visible.len() > budget {
                log::warn!(
                    "{} objects exceed the per-frame limit of {}; dropping the rest",
                    visible.len(),
                    self.config.max_objects_per_frame
                );
                visible.truncate(budget);
            }
        }

        let queue = RenderQueue::from_objects(&visible);
        let mut drawn = 0;
        for obj in queue.iter() {
            self.draw(obj, &view_projection, pass)?;
            drawn += 1;
        }

        match pass {
            DrawPass::Injected => self.stats.injected_draws += drawn,
            DrawPass::Scene => self.stats.scene_draws += drawn,
        }
        Ok(drawn)
    }

    fn draw(&mut self, obj: &RenderableObject, view_projection: &Mat4, pass: DrawPass) -> RenderResult<()> {
        let geometry = obj
            .geometry
            .gpu_handle()
            .ok_or_else(|| RenderError::RenderingFailed(format!("'{}' has no uploaded geometry", obj.name)))?;
        let material = obj
            .material
            .gpu_handle()
            .ok_or_else(|| RenderError::RenderingFailed(format!("'{}' has no material resources", obj.name)))?;

        self.next_sequence += 1;
        self.backend.submit(DrawCommand {
            frame: self.frame_index,
            sequence: self.next_sequence,
            pass,
            label: obj.name.clone(),
            shader: obj.material.shader().handle(),
            geometry,
            material,
            index_count: obj.geometry.index_count(),
            world: *obj.world_matrix(),
            view_projection: *view_projection,
            render_state: obj.material.render_state(),
        })
    }
}

impl<B: RenderBackend> Renderer for SceneRenderer<B> {
    fn render_queue(&mut self, objects: &[&RenderableObject], camera: &Camera) -> RenderResult<usize> {
        self.draw_list(objects, camera, DrawPass::Injected)
    }

    fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl SceneRenderer<HeadlessBackend> {
    /// Headless renderer with default configuration
    pub fn headless() -> Self {
        Self::with_defaults(HeadlessBackend::new())
    }
}
