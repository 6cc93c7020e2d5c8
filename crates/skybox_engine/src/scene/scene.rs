//! Scene container and the before-render notification point

use std::cell::{Ref, RefCell, RefMut};

use crate::events::FrameEvent;
use crate::scene::RenderableObject;

/// Something a renderer draws that may announce each frame before drawing it
///
/// Plugins attach to the before-render event to submit their own draws ahead
/// of the scene's traversal. A collaborator without such a point returns
/// `None`, and attaching to it is a configuration error.
pub trait RenderNotifier {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Event emitted once per frame before the scene's own objects are drawn
    fn before_render(&self) -> Option<&FrameEvent>;
}

/// Flat list of renderable objects plus a before-render event
///
/// Objects sit behind a `RefCell` so listeners, which only see the scene by
/// shared reference, can still inspect it while a frame is being prepared.
#[derive(Debug)]
pub struct Scene {
    name: String,
    objects: RefCell<Vec<RenderableObject>>,
    before_render: FrameEvent,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: RefCell::new(Vec::new()),
            before_render: FrameEvent::new("beforerender"),
        }
    }

    /// Add an object, returning its index
    pub fn add(&self, mut object: RenderableObject) -> usize {
        object.update_world_matrix();
        let mut objects = self.objects.borrow_mut();
        log::debug!("Scene '{}': added '{}'", self.name, object.name);
        objects.push(object);
        objects.len() - 1
    }

    /// Number of objects in the scene
    pub fn object_count(&self) -> usize {
        self.objects.borrow().len()
    }

    /// Read access to the objects
    pub fn objects(&self) -> Ref<'_, Vec<RenderableObject>> {
        self.objects.borrow()
    }

    /// Write access to the objects
    pub fn objects_mut(&self) -> RefMut<'_, Vec<RenderableObject>> {
        self.objects.borrow_mut()
    }

    /// The before-render event
    pub fn before_render_event(&self) -> &FrameEvent {
        &self.before_render
    }

    /// Refresh cached world matrices
    pub fn update(&self) {
        for object in self.objects.borrow_mut().iter_mut() {
            object.update_world_matrix();
        }
    }
}

impl RenderNotifier for Scene {
    fn name(&self) -> &str {
        &self.name
    }

    fn before_render(&self) -> Option<&FrameEvent> {
        Some(&self.before_render)
    }
}
