//! Render queue for batched rendering
//!
//! Organizes the objects of one draw call into material batches. Opaque
//! objects come first in ascending `render_order`, transparent ones after them
//! in descending order. Batches keep the order in which their material first
//! appears, so sorting survives batching.

use crate::foundation::collections::MaterialHandle;
use crate::scene::RenderableObject;

/// A batch of objects sharing the same material
#[derive(Debug)]
pub struct RenderBatch<'a> {
    /// Material used by all objects in this batch; `None` if not yet created
    pub material: Option<MaterialHandle>,

    /// Objects in this batch
    pub objects: Vec<&'a RenderableObject>,
}

impl<'a> RenderBatch<'a> {
    /// Create a new empty batch for a material
    pub fn new(material: Option<MaterialHandle>) -> Self {
        Self {
            material,
            objects: Vec::new(),
        }
    }

    /// Add an object to this batch
    pub fn add_object(&mut self, object: &'a RenderableObject) {
        self.objects.push(object);
    }

    /// Get the number of objects in this batch
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// Render queue for a single draw call
#[derive(Debug, Default)]
pub struct RenderQueue<'a> {
    opaque_batches: Vec<RenderBatch<'a>>,
    transparent_batches: Vec<RenderBatch<'a>>,
}

impl<'a> RenderQueue<'a> {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a render queue from objects that already passed visibility tests
    pub fn from_objects(objects: &[&'a RenderableObject]) -> Self {
        let mut opaque: Vec<&'a RenderableObject> =
            objects.iter().copied().filter(|obj| !obj.is_transparent()).collect();
        let mut transparent: Vec<&'a RenderableObject> =
            objects.iter().copied().filter(|obj| obj.is_transparent()).collect();

        // Stable sorts: equal keys keep submission order
        opaque.sort_by_key(|obj| obj.render_order);
        transparent.sort_by_key(|obj| std::cmp::Reverse(obj.render_order));

        Self {
            opaque_batches: Self::batch_by_material(&opaque),
            transparent_batches: Self::batch_by_material(&transparent),
        }
    }

    fn batch_by_material(objects: &[&'a RenderableObject]) -> Vec<RenderBatch<'a>> {
        let mut batches: Vec<RenderBatch<'a>> = Vec::new();

        for &obj in objects {
            let material = obj.material.gpu_handle();
            match batches.iter_mut().find(|batch| batch.material == material) {
                Some(batch) => batch.add_object(obj),
                None => {
                    let mut batch = RenderBatch::new(material);
                    batch.add_object(obj);
                    batches.push(batch);
                }
            }
        }

        batches
    }

    /// Opaque batches, in draw order
    pub fn opaque_batches(&self) -> &[RenderBatch<'a>] {
        &self.opaque_batches
    }

    /// Transparent batches, in draw order
    pub fn transparent_batches(&self) -> &[RenderBatch<'a>] {
        &self.transparent_batches
    }

    /// Every queued object in draw order
    pub fn iter(&self) -> impl Iterator<Item = &'a RenderableObject> + '_ {
        self.opaque_batches
            .iter()
            .chain(&self.transparent_batches)
            .flat_map(|batch| batch.objects.iter().copied())
    }

    /// Get total number of opaque objects
    pub fn opaque_object_count(&self) -> usize {
        self.opaque_batches.iter().map(RenderBatch::object_count).sum()
    }

    /// Get total number of transparent objects
    pub fn transparent_object_count(&self) -> usize {
        self.transparent_batches.iter().map(RenderBatch::object_count).sum()
    }

    /// Get total number of objects in the queue
    pub fn total_object_count(&self) -> usize {
        self.opaque_object_count() + self.transparent_object_count()
    }

    /// Get total number of batches
    pub fn batch_count(&self) -> usize {
        self.opaque_batches.len() + self.transparent_batches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Geometry, HeadlessBackend, Material, ShaderProgram};
    use std::sync::Arc;

    struct Fixture {
        backend: HeadlessBackend,
        shader: Arc<ShaderProgram>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut backend = HeadlessBackend::new();
            let shader = Arc::new(
                ShaderProgram::compile(&mut backend, "test", "skybox.vertex", "skybox.fragment").unwrap(),
            );
            Self { backend, shader }
        }

        fn material(&mut self, label: &str, transparent: bool) -> Material {
            let mut material = Material::new(label, Arc::clone(&self.shader)).with_transparent(transparent);
            material.create_resources(&mut self.backend).unwrap();
            material
        }

        fn object(&mut self, name: &str, transparent: bool, render_order: i32) -> RenderableObject {
            let material = self.material(name, transparent);
            RenderableObject::new(name, Geometry::cube(name, 1.0), material).with_render_order(render_order)
        }
    }

    #[test]
    fn test_render_batch() {
        let mut fixture = Fixture::new();
        let obj = fixture.object("a", false, 0);
        let mut batch = RenderBatch::new(obj.material.gpu_handle());
        assert_eq!(batch.object_count(), 0);

        batch.add_object(&obj);
        assert_eq!(batch.object_count(), 1);
    }

    #[test]
    fn test_render_queue_batching() {
        let mut fixture = Fixture::new();
        let a = fixture.object("a", false, 0);
        let b = fixture.object("b", false, 0);

        let queue = RenderQueue::from_objects(&[&a, &b, &a]);

        assert_eq!(queue.total_object_count(), 3);
        assert_eq!(queue.batch_count(), 2); // 2 unique materials
        assert_eq!(queue.opaque_batches()[0].material, a.material.gpu_handle());
        assert_eq!(queue.opaque_batches()[0].object_count(), 2);
    }

    #[test]
    fn test_render_queue_transparency_separation() {
        let mut fixture = Fixture::new();
        let opaque = fixture.object("opaque", false, 0);
        let glass = fixture.object("glass", true, 0);

        let queue = RenderQueue::from_objects(&[&glass, &opaque]);

        assert_eq!(queue.opaque_object_count(), 1);
        assert_eq!(queue.transparent_object_count(), 1);
        let order: Vec<&str> = queue.iter().map(|obj| obj.name.as_str()).collect();
        assert_eq!(order, vec!["opaque", "glass"]);
    }

    #[test]
    fn test_render_order_sorting() {
        let mut fixture = Fixture::new();
        let late = fixture.object("late", false, 5);
        let early = fixture.object("early", false, -1);
        let far_glass = fixture.object("far_glass", true, 10);
        let near_glass = fixture.object("near_glass", true, 1);

        let queue = RenderQueue::from_objects(&[&late, &near_glass, &early, &far_glass]);

        let order: Vec<&str> = queue.iter().map(|obj| obj.name.as_str()).collect();
        assert_eq!(order, vec!["early", "late", "far_glass", "near_glass"]);
    }
}
