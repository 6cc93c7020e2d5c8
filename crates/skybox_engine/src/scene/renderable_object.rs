//! Renderable object representation for the scene
//!
//! A renderable owns its geometry and material outright and caches the world
//! matrix derived from its transform.

use crate::foundation::math::{Mat4, Transform};
use crate::render::{Geometry, Material};
use crate::scene::AABB;

/// Drawable object: geometry, material and placement
#[derive(Debug)]
pub struct RenderableObject {
    /// Name used in logs and recorded draws
    pub name: String,

    /// Mesh data
    pub geometry: Geometry,

    /// Material to use for rendering
    pub material: Material,

    /// Local transform; call [`RenderableObject::update_world_matrix`] after
    /// changing it
    pub transform: Transform,

    /// Whether this object is visible
    pub visible: bool,

    /// Whether the renderer may skip this object when its bounds fall outside
    /// the view frustum
    pub culling: bool,

    /// Sort key within the opaque/transparent groups (higher renders later)
    pub render_order: i32,

    world_matrix: Mat4,
}

impl RenderableObject {
    /// Create a visible, cullable object at the origin
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::identity(),
            visible: true,
            culling: true,
            render_order: 0,
            world_matrix: Mat4::identity(),
        }
    }

    /// Builder: place the object
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self.update_world_matrix();
        self
    }

    /// Builder: set the sort key
    pub fn with_render_order(mut self, render_order: i32) -> Self {
        self.render_order = render_order;
        self
    }

    /// Recompute the cached world matrix from the transform
    pub fn update_world_matrix(&mut self) {
        self.world_matrix = self.transform.to_matrix();
    }

    /// Cached object-to-world matrix
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Geometry bounds in world space
    pub fn world_bounds(&self) -> AABB {
        self.geometry.bounds().transformed(&self.world_matrix)
    }

    /// Check if this object should be rendered
    pub fn should_render(&self) -> bool {
        self.visible
    }

    /// Whether the material is alpha-blended
    pub fn is_transparent(&self) -> bool {
        self.material.is_transparent()
    }
}
