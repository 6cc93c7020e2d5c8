//! Scene management
//!
//! A [`Scene`] is a flat list of [`RenderableObject`]s plus a before-render
//! [`FrameEvent`](crate::events::FrameEvent). The renderer emits that event,
//! then walks the scene:
//!
//! ```text
//! before-render listeners (injected draws)
//!      ↓
//! visibility + frustum culling
//!      ↓
//! RenderQueue (opaque / transparent, batched by material)
//!      ↓
//! backend draw submission
//! ```

mod culling;
mod render_queue;
mod renderable_object;
#[allow(clippy::module_inception)]
mod scene;

pub use culling::{Frustum, Plane, AABB};
pub use render_queue::{RenderBatch, RenderQueue};
pub use renderable_object::RenderableObject;
pub use scene::{RenderNotifier, Scene};
