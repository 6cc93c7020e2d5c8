//! Handle types backed by slot maps
//!
//! Backends and event registries hand out these keys instead of references so
//! that stale handles are detected rather than aliased.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Key of a listener registered on a [`crate::events::FrameEvent`]
    pub struct ListenerKey;

    /// Backend handle of a compiled shader program
    pub struct ShaderProgramHandle;

    /// Backend handle of uploaded vertex/index buffers
    pub struct GeometryHandle;

    /// Backend handle of a material's uniform block
    pub struct MaterialHandle;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;
