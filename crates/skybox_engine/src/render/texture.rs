//! Cubemap texture references
//!
//! Loading and decoding are out of scope; a [`TextureCube`] describes where
//! its six faces come from and tracks whether a loader has finished with it.
//! Materials hold it by `Rc`, the caller owns it.

use std::cell::Cell;

/// Cubemap face, in the conventional +X, -X, +Y, -Y, +Z, -Z order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X
    PositiveX,
    /// -X
    NegativeX,
    /// +Y
    PositiveY,
    /// -Y
    NegativeY,
    /// +Z
    PositiveZ,
    /// -Z
    NegativeZ,
}

impl CubeFace {
    /// All faces in layer order
    pub const ALL: [Self; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    /// Short face name (`px`, `nx`, ...)
    pub fn short_name(self) -> &'static str {
        match self {
            Self::PositiveX => "px",
            Self::NegativeX => "nx",
            Self::PositiveY => "py",
            Self::NegativeY => "ny",
            Self::PositiveZ => "pz",
            Self::NegativeZ => "nz",
        }
    }

    fn layer(self) -> usize {
        self as usize
    }
}

/// Environment cubemap
#[derive(Debug)]
pub struct TextureCube {
    label: String,
    faces: [Option<String>; 6],
    ready: Cell<bool>,
}

impl TextureCube {
    /// Create a cubemap with no face sources
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            faces: Default::default(),
            ready: Cell::new(false),
        }
    }

    /// Set the image source of one face
    pub fn with_face(mut self, face: CubeFace, source: impl Into<String>) -> Self {
        self.faces[face.layer()] = Some(source.into());
        self
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Image source of a face, if set
    pub fn face_source(&self, face: CubeFace) -> Option<&str> {
        self.faces[face.layer()].as_deref()
    }

    /// Whether all six faces have a source
    pub fn is_complete(&self) -> bool {
        self.faces.iter().all(Option::is_some)
    }

    /// Whether the loader has finished uploading the faces
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    /// Called by the loader once the faces are resident
    pub fn mark_ready(&self) {
        self.ready.set(true);
    }
}
