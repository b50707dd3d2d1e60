//! Opaque handles for GPU resources owned by a backend.
//!
//! Handles are plain ids: copying one never copies the resource, and a handle
//! is only meaningful to the backend that issued it.

use std::fmt;

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw backend id.
            pub const fn from_raw(id: u32) -> Self {
                Self(id)
            }

            /// The raw backend id.
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

resource_handle!(
    /// A linked shader program.
    ProgramHandle,
    "program"
);
resource_handle!(
    /// A sampled 2D texture.
    TextureHandle,
    "texture"
);
resource_handle!(
    /// A vertex or index buffer.
    BufferHandle,
    "buffer"
);

/// Slot a vertex attribute is fed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeLocation(pub u32);

/// Slot a uniform value is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// What a buffer is bound as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    /// 16-bit triangle indices.
    Index,
}
