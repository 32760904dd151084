//! Index types for mesh elements.
//!
//! Vertices, faces and edges live in flat arrays owned by the mesh and its
//! edge table. Everything else (towers, ring tokens, the event queue) refers
//! to them through these copyable index wrappers, so equality between two
//! references is a single integer comparison.

use std::fmt::{self, Debug};

const INVALID: u32 = u32::MAX;

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe face (triangle) index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

/// A type-safe index of an undirected edge in an [`EdgeTable`](super::EdgeTable).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < INVALID as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Create an invalid/null index.
            #[inline]
            pub const fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.0)
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display, self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());

        let invalid = VertexId::invalid();
        assert!(!invalid.is_valid());
        assert_eq!(VertexId::default(), invalid);
    }

    #[test]
    fn test_ordering_follows_raw_index() {
        assert!(EdgeId::new(1) < EdgeId::new(2));
        assert!(FaceId::new(0) < FaceId::new(7));
    }

    #[test]
    fn test_debug_and_display_format() {
        let v = VertexId::new(42);
        assert_eq!(format!("{:?}", v), "V(42)");
        assert_eq!(format!("{}", v), "V42");

        let e = EdgeId::new(3);
        assert_eq!(format!("{}", e), "E3");

        let invalid = FaceId::invalid();
        assert_eq!(format!("{:?}", invalid), "F(INVALID)");
    }
}
