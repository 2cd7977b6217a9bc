//! Runtime value introspection and the precompiled hash capability.

use strata_ssz_hasher::{Chunk, HasherError};
use thiserror::Error;

/// Error reported by a precompiled hash routine.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HashRootError(String);

impl HashRootError {
    /// Constructs a new error from a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<HasherError> for HashRootError {
    fn from(e: HasherError) -> Self {
        Self(e.to_string())
    }
}

/// Precompiled, non-generic hash tree root routine.
///
/// Implementations are built against the default sizes of their type, so
/// they are only used when no size the type depends on is overridden by the
/// active configuration.
pub trait HashRoot {
    /// Computes the hash tree root.
    fn hash_tree_root(&self) -> Result<Chunk, HashRootError>;
}

/// Borrowed view of a value's contents, matching its [`TypeKind`].
///
/// [`TypeKind`]: crate::TypeKind
pub enum ValueView<'a> {
    /// An absent optional value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A `u8`.
    Uint8(u8),
    /// A `u16`.
    Uint16(u16),
    /// A `u32`.
    Uint32(u32),
    /// A `u64`.
    Uint64(u64),
    /// A 256-bit integer as little-endian limbs.
    Uint256(&'a [u64; 4]),
    /// A byte sequence: byte arrays, byte lists and bitlists.
    Bytes(&'a [u8]),
    /// Elements of an array or list.
    Seq(Vec<&'a dyn SszValue>),
    /// Fields of a struct, in declaration order.
    Fields(Vec<&'a dyn SszValue>),
    /// A value with no hashable contents.
    Opaque,
}

impl ValueView<'_> {
    /// Returns a short name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Uint8(_) => "uint8",
            Self::Uint16(_) => "uint16",
            Self::Uint32(_) => "uint32",
            Self::Uint64(_) => "uint64",
            Self::Uint256(_) => "uint256",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "sequence",
            Self::Fields(_) => "fields",
            Self::Opaque => "opaque",
        }
    }
}

impl std::fmt::Debug for ValueView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Uint8(v) => write!(f, "Uint8({v})"),
            Self::Uint16(v) => write!(f, "Uint16({v})"),
            Self::Uint32(v) => write!(f, "Uint32({v})"),
            Self::Uint64(v) => write!(f, "Uint64({v})"),
            Self::Uint256(v) => write!(f, "Uint256({v:?})"),
            Self::Bytes(v) => write!(f, "Bytes({v:?})"),
            Self::Seq(v) => write!(f, "Seq(len {})", v.len()),
            Self::Fields(v) => write!(f, "Fields(len {})", v.len()),
            Self::Null | Self::Opaque => f.write_str(self.as_str()),
        }
    }
}

/// Values that can be walked by the generic hasher.
pub trait SszValue {
    /// Returns a view of the value's contents.
    fn view(&self) -> ValueView<'_>;

    /// Returns the precompiled hash routine, if this value has one.
    fn as_hash_root(&self) -> Option<&dyn HashRoot> {
        None
    }

    /// Returns if this is an absent optional value.
    fn is_null(&self) -> bool {
        false
    }

    /// Views a slice of this type as a sequence.
    ///
    /// Overridden by `u8` so byte arrays and lists are viewed as bytes.
    #[doc(hidden)]
    fn slice_view(items: &[Self]) -> ValueView<'_>
    where
        Self: Sized,
    {
        ValueView::Seq(items.iter().map(|v| v as &dyn SszValue).collect())
    }
}

impl SszValue for bool {
    fn view(&self) -> ValueView<'_> {
        ValueView::Bool(*self)
    }
}

impl SszValue for u8 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Uint8(*self)
    }

    fn slice_view(items: &[Self]) -> ValueView<'_> {
        ValueView::Bytes(items)
    }
}

impl SszValue for u16 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Uint16(*self)
    }
}

impl SszValue for u32 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Uint32(*self)
    }
}

impl SszValue for u64 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Uint64(*self)
    }
}

impl SszValue for f32 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Opaque
    }
}

impl SszValue for f64 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Opaque
    }
}

impl<T: SszValue, const N: usize> SszValue for [T; N] {
    fn view(&self) -> ValueView<'_> {
        T::slice_view(self)
    }
}

impl<T: SszValue> SszValue for Vec<T> {
    fn view(&self) -> ValueView<'_> {
        T::slice_view(self)
    }
}

impl<T: SszValue> SszValue for Option<T> {
    fn view(&self) -> ValueView<'_> {
        match self {
            Some(v) => v.view(),
            None => ValueView::Null,
        }
    }

    fn as_hash_root(&self) -> Option<&dyn HashRoot> {
        self.as_ref().and_then(|v| v.as_hash_root())
    }

    fn is_null(&self) -> bool {
        self.as_ref().is_none_or(|v| v.is_null())
    }
}

impl<T: SszValue> SszValue for Box<T> {
    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }

    fn as_hash_root(&self) -> Option<&dyn HashRoot> {
        (**self).as_hash_root()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_containers_view_as_bytes() {
        let arr = [1u8, 2, 3];
        assert!(matches!(arr.view(), ValueView::Bytes(&[1, 2, 3])));

        let list = vec![4u8, 5];
        assert!(matches!(list.view(), ValueView::Bytes(&[4, 5])));
    }

    #[test]
    fn test_seq_view() {
        let list = vec![1u64, 2, 3];
        let ValueView::Seq(items) = list.view() else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(items[2].view(), ValueView::Uint64(3)));
    }

    #[test]
    fn test_optional_view() {
        let none: Option<u64> = None;
        assert!(none.is_null());
        assert!(matches!(none.view(), ValueView::Null));

        let nested: Option<Option<u64>> = Some(None);
        assert!(nested.is_null());

        let some = Some(Box::new(7u16));
        assert!(!some.is_null());
        assert!(matches!(some.view(), ValueView::Uint16(7)));
        assert!(some.as_hash_root().is_none());
    }

    #[test]
    fn test_float_is_opaque() {
        assert_eq!(1.5f64.view().as_str(), "opaque");
    }
}
