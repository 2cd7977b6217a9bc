//! Type descriptors.
//!
//! A [`TypeDesc`] describes the SSZ shape of a Rust type.  The kind is a
//! closed set resolved once when the descriptor is built, including the two
//! special shapes ([`TypeKind::Bitlist`] and [`TypeKind::Uint256`]) that are
//! hashed differently from what their memory layout would suggest.

use std::any::type_name;
use std::borrow::Cow;
use std::sync::Arc;

/// Describes the SSZ shape of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDesc {
    name: Cow<'static, str>,
    kind: TypeKind,
    hash_root: bool,
}

/// SSZ kind of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// `boolean`
    Bool,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `uint256`, stored as four little-endian `u64` limbs.
    ///
    /// Its precompiled routine never depends on configuration, so it is
    /// always used when available.
    Uint256,
    /// Byte packed bitlist including the delimiting bit.
    Bitlist,
    /// Fixed size array.
    Vector {
        /// Element type.
        elem: Arc<TypeDesc>,
        /// Natural length of the array.
        len: usize,
    },
    /// Dynamic list.
    List {
        /// Element type.
        elem: Arc<TypeDesc>,
    },
    /// Struct with ordered fields.
    Container {
        /// Fields in declaration order.
        fields: Vec<FieldDesc>,
    },
    /// Optional value that has to be present when hashed.
    Optional {
        /// Wrapped type.
        inner: Arc<TypeDesc>,
    },
    /// A type with no hashing rule, such as floats.
    Unsupported,
}

impl TypeKind {
    /// Returns a short name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uint256 => "uint256",
            Self::Bitlist => "bitlist",
            Self::Vector { .. } => "vector",
            Self::List { .. } => "list",
            Self::Container { .. } => "container",
            Self::Optional { .. } => "optional",
            Self::Unsupported => "unsupported",
        }
    }

    /// Returns the packed byte size of basic kinds, or `None` for composite
    /// and unsupported kinds.
    pub fn basic_size(&self) -> Option<u64> {
        match self {
            Self::Bool | Self::Uint8 => Some(1),
            Self::Uint16 => Some(2),
            Self::Uint32 => Some(4),
            Self::Uint64 => Some(8),
            Self::Uint256 => Some(32),
            _ => None,
        }
    }
}

impl TypeDesc {
    /// Constructs a new descriptor with no precompiled hash routine.
    pub fn new(name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            hash_root: false,
        }
    }

    /// Constructs a descriptor named after `T`.
    pub fn of<T: ?Sized>(kind: TypeKind) -> Self {
        Self::new(type_name::<T>(), kind)
    }

    /// Sets whether the type has a precompiled hash routine.
    pub fn with_hash_root(mut self, hash_root: bool) -> Self {
        self.hash_root = hash_root;
        self
    }

    /// Constructs a fixed size array descriptor.
    pub fn vector(name: impl Into<Cow<'static, str>>, elem: TypeDesc, len: usize) -> Self {
        Self::new(
            name,
            TypeKind::Vector {
                elem: Arc::new(elem),
                len,
            },
        )
    }

    /// Constructs a dynamic list descriptor.
    pub fn list(name: impl Into<Cow<'static, str>>, elem: TypeDesc) -> Self {
        Self::new(
            name,
            TypeKind::List {
                elem: Arc::new(elem),
            },
        )
    }

    /// Constructs a container descriptor.
    pub fn container(name: impl Into<Cow<'static, str>>, fields: Vec<FieldDesc>) -> Self {
        Self::new(name, TypeKind::Container { fields })
    }

    /// Constructs an optional descriptor.
    pub fn optional(name: impl Into<Cow<'static, str>>, inner: TypeDesc) -> Self {
        Self::new(
            name,
            TypeKind::Optional {
                inner: Arc::new(inner),
            },
        )
    }

    /// Type name, used in diagnostics and as the cache key for containers.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SSZ kind.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Whether the type declares a precompiled hash routine.
    pub fn has_hash_root(&self) -> bool {
        self.hash_root
    }

    /// Strips any number of optional wrappers.
    pub fn deref_optional(&self) -> &TypeDesc {
        let mut ty = self;
        while let TypeKind::Optional { inner } = &ty.kind {
            ty = inner;
        }
        ty
    }
}

/// A struct field: name, type and declarative size tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDesc {
    name: Cow<'static, str>,
    ty: Arc<TypeDesc>,
    tags: FieldTags,
}

impl FieldDesc {
    /// Constructs a new field descriptor.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeDesc, tags: FieldTags) -> Self {
        Self {
            name: name.into(),
            ty: Arc::new(ty),
            tags,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type.
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    /// Declarative size tags.
    pub fn tags(&self) -> &FieldTags {
        &self.tags
    }
}

/// Declarative size tags of a field.
///
/// Each tag is a comma separated list with one entry per dimension, outermost
/// first.  `ssz_size` and `ssz_max` are the defaults a precompiled routine was
/// built against, `dyn_size` and `dyn_max` may name spec values and override
/// them under the active configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldTags {
    ssz_size: Option<Cow<'static, str>>,
    ssz_max: Option<Cow<'static, str>>,
    dyn_size: Option<Cow<'static, str>>,
    dyn_max: Option<Cow<'static, str>>,
}

impl FieldTags {
    /// Constructs an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the static size tag.
    pub fn with_ssz_size(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.ssz_size = Some(tag.into());
        self
    }

    /// Sets the static max size tag.
    pub fn with_ssz_max(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.ssz_max = Some(tag.into());
        self
    }

    /// Sets the configuration dependent size tag.
    pub fn with_dyn_size(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.dyn_size = Some(tag.into());
        self
    }

    /// Sets the configuration dependent max size tag.
    pub fn with_dyn_max(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.dyn_max = Some(tag.into());
        self
    }

    /// Static size tag.
    pub fn ssz_size(&self) -> Option<&str> {
        self.ssz_size.as_deref()
    }

    /// Static max size tag.
    pub fn ssz_max(&self) -> Option<&str> {
        self.ssz_max.as_deref()
    }

    /// Configuration dependent size tag.
    pub fn dyn_size(&self) -> Option<&str> {
        self.dyn_size.as_deref()
    }

    /// Configuration dependent max size tag.
    pub fn dyn_max(&self) -> Option<&str> {
        self.dyn_max.as_deref()
    }
}

/// Types with a known SSZ shape.
pub trait SszType {
    /// Builds the type's descriptor.
    fn type_desc() -> TypeDesc;
}

/// Simple macro for the basic kinds.
macro_rules! impl_basic_type {
    ( $ty:ty => $kind:ident ) => {
        impl SszType for $ty {
            fn type_desc() -> TypeDesc {
                TypeDesc::of::<$ty>(TypeKind::$kind)
            }
        }
    };
}

impl_basic_type!(bool => Bool);
impl_basic_type!(u8 => Uint8);
impl_basic_type!(u16 => Uint16);
impl_basic_type!(u32 => Uint32);
impl_basic_type!(u64 => Uint64);
impl_basic_type!(f32 => Unsupported);
impl_basic_type!(f64 => Unsupported);

impl<T: SszType, const N: usize> SszType for [T; N] {
    fn type_desc() -> TypeDesc {
        TypeDesc::vector(type_name::<Self>(), T::type_desc(), N)
    }
}

impl<T: SszType> SszType for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::list(type_name::<Self>(), T::type_desc())
    }
}

impl<T: SszType> SszType for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::optional(type_name::<Self>(), T::type_desc())
    }
}

impl<T: SszType> SszType for Box<T> {
    fn type_desc() -> TypeDesc {
        T::type_desc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_descriptors() {
        let desc = <Vec<[u8; 32]>>::type_desc();
        let TypeKind::List { elem } = desc.kind() else {
            panic!("expected list, got {:?}", desc.kind());
        };
        assert_eq!(
            elem.kind(),
            &TypeKind::Vector {
                elem: Arc::new(u8::type_desc()),
                len: 32
            }
        );
        assert!(!desc.has_hash_root());
    }

    #[test]
    fn test_deref_optional() {
        let desc = <Option<Option<u64>>>::type_desc();
        assert_eq!(desc.kind().as_str(), "optional");
        assert_eq!(desc.deref_optional().kind(), &TypeKind::Uint64);
        assert_eq!(<Box<u16>>::type_desc().kind(), &TypeKind::Uint16);
    }

    #[test]
    fn test_basic_sizes() {
        assert_eq!(TypeKind::Bool.basic_size(), Some(1));
        assert_eq!(TypeKind::Uint64.basic_size(), Some(8));
        assert_eq!(TypeKind::Uint256.basic_size(), Some(32));
        assert_eq!(TypeKind::Bitlist.basic_size(), None);
        assert_eq!(f64::type_desc().kind(), &TypeKind::Unsupported);
    }

    #[test]
    fn test_field_tags() {
        let tags = FieldTags::new()
            .with_ssz_max("4")
            .with_dyn_max("MAX_ITEMS");
        assert_eq!(tags.ssz_max(), Some("4"));
        assert_eq!(tags.dyn_max(), Some("MAX_ITEMS"));
        assert_eq!(tags.ssz_size(), None);
    }
}
