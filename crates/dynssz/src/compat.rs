//! Fast path compatibility oracle.
//!
//! Decides whether a type's precompiled hash routine can be trusted under the
//! active spec values.  The routine was built against the static size tags of
//! the type and all of its descendants, so it is only valid when no dimension
//! anywhere below the type was moved by a spec value.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::errors::TagError;
use crate::hints::{MaxSizeHint, SizeHint, resolve_max_hints, resolve_size_hints};
use crate::spec::SpecValues;
use crate::types::{TypeDesc, TypeKind};

/// Verdict on whether the precompiled routine of a type may be used.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HashCompat {
    /// The type declares a precompiled hash routine.
    pub has_hash_root: bool,
    /// Some fixed size at or below the type is overridden by a spec value.
    pub has_dynamic_size: bool,
    /// Some max size at or below the type is overridden by a spec value.
    pub has_dynamic_max: bool,
}

impl HashCompat {
    /// Returns if the precompiled routine can be used.
    pub fn allows_fast_path(&self) -> bool {
        self.has_hash_root && !self.has_dynamic_size && !self.has_dynamic_max
    }
}

/// Override flags: `(size, max)`.
type Overrides = (bool, bool);

/// Computes [`HashCompat`] verdicts, caching the per-container part.
///
/// Container results are keyed by type name, so distinct containers must
/// have distinct names.  The cache is only valid for one set of spec values.
#[derive(Debug, Default)]
pub struct CompatOracle {
    containers: RwLock<HashMap<String, Overrides>>,
}

impl CompatOracle {
    /// Constructs an oracle with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a type given the size hints of the position it appears in.
    pub fn check(
        &self,
        ty: &TypeDesc,
        size_hints: &[SizeHint],
        max_hints: &[MaxSizeHint],
        spec: &SpecValues,
    ) -> Result<HashCompat, TagError> {
        let ty = ty.deref_optional();
        let (has_dynamic_size, has_dynamic_max) = self.scan(ty, size_hints, max_hints, spec)?;
        Ok(HashCompat {
            has_hash_root: ty.has_hash_root(),
            has_dynamic_size,
            has_dynamic_max,
        })
    }

    /// Clears the container cache.
    pub fn clear(&self) {
        self.containers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn scan(
        &self,
        ty: &TypeDesc,
        size_hints: &[SizeHint],
        max_hints: &[MaxSizeHint],
        spec: &SpecValues,
    ) -> Result<Overrides, TagError> {
        let here = (
            size_hints.iter().any(|h| h.spec_override),
            max_hints.iter().any(|h| h.spec_override),
        );
        if here == (true, true) {
            return Ok(here);
        }

        let below = match ty.kind() {
            TypeKind::Container { .. } => self.scan_container(ty, spec)?,
            TypeKind::Vector { elem, .. } | TypeKind::List { elem } => self.scan(
                elem,
                size_hints.get(1..).unwrap_or_default(),
                max_hints.get(1..).unwrap_or_default(),
                spec,
            )?,
            TypeKind::Optional { inner } => self.scan(inner, size_hints, max_hints, spec)?,
            _ => (false, false),
        };

        Ok((here.0 || below.0, here.1 || below.1))
    }

    fn scan_container(&self, ty: &TypeDesc, spec: &SpecValues) -> Result<Overrides, TagError> {
        if let Some(cached) = self
            .containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ty.name())
        {
            return Ok(*cached);
        }

        let TypeKind::Container { fields } = ty.kind() else {
            return Ok((false, false));
        };

        let mut acc = (false, false);
        for field in fields {
            let sizes = resolve_size_hints(field.tags(), spec)?;
            let maxes = resolve_max_hints(field.tags(), spec)?;
            let (s, m) = self.scan(field.ty(), &sizes, &maxes, spec)?;
            acc = (acc.0 || s, acc.1 || m);
            if acc == (true, true) {
                break;
            }
        }

        self.containers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ty.name().to_owned(), acc);
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDesc, FieldTags, SszType};

    fn spec() -> SpecValues {
        SpecValues::new()
            .with("SYNC_COMMITTEE_SIZE", 32)
            .with("MAX_ITEMS", 4)
    }

    fn inner(tags: FieldTags) -> TypeDesc {
        TypeDesc::container(
            "Inner",
            vec![
                FieldDesc::new("a", u64::type_desc(), FieldTags::new()),
                FieldDesc::new("b", <Vec<u64>>::type_desc(), tags),
            ],
        )
        .with_hash_root(true)
    }

    fn outer(inner: TypeDesc) -> TypeDesc {
        TypeDesc::container(
            "Outer",
            vec![FieldDesc::new(
                "items",
                TypeDesc::list("Vec<Inner>", inner),
                FieldTags::new().with_ssz_max("8"),
            )],
        )
        .with_hash_root(true)
    }

    #[test]
    fn test_static_type_allows_fast_path() {
        let oracle = CompatOracle::new();
        let ty = outer(inner(FieldTags::new().with_ssz_max("4")));
        let compat = oracle.check(&ty, &[], &[], &spec()).unwrap();
        assert!(compat.allows_fast_path());
    }

    #[test]
    fn test_descendant_override_blocks_fast_path() {
        let oracle = CompatOracle::new();
        let tags = FieldTags::new().with_ssz_max("16").with_dyn_max("MAX_ITEMS");
        let ty = outer(inner(tags));
        let compat = oracle.check(&ty, &[], &[], &spec()).unwrap();
        assert_eq!(
            compat,
            HashCompat {
                has_hash_root: true,
                has_dynamic_size: false,
                has_dynamic_max: true,
            }
        );
        assert!(!compat.allows_fast_path());
    }

    #[test]
    fn test_hints_of_position_are_checked() {
        let oracle = CompatOracle::new();
        let ty = <Vec<u64>>::type_desc().with_hash_root(true);
        let max = [MaxSizeHint {
            size: 4,
            spec_override: true,
        }];
        let compat = oracle.check(&ty, &[], &max, &spec()).unwrap();
        assert!(compat.has_dynamic_max);
        assert!(!compat.has_dynamic_size);
    }

    #[test]
    fn test_nested_dimension_hints() {
        let oracle = CompatOracle::new();
        let ty = <Vec<Vec<u8>>>::type_desc();
        let sizes = [
            SizeHint::default(),
            SizeHint {
                size: 4,
                dynamic: false,
                spec_override: true,
            },
        ];
        let compat = oracle.check(&ty, &sizes, &[], &spec()).unwrap();
        assert!(compat.has_dynamic_size);
        assert!(!compat.has_hash_root);
    }

    #[test]
    fn test_bad_tag_is_error() {
        let oracle = CompatOracle::new();
        let ty = outer(inner(FieldTags::new().with_dyn_max("MAX_ITEMS / 0")));
        let err = oracle.check(&ty, &[], &[], &spec()).unwrap_err();
        assert!(matches!(err, TagError::DivisionByZero(_)));
    }

    #[test]
    fn test_container_cache() {
        let oracle = CompatOracle::new();
        let ty = outer(inner(FieldTags::new().with_ssz_max("4")));
        oracle.check(&ty, &[], &[], &spec()).unwrap();
        assert_eq!(oracle.containers.read().unwrap().len(), 2);
        oracle.clear();
        assert!(oracle.containers.read().unwrap().is_empty());
    }
}
