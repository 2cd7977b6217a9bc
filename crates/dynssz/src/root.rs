//! Generic hash tree root construction.
//!
//! [`RootBuilder`] walks a value along its [`TypeDesc`] and writes exactly
//! one chunk per value into a [`HashTreeBuffer`].  At every level it first
//! asks the [`CompatOracle`] whether the value's precompiled routine can be
//! trusted under the active spec values, and only descends into the value
//! when it cannot.

use strata_ssz_hasher::{ChunkHasher, HashTreeBuffer, calculate_limit};
use tracing::{debug, warn};

use crate::compat::CompatOracle;
use crate::config::DynSszConfig;
use crate::errors::{DynSszError, DynSszResult};
use crate::hints::{MaxSizeHint, SizeHint, resolve_max_hints, resolve_size_hints};
use crate::spec::SpecValues;
use crate::types::{TypeDesc, TypeKind};
use crate::value::{SszValue, ValueView};

/// Single traversal over one value.
///
/// Holds a snapshot of the configuration taken when the traversal started.
#[derive(Debug)]
pub struct RootBuilder<'d> {
    spec: &'d SpecValues,
    oracle: &'d CompatOracle,
    config: DynSszConfig,
}

impl<'d> RootBuilder<'d> {
    /// Constructs a new builder.
    pub fn new(spec: &'d SpecValues, oracle: &'d CompatOracle, config: DynSszConfig) -> Self {
        Self {
            spec,
            oracle,
            config,
        }
    }

    /// Writes the root of `value` into `hh`.
    ///
    /// `size_hints` and `max_hints` are the resolved hints of the position the
    /// value appears in, outermost dimension first.
    pub fn build_root<H: ChunkHasher>(
        &self,
        ty: &TypeDesc,
        value: &dyn SszValue,
        hh: &mut HashTreeBuffer<H>,
        size_hints: &[SizeHint],
        max_hints: &[MaxSizeHint],
        depth: usize,
    ) -> DynSszResult<()> {
        let index = hh.index();
        let ty = ty.deref_optional();
        if value.is_null() {
            return Err(DynSszError::NilValue(ty.name().to_owned()));
        }

        let compat = self
            .oracle
            .check(ty, size_hints, max_hints, self.spec)
            .map_err(|source| DynSszError::CompatibilityCheckFailed {
                ty: ty.name().to_owned(),
                source,
            })?;

        // uint256 routines ignore `no_fast_path`.
        let mut use_fast = compat.allows_fast_path()
            && (!self.config.no_fast_path() || matches!(ty.kind(), TypeKind::Uint256));

        if self.config.verbose() {
            debug!(
                ty = ty.name(),
                kind = ty.kind().as_str(),
                fast_path = use_fast,
                has_hash_root = compat.has_hash_root,
                dynamic_size = compat.has_dynamic_size,
                dynamic_max = compat.has_dynamic_max,
                index,
                depth,
                "hashing value"
            );
        }

        if use_fast {
            match value.as_hash_root() {
                Some(hasher) => {
                    let root = hasher.hash_tree_root().map_err(|source| {
                        DynSszError::PrecompiledHashFailed {
                            ty: ty.name().to_owned(),
                            source,
                        }
                    })?;
                    hh.put_root(&root);
                }
                None => {
                    debug!(
                        ty = ty.name(),
                        "value has no precompiled hash routine, using generic path"
                    );
                    use_fast = false;
                }
            }
        }

        if !use_fast {
            self.build_generic(ty, value, hh, max_hints, depth)?;
        }

        if self.config.verbose() {
            if let Some(root) = hh.current_root() {
                debug!(ty = ty.name(), depth, root = %hex::encode(root), "hashed value");
            }
        }

        Ok(())
    }

    fn build_generic<H: ChunkHasher>(
        &self,
        ty: &TypeDesc,
        value: &dyn SszValue,
        hh: &mut HashTreeBuffer<H>,
        max_hints: &[MaxSizeHint],
        depth: usize,
    ) -> DynSszResult<()> {
        match ty.kind() {
            TypeKind::Container { .. } => return self.build_struct_root(ty, value, hh, depth),
            TypeKind::Vector { elem, .. } => {
                return self.build_sequence_root(ty, elem, value, hh, max_hints, true, depth);
            }
            TypeKind::List { elem } => {
                return self.build_sequence_root(ty, elem, value, hh, max_hints, false, depth);
            }
            TypeKind::Unsupported | TypeKind::Optional { .. } => {
                return Err(DynSszError::UnsupportedType(ty.name().to_owned()));
            }
            _ => {}
        }

        match (ty.kind(), value.view()) {
            (TypeKind::Bitlist, ValueView::Bytes(bits)) => {
                let max_bits = match max_hints.first() {
                    Some(hint) => hint.size,
                    None => {
                        let bound = 8 * bits.len() as u64;
                        warn!(
                            ty = ty.name(),
                            bound, "bitlist has no max size hint, bounding by its length"
                        );
                        bound
                    }
                };
                hh.put_bitlist(bits, max_bits)?;
            }
            (TypeKind::Bool, ValueView::Bool(v)) => hh.put_bool(v),
            (TypeKind::Uint8, ValueView::Uint8(v)) => hh.put_u8(v),
            (TypeKind::Uint16, ValueView::Uint16(v)) => hh.put_u16(v),
            (TypeKind::Uint32, ValueView::Uint32(v)) => hh.put_u32(v),
            (TypeKind::Uint64, ValueView::Uint64(v)) => hh.put_u64(v),
            (TypeKind::Uint256, ValueView::Uint256(limbs)) => {
                for limb in limbs {
                    hh.append_u64(*limb);
                }
            }
            (kind, view) => return Err(mismatch(ty, kind.as_str(), &view)),
        }

        Ok(())
    }

    /// Writes the root of a container: one chunk per field, merkleized.
    pub fn build_struct_root<H: ChunkHasher>(
        &self,
        ty: &TypeDesc,
        value: &dyn SszValue,
        hh: &mut HashTreeBuffer<H>,
        depth: usize,
    ) -> DynSszResult<()> {
        let TypeKind::Container { fields } = ty.kind() else {
            return Err(DynSszError::UnsupportedType(ty.name().to_owned()));
        };

        let index = hh.index();
        let values = match value.view() {
            ValueView::Fields(values) => values,
            view => return Err(mismatch(ty, "fields", &view)),
        };
        if values.len() != fields.len() {
            return Err(DynSszError::FieldCountMismatch {
                ty: ty.name().to_owned(),
                expected: fields.len(),
                found: values.len(),
            });
        }

        for (field, field_value) in fields.iter().zip(values) {
            let tag_err = |source| DynSszError::FieldTags {
                field: field.name().to_owned(),
                source,
            };
            let size_hints = resolve_size_hints(field.tags(), self.spec).map_err(tag_err)?;
            let max_hints = resolve_max_hints(field.tags(), self.spec).map_err(tag_err)?;

            if self.config.verbose() {
                debug!(ty = ty.name(), field = field.name(), depth, "hashing field");
            }

            self.build_root(
                field.ty(),
                field_value,
                hh,
                &size_hints,
                &max_hints,
                depth + 1,
            )?;
        }

        hh.merkleize(index);
        Ok(())
    }

    /// Writes the root of an array (`fixed`) or list of `elem`.
    ///
    /// Basic elements are packed densely, composite elements contribute one
    /// chunk each.  With a max hint the root is sized for the declared
    /// capacity and the length is mixed in.
    #[allow(clippy::too_many_arguments)]
    pub fn build_sequence_root<H: ChunkHasher>(
        &self,
        ty: &TypeDesc,
        elem: &TypeDesc,
        value: &dyn SszValue,
        hh: &mut HashTreeBuffer<H>,
        max_hints: &[MaxSizeHint],
        fixed: bool,
        depth: usize,
    ) -> DynSszResult<()> {
        let index = hh.index();
        let elem = elem.deref_optional();

        let (len, elem_size) = match (elem.kind(), value.view()) {
            (TypeKind::Uint8, ValueView::Bytes(bytes)) => {
                if fixed {
                    hh.put_bytes(bytes);
                    return Ok(());
                }
                hh.append(bytes);
                hh.fill_to_chunk_boundary();
                (bytes.len(), 1)
            }

            (TypeKind::Container { .. }, ValueView::Seq(items)) => {
                for item in &items {
                    self.build_struct_root(elem, present(elem, *item)?, hh, depth + 1)?;
                }
                (items.len(), 0)
            }

            (
                TypeKind::Vector { elem: inner, .. } | TypeKind::List { elem: inner },
                ValueView::Seq(items),
            ) => {
                if inner.kind() != &TypeKind::Uint8 {
                    return Err(DynSszError::UnsupportedNesting(elem.name().to_owned()));
                }
                for item in &items {
                    let bytes = match present(elem, *item)?.view() {
                        ValueView::Bytes(bytes) => bytes,
                        view => return Err(mismatch(elem, "bytes", &view)),
                    };
                    match max_hints.get(1) {
                        Some(inner_max) => {
                            let sub_index = hh.index();
                            hh.append_bytes32(bytes);
                            hh.merkleize_with_mixin(
                                sub_index,
                                bytes.len() as u64,
                                inner_max.size.div_ceil(32),
                            )?;
                        }
                        None => hh.put_bytes(bytes),
                    }
                }
                (items.len(), 0)
            }

            (kind, ValueView::Seq(items)) => {
                let Some(elem_size) = kind.basic_size() else {
                    return Err(DynSszError::UnsupportedElement(elem.name().to_owned()));
                };
                for item in &items {
                    pack_basic(elem, present(elem, *item)?, hh)?;
                }
                if fixed && kind == &TypeKind::Uint8 {
                    hh.merkleize(index);
                    return Ok(());
                }
                hh.fill_to_chunk_boundary();
                (items.len(), elem_size)
            }

            (_, view) => return Err(mismatch(ty, "sequence", &view)),
        };

        let len = len as u64;
        match max_hints.first() {
            Some(max) => {
                let limit = if elem_size > 0 {
                    calculate_limit(max.size, len, elem_size)
                } else {
                    max.size
                };
                hh.merkleize_with_mixin(index, len, limit)?;
            }
            None => hh.merkleize(index),
        }

        Ok(())
    }
}

/// Appends a basic value densely, with no padding.
fn pack_basic<H: ChunkHasher>(
    elem: &TypeDesc,
    item: &dyn SszValue,
    hh: &mut HashTreeBuffer<H>,
) -> DynSszResult<()> {
    match (elem.kind(), item.view()) {
        (TypeKind::Bool, ValueView::Bool(v)) => hh.append_u8(v as u8),
        (TypeKind::Uint8, ValueView::Uint8(v)) => hh.append_u8(v),
        (TypeKind::Uint16, ValueView::Uint16(v)) => hh.append_u16(v),
        (TypeKind::Uint32, ValueView::Uint32(v)) => hh.append_u32(v),
        (TypeKind::Uint64, ValueView::Uint64(v)) => hh.append_u64(v),
        (TypeKind::Uint256, ValueView::Uint256(limbs)) => {
            for limb in limbs {
                hh.append_u64(*limb);
            }
        }
        (kind, view) => return Err(mismatch(elem, kind.as_str(), &view)),
    }
    Ok(())
}

fn present<'v>(elem: &TypeDesc, item: &'v dyn SszValue) -> DynSszResult<&'v dyn SszValue> {
    if item.is_null() {
        return Err(DynSszError::NilValue(elem.name().to_owned()));
    }
    Ok(item)
}

fn mismatch(ty: &TypeDesc, expected: &'static str, found: &ValueView<'_>) -> DynSszError {
    DynSszError::ValueMismatch {
        ty: ty.name().to_owned(),
        expected,
        found: found.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use strata_ssz_hasher::{Chunk, Sha256ChunkHasher, ZERO_CHUNK, length_chunk};

    use super::*;
    use crate::types::{FieldDesc, FieldTags, SszType};
    use alloy_primitives::U256;

    type H = Sha256ChunkHasher;

    fn chunk(bytes: &[u8]) -> Chunk {
        let mut c = ZERO_CHUNK;
        c[..bytes.len()].copy_from_slice(bytes);
        c
    }

    fn root_of(
        config: DynSszConfig,
        ty: &TypeDesc,
        value: &dyn SszValue,
        max_hints: &[MaxSizeHint],
    ) -> DynSszResult<Chunk> {
        let spec = SpecValues::new();
        let oracle = CompatOracle::new();
        let builder = RootBuilder::new(&spec, &oracle, config);
        let mut hh = HashTreeBuffer::<H>::new();
        builder.build_root(ty, value, &mut hh, &[], max_hints, 0)?;
        Ok(hh.hash_root()?)
    }

    fn max(size: u64) -> MaxSizeHint {
        MaxSizeHint {
            size,
            spec_override: false,
        }
    }

    #[test]
    fn test_scalars() {
        let c = DynSszConfig::new();
        assert_eq!(root_of(c, &bool::type_desc(), &true, &[]).unwrap(), chunk(&[1]));
        assert_eq!(
            root_of(c, &u32::type_desc(), &0x0a0b0c0du32, &[]).unwrap(),
            chunk(&[0x0d, 0x0c, 0x0b, 0x0a])
        );
    }

    #[test]
    fn test_uint256_generic_is_one_chunk() {
        let v = U256::from_limbs([1, 2, 3, 4]);
        let c = DynSszConfig::new();
        let desc = U256::type_desc().with_hash_root(false);
        assert_eq!(root_of(c, &desc, &v, &[]).unwrap(), v.to_le_bytes::<32>());
    }

    #[test]
    fn test_packed_u16_list() {
        let list = vec![1u16, 2, 3];
        let root = root_of(DynSszConfig::new(), &<Vec<u16>>::type_desc(), &list, &[max(32)])
            .unwrap();
        // 32 * 2 bytes is two chunks.
        let leaf = chunk(&[1, 0, 2, 0, 3, 0]);
        let expected = H::hash_node(&H::hash_node(&leaf, &ZERO_CHUNK), &length_chunk(3));
        assert_eq!(root, expected);
    }

    #[test]
    fn test_fixed_byte_array_ignores_max() {
        let arr = [7u8; 4];
        let desc = <[u8; 4]>::type_desc();
        let plain = root_of(DynSszConfig::new(), &desc, &arr, &[]).unwrap();
        let capped = root_of(DynSszConfig::new(), &desc, &arr, &[max(1024)]).unwrap();
        assert_eq!(plain, chunk(&[7; 4]));
        assert_eq!(plain, capped);
    }

    #[test]
    fn test_composite_elements_use_raw_max() {
        let inner = TypeDesc::container(
            "Pair",
            vec![
                FieldDesc::new("a", u64::type_desc(), FieldTags::new()),
                FieldDesc::new("b", u64::type_desc(), FieldTags::new()),
            ],
        );
        let desc = TypeDesc::list("Vec<Pair>", inner);
        let value: Vec<Pair> = vec![Pair(1, 2)];
        let root = root_of(DynSszConfig::new(), &desc, &value, &[max(4)]).unwrap();

        let pair = H::hash_node(&chunk(&[1]), &chunk(&[2]));
        let tree = H::hash_node(&H::hash_node(&pair, &ZERO_CHUNK), &H::zero_hash(1));
        assert_eq!(root, H::hash_node(&tree, &length_chunk(1)));
    }

    struct Pair(u64, u64);

    impl SszValue for Pair {
        fn view(&self) -> ValueView<'_> {
            ValueView::Fields(vec![&self.0, &self.1])
        }
    }

    #[test]
    fn test_non_byte_nesting_is_rejected() {
        let value = vec![vec![1u64]];
        let err = root_of(DynSszConfig::new(), &<Vec<Vec<u64>>>::type_desc(), &value, &[])
            .unwrap_err();
        assert!(matches!(err, DynSszError::UnsupportedNesting(_)));
    }

    #[test]
    fn test_bitlist_elements_are_rejected() {
        use crate::bitlist::Bitlist;

        let value = vec![Bitlist::new()];
        let err = root_of(DynSszConfig::new(), &<Vec<Bitlist>>::type_desc(), &value, &[])
            .unwrap_err();
        assert!(matches!(err, DynSszError::UnsupportedElement(_)));
    }

    #[test]
    fn test_null_element() {
        let value = vec![Some(1u64), None];
        let err = root_of(DynSszConfig::new(), &<Vec<Option<u64>>>::type_desc(), &value, &[])
            .unwrap_err();
        assert!(matches!(err, DynSszError::NilValue(_)));
    }

    #[test]
    fn test_value_mismatch() {
        let err = root_of(DynSszConfig::new(), &u64::type_desc(), &vec![1u8], &[]).unwrap_err();
        assert!(matches!(
            err,
            DynSszError::ValueMismatch {
                expected: "uint64",
                found: "bytes",
                ..
            }
        ));
    }

    #[test]
    fn test_field_count_mismatch() {
        let desc = TypeDesc::container(
            "Single",
            vec![FieldDesc::new("a", u64::type_desc(), FieldTags::new())],
        );
        let err = root_of(DynSszConfig::new(), &desc, &Pair(1, 2), &[]).unwrap_err();
        assert!(matches!(
            err,
            DynSszError::FieldCountMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }
}
