//! SSZ support for [`U256`].
//!
//! A `uint256` is a basic value, so its root is its little-endian encoding.
//! The type always carries its own routine, which the root builder uses even
//! when precompiled routines are disabled.

use alloy_primitives::U256;
use strata_ssz_hasher::Chunk;

use crate::types::{SszType, TypeDesc, TypeKind};
use crate::value::{HashRoot, HashRootError, SszValue, ValueView};

impl SszType for U256 {
    fn type_desc() -> TypeDesc {
        TypeDesc::of::<Self>(TypeKind::Uint256).with_hash_root(true)
    }
}

impl SszValue for U256 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Uint256(self.as_limbs())
    }

    fn as_hash_root(&self) -> Option<&dyn HashRoot> {
        Some(self as &dyn HashRoot)
    }
}

impl HashRoot for U256 {
    fn hash_tree_root(&self) -> Result<Chunk, HashRootError> {
        Ok(self.to_le_bytes::<32>())
    }
}
