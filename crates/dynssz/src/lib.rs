//! Runtime SSZ hash tree roots for types whose sizes depend on a chain
//! configuration.
//!
//! Types describe their shape with [`SszType`] and expose their contents with
//! [`SszValue`], usually through `#[derive(SszReflect)]`.  [`DynSsz`] hashes
//! values under a set of [`SpecValues`], reusing a type's precompiled
//! [`HashRoot`] routine wherever no size it was built against has been moved
//! by the configuration, and walking the value generically everywhere else.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

mod bitlist;
mod compat;
mod config;
mod errors;
mod expr;
mod hints;
mod root;
mod spec;
mod types;
mod uint256;
mod value;

pub use bitlist::Bitlist;
pub use compat::{CompatOracle, HashCompat};
pub use config::DynSszConfig;
pub use errors::{DynSszError, DynSszResult, TagError};
pub use hints::{MaxSizeHint, SizeHint, resolve_max_hints, resolve_size_hints};
pub use root::RootBuilder;
pub use spec::SpecValues;
pub use strata_dynssz_derive::SszReflect;
pub use strata_ssz_hasher as hasher;
pub use strata_ssz_hasher::{Chunk, ChunkHasher, HashTreeBuffer};
pub use alloy_primitives::U256;
pub use types::{FieldDesc, FieldTags, SszType, TypeDesc, TypeKind};
pub use value::{HashRoot, HashRootError, SszValue, ValueView};

/// Hash tree root engine bound to one set of spec values.
#[derive(Debug)]
pub struct DynSsz {
    spec: SpecValues,
    config: DynSszConfig,
    oracle: CompatOracle,
    descs: RwLock<HashMap<TypeId, Arc<TypeDesc>>>,
}

impl DynSsz {
    /// Constructs a new engine with the default configuration.
    pub fn new(spec: SpecValues) -> Self {
        Self {
            spec,
            config: DynSszConfig::default(),
            oracle: CompatOracle::new(),
            descs: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: DynSszConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the configuration.  Traversals already running keep the
    /// configuration they started with.
    pub fn set_config(&mut self, config: DynSszConfig) {
        self.config = config;
    }

    /// Current configuration.
    pub fn config(&self) -> DynSszConfig {
        self.config
    }

    /// Spec values sizes are resolved against.
    pub fn spec(&self) -> &SpecValues {
        &self.spec
    }

    /// Returns the descriptor of `T`, building it on first use.
    pub fn type_desc<T: SszType + 'static>(&self) -> Arc<TypeDesc> {
        let id = TypeId::of::<T>();
        if let Some(desc) = self
            .descs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return desc.clone();
        }

        let desc = Arc::new(T::type_desc());
        self.descs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(desc)
            .clone()
    }

    /// Computes the hash tree root of `value`.
    pub fn hash_tree_root<T>(&self, value: &T) -> DynSszResult<Chunk>
    where
        T: SszType + SszValue + 'static,
    {
        let desc = self.type_desc::<T>();
        self.compute_root(&desc, value)
    }

    /// Computes the hash tree root of `value` as described by `ty`.
    pub fn compute_root(&self, ty: &TypeDesc, value: &dyn SszValue) -> DynSszResult<Chunk> {
        let mut hh: HashTreeBuffer = HashTreeBuffer::new();
        self.compute_root_into(ty, value, &mut hh)?;
        let root = hh.hash_root()?;
        if self.config.verbose() {
            debug!(ty = ty.name(), root = %hex::encode(root), "computed hash tree root");
        }
        Ok(root)
    }

    /// Writes the hash tree root of `value` into an existing buffer, as one
    /// new chunk at its current index.
    pub fn compute_root_into<H: ChunkHasher>(
        &self,
        ty: &TypeDesc,
        value: &dyn SszValue,
        hh: &mut HashTreeBuffer<H>,
    ) -> DynSszResult<()> {
        let builder = RootBuilder::new(&self.spec, &self.oracle, self.config);
        builder.build_root(ty, value, hh, &[], &[], 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_desc_is_cached() {
        let ssz = DynSsz::new(SpecValues::new());
        let a = ssz.type_desc::<Vec<u64>>();
        let b = ssz.type_desc::<Vec<u64>>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ssz.descs.read().unwrap().len(), 1);
    }

    #[test]
    fn test_compute_root_into_appends_one_chunk() {
        let ssz = DynSsz::new(SpecValues::new());
        let mut hh = HashTreeBuffer::<hasher::Sha256ChunkHasher>::new();
        hh.put_u64(1);
        let desc = ssz.type_desc::<[u64; 2]>();
        ssz.compute_root_into(&desc, &[5u64, 6], &mut hh).unwrap();
        assert_eq!(hh.index(), 64);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DynSsz>();
    }
}
