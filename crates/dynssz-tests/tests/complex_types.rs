//! Property tests for containers with precompiled hash routines.
//!
//! Each precompiled routine here is written against the buffer directly, the
//! way generated code would be, so the tests pin the generic walk to it.

#![expect(missing_docs, reason = "test repo")]
#![expect(unused_crate_dependencies, reason = "macro hacks")]

use strata_dynssz_tests::{
    generate_root_tests,
    proptest::prelude::*,
    strata_dynssz::{
        Bitlist, Chunk, HashRoot, HashRootError, HashTreeBuffer, SpecValues, SszReflect, U256,
        hasher::calculate_limit,
    },
};

// Example 1: Fixed size container
#[derive(Clone, Debug, Eq, PartialEq, SszReflect)]
#[ssz(hash_root)]
pub struct Checkpoint {
    epoch: u64,
    root: [u8; 32],
}

impl HashRoot for Checkpoint {
    fn hash_tree_root(&self) -> Result<Chunk, HashRootError> {
        let mut hh: HashTreeBuffer = HashTreeBuffer::new();
        hh.put_u64(self.epoch);
        hh.put_bytes(&self.root);
        hh.merkleize(0);
        Ok(hh.hash_root()?)
    }
}

impl Arbitrary for Checkpoint {
    type Parameters = ();
    type Strategy = BoxedStrategy<Checkpoint>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<u64>(), any::<[u8; 32]>())
            .prop_map(|(epoch, root)| Checkpoint { epoch, root })
            .boxed()
    }
}

generate_root_tests!(Checkpoint, "checkpoint");

// Example 2: Lists, a bitlist and a nested precompiled container
#[derive(Clone, Debug, Eq, PartialEq, SszReflect)]
#[ssz(hash_root)]
pub struct Attestation {
    slot: u64,
    #[ssz(max = "2048")]
    aggregation_bits: Bitlist,
    #[ssz(max = "8")]
    indices: Vec<u64>,
    target: Checkpoint,
}

impl HashRoot for Attestation {
    fn hash_tree_root(&self) -> Result<Chunk, HashRootError> {
        let mut hh: HashTreeBuffer = HashTreeBuffer::new();
        hh.put_u64(self.slot);
        hh.put_bitlist(self.aggregation_bits.as_bytes(), 2048)?;

        let index = hh.index();
        for i in &self.indices {
            hh.append_u64(*i);
        }
        hh.fill_to_chunk_boundary();
        let len = self.indices.len() as u64;
        hh.merkleize_with_mixin(index, len, calculate_limit(8, len, 8))?;

        hh.put_root(&self.target.hash_tree_root()?);
        hh.merkleize(0);
        Ok(hh.hash_root()?)
    }
}

impl Arbitrary for Attestation {
    type Parameters = ();
    type Strategy = BoxedStrategy<Attestation>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            any::<u64>(),
            prop::collection::vec(any::<bool>(), 0..64),
            prop::collection::vec(any::<u64>(), 0..=8),
            any::<Checkpoint>(),
        )
            .prop_map(|(slot, bits, indices, target)| Attestation {
                slot,
                aggregation_bits: Bitlist::from_bits(&bits),
                indices,
                target,
            })
            .boxed()
    }
}

generate_root_tests!(Attestation, "attestation");

// Example 3: uint256 is hashed by its own routine on both paths
#[derive(Clone, Debug, Eq, PartialEq, SszReflect)]
pub struct Balance {
    owner: u64,
    amount: U256,
    #[ssz(max = "4")]
    history: Vec<U256>,
}

impl Arbitrary for Balance {
    type Parameters = ();
    type Strategy = BoxedStrategy<Balance>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        let uint = any::<[u64; 4]>().prop_map(U256::from_limbs);
        (
            any::<u64>(),
            uint.clone(),
            prop::collection::vec(uint, 0..=4),
        )
            .prop_map(|(owner, amount, history)| Balance {
                owner,
                amount,
                history,
            })
            .boxed()
    }
}

generate_root_tests!(Balance, "balance");

// Example 4: spec values that match the static defaults keep the fast path
#[derive(Clone, Debug, Eq, PartialEq, SszReflect)]
#[ssz(hash_root)]
pub struct Committee {
    #[ssz(max = "16", dyn_max = "MAX_COMMITTEE_SIZE")]
    members: Vec<u32>,
    #[ssz(size = "4,32", dyn_size = "ROOTS_PER_COMMITTEE,32")]
    roots: Vec<[u8; 32]>,
}

impl HashRoot for Committee {
    fn hash_tree_root(&self) -> Result<Chunk, HashRootError> {
        let mut hh: HashTreeBuffer = HashTreeBuffer::new();

        let index = hh.index();
        for m in &self.members {
            hh.append_u32(*m);
        }
        hh.fill_to_chunk_boundary();
        let len = self.members.len() as u64;
        hh.merkleize_with_mixin(index, len, calculate_limit(16, len, 4))?;

        let index = hh.index();
        for root in &self.roots {
            hh.put_bytes(root);
        }
        hh.merkleize(index);

        hh.merkleize(0);
        Ok(hh.hash_root()?)
    }
}

impl Arbitrary for Committee {
    type Parameters = ();
    type Strategy = BoxedStrategy<Committee>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(any::<u32>(), 0..=16),
            prop::collection::vec(any::<[u8; 32]>(), 4),
        )
            .prop_map(|(members, roots)| Committee { members, roots })
            .boxed()
    }
}

generate_root_tests!(
    Committee,
    "committee",
    SpecValues::new()
        .with("MAX_COMMITTEE_SIZE", 16)
        .with("ROOTS_PER_COMMITTEE", 4)
);
