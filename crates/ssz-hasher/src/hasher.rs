//! Chunk hashing primitives: node hashing and the zero-subtree table.
use std::sync::LazyLock;

use digest::Digest;
use sha2::Sha256;

/// Number of bytes in a chunk.
pub const BYTES_PER_CHUNK: usize = 32;

/// Deepest tree we can ever need to pad to, since limits are `u64`.
pub const MAX_TREE_DEPTH: usize = 64;

/// A single 32 byte Merkle chunk.
pub type Chunk = [u8; BYTES_PER_CHUNK];

/// The all-zero chunk.
pub const ZERO_CHUNK: Chunk = [0; BYTES_PER_CHUNK];

static SHA256_ZERO_HASHES: LazyLock<[Chunk; MAX_TREE_DEPTH + 1]> =
    LazyLock::new(make_zero_hashes::<Sha256ChunkHasher>);

/// Builds the table of roots of all-zero subtrees, indexed by depth.
fn make_zero_hashes<H: ChunkHasher>() -> [Chunk; MAX_TREE_DEPTH + 1] {
    let mut table = [ZERO_CHUNK; MAX_TREE_DEPTH + 1];
    for i in 0..MAX_TREE_DEPTH {
        table[i + 1] = H::hash_node(&table[i], &table[i]);
    }
    table
}

/// Hashing strategy used to combine chunks into a Merkle tree.
pub trait ChunkHasher {
    /// Hashes a node's left and right children to compute the node's hash.
    fn hash_node(left: &Chunk, right: &Chunk) -> Chunk;

    /// Returns the root of an all-zero subtree of the given depth.
    ///
    /// Depth 0 is the zero chunk itself.
    fn zero_hash(depth: usize) -> Chunk;
}

/// SHA-256 chunk hasher, hashing `left || right` with no domain prefix, as
/// SSZ Merkleization requires.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Sha256ChunkHasher;

impl ChunkHasher for Sha256ChunkHasher {
    fn hash_node(left: &Chunk, right: &Chunk) -> Chunk {
        let mut context = Sha256::new();
        context.update(left);
        context.update(right);
        context.finalize().into()
    }

    fn zero_hash(depth: usize) -> Chunk {
        SHA256_ZERO_HASHES[depth]
    }
}

/// Encodes a length as the mixin chunk: little-endian, right padded.
pub fn length_chunk(len: u64) -> Chunk {
    let mut chunk = ZERO_CHUNK;
    chunk[..8].copy_from_slice(&len.to_le_bytes());
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hash_depth_one() {
        let expected: Chunk = Sha256::digest([0u8; 64]).into();
        assert_eq!(Sha256ChunkHasher::zero_hash(1), expected);
        assert_eq!(
            Sha256ChunkHasher::zero_hash(1)[..4],
            [0xf5, 0xa5, 0xfd, 0x42]
        );
    }

    #[test]
    fn test_zero_hashes_chain() {
        assert_eq!(Sha256ChunkHasher::zero_hash(0), ZERO_CHUNK);
        for d in 0..8 {
            let z = Sha256ChunkHasher::zero_hash(d);
            assert_eq!(
                Sha256ChunkHasher::hash_node(&z, &z),
                Sha256ChunkHasher::zero_hash(d + 1)
            );
        }
    }

    #[test]
    fn test_length_chunk() {
        let c = length_chunk(0x0102);
        assert_eq!(c[0], 0x02);
        assert_eq!(c[1], 0x01);
        assert!(c[2..].iter().all(|b| *b == 0));
    }
}
