//! SSZ hash-tree primitives.
//!
//! Modules:
//! - `hasher`: chunk type, node hashing and the zero-subtree table
//! - `buffer`: [`HashTreeBuffer`], the accumulation buffer roots are built in
//! - `limit`: chunk limit arithmetic for packed lists

// Only used by the benchmark target.
#[cfg(test)]
use criterion as _;

pub mod buffer;
pub mod error;
pub mod hasher;
pub mod limit;

pub use buffer::HashTreeBuffer;
pub use error::HasherError;
pub use hasher::{
    BYTES_PER_CHUNK, Chunk, ChunkHasher, MAX_TREE_DEPTH, Sha256ChunkHasher, ZERO_CHUNK,
    length_chunk,
};
pub use limit::calculate_limit;
