//! Hash-tree accumulation buffer.
//!
//! The buffer is a flat run of bytes that is always a whole number of chunks
//! at every position a caller might [`index`](HashTreeBuffer::index).
//! Composite values are hashed by remembering the index on entry, writing the
//! children's chunks and then collapsing everything after that index into one
//! root chunk with [`merkleize`](HashTreeBuffer::merkleize) or
//! [`merkleize_with_mixin`](HashTreeBuffer::merkleize_with_mixin).

use std::marker::PhantomData;

use crate::error::HasherError;
use crate::hasher::{
    BYTES_PER_CHUNK, Chunk, ChunkHasher, Sha256ChunkHasher, ZERO_CHUNK, length_chunk,
};

/// Append-only chunk buffer used while computing a hash tree root.
#[derive(Clone, Debug)]
pub struct HashTreeBuffer<H: ChunkHasher = Sha256ChunkHasher> {
    buf: Vec<u8>,
    _hasher: PhantomData<H>,
}

impl<H: ChunkHasher> Default for HashTreeBuffer<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ChunkHasher> HashTreeBuffer<H> {
    /// Constructs an empty buffer.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs an empty buffer with room for `chunks` chunks.
    pub fn with_capacity(chunks: usize) -> Self {
        Self {
            buf: Vec::with_capacity(chunks * BYTES_PER_CHUNK),
            _hasher: PhantomData,
        }
    }

    /// Clears the buffer so it can be reused for another traversal.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Returns the current high-water mark.
    pub fn index(&self) -> usize {
        self.buf.len()
    }

    /// Returns the raw buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the last complete chunk written, if any.
    pub fn current_root(&self) -> Option<Chunk> {
        let len = self.buf.len() - self.buf.len() % BYTES_PER_CHUNK;
        let start = len.checked_sub(BYTES_PER_CHUNK)?;
        self.buf[start..len].try_into().ok()
    }

    /// Writes a boolean as a padded chunk.
    pub fn put_bool(&mut self, b: bool) {
        self.put_u8(b as u8);
    }

    /// Writes a `u8` as a padded chunk.
    pub fn put_u8(&mut self, v: u8) {
        self.append_bytes32(&[v]);
    }

    /// Writes a little-endian `u16` as a padded chunk.
    pub fn put_u16(&mut self, v: u16) {
        self.append_bytes32(&v.to_le_bytes());
    }

    /// Writes a little-endian `u32` as a padded chunk.
    pub fn put_u32(&mut self, v: u32) {
        self.append_bytes32(&v.to_le_bytes());
    }

    /// Writes a little-endian `u64` as a padded chunk.
    pub fn put_u64(&mut self, v: u64) {
        self.append_bytes32(&v.to_le_bytes());
    }

    /// Writes a precomputed 32 byte root.
    pub fn put_root(&mut self, root: &Chunk) {
        self.buf.extend_from_slice(root);
    }

    /// Writes a byte string as exactly one chunk.
    ///
    /// Up to 32 bytes are padded into one chunk (an empty string is the zero
    /// chunk), anything longer is chunked and merkleized in place.
    pub fn put_bytes(&mut self, b: &[u8]) {
        if b.is_empty() {
            self.buf.extend_from_slice(&ZERO_CHUNK);
            return;
        }
        if b.len() <= BYTES_PER_CHUNK {
            self.append_bytes32(b);
            return;
        }

        let index = self.index();
        self.append_bytes32(b);
        self.merkleize(index);
    }

    /// Appends bytes, padding them with zeros to a chunk boundary.
    pub fn append_bytes32(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
        let rest = b.len() % BYTES_PER_CHUNK;
        if rest != 0 {
            self.buf.extend_from_slice(&ZERO_CHUNK[..BYTES_PER_CHUNK - rest]);
        }
    }

    /// Appends raw bytes with no padding.
    ///
    /// Callers packing basic values must finish with
    /// [`fill_to_chunk_boundary`](Self::fill_to_chunk_boundary) or a merkleize
    /// call before relying on the index again.
    pub fn append(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// Appends a `u8` densely.
    pub fn append_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Appends a little-endian `u16` densely.
    pub fn append_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends a little-endian `u32` densely.
    pub fn append_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends a little-endian `u64` densely.
    pub fn append_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Pads the buffer with zeros up to the next chunk boundary.
    pub fn fill_to_chunk_boundary(&mut self) {
        let rest = self.buf.len() % BYTES_PER_CHUNK;
        if rest != 0 {
            self.buf.extend_from_slice(&ZERO_CHUNK[..BYTES_PER_CHUNK - rest]);
        }
    }

    /// Collapses everything written since `index` into its Merkle root,
    /// padding with zero chunks up to the next power of two.
    pub fn merkleize(&mut self, index: usize) {
        let input = &self.buf[index..];
        let root = merkle_root::<H>(input, chunk_count(input));
        self.replace_from(index, &root);
    }

    /// Collapses everything written since `index` into a Merkle root padded
    /// to `limit` chunks, then mixes in `num` as the length.
    ///
    /// A `limit` of zero uses the number of chunks written.
    pub fn merkleize_with_mixin(
        &mut self,
        index: usize,
        num: u64,
        limit: u64,
    ) -> Result<(), HasherError> {
        let input = &self.buf[index..];
        let count = chunk_count(input);
        let limit = match limit {
            0 => count,
            l if count > l => return Err(HasherError::LimitExceeded { count, limit: l }),
            l => l,
        };
        let root = merkle_root::<H>(input, limit);
        let mixed = H::hash_node(&root, &length_chunk(num));
        self.replace_from(index, &mixed);
        Ok(())
    }

    /// Writes the root of an SSZ bitlist.
    ///
    /// `bits` is the serialized bitlist including its delimiting high bit and
    /// `max_bits` is the list's capacity in bits.
    pub fn put_bitlist(&mut self, bits: &[u8], max_bits: u64) -> Result<(), HasherError> {
        let (packed, size) = parse_bitlist(bits)?;
        let index = self.index();
        self.append_bytes32(&packed);
        self.merkleize_with_mixin(index, size, max_bits.div_ceil(256))
    }

    /// Returns the final root, requiring the buffer to hold exactly one chunk.
    pub fn hash_root(&self) -> Result<Chunk, HasherError> {
        self.buf
            .as_slice()
            .try_into()
            .map_err(|_| HasherError::InvalidRootLength(self.buf.len()))
    }

    fn replace_from(&mut self, index: usize, chunk: &Chunk) {
        self.buf.truncate(index);
        self.buf.extend_from_slice(chunk);
    }
}

/// Strips the delimiting bit off a serialized bitlist, returning the packed
/// bits with trailing zero bytes removed and the bit length.
fn parse_bitlist(bits: &[u8]) -> Result<(Vec<u8>, u64), HasherError> {
    let (&last, body) = bits
        .split_last()
        .ok_or(HasherError::BitlistMissingDelimiter)?;
    if last == 0 {
        return Err(HasherError::BitlistMissingDelimiter);
    }

    let msb = 7 - last.leading_zeros();
    let size = 8 * body.len() as u64 + msb as u64;

    let mut packed = Vec::with_capacity(bits.len());
    packed.extend_from_slice(body);
    packed.push(last & !(1 << msb));
    while packed.last() == Some(&0) {
        packed.pop();
    }

    Ok((packed, size))
}

/// Depth of the tree needed to hold `limit` leaves.
fn tree_depth(limit: u64) -> usize {
    if limit <= 1 {
        return 0;
    }
    limit
        .checked_next_power_of_two()
        .map_or(64, |p| p.trailing_zeros() as usize)
}

fn chunk_count(input: &[u8]) -> u64 {
    input.len().div_ceil(BYTES_PER_CHUNK) as u64
}

/// Computes the Merkle root of `input`, read as right-padded chunks, in a tree
/// sized for `limit` leaves.  `limit` must be at least the chunk count.
///
/// Missing leaves are virtual: whole zero subtrees come from the zero-hash
/// table rather than being hashed.
fn merkle_root<H: ChunkHasher>(input: &[u8], limit: u64) -> Chunk {
    if input.is_empty() {
        return H::zero_hash(tree_depth(limit));
    }

    let mut layer: Vec<Chunk> = input
        .chunks(BYTES_PER_CHUNK)
        .map(|c| {
            let mut chunk = ZERO_CHUNK;
            chunk[..c.len()].copy_from_slice(c);
            chunk
        })
        .collect();

    for depth in 0..tree_depth(limit) {
        if layer.len() % 2 == 1 {
            layer.push(H::zero_hash(depth));
        }
        layer = layer
            .chunks_exact(2)
            .map(|pair| H::hash_node(&pair[0], &pair[1]))
            .collect();
    }

    layer[0]
}
