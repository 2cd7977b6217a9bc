//! Chunk limit arithmetic for packed lists.

use crate::hasher::BYTES_PER_CHUNK;

/// Computes the chunk limit of a list of `max_items` basic values of
/// `item_size` bytes each.
///
/// The limit only depends on the declared maximum so that roots of lists with
/// different lengths share a tree depth.  A zero result (zero capacity or
/// zero sized items) falls back to the actual item count, with a minimum of
/// one chunk.
pub fn calculate_limit(max_items: u64, num_items: u64, item_size: u64) -> u64 {
    let limit = max_items
        .saturating_mul(item_size)
        .div_ceil(BYTES_PER_CHUNK as u64);
    if limit != 0 {
        return limit;
    }

    if num_items == 0 { 1 } else { num_items }
}
