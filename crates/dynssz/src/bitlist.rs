//! Variable length bitlist.

use crate::types::{SszType, TypeDesc, TypeKind};
use crate::value::{SszValue, ValueView};

/// Bitlist in its serialized form: bits packed little-endian into bytes,
/// followed by a single delimiting `1` bit that marks the length.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Bitlist(Vec<u8>);

impl Bitlist {
    /// Constructs an empty bitlist.
    pub fn new() -> Self {
        Self(vec![1])
    }

    /// Wraps already serialized bytes, delimiter included.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Packs a sequence of bits and appends the delimiter.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len() / 8 + 1];
        for (i, bit) in bits.iter().enumerate() {
            if *bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        bytes[bits.len() / 8] |= 1 << (bits.len() % 8);
        Self(bytes)
    }

    /// Returns the serialized bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Bitlist {
    fn default() -> Self {
        Self::new()
    }
}

impl SszType for Bitlist {
    fn type_desc() -> TypeDesc {
        TypeDesc::of::<Self>(TypeKind::Bitlist)
    }
}

impl SszValue for Bitlist {
    fn view(&self) -> ValueView<'_> {
        ValueView::Bytes(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Bitlist;

    #[test]
    fn test_from_bits() {
        assert_eq!(Bitlist::new().as_bytes(), &[0b1]);
        assert_eq!(Bitlist::from_bits(&[true, false]).as_bytes(), &[0b101]);

        let eight = Bitlist::from_bits(&[true; 8]);
        assert_eq!(eight.as_bytes(), &[0xff, 0b1]);
    }
}
