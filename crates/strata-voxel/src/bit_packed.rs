//! Word-aligned bit-packed index arrays in the Bedrock network layout.
//!
//! A storage holds exactly [`STORAGE_LEN`] indices of `bits` bits each. Indices
//! never straddle a word: each little-endian `u32` word carries
//! `floor(32 / bits)` indices starting from its least-significant bit, and
//! any leftover high bits are padding. The number of words is therefore
//! `ceil(4096 / floor(32 / bits))`, and a final word may be only partly used.

use crate::cursor::{ByteCursor, ByteWriter};
use crate::error::DecodeError;

/// Number of indices in one storage (16×16×16).
pub const STORAGE_LEN: usize = 4096;

/// Widest index the network format permits.
pub const MAX_BITS: u8 = 16;

/// Fixed-count array of palette indices packed into 32-bit words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedIndices {
    /// Raw words, in wire order.
    words: Vec<u32>,
    /// Bits per index; 0 means every index is 0 and no words exist.
    bits: u8,
}

impl PackedIndices {
    /// Creates a storage of `bits` width with every index set to zero.
    pub fn new(bits: u8) -> Self {
        debug_assert!(bits <= MAX_BITS, "bits must be at most {MAX_BITS}");
        Self {
            words: vec![0; Self::word_count(bits)],
            bits,
        }
    }

    /// Number of indices that fit in one word at `bits` width.
    pub fn per_word(bits: u8) -> usize {
        if bits == 0 { 0 } else { 32 / bits as usize }
    }

    /// Number of 4-byte words needed for [`STORAGE_LEN`] indices.
    pub fn word_count(bits: u8) -> usize {
        match Self::per_word(bits) {
            0 => 0,
            per_word => STORAGE_LEN.div_ceil(per_word),
        }
    }

    /// Bytes consumed on the wire by the packed block at `bits` width.
    pub fn wire_len(bits: u8) -> usize {
        Self::word_count(bits) * 4
    }

    /// Reads the packed block for `bits` width from `cursor`.
    ///
    /// Always consumes a whole number of words, padding included.
    pub fn read(cursor: &mut ByteCursor<'_>, bits: u8) -> Result<Self, DecodeError> {
        if bits > MAX_BITS {
            return Err(DecodeError::InvalidBitsPerEntry(bits));
        }
        let count = Self::word_count(bits);
        // Check the whole block up front so a short payload fails before allocating.
        let bytes = cursor.read_bytes(count * 4)?;
        let words = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect();
        Ok(Self { words, bits })
    }

    /// Writes the raw words in wire order.
    pub fn write(&self, writer: &mut ByteWriter) {
        for &word in &self.words {
            writer.write_u32_le(word);
        }
    }

    /// Returns the index stored at `index`.
    pub fn get(&self, index: usize) -> u16 {
        debug_assert!(index < STORAGE_LEN, "index out of bounds");
        if self.bits == 0 {
            return 0;
        }
        let per_word = Self::per_word(self.bits);
        let word = self.words[index / per_word];
        let shift = (index % per_word) as u32 * u32::from(self.bits);
        ((word >> shift) & self.mask()) as u16
    }

    /// Stores `value` at `index`.
    ///
    /// `value` must fit in the current width; widen with [`Self::resized`] first.
    pub fn set(&mut self, index: usize, value: u16) {
        debug_assert!(index < STORAGE_LEN, "index out of bounds");
        if self.bits == 0 {
            debug_assert_eq!(value, 0, "zero-width storage only holds 0");
            return;
        }
        debug_assert!(
            u32::from(value) <= self.mask(),
            "value {value} exceeds {}-bit capacity",
            self.bits
        );
        let mask = self.mask();
        let per_word = Self::per_word(self.bits);
        let shift = (index % per_word) as u32 * u32::from(self.bits);
        let word = &mut self.words[index / per_word];
        *word &= !(mask << shift);
        *word |= (u32::from(value) & mask) << shift;
    }

    /// Returns a copy repacked at `bits` width, preserving every index.
    pub fn resized(&self, bits: u8) -> Self {
        let mut out = Self::new(bits);
        if self.bits > 0 && bits > 0 {
            for i in 0..STORAGE_LEN {
                out.set(i, self.get(i));
            }
        }
        out
    }

    /// Iterates over all [`STORAGE_LEN`] indices in storage order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..STORAGE_LEN).map(move |i| self.get(i))
    }

    /// Largest index stored, or 0 for a zero-width storage.
    pub fn max_index(&self) -> u16 {
        self.iter().max().unwrap_or(0)
    }

    /// Bits per index.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Raw words in wire order.
    pub fn raw_words(&self) -> &[u32] {
        &self.words
    }

    /// Size of the backing storage in bytes.
    pub fn storage_bytes(&self) -> usize {
        self.words.len() * 4
    }

    fn mask(&self) -> u32 {
        (1u32 << self.bits) - 1
    }
}

/// Smallest width the network format uses for a palette of `len` entries.
pub fn bits_for_palette_len(len: usize) -> u8 {
    match len {
        0 | 1 => 0,
        2 => 1,
        3..=4 => 2,
        5..=8 => 3,
        9..=16 => 4,
        17..=32 => 5,
        33..=64 => 6,
        65..=256 => 8,
        _ => 16,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
