//! Errors raised while decoding chunk payloads.
//!
//! Every variant is fatal for the payload being decoded: the caller must
//! discard the partial result and leave previously stored chunks untouched.

use thiserror::Error;

/// A malformed or unsupported network chunk payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read would run past the end of the buffer.
    #[error("unexpected end of payload at byte {position}: needed {needed}, {remaining} left")]
    UnexpectedEof {
        /// Cursor position when the read was attempted.
        position: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes that were left.
        remaining: usize,
    },

    /// A variable-length integer ran past its maximum encoded size.
    #[error("var-int at byte {0} is longer than 5 bytes")]
    VarIntTooLong(usize),

    /// The biome type byte did not carry the runtime-id flag.
    #[error("unsupported biome palette type byte {0:#04x}")]
    UnsupportedBiomePalette(u8),

    /// A `0xFF` copy marker appeared before any biome layer was decoded.
    #[error("biome copy marker with no previous layer")]
    BiomeCopyWithoutPrevious,

    /// Bits-per-entry outside the range a 4-byte word can hold.
    #[error("invalid bits per entry: {0}")]
    InvalidBitsPerEntry(u8),

    /// The sub-chunk version byte is not one this decoder handles.
    #[error("unsupported sub-chunk version {0}")]
    UnsupportedSubChunkVersion(u8),

    /// A block storage uses the persistent (NBT) palette encoding.
    #[error("persistent block palettes are not supported on the network path")]
    PersistentPalette,

    /// A palette entry names a network block id the resolver does not know.
    #[error("unknown network block id {0}")]
    UnknownBlockId(u32),

    /// A stored index points past the end of its palette.
    #[error("palette index {index} out of range for palette of {len}")]
    PaletteIndexOutOfRange {
        /// The offending index.
        index: u16,
        /// Palette length.
        len: usize,
    },

    /// A palette length prefix was negative or empty where entries are required.
    #[error("invalid palette length {0}")]
    InvalidPaletteLength(i32),

    /// The dimension id is not one of the known dimensions.
    #[error("unknown dimension id {0}")]
    UnknownDimension(i32),

    /// A sub-chunk entry referenced the blob cache instead of carrying data inline.
    #[error("cached sub-chunk payloads are not supported")]
    CacheUnsupported,
}
