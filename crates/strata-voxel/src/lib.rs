//! Decoding of network chunk payloads into palette-compressed block columns.

pub mod biome;
pub mod bit_packed;
pub mod chunk;
pub mod coords;
pub mod cursor;
pub mod dimension;
pub mod error;
pub mod palette;
pub mod registry;
pub mod sub_chunk;

pub use biome::{BiomeLayer, decode_biome_column};
pub use bit_packed::{PackedIndices, STORAGE_LEN};
pub use chunk::{Chunk, ChunkDecoder, ChunkFormat, DecodedChunk, NetworkChunkDecoder, decoder_for};
pub use coords::{BlockPos, ChunkPos, LocalPos, SubChunkPos};
pub use cursor::{ByteCursor, ByteWriter};
pub use dimension::Dimension;
pub use error::DecodeError;
pub use palette::{PalettedValues, read_paletted};
pub use registry::{BlockRegistry, BlockResolver, BlockTypeDef, BlockTypeId, RegistryError};
pub use sub_chunk::{
    BlockStorage, MAX_LAYERS, SubChunk, decode_inline_sub_chunks, decode_sub_chunk,
};
