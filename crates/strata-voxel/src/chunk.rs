//! Chunk columns and the decoders that build them from network payloads.
//!
//! A level-chunk payload is laid out as:
//!
//! ```text
//! [sub-chunk record]*   until a byte that is not a record version
//! [biome layer]*        until 0x00, end of input, or the layer limit
//! [trailer]             ignored (border blocks, block entities)
//! ```
//!
//! Neither section has a count prefix, so the cursor position is the only
//! delimiter between them.

use crate::biome::{BiomeLayer, decode_biome_column};
use crate::coords::{BlockPos, ChunkPos};
use crate::cursor::ByteCursor;
use crate::dimension::Dimension;
use crate::error::DecodeError;
use crate::registry::{BlockResolver, BlockTypeId};
use crate::sub_chunk::{MAX_LAYERS, SubChunk, decode_inline_sub_chunks};

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// One full-height column of sub-chunks plus its biome layers.
///
/// The slot vector always has `dimension.max_sub_chunks()` entries; slot 0 is
/// the dimension's lowest sub-chunk. Slots stay `None` until their data
/// arrives, either inline or through a later sub-chunk response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pos: ChunkPos,
    dimension: Dimension,
    sub_chunks: Vec<Option<SubChunk>>,
    biomes: Vec<BiomeLayer>,
}

impl Chunk {
    /// An empty column with every slot unfilled.
    pub fn new(pos: ChunkPos, dimension: Dimension) -> Self {
        Self {
            pos,
            dimension,
            sub_chunks: vec![None; dimension.max_sub_chunks()],
            biomes: Vec::new(),
        }
    }

    /// Builds a column from decoded parts.
    ///
    /// `sub_chunks` is truncated or padded to the dimension's slot count.
    pub fn from_parts(
        pos: ChunkPos,
        dimension: Dimension,
        mut sub_chunks: Vec<Option<SubChunk>>,
        biomes: Vec<BiomeLayer>,
    ) -> Self {
        sub_chunks.resize(dimension.max_sub_chunks(), None);
        Self {
            pos,
            dimension,
            sub_chunks,
            biomes,
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// All slots, lowest first.
    pub fn sub_chunks(&self) -> &[Option<SubChunk>] {
        &self.sub_chunks
    }

    /// Sub-chunk in `slot`, if filled.
    pub fn slot(&self, slot: usize) -> Option<&SubChunk> {
        self.sub_chunks.get(slot)?.as_ref()
    }

    /// Sub-chunk with vertical index `sub_chunk_y`, if filled.
    pub fn sub_chunk_at(&self, sub_chunk_y: i32) -> Option<&SubChunk> {
        self.slot(self.dimension.slot_for_sub_chunk_y(sub_chunk_y)?)
    }

    /// Number of filled slots.
    pub fn populated_count(&self) -> usize {
        self.sub_chunks.iter().filter(|s| s.is_some()).count()
    }

    /// Index of the lowest unfilled slot.
    pub fn first_free_slot(&self) -> Option<usize> {
        self.sub_chunks.iter().position(Option::is_none)
    }

    /// Stores `sub_chunk` in `slot`, returning what was there.
    ///
    /// Returns `Err(sub_chunk)` back if `slot` is beyond the dimension.
    pub fn place_sub_chunk(
        &mut self,
        slot: usize,
        sub_chunk: SubChunk,
    ) -> Result<Option<SubChunk>, SubChunk> {
        match self.sub_chunks.get_mut(slot) {
            Some(entry) => Ok(entry.replace(sub_chunk)),
            None => Err(sub_chunk),
        }
    }

    /// Biome layers, lowest first.
    pub fn biomes(&self) -> &[BiomeLayer] {
        &self.biomes
    }

    /// Block at an absolute position, or `None` if the position is outside
    /// this column's height or its sub-chunk has not arrived.
    ///
    /// The horizontal part of `pos` is taken modulo 16; callers route by column first.
    pub fn get_block(&self, pos: BlockPos, layer: usize) -> Option<BlockTypeId> {
        self.sub_chunk_at(pos.sub_chunk_y())?.get(pos.local(), layer)
    }

    /// Sets the block at an absolute position.
    ///
    /// An unfilled slot is first populated with a `fill`-filled sub-chunk.
    /// Returns `false` if `pos` is outside this column's height or `layer`
    /// is not below [`MAX_LAYERS`].
    pub fn set_block(
        &mut self,
        pos: BlockPos,
        layer: usize,
        block: BlockTypeId,
        fill: BlockTypeId,
    ) -> bool {
        if layer >= MAX_LAYERS {
            return false;
        }
        let Some(slot) = self.dimension.slot_for_sub_chunk_y(pos.sub_chunk_y()) else {
            return false;
        };
        self.sub_chunks[slot]
            .get_or_insert_with(|| SubChunk::new_filled(fill))
            .set(pos.local(), layer, block, fill)
    }
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

/// Wire format a chunk payload was produced for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkFormat {
    /// Level-chunk payloads sent to clients: runtime-id palettes, version 8/9 records.
    Network,
}

/// Result of decoding one payload.
#[derive(Clone, Debug)]
pub struct DecodedChunk {
    pub chunk: Chunk,
    /// Bytes left after the biome section (border blocks, block entities).
    pub trailing_bytes: usize,
}

/// Turns a column payload into a [`Chunk`].
pub trait ChunkDecoder {
    /// Format this decoder reads.
    fn format(&self) -> ChunkFormat;

    /// Decodes `payload` for the column at `pos`.
    ///
    /// Any error is fatal for the payload; no partial chunk is returned.
    fn decode(
        &self,
        pos: ChunkPos,
        dimension: Dimension,
        payload: &[u8],
        resolver: &dyn BlockResolver,
    ) -> Result<DecodedChunk, DecodeError>;
}

/// Decoder for [`ChunkFormat::Network`] payloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkChunkDecoder;

impl ChunkDecoder for NetworkChunkDecoder {
    fn format(&self) -> ChunkFormat {
        ChunkFormat::Network
    }

    fn decode(
        &self,
        pos: ChunkPos,
        dimension: Dimension,
        payload: &[u8],
        resolver: &dyn BlockResolver,
    ) -> Result<DecodedChunk, DecodeError> {
        let mut cursor = ByteCursor::new(payload);

        let sub_chunks = decode_inline_sub_chunks(&mut cursor, dimension, resolver)?;
        let biomes = decode_biome_column(&mut cursor, dimension)?;

        let chunk = Chunk::from_parts(pos, dimension, sub_chunks, biomes);
        let trailing_bytes = cursor.remaining();

        tracing::debug!(
            x = pos.x,
            z = pos.z,
            ?dimension,
            sub_chunks = chunk.populated_count(),
            biome_layers = chunk.biomes().len(),
            trailing_bytes,
            "decoded chunk payload"
        );

        Ok(DecodedChunk {
            chunk,
            trailing_bytes,
        })
    }
}

/// Returns the decoder for `format`.
pub fn decoder_for(format: ChunkFormat) -> &'static dyn ChunkDecoder {
    match format {
        ChunkFormat::Network => &NetworkChunkDecoder,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_packed::{PackedIndices, STORAGE_LEN};
    use crate::coords::LocalPos;
    use crate::cursor::ByteWriter;
    use crate::registry::{BlockRegistry, BlockTypeDef};

    const AIR_NET: u32 = 1;
    const STONE_NET: u32 = 2;

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new(AIR_NET);
        registry
            .register(BlockTypeDef {
                name: "minecraft:stone".to_string(),
                network_id: STONE_NET,
                solid: true,
            })
            .unwrap();
        registry
    }

    fn uniform_record(w: &mut ByteWriter, network_id: u32) {
        w.write_u8(8).write_u8(1).write_u8(1);
        w.write_var_i32(network_id as i32);
    }

    fn checker_record(w: &mut ByteWriter) {
        let mut indices = PackedIndices::new(1);
        for i in 0..STORAGE_LEN {
            indices.set(i, (i % 2) as u16);
        }
        w.write_u8(9).write_u8(1).write_i8(0).write_u8(3);
        indices.write(w);
        w.write_var_i32(2)
            .write_var_i32(AIR_NET as i32)
            .write_var_i32(STONE_NET as i32);
    }

    #[test]
    fn test_full_payload() {
        let registry = registry();
        let mut w = ByteWriter::new();
        uniform_record(&mut w, STONE_NET);
        checker_record(&mut w);
        // Biomes: one uniform layer then a copy.
        w.write_u8(1).write_var_u32(4 << 1).write_u8(0xFF).write_u8(0x00);
        // Trailer: block entity bytes the decoder leaves alone.
        w.write_bytes(&[0x0A, 0x00, 0x00]);
        let data = w.into_inner();

        let decoded = NetworkChunkDecoder
            .decode(ChunkPos::new(3, -7), Dimension::Overworld, &data, &registry)
            .unwrap();
        let chunk = decoded.chunk;

        assert_eq!(decoded.trailing_bytes, 3);
        assert_eq!(chunk.pos(), ChunkPos::new(3, -7));
        assert_eq!(chunk.populated_count(), 2);
        assert_eq!(chunk.sub_chunks().len(), 24);
        assert_eq!(chunk.biomes().len(), 2);

        let stone = registry.resolve(STONE_NET).unwrap();
        // Slot 0 is y -64..-48.
        assert_eq!(chunk.get_block(BlockPos::new(48, -64, -112), 0), Some(stone));
        // Slot 1 alternates along y.
        assert_eq!(chunk.get_block(BlockPos::new(0, -48, 0), 0), Some(BlockTypeId::AIR));
        assert_eq!(chunk.get_block(BlockPos::new(0, -47, 0), 0), Some(stone));
        // Slot 2 was never sent.
        assert_eq!(chunk.get_block(BlockPos::new(0, -32, 0), 0), None);
    }

    #[test]
    fn test_no_inline_sub_chunks_goes_to_biomes() {
        let registry = registry();
        let data = [0x01, 0x02, 0x00];
        let decoded = NetworkChunkDecoder
            .decode(ChunkPos::new(0, 0), Dimension::Overworld, &data, &registry)
            .unwrap();
        assert_eq!(decoded.chunk.populated_count(), 0);
        assert_eq!(decoded.chunk.biomes().len(), 1);
        assert_eq!(decoded.chunk.biomes()[0].palette(), &[1]);
        assert_eq!(decoded.trailing_bytes, 0);
    }

    #[test]
    fn test_truncated_record_is_fatal() {
        let registry = registry();
        let mut w = ByteWriter::new();
        checker_record(&mut w);
        let mut data = w.into_inner();
        data.truncate(100);
        let result =
            NetworkChunkDecoder.decode(ChunkPos::new(0, 0), Dimension::Overworld, &data, &registry);
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_bad_biome_type_is_fatal() {
        let registry = registry();
        let mut w = ByteWriter::new();
        uniform_record(&mut w, STONE_NET);
        w.write_u8(0x02);
        let data = w.into_inner();
        let result =
            NetworkChunkDecoder.decode(ChunkPos::new(0, 0), Dimension::End, &data, &registry);
        assert_eq!(result.unwrap_err(), DecodeError::UnsupportedBiomePalette(0x02));
    }

    #[test]
    fn test_decoder_for_network() {
        assert_eq!(decoder_for(ChunkFormat::Network).format(), ChunkFormat::Network);
    }

    #[test]
    fn test_set_block_fills_empty_slot() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), Dimension::Overworld);
        let pos = BlockPos::new(5, 100, 9);
        assert!(chunk.set_block(pos, 0, BlockTypeId(3), BlockTypeId::AIR));
        assert_eq!(chunk.get_block(pos, 0), Some(BlockTypeId(3)));
        assert_eq!(chunk.get_block(BlockPos::new(5, 101, 9), 0), Some(BlockTypeId::AIR));
        assert_eq!(chunk.populated_count(), 1);
        assert!(!chunk.set_block(BlockPos::new(0, 320, 0), 0, BlockTypeId(3), BlockTypeId::AIR));
    }

    #[test]
    fn test_set_block_rejects_unknown_layer() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), Dimension::End);
        let pos = BlockPos::new(1, 1, 1);
        assert!(!chunk.set_block(pos, 2, BlockTypeId(3), BlockTypeId::AIR));
        assert_eq!(chunk.populated_count(), 0);
        assert!(chunk.set_block(pos, 1, BlockTypeId(3), BlockTypeId::AIR));
        assert_eq!(chunk.get_block(pos, 1), Some(BlockTypeId(3)));
    }

    #[test]
    fn test_place_sub_chunk_bounds() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), Dimension::Nether);
        let sub = SubChunk::new_filled(BlockTypeId(2));
        assert_eq!(chunk.place_sub_chunk(7, sub.clone()), Ok(None));
        assert_eq!(chunk.place_sub_chunk(7, sub.clone()), Ok(Some(sub.clone())));
        assert_eq!(chunk.place_sub_chunk(8, sub.clone()), Err(sub));
        assert_eq!(chunk.first_free_slot(), Some(0));
        assert_eq!(
            chunk.slot(7).and_then(|s| s.get(LocalPos { x: 0, y: 0, z: 0 }, 0)),
            Some(BlockTypeId(2))
        );
    }
}
