//! 16×16×16 block slices and their versioned network records.
//!
//! ## Record layout
//!
//! | Field        | Size        | Notes                                  |
//! |--------------|-------------|----------------------------------------|
//! | version      | 1           | 8 or 9                                 |
//! | layer count  | 1           |                                        |
//! | y index      | 1 (`i8`)    | version 9 only                         |
//! | layers       | variable    | one block storage per layer            |
//!
//! Each block storage is a header byte (`bits << 1 | 1`), the packed index
//! words, a zig-zag palette length and that many zig-zag network block ids.
//! At zero bits there are no words and no length: a single id follows.
//! A clear low bit in the header marks a persistent (NBT) palette, which only
//! appears in saved worlds.

use crate::bit_packed::{PackedIndices, bits_for_palette_len};
use crate::coords::LocalPos;
use crate::cursor::{ByteCursor, ByteWriter};
use crate::dimension::Dimension;
use crate::error::DecodeError;
use crate::palette::check_indices;
use crate::registry::{BlockResolver, BlockTypeId};

/// Side length of a sub-chunk in blocks.
pub const SUB_CHUNK_SIZE: usize = 16;

/// Record version without a y index.
pub const SUB_CHUNK_VERSION_8: u8 = 8;

/// Record version carrying its own y index.
pub const SUB_CHUNK_VERSION_9: u8 = 9;

/// Storage layers a block update may address: blocks and liquids.
pub const MAX_LAYERS: usize = 2;

/// Returns `true` if `byte` starts a sub-chunk record this decoder reads.
pub fn is_sub_chunk_header(byte: u8) -> bool {
    matches!(byte, SUB_CHUNK_VERSION_8 | SUB_CHUNK_VERSION_9)
}

// ---------------------------------------------------------------------------
// BlockStorage
// ---------------------------------------------------------------------------

/// One layer of a sub-chunk: packed indices into a palette of block handles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockStorage {
    indices: PackedIndices,
    palette: Vec<BlockTypeId>,
}

impl BlockStorage {
    /// A storage where every block is `fill`.
    pub fn new(fill: BlockTypeId) -> Self {
        Self {
            indices: PackedIndices::new(0),
            palette: vec![fill],
        }
    }

    /// Builds a storage from decoded parts, checking every index against the palette.
    pub fn from_parts(indices: PackedIndices, palette: Vec<BlockTypeId>) -> Result<Self, DecodeError> {
        check_indices(&indices, palette.len())?;
        Ok(Self { indices, palette })
    }

    /// Block at `pos`.
    pub fn get(&self, pos: LocalPos) -> BlockTypeId {
        self.palette[usize::from(self.indices.get(pos.index()))]
    }

    /// Sets the block at `pos`, growing the palette and widening storage as needed.
    pub fn set(&mut self, pos: LocalPos, block: BlockTypeId) {
        let idx = self.palette_index_or_insert(block);
        self.indices.set(pos.index(), idx);
    }

    /// Block handles this storage can hold.
    pub fn palette(&self) -> &[BlockTypeId] {
        &self.palette
    }

    /// Bits per stored index.
    pub fn bits(&self) -> u8 {
        self.indices.bits()
    }

    pub fn indices(&self) -> &PackedIndices {
        &self.indices
    }

    fn palette_index_or_insert(&mut self, block: BlockTypeId) -> u16 {
        if let Some(idx) = self.palette.iter().position(|&b| b == block) {
            return idx as u16;
        }

        if bits_for_palette_len(self.palette.len() + 1) > self.indices.bits() {
            self.compact();
            let new_bits = bits_for_palette_len(self.palette.len() + 1);
            if new_bits > self.indices.bits() {
                self.indices = self.indices.resized(new_bits);
            }
        }
        self.palette.push(block);
        // At most STORAGE_LEN entries survive compaction, so this fits.
        (self.palette.len() - 1) as u16
    }

    /// Drops palette entries no position refers to and repacks at the
    /// narrowest width.
    fn compact(&mut self) {
        let mut remap = vec![None; self.palette.len()];
        let mut palette = Vec::new();
        let old: Vec<u16> = self.indices.iter().collect();
        for &idx in &old {
            let slot = &mut remap[usize::from(idx)];
            if slot.is_none() {
                *slot = Some(palette.len() as u16);
                palette.push(self.palette[usize::from(idx)]);
            }
        }

        let mut indices = PackedIndices::new(bits_for_palette_len(palette.len()));
        if indices.bits() > 0 {
            for (i, &idx) in old.iter().enumerate() {
                indices.set(i, remap[usize::from(idx)].unwrap_or(0));
            }
        }
        self.indices = indices;
        self.palette = palette;
    }
}

// ---------------------------------------------------------------------------
// SubChunk
// ---------------------------------------------------------------------------

/// A 16×16×16 slice of blocks with one or more storage layers.
///
/// Layer 0 holds the primary blocks; layer 1, when present, holds liquids
/// overlapping them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubChunk {
    version: u8,
    /// Vertical index carried by version 9 records.
    y_index: Option<i8>,
    layers: Vec<BlockStorage>,
}

impl SubChunk {
    /// A single-layer sub-chunk filled with `fill`.
    pub fn new_filled(fill: BlockTypeId) -> Self {
        Self {
            version: SUB_CHUNK_VERSION_9,
            y_index: None,
            layers: vec![BlockStorage::new(fill)],
        }
    }

    /// Record version this sub-chunk was decoded from.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn y_index(&self) -> Option<i8> {
        self.y_index
    }

    pub fn layers(&self) -> &[BlockStorage] {
        &self.layers
    }

    pub fn layer(&self, layer: usize) -> Option<&BlockStorage> {
        self.layers.get(layer)
    }

    /// Block at `pos` in `layer`, or `None` if the layer does not exist.
    pub fn get(&self, pos: LocalPos, layer: usize) -> Option<BlockTypeId> {
        self.layers.get(layer).map(|storage| storage.get(pos))
    }

    /// Sets a block, creating `fill`-filled layers up to `layer` if missing.
    ///
    /// Returns `false` without changing anything if `layer` is not below
    /// [`MAX_LAYERS`].
    pub fn set(
        &mut self,
        pos: LocalPos,
        layer: usize,
        block: BlockTypeId,
        fill: BlockTypeId,
    ) -> bool {
        if layer >= MAX_LAYERS {
            return false;
        }
        while self.layers.len() <= layer {
            self.layers.push(BlockStorage::new(fill));
        }
        self.layers[layer].set(pos, block);
        true
    }

    /// Encodes this sub-chunk as a network record, mapping handles back to
    /// network ids with `network_id`.
    pub fn write(&self, writer: &mut ByteWriter, network_id: impl Fn(BlockTypeId) -> u32) {
        writer.write_u8(self.version).write_u8(self.layers.len() as u8);
        if self.version == SUB_CHUNK_VERSION_9 {
            writer.write_i8(self.y_index.unwrap_or(0));
        }
        for storage in &self.layers {
            writer.write_u8((storage.bits() << 1) | 1);
            storage.indices.write(writer);
            let palette = if storage.bits() == 0 {
                &storage.palette[..1]
            } else {
                writer.write_var_i32(storage.palette.len() as i32);
                &storage.palette[..]
            };
            for &block in palette {
                writer.write_var_i32(network_id(block) as i32);
            }
        }
    }
}

/// Decodes one versioned sub-chunk record.
pub fn decode_sub_chunk(
    cursor: &mut ByteCursor<'_>,
    resolver: &dyn BlockResolver,
) -> Result<SubChunk, DecodeError> {
    let version = cursor.read_u8()?;
    if !is_sub_chunk_header(version) {
        return Err(DecodeError::UnsupportedSubChunkVersion(version));
    }

    let layer_count = cursor.read_u8()?;
    let y_index = if version == SUB_CHUNK_VERSION_9 {
        Some(cursor.read_i8()?)
    } else {
        None
    };

    let layers = (0..layer_count)
        .map(|_| decode_block_storage(cursor, resolver))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SubChunk {
        version,
        y_index,
        layers,
    })
}

fn decode_block_storage(
    cursor: &mut ByteCursor<'_>,
    resolver: &dyn BlockResolver,
) -> Result<BlockStorage, DecodeError> {
    let header = cursor.read_u8()?;
    if header & 1 == 0 {
        return Err(DecodeError::PersistentPalette);
    }
    let indices = PackedIndices::read(cursor, header >> 1)?;

    let len = if indices.bits() == 0 {
        1
    } else {
        let len = cursor.read_var_i32()?;
        if !(1..=4096).contains(&len) {
            return Err(DecodeError::InvalidPaletteLength(len));
        }
        len
    };
    let palette = (0..len)
        .map(|_| {
            let network_id = cursor.read_var_i32()? as u32;
            resolver
                .resolve(network_id)
                .ok_or(DecodeError::UnknownBlockId(network_id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    BlockStorage::from_parts(indices, palette)
}

/// Decodes consecutive inline records into the column's slot list.
///
/// Stops at the first byte that is not a record version (the normal end of the
/// inline section) or once every slot of `dimension` is filled. The returned
/// vector always has `dimension.max_sub_chunks()` entries.
pub fn decode_inline_sub_chunks(
    cursor: &mut ByteCursor<'_>,
    dimension: Dimension,
    resolver: &dyn BlockResolver,
) -> Result<Vec<Option<SubChunk>>, DecodeError> {
    let mut slots: Vec<Option<SubChunk>> = vec![None; dimension.max_sub_chunks()];

    for slot in slots.iter_mut() {
        match cursor.peek_u8() {
            Some(byte) if is_sub_chunk_header(byte) => {
                *slot = Some(decode_sub_chunk(cursor, resolver)?);
            }
            _ => break,
        }
    }

    Ok(slots)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
