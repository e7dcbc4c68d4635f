//! Packet bodies exchanged with the server about chunk data.
//!
//! The transport hands these over already deframed. [`LevelChunk`] and
//! [`UpdateBlock`] can also be parsed from their raw bodies, and
//! [`SubChunkRequest`] encodes itself for sending.

use serde::{Deserialize, Serialize};
use strata_voxel::{BlockPos, ByteCursor, ByteWriter, ChunkPos, DecodeError, Dimension, SubChunkPos};

/// Wire value of `sub_chunk_count` meaning "request everything".
pub const SUB_CHUNK_REQUEST_LIMITLESS: i32 = -1;

/// Wire value of `sub_chunk_count` meaning "request up to `highest_sub_chunk_count`".
pub const SUB_CHUNK_REQUEST_LIMITED: i32 = -2;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Full column payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChunk {
    /// Column X.
    pub x: i32,
    /// Column Z.
    pub z: i32,
    pub dimension: Dimension,
    /// Sub-chunks sent inline, or a negative request mode.
    pub sub_chunk_count: i32,
    /// Exclusive upper vertical index the client should request up to.
    pub highest_sub_chunk_count: i32,
    /// Inline sub-chunks, biomes and trailer.
    pub data: Vec<u8>,
}

impl LevelChunk {
    pub fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.x, self.z)
    }

    /// Parses a level-chunk packet body.
    ///
    /// In limitless mode the server sends no upper bound, so the top of the
    /// dimension is used.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(body);
        let x = cursor.read_var_i32()?;
        let z = cursor.read_var_i32()?;
        let dimension = Dimension::from_wire(cursor.read_var_i32()?)?;

        let sub_chunk_count = cursor.read_var_u32()? as i32;
        let highest_sub_chunk_count = match sub_chunk_count {
            SUB_CHUNK_REQUEST_LIMITED => i32::from(cursor.read_u16_le()?),
            SUB_CHUNK_REQUEST_LIMITLESS => {
                dimension.min_sub_chunk_index() + dimension.max_sub_chunks() as i32
            }
            _ => 0,
        };

        if cursor.read_bool()? {
            return Err(DecodeError::CacheUnsupported);
        }

        let len = cursor.read_var_u32()? as usize;
        let data = cursor.read_bytes(len)?.to_vec();

        Ok(Self {
            x,
            z,
            dimension,
            sub_chunk_count,
            highest_sub_chunk_count,
            data,
        })
    }

    /// Encodes the packet body; the inverse of [`Self::decode`].
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_var_i32(self.x)
            .write_var_i32(self.z)
            .write_var_i32(self.dimension.wire_id())
            .write_var_u32(self.sub_chunk_count as u32);
        if self.sub_chunk_count == SUB_CHUNK_REQUEST_LIMITED {
            w.write_u16_le(self.highest_sub_chunk_count as u16);
        }
        w.write_bool(false)
            .write_var_u32(self.data.len() as u32)
            .write_bytes(&self.data);
        w.into_inner()
    }
}

/// Offset of one sub-chunk relative to a request or response origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubChunkOffset {
    pub x: i8,
    pub y: i8,
    pub z: i8,
}

impl SubChunkOffset {
    pub const fn vertical(y: i8) -> Self {
        Self { x: 0, y, z: 0 }
    }
}

/// Outcome the server reports for one requested sub-chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubChunkResult {
    Success,
    ChunkNotFound,
    InvalidDimension,
    PlayerNotFound,
    YIndexOutOfBounds,
    /// Success, but the sub-chunk is entirely air and no payload is sent.
    SuccessAllAir,
}

impl SubChunkResult {
    /// Wire value of this result.
    pub fn wire_id(self) -> u8 {
        match self {
            Self::Success => 1,
            Self::ChunkNotFound => 2,
            Self::InvalidDimension => 3,
            Self::PlayerNotFound => 4,
            Self::YIndexOutOfBounds => 5,
            Self::SuccessAllAir => 6,
        }
    }

    /// Parses a wire result; unknown values are `None`.
    pub fn from_wire(id: u8) -> Option<Self> {
        Some(match id {
            1 => Self::Success,
            2 => Self::ChunkNotFound,
            3 => Self::InvalidDimension,
            4 => Self::PlayerNotFound,
            5 => Self::YIndexOutOfBounds,
            6 => Self::SuccessAllAir,
            _ => return None,
        })
    }
}

/// One sub-chunk in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChunkEntry {
    pub offset: SubChunkOffset,
    pub result: SubChunkResult,
    /// One versioned sub-chunk record, possibly followed by ignored bytes.
    pub payload: Vec<u8>,
}

/// Response to a [`SubChunkRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChunkResponse {
    pub dimension: Dimension,
    /// Column and vertical index the entry offsets are relative to.
    pub origin: SubChunkPos,
    /// Whether payloads reference the blob cache instead of carrying data.
    pub cache_enabled: bool,
    pub entries: Vec<SubChunkEntry>,
}

/// A single block change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBlock {
    pub position: BlockPos,
    pub network_block_id: u32,
    /// Storage layer: 0 for blocks, 1 for liquids.
    pub layer: u32,
}

impl UpdateBlock {
    /// Parses an update-block packet body.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(body);
        let x = cursor.read_var_i32()?;
        let y = cursor.read_var_u32()? as i32;
        let z = cursor.read_var_i32()?;
        let network_block_id = cursor.read_var_u32()?;
        let _flags = cursor.read_var_u32()?;
        let layer = cursor.read_var_u32()?;
        Ok(Self {
            position: BlockPos::new(x, y, z),
            network_block_id,
            layer,
        })
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Request for sub-chunks of one column that were not sent inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChunkRequest {
    pub dimension: Dimension,
    /// `(column x, 0, column z)`.
    pub position: SubChunkPos,
    pub offsets: Vec<SubChunkOffset>,
}

impl SubChunkRequest {
    /// Encodes the packet body.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_var_i32(self.dimension.wire_id())
            .write_var_i32(self.position.x)
            .write_var_i32(self.position.y)
            .write_var_i32(self.position.z)
            .write_u32_le(self.offsets.len() as u32);
        for offset in &self.offsets {
            w.write_i8(offset.x).write_i8(offset.y).write_i8(offset.z);
        }
        w.into_inner()
    }
}

/// Any packet the session handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundPacket {
    LevelChunk(LevelChunk),
    SubChunk(SubChunkResponse),
    UpdateBlock(UpdateBlock),
}
