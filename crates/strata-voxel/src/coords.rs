//! Integer coordinates for blocks, columns and sub-chunks.
//!
//! A block's column is its horizontal position shifted right by 4 (floor
//! division by 16, so negative coordinates land in the right column) and its
//! local position is the low 4 bits of each axis.

use serde::{Deserialize, Serialize};

/// Absolute block position in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Column containing this block.
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(self.x >> 4, self.z >> 4)
    }

    /// Vertical index of the sub-chunk containing this block.
    pub const fn sub_chunk_y(self) -> i32 {
        self.y >> 4
    }

    /// Position inside the owning sub-chunk, each axis in `0..16`.
    pub const fn local(self) -> LocalPos {
        LocalPos {
            x: (self.x & 15) as u8,
            y: (self.y & 15) as u8,
            z: (self.z & 15) as u8,
        }
    }
}

/// Horizontal column coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Sub-chunk coordinate: column plus vertical index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SubChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Column this sub-chunk belongs to.
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(self.x, self.z)
    }

    /// Applies a request/response offset.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Block position inside one sub-chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl LocalPos {
    /// Storage index in XZY order (`y` varies fastest).
    pub fn index(self) -> usize {
        debug_assert!(self.x < 16 && self.y < 16 && self.z < 16);
        (usize::from(self.x) << 8) | (usize::from(self.z) << 4) | usize::from(self.y)
    }
}
