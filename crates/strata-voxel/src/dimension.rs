//! Dimension tags and their vertical extents.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// A world dimension as identified on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Wire id 0. Sub-chunks -4..20, blocks y -64..320.
    #[default]
    Overworld,
    /// Wire id 1. Sub-chunks 0..8.
    Nether,
    /// Wire id 2. Sub-chunks 0..16.
    End,
}

impl Dimension {
    /// Parses a wire dimension id.
    pub fn from_wire(id: i32) -> Result<Self, DecodeError> {
        match id {
            0 => Ok(Self::Overworld),
            1 => Ok(Self::Nether),
            2 => Ok(Self::End),
            other => Err(DecodeError::UnknownDimension(other)),
        }
    }

    /// The id this dimension is sent as.
    pub fn wire_id(self) -> i32 {
        match self {
            Self::Overworld => 0,
            Self::Nether => 1,
            Self::End => 2,
        }
    }

    /// Vertical index of the lowest sub-chunk (may be negative).
    pub fn min_sub_chunk_index(self) -> i32 {
        match self {
            Self::Overworld => -4,
            Self::Nether | Self::End => 0,
        }
    }

    /// Number of sub-chunk slots in one column.
    pub fn max_sub_chunks(self) -> usize {
        match self {
            Self::Overworld => 24,
            Self::Nether => 8,
            Self::End => 16,
        }
    }

    /// Lowest block y coordinate (inclusive).
    pub fn min_y(self) -> i32 {
        self.min_sub_chunk_index() * 16
    }

    /// Highest block y coordinate (exclusive).
    pub fn max_y(self) -> i32 {
        self.min_y() + self.max_sub_chunks() as i32 * 16
    }

    /// Slot holding the sub-chunk with vertical index `sub_chunk_y`, if in range.
    pub fn slot_for_sub_chunk_y(self, sub_chunk_y: i32) -> Option<usize> {
        let slot = usize::try_from(sub_chunk_y - self.min_sub_chunk_index()).ok()?;
        (slot < self.max_sub_chunks()).then_some(slot)
    }

    /// Vertical sub-chunk index stored in `slot`.
    pub fn sub_chunk_y_for_slot(self, slot: usize) -> i32 {
        self.min_sub_chunk_index() + slot as i32
    }
}
