//! Central owner for all loaded chunk columns, keyed by [`ChunkPos`].
//!
//! The [`WorldStore`] provides O(1) column lookup, insert, and removal using
//! an [`FxHashMap`](rustc_hash::FxHashMap), and applies incremental updates
//! (single blocks, requested sub-chunks) to the columns it owns.

use rustc_hash::FxHashMap;
use strata_config::SubChunkMerge;
use strata_voxel::{
    BlockPos, BlockResolver, BlockTypeId, ByteCursor, Chunk, ChunkPos, DecodeError, SubChunk,
    SubChunkPos, decode_sub_chunk,
};
use thiserror::Error;

use crate::packets::{SubChunkOffset, SubChunkResult};

/// Why an incremental update was not applied.
///
/// These are expected during normal play (updates racing chunk loads) and
/// never invalidate stored state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DropReason {
    /// The target column has not been received.
    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(ChunkPos),
    /// The network block id is not known to the resolver.
    #[error("unknown network block id {0}")]
    UnknownBlock(u32),
    /// The vertical position lies outside the column's dimension.
    #[error("position is outside the dimension's height")]
    OutOfRange,
    /// Every slot of the column is already filled.
    #[error("no free sub-chunk slot")]
    NoFreeSlot,
    /// The server reported a failure for this sub-chunk.
    #[error("server returned {0:?}")]
    NotSuccess(SubChunkResult),
}

/// Result of applying one incremental update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    Dropped(DropReason),
}

impl UpdateOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Owns all currently-loaded columns and provides fast access by [`ChunkPos`].
///
/// This is the single authority for which columns exist in memory.
#[derive(Debug, Default)]
pub struct WorldStore {
    chunks: FxHashMap<ChunkPos, Chunk>,
}

impl WorldStore {
    /// Creates an empty store with no loaded columns.
    pub fn new() -> Self {
        Self {
            chunks: FxHashMap::default(),
        }
    }

    /// Inserts a column at its own position.
    ///
    /// Any column already stored there is replaced and returned.
    pub fn upsert_chunk(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.pos(), chunk)
    }

    /// Removes and returns the column at `pos`.
    pub fn remove_chunk(&mut self, pos: ChunkPos) -> Option<Chunk> {
        self.chunks.remove(&pos)
    }

    pub fn get_chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn get_chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Number of currently loaded columns.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over all loaded column positions.
    pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    /// Block at an absolute position.
    ///
    /// `None` if the column, the sub-chunk, or the layer has not been
    /// received, or if `pos.y` is outside the dimension.
    pub fn get_block(&self, pos: BlockPos, layer: usize) -> Option<BlockTypeId> {
        self.chunks.get(&pos.chunk_pos())?.get_block(pos, layer)
    }

    /// Applies a single block change.
    ///
    /// An unfilled sub-chunk is created as air first so the write lands.
    /// Heights outside the dimension and layers past
    /// [`MAX_LAYERS`](strata_voxel::MAX_LAYERS) are dropped as out of range.
    pub fn apply_block_update(
        &mut self,
        pos: BlockPos,
        layer: usize,
        network_id: u32,
        resolver: &dyn BlockResolver,
    ) -> UpdateOutcome {
        let chunk_pos = pos.chunk_pos();
        let Some(chunk) = self.chunks.get_mut(&chunk_pos) else {
            return UpdateOutcome::Dropped(DropReason::ChunkNotLoaded(chunk_pos));
        };
        let Some(block) = resolver.resolve(network_id) else {
            return UpdateOutcome::Dropped(DropReason::UnknownBlock(network_id));
        };
        if chunk.set_block(pos, layer, block, resolver.air()) {
            UpdateOutcome::Applied
        } else {
            UpdateOutcome::Dropped(DropReason::OutOfRange)
        }
    }

    /// Decodes one sub-chunk record from a response and merges it into its column.
    ///
    /// Nothing is decoded when the column is absent.
    ///
    /// # Errors
    ///
    /// [`DecodeError::CacheUnsupported`] if the response uses the blob
    /// cache, or any error from decoding the record. The column is left
    /// unchanged on error.
    pub fn apply_sub_chunk_payload(
        &mut self,
        origin: SubChunkPos,
        offset: SubChunkOffset,
        payload: &[u8],
        cache_enabled: bool,
        merge: SubChunkMerge,
        resolver: &dyn BlockResolver,
    ) -> Result<UpdateOutcome, DecodeError> {
        let target = target_of(origin, offset);
        if !self.chunks.contains_key(&target.chunk_pos()) {
            return Ok(UpdateOutcome::Dropped(DropReason::ChunkNotLoaded(
                target.chunk_pos(),
            )));
        }
        if cache_enabled {
            return Err(DecodeError::CacheUnsupported);
        }

        let sub_chunk = decode_sub_chunk(&mut ByteCursor::new(payload), resolver)?;
        Ok(self.merge_sub_chunk(target, sub_chunk, merge))
    }

    /// Stores an already decoded sub-chunk at `target` according to `merge`.
    pub fn merge_sub_chunk(
        &mut self,
        target: SubChunkPos,
        sub_chunk: SubChunk,
        merge: SubChunkMerge,
    ) -> UpdateOutcome {
        let chunk_pos = target.chunk_pos();
        let Some(chunk) = self.chunks.get_mut(&chunk_pos) else {
            return UpdateOutcome::Dropped(DropReason::ChunkNotLoaded(chunk_pos));
        };

        let slot = match merge {
            SubChunkMerge::Append => chunk.first_free_slot().ok_or(DropReason::NoFreeSlot),
            SubChunkMerge::Place => chunk
                .dimension()
                .slot_for_sub_chunk_y(target.y)
                .ok_or(DropReason::OutOfRange),
        };

        match slot {
            Ok(slot) => match chunk.place_sub_chunk(slot, sub_chunk) {
                Ok(_) => UpdateOutcome::Applied,
                Err(_) => UpdateOutcome::Dropped(DropReason::OutOfRange),
            },
            Err(reason) => UpdateOutcome::Dropped(reason),
        }
    }
}

/// Absolute sub-chunk position an entry offset points at.
pub fn target_of(origin: SubChunkPos, offset: SubChunkOffset) -> SubChunkPos {
    origin.offset(i32::from(offset.x), i32::from(offset.y), i32::from(offset.z))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
