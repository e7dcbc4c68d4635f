//! Packet-handling boundary between the transport and the world store.
//!
//! [`WorldSession`] receives the three chunk-related inbound packets, runs
//! them through the decoder, store and fetch coordinator, and queues the
//! outbound [`SubChunkRequest`]s the host should send. Every non-fatal
//! outcome is returned explicitly; decode errors are returned as `Err` and
//! never leave a partially written column behind.

use strata_config::{SubChunkMerge, WorldConfig};
use strata_voxel::{
    BlockResolver, ChunkDecoder, ChunkFormat, ChunkPos, DecodeError, SubChunk, decoder_for,
};

use crate::fetch::FetchCoordinator;
use crate::packets::{
    InboundPacket, LevelChunk, SubChunkRequest, SubChunkResponse, SubChunkResult, UpdateBlock,
};
use crate::store::{DropReason, UpdateOutcome, WorldStore, target_of};

/// Summary of one stored column payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub pos: ChunkPos,
    /// Sub-chunks decoded inline.
    pub sub_chunks: usize,
    pub biome_layers: usize,
    /// Unread bytes after the biome section.
    pub trailing_bytes: usize,
    /// Whether a previously stored column was replaced.
    pub replaced: bool,
    /// Follow-up request queued for this column, if any.
    pub request: Option<SubChunkRequest>,
}

/// What handling one inbound packet produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PacketOutcome {
    Chunk(ChunkOutcome),
    SubChunks(Vec<UpdateOutcome>),
    Block(UpdateOutcome),
}

/// Client-side world state driven by inbound chunk packets.
pub struct WorldSession<R> {
    store: WorldStore,
    fetch: FetchCoordinator,
    merge: SubChunkMerge,
    decoder: &'static dyn ChunkDecoder,
    resolver: R,
    outbound: Vec<SubChunkRequest>,
}

impl<R: BlockResolver> WorldSession<R> {
    /// Creates a session with an empty store.
    pub fn new(resolver: R, config: &WorldConfig) -> Self {
        Self {
            store: WorldStore::new(),
            fetch: FetchCoordinator::new(config.request_missing_sub_chunks),
            merge: config.sub_chunk_merge,
            decoder: decoder_for(ChunkFormat::Network),
            resolver,
            outbound: Vec::new(),
        }
    }

    pub fn store(&self) -> &WorldStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorldStore {
        &mut self.store
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn merge_policy(&self) -> SubChunkMerge {
        self.merge
    }

    /// Dispatches any inbound packet to its handler.
    pub fn handle(&mut self, packet: &InboundPacket) -> Result<PacketOutcome, DecodeError> {
        match packet {
            InboundPacket::LevelChunk(p) => self.handle_level_chunk(p).map(PacketOutcome::Chunk),
            InboundPacket::SubChunk(p) => self.handle_sub_chunk(p).map(PacketOutcome::SubChunks),
            InboundPacket::UpdateBlock(p) => Ok(PacketOutcome::Block(self.handle_update_block(p))),
        }
    }

    /// Decodes a column payload and stores it, replacing any previous column.
    ///
    /// On error the store is not touched and no request is queued.
    pub fn handle_level_chunk(&mut self, packet: &LevelChunk) -> Result<ChunkOutcome, DecodeError> {
        let pos = packet.pos();
        let decoded = self
            .decoder
            .decode(pos, packet.dimension, &packet.data, &self.resolver)
            .inspect_err(|err| {
                tracing::warn!(x = pos.x, z = pos.z, %err, "discarding malformed chunk payload");
            })?;

        let sub_chunks = decoded.chunk.populated_count();
        let biome_layers = decoded.chunk.biomes().len();
        let replaced = self.store.upsert_chunk(decoded.chunk).is_some();

        let request = self.fetch.request_for(packet);
        if let Some(request) = &request {
            self.outbound.push(request.clone());
        }

        Ok(ChunkOutcome {
            pos,
            sub_chunks,
            biome_layers,
            trailing_bytes: decoded.trailing_bytes,
            replaced,
            request,
        })
    }

    /// Merges every entry of a sub-chunk response into its column.
    ///
    /// Entries are applied in order. A malformed entry aborts the rest of
    /// the response; entries before it stay applied.
    pub fn handle_sub_chunk(
        &mut self,
        packet: &SubChunkResponse,
    ) -> Result<Vec<UpdateOutcome>, DecodeError> {
        let mut outcomes = Vec::with_capacity(packet.entries.len());

        for entry in &packet.entries {
            let target = target_of(packet.origin, entry.offset);
            let outcome = match entry.result {
                SubChunkResult::Success => self
                    .store
                    .apply_sub_chunk_payload(
                        packet.origin,
                        entry.offset,
                        &entry.payload,
                        packet.cache_enabled,
                        self.merge,
                        &self.resolver,
                    )
                    .inspect_err(|err| {
                        tracing::warn!(?target, %err, "discarding malformed sub-chunk");
                    })?,
                SubChunkResult::SuccessAllAir => self.store.merge_sub_chunk(
                    target,
                    SubChunk::new_filled(self.resolver.air()),
                    self.merge,
                ),
                other => UpdateOutcome::Dropped(DropReason::NotSuccess(other)),
            };

            if let UpdateOutcome::Dropped(reason) = outcome {
                tracing::debug!(?target, %reason, "sub-chunk dropped");
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Applies a single block change.
    pub fn handle_update_block(&mut self, packet: &UpdateBlock) -> UpdateOutcome {
        let outcome = self.store.apply_block_update(
            packet.position,
            packet.layer as usize,
            packet.network_block_id,
            &self.resolver,
        );
        if let UpdateOutcome::Dropped(reason) = outcome {
            tracing::debug!(position = ?packet.position, %reason, "block update dropped");
        }
        outcome
    }

    /// Takes every queued outbound request, oldest first.
    pub fn drain_requests(&mut self) -> Vec<SubChunkRequest> {
        std::mem::take(&mut self.outbound)
    }
}
