//! Client-side world state: the column store, sub-chunk fetching and the
//! session that applies inbound chunk packets.

pub mod fetch;
pub mod packets;
pub mod session;
pub mod store;

pub use fetch::FetchCoordinator;
pub use packets::{
    InboundPacket, LevelChunk, SubChunkEntry, SubChunkOffset, SubChunkRequest, SubChunkResponse,
    SubChunkResult, UpdateBlock,
};
pub use session::{ChunkOutcome, PacketOutcome, WorldSession};
pub use store::{DropReason, UpdateOutcome, WorldStore};
