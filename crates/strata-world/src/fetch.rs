//! Follow-up requests for sub-chunks a column payload did not carry inline.

use strata_voxel::SubChunkPos;

use crate::packets::{LevelChunk, SubChunkOffset, SubChunkRequest};

/// Decides whether a received column needs a sub-chunk request.
///
/// Stateless: offsets that were already answered are not tracked, so a
/// column received twice is requested twice.
#[derive(Clone, Copy, Debug)]
pub struct FetchCoordinator {
    enabled: bool,
}

impl Default for FetchCoordinator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FetchCoordinator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Request for the sub-chunks of `packet` that were not sent inline.
    ///
    /// A non-negative `sub_chunk_count` means everything was inline. Both
    /// negative modes request every vertical index from the dimension's
    /// lowest up to, but excluding, `highest_sub_chunk_count`, capped at the
    /// dimension's top. Returns `None` when that range is empty or requests
    /// are disabled.
    pub fn request_for(&self, packet: &LevelChunk) -> Option<SubChunkRequest> {
        if !self.enabled || packet.sub_chunk_count >= 0 {
            return None;
        }

        let lowest = packet.dimension.min_sub_chunk_index();
        let top = lowest.saturating_add(packet.dimension.max_sub_chunks() as i32);
        let offsets: Vec<SubChunkOffset> = (lowest..packet.highest_sub_chunk_count.min(top))
            .filter_map(|dy| i8::try_from(dy).ok())
            .map(SubChunkOffset::vertical)
            .collect();

        if offsets.is_empty() {
            return None;
        }

        tracing::trace!(
            x = packet.x,
            z = packet.z,
            count = offsets.len(),
            "requesting missing sub-chunks"
        );

        Some(SubChunkRequest {
            dimension: packet.dimension,
            position: SubChunkPos::new(packet.x, 0, packet.z),
            offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::Dimension;

    fn packet(dimension: Dimension, sub_chunk_count: i32, highest: i32) -> LevelChunk {
        LevelChunk {
            x: 7,
            z: -2,
            dimension,
            sub_chunk_count,
            highest_sub_chunk_count: highest,
            data: Vec::new(),
        }
    }

    #[test]
    fn test_negative_count_requests_full_range() {
        let request = FetchCoordinator::default()
            .request_for(&packet(Dimension::Overworld, -5, 20))
            .unwrap();
        assert_eq!(request.dimension, Dimension::Overworld);
        assert_eq!(request.position, SubChunkPos::new(7, 0, -2));
        let dys: Vec<i8> = request.offsets.iter().map(|o| o.y).collect();
        assert_eq!(dys, (-4..20).collect::<Vec<i8>>());
        assert!(request.offsets.iter().all(|o| o.x == 0 && o.z == 0));
    }

    #[test]
    fn test_limited_mode_behaves_like_limitless() {
        let coordinator = FetchCoordinator::default();
        let limited = coordinator.request_for(&packet(Dimension::Overworld, -2, 4));
        let limitless = coordinator.request_for(&packet(Dimension::Overworld, -1, 4));
        assert_eq!(limited, limitless);
        assert_eq!(limited.map(|r| r.offsets.len()), Some(8));
    }

    #[test]
    fn test_uses_packet_dimension() {
        let request = FetchCoordinator::default()
            .request_for(&packet(Dimension::Nether, -1, 8))
            .unwrap();
        assert_eq!(request.dimension, Dimension::Nether);
        assert_eq!(request.offsets.first().map(|o| o.y), Some(0));
        assert_eq!(request.offsets.len(), 8);
    }

    #[test]
    fn test_highest_count_capped_at_dimension_top() {
        let coordinator = FetchCoordinator::default();
        let request = coordinator
            .request_for(&packet(Dimension::Overworld, -2, 65_535))
            .unwrap();
        let dys: Vec<i8> = request.offsets.iter().map(|o| o.y).collect();
        assert_eq!(dys, (-4..20).collect::<Vec<i8>>());

        let nether = coordinator.request_for(&packet(Dimension::Nether, -1, 300)).unwrap();
        assert_eq!(nether.offsets.len(), 8);
        assert_eq!(nether.offsets.last().map(|o| o.y), Some(7));
    }

    #[test]
    fn test_inline_chunk_needs_no_request() {
        let coordinator = FetchCoordinator::default();
        assert!(coordinator.request_for(&packet(Dimension::Overworld, 0, 20)).is_none());
        assert!(coordinator.request_for(&packet(Dimension::Overworld, 12, 20)).is_none());
    }

    #[test]
    fn test_empty_range_emits_nothing() {
        let coordinator = FetchCoordinator::default();
        assert!(coordinator.request_for(&packet(Dimension::Overworld, -1, -4)).is_none());
        assert!(coordinator.request_for(&packet(Dimension::End, -1, 0)).is_none());
    }

    #[test]
    fn test_disabled_coordinator_emits_nothing() {
        let coordinator = FetchCoordinator::new(false);
        assert!(!coordinator.is_enabled());
        assert!(coordinator.request_for(&packet(Dimension::Overworld, -1, 20)).is_none());
    }
}
