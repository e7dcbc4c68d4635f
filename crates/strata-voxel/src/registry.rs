//! Block type registry: maps network block ids to compact [`BlockTypeId`] handles.
//!
//! Palettes decoded from the wire store handles, not raw network ids, so every
//! id is resolved once at decode time. Air is always handle 0.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact handle to a registered block type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockTypeId(pub u32);

impl BlockTypeId {
    /// Handle of the air block in every registry.
    pub const AIR: Self = Self(0);
}

/// Descriptor for one block state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTypeDef {
    /// Namespaced name (e.g. "minecraft:stone").
    pub name: String,
    /// Id the server uses for this state on the wire.
    pub network_id: u32,
    /// Whether entities collide with this block.
    pub solid: bool,
}

/// Errors that can occur during block type registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate block type name: {0}")]
    DuplicateName(String),
    /// Another type already claims this network id.
    #[error("duplicate network block id: {0}")]
    DuplicateNetworkId(u32),
    /// Every handle value has been used.
    #[error("block type registry is full")]
    RegistryFull,
}

/// Resolves network block ids to handles.
///
/// This is the seam the decoders use; any lookup table can implement it.
pub trait BlockResolver {
    /// Returns the handle for `network_id`, or `None` if it is unknown.
    fn resolve(&self, network_id: u32) -> Option<BlockTypeId>;

    /// Handle used to fill sub-chunks that are created on demand.
    fn air(&self) -> BlockTypeId {
        BlockTypeId::AIR
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Dense table of block types with O(1) lookup by handle, name and network id.
pub struct BlockRegistry {
    /// Dense array where `index == BlockTypeId.0`.
    types: Vec<BlockTypeDef>,
    name_to_id: FxHashMap<String, BlockTypeId>,
    network_to_id: FxHashMap<u32, BlockTypeId>,
}

impl BlockRegistry {
    /// Creates a registry with air registered as handle 0 under `air_network_id`.
    pub fn new(air_network_id: u32) -> Self {
        let air = BlockTypeDef {
            name: "minecraft:air".to_string(),
            network_id: air_network_id,
            solid: false,
        };

        let mut name_to_id = FxHashMap::default();
        name_to_id.insert(air.name.clone(), BlockTypeId::AIR);
        let mut network_to_id = FxHashMap::default();
        network_to_id.insert(air_network_id, BlockTypeId::AIR);

        Self {
            types: vec![air],
            name_to_id,
            network_to_id,
        }
    }

    /// Registers a block type and returns its handle.
    ///
    /// Handles are assigned sequentially starting from 1.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] or
    /// [`RegistryError::DuplicateNetworkId`] if either key is taken, and
    /// [`RegistryError::RegistryFull`] once `u32::MAX` handles exist.
    pub fn register(&mut self, def: BlockTypeDef) -> Result<BlockTypeId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.network_to_id.contains_key(&def.network_id) {
            return Err(RegistryError::DuplicateNetworkId(def.network_id));
        }
        let id = u32::try_from(self.types.len())
            .map(BlockTypeId)
            .map_err(|_| RegistryError::RegistryFull)?;

        self.name_to_id.insert(def.name.clone(), id);
        self.network_to_id.insert(def.network_id, id);
        self.types.push(def);
        Ok(id)
    }

    /// Returns the descriptor for `id`, or `None` if no such handle exists.
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockTypeDef> {
        self.types.get(id.0 as usize)
    }

    /// Returns the handle for a named block type.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Total number of registered types, air included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }
}

impl BlockResolver for BlockRegistry {
    fn resolve(&self, network_id: u32) -> Option<BlockTypeId> {
        self.network_to_id.get(&network_id).copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
