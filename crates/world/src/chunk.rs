//! Dense tile chunks and their per-chunk object registries.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use wildmere_core::{floor_div, Point2, WorldError};

use crate::catalog::TerrainKind;
use crate::object::{ObjectId, WorldObject};

/// Chunk width in tiles.
pub const CHUNK_WIDTH: usize = 16;
/// Chunk height in tiles.
pub const CHUNK_HEIGHT: usize = 16;
/// Tiles per chunk.
pub const CHUNK_AREA: usize = CHUNK_WIDTH * CHUNK_HEIGHT;

/// Nominal number of chunk columns separating chunk-map keys. Like the
/// bucket index, this only spreads keys; coordinates past the nominal
/// boundary are undefined.
pub const MAX_CHUNKS: i64 = 1 << 20;

/// Tile slot: row-major index inside a chunk, fixed at creation.
pub type TileSlot = u16;

/// One addressable terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    slot: TileSlot,
    terrain: TerrainKind,
}

impl Tile {
    /// Immutable slot identity within the owning chunk.
    pub fn slot(&self) -> TileSlot {
        self.slot
    }

    /// Current terrain tag.
    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }
}

/// Chunk coordinate in chunk space (one unit = one chunk).
/// Implements Ord for deterministic iteration in BTreeMap-keyed stores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkPos {
    /// Chunk-space X.
    pub x: i64,
    /// Chunk-space Y.
    pub y: i64,
}

impl ChunkPos {
    /// Construct a chunk position.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Chunk containing a world-space coordinate.
    pub fn containing(x: i64, y: i64) -> Self {
        Self {
            x: floor_div(x, CHUNK_WIDTH as i64),
            y: floor_div(y, CHUNK_HEIGHT as i64),
        }
    }

    /// World-space origin of this chunk's tile (0, 0).
    pub fn world_origin(&self) -> Point2 {
        Point2::new(self.x * CHUNK_WIDTH as i64, self.y * CHUNK_HEIGHT as i64)
    }

    /// Combined chunk-map key.
    pub fn id(&self) -> i64 {
        debug_assert!(
            self.y.abs() < MAX_CHUNKS / 2,
            "chunk y {} beyond the nominal key boundary",
            self.y
        );
        self.x * MAX_CHUNKS + self.y
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed-size tile block plus the objects standing on it.
pub struct Chunk {
    position: ChunkPos,
    tiles: Vec<Tile>,
    objects: BTreeMap<ObjectId, WorldObject>,
    slot_objects: HashMap<TileSlot, Vec<ObjectId>>,
    object_slots: HashMap<ObjectId, TileSlot>,
}

impl Chunk {
    /// Allocate a chunk with every tile set to grass; generation assigns
    /// real terrain tile by tile.
    pub fn new(position: ChunkPos) -> Self {
        let tiles = (0..CHUNK_AREA)
            .map(|slot| Tile {
                slot: slot as TileSlot,
                terrain: TerrainKind::Grass,
            })
            .collect();
        Self {
            position,
            tiles,
            objects: BTreeMap::new(),
            slot_objects: HashMap::new(),
            object_slots: HashMap::new(),
        }
    }

    /// Chunk-space position.
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    fn index(x: usize, y: usize) -> usize {
        debug_assert!(x < CHUNK_WIDTH);
        debug_assert!(y < CHUNK_HEIGHT);
        y * CHUNK_WIDTH + x
    }

    /// Fetch a tile copy by local coordinates.
    pub fn tile(&self, x: usize, y: usize) -> Tile {
        self.tiles[Self::index(x, y)]
    }

    /// Fetch a tile by its slot identity.
    pub fn tile_by_slot(&self, slot: TileSlot) -> Result<Tile, WorldError> {
        self.tiles
            .get(slot as usize)
            .copied()
            .ok_or(WorldError::SlotOutOfRange {
                slot: slot as usize,
                width: CHUNK_WIDTH,
                height: CHUNK_HEIGHT,
            })
    }

    /// Retag a tile's terrain.
    pub fn set_terrain(&mut self, x: usize, y: usize, terrain: TerrainKind) {
        self.tiles[Self::index(x, y)].terrain = terrain;
    }

    /// Register an object on a local tile. The object must not already
    /// be registered here.
    pub fn place_object(&mut self, x: usize, y: usize, object: WorldObject) {
        let slot = Self::index(x, y) as TileSlot;
        assert!(
            !self.object_slots.contains_key(&object.id),
            "object {} already registered in chunk {}",
            object.id,
            self.position
        );
        self.object_slots.insert(object.id, slot);
        self.slot_objects.entry(slot).or_default().push(object.id);
        self.objects.insert(object.id, object);
    }

    /// Remove an object, returning it.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<WorldObject, WorldError> {
        let slot = self
            .object_slots
            .remove(&id)
            .ok_or(WorldError::UnknownObject(id))?;
        if let Some(ids) = self.slot_objects.get_mut(&slot) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.slot_objects.remove(&slot);
            }
        }
        let object = self
            .objects
            .remove(&id)
            .ok_or(WorldError::UnknownObject(id))?;
        Ok(object)
    }

    /// Object ids standing on a local tile, in placement order.
    pub fn objects_at(&self, x: usize, y: usize) -> &[ObjectId] {
        let slot = Self::index(x, y) as TileSlot;
        self.slot_objects
            .get(&slot)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up an object by id.
    pub fn object(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    /// Slot an object stands on.
    pub fn object_slot(&self, id: ObjectId) -> Option<TileSlot> {
        self.object_slots.get(&id).copied()
    }

    /// All objects in ascending id order.
    pub fn objects(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.values()
    }

    /// Number of registered objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Diagnostic: forward and reverse object mappings agree.
    pub fn mappings_consistent(&self) -> bool {
        if self.object_slots.len() != self.objects.len() {
            return false;
        }
        for (id, slot) in &self.object_slots {
            let listed = self
                .slot_objects
                .get(slot)
                .map_or(false, |ids| ids.contains(id));
            if !listed || !self.objects.contains_key(id) {
                return false;
            }
        }
        for (slot, ids) in &self.slot_objects {
            for id in ids {
                if self.object_slots.get(id) != Some(slot) {
                    return false;
                }
            }
        }
        true
    }
}
