//! World façade: chunk generation orchestration and the tile/object
//! query surface consumed by the presentation layer.
//!
//! The `WorldMap` context object owns the chunk map, the region cache,
//! and the catalog; every generation call threads through it, so there
//! is no ambient state and the generate-once contract is structural.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use wildmere_core::{lattice_seed, seeded_rng, AttributeBounds, EnvSample, WorldError};

use crate::catalog::{BiomeCatalog, BiomeId, TerrainKind};
use crate::chunk::{Chunk, ChunkPos, Tile, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::object::{ObjectId, WorldObject, WorldObjectKind};
use crate::region_cache::RegionCache;

/// Smallest per-chunk edge-blend threshold in world units.
const BLEND_EDGE_MIN: f64 = 2.0;

/// Largest per-chunk edge-blend threshold in world units.
const BLEND_EDGE_MAX: f64 = 6.0;

/// Salt separating the per-chunk stream from the per-region stream when
/// a chunk origin coincides with an influence-rect origin.
const CHUNK_STREAM_SALT: u64 = 0x6b6e_7568_6324;

/// Externally supplied world configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// The world seed; the only externally supplied generation input.
    pub seed: u64,
    /// Global environmental attribute bounds.
    pub bounds: AttributeBounds,
}

impl WorldConfig {
    /// Config with the default attribute bounds.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            bounds: AttributeBounds::default(),
        }
    }
}

/// The deterministic, lazily generated tile world.
pub struct WorldMap {
    config: WorldConfig,
    catalog: BiomeCatalog,
    regions: RegionCache,
    chunks: BTreeMap<i64, Chunk>,
    object_index: HashMap<ObjectId, ChunkPos>,
    next_object_id: ObjectId,
}

impl WorldMap {
    /// Build a world from its configuration.
    pub fn new(config: WorldConfig) -> Self {
        Self {
            catalog: BiomeCatalog::standard(),
            regions: RegionCache::new(config.seed, config.bounds),
            chunks: BTreeMap::new(),
            object_index: HashMap::new(),
            next_object_id: 1,
            config,
        }
    }

    /// The world seed.
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Global attribute bounds.
    pub fn bounds(&self) -> &AttributeBounds {
        &self.config.bounds
    }

    /// The biome catalog.
    pub fn catalog(&self) -> &BiomeCatalog {
        &self.catalog
    }

    /// Number of resident chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Positions of resident chunks in deterministic order.
    pub fn iter_chunk_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.values().map(|chunk| chunk.position())
    }

    /// Return the chunk at a chunk-space position, generating it on
    /// first touch and reusing it forever after.
    pub fn generate_or_get_chunk(&mut self, chunk_x: i64, chunk_y: i64) -> &Chunk {
        let pos = ChunkPos::new(chunk_x, chunk_y);
        let id = pos.id();
        if !self.chunks.contains_key(&id) {
            let chunk = self.generate_chunk(pos);
            self.chunks.insert(id, chunk);
        }
        self.chunks.get(&id).expect("chunk present")
    }

    /// Chunk containing a world-space coordinate.
    pub fn get_chunk_at_world_space(&mut self, x: i64, y: i64) -> &Chunk {
        let pos = ChunkPos::containing(x, y);
        self.generate_or_get_chunk(pos.x, pos.y)
    }

    /// Tile at a world-space coordinate.
    pub fn get_tile_at_world_space(&mut self, x: i64, y: i64) -> Tile {
        let pos = ChunkPos::containing(x, y);
        let origin = pos.world_origin();
        let chunk = self.generate_or_get_chunk(pos.x, pos.y);
        chunk.tile((x - origin.x) as usize, (y - origin.y) as usize)
    }

    /// Smoothed environmental sample at a tile, blended across nearby
    /// seed samples exactly as generation saw it.
    pub fn get_biome_data_for_tile(&mut self, x: i64, y: i64) -> EnvSample {
        let origin = ChunkPos::containing(x, y).world_origin();
        let region = self.regions.stitched_for(origin.x, origin.y);
        region.weighted_sample(x as f64, y as f64, &self.config.bounds)
    }

    /// Raw attributes of the nearest seed sample, unsmoothed. Debug
    /// display uses this to show the underlying site.
    pub fn get_general_biome_data(&mut self, x: i64, y: i64) -> EnvSample {
        let origin = ChunkPos::containing(x, y).world_origin();
        let region = self.regions.stitched_for(origin.x, origin.y);
        let (_, _, sample) = region.nearest_sample(x as f64, y as f64);
        *sample
    }

    /// Place a new object at a world position, generating the covering
    /// chunk if needed. Returns the allocated id.
    pub fn add_object(&mut self, x: i64, y: i64, kind: WorldObjectKind) -> ObjectId {
        let id = self.alloc_object_id();
        self.place_into_chunk(WorldObject::new(id, x, y, kind));
        id
    }

    /// Remove an object from the world, returning it.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<WorldObject, WorldError> {
        let pos = self
            .object_index
            .remove(&id)
            .ok_or(WorldError::UnknownObject(id))?;
        let chunk = self
            .chunks
            .get_mut(&pos.id())
            .expect("object index points at a resident chunk");
        chunk.remove_object(id)
    }

    /// Teleport an object to an absolute world position, migrating it
    /// between chunks when necessary.
    pub fn set_object_position(&mut self, id: ObjectId, x: i64, y: i64) -> Result<(), WorldError> {
        let pos = *self
            .object_index
            .get(&id)
            .ok_or(WorldError::UnknownObject(id))?;
        let chunk = self
            .chunks
            .get_mut(&pos.id())
            .expect("object index points at a resident chunk");
        let mut object = chunk.remove_object(id)?;
        self.object_index.remove(&id);
        object.x = x;
        object.y = y;
        self.place_into_chunk(object);
        Ok(())
    }

    /// Displace an object relative to its current position.
    pub fn move_object(&mut self, id: ObjectId, dx: i64, dy: i64) -> Result<(), WorldError> {
        let pos = *self
            .object_index
            .get(&id)
            .ok_or(WorldError::UnknownObject(id))?;
        let object = self
            .chunks
            .get(&pos.id())
            .and_then(|chunk| chunk.object(id))
            .ok_or(WorldError::UnknownObject(id))?;
        let (x, y) = (object.x + dx, object.y + dy);
        self.set_object_position(id, x, y)
    }

    /// Look up an object anywhere in the world.
    pub fn object(&self, id: ObjectId) -> Option<&WorldObject> {
        let pos = self.object_index.get(&id)?;
        self.chunks.get(&pos.id())?.object(id)
    }

    /// Objects standing on the tile at a world coordinate.
    pub fn objects_at_world_space(&mut self, x: i64, y: i64) -> Vec<&WorldObject> {
        let pos = ChunkPos::containing(x, y);
        self.generate_or_get_chunk(pos.x, pos.y);
        let origin = pos.world_origin();
        let chunk = self.chunks.get(&pos.id()).expect("chunk generated above");
        chunk
            .objects_at((x - origin.x) as usize, (y - origin.y) as usize)
            .iter()
            .filter_map(|&id| chunk.object(id))
            .collect()
    }

    fn alloc_object_id(&mut self) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    fn place_into_chunk(&mut self, object: WorldObject) {
        let pos = ChunkPos::containing(object.x, object.y);
        self.generate_or_get_chunk(pos.x, pos.y);
        let origin = pos.world_origin();
        let id = object.id;
        let chunk = self
            .chunks
            .get_mut(&pos.id())
            .expect("chunk generated above");
        chunk.place_object(
            (object.x - origin.x) as usize,
            (object.y - origin.y) as usize,
            object,
        );
        self.object_index.insert(id, pos);
    }

    /// Fill one chunk from the stitched region covering it.
    #[instrument(skip(self), fields(chunk = %pos, seed = self.config.seed))]
    fn generate_chunk(&mut self, pos: ChunkPos) -> Chunk {
        debug!("generating chunk");
        let origin = pos.world_origin();
        let region = self.regions.stitched_for(origin.x, origin.y);
        let mut rng = seeded_rng(lattice_seed(
            self.config.seed ^ CHUNK_STREAM_SALT,
            origin.x,
            origin.y,
        ));
        let blend_threshold = rng.gen_range(BLEND_EDGE_MIN..BLEND_EDGE_MAX);

        let mut chunk = Chunk::new(pos);
        let mut spawned: Vec<(usize, usize, WorldObjectKind)> = Vec::new();

        for local_y in 0..CHUNK_HEIGHT {
            for local_x in 0..CHUNK_WIDTH {
                let world_x = (origin.x + local_x as i64) as f64;
                let world_y = (origin.y + local_y as i64) as f64;

                let sample = region.weighted_sample(world_x, world_y, &self.config.bounds);
                let home = BiomeId::classify(&sample, &self.config.bounds);

                // Near a cell edge the tile may classify under the
                // catalog of the Voronoi site on its own side instead of
                // the attribute-derived family, gated by that catalog's
                // blend whitelist.
                let mut blended: Option<(TerrainKind, BiomeId)> = None;
                if let (Some(site), Some(voronoi)) =
                    (region.nearest_site(world_x, world_y), region.voronoi())
                {
                    if let Some(near) = region.nearest_edge_of_site(site, world_x, world_y) {
                        if near.distance < blend_threshold {
                            let swap_chance = 1.0 - near.distance / blend_threshold;
                            let roll: f64 = rng.gen();
                            if roll < swap_chance {
                                let edge = &voronoi.edges()[near.edge];
                                let (_, side_sample) = region.samples()[edge.site_on(near.side)];
                                let side_family =
                                    BiomeId::classify(&side_sample, &self.config.bounds);
                                if side_family != home {
                                    let entry = self.catalog.entry(side_family);
                                    if let Some(terrain) =
                                        entry.blend_classify(&sample, &self.config.bounds)
                                    {
                                        blended = Some((terrain, side_family));
                                    }
                                }
                            }
                        }
                    }
                }

                let (terrain, family) = match blended {
                    Some(result) => result,
                    None => {
                        let entry = self.catalog.entry(home);
                        // Unregistered families classify nothing; bare
                        // dirt is the visible, non-crashing answer.
                        let terrain = entry
                            .classify(&sample, &self.config.bounds)
                            .unwrap_or(TerrainKind::Dirt);
                        (terrain, home)
                    }
                };

                chunk.set_terrain(local_x, local_y, terrain);

                for kind in self.catalog.entry(family).roll_spawns(terrain, &mut rng) {
                    spawned.push((local_x, local_y, kind));
                }
            }
        }

        for (local_x, local_y, kind) in spawned {
            let id = self.alloc_object_id();
            let object = WorldObject::new(
                id,
                origin.x + local_x as i64,
                origin.y + local_y as i64,
                kind,
            );
            chunk.place_object(local_x, local_y, object);
            self.object_index.insert(id, pos);
        }

        debug!(objects = chunk.object_count(), "chunk generated");
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain_grid(world: &mut WorldMap, chunk_x: i64, chunk_y: i64) -> Vec<TerrainKind> {
        let chunk = world.generate_or_get_chunk(chunk_x, chunk_y);
        let mut grid = Vec::with_capacity(CHUNK_WIDTH * CHUNK_HEIGHT);
        for y in 0..CHUNK_HEIGHT {
            for x in 0..CHUNK_WIDTH {
                grid.push(chunk.tile(x, y).terrain());
            }
        }
        grid
    }

    fn object_set(world: &mut WorldMap, chunk_x: i64, chunk_y: i64) -> Vec<(i64, i64, WorldObjectKind)> {
        let chunk = world.generate_or_get_chunk(chunk_x, chunk_y);
        chunk.objects().map(|o| (o.x, o.y, o.kind)).collect()
    }

    #[test]
    fn same_seed_produces_identical_chunks() {
        let mut a = WorldMap::new(WorldConfig::new(11));
        let mut b = WorldMap::new(WorldConfig::new(11));
        for (cx, cy) in [(0, 0), (-1, -1), (3, -2)] {
            assert_eq!(terrain_grid(&mut a, cx, cy), terrain_grid(&mut b, cx, cy));
            assert_eq!(object_set(&mut a, cx, cy), object_set(&mut b, cx, cy));
        }
    }

    #[test]
    fn different_seeds_differ_somewhere() {
        let mut a = WorldMap::new(WorldConfig::new(1));
        let mut b = WorldMap::new(WorldConfig::new(2));
        let mut any_different = false;
        for cx in -2..=2 {
            for cy in -2..=2 {
                if terrain_grid(&mut a, cx, cy) != terrain_grid(&mut b, cx, cy) {
                    any_different = true;
                }
            }
        }
        assert!(any_different, "different seeds should diverge");
    }

    #[test]
    fn chunks_generate_once_and_are_reused() {
        let mut world = WorldMap::new(WorldConfig::new(5));
        world.generate_or_get_chunk(0, 0);
        let first: Vec<_> = object_set(&mut world, 0, 0);
        world.get_tile_at_world_space(3, 3);
        world.get_chunk_at_world_space(15, 15);
        assert_eq!(world.chunk_count(), 1);
        assert_eq!(object_set(&mut world, 0, 0), first);
    }

    #[test]
    fn world_space_lookup_matches_chunk_local_tiles() {
        let mut world = WorldMap::new(WorldConfig::new(7));
        let tile = world.get_tile_at_world_space(-1, -1);
        let chunk = world.generate_or_get_chunk(-1, -1);
        assert_eq!(tile, chunk.tile(CHUNK_WIDTH - 1, CHUNK_HEIGHT - 1));
        assert_eq!(world.chunk_count(), 1);
    }

    #[test]
    fn generated_objects_are_indexed_world_wide() {
        let mut world = WorldMap::new(WorldConfig::new(40));
        let mut ids = Vec::new();
        for cx in -2..2 {
            for cy in -2..2 {
                let chunk = world.generate_or_get_chunk(cx, cy);
                assert!(chunk.mappings_consistent());
                ids.extend(chunk.objects().map(|o| o.id));
            }
        }
        assert!(!ids.is_empty(), "a 4x4 chunk area should spawn something");
        for id in ids {
            assert!(world.object(id).is_some());
        }
    }

    #[test]
    fn add_move_remove_object_round_trip() {
        let mut world = WorldMap::new(WorldConfig::new(13));
        let id = world.add_object(5, 5, WorldObjectKind::Boulder);
        assert_eq!(world.object(id).unwrap().kind, WorldObjectKind::Boulder);

        // Move across a chunk border.
        world.move_object(id, 20, 0).unwrap();
        let object = world.object(id).unwrap();
        assert_eq!((object.x, object.y), (25, 5));
        let old_chunk = world.generate_or_get_chunk(0, 0);
        assert!(old_chunk.object(id).is_none());
        assert!(old_chunk.mappings_consistent());
        let new_chunk = world.generate_or_get_chunk(1, 0);
        assert!(new_chunk.object(id).is_some());
        assert!(new_chunk.mappings_consistent());

        let removed = world.remove_object(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(world.object(id).is_none());
        assert_eq!(
            world.remove_object(id).unwrap_err(),
            WorldError::UnknownObject(id)
        );
    }

    #[test]
    fn set_object_position_within_one_chunk_reslots() {
        let mut world = WorldMap::new(WorldConfig::new(13));
        let id = world.add_object(2, 2, WorldObjectKind::Shrub);
        world.set_object_position(id, 9, 9).unwrap();
        let chunk = world.generate_or_get_chunk(0, 0);
        assert_eq!(chunk.objects_at(9, 9).first(), Some(&id));
        assert!(chunk.objects_at(2, 2).is_empty());
        assert!(chunk.mappings_consistent());
    }

    #[test]
    fn biome_data_queries_stay_in_bounds() {
        let mut world = WorldMap::new(WorldConfig::new(21));
        let bounds = *world.bounds();
        for (x, y) in [(0, 0), (-7, 40), (130, -129)] {
            let smoothed = world.get_biome_data_for_tile(x, y);
            assert!(smoothed.is_within(&bounds));
            let raw = world.get_general_biome_data(x, y);
            assert!(raw.is_within(&bounds));
        }
    }

    #[test]
    fn general_biome_data_is_a_raw_sample() {
        let mut world = WorldMap::new(WorldConfig::new(33));
        let raw = world.get_general_biome_data(8, 8);
        let origin = ChunkPos::containing(8, 8).world_origin();
        let region = world.regions.stitched_for(origin.x, origin.y);
        assert!(
            region.samples().iter().any(|(_, s)| *s == raw),
            "unsmoothed query must return one of the region's samples"
        );
    }

    #[test]
    fn objects_at_world_space_sees_spawned_objects() {
        let mut world = WorldMap::new(WorldConfig::new(40));
        let chunk = world.generate_or_get_chunk(0, 0);
        let Some(object) = chunk.objects().next().map(|o| (o.id, o.x, o.y)) else {
            // Nothing spawned in this chunk under this seed; covered by
            // the wider determinism worldtests.
            return;
        };
        let (id, x, y) = object;
        let at = world.objects_at_world_space(x, y);
        assert!(at.iter().any(|o| o.id == id));
    }
}
