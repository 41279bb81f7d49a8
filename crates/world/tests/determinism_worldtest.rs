//! Determinism Validation Worldtest
//!
//! Validates that world generation is completely deterministic:
//! - Same seed produces identical chunks across independent worlds
//! - Chunk visit order never changes any tile
//! - Spawned object sets match exactly
//! - Fingerprints are stable across regeneration rounds

use std::collections::HashMap;
use std::time::Instant;

use wildmere_testkit::{
    MetricsReportBuilder, MetricsSink, TerrainGrid, TestResult, WorldGenMetrics,
};
use wildmere_world::{ChunkPos, WorldConfig, WorldMap, WorldObjectKind, CHUNK_AREA, CHUNK_HEIGHT, CHUNK_WIDTH};

const WORLD_SEED: u64 = 11223344556677;
const CHUNK_RADIUS: i64 = 3; // 7x7 grid = 49 chunks

fn chunk_grid(world: &mut WorldMap, pos: ChunkPos) -> TerrainGrid {
    let chunk = world.generate_or_get_chunk(pos.x, pos.y);
    let mut rows = Vec::with_capacity(CHUNK_HEIGHT);
    for y in 0..CHUNK_HEIGHT {
        let mut row = String::with_capacity(CHUNK_WIDTH);
        for x in 0..CHUNK_WIDTH {
            row.push(chunk.tile(x, y).terrain().symbol());
        }
        rows.push(row);
    }
    TerrainGrid::from_rows(rows)
}

fn chunk_objects(world: &mut WorldMap, pos: ChunkPos) -> Vec<(i64, i64, WorldObjectKind)> {
    let chunk = world.generate_or_get_chunk(pos.x, pos.y);
    chunk.objects().map(|o| (o.x, o.y, o.kind)).collect()
}

#[test]
fn determinism_worldtest() {
    let test_start = Instant::now();
    let mut assertions = 0usize;

    println!("\n=== Determinism Validation Worldtest ===");
    println!("  World seed: {WORLD_SEED}");
    println!(
        "  Chunk radius: {CHUNK_RADIUS} ({0}x{0} grid)",
        CHUNK_RADIUS * 2 + 1
    );

    // Phase 1: sequential generation.
    println!("Phase 1: sequential generation...");
    let mut positions = Vec::new();
    for chunk_y in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for chunk_x in -CHUNK_RADIUS..=CHUNK_RADIUS {
            positions.push(ChunkPos::new(chunk_x, chunk_y));
        }
    }

    let mut sequential = WorldMap::new(WorldConfig::new(WORLD_SEED));
    let mut grids = HashMap::new();
    let mut objects = HashMap::new();
    let mut generation_times = Vec::new();
    let mut objects_spawned = 0usize;

    for &pos in &positions {
        let start = Instant::now();
        let grid = chunk_grid(&mut sequential, pos);
        generation_times.push(start.elapsed().as_micros());
        let spawned = chunk_objects(&mut sequential, pos);
        objects_spawned += spawned.len();
        grids.insert(pos, grid);
        objects.insert(pos, spawned);
    }

    // Phase 2: regeneration in reversed-and-interleaved order in a fresh
    // world; every shared coordinate must come out identical.
    println!("Phase 2: shuffled-order regeneration...");
    // Simple deterministic shuffle keyed by the seed.
    let mut visit_order = positions.clone();
    for i in 0..visit_order.len() {
        let j = ((i as u64).wrapping_mul(WORLD_SEED) % visit_order.len() as u64) as usize;
        visit_order.swap(i, j);
    }

    let mut reordered = WorldMap::new(WorldConfig::new(WORLD_SEED));
    for &pos in &visit_order {
        reordered.generate_or_get_chunk(pos.x, pos.y);
    }

    // Phase 3: tile-level and object-level comparison.
    println!("Phase 3: tile and object comparison...");
    let mut unique_terrains = std::collections::BTreeSet::new();
    for &pos in &positions {
        let expected = &grids[&pos];
        let actual = chunk_grid(&mut reordered, pos);
        assert_eq!(
            expected.fingerprint(),
            actual.fingerprint(),
            "chunk {pos} diverged across visit orders:\n{}\nvs\n{}",
            expected.render(),
            actual.render()
        );
        assertions += 1;

        let expected_objects = &objects[&pos];
        let actual_objects = chunk_objects(&mut reordered, pos);
        assert_eq!(
            expected_objects, &actual_objects,
            "object set diverged in chunk {pos}"
        );
        assertions += 1;

        for row in expected.rows() {
            unique_terrains.extend(row.chars());
        }
    }

    // Phase 4: a third pass over the same worlds must be pure reuse.
    println!("Phase 4: reuse verification...");
    for &pos in &positions {
        let again = chunk_grid(&mut sequential, pos);
        assert_eq!(again.fingerprint(), grids[&pos].fingerprint());
        assertions += 1;
    }
    assert_eq!(sequential.chunk_count(), positions.len());
    assertions += 1;

    let chunks_generated = positions.len();
    let total_us: u128 = generation_times.iter().sum();
    let avg_gen_time_us = total_us as f64 / chunks_generated as f64;
    let max_gen_time_us = generation_times.iter().copied().max().unwrap_or(0);
    let chunks_per_second = if total_us > 0 {
        chunks_generated as f64 / (total_us as f64 / 1_000_000.0)
    } else {
        0.0
    };

    let report = MetricsReportBuilder::new("determinism_worldtest")
        .result(TestResult::Pass)
        .worldgen(WorldGenMetrics {
            chunks_generated,
            tiles_generated: chunks_generated * CHUNK_AREA,
            objects_spawned,
            avg_gen_time_us,
            max_gen_time_us,
            chunks_per_second,
            unique_terrains: unique_terrains.len(),
        })
        .build(test_start.elapsed().as_millis(), assertions);

    let mut sink = MetricsSink::create("target/worldtest-metrics/determinism_metrics.json")
        .expect("metrics sink");
    sink.write(&report).expect("metrics written");

    println!(
        "  {} chunks, {:.2}ms avg, {} objects, done in {:.2}s",
        chunks_generated,
        avg_gen_time_us / 1000.0,
        objects_spawned,
        test_start.elapsed().as_secs_f64()
    );
}

#[test]
fn fresh_worlds_reproduce_each_other() {
    let mut a = WorldMap::new(WorldConfig::new(WORLD_SEED));
    let mut b = WorldMap::new(WorldConfig::new(WORLD_SEED));

    for &(x, y) in &[(0i64, 0i64), (-100, 250), (513, -512)] {
        assert_eq!(
            a.get_tile_at_world_space(x, y),
            b.get_tile_at_world_space(x, y),
            "tile mismatch at ({x}, {y})"
        );
        let da = a.get_biome_data_for_tile(x, y);
        let db = b.get_biome_data_for_tile(x, y);
        assert_eq!(da, db, "weighted biome data mismatch at ({x}, {y})");
    }
}
