//! Biome catalog: terrain families with ordered classification rules,
//! probabilistic decoration spawns, and cross-biome blend policy.
//!
//! The catalog is built once at world construction from an explicit
//! registration table. Classification rules run in ascending priority and
//! the first rule producing a terrain wins; spawn rules run independently
//! so several decorations can stack on one tile.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use wildmere_core::{AttributeBounds, EnvSample};

use crate::object::{TreeSpecies, WorldObjectKind};

/// Discrete terrain assigned to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Short turf.
    Grass,
    /// Tall fertile growth.
    Meadow,
    /// Open water.
    Water,
    /// Loose sand.
    Sand,
    /// Bare earth.
    Dirt,
    /// Exposed rock.
    Stone,
    /// Packed snow.
    Snow,
    /// Frozen water.
    Ice,
    /// Waterlogged ground.
    Marsh,
    /// Dry brushland.
    Scrub,
}

impl TerrainKind {
    /// Single-character debug symbol used by snapshots and worldtests.
    pub fn symbol(&self) -> char {
        match self {
            TerrainKind::Grass => '.',
            TerrainKind::Meadow => '"',
            TerrainKind::Water => '~',
            TerrainKind::Sand => ',',
            TerrainKind::Dirt => '_',
            TerrainKind::Stone => '^',
            TerrainKind::Snow => '*',
            TerrainKind::Ice => '#',
            TerrainKind::Marsh => '%',
            TerrainKind::Scrub => ';',
        }
    }

    /// Whether the tile is open water.
    pub fn is_water(&self) -> bool {
        matches!(self, TerrainKind::Water)
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerrainKind::Grass => "grass",
            TerrainKind::Meadow => "meadow",
            TerrainKind::Water => "water",
            TerrainKind::Sand => "sand",
            TerrainKind::Dirt => "dirt",
            TerrainKind::Stone => "stone",
            TerrainKind::Snow => "snow",
            TerrainKind::Ice => "ice",
            TerrainKind::Marsh => "marsh",
            TerrainKind::Scrub => "scrub",
        };
        f.write_str(name)
    }
}

/// Terrain-family tag: the named environment types of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BiomeId {
    /// Open temperate grassland.
    Plains,
    /// Dense temperate woodland.
    Forest,
    /// Hot, dry sand country.
    Desert,
    /// Cold flats.
    Tundra,
    /// Waterlogged lowland.
    Swamp,
    /// High rocky ground.
    Highlands,
}

impl BiomeId {
    /// All family tags, for iteration.
    pub fn all() -> &'static [BiomeId] {
        &[
            BiomeId::Plains,
            BiomeId::Forest,
            BiomeId::Desert,
            BiomeId::Tundra,
            BiomeId::Swamp,
            BiomeId::Highlands,
        ]
    }

    /// Derive the family a sample belongs to from its attributes.
    ///
    /// Thresholds operate on bound-normalized values so the rules hold
    /// under any configured global ranges.
    pub fn classify(sample: &EnvSample, bounds: &AttributeBounds) -> BiomeId {
        let norm = |value: f64, range: wildmere_core::ScalarRange| {
            if range.span() == 0.0 {
                0.0
            } else {
                ((value - range.min) / range.span()).clamp(0.0, 1.0)
            }
        };
        let moisture = norm(sample.moisture, bounds.moisture);
        let temperature = norm(sample.temperature, bounds.temperature);
        let height = norm(sample.height, bounds.height);
        let fertility = norm(sample.fertility, bounds.fertility);

        if height > 0.78 {
            BiomeId::Highlands
        } else if temperature < 0.22 {
            BiomeId::Tundra
        } else if moisture > 0.82 {
            BiomeId::Swamp
        } else if moisture < 0.25 && temperature > 0.65 {
            BiomeId::Desert
        } else if fertility > 0.55 && moisture > 0.45 {
            BiomeId::Forest
        } else {
            BiomeId::Plains
        }
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BiomeId::Plains => "plains",
            BiomeId::Forest => "forest",
            BiomeId::Desert => "desert",
            BiomeId::Tundra => "tundra",
            BiomeId::Swamp => "swamp",
            BiomeId::Highlands => "highlands",
        };
        f.write_str(name)
    }
}

/// Moisture below this classifies Plains ground as standing water.
pub const PLAINS_WATER_MOISTURE: f64 = 20.0;

/// Classification rule body: attributes in, terrain (or nothing) out.
pub type ClassifierFn = fn(&EnvSample, &AttributeBounds) -> Option<TerrainKind>;

/// One prioritized classification rule.
pub struct ClassifierRule {
    /// Rules run in ascending priority.
    pub priority: u8,
    /// Rule body.
    pub classify: ClassifierFn,
}

/// One prioritized decoration-spawn rule.
///
/// Every rule draws from the stream on every tile (whether or not it
/// fires), keeping downstream draws independent of terrain outcomes.
pub struct SpawnRule {
    /// Rules run in ascending priority.
    pub priority: u8,
    /// Per-tile spawn probability in [0, 1].
    pub chance: f64,
    /// Object kind emitted when the rule fires.
    pub kind: WorldObjectKind,
    /// Terrain the rule refuses to decorate.
    pub excluded_terrain: &'static [TerrainKind],
}

/// Which foreign terrain may appear in this family via edge blending.
pub enum BlendPolicy {
    /// Any terrain may blend in.
    AllowAny,
    /// Only the listed terrain may blend in.
    Whitelist(&'static [TerrainKind]),
}

impl BlendPolicy {
    /// Whether the policy permits the given terrain.
    pub fn permits(&self, terrain: TerrainKind) -> bool {
        match self {
            BlendPolicy::AllowAny => true,
            BlendPolicy::Whitelist(list) => list.contains(&terrain),
        }
    }
}

/// Catalog entry for one terrain family.
pub struct CatalogEntry {
    family: Option<BiomeId>,
    default_terrain: Option<TerrainKind>,
    classifiers: Vec<ClassifierRule>,
    spawns: Vec<SpawnRule>,
    blend: BlendPolicy,
}

impl CatalogEntry {
    /// Build an entry; rules are sorted by ascending priority.
    pub fn new(
        family: Option<BiomeId>,
        default_terrain: Option<TerrainKind>,
        mut classifiers: Vec<ClassifierRule>,
        mut spawns: Vec<SpawnRule>,
        blend: BlendPolicy,
    ) -> Self {
        classifiers.sort_by_key(|rule| rule.priority);
        spawns.sort_by_key(|rule| rule.priority);
        Self {
            family,
            default_terrain,
            classifiers,
            spawns,
            blend,
        }
    }

    /// Family this entry was registered under, if any.
    pub fn family(&self) -> Option<BiomeId> {
        self.family
    }

    /// Run classification: first rule returning terrain wins, else the
    /// family default. `None` means the entry assigns no terrain and the
    /// caller must handle it.
    pub fn classify(&self, sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
        for rule in &self.classifiers {
            if let Some(terrain) = (rule.classify)(sample, bounds) {
                return Some(terrain);
            }
        }
        self.default_terrain
    }

    /// Run every spawn rule independently for one tile.
    pub fn roll_spawns<R: Rng>(&self, terrain: TerrainKind, rng: &mut R) -> Vec<WorldObjectKind> {
        let mut spawned = Vec::new();
        for rule in &self.spawns {
            let roll: f64 = rng.gen();
            if roll < rule.chance && !rule.excluded_terrain.contains(&terrain) {
                spawned.push(rule.kind);
            }
        }
        spawned
    }

    /// Whether edge blending may paint this terrain under this family.
    pub fn blend_permits(&self, terrain: TerrainKind) -> bool {
        self.blend.permits(terrain)
    }

    /// Classification as used by the cross-biome swap path: the result
    /// stands only when this family's blend policy permits it.
    pub fn blend_classify(
        &self,
        sample: &EnvSample,
        bounds: &AttributeBounds,
    ) -> Option<TerrainKind> {
        self.classify(sample, bounds)
            .filter(|&terrain| self.blend.permits(terrain))
    }
}

const NO_WATER: &[TerrainKind] = &[TerrainKind::Water, TerrainKind::Ice];

fn plains_water(sample: &EnvSample, _bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.moisture < PLAINS_WATER_MOISTURE).then_some(TerrainKind::Water)
}

fn plains_meadow(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.fertility > bounds.fertility.min + bounds.fertility.span() * 0.7)
        .then_some(TerrainKind::Meadow)
}

fn cold_snow(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.temperature < bounds.temperature.min + bounds.temperature.span() * 0.15)
        .then_some(TerrainKind::Snow)
}

fn forest_water(sample: &EnvSample, _bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.moisture < 12.0).then_some(TerrainKind::Water)
}

fn forest_scrub(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.fertility < bounds.fertility.min + bounds.fertility.span() * 0.25)
        .then_some(TerrainKind::Scrub)
}

fn desert_oasis(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.moisture > bounds.moisture.min + bounds.moisture.span() * 0.6)
        .then_some(TerrainKind::Water)
}

fn desert_rock(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.height > bounds.height.min + bounds.height.span() * 0.7)
        .then_some(TerrainKind::Stone)
}

fn tundra_ice(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.moisture > bounds.moisture.min + bounds.moisture.span() * 0.75)
        .then_some(TerrainKind::Ice)
}

fn tundra_thaw(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.temperature > bounds.temperature.min + bounds.temperature.span() * 0.35)
        .then_some(TerrainKind::Dirt)
}

fn swamp_pool(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.moisture > bounds.moisture.min + bounds.moisture.span() * 0.92)
        .then_some(TerrainKind::Water)
}

fn swamp_barren(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.fertility < bounds.fertility.min + bounds.fertility.span() * 0.2)
        .then_some(TerrainKind::Dirt)
}

fn highlands_peak(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.height > bounds.height.min + bounds.height.span() * 0.88)
        .then_some(TerrainKind::Snow)
}

fn highlands_tarn(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.moisture > bounds.moisture.min + bounds.moisture.span() * 0.8)
        .then_some(TerrainKind::Water)
}

fn highlands_turf(sample: &EnvSample, bounds: &AttributeBounds) -> Option<TerrainKind> {
    (sample.fertility > bounds.fertility.min + bounds.fertility.span() * 0.55)
        .then_some(TerrainKind::Grass)
}

/// The full family catalog, keyed by terrain-family tag.
pub struct BiomeCatalog {
    entries: HashMap<BiomeId, CatalogEntry>,
    fallback: CatalogEntry,
}

impl BiomeCatalog {
    /// Build the standard catalog from the fixed registration table.
    pub fn standard() -> Self {
        let mut entries = HashMap::new();

        entries.insert(
            BiomeId::Plains,
            CatalogEntry::new(
                Some(BiomeId::Plains),
                Some(TerrainKind::Grass),
                vec![
                    ClassifierRule { priority: 0, classify: plains_water },
                    ClassifierRule { priority: 1, classify: plains_meadow },
                    ClassifierRule { priority: 2, classify: cold_snow },
                ],
                vec![
                    SpawnRule {
                        priority: 0,
                        chance: 0.02,
                        kind: WorldObjectKind::Wildflower,
                        excluded_terrain: NO_WATER,
                    },
                    SpawnRule {
                        priority: 1,
                        chance: 0.01,
                        kind: WorldObjectKind::Shrub,
                        excluded_terrain: NO_WATER,
                    },
                ],
                BlendPolicy::Whitelist(&[
                    TerrainKind::Grass,
                    TerrainKind::Meadow,
                    TerrainKind::Sand,
                    TerrainKind::Dirt,
                ]),
            ),
        );

        entries.insert(
            BiomeId::Forest,
            CatalogEntry::new(
                Some(BiomeId::Forest),
                Some(TerrainKind::Grass),
                vec![
                    ClassifierRule { priority: 0, classify: forest_water },
                    ClassifierRule { priority: 1, classify: cold_snow },
                    ClassifierRule { priority: 2, classify: forest_scrub },
                ],
                vec![
                    SpawnRule {
                        priority: 0,
                        chance: 0.14,
                        kind: WorldObjectKind::Tree { species: TreeSpecies::Oak },
                        excluded_terrain: NO_WATER,
                    },
                    SpawnRule {
                        priority: 1,
                        chance: 0.05,
                        kind: WorldObjectKind::Shrub,
                        excluded_terrain: NO_WATER,
                    },
                    SpawnRule {
                        priority: 2,
                        chance: 0.01,
                        kind: WorldObjectKind::Wildflower,
                        excluded_terrain: NO_WATER,
                    },
                ],
                BlendPolicy::Whitelist(&[
                    TerrainKind::Grass,
                    TerrainKind::Scrub,
                    TerrainKind::Marsh,
                ]),
            ),
        );

        entries.insert(
            BiomeId::Desert,
            CatalogEntry::new(
                Some(BiomeId::Desert),
                Some(TerrainKind::Sand),
                vec![
                    ClassifierRule { priority: 0, classify: desert_oasis },
                    ClassifierRule { priority: 1, classify: desert_rock },
                ],
                vec![
                    SpawnRule {
                        priority: 0,
                        chance: 0.02,
                        kind: WorldObjectKind::Cactus,
                        excluded_terrain: NO_WATER,
                    },
                    SpawnRule {
                        priority: 1,
                        chance: 0.005,
                        kind: WorldObjectKind::Boulder,
                        excluded_terrain: NO_WATER,
                    },
                ],
                BlendPolicy::AllowAny,
            ),
        );

        entries.insert(
            BiomeId::Tundra,
            CatalogEntry::new(
                Some(BiomeId::Tundra),
                Some(TerrainKind::Snow),
                vec![
                    ClassifierRule { priority: 0, classify: tundra_ice },
                    ClassifierRule { priority: 1, classify: tundra_thaw },
                ],
                vec![
                    SpawnRule {
                        priority: 0,
                        chance: 0.03,
                        kind: WorldObjectKind::SnowDrift,
                        excluded_terrain: &[TerrainKind::Water],
                    },
                    SpawnRule {
                        priority: 1,
                        chance: 0.01,
                        kind: WorldObjectKind::Boulder,
                        excluded_terrain: NO_WATER,
                    },
                ],
                BlendPolicy::Whitelist(&[TerrainKind::Snow, TerrainKind::Ice, TerrainKind::Dirt]),
            ),
        );

        entries.insert(
            BiomeId::Swamp,
            CatalogEntry::new(
                Some(BiomeId::Swamp),
                Some(TerrainKind::Marsh),
                vec![
                    ClassifierRule { priority: 0, classify: swamp_pool },
                    ClassifierRule { priority: 1, classify: swamp_barren },
                ],
                vec![
                    SpawnRule {
                        priority: 0,
                        chance: 0.08,
                        kind: WorldObjectKind::Reeds,
                        excluded_terrain: &[],
                    },
                    SpawnRule {
                        priority: 1,
                        chance: 0.02,
                        kind: WorldObjectKind::Tree { species: TreeSpecies::Willow },
                        excluded_terrain: &[TerrainKind::Water],
                    },
                ],
                BlendPolicy::AllowAny,
            ),
        );

        entries.insert(
            BiomeId::Highlands,
            CatalogEntry::new(
                Some(BiomeId::Highlands),
                Some(TerrainKind::Stone),
                vec![
                    ClassifierRule { priority: 0, classify: highlands_peak },
                    ClassifierRule { priority: 1, classify: highlands_tarn },
                    ClassifierRule { priority: 2, classify: highlands_turf },
                ],
                vec![
                    SpawnRule {
                        priority: 0,
                        chance: 0.04,
                        kind: WorldObjectKind::Boulder,
                        excluded_terrain: NO_WATER,
                    },
                    SpawnRule {
                        priority: 1,
                        chance: 0.03,
                        kind: WorldObjectKind::Tree { species: TreeSpecies::Pine },
                        excluded_terrain: &[TerrainKind::Water, TerrainKind::Ice, TerrainKind::Snow],
                    },
                ],
                BlendPolicy::Whitelist(&[TerrainKind::Stone, TerrainKind::Grass, TerrainKind::Snow]),
            ),
        );

        Self {
            entries,
            fallback: CatalogEntry::new(None, None, Vec::new(), Vec::new(), BlendPolicy::Whitelist(&[])),
        }
    }

    /// Entry for a family. Unregistered families resolve to the fallback
    /// entry, which classifies nothing and never spawns.
    pub fn entry(&self, family: BiomeId) -> &CatalogEntry {
        self.entries.get(&family).unwrap_or(&self.fallback)
    }

    /// The documented default entry for unregistered families.
    pub fn fallback(&self) -> &CatalogEntry {
        &self.fallback
    }
}
