//! World objects: placeable entities spawned by biome decoration rules.
//!
//! Object kinds form a closed tagged enum and interaction is a plain
//! data record, so consumers dispatch on tags instead of virtual calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a placed world object.
pub type ObjectId = u64;

/// Tree species carried by the `Tree` object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeSpecies {
    /// Broadleaf tree of temperate ground.
    Oak,
    /// Conifer of cold and high ground.
    Pine,
    /// Water-margin tree of the swamps.
    Willow,
}

/// Closed set of placeable object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldObjectKind {
    /// A standing tree.
    Tree {
        /// Species determines the interaction yield.
        species: TreeSpecies,
    },
    /// An impassable rock.
    Boulder,
    /// A low woody plant.
    Shrub,
    /// Desert succulent.
    Cactus,
    /// Decorative bloom.
    Wildflower,
    /// Marsh reeds.
    Reeds,
    /// A mound of drifted snow.
    SnowDrift,
}

impl WorldObjectKind {
    /// Short name for logs and debug output.
    pub fn name(&self) -> &'static str {
        match self {
            WorldObjectKind::Tree { species: TreeSpecies::Oak } => "oak",
            WorldObjectKind::Tree { species: TreeSpecies::Pine } => "pine",
            WorldObjectKind::Tree { species: TreeSpecies::Willow } => "willow",
            WorldObjectKind::Boulder => "boulder",
            WorldObjectKind::Shrub => "shrub",
            WorldObjectKind::Cactus => "cactus",
            WorldObjectKind::Wildflower => "wildflower",
            WorldObjectKind::Reeds => "reeds",
            WorldObjectKind::SnowDrift => "snow drift",
        }
    }

    /// Whether the object blocks movement through its tile.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            WorldObjectKind::Tree { .. } | WorldObjectKind::Boulder | WorldObjectKind::Cactus
        )
    }
}

impl fmt::Display for WorldObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action tag carried by an interaction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionAction {
    /// The object yielded something.
    Harvest,
    /// The object was examined.
    Inspect,
    /// The object refuses interaction.
    Block,
}

/// Resource kind yielded by harvesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Branches and trunks.
    Wood,
    /// Loose rock.
    Stone,
    /// Plant fiber.
    Fiber,
}

/// Optional payload of an interaction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceYield {
    /// What was gained.
    pub resource: ResourceKind,
    /// How many units.
    pub count: u32,
}

/// Outcome record produced by interacting with a world object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// What happened.
    pub action: InteractionAction,
    /// Player-facing description; presentation belongs to the consumer.
    pub message: String,
    /// Optional resource gain.
    pub payload: Option<ResourceYield>,
}

/// A placed entity with a world-space position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Unique id, allocated by the world map.
    pub id: ObjectId,
    /// World X position.
    pub x: i64,
    /// World Y position.
    pub y: i64,
    /// What the object is.
    pub kind: WorldObjectKind,
}

impl WorldObject {
    /// Create an object at a world position.
    pub fn new(id: ObjectId, x: i64, y: i64, kind: WorldObjectKind) -> Self {
        Self { id, x, y, kind }
    }

    /// Produce the interaction outcome for this object.
    pub fn interact(&self) -> Interaction {
        match self.kind {
            WorldObjectKind::Tree { species } => {
                let (message, count) = match species {
                    TreeSpecies::Oak => ("You gather fallen branches from the oak.", 2),
                    TreeSpecies::Pine => ("You snap dry limbs off the pine.", 2),
                    TreeSpecies::Willow => ("You cut whips from the willow.", 1),
                };
                Interaction {
                    action: InteractionAction::Harvest,
                    message: message.to_string(),
                    payload: Some(ResourceYield {
                        resource: ResourceKind::Wood,
                        count,
                    }),
                }
            }
            WorldObjectKind::Boulder => Interaction {
                action: InteractionAction::Block,
                message: "A weathered boulder blocks the way.".to_string(),
                payload: None,
            },
            WorldObjectKind::Shrub => Interaction {
                action: InteractionAction::Harvest,
                message: "You strip pliable twigs from the shrub.".to_string(),
                payload: Some(ResourceYield {
                    resource: ResourceKind::Fiber,
                    count: 1,
                }),
            },
            WorldObjectKind::Cactus => Interaction {
                action: InteractionAction::Harvest,
                message: "You carefully carve a piece of cactus flesh.".to_string(),
                payload: Some(ResourceYield {
                    resource: ResourceKind::Fiber,
                    count: 1,
                }),
            },
            WorldObjectKind::Wildflower => Interaction {
                action: InteractionAction::Inspect,
                message: "A hardy wildflower sways in the wind.".to_string(),
                payload: None,
            },
            WorldObjectKind::Reeds => Interaction {
                action: InteractionAction::Harvest,
                message: "You pull a bundle of reeds from the mud.".to_string(),
                payload: Some(ResourceYield {
                    resource: ResourceKind::Fiber,
                    count: 2,
                }),
            },
            WorldObjectKind::SnowDrift => Interaction {
                action: InteractionAction::Inspect,
                message: "Wind-packed snow, taller than it looks.".to_string(),
                payload: None,
            },
        }
    }
}
