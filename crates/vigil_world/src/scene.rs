//! In-memory world for tests and headless tools

use crate::props::{resolve_interest_block, PropertySource, PropertyTable};
use crate::query::{ActorInfo, SmartUseQuery, WorldQuery};
use std::collections::HashMap;
use vigil_core::{Alertness, ClassMask, EntityId};

/// An entity living in a `SceneWorld`
#[derive(Debug, Clone)]
pub struct SceneEntity {
    /// World position
    pub position: [f32; 3],
    /// Heading in radians around the up axis
    pub yaw: f32,
    /// Collision sphere radius; `0.0` lets rays pass through
    pub body_radius: f32,
    /// Archetype-level properties
    pub archetype: Option<PropertyTable>,
    /// Instance-level properties
    pub instance: Option<PropertyTable>,
}

impl SceneEntity {
    /// Create an entity at a position
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            yaw: 0.0,
            body_radius: 0.0,
            archetype: None,
            instance: None,
        }
    }

    /// Set the heading
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Give the entity a collision sphere
    pub fn with_body(mut self, radius: f32) -> Self {
        self.body_radius = radius;
        self
    }

    /// Attach archetype properties
    pub fn with_archetype(mut self, table: PropertyTable) -> Self {
        self.archetype = Some(table);
        self
    }

    /// Attach instance properties
    pub fn with_instance(mut self, table: PropertyTable) -> Self {
        self.instance = Some(table);
        self
    }
}

/// The AI actor facet of a scene entity
#[derive(Debug, Clone)]
pub struct SceneActor {
    /// Eye height above the entity position
    pub eye_height: f32,
    /// Facing direction
    pub forward: [f32; 3],
    /// Actor class bit
    pub class: ClassMask,
    /// Current alertness
    pub alertness: Alertness,
    /// AI updates enabled
    pub enabled: bool,
    /// Has run at least one simulation update
    pub updated_once: bool,
    /// Dead flag
    pub dead: bool,
    /// Inside a vehicle
    pub in_vehicle: bool,
    /// Occupied by a smart-use interaction
    pub smart_use_busy: bool,
}

impl Default for SceneActor {
    fn default() -> Self {
        Self {
            eye_height: 1.7,
            forward: [0.0, 0.0, 1.0],
            class: ClassMask::ALL,
            alertness: Alertness::Relaxed,
            enabled: true,
            updated_once: true,
            dead: false,
            in_vehicle: false,
            smart_use_busy: false,
        }
    }
}

impl SceneActor {
    /// Set the facing direction
    pub fn with_forward(mut self, forward: [f32; 3]) -> Self {
        self.forward = forward;
        self
    }

    /// Set the class bit
    pub fn with_class(mut self, class: ClassMask) -> Self {
        self.class = class;
        self
    }
}

/// Small in-memory world implementing the facade traits.
///
/// Entities are spheres for line-of-sight purposes; anything with a body
/// radius occludes rays.
#[derive(Debug, Clone, Default)]
pub struct SceneWorld {
    entities: HashMap<EntityId, SceneEntity>,
    actors: HashMap<EntityId, SceneActor>,
    next_id: u64,
}

impl SceneWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            actors: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add an entity, allocating an id
    pub fn add_entity(&mut self, entity: SceneEntity) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, entity);
        id
    }

    /// Add an entity with an AI actor facet
    pub fn add_actor(&mut self, entity: SceneEntity, actor: SceneActor) -> EntityId {
        let id = self.add_entity(entity);
        self.actors.insert(id, actor);
        id
    }

    /// Remove an entity and any actor facet it carried
    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.remove(&id);
        self.actors.remove(&id);
    }

    /// Mutable access to an entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(&id)
    }

    /// Mutable access to an actor facet
    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut SceneActor> {
        self.actors.get_mut(&id)
    }

    /// Move an entity
    pub fn set_position(&mut self, id: EntityId, pos: [f32; 3]) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.position = pos;
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl WorldQuery for SceneWorld {
    fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    fn position(&self, id: EntityId) -> Option<[f32; 3]> {
        self.entities.get(&id).map(|e| e.position)
    }

    fn world_point(&self, id: EntityId, local_offset: [f32; 3]) -> Option<[f32; 3]> {
        let entity = self.entities.get(&id)?;
        let (sin, cos) = entity.yaw.sin_cos();
        let [x, y, z] = local_offset;
        Some([
            entity.position[0] + x * cos + z * sin,
            entity.position[1] + y,
            entity.position[2] - x * sin + z * cos,
        ])
    }

    fn first_hit(&self, from: [f32; 3], to: [f32; 3], ignore: EntityId) -> Option<EntityId> {
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let dz = to[2] - from[2];
        let len = (dx * dx + dy * dy + dz * dz).sqrt();
        if len <= f32::EPSILON {
            return None;
        }
        let dir = [dx / len, dy / len, dz / len];

        let mut best: Option<(f32, EntityId)> = None;
        for (&id, entity) in &self.entities {
            if id == ignore || entity.body_radius <= 0.0 {
                continue;
            }
            let oc = [
                from[0] - entity.position[0],
                from[1] - entity.position[1],
                from[2] - entity.position[2],
            ];
            let b = oc[0] * dir[0] + oc[1] * dir[1] + oc[2] * dir[2];
            let c = oc[0] * oc[0] + oc[1] * oc[1] + oc[2] * oc[2]
                - entity.body_radius * entity.body_radius;
            let disc = b * b - c;
            if disc < 0.0 {
                continue;
            }
            let sqrt_disc = disc.sqrt();
            let mut t = -b - sqrt_disc;
            if t < 0.0 {
                // Segment starts inside the sphere
                if -b + sqrt_disc < 0.0 {
                    continue;
                }
                t = 0.0;
            }
            if t > len {
                continue;
            }
            if best.map(|(bt, _)| t < bt).unwrap_or(true) {
                best = Some((t, id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn actor_info(&self, id: EntityId) -> Option<ActorInfo> {
        let entity = self.entities.get(&id)?;
        let actor = self.actors.get(&id)?;
        Some(ActorInfo {
            position: entity.position,
            eye_position: [
                entity.position[0],
                entity.position[1] + actor.eye_height,
                entity.position[2],
            ],
            forward: actor.forward,
            class: actor.class,
            alertness: actor.alertness,
            enabled: actor.enabled,
            updated_once: actor.updated_once,
            dead: actor.dead,
            in_vehicle: actor.in_vehicle,
        })
    }
}

impl SmartUseQuery for SceneWorld {
    fn is_busy(&self, id: EntityId) -> bool {
        self.actors.get(&id).map(|a| a.smart_use_busy).unwrap_or(false)
    }
}

impl PropertySource for SceneWorld {
    fn interest_block(&self, id: EntityId) -> Option<PropertyTable> {
        let entity = self.entities.get(&id)?;
        resolve_interest_block(entity.archetype.as_ref(), entity.instance.as_ref()).cloned()
    }
}
