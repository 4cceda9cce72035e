//! Read-only world queries consumed by the AI core

use vigil_core::{Alertness, ClassMask, EntityId};

/// Snapshot of everything the interest scheduler needs to know about an
/// AI actor in one lookup.
#[derive(Debug, Clone)]
pub struct ActorInfo {
    /// World position (feet)
    pub position: [f32; 3],
    /// World position rays are cast from
    pub eye_position: [f32; 3],
    /// Facing direction, not required to be normalized
    pub forward: [f32; 3],
    /// The actor's class bit
    pub class: ClassMask,
    /// Current alertness level
    pub alertness: Alertness,
    /// AI updates enabled for this actor
    pub enabled: bool,
    /// The actor has run at least one simulation update
    pub updated_once: bool,
    /// The actor is dead
    pub dead: bool,
    /// The actor is currently inside a vehicle
    pub in_vehicle: bool,
}

impl Default for ActorInfo {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            eye_position: [0.0, 1.7, 0.0],
            forward: [0.0, 0.0, 1.0],
            class: ClassMask::ALL,
            alertness: Alertness::Relaxed,
            enabled: true,
            updated_once: true,
            dead: false,
            in_vehicle: false,
        }
    }
}

/// Read-only world access.
///
/// All methods are infallible lookups; unknown entities answer `None`.
pub trait WorldQuery {
    /// Check whether the entity exists
    fn contains(&self, id: EntityId) -> bool;

    /// World position of an entity
    fn position(&self, id: EntityId) -> Option<[f32; 3]>;

    /// Apply the entity's transform to a local-space offset.
    ///
    /// This gives the world-space gaze/interaction point for an entity
    /// registered with a non-zero offset.
    fn world_point(&self, id: EntityId, local_offset: [f32; 3]) -> Option<[f32; 3]>;

    /// Cast a straight line through the world.
    ///
    /// Returns the first entity hit between `from` and `to`, ignoring
    /// `ignore` (normally the caster). `None` means the line is clear.
    fn first_hit(&self, from: [f32; 3], to: [f32; 3], ignore: EntityId) -> Option<EntityId>;

    /// Look up the AI actor facet of an entity.
    ///
    /// `None` means the entity is not an AI actor at all.
    fn actor_info(&self, id: EntityId) -> Option<ActorInfo>;
}

/// Smart-use occupancy query.
///
/// Rule matching stays outside the AI core; the scheduler only ever asks
/// whether an actor is already occupied by a smart-use interaction.
pub trait SmartUseQuery {
    /// Whether the actor is mid-way through a smart-use interaction
    fn is_busy(&self, id: EntityId) -> bool;
}
