//! Entity lifecycle events forwarded to the AI runtime

/// What just happened to an entity.
///
/// Pool return/prepare are delivered by engines that recycle entities
/// through object pools; the AI runtime treats them exactly like remove
/// and spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// Entity entered the world
    Spawned,
    /// Entity left the world
    Removed,
    /// Level simulation started
    LevelStart,
    /// Entity was reset
    Reset {
        /// True when the reset transitions into gameplay
        entering_game: bool,
    },
    /// Entity was hidden
    Hidden,
    /// Entity was made visible again
    Unhidden,
    /// Entity was returned to its object pool
    ReturnedToPool,
    /// Entity was prepared from its object pool
    PreparedFromPool,
}

impl WorldEvent {
    /// Whether this event re-activates an entity's interest data
    pub fn is_activation(&self) -> bool {
        matches!(
            self,
            WorldEvent::Spawned
                | WorldEvent::LevelStart
                | WorldEvent::Unhidden
                | WorldEvent::PreparedFromPool
                | WorldEvent::Reset { entering_game: true }
        )
    }
}
