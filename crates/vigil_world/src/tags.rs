//! State tags and debug text attached to world entities

use std::collections::{HashMap, HashSet};
use vigil_core::EntityId;

/// Book-keeping tags the AI runtime maintains on entities.
///
/// Other systems (smart-use state patterns, debug overlays) read these;
/// the AI core only ever writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    /// Entity is registered as a point of interest
    Registered,
    /// Actor is registered as an interest seeker
    RegisteredActor,
}

/// Sink for state tags and debug text
pub trait TagSink {
    /// Attach a tag to an entity
    fn set_tag(&mut self, id: EntityId, tag: StateTag);

    /// Remove a tag from an entity
    fn clear_tag(&mut self, id: EntityId, tag: StateTag);

    /// Attach short human-readable debug text to an entity.
    ///
    /// Free text for overlays only, never a machine-readable format.
    fn debug_text(&mut self, id: EntityId, text: &str);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTags;

impl TagSink for NullTags {
    fn set_tag(&mut self, _id: EntityId, _tag: StateTag) {}
    fn clear_tag(&mut self, _id: EntityId, _tag: StateTag) {}
    fn debug_text(&mut self, _id: EntityId, _text: &str) {}
}

/// Sink that records tags in memory, for tests and headless inspection
#[derive(Debug, Clone, Default)]
pub struct TagRecorder {
    tags: HashMap<EntityId, HashSet<StateTag>>,
    texts: HashMap<EntityId, String>,
}

impl TagRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an entity currently carries a tag
    pub fn has_tag(&self, id: EntityId, tag: StateTag) -> bool {
        self.tags.get(&id).map(|set| set.contains(&tag)).unwrap_or(false)
    }

    /// Last debug text attached to an entity
    pub fn text(&self, id: EntityId) -> Option<&str> {
        self.texts.get(&id).map(|s| s.as_str())
    }
}

impl TagSink for TagRecorder {
    fn set_tag(&mut self, id: EntityId, tag: StateTag) {
        self.tags.entry(id).or_default().insert(tag);
    }

    fn clear_tag(&mut self, id: EntityId, tag: StateTag) {
        if let Some(set) = self.tags.get_mut(&id) {
            set.remove(&tag);
        }
    }

    fn debug_text(&mut self, id: EntityId, text: &str) {
        self.texts.insert(id, text.to_string());
    }
}
