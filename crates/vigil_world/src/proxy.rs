//! Proxy look-target points
//!
//! Each interest seeker owns a lightweight proxy point that look-at and
//! animation systems can track without knowing the real target entity.
//! Points keep their identity across save/load, so `restore` re-creates
//! a point under its original id instead of allocating a fresh one.

use std::collections::HashMap;
use vigil_core::EntityId;

/// Allocator for proxy look-target points
pub trait ProxyPoints {
    /// Create a new point, returning its id
    fn create_point(&mut self, pos: [f32; 3]) -> EntityId;

    /// Re-create a point under a previously allocated id.
    ///
    /// Used when loading a snapshot. Returns `false` when the id cannot
    /// be honored (null or clashing with a foreign object).
    fn restore_point(&mut self, id: EntityId, pos: [f32; 3]) -> bool;

    /// Move an existing point
    fn move_point(&mut self, id: EntityId, pos: [f32; 3]);

    /// Remove a point
    fn remove_point(&mut self, id: EntityId);

    /// Current position of a point
    fn point_pos(&self, id: EntityId) -> Option<[f32; 3]>;
}

/// In-memory point allocator.
///
/// Ids are drawn from a high range so they never collide with ordinary
/// entity ids in the same scene.
#[derive(Debug, Clone)]
pub struct PointTable {
    points: HashMap<EntityId, [f32; 3]>,
    next: u64,
}

/// First id handed out by `PointTable`
const POINT_ID_BASE: u64 = 1 << 32;

impl PointTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            points: HashMap::new(),
            next: POINT_ID_BASE,
        }
    }

    /// Number of live points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether no points are live
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for PointTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyPoints for PointTable {
    fn create_point(&mut self, pos: [f32; 3]) -> EntityId {
        let id = EntityId::new(self.next);
        self.next += 1;
        self.points.insert(id, pos);
        id
    }

    fn restore_point(&mut self, id: EntityId, pos: [f32; 3]) -> bool {
        if id.is_null() {
            return false;
        }
        // Keep the allocator ahead of every restored id
        if id.raw() >= self.next {
            self.next = id.raw() + 1;
        }
        self.points.insert(id, pos);
        true
    }

    fn move_point(&mut self, id: EntityId, pos: [f32; 3]) {
        if let Some(p) = self.points.get_mut(&id) {
            *p = pos;
        }
    }

    fn remove_point(&mut self, id: EntityId) {
        self.points.remove(&id);
    }

    fn point_pos(&self, id: EntityId) -> Option<[f32; 3]> {
        self.points.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_move() {
        let mut points = PointTable::new();
        let id = points.create_point([1.0, 2.0, 3.0]);

        assert!(!id.is_null());
        assert_eq!(points.point_pos(id), Some([1.0, 2.0, 3.0]));

        points.move_point(id, [4.0, 5.0, 6.0]);
        assert_eq!(points.point_pos(id), Some([4.0, 5.0, 6.0]));

        points.remove_point(id);
        assert_eq!(points.point_pos(id), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut points = PointTable::new();
        let a = points.create_point([0.0; 3]);
        let b = points.create_point([0.0; 3]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_restore_keeps_identity() {
        let mut points = PointTable::new();
        let id = points.create_point([0.0; 3]);
        points.remove_point(id);

        // Fresh table, as after a load
        let mut restored = PointTable::new();
        assert!(restored.restore_point(id, [7.0, 0.0, 0.0]));
        assert_eq!(restored.point_pos(id), Some([7.0, 0.0, 0.0]));

        // New allocations never reuse the restored id
        let fresh = restored.create_point([0.0; 3]);
        assert_ne!(fresh, id);
    }

    #[test]
    fn test_restore_rejects_null() {
        let mut points = PointTable::new();
        assert!(!points.restore_point(EntityId::NULL, [0.0; 3]));
    }
}
