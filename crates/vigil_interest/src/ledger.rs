//! Exclusive-selection ledger

use std::collections::HashMap;
use vigil_core::EntityId;

/// Ownership map for exclusively held interesting objects.
///
/// Only exclusive records (shared count 0) are entered here. Every
/// selection-clearing path releases through the ledger, so a hold can
/// never outlive the selection that acquired it.
#[derive(Debug, Clone, Default)]
pub struct SelectionLedger {
    holders: HashMap<EntityId, EntityId>,
}

impl SelectionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `actor` now exclusively holds `target`
    pub fn acquire(&mut self, target: EntityId, actor: EntityId) {
        if !target.is_null() && !actor.is_null() {
            self.holders.insert(target, actor);
        }
    }

    /// Release `target` if `actor` is the holder
    pub fn release(&mut self, target: EntityId, actor: EntityId) {
        if self.holders.get(&target) == Some(&actor) {
            self.holders.remove(&target);
        }
    }

    /// Release every hold owned by `actor`
    pub fn release_all_for(&mut self, actor: EntityId) {
        self.holders.retain(|_, holder| *holder != actor);
    }

    /// Release every hold on `target` regardless of owner
    pub fn release_target(&mut self, target: EntityId) {
        self.holders.remove(&target);
    }

    /// Current holder of `target`
    pub fn holder(&self, target: EntityId) -> Option<EntityId> {
        self.holders.get(&target).copied()
    }

    /// Whether someone other than `actor` holds `target`
    pub fn held_by_other(&self, target: EntityId, actor: EntityId) -> bool {
        match self.holders.get(&target) {
            Some(holder) => *holder != actor,
            None => false,
        }
    }

    /// Drop every hold
    pub fn clear(&mut self) {
        self.holders.clear();
    }

    /// Number of held objects
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    /// Check if nothing is held
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release() {
        let mut ledger = SelectionLedger::new();
        let target = EntityId::new(1);
        let actor = EntityId::new(9);

        ledger.acquire(target, actor);
        assert_eq!(ledger.holder(target), Some(actor));
        assert!(!ledger.held_by_other(target, actor));
        assert!(ledger.held_by_other(target, EntityId::new(8)));

        ledger.release(target, actor);
        assert_eq!(ledger.holder(target), None);
    }

    #[test]
    fn test_release_checks_owner() {
        let mut ledger = SelectionLedger::new();
        let target = EntityId::new(1);
        ledger.acquire(target, EntityId::new(9));

        // A non-holder cannot release
        ledger.release(target, EntityId::new(8));
        assert_eq!(ledger.holder(target), Some(EntityId::new(9)));
    }

    #[test]
    fn test_release_all_for() {
        let mut ledger = SelectionLedger::new();
        let actor = EntityId::new(9);
        ledger.acquire(EntityId::new(1), actor);
        ledger.acquire(EntityId::new(2), actor);
        ledger.acquire(EntityId::new(3), EntityId::new(8));

        ledger.release_all_for(actor);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.holder(EntityId::new(3)), Some(EntityId::new(8)));
    }

    #[test]
    fn test_null_ids_never_enter() {
        let mut ledger = SelectionLedger::new();
        ledger.acquire(EntityId::NULL, EntityId::new(9));
        ledger.acquire(EntityId::new(1), EntityId::NULL);
        assert!(ledger.is_empty());
    }
}
