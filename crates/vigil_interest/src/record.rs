//! Interest records and the record pool

use serde::{Deserialize, Serialize};
use vigil_core::{ClassMask, ClassRegistry, EntityId};

/// A registered point of interest.
///
/// A record whose entity id is null is a free slot waiting for reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRecord {
    /// Owning entity (null marks a free slot)
    pub entity: EntityId,
    /// Maximum distance at which this object attracts attention
    pub radius: f32,
    /// Base interest score
    pub interest: f32,
    /// Scripted action fired on selection; empty or "none" = look only
    pub action: String,
    /// Local-space offset of the gaze/interaction point
    pub offset: [f32; 3],
    /// Seconds an actor must wait before reselecting this object
    pub pause: f32,
    /// How many actors may use this object at once; 0 = exclusive
    pub shared: u32,
    /// Actor classes the action supports
    pub class_mask: ClassMask,
}

impl InterestRecord {
    /// Create an inert record for an entity.
    ///
    /// Fresh records attract nothing until radius and interest are set.
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            radius: 0.0,
            interest: 0.0,
            action: String::new(),
            offset: [0.0, 0.0, 0.0],
            pause: 0.0,
            shared: 0,
            class_mask: ClassMask::ALL,
        }
    }

    /// Check if this slot holds a live registration
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.entity.is_null()
    }

    /// Free the slot for reuse
    pub fn invalidate(&mut self) {
        *self = Self::new(EntityId::NULL);
    }

    /// Whether selection should fire a scripted action
    pub fn wants_action(&self) -> bool {
        !self.action.is_empty() && !self.action.eq_ignore_ascii_case("none")
    }

    /// Whether an actor of the given class may select this object
    #[inline]
    pub fn supports_class(&self, class: ClassMask) -> bool {
        self.class_mask.intersects(class)
    }

    /// One-line overlay text describing the record
    pub fn debug_summary(&self) -> String {
        format!(
            "interest r={:.1} i={:.1} action={} pause={:.1} shared={}",
            self.radius,
            self.interest,
            if self.action.is_empty() { "-" } else { &self.action },
            self.pause,
            self.shared,
        )
    }
}

/// Partial update for an interest record.
///
/// Unset fields keep their current value. The legacy registration
/// convention (negative number / missing string / zero vector meaning
/// "unchanged") maps onto this through [`InterestUpdate::from_sentinels`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterestUpdate {
    /// New attraction radius
    pub radius: Option<f32>,
    /// New base interest score
    pub interest: Option<f32>,
    /// New scripted action name
    pub action: Option<String>,
    /// New gaze-point offset
    pub offset: Option<[f32; 3]>,
    /// New reselection cooldown
    pub pause: Option<f32>,
    /// New concurrent user count
    pub shared: Option<u32>,
}

impl InterestUpdate {
    /// Update that changes nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set the interest score
    pub fn with_interest(mut self, interest: f32) -> Self {
        self.interest = Some(interest);
        self
    }

    /// Set the action name
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the gaze-point offset
    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the reselection cooldown
    pub fn with_pause(mut self, pause: f32) -> Self {
        self.pause = Some(pause);
        self
    }

    /// Set the concurrent user count
    pub fn with_shared(mut self, shared: u32) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Map the legacy registration convention onto explicit optionals.
    ///
    /// Negative numbers, a missing action string and an all-zero offset
    /// all mean "keep the current value". A genuine zero offset cannot be
    /// expressed this way; native callers use [`with_offset`] instead.
    ///
    /// [`with_offset`]: InterestUpdate::with_offset
    pub fn from_sentinels(
        radius: f32,
        interest: f32,
        action: Option<&str>,
        offset: [f32; 3],
        pause: f32,
        shared: i32,
    ) -> Self {
        Self {
            radius: (radius >= 0.0).then_some(radius),
            interest: (interest >= 0.0).then_some(interest),
            action: action.map(|s| s.to_string()),
            offset: (offset != [0.0, 0.0, 0.0]).then_some(offset),
            pause: (pause >= 0.0).then_some(pause),
            shared: (shared >= 0).then_some(shared as u32),
        }
    }

    /// Check that no field is set
    pub fn is_none(&self) -> bool {
        self.radius.is_none()
            && self.interest.is_none()
            && self.action.is_none()
            && self.offset.is_none()
            && self.pause.is_none()
            && self.shared.is_none()
    }
}

/// Result of a pool upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Null id, nothing stored
    Rejected,
    /// Existing record, no field differed
    Unchanged,
    /// Existing record, at least one field changed
    Updated,
    /// New record created
    Created,
}

impl UpsertOutcome {
    /// Whether the pool contents changed
    pub fn changed(&self) -> bool {
        matches!(self, UpsertOutcome::Updated | UpsertOutcome::Created)
    }
}

/// Pool of interest records with tombstone reuse.
///
/// Slot order is stable and visible: scoring scans the pool in slot
/// order and breaks ties in favor of the earlier slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPool {
    slots: Vec<InterestRecord>,
}

impl RecordPool {
    /// Create a pool with an initial slot reservation
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Insert or update the record for an entity.
    ///
    /// Finds the entity's existing slot, else the first free slot, else
    /// appends. Null ids are rejected outright so an invalid handle can
    /// never occupy a live slot.
    pub fn upsert(
        &mut self,
        entity: EntityId,
        update: &InterestUpdate,
        registry: &ClassRegistry,
    ) -> UpsertOutcome {
        if entity.is_null() {
            return UpsertOutcome::Rejected;
        }

        if let Some(record) = self.slots.iter_mut().find(|r| r.entity == entity) {
            return if Self::merge(record, update, registry) {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Unchanged
            };
        }

        let slot = match self.slots.iter().position(|r| !r.is_valid()) {
            Some(free) => {
                self.slots[free] = InterestRecord::new(entity);
                free
            }
            None => {
                self.slots.push(InterestRecord::new(entity));
                self.slots.len() - 1
            }
        };
        Self::merge(&mut self.slots[slot], update, registry);
        UpsertOutcome::Created
    }

    fn merge(record: &mut InterestRecord, update: &InterestUpdate, registry: &ClassRegistry) -> bool {
        let mut changed = false;
        if let Some(radius) = update.radius {
            changed |= record.radius != radius;
            record.radius = radius;
        }
        if let Some(interest) = update.interest {
            changed |= record.interest != interest;
            record.interest = interest;
        }
        if let Some(action) = &update.action {
            if record.action != *action {
                record.action = action.clone();
                record.class_mask = registry.mask_for_action(action);
                changed = true;
            }
        }
        if let Some(offset) = update.offset {
            changed |= record.offset != offset;
            record.offset = offset;
        }
        if let Some(pause) = update.pause {
            changed |= record.pause != pause;
            record.pause = pause;
        }
        if let Some(shared) = update.shared {
            changed |= record.shared != shared;
            record.shared = shared;
        }
        changed
    }

    /// Free the slot for an entity. Returns whether a record existed.
    pub fn invalidate(&mut self, entity: EntityId) -> bool {
        if entity.is_null() {
            return false;
        }
        match self.slots.iter_mut().find(|r| r.entity == entity) {
            Some(record) => {
                record.invalidate();
                true
            }
            None => false,
        }
    }

    /// Look up the record for an entity
    pub fn get(&self, entity: EntityId) -> Option<&InterestRecord> {
        if entity.is_null() {
            return None;
        }
        self.slots.iter().find(|r| r.entity == entity)
    }

    /// Record at a slot index
    pub fn slot(&self, index: usize) -> Option<&InterestRecord> {
        self.slots.get(index)
    }

    /// Iterate live records in slot order
    pub fn iter_valid(&self) -> impl Iterator<Item = (usize, &InterestRecord)> {
        self.slots.iter().enumerate().filter(|(_, r)| r.is_valid())
    }

    /// Free every slot
    pub fn clear(&mut self) {
        for record in &mut self.slots {
            record.invalidate();
        }
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|r| r.is_valid()).count()
    }

    /// Check if no record is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slot count including free slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

}
