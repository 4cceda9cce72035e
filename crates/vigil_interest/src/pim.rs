//! Per-actor interest selection

use crate::action::ActionEvent;
use crate::config::InterestConfig;
use crate::env::InterestEnv;
use crate::events::{InterestEvent, InterestEventKind};
use crate::ledger::SelectionLedger;
use crate::record::{InterestRecord, RecordPool};
use crate::settings::{ActorSettings, SettingsUpdate};
use vigil_core::EntityId;
use vigil_world::{ActorInfo, StateTag, WorldQuery};

/// Shortest distance used when weighting scores, so a candidate standing
/// on the actor cannot produce a singular score
const MIN_SCORE_DISTANCE: f32 = 0.1;

/// Borrowed state a personal manager works against during one call
pub(crate) struct PimCtx<'a, 'e> {
    pub records: &'a RecordPool,
    pub ledger: &'a mut SelectionLedger,
    pub config: &'a InterestConfig,
    pub env: &'a mut InterestEnv<'e>,
    pub queue: &'a mut Vec<InterestEvent>,
    pub rays_left: &'a mut u32,
}

/// Selection state machine for a single actor.
///
/// A manager with a null actor is a recycled slot waiting for
/// reassignment; the central manager never destroys these.
#[derive(Debug, Clone)]
pub struct Pim {
    actor: EntityId,
    target: EntityId,
    last_target: EntityId,
    last_target_time: f64,
    frozen_offset: [f32; 3],
    dummy: EntityId,
    settings: ActorSettings,
    action_running: bool,
}

impl Pim {
    /// Create an unassigned slot
    pub(crate) fn new() -> Self {
        Self {
            actor: EntityId::NULL,
            target: EntityId::NULL,
            last_target: EntityId::NULL,
            last_target_time: 0.0,
            frozen_offset: [0.0, 0.0, 0.0],
            dummy: EntityId::NULL,
            settings: ActorSettings::default(),
            action_running: false,
        }
    }

    /// The actor this manager serves
    pub fn actor(&self) -> EntityId {
        self.actor
    }

    /// Currently selected interesting object
    pub fn target(&self) -> EntityId {
        self.target
    }

    /// The most recently abandoned object
    pub fn last_target(&self) -> EntityId {
        self.last_target
    }

    /// Current settings
    pub fn settings(&self) -> &ActorSettings {
        &self.settings
    }

    /// Whether a scripted action is in flight
    pub fn is_action_running(&self) -> bool {
        self.action_running
    }

    /// Whether this slot serves an actor
    pub fn is_assigned(&self) -> bool {
        !self.actor.is_null()
    }

    /// Proxy look-target point, present only while something is selected
    pub fn dummy_point(&self) -> Option<EntityId> {
        if self.target.is_null() || self.dummy.is_null() {
            None
        } else {
            Some(self.dummy)
        }
    }

    /// World-space gaze point of the current selection.
    ///
    /// Uses the offset frozen at selection time, so later record edits
    /// don't make the gaze jitter.
    pub fn interesting_pos(&self, world: &dyn WorldQuery) -> Option<[f32; 3]> {
        if self.target.is_null() {
            return None;
        }
        world.world_point(self.target, self.frozen_offset)
    }

    /// Serve a different actor, or deactivate with a null id.
    ///
    /// Re-assigning the same actor is a no-op. Otherwise the previous
    /// actor's marker and selection are released, all state resets and a
    /// fresh proxy point is created for the new actor.
    pub(crate) fn assign(&mut self, new_actor: EntityId, now: f64, ctx: &mut PimCtx<'_, '_>) {
        if new_actor == self.actor {
            return;
        }
        if !self.actor.is_null() {
            ctx.env.tags.clear_tag(self.actor, StateTag::RegisteredActor);
            self.forget(now, ctx);
        }
        if !self.dummy.is_null() {
            ctx.env.points.remove_point(self.dummy);
            self.dummy = EntityId::NULL;
        }
        self.settings = ActorSettings::default();
        self.action_running = false;
        self.last_target = EntityId::NULL;
        self.last_target_time = 0.0;
        self.frozen_offset = [0.0, 0.0, 0.0];
        self.actor = new_actor;
        if !new_actor.is_null() {
            ctx.env.tags.set_tag(new_actor, StateTag::RegisteredActor);
            let pos = ctx.env.world.position(new_actor).unwrap_or([0.0, 0.0, 0.0]);
            self.dummy = ctx.env.points.create_point(pos);
        }
    }

    /// Apply a settings update, reporting whether anything changed
    pub(crate) fn apply_settings(&mut self, update: &SettingsUpdate) -> bool {
        update.apply(&mut self.settings)
    }

    /// Re-evaluate what this actor finds interesting.
    ///
    /// A no-op while a scripted action is in flight. Visibility
    /// evaluation only runs when the actor is near a viewer; otherwise
    /// the current selection is released. Returns whether state changed.
    pub(crate) fn update(
        &mut self,
        now: f64,
        info: &ActorInfo,
        near_viewer: bool,
        ctx: &mut PimCtx<'_, '_>,
    ) -> bool {
        if self.actor.is_null() || self.action_running {
            return false;
        }
        if !self.settings.enabled || !near_viewer {
            return self.forget(now, ctx);
        }
        let records = ctx.records;
        match self.pick_most_interesting(now, info, ctx) {
            Some(slot) => match records.slot(slot) {
                Some(record) if record.entity != self.target => {
                    let record = record.clone();
                    self.select(&record, ctx)
                }
                Some(_) => {
                    // Same selection; keep the proxy point tracking it
                    self.sync_dummy(ctx);
                    false
                }
                None => self.forget(now, ctx),
            },
            None => self.forget(now, ctx),
        }
    }

    /// Drop the current selection.
    ///
    /// Records it as the last target for cooldown purposes, releases the
    /// exclusivity hold and fires a stop event. Returns whether a
    /// selection was actually cleared.
    pub(crate) fn forget(&mut self, now: f64, ctx: &mut PimCtx<'_, '_>) -> bool {
        if self.target.is_null() {
            return false;
        }
        let target = self.target;
        self.last_target = target;
        self.last_target_time = now;
        self.target = EntityId::NULL;
        self.frozen_offset = [0.0, 0.0, 0.0];
        ctx.ledger.release(target, self.actor);
        ctx.queue
            .push(InterestEvent::new(InterestEventKind::Stop, self.actor, target));
        log::debug!("actor {} lost interest in {}", self.actor, target);
        true
    }

    /// Callback from the scripted action facility.
    ///
    /// Start suppresses re-evaluation; completion lifts the suppression
    /// and forwards the outcome to listeners, scoped to the current
    /// selection. Swallowed when the slot has been unassigned meanwhile.
    pub(crate) fn on_action_event(&mut self, event: ActionEvent, queue: &mut Vec<InterestEvent>) {
        if self.actor.is_null() {
            return;
        }
        match event {
            ActionEvent::Started => self.action_running = true,
            ActionEvent::Finished | ActionEvent::Canceled | ActionEvent::Aborted => {
                self.action_running = false;
                if !self.target.is_null() {
                    let kind = match event {
                        ActionEvent::Canceled => InterestEventKind::ActionCancel,
                        ActionEvent::Aborted => InterestEventKind::ActionAbort,
                        _ => InterestEventKind::ActionComplete,
                    };
                    queue.push(InterestEvent::new(kind, self.actor, self.target));
                }
            }
        }
    }

    /// Scan the record pool for the best candidate.
    ///
    /// Scores are distance weighted; the running best starts at the
    /// actor's filter floor and only strictly better candidates replace
    /// it, so ties resolve to the earlier pool slot.
    pub(crate) fn pick_most_interesting(
        &self,
        now: f64,
        info: &ActorInfo,
        ctx: &mut PimCtx<'_, '_>,
    ) -> Option<usize> {
        let records = ctx.records;
        let forward = normalize(info.forward);
        let mut best_score = self.settings.filter;
        let mut best = None;

        for (slot, record) in records.iter_valid() {
            // Cooldown applies to the just-abandoned target only
            if record.entity == self.last_target
                && now - self.last_target_time < record.pause as f64
            {
                continue;
            }
            if !record.supports_class(info.class) {
                continue;
            }
            if record.radius <= 0.0 {
                continue;
            }
            let Some(target_pos) = ctx.env.world.position(record.entity) else {
                continue;
            };
            let to_target = [
                target_pos[0] - info.position[0],
                target_pos[1] - info.position[1],
                target_pos[2] - info.position[2],
            ];
            let dist = length(to_target);
            if dist > record.radius {
                continue;
            }
            let clamped = dist.max(MIN_SCORE_DISTANCE).min(record.radius);
            let score = record.interest * (record.radius - clamped) / record.radius;
            if score <= best_score {
                continue;
            }
            // Acceptance cone, inclusive at the boundary
            if let (Some(fwd), Some(dir)) = (forward, normalize(to_target)) {
                if dot(fwd, dir) < self.settings.angle_cos {
                    continue;
                }
            }
            if record.shared == 0 && ctx.ledger.held_by_other(record.entity, self.actor) {
                continue;
            }
            if ctx.config.raycasts_enabled && !self.is_visible(record, target_pos, info, ctx) {
                continue;
            }
            best_score = score;
            best = Some(slot);
        }
        best
    }

    fn is_visible(
        &self,
        record: &InterestRecord,
        target_pos: [f32; 3],
        info: &ActorInfo,
        ctx: &mut PimCtx<'_, '_>,
    ) -> bool {
        // Out of ray budget counts as blocked; the candidate competes
        // again next pass
        if *ctx.rays_left == 0 {
            return false;
        }
        *ctx.rays_left -= 1;
        let point = ctx
            .env
            .world
            .world_point(record.entity, record.offset)
            .unwrap_or(target_pos);
        match ctx.env.world.first_hit(info.eye_position, point, self.actor) {
            None => true,
            Some(hit) => hit == record.entity,
        }
    }

    fn select(&mut self, record: &InterestRecord, ctx: &mut PimCtx<'_, '_>) -> bool {
        if !self.target.is_null() {
            ctx.ledger.release(self.target, self.actor);
        }
        self.target = record.entity;
        self.frozen_offset = record.offset;
        if record.shared == 0 {
            ctx.ledger.acquire(record.entity, self.actor);
        }
        self.sync_dummy(ctx);
        ctx.queue.push(InterestEvent::new(
            InterestEventKind::Start,
            self.actor,
            record.entity,
        ));
        if record.wants_action() && ctx.env.actions.launch(&record.action, self.actor, record.entity)
        {
            self.action_running = true;
        }
        log::debug!("actor {} now interested in {}", self.actor, record.entity);
        true
    }

    fn sync_dummy(&self, ctx: &mut PimCtx<'_, '_>) {
        if self.dummy.is_null() || self.target.is_null() {
            return;
        }
        if let Some(pos) = ctx.env.world.world_point(self.target, self.frozen_offset) {
            ctx.env.points.move_point(self.dummy, pos);
        }
    }

    /// Capture serializable state
    pub(crate) fn state(&self) -> crate::snapshot::PimState {
        crate::snapshot::PimState {
            actor: self.actor,
            target: self.target,
            last_target: self.last_target,
            last_target_time: self.last_target_time,
            frozen_offset: self.frozen_offset,
            dummy: self.dummy,
            dummy_pos: None,
            settings: self.settings.clone(),
            action_running: self.action_running,
        }
    }

    /// Rebuild from serialized state; the proxy point is restored by the
    /// caller to keep its identity
    pub(crate) fn from_state(state: &crate::snapshot::PimState) -> Self {
        Self {
            actor: state.actor,
            target: state.target,
            last_target: state.last_target,
            last_target_time: state.last_target_time,
            frozen_offset: state.frozen_offset,
            dummy: state.dummy,
            settings: state.settings.clone(),
            action_running: state.action_running,
        }
    }

    #[cfg(test)]
    pub(crate) fn test_assign_raw(&mut self, actor: EntityId) {
        self.actor = actor;
    }
}

fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let len = length(v);
    if len <= f32::EPSILON {
        return None;
    }
    Some([v[0] / len, v[1] / len, v[2] / len])
}
