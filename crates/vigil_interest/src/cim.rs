//! Central interest manager
//!
//! One [`Cim`] runs per world. It owns the record pool, one personal
//! manager per interested actor and the budgeted round-robin scheduler
//! that spreads selection work across passes. All engine access goes
//! through a borrowed [`InterestEnv`], so the manager holds no world
//! references of its own.

use std::sync::Arc;

use crate::action::ActionEvent;
use crate::config::InterestConfig;
use crate::env::InterestEnv;
use crate::events::{InterestEvent, InterestListener, ListenerRegistry};
use crate::ledger::SelectionLedger;
use crate::pim::{Pim, PimCtx};
use crate::record::{InterestUpdate, RecordPool, UpsertOutcome};
use crate::settings::SettingsUpdate;
use vigil_core::{ClassMask, ClassRegistry, EntityId};
use vigil_world::{ActorInfo, ActorProps, InterestProps, StateTag, WorldEvent, WorldQuery};

/// Counters from the most recent scheduling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Seats looked at, serviced or not
    pub visited: usize,
    /// Eligible actors actually re-evaluated
    pub serviced: usize,
    /// Visibility rays spent
    pub rays_used: u32,
}

/// Central interest manager.
///
/// Registration and settings calls take effect immediately; selection
/// itself only changes during scheduling passes driven by [`update`].
/// Events raised anywhere are queued and fanned out to listeners before
/// the triggering call returns.
///
/// [`update`]: Cim::update
pub struct Cim {
    pub(crate) config: InterestConfig,
    pub(crate) registry: ClassRegistry,
    pub(crate) records: RecordPool,
    pub(crate) pims: Vec<Pim>,
    pub(crate) ledger: SelectionLedger,
    pub(crate) listeners: ListenerRegistry,
    pub(crate) queue: Vec<InterestEvent>,
    pub(crate) accumulator: f32,
    pub(crate) time: f64,
    pub(crate) cursor: usize,
    enabled: bool,
    passes: u64,
    last_pass: PassStats,
}

impl Cim {
    /// Create a manager with the given configuration
    pub fn new(config: InterestConfig) -> Self {
        Self {
            records: RecordPool::with_capacity(config.initial_record_capacity),
            config,
            registry: ClassRegistry::new(),
            pims: Vec::new(),
            ledger: SelectionLedger::new(),
            listeners: ListenerRegistry::new(),
            queue: Vec::new(),
            accumulator: 0.0,
            time: 0.0,
            cursor: 0,
            enabled: true,
            passes: 0,
            last_pass: PassStats::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &InterestConfig {
        &self.config
    }

    /// Toggle scheduling, returning the resulting state.
    ///
    /// Disabling stops passes but keeps existing selections, so
    /// re-enabling resumes where things left off.
    pub fn enable(&mut self, on: bool) -> bool {
        if self.enabled != on {
            log::info!("interest scheduling {}", if on { "enabled" } else { "disabled" });
        }
        self.enabled = on;
        self.enabled
    }

    /// Whether scheduling is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Seconds of simulation time consumed so far
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Counters from the most recent pass
    pub fn last_pass(&self) -> PassStats {
        self.last_pass
    }

    /// Number of scheduling passes run so far
    pub fn passes_run(&self) -> u64 {
        self.passes
    }

    /// The actor class registry
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Register an actor class name for action filtering
    pub fn register_class(&mut self, name: &str) -> Option<ClassMask> {
        self.registry.register(name)
    }

    /// The live record pool
    pub fn records(&self) -> &RecordPool {
        &self.records
    }

    /// Personal manager serving `actor`, if registered
    pub fn pim(&self, actor: EntityId) -> Option<&Pim> {
        if actor.is_null() {
            return None;
        }
        self.pims.iter().find(|p| p.actor() == actor)
    }

    /// Whether `actor` currently has a selected object
    pub fn is_interested(&self, actor: EntityId) -> bool {
        self.pim(actor).is_some_and(|p| !p.target().is_null())
    }

    /// World-space gaze point of `actor`'s current selection
    pub fn interesting_pos(&self, actor: EntityId, world: &dyn WorldQuery) -> Option<[f32; 3]> {
        self.pim(actor).and_then(|p| p.interesting_pos(world))
    }

    /// Proxy look-target point of `actor`'s current selection
    pub fn dummy_point(&self, actor: EntityId) -> Option<EntityId> {
        self.pim(actor).and_then(|p| p.dummy_point())
    }

    /// Number of actors with a seat in the scheduler
    pub fn actor_count(&self) -> usize {
        self.pims.iter().filter(|p| p.is_assigned()).count()
    }

    /// Subscribe a listener to events for one interesting object
    pub fn add_listener(&mut self, listener: Arc<dyn InterestListener>, target: EntityId) {
        self.listeners.register(listener, target);
    }

    /// Remove a listener subscription
    pub fn remove_listener(&mut self, listener: &Arc<dyn InterestListener>, target: EntityId) {
        self.listeners.unregister(listener, target);
    }

    /// Insert or update the interest record for an entity.
    ///
    /// A created record marks the entity with [`StateTag::Registered`].
    /// Null ids are rejected.
    pub fn register_interesting(
        &mut self,
        entity: EntityId,
        update: &InterestUpdate,
        env: &mut InterestEnv<'_>,
    ) -> UpsertOutcome {
        let outcome = self.records.upsert(entity, update, &self.registry);
        match outcome {
            UpsertOutcome::Created => {
                env.tags.set_tag(entity, StateTag::Registered);
                log::debug!("registered interesting entity {entity}");
            }
            UpsertOutcome::Rejected => {
                log::warn!("interest registration rejected for the null entity");
            }
            _ => {}
        }
        if self.config.debug_tags && outcome.changed() {
            if let Some(record) = self.records.get(entity) {
                env.tags.debug_text(entity, &record.debug_summary());
            }
        }
        outcome
    }

    /// Remove an entity's interest record.
    ///
    /// Actors watching it stop immediately rather than at their next
    /// scheduled evaluation. Returns whether a record was removed.
    pub fn deregister_interesting(&mut self, entity: EntityId, env: &mut InterestEnv<'_>) -> bool {
        if !self.records.invalidate(entity) {
            return false;
        }
        env.tags.clear_tag(entity, StateTag::Registered);
        let mut no_rays = 0;
        for i in 0..self.pims.len() {
            if self.pims[i].target() != entity {
                continue;
            }
            let mut ctx = PimCtx {
                records: &self.records,
                ledger: &mut self.ledger,
                config: &self.config,
                env: &mut *env,
                queue: &mut self.queue,
                rays_left: &mut no_rays,
            };
            self.pims[i].forget(self.time, &mut ctx);
        }
        log::debug!("deregistered interesting entity {entity}");
        self.dispatch_events();
        true
    }

    /// Give an actor a seat in the scheduler.
    ///
    /// Idempotent; reuses a vacated seat when one exists. Entities
    /// without an AI actor facet are refused.
    pub fn register_actor(&mut self, actor: EntityId, env: &mut InterestEnv<'_>) -> bool {
        if actor.is_null() {
            return false;
        }
        if env.world.actor_info(actor).is_none() {
            log::debug!("entity {actor} has no AI actor facet, not registering");
            return false;
        }
        if self.pims.iter().any(|p| p.actor() == actor) {
            return true;
        }
        let slot = match self.pims.iter().position(|p| !p.is_assigned()) {
            Some(free) => free,
            None => {
                self.pims.push(Pim::new());
                self.pims.len() - 1
            }
        };
        let mut no_rays = 0;
        let mut ctx = PimCtx {
            records: &self.records,
            ledger: &mut self.ledger,
            config: &self.config,
            env: &mut *env,
            queue: &mut self.queue,
            rays_left: &mut no_rays,
        };
        self.pims[slot].assign(actor, self.time, &mut ctx);
        // A fresh seat restarts the round robin
        self.cursor = 0;
        self.dispatch_events();
        log::debug!("actor {actor} joined interest scheduling");
        true
    }

    /// Take an actor's seat away, releasing its selection and marker.
    ///
    /// The seat itself is kept for reuse. Returns whether the actor had
    /// one.
    pub fn deregister_actor(&mut self, actor: EntityId, env: &mut InterestEnv<'_>) -> bool {
        if actor.is_null() {
            return false;
        }
        let Some(slot) = self.pims.iter().position(|p| p.actor() == actor) else {
            return false;
        };
        let mut no_rays = 0;
        let mut ctx = PimCtx {
            records: &self.records,
            ledger: &mut self.ledger,
            config: &self.config,
            env: &mut *env,
            queue: &mut self.queue,
            rays_left: &mut no_rays,
        };
        self.pims[slot].assign(EntityId::NULL, self.time, &mut ctx);
        self.dispatch_events();
        log::debug!("actor {actor} left interest scheduling");
        true
    }

    /// Apply a settings update to a registered actor.
    ///
    /// Returns whether the actor is known; unknown actors are ignored.
    pub fn update_settings(&mut self, actor: EntityId, update: &SettingsUpdate) -> bool {
        match self.pims.iter_mut().find(|p| p.actor() == actor) {
            Some(pim) => {
                if pim.apply_settings(update) {
                    log::debug!("interest settings changed for actor {actor}");
                }
                true
            }
            None => false,
        }
    }

    /// Feed an entity lifecycle event.
    ///
    /// Activation events re-read the entity's scripted interest block and
    /// register or deregister both roles accordingly; deactivation events
    /// remove the entity everywhere. Ignored without AI authority.
    pub fn on_world_event(
        &mut self,
        entity: EntityId,
        event: &WorldEvent,
        env: &mut InterestEnv<'_>,
    ) {
        if !self.config.ai_authority {
            return;
        }
        if event.is_activation() {
            self.refresh_from_props(entity, env);
        } else {
            self.deregister_interesting(entity, env);
            self.deregister_actor(entity, env);
        }
    }

    /// Re-read an entity's scripted interest block and apply it
    pub fn refresh_from_props(&mut self, entity: EntityId, env: &mut InterestEnv<'_>) {
        let Some(table) = env.props.interest_block(entity) else {
            return;
        };
        let props = InterestProps::parse(&table);
        if props.interesting {
            let update = InterestUpdate::from_sentinels(
                props.radius,
                props.interest_level,
                props.action.as_deref(),
                props.offset,
                props.pause,
                props.shared,
            );
            self.register_interesting(entity, &update, env);
        } else {
            self.deregister_interesting(entity, env);
        }
        let actor = ActorProps::parse(&table);
        if actor.interested {
            self.register_actor(entity, env);
            self.update_settings(
                entity,
                &SettingsUpdate::from_sentinels(true, actor.min_interest_level, actor.angle_degrees),
            );
        } else {
            self.deregister_actor(entity, env);
        }
    }

    /// Callback from the scripted action facility for `actor`'s running
    /// action. Unknown actors are ignored.
    pub fn on_action_event(&mut self, actor: EntityId, event: ActionEvent) {
        if let Some(pim) = self.pims.iter_mut().find(|p| p.actor() == actor) {
            pim.on_action_event(event, &mut self.queue);
        }
        self.dispatch_events();
    }

    /// Advance time and run a scheduling pass when one is due.
    ///
    /// Passes fire immediately on the first call and every
    /// `update_interval` seconds after. A complete no-op while disabled
    /// or without AI authority.
    pub fn update(&mut self, dt: f32, env: &mut InterestEnv<'_>) {
        if !self.enabled || !self.config.ai_authority {
            return;
        }
        self.time += dt as f64;
        self.accumulator -= dt;
        if self.accumulator > 0.0 {
            self.dispatch_events();
            return;
        }
        self.accumulator = self.config.update_interval;
        self.run_pass(env);
        self.dispatch_events();
    }

    /// Return to the all-slots-free state without firing listener
    /// callbacks.
    ///
    /// Records are tombstoned in place and seats are vacated rather than
    /// destroyed, so slot identity survives across level loads. Listener
    /// subscriptions are dropped.
    pub fn reset(&mut self, env: &mut InterestEnv<'_>) {
        for i in 0..self.pims.len() {
            let mut no_rays = 0;
            let mut ctx = PimCtx {
                records: &self.records,
                ledger: &mut self.ledger,
                config: &self.config,
                env: &mut *env,
                queue: &mut self.queue,
                rays_left: &mut no_rays,
            };
            self.pims[i].assign(EntityId::NULL, self.time, &mut ctx);
        }
        for (_, record) in self.records.iter_valid() {
            env.tags.clear_tag(record.entity, StateTag::Registered);
        }
        self.records.clear();
        self.ledger.clear();
        self.listeners.clear();
        self.queue.clear();
        self.accumulator = 0.0;
        self.time = 0.0;
        self.cursor = 0;
        log::info!("interest manager reset");
    }

    fn run_pass(&mut self, env: &mut InterestEnv<'_>) {
        self.passes += 1;
        let mut stats = PassStats::default();
        let total = self.pims.len();
        if total == 0 {
            self.last_pass = stats;
            return;
        }
        let mut rays = self.config.ray_budget_per_pass;
        let mut idx = self.cursor % total;

        while stats.visited < total && stats.serviced < self.config.max_pims_per_pass {
            let slot = idx;
            idx = (idx + 1) % total;
            stats.visited += 1;

            let actor = self.pims[slot].actor();
            if actor.is_null() {
                continue;
            }
            let info = eligible_info(actor, env);
            let mut ctx = PimCtx {
                records: &self.records,
                ledger: &mut self.ledger,
                config: &self.config,
                env: &mut *env,
                queue: &mut self.queue,
                rays_left: &mut rays,
            };
            match info {
                Some(info) => {
                    let near = ctx.env.proximity.worth_visibility_checks(actor, info.position);
                    self.pims[slot].update(self.time, &info, near, &mut ctx);
                    stats.serviced += 1;
                }
                None => {
                    // An ineligible actor cannot keep a selection
                    self.pims[slot].forget(self.time, &mut ctx);
                }
            }
            if self.config.debug_tags {
                let target = self.pims[slot].target();
                let text = if target.is_null() {
                    String::from("interest: idle")
                } else {
                    format!("interest: watching {target}")
                };
                ctx.env.tags.debug_text(actor, &text);
            }
        }
        self.cursor = idx;
        stats.rays_used = self.config.ray_budget_per_pass - rays;
        self.last_pass = stats;
    }

    fn dispatch_events(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.queue);
        for event in &batch {
            self.listeners.notify(event);
        }
    }
}

impl Default for Cim {
    fn default() -> Self {
        Self::new(InterestConfig::default())
    }
}

/// Resolve an actor and check it against the selection eligibility gate
fn eligible_info(actor: EntityId, env: &InterestEnv<'_>) -> Option<ActorInfo> {
    let info = env.world.actor_info(actor)?;
    if !info.alertness.is_relaxed()
        || !info.enabled
        || !info.updated_once
        || info.dead
        || info.in_vehicle
        || env.smart.is_busy(actor)
    {
        return None;
    }
    Some(info)
}
