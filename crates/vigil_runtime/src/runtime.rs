//! Single-owner AI runtime
//!
//! [`AiRuntime`] is the one object an embedder creates for the whole AI
//! layer: it owns the central interest manager, the action host and the
//! op factory, and wires action lifecycle events back into interest
//! selection. The embedder lends it world access per call through a
//! [`RuntimeEnv`]; the runtime itself keeps no engine references.

use std::path::Path;

use vigil_core::EntityId;
use vigil_goal::{ActionHost, AgentCtx, HostConfig, HostEventKind, OpFactory, PipeSpec, StandardOps};
use vigil_interest::{
    read_snapshot, write_snapshot, ActionDispatcher, ActionEvent, Cim, CimSnapshot, InterestConfig,
    InterestEnv, InterestUpdate, ProximityPolicy, SettingsUpdate, SnapshotError, SnapshotFormat,
    UpsertOutcome,
};
use vigil_world::{PropertySource, ProxyPoints, SmartUseQuery, TagSink, WorldEvent, WorldQuery};

/// Borrowed world access for one runtime call.
///
/// Splitting the surfaces (rather than taking one engine object) lets
/// read-only queries and mutable sinks live in different places, which
/// is how real embeddings are shaped.
pub struct RuntimeEnv<'a> {
    /// Transforms, raycasts and actor status
    pub world: &'a dyn WorldQuery,
    /// Scripted property access
    pub props: &'a dyn PropertySource,
    /// Smart-use occupancy
    pub smart: &'a dyn SmartUseQuery,
    /// State tag and debug text sink
    pub tags: &'a mut dyn TagSink,
    /// Proxy look-target allocator
    pub points: &'a mut dyn ProxyPoints,
    /// Effector surface goal operations act through
    pub agent: &'a mut dyn AgentCtx,
}

/// Launches interest actions as hosted goal pipes
struct HostDispatcher<'a> {
    host: &'a mut ActionHost,
    factory: &'a dyn OpFactory,
}

impl ActionDispatcher for HostDispatcher<'_> {
    fn launch(&mut self, action: &str, actor: EntityId, target: EntityId) -> bool {
        self.host.start(action, actor, target, self.factory)
    }
}

/// The AI layer as one owned object.
///
/// Create exactly one per simulation and drive it from the main loop:
///
/// 1. forward entity lifecycle through [`on_world_event`],
/// 2. call [`tick`] once per frame.
///
/// Interest selections launch actions on the internal host; host
/// completions come back as interest action events on the next tick,
/// which is what releases a suppressed actor.
///
/// [`on_world_event`]: AiRuntime::on_world_event
/// [`tick`]: AiRuntime::tick
pub struct AiRuntime {
    cim: Cim,
    host: ActionHost,
    factory: Box<dyn OpFactory>,
    proximity: Box<dyn ProximityPolicy>,
}

impl AiRuntime {
    /// Runtime with the given interest config and proximity policy,
    /// hosting the builtin operations
    pub fn new(config: InterestConfig, proximity: Box<dyn ProximityPolicy>) -> Self {
        Self::with_factory(config, proximity, Box::new(StandardOps::new()))
    }

    /// Runtime with a custom op factory
    pub fn with_factory(
        config: InterestConfig,
        proximity: Box<dyn ProximityPolicy>,
        factory: Box<dyn OpFactory>,
    ) -> Self {
        Self {
            cim: Cim::new(config),
            host: ActionHost::new(HostConfig::default()),
            factory,
            proximity,
        }
    }

    /// The interest manager
    pub fn cim(&self) -> &Cim {
        &self.cim
    }

    /// The interest manager, mutably
    pub fn cim_mut(&mut self) -> &mut Cim {
        &mut self.cim
    }

    /// The action host
    pub fn host(&self) -> &ActionHost {
        &self.host
    }

    /// The action host, mutably
    pub fn host_mut(&mut self) -> &mut ActionHost {
        &mut self.host
    }

    /// File an action spec with the host
    pub fn add_action(&mut self, spec: PipeSpec) {
        self.host.add_action(spec);
    }

    /// Advance the whole AI layer by one frame.
    ///
    /// Hosted pipes run first, their lifecycle events are routed into
    /// the interest manager, then a scheduling pass runs if one is due.
    pub fn tick(&mut self, dt: f32, env: &mut RuntimeEnv<'_>) {
        self.host.update(dt, env.agent);
        for event in self.host.drain_events() {
            let kind = match event.kind {
                HostEventKind::Started => ActionEvent::Started,
                HostEventKind::Finished => ActionEvent::Finished,
                HostEventKind::Canceled => ActionEvent::Canceled,
                HostEventKind::Aborted => ActionEvent::Aborted,
            };
            self.cim.on_action_event(event.actor, kind);
        }
        self.with_env(env, |cim, ienv| cim.update(dt, ienv));
    }

    /// Forward an entity lifecycle event to the interest manager
    pub fn on_world_event(&mut self, entity: EntityId, event: &WorldEvent, env: &mut RuntimeEnv<'_>) {
        self.with_env(env, |cim, ienv| cim.on_world_event(entity, event, ienv));
    }

    /// Insert or update an interest record
    pub fn register_interesting(
        &mut self,
        entity: EntityId,
        update: &InterestUpdate,
        env: &mut RuntimeEnv<'_>,
    ) -> UpsertOutcome {
        self.with_env(env, |cim, ienv| cim.register_interesting(entity, update, ienv))
    }

    /// Remove an interest record
    pub fn deregister_interesting(&mut self, entity: EntityId, env: &mut RuntimeEnv<'_>) -> bool {
        self.with_env(env, |cim, ienv| cim.deregister_interesting(entity, ienv))
    }

    /// Give an actor a seat in interest scheduling
    pub fn register_actor(&mut self, actor: EntityId, env: &mut RuntimeEnv<'_>) -> bool {
        self.with_env(env, |cim, ienv| cim.register_actor(actor, ienv))
    }

    /// Remove an actor from interest scheduling.
    ///
    /// Any hosted action the actor is running is canceled; the cancel
    /// surfaces on the next tick.
    pub fn deregister_actor(&mut self, actor: EntityId, env: &mut RuntimeEnv<'_>) -> bool {
        if self.host.cancel(actor) {
            log::debug!("actor {actor} left with an action in flight, canceling");
        }
        self.with_env(env, |cim, ienv| cim.deregister_actor(actor, ienv))
    }

    /// Apply a settings update to a registered actor
    pub fn update_settings(&mut self, actor: EntityId, update: &SettingsUpdate) -> bool {
        self.cim.update_settings(actor, update)
    }

    /// Tear down to the all-slots-free state.
    ///
    /// Every hosted pipe aborts and the interest manager resets.
    pub fn reset(&mut self, env: &mut RuntimeEnv<'_>) {
        let running = self.host.running_count();
        if running > 0 {
            log::debug!("runtime reset aborting {running} hosted pipes");
        }
        self.host.abort_all();
        self.host.drain_events();
        self.with_env(env, |cim, ienv| cim.reset(ienv));
        log::info!("runtime reset");
    }

    /// Capture the interest state.
    ///
    /// Hosted pipes are transient and not captured; restoring treats
    /// any in-flight action as aborted.
    pub fn snapshot(&mut self, env: &mut RuntimeEnv<'_>) -> CimSnapshot {
        let Self {
            cim,
            host,
            factory,
            proximity,
        } = self;
        let mut dispatcher = HostDispatcher {
            host,
            factory: factory.as_ref(),
        };
        let ienv = InterestEnv {
            world: env.world,
            props: env.props,
            smart: env.smart,
            tags: &mut *env.tags,
            points: &mut *env.points,
            actions: &mut dispatcher,
            proximity: proximity.as_ref(),
        };
        cim.snapshot(&ienv)
    }

    /// Replace the interest state with a snapshot's.
    ///
    /// In-flight hosted pipes abort first so no completion can arrive
    /// for a selection that no longer exists.
    pub fn restore(
        &mut self,
        snapshot: &CimSnapshot,
        env: &mut RuntimeEnv<'_>,
    ) -> Result<(), SnapshotError> {
        let running = self.host.running_count();
        if running > 0 {
            log::debug!("restore aborting {running} hosted pipes");
        }
        self.host.abort_all();
        self.host.drain_events();
        self.with_env(env, |cim, ienv| cim.restore(snapshot, ienv))
    }

    /// Save the interest state to a file
    pub fn save(
        &mut self,
        path: &Path,
        format: SnapshotFormat,
        env: &mut RuntimeEnv<'_>,
    ) -> Result<(), SnapshotError> {
        let snapshot = self.snapshot(env);
        write_snapshot(path, &snapshot, format)?;
        log::info!("interest state saved to {}", path.display());
        Ok(())
    }

    /// Load the interest state from a file
    pub fn load(
        &mut self,
        path: &Path,
        format: SnapshotFormat,
        env: &mut RuntimeEnv<'_>,
    ) -> Result<(), SnapshotError> {
        let snapshot = read_snapshot(path, format)?;
        log::info!("interest state loaded from {}", path.display());
        self.restore(&snapshot, env)
    }

    fn with_env<R>(
        &mut self,
        env: &mut RuntimeEnv<'_>,
        f: impl FnOnce(&mut Cim, &mut InterestEnv<'_>) -> R,
    ) -> R {
        let Self {
            cim,
            host,
            factory,
            proximity,
        } = self;
        let mut dispatcher = HostDispatcher {
            host,
            factory: factory.as_ref(),
        };
        let mut ienv = InterestEnv {
            world: env.world,
            props: env.props,
            smart: env.smart,
            tags: &mut *env.tags,
            points: &mut *env.points,
            actions: &mut dispatcher,
            proximity: proximity.as_ref(),
        };
        f(cim, &mut ienv)
    }
}
