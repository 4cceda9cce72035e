//! Per-actor action hosting
//!
//! The host owns a library of named pipe specs and at most one running
//! pipe per actor. Pipes get a full poll on the actor's think tick and
//! a cheap dry pass every update. Every accepted start is guaranteed to
//! come back out of the event queue as exactly one finished, canceled
//! or aborted event; consumers that gate on "action in flight" rely on
//! that to never wedge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vigil_core::EntityId;

use crate::op::{AgentCtx, GoalResult, OpRun};
use crate::pipe::{GoalPipe, OpFactory, PipeSpec};

/// Host scheduling knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Full-poll cadence in host ticks; dry passes run every tick
    pub think_every_ticks: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            think_every_ticks: 1,
        }
    }
}

impl HostConfig {
    /// Whether `actor` gets a full poll on `tick`.
    ///
    /// The phase offset is derived from the actor id, so a crowd of
    /// actors on the same cadence spreads its polls across ticks
    /// deterministically.
    pub fn should_think(&self, actor: EntityId, tick: u64) -> bool {
        let every = self.think_every_ticks.max(1) as u64;
        (tick + actor.raw() % every) % every == 0
    }
}

/// How a hosted action ended, or that it began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEventKind {
    /// The pipe was built and is now running
    Started,
    /// The pipe ran every step to completion
    Finished,
    /// The pipe was stopped on request
    Canceled,
    /// A step failed or the pipe was torn down
    Aborted,
}

/// One lifecycle notification from the host queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    /// Actor the action ran for
    pub actor: EntityId,
    /// Action name from the library
    pub action: String,
    /// What happened
    pub kind: HostEventKind,
}

struct RunningPipe {
    actor: EntityId,
    target: EntityId,
    action: String,
    pipe: GoalPipe,
}

/// Library of named actions plus the pipes currently running them
#[derive(Default)]
pub struct ActionHost {
    config: HostConfig,
    library: HashMap<String, PipeSpec>,
    running: Vec<RunningPipe>,
    events: Vec<HostEvent>,
    tick: u64,
}

impl ActionHost {
    /// Host with the given scheduling config
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// File an action spec under its name, replacing any previous one
    pub fn add_action(&mut self, spec: PipeSpec) {
        self.library.insert(spec.name.clone(), spec);
    }

    /// Whether the library holds an action of this name
    pub fn has_action(&self, name: &str) -> bool {
        self.library.contains_key(name)
    }

    /// Whether `actor` has a pipe in flight
    pub fn is_running(&self, actor: EntityId) -> bool {
        self.running.iter().any(|r| r.actor == actor)
    }

    /// Number of pipes in flight
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Start a named action for `actor` against `target`.
    ///
    /// Refused when the name is unknown, the spec fails to build, or
    /// the actor already has a pipe in flight; a refused start emits no
    /// events. An accepted start emits `Started` immediately.
    pub fn start(
        &mut self,
        action: &str,
        actor: EntityId,
        target: EntityId,
        factory: &dyn OpFactory,
    ) -> bool {
        if actor.is_null() || self.is_running(actor) {
            return false;
        }
        let Some(spec) = self.library.get(action) else {
            log::debug!("unknown action {action:?} requested for actor {actor}");
            return false;
        };
        let Some(pipe) = GoalPipe::from_spec(spec, factory) else {
            log::warn!("action {action:?} has steps the factory cannot build");
            return false;
        };
        self.running.push(RunningPipe {
            actor,
            target,
            action: action.to_string(),
            pipe,
        });
        self.events.push(HostEvent {
            actor,
            action: action.to_string(),
            kind: HostEventKind::Started,
        });
        log::debug!("action {action:?} started for actor {actor}");
        true
    }

    /// Stop `actor`'s running pipe, emitting `Canceled`.
    ///
    /// Returns whether a pipe was actually stopped.
    pub fn cancel(&mut self, actor: EntityId) -> bool {
        self.finish_with(actor, HostEventKind::Canceled)
    }

    /// Tear down `actor`'s running pipe, emitting `Aborted`
    pub fn abort(&mut self, actor: EntityId) -> bool {
        self.finish_with(actor, HostEventKind::Aborted)
    }

    /// Stop every running pipe, emitting `Aborted` for each
    pub fn abort_all(&mut self) {
        let actors: Vec<_> = self.running.iter().map(|r| r.actor).collect();
        for actor in actors {
            self.abort(actor);
        }
    }

    /// Advance every running pipe by one host tick.
    ///
    /// Dry passes run for every pipe; full polls only on each actor's
    /// think tick. Completed pipes are removed and their terminal event
    /// queued before the call returns.
    pub fn update(&mut self, dt: f32, agent: &mut dyn AgentCtx) {
        let tick = self.tick;
        self.tick += 1;

        let mut i = 0;
        while i < self.running.len() {
            let entry = &mut self.running[i];
            let mut run = OpRun {
                actor: entry.actor,
                target: entry.target,
                dt,
                agent: &mut *agent,
            };
            entry.pipe.tick_dry(&mut run);
            if !self.config.should_think(entry.actor, tick) {
                i += 1;
                continue;
            }
            match entry.pipe.tick(&mut run) {
                GoalResult::InProgress => {
                    i += 1;
                }
                GoalResult::Failed => {
                    let done = self.running.remove(i);
                    log::debug!("action {:?} aborted for actor {}", done.action, done.actor);
                    self.events.push(HostEvent {
                        actor: done.actor,
                        action: done.action,
                        kind: HostEventKind::Aborted,
                    });
                }
                GoalResult::Succeeded | GoalResult::Done => {
                    let done = self.running.remove(i);
                    log::debug!("action {:?} finished for actor {}", done.action, done.actor);
                    self.events.push(HostEvent {
                        actor: done.actor,
                        action: done.action,
                        kind: HostEventKind::Finished,
                    });
                }
            }
        }
    }

    /// Take every queued lifecycle event, oldest first
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    fn finish_with(&mut self, actor: EntityId, kind: HostEventKind) -> bool {
        let Some(idx) = self.running.iter().position(|r| r.actor == actor) else {
            return false;
        };
        let mut done = self.running.remove(idx);
        done.pipe.cancel();
        self.events.push(HostEvent {
            actor: done.actor,
            action: done.action,
            kind,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::NullAgent;
    use crate::pipe::{OpSpec, StandardOps};

    fn host_with(name: &str, ops: Vec<OpSpec>) -> ActionHost {
        let mut host = ActionHost::new(HostConfig::default());
        host.add_action(PipeSpec::new(name, ops));
        host
    }

    fn kinds_for(events: &[HostEvent], actor: EntityId) -> Vec<HostEventKind> {
        events
            .iter()
            .filter(|e| e.actor == actor)
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_start_and_run_to_completion() {
        let factory = StandardOps::new();
        let mut host = host_with("idle", vec![OpSpec::Wait { seconds: 0.15 }]);
        let actor = EntityId::new(1);

        assert!(host.start("idle", actor, EntityId::new(2), &factory));
        assert!(host.is_running(actor));

        let mut agent = NullAgent;
        host.update(0.1, &mut agent);
        host.update(0.1, &mut agent);

        assert!(!host.is_running(actor));
        assert_eq!(
            kinds_for(&host.drain_events(), actor),
            vec![HostEventKind::Started, HostEventKind::Finished]
        );
    }

    #[test]
    fn test_unknown_action_refused_without_events() {
        let factory = StandardOps::new();
        let mut host = host_with("idle", vec![OpSpec::Wait { seconds: 1.0 }]);
        assert!(!host.start("dance", EntityId::new(1), EntityId::new(2), &factory));
        assert!(host.drain_events().is_empty());
    }

    #[test]
    fn test_one_pipe_per_actor() {
        let factory = StandardOps::new();
        let mut host = host_with("idle", vec![OpSpec::Wait { seconds: 1.0 }]);
        let actor = EntityId::new(1);

        assert!(host.start("idle", actor, EntityId::new(2), &factory));
        assert!(!host.start("idle", actor, EntityId::new(3), &factory));
        assert_eq!(host.running_count(), 1);
    }

    #[test]
    fn test_unbuildable_spec_refused() {
        let factory = StandardOps::new();
        let mut host = host_with("odd", vec![OpSpec::Custom("mystery".to_string())]);
        assert!(!host.start("odd", EntityId::new(1), EntityId::new(2), &factory));
        assert!(host.drain_events().is_empty());
    }

    #[test]
    fn test_failed_step_aborts() {
        let factory = StandardOps::new();
        // NullAgent refuses animations, so this pipe fails on poll one
        let mut host = host_with(
            "sit",
            vec![OpSpec::Animate {
                name: "sit".to_string(),
            }],
        );
        let actor = EntityId::new(1);
        assert!(host.start("sit", actor, EntityId::new(2), &factory));

        let mut agent = NullAgent;
        host.update(0.1, &mut agent);
        assert_eq!(
            kinds_for(&host.drain_events(), actor),
            vec![HostEventKind::Started, HostEventKind::Aborted]
        );
    }

    #[test]
    fn test_cancel_and_abort_paths() {
        let factory = StandardOps::new();
        let mut host = host_with("idle", vec![OpSpec::Wait { seconds: 10.0 }]);
        let a = EntityId::new(1);
        let b = EntityId::new(2);

        assert!(host.start("idle", a, EntityId::new(9), &factory));
        assert!(host.start("idle", b, EntityId::new(9), &factory));
        assert!(host.cancel(a));
        assert!(!host.cancel(a));
        assert!(host.abort(b));

        let events = host.drain_events();
        assert_eq!(
            kinds_for(&events, a),
            vec![HostEventKind::Started, HostEventKind::Canceled]
        );
        assert_eq!(
            kinds_for(&events, b),
            vec![HostEventKind::Started, HostEventKind::Aborted]
        );
    }

    #[test]
    fn test_every_start_yields_exactly_one_terminal_event() {
        let factory = StandardOps::new();
        let mut host = host_with("idle", vec![OpSpec::Wait { seconds: 0.25 }]);
        let mut agent = NullAgent;
        let actors: Vec<_> = (1..=8).map(EntityId::new).collect();

        for (i, actor) in actors.iter().enumerate() {
            assert!(host.start("idle", *actor, EntityId::new(99), &factory));
            // Cancel half of them mid flight
            if i % 2 == 0 {
                host.cancel(*actor);
            }
        }
        for _ in 0..10 {
            host.update(0.1, &mut agent);
        }
        assert_eq!(host.running_count(), 0);

        let events = host.drain_events();
        for actor in &actors {
            let terminal: Vec<_> = kinds_for(&events, *actor)
                .into_iter()
                .filter(|k| *k != HostEventKind::Started)
                .collect();
            assert_eq!(terminal.len(), 1, "actor {actor} terminal events");
        }
    }

    #[test]
    fn test_think_cadence_staggers_actors() {
        let config = HostConfig {
            think_every_ticks: 4,
        };
        for tick in 0..16u64 {
            let thinkers = (1..=8)
                .filter(|i| config.should_think(EntityId::new(*i), tick))
                .count();
            assert_eq!(thinkers, 2, "tick {tick}");
        }
    }

    #[test]
    fn test_slow_cadence_still_terminates() {
        let factory = StandardOps::new();
        let mut host = ActionHost::new(HostConfig {
            think_every_ticks: 3,
        });
        host.add_action(PipeSpec::new("idle", vec![OpSpec::Wait { seconds: 0.1 }]));
        let actor = EntityId::new(7);
        assert!(host.start("idle", actor, EntityId::new(2), &factory));

        let mut agent = NullAgent;
        for _ in 0..12 {
            host.update(0.1, &mut agent);
        }
        assert!(!host.is_running(actor));
        assert_eq!(
            kinds_for(&host.drain_events(), actor),
            vec![HostEventKind::Started, HostEventKind::Finished]
        );
    }

    #[test]
    fn test_abort_all_clears_everything() {
        let factory = StandardOps::new();
        let mut host = host_with("idle", vec![OpSpec::Wait { seconds: 10.0 }]);
        for i in 1..=3 {
            assert!(host.start("idle", EntityId::new(i), EntityId::new(9), &factory));
        }
        host.abort_all();
        assert_eq!(host.running_count(), 0);
        let aborted = host
            .drain_events()
            .iter()
            .filter(|e| e.kind == HostEventKind::Aborted)
            .count();
        assert_eq!(aborted, 3);
    }
}
