//! End-to-end tests for the assembled AI layer: interest selection
//! launching hosted goal pipes, completions releasing suppression, and
//! save/load through the runtime.

use std::sync::{Arc, Mutex};

use vigil_runtime::prelude::*;

struct Rig {
    world: SceneWorld,
    tags: TagRecorder,
    points: PointTable,
    agent: NullAgent,
}

impl Rig {
    fn new() -> Self {
        Self {
            world: SceneWorld::new(),
            tags: TagRecorder::new(),
            points: PointTable::new(),
            agent: NullAgent,
        }
    }

    fn add_target(&mut self, pos: [f32; 3]) -> EntityId {
        self.world.add_entity(SceneEntity::at(pos))
    }

    fn add_actor(&mut self, pos: [f32; 3]) -> EntityId {
        self.world.add_actor(SceneEntity::at(pos), SceneActor::default())
    }
}

macro_rules! with_env {
    ($rig:expr, $env:ident, $body:block) => {{
        let $env = &mut RuntimeEnv {
            world: &$rig.world,
            props: &$rig.world,
            smart: &$rig.world,
            tags: &mut $rig.tags,
            points: &mut $rig.points,
            agent: &mut $rig.agent,
        };
        $body
    }};
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<InterestEvent>>,
}

impl Recorder {
    fn kinds(&self) -> Vec<InterestEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl InterestListener for Recorder {
    fn on_interest_event(&self, event: &InterestEvent) {
        self.events.lock().unwrap().push(*event);
    }
}

fn runtime() -> AiRuntime {
    AiRuntime::new(
        InterestConfig::default().with_raycasts(false),
        Box::new(AlwaysNear),
    )
}

fn inspect_record() -> InterestUpdate {
    InterestUpdate::none()
        .with_radius(10.0)
        .with_interest(5.0)
        .with_action("inspect")
}

#[test]
fn test_selection_launches_hosted_action_and_resumes() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    ai.add_action(PipeSpec::new("inspect", vec![OpSpec::Wait { seconds: 0.15 }]));
    let target = rig.add_target([0.0, 0.0, 2.0]);
    let actor = rig.add_actor([0.0, 0.0, 0.0]);
    let spy = Arc::new(Recorder::default());
    ai.cim_mut().add_listener(spy.clone(), target);

    with_env!(rig, env, {
        ai.register_interesting(target, &inspect_record(), env);
        ai.register_actor(actor, env);
        ai.tick(0.1, env);
    });

    // The selection launched a pipe and suppressed the actor
    assert!(ai.cim().is_interested(actor));
    assert!(ai.host().is_running(actor));
    assert!(ai.cim().pim(actor).unwrap().is_action_running());
    assert_eq!(spy.kinds(), vec![InterestEventKind::Start]);

    // Pipe still running, selection unchanged
    with_env!(rig, env, {
        ai.tick(0.1, env);
    });
    assert!(ai.host().is_running(actor));

    // Pipe completes; the completion routes back and lifts suppression
    with_env!(rig, env, {
        ai.tick(0.1, env);
    });
    assert!(!ai.host().is_running(actor));
    assert!(!ai.cim().pim(actor).unwrap().is_action_running());
    assert_eq!(
        spy.kinds(),
        vec![InterestEventKind::Start, InterestEventKind::ActionComplete]
    );
}

#[test]
fn test_unknown_action_leaves_actor_unsuppressed() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    // Nothing filed under "inspect"
    let target = rig.add_target([0.0, 0.0, 2.0]);
    let actor = rig.add_actor([0.0, 0.0, 0.0]);

    with_env!(rig, env, {
        ai.register_interesting(target, &inspect_record(), env);
        ai.register_actor(actor, env);
        ai.tick(0.1, env);
    });

    assert!(ai.cim().is_interested(actor));
    assert!(!ai.host().is_running(actor));
    assert!(!ai.cim().pim(actor).unwrap().is_action_running());
}

#[test]
fn test_failed_pipe_reports_abort() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    // NullAgent refuses animations, so this pipe aborts on first poll
    ai.add_action(PipeSpec::new(
        "inspect",
        vec![OpSpec::Animate {
            name: "point".to_string(),
        }],
    ));
    let target = rig.add_target([0.0, 0.0, 2.0]);
    let actor = rig.add_actor([0.0, 0.0, 0.0]);
    let spy = Arc::new(Recorder::default());
    ai.cim_mut().add_listener(spy.clone(), target);

    with_env!(rig, env, {
        ai.register_interesting(target, &inspect_record(), env);
        ai.register_actor(actor, env);
        ai.tick(0.1, env);
        ai.tick(0.1, env);
    });

    assert!(!ai.host().is_running(actor));
    assert!(!ai.cim().pim(actor).unwrap().is_action_running());
    assert_eq!(
        spy.kinds(),
        vec![InterestEventKind::Start, InterestEventKind::ActionAbort]
    );
}

#[test]
fn test_world_events_wire_scripted_entities() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    ai.add_action(PipeSpec::new(
        "inspect",
        vec![OpSpec::Signal {
            name: "curious".to_string(),
        }],
    ));
    let target = rig.world.add_entity(
        SceneEntity::at([0.0, 0.0, 2.0]).with_instance(
            PropertyTable::new()
                .with("interesting", true)
                .with("radius", 12.0)
                .with("interestLevel", 4.0)
                .with("action", "inspect"),
        ),
    );
    let actor = rig.world.add_actor(
        SceneEntity::at([0.0, 0.0, 0.0])
            .with_instance(PropertyTable::new().with("interested", true).with("angle", 360.0)),
        SceneActor::default(),
    );

    with_env!(rig, env, {
        ai.on_world_event(target, &WorldEvent::Spawned, env);
        ai.on_world_event(actor, &WorldEvent::Spawned, env);
        ai.tick(0.1, env);
    });

    assert!(ai.cim().is_interested(actor));
    assert!(ai.host().is_running(actor));

    with_env!(rig, env, {
        ai.on_world_event(target, &WorldEvent::Removed, env);
    });
    assert!(!ai.cim().is_interested(actor));
}

#[test]
fn test_deregister_actor_cancels_hosted_action() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    ai.add_action(PipeSpec::new("inspect", vec![OpSpec::Wait { seconds: 10.0 }]));
    let target = rig.add_target([0.0, 0.0, 2.0]);
    let actor = rig.add_actor([0.0, 0.0, 0.0]);

    with_env!(rig, env, {
        ai.register_interesting(target, &inspect_record(), env);
        ai.register_actor(actor, env);
        ai.tick(0.1, env);
        assert!(ai.host().is_running(actor));
        assert!(ai.deregister_actor(actor, env));
        // The late cancel has nowhere to land and is swallowed
        ai.tick(0.1, env);
    });

    assert!(!ai.host().is_running(actor));
    assert_eq!(ai.cim().actor_count(), 0);
}

#[test]
fn test_reset_aborts_pipes_silently() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    ai.add_action(PipeSpec::new("inspect", vec![OpSpec::Wait { seconds: 10.0 }]));
    let target = rig.add_target([0.0, 0.0, 2.0]);
    let actor = rig.add_actor([0.0, 0.0, 0.0]);
    let spy = Arc::new(Recorder::default());
    ai.cim_mut().add_listener(spy.clone(), target);

    with_env!(rig, env, {
        ai.register_interesting(target, &inspect_record(), env);
        ai.register_actor(actor, env);
        ai.tick(0.1, env);
        ai.reset(env);
        ai.tick(0.1, env);
    });

    assert!(!ai.host().is_running(actor));
    assert_eq!(ai.cim().actor_count(), 0);
    assert!(ai.cim().records().is_empty());
    assert_eq!(spy.kinds(), vec![InterestEventKind::Start]);
}

#[test]
fn test_save_and_load_round_trip() {
    let mut rig = Rig::new();
    let mut ai = runtime();
    let target = rig.add_target([0.0, 0.0, 2.0]);
    let actor = rig.add_actor([0.0, 0.0, 0.0]);

    let path = std::env::temp_dir().join("vigil_runtime_roundtrip.json");
    with_env!(rig, env, {
        ai.register_interesting(target, &InterestUpdate::none().with_radius(10.0).with_interest(5.0), env);
        ai.register_actor(actor, env);
        ai.tick(0.1, env);
        ai.save(&path, SnapshotFormat::Json, env).unwrap();
    });
    let selected = ai.cim().pim(actor).unwrap().target();
    assert_eq!(selected, target);

    let mut fresh = runtime();
    with_env!(rig, env, {
        fresh.load(&path, SnapshotFormat::Json, env).unwrap();
    });
    assert_eq!(fresh.cim().pim(actor).unwrap().target(), target);
    assert_eq!(fresh.cim().records().len(), 1);
    std::fs::remove_file(&path).ok();
}
