//! Builtin goal operations

use crate::op::{GoalOp, GoalResult, OpRun};

/// Holds the pipe for a fixed duration
#[derive(Debug, Clone)]
pub struct Wait {
    duration: f32,
    elapsed: f32,
}

impl Wait {
    /// Create a wait of the given length in seconds
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }
}

impl GoalOp for Wait {
    fn execute(&mut self, run: &mut OpRun<'_>) -> GoalResult {
        self.elapsed += run.dt;
        if self.elapsed >= self.duration {
            GoalResult::Succeeded
        } else {
            GoalResult::InProgress
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Faces the pipe target for a fixed duration.
///
/// The gaze point refreshes in the dry step so a moving target is
/// tracked every update, not only on think ticks.
#[derive(Debug, Clone)]
pub struct LookAt {
    duration: f32,
    elapsed: f32,
    looking: bool,
}

impl LookAt {
    /// Create a look of the given length in seconds
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            looking: false,
        }
    }
}

impl GoalOp for LookAt {
    fn execute(&mut self, run: &mut OpRun<'_>) -> GoalResult {
        let Some(pos) = run.agent.position(run.target) else {
            if self.looking {
                run.agent.clear_look_target(run.actor);
                self.looking = false;
            }
            return GoalResult::Failed;
        };
        run.agent.set_look_target(run.actor, pos);
        self.looking = true;
        self.elapsed += run.dt;
        if self.elapsed >= self.duration {
            run.agent.clear_look_target(run.actor);
            self.looking = false;
            GoalResult::Succeeded
        } else {
            GoalResult::InProgress
        }
    }

    fn execute_dry(&mut self, run: &mut OpRun<'_>) {
        if self.looking {
            if let Some(pos) = run.agent.position(run.target) {
                run.agent.set_look_target(run.actor, pos);
            }
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
        self.looking = false;
    }
}

/// Plays a named animation to completion
#[derive(Debug, Clone)]
pub struct Animate {
    name: String,
    started: bool,
}

impl Animate {
    /// Create an animation step for the given clip name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: false,
        }
    }
}

impl GoalOp for Animate {
    fn execute(&mut self, run: &mut OpRun<'_>) -> GoalResult {
        if !self.started {
            if !run.agent.start_animation(run.actor, &self.name) {
                return GoalResult::Failed;
            }
            self.started = true;
            return GoalResult::InProgress;
        }
        if run.agent.animation_finished(run.actor, &self.name) {
            GoalResult::Succeeded
        } else {
            GoalResult::InProgress
        }
    }

    fn reset(&mut self) {
        self.started = false;
    }
}

/// Fires a named signal and completes immediately
#[derive(Debug, Clone)]
pub struct Signal {
    name: String,
}

impl Signal {
    /// Create a signal step for the given signal name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl GoalOp for Signal {
    fn execute(&mut self, run: &mut OpRun<'_>) -> GoalResult {
        run.agent.send_signal(run.actor, &self.name);
        GoalResult::Done
    }

    fn reset(&mut self) {}
}

/// Runs child operations simultaneously until all have finished.
///
/// Children that finish stop being polled. The step fails if any child
/// failed, once every child is done.
pub struct Parallel {
    children: Vec<Box<dyn GoalOp>>,
    finished: Vec<bool>,
    failed: bool,
}

impl Parallel {
    /// Create a parallel step over the given children
    pub fn new(children: Vec<Box<dyn GoalOp>>) -> Self {
        let finished = vec![false; children.len()];
        Self {
            children,
            finished,
            failed: false,
        }
    }
}

impl GoalOp for Parallel {
    fn execute(&mut self, run: &mut OpRun<'_>) -> GoalResult {
        let mut all_done = true;
        for (i, child) in self.children.iter_mut().enumerate() {
            if self.finished[i] {
                continue;
            }
            let result = child.execute(run);
            if result.is_finished() {
                self.finished[i] = true;
                if result == GoalResult::Failed {
                    self.failed = true;
                }
            } else {
                all_done = false;
            }
        }
        if !all_done {
            GoalResult::InProgress
        } else if self.failed {
            GoalResult::Failed
        } else {
            GoalResult::Succeeded
        }
    }

    fn execute_dry(&mut self, run: &mut OpRun<'_>) {
        for (i, child) in self.children.iter_mut().enumerate() {
            if !self.finished[i] {
                child.execute_dry(run);
            }
        }
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        for flag in &mut self.finished {
            *flag = false;
        }
        self.failed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::AgentCtx;
    use std::collections::HashMap;
    use vigil_core::EntityId;

    #[derive(Default)]
    struct TestAgent {
        positions: HashMap<EntityId, [f32; 3]>,
        look_targets: Vec<(EntityId, [f32; 3])>,
        look_cleared: usize,
        accept_animations: bool,
        animations_finished: bool,
        signals: Vec<(EntityId, String)>,
    }

    impl AgentCtx for TestAgent {
        fn position(&self, id: EntityId) -> Option<[f32; 3]> {
            self.positions.get(&id).copied()
        }

        fn set_look_target(&mut self, actor: EntityId, pos: [f32; 3]) {
            self.look_targets.push((actor, pos));
        }

        fn clear_look_target(&mut self, _actor: EntityId) {
            self.look_cleared += 1;
        }

        fn start_animation(&mut self, _actor: EntityId, _name: &str) -> bool {
            self.accept_animations
        }

        fn animation_finished(&self, _actor: EntityId, _name: &str) -> bool {
            self.animations_finished
        }

        fn send_signal(&mut self, actor: EntityId, name: &str) {
            self.signals.push((actor, name.to_string()));
        }
    }

    fn run<'a>(agent: &'a mut TestAgent, dt: f32) -> OpRun<'a> {
        OpRun {
            actor: EntityId::new(1),
            target: EntityId::new(2),
            dt,
            agent,
        }
    }

    #[test]
    fn test_wait_elapses() {
        let mut agent = TestAgent::default();
        let mut wait = Wait::new(0.3);

        assert_eq!(wait.execute(&mut run(&mut agent, 0.2)), GoalResult::InProgress);
        assert_eq!(wait.execute(&mut run(&mut agent, 0.2)), GoalResult::Succeeded);

        wait.reset();
        assert_eq!(wait.execute(&mut run(&mut agent, 0.2)), GoalResult::InProgress);
    }

    #[test]
    fn test_look_at_tracks_and_clears() {
        let mut agent = TestAgent::default();
        agent.positions.insert(EntityId::new(2), [1.0, 0.0, 0.0]);
        let mut look = LookAt::new(0.3);

        assert_eq!(look.execute(&mut run(&mut agent, 0.2)), GoalResult::InProgress);
        assert_eq!(agent.look_targets.len(), 1);

        // Dry steps keep the gaze fresh while the target moves
        agent.positions.insert(EntityId::new(2), [2.0, 0.0, 0.0]);
        look.execute_dry(&mut run(&mut agent, 0.0));
        assert_eq!(agent.look_targets.len(), 2);
        assert_eq!(agent.look_targets[1].1, [2.0, 0.0, 0.0]);

        assert_eq!(look.execute(&mut run(&mut agent, 0.2)), GoalResult::Succeeded);
        assert_eq!(agent.look_cleared, 1);

        // Dry step after completion does nothing
        look.execute_dry(&mut run(&mut agent, 0.0));
        assert_eq!(agent.look_targets.len(), 3);
    }

    #[test]
    fn test_look_at_fails_without_target() {
        let mut agent = TestAgent::default();
        let mut look = LookAt::new(1.0);
        assert_eq!(look.execute(&mut run(&mut agent, 0.1)), GoalResult::Failed);
        assert_eq!(agent.look_cleared, 0);
    }

    #[test]
    fn test_animate_refusal_fails() {
        let mut agent = TestAgent::default();
        let mut animate = Animate::new("sit");
        assert_eq!(animate.execute(&mut run(&mut agent, 0.1)), GoalResult::Failed);
    }

    #[test]
    fn test_animate_runs_to_completion() {
        let mut agent = TestAgent::default();
        agent.accept_animations = true;
        let mut animate = Animate::new("sit");

        assert_eq!(animate.execute(&mut run(&mut agent, 0.1)), GoalResult::InProgress);
        assert_eq!(animate.execute(&mut run(&mut agent, 0.1)), GoalResult::InProgress);

        agent.animations_finished = true;
        assert_eq!(animate.execute(&mut run(&mut agent, 0.1)), GoalResult::Succeeded);
    }

    #[test]
    fn test_signal_fires_once_and_is_done() {
        let mut agent = TestAgent::default();
        let mut signal = Signal::new("alerted");
        assert_eq!(signal.execute(&mut run(&mut agent, 0.1)), GoalResult::Done);
        assert_eq!(agent.signals, vec![(EntityId::new(1), "alerted".to_string())]);
    }

    #[test]
    fn test_parallel_waits_for_all_children() {
        let mut agent = TestAgent::default();
        let mut parallel = Parallel::new(vec![
            Box::new(Wait::new(0.1)),
            Box::new(Wait::new(0.3)),
        ]);

        assert_eq!(
            parallel.execute(&mut run(&mut agent, 0.2)),
            GoalResult::InProgress
        );
        assert_eq!(
            parallel.execute(&mut run(&mut agent, 0.2)),
            GoalResult::Succeeded
        );
    }

    #[test]
    fn test_parallel_fails_if_any_child_failed() {
        let mut agent = TestAgent::default();
        let mut parallel = Parallel::new(vec![
            Box::new(Wait::new(0.3)),
            Box::new(Animate::new("sit")),
        ]);

        // The animate child fails immediately; the wait still runs out
        assert_eq!(
            parallel.execute(&mut run(&mut agent, 0.2)),
            GoalResult::InProgress
        );
        assert_eq!(
            parallel.execute(&mut run(&mut agent, 0.2)),
            GoalResult::Failed
        );
    }

    #[test]
    fn test_parallel_reset_restores_children() {
        let mut agent = TestAgent::default();
        let mut parallel = Parallel::new(vec![Box::new(Wait::new(0.1))]);

        assert_eq!(
            parallel.execute(&mut run(&mut agent, 0.2)),
            GoalResult::Succeeded
        );
        parallel.reset();
        assert_eq!(
            parallel.execute(&mut run(&mut agent, 0.05)),
            GoalResult::InProgress
        );
    }
}
