//! Goal operation primitives

use serde::{Deserialize, Serialize};
use vigil_core::EntityId;

/// Outcome of polling a goal operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalResult {
    /// Operation needs more ticks
    InProgress,
    /// Operation completed successfully
    Succeeded,
    /// Operation completed unsuccessfully
    Failed,
    /// Operation completed; the outcome does not matter to the pipe
    Done,
}

impl GoalResult {
    /// Whether the operation has finished, regardless of outcome
    pub fn is_finished(&self) -> bool {
        !matches!(self, GoalResult::InProgress)
    }
}

/// Per-tick execution context handed to goal operations
pub struct OpRun<'a> {
    /// Actor executing the pipe
    pub actor: EntityId,
    /// Target entity the pipe was started against
    pub target: EntityId,
    /// Seconds covered by this step
    pub dt: f32,
    /// Effector surface for world side effects
    pub agent: &'a mut dyn AgentCtx,
}

/// Effector surface goal operations act through
pub trait AgentCtx {
    /// Resolve an entity position
    fn position(&self, id: EntityId) -> Option<[f32; 3]>;
    /// Aim the actor's gaze at a world point
    fn set_look_target(&mut self, actor: EntityId, pos: [f32; 3]);
    /// Drop the actor's gaze override
    fn clear_look_target(&mut self, actor: EntityId);
    /// Begin a named animation; false when the request is refused
    fn start_animation(&mut self, actor: EntityId, name: &str) -> bool;
    /// Whether a previously started animation has finished
    fn animation_finished(&self, actor: EntityId, name: &str) -> bool;
    /// Send a named signal to the actor's behavior logic
    fn send_signal(&mut self, actor: EntityId, name: &str);
}

/// Agent surface that ignores every effect
#[derive(Debug, Default)]
pub struct NullAgent;

impl AgentCtx for NullAgent {
    fn position(&self, _id: EntityId) -> Option<[f32; 3]> {
        None
    }

    fn set_look_target(&mut self, _actor: EntityId, _pos: [f32; 3]) {}

    fn clear_look_target(&mut self, _actor: EntityId) {}

    fn start_animation(&mut self, _actor: EntityId, _name: &str) -> bool {
        false
    }

    fn animation_finished(&self, _actor: EntityId, _name: &str) -> bool {
        true
    }

    fn send_signal(&mut self, _actor: EntityId, _name: &str) {}
}

/// A pollable, resumable behavior step.
///
/// Operations never block; every poll does a cheap bounded amount of
/// work and reports whether the step still needs time.
pub trait GoalOp {
    /// Advance the operation by one think tick
    fn execute(&mut self, run: &mut OpRun<'_>) -> GoalResult;

    /// Cheap step run every update regardless of the think cadence
    fn execute_dry(&mut self, run: &mut OpRun<'_>) {
        let _ = run;
    }

    /// Return to the freshly constructed state
    fn reset(&mut self);
}
