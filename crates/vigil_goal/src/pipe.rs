//! Serializable pipe descriptions and their runtime form
//!
//! Behavior content ships as data: a [`PipeSpec`] names a sequence of
//! [`OpSpec`] steps, an [`OpFactory`] turns each step into a live
//! [`GoalOp`], and the resulting [`GoalPipe`] is polled to completion.

use serde::{Deserialize, Serialize};

use crate::op::{GoalOp, GoalResult, OpRun};
use crate::ops::{Animate, LookAt, Parallel, Signal, Wait};

/// One serializable pipe step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpSpec {
    /// Hold for a fixed number of seconds
    Wait {
        /// Duration in seconds
        seconds: f32,
    },
    /// Face the pipe target for a fixed number of seconds
    LookAt {
        /// Duration in seconds
        duration: f32,
    },
    /// Play a named animation to completion
    Animate {
        /// Animation clip name
        name: String,
    },
    /// Fire a named behavior signal
    Signal {
        /// Signal name
        name: String,
    },
    /// Run child steps simultaneously until all finish
    Parallel(Vec<OpSpec>),
    /// Embedder-defined step resolved by the factory
    Custom(String),
}

/// A named, serializable sequence of pipe steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeSpec {
    /// Action name the step sequence is filed under
    pub name: String,
    /// Steps in execution order
    pub ops: Vec<OpSpec>,
}

impl PipeSpec {
    /// Create a spec from a name and its steps
    pub fn new(name: impl Into<String>, ops: Vec<OpSpec>) -> Self {
        Self {
            name: name.into(),
            ops,
        }
    }
}

/// Builds runtime operations from their serializable form
pub trait OpFactory {
    /// Instantiate one step; `None` when the spec is not recognized
    fn build(&self, spec: &OpSpec) -> Option<Box<dyn GoalOp>>;
}

/// Handler resolving [`OpSpec::Custom`] names to operations
pub type CustomOpFn = dyn Fn(&str) -> Option<Box<dyn GoalOp>>;

/// Factory covering the builtin operations.
///
/// `Custom` specs are routed through an optional handler; without one
/// they fail to build, which fails the launch rather than the pipe.
#[derive(Default)]
pub struct StandardOps {
    custom: Option<Box<CustomOpFn>>,
}

impl StandardOps {
    /// Factory for the builtins only
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with a handler for `Custom` steps
    pub fn with_custom(handler: Box<CustomOpFn>) -> Self {
        Self {
            custom: Some(handler),
        }
    }
}

impl OpFactory for StandardOps {
    fn build(&self, spec: &OpSpec) -> Option<Box<dyn GoalOp>> {
        match spec {
            OpSpec::Wait { seconds } => Some(Box::new(Wait::new(*seconds))),
            OpSpec::LookAt { duration } => Some(Box::new(LookAt::new(*duration))),
            OpSpec::Animate { name } => Some(Box::new(Animate::new(name.clone()))),
            OpSpec::Signal { name } => Some(Box::new(Signal::new(name.clone()))),
            OpSpec::Parallel(children) => {
                let built: Option<Vec<_>> = children.iter().map(|c| self.build(c)).collect();
                Some(Box::new(Parallel::new(built?)))
            }
            OpSpec::Custom(name) => self.custom.as_ref().and_then(|f| f(name)),
        }
    }
}

/// An instantiated pipe: live operations plus a cursor.
///
/// Steps run in order; a step that reports success or done hands over
/// to the next one within the same poll, so zero-length steps cost no
/// extra ticks. A failed step fails the whole pipe.
pub struct GoalPipe {
    ops: Vec<Box<dyn GoalOp>>,
    cursor: usize,
}

impl GoalPipe {
    /// Instantiate a spec through a factory.
    ///
    /// `None` when any step fails to build; a pipe never starts with
    /// holes in it.
    pub fn from_spec(spec: &PipeSpec, factory: &dyn OpFactory) -> Option<Self> {
        let ops: Option<Vec<_>> = spec.ops.iter().map(|s| factory.build(s)).collect();
        Some(Self {
            ops: ops?,
            cursor: 0,
        })
    }

    /// Index of the step currently running
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether every step has finished or the pipe was failed/canceled
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.ops.len()
    }

    /// Poll the current step, advancing past finished ones
    pub fn tick(&mut self, run: &mut OpRun<'_>) -> GoalResult {
        while self.cursor < self.ops.len() {
            match self.ops[self.cursor].execute(run) {
                GoalResult::InProgress => return GoalResult::InProgress,
                GoalResult::Failed => {
                    self.cursor = self.ops.len();
                    return GoalResult::Failed;
                }
                GoalResult::Succeeded | GoalResult::Done => self.cursor += 1,
            }
        }
        GoalResult::Succeeded
    }

    /// Run the current step's cheap dry pass
    pub fn tick_dry(&mut self, run: &mut OpRun<'_>) {
        if self.cursor < self.ops.len() {
            self.ops[self.cursor].execute_dry(run);
        }
    }

    /// Stop the pipe where it stands
    pub fn cancel(&mut self) {
        if self.cursor < self.ops.len() {
            self.ops[self.cursor].reset();
        }
        self.cursor = self.ops.len();
    }

    /// Return every step to its initial state and rewind the cursor
    pub fn reset(&mut self) {
        for op in &mut self.ops {
            op.reset();
        }
        self.cursor = 0;
    }
}
