//! Vigil Goal - Pollable Behavior Pipelines
//!
//! Scripted actor behavior runs as goal pipes: named sequences of
//! cheap, resumable operations polled once per tick. Nothing in a pipe
//! blocks; a step that needs time reports in-progress and is asked
//! again next poll. The [`ActionHost`] runs at most one pipe per actor
//! and turns every accepted start into exactly one terminal event.
//!
//! # Features
//!
//! - `GoalOp` trait with full and dry polling plus reset
//! - Builtin wait / look-at / animate / signal / parallel operations
//! - Serializable pipe specs built through an op factory
//! - Per-actor hosting with a staggered think cadence
//!
//! # Example
//!
//! ```
//! use vigil_goal::prelude::*;
//! use vigil_core::EntityId;
//!
//! let mut host = ActionHost::new(HostConfig::default());
//! host.add_action(PipeSpec::new(
//!     "glance",
//!     vec![OpSpec::LookAt { duration: 2.0 }],
//! ));
//! let started = host.start(
//!     "glance",
//!     EntityId::new(1),
//!     EntityId::new(2),
//!     &StandardOps::new(),
//! );
//! assert!(started);
//! ```

pub mod host;
pub mod op;
pub mod ops;
pub mod pipe;

pub mod prelude {
    pub use crate::host::{ActionHost, HostConfig, HostEvent, HostEventKind};
    pub use crate::op::{AgentCtx, GoalOp, GoalResult, NullAgent, OpRun};
    pub use crate::ops::{Animate, LookAt, Parallel, Signal, Wait};
    pub use crate::pipe::{CustomOpFn, GoalPipe, OpFactory, OpSpec, PipeSpec, StandardOps};
}

pub use prelude::*;
