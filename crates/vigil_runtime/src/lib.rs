//! Vigil Runtime - The AI Layer as One Object
//!
//! Embedders create a single [`AiRuntime`] and drive it from the main
//! loop. It owns the interest manager and the action host, wires host
//! completions back into interest selection, and re-exports the public
//! surfaces of the underlying crates so most embeddings need only this
//! crate.
//!
//! # Example
//!
//! ```ignore
//! use vigil_runtime::prelude::*;
//!
//! let mut ai = AiRuntime::new(InterestConfig::default(), Box::new(AlwaysNear));
//! ai.add_action(PipeSpec::new("inspect", vec![OpSpec::LookAt { duration: 2.0 }]));
//! loop {
//!     ai.tick(dt, &mut env);
//! }
//! ```

pub mod runtime;

pub mod prelude {
    pub use crate::runtime::{AiRuntime, RuntimeEnv};
    pub use vigil_core::{Alertness, ClassMask, ClassRegistry, EntityId};
    pub use vigil_goal::prelude::*;
    pub use vigil_interest::prelude::*;
    pub use vigil_world::prelude::*;
}

pub use prelude::*;
