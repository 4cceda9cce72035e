//! Vigil Core - Shared AI Runtime Primitives
//!
//! This crate provides the small vocabulary every other vigil crate speaks:
//! entity handles, actor class masks and alertness levels.
//!
//! # Features
//!
//! - Opaque entity handles with a reserved null id
//! - Actor class registry with action-name mask derivation
//! - Alertness vocabulary for eligibility checks

pub mod alert;
pub mod class;
pub mod entity;

pub mod prelude {
    pub use crate::alert::Alertness;
    pub use crate::class::{ClassMask, ClassRegistry};
    pub use crate::entity::EntityId;
}

pub use prelude::*;
