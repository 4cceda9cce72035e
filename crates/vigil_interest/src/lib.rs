//! Vigil Interest - Ambient Interest Management
//!
//! This crate decides what idle AI actors look at and interact with.
//! Level entities register as interesting; actors get a personal
//! selection machine each; a central manager schedules re-evaluation
//! under a fixed per-pass budget so cost stays flat as worlds grow.
//!
//! # Features
//!
//! - Central manager with budgeted round-robin scheduling
//! - Per-actor selection with distance-weighted scoring and cones
//! - Exclusive and shared interesting objects
//! - Scripted action launches with listener notifications
//! - Snapshot save/load preserving fairness and tie-breaking
//!
//! # Example
//!
//! ```ignore
//! use vigil_interest::prelude::*;
//!
//! let mut cim = Cim::new(InterestConfig::default());
//! cim.register_interesting(
//!     bench,
//!     &InterestUpdate::none().with_radius(12.0).with_interest(5.0),
//!     &mut env,
//! );
//! cim.register_actor(guard, &mut env);
//! cim.update(dt, &mut env);
//! ```

pub mod action;
pub mod cim;
pub mod config;
pub mod env;
pub mod events;
pub mod ledger;
pub mod pim;
pub mod record;
pub mod settings;
pub mod snapshot;

pub mod prelude {
    pub use crate::action::{ActionDispatcher, ActionEvent, NullDispatcher};
    pub use crate::cim::{Cim, PassStats};
    pub use crate::config::{
        AlwaysNear, CameraProximity, InterestConfig, NeverNear, ProximityPolicy,
    };
    pub use crate::env::InterestEnv;
    pub use crate::events::{InterestEvent, InterestEventKind, InterestListener, ListenerRegistry};
    pub use crate::ledger::SelectionLedger;
    pub use crate::pim::Pim;
    pub use crate::record::{InterestRecord, InterestUpdate, RecordPool, UpsertOutcome};
    pub use crate::settings::{cone_cos, ActorSettings, SettingsUpdate, DEFAULT_ANGLE_COS};
    pub use crate::snapshot::{
        read_snapshot, write_snapshot, CimSnapshot, PimState, SnapshotError, SnapshotFormat,
        SNAPSHOT_VERSION,
    };
}

pub use prelude::*;
