//! Facade bundle handed into interest calls

use crate::action::ActionDispatcher;
use crate::config::ProximityPolicy;
use vigil_world::{PropertySource, ProxyPoints, SmartUseQuery, TagSink, WorldQuery};

/// Borrowed collaborators for one interest call.
///
/// The manager owns no engine references; everything external is lent to
/// it per call so embedders stay in control of lifetimes and threading.
pub struct InterestEnv<'a> {
    /// World transform and actor lookups
    pub world: &'a dyn WorldQuery,
    /// Scripted property access
    pub props: &'a dyn PropertySource,
    /// Smart-use occupancy
    pub smart: &'a dyn SmartUseQuery,
    /// State tag and debug text sink
    pub tags: &'a mut dyn TagSink,
    /// Proxy look-target allocator
    pub points: &'a mut dyn ProxyPoints,
    /// Scripted action launcher
    pub actions: &'a mut dyn ActionDispatcher,
    /// Visibility-evaluation gate
    pub proximity: &'a dyn ProximityPolicy,
}
