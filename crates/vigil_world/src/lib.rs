//! Vigil World - Engine Facade for the AI Runtime
//!
//! The AI core never talks to an engine directly. Everything it needs from
//! the world - transforms, line of sight, actor status, scripted
//! properties, lifecycle events - comes through the narrow traits in this
//! crate. Embedders implement them over their own engine; `SceneWorld`
//! is a small in-memory implementation used by tests and headless tools.
//!
//! # Features
//!
//! - `WorldQuery` / `SmartUseQuery` read-only world access
//! - Scripted property tables with archetype/instance resolution
//! - State tag and debug text sinks
//! - Proxy look-target points with save-stable identity
//! - Entity lifecycle events
//!
//! # Example
//!
//! ```ignore
//! use vigil_world::prelude::*;
//!
//! let mut world = SceneWorld::new();
//! let door = world.add_entity(SceneEntity::at([4.0, 0.0, 0.0]));
//! assert_eq!(world.position(door), Some([4.0, 0.0, 0.0]));
//! ```

pub mod events;
pub mod props;
pub mod proxy;
pub mod query;
pub mod scene;
pub mod tags;

pub mod prelude {
    pub use crate::events::WorldEvent;
    pub use crate::props::{ActorProps, InterestProps, PropValue, PropertySource, PropertyTable};
    pub use crate::proxy::{PointTable, ProxyPoints};
    pub use crate::query::{ActorInfo, SmartUseQuery, WorldQuery};
    pub use crate::scene::{SceneActor, SceneEntity, SceneWorld};
    pub use crate::tags::{NullTags, StateTag, TagRecorder, TagSink};
}

pub use prelude::*;
