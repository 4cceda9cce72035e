//! Scripted property tables
//!
//! Level designers mark entities as interesting (or actors as interested)
//! through data, not code. The AI core reads those values through
//! `PropertySource` on lifecycle events. Values it does not find stay at
//! their "unchanged" sentinel so partial data merges cleanly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vigil_core::EntityId;

/// A single scripted property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    Number(f32),
    /// Text value
    Text(String),
    /// 3D vector value
    Vec3([f32; 3]),
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<f32> for PropValue {
    fn from(v: f32) -> Self {
        PropValue::Number(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v as f32)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Text(v.to_string())
    }
}

impl From<[f32; 3]> for PropValue {
    fn from(v: [f32; 3]) -> Self {
        PropValue::Vec3(v)
    }
}

/// String-keyed scripted property table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyTable {
    values: HashMap<String, PropValue>,
}

impl PropertyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(PropValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a numeric value
    pub fn get_number(&self, key: &str) -> Option<f32> {
        match self.values.get(key) {
            Some(PropValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a text value
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PropValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Get a vector value
    pub fn get_vec3(&self, key: &str) -> Option<[f32; 3]> {
        match self.values.get(key) {
            Some(PropValue::Vec3(v)) => Some(*v),
            _ => None,
        }
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Pick the effective interest block from archetype and instance tables.
///
/// The instance block wins wholesale when it carries `overrideArchetype`,
/// otherwise the archetype block wins when present.
pub fn resolve_interest_block<'a>(
    archetype: Option<&'a PropertyTable>,
    instance: Option<&'a PropertyTable>,
) -> Option<&'a PropertyTable> {
    let override_archetype = instance
        .and_then(|t| t.get_bool("overrideArchetype"))
        .unwrap_or(false);
    if override_archetype {
        instance
    } else {
        archetype.or(instance)
    }
}

/// Entity-side interest values parsed from a property table.
///
/// Missing keys stay at the registration sentinels (negative number,
/// empty text, zero vector) meaning "leave unchanged".
#[derive(Debug, Clone, PartialEq)]
pub struct InterestProps {
    /// Participation flag
    pub interesting: bool,
    /// Attraction radius, `-1.0` = unchanged
    pub radius: f32,
    /// Base interest score, `-1.0` = unchanged
    pub interest_level: f32,
    /// Scripted action name, `None` = unchanged
    pub action: Option<String>,
    /// Local gaze-point offset, all-zero = unchanged
    pub offset: [f32; 3],
    /// Reselection cooldown seconds, `-1.0` = unchanged
    pub pause: f32,
    /// Concurrent user count, `-1` = unchanged
    pub shared: i32,
}

impl Default for InterestProps {
    fn default() -> Self {
        Self {
            interesting: false,
            radius: -1.0,
            interest_level: -1.0,
            action: None,
            offset: [0.0, 0.0, 0.0],
            pause: -1.0,
            shared: -1,
        }
    }
}

impl InterestProps {
    /// Parse the entity-side keys of an interest block
    pub fn parse(table: &PropertyTable) -> Self {
        let mut props = Self::default();
        if let Some(v) = table.get_bool("interesting") {
            props.interesting = v;
        }
        if let Some(v) = table.get_number("radius") {
            props.radius = v;
        }
        if let Some(v) = table.get_number("interestLevel") {
            props.interest_level = v;
        }
        if let Some(v) = table.get_text("action") {
            props.action = Some(v.to_string());
        }
        if let Some(v) = table.get_vec3("offset") {
            props.offset = v;
        }
        if let Some(v) = table.get_number("pause") {
            props.pause = v;
        }
        if let Some(v) = table.get_number("shared") {
            props.shared = v as i32;
        }
        props
    }
}

/// Actor-side interest values parsed from a property table
#[derive(Debug, Clone, PartialEq)]
pub struct ActorProps {
    /// Participation flag
    pub interested: bool,
    /// Minimum accepted score, `-1.0` = unchanged
    pub min_interest_level: f32,
    /// Acceptance cone in degrees, `-1.0` = unchanged
    pub angle_degrees: f32,
}

impl Default for ActorProps {
    fn default() -> Self {
        Self {
            interested: false,
            min_interest_level: -1.0,
            angle_degrees: -1.0,
        }
    }
}

impl ActorProps {
    /// Parse the actor-side keys of an interest block
    pub fn parse(table: &PropertyTable) -> Self {
        let mut props = Self::default();
        if let Some(v) = table.get_bool("interested") {
            props.interested = v;
        }
        if let Some(v) = table.get_number("minInterestLevel") {
            props.min_interest_level = v;
        }
        if let Some(v) = table.get_number("angle") {
            props.angle_degrees = v;
        }
        props
    }
}

/// Access to an entity's resolved interest property block
pub trait PropertySource {
    /// The effective interest block for an entity, archetype/instance
    /// resolution already applied. `None` = entity has no interest data.
    fn interest_block(&self, id: EntityId) -> Option<PropertyTable>;
}
