//! Per-actor interest settings

use serde::{Deserialize, Serialize};

/// Cosine of half the default 270 degree acceptance cone
pub const DEFAULT_ANGLE_COS: f32 = -std::f32::consts::FRAC_1_SQRT_2;

/// How an actor participates in interest selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSettings {
    /// Master switch for this actor
    pub enabled: bool,
    /// Minimum accepted score; candidates must beat this floor
    pub filter: f32,
    /// Cosine of half the acceptance cone around the actor's facing
    pub angle_cos: f32,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: 0.0,
            angle_cos: DEFAULT_ANGLE_COS,
        }
    }
}

/// Partial update for actor settings; unset fields keep their value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    /// New master switch state
    pub enabled: Option<bool>,
    /// New score floor
    pub filter: Option<f32>,
    /// New cone cosine
    pub angle_cos: Option<f32>,
}

impl SettingsUpdate {
    /// Update that changes nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the master switch
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the score floor
    pub fn with_filter(mut self, filter: f32) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the cone cosine directly
    pub fn with_angle_cos(mut self, angle_cos: f32) -> Self {
        self.angle_cos = Some(angle_cos);
        self
    }

    /// Map the legacy scripted convention onto explicit optionals.
    ///
    /// The scripted angle is the full cone in degrees; negative values
    /// mean "keep the current value". The sentinel test runs on degrees
    /// because a legitimate cone cosine is frequently negative.
    pub fn from_sentinels(enabled: bool, filter: f32, angle_degrees: f32) -> Self {
        Self {
            enabled: Some(enabled),
            filter: (filter >= 0.0).then_some(filter),
            angle_cos: (angle_degrees >= 0.0).then(|| cone_cos(angle_degrees)),
        }
    }

    /// Apply onto settings, reporting whether anything changed
    pub fn apply(&self, settings: &mut ActorSettings) -> bool {
        let mut changed = false;
        if let Some(enabled) = self.enabled {
            changed |= settings.enabled != enabled;
            settings.enabled = enabled;
        }
        if let Some(filter) = self.filter {
            changed |= settings.filter != filter;
            settings.filter = filter;
        }
        if let Some(angle_cos) = self.angle_cos {
            changed |= settings.angle_cos != angle_cos;
            settings.angle_cos = angle_cos;
        }
        changed
    }
}

/// Cosine of half a full cone given in degrees
pub fn cone_cos(full_angle_degrees: f32) -> f32 {
    (full_angle_degrees * 0.5).to_radians().cos()
}
