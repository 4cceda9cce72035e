//! Scheduler configuration and proximity policies

use serde::{Deserialize, Serialize};
use vigil_core::EntityId;

/// Configuration for the central interest manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestConfig {
    /// Seconds between scheduling passes
    pub update_interval: f32,
    /// Maximum number of actors serviced per pass
    pub max_pims_per_pass: usize,
    /// Maximum visibility rays cast per pass
    pub ray_budget_per_pass: u32,
    /// Whether visibility rays are cast at all
    pub raycasts_enabled: bool,
    /// Range of the default camera proximity policy
    pub camera_range: f32,
    /// Initial record pool reservation
    pub initial_record_capacity: usize,
    /// Emit per-entity debug text through the tag sink
    pub debug_tags: bool,
    /// This process runs AI authoritatively and should react to entity
    /// lifecycle events (false on non-authoritative multiplayer clients)
    pub ai_authority: bool,
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self {
            update_interval: 0.1,
            max_pims_per_pass: 2,
            ray_budget_per_pass: 4,
            raycasts_enabled: true,
            camera_range: 30.0,
            initial_record_capacity: 64,
            debug_tags: false,
            ai_authority: true,
        }
    }
}

impl InterestConfig {
    /// Config for a headless server: every actor is always worth a
    /// visibility evaluation and no camera exists
    pub fn server() -> Self {
        Self {
            camera_range: f32::MAX,
            ..Default::default()
        }
    }

    /// Config for a client without authoritative AI
    pub fn headless_client() -> Self {
        Self {
            ai_authority: false,
            ..Default::default()
        }
    }

    /// Set the pass interval
    pub fn with_update_interval(mut self, seconds: f32) -> Self {
        self.update_interval = seconds;
        self
    }

    /// Set the per-pass actor budget
    pub fn with_max_pims_per_pass(mut self, count: usize) -> Self {
        self.max_pims_per_pass = count;
        self
    }

    /// Set the per-pass ray budget
    pub fn with_ray_budget(mut self, rays: u32) -> Self {
        self.ray_budget_per_pass = rays;
        self
    }

    /// Enable or disable visibility rays
    pub fn with_raycasts(mut self, enabled: bool) -> Self {
        self.raycasts_enabled = enabled;
        self
    }

    /// Enable or disable debug text emission
    pub fn with_debug_tags(mut self, enabled: bool) -> Self {
        self.debug_tags = enabled;
        self
    }

    /// Set whether this process owns AI lifecycle handling
    pub fn with_ai_authority(mut self, authority: bool) -> Self {
        self.ai_authority = authority;
        self
    }
}

/// Decides whether an actor is worth an expensive visibility evaluation
/// this pass.
///
/// The classic single-player policy is distance to the render camera;
/// servers and split-screen hosts plug in their own notion of "near a
/// viewer" instead.
pub trait ProximityPolicy {
    /// Whether `actor` at `pos` should run visibility checks now
    fn worth_visibility_checks(&self, actor: EntityId, pos: [f32; 3]) -> bool;
}

/// Proximity to a single camera position
#[derive(Debug, Clone, Copy)]
pub struct CameraProximity {
    /// Camera world position
    pub camera: [f32; 3],
    /// Acceptance range
    pub range: f32,
}

impl CameraProximity {
    /// Create a policy around a camera position
    pub fn new(camera: [f32; 3], range: f32) -> Self {
        Self { camera, range }
    }
}

impl ProximityPolicy for CameraProximity {
    fn worth_visibility_checks(&self, _actor: EntityId, pos: [f32; 3]) -> bool {
        let dx = pos[0] - self.camera[0];
        let dy = pos[1] - self.camera[1];
        let dz = pos[2] - self.camera[2];
        dx * dx + dy * dy + dz * dz <= self.range * self.range
    }
}

/// Every actor is always near
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysNear;

impl ProximityPolicy for AlwaysNear {
    fn worth_visibility_checks(&self, _actor: EntityId, _pos: [f32; 3]) -> bool {
        true
    }
}

/// No actor is ever near
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverNear;

impl ProximityPolicy for NeverNear {
    fn worth_visibility_checks(&self, _actor: EntityId, _pos: [f32; 3]) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InterestConfig::default();
        assert_eq!(config.update_interval, 0.1);
        assert_eq!(config.max_pims_per_pass, 2);
        assert!(config.raycasts_enabled);
        assert!(config.ai_authority);
    }

    #[test]
    fn test_presets() {
        assert_eq!(InterestConfig::server().camera_range, f32::MAX);
        assert!(!InterestConfig::headless_client().ai_authority);
    }

    #[test]
    fn test_camera_proximity() {
        let policy = CameraProximity::new([0.0, 0.0, 0.0], 10.0);
        let actor = EntityId::new(1);

        assert!(policy.worth_visibility_checks(actor, [3.0, 0.0, 0.0]));
        assert!(policy.worth_visibility_checks(actor, [10.0, 0.0, 0.0]));
        assert!(!policy.worth_visibility_checks(actor, [10.1, 0.0, 0.0]));
    }
}
