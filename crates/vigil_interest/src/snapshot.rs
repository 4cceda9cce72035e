//! Interest state snapshots
//!
//! Selection state is deliberately small: the record pool with its slot
//! order, each seat's selection machine and the scheduler clock. Engine
//! side effects (state tags, proxy points, exclusivity holds) are not
//! stored; they are rebuilt during restore. Listener subscriptions are
//! process wiring and never serialize.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::cim::Cim;
use crate::env::InterestEnv;
use crate::pim::Pim;
use crate::record::RecordPool;
use crate::settings::ActorSettings;
use vigil_core::EntityId;
use vigil_world::StateTag;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Version mismatch
    #[error("Version mismatch: snapshot version {0}, current version {1}")]
    VersionMismatch(u32, u32),
}

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotFormat {
    /// JSON (human readable)
    Json,
    /// Binary (compact)
    Binary,
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self::Binary
    }
}

/// Serialized per-seat selection state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PimState {
    /// Served actor, null for a vacated seat
    pub actor: EntityId,
    /// Selected object
    pub target: EntityId,
    /// Most recently abandoned object
    pub last_target: EntityId,
    /// When the last target was abandoned
    pub last_target_time: f64,
    /// Gaze offset frozen at selection time
    pub frozen_offset: [f32; 3],
    /// Proxy point id
    pub dummy: EntityId,
    /// Proxy point position at capture time
    pub dummy_pos: Option<[f32; 3]>,
    /// Actor settings
    pub settings: ActorSettings,
    /// Scripted action in flight
    pub action_running: bool,
}

/// Complete serialized interest state.
///
/// Seats and record slots keep their order, so scheduling fairness and
/// tie-breaking behave identically after a load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CimSnapshot {
    /// Snapshot format version
    pub version: u32,
    /// Simulation clock
    pub time: f64,
    /// Time left until the next scheduling pass
    pub accumulator: f32,
    /// Next seat the round robin will visit
    pub cursor: usize,
    /// Record pool including free slots
    pub records: RecordPool,
    /// Every seat, vacated ones included
    pub pims: Vec<PimState>,
}

impl Cim {
    /// Capture the full runtime state
    pub fn snapshot(&self, env: &InterestEnv<'_>) -> CimSnapshot {
        let pims = self
            .pims
            .iter()
            .map(|p| {
                let mut state = p.state();
                if !state.dummy.is_null() {
                    state.dummy_pos = env.points.point_pos(state.dummy);
                }
                state
            })
            .collect();
        CimSnapshot {
            version: SNAPSHOT_VERSION,
            time: self.time,
            accumulator: self.accumulator,
            cursor: self.cursor,
            records: self.records.clone(),
            pims,
        }
    }

    /// Replace the runtime state with a snapshot's.
    ///
    /// Current state is torn down first (listener subscriptions
    /// included), then tags, proxy points and exclusivity holds are
    /// rebuilt from the restored selections. Proxy points come back
    /// under their original ids. Subscribe listeners after restoring.
    pub fn restore(
        &mut self,
        snapshot: &CimSnapshot,
        env: &mut InterestEnv<'_>,
    ) -> Result<(), SnapshotError> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch(snapshot.version, SNAPSHOT_VERSION));
        }
        self.reset(env);
        self.records = snapshot.records.clone();
        self.pims = snapshot.pims.iter().map(Pim::from_state).collect();
        self.time = snapshot.time;
        self.accumulator = snapshot.accumulator;
        self.cursor = snapshot.cursor;

        for (_, record) in self.records.iter_valid() {
            env.tags.set_tag(record.entity, StateTag::Registered);
        }
        for state in &snapshot.pims {
            if state.actor.is_null() {
                continue;
            }
            env.tags.set_tag(state.actor, StateTag::RegisteredActor);
            if !state.dummy.is_null() {
                let pos = state.dummy_pos.unwrap_or([0.0, 0.0, 0.0]);
                env.points.restore_point(state.dummy, pos);
            }
            if !state.target.is_null() {
                let exclusive = self
                    .records
                    .get(state.target)
                    .map(|r| r.shared == 0)
                    .unwrap_or(false);
                if exclusive {
                    self.ledger.acquire(state.target, state.actor);
                }
            }
        }
        log::info!(
            "interest state restored: {} records, {} actors",
            self.records.len(),
            self.actor_count()
        );
        Ok(())
    }
}

/// Write a snapshot to disk
pub fn write_snapshot(
    path: &Path,
    snapshot: &CimSnapshot,
    format: SnapshotFormat,
) -> Result<(), SnapshotError> {
    let bytes = match format {
        SnapshotFormat::Json => serde_json::to_vec_pretty(snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?,
        SnapshotFormat::Binary => bincode::serialize(snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?,
    };
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a snapshot from disk
pub fn read_snapshot(path: &Path, format: SnapshotFormat) -> Result<CimSnapshot, SnapshotError> {
    let bytes = fs::read(path)?;
    let snapshot: CimSnapshot = match format {
        SnapshotFormat::Json => serde_json::from_slice(&bytes)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?,
        SnapshotFormat::Binary => bincode::deserialize(&bytes)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?,
    };
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch(snapshot.version, SNAPSHOT_VERSION));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::NullDispatcher;
    use crate::config::{AlwaysNear, InterestConfig};
    use crate::record::InterestUpdate;
    use std::env::temp_dir;
    use vigil_world::{PointTable, ProxyPoints, SceneActor, SceneEntity, SceneWorld, TagRecorder};

    struct Rig {
        world: SceneWorld,
        tags: TagRecorder,
        points: PointTable,
        actions: NullDispatcher,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                world: SceneWorld::new(),
                tags: TagRecorder::new(),
                points: PointTable::new(),
                actions: NullDispatcher,
            }
        }
    }

    macro_rules! with_env {
        ($rig:expr, $env:ident, $body:block) => {{
            let $env = &mut InterestEnv {
                world: &$rig.world,
                props: &$rig.world,
                smart: &$rig.world,
                tags: &mut $rig.tags,
                points: &mut $rig.points,
                actions: &mut $rig.actions,
                proximity: &AlwaysNear,
            };
            $body
        }};
    }

    fn populated() -> (Rig, Cim, EntityId, EntityId) {
        let mut rig = Rig::new();
        let mut cim = Cim::new(InterestConfig::default().with_raycasts(false));
        let target = rig.world.add_entity(SceneEntity::at([0.0, 0.0, 2.0]));
        let actor = rig
            .world
            .add_actor(SceneEntity::at([0.0, 0.0, 0.0]), SceneActor::default());
        with_env!(rig, env, {
            cim.register_interesting(
                target,
                &InterestUpdate::none().with_radius(10.0).with_interest(5.0),
                env,
            );
            cim.register_actor(actor, env);
            cim.update(0.1, env);
        });
        (rig, cim, target, actor)
    }

    #[test]
    fn test_round_trip_preserves_selection() {
        let (mut rig, cim, target, actor) = populated();
        assert!(cim.is_interested(actor));
        let dummy = cim.dummy_point(actor).unwrap();

        let snapshot = with_env!(rig, env, { cim.snapshot(env) });

        // A cold process: fresh manager, fresh engine side state
        let mut restored = Cim::new(InterestConfig::default().with_raycasts(false));
        let mut cold = Rig::new();
        cold.world = rig.world.clone();
        with_env!(cold, env, {
            restored.restore(&snapshot, env).unwrap();
        });

        assert!(restored.is_interested(actor));
        assert_eq!(restored.pim(actor).unwrap().target(), target);
        assert_eq!(restored.time(), cim.time());
        assert_eq!(restored.dummy_point(actor), Some(dummy));
        assert!(cold.points.point_pos(dummy).is_some());
        assert!(cold.tags.has_tag(target, StateTag::Registered));
        assert!(cold.tags.has_tag(actor, StateTag::RegisteredActor));
    }

    #[test]
    fn test_restore_rebuilds_exclusive_holds() {
        let (mut rig, cim, target, actor) = populated();
        let snapshot = with_env!(rig, env, { cim.snapshot(env) });

        let mut restored = Cim::new(InterestConfig::default().with_raycasts(false));
        let mut cold = Rig::new();
        cold.world = rig.world.clone();
        let other = cold
            .world
            .add_actor(SceneEntity::at([1.0, 0.0, 0.0]), SceneActor::default());
        with_env!(cold, env, {
            restored.restore(&snapshot, env).unwrap();
            cim_register_and_pass(&mut restored, other, env);
        });

        // The hold survived the round trip, the newcomer is locked out
        assert!(restored.is_interested(actor));
        assert!(!restored.is_interested(other));
        let _ = target;
    }

    fn cim_register_and_pass(cim: &mut Cim, actor: EntityId, env: &mut InterestEnv<'_>) {
        cim.register_actor(actor, env);
        // Drain the full seat list so the newcomer definitely gets a turn
        cim.update(cim.config().update_interval, env);
        cim.update(cim.config().update_interval, env);
    }

    #[test]
    fn test_slot_order_survives_round_trip() {
        let mut rig = Rig::new();
        let mut cim = Cim::new(InterestConfig::default().with_raycasts(false));
        let ids: Vec<_> = (0..3)
            .map(|i| rig.world.add_entity(SceneEntity::at([i as f32, 0.0, 0.0])))
            .collect();
        with_env!(rig, env, {
            for id in &ids {
                cim.register_interesting(
                    *id,
                    &InterestUpdate::none().with_radius(5.0).with_interest(1.0),
                    env,
                );
            }
            // Free the middle slot; it must stay free across the trip
            cim.deregister_interesting(ids[1], env);
        });

        let snapshot = with_env!(rig, env, { cim.snapshot(env) });
        let mut restored = Cim::new(InterestConfig::default().with_raycasts(false));
        with_env!(rig, env, {
            restored.restore(&snapshot, env).unwrap();
        });

        assert_eq!(restored.records().slot_count(), 3);
        assert_eq!(restored.records().len(), 2);
        // The tombstone is reused before any append
        let fresh = rig.world.add_entity(SceneEntity::at([9.0, 0.0, 0.0]));
        with_env!(rig, env, {
            restored.register_interesting(
                fresh,
                &InterestUpdate::none().with_radius(5.0).with_interest(1.0),
                env,
            );
        });
        assert_eq!(restored.records().slot_count(), 3);
        assert_eq!(restored.records().slot(1).map(|r| r.entity), Some(fresh));
    }

    #[test]
    fn test_version_gate() {
        let (mut rig, cim, _, _) = populated();
        let mut snapshot = with_env!(rig, env, { cim.snapshot(env) });
        snapshot.version = SNAPSHOT_VERSION + 1;

        let mut restored = Cim::default();
        let failed = with_env!(rig, env, { restored.restore(&snapshot, env) });
        assert!(matches!(failed, Err(SnapshotError::VersionMismatch(_, _))));
    }

    #[test]
    fn test_file_round_trip() {
        let (mut rig, cim, _, actor) = populated();
        let snapshot = with_env!(rig, env, { cim.snapshot(env) });

        for (format, name) in [
            (SnapshotFormat::Json, "vigil_interest_test.json"),
            (SnapshotFormat::Binary, "vigil_interest_test.bin"),
        ] {
            let path = temp_dir().join(name);
            write_snapshot(&path, &snapshot, format).unwrap();
            let loaded = read_snapshot(&path, format).unwrap();
            let _ = fs::remove_file(&path);

            assert_eq!(loaded.version, SNAPSHOT_VERSION);
            assert_eq!(loaded.records.len(), snapshot.records.len());
            assert_eq!(loaded.pims.len(), snapshot.pims.len());
            assert_eq!(loaded.pims[0].actor, actor);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = temp_dir().join("vigil_interest_never_written.bin");
        let result = read_snapshot(&path, SnapshotFormat::Binary);
        assert!(matches!(result, Err(SnapshotError::Io(_))));
    }
}
