//! Scripted action boundary

use vigil_core::EntityId;

/// Lifecycle notification from the scripted action facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    /// The action began executing
    Started,
    /// The action ran to completion
    Finished,
    /// The action was canceled by its owner
    Canceled,
    /// The action failed or was torn down
    Aborted,
}

/// Launches scripted actions on behalf of actors.
///
/// The interest core treats the action system as a fire-and-report
/// collaborator: every accepted launch must eventually come back through
/// [`Cim::on_action_event`] as finished, canceled or aborted, or the
/// selecting actor stays suppressed forever.
///
/// [`Cim::on_action_event`]: crate::cim::Cim::on_action_event
pub trait ActionDispatcher {
    /// Start `action` for `actor` against `target`.
    ///
    /// Returns whether the action actually started.
    fn launch(&mut self, action: &str, actor: EntityId, target: EntityId) -> bool;
}

/// Dispatcher that refuses every launch
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl ActionDispatcher for NullDispatcher {
    fn launch(&mut self, _action: &str, _actor: EntityId, _target: EntityId) -> bool {
        false
    }
}
