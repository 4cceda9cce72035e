//! Actor alertness vocabulary

/// How worked up an AI actor currently is.
///
/// Interest scanning only runs for relaxed actors; alarmed and fighting
/// actors have better things to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alertness {
    /// Calm, routine behavior
    Relaxed,
    /// Suspicious, investigating a disturbance
    Alarmed,
    /// Actively engaged in combat
    Combat,
}

impl Alertness {
    /// Whether the actor is calm enough to scan for points of interest
    #[inline]
    pub fn is_relaxed(&self) -> bool {
        matches!(self, Alertness::Relaxed)
    }
}

impl Default for Alertness {
    fn default() -> Self {
        Alertness::Relaxed
    }
}
