use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies an occasion (node) in the causal graph.
    pub struct OccasionId;

    /// Identifies a cause (edge) in the causal graph.
    pub struct CauseId;
}

/// Identifies a unit (node) of the simulated interaction network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UnitId {
    fn from(value: u32) -> Self {
        UnitId(value)
    }
}
