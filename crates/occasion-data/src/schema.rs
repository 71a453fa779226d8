//! Serde structs for the on-disk run format.
//!
//! These mirror the tidied place and transition tables one record per row.
//! They are deserialized from RON, JSON, or TOML files and then converted
//! into core tables by [`crate::run`].

use serde::{Deserialize, Serialize};

// ===========================================================================
// Places
// ===========================================================================

/// One sampled token count of a state at a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Sample index. Numbered from the distinct times when any record
    /// omits it.
    #[serde(default)]
    pub tstep: Option<u64>,
    pub time: f64,
    /// Row kind from the tidy step. Must be `"place"` when present.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// State label.
    pub name: String,
    /// Unit number. Absent on aggregate (uncoloured) sums.
    #[serde(default)]
    pub num: Option<u32>,
    pub count: u32,
}

// ===========================================================================
// Transitions
// ===========================================================================

/// One sampled firing count of a transition instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    #[serde(default)]
    pub tstep: Option<u64>,
    pub time: f64,
    pub name: String,
    /// Firing unit. Absent when the column could not be attributed.
    #[serde(default)]
    pub unit: Option<u32>,
    #[serde(default)]
    pub neighbour: Option<u32>,
    #[serde(default)]
    pub neighbour2: Option<u32>,
    pub count: u32,
}

// ===========================================================================
// Analysis configuration
// ===========================================================================

/// Optional per-run settings read from `analysis.{ron,json,toml}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sampling interval. Inferred from the place table when absent.
    pub time_per_step: Option<f64>,
    /// Keep only these states. Empty keeps all.
    pub place_names: Vec<String>,
    /// Keep only these transitions. Empty keeps all.
    pub transition_names: Vec<String>,
    /// Drop place rows with no unit instead of rejecting them.
    pub drop_non_coloured_sums: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_per_step: None,
            place_names: Vec::new(),
            transition_names: Vec::new(),
            drop_non_coloured_sums: true,
        }
    }
}
