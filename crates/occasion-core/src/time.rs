use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of a sampled row in the simulator output (0 for the initial marking).
pub type Tstep = u64;

/// Error returned when a time value is NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("time value {0} is not finite")]
pub struct NonFiniteTime(pub f64);

/// A finite simulation time.
///
/// Wraps an `f64` so it can take part in value equality, hashing and
/// ordering. Equality is exact (no tolerance); `-0.0` is stored as `0.0`.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Wrap a finite value.
    pub fn new(value: f64) -> Result<Self, NonFiniteTime> {
        if !value.is_finite() {
            return Err(NonFiniteTime(value));
        }
        // Adding 0.0 folds -0.0 onto +0.0 so the bit patterns agree.
        Ok(SimTime(value + 0.0))
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// `self + delta`, or `None` if the sum leaves the finite range.
    pub fn checked_add(self, delta: f64) -> Option<SimTime> {
        SimTime::new(self.0 + delta).ok()
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SimTime {}

impl Hash for SimTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for SimTime {
    type Error = NonFiniteTime;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        SimTime::new(value)
    }
}

impl From<SimTime> for f64 {
    fn from(time: SimTime) -> f64 {
        time.0
    }
}

// Printed like a float literal (`2.0`, `5.1`), which is how occasions are
// labelled in exported graphs.
impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
