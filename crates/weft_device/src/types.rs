//! Shared data types for the device delay model and the routing database.

use crate::ids::PipId;
use serde::{Deserialize, Serialize};

/// A propagation delay with fast/slow corners, in nanoseconds.
///
/// The search cost model consumes the corner average via [`avg_ns`](Self::avg_ns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    /// Minimum delay (fast corner).
    pub min_ns: f64,
    /// Maximum delay (slow corner).
    pub max_ns: f64,
}

impl Delay {
    /// A zero delay.
    pub const ZERO: Self = Self {
        min_ns: 0.0,
        max_ns: 0.0,
    };

    /// Creates a delay with the given corner values.
    pub fn new(min_ns: f64, max_ns: f64) -> Self {
        Self { min_ns, max_ns }
    }

    /// Creates a delay with both corners equal.
    pub fn flat(ns: f64) -> Self {
        Self {
            min_ns: ns,
            max_ns: ns,
        }
    }

    /// Returns the corner average, the value the router costs paths with.
    pub fn avg_ns(&self) -> f64 {
        (self.min_ns + self.max_ns) / 2.0
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::ZERO
    }
}

/// The strength of a wire or pip binding.
///
/// The router only ever places [`Weak`](Self::Weak) bindings and only ever
/// releases them. Stronger values come from user constraints and lock the
/// resource against the router: an attempt to release one is a fatal error,
/// and the conflict queries report no evictable owner for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strength {
    /// Router-placed, router-removable.
    Weak,
    /// Constraint-placed; locked against the router.
    Strong,
    /// Fixed by the user; never removable.
    Fixed,
}

/// One wire's entry in a net's claimed-resource map.
///
/// Records how the net enters the wire: through `pip`, or directly (the
/// net's source wire) when `pip` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundSegment {
    /// The pip driving this wire, or `None` for a source wire.
    pub pip: Option<PipId>,
    /// The strength the wire is held at.
    pub strength: Strength,
}
