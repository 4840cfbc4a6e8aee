//! Congestion history accumulated across rip-up iterations.
//!
//! The scoreboard counts, for the whole run, how often each wire and pip
//! has been fought over, and how often each (net, resource) pair has been
//! involved. The search adds these counts, scaled by the current rip-up
//! penalty, to the cost of routing through an occupied resource — so
//! resources with a history of contention get progressively more expensive
//! and nets negotiate their way to disjoint paths. Counters only ever grow.

use std::collections::HashMap;
use weft_common::Ident;
use weft_device::{PipId, WireId};

/// Per-resource and per-(net, resource) contention counters.
///
/// Missing entries read as zero; increments create entries on demand.
#[derive(Debug, Default)]
pub struct RipupScoreboard {
    wire_scores: HashMap<WireId, u32>,
    pip_scores: HashMap<PipId, u32>,
    net_wire_scores: HashMap<(Ident, WireId), u32>,
    net_pip_scores: HashMap<(Ident, PipId), u32>,
}

impl RipupScoreboard {
    /// Creates an empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how often `wire` has been contended.
    pub fn wire_score(&self, wire: WireId) -> u32 {
        self.wire_scores.get(&wire).copied().unwrap_or(0)
    }

    /// Returns how often `pip` has been contended.
    pub fn pip_score(&self, pip: PipId) -> u32 {
        self.pip_scores.get(&pip).copied().unwrap_or(0)
    }

    /// Returns how often `net` has been involved in a fight over `wire`.
    pub fn net_wire_score(&self, net: Ident, wire: WireId) -> u32 {
        self.net_wire_scores.get(&(net, wire)).copied().unwrap_or(0)
    }

    /// Returns how often `net` has been involved in a fight over `pip`.
    pub fn net_pip_score(&self, net: Ident, pip: PipId) -> u32 {
        self.net_pip_scores.get(&(net, pip)).copied().unwrap_or(0)
    }

    /// Increments the contention count of `wire`.
    pub fn bump_wire(&mut self, wire: WireId) {
        *self.wire_scores.entry(wire).or_insert(0) += 1;
    }

    /// Increments the contention count of `pip`.
    pub fn bump_pip(&mut self, pip: PipId) {
        *self.pip_scores.entry(pip).or_insert(0) += 1;
    }

    /// Increments the contention count of `net` on `wire`.
    pub fn bump_net_wire(&mut self, net: Ident, wire: WireId) {
        *self.net_wire_scores.entry((net, wire)).or_insert(0) += 1;
    }

    /// Increments the contention count of `net` on `pip`.
    pub fn bump_net_pip(&mut self, net: Ident, pip: PipId) {
        *self.net_pip_scores.entry((net, pip)).or_insert(0) += 1;
    }
}
