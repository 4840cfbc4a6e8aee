//! Single-source best-first search over the wire graph.
//!
//! The search starts from a set of already-reached source wires (each with
//! an accumulated delay) and expands downhill pips in order of delay plus
//! estimated remaining delay, until a destination wire is settled and the
//! overtime budget is spent. The result is the `visited` predecessor map:
//! if the destination appears in it, following each entry's pip back to
//! its source wire reconstructs the cheapest path found.
//!
//! In strict mode, occupied wires and pips are impassable. In rip-up mode
//! they may be crossed at a surcharge built from the current penalty and
//! the contention history, so a sufficiently desperate net will route
//! straight through a rival and evict it during commit.

use crate::scoreboard::RipupScoreboard;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use weft_common::Ident;
use weft_device::{Context, PipId, WireId};

/// Whether a search may cross resources owned by other nets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// Occupied resources are impassable.
    Strict,
    /// Occupied resources cost a penalty surcharge and their owners are
    /// evicted when the path commits.
    Ripup,
}

/// Visit accounting for one or more searches.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    /// Pips considered.
    pub visits: u64,
    /// Better paths found to an already-visited wire.
    pub revisits: u64,
    /// Revisits that happened after the overtime budget engaged.
    pub overtime_revisits: u64,
}

impl SearchStats {
    /// Folds another tally into this one.
    pub fn absorb(&mut self, other: &SearchStats) {
        self.visits += other.visits;
        self.revisits += other.revisits;
        self.overtime_revisits += other.overtime_revisits;
    }

    /// Revisits as a percentage of visits.
    pub fn revisit_percent(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            100.0 * self.revisits as f64 / self.visits as f64
        }
    }

    /// Overtime revisits as a percentage of visits.
    pub fn overtime_revisit_percent(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            100.0 * self.overtime_revisits as f64 / self.visits as f64
        }
    }
}

/// One settled wire in the predecessor map.
#[derive(Debug, Clone)]
pub(crate) struct QueuedWire {
    pub wire: WireId,
    /// The pip this wire was reached through; `None` for source seeds.
    pub pip: Option<PipId>,
    /// Accumulated delay from the nearest source wire.
    pub delay: f64,
    /// Estimated remaining delay to the destination.
    pub togo: f64,
    /// Tie-break tag; of two equally promising entries, the smaller tag
    /// pops first.
    pub randtag: u32,
}

impl QueuedWire {
    fn promise(&self) -> f64 {
        self.delay + self.togo
    }
}

impl PartialEq for QueuedWire {
    fn eq(&self, other: &Self) -> bool {
        self.promise() == other.promise() && self.randtag == other.randtag
    }
}

impl Eq for QueuedWire {}

impl Ord for QueuedWire {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and we pop cheapest-first.
        other
            .promise()
            .partial_cmp(&self.promise())
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.randtag.cmp(&self.randtag))
    }
}

impl PartialOrd for QueuedWire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single-source search and its reusable result state.
///
/// One `PathSearch` is driven once per destination; `visited` is cleared
/// at the start of each run while the visit statistics accumulate across
/// runs.
pub(crate) struct PathSearch {
    /// The net being routed; `None` for netlist-independent delay probes.
    pub net: Option<Ident>,
    pub mode: RouteMode,
    pub ripup_penalty: f64,
    pub visited: HashMap<WireId, QueuedWire>,
    pub stats: SearchStats,
}

impl PathSearch {
    pub fn new(net: Option<Ident>, mode: RouteMode, ripup_penalty: f64) -> Self {
        Self {
            net,
            mode,
            ripup_penalty,
            visited: HashMap::new(),
            stats: SearchStats::default(),
        }
    }

    /// Searches from `src_wires` towards `dst_wire`.
    ///
    /// Whether the destination was reached is answered by
    /// `self.visited.contains_key(&dst_wire)`; an unreached destination is
    /// not an error.
    pub fn run(
        &mut self,
        ctx: &mut Context<'_>,
        scores: &RipupScoreboard,
        src_wires: &IndexMap<WireId, f64>,
        dst_wire: WireId,
    ) {
        let dev = ctx.device();
        let epsilon = dev.delay_epsilon();

        let mut queue: BinaryHeap<QueuedWire> = BinaryHeap::new();
        self.visited.clear();

        for (&wire, &delay) in src_wires {
            let qw = QueuedWire {
                wire,
                pip: None,
                delay,
                togo: dev.estimate_delay(wire, dst_wire),
                randtag: ctx.rng().next_u32(),
            };
            self.visited.insert(wire, qw.clone());
            queue.push(qw);
        }

        let mut visit_cnt: u64 = 0;
        // Once the destination settles at v visits, the search may spend
        // up to 3v/2 visits total hunting for a cheaper way in.
        let mut visit_limit: Option<u64> = None;

        loop {
            if visit_limit.is_some_and(|limit| visit_cnt >= limit) {
                break;
            }
            let Some(qw) = queue.pop() else { break };
            if visit_limit.is_none() && self.visited.contains_key(&dst_wire) {
                visit_limit = Some(visit_cnt * 3 / 2);
            }
            // A queue entry superseded by a cheaper push is stale.
            if self
                .visited
                .get(&qw.wire)
                .map_or(true, |cur| cur.delay != qw.delay)
            {
                continue;
            }

            for &pip in dev.pips_downhill(qw.wire) {
                visit_cnt += 1;

                let mut next_delay = qw.delay + dev.pip_delay(pip).avg_ns();
                let next_wire = dev.pip_dst_wire(pip);
                let mut crossing_occupied = false;

                if !ctx.check_wire_avail(next_wire) {
                    if self.mode == RouteMode::Strict {
                        continue;
                    }
                    let Some(owner) = ctx.conflicting_wire_net(next_wire) else {
                        continue;
                    };
                    if Some(owner) == self.net {
                        continue;
                    }
                    next_delay +=
                        f64::from(scores.wire_score(next_wire)) * self.ripup_penalty / 8.0;
                    next_delay +=
                        f64::from(scores.net_wire_score(owner, next_wire)) * self.ripup_penalty;
                    crossing_occupied = true;
                }

                if !ctx.check_pip_avail(pip) {
                    if self.mode == RouteMode::Strict {
                        continue;
                    }
                    let Some(owner) = ctx.conflicting_pip_net(pip) else {
                        continue;
                    };
                    if Some(owner) == self.net {
                        continue;
                    }
                    next_delay += f64::from(scores.pip_score(pip)) * self.ripup_penalty / 8.0;
                    next_delay += f64::from(scores.net_pip_score(owner, pip)) * self.ripup_penalty;
                    crossing_occupied = true;
                }

                if crossing_occupied {
                    next_delay += self.ripup_penalty;
                }
                debug_assert!(next_delay >= 0.0);

                if let Some(prev) = self.visited.get(&next_wire) {
                    if prev.delay <= next_delay + epsilon {
                        continue;
                    }
                    if visit_limit.is_none() {
                        self.stats.revisits += 1;
                    } else {
                        self.stats.overtime_revisits += 1;
                    }
                }

                let next_qw = QueuedWire {
                    wire: next_wire,
                    pip: Some(pip),
                    delay: next_delay,
                    togo: dev.estimate_delay(next_wire, dst_wire),
                    randtag: ctx.rng().next_u32(),
                };
                self.visited.insert(next_wire, next_qw.clone());
                queue.push(next_qw);
            }
        }

        self.stats.visits += visit_cnt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::Interner;
    use weft_device::{Delay, Device, ExplicitDevice, Strength};

    fn seeds(pairs: &[(WireId, f64)]) -> IndexMap<WireId, f64> {
        pairs.iter().copied().collect()
    }

    // w0 -> w1 -> w2, plus a slow bypass w0 -> w3 -> w2.
    fn diamond() -> (ExplicitDevice, Vec<WireId>) {
        let mut dev = ExplicitDevice::new();
        let w: Vec<WireId> = (0..4).map(|i| dev.add_wire(&format!("w{i}"))).collect();
        dev.add_pip(w[0], w[1], Delay::flat(1.0));
        dev.add_pip(w[1], w[2], Delay::flat(1.0));
        dev.add_pip(w[0], w[3], Delay::flat(5.0));
        dev.add_pip(w[3], w[2], Delay::flat(5.0));
        (dev, w)
    }

    #[test]
    fn finds_cheapest_path() {
        let interner = Interner::new();
        let (dev, w) = diamond();
        let mut ctx = Context::new(&dev, &interner, 1);
        let scores = RipupScoreboard::new();

        let mut search = PathSearch::new(None, RouteMode::Strict, 0.0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);

        let dst = &search.visited[&w[2]];
        assert_eq!(dst.delay, 2.0);
        // The cheap path enters w2 from w1.
        assert_eq!(dev.pip_src_wire(dst.pip.unwrap()), w[1]);
    }

    #[test]
    fn unreachable_destination_is_absent() {
        let interner = Interner::new();
        let mut dev = ExplicitDevice::new();
        let w0 = dev.add_wire("w0");
        let w1 = dev.add_wire("w1");
        let mut ctx = Context::new(&dev, &interner, 1);
        let scores = RipupScoreboard::new();

        let mut search = PathSearch::new(None, RouteMode::Strict, 0.0);
        search.run(&mut ctx, &scores, &seeds(&[(w0, 0.0)]), w1);
        assert!(!search.visited.contains_key(&w1));
    }

    #[test]
    fn strict_mode_skips_occupied_wires() {
        let interner = Interner::new();
        let (dev, w) = diamond();
        let mut ctx = Context::new(&dev, &interner, 1);
        let blocker = ctx.add_net(ctx.intern("blocker"));
        ctx.bind_wire(w[1], blocker, Strength::Weak).unwrap();
        let scores = RipupScoreboard::new();

        let me = ctx.intern("me");
        let mut search = PathSearch::new(Some(me), RouteMode::Strict, 0.0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);

        // Forced onto the slow bypass.
        let dst = &search.visited[&w[2]];
        assert_eq!(dst.delay, 10.0);
        assert_eq!(dev.pip_src_wire(dst.pip.unwrap()), w[3]);
    }

    #[test]
    fn ripup_mode_crosses_occupied_wires_at_a_penalty() {
        let interner = Interner::new();
        let (dev, w) = diamond();
        let mut ctx = Context::new(&dev, &interner, 1);
        let blocker = ctx.add_net(ctx.intern("blocker"));
        ctx.bind_wire(w[1], blocker, Strength::Weak).unwrap();
        let scores = RipupScoreboard::new();

        let me = ctx.intern("me");
        let mut search = PathSearch::new(Some(me), RouteMode::Ripup, 3.0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);

        // Crossing w1 costs its pip delays plus one flat penalty, still
        // cheaper than the 10.0 bypass.
        let dst = &search.visited[&w[2]];
        assert_eq!(dst.delay, 5.0);
        assert_eq!(dev.pip_src_wire(dst.pip.unwrap()), w[1]);
    }

    #[test]
    fn ripup_mode_never_crosses_strong_bindings() {
        let interner = Interner::new();
        let (dev, w) = diamond();
        let mut ctx = Context::new(&dev, &interner, 1);
        let fixed = ctx.add_net(ctx.intern("fixed"));
        ctx.bind_wire(w[1], fixed, Strength::Strong).unwrap();
        let scores = RipupScoreboard::new();

        let me = ctx.intern("me");
        let mut search = PathSearch::new(Some(me), RouteMode::Ripup, 100.0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);

        let dst = &search.visited[&w[2]];
        assert_eq!(dev.pip_src_wire(dst.pip.unwrap()), w[3]);
    }

    #[test]
    fn contention_history_steers_away() {
        let interner = Interner::new();
        let (dev, w) = diamond();
        let mut ctx = Context::new(&dev, &interner, 1);
        let blocker = ctx.add_net(ctx.intern("blocker"));
        ctx.bind_wire(w[1], blocker, Strength::Weak).unwrap();

        let me = ctx.intern("me");
        let mut scores = RipupScoreboard::new();
        for _ in 0..40 {
            scores.bump_net_wire(blocker, w[1]);
        }

        let mut search = PathSearch::new(Some(me), RouteMode::Ripup, 3.0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);

        // 40 prior fights over w1 make the bypass the cheaper choice.
        let dst = &search.visited[&w[2]];
        assert_eq!(dev.pip_src_wire(dst.pip.unwrap()), w[3]);
    }

    #[test]
    fn multiple_seeds_start_at_their_given_delay() {
        let interner = Interner::new();
        let mut dev = ExplicitDevice::new();
        let w0 = dev.add_wire("w0");
        let w1 = dev.add_wire("w1");
        let w2 = dev.add_wire("w2");
        dev.add_pip(w0, w2, Delay::flat(9.0));
        dev.add_pip(w1, w2, Delay::flat(1.0));
        let mut ctx = Context::new(&dev, &interner, 1);
        let scores = RipupScoreboard::new();

        let mut search = PathSearch::new(None, RouteMode::Strict, 0.0);
        search.run(&mut ctx, &scores, &seeds(&[(w0, 0.0), (w1, 4.0)]), w2);

        // 4.0 + 1.0 beats 0.0 + 9.0.
        assert_eq!(search.visited[&w2].delay, 5.0);
    }

    #[test]
    fn visit_stats_accumulate_across_runs() {
        let interner = Interner::new();
        let (dev, w) = diamond();
        let mut ctx = Context::new(&dev, &interner, 1);
        let scores = RipupScoreboard::new();

        let mut search = PathSearch::new(None, RouteMode::Strict, 0.0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);
        let first = search.stats.visits;
        assert!(first > 0);
        search.run(&mut ctx, &scores, &seeds(&[(w[0], 0.0)]), w[2]);
        assert!(search.stats.visits > first);
    }
}
