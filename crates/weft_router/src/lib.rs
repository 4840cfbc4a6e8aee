//! Negotiated-congestion signal routing with rip-up and reroute.
//!
//! This crate assigns wires and pips to nets so that every net's driver
//! reaches all of its users and no resource is claimed twice. Each net is
//! routed by a weighted best-first search over the device wire graph; nets
//! that cannot be placed without conflict negotiate through iterated
//! rip-up: they route straight through their rivals at an escalating
//! penalty, evict them, and the evicted nets try again elsewhere. A
//! per-resource contention history steers repeat offenders apart.
//!
//! The core entry point is [`route_design`]:
//!
//! ```ignore
//! let mut ctx = Context::new(&device, &interner, seed);
//! // ... populate cells and nets ...
//! assert!(weft_router::route_design(&mut ctx));
//! ```
//!
//! Routing is deterministic: the same design, device and seed produce the
//! same bindings and the same [`Context::checksum`].

#![warn(missing_docs)]

mod net;
mod pathfinder;
mod ripup;
mod scoreboard;
mod search;

pub use net::{route_net, NetRouteOutcome};
pub use ripup::ripup_net;
pub use scoreboard::RipupScoreboard;
pub use search::{RouteMode, SearchStats};

use indexmap::IndexMap;
use weft_device::{Context, WireId};

/// Routes every net with a placed driver and an empty claimed set.
///
/// Returns `true` when every net is routed and the database passes its
/// consistency check; `false` when the negotiation fails to converge or a
/// fatal error (unplaced cell, unmapped pin, impossible net, binding
/// violation) aborts the run. Fatal errors are logged, and the database is
/// checked once more before returning so callers never see silently
/// corrupted state.
pub fn route_design(ctx: &mut Context<'_>) -> bool {
    match pathfinder::run(ctx) {
        Ok(done) => done,
        Err(err) => {
            log::error!("routing failed: {err}");
            if let Err(check_err) = ctx.check() {
                log::error!("routing database check failed: {check_err}");
            }
            false
        }
    }
}

/// Measures the best achievable delay from `src_wire` to `dst_wire`.
///
/// Runs one strict-mode search against the current binding state, ignoring
/// the netlist. Returns `None` when the destination is unreachable.
pub fn actual_route_delay(ctx: &mut Context<'_>, src_wire: WireId, dst_wire: WireId) -> Option<f64> {
    let scores = RipupScoreboard::new();
    let mut search = search::PathSearch::new(None, RouteMode::Strict, 0.0);
    let mut src_wires = IndexMap::new();
    src_wires.insert(src_wire, 0.0);
    search.run(ctx, &scores, &src_wires, dst_wire);
    search.visited.get(&dst_wire).map(|entry| entry.delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::Interner;
    use weft_device::{Delay, ExplicitDevice, PortRef};

    #[test]
    fn empty_netlist_routes_immediately() {
        let interner = Interner::new();
        let dev = ExplicitDevice::new();
        let mut ctx = Context::new(&dev, &interner, 0);
        assert!(route_design(&mut ctx));
    }

    #[test]
    fn driverless_nets_are_ignored() {
        let interner = Interner::new();
        let dev = ExplicitDevice::new();
        let mut ctx = Context::new(&dev, &interner, 0);
        ctx.add_net(ctx.intern("floating"));
        assert!(route_design(&mut ctx));
    }

    #[test]
    fn single_net_design_routes() {
        let interner = Interner::new();
        let q = interner.get_or_intern("Q");
        let d = interner.get_or_intern("D");

        let mut dev = ExplicitDevice::new();
        let w0 = dev.add_wire("w0");
        let w1 = dev.add_wire("w1");
        dev.add_pip(w0, w1, Delay::flat(1.0));
        let b0 = dev.add_bel("b0");
        let b1 = dev.add_bel("b1");
        dev.map_bel_pin(b0, q, w0);
        dev.map_bel_pin(b1, d, w1);

        let mut ctx = Context::new(&dev, &interner, 0);
        let c0 = ctx.add_cell(ctx.intern("drv"));
        let c1 = ctx.add_cell(ctx.intern("snk"));
        ctx.cell_mut(c0).bel = Some(b0);
        ctx.cell_mut(c1).bel = Some(b1);
        let n = ctx.add_net(ctx.intern("n"));
        let net = ctx.net_mut(n).unwrap();
        net.driver = Some(PortRef { cell: c0, port: q });
        net.users = vec![PortRef { cell: c1, port: d }];

        assert!(route_design(&mut ctx));
        assert_eq!(ctx.net(n).unwrap().wires.len(), 2);
        ctx.check().unwrap();
    }

    #[test]
    fn actual_route_delay_reports_best_path() {
        let interner = Interner::new();
        let mut dev = ExplicitDevice::new();
        let w0 = dev.add_wire("w0");
        let w1 = dev.add_wire("w1");
        let w2 = dev.add_wire("w2");
        dev.add_pip(w0, w1, Delay::flat(1.0));
        dev.add_pip(w1, w2, Delay::flat(2.0));
        let mut ctx = Context::new(&dev, &interner, 0);

        assert_eq!(actual_route_delay(&mut ctx, w0, w2), Some(3.0));
        assert_eq!(actual_route_delay(&mut ctx, w2, w0), None);
    }
}
