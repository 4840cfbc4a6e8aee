//! Routing one whole net: every user, committed, conflicts evicted.

use crate::ripup::ripup_net;
use crate::scoreboard::RipupScoreboard;
use crate::search::{PathSearch, RouteMode, SearchStats};
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;
use weft_common::{Ident, RouteError, RouteResult};
use weft_device::{Context, PortRef, Strength, WireId};

/// The result of one net-routing attempt.
#[derive(Debug)]
pub struct NetRouteOutcome {
    /// Whether every user was reached and committed.
    pub routed: bool,
    /// The first destination the search could not reach (strict mode).
    pub failed_dest: Option<WireId>,
    /// Nets evicted to make room for this one (rip-up mode).
    pub ripped: HashSet<Ident>,
    /// The worst accumulated delay over all users, in nanoseconds.
    pub max_delay: f64,
    /// Visit accounting summed over the per-user searches.
    pub stats: SearchStats,
}

/// Resolves a port reference to the wire on its cell's bel.
///
/// An unplaced cell or an unmapped pin is a configuration error, not a
/// routing failure.
pub(crate) fn resolve_port_wire(ctx: &Context<'_>, port: PortRef) -> RouteResult<WireId> {
    let cell = ctx.cell(port.cell);
    let bel = cell.bel.ok_or_else(|| RouteError::UnplacedCell {
        cell: ctx.name(cell.name).to_string(),
    })?;
    let pin = cell.pin_for_port(port.port);
    ctx.device()
        .wire_bel_pin(bel, pin)
        .ok_or_else(|| RouteError::UnmappedPin {
            cell: ctx.name(cell.name).to_string(),
            port: ctx.name(port.port).to_string(),
        })
}

/// Routes `net_name` from its driver to every user.
///
/// The net is first ripped up completely, then rebuilt: the driver wire is
/// bound, the users are visited in a deterministic random permutation, and
/// each found path is committed destination-to-source. Every wire reached
/// becomes an additional source for later users, so fan-out branches share
/// trunk wires at no extra delay.
///
/// In [`RouteMode::Strict`], a user the search cannot reach makes the whole
/// net give up: it is ripped up again and the outcome carries the failed
/// destination. In [`RouteMode::Ripup`], paths may cross rival nets — each
/// rival is unbound at the crossing (and ripped up entirely if still in the
/// way), recorded in the outcome, and charged on the scoreboard — and an
/// unreachable user is a fatal [`RouteError::Unroutable`].
pub fn route_net(
    ctx: &mut Context<'_>,
    scores: &mut RipupScoreboard,
    net_name: Ident,
    mode: RouteMode,
    ripup_penalty: f64,
) -> RouteResult<NetRouteOutcome> {
    let net = ctx.net(net_name).ok_or_else(|| RouteError::UnknownNet {
        net: ctx.name(net_name).to_string(),
    })?;
    let driver = net.driver.ok_or_else(|| RouteError::NoDriver {
        net: ctx.name(net_name).to_string(),
    })?;
    let mut users = net.users.clone();

    debug!("routing net {} ({} users).", ctx.name(net_name), users.len());

    let src_wire = resolve_port_wire(ctx, driver)?;

    ripup_net(ctx, net_name)?;
    ctx.bind_wire(src_wire, net_name, Strength::Weak)?;

    let mut src_wires: IndexMap<WireId, f64> = IndexMap::new();
    src_wires.insert(src_wire, 0.0);

    ctx.rng().shuffle(&mut users);

    let mut search = PathSearch::new(Some(net_name), mode, ripup_penalty);
    let mut ripped: HashSet<Ident> = HashSet::new();
    let mut max_delay: f64 = 0.0;

    for user in users {
        let dst_wire = resolve_port_wire(ctx, user)?;
        debug!(
            "  route to {}.{} (wire {}), estimate {:.2}.",
            ctx.name(ctx.cell(user.cell).name),
            ctx.name(user.port),
            ctx.device().wire_name(dst_wire),
            ctx.device().estimate_delay(src_wire, dst_wire)
        );

        search.run(ctx, scores, &src_wires, dst_wire);

        let Some(dst_delay) = search.visited.get(&dst_wire).map(|e| e.delay) else {
            debug!(
                "  failed to route {} -> {}.",
                ctx.device().wire_name(src_wire),
                ctx.device().wire_name(dst_wire)
            );
            return match mode {
                RouteMode::Strict => {
                    ripup_net(ctx, net_name)?;
                    Ok(NetRouteOutcome {
                        routed: false,
                        failed_dest: Some(dst_wire),
                        ripped,
                        max_delay,
                        stats: search.stats,
                    })
                }
                RouteMode::Ripup => Err(RouteError::Unroutable {
                    net: ctx.name(net_name).to_string(),
                }),
            };
        };

        debug!("    final path delay {:.3}.", dst_delay);
        max_delay = max_delay.max(dst_delay);

        let mut cursor = dst_wire;
        while !src_wires.contains_key(&cursor) {
            if let Some(other) = ctx.conflicting_wire_net(cursor) {
                if mode != RouteMode::Ripup || other == net_name {
                    return Err(RouteError::Inconsistent(format!(
                        "unexpected conflict on wire {} while committing net {}",
                        ctx.device().wire_name(cursor),
                        ctx.name(net_name)
                    )));
                }
                ctx.unbind_wire(cursor)?;
                if !ctx.check_wire_avail(cursor) {
                    ripup_net(ctx, other)?;
                }
                ripped.insert(other);
                scores.bump_wire(cursor);
                scores.bump_net_wire(net_name, cursor);
                scores.bump_net_wire(other, cursor);
            }

            let entry = search
                .visited
                .get(&cursor)
                .cloned()
                .ok_or_else(|| broken_chain(ctx, net_name, cursor))?;
            let pip = entry.pip.ok_or_else(|| broken_chain(ctx, net_name, cursor))?;

            if let Some(other) = ctx.conflicting_pip_net(pip) {
                if mode != RouteMode::Ripup || other == net_name {
                    return Err(RouteError::Inconsistent(format!(
                        "unexpected conflict on a pip into wire {} while committing net {}",
                        ctx.device().wire_name(cursor),
                        ctx.name(net_name)
                    )));
                }
                ctx.unbind_pip(pip)?;
                if !ctx.check_pip_avail(pip) {
                    ripup_net(ctx, other)?;
                }
                ripped.insert(other);
                scores.bump_pip(pip);
                scores.bump_net_pip(net_name, pip);
                scores.bump_net_pip(other, pip);
            }

            ctx.bind_pip(pip, net_name, Strength::Weak)?;
            debug!(
                "    {:8.3} {}",
                entry.delay,
                ctx.device().wire_name(cursor)
            );
            src_wires.insert(cursor, entry.delay);
            cursor = ctx.device().pip_src_wire(pip);
        }
    }

    Ok(NetRouteOutcome {
        routed: true,
        failed_dest: None,
        ripped,
        max_delay,
        stats: search.stats,
    })
}

fn broken_chain(ctx: &Context<'_>, net: Ident, cursor: WireId) -> RouteError {
    RouteError::Inconsistent(format!(
        "broken predecessor chain at wire {} while committing net {}",
        ctx.device().wire_name(cursor),
        ctx.name(net)
    ))
}
