//! The negotiation outer loop.
//!
//! Every unrouted net is first attempted in strict mode, where occupied
//! resources are untouchable. Nets that fail re-run in rip-up mode with the
//! current penalty, evicting whoever stands in the way; the evicted nets go
//! back on the queue. The penalty escalates on a doubling schedule, so
//! early iterations explore freely while late iterations strongly prefer
//! resources nobody else has ever wanted. The loop ends when the queue
//! drains, or gives up after a bounded number of iterations.

use crate::net::{resolve_port_wire, route_net};
use crate::scoreboard::RipupScoreboard;
use crate::search::{RouteMode, SearchStats};
use log::{debug, info, warn};
use std::collections::HashSet;
use weft_common::{Ident, RouteResult};
use weft_device::Context;

/// Iterations before the router gives up on convergence.
const MAX_ITERATIONS: u32 = 200;

/// Iterations after which the rip-up penalty is raised by another step.
const PENALTY_SCHEDULE: [u32; 5] = [8, 16, 32, 64, 128];

/// Routes every queueable net. Returns `Ok(false)` on iteration
/// exhaustion; fatal errors propagate.
pub(crate) fn run(ctx: &mut Context<'_>) -> RouteResult<bool> {
    let mut ripup_penalty = ctx.device().ripup_delay_penalty();
    let mut scores = RipupScoreboard::new();
    let mut total_stats = SearchStats::default();

    info!("routing..");

    let mut nets_queue: HashSet<Ident> = HashSet::new();
    for (&name, net) in ctx.nets() {
        let Some(driver) = net.driver else { continue };
        if ctx.cell(driver.cell).bel.is_none() {
            continue;
        }
        if !net.wires.is_empty() {
            continue;
        }
        nets_queue.insert(name);
    }

    if nets_queue.is_empty() {
        info!("found no unrouted nets. no routing necessary.");
        return Ok(true);
    }
    info!(
        "found {} unrouted nets. starting routing procedure.",
        nets_queue.len()
    );

    log_delay_estimate(ctx, &nets_queue);

    let mut iter_cnt: u32 = 0;
    while !nets_queue.is_empty() {
        if iter_cnt == MAX_ITERATIONS {
            warn!("giving up after {iter_cnt} iterations.");
            info!("checksum: {:#010x}", ctx.checksum());
            ctx.check()?;
            return Ok(false);
        }
        iter_cnt += 1;
        debug!("-- iteration {iter_cnt} --");
        debug!("routing queue contains {} nets.", nets_queue.len());

        let mut ripup_queue: HashSet<Ident> = HashSet::new();

        let mut nets_array: Vec<Ident> = nets_queue.drain().collect();
        ctx.rng().sorted_shuffle(&mut nets_array);

        let net_cnt = nets_array.len();
        let mut strict_stats = SearchStats::default();
        for net_name in nets_array {
            let outcome = route_net(ctx, &mut scores, net_name, RouteMode::Strict, 0.0)?;
            strict_stats.absorb(&outcome.stats);
            if !outcome.routed {
                ripup_queue.insert(net_name);
            }
        }
        let normal_route_cnt = net_cnt - ripup_queue.len();
        log_pass_stats(&strict_stats);
        total_stats.absorb(&strict_stats);

        if !ripup_queue.is_empty() {
            debug!(
                "failed to route {} nets. re-routing in rip-up mode.",
                ripup_queue.len()
            );

            let mut ripup_array: Vec<Ident> = ripup_queue.iter().copied().collect();
            ctx.rng().sorted_shuffle(&mut ripup_array);

            let mut ripup_stats = SearchStats::default();
            let mut rip_cnt = 0usize;
            for net_name in ripup_array {
                let outcome =
                    route_net(ctx, &mut scores, net_name, RouteMode::Ripup, ripup_penalty)?;
                ripup_stats.absorb(&outcome.stats);
                rip_cnt += outcome.ripped.len();
                for evicted in outcome.ripped {
                    nets_queue.insert(evicted);
                }
            }
            debug!(
                "  re-routed {} nets, ripped up {} nets.",
                ripup_queue.len(),
                rip_cnt
            );
            log_pass_stats(&ripup_stats);
            total_stats.absorb(&ripup_stats);
        }

        info!(
            "iteration {iter_cnt}: routed {normal_route_cnt} nets without rip-up, \
             routed {} nets with rip-up.",
            ripup_queue.len()
        );

        if PENALTY_SCHEDULE.contains(&iter_cnt) {
            ripup_penalty += ctx.device().ripup_delay_penalty();
        }
    }

    info!("routing complete after {iter_cnt} iterations.");
    info!(
        "visited {} pips ({:.2}% revisits, {:.2}% overtime revisits).",
        total_stats.visits,
        total_stats.revisit_percent(),
        total_stats.overtime_revisit_percent()
    );
    info!("checksum: {:#010x}", ctx.checksum());
    ctx.check()?;
    Ok(true)
}

fn log_pass_stats(stats: &SearchStats) {
    debug!(
        "  visited {} pips ({:.2}% revisits, {:.2}% overtime revisits).",
        stats.visits,
        stats.revisit_percent(),
        stats.overtime_revisit_percent()
    );
}

/// Logs the summed and average estimated delay over every resolvable
/// driver/user pair. Informational only; unresolvable pairs are skipped.
fn log_delay_estimate(ctx: &Context<'_>, nets_queue: &HashSet<Ident>) {
    let mut total = 0.0f64;
    let mut pairs = 0u32;

    let mut names: Vec<Ident> = nets_queue.iter().copied().collect();
    names.sort_unstable();
    for name in names {
        let Some(net) = ctx.net(name) else { continue };
        let Some(driver) = net.driver else { continue };
        let Ok(src_wire) = resolve_port_wire(ctx, driver) else {
            continue;
        };
        for &user in &net.users {
            let Ok(dst_wire) = resolve_port_wire(ctx, user) else {
                continue;
            };
            total += ctx.device().estimate_delay(src_wire, dst_wire);
            pairs += 1;
        }
    }

    if pairs > 0 {
        info!(
            "estimated total wire delay: {:.2} (avg {:.2})",
            total,
            total / f64::from(pairs)
        );
    }
}
