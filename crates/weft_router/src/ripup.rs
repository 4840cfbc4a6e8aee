//! Releasing every resource a net holds.

use weft_common::{Ident, RouteError, RouteResult};
use weft_device::Context;

/// Releases every wire and pip currently bound to `net`.
///
/// Segments entered through a pip are released pip-first (which also frees
/// the wire), then the remaining pure source wires are released. On return
/// the net's claimed set is empty. A failed release — a binding above
/// router strength, or a binding the net does not actually hold — is fatal
/// and propagates.
pub fn ripup_net(ctx: &mut Context<'_>, net: Ident) -> RouteResult<()> {
    let net_info = ctx.net(net).ok_or_else(|| RouteError::UnknownNet {
        net: ctx.name(net).to_string(),
    })?;

    let mut pips = Vec::with_capacity(net_info.wires.len());
    let mut wires = Vec::new();
    for (&wire, seg) in &net_info.wires {
        match seg.pip {
            Some(pip) => pips.push(pip),
            None => wires.push(wire),
        }
    }

    for pip in pips {
        ctx.unbind_pip(pip)?;
    }
    for wire in wires {
        ctx.unbind_wire(wire)?;
    }

    if ctx.net(net).is_some_and(|n| !n.wires.is_empty()) {
        return Err(RouteError::Inconsistent(format!(
            "net {} still claims wires after rip-up",
            ctx.name(net)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::Interner;
    use weft_device::{Delay, ExplicitDevice, Strength};

    fn chain_device() -> ExplicitDevice {
        let mut dev = ExplicitDevice::new();
        let w0 = dev.add_wire("w0");
        let w1 = dev.add_wire("w1");
        let w2 = dev.add_wire("w2");
        dev.add_pip(w0, w1, Delay::flat(1.0));
        dev.add_pip(w1, w2, Delay::flat(1.0));
        dev
    }

    #[test]
    fn ripup_releases_everything() {
        let interner = Interner::new();
        let dev = chain_device();
        let mut ctx = Context::new(&dev, &interner, 0);
        let n = ctx.add_net(ctx.intern("n"));

        let w0 = weft_device::WireId::from_raw(0);
        let p0 = weft_device::PipId::from_raw(0);
        let p1 = weft_device::PipId::from_raw(1);
        ctx.bind_wire(w0, n, Strength::Weak).unwrap();
        ctx.bind_pip(p0, n, Strength::Weak).unwrap();
        ctx.bind_pip(p1, n, Strength::Weak).unwrap();

        ripup_net(&mut ctx, n).unwrap();

        assert!(ctx.net(n).unwrap().wires.is_empty());
        assert!(ctx.check_wire_avail(w0));
        assert!(ctx.check_pip_avail(p0));
        assert!(ctx.check_pip_avail(p1));
        ctx.check().unwrap();
    }

    #[test]
    fn ripup_twice_is_idempotent() {
        let interner = Interner::new();
        let dev = chain_device();
        let mut ctx = Context::new(&dev, &interner, 0);
        let n = ctx.add_net(ctx.intern("n"));

        ctx.bind_wire(weft_device::WireId::from_raw(0), n, Strength::Weak)
            .unwrap();
        ripup_net(&mut ctx, n).unwrap();
        let after_first = ctx.checksum();

        ripup_net(&mut ctx, n).unwrap();
        assert_eq!(ctx.checksum(), after_first);
        assert!(ctx.net(n).unwrap().wires.is_empty());
    }

    #[test]
    fn ripup_of_strong_binding_is_fatal() {
        let interner = Interner::new();
        let dev = chain_device();
        let mut ctx = Context::new(&dev, &interner, 0);
        let n = ctx.add_net(ctx.intern("n"));

        ctx.bind_wire(weft_device::WireId::from_raw(0), n, Strength::Fixed)
            .unwrap();
        assert!(matches!(
            ripup_net(&mut ctx, n),
            Err(RouteError::StrongBinding { .. })
        ));
    }

    #[test]
    fn ripup_unknown_net_is_fatal() {
        let interner = Interner::new();
        let dev = chain_device();
        let mut ctx = Context::new(&dev, &interner, 0);
        let ghost = ctx.intern("ghost");
        assert!(matches!(
            ripup_net(&mut ctx, ghost),
            Err(RouteError::UnknownNet { .. })
        ));
    }
}
