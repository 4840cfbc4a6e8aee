//! The routing context: netlist, binding database and randomness.
//!
//! A [`Context`] owns everything the router mutates: the cells and nets of
//! the design, the wire and pip binding tables, and the deterministic
//! random stream. It borrows the device graph and the string interner.
//!
//! The binding tables and the per-net `wires` maps mirror each other at
//! every point a shared borrow can observe: a wire or pip bound in the
//! table appears in exactly one net's claimed set, and vice versa. Queries
//! take `&self`; every mutation takes `&mut self`, so a sequence of
//! bindings (for example committing one net's path) is unobservable until
//! the exclusive borrow ends.

use crate::device::Device;
use crate::ids::{CellId, PipId, WireId};
use crate::netlist::{Cell, Net};
use crate::rng::RngState;
use crate::types::{BoundSegment, Strength};
use std::collections::HashMap;
use weft_common::{Ident, Interner, RouteError, RouteResult};

/// The mutable routing state of one design on one device.
pub struct Context<'d> {
    device: &'d dyn Device,
    interner: &'d Interner,
    cells: Vec<Cell>,
    nets: HashMap<Ident, Net>,
    wire_net: HashMap<WireId, (Ident, Strength)>,
    pip_net: HashMap<PipId, (Ident, Strength)>,
    rng: RngState,
}

impl<'d> Context<'d> {
    /// Creates a context for `device` with the given random seed.
    pub fn new(device: &'d dyn Device, interner: &'d Interner, seed: u64) -> Self {
        Self {
            device,
            interner,
            cells: Vec::new(),
            nets: HashMap::new(),
            wire_net: HashMap::new(),
            pip_net: HashMap::new(),
            rng: RngState::new(seed),
        }
    }

    /// Returns the device graph.
    pub fn device(&self) -> &'d dyn Device {
        self.device
    }

    /// Returns the string interner.
    pub fn interner(&self) -> &'d Interner {
        self.interner
    }

    /// Interns a string.
    pub fn intern(&self, s: &str) -> Ident {
        self.interner.get_or_intern(s)
    }

    /// Resolves an identifier to its string.
    pub fn name(&self, id: Ident) -> &'d str {
        self.interner.resolve(id)
    }

    /// Returns the deterministic random stream.
    pub fn rng(&mut self) -> &mut RngState {
        &mut self.rng
    }

    /// Adds an unplaced cell and returns its id.
    pub fn add_cell(&mut self, name: Ident) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        self.cells.push(Cell::new(name));
        id
    }

    /// Returns the cell with the given id.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the cell with the given id.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.as_raw() as usize]
    }

    /// Adds an empty net named `name`. Adding an existing name is a no-op.
    pub fn add_net(&mut self, name: Ident) -> Ident {
        self.nets.entry(name).or_insert_with(|| Net::new(name));
        name
    }

    /// Returns the net with the given name.
    pub fn net(&self, name: Ident) -> Option<&Net> {
        self.nets.get(&name)
    }

    /// Returns a mutable reference to the net with the given name.
    pub fn net_mut(&mut self, name: Ident) -> Option<&mut Net> {
        self.nets.get_mut(&name)
    }

    /// Returns the full net table.
    pub fn nets(&self) -> &HashMap<Ident, Net> {
        &self.nets
    }

    /// Returns whether `wire` is free for the router to claim.
    pub fn check_wire_avail(&self, wire: WireId) -> bool {
        !self.wire_net.contains_key(&wire)
    }

    /// Returns whether `pip` is free for the router to claim.
    pub fn check_pip_avail(&self, pip: PipId) -> bool {
        !self.pip_net.contains_key(&pip)
    }

    /// Returns the net holding `wire` at router strength, if any.
    ///
    /// A wire held above [`Strength::Weak`] reports no conflict: it is
    /// simply unavailable, and the router may not evict its owner.
    pub fn conflicting_wire_net(&self, wire: WireId) -> Option<Ident> {
        match self.wire_net.get(&wire) {
            Some(&(net, Strength::Weak)) => Some(net),
            _ => None,
        }
    }

    /// Returns the net holding `pip` at router strength, if any.
    pub fn conflicting_pip_net(&self, pip: PipId) -> Option<Ident> {
        match self.pip_net.get(&pip) {
            Some(&(net, Strength::Weak)) => Some(net),
            _ => None,
        }
    }

    /// Binds `wire` to `net` as a source wire (no entry pip).
    pub fn bind_wire(&mut self, wire: WireId, net: Ident, strength: Strength) -> RouteResult<()> {
        if let Some(&(owner, _)) = self.wire_net.get(&wire) {
            return Err(RouteError::AlreadyBound {
                resource: self.wire_desc(wire),
                net: self.name(owner).to_string(),
            });
        }
        let entry = self.nets.get_mut(&net).ok_or_else(|| RouteError::UnknownNet {
            net: self.interner.resolve(net).to_string(),
        })?;
        entry.wires.insert(wire, BoundSegment { pip: None, strength });
        self.wire_net.insert(wire, (net, strength));
        Ok(())
    }

    /// Binds `pip` and its destination wire to `net`.
    ///
    /// The destination wire's segment records `pip` as its entry, so
    /// releasing either the pip or the wire releases both.
    pub fn bind_pip(&mut self, pip: PipId, net: Ident, strength: Strength) -> RouteResult<()> {
        if let Some(&(owner, _)) = self.pip_net.get(&pip) {
            return Err(RouteError::AlreadyBound {
                resource: self.pip_desc(pip),
                net: self.name(owner).to_string(),
            });
        }
        let dst = self.device.pip_dst_wire(pip);
        if let Some(&(owner, _)) = self.wire_net.get(&dst) {
            return Err(RouteError::AlreadyBound {
                resource: self.wire_desc(dst),
                net: self.name(owner).to_string(),
            });
        }
        let entry = self.nets.get_mut(&net).ok_or_else(|| RouteError::UnknownNet {
            net: self.interner.resolve(net).to_string(),
        })?;
        entry.wires.insert(
            dst,
            BoundSegment {
                pip: Some(pip),
                strength,
            },
        );
        self.pip_net.insert(pip, (net, strength));
        self.wire_net.insert(dst, (net, strength));
        Ok(())
    }

    /// Releases `wire` and, if the owning net entered it through a pip,
    /// that pip as well.
    pub fn unbind_wire(&mut self, wire: WireId) -> RouteResult<()> {
        let &(net, strength) = self
            .wire_net
            .get(&wire)
            .ok_or_else(|| RouteError::NotBound {
                resource: self.wire_desc(wire),
            })?;
        if strength > Strength::Weak {
            return Err(RouteError::StrongBinding {
                resource: self.wire_desc(wire),
            });
        }
        let entry = self
            .nets
            .get_mut(&net)
            .and_then(|n| n.wires.remove(&wire))
            .ok_or_else(|| {
                RouteError::Inconsistent(format!(
                    "wire {} bound to a net that does not claim it",
                    self.device.wire_name(wire)
                ))
            })?;
        if let Some(pip) = entry.pip {
            self.pip_net.remove(&pip);
        }
        self.wire_net.remove(&wire);
        Ok(())
    }

    /// Releases `pip` and the destination wire it was driving.
    pub fn unbind_pip(&mut self, pip: PipId) -> RouteResult<()> {
        let &(net, strength) = self.pip_net.get(&pip).ok_or_else(|| RouteError::NotBound {
            resource: self.pip_desc(pip),
        })?;
        if strength > Strength::Weak {
            return Err(RouteError::StrongBinding {
                resource: self.pip_desc(pip),
            });
        }
        let dst = self.device.pip_dst_wire(pip);
        self.nets
            .get_mut(&net)
            .and_then(|n| n.wires.remove(&dst))
            .ok_or_else(|| {
                RouteError::Inconsistent(format!(
                    "{} bound to a net that does not claim its destination wire",
                    self.pip_desc(pip)
                ))
            })?;
        self.wire_net.remove(&dst);
        self.pip_net.remove(&pip);
        Ok(())
    }

    /// Computes a checksum of the binding state.
    ///
    /// The tables are folded in sorted resource order, so equal binding
    /// states produce equal checksums regardless of map iteration order.
    pub fn checksum(&self) -> u32 {
        let mut data = Vec::with_capacity(9 * (self.wire_net.len() + self.pip_net.len()) + 1);

        let mut wires: Vec<_> = self.wire_net.iter().collect();
        wires.sort_unstable_by_key(|&(&w, _)| w);
        for (wire, &(net, strength)) in wires {
            data.extend_from_slice(&wire.as_raw().to_le_bytes());
            data.extend_from_slice(&net.as_raw().to_le_bytes());
            data.push(strength as u8);
        }
        data.push(0xff);

        let mut pips: Vec<_> = self.pip_net.iter().collect();
        pips.sort_unstable_by_key(|&(&p, _)| p);
        for (pip, &(net, strength)) in pips {
            data.extend_from_slice(&pip.as_raw().to_le_bytes());
            data.extend_from_slice(&net.as_raw().to_le_bytes());
            data.push(strength as u8);
        }

        xxhash_rust::xxh32::xxh32(&data, 0)
    }

    /// Validates the binding state.
    ///
    /// Checks that the binding tables and the per-net claimed sets mirror
    /// each other exactly and that every claimed segment's entry pip
    /// actually drives its wire.
    pub fn check(&self) -> RouteResult<()> {
        for (&wire, &(net, strength)) in &self.wire_net {
            let seg = self
                .nets
                .get(&net)
                .and_then(|n| n.wires.get(&wire))
                .ok_or_else(|| {
                    RouteError::Inconsistent(format!(
                        "wire {} bound to net {} which does not claim it",
                        self.device.wire_name(wire),
                        self.name(net)
                    ))
                })?;
            if seg.strength != strength {
                return Err(RouteError::Inconsistent(format!(
                    "wire {} bound at a different strength than claimed",
                    self.device.wire_name(wire)
                )));
            }
        }
        for (&pip, &(net, _)) in &self.pip_net {
            let dst = self.device.pip_dst_wire(pip);
            let claimed = self
                .nets
                .get(&net)
                .and_then(|n| n.wires.get(&dst))
                .and_then(|seg| seg.pip);
            if claimed != Some(pip) {
                return Err(RouteError::Inconsistent(format!(
                    "{} bound to net {} but not recorded as the entry of its destination wire",
                    self.pip_desc(pip),
                    self.name(net)
                )));
            }
        }
        for (&net_name, net) in &self.nets {
            for (&wire, seg) in &net.wires {
                match self.wire_net.get(&wire) {
                    Some(&(owner, strength)) if owner == net_name && strength == seg.strength => {}
                    _ => {
                        return Err(RouteError::Inconsistent(format!(
                            "net {} claims wire {} without a matching binding",
                            self.name(net_name),
                            self.device.wire_name(wire)
                        )))
                    }
                }
                if let Some(pip) = seg.pip {
                    match self.pip_net.get(&pip) {
                        Some(&(owner, _)) if owner == net_name => {}
                        _ => {
                            return Err(RouteError::Inconsistent(format!(
                                "net {} claims {} without a matching binding",
                                self.name(net_name),
                                self.pip_desc(pip)
                            )))
                        }
                    }
                    if self.device.pip_dst_wire(pip) != wire {
                        return Err(RouteError::Inconsistent(format!(
                            "net {} records {} as the entry of a wire it does not drive",
                            self.name(net_name),
                            self.pip_desc(pip)
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn wire_desc(&self, wire: WireId) -> String {
        format!("wire {}", self.device.wire_name(wire))
    }

    fn pip_desc(&self, pip: PipId) -> String {
        format!(
            "pip {}->{}",
            self.device.wire_name(self.device.pip_src_wire(pip)),
            self.device.wire_name(self.device.pip_dst_wire(pip))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explicit::ExplicitDevice;
    use crate::types::Delay;

    struct Fixture {
        device: ExplicitDevice,
        interner: Interner,
        w0: WireId,
        w1: WireId,
        w2: WireId,
        p0: PipId,
        p1: PipId,
    }

    fn fixture() -> Fixture {
        let interner = Interner::new();
        let mut device = ExplicitDevice::new();
        let w0 = device.add_wire("w0");
        let w1 = device.add_wire("w1");
        let w2 = device.add_wire("w2");
        let p0 = device.add_pip(w0, w1, Delay::flat(1.0));
        let p1 = device.add_pip(w1, w2, Delay::flat(1.0));
        Fixture {
            device,
            interner,
            w0,
            w1,
            w2,
            p0,
            p1,
        }
    }

    #[test]
    fn fresh_wires_are_available() {
        let f = fixture();
        let ctx = Context::new(&f.device, &f.interner, 0);
        assert!(ctx.check_wire_avail(f.w0));
        assert!(ctx.check_pip_avail(f.p0));
        assert!(ctx.conflicting_wire_net(f.w0).is_none());
    }

    #[test]
    fn bind_wire_claims_and_reflects() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let n = ctx.add_net(ctx.intern("n"));
        ctx.bind_wire(f.w0, n, Strength::Weak).unwrap();

        assert!(!ctx.check_wire_avail(f.w0));
        assert_eq!(ctx.conflicting_wire_net(f.w0), Some(n));
        let seg = ctx.net(n).unwrap().wires[&f.w0];
        assert_eq!(seg.pip, None);
        ctx.check().unwrap();
    }

    #[test]
    fn bind_pip_claims_destination_wire() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let n = ctx.add_net(ctx.intern("n"));
        ctx.bind_pip(f.p0, n, Strength::Weak).unwrap();

        assert!(!ctx.check_pip_avail(f.p0));
        assert!(!ctx.check_wire_avail(f.w1));
        assert_eq!(ctx.net(n).unwrap().wires[&f.w1].pip, Some(f.p0));
        ctx.check().unwrap();
    }

    #[test]
    fn double_bind_is_an_error() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let a = ctx.add_net(ctx.intern("a"));
        let b = ctx.add_net(ctx.intern("b"));
        ctx.bind_wire(f.w0, a, Strength::Weak).unwrap();
        assert!(matches!(
            ctx.bind_wire(f.w0, b, Strength::Weak),
            Err(RouteError::AlreadyBound { .. })
        ));
    }

    #[test]
    fn bind_unbind_pip_restores_state() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let n = ctx.add_net(ctx.intern("n"));
        let before = ctx.checksum();

        ctx.bind_pip(f.p1, n, Strength::Weak).unwrap();
        assert_ne!(ctx.checksum(), before);
        ctx.unbind_pip(f.p1).unwrap();

        assert_eq!(ctx.checksum(), before);
        assert!(ctx.check_pip_avail(f.p1));
        assert!(ctx.check_wire_avail(f.w2));
        assert!(ctx.net(n).unwrap().wires.is_empty());
        ctx.check().unwrap();
    }

    #[test]
    fn unbind_wire_releases_entry_pip() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let n = ctx.add_net(ctx.intern("n"));
        ctx.bind_pip(f.p0, n, Strength::Weak).unwrap();

        ctx.unbind_wire(f.w1).unwrap();
        assert!(ctx.check_pip_avail(f.p0));
        assert!(ctx.check_wire_avail(f.w1));
        ctx.check().unwrap();
    }

    #[test]
    fn unbind_unbound_is_an_error() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        assert!(matches!(
            ctx.unbind_wire(f.w0),
            Err(RouteError::NotBound { .. })
        ));
        assert!(matches!(
            ctx.unbind_pip(f.p0),
            Err(RouteError::NotBound { .. })
        ));
    }

    #[test]
    fn strong_binding_is_locked() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let n = ctx.add_net(ctx.intern("fixed"));
        ctx.bind_wire(f.w0, n, Strength::Strong).unwrap();

        assert!(!ctx.check_wire_avail(f.w0));
        assert_eq!(ctx.conflicting_wire_net(f.w0), None);
        assert!(matches!(
            ctx.unbind_wire(f.w0),
            Err(RouteError::StrongBinding { .. })
        ));
    }

    #[test]
    fn bind_to_unknown_net_is_an_error() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let ghost = ctx.intern("ghost");
        assert!(matches!(
            ctx.bind_wire(f.w0, ghost, Strength::Weak),
            Err(RouteError::UnknownNet { .. })
        ));
    }

    #[test]
    fn checksum_tracks_binding_state() {
        let f = fixture();
        let mut ctx = Context::new(&f.device, &f.interner, 0);
        let a = ctx.add_net(ctx.intern("a"));
        let b = ctx.add_net(ctx.intern("b"));

        ctx.bind_wire(f.w0, a, Strength::Weak).unwrap();
        let with_a = ctx.checksum();
        ctx.unbind_wire(f.w0).unwrap();
        ctx.bind_wire(f.w0, b, Strength::Weak).unwrap();
        let with_b = ctx.checksum();
        assert_ne!(with_a, with_b);
    }
}
