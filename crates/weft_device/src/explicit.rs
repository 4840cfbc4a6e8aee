//! An explicit edge-list device.
//!
//! [`ExplicitDevice`] implements [`Device`] over wires, pips and bels added
//! one by one. It is the reference backend: the test suites route against
//! it, and it documents the contract a real device family has to satisfy.
//! Wires may carry grid coordinates, in which case the delay estimate is a
//! scaled Manhattan distance; wires without coordinates estimate zero,
//! which keeps the heuristic admissible.

use crate::device::Device;
use crate::ids::{BelId, PipId, WireId};
use crate::types::Delay;
use std::collections::HashMap;
use weft_common::Ident;

#[derive(Debug)]
struct WireData {
    name: String,
    coord: Option<(i32, i32)>,
    pips_downhill: Vec<PipId>,
}

#[derive(Debug)]
struct PipData {
    src: WireId,
    dst: WireId,
    delay: Delay,
}

#[derive(Debug)]
struct BelData {
    name: String,
    pins: HashMap<Ident, WireId>,
}

/// A [`Device`] built from explicitly enumerated wires, pips and bels.
#[derive(Debug)]
pub struct ExplicitDevice {
    wires: Vec<WireData>,
    pips: Vec<PipData>,
    bels: Vec<BelData>,
    estimate_scale: f64,
    delay_epsilon: f64,
    ripup_penalty: f64,
}

impl ExplicitDevice {
    /// Creates an empty device with a unit rip-up penalty and no distance
    /// estimate (every `estimate_delay` is zero until a scale is set).
    pub fn new() -> Self {
        Self {
            wires: Vec::new(),
            pips: Vec::new(),
            bels: Vec::new(),
            estimate_scale: 0.0,
            delay_epsilon: 1e-3,
            ripup_penalty: 1.0,
        }
    }

    /// Sets the Manhattan-distance scale used by `estimate_delay`.
    pub fn set_estimate_scale(&mut self, scale: f64) {
        self.estimate_scale = scale;
    }

    /// Sets the base rip-up delay penalty.
    pub fn set_ripup_penalty(&mut self, penalty: f64) {
        self.ripup_penalty = penalty;
    }

    /// Sets the delay resolution epsilon.
    pub fn set_delay_epsilon(&mut self, epsilon: f64) {
        self.delay_epsilon = epsilon;
    }

    /// Adds a wire with no coordinates.
    pub fn add_wire(&mut self, name: &str) -> WireId {
        let id = WireId::from_raw(self.wires.len() as u32);
        self.wires.push(WireData {
            name: name.to_string(),
            coord: None,
            pips_downhill: Vec::new(),
        });
        id
    }

    /// Adds a wire at a grid position.
    pub fn add_wire_at(&mut self, name: &str, x: i32, y: i32) -> WireId {
        let id = self.add_wire(name);
        self.wires[id.as_raw() as usize].coord = Some((x, y));
        id
    }

    /// Adds a pip from `src` to `dst` with the given delay.
    pub fn add_pip(&mut self, src: WireId, dst: WireId, delay: Delay) -> PipId {
        let id = PipId::from_raw(self.pips.len() as u32);
        self.pips.push(PipData { src, dst, delay });
        self.wires[src.as_raw() as usize].pips_downhill.push(id);
        id
    }

    /// Adds a bel with no pins.
    pub fn add_bel(&mut self, name: &str) -> BelId {
        let id = BelId::from_raw(self.bels.len() as u32);
        self.bels.push(BelData {
            name: name.to_string(),
            pins: HashMap::new(),
        });
        id
    }

    /// Connects a named pin on `bel` to `wire`.
    pub fn map_bel_pin(&mut self, bel: BelId, pin: Ident, wire: WireId) {
        self.bels[bel.as_raw() as usize].pins.insert(pin, wire);
    }

    /// Returns the number of wires in the device.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Returns the number of pips in the device.
    pub fn pip_count(&self) -> usize {
        self.pips.len()
    }
}

impl Default for ExplicitDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for ExplicitDevice {
    fn estimate_delay(&self, from: WireId, to: WireId) -> f64 {
        let a = self.wires[from.as_raw() as usize].coord;
        let b = self.wires[to.as_raw() as usize].coord;
        match (a, b) {
            (Some((ax, ay)), Some((bx, by))) => {
                let dist = (ax - bx).abs() + (ay - by).abs();
                f64::from(dist) * self.estimate_scale
            }
            _ => 0.0,
        }
    }

    fn delay_epsilon(&self) -> f64 {
        self.delay_epsilon
    }

    fn pip_delay(&self, pip: PipId) -> Delay {
        self.pips[pip.as_raw() as usize].delay
    }

    fn pips_downhill(&self, wire: WireId) -> &[PipId] {
        &self.wires[wire.as_raw() as usize].pips_downhill
    }

    fn pip_src_wire(&self, pip: PipId) -> WireId {
        self.pips[pip.as_raw() as usize].src
    }

    fn pip_dst_wire(&self, pip: PipId) -> WireId {
        self.pips[pip.as_raw() as usize].dst
    }

    fn wire_bel_pin(&self, bel: BelId, pin: Ident) -> Option<WireId> {
        self.bels[bel.as_raw() as usize].pins.get(&pin).copied()
    }

    fn ripup_delay_penalty(&self) -> f64 {
        self.ripup_penalty
    }

    fn wire_name(&self, wire: WireId) -> &str {
        &self.wires[wire.as_raw() as usize].name
    }

    fn bel_name(&self, bel: BelId) -> &str {
        &self.bels[bel.as_raw() as usize].name
    }
}
