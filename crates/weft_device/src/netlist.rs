//! Logical netlist data structures.
//!
//! A [`Net`] connects one driver pin to an ordered set of user pins, each
//! expressed as a [`PortRef`] into the cell table. During routing, the
//! net's `wires` map records every wire the net currently claims and the
//! pip it enters each wire through. The map is maintained exclusively by
//! the binding operations on [`Context`](crate::Context); a routing attempt
//! empties and refills it.

use crate::ids::{BelId, CellId, WireId};
use crate::types::BoundSegment;
use std::collections::HashMap;
use weft_common::Ident;

/// A reference to one port on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef {
    /// The cell carrying the port.
    pub cell: CellId,
    /// The logical port name.
    pub port: Ident,
}

/// A cell in the logical netlist.
#[derive(Debug, Clone)]
pub struct Cell {
    /// The cell's name.
    pub name: Ident,
    /// The bel this cell is placed on, if any.
    pub bel: Option<BelId>,
    /// Logical-port to physical-pin renaming.
    ///
    /// Ports absent from this map use their own name as the pin name.
    pub pins: HashMap<Ident, Ident>,
}

impl Cell {
    /// Creates an unplaced cell with an empty pin map.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            bel: None,
            pins: HashMap::new(),
        }
    }

    /// Resolves a logical port to the physical pin name on the bel.
    pub fn pin_for_port(&self, port: Ident) -> Ident {
        self.pins.get(&port).copied().unwrap_or(port)
    }
}

/// A logical net: one driver, many users, and the claimed routing state.
#[derive(Debug, Clone)]
pub struct Net {
    /// The net's name.
    pub name: Ident,
    /// The driving pin, if connected.
    pub driver: Option<PortRef>,
    /// The user (sink) pins, in netlist order.
    pub users: Vec<PortRef>,
    /// Every wire currently claimed by this net, with its entry pip.
    pub wires: HashMap<WireId, BoundSegment>,
}

impl Net {
    /// Creates an empty net.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            driver: None,
            users: Vec::new(),
            wires: HashMap::new(),
        }
    }
}
