//! Device adapter contract and shared routing database for the weft router.
//!
//! This crate defines everything the routing core observes but does not
//! own algorithmically:
//!
//! - the [`Device`] trait — the read-only routing graph and delay model of
//!   a target, with [`ExplicitDevice`] as a concrete edge-list backend;
//! - the logical netlist ([`Cell`], [`Net`], [`PortRef`]);
//! - the [`Context`] — the shared routing database binding wires and pips
//!   to nets, plus the deterministic random stream ([`RngState`]).

#![warn(missing_docs)]

pub mod context;
pub mod device;
pub mod explicit;
pub mod ids;
pub mod netlist;
pub mod rng;
pub mod types;

pub use context::Context;
pub use device::Device;
pub use explicit::ExplicitDevice;
pub use ids::{BelId, CellId, PipId, WireId};
pub use netlist::{Cell, Net, PortRef};
pub use rng::RngState;
pub use types::{BoundSegment, Delay, Strength};
