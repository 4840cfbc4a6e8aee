//! The device adapter contract.
//!
//! A [`Device`] exposes the static routing graph of a target: wires, the
//! pips connecting them, the bel pin to wire mapping, and the delay model.
//! The routing core is generic over this trait; device backends implement
//! it once per family. All queries are read-only — the mutable routing
//! state (which net holds which resource) lives in the
//! [`Context`](crate::Context), not here.

use crate::ids::{BelId, PipId, WireId};
use crate::types::Delay;
use weft_common::Ident;

/// Read-only routing graph and delay model of a target device.
pub trait Device {
    /// Estimates the routing delay between two wires, in nanoseconds.
    ///
    /// Used as the search heuristic. It should not over-estimate the real
    /// achievable delay; a mild over-estimate degrades result quality but
    /// is tolerated by the search's overtime budget.
    fn estimate_delay(&self, from: WireId, to: WireId) -> f64;

    /// The smallest delay difference the device model resolves.
    ///
    /// A candidate path must beat the incumbent by more than this to
    /// replace it during the search.
    fn delay_epsilon(&self) -> f64 {
        1e-3
    }

    /// Returns the delay through a pip.
    fn pip_delay(&self, pip: PipId) -> Delay;

    /// Returns the pips whose source is `wire`.
    fn pips_downhill(&self, wire: WireId) -> &[PipId];

    /// Returns the source wire of a pip.
    fn pip_src_wire(&self, pip: PipId) -> WireId;

    /// Returns the destination wire of a pip.
    fn pip_dst_wire(&self, pip: PipId) -> WireId;

    /// Resolves a named pin on a bel to the wire it connects to.
    ///
    /// Returns `None` when the bel has no such pin or the pin is not
    /// connected to the routing fabric.
    fn wire_bel_pin(&self, bel: BelId, pin: Ident) -> Option<WireId>;

    /// The base delay penalty applied to occupied resources in rip-up
    /// mode. The outer loop escalates the penalty in multiples of this.
    fn ripup_delay_penalty(&self) -> f64;

    /// Returns the name of a wire, for logging.
    fn wire_name(&self, wire: WireId) -> &str;

    /// Returns the name of a bel, for logging.
    fn bel_name(&self, bel: BelId) -> &str;
}
