//! Opaque ID newtypes for device and netlist entities.
//!
//! [`WireId`], [`PipId`], [`BelId`] and [`CellId`] are thin `u32` wrappers.
//! They are `Copy`, `Ord`, `Hash` and `Serialize`/`Deserialize`; the
//! ordering is the device enumeration order and is used wherever a
//! canonical resource order is needed (checksums, sorted shuffles).
//! Absence of a resource ("no wire here") is expressed as `Option<_>`
//! rather than a reserved sentinel value.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque ID for a routing wire segment in the device fabric.
    WireId
);

define_id!(
    /// Opaque ID for a programmable interconnect point (pip).
    PipId
);

define_id!(
    /// Opaque ID for a placed logic site (bel).
    BelId
);

define_id!(
    /// Opaque ID for a cell in the logical netlist.
    CellId
);
