//! Shared foundational types for the weft signal router.
//!
//! This crate provides interned identifiers (net, cell, port and pin names
//! are all [`Ident`]s) and the common error types used by the routing core.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{RouteError, RouteResult};
