//! Common result and error types for the routing core.

/// The standard result type for fallible routing operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// A fatal routing error.
///
/// Every variant aborts the whole routing run. Recoverable conditions (a
/// net that cannot be routed without evicting others) are reported through
/// return values, not through this type.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// A net references a cell that has not been assigned a bel.
    #[error("cell {cell} is not mapped to a bel")]
    UnplacedCell {
        /// Name of the unplaced cell.
        cell: String,
    },

    /// A cell port has no corresponding wire on the cell's bel.
    #[error("no wire found for port {port} on cell {cell}")]
    UnmappedPin {
        /// Name of the cell.
        cell: String,
        /// Name of the unmapped port.
        port: String,
    },

    /// A net has no driver and cannot be routed.
    #[error("net {net} has no driver")]
    NoDriver {
        /// Name of the driverless net.
        net: String,
    },

    /// A bind operation targeted a resource that is already claimed.
    #[error("{resource} is already bound to net {net}")]
    AlreadyBound {
        /// Description of the wire or pip.
        resource: String,
        /// Name of the net currently holding the binding.
        net: String,
    },

    /// An unbind operation targeted a resource with no binding.
    #[error("{resource} is not bound to any net")]
    NotBound {
        /// Description of the wire or pip.
        resource: String,
    },

    /// An unbind operation targeted a binding stronger than the router's.
    #[error("{resource} is bound above router strength and cannot be released")]
    StrongBinding {
        /// Description of the wire or pip.
        resource: String,
    },

    /// A bind or query operation named a net that does not exist.
    #[error("no net named {net}")]
    UnknownNet {
        /// The unknown net name.
        net: String,
    },

    /// A net cannot be routed even when evicting other nets.
    #[error("net {net} is impossible to route")]
    Unroutable {
        /// Name of the impossible net.
        net: String,
    },

    /// The routing database failed an internal consistency check.
    #[error("routing database inconsistent: {0}")]
    Inconsistent(String),
}
