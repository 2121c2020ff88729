//! Error type for recoverable failures

use thiserror::Error;

use crate::network::Link;

/// Error returned when an operation of the crate fails
///
/// Violated preconditions (invalid gates, unsorted or malformed netlists, missing
/// bindings for the checker) are programming errors and panic instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The two netlists of a miter have different numbers of inputs
    #[error("netlists have different numbers of inputs: {0} vs {1}")]
    MiterInputCount(usize, usize),

    /// The two netlists of a miter have different numbers of outputs
    #[error("netlists have different numbers of outputs: {0} vs {1}")]
    MiterOutputCount(usize, usize),

    /// A source link is not bound to a link of the other netlist
    #[error("source link {0} is not bound")]
    UnboundSource(Link),

    /// A target link is not bound to a link of the other netlist
    #[error("target link {0} is not bound")]
    UnboundTarget(Link),

    /// The SAT solver failed
    #[error("SAT solver failure: {0}")]
    Oracle(String),

    /// A netlist file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// A netlist cannot be written in the requested format
    #[error("unsupported in this format: {0}")]
    Unsupported(String),

    /// File input or output failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type of the crate
pub type Result<T> = std::result::Result<T, Error>;
