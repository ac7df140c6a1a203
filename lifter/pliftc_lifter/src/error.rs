//! Lifting failures.
//!
//! There is no local recovery: each variant aborts the current lifting
//! pass. Numeric constants that fail to parse are *not* an error — the
//! resolver substitutes a zero of the requested width instead.

/// The error type for a lifting pass.
#[derive(Debug)]
pub enum LiftError {
    /// An operation named an opcode outside the supported integer subset.
    UnsupportedOpcode(String),
    /// A call targeted an instrumentation symbol outside the known list.
    UnsupportedInstrumentation(String),
    /// A varnode referenced `argc`/`argv`, which have no stable lowering.
    UnsupportedVarnode(String),
    /// The block graph disagrees with an operation (no false edge for a
    /// conditional branch, a branch to an unknown label, a fallthrough
    /// block without an out-edge).
    CfgInconsistency(String),
    /// A malformed operation: unexpected SUBPIECE offset, a missing
    /// required operand, or a direct call to an unknown function.
    InvariantViolation(String),
}

impl std::error::Error for LiftError {}

impl std::fmt::Display for LiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiftError::UnsupportedOpcode(name) => write!(f, "unsupported opcode: {}", name),
            LiftError::UnsupportedInstrumentation(name) => {
                write!(f, "unsupported instrumentation symbol: {}", name)
            }
            LiftError::UnsupportedVarnode(name) => {
                write!(f, "unsupported varnode reference: {}", name)
            }
            LiftError::CfgInconsistency(detail) => write!(f, "inconsistent block graph: {}", detail),
            LiftError::InvariantViolation(detail) => write!(f, "invariant violation: {}", detail),
        }
    }
}
