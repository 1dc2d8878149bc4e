//! # Error Module - Custom *Minstride* Error Type
//!
//! Defines the unified error type for the elementwise engine.
//!
//! ## Features
//! - Covers shape incompatibility, unsupported kinds, kind mismatches,
//! conflicting call options, invalid access patterns, integer division by zero
//! and cancellation.
//! - `EndOfSequence` is the iterator termination sentinel. Kernels convert it
//! to success, so it never reaches a caller of `dispatch`.
//! - Implements `Display` for readable output and `Error` for integration
//! with standard Rust error handling.

use std::error::Error;
use std::fmt;

use crate::enums::kind::NumericKind;
use crate::enums::operators::OpName;

/// Catch all error type for `Minstride`
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Two shapes cannot be combined, or a destination has the wrong shape.
    ShapeMismatch {
        lhs: Vec<usize>,
        rhs: Vec<usize>,
        message: Option<String>,
    },
    /// The requested operation is not defined for this kind.
    UnsupportedKind {
        op: Option<OpName>,
        kind: NumericKind,
        message: Option<String>,
    },
    /// An operand or destination does not carry the expected kind.
    KindMismatch {
        expected: NumericKind,
        found: NumericKind,
    },
    /// Integer division or modulo by zero at the given output position.
    DivisionByZero { index: usize },
    /// Mutually exclusive options were set together.
    ConflictingOptions(String),
    /// Shape/stride/offset combination is malformed or out of bounds.
    InvalidPattern(String),
    /// The cancellation token was triggered before the call started.
    Cancelled,
    /// Iterator exhausted. Internal sentinel.
    EndOfSequence,
    /// Wraps the first error raised while executing `op`.
    Op {
        op: OpName,
        source: Box<KernelError>,
    },
}

impl KernelError {
    /// Attach the operation name for diagnostics. Idempotent.
    pub fn with_op(self, op: OpName) -> Self {
        match self {
            KernelError::Op { .. } => self,
            other => KernelError::Op {
                op,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, stripping any `Op` wrappers.
    pub fn root(&self) -> &KernelError {
        match self {
            KernelError::Op { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn shape_mismatch(lhs: &[usize], rhs: &[usize]) -> Self {
        KernelError::ShapeMismatch {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
            message: None,
        }
    }

    pub fn unsupported(op: OpName, kind: NumericKind) -> Self {
        KernelError::UnsupportedKind {
            op: Some(op),
            kind,
            message: None,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::ShapeMismatch { lhs, rhs, message } => {
                if let Some(msg) = message {
                    write!(f, "Shape mismatch: {:?} vs {:?}: {}", lhs, rhs, msg)
                } else {
                    write!(f, "Shape mismatch: cannot combine {:?} with {:?}.", lhs, rhs)
                }
            }
            KernelError::UnsupportedKind { op, kind, message } => match (op, message) {
                (Some(op), Some(msg)) => {
                    write!(f, "Unsupported kind: {} is not defined for '{}': {}", op, kind, msg)
                }
                (Some(op), None) => write!(f, "Unsupported kind: {} is not defined for '{}'.", op, kind),
                (None, Some(msg)) => write!(f, "Unsupported kind '{}': {}", kind, msg),
                (None, None) => write!(f, "Unsupported kind '{}'.", kind),
            },
            KernelError::KindMismatch { expected, found } => {
                write!(f, "Kind mismatch: expected '{}', found '{}'.", expected, found)
            }
            KernelError::DivisionByZero { index } => {
                write!(f, "Integer division by zero at element {}.", index)
            }
            KernelError::ConflictingOptions(msg) => write!(f, "Conflicting options: {}", msg),
            KernelError::InvalidPattern(msg) => write!(f, "Invalid access pattern: {}", msg),
            KernelError::Cancelled => write!(f, "Operation cancelled before execution."),
            KernelError::EndOfSequence => write!(f, "End of sequence."),
            KernelError::Op { op, source } => write!(f, "{}: {}", op, source),
        }
    }
}

impl Error for KernelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KernelError::Op { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_op_wraps_once() {
        let e = KernelError::DivisionByZero { index: 3 }
            .with_op(OpName::Div)
            .with_op(OpName::Mod);
        match &e {
            KernelError::Op { op, .. } => assert_eq!(*op, OpName::Div),
            _ => panic!("expected Op wrapper"),
        }
        assert_eq!(e.root(), &KernelError::DivisionByZero { index: 3 });
        assert_eq!(e.to_string(), "Div: Integer division by zero at element 3.");
        assert!(e.source().is_some());
    }

    #[test]
    fn test_unsupported_display() {
        let e = KernelError::unsupported(OpName::Lt, NumericKind::Complex128);
        assert_eq!(
            e.to_string(),
            "Unsupported kind: Lt is not defined for 'complex128'."
        );
    }
}
