//! # Operators Module
//!
//! Names of the binary elementwise operations the engine executes.
//!
//! Per-operation metadata (symbol, identity, inverse, kind predicate)
//! lives in the static registry under [crate::kernels::registry].

use std::fmt::{Display, Formatter};

/// Binary elementwise operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpName {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Gt,
    Gte,
    Lt,
    Lte,
    ElEq,
    ElNe,
}

/// Broad family an operation belongs to.
///
/// Arithmetic results keep the operand kind; comparison results are either
/// a bool array or the operand kind with a truthy encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Comparison,
}

impl OpName {
    pub const ALL: [OpName; 12] = [
        OpName::Add,
        OpName::Sub,
        OpName::Mul,
        OpName::Div,
        OpName::Pow,
        OpName::Mod,
        OpName::Gt,
        OpName::Gte,
        OpName::Lt,
        OpName::Lte,
        OpName::ElEq,
        OpName::ElNe,
    ];

    #[inline]
    pub const fn class(self) -> OpClass {
        match self {
            OpName::Add | OpName::Sub | OpName::Mul | OpName::Div | OpName::Pow | OpName::Mod => {
                OpClass::Arithmetic
            }
            _ => OpClass::Comparison,
        }
    }

    #[inline]
    pub const fn is_comparison(self) -> bool {
        matches!(self.class(), OpClass::Comparison)
    }

    pub const fn name(self) -> &'static str {
        match self {
            OpName::Add => "Add",
            OpName::Sub => "Sub",
            OpName::Mul => "Mul",
            OpName::Div => "Div",
            OpName::Pow => "Pow",
            OpName::Mod => "Mod",
            OpName::Gt => "Gt",
            OpName::Gte => "Gte",
            OpName::Lt => "Lt",
            OpName::Lte => "Lte",
            OpName::ElEq => "ElEq",
            OpName::ElNe => "ElNe",
        }
    }
}

impl Display for OpName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
