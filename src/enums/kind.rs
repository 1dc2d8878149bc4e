//! # NumericKind Module
//!
//! The closed catalogue of element kinds the engine can hold, plus the
//! type-class membership queries the kernels and the registry consume.
//!
//! The kernels never inspect a kind at run-time inside a loop; kinds are
//! resolved once at dispatch and then fixed by a generic type parameter.

use std::fmt::{Display, Formatter};

/// Scalar element type tag for an array buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Pointer-sized signed integer
    Isize,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Pointer-sized unsigned integer
    Usize,
    Float32,
    Float64,
    /// Pair of `f32`
    Complex64,
    /// Pair of `f64`
    Complex128,
    String,
}

impl NumericKind {
    /// Every kind, in declaration order.
    pub const ALL: [NumericKind; 16] = [
        NumericKind::Bool,
        NumericKind::Int8,
        NumericKind::Int16,
        NumericKind::Int32,
        NumericKind::Int64,
        NumericKind::Isize,
        NumericKind::UInt8,
        NumericKind::UInt16,
        NumericKind::UInt32,
        NumericKind::UInt64,
        NumericKind::Usize,
        NumericKind::Float32,
        NumericKind::Float64,
        NumericKind::Complex64,
        NumericKind::Complex128,
        NumericKind::String,
    ];

    /// Lower-case name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Bool => "bool",
            NumericKind::Int8 => "int8",
            NumericKind::Int16 => "int16",
            NumericKind::Int32 => "int32",
            NumericKind::Int64 => "int64",
            NumericKind::Isize => "isize",
            NumericKind::UInt8 => "uint8",
            NumericKind::UInt16 => "uint16",
            NumericKind::UInt32 => "uint32",
            NumericKind::UInt64 => "uint64",
            NumericKind::Usize => "usize",
            NumericKind::Float32 => "float32",
            NumericKind::Float64 => "float64",
            NumericKind::Complex64 => "complex64",
            NumericKind::Complex128 => "complex128",
            NumericKind::String => "string",
        }
    }

    /// Element width in bytes. `String` reports its handle size.
    pub const fn size_in_bytes(self) -> usize {
        match self {
            NumericKind::Bool | NumericKind::Int8 | NumericKind::UInt8 => 1,
            NumericKind::Int16 | NumericKind::UInt16 => 2,
            NumericKind::Int32 | NumericKind::UInt32 | NumericKind::Float32 => 4,
            NumericKind::Int64
            | NumericKind::UInt64
            | NumericKind::Float64
            | NumericKind::Complex64 => 8,
            NumericKind::Isize | NumericKind::Usize => std::mem::size_of::<usize>(),
            NumericKind::Complex128 => 16,
            NumericKind::String => std::mem::size_of::<String>(),
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            NumericKind::Int8
                | NumericKind::Int16
                | NumericKind::Int32
                | NumericKind::Int64
                | NumericKind::Isize
        )
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            NumericKind::UInt8
                | NumericKind::UInt16
                | NumericKind::UInt32
                | NumericKind::UInt64
                | NumericKind::Usize
        )
    }

    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub const fn is_float(self) -> bool {
        matches!(self, NumericKind::Float32 | NumericKind::Float64)
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, NumericKind::Complex64 | NumericKind::Complex128)
    }

    /// Integers, floats and complex.
    pub const fn is_number(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    /// Integers and floats.
    pub const fn is_non_complex_number(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Kinds with a total or partial order usable by `<`/`>`.
    ///
    /// Complex numbers and booleans are unordered.
    pub const fn is_ordered(self) -> bool {
        self.is_non_complex_number() || matches!(self, NumericKind::String)
    }

    /// Kinds closed under `+` (strings concatenate).
    pub const fn supports_addition(self) -> bool {
        self.is_number() || matches!(self, NumericKind::String)
    }

    /// Kinds with an additive identity.
    pub const fn has_zero(self) -> bool {
        self.supports_addition()
    }

    /// Kinds with a multiplicative identity.
    pub const fn has_one(self) -> bool {
        self.is_number()
    }

    /// Whether division (and modulo) by zero is a hard error for this kind.
    ///
    /// Floating and complex kinds produce `Inf`/`NaN` instead.
    pub const fn div_by_zero_fails(self) -> bool {
        self.is_integer()
    }

    /// Kinds that can hold a comparison result in their own representation.
    pub const fn has_truthy_encoding(self) -> bool {
        self.is_number() || matches!(self, NumericKind::Bool)
    }
}

impl Display for NumericKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
