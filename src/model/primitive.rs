//! The fixed scalar registry of the IDL.
//!
//! Each IDL scalar maps to exactly one target scalar and one byte width.
//! Widths are wire-significant: generated structs are laid straight onto
//! NIC buffers, so `int32` is four bytes on both ends of a connection.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
}

impl Primitive {
    /// Every registered scalar, in registry order.
    pub const ALL: &'static [Primitive] = &[
        Primitive::Char,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Float,
        Primitive::Double,
    ];

    /// Look up a scalar by its IDL spelling (`int32`, `double`, ...).
    pub fn from_idl(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.idl_name() == name)
    }

    pub const fn idl_name(self) -> &'static str {
        match self {
            Primitive::Char => "char",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Name of the scalar in the generated C++ unit.
    pub const fn target_name(self) -> &'static str {
        match self {
            Primitive::Char => "char",
            Primitive::Int8 => "uint8_t",
            Primitive::Int16 => "uint16_t",
            Primitive::Int32 => "uint32_t",
            Primitive::Int64 => "uint64_t",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Primitive::Char | Primitive::Int8 => 1,
            Primitive::Int16 => 2,
            Primitive::Int32 | Primitive::Float => 4,
            Primitive::Int64 | Primitive::Double => 8,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idl_name())
    }
}
