//! Go-between column types: selectors that tell the driver which value type a column
//! (or an output bind) materializes into.

use std::fmt;

/// Return-type selector.
///
/// `Ora*` selectors are nullable: a null column reads as [`Value::Null`](crate::Value::Null),
/// which converts into an [`Ora`](crate::Ora) wrapper with `is_null` set. Plain selectors read
/// a null column as the zero value of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Use the configured default for the column's Oracle type.
    Default,
    I64, I32, I16, I8,
    U64, U32, U16, U8,
    F64, F32,
    OraI64, OraI32, OraI16, OraI8,
    OraU64, OraU32, OraU16, OraU8,
    OraF64, OraF32,
    /// Wall-clock timestamp
    Time,
    OraTime,
    /// String
    Str,
    OraStr,
    /// Boolean stored as a single character
    Bool,
    OraBool,
    /// Byte slice
    Bin,
    OraBin,
    /// Arbitrary-precision numeric string
    Num,
    OraNum,
    /// Streaming LOB
    Lob,
}

use ColumnType::*;

impl ColumnType {
    pub fn is_nullable(self) -> bool {
        matches!(self,
            OraI64 | OraI32 | OraI16 | OraI8 | OraU64 | OraU32 | OraU16 | OraU8 | OraF64 | OraF32 |
            OraTime | OraStr | OraBool | OraBin | OraNum | Lob
        )
    }

    /// Returns the non-nullable counterpart of a nullable selector.
    pub fn base(self) -> Self {
        match self {
            OraI64 => I64, OraI32 => I32, OraI16 => I16, OraI8 => I8,
            OraU64 => U64, OraU32 => U32, OraU16 => U16, OraU8 => U8,
            OraF64 => F64, OraF32 => F32,
            OraTime => Time, OraStr => Str, OraBool => Bool, OraBin => Bin, OraNum => Num,
            other => other,
        }
    }

    pub(crate) fn is_integer(self) -> bool {
        matches!(self.base(), I64 | I32 | I16 | I8 | U64 | U32 | U16 | U8)
    }

    pub(crate) fn is_float(self) -> bool {
        matches!(self.base(), F64 | F32)
    }

    /// Selectors a NUMBER, FLOAT or BINARY_* column may be read as.
    pub(crate) fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.base() == Num
    }

    pub(crate) fn is_time(self) -> bool {
        self.base() == Time
    }

    pub(crate) fn is_text(self) -> bool {
        self.base() == Str
    }

    pub(crate) fn is_bool(self) -> bool {
        self.base() == Bool
    }

    pub(crate) fn is_bin(self) -> bool {
        self.base() == Bin
    }
}

impl std::default::Default for ColumnType {
    fn default() -> Self {
        ColumnType::Default
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_selectors() {
        assert!(OraStr.is_nullable());
        assert!(!Str.is_nullable());
        assert_eq!(OraU16.base(), U16);
        assert_eq!(Lob.base(), Lob);
        assert!(OraNum.is_numeric());
        assert!(!Time.is_numeric());
    }

    #[test]
    fn default_selector() {
        assert_eq!(ColumnType::default(), ColumnType::Default);
        let gcts : Vec<ColumnType> = vec![std::default::Default::default(); 2];
        assert!(gcts.iter().all(|&gct| gct == Default));
    }
}
