//! Values exchanged with the database: bind inputs, output binds and fetched cells.

use crate::{Result, Error, ColumnType, lob::Lob, stmt::Rset};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::{fmt, convert::TryFrom, collections::HashMap};

/**
Nullable wrapper. A null reads as `Ora { value: T::default(), is_null: true }`.

# Example

```
use ora::{Ora, Value};

let v : Ora<i64> = Ora::null();
assert!(v.is_null);
assert_eq!(Value::from(v), Value::Null);
assert_eq!(Value::from(Ora::new(7i64)), Value::I64(7));
```
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ora<T> {
    pub value: T,
    pub is_null: bool,
}

impl<T> Ora<T> {
    pub fn new(value: T) -> Self {
        Self { value, is_null: false }
    }

    pub fn null() -> Self where T: Default {
        Self { value: T::default(), is_null: true }
    }

    /// Converts into `Option`, losing the zero value kept for nulls.
    pub fn into_option(self) -> Option<T> {
        if self.is_null { None } else { Some(self.value) }
    }
}

/// Arbitrary-precision decimal number in its text form, as `OCINumberToText` renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Num(pub String);

impl Num {
    /**
    Creates a numeric string, checking that it is a plain or scientific decimal literal.

    # Example

    ```
    use ora::Num;

    assert!(Num::new("-12.5e3").is_ok());
    assert!(Num::new("12,5").is_err());
    ```
    */
    pub fn new(txt: &str) -> Result<Self> {
        let txt = txt.trim();
        if is_decimal_literal(txt) {
            Ok( Num(txt.to_string()) )
        } else {
            Err( Error::bind(format!("{:?} is not a number", txt)) )
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_decimal_literal(txt: &str) -> bool {
    let (mantissa, exponent) = match txt.find(|c| c == 'e' || c == 'E') {
        Some(pos) => (&txt[..pos], Some(&txt[pos + 1..])),
        None => (txt, None),
    };
    let mantissa = mantissa.strip_prefix(|c| c == '-' || c == '+').unwrap_or(mantissa);
    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }
    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(|c| c == '-' || c == '+').unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `INTERVAL YEAR TO MONTH`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalYM {
    pub year: i32,
    pub month: i32,
    pub is_null: bool,
}

impl IntervalYM {
    pub fn new(year: i32, month: i32) -> Self {
        Self { year, month, is_null: false }
    }
}

/// `INTERVAL DAY TO SECOND`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalDS {
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub nanosecond: i32,
    pub is_null: bool,
}

impl IntervalDS {
    pub fn new(day: i32, hour: i32, minute: i32, second: i32, nanosecond: i32) -> Self {
        Self { day, hour, minute, second, nanosecond, is_null: false }
    }
}

/// Reference to an external file: directory alias and file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bfile {
    pub dir_alias: String,
    pub file_name: String,
    pub is_null: bool,
}

impl Bfile {
    pub fn new(dir_alias: &str, file_name: &str) -> Self {
        Self { dir_alias: dir_alias.to_string(), file_name: file_name.to_string(), is_null: false }
    }
}

/**
A bind argument or a fetched cell.

Nullable selectors read a null column as `Value::Null`. Non-nullable selectors read it as
the zero value of the selected type.
*/
pub enum Value {
    Null,
    I64(i64), I32(i32), I16(i16), I8(i8),
    U64(u64), U32(u32), U16(u16), U8(u8),
    F64(f64), F32(f32),
    Time(DateTime<FixedOffset>),
    Str(String),
    Bool(bool),
    Bin(Vec<u8>),
    Num(Num),
    IntervalYM(IntervalYM),
    IntervalDS(IntervalDS),
    Bfile(Bfile),
    /// Streaming LOB. While it is open the owning statement rejects every other call.
    Lob(Lob),
    /// Nested result-set (REF CURSOR column)
    Rset(Rset),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::IntervalYM(v) => v.is_null,
            Value::IntervalDS(v) => v.is_null,
            Value::Bfile(v) => v.is_null,
            _ => false,
        }
    }

    /// Name of the value type for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::I64(_) => "i64",
            Value::I32(_) => "i32",
            Value::I16(_) => "i16",
            Value::I8(_) => "i8",
            Value::U64(_) => "u64",
            Value::U32(_) => "u32",
            Value::U16(_) => "u16",
            Value::U8(_) => "u8",
            Value::F64(_) => "f64",
            Value::F32(_) => "f32",
            Value::Time(_) => "time",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Bin(_) => "bytes",
            Value::Num(_) => "num",
            Value::IntervalYM(_) => "interval year to month",
            Value::IntervalDS(_) => "interval day to second",
            Value::Bfile(_) => "bfile",
            Value::Lob(_) => "lob",
            Value::Rset(_) => "rset",
        }
    }

    /// Takes the streaming LOB out of the cell.
    pub fn into_lob(self) -> Result<Lob> {
        match self {
            Value::Lob(lob) => Ok(lob),
            other => Err( mismatch("lob", &other) ),
        }
    }

    /// Takes the nested result-set out of the cell.
    pub fn into_rset(self) -> Result<Rset> {
        match self {
            Value::Rset(rset) => Ok(rset),
            other => Err( mismatch("rset", &other) ),
        }
    }

    // Signed view of integer and floating values; floats are truncated.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::I64(v) => Some(v as i128),
            Value::I32(v) => Some(v as i128),
            Value::I16(v) => Some(v as i128),
            Value::I8(v)  => Some(v as i128),
            Value::U64(v) => Some(v as i128),
            Value::U32(v) => Some(v as i128),
            Value::U16(v) => Some(v as i128),
            Value::U8(v)  => Some(v as i128),
            Value::F64(v) => Some(v.trunc() as i128),
            Value::F32(v) => Some(v.trunc() as i128),
            Value::Bool(v) => Some(v as i128),
            _ => None,
        }
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(v) => Some(v),
            Value::F32(v) => Some(v as f64),
            _ => self.as_i128().map(|v| v as f64),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::I64(v) => write!(f, "I64({})", v),
            Value::I32(v) => write!(f, "I32({})", v),
            Value::I16(v) => write!(f, "I16({})", v),
            Value::I8(v)  => write!(f, "I8({})", v),
            Value::U64(v) => write!(f, "U64({})", v),
            Value::U32(v) => write!(f, "U32({})", v),
            Value::U16(v) => write!(f, "U16({})", v),
            Value::U8(v)  => write!(f, "U8({})", v),
            Value::F64(v) => write!(f, "F64({})", v),
            Value::F32(v) => write!(f, "F32({})", v),
            Value::Time(v) => write!(f, "Time({})", v),
            Value::Str(v) => write!(f, "Str({:?})", v),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Bin(v) => write!(f, "Bin({:02x?})", v),
            Value::Num(v) => write!(f, "Num({})", v),
            Value::IntervalYM(v) => write!(f, "{:?}", v),
            Value::IntervalDS(v) => write!(f, "{:?}", v),
            Value::Bfile(v) => write!(f, "{:?}", v),
            Value::Lob(v) => write!(f, "Lob({})", v.id()),
            Value::Rset(v) => write!(f, "Rset({})", v.id()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I8(a),  Value::I8(b))  => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U8(a),  Value::U8(b))  => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bin(a), Value::Bin(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::IntervalYM(a), Value::IntervalYM(b)) => a == b,
            (Value::IntervalDS(a), Value::IntervalDS(b)) => a == b,
            (Value::Bfile(a), Value::Bfile(b)) => a == b,
            (Value::Lob(a), Value::Lob(b)) => a.id() == b.id(),
            (Value::Rset(a), Value::Rset(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty => $var:ident),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self { Value::$var(v) }
            }
        )+
    };
}

impl_from_scalar!{
    i64 => I64, i32 => I32, i16 => I16, i8 => I8,
    u64 => U64, u32 => U32, u16 => U16, u8 => U8,
    f64 => F64, f32 => F32,
    bool => Bool, String => Str, Vec<u8> => Bin, Num => Num,
    DateTime<FixedOffset> => Time, Lob => Lob, Rset => Rset
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Str(v.to_string()) }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self { Value::Bin(v.to_vec()) }
}

impl From<IntervalYM> for Value {
    fn from(v: IntervalYM) -> Self {
        if v.is_null { Value::Null } else { Value::IntervalYM(v) }
    }
}

impl From<IntervalDS> for Value {
    fn from(v: IntervalDS) -> Self {
        if v.is_null { Value::Null } else { Value::IntervalDS(v) }
    }
}

impl From<Bfile> for Value {
    fn from(v: Bfile) -> Self {
        if v.is_null { Value::Null } else { Value::Bfile(v) }
    }
}

impl<T: Into<Value>> From<Ora<T>> for Value {
    fn from(v: Ora<T>) -> Self {
        if v.is_null { Value::Null } else { v.value.into() }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

fn mismatch(target: &str, val: &Value) -> Error {
    Error::msg(format!("cannot read {} as {}", val.type_name(), target))
}

/**
Conversion of a fetched cell (or an output bind) into a Rust value.

Numeric conversions check the range of the target and fail instead of wrapping.
A null converts into the zero value unless the target is [`Ora`] or `Option`.
*/
pub trait FromValue: Sized {
    fn from_value(val: &Value) -> Result<Self>;
}

macro_rules! impl_from_value_int {
    ($($t:ty),+) => {
        $(
            impl FromValue for $t {
                fn from_value(val: &Value) -> Result<Self> {
                    match val {
                        Value::Null => Ok(0),
                        Value::Num(num) => {
                            let txt = num.as_str();
                            txt.parse::<$t>()
                                .or_else(|_| txt.parse::<f64>().map(|f| f.trunc()).map_err(|_| ()).and_then(|f| {
                                    if f >= <$t>::MIN as f64 && f <= <$t>::MAX as f64 { Ok(f as $t) } else { Err(()) }
                                }))
                                .map_err(|_| Error::msg(format!("{} does not fit into {}", txt, stringify!($t))))
                        }
                        Value::Str(txt) => txt.trim().parse::<$t>().map_err(|_| mismatch(stringify!($t), val)),
                        _ => match val.as_i128() {
                            Some(v) => <$t>::try_from(v).map_err(|_| Error::msg(format!("{} does not fit into {}", v, stringify!($t)))),
                            None => Err( mismatch(stringify!($t), val) ),
                        }
                    }
                }
            }
        )+
    };
}

impl_from_value_int!{ i64, i32, i16, i8, u64, u32, u16, u8 }

macro_rules! impl_from_value_float {
    ($($t:ty),+) => {
        $(
            impl FromValue for $t {
                fn from_value(val: &Value) -> Result<Self> {
                    match val {
                        Value::Null => Ok(0.0),
                        Value::Num(num) => num.as_str().parse::<$t>().map_err(|_| mismatch(stringify!($t), val)),
                        Value::Str(txt) => txt.trim().parse::<$t>().map_err(|_| mismatch(stringify!($t), val)),
                        _ => val.as_f64().map(|v| v as $t).ok_or_else(|| mismatch(stringify!($t), val)),
                    }
                }
            }
        )+
    };
}

impl_from_value_float!{ f64, f32 }

impl FromValue for bool {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok(false),
            Value::Bool(v) => Ok(*v),
            _ => match val.as_i128() {
                Some(v) => Ok(v != 0),
                None => Err( mismatch("bool", val) ),
            }
        }
    }
}

impl FromValue for String {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok(String::new()),
            Value::Str(v) => Ok(v.clone()),
            Value::Num(v) => Ok(v.0.clone()),
            Value::Bool(v) => Ok(v.to_string()),
            Value::Time(v) => Ok(v.to_rfc3339()),
            Value::I64(v) => Ok(v.to_string()),
            Value::I32(v) => Ok(v.to_string()),
            Value::I16(v) => Ok(v.to_string()),
            Value::I8(v)  => Ok(v.to_string()),
            Value::U64(v) => Ok(v.to_string()),
            Value::U32(v) => Ok(v.to_string()),
            Value::U16(v) => Ok(v.to_string()),
            Value::U8(v)  => Ok(v.to_string()),
            Value::F64(v) => Ok(v.to_string()),
            Value::F32(v) => Ok(v.to_string()),
            _ => Err( mismatch("string", val) ),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok(Vec::new()),
            Value::Bin(v) => Ok(v.clone()),
            _ => Err( mismatch("bytes", val) ),
        }
    }
}

impl FromValue for Num {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok(Num::default()),
            Value::Num(v) => Ok(v.clone()),
            Value::Str(v) => Num::new(v),
            Value::F64(_) | Value::F32(_) => Ok( Num(String::from_value(val)?) ),
            _ if val.as_i128().is_some() => Ok( Num(String::from_value(val)?) ),
            _ => Err( mismatch("num", val) ),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok( zero_time() ),
            Value::Time(v) => Ok(*v),
            _ => Err( mismatch("time", val) ),
        }
    }
}

impl FromValue for IntervalYM {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok( IntervalYM { is_null: true, ..IntervalYM::default() } ),
            Value::IntervalYM(v) => Ok(*v),
            _ => Err( mismatch("interval year to month", val) ),
        }
    }
}

impl FromValue for IntervalDS {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok( IntervalDS { is_null: true, ..IntervalDS::default() } ),
            Value::IntervalDS(v) => Ok(*v),
            _ => Err( mismatch("interval day to second", val) ),
        }
    }
}

impl FromValue for Bfile {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok( Bfile { is_null: true, ..Bfile::default() } ),
            Value::Bfile(v) => Ok(v.clone()),
            _ => Err( mismatch("bfile", val) ),
        }
    }
}

impl<T: FromValue + Default> FromValue for Ora<T> {
    fn from_value(val: &Value) -> Result<Self> {
        if val.is_null() {
            Ok( Ora::null() )
        } else {
            T::from_value(val).map(Ora::new)
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(val: &Value) -> Result<Self> {
        if val.is_null() {
            Ok(None)
        } else {
            T::from_value(val).map(Some)
        }
    }
}

impl FromValue for Value {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Lob(_) | Value::Rset(_) => Err( Error::msg(format!("a {} cell cannot be copied, take it instead", val.type_name())) ),
            Value::Null => Ok(Value::Null),
            Value::I64(v) => Ok(Value::I64(*v)),
            Value::I32(v) => Ok(Value::I32(*v)),
            Value::I16(v) => Ok(Value::I16(*v)),
            Value::I8(v)  => Ok(Value::I8(*v)),
            Value::U64(v) => Ok(Value::U64(*v)),
            Value::U32(v) => Ok(Value::U32(*v)),
            Value::U16(v) => Ok(Value::U16(*v)),
            Value::U8(v)  => Ok(Value::U8(*v)),
            Value::F64(v) => Ok(Value::F64(*v)),
            Value::F32(v) => Ok(Value::F32(*v)),
            Value::Time(v) => Ok(Value::Time(*v)),
            Value::Str(v) => Ok(Value::Str(v.clone())),
            Value::Bool(v) => Ok(Value::Bool(*v)),
            Value::Bin(v) => Ok(Value::Bin(v.clone())),
            Value::Num(v) => Ok(Value::Num(v.clone())),
            Value::IntervalYM(v) => Ok(Value::IntervalYM(*v)),
            Value::IntervalDS(v) => Ok(Value::IntervalDS(*v)),
            Value::Bfile(v) => Ok(Value::Bfile(v.clone())),
        }
    }
}

/// The value a null cell takes under a non-nullable selector.
pub(crate) fn zero_value(gct: ColumnType) -> Value {
    match gct.base() {
        ColumnType::I64 => Value::I64(0),
        ColumnType::I32 => Value::I32(0),
        ColumnType::I16 => Value::I16(0),
        ColumnType::I8  => Value::I8(0),
        ColumnType::U64 => Value::U64(0),
        ColumnType::U32 => Value::U32(0),
        ColumnType::U16 => Value::U16(0),
        ColumnType::U8  => Value::U8(0),
        ColumnType::F64 => Value::F64(0.0),
        ColumnType::F32 => Value::F32(0.0),
        ColumnType::Time => Value::Time(zero_time()),
        ColumnType::Str => Value::Str(String::new()),
        ColumnType::Bool => Value::Bool(false),
        ColumnType::Bin => Value::Bin(Vec::new()),
        ColumnType::Num => Value::Num(Num(String::from("0"))),
        _ => Value::Null,
    }
}

/// Narrows a fetched or returned integer to the width `gct` selects.
pub(crate) fn int_value(v: i128, gct: ColumnType) -> Result<Value> {
    let overflow = || Error::msg(format!("{} overflows {}", v, gct.base()));
    let val = match gct.base() {
        ColumnType::I32 => Value::I32( i32::try_from(v).map_err(|_| overflow())? ),
        ColumnType::I16 => Value::I16( i16::try_from(v).map_err(|_| overflow())? ),
        ColumnType::I8  => Value::I8 ( i8::try_from(v).map_err(|_| overflow())? ),
        ColumnType::U64 => Value::U64( u64::try_from(v).map_err(|_| overflow())? ),
        ColumnType::U32 => Value::U32( u32::try_from(v).map_err(|_| overflow())? ),
        ColumnType::U16 => Value::U16( u16::try_from(v).map_err(|_| overflow())? ),
        ColumnType::U8  => Value::U8 ( u8::try_from(v).map_err(|_| overflow())? ),
        ColumnType::F64 => Value::F64(v as f64),
        ColumnType::F32 => Value::F32(v as f32),
        ColumnType::Num => Value::Num( Num(v.to_string()) ),
        _ => Value::I64( i64::try_from(v).map_err(|_| overflow())? ),
    };
    Ok(val)
}

/// Range of the integer type `gct` selects.
pub(crate) fn int_range(gct: ColumnType) -> (i128, i128) {
    match gct.base() {
        ColumnType::I32 => (i32::MIN as i128, i32::MAX as i128),
        ColumnType::I16 => (i16::MIN as i128, i16::MAX as i128),
        ColumnType::I8  => (i8::MIN as i128, i8::MAX as i128),
        ColumnType::U64 => (0, u64::MAX as i128),
        ColumnType::U32 => (0, u32::MAX as i128),
        ColumnType::U16 => (0, u16::MAX as i128),
        ColumnType::U8  => (0, u8::MAX as i128),
        _ => (i64::MIN as i128, i64::MAX as i128),
    }
}

/// Selector matching the type of a value, `Default` for values without one.
pub(crate) fn gct_of(val: &Value) -> ColumnType {
    match val {
        Value::I64(_) => ColumnType::I64,
        Value::I32(_) => ColumnType::I32,
        Value::I16(_) => ColumnType::I16,
        Value::I8(_)  => ColumnType::I8,
        Value::U64(_) => ColumnType::U64,
        Value::U32(_) => ColumnType::U32,
        Value::U16(_) => ColumnType::U16,
        Value::U8(_)  => ColumnType::U8,
        Value::F64(_) => ColumnType::F64,
        Value::F32(_) => ColumnType::F32,
        Value::Time(_) => ColumnType::Time,
        Value::Str(_) => ColumnType::Str,
        Value::Bool(_) => ColumnType::Bool,
        Value::Bin(_) => ColumnType::Bin,
        Value::Num(_) => ColumnType::Num,
        Value::Lob(_) => ColumnType::Lob,
        _ => ColumnType::Default,
    }
}

/// The zero timestamp (the Unix epoch in UTC), read for a null non-nullable time column.
pub(crate) fn zero_time() -> DateTime<FixedOffset> {
    DateTime::<FixedOffset>::default()
}

/// Assembles a timestamp from the parts OCI reports for a datetime descriptor.
pub(crate) fn make_time(year: i16, month: u8, day: u8, hour: u8, min: u8, sec: u8, nsec: u32, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_nano_opt(hour as u32, min as u32, sec as u32, nsec))
        .and_then(|dt| offset.from_local_datetime(&dt).single())
        .ok_or_else(|| Error::msg(format!("invalid timestamp {:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:09}", year, month, day, hour, min, sec, nsec)))
}

static LOCATIONS : Lazy<Mutex<HashMap<String, FixedOffset>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/**
Resolves a time zone offset name such as `+05:30`, `-08:00`, `UTC` or `Z`.
Resolved names are cached for the life of the process.
*/
pub(crate) fn location(name: &str) -> Result<FixedOffset> {
    let name = name.trim();
    if let Some(loc) = LOCATIONS.lock().get(name) {
        return Ok(*loc);
    }
    let loc = parse_offset(name).ok_or_else(|| Error::msg(format!("unknown time zone offset {:?}", name)))?;
    LOCATIONS.lock().insert(name.to_string(), loc);
    Ok(loc)
}

/// Returns the offset for a whole-minute displacement from UTC.
pub(crate) fn offset_of(tz_hour: i8, tz_min: i8) -> Result<FixedOffset> {
    let secs = (tz_hour as i32 * 60 + tz_min as i32) * 60;
    FixedOffset::east_opt(secs).ok_or_else(|| Error::msg(format!("time zone offset {}:{} is out of range", tz_hour, tz_min)))
}

/// Renders an offset the way OCI datetime constructors accept it: `+HH:MM`.
pub(crate) fn offset_name(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let mins = secs.abs() / 60;
    format!("{}{:02}:{:02}", sign, mins / 60, mins % 60)
}

fn parse_offset(name: &str) -> Option<FixedOffset> {
    if name.eq_ignore_ascii_case("utc") || name.eq_ignore_ascii_case("z") || name.eq_ignore_ascii_case("gmt") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match name.as_bytes().first()? {
        b'+' => (1, &name[1..]),
        b'-' => (-1, &name[1..]),
        _ => return None,
    };
    let (hh, mm) = match rest.find(':') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, "0"),
    };
    let hh : i32 = hh.parse().ok()?;
    let mm : i32 = mm.parse().ok()?;
    if hh > 14 || mm > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hh * 3600 + mm * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_read_as_zero_values() -> Result<()> {
        assert_eq!(i64::from_value(&Value::Null)?, 0);
        assert_eq!(String::from_value(&Value::Null)?, "");
        assert_eq!(bool::from_value(&Value::Null)?, false);
        assert_eq!(Ora::<String>::from_value(&Value::Null)?, Ora { value: String::new(), is_null: true });
        assert_eq!(Option::<i32>::from_value(&Value::Null)?, None);
        assert!(IntervalDS::from_value(&Value::Null)?.is_null);
        Ok(())
    }

    #[test]
    fn integer_range_is_checked() -> Result<()> {
        assert_eq!(u8::from_value(&Value::I64(255))?, 255);
        assert!(u8::from_value(&Value::I64(256)).is_err());
        assert!(u32::from_value(&Value::I64(-1)).is_err());
        assert_eq!(i16::from_value(&Value::F64(-12.9))?, -12);
        assert_eq!(i64::from_value(&Value::Num(Num("12345678901234".into())))?, 12345678901234);
        assert!(i8::from_value(&Value::Num(Num("1000".into()))).is_err());
        Ok(())
    }

    #[test]
    fn num_literals() {
        assert!(Num::new("0").is_ok());
        assert!(Num::new("-.5").is_ok());
        assert!(Num::new("1.5E-10").is_ok());
        assert!(Num::new("").is_err());
        assert!(Num::new("1.2.3").is_err());
        assert!(Num::new("1e").is_err());
        assert!(Num::new("abc").is_err());
    }

    #[test]
    fn offsets() -> Result<()> {
        assert_eq!(location("+05:30")?.local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(location("-08:00")?.local_minus_utc(), -8 * 3600);
        assert_eq!(location("UTC")?.local_minus_utc(), 0);
        assert!(location("Mars/Olympus").is_err());
        assert_eq!(offset_name(&location("-03:30")?), "-03:30");
        assert_eq!(offset_name(&offset_of(0, 0)?), "+00:00");
        Ok(())
    }

    #[test]
    fn timestamps() -> Result<()> {
        let ts = make_time(2024, 2, 29, 23, 59, 58, 500_000_000, location("+02:00")?)?;
        assert_eq!(ts.to_rfc3339(), "2024-02-29T23:59:58.500+02:00");
        assert!(make_time(2023, 2, 29, 0, 0, 0, 0, location("+00:00")?).is_err());
        Ok(())
    }

    #[test]
    fn narrowing() -> Result<()> {
        assert_eq!(int_value(-5, ColumnType::I8)?, Value::I8(-5));
        assert_eq!(int_value(300, ColumnType::OraU16)?, Value::U16(300));
        assert!(int_value(300, ColumnType::U8).is_err());
        assert!(int_value(-1, ColumnType::U64).is_err());
        assert_eq!(int_value(7, ColumnType::Num)?, Value::Num(Num("7".into())));
        assert_eq!(int_value(7, ColumnType::Default)?, Value::I64(7));
        assert_eq!(int_range(ColumnType::OraI16), (-32768, 32767));
        assert_eq!(gct_of(&Value::U8(1)), ColumnType::U8);
        assert_eq!(gct_of(&Value::Null), ColumnType::Default);
        Ok(())
    }

    #[test]
    fn values_from_wrappers() {
        assert_eq!(Value::from(Some("a")), Value::Str("a".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(IntervalYM { is_null: true, ..IntervalYM::default() }), Value::Null);
        assert!(Value::from(Bfile::new("D", "f")).type_name() == "bfile");
    }
}
