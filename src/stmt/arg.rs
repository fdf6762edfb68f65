//! Statement arguments

use crate::{ColumnType, Value, lob::LobSrc, stmt::Rset};

/**
A positional statement argument.

Plain values convert into input arguments with `.into()`. Output and in/out
arguments borrow the caller's storage, which is updated after a successful execute.

# Example

```no_run
use ora::{Arg, ColumnType, Value};

# fn test(ses: &ora::Ses) -> ora::Result<()> {
let stmt = ses.prep("BEGIN :out := UPPER(:inp); END;")?;
let mut out = Value::Null;
stmt.exe(&mut [Arg::out_as(&mut out, ColumnType::Str), "abc".into()])?;
assert_eq!(out, Value::Str("ABC".into()));
# Ok(()) }
```
*/
pub enum Arg<'a> {
    /// Input value. `Default` binds the value's own type.
    In(Value, ColumnType),
    /// Input array: a batch for DML, an associative array for PL/SQL blocks.
    InArr(Vec<Value>, ColumnType),
    /// In/out scalar. The current value is sent; the returned one replaces it.
    Out(&'a mut Value, ColumnType),
    /// In/out associative array. The vector is refilled with the returned elements.
    OutArr(&'a mut Vec<Value>, ColumnType),
    /// REF CURSOR output.
    Cursor(&'a mut Option<Rset>),
    /// Input LOB uploaded into a temporary LOB before the execute.
    Lob(LobSrc),
}

impl<'a> Arg<'a> {
    /// Input value bound as `gct`.
    pub fn with(val: impl Into<Value>, gct: ColumnType) -> Self {
        Arg::In(val.into(), gct)
    }

    /// Input array of values of one type.
    pub fn arr<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Arg::InArr(items.into_iter().map(Into::into).collect(), ColumnType::Default)
    }

    /// Input array bound as `gct`.
    pub fn arr_as<T: Into<Value>>(items: impl IntoIterator<Item = T>, gct: ColumnType) -> Self {
        Arg::InArr(items.into_iter().map(Into::into).collect(), gct)
    }

    /// In/out scalar bound with the type of its current value.
    pub fn out(val: &'a mut Value) -> Self {
        Arg::Out(val, ColumnType::Default)
    }

    /// In/out scalar bound as `gct`.
    pub fn out_as(val: &'a mut Value, gct: ColumnType) -> Self {
        Arg::Out(val, gct)
    }

    /// In/out associative array bound as `gct`.
    pub fn out_arr(vals: &'a mut Vec<Value>, gct: ColumnType) -> Self {
        Arg::OutArr(vals, gct)
    }

    pub fn cursor(rset: &'a mut Option<Rset>) -> Self {
        Arg::Cursor(rset)
    }

    pub fn lob(src: LobSrc) -> Self {
        Arg::Lob(src)
    }

    pub(crate) fn is_array(&self) -> bool {
        matches!(self, Arg::InArr(..) | Arg::OutArr(..))
    }

    pub(crate) fn array_len(&self) -> Option<usize> {
        match self {
            Arg::InArr(vals, _) => Some(vals.len()),
            Arg::OutArr(vals, _) => Some(vals.len()),
            _ => None,
        }
    }
}

impl<T: Into<Value>> From<T> for Arg<'_> {
    fn from(val: T) -> Self {
        Arg::In(val.into(), ColumnType::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        match Arg::from(7i32) {
            Arg::In(Value::I32(7), ColumnType::Default) => {}
            _ => panic!("expected an i32 input"),
        }
        match Arg::from(None::<String>) {
            Arg::In(Value::Null, ColumnType::Default) => {}
            _ => panic!("expected a null input"),
        }
        let arr = Arg::arr(vec![-9i64, -1, 0, 1, 9]);
        assert!(arr.is_array());
        assert_eq!(arr.array_len(), Some(5));

        let mut out = Value::Null;
        let arg = Arg::out_as(&mut out, ColumnType::OraStr);
        assert!(!arg.is_array());
        assert_eq!(arg.array_len(), None);
    }
}
