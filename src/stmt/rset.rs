//! Result-set and rows

use super::{
    Ctx, StmtInner, StmtState,
    define::{self, DefKind, DefineRecord},
};
use crate::{
    Result, Error, ErrorKind, ColumnType, Value,
    drv,
    err::ResultExt,
    log,
    oci::{self, *},
    types::FromValue,
};
use libc::c_void;
use std::sync::{Arc, atomic::{AtomicBool, AtomicI64, Ordering}};

/// Select-list column of an open result-set.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Selector the column is read with
    pub gct: ColumnType,
    /// Oracle type name, e.g. `VARCHAR2`
    pub type_name: &'static str,
}

/// Fetch state of an open result-set. It lives in its statement and goes away on close.
pub(crate) struct RsetState {
    pub(crate) id: u64,
    stmt: Ptr<OCIStmt>,
    // REF CURSOR handles are owned by the result-set
    owned: Option<Handle<OCIStmt>>,
    defs: Vec<DefineRecord>,
    names: Arc<Vec<String>>,
    columns: Vec<Column>,
    fetch_len: usize,
    fetched: usize,
    pos: usize,
    finished: bool,
    warning: Option<Error>,
}

impl RsetState {
    /// Describes the select list of `stmt` and defines every column.
    pub(crate) fn open(ctx: &Ctx, stmt: Ptr<OCIStmt>, owned: Option<Handle<OCIStmt>>, gcts: &[ColumnType]) -> Result<Self> {
        let id = drv::next_id();
        log::op(|cfg| cfg.rset.open, "rset", id, "open");
        let hndl : &OCIStmt = &stmt;
        let cols = define::describe(hndl, ctx.err).at("open", id)?;
        let mut plans = Vec::with_capacity(cols.len());
        for (ix, col) in cols.iter().enumerate() {
            let over = gcts.get(ix).copied().unwrap_or(ColumnType::Default);
            plans.push(define::plan(col, over, ctx.cfg)?);
        }
        let fetch_len = if plans.iter().any(|(_, kind)| *kind == DefKind::Cursor) {
            1
        } else if plans.iter().any(|(_, kind)| kind.is_large()) {
            ctx.cfg.lob_fetch_len() as usize
        } else {
            ctx.cfg.fetch_len() as usize
        };
        log::op_with(|cfg| cfg.rset.open_defs, "rset", id, "open_defs", || format!("{} columns, {} rows per fetch", cols.len(), fetch_len));
        let mut defs = Vec::with_capacity(cols.len());
        let mut columns = Vec::with_capacity(cols.len());
        for (ix, (col, (gct, kind))) in cols.iter().zip(plans.into_iter()).enumerate() {
            defs.push(define::define(ctx, hndl, ix as u32 + 1, col, gct, kind, fetch_len)?);
            columns.push(Column { name: col.name.clone(), gct, type_name: col.type_name() });
        }
        let names = Arc::new(columns.iter().map(|col| col.name.clone()).collect());
        Ok(Self {
            id, stmt, owned, defs, names, columns, fetch_len,
            fetched: 0, pos: 0, finished: false, warning: None,
        })
    }

    fn fetch(&mut self, ctx: &Ctx) -> Result<()> {
        let (rc, rows) = {
            let stmt = self.handle();
            let rc = oci::stmt_fetch(stmt, ctx.err, self.fetch_len as u32).at("next", self.id)?;
            let rows : u32 = oci::attr::get(OCI_ATTR_ROWS_FETCHED, OCI_HTYPE_STMT, stmt as *const OCIStmt as *const c_void, ctx.err).at("next", self.id)?;
            (rc, rows)
        };
        if rc == OCI_SUCCESS_WITH_INFO {
            let warning = Error::oci(ctx.err, rc).at("next", self.id);
            tracing::warn!(id = self.id, %warning, "fetch completed with a warning");
            self.warning = Some(warning);
        }
        self.fetched = rows as usize;
        self.pos = 0;
        if rc == OCI_NO_DATA {
            self.finished = true;
        }
        Ok(())
    }

    /**
    Materializes the next row into `out`. Returns `false` when the result-set is exhausted.
    Nested result-sets opened by cursor columns are pushed to `nested`.
    */
    pub(crate) fn next_row(
        &mut self, ctx: &Ctx, stmt: &Arc<StmtInner>,
        nested: &mut Vec<RsetState>, open_lobs: &mut Vec<u64>, out: &mut Vec<Value>
    ) -> Result<bool> {
        if self.pos >= self.fetched {
            if self.finished {
                return Ok(false);
            }
            self.fetch(ctx)?;
            if self.fetched == 0 {
                self.finished = true;
                return Ok(false);
            }
        }
        let row = self.pos;
        for def in self.defs.iter_mut() {
            out.push(def.value(ctx, row, stmt, nested, open_lobs)?);
        }
        self.pos += 1;
        Ok(true)
    }

    fn handle(&self) -> &OCIStmt {
        match &self.owned {
            Some(hndl) => hndl,
            None => &self.stmt,
        }
    }

    /// REF CURSORs outlive the next execute of their statement.
    pub(crate) fn is_ref_cursor(&self) -> bool {
        self.owned.is_some()
    }

    pub(crate) fn has_streaming_lobs(&self) -> bool {
        self.defs.iter().any(|def| matches!(def.kind(), DefKind::LobStream { .. }))
    }
}

/// Looks up a row cell by position or by column name.
pub trait ColumnIndex {
    fn index_of(&self, names: &[String]) -> Option<usize>;
}

impl ColumnIndex for usize {
    fn index_of(&self, names: &[String]) -> Option<usize> {
        if *self < names.len() { Some(*self) } else { None }
    }
}

impl ColumnIndex for &str {
    /// Names are matched without regard to case.
    fn index_of(&self, names: &[String]) -> Option<usize> {
        names.iter().position(|name| name.eq_ignore_ascii_case(self))
    }
}

/**
One fetched row.

# Example

```no_run
# fn test(ses: &ora::Ses) -> ora::Result<()> {
let rset = ses.prep_and_qry("SELECT 42 AS answer, 'text' AS label FROM dual", &mut [])?;
let row = rset.next()?.expect("one row");
let answer : i64 = row.get(0)?;
let label : String = row.get("LABEL")?;
assert_eq!((answer, label.as_str()), (42, "text"));
# Ok(()) }
```
*/
pub struct Row {
    names: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    /// Converts a cell into `T`.
    pub fn get<T: FromValue, I: ColumnIndex>(&self, ix: I) -> Result<T> {
        T::from_value(self.value(ix)?)
    }

    /// Borrows a cell.
    pub fn value<I: ColumnIndex>(&self, ix: I) -> Result<&Value> {
        ix.index_of(&self.names)
            .and_then(|ix| self.values.get(ix))
            .ok_or_else(|| Error::msg("column is not in the select list"))
    }

    /// Moves a cell out of the row, leaving `Value::Null` behind.
    pub fn take(&mut self, ix: usize) -> Value {
        match self.values.get_mut(ix) {
            Some(val) => std::mem::replace(val, Value::Null),
            None => Value::Null,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.names.iter().zip(self.values.iter())).finish()
    }
}

/**
A result-set of a query, a REF CURSOR or an implicit result.

Rows are fetched in batches and handed out one at a time. A result-set is closed
explicitly, when it is dropped, or when its statement closes.
*/
pub struct Rset {
    id: u64,
    names: Arc<Vec<String>>,
    columns: Vec<Column>,
    index: AtomicI64,
    auto_close_stmt: AtomicBool,
    stmt: Arc<StmtInner>,
}

impl Drop for Rset {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for Rset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Rset").field("id", &self.id).field("columns", &self.columns).finish()
    }
}

enum Step {
    Row,
    Done,
    Failed(Error),
}

impl Rset {
    pub(crate) fn new(state: &RsetState, stmt: Arc<StmtInner>) -> Self {
        Self {
            id: state.id,
            names: state.names.clone(),
            columns: state.columns.clone(),
            index: AtomicI64::new(-1),
            auto_close_stmt: AtomicBool::new(false),
            stmt,
        }
    }

    /// Returns the process-unique id of this result-set.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Makes `close` close the statement as well.
    pub(crate) fn close_stmt_on_close(&self) {
        self.auto_close_stmt.store(true, Ordering::Relaxed);
    }

    /**
    Fetches the next row. Returns `None` once the result-set is exhausted.

    Fails with a protocol error while a streaming LOB of the statement is open.

    # Example

    ```no_run
    # fn test(ses: &ora::Ses) -> ora::Result<()> {
    let rset = ses.prep_and_qry("SELECT level FROM dual CONNECT BY level <= 3", &mut [])?;
    let mut sum = 0;
    while let Some(row) = rset.next()? {
        sum += row.get::<i64,_>(0)?;
    }
    assert_eq!(sum, 6);
    assert_eq!(rset.len(), 3);
    # Ok(()) }
    ```
    */
    pub fn next(&self) -> Result<Option<Row>> {
        let ses = self.stmt.ses().clone();
        ses.check()?;
        log::op(|cfg| cfg.rset.next, "rset", self.id, "next");
        let is_utf8 = ses.is_utf8();
        let env : &OCIEnv = ses.as_ref().as_ref();
        let svc : &OCISvcCtx = ses.as_ref().as_ref();
        let mut out = Vec::new();
        let step = {
            let mut state = self.stmt.state.lock();
            let StmtState { cfg, rsets, open_lobs, .. } = &mut *state;
            if !open_lobs.is_empty() {
                return Err( Error::protocol("result-set cannot move while a LOB of its statement is open", self.id) );
            }
            let ix = match rsets.iter().position(|rset| rset.id == self.id) {
                Some(ix) => ix,
                None => return Err( Error::protocol("result-set is closed", self.id) ),
            };
            let ctx = Ctx { env, svc, err: &self.stmt.err, cfg, id: self.id, is_utf8 };
            let mut nested = Vec::new();
            let res = rsets[ix].next_row(&ctx, &self.stmt, &mut nested, open_lobs, &mut out);
            rsets.extend(nested);
            match res {
                Ok(true) => Step::Row,
                Ok(false) => Step::Done,
                Err(err) => {
                    rsets.remove(ix);
                    Step::Failed(err)
                }
            }
        };
        match step {
            Step::Row => {
                self.index.fetch_add(1, Ordering::Relaxed);
                Ok( Some(Row::new(self.names.clone(), out)) )
            }
            Step::Done => Ok(None),
            Step::Failed(err) => {
                ses.note(&err);
                if err.kind() == ErrorKind::Cancelled || self.auto_close_stmt.load(Ordering::Relaxed) {
                    let _ = self.stmt.close();
                }
                Err(err)
            }
        }
    }

    /// Returns the number of rows handed out so far.
    pub fn len(&self) -> usize {
        (self.index.load(Ordering::Relaxed) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the 0-based index of the current row, -1 before the first `next`.
    pub fn index(&self) -> i64 {
        self.index.load(Ordering::Relaxed)
    }

    /// Describes the select list.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_open(&self) -> bool {
        self.stmt.state.lock().rsets.iter().any(|rset| rset.id == self.id)
    }

    /// Takes the warning the last fetch reported, if any.
    pub fn take_warning(&self) -> Option<Error> {
        let mut state = self.stmt.state.lock();
        state.rsets.iter_mut().find(|rset| rset.id == self.id).and_then(|rset| rset.warning.take())
    }

    /// Fetches the remaining rows and returns how many there were.
    pub fn exhaust(&self) -> Result<usize> {
        let mut count = 0;
        while self.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /**
    Closes the result-set. LOBs streamed from it are released. Closing twice is not an error.
    */
    pub fn close(&self) -> Result<()> {
        let closed = {
            let mut state = self.stmt.state.lock();
            match state.rsets.iter().position(|rset| rset.id == self.id) {
                Some(ix) => {
                    let rset = state.rsets.remove(ix);
                    if rset.has_streaming_lobs() {
                        state.open_lobs.clear();
                    }
                    Some(rset)
                }
                None => None,
            }
        };
        if closed.is_none() {
            return Ok(());
        }
        log::op(|cfg| cfg.rset.close, "rset", self.id, "close");
        drop(closed);
        if self.auto_close_stmt.load(Ordering::Relaxed) {
            self.stmt.close()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let names = Arc::new(vec!["ID".to_string(), "NAME".to_string()]);
        Row::new(names, vec![Value::I64(7), Value::Str("seven".into())])
    }

    #[test]
    fn cells_by_position_and_name() -> Result<()> {
        let row = row();
        assert_eq!(row.get::<i64, _>(0)?, 7);
        assert_eq!(row.get::<String, _>("name")?, "seven");
        assert_eq!(row.get::<i32, _>("Id")?, 7);
        assert!(row.get::<i64, _>(2).is_err());
        assert!(row.get::<i64, _>("missing").is_err());
        assert_eq!(row.len(), 2);
        assert_eq!(row.names(), &["ID".to_string(), "NAME".to_string()][..]);
        Ok(())
    }

    #[test]
    fn take_leaves_null() {
        let mut row = row();
        assert_eq!(row.take(1), Value::Str("seven".into()));
        assert!(row.values()[1].is_null());
        assert!(row.take(5).is_null());
        assert_eq!(row.into_values().len(), 2);
    }
}
