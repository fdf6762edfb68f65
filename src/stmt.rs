//! SQL or PL/SQL statement

mod arg;
mod bind;
mod define;
mod rset;

pub use arg::Arg;
pub use rset::{Column, ColumnIndex, Row, Rset};

use bind::{BindRecord, Dir, Readback, Shape};
use rset::RsetState;
use crate::{
    Result, Error, ErrorKind, ColumnType, Value,
    cfg::StmtCfg,
    drv,
    err::ResultExt,
    log,
    oci::{self, *},
    ses::SesInner,
};
use libc::c_void;
use parking_lot::Mutex;
use std::{mem, sync::Arc};

/// What the bind and define factories need from the statement and its session.
pub(crate) struct Ctx<'a> {
    pub(crate) env: &'a OCIEnv,
    pub(crate) svc: &'a OCISvcCtx,
    pub(crate) err: &'a OCIError,
    pub(crate) cfg: &'a StmtCfg,
    /// Handle reported in errors
    pub(crate) id: u64,
    pub(crate) is_utf8: bool,
}

/// Statement type as the server classified it at prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
    Select,
    Update,
    Delete,
    Insert,
    Create,
    Drop,
    Alter,
    Begin,
    Declare,
    Call,
    Merge,
    Unknown,
}

impl StmtKind {
    fn from_oci(code: u16) -> Self {
        match code {
            OCI_STMT_SELECT  => StmtKind::Select,
            OCI_STMT_UPDATE  => StmtKind::Update,
            OCI_STMT_DELETE  => StmtKind::Delete,
            OCI_STMT_INSERT  => StmtKind::Insert,
            OCI_STMT_CREATE  => StmtKind::Create,
            OCI_STMT_DROP    => StmtKind::Drop,
            OCI_STMT_ALTER   => StmtKind::Alter,
            OCI_STMT_BEGIN   => StmtKind::Begin,
            OCI_STMT_DECLARE => StmtKind::Declare,
            OCI_STMT_CALL    => StmtKind::Call,
            OCI_STMT_MERGE   => StmtKind::Merge,
            _                => StmtKind::Unknown,
        }
    }

    /// PL/SQL block: the only kind that binds associative arrays.
    pub fn is_plsql(self) -> bool {
        matches!(self, StmtKind::Begin | StmtKind::Declare)
    }

    pub fn is_dml(self) -> bool {
        matches!(self, StmtKind::Update | StmtKind::Delete | StmtKind::Insert | StmtKind::Merge)
    }

    pub fn is_ddl(self) -> bool {
        matches!(self, StmtKind::Create | StmtKind::Drop | StmtKind::Alter)
    }
}

pub(crate) struct StmtState {
    open: bool,
    hndl: Ptr<OCIStmt>,
    cfg: StmtCfg,
    gcts: Vec<ColumnType>,
    binds: Vec<BindRecord>,
    rsets: Vec<RsetState>,
    // ids of the streaming LOBs handed out and not yet closed
    open_lobs: Vec<u64>,
}

pub(crate) struct StmtInner {
    id: u64,
    sql: String,
    kind: StmtKind,
    err: Handle<OCIError>,
    state: Mutex<StmtState>,
    ses: Arc<SesInner>,
}

impl Drop for StmtInner {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

// Values OCI returned through the arguments, applied once the statement is unlocked
#[derive(Default)]
struct Outputs {
    values: Vec<(usize, Readback)>,
    cursors: Vec<(usize, Rset)>,
}

impl Outputs {
    // Returns the value of the internal RETURNING bind that follows the arguments.
    fn apply(self, args: &mut [Arg]) -> Option<Value> {
        let mut returned = None;
        for (ix, readback) in self.values {
            match (args.get_mut(ix), readback) {
                (Some(Arg::Out(val, _)), Readback::Scalar(ret)) => **val = ret,
                (Some(Arg::OutArr(vals, _)), Readback::Array(ret)) => {
                    vals.clear();
                    vals.extend(ret);
                }
                (None, Readback::Scalar(ret)) => returned = Some(ret),
                _ => {}
            }
        }
        for (ix, rset) in self.cursors {
            if let Some(Arg::Cursor(slot)) = args.get_mut(ix) {
                **slot = Some(rset);
            }
        }
        returned
    }
}

impl StmtInner {
    pub(crate) fn ses(&self) -> &Arc<SesInner> {
        &self.ses
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub(crate) fn lob_is_open(&self, lob: u64) -> bool {
        self.state.lock().open_lobs.contains(&lob)
    }

    /// Unregisters a streaming LOB. Returns `false` if it was not registered.
    pub(crate) fn forget_lob(&self, lob: u64) -> bool {
        let mut state = self.state.lock();
        match state.open_lobs.iter().position(|&id| id == lob) {
            Some(ix) => {
                state.open_lobs.remove(ix);
                true
            }
            None => false,
        }
    }

    fn get_attr<V: attr::AttrGet>(&self, hndl: &Ptr<OCIStmt>, attr_type: u32) -> Result<V> {
        attr::get::<V>(attr_type, OCI_HTYPE_STMT, hndl.get() as *const c_void, &self.err)
    }

    fn set_attr<V: attr::AttrSet>(&self, hndl: &Ptr<OCIStmt>, attr_type: u32, attr_val: V) -> Result<()> {
        attr::set::<V>(attr_type, attr_val, OCI_HTYPE_STMT, hndl.get() as *const c_void, &self.err)
    }

    fn check(&self, state: &StmtState) -> Result<()> {
        if !state.open {
            Err( Error::protocol("statement is closed", self.id) )
        } else if !state.open_lobs.is_empty() {
            Err( Error::protocol("statement has an open LOB; close it first", self.id) )
        } else {
            Ok(())
        }
    }

    // Post-processing of a failed call. Runs with the statement unlocked.
    fn fail(&self, err: Error) -> Error {
        self.ses.note(&err);
        if err.kind() == ErrorKind::Cancelled {
            let _ = self.close();
        }
        err
    }

    // Result-sets that read from the statement handle itself die with the next execute.
    fn release_binds(&self, state: &mut StmtState) {
        let svc : &OCISvcCtx = self.ses.as_ref().as_ref();
        for mut rec in state.binds.drain(..) {
            if let Err(err) = rec.close(svc, &self.err) {
                tracing::warn!(id = self.id, %err, "cannot free a temporary LOB");
            }
        }
        state.rsets.retain(RsetState::is_ref_cursor);
    }

    fn bind_all(&self, state: &mut StmtState, args: &mut [Arg], shape: Shape, is_utf8: bool) -> Result<()> {
        self.release_binds(state);
        let StmtState { hndl, cfg, binds, .. } = state;
        let ctx = Ctx {
            env: self.ses.as_ref().as_ref(),
            svc: self.ses.as_ref().as_ref(),
            err: &self.err,
            cfg, id: self.id, is_utf8,
        };
        for (ix, arg) in args.iter_mut().enumerate() {
            let rec = bind::bind(&ctx, hndl, ix as u32 + 1, arg, shape)?;
            binds.push(rec);
        }
        Ok(())
    }

    // Shape of the binds and the number of iterations of an execute with these arguments.
    fn plan(&self, args: &[Arg]) -> Result<(Shape, u32)> {
        if self.kind.is_plsql() {
            return Ok((Shape::Table, 1));
        }
        let lens : Vec<usize> = args.iter().filter_map(Arg::array_len).collect();
        if lens.is_empty() {
            return Ok((Shape::Scalar, if self.kind == StmtKind::Select { 0 } else { 1 }));
        }
        if self.kind == StmtKind::Select {
            return Err( Error::bind("array arguments cannot be bound to a query") );
        }
        if lens.len() != args.len() {
            return Err( Error::bind("a batch execute needs every argument to be an array") );
        }
        if args.iter().any(|arg| matches!(arg, Arg::OutArr(..))) {
            return Err( Error::bind("output arrays can only be bound in PL/SQL blocks") );
        }
        let len = lens[0];
        if lens.iter().any(|&n| n != len) {
            return Err( Error::bind("batch arrays differ in length") );
        }
        if len == 0 {
            return Err( Error::bind("batch arrays are empty") );
        }
        Ok((Shape::Batch, len as u32))
    }

    fn execute(
        self: &Arc<Self>, state: &mut StmtState, args: &mut [Arg],
        returning: bool, is_utf8: bool, outs: &mut Outputs
    ) -> Result<u64> {
        self.check(state)?;
        bind::pack_byte_slices(args, state.cfg.byte_slice());
        let (shape, iters) = self.plan(args)?;
        self.bind_all(state, args, shape, is_utf8)?;
        if returning {
            let mut id = Value::I64(0);
            let mut arg = Arg::Out(&mut id, ColumnType::OraI64);
            let ctx = Ctx {
                env: self.ses.as_ref().as_ref(),
                svc: self.ses.as_ref().as_ref(),
                err: &self.err,
                cfg: &state.cfg, id: self.id, is_utf8,
            };
            let rec = bind::bind(&ctx, &state.hndl, args.len() as u32 + 1, &mut arg, Shape::Scalar)?;
            state.binds.push(rec);
        }

        let mode = if self.kind != StmtKind::Select && self.ses.is_auto_committing(&state.cfg) {
            OCI_COMMIT_ON_SUCCESS
        } else {
            OCI_DEFAULT
        };
        let svc : &OCISvcCtx = self.ses.as_ref().as_ref();
        let rc = oci::stmt_execute(svc, &state.hndl, &self.err, iters, mode).at("exe", self.id)?;
        if rc == OCI_SUCCESS_WITH_INFO {
            let warning = Error::oci(&self.err, rc).at("exe", self.id);
            tracing::warn!(id = self.id, %warning, "execute completed with a warning");
        }
        let rows = if self.kind.is_dml() {
            self.get_attr::<u64>(&state.hndl, OCI_ATTR_UB8_ROW_COUNT).at("exe", self.id)?
        } else {
            0
        };

        let StmtState { cfg, binds, rsets, .. } = state;
        let ctx = Ctx {
            env: self.ses.as_ref().as_ref(),
            svc,
            err: &self.err,
            cfg, id: self.id, is_utf8,
        };
        for (ix, rec) in binds.iter_mut().enumerate() {
            match rec.dir() {
                Dir::Out | Dir::OutArr => {
                    if let Some(readback) = rec.read_back(&ctx)? {
                        outs.values.push((ix, readback));
                    }
                }
                Dir::Cursor => {
                    if let Some(hndl) = rec.take_cursor() {
                        let rset = RsetState::open(&ctx, hndl.get_ptr(), Some(hndl), &[])?;
                        outs.cursors.push((ix, Rset::new(&rset, self.clone())));
                        rsets.push(rset);
                    }
                }
                Dir::In | Dir::InArr => {}
            }
        }
        Ok(rows)
    }

    fn query(self: &Arc<Self>, state: &mut StmtState, args: &mut [Arg], is_utf8: bool) -> Result<Rset> {
        self.check(state)?;
        if self.kind != StmtKind::Select {
            return Err( Error::protocol("statement is not a query", self.id) );
        }
        bind::pack_byte_slices(args, state.cfg.byte_slice());
        if args.iter().any(Arg::is_array) {
            return Err( Error::bind("array arguments cannot be bound to a query") );
        }
        self.bind_all(state, args, Shape::Scalar, is_utf8)?;
        self.set_attr(&state.hndl, OCI_ATTR_PREFETCH_ROWS, state.cfg.prefetch_row_count()).at("qry", self.id)?;
        self.set_attr(&state.hndl, OCI_ATTR_PREFETCH_MEMORY, state.cfg.prefetch_memory_size()).at("qry", self.id)?;

        let svc : &OCISvcCtx = self.ses.as_ref().as_ref();
        let rc = oci::stmt_execute(svc, &state.hndl, &self.err, 0, OCI_DEFAULT).at("qry", self.id)?;
        if rc == OCI_SUCCESS_WITH_INFO {
            let warning = Error::oci(&self.err, rc).at("qry", self.id);
            tracing::warn!(id = self.id, %warning, "query completed with a warning");
        }
        let ctx = Ctx {
            env: self.ses.as_ref().as_ref(),
            svc,
            err: &self.err,
            cfg: &state.cfg, id: self.id, is_utf8,
        };
        let rset = RsetState::open(&ctx, state.hndl, None, &state.gcts)?;
        let res = Rset::new(&rset, self.clone());
        state.rsets.push(rset);
        Ok(res)
    }

    fn next_result(self: &Arc<Self>, state: &mut StmtState, is_utf8: bool) -> Result<Option<Rset>> {
        self.check(state)?;
        let mut hndl = Ptr::<OCIStmt>::null();
        let mut rtype = 0u32;
        let rc = oci::stmt_get_next_result(&state.hndl, &self.err, hndl.as_mut_ptr(), &mut rtype).at("next_rset", self.id)?;
        if rc == OCI_NO_DATA || hndl.is_null() {
            return Ok(None);
        }
        let ctx = Ctx {
            env: self.ses.as_ref().as_ref(),
            svc: self.ses.as_ref().as_ref(),
            err: &self.err,
            cfg: &state.cfg, id: self.id, is_utf8,
        };
        // implicit result handles belong to the statement
        let rset = RsetState::open(&ctx, hndl, None, &[])?;
        let res = Rset::new(&rset, self.clone());
        state.rsets.push(rset);
        Ok(Some(res))
    }

    /**
    Closes the result-sets of the statement, frees its binds and releases the handle.
    LOBs still streaming from it are cut off.
    */
    pub(crate) fn close(&self) -> Result<()> {
        let (hndl, binds, rsets) = {
            let mut state = self.state.lock();
            if !state.open {
                return Ok(());
            }
            state.open = false;
            state.open_lobs.clear();
            (state.hndl, mem::take(&mut state.binds), mem::take(&mut state.rsets))
        };
        log::op(|cfg| cfg.stmt.close, "stmt", self.id, "close");
        drop(rsets);
        let svc : &OCISvcCtx = self.ses.as_ref().as_ref();
        let mut errs = Vec::new();
        for mut rec in binds {
            if let Err(err) = rec.close(svc, &self.err).at("close", self.id) {
                errs.push(err);
            }
        }
        if !hndl.is_null() {
            if let Err(err) = oci::stmt_release(&hndl, &self.err).at("close", self.id) {
                errs.push(err);
            }
        }
        self.ses.unlink_stmt(self);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

/**
A prepared SQL statement or PL/SQL block.

A statement is used by one thread at a time. Cloning a `Stmt` produces another
reference to the same statement.
*/
#[derive(Clone)]
pub struct Stmt {
    inner: Arc<StmtInner>,
}

impl Stmt {
    pub(crate) fn new(ses: &Arc<SesInner>, sql: &str, cfg: StmtCfg) -> Result<Self> {
        let env : &OCIEnv = ses.as_ref().as_ref();
        let svc : &OCISvcCtx = ses.as_ref().as_ref();
        let err = Handle::<OCIError>::new(env)?;
        let id = drv::next_id();
        let mut hndl = Ptr::<OCIStmt>::null();
        oci::stmt_prepare(svc, hndl.as_mut_ptr(), &err, sql).at("prep", id)?;
        let code = match attr::get::<u16>(OCI_ATTR_STMT_TYPE, OCI_HTYPE_STMT, hndl.get() as *const c_void, &err) {
            Ok(code) => code,
            Err(e) => {
                let _ = oci::stmt_release(&hndl, &err);
                return Err( e.at("prep", id) );
            }
        };
        let state = StmtState {
            open: true, hndl, cfg,
            gcts: Vec::new(), binds: Vec::new(), rsets: Vec::new(), open_lobs: Vec::new(),
        };
        let inner = Arc::new(StmtInner {
            id, sql: sql.to_string(), kind: StmtKind::from_oci(code),
            err, state: Mutex::new(state), ses: ses.clone(),
        });
        ses.register_stmt(&inner);
        Ok( Self { inner } )
    }

    /// Returns the process-unique id of this statement.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Returns the SQL text the statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.inner.sql
    }

    pub fn kind(&self) -> StmtKind {
        self.inner.kind
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Returns a copy of the statement configuration.
    pub fn cfg(&self) -> StmtCfg {
        self.inner.state.lock().cfg.clone()
    }

    /// Replaces the statement configuration. It applies from the next execute.
    pub fn set_cfg(&self, cfg: StmtCfg) -> Result<()> {
        cfg.validate()?;
        self.inner.state.lock().cfg = cfg;
        Ok(())
    }

    /// Returns the column selectors set with `set_gcts`.
    pub fn gcts(&self) -> Vec<ColumnType> {
        self.inner.state.lock().gcts.clone()
    }

    /**
    Sets per-column selectors for the next query. `ColumnType::Default` keeps the
    configured default of a column; missing trailing entries do the same. Selectors are
    checked against the column types when the query runs.
    */
    pub fn set_gcts(&self, gcts: Vec<ColumnType>) {
        self.inner.state.lock().gcts = gcts;
    }

    /**
    Executes the statement and returns the number of rows affected.

    Array arguments run a DML statement once per element, or bind PL/SQL associative
    arrays. Output arguments are updated once the execute succeeds.

    # Example

    ```no_run
    use ora::Arg;

    # fn test(ses: &ora::Ses) -> ora::Result<()> {
    let stmt = ses.prep("INSERT INTO test_t (c1, c2) VALUES (:1, :2)")?;
    let rows = stmt.exe(&mut [Arg::arr(vec![1, 2, 3]), Arg::arr(vec!["a", "b", "c"])])?;
    assert_eq!(rows, 3);
    # Ok(()) }
    ```
    */
    pub fn exe(&self, args: &mut [Arg]) -> Result<u64> {
        self.exe_with(args, false).map(|(rows, _)| rows)
    }

    /**
    Executes an `INSERT ... RETURNING id INTO :n` statement whose last placeholder
    receives the generated id. `args` hold every other placeholder.
    Returns the number of rows inserted and the id.
    */
    pub fn exe_ins(&self, args: &mut [Arg]) -> Result<(u64, Option<i64>)> {
        if self.inner.kind != StmtKind::Insert {
            return Err( Error::bind("only an INSERT can return an inserted id") );
        }
        let (rows, id) = self.exe_with(args, true)?;
        let id = match id {
            Some(Value::I64(id)) => Some(id),
            _ => None,
        };
        Ok((rows, id))
    }

    fn exe_with(&self, args: &mut [Arg], returning: bool) -> Result<(u64, Option<Value>)> {
        let inner = &self.inner;
        inner.ses.check()?;
        log::op_with(|cfg| cfg.stmt.exe, "stmt", inner.id, "exe", || format!("{} args", args.len()));
        let is_utf8 = inner.ses.is_utf8();
        let mut outs = Outputs::default();
        let res = {
            let mut state = inner.state.lock();
            inner.execute(&mut state, args, returning, is_utf8, &mut outs)
        };
        match res {
            Ok(rows) => {
                let returned = outs.apply(args);
                Ok((rows, returned))
            }
            Err(err) => {
                drop(outs);
                Err( inner.fail(err) )
            }
        }
    }

    /**
    Runs a query and returns its result-set.

    # Example

    ```no_run
    # fn test(ses: &ora::Ses) -> ora::Result<()> {
    let stmt = ses.prep("SELECT c1 FROM test_t WHERE c1 > :1 ORDER BY c1")?;
    let rset = stmt.qry(&mut [1.into()])?;
    while let Some(row) = rset.next()? {
        let c1 : i64 = row.get(0)?;
        assert!(c1 > 1);
    }
    # Ok(()) }
    ```
    */
    pub fn qry(&self, args: &mut [Arg]) -> Result<Rset> {
        let inner = &self.inner;
        inner.ses.check()?;
        log::op_with(|cfg| cfg.stmt.qry, "stmt", inner.id, "qry", || format!("{} args", args.len()));
        let is_utf8 = inner.ses.is_utf8();
        let res = {
            let mut state = inner.state.lock();
            inner.query(&mut state, args, is_utf8)
        };
        res.map_err(|err| inner.fail(err))
    }

    /**
    Returns the next implicit result (a cursor passed to `DBMS_SQL.RETURN_RESULT`) of an
    executed PL/SQL block, or `None` when there are no more.
    */
    pub fn next_rset(&self) -> Result<Option<Rset>> {
        let inner = &self.inner;
        inner.ses.check()?;
        log::op(|cfg| cfg.stmt.next_rset, "stmt", inner.id, "next_rset");
        let is_utf8 = inner.ses.is_utf8();
        let res = {
            let mut state = inner.state.lock();
            inner.next_result(&mut state, is_utf8)
        };
        res.map_err(|err| inner.fail(err))
    }

    /// Returns the number of placeholders in the statement.
    pub fn num_input(&self) -> Result<usize> {
        let state = self.inner.state.lock();
        self.inner.check(&state)?;
        let count = self.inner.get_attr::<u32>(&state.hndl, OCI_ATTR_BIND_COUNT).at("num_input", self.inner.id)?;
        Ok(count as usize)
    }

    /// Returns the number of open result-sets.
    pub fn num_rset(&self) -> usize {
        self.inner.state.lock().rsets.len()
    }

    /**
    Closes every result-set, frees the binds and releases the statement.
    Closing twice is not an error.
    */
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(StmtKind::from_oci(OCI_STMT_SELECT), StmtKind::Select);
        assert_eq!(StmtKind::from_oci(OCI_STMT_MERGE), StmtKind::Merge);
        assert_eq!(StmtKind::from_oci(42), StmtKind::Unknown);
        assert!(StmtKind::from_oci(OCI_STMT_DECLARE).is_plsql());
        assert!(!StmtKind::Call.is_plsql());
        assert!(StmtKind::Merge.is_dml());
        assert!(!StmtKind::Select.is_dml());
        assert!(StmtKind::Alter.is_ddl());
    }

    #[test]
    fn out_arrays_keep_their_allocation() {
        let mut vals = Vec::with_capacity(10);
        vals.extend(vec![Value::I64(1), Value::I64(2), Value::I64(3)]);
        let outs = Outputs {
            values: vec![(0, Readback::Array(vec![Value::I64(2), Value::I64(4)]))],
            cursors: Vec::new(),
        };
        let returned = outs.apply(&mut [Arg::OutArr(&mut vals, ColumnType::I64)]);
        assert!(returned.is_none());
        assert_eq!(vals, vec![Value::I64(2), Value::I64(4)]);
        assert!(vals.capacity() >= 10, "capacity shrank to {}", vals.capacity());
    }

    #[test]
    fn returning_value_follows_the_arguments() {
        let mut out = Value::Null;
        let outs = Outputs {
            values: vec![
                (0, Readback::Scalar(Value::Str("x".into()))),
                (1, Readback::Scalar(Value::I64(7))),
            ],
            cursors: Vec::new(),
        };
        let returned = outs.apply(&mut [Arg::Out(&mut out, ColumnType::Str)]);
        assert_eq!(out, Value::Str("x".into()));
        assert_eq!(returned, Some(Value::I64(7)));
    }
}
