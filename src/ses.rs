//! User session

use crate::{
    Result, Error, ErrorKind,
    cfg::{SesCfg, SessionMode, StmtCfg, TxCfg},
    drv::{self, live, unlink},
    err::{ResultExt, ORA_INVALID_OCI_OPERATION},
    log,
    oci::{self, *},
    srv::{Srv, SrvInner},
    stmt::{Arg, Rset, Stmt, StmtInner},
    tx::Tx,
    types,
};
use chrono::FixedOffset;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

const DRIVER_NAME : &str = concat!("ora : ", env!("CARGO_PKG_VERSION"));

const TIMEZONE_SQL : &str = "SELECT TZ_OFFSET(SESSIONTIMEZONE) FROM DUAL";

pub(crate) struct SesState {
    pub(crate) open: bool,
    // code and message of the error that lost the session
    lost: Option<(i32, String)>,
    pub(crate) cfg: StmtCfg,
    pub(crate) is_utf8: bool,
    stmts: Vec<Weak<StmtInner>>,
    pub(crate) tx: Option<u64>,
    tz: Option<FixedOffset>,
}

impl SesState {
    // Keeps the first error that lost the session. Returns true when it was recorded.
    fn latch(&mut self, err: &Error) -> bool {
        match err {
            Error::SessionLost { code, msg, .. } if self.lost.is_none() => {
                self.lost = Some((*code, msg.clone()));
                true
            }
            _ => false,
        }
    }

    fn lost_error(&self, id: u64) -> Option<Error> {
        self.lost.as_ref().map(|(code, msg)| Error::SessionLost { code: *code, msg: msg.clone(), handle: id })
    }
}

pub(crate) struct SesInner {
    id: u64,
    err: Handle<OCIError>,
    // used by `break_`, which runs while another call is in flight
    brk_err: Handle<OCIError>,
    usr: Handle<OCISession>,
    svc: Handle<OCISvcCtx>,
    pub(crate) state: Mutex<SesState>,
    srv: Arc<SrvInner>,
}

impl Drop for SesInner {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl AsRef<OCIEnv> for SesInner {
    fn as_ref(&self) -> &OCIEnv {
        self.srv.as_ref().as_ref()
    }
}

impl AsRef<OCISvcCtx> for SesInner {
    fn as_ref(&self) -> &OCISvcCtx {
        &self.svc
    }
}

impl AsRef<OCIError> for SesInner {
    fn as_ref(&self) -> &OCIError {
        &self.err
    }
}

impl SesInner {
    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub(crate) fn is_utf8(&self) -> bool {
        self.state.lock().is_utf8
    }

    pub(crate) fn mark_utf8(&self, string_ptr_buffer_size: u32) {
        let mut state = self.state.lock();
        state.is_utf8 = true;
        state.cfg.cap_string_ptr_buffer_size(string_ptr_buffer_size);
    }

    /// Reports whether DML runs with `OCI_COMMIT_ON_SUCCESS` under `cfg`.
    pub(crate) fn is_auto_committing(&self, cfg: &StmtCfg) -> bool {
        cfg.is_auto_committing() && self.state.lock().tx.is_none()
    }

    /**
    Fails when the session is closed. A session that was lost is closed here, and the
    loss is reported to the caller.
    */
    pub(crate) fn check(&self) -> Result<()> {
        let lost = {
            let state = self.state.lock();
            if !state.open {
                return Err( Error::protocol("session is closed", self.id) );
            }
            state.lost_error(self.id)
        };
        match lost {
            None => Ok(()),
            Some(err) => {
                let _ = self.close();
                Err(err)
            }
        }
    }

    /// Marks the session lost when `err` says so.
    pub(crate) fn note(&self, err: &Error) {
        if self.state.lock().latch(err) {
            tracing::warn!(id = self.id, code = err.code(), %err, "session lost");
        }
    }

    pub(crate) fn register_stmt(&self, stmt: &Arc<StmtInner>) {
        self.state.lock().stmts.push(Arc::downgrade(stmt));
    }

    pub(crate) fn unlink_stmt(&self, stmt: *const StmtInner) {
        unlink(&mut self.state.lock().stmts, stmt);
    }

    pub(crate) fn ping(&self) -> Result<()> {
        self.check()?;
        log::op(|cfg| cfg.ses.ping, "ses", self.id, "ping");
        match oci::ping(&self.svc, &self.err).at("ping", self.id) {
            // servers before 10.2 do not know OCIPing
            Err(err) if err.kind() == ErrorKind::Oracle && err.code() == ORA_INVALID_OCI_OPERATION => Ok(()),
            Err(err) => {
                self.note(&err);
                Err(err)
            }
            Ok(()) => Ok(()),
        }
    }

    pub(crate) fn begin_tx(self: &Arc<Self>, cfg: TxCfg) -> Result<Tx> {
        self.check()?;
        let id = drv::next_id();
        {
            let mut state = self.state.lock();
            if state.tx.is_some() {
                return Err( Error::protocol("a transaction is already active", self.id) );
            }
            state.tx = Some(id);
        }
        log::op(|cfg| cfg.ses.start_tx, "ses", self.id, "start_tx");
        let timeout = cfg.timeout.as_secs().min(u32::MAX as u64) as u32;
        if let Err(err) = oci::trans_start(&self.svc, &self.err, timeout, OCI_TRANS_NEW | cfg.flags).at("start_tx", self.id) {
            self.state.lock().tx = None;
            self.note(&err);
            return Err(err);
        }
        Ok( Tx::new(id, self.clone()) )
    }

    /// Ends the transaction `tx` if it is still the active one.
    pub(crate) fn end_tx(&self, tx: u64, commit: bool) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.tx != Some(tx) {
                return Err( Error::protocol("transaction is not active", tx) );
            }
            state.tx = None;
        }
        let res = if commit {
            oci::trans_commit(&self.svc, &self.err).at("commit", tx)
        } else {
            oci::trans_rollback(&self.svc, &self.err).at("rollback", tx)
        };
        if let Err(err) = &res {
            self.note(err);
        }
        res
    }

    pub(crate) fn close(&self) -> Result<()> {
        let (stmts, tx, lost) = {
            let mut state = self.state.lock();
            if !state.open {
                return Ok(());
            }
            state.open = false;
            let stmts = live(&mut state.stmts);
            state.stmts.clear();
            (stmts, state.tx.take(), state.lost.is_some())
        };
        log::op(|cfg| cfg.ses.close, "ses", self.id, "close");
        let mut errs = Vec::new();
        for stmt in stmts {
            if let Err(err) = stmt.close() {
                errs.push(err);
            }
        }
        if !lost {
            if tx.is_some() {
                if let Err(err) = oci::trans_rollback(&self.svc, &self.err).at("close", self.id) {
                    errs.push(err);
                }
            }
            if let Err(err) = oci::session_end(&self.svc, &self.err, &self.usr).at("close", self.id) {
                errs.push(err);
            }
        }
        self.srv.unlink_ses(self);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

/**
An authenticated user session.

Cloning a `Ses` produces another reference to the same session. A session can be shared
by threads; each of its statements should be used by one thread at a time.
*/
#[derive(Clone)]
pub struct Ses {
    inner: Arc<SesInner>,
}

impl Ses {
    pub(crate) fn new(srv: &Arc<SrvInner>, cfg: &SesCfg, stmt_cfg: StmtCfg, is_utf8: bool) -> Result<Self> {
        let env : &OCIEnv = srv.as_ref().as_ref();
        let err = Handle::<OCIError>::new(env)?;
        let brk_err = Handle::<OCIError>::new(env)?;
        let svc = Handle::<OCISvcCtx>::new(env)?;
        let usr = Handle::<OCISession>::new(env)?;
        let id = drv::next_id();

        let srv_hndl : &OCIServer = srv.as_ref().as_ref();
        svc.set_attr(OCI_ATTR_SERVER, srv_hndl as *const OCIServer as *mut OCIServer, &err).at("open_ses", id)?;
        let cred = if cfg.username.is_empty() && cfg.password.is_empty() {
            OCI_CRED_EXT
        } else {
            usr.set_attr(OCI_ATTR_USERNAME, cfg.username.as_str(), &err).at("open_ses", id)?;
            usr.set_attr(OCI_ATTR_PASSWORD, cfg.password.as_str(), &err).at("open_ses", id)?;
            OCI_CRED_RDBMS
        };
        usr.set_attr(OCI_ATTR_DRIVER_NAME, DRIVER_NAME, &err).at("open_ses", id)?;
        let mode = match cfg.mode {
            SessionMode::Default => OCI_DEFAULT,
            SessionMode::SysDba  => OCI_SYSDBA,
            SessionMode::SysOper => OCI_SYSOPER,
        };
        oci::session_begin(&svc, &err, &usr, cred, mode).at("open_ses", id)?;

        let state = SesState {
            open: true, lost: None, cfg: stmt_cfg, is_utf8,
            stmts: Vec::new(), tx: None, tz: None,
        };
        let inner = Arc::new(SesInner { id, err, brk_err, usr, svc, state: Mutex::new(state), srv: srv.clone() });
        // From here on a failure drops `inner`, which ends the session.
        let usr_hndl : *mut OCISession = inner.usr.get_ptr().get();
        inner.svc.set_attr(OCI_ATTR_SESSION, usr_hndl, &inner.err).at("open_ses", id)?;
        inner.svc.set_attr(OCI_ATTR_STMTCACHESIZE, 0u32, &inner.err).at("open_ses", id)?;
        Ok( Self { inner } )
    }

    pub(crate) fn from_inner(inner: Arc<SesInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<SesInner> {
        &self.inner
    }

    /// Returns the process-unique id of this session.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Returns the server this session runs on.
    pub fn srv(&self) -> Srv {
        Srv::from_inner(self.inner.srv.clone())
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Returns a copy of the statement configuration new statements start from.
    pub fn cfg(&self) -> StmtCfg {
        self.inner.state.lock().cfg.clone()
    }

    /// Replaces the statement configuration. Prepared statements keep their own copies.
    pub fn set_cfg(&self, cfg: StmtCfg) -> Result<()> {
        cfg.validate()?;
        self.inner.state.lock().cfg = cfg;
        Ok(())
    }

    /**
    Prepares a SQL statement or a PL/SQL block.

    Placeholders are bound by position; their names are informational.

    # Example

    ```no_run
    # fn test(ses: &ora::Ses) -> ora::Result<()> {
    let stmt = ses.prep("INSERT INTO test_t (c1) VALUES (:c1)")?;
    let rows = stmt.exe(&mut [42.into()])?;
    assert_eq!(rows, 1);
    # Ok(()) }
    ```
    */
    pub fn prep(&self, sql: &str) -> Result<Stmt> {
        self.inner.check()?;
        log::op_with(|cfg| cfg.ses.prep, "ses", self.inner.id, "prep", || sql.to_string());
        let cfg = self.cfg();
        let stmt = Stmt::new(&self.inner, sql, cfg);
        if let Err(err) = &stmt {
            self.inner.note(err);
        }
        stmt
    }

    /// Prepares, executes and closes a statement. Returns the number of rows affected.
    pub fn prep_and_exe(&self, sql: &str, args: &mut [Arg]) -> Result<u64> {
        log::op_with(|cfg| cfg.ses.prep_and_exe, "ses", self.inner.id, "prep_and_exe", || sql.to_string());
        let stmt = self.prep(sql)?;
        let res = stmt.exe(args);
        let closed = stmt.close();
        let rows = res?;
        closed?;
        Ok(rows)
    }

    /**
    Prepares and runs a query. The statement is closed when the returned result-set closes.

    # Example

    ```no_run
    # fn test(ses: &ora::Ses) -> ora::Result<()> {
    let rset = ses.prep_and_qry("SELECT 1, 'a' FROM dual", &mut [])?;
    while let Some(row) = rset.next()? {
        let n : i64 = row.get(0)?;
        let s : String = row.get(1)?;
        assert_eq!((n, s.as_str()), (1, "a"));
    }
    # Ok(()) }
    ```
    */
    pub fn prep_and_qry(&self, sql: &str, args: &mut [Arg]) -> Result<Rset> {
        log::op_with(|cfg| cfg.ses.prep_and_qry, "ses", self.inner.id, "prep_and_qry", || sql.to_string());
        let stmt = self.prep(sql)?;
        match stmt.qry(args) {
            Ok(rset) => {
                rset.close_stmt_on_close();
                Ok(rset)
            }
            Err(err) => {
                let _ = stmt.close();
                Err(err)
            }
        }
    }

    /**
    Starts a transaction with default options: 60 seconds timeout, a new transaction.

    Statements do not auto-commit while the transaction is active. Only one transaction
    can be active in a session.

    # Example

    ```no_run
    # fn test(ses: &ora::Ses) -> ora::Result<()> {
    let tx = ses.start_tx()?;
    ses.prep_and_exe("INSERT INTO test_t (c1) VALUES (:1)", &mut [3.into()])?;
    tx.rollback()?;
    # Ok(()) }
    ```
    */
    pub fn start_tx(&self) -> Result<Tx> {
        self.inner.begin_tx(TxCfg::default())
    }

    /// Starts a transaction with explicit options.
    pub fn start_tx_with(&self, cfg: TxCfg) -> Result<Tx> {
        self.inner.begin_tx(cfg)
    }

    /**
    Makes a round trip to the server. An ORA-01010 reply from old servers counts as success.
    */
    pub fn ping(&self) -> Result<()> {
        self.inner.ping()
    }

    /**
    Interrupts the call currently running in this session. Can be called from another thread.
    The interrupted call fails with `ErrorKind::Cancelled`.
    */
    pub fn break_(&self) -> Result<()> {
        if !self.inner.is_open() {
            return Err( Error::protocol("session is closed", self.inner.id) );
        }
        log::op(|cfg| cfg.ses.break_, "ses", self.inner.id, "break");
        let hndl = self.inner.svc.get_ptr().get() as *const libc::c_void;
        oci::break_call(hndl, &self.inner.brk_err).at("break", self.inner.id)?;
        oci::reset(hndl, &self.inner.brk_err).at("break", self.inner.id)
    }

    /**
    Returns the session time zone offset. It is queried once and cached.
    */
    pub fn timezone(&self) -> Result<FixedOffset> {
        if let Some(tz) = self.inner.state.lock().tz {
            return Ok(tz);
        }
        let rset = self.prep_and_qry(TIMEZONE_SQL, &mut [])?;
        let name : String = match rset.next()? {
            Some(row) => row.get(0)?,
            None => return Err( Error::msg("session time zone is unknown") ),
        };
        rset.close()?;
        let tz = types::location(&name)?;
        self.inner.state.lock().tz = Some(tz);
        Ok(tz)
    }

    /// Sets the module and action reported in `V$SESSION`.
    pub fn set_action(&self, module: &str, action: &str) -> Result<()> {
        self.inner.check()?;
        self.inner.usr.set_attr(OCI_ATTR_MODULE, module, &self.inner.err).at("set_action", self.inner.id)?;
        self.inner.usr.set_attr(OCI_ATTR_ACTION, action, &self.inner.err).at("set_action", self.inner.id)
    }

    /// Returns the number of open statements.
    pub fn num_stmt(&self) -> usize {
        let stmts = live(&mut self.inner.state.lock().stmts);
        stmts.iter().filter(|stmt| stmt.is_open()).count()
    }

    /// Returns the number of active transactions (0 or 1).
    pub fn num_tx(&self) -> usize {
        self.inner.state.lock().tx.map_or(0, |_| 1)
    }

    /**
    Closes every statement, rolls back the active transaction and ends the session.
    */
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SesState {
        SesState {
            open: true, lost: None, cfg: StmtCfg::default(), is_utf8: false,
            stmts: Vec::new(), tx: None, tz: None,
        }
    }

    #[test]
    fn lost_session_latch() {
        let mut state = state();
        assert!(state.lost_error(1).is_none());

        assert!(!state.latch(&Error::protocol("statement is closed", 2)));
        assert!(!state.latch(&Error::from_code(1013, "cancelled".into())));
        assert!(state.lost_error(1).is_none());

        assert!(state.latch(&Error::from_code(3113, "end-of-file on communication channel".into())));
        assert!(!state.latch(&Error::from_code(3114, "not connected to ORACLE".into())));

        let err = state.lost_error(7).expect("latched");
        assert_eq!(err.kind(), ErrorKind::SessionLost);
        assert_eq!(err.code(), 3113);
        assert_eq!(err.handle(), 7);
    }

    #[test]
    fn handles_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ses>();
        assert_send_sync::<Srv>();
        assert_send_sync::<Stmt>();
    }
}
