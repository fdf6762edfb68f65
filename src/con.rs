//! Generic SQL connection

use crate::{
    Result, Error,
    cfg::RsetCfg,
    drv,
    log,
    ses::Ses,
    srv::Srv,
    stmt::{Arg, Rset, StmtKind},
    tx::Tx,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Outcome of [`Con::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Id captured by an `INSERT ... RETURNING id INTO :id` statement
    pub last_insert_id: Option<i64>,
}

pub(crate) struct ConInner {
    id: u64,
    open: Mutex<bool>,
    ses: Ses,
    srv: Srv,
}

impl Drop for ConInner {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl ConInner {
    pub(crate) fn is_open(&self) -> bool {
        *self.open.lock()
    }

    fn check(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err( Error::protocol("connection is closed", self.id) )
        }
    }

    pub(crate) fn close(&self) -> Result<()> {
        {
            let mut open = self.open.lock();
            if !*open {
                return Ok(());
            }
            *open = false;
        }
        log::op(|cfg| cfg.con.close, "con", self.id, "close");
        let mut errs = Vec::new();
        if let Err(err) = self.ses.close() {
            errs.push(err);
        }
        if let Err(err) = self.srv.close() {
            errs.push(err);
        }
        self.srv.inner().env().unlink_con(self);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

/**
A server and a session behind a small SQL interface, the way generic database
layers use a connection.

Result-sets of a `Con` read BINARY_FLOAT and FLOAT columns as `F64`. Null columns
read as zero values unless a nullable selector is set.

# Example

```no_run
let env = ora::drv().open_env()?;
let con = env.open_con("scott/tiger@localhost:1521/orcl")?;
let res = con.exec("INSERT INTO test_t (c2) VALUES ('x') RETURNING c1 /*lastInsertId*/ INTO :c1", &mut [ora::Value::Null.into()])?;
assert_eq!(res.rows_affected, 1);
assert!(res.last_insert_id.is_some());
con.close()?;
# Ok::<(),ora::Error>(())
```
*/
#[derive(Clone)]
pub struct Con {
    inner: Arc<ConInner>,
}

impl Con {
    pub(crate) fn new(srv: Srv, ses: Ses) -> Self {
        ses.inner().state.lock().cfg.rset = RsetCfg::generic_sql();
        let inner = ConInner { id: drv::next_id(), open: Mutex::new(true), ses, srv };
        Self { inner: Arc::new(inner) }
    }

    pub(crate) fn inner(&self) -> &Arc<ConInner> {
        &self.inner
    }

    /// Returns the process-unique id of this connection.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open() && self.inner.ses.is_open()
    }

    /// Returns the session of this connection.
    pub fn ses(&self) -> &Ses {
        &self.inner.ses
    }

    /// Returns the server of this connection.
    pub fn srv(&self) -> &Srv {
        &self.inner.srv
    }

    /**
    Executes a statement that returns no rows.

    For an INSERT whose SQL text after the last `)` contains `RETURNING`, the last
    argument stands for the `INTO` placeholder. It is bound as an `i64` output and its
    value comes back as `last_insert_id`.
    */
    pub fn exec(&self, sql: &str, args: &mut [Arg]) -> Result<ExecResult> {
        self.inner.check()?;
        log::op_with(|cfg| cfg.con.exec, "con", self.inner.id, "exec", || sql.to_string());
        let stmt = self.inner.ses.prep(sql)?;
        let res = if stmt.kind() == StmtKind::Insert && returns_insert_id(sql) {
            match args.split_last_mut() {
                Some((_, rest)) => stmt.exe_ins(rest).map(|(rows_affected, last_insert_id)| ExecResult { rows_affected, last_insert_id }),
                None => Err( Error::bind("RETURNING ... INTO needs an argument for the inserted id") ),
            }
        } else {
            stmt.exe(args).map(|rows_affected| ExecResult { rows_affected, last_insert_id: None })
        };
        let closed = stmt.close();
        let res = res?;
        closed?;
        Ok(res)
    }

    /// Runs a query. The statement closes with the returned result-set.
    pub fn query(&self, sql: &str, args: &mut [Arg]) -> Result<Rset> {
        self.inner.check()?;
        log::op_with(|cfg| cfg.con.query, "con", self.inner.id, "query", || sql.to_string());
        self.inner.ses.prep_and_qry(sql, args)
    }

    /// Starts a transaction with default options.
    pub fn begin(&self) -> Result<Tx> {
        self.inner.check()?;
        log::op(|cfg| cfg.con.begin, "con", self.inner.id, "begin");
        self.inner.ses.start_tx()
    }

    pub fn ping(&self) -> Result<()> {
        self.inner.check()?;
        log::op(|cfg| cfg.con.ping, "con", self.inner.id, "ping");
        self.inner.ses.ping()
    }

    /// Closes the session and detaches from the server.
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

// The id placeholder goes last: RETURNING follows the closing parenthesis of VALUES.
fn returns_insert_id(sql: &str) -> bool {
    let tail = match sql.rfind(')') {
        Some(pos) => &sql[pos + 1..],
        None => sql,
    };
    tail.to_uppercase().contains("RETURNING")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returning_clause() {
        assert!(returns_insert_id("INSERT INTO t (c2) VALUES ('x') RETURNING c1 /*lastInsertId*/ INTO :c1"));
        assert!(returns_insert_id("insert into t1 (c2) values (:c2) returning c1 into :c1"));
        assert!(!returns_insert_id("INSERT INTO t (c2) VALUES ('returning')"));
        assert!(!returns_insert_id("INSERT INTO t (c2) VALUES (:1)"));
        assert!(returns_insert_id("INSERT INTO t SELECT * FROM s RETURNING c1 INTO :1"));
    }
}
