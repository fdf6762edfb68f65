//! OCI environment

use crate::{
    Result, Error,
    cfg::{EnvCfg, SrvCfg, SesCfg, StmtCfg},
    con::{Con, ConInner},
    drv::{self, drv, live, unlink},
    log,
    oci::{self, *},
    srv::{Srv, SrvInner},
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

struct EnvState {
    open: bool,
    cfg: StmtCfg,
    srvs: Vec<Weak<SrvInner>>,
    cons: Vec<Weak<ConInner>>,
}

pub(crate) struct EnvInner {
    id: u64,
    // `err` has to be released before `env`
    err: Handle<OCIError>,
    env: Handle<OCIEnv>,
    state: Mutex<EnvState>,
}

impl Drop for EnvInner {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl AsRef<OCIEnv> for EnvInner {
    fn as_ref(&self) -> &OCIEnv {
        &self.env
    }
}

impl AsRef<OCIError> for EnvInner {
    fn as_ref(&self) -> &OCIError {
        &self.err
    }
}

impl EnvInner {
    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub(crate) fn stmt_cfg(&self) -> StmtCfg {
        self.state.lock().cfg.clone()
    }

    pub(crate) fn set_stmt_cfg(&self, cfg: StmtCfg) {
        self.state.lock().cfg = cfg;
    }

    pub(crate) fn check_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err( Error::protocol("environment is closed", self.id) )
        }
    }

    pub(crate) fn unlink_srv(&self, srv: *const SrvInner) {
        unlink(&mut self.state.lock().srvs, srv);
    }

    pub(crate) fn unlink_con(&self, con: *const ConInner) {
        unlink(&mut self.state.lock().cons, con);
    }

    fn close(&self) -> Result<()> {
        let (cons, srvs) = {
            let mut state = self.state.lock();
            if !state.open {
                return Ok(());
            }
            state.open = false;
            let cons = live(&mut state.cons);
            let srvs = live(&mut state.srvs);
            state.cons.clear();
            state.srvs.clear();
            (cons, srvs)
        };
        log::op(|cfg| cfg.env.close, "env", self.id, "close");
        let mut errs = Vec::new();
        for con in cons {
            if let Err(err) = con.close() {
                errs.push(err);
            }
        }
        for srv in srvs {
            if let Err(err) = srv.close() {
                errs.push(err);
            }
        }
        drv().unlink_env(self);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

/**
Represents an OCI environment: the root of a handle tree.

Cloning an `Env` produces another reference to the same environment.
*/
#[derive(Clone)]
pub struct Env {
    inner: Arc<EnvInner>,
}

impl Env {
    pub(crate) fn new(cfg: EnvCfg) -> Result<Self> {
        let mut env = Ptr::<OCIEnv>::null();
        oci::env_nls_create(env.as_mut_ptr(), OCI_THREADED)?;
        let env = Handle::from(env);
        let err = Handle::<OCIError>::new(&env)?;
        let state = EnvState { open: true, cfg: cfg.stmt_cfg, srvs: Vec::new(), cons: Vec::new() };
        let inner = Arc::new(EnvInner { id: drv::next_id(), err, env, state: Mutex::new(state) });
        Ok( Self { inner } )
    }

    pub(crate) fn inner(&self) -> &Arc<EnvInner> {
        &self.inner
    }

    /// Returns the process-unique id of this environment.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Reports whether the environment is open.
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Returns a copy of the statement configuration servers opened here start from.
    pub fn cfg(&self) -> StmtCfg {
        self.inner.stmt_cfg()
    }

    /// Replaces the statement configuration. Servers that are already open are not affected.
    pub fn set_cfg(&self, cfg: StmtCfg) -> Result<()> {
        cfg.validate()?;
        self.inner.set_stmt_cfg(cfg);
        Ok(())
    }

    /**
    Attaches to a database server.

    # Example

    ```no_run
    use ora::SrvCfg;

    let env = ora::drv().open_env()?;
    let srv = env.open_srv(&SrvCfg::new("localhost:1521/orcl"))?;
    assert_eq!(env.num_srv(), 1);
    srv.close()?;
    assert_eq!(env.num_srv(), 0);
    # Ok::<(),ora::Error>(())
    ```
    */
    pub fn open_srv(&self, cfg: &SrvCfg) -> Result<Srv> {
        self.inner.check_open()?;
        if cfg.dblink.trim().is_empty() {
            return Err( Error::config("server dblink is empty") );
        }
        let stmt_cfg = match &cfg.stmt_cfg {
            Some(stmt_cfg) => stmt_cfg.clone(),
            None => self.inner.stmt_cfg(),
        };
        stmt_cfg.validate()?;
        log::op_with(|cfg| cfg.env.open_srv, "env", self.inner.id, "open_srv", || cfg.dblink.clone());
        let srv = Srv::new(&self.inner, &cfg.dblink, stmt_cfg)?;
        self.inner.state.lock().srvs.push(Arc::downgrade(srv.inner()));
        Ok(srv)
    }

    /**
    Opens a server and a session from a `username/password@dblink` connect string and
    wraps them into a generic SQL connection.
    */
    pub fn open_con(&self, dsn: &str) -> Result<Con> {
        self.inner.check_open()?;
        log::op(|cfg| cfg.env.open_con, "env", self.inner.id, "open_con");
        let (username, password, dblink) = drv::split_dsn(dsn);
        let srv = self.open_srv(&SrvCfg::new(&dblink))?;
        let ses_cfg = SesCfg { mode: drv::dsn_mode(dsn), ..SesCfg::new(&username, &password) };
        let ses = match srv.open_ses(&ses_cfg) {
            Ok(ses) => ses,
            Err(err) => {
                let _ = srv.close();
                return Err(err);
            }
        };
        let con = Con::new(srv, ses);
        self.inner.state.lock().cons.push(Arc::downgrade(con.inner()));
        Ok(con)
    }

    /// Returns the number of open servers.
    pub fn num_srv(&self) -> usize {
        let srvs = live(&mut self.inner.state.lock().srvs);
        srvs.iter().filter(|srv| srv.is_open()).count()
    }

    /// Returns the number of open generic SQL connections.
    pub fn num_con(&self) -> usize {
        let cons = live(&mut self.inner.state.lock().cons);
        cons.iter().filter(|con| con.is_open()).count()
    }

    /**
    Closes every connection and server opened in this environment, then the environment
    itself. Closing an environment twice is not an error.
    */
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}
