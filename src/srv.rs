//! Server attachment

use crate::{
    Result, Error,
    cfg::{SesCfg, StmtCfg},
    drv::{self, drv, live, unlink},
    env::EnvInner,
    err::ResultExt,
    log,
    oci::{self, *},
    ses::{Ses, SesInner},
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

// Output buffers of string pointer binds on AL32UTF8 databases.
const UTF8_STRING_PTR_BUFFER_SIZE : u32 = 1000;

const CHARSET_SQL : &str = "SELECT property_value FROM database_properties WHERE property_name = 'NLS_CHARACTERSET'";

struct SrvState {
    open: bool,
    cfg: StmtCfg,
    sess: Vec<Weak<SesInner>>,
}

pub(crate) struct SrvInner {
    id: u64,
    dblink: String,
    err: Handle<OCIError>,
    // used by `break_`, which runs while another call is in flight
    brk_err: Handle<OCIError>,
    srv: Handle<OCIServer>,
    state: Mutex<SrvState>,
    env: Arc<EnvInner>,
}

impl Drop for SrvInner {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl AsRef<OCIEnv> for SrvInner {
    fn as_ref(&self) -> &OCIEnv {
        self.env.as_ref().as_ref()
    }
}

impl AsRef<OCIServer> for SrvInner {
    fn as_ref(&self) -> &OCIServer {
        &self.srv
    }
}

impl SrvInner {
    pub(crate) fn env(&self) -> &Arc<EnvInner> {
        &self.env
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().open
    }

    fn check_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err( Error::protocol("server is closed", self.id) )
        }
    }

    pub(crate) fn unlink_ses(&self, ses: *const SesInner) {
        unlink(&mut self.state.lock().sess, ses);
    }

    pub(crate) fn close(&self) -> Result<()> {
        let sess = {
            let mut state = self.state.lock();
            if !state.open {
                return Ok(());
            }
            state.open = false;
            let sess = live(&mut state.sess);
            state.sess.clear();
            sess
        };
        log::op(|cfg| cfg.srv.close, "srv", self.id, "close");
        let mut errs = Vec::new();
        for ses in sess {
            if let Err(err) = ses.close() {
                errs.push(err);
            }
        }
        if let Err(err) = oci::server_detach(&self.srv, &self.err).at("close", self.id) {
            errs.push(err);
        }
        self.env.unlink_srv(self);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

/**
A server attachment (a physical connection that is not yet authenticated).

Cloning a `Srv` produces another reference to the same attachment.
*/
#[derive(Clone)]
pub struct Srv {
    inner: Arc<SrvInner>,
}

impl Srv {
    pub(crate) fn new(env: &Arc<EnvInner>, dblink: &str, cfg: StmtCfg) -> Result<Self> {
        let oci_env : &OCIEnv = env.as_ref().as_ref();
        let err = Handle::<OCIError>::new(oci_env)?;
        let brk_err = Handle::<OCIError>::new(oci_env)?;
        let srv = Handle::<OCIServer>::new(oci_env)?;
        let id = drv::next_id();
        oci::server_attach(&srv, &err, dblink).at("open_srv", id)?;
        let state = SrvState { open: true, cfg, sess: Vec::new() };
        let inner = SrvInner {
            id, dblink: dblink.to_string(), err, brk_err, srv,
            state: Mutex::new(state), env: env.clone()
        };
        Ok( Self { inner: Arc::new(inner) } )
    }

    pub(crate) fn inner(&self) -> &Arc<SrvInner> {
        &self.inner
    }

    pub(crate) fn from_inner(inner: Arc<SrvInner>) -> Self {
        Self { inner }
    }

    /// Returns the process-unique id of this server.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Returns the connect identifier this server is attached to.
    pub fn dblink(&self) -> &str {
        &self.inner.dblink
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Returns a copy of the statement configuration sessions opened here start from.
    pub fn cfg(&self) -> StmtCfg {
        self.inner.state.lock().cfg.clone()
    }

    /// Replaces the statement configuration. Open sessions keep their own copies.
    pub fn set_cfg(&self, cfg: StmtCfg) -> Result<()> {
        cfg.validate()?;
        self.inner.state.lock().cfg = cfg;
        Ok(())
    }

    /**
    Opens an authenticated session.

    Empty credentials request external authentication.

    # Example

    ```no_run
    use ora::{SrvCfg, SesCfg};

    let env = ora::drv().open_env()?;
    let srv = env.open_srv(&SrvCfg::new("localhost:1521/orcl"))?;
    let ses = srv.open_ses(&SesCfg::new("scott", "tiger"))?;
    assert_eq!(srv.num_ses(), 1);
    env.close()?;
    assert!(!ses.is_open());
    # Ok::<(),ora::Error>(())
    ```
    */
    pub fn open_ses(&self, cfg: &SesCfg) -> Result<Ses> {
        self.inner.check_open()?;
        let mut stmt_cfg = match &cfg.stmt_cfg {
            Some(stmt_cfg) => stmt_cfg.clone(),
            None => self.cfg(),
        };
        stmt_cfg.validate()?;
        log::op_with(|cfg| cfg.srv.open_ses, "srv", self.inner.id, "open_ses", || cfg.username.clone());
        let is_utf8 = drv().charset_is_utf8(&self.inner.dblink);
        if is_utf8 == Some(true) {
            stmt_cfg.cap_string_ptr_buffer_size(UTF8_STRING_PTR_BUFFER_SIZE);
        }
        let ses = Ses::new(&self.inner, cfg, stmt_cfg, is_utf8.unwrap_or(false))?;
        self.inner.state.lock().sess.push(Arc::downgrade(ses.inner()));
        if is_utf8.is_none() {
            match probe_charset(&ses) {
                Ok(is_utf8) => {
                    drv().set_charset_is_utf8(&self.inner.dblink, is_utf8);
                    if is_utf8 {
                        ses.inner().mark_utf8(UTF8_STRING_PTR_BUFFER_SIZE);
                    }
                }
                Err(err) => {
                    tracing::warn!(id = self.inner.id, %err, "cannot read the database character set");
                }
            }
        }
        Ok(ses)
    }

    /// Returns the number of open sessions.
    pub fn num_ses(&self) -> usize {
        let sess = live(&mut self.inner.state.lock().sess);
        sess.iter().filter(|ses| ses.is_open()).count()
    }

    /**
    Returns the database server version banner.
    */
    pub fn version(&self) -> Result<String> {
        self.inner.check_open()?;
        log::op(|cfg| cfg.srv.version, "srv", self.inner.id, "version");
        oci::server_version(&self.inner.srv, &self.inner.err).at("version", self.inner.id)
    }

    /**
    Makes a round trip to the server through the first open session.
    */
    pub fn ping(&self) -> Result<()> {
        self.inner.check_open()?;
        log::op(|cfg| cfg.srv.ping, "srv", self.inner.id, "ping");
        let sess = live(&mut self.inner.state.lock().sess);
        let ses = sess.into_iter().find(|ses| ses.is_open());
        match ses {
            Some(ses) => ses.ping(),
            None => Err( Error::protocol("server has no open session", self.inner.id) ),
        }
    }

    /**
    Interrupts the call currently running on this server. Can be called from another thread.
    */
    pub fn break_(&self) -> Result<()> {
        self.inner.check_open()?;
        log::op(|cfg| cfg.srv.break_, "srv", self.inner.id, "break");
        let hndl = self.inner.srv.get_ptr().get() as *const libc::c_void;
        oci::break_call(hndl, &self.inner.brk_err).at("break", self.inner.id)?;
        oci::reset(hndl, &self.inner.brk_err).at("break", self.inner.id)
    }

    /**
    Reports whether the database character set is AL32UTF8. The answer is probed once
    per dblink through an open session and cached for the life of the process.
    */
    pub fn is_utf8(&self) -> Result<bool> {
        self.inner.check_open()?;
        if let Some(is_utf8) = drv().charset_is_utf8(&self.inner.dblink) {
            return Ok(is_utf8);
        }
        let sess = live(&mut self.inner.state.lock().sess);
        let ses = sess.into_iter().find(|ses| ses.is_open());
        let ses = ses.ok_or_else(|| Error::protocol("server has no open session", self.inner.id))?;
        let is_utf8 = probe_charset(&Ses::from_inner(ses))?;
        drv().set_charset_is_utf8(&self.inner.dblink, is_utf8);
        Ok(is_utf8)
    }

    /**
    Closes every session, then detaches from the server. Every failure along the way
    is collected; more than one comes back as `ErrorKind::Multi`.
    */
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

fn probe_charset(ses: &Ses) -> Result<bool> {
    let rset = ses.prep_and_qry(CHARSET_SQL, &mut [])?;
    let charset = match rset.next()? {
        Some(row) => row.get::<String, _>(0)?,
        None => String::new(),
    };
    rset.close()?;
    Ok(charset == "AL32UTF8")
}
