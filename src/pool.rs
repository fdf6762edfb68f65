//! Idle pools of servers and sessions

pub(crate) mod buf;

use crate::{
    Result, Error,
    cfg::{SesCfg, SrvCfg},
    drv,
    env::Env,
    ses::Ses,
    srv::Srv,
};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Number of idle instances a pool keeps when no size is given
pub const DEFAULT_POOL_SIZE : usize = 4;
/// How long an instance may stay idle before the pool closes it
pub const DEFAULT_IDLE_TIMEOUT : Duration = Duration::from_secs(60);

/// Something an idle pool can hold.
pub(crate) trait Pooled {
    fn is_open(&self) -> bool;
    fn close(&self) -> Result<()>;
}

impl Pooled for Srv {
    fn is_open(&self) -> bool { Srv::is_open(self) }
    fn close(&self) -> Result<()> { Srv::close(self) }
}

impl Pooled for Ses {
    fn is_open(&self) -> bool { Ses::is_open(self) }
    fn close(&self) -> Result<()> { Ses::close(self) }
}

/**
A bounded stack of idle instances with their return times.

The pool itself never closes anything: operations hand back the instances that
have to be closed so the caller can close them after the lock is released.
*/
struct Idle<T> {
    items: Vec<(T, Instant)>,
    size: usize,
    timeout: Duration,
}

impl<T: Pooled> Idle<T> {
    fn new(size: usize, timeout: Duration) -> Self {
        Self { items: Vec::with_capacity(size), size, timeout }
    }

    /// Removes instances that stayed idle longer than the timeout or that were closed elsewhere.
    fn evict(&mut self, now: Instant) -> Vec<T> {
        let timeout = self.timeout;
        let (keep, gone) : (Vec<_>, Vec<_>) = self.items.drain(..).partition(|(item, since)| {
            item.is_open() && now.saturating_duration_since(*since) <= timeout
        });
        self.items = keep;
        gone.into_iter().map(|(item, _)| item).collect()
    }

    /// Takes the most recently returned instance.
    fn take(&mut self) -> Option<T> {
        self.items.pop().map(|(item, _)| item)
    }

    /// Returns an instance. When the pool is full the one idle the longest is pushed out.
    fn put(&mut self, item: T, now: Instant) -> Option<T> {
        let out = if self.items.len() >= self.size {
            if self.items.is_empty() {
                return Some(item);
            }
            Some(self.items.remove(0).0)
        } else {
            None
        };
        self.items.push((item, now));
        out
    }

    fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).map(|(item, _)| item).collect()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

fn close_all<T: Pooled>(items: Vec<T>, errs: &mut Vec<Error>) {
    for item in items {
        if let Err(err) = item.close() {
            errs.push(err);
        }
    }
}

fn close_quietly<T: Pooled>(items: Vec<T>) {
    let mut errs = Vec::new();
    close_all(items, &mut errs);
    for err in errs {
        tracing::debug!(%err, "closing an idle pool instance failed");
    }
}

/**
A pool of server attachments.

# Example

```no_run
use ora::{SrvCfg, SrvPool};

let env = ora::drv().open_env()?;
let pool = SrvPool::new(&env, SrvCfg::new("localhost:1521/orcl"), 2);
let srv = pool.get()?;
pool.put(srv);
assert_eq!(pool.num_idle(), 1);
pool.close()?;
# Ok::<(),ora::Error>(())
```
*/
pub struct SrvPool {
    id: u64,
    env: Env,
    cfg: SrvCfg,
    idle: Mutex<Idle<Srv>>,
}

impl SrvPool {
    /// Creates a pool that keeps up to `size` idle servers. Size 0 selects the default size.
    pub fn new(env: &Env, cfg: SrvCfg, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_POOL_SIZE } else { size };
        Self {
            id: drv::next_id(),
            env: env.clone(), cfg,
            idle: Mutex::new(Idle::new(size, DEFAULT_IDLE_TIMEOUT)),
        }
    }

    /// Changes how long a server may stay idle before it is closed.
    pub fn set_idle_timeout(&self, timeout: Duration) {
        self.idle.lock().timeout = timeout;
    }

    /// Returns an idle server or attaches a new one.
    pub fn get(&self) -> Result<Srv> {
        let (srv, expired) = {
            let mut idle = self.idle.lock();
            let expired = idle.evict(Instant::now());
            (idle.take(), expired)
        };
        close_quietly(expired);
        match srv {
            Some(srv) => Ok(srv),
            None => {
                tracing::trace!(id = self.id, "server pool is empty");
                self.env.open_srv(&self.cfg)
            }
        }
    }

    /// Returns a server to the pool. Closed servers are dropped.
    pub fn put(&self, srv: Srv) {
        if !srv.is_open() {
            return;
        }
        let mut out = {
            let mut idle = self.idle.lock();
            let now = Instant::now();
            let mut out = idle.evict(now);
            out.extend(idle.put(srv, now));
            out
        };
        out.retain(|srv| srv.is_open());
        close_quietly(out);
    }

    /// Closes servers that have been idle longer than the idle timeout.
    pub fn evict(&self) {
        let expired = self.idle.lock().evict(Instant::now());
        close_quietly(expired);
    }

    /// Returns the number of idle servers.
    pub fn num_idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Closes every idle server.
    pub fn close(&self) -> Result<()> {
        let items = self.idle.lock().drain();
        let mut errs = Vec::new();
        close_all(items, &mut errs);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

impl Drop for SrvPool {
    fn drop(&mut self) {
        let items = self.idle.get_mut().drain();
        close_quietly(items);
    }
}

/**
A pool of sessions on one server.

Idle sessions are pinged before they are handed out. A session that fails the ping
is closed and the next one is tried.

# Example

```no_run
use ora::{SesCfg, SesPool, SrvCfg};

let env = ora::drv().open_env()?;
let srv = env.open_srv(&SrvCfg::new("localhost:1521/orcl"))?;
let pool = SesPool::new(&srv, SesCfg::new("scott", "tiger"), 4);
let ses = pool.get()?;
let rows = ses.prep_and_exe("UPDATE test_t SET c2 = c2", &mut [])?;
pool.put(ses);
# Ok::<(),ora::Error>(())
```
*/
pub struct SesPool {
    id: u64,
    srv: Srv,
    cfg: SesCfg,
    idle: Mutex<Idle<Ses>>,
}

impl SesPool {
    /// Creates a pool that keeps up to `size` idle sessions. Size 0 selects the default size.
    pub fn new(srv: &Srv, cfg: SesCfg, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_POOL_SIZE } else { size };
        Self {
            id: drv::next_id(),
            srv: srv.clone(), cfg,
            idle: Mutex::new(Idle::new(size, DEFAULT_IDLE_TIMEOUT)),
        }
    }

    /// Changes how long a session may stay idle before it is closed.
    pub fn set_idle_timeout(&self, timeout: Duration) {
        self.idle.lock().timeout = timeout;
    }

    /// Returns a live idle session or opens a new one.
    pub fn get(&self) -> Result<Ses> {
        if let Some(ses) = take_live_ses(&self.idle, self.id) {
            return Ok(ses);
        }
        self.srv.open_ses(&self.cfg)
    }

    /// Returns a session to the pool. Closed sessions are dropped.
    pub fn put(&self, ses: Ses) {
        if !ses.is_open() {
            return;
        }
        let out = {
            let mut idle = self.idle.lock();
            let now = Instant::now();
            let mut out = idle.evict(now);
            out.extend(idle.put(ses, now));
            out
        };
        close_quietly(out);
    }

    /// Closes sessions that have been idle longer than the idle timeout.
    pub fn evict(&self) {
        let expired = self.idle.lock().evict(Instant::now());
        close_quietly(expired);
    }

    /// Returns the number of idle sessions.
    pub fn num_idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Closes every idle session. The server stays attached.
    pub fn close(&self) -> Result<()> {
        let items = self.idle.lock().drain();
        let mut errs = Vec::new();
        close_all(items, &mut errs);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

impl Drop for SesPool {
    fn drop(&mut self) {
        let items = self.idle.get_mut().drain();
        close_quietly(items);
    }
}

// Pops idle sessions until one answers a ping. Sessions that do not are closed.
fn take_live_ses(idle: &Mutex<Idle<Ses>>, pool_id: u64) -> Option<Ses> {
    loop {
        let (ses, expired) = {
            let mut idle = idle.lock();
            let expired = idle.evict(Instant::now());
            (idle.take(), expired)
        };
        close_quietly(expired);
        let ses = ses?;
        match ses.ping() {
            Ok(()) => return Some(ses),
            Err(err) => {
                tracing::debug!(id = pool_id, ses = ses.id(), %err, "idle session failed a ping");
                close_quietly(vec![ses]);
            }
        }
    }
}

/**
A pool of sessions together with the servers they run on.

`get` prefers an idle session, then an idle server with a new session on it, and
only then attaches a new server. A session returned with `put` that later falls
out of the pool gives its server back to the server pool.

# Example

```no_run
use ora::{Pool, SesCfg, SrvCfg};

let env = ora::drv().open_env()?;
let pool = Pool::new(&env, SrvCfg::new("localhost:1521/orcl"), SesCfg::new("scott", "tiger"), 4);
let ses = pool.get()?;
let tx = ses.start_tx()?;
ses.prep_and_exe("DELETE FROM test_t", &mut [])?;
tx.rollback()?;
pool.put(ses);
pool.close()?;
# Ok::<(),ora::Error>(())
```
*/
pub struct Pool {
    id: u64,
    env: Env,
    srv_cfg: SrvCfg,
    ses_cfg: SesCfg,
    srvs: Mutex<Idle<Srv>>,
    sess: Mutex<Idle<Ses>>,
}

impl Pool {
    /// Creates a pool that keeps up to `size` idle sessions and as many idle servers.
    pub fn new(env: &Env, srv_cfg: SrvCfg, ses_cfg: SesCfg, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_POOL_SIZE } else { size };
        Self {
            id: drv::next_id(),
            env: env.clone(), srv_cfg, ses_cfg,
            srvs: Mutex::new(Idle::new(size, DEFAULT_IDLE_TIMEOUT)),
            sess: Mutex::new(Idle::new(size, DEFAULT_IDLE_TIMEOUT)),
        }
    }

    /// Creates a pool from a `username/password@dblink` connect string.
    pub fn from_dsn(env: &Env, dsn: &str, size: usize) -> Self {
        let (username, password, dblink) = drv::split_dsn(dsn);
        let ses_cfg = SesCfg { mode: drv::dsn_mode(dsn), ..SesCfg::new(&username, &password) };
        Self::new(env, SrvCfg::new(&dblink), ses_cfg, size)
    }

    /// Changes how long servers and sessions may stay idle before they are closed.
    pub fn set_idle_timeout(&self, timeout: Duration) {
        self.sess.lock().timeout = timeout;
        self.srvs.lock().timeout = timeout;
    }

    /// Returns a live session.
    pub fn get(&self) -> Result<Ses> {
        let expired = self.sess.lock().evict(Instant::now());
        self.retire(expired);
        if let Some(ses) = take_live_ses(&self.sess, self.id) {
            return Ok(ses);
        }
        loop {
            let (srv, expired) = {
                let mut srvs = self.srvs.lock();
                let expired = srvs.evict(Instant::now());
                (srvs.take(), expired)
            };
            close_quietly(expired);
            let srv = match srv {
                Some(srv) => srv,
                None => break,
            };
            match srv.open_ses(&self.ses_cfg) {
                Ok(ses) => return Ok(ses),
                Err(err) => {
                    tracing::debug!(id = self.id, srv = srv.id(), %err, "idle server cannot open a session");
                    close_quietly(vec![srv]);
                }
            }
        }
        let srv = self.env.open_srv(&self.srv_cfg)?;
        match srv.open_ses(&self.ses_cfg) {
            Ok(ses) => Ok(ses),
            Err(err) => {
                close_quietly(vec![srv]);
                Err(err)
            }
        }
    }

    /// Returns a session to the pool. Closed sessions are dropped.
    pub fn put(&self, ses: Ses) {
        if !ses.is_open() {
            return;
        }
        let out = {
            let mut sess = self.sess.lock();
            let now = Instant::now();
            let mut out = sess.evict(now);
            out.extend(sess.put(ses, now));
            out
        };
        self.retire(out);
    }

    // Closes sessions that left the pool and parks their servers.
    fn retire(&self, sess: Vec<Ses>) {
        for ses in sess {
            let srv = ses.srv();
            if let Err(err) = ses.close() {
                tracing::debug!(id = self.id, ses = ses.id(), %err, "closing an idle session failed");
            }
            if !srv.is_open() || srv.num_ses() > 0 {
                continue;
            }
            let out = {
                let mut srvs = self.srvs.lock();
                let now = Instant::now();
                let mut out = srvs.evict(now);
                out.extend(srvs.put(srv, now));
                out
            };
            close_quietly(out);
        }
    }

    /// Closes idle sessions and servers that have been idle longer than the idle timeout.
    pub fn evict(&self) {
        let expired = self.sess.lock().evict(Instant::now());
        self.retire(expired);
        let expired = self.srvs.lock().evict(Instant::now());
        close_quietly(expired);
    }

    /// Returns the number of idle sessions.
    pub fn num_idle_ses(&self) -> usize {
        self.sess.lock().len()
    }

    /// Returns the number of idle servers.
    pub fn num_idle_srv(&self) -> usize {
        self.srvs.lock().len()
    }

    /// Closes every idle session and the servers they ran on, then every idle server.
    pub fn close(&self) -> Result<()> {
        let sess = self.sess.lock().drain();
        let mut errs = Vec::new();
        for ses in sess {
            let srv = ses.srv();
            if let Err(err) = ses.close() {
                errs.push(err);
            }
            if srv.num_ses() == 0 {
                if let Err(err) = srv.close() {
                    errs.push(err);
                }
            }
        }
        let srvs = self.srvs.lock().drain();
        close_all(srvs, &mut errs);
        Error::collect(errs).map_or(Ok(()), Err)
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::debug!(id = self.id, %err, "closing a pool failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Item {
        no: u32,
        open: Rc<Cell<bool>>,
    }

    impl Item {
        fn new(no: u32) -> Self {
            Self { no, open: Rc::new(Cell::new(true)) }
        }
    }

    impl Pooled for Item {
        fn is_open(&self) -> bool { self.open.get() }
        fn close(&self) -> Result<()> { self.open.set(false); Ok(()) }
    }

    #[test]
    fn overflow_pushes_out_the_oldest() {
        let now = Instant::now();
        let mut idle = Idle::new(2, DEFAULT_IDLE_TIMEOUT);
        assert!(idle.put(Item::new(1), now).is_none());
        assert!(idle.put(Item::new(2), now).is_none());
        let out = idle.put(Item::new(3), now).map(|item| item.no);
        assert_eq!(out, Some(1));
        assert_eq!(idle.len(), 2);
        assert_eq!(idle.take().map(|item| item.no), Some(3));
        assert_eq!(idle.take().map(|item| item.no), Some(2));
        assert!(idle.take().is_none());
    }

    #[test]
    fn eviction() {
        let start = Instant::now();
        let mut idle = Idle::new(4, Duration::from_secs(10));
        idle.put(Item::new(1), start);
        idle.put(Item::new(2), start + Duration::from_secs(5));
        let closed = Item::new(3);
        idle.put(closed.clone(), start + Duration::from_secs(5));
        closed.close().unwrap();

        let gone : Vec<u32> = idle.evict(start + Duration::from_secs(12)).iter().map(|item| item.no).collect();
        assert_eq!(gone, vec![1, 3]);
        assert_eq!(idle.len(), 1);

        let gone = idle.evict(start + Duration::from_secs(16));
        assert_eq!(gone.len(), 1);
        assert_eq!(idle.len(), 0);
    }

    #[test]
    fn close_collects_every_item() {
        let mut idle = Idle::new(3, DEFAULT_IDLE_TIMEOUT);
        let items : Vec<Item> = (1..=3).map(Item::new).collect();
        let now = Instant::now();
        for item in &items {
            idle.put(item.clone(), now);
        }
        let mut errs = Vec::new();
        close_all(idle.drain(), &mut errs);
        assert!(errs.is_empty());
        assert!(items.iter().all(|item| !item.is_open()));
        assert_eq!(idle.len(), 0);
    }
}
