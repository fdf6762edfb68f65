//! The process-wide driver: configuration, open environments, connect string parsing.

use crate::{Result, cfg::{DrvCfg, EnvCfg, SessionMode}, env::{Env, EnvInner}, log::LogCfg};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::{collections::HashMap, sync::{Arc, Weak, atomic::{AtomicU64, Ordering}}};

/**
Driver singleton. Holds the configuration new environments start from and the list
of open environments.
*/
pub struct Driver {
    cfg: RwLock<DrvCfg>,
    envs: Mutex<Vec<Weak<EnvInner>>>,
    // database character set probe results by dblink
    charsets: Mutex<HashMap<String, bool>>,
}

static DRV : Lazy<Driver> = Lazy::new(|| Driver {
    cfg: RwLock::new(DrvCfg::default()),
    envs: Mutex::new(Vec::new()),
    charsets: Mutex::new(HashMap::new()),
});

static NEXT_ID : AtomicU64 = AtomicU64::new(1);

/**
Returns the driver.

# Example

```
let drv = ora::drv();
let cfg = drv.cfg();
assert_eq!(cfg.stmt_cfg.prefetch_row_count(), 128);
```
*/
pub fn drv() -> &'static Driver {
    &DRV
}

/// Returns a process-unique handle id.
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Upgrades the live entries of a child list, dropping the dead ones.
pub(crate) fn live<T>(list: &mut Vec<Weak<T>>) -> Vec<Arc<T>> {
    list.retain(|w| w.strong_count() > 0);
    list.iter().filter_map(Weak::upgrade).collect()
}

/// Removes `item` (and any dead entries) from a child list.
pub(crate) fn unlink<T>(list: &mut Vec<Weak<T>>, item: *const T) {
    list.retain(|w| w.strong_count() > 0 && w.as_ptr() != item);
}

impl Driver {
    /// Returns a copy of the current configuration.
    pub fn cfg(&self) -> DrvCfg {
        self.cfg.read().clone()
    }

    pub(crate) fn log_cfg(&self) -> LogCfg {
        self.cfg.read().log
    }

    /**
    Replaces the driver configuration.

    Logging toggles take effect immediately everywhere. The statement configuration
    is copied into every open environment; servers, sessions and statements that are
    already open keep their own copies.
    */
    pub fn set_cfg(&self, cfg: DrvCfg) -> Result<()> {
        cfg.stmt_cfg.validate()?;
        let stmt_cfg = cfg.stmt_cfg.clone();
        *self.cfg.write() = cfg;
        let envs = live(&mut self.envs.lock());
        for env in envs {
            env.set_stmt_cfg(stmt_cfg.clone());
        }
        Ok(())
    }

    /**
    Opens an environment configured with the driver's statement configuration.

    # Example

    ```no_run
    let env = ora::drv().open_env()?;
    assert!(env.is_open());
    env.close()?;
    # Ok::<(),ora::Error>(())
    ```
    */
    pub fn open_env(&self) -> Result<Env> {
        let cfg = EnvCfg { stmt_cfg: self.cfg.read().stmt_cfg.clone() };
        self.open_env_with(cfg)
    }

    /// Opens an environment with an explicit configuration.
    pub fn open_env_with(&self, cfg: EnvCfg) -> Result<Env> {
        cfg.stmt_cfg.validate()?;
        let env = Env::new(cfg)?;
        self.envs.lock().push(Arc::downgrade(env.inner()));
        Ok(env)
    }

    /// Returns the number of open environments.
    pub fn num_env(&self) -> usize {
        let envs = live(&mut self.envs.lock());
        envs.iter().filter(|env| env.is_open()).count()
    }

    pub(crate) fn unlink_env(&self, env: *const EnvInner) {
        unlink(&mut self.envs.lock(), env);
    }

    pub(crate) fn charset_is_utf8(&self, dblink: &str) -> Option<bool> {
        self.charsets.lock().get(dblink).copied()
    }

    pub(crate) fn set_charset_is_utf8(&self, dblink: &str, is_utf8: bool) {
        self.charsets.lock().insert(dblink.to_string(), is_utf8);
    }
}

/**
Reads the privilege suffix of a connect string.

# Example

```
use ora::{dsn_mode, SessionMode};

assert_eq!(dsn_mode("sys/pwd@db as sysdba"), SessionMode::SysDba);
assert_eq!(dsn_mode("sys/pwd@db AS SYSOPER"), SessionMode::SysOper);
assert_eq!(dsn_mode("scott/tiger@db"), SessionMode::Default);
```
*/
pub fn dsn_mode(dsn: &str) -> SessionMode {
    if dsn.len() <= 11 || !dsn.is_char_boundary(dsn.len() - 11) {
        return SessionMode::Default;
    }
    let end = dsn[dsn.len() - 11..].to_uppercase();
    if end.ends_with(" AS SYSDBA") {
        SessionMode::SysDba
    } else if end.ends_with(" AS SYSOPER") {
        SessionMode::SysOper
    } else {
        SessionMode::Default
    }
}

/**
Splits a `username/password@dblink` connect string into its parts.

A trailing `AS SYSDBA` or `AS SYSOPER` is dropped (see [`dsn_mode`]). `/@dblink`
requests external authentication and yields empty credentials.

# Example

```
let (usr, pwd, db) = ora::split_dsn("scott/tiger@localhost:1521/orcl");
assert_eq!((usr.as_str(), pwd.as_str(), db.as_str()), ("scott", "tiger", "localhost:1521/orcl"));
```
*/
pub fn split_dsn(dsn: &str) -> (String, String, String) {
    let mut dsn = dsn.trim();
    match dsn_mode(dsn) {
        SessionMode::SysOper => dsn = &dsn[..dsn.len() - 11],
        SessionMode::SysDba  => dsn = &dsn[..dsn.len() - 10],
        SessionMode::Default => {}
    }
    if let Some(dblink) = dsn.strip_prefix("/@") {
        return (String::new(), String::new(), dblink.to_string());
    }
    let mut dblink = "";
    if let Some(pos) = dsn.rfind('@') {
        dblink = &dsn[pos + 1..];
        dsn = &dsn[..pos];
    }
    let (username, password) = match dsn.find('/') {
        Some(pos) => (&dsn[..pos], &dsn[pos + 1..]),
        None => ("", ""),
    };
    (username.to_string(), password.to_string(), dblink.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(dsn: &str) -> (String, String, String) {
        split_dsn(dsn)
    }

    #[test]
    fn connect_strings() {
        assert_eq!(split("scott/tiger@orcl"), ("scott".into(), "tiger".into(), "orcl".into()));
        assert_eq!(split("  scott/tiger@orcl  "), ("scott".into(), "tiger".into(), "orcl".into()));
        assert_eq!(split("/@orcl"), ("".into(), "".into(), "orcl".into()));
        assert_eq!(split("sys/p@ss@orcl as sysdba"), ("sys".into(), "p@ss".into(), "orcl".into()));
        assert_eq!(split("sys/pwd@orcl AS SYSOPER"), ("sys".into(), "pwd".into(), "orcl".into()));
        assert_eq!(split("usr/a/b@host:1521/svc"), ("usr".into(), "a/b".into(), "host:1521/svc".into()));
        assert_eq!(split("scott@orcl"), ("".into(), "".into(), "orcl".into()));
        assert_eq!(split("scott/tiger"), ("scott".into(), "tiger".into(), "".into()));
    }

    #[test]
    fn privilege_suffix() {
        assert_eq!(dsn_mode("a/b@c as sysdba"), SessionMode::SysDba);
        assert_eq!(dsn_mode("a/b@c As SysOper"), SessionMode::SysOper);
        assert_eq!(dsn_mode(" AS SYSDBA"), SessionMode::Default);
        assert_eq!(dsn_mode("a/b@c"), SessionMode::Default);
        assert_eq!(dsn_mode("ü/ü@ü as sysdbä"), SessionMode::Default);
    }

    #[test]
    fn ids_are_unique() {
        let a = next_id();
        let b = next_id();
        assert!(b > a);
    }

    #[test]
    fn child_lists() {
        let a = Arc::new(1);
        let b = Arc::new(2);
        let mut list = vec![Arc::downgrade(&a), Arc::downgrade(&b)];
        {
            let c = Arc::new(3);
            list.push(Arc::downgrade(&c));
        }
        assert_eq!(live(&mut list).len(), 2);
        assert_eq!(list.len(), 2);
        unlink(&mut list, Arc::as_ptr(&a));
        let rest = live(&mut list);
        assert_eq!(rest.len(), 1);
        assert_eq!(*rest[0], 2);
    }
}
