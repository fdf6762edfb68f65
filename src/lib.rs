/*!
An Oracle database driver over OCI.

Handles form a tree: the [`Driver`] singleton opens environments ([`Env`]), an
environment attaches to servers ([`Srv`]), a server opens sessions ([`Ses`]), and a
session prepares statements ([`Stmt`]) that produce result-sets ([`Rset`]) and runs
transactions ([`Tx`]). Closing a handle closes everything below it. Dropping the
last reference to a handle closes it as well.

Statement arguments are [`Arg`] values. Columns are read into [`Value`]s whose
variant is picked by the column type or by a [`ColumnType`] selector set on the
statement or in the [`RsetCfg`] of the session.

# Example

```no_run
use ora::{SesCfg, SrvCfg, Value};

fn main() -> ora::Result<()> {
    let env = ora::drv().open_env()?;
    let srv = env.open_srv(&SrvCfg::new("localhost:1521/orcl"))?;
    let ses = srv.open_ses(&SesCfg::new("scott", "tiger"))?;

    let rset = ses.prep_and_qry("SELECT ename, sal FROM emp WHERE deptno = :1", &mut [10.into()])?;
    while let Some(row) = rset.next()? {
        let name : String = row.get(0)?;
        let sal : Option<f64> = row.get("SAL")?;
        println!("{} {:?}", name, sal);
    }
    env.close()
}
```

[`Value`]: crate::Value
*/

mod oci;
mod err;
mod log;
mod cfg;
mod gct;
mod types;
mod drv;
mod env;
mod srv;
mod ses;
mod stmt;
mod tx;
mod lob;
mod pool;
mod con;

pub use err::{Error, ErrorKind};
pub use gct::ColumnType;
pub use types::{Value, Ora, Num, IntervalYM, IntervalDS, Bfile, FromValue};
pub use cfg::{
    StmtCfg, RsetCfg, ColumnFamily, EnvCfg, SrvCfg, SesCfg, SessionMode, TxCfg, DrvCfg,
    MAX_BUFFER_SIZE, MAX_FETCH_LEN, MIN_FETCH_LEN, DEFAULT_FETCH_LEN, MAX_PREFETCH_MEMORY_SIZE,
};
pub use log::{LogCfg, LogEnvCfg, LogSrvCfg, LogSesCfg, LogStmtCfg, LogTxCfg, LogRsetCfg, LogConCfg};
pub use drv::{drv, Driver, split_dsn, dsn_mode};
pub use env::Env;
pub use srv::Srv;
pub use ses::Ses;
pub use stmt::{Stmt, StmtKind, Arg, Rset, Row, Column, ColumnIndex};
pub use tx::{Tx, TxOpts};
pub use lob::{Lob, LobSrc};
pub use pool::{Pool, SrvPool, SesPool, DEFAULT_POOL_SIZE, DEFAULT_IDLE_TIMEOUT};
pub use con::{Con, ExecResult};

pub type Result<T> = std::result::Result<T, Error>;
