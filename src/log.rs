//! Per-operation logging toggles.
//!
//! Events are emitted through `tracing` at the `debug` level. Nothing is printed
//! until the application installs a subscriber and enables the toggles it wants.

/// Environment operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogEnvCfg {
    pub open_srv: bool,
    pub open_con: bool,
    pub close: bool,
}

/// Server operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSrvCfg {
    pub open_ses: bool,
    pub version: bool,
    pub ping: bool,
    pub break_: bool,
    pub close: bool,
}

/// Session operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSesCfg {
    pub prep: bool,
    pub prep_and_exe: bool,
    pub prep_and_qry: bool,
    pub start_tx: bool,
    pub ping: bool,
    pub break_: bool,
    pub close: bool,
}

/// Statement operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStmtCfg {
    pub bind: bool,
    pub exe: bool,
    pub qry: bool,
    pub next_rset: bool,
    pub close: bool,
}

/// Transaction operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogTxCfg {
    pub commit: bool,
    pub rollback: bool,
}

/// Result-set operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRsetCfg {
    pub open: bool,
    /// Logs every select-list definition when the result-set opens.
    pub open_defs: bool,
    pub next: bool,
    pub close: bool,
}

/// Generic SQL adapter operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogConCfg {
    pub exec: bool,
    pub query: bool,
    pub begin: bool,
    pub ping: bool,
    pub close: bool,
}

/// Logging configuration. Every toggle is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCfg {
    pub env: LogEnvCfg,
    pub srv: LogSrvCfg,
    pub ses: LogSesCfg,
    pub stmt: LogStmtCfg,
    pub tx: LogTxCfg,
    pub rset: LogRsetCfg,
    pub con: LogConCfg,
}

impl LogCfg {
    /// Returns a configuration with every toggle on.
    pub fn all() -> Self {
        Self {
            env:  LogEnvCfg  { open_srv: true, open_con: true, close: true },
            srv:  LogSrvCfg  { open_ses: true, version: true, ping: true, break_: true, close: true },
            ses:  LogSesCfg  { prep: true, prep_and_exe: true, prep_and_qry: true, start_tx: true, ping: true, break_: true, close: true },
            stmt: LogStmtCfg { bind: true, exe: true, qry: true, next_rset: true, close: true },
            tx:   LogTxCfg   { commit: true, rollback: true },
            rset: LogRsetCfg { open: true, open_defs: true, next: true, close: true },
            con:  LogConCfg  { exec: true, query: true, begin: true, ping: true, close: true },
        }
    }
}

/// Reports whether the toggle picked by `sel` is on in the current driver configuration.
pub(crate) fn enabled(sel: impl FnOnce(&LogCfg) -> bool) -> bool {
    sel(&crate::drv::drv().log_cfg())
}

/**
Emits a debug event for `op` on the handle `id` of the component `obj` when the
toggle chosen by `sel` is on.
*/
pub(crate) fn op(sel: impl FnOnce(&LogCfg) -> bool, obj: &'static str, id: u64, op: &'static str) {
    if enabled(sel) {
        tracing::debug!(obj, id, op);
    }
}

/// Same as [`op`] with a free-form detail field.
pub(crate) fn op_with(sel: impl FnOnce(&LogCfg) -> bool, obj: &'static str, id: u64, op: &'static str, detail: impl FnOnce() -> String) {
    if enabled(sel) {
        let detail = detail();
        tracing::debug!(obj, id, op, %detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_silent() {
        let cfg = LogCfg::default();
        assert!(!cfg.ses.prep);
        assert!(!cfg.rset.open_defs);
        let all = LogCfg::all();
        assert!(all.ses.prep && all.rset.open_defs && all.con.close);
    }
}
