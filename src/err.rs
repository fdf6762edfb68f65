//! Driver errors

use crate::oci::{self, OCIEnv, OCIError, OCI_HTYPE_ENV, OCI_HTYPE_ERROR, OCI_SUCCESS, OCI_NO_DATA, OCI_NEED_DATA, OCI_ERROR_MAXMSG_SIZE};
use libc::c_void;
use std::{ptr, fmt, io, ffi::CStr};

/// ORA-01013: user requested cancel of current operation
pub(crate) const ORA_CANCELLED : i32 = 1013;
/// ORA-01010: invalid OCI operation (returned by ping on some server versions)
pub(crate) const ORA_INVALID_OCI_OPERATION : i32 = 1010;

// Codes after which the session cannot be used anymore.
const SESSION_LOST_CODES : [i32; 6] = [
    3113,   // end-of-file on communication channel
    3114,   // not connected to ORACLE
    3135,   // connection lost contact
    2396,   // exceeded maximum idle time
    12170,  // connect timeout occurred
    28,     // your session has been killed
];

fn get_oracle_error(rc: i32, errhp: *const c_void, htype: u32) -> (i32, String) {
    let mut errcode = rc;
    let mut errmsg = vec![0u8; OCI_ERROR_MAXMSG_SIZE];
    let res = unsafe {
        oci::OCIErrorGet(errhp, 1, ptr::null(), &mut errcode, errmsg.as_mut_ptr(), errmsg.len() as u32, htype)
    };
    let msg = if res == OCI_SUCCESS {
        let msg = unsafe { CStr::from_ptr(errmsg.as_ptr() as *const libc::c_char) };
        msg.to_string_lossy().trim_end().to_string()
    } else {
        match rc {
            OCI_NO_DATA   => String::from("No Data"),
            OCI_NEED_DATA => String::from("Need Data"),
            _ => format!("Error {}", rc),
        }
    };
    (errcode, msg)
}

/// Stable error category. See [`Error::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration: a bad type selector, a buffer size out of range, a missing connection field.
    Config,
    /// A value could not be bound: unsupported source/target pair, overflow, length mismatch.
    Bind,
    /// An error reported by OCI or the database.
    Oracle,
    /// An illegal state transition detected before calling OCI.
    Protocol,
    /// An in-flight call was aborted by a break.
    Cancelled,
    /// The session is no longer usable.
    SessionLost,
    /// Driver internal condition.
    Interface,
    /// Several errors collected while closing a handle subtree.
    Multi,
}

/// Represents possible errors returned from the driver
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ora: config: {0}")]
    Config(String),

    #[error("ora: bind: {msg}")]
    Bind { msg: String, handle: u64 },

    #[error("ora{}: ORA-{code:05}: {msg}", op_name(.op))]
    Oracle { code: i32, msg: String, op: &'static str, handle: u64 },

    #[error("ora: protocol: {msg}")]
    Protocol { msg: String, handle: u64 },

    #[error("ora{}: cancelled: {msg}", op_name(.op))]
    Cancelled { msg: String, op: &'static str, handle: u64 },

    #[error("ora: session lost: ORA-{code:05}: {msg}")]
    SessionLost { code: i32, msg: String, handle: u64 },

    #[error("ora: {0}")]
    Interface(String),

    #[error("ora: {} errors, first: {}", .0.len(), multi_head(.0))]
    Multi(Vec<Error>),
}

struct OpName<'a>(&'a str);

fn op_name(op: &str) -> OpName<'_> {
    OpName(op)
}

impl fmt::Display for OpName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() { Ok(()) } else { write!(f, " {}", self.0) }
    }
}

struct MultiHead<'a>(&'a [Error]);

fn multi_head(errs: &[Error]) -> MultiHead<'_> {
    MultiHead(errs)
}

impl fmt::Display for MultiHead<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.first() {
            Some(err) => err.fmt(f),
            None => Ok(()),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.kind() == other.kind() && self.code() == other.code()
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl Error {
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Error::Interface( msg.into() )
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config( msg.into() )
    }

    pub(crate) fn bind(msg: impl Into<String>) -> Self {
        Error::Bind { msg: msg.into(), handle: 0 }
    }

    pub(crate) fn protocol(msg: impl Into<String>, handle: u64) -> Self {
        Error::Protocol { msg: msg.into(), handle }
    }

    pub(crate) fn env(env: &OCIEnv, rc: i32) -> Self {
        let (code, msg) = get_oracle_error(rc, env as *const OCIEnv as _, OCI_HTYPE_ENV);
        Self::from_code(code, msg)
    }

    pub(crate) fn oci(err: &OCIError, rc: i32) -> Self {
        let (code, msg) = get_oracle_error(rc, err as *const OCIError as _, OCI_HTYPE_ERROR);
        Self::from_code(code, msg)
    }

    pub(crate) fn from_code(code: i32, msg: String) -> Self {
        if code == ORA_CANCELLED {
            Error::Cancelled { msg, op: "", handle: 0 }
        } else if SESSION_LOST_CODES.contains(&code) {
            Error::SessionLost { code, msg, handle: 0 }
        } else {
            Error::Oracle { code, msg, op: "", handle: 0 }
        }
    }

    /// Collapses errors collected during a close into one.
    pub(crate) fn collect(mut errs: Vec<Error>) -> Option<Self> {
        match errs.len() {
            0 => None,
            1 => errs.pop(),
            _ => Some(Error::Multi(errs)),
        }
    }

    /**
    Records the failing operation and the nearest handle id. The innermost
    call site wins: values that are already set are kept.
    */
    pub(crate) fn at(mut self, op_name: &'static str, id: u64) -> Self {
        match &mut self {
            Error::Oracle { op, handle, .. } | Error::Cancelled { op, handle, .. } => {
                if op.is_empty() { *op = op_name; }
                if *handle == 0 { *handle = id; }
            }
            Error::Bind { handle, .. } | Error::Protocol { handle, .. } | Error::SessionLost { handle, .. } => {
                if *handle == 0 { *handle = id; }
            }
            _ => {}
        }
        self
    }

    /// Returns the stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_)            => ErrorKind::Config,
            Error::Bind { .. }          => ErrorKind::Bind,
            Error::Oracle { .. }        => ErrorKind::Oracle,
            Error::Protocol { .. }      => ErrorKind::Protocol,
            Error::Cancelled { .. }     => ErrorKind::Cancelled,
            Error::SessionLost { .. }   => ErrorKind::SessionLost,
            Error::Interface(_)         => ErrorKind::Interface,
            Error::Multi(_)             => ErrorKind::Multi,
        }
    }

    /// Returns the Oracle error code, or 0 for errors that did not come from OCI.
    pub fn code(&self) -> i32 {
        match self {
            Error::Oracle { code, .. } | Error::SessionLost { code, .. } => *code,
            Error::Cancelled { .. } => ORA_CANCELLED,
            Error::Multi(errs) => errs.first().map(Error::code).unwrap_or(0),
            _ => 0,
        }
    }

    /// Returns the id of the handle nearest to the failure, or 0 when unknown.
    pub fn handle(&self) -> u64 {
        match self {
            Error::Bind { handle, .. }
            | Error::Oracle { handle, .. }
            | Error::Protocol { handle, .. }
            | Error::Cancelled { handle, .. }
            | Error::SessionLost { handle, .. } => *handle,
            Error::Multi(errs) => errs.first().map(Error::handle).unwrap_or(0),
            _ => 0,
        }
    }

    /// Returns the name of the failing operation when known.
    pub fn op(&self) -> &str {
        match self {
            Error::Oracle { op, .. } | Error::Cancelled { op, .. } => op,
            _ => "",
        }
    }
}

/// Adds operation context to errors on their way up.
pub(crate) trait ResultExt<T> {
    fn at(self, op: &'static str, id: u64) -> crate::Result<T>;
}

impl<T> ResultExt<T> for crate::Result<T> {
    fn at(self, op: &'static str, id: u64) -> crate::Result<T> {
        self.map_err(|err| err.at(op, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_kinds() {
        assert_eq!(Error::from_code(1013, "cancel".into()).kind(), ErrorKind::Cancelled);
        assert_eq!(Error::from_code(3113, "eof".into()).kind(), ErrorKind::SessionLost);
        assert_eq!(Error::from_code(3114, "not connected".into()).kind(), ErrorKind::SessionLost);
        assert_eq!(Error::from_code(942, "table or view does not exist".into()).kind(), ErrorKind::Oracle);
    }

    #[test]
    fn non_oci_errors_have_zero_code() {
        assert_eq!(Error::config("bad").code(), 0);
        assert_eq!(Error::bind("bad").code(), 0);
        assert_eq!(Error::protocol("bad", 7).code(), 0);
        assert_eq!(Error::protocol("bad", 7).handle(), 7);
        assert_eq!(Error::from_code(1013, String::new()).code(), ORA_CANCELLED);
    }

    #[test]
    fn innermost_context_wins() {
        let err = Error::from_code(942, "table or view does not exist".into()).at("exe", 11).at("prep_and_exe", 3);
        assert_eq!(err.op(), "exe");
        assert_eq!(err.handle(), 11);
        assert_eq!(err.to_string(), "ora exe: ORA-00942: table or view does not exist");
    }

    #[test]
    fn collect() {
        assert!(Error::collect(Vec::new()).is_none());
        let one = Error::collect(vec![Error::msg("a")]).unwrap();
        assert_eq!(one.kind(), ErrorKind::Interface);
        let many = Error::collect(vec![Error::msg("a"), Error::from_code(3113, "eof".into())]).unwrap();
        assert_eq!(many.kind(), ErrorKind::Multi);
        assert_eq!(many.to_string(), "ora: 2 errors, first: ora: a");
    }
}
