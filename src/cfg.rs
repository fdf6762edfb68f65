//! Configuration cascade: driver → environment → server → session → statement.
//!
//! Every level holds its own copy of [`StmtCfg`]. Opening a child copies the parent's
//! value, so changing a parent afterwards never reaches existing children.

use crate::{Result, Error, ColumnType, log::LogCfg};
use std::time::Duration;

/// Upper bound for LONG, LONG RAW and LOB buffers.
pub const MAX_BUFFER_SIZE : u32 = 2_147_483_642;
/// Rows per fetch ceiling.
pub const MAX_FETCH_LEN : u32 = 32;
/// Rows per fetch when a select list has LONG, LONG RAW, LOB or BFILE columns.
pub const MIN_FETCH_LEN : u32 = 8;
/// Default rows per fetch.
pub const DEFAULT_FETCH_LEN : u32 = MAX_FETCH_LEN;
/// Prefetch memory ceiling (128 MiB).
pub const MAX_PREFETCH_MEMORY_SIZE : u32 = 128 << 20;

const DEFAULT_BUFFER_SIZE : u32 = 16 << 20;
const DEFAULT_STRING_PTR_BUFFER_SIZE : u32 = 4000;

/**
Statement configuration.

Setters consume and return the value, so a configuration is built the way
`StmtCfg::default().with_prefetch_row_count(0)` reads. An invalid input leaves the
corresponding field unchanged and records the first problem, which is reported as a
configuration error when the configuration is installed with `set_cfg`.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct StmtCfg {
    prefetch_row_count: u32,
    prefetch_memory_size: u32,
    long_buffer_size: u32,
    long_raw_buffer_size: u32,
    lob_buffer_size: u32,
    string_ptr_buffer_size: u32,
    byte_slice: ColumnType,
    false_rune: char,
    true_rune: char,
    rtrim_char: bool,
    is_auto_committing: bool,
    fetch_len: u32,
    lob_fetch_len: u32,
    pub(crate) rset: RsetCfg,
    err: Option<String>,
}

impl Default for StmtCfg {
    fn default() -> Self {
        Self {
            prefetch_row_count: 128,
            prefetch_memory_size: MAX_PREFETCH_MEMORY_SIZE,
            long_buffer_size: DEFAULT_BUFFER_SIZE,
            long_raw_buffer_size: DEFAULT_BUFFER_SIZE,
            lob_buffer_size: DEFAULT_BUFFER_SIZE,
            string_ptr_buffer_size: DEFAULT_STRING_PTR_BUFFER_SIZE,
            byte_slice: ColumnType::Bin,
            false_rune: '0',
            true_rune: '1',
            rtrim_char: true,
            is_auto_committing: true,
            fetch_len: DEFAULT_FETCH_LEN,
            lob_fetch_len: MIN_FETCH_LEN,
            rset: RsetCfg::default(),
            err: None,
        }
    }
}

impl StmtCfg {
    fn fail(mut self, msg: String) -> Self {
        if self.err.is_none() {
            self.err = Some(msg);
        }
        self
    }

    /// Returns the first recorded configuration problem.
    pub fn validate(&self) -> Result<()> {
        match &self.err {
            Some(msg) => Err( Error::config(msg.as_str()) ),
            None => self.rset.validate(),
        }
    }

    /// Number of rows OCI prefetches. Zero leaves prefetching to the memory size alone.
    pub fn with_prefetch_row_count(mut self, rows: u32) -> Self {
        self.prefetch_row_count = rows;
        self
    }

    /// Prefetch memory cap in bytes. Capped at [`MAX_PREFETCH_MEMORY_SIZE`].
    pub fn with_prefetch_memory_size(mut self, size: u32) -> Self {
        self.prefetch_memory_size = size.min(MAX_PREFETCH_MEMORY_SIZE);
        self
    }

    pub fn with_long_buffer_size(mut self, size: u32) -> Self {
        if size == 0 || size > MAX_BUFFER_SIZE {
            return self.fail(format!("long buffer size {} is out of range 1..={}", size, MAX_BUFFER_SIZE));
        }
        self.long_buffer_size = size;
        self
    }

    pub fn with_long_raw_buffer_size(mut self, size: u32) -> Self {
        if size == 0 || size > MAX_BUFFER_SIZE {
            return self.fail(format!("long raw buffer size {} is out of range 1..={}", size, MAX_BUFFER_SIZE));
        }
        self.long_raw_buffer_size = size;
        self
    }

    pub fn with_lob_buffer_size(mut self, size: u32) -> Self {
        if size == 0 || size > MAX_BUFFER_SIZE {
            return self.fail(format!("lob buffer size {} is out of range 1..={}", size, MAX_BUFFER_SIZE));
        }
        self.lob_buffer_size = size;
        self
    }

    /// Output buffer size for string output binds.
    pub fn with_string_ptr_buffer_size(mut self, size: u32) -> Self {
        if size == 0 || size > 32767 {
            return self.fail(format!("string pointer buffer size {} is out of range 1..=32767", size));
        }
        self.string_ptr_buffer_size = size;
        self
    }

    /// How byte slices are bound: `Bin` (RAW/BLOB bytes) or `U8` (an array of numbers).
    pub fn with_byte_slice(mut self, gct: ColumnType) -> Self {
        match gct {
            ColumnType::Bin | ColumnType::U8 => {
                self.byte_slice = gct;
                self
            }
            _ => self.fail(format!("byte slice binds accept Bin or U8, not {}", gct)),
        }
    }

    pub fn with_false_rune(mut self, rune: char) -> Self {
        if rune == self.true_rune {
            return self.fail(format!("false rune {:?} equals the true rune", rune));
        }
        self.false_rune = rune;
        self
    }

    pub fn with_true_rune(mut self, rune: char) -> Self {
        if rune == self.false_rune {
            return self.fail(format!("true rune {:?} equals the false rune", rune));
        }
        self.true_rune = rune;
        self
    }

    /// Strip trailing spaces from `CHAR(n)` columns.
    pub fn with_rtrim_char(mut self, rtrim: bool) -> Self {
        self.rtrim_char = rtrim;
        self
    }

    /// Commit DML executed outside of a transaction.
    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.is_auto_committing = auto_commit;
        self
    }

    /// Rows per fetch. Values above [`MAX_FETCH_LEN`] are capped.
    pub fn with_fetch_len(mut self, rows: u32) -> Self {
        if rows == 0 {
            return self.fail("fetch length must be positive".to_string());
        }
        self.fetch_len = rows.min(MAX_FETCH_LEN);
        self
    }

    /// Rows per fetch for select lists with LOB, LONG or BFILE columns.
    pub fn with_lob_fetch_len(mut self, rows: u32) -> Self {
        if rows == 0 {
            return self.fail("lob fetch length must be positive".to_string());
        }
        self.lob_fetch_len = rows.min(MAX_FETCH_LEN);
        self
    }

    pub fn with_rset(mut self, rset: RsetCfg) -> Self {
        self.rset = rset;
        self
    }

    pub fn prefetch_row_count(&self) -> u32       { self.prefetch_row_count }
    pub fn prefetch_memory_size(&self) -> u32     { self.prefetch_memory_size }
    pub fn long_buffer_size(&self) -> u32         { self.long_buffer_size }
    pub fn long_raw_buffer_size(&self) -> u32     { self.long_raw_buffer_size }
    pub fn lob_buffer_size(&self) -> u32          { self.lob_buffer_size }
    pub fn string_ptr_buffer_size(&self) -> u32   { self.string_ptr_buffer_size }
    pub fn byte_slice(&self) -> ColumnType        { self.byte_slice }
    pub fn false_rune(&self) -> char              { self.false_rune }
    pub fn true_rune(&self) -> char               { self.true_rune }
    pub fn rtrim_char(&self) -> bool              { self.rtrim_char }
    pub fn is_auto_committing(&self) -> bool      { self.is_auto_committing }
    pub fn fetch_len(&self) -> u32                { self.fetch_len }
    pub fn lob_fetch_len(&self) -> u32            { self.lob_fetch_len }
    pub fn rset(&self) -> &RsetCfg                { &self.rset }

    // Sessions on a UTF8 database keep string output buffers small.
    pub(crate) fn cap_string_ptr_buffer_size(&mut self, cap: u32) {
        if self.string_ptr_buffer_size > cap {
            self.string_ptr_buffer_size = cap;
        }
    }
}

/// Column families of the select list, each with its own default selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFamily {
    /// NUMBER with precision ≤ 19 and scale 0
    NumberInt,
    /// NUMBER with precision > 19 and scale 0
    NumberBigInt,
    /// NUMBER with precision ≤ 15 and a nonzero scale
    NumberFloat,
    /// NUMBER with precision > 15 and a nonzero scale, and unconstrained NUMBER
    NumberBigFloat,
    BinaryDouble,
    BinaryFloat,
    /// FLOAT(p): a nonzero precision with scale -127
    Float,
    DateTime,
    /// CHAR(1)
    Char1,
    Char,
    Varchar,
    Long,
    Clob,
    Blob,
    Raw,
    LongRaw,
}

impl ColumnFamily {
    /// Checks that `gct` is a legal selector for a column of this family.
    pub fn accepts(self, gct: ColumnType) -> bool {
        use ColumnFamily::*;
        match self {
            NumberInt | NumberBigInt | NumberFloat | NumberBigFloat | BinaryDouble | BinaryFloat | Float => gct.is_numeric(),
            DateTime => gct.is_time(),
            Char1 => gct.is_bool() || gct.is_text(),
            Char | Varchar | Long => gct.is_text(),
            Clob => gct.is_text() || gct == ColumnType::Lob,
            Blob => gct.is_bin() || gct == ColumnType::Lob,
            Raw | LongRaw => gct.is_bin(),
        }
    }
}

/**
Result-set configuration: the selector used for each column family when the
caller did not override the column.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct RsetCfg {
    number_int: ColumnType,
    number_big_int: ColumnType,
    number_float: ColumnType,
    number_big_float: ColumnType,
    binary_double: ColumnType,
    binary_float: ColumnType,
    float: ColumnType,
    date_time: ColumnType,
    char1: ColumnType,
    char: ColumnType,
    varchar: ColumnType,
    long: ColumnType,
    clob: ColumnType,
    blob: ColumnType,
    raw: ColumnType,
    long_raw: ColumnType,
    err: Option<String>,
}

impl Default for RsetCfg {
    fn default() -> Self {
        Self {
            number_int: ColumnType::I64,
            number_big_int: ColumnType::Num,
            number_float: ColumnType::F64,
            number_big_float: ColumnType::Num,
            binary_double: ColumnType::F64,
            binary_float: ColumnType::F32,
            float: ColumnType::F32,
            date_time: ColumnType::Time,
            char1: ColumnType::Bool,
            char: ColumnType::Str,
            varchar: ColumnType::Str,
            long: ColumnType::Str,
            clob: ColumnType::Str,
            blob: ColumnType::Bin,
            raw: ColumnType::Bin,
            long_raw: ColumnType::Bin,
            err: None,
        }
    }
}

impl RsetCfg {
    /// Defaults of the generic SQL adapter: floating columns always read as `F64`.
    pub fn generic_sql() -> Self {
        Self {
            binary_float: ColumnType::F64,
            float: ColumnType::F64,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        match &self.err {
            Some(msg) => Err( Error::config(msg.as_str()) ),
            None => Ok(()),
        }
    }

    /// Sets the selector for a column family.
    pub fn with(mut self, family: ColumnFamily, gct: ColumnType) -> Self {
        if gct == ColumnType::Default || !family.accepts(gct) {
            if self.err.is_none() {
                self.err = Some(format!("{} is not a valid selector for {:?} columns", gct, family));
            }
            return self;
        }
        *self.slot(family) = gct;
        self
    }

    /// Returns the selector configured for a column family.
    pub fn get(&self, family: ColumnFamily) -> ColumnType {
        use ColumnFamily::*;
        match family {
            NumberInt       => self.number_int,
            NumberBigInt    => self.number_big_int,
            NumberFloat     => self.number_float,
            NumberBigFloat  => self.number_big_float,
            BinaryDouble    => self.binary_double,
            BinaryFloat     => self.binary_float,
            Float           => self.float,
            DateTime        => self.date_time,
            Char1           => self.char1,
            Char            => self.char,
            Varchar         => self.varchar,
            Long            => self.long,
            Clob            => self.clob,
            Blob            => self.blob,
            Raw             => self.raw,
            LongRaw         => self.long_raw,
        }
    }

    fn slot(&mut self, family: ColumnFamily) -> &mut ColumnType {
        use ColumnFamily::*;
        match family {
            NumberInt       => &mut self.number_int,
            NumberBigInt    => &mut self.number_big_int,
            NumberFloat     => &mut self.number_float,
            NumberBigFloat  => &mut self.number_big_float,
            BinaryDouble    => &mut self.binary_double,
            BinaryFloat     => &mut self.binary_float,
            Float           => &mut self.float,
            DateTime        => &mut self.date_time,
            Char1           => &mut self.char1,
            Char            => &mut self.char,
            Varchar         => &mut self.varchar,
            Long            => &mut self.long,
            Clob            => &mut self.clob,
            Blob            => &mut self.blob,
            Raw             => &mut self.raw,
            LongRaw         => &mut self.long_raw,
        }
    }
}

/// Environment configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvCfg {
    pub stmt_cfg: StmtCfg,
}

/// Server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SrvCfg {
    /// Oracle connect identifier: EZCONNECT string, TNS alias or full descriptor.
    pub dblink: String,
    /// When `None` the environment's statement configuration is copied.
    pub stmt_cfg: Option<StmtCfg>,
}

impl SrvCfg {
    pub fn new(dblink: &str) -> Self {
        Self { dblink: dblink.to_string(), stmt_cfg: None }
    }
}

/// Session privileges requested at logon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Default,
    SysDba,
    SysOper,
}

impl Default for SessionMode {
    fn default() -> Self {
        SessionMode::Default
    }
}

/// Session configuration.
///
/// Empty `username` and `password` request external (OS) authentication.
#[derive(Clone, Default, PartialEq)]
pub struct SesCfg {
    pub username: String,
    pub password: String,
    pub mode: SessionMode,
    /// When `None` the server's statement configuration is copied.
    pub stmt_cfg: Option<StmtCfg>,
}

impl SesCfg {
    pub fn new(username: &str, password: &str) -> Self {
        Self { username: username.to_string(), password: password.to_string(), ..Self::default() }
    }
}

impl std::fmt::Debug for SesCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SesCfg")
            .field("username", &self.username)
            .field("mode", &self.mode)
            .field("stmt_cfg", &self.stmt_cfg)
            .finish()
    }
}

/// Transaction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxCfg {
    /// Seconds the transaction may stay inactive before the server terminates it.
    pub timeout: Duration,
    /// Additional `OCITransStart` flags.
    pub flags: u32,
}

impl Default for TxCfg {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(60), flags: 0 }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrvCfg {
    pub stmt_cfg: StmtCfg,
    pub log: LogCfg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = StmtCfg::default();
        assert_eq!(cfg.prefetch_row_count(), 128);
        assert_eq!(cfg.prefetch_memory_size(), 128 << 20);
        assert_eq!(cfg.long_buffer_size(), 16 << 20);
        assert_eq!(cfg.string_ptr_buffer_size(), 4000);
        assert_eq!(cfg.byte_slice(), ColumnType::Bin);
        assert_eq!(cfg.true_rune(), '1');
        assert_eq!(cfg.false_rune(), '0');
        assert!(cfg.rtrim_char());
        assert!(cfg.is_auto_committing());
        assert_eq!(cfg.fetch_len(), DEFAULT_FETCH_LEN);
        assert!(cfg.validate().is_ok());

        let rset = RsetCfg::default();
        assert_eq!(rset.get(ColumnFamily::NumberInt), ColumnType::I64);
        assert_eq!(rset.get(ColumnFamily::Char1), ColumnType::Bool);
        assert_eq!(rset.get(ColumnFamily::BinaryFloat), ColumnType::F32);
        assert_eq!(RsetCfg::generic_sql().get(ColumnFamily::BinaryFloat), ColumnType::F64);
    }

    #[test]
    fn first_error_is_kept() {
        let cfg = StmtCfg::default()
            .with_long_buffer_size(0)
            .with_byte_slice(ColumnType::Str)
            .with_fetch_len(4);
        assert_eq!(cfg.long_buffer_size(), 16 << 20);
        assert_eq!(cfg.fetch_len(), 4);
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
        assert!(err.to_string().contains("long buffer size"));
    }

    #[test]
    fn caps() {
        let cfg = StmtCfg::default()
            .with_fetch_len(1000)
            .with_prefetch_memory_size(u32::MAX);
        assert_eq!(cfg.fetch_len(), MAX_FETCH_LEN);
        assert_eq!(cfg.prefetch_memory_size(), MAX_PREFETCH_MEMORY_SIZE);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn runes_must_differ() {
        assert!(StmtCfg::default().with_true_rune('0').validate().is_err());
        let cfg = StmtCfg::default().with_true_rune('Y').with_false_rune('N');
        assert!(cfg.validate().is_ok());
        assert_eq!((cfg.true_rune(), cfg.false_rune()), ('Y', 'N'));
    }

    #[test]
    fn rset_selectors_are_checked_per_family() {
        let rset = RsetCfg::default()
            .with(ColumnFamily::Char1, ColumnType::OraStr)
            .with(ColumnFamily::NumberInt, ColumnType::U32);
        assert!(rset.validate().is_ok());
        assert_eq!(rset.get(ColumnFamily::Char1), ColumnType::OraStr);

        let rset = RsetCfg::default().with(ColumnFamily::DateTime, ColumnType::I64);
        assert_eq!(rset.get(ColumnFamily::DateTime), ColumnType::Time);
        assert!(rset.validate().is_err());
        assert!(StmtCfg::default().with_rset(rset).validate().is_err());
    }

    #[test]
    fn copies_are_isolated() {
        let parent = StmtCfg::default();
        let child = parent.clone().with_prefetch_row_count(7);
        let sibling = parent.clone();
        assert_eq!(parent.prefetch_row_count(), 128);
        assert_eq!(sibling.prefetch_row_count(), 128);
        assert_eq!(child.prefetch_row_count(), 7);
    }
}
