//! Define factory: describes the select list and allocates the fetch buffers.

use super::{
    Ctx, StmtInner,
    bind::{Descs, Kind},
    rset::{Rset, RsetState},
};
use crate::{
    Result, Error, ColumnType, Value,
    cfg::{ColumnFamily, StmtCfg},
    err::ResultExt,
    lob::{self, Lob},
    oci::{self, *},
    pool::buf::Buf,
    types::{self, Bfile, IntervalDS, IntervalYM, Num},
};
use libc::c_void;
use std::{mem, sync::Arc};

const SQLT_VCS    : u16 = 9;
const SQLT_CUR    : u16 = 102;
const SQLT_UROWID : u16 = 208;

const ROWID_WIDTH : usize = 4000;
// Numbers, dates and intervals read as text
const CONVERTED_TEXT_WIDTH : usize = 128;

const DESC_SIZE : usize = mem::size_of::<*mut c_void>();

/// Select-list column as DESCRIBE reports it.
#[derive(Debug, Clone)]
pub(crate) struct ColumnDesc {
    pub(crate) name: String,
    pub(crate) dty: u16,
    pub(crate) data_size: u16,
    pub(crate) precision: i16,
    pub(crate) scale: i8,
    pub(crate) char_size: u16,
    pub(crate) csfrm: u8,
}

impl ColumnDesc {
    fn read(pos: u32, stmt: &OCIStmt, err: &OCIError) -> Result<Self> {
        let param = oci::param::get(pos, stmt, err)?;
        Ok(Self {
            name:      param.get_attr(OCI_ATTR_NAME, err)?,
            dty:       param.get_attr(OCI_ATTR_DATA_TYPE, err)?,
            data_size: param.get_attr(OCI_ATTR_DATA_SIZE, err)?,
            precision: param.get_attr(OCI_ATTR_PRECISION, err)?,
            scale:     param.get_attr(OCI_ATTR_SCALE, err)?,
            char_size: param.get_attr(OCI_ATTR_CHAR_SIZE, err)?,
            csfrm:     param.get_attr(OCI_ATTR_CHARSET_FORM, err)?,
        })
    }

    /// CHAR(1), including CHAR(1 CHAR) on multi-byte databases.
    pub(crate) fn is_char1(&self) -> bool {
        self.dty == SQLT_AFC && (self.data_size == 1 || (self.data_size == 4 && self.char_size == 1))
    }

    /// Family that selects the default return type, `None` for types with a fixed mapping.
    pub(crate) fn family(&self) -> Option<ColumnFamily> {
        let family = match self.dty {
            SQLT_NUM => numeric_family(self.precision, self.scale),
            SQLT_BDOUBLE | SQLT_IBDOUBLE => ColumnFamily::BinaryDouble,
            SQLT_BFLOAT | SQLT_IBFLOAT => ColumnFamily::BinaryFloat,
            SQLT_DAT | SQLT_DATE | SQLT_TIMESTAMP | SQLT_TIMESTAMP_TZ | SQLT_TIMESTAMP_LTZ => ColumnFamily::DateTime,
            SQLT_AFC if self.is_char1() => ColumnFamily::Char1,
            SQLT_AFC => ColumnFamily::Char,
            SQLT_CHR | SQLT_VCS | SQLT_RID | SQLT_RDD | SQLT_UROWID => ColumnFamily::Varchar,
            SQLT_LNG => ColumnFamily::Long,
            SQLT_CLOB => ColumnFamily::Clob,
            SQLT_BLOB => ColumnFamily::Blob,
            SQLT_BIN => ColumnFamily::Raw,
            SQLT_LBI => ColumnFamily::LongRaw,
            _ => return None,
        };
        Some(family)
    }

    /// Oracle type name for column metadata.
    pub(crate) fn type_name(&self) -> &'static str {
        match self.dty {
            SQLT_NUM if self.scale == -127 && self.precision != 0 => "FLOAT",
            SQLT_NUM => "NUMBER",
            SQLT_BDOUBLE | SQLT_IBDOUBLE => "BINARY_DOUBLE",
            SQLT_BFLOAT | SQLT_IBFLOAT => "BINARY_FLOAT",
            SQLT_DAT | SQLT_DATE => "DATE",
            SQLT_TIMESTAMP => "TIMESTAMP",
            SQLT_TIMESTAMP_TZ => "TIMESTAMP WITH TIME ZONE",
            SQLT_TIMESTAMP_LTZ => "TIMESTAMP WITH LOCAL TIME ZONE",
            SQLT_AFC if self.csfrm == 2 => "NCHAR",
            SQLT_AFC => "CHAR",
            SQLT_CHR | SQLT_VCS if self.csfrm == 2 => "NVARCHAR2",
            SQLT_CHR | SQLT_VCS => "VARCHAR2",
            SQLT_RID | SQLT_RDD => "ROWID",
            SQLT_UROWID => "UROWID",
            SQLT_LNG => "LONG",
            SQLT_CLOB if self.csfrm == 2 => "NCLOB",
            SQLT_CLOB => "CLOB",
            SQLT_BLOB => "BLOB",
            SQLT_BIN => "RAW",
            SQLT_LBI => "LONG RAW",
            SQLT_BFILE | SQLT_CFILE => "BFILE",
            SQLT_INTERVAL_YM => "INTERVAL YEAR TO MONTH",
            SQLT_INTERVAL_DS => "INTERVAL DAY TO SECOND",
            SQLT_RSET | SQLT_CUR => "REF CURSOR",
            _ => "UNKNOWN",
        }
    }
}

/**
Family of a NUMBER column by its precision and scale:

- scale -127 (FLOAT and unconstrained NUMBER): a nonzero precision is a float,
  precision 0 keeps every digit;
- scale 0: up to 19 digits fit a 64-bit integer;
- any other scale: up to 15 digits fit a 64-bit float.
*/
pub(crate) fn numeric_family(precision: i16, scale: i8) -> ColumnFamily {
    if scale == -127 {
        if precision != 0 { ColumnFamily::Float } else { ColumnFamily::NumberBigFloat }
    } else if precision == 0 {
        ColumnFamily::NumberBigFloat
    } else if scale == 0 {
        if precision <= 19 { ColumnFamily::NumberInt } else { ColumnFamily::NumberBigInt }
    } else if precision <= 15 {
        ColumnFamily::NumberFloat
    } else {
        ColumnFamily::NumberBigFloat
    }
}

/// Describes the select list of an executed statement.
pub(crate) fn describe(stmt: &OCIStmt, err: &OCIError) -> Result<Vec<ColumnDesc>> {
    let count : u32 = oci::attr::get(OCI_ATTR_PARAM_COUNT, OCI_HTYPE_STMT, stmt as *const OCIStmt as *const c_void, err)?;
    (1..=count).map(|pos| ColumnDesc::read(pos, stmt, err)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefKind {
    Int,
    Uint,
    Double,
    Float,
    Number,
    Time,
    Text { afc: bool },
    Bool,
    Long,
    LongRaw,
    Raw,
    /// LOB read whole into a string or bytes
    Lob { clob: bool },
    /// LOB handed out as a reader
    LobStream { clob: bool },
    Bfile,
    IntervalYM,
    IntervalDS,
    Cursor,
}

impl DefKind {
    fn dty(self) -> u16 {
        match self {
            DefKind::Int        => SQLT_INT,
            DefKind::Uint       => SQLT_UIN,
            DefKind::Double     => SQLT_BDOUBLE,
            DefKind::Float      => SQLT_BFLOAT,
            DefKind::Number     => SQLT_VNU,
            DefKind::Time       => SQLT_TIMESTAMP_TZ,
            DefKind::Text { afc: true } => SQLT_AFC,
            DefKind::Text { afc: false } | DefKind::Bool => SQLT_CHR,
            DefKind::Long       => SQLT_LNG,
            DefKind::LongRaw    => SQLT_LBI,
            DefKind::Raw        => SQLT_BIN,
            DefKind::Lob { clob: true } | DefKind::LobStream { clob: true } => SQLT_CLOB,
            DefKind::Lob { clob: false } | DefKind::LobStream { clob: false } => SQLT_BLOB,
            DefKind::Bfile      => SQLT_BFILE,
            DefKind::IntervalYM => SQLT_INTERVAL_YM,
            DefKind::IntervalDS => SQLT_INTERVAL_DS,
            DefKind::Cursor     => SQLT_RSET,
        }
    }

    // Kind of the descriptors this define fetches into
    fn desc_kind(self) -> Option<Kind> {
        match self {
            DefKind::Time => Some(Kind::Time),
            DefKind::IntervalYM => Some(Kind::IntervalYM),
            DefKind::IntervalDS => Some(Kind::IntervalDS),
            DefKind::Lob { clob } | DefKind::LobStream { clob } => Some(Kind::Lob { clob }),
            DefKind::Bfile => Some(Kind::Bfile),
            _ => None,
        }
    }

    /// Columns that make the fetch batch drop to the LOB fetch length.
    pub(crate) fn is_large(self) -> bool {
        matches!(self, DefKind::Long | DefKind::LongRaw | DefKind::Lob { .. } | DefKind::LobStream { .. } | DefKind::Bfile)
    }
}

/**
Picks the return type and the fetch representation of a column. `over` is the caller's
selector for the column; `Default` falls back to the configured family default.
*/
pub(crate) fn plan(col: &ColumnDesc, over: ColumnType, cfg: &StmtCfg) -> Result<(ColumnType, DefKind)> {
    let family = col.family();
    let gct = match (family, over) {
        (Some(family), ColumnType::Default) => cfg.rset().get(family),
        (Some(family), gct) if family.accepts(gct) => gct,
        (None, ColumnType::Default) => ColumnType::Default,
        (_, gct) => {
            return Err( Error::config(format!("column {} of type {} cannot be read as {}", col.name, col.type_name(), gct)) );
        }
    };
    let kind = match family {
        None => match col.dty {
            SQLT_INTERVAL_YM => DefKind::IntervalYM,
            SQLT_INTERVAL_DS => DefKind::IntervalDS,
            SQLT_BFILE | SQLT_CFILE => DefKind::Bfile,
            SQLT_RSET | SQLT_CUR => DefKind::Cursor,
            dty => return Err( Error::config(format!("column {} has unsupported type {}", col.name, dty)) ),
        },
        Some(_) => match gct.base() {
            ColumnType::I64 | ColumnType::I32 | ColumnType::I16 | ColumnType::I8 => DefKind::Int,
            ColumnType::U64 | ColumnType::U32 | ColumnType::U16 | ColumnType::U8 => DefKind::Uint,
            ColumnType::F64  => DefKind::Double,
            ColumnType::F32  => DefKind::Float,
            ColumnType::Num  => DefKind::Number,
            ColumnType::Time => DefKind::Time,
            ColumnType::Bool => DefKind::Bool,
            ColumnType::Bin  => match col.dty {
                SQLT_LBI => DefKind::LongRaw,
                SQLT_BLOB => DefKind::Lob { clob: false },
                _ => DefKind::Raw,
            },
            ColumnType::Lob => DefKind::LobStream { clob: col.dty == SQLT_CLOB },
            _ => match col.dty {
                SQLT_LNG => DefKind::Long,
                SQLT_CLOB => DefKind::Lob { clob: true },
                SQLT_AFC => DefKind::Text { afc: true },
                _ => DefKind::Text { afc: false },
            },
        },
    };
    Ok((gct, kind))
}

/// Bytes one fetched text value may take.
pub(crate) fn text_width(col: &ColumnDesc, is_utf8: bool) -> usize {
    match col.dty {
        SQLT_RID | SQLT_RDD | SQLT_UROWID => ROWID_WIDTH,
        SQLT_CHR | SQLT_AFC | SQLT_VCS => {
            let width = (col.data_size as usize).max(col.char_size as usize * 4);
            // conversion from a single-byte database charset can grow the text
            let width = if is_utf8 { width } else { width * 2 };
            width.max(2)
        }
        _ => CONVERTED_TEXT_WIDTH,
    }
}

fn width(kind: DefKind, col: &ColumnDesc, cfg: &StmtCfg, is_utf8: bool) -> usize {
    match kind {
        DefKind::Int | DefKind::Uint | DefKind::Double => 8,
        DefKind::Float => 4,
        DefKind::Number => 22,
        DefKind::Text { .. } | DefKind::Bool => text_width(col, is_utf8),
        DefKind::Long => cfg.long_buffer_size() as usize,
        DefKind::LongRaw => cfg.long_raw_buffer_size() as usize,
        DefKind::Raw => (col.data_size as usize).max(1),
        DefKind::Cursor => 0,
        _ => DESC_SIZE,
    }
}

/**
Fetch buffers of one select-list column: `fetch_len` elements, with the indicator,
length and return code arrays OCI fills in the same fetch.
*/
pub(crate) struct DefineRecord {
    kind: DefKind,
    gct: ColumnType,
    width: usize,
    buf: Buf,
    descs: Descs,
    cursor: Option<Box<Handle<OCIStmt>>>,
    ind: Vec<i16>,
    rlen: Vec<u32>,
    rcode: Vec<u16>,
    def: Ptr<OCIDefine>,
}

/// Defines the column at the 1-based position `pos`.
pub(crate) fn define(ctx: &Ctx, stmt: &OCIStmt, pos: u32, col: &ColumnDesc, gct: ColumnType, kind: DefKind, fetch_len: usize) -> Result<DefineRecord> {
    let width = width(kind, col, ctx.cfg, ctx.is_utf8);
    let descs = match kind.desc_kind() {
        Some(desc_kind) => Descs::new(desc_kind, ctx.env, fetch_len)?,
        None => Descs::None,
    };
    let buf_size = if kind.desc_kind().is_some() { 0 } else { width * fetch_len };
    let cursor = if kind == DefKind::Cursor { Some(Box::new(Handle::<OCIStmt>::new(ctx.env)?)) } else { None };
    let mut rec = DefineRecord {
        kind, gct, width,
        buf: Buf::new(buf_size),
        descs, cursor,
        ind: vec![OCI_IND_NULL; fetch_len],
        rlen: vec![0; fetch_len],
        rcode: vec![0; fetch_len],
        def: Ptr::null(),
    };
    let (valuep, value_sz) = match (&mut rec.cursor, &mut rec.descs) {
        (Some(hndl), _) => (hndl.as_mut_ptr() as *mut c_void, 0),
        (None, Descs::None) => (rec.buf.as_mut_ptr() as *mut c_void, width as i64),
        (None, descs) => (descs.as_mut_ptr(), DESC_SIZE as i64),
    };
    oci::define_by_pos(
        stmt, rec.def.as_mut_ptr(), ctx.err, pos,
        valuep, value_sz, kind.dty(),
        rec.ind.as_mut_ptr(), rec.rlen.as_mut_ptr(), rec.rcode.as_mut_ptr()
    ).at("define", ctx.id)?;
    Ok(rec)
}

impl DefineRecord {
    pub(crate) fn kind(&self) -> DefKind {
        self.kind
    }

    fn bytes(&self, row: usize) -> &[u8] {
        let off = row * self.width;
        let len = (self.rlen[row] as usize).min(self.width);
        &self.buf[off..off + len]
    }

    /**
    Materializes the value of row `row` of the current batch. Streaming LOBs are
    registered in `open_lobs`; nested cursors are opened into `nested`.
    */
    pub(crate) fn value(
        &mut self, ctx: &Ctx, row: usize, stmt: &Arc<StmtInner>,
        nested: &mut Vec<RsetState>, open_lobs: &mut Vec<u64>
    ) -> Result<Value> {
        if self.ind[row] == OCI_IND_NULL {
            return Ok(self.null_value());
        }
        let val = match self.kind {
            DefKind::Int => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&self.buf[row * 8..row * 8 + 8]);
                types::int_value(i64::from_ne_bytes(raw) as i128, self.gct)?
            }
            DefKind::Uint => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&self.buf[row * 8..row * 8 + 8]);
                types::int_value(u64::from_ne_bytes(raw) as i128, self.gct)?
            }
            DefKind::Double => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&self.buf[row * 8..row * 8 + 8]);
                Value::F64(f64::from_ne_bytes(raw))
            }
            DefKind::Float => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&self.buf[row * 4..row * 4 + 4]);
                Value::F32(f32::from_ne_bytes(raw))
            }
            DefKind::Number => {
                let mut num = OCINumber::default();
                num.bytes.copy_from_slice(&self.buf[row * 22..row * 22 + 22]);
                Value::Num( Num(oci::number_to_text(ctx.err, &num).at("next", ctx.id)?) )
            }
            DefKind::Time => match &self.descs {
                Descs::Times(descs) => {
                    let (year, month, day, hour, min, sec, fsec, tz_hour, tz_min) =
                        oci::date_time_parts(ctx.env, ctx.err, descs[row].get()).at("next", ctx.id)?;
                    let offset = types::offset_of(tz_hour, tz_min)?;
                    Value::Time( types::make_time(year, month, day, hour, min, sec, fsec, offset)? )
                }
                _ => Value::Null,
            },
            DefKind::Text { afc } => {
                let txt = String::from_utf8_lossy(self.bytes(row));
                if afc && ctx.cfg.rtrim_char() {
                    Value::Str( txt.trim_end_matches(' ').to_string() )
                } else {
                    Value::Str( txt.into_owned() )
                }
            }
            DefKind::Bool => {
                let txt = String::from_utf8_lossy(self.bytes(row));
                Value::Bool( txt.chars().next() == Some(ctx.cfg.true_rune()) )
            }
            DefKind::Long => Value::Str( String::from_utf8_lossy(self.bytes(row)).into_owned() ),
            DefKind::LongRaw | DefKind::Raw => Value::Bin( self.bytes(row).to_vec() ),
            DefKind::Lob { clob } => {
                let (loc, _) = self.descs.lob(row).ok_or_else(|| Error::msg("LOB define without locators"))?;
                let data = lob::read_all(ctx.env, ctx.svc, ctx.err, loc, clob, ctx.cfg.lob_buffer_size() as usize).at("next", ctx.id)?;
                if clob {
                    Value::Str( String::from_utf8(data).map_err(|err| Error::msg(format!("CLOB is not valid UTF-8: {}", err)))? )
                } else {
                    Value::Bin(data)
                }
            }
            DefKind::LobStream { clob } => {
                let (loc, _) = self.descs.lob(row).ok_or_else(|| Error::msg("LOB define without locators"))?;
                let lob = Lob::new(stmt, loc, clob)?;
                open_lobs.push(lob.id());
                Value::Lob(lob)
            }
            DefKind::Bfile => match &self.descs {
                Descs::Files(descs) => {
                    let (dir, name) = oci::lob_file_get_name(ctx.env, ctx.err, &descs[row]).at("next", ctx.id)?;
                    Value::Bfile( Bfile::new(&dir, &name) )
                }
                _ => Value::Null,
            },
            DefKind::IntervalYM => match &self.descs {
                Descs::YMs(descs) => {
                    let (year, month) = oci::interval_get_year_month(ctx.env, ctx.err, descs[row].get()).at("next", ctx.id)?;
                    Value::IntervalYM( IntervalYM::new(year, month) )
                }
                _ => Value::Null,
            },
            DefKind::IntervalDS => match &self.descs {
                Descs::DSs(descs) => {
                    let (day, hour, minute, second, nanosecond) =
                        oci::interval_get_day_second(ctx.env, ctx.err, descs[row].get()).at("next", ctx.id)?;
                    Value::IntervalDS( IntervalDS::new(day, hour, minute, second, nanosecond) )
                }
                _ => Value::Null,
            },
            DefKind::Cursor => {
                let slot = self.cursor.as_mut().ok_or_else(|| Error::msg("cursor define without a handle"))?;
                // the define keeps pointing into the box, which receives a fresh handle
                let mut fetched = Handle::<OCIStmt>::new(ctx.env)?;
                mem::swap(&mut **slot, &mut fetched);
                let state = RsetState::open(ctx, fetched.get_ptr(), Some(fetched), &[])?;
                let rset = Rset::new(&state, stmt.clone());
                nested.push(state);
                Value::Rset(rset)
            }
        };
        Ok(val)
    }

    fn null_value(&self) -> Value {
        match self.kind {
            DefKind::IntervalYM => Value::IntervalYM( IntervalYM { year: 0, month: 0, is_null: true } ),
            DefKind::IntervalDS => Value::IntervalDS( IntervalDS { day: 0, hour: 0, minute: 0, second: 0, nanosecond: 0, is_null: true } ),
            DefKind::Bfile => Value::Bfile( Bfile { dir_alias: String::new(), file_name: String::new(), is_null: true } ),
            _ if self.gct.is_nullable() => Value::Null,
            _ => types::zero_value(self.gct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(dty: u16, data_size: u16, precision: i16, scale: i8, char_size: u16) -> ColumnDesc {
        ColumnDesc { name: "C1".into(), dty, data_size, precision, scale, char_size, csfrm: 1 }
    }

    #[test]
    fn numeric_column_type() {
        assert_eq!(numeric_family(0, -127), ColumnFamily::NumberBigFloat);
        assert_eq!(numeric_family(126, -127), ColumnFamily::Float);
        assert_eq!(numeric_family(19, 0), ColumnFamily::NumberInt);
        assert_eq!(numeric_family(1, 0), ColumnFamily::NumberInt);
        assert_eq!(numeric_family(20, 0), ColumnFamily::NumberBigInt);
        assert_eq!(numeric_family(15, 2), ColumnFamily::NumberFloat);
        assert_eq!(numeric_family(16, 2), ColumnFamily::NumberBigFloat);
        assert_eq!(numeric_family(0, 0), ColumnFamily::NumberBigFloat);
    }

    #[test]
    fn char1_columns() {
        assert!(col(SQLT_AFC, 1, 0, 0, 1).is_char1());
        assert!(col(SQLT_AFC, 4, 0, 0, 1).is_char1());
        assert!(!col(SQLT_AFC, 4, 0, 0, 4).is_char1());
        assert!(!col(SQLT_CHR, 1, 0, 0, 1).is_char1());
        assert_eq!(col(SQLT_AFC, 1, 0, 0, 1).family(), Some(ColumnFamily::Char1));
        assert_eq!(col(SQLT_AFC, 10, 0, 0, 10).family(), Some(ColumnFamily::Char));
    }

    #[test]
    fn default_mapping() -> Result<()> {
        let cfg = StmtCfg::default();
        assert_eq!(plan(&col(SQLT_NUM, 22, 19, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::I64, DefKind::Int));
        assert_eq!(plan(&col(SQLT_NUM, 22, 0, -127, 0), ColumnType::Default, &cfg)?, (ColumnType::Num, DefKind::Number));
        assert_eq!(plan(&col(SQLT_NUM, 22, 10, 2, 0), ColumnType::Default, &cfg)?, (ColumnType::F64, DefKind::Double));
        assert_eq!(plan(&col(SQLT_NUM, 22, 126, -127, 0), ColumnType::Default, &cfg)?, (ColumnType::F32, DefKind::Float));
        assert_eq!(plan(&col(SQLT_IBFLOAT, 4, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::F32, DefKind::Float));
        assert_eq!(plan(&col(SQLT_AFC, 1, 0, 0, 1), ColumnType::Default, &cfg)?, (ColumnType::Bool, DefKind::Bool));
        assert_eq!(plan(&col(SQLT_AFC, 8, 0, 0, 8), ColumnType::Default, &cfg)?, (ColumnType::Str, DefKind::Text { afc: true }));
        assert_eq!(plan(&col(SQLT_CHR, 48, 0, 0, 48), ColumnType::Default, &cfg)?, (ColumnType::Str, DefKind::Text { afc: false }));
        assert_eq!(plan(&col(SQLT_CLOB, 86, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::Str, DefKind::Lob { clob: true }));
        assert_eq!(plan(&col(SQLT_BLOB, 86, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::Bin, DefKind::Lob { clob: false }));
        assert_eq!(plan(&col(SQLT_LNG, 0, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::Str, DefKind::Long));
        assert_eq!(plan(&col(SQLT_RDD, 10, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::Str, DefKind::Text { afc: false }));
        assert_eq!(plan(&col(SQLT_INTERVAL_DS, 11, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::Default, DefKind::IntervalDS));
        assert_eq!(plan(&col(SQLT_RSET, 0, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::Default, DefKind::Cursor));
        Ok(())
    }

    #[test]
    fn overrides() -> Result<()> {
        let cfg = StmtCfg::default();
        assert_eq!(plan(&col(SQLT_NUM, 22, 19, 0, 0), ColumnType::OraU16, &cfg)?, (ColumnType::OraU16, DefKind::Uint));
        assert_eq!(plan(&col(SQLT_AFC, 1, 0, 0, 1), ColumnType::OraStr, &cfg)?, (ColumnType::OraStr, DefKind::Text { afc: true }));
        assert_eq!(plan(&col(SQLT_CLOB, 86, 0, 0, 0), ColumnType::Lob, &cfg)?, (ColumnType::Lob, DefKind::LobStream { clob: true }));
        let err = plan(&col(SQLT_NUM, 22, 19, 0, 0), ColumnType::Time, &cfg).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
        assert!(plan(&col(SQLT_INTERVAL_YM, 5, 0, 0, 0), ColumnType::Str, &cfg).is_err());
        Ok(())
    }

    #[test]
    fn generic_sql_floats() -> Result<()> {
        let cfg = StmtCfg::default().with_rset(crate::RsetCfg::generic_sql());
        assert_eq!(plan(&col(SQLT_IBFLOAT, 4, 0, 0, 0), ColumnType::Default, &cfg)?, (ColumnType::F64, DefKind::Double));
        assert_eq!(plan(&col(SQLT_NUM, 22, 126, -127, 0), ColumnType::Default, &cfg)?, (ColumnType::F64, DefKind::Double));
        Ok(())
    }

    #[test]
    fn text_widths() {
        assert_eq!(text_width(&col(SQLT_CHR, 48, 0, 0, 48), true), 192);
        assert_eq!(text_width(&col(SQLT_CHR, 48, 0, 0, 48), false), 384);
        assert_eq!(text_width(&col(SQLT_AFC, 1, 0, 0, 0), true), 2);
        assert_eq!(text_width(&col(SQLT_RDD, 10, 0, 0, 0), true), ROWID_WIDTH);
        assert_eq!(text_width(&col(SQLT_NUM, 22, 0, -127, 0), true), CONVERTED_TEXT_WIDTH);
        assert!(DefKind::LobStream { clob: false }.is_large());
        assert!(!DefKind::Cursor.is_large());
    }
}
