//! Bind factory: converts arguments into OCI binds and reads output binds back.

use super::{Arg, Ctx};
use crate::{
    Result, Error, ColumnType, Value,
    err::ResultExt,
    lob::{self, LobSrc, Lob},
    oci::{self, *},
    pool::buf::Buf,
    types::{self, Bfile, IntervalDS, IntervalYM, Num},
};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use libc::c_void;
use std::{mem, ptr};

/// Longest scalar bound as VARCHAR2 or RAW. Longer input scalars go out as LONG or LONG RAW.
pub(crate) const MAX_CHARS : usize = 4000;

const DESC_SIZE : usize = mem::size_of::<*mut c_void>();

/// How array arguments of one execute are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Scalar,
    /// DML executed once per element
    Batch,
    /// PL/SQL associative array
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dir {
    In,
    InArr,
    Out,
    OutArr,
    Cursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Null,
    Int,
    Uint,
    Double,
    Float,
    Bool,
    Chars,
    Long,
    Raw,
    LongRaw,
    Num,
    Time,
    IntervalYM,
    IntervalDS,
    Lob { clob: bool },
    Bfile,
    Cursor,
}

impl Kind {
    fn dty(self) -> u16 {
        match self {
            Kind::Null | Kind::Bool | Kind::Chars => SQLT_CHR,
            Kind::Int        => SQLT_INT,
            Kind::Uint       => SQLT_UIN,
            Kind::Double     => SQLT_BDOUBLE,
            Kind::Float      => SQLT_BFLOAT,
            Kind::Long       => SQLT_LNG,
            Kind::Raw        => SQLT_BIN,
            Kind::LongRaw    => SQLT_LBI,
            Kind::Num        => SQLT_VNU,
            Kind::Time       => SQLT_TIMESTAMP_TZ,
            Kind::IntervalYM => SQLT_INTERVAL_YM,
            Kind::IntervalDS => SQLT_INTERVAL_DS,
            Kind::Lob { clob: true }  => SQLT_CLOB,
            Kind::Lob { clob: false } => SQLT_BLOB,
            Kind::Bfile      => SQLT_BFILE,
            Kind::Cursor     => SQLT_RSET,
        }
    }

    fn fixed_width(self) -> Option<usize> {
        match self {
            Kind::Int | Kind::Uint | Kind::Double => Some(8),
            Kind::Float => Some(4),
            Kind::Num => Some(22),
            Kind::Time | Kind::IntervalYM | Kind::IntervalDS | Kind::Lob { .. } | Kind::Bfile => Some(DESC_SIZE),
            _ => None,
        }
    }

    fn has_descs(self) -> bool {
        matches!(self, Kind::Time | Kind::IntervalYM | Kind::IntervalDS | Kind::Lob { .. } | Kind::Bfile)
    }
}

/// Returns the bind kind for the selector `gct`, or for the `sample` value when `gct` is `Default`.
pub(crate) fn kind_of(gct: ColumnType, sample: Option<&Value>) -> Result<Kind> {
    let gct = match (gct, sample) {
        (ColumnType::Default, None) | (ColumnType::Default, Some(Value::Null)) => return Ok(Kind::Null),
        (ColumnType::Default, Some(Value::IntervalYM(_))) => return Ok(Kind::IntervalYM),
        (ColumnType::Default, Some(Value::IntervalDS(_))) => return Ok(Kind::IntervalDS),
        (ColumnType::Default, Some(Value::Bfile(_))) => return Ok(Kind::Bfile),
        (ColumnType::Default, Some(Value::Rset(_))) => return Err( Error::bind("a result-set cannot be bound as input") ),
        (ColumnType::Default, Some(val)) => types::gct_of(val),
        (gct, _) => gct,
    };
    let kind = match gct.base() {
        ColumnType::I64 | ColumnType::I32 | ColumnType::I16 | ColumnType::I8 => Kind::Int,
        ColumnType::U64 | ColumnType::U32 | ColumnType::U16 | ColumnType::U8 => Kind::Uint,
        ColumnType::F64  => Kind::Double,
        ColumnType::F32  => Kind::Float,
        ColumnType::Time => Kind::Time,
        ColumnType::Str  => Kind::Chars,
        ColumnType::Bool => Kind::Bool,
        ColumnType::Bin  => Kind::Raw,
        ColumnType::Num  => Kind::Num,
        ColumnType::Lob  => match sample {
            Some(Value::Str(_)) => Kind::Lob { clob: true },
            Some(Value::Bin(_)) => Kind::Lob { clob: false },
            Some(Value::Lob(lob)) => Kind::Lob { clob: lob.is_clob() },
            _ => return Err( Error::bind("a LOB bind needs a string, bytes or a LOB value") ),
        },
        _ => Kind::Null,
    };
    Ok(kind)
}

/// Selector an argument is bound with: the caller's, or the one of its value.
fn effective(gct: ColumnType, sample: Option<&Value>) -> ColumnType {
    match (gct, sample) {
        (ColumnType::Default, Some(val)) => types::gct_of(val),
        (gct, _) => gct,
    }
}

// A converted element, ready to be copied into the bind buffers.
enum Elem<'v> {
    Null,
    Int(i64),
    Uint(u64),
    Double(f64),
    Float(f32),
    Bytes(Vec<u8>),
    Num(String),
    Time(&'v DateTime<FixedOffset>),
    YM(&'v IntervalYM),
    DS(&'v IntervalDS),
    File(&'v Bfile),
    Locator(&'v Lob),
    Temp(LobSrc),
}

impl Elem<'_> {
    fn byte_len(&self) -> usize {
        match self {
            Elem::Bytes(data) => data.len(),
            _ => 0,
        }
    }
}

fn mismatch(val: &Value, gct: ColumnType) -> Error {
    Error::bind(format!("cannot bind {} as {}", val.type_name(), gct))
}

fn integer_of(val: &Value) -> Option<i128> {
    match val {
        Value::Bool(_) => None,
        Value::F64(v) => if v.is_finite() && v.fract() == 0.0 { Some(*v as i128) } else { None },
        Value::F32(v) => if v.is_finite() && v.fract() == 0.0 { Some(*v as i128) } else { None },
        Value::Num(num) => num.0.parse::<i128>().ok().or_else(|| {
            num.0.parse::<f64>().ok().filter(|v| v.is_finite() && v.fract() == 0.0).map(|v| v as i128)
        }),
        _ => val.as_i128(),
    }
}

fn float_of(val: &Value) -> Option<f64> {
    match val {
        Value::Bool(_) => None,
        Value::Num(num) => num.0.parse().ok(),
        _ => val.as_f64(),
    }
}

/// Renders a float the way OCINumberFromText accepts it.
fn float_text(v: f64) -> Result<String> {
    if !v.is_finite() {
        return Err( Error::bind(format!("{} cannot be bound as a NUMBER", v)) );
    }
    let abs = v.abs();
    if v == 0.0 || (1e-10..=1e15).contains(&abs) {
        Ok( format!("{}", v) )
    } else {
        Ok( format!("{:e}", v) )
    }
}

fn num_text(val: &Value, gct: ColumnType) -> Result<String> {
    match val {
        Value::Num(num) => Ok(num.0.clone()),
        Value::Str(txt) => Ok(Num::new(txt)?.0),
        Value::F64(v) => float_text(*v),
        Value::F32(v) => float_text(*v as f64),
        Value::Bool(_) => Err(mismatch(val, gct)),
        _ => val.as_i128().map(|v| v.to_string()).ok_or_else(|| mismatch(val, gct)),
    }
}

fn text_of(val: &Value, gct: ColumnType, true_rune: char, false_rune: char) -> Result<String> {
    match val {
        Value::Str(txt) => Ok(txt.clone()),
        Value::Num(num) => Ok(num.0.clone()),
        Value::Bool(v) => Ok( if *v { true_rune } else { false_rune }.to_string() ),
        Value::F64(v) => Ok(v.to_string()),
        Value::F32(v) => Ok(v.to_string()),
        _ => val.as_i128().map(|v| v.to_string()).ok_or_else(|| mismatch(val, gct)),
    }
}

fn convert<'v>(ctx: &Ctx, val: &'v Value, kind: Kind, gct: ColumnType) -> Result<Elem<'v>> {
    if val.is_null() {
        return Ok(Elem::Null);
    }
    let elem = match kind {
        Kind::Null => Elem::Null,
        Kind::Int | Kind::Uint => {
            let v = integer_of(val).ok_or_else(|| mismatch(val, gct))?;
            let (lo, hi) = types::int_range(gct);
            if v < lo || v > hi {
                return Err( Error::bind(format!("{} overflows {}", v, gct.base())) );
            }
            if kind == Kind::Int { Elem::Int(v as i64) } else { Elem::Uint(v as u64) }
        }
        Kind::Double => Elem::Double( float_of(val).ok_or_else(|| mismatch(val, gct))? ),
        Kind::Float => Elem::Float( float_of(val).ok_or_else(|| mismatch(val, gct))? as f32 ),
        Kind::Bool => match val {
            Value::Bool(v) => {
                let rune = if *v { ctx.cfg.true_rune() } else { ctx.cfg.false_rune() };
                Elem::Bytes(rune.to_string().into_bytes())
            }
            _ => return Err(mismatch(val, gct)),
        },
        Kind::Chars | Kind::Long => {
            Elem::Bytes( text_of(val, gct, ctx.cfg.true_rune(), ctx.cfg.false_rune())?.into_bytes() )
        }
        Kind::Raw | Kind::LongRaw => match val {
            Value::Bin(data) => Elem::Bytes(data.clone()),
            _ => return Err(mismatch(val, gct)),
        },
        Kind::Num => Elem::Num( num_text(val, gct)? ),
        Kind::Time => match val {
            Value::Time(t) => Elem::Time(t),
            _ => return Err(mismatch(val, gct)),
        },
        Kind::IntervalYM => match val {
            Value::IntervalYM(v) => Elem::YM(v),
            _ => return Err(mismatch(val, gct)),
        },
        Kind::IntervalDS => match val {
            Value::IntervalDS(v) => Elem::DS(v),
            _ => return Err(mismatch(val, gct)),
        },
        Kind::Bfile => match val {
            Value::Bfile(v) => Elem::File(v),
            _ => return Err(mismatch(val, gct)),
        },
        Kind::Lob { clob } => match val {
            Value::Str(txt) if clob => Elem::Temp(LobSrc::Text(txt.clone())),
            Value::Bin(data) if !clob => Elem::Temp(LobSrc::Bytes(data.clone())),
            Value::Lob(lob) if lob.is_clob() == clob => Elem::Locator(lob),
            _ => return Err(mismatch(val, gct)),
        },
        Kind::Cursor => return Err(mismatch(val, gct)),
    };
    Ok(elem)
}

/// Descriptor arrays of descriptor-valued binds and defines.
pub(crate) enum Descs {
    None,
    Times(Vec<Descriptor<OCITimestampTZ>>),
    YMs(Vec<Descriptor<OCIIntervalYearToMonth>>),
    DSs(Vec<Descriptor<OCIIntervalDayToSecond>>),
    Clobs(Vec<Descriptor<OCICLobLocator>>),
    Blobs(Vec<Descriptor<OCIBLobLocator>>),
    Files(Vec<Descriptor<OCIBFileLocator>>),
}

fn alloc<T: DescriptorType>(env: &OCIEnv, num: usize) -> Result<Vec<Descriptor<T>>> {
    (0..num).map(|_| Descriptor::<T>::new(env)).collect()
}

impl Descs {
    pub(crate) fn new(kind: Kind, env: &OCIEnv, num: usize) -> Result<Self> {
        let descs = match kind {
            Kind::Time       => Descs::Times(alloc(env, num)?),
            Kind::IntervalYM => Descs::YMs(alloc(env, num)?),
            Kind::IntervalDS => Descs::DSs(alloc(env, num)?),
            Kind::Lob { clob: true }  => Descs::Clobs(alloc(env, num)?),
            Kind::Lob { clob: false } => Descs::Blobs(alloc(env, num)?),
            Kind::Bfile      => Descs::Files(alloc(env, num)?),
            _ => Descs::None,
        };
        Ok(descs)
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut c_void {
        match self {
            Descs::None => ptr::null_mut(),
            Descs::Times(descs) => descs.as_mut_ptr() as _,
            Descs::YMs(descs)   => descs.as_mut_ptr() as _,
            Descs::DSs(descs)   => descs.as_mut_ptr() as _,
            Descs::Clobs(descs) => descs.as_mut_ptr() as _,
            Descs::Blobs(descs) => descs.as_mut_ptr() as _,
            Descs::Files(descs) => descs.as_mut_ptr() as _,
        }
    }

    pub(crate) fn lob(&self, ix: usize) -> Option<(&OCILobLocator, u8)> {
        match self {
            Descs::Clobs(descs) => Some((&*descs[ix], OCI_TEMP_CLOB)),
            Descs::Blobs(descs) => Some((&*descs[ix], OCI_TEMP_BLOB)),
            _ => None,
        }
    }
}

/// Value an output bind returned.
pub(crate) enum Readback {
    Scalar(Value),
    Array(Vec<Value>),
}

/**
One bound placeholder: the element buffers OCI reads from (and writes into for output
binds) and the bind handle. The buffers stay put until the record is closed, which
happens when the statement is executed again or closed.
*/
pub(crate) struct BindRecord {
    pos: u32,
    kind: Kind,
    gct: ColumnType,
    dir: Dir,
    width: usize,
    buf: Buf,
    descs: Descs,
    ind: Vec<i16>,
    alen: Vec<u32>,
    rcode: Vec<u16>,
    // element count of an associative array; OCI rewrites it on return
    curlen: Box<u32>,
    cursor: Option<Box<Handle<OCIStmt>>>,
    // elements that hold temporary LOBs
    temps: Vec<usize>,
    bind: Ptr<OCIBind>,
}

/**
Binds `arg` at the 1-based position `pos`. Nothing is retained when binding fails.
*/
pub(crate) fn bind(ctx: &Ctx, stmt: &OCIStmt, pos: u32, arg: &mut Arg, shape: Shape) -> Result<BindRecord> {
    let table = shape == Shape::Table;
    match arg {
        Arg::In(val, gct) => {
            let kind = kind_of(*gct, Some(val))?;
            let gct = effective(*gct, Some(val));
            let elem = convert(ctx, val, kind, gct)?;
            build(ctx, stmt, pos, Dir::In, kind, gct, vec![elem], 1, false)
        }
        Arg::InArr(vals, gct) => {
            let sample = vals.iter().find(|val| !val.is_null());
            if *gct == ColumnType::Default && sample.is_none() {
                return Err( Error::bind(format!("array at position {} has no element to infer its type from", pos)) );
            }
            let kind = kind_of(*gct, sample)?;
            let gct = effective(*gct, sample);
            let elems = vals.iter().map(|val| convert(ctx, val, kind, gct)).collect::<Result<Vec<_>>>()?;
            let slots = if table { vals.len().max(1) } else { vals.len() };
            build(ctx, stmt, pos, Dir::InArr, kind, gct, elems, slots, table)
        }
        Arg::Out(val, gct) => {
            if *gct == ColumnType::Lob || matches!(val, Value::Lob(_)) {
                return Err( Error::bind("LOB output binds are not supported") );
            }
            if *gct == ColumnType::Default && val.is_null() {
                return Err( Error::bind(format!("output at position {} needs a column type", pos)) );
            }
            let kind = kind_of(*gct, Some(val))?;
            let gct = effective(*gct, Some(val));
            let elem = convert(ctx, val, kind, gct)?;
            build(ctx, stmt, pos, Dir::Out, kind, gct, vec![elem], 1, false)
        }
        Arg::OutArr(vals, gct) => {
            if !table {
                return Err( Error::bind("output arrays can only be bound in PL/SQL blocks") );
            }
            if *gct == ColumnType::Lob {
                return Err( Error::bind("LOB output binds are not supported") );
            }
            let sample = vals.iter().find(|val| !val.is_null());
            if *gct == ColumnType::Default && sample.is_none() {
                return Err( Error::bind(format!("output array at position {} needs a column type", pos)) );
            }
            let kind = kind_of(*gct, sample)?;
            let gct = effective(*gct, sample);
            let elems = vals.iter().map(|val| convert(ctx, val, kind, gct)).collect::<Result<Vec<_>>>()?;
            let slots = vals.capacity().max(vals.len()).max(1);
            build(ctx, stmt, pos, Dir::OutArr, kind, gct, elems, slots, true)
        }
        Arg::Cursor(_) => cursor(ctx, stmt, pos),
        Arg::Lob(src) => {
            let src = mem::replace(src, LobSrc::Bytes(Vec::new()));
            let kind = Kind::Lob { clob: src.is_clob() };
            build(ctx, stmt, pos, Dir::In, kind, ColumnType::Lob, vec![Elem::Temp(src)], 1, false)
        }
    }
}

fn build(
    ctx: &Ctx, stmt: &OCIStmt, pos: u32, dir: Dir, kind: Kind, gct: ColumnType,
    elems: Vec<Elem>, slots: usize, table: bool
) -> Result<BindRecord> {
    let mut kind = kind;
    let longest = elems.iter().map(Elem::byte_len).max().unwrap_or(0);
    if longest > MAX_CHARS && matches!(kind, Kind::Chars | Kind::Raw) {
        match dir {
            Dir::In => kind = if kind == Kind::Chars { Kind::Long } else { Kind::LongRaw },
            Dir::InArr | Dir::OutArr => {
                return Err( Error::bind(format!("array element of {} bytes at position {} exceeds {} bytes", longest, pos, MAX_CHARS)) );
            }
            _ => {}
        }
    }
    let width = match kind.fixed_width() {
        Some(width) => width,
        None if matches!(dir, Dir::In | Dir::InArr) => longest.max(1),
        None => longest.max(ctx.cfg.string_ptr_buffer_size() as usize).max(4),
    };
    let buf_size = if kind.has_descs() { 0 } else { width * slots };
    let mut rec = BindRecord {
        pos, kind, gct, dir, width,
        buf: Buf::new(buf_size),
        descs: Descs::new(kind, ctx.env, slots)?,
        ind: vec![OCI_IND_NULL; slots],
        alen: vec![0; slots],
        rcode: vec![0; slots],
        curlen: Box::new(elems.len() as u32),
        cursor: None,
        temps: Vec::new(),
        bind: Ptr::null(),
    };
    let mut res = Ok(());
    for (ix, elem) in elems.into_iter().enumerate() {
        res = rec.put(ctx, ix, elem);
        if res.is_err() {
            break;
        }
    }
    if res.is_ok() {
        res = rec.attach(ctx, stmt, table);
    }
    match res {
        Ok(()) => Ok(rec),
        Err(err) => {
            let _ = rec.close(ctx.svc, ctx.err);
            Err(err)
        }
    }
}

fn cursor(ctx: &Ctx, stmt: &OCIStmt, pos: u32) -> Result<BindRecord> {
    let mut hndl = Box::new(Handle::<OCIStmt>::new(ctx.env)?);
    let mut rec = BindRecord {
        pos, kind: Kind::Cursor, gct: ColumnType::Default, dir: Dir::Cursor, width: 0,
        buf: Buf::new(0), descs: Descs::None,
        ind: vec![OCI_IND_NOTNULL], alen: vec![0], rcode: vec![0],
        curlen: Box::new(0), cursor: None, temps: Vec::new(), bind: Ptr::null(),
    };
    oci::bind_by_pos(
        stmt, rec.bind.as_mut_ptr(), ctx.err, pos,
        hndl.as_mut_ptr() as *mut c_void, 0, SQLT_RSET,
        rec.ind.as_mut_ptr(), ptr::null_mut(), ptr::null_mut(), 0, ptr::null_mut()
    ).at("bind", ctx.id)?;
    rec.cursor = Some(hndl);
    Ok(rec)
}

impl BindRecord {
    pub(crate) fn dir(&self) -> Dir {
        self.dir
    }

    /// Copies one converted element into slot `ix`.
    fn put(&mut self, ctx: &Ctx, ix: usize, elem: Elem) -> Result<()> {
        let off = ix * self.width;
        match elem {
            Elem::Null => {
                self.ind[ix] = OCI_IND_NULL;
                self.alen[ix] = 0;
                return Ok(());
            }
            Elem::Int(v)    => self.buf[off..off + 8].copy_from_slice(&v.to_ne_bytes()),
            Elem::Uint(v)   => self.buf[off..off + 8].copy_from_slice(&v.to_ne_bytes()),
            Elem::Double(v) => self.buf[off..off + 8].copy_from_slice(&v.to_ne_bytes()),
            Elem::Float(v)  => self.buf[off..off + 4].copy_from_slice(&v.to_ne_bytes()),
            Elem::Bytes(data) => {
                self.buf[off..off + data.len()].copy_from_slice(&data);
                self.alen[ix] = data.len() as u32;
                self.ind[ix] = OCI_IND_NOTNULL;
                return Ok(());
            }
            Elem::Num(txt) => {
                let mut num = OCINumber::default();
                oci::number_from_text(ctx.err, &txt, &mut num).at("bind", ctx.id)?;
                self.buf[off..off + 22].copy_from_slice(&num.bytes);
            }
            Elem::Time(t) => {
                if let Descs::Times(descs) = &self.descs {
                    let tz = types::offset_name(t.offset());
                    oci::date_time_construct(
                        ctx.env, ctx.err, descs[ix].get(),
                        t.year() as i16, t.month() as u8, t.day() as u8,
                        t.hour() as u8, t.minute() as u8, t.second() as u8,
                        t.nanosecond().min(999_999_999), &tz
                    ).at("bind", ctx.id)?;
                }
            }
            Elem::YM(v) => {
                if let Descs::YMs(descs) = &self.descs {
                    oci::interval_set_year_month(ctx.env, ctx.err, v.year, v.month, descs[ix].get()).at("bind", ctx.id)?;
                }
            }
            Elem::DS(v) => {
                if let Descs::DSs(descs) = &self.descs {
                    let parts = (v.day, v.hour, v.minute, v.second, v.nanosecond);
                    oci::interval_set_day_second(ctx.env, ctx.err, parts, descs[ix].get()).at("bind", ctx.id)?;
                }
            }
            Elem::File(v) => {
                if let Descs::Files(descs) = &mut self.descs {
                    oci::lob_file_set_name(ctx.env, ctx.err, descs[ix].as_mut_ptr(), &v.dir_alias, &v.file_name).at("bind", ctx.id)?;
                }
            }
            Elem::Locator(lob) => {
                match &mut self.descs {
                    Descs::Clobs(descs) => lob.assign_to(ctx.svc, ctx.err, descs[ix].as_mut_ptr())?,
                    Descs::Blobs(descs) => lob.assign_to(ctx.svc, ctx.err, descs[ix].as_mut_ptr())?,
                    _ => return Err( Error::msg("LOB bind without locators") ),
                }
            }
            Elem::Temp(src) => {
                let (loc, lob_type) = self.descs.lob(ix).ok_or_else(|| Error::msg("LOB bind without locators"))?;
                oci::lob_create_temporary(ctx.svc, ctx.err, loc, SQLCS_IMPLICIT, lob_type).at("bind", ctx.id)?;
                self.temps.push(ix);
                lob::write_all(ctx.svc, ctx.err, loc, src, ctx.cfg.lob_buffer_size() as usize).at("bind", ctx.id)?;
            }
        }
        self.alen[ix] = self.width as u32;
        self.ind[ix] = OCI_IND_NOTNULL;
        Ok(())
    }

    fn attach(&mut self, ctx: &Ctx, stmt: &OCIStmt, table: bool) -> Result<()> {
        let (valuep, value_sz) = match &mut self.descs {
            Descs::None => (self.buf.as_mut_ptr() as *mut c_void, self.width as i64),
            descs => (descs.as_mut_ptr(), DESC_SIZE as i64),
        };
        let (maxarr_len, curelep) = if table {
            (self.ind.len() as u32, &mut *self.curlen as *mut u32)
        } else {
            (0, ptr::null_mut())
        };
        oci::bind_by_pos(
            stmt, self.bind.as_mut_ptr(), ctx.err, self.pos,
            valuep, value_sz, self.kind.dty(),
            self.ind.as_mut_ptr(), self.alen.as_mut_ptr(), self.rcode.as_mut_ptr(),
            maxarr_len, curelep
        ).at("bind", ctx.id)
    }

    /// Reads the value OCI returned for an output bind.
    pub(crate) fn read_back(&self, ctx: &Ctx) -> Result<Option<Readback>> {
        match self.dir {
            Dir::Out => Ok( Some(Readback::Scalar(self.value_at(ctx, 0)?)) ),
            Dir::OutArr => {
                let len = (*self.curlen as usize).min(self.ind.len());
                let vals = (0..len).map(|ix| self.value_at(ctx, ix)).collect::<Result<Vec<_>>>()?;
                Ok( Some(Readback::Array(vals)) )
            }
            _ => Ok(None),
        }
    }

    /// Hands over the statement handle a REF CURSOR bind received.
    pub(crate) fn take_cursor(&mut self) -> Option<Handle<OCIStmt>> {
        if self.ind.first() == Some(&OCI_IND_NULL) {
            return None;
        }
        self.cursor.take().map(|hndl| *hndl)
    }

    fn value_at(&self, ctx: &Ctx, ix: usize) -> Result<Value> {
        if self.ind[ix] == OCI_IND_NULL {
            return Ok( if self.gct.is_nullable() { Value::Null } else { types::zero_value(self.gct) } );
        }
        let bytes = if self.buf.is_empty() {
            &[][..]
        } else {
            let off = ix * self.width;
            &self.buf[off..off + self.width]
        };
        let val = match self.kind {
            Kind::Int => types::int_value(i64::from_ne_bytes(ne8(bytes)) as i128, self.gct)?,
            Kind::Uint => types::int_value(u64::from_ne_bytes(ne8(bytes)) as i128, self.gct)?,
            Kind::Double => {
                let v = f64::from_ne_bytes(ne8(bytes));
                if self.gct.base() == ColumnType::F32 { Value::F32(v as f32) } else { Value::F64(v) }
            }
            Kind::Float => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&bytes[..4]);
                let v = f32::from_ne_bytes(raw);
                if self.gct.base() == ColumnType::F64 { Value::F64(v as f64) } else { Value::F32(v) }
            }
            Kind::Bool => {
                let len = (self.alen[ix] as usize).min(bytes.len());
                let txt = String::from_utf8_lossy(&bytes[..len]);
                Value::Bool( txt.chars().next() == Some(ctx.cfg.true_rune()) )
            }
            Kind::Chars | Kind::Long => {
                let len = (self.alen[ix] as usize).min(bytes.len());
                Value::Str( String::from_utf8_lossy(&bytes[..len]).into_owned() )
            }
            Kind::Raw | Kind::LongRaw => {
                let len = (self.alen[ix] as usize).min(bytes.len());
                Value::Bin( bytes[..len].to_vec() )
            }
            Kind::Num => {
                let mut num = OCINumber::default();
                num.bytes.copy_from_slice(&bytes[..22]);
                Value::Num( Num(oci::number_to_text(ctx.err, &num).at("read_back", ctx.id)?) )
            }
            Kind::Time => match &self.descs {
                Descs::Times(descs) => {
                    let (year, month, day, hour, min, sec, fsec, tz_hour, tz_min) =
                        oci::date_time_parts(ctx.env, ctx.err, descs[ix].get()).at("read_back", ctx.id)?;
                    let offset = types::offset_of(tz_hour, tz_min)?;
                    Value::Time( types::make_time(year, month, day, hour, min, sec, fsec, offset)? )
                }
                _ => Value::Null,
            },
            Kind::IntervalYM => match &self.descs {
                Descs::YMs(descs) => {
                    let (year, month) = oci::interval_get_year_month(ctx.env, ctx.err, descs[ix].get()).at("read_back", ctx.id)?;
                    Value::IntervalYM( IntervalYM::new(year, month) )
                }
                _ => Value::Null,
            },
            Kind::IntervalDS => match &self.descs {
                Descs::DSs(descs) => {
                    let (day, hour, minute, second, nanosecond) =
                        oci::interval_get_day_second(ctx.env, ctx.err, descs[ix].get()).at("read_back", ctx.id)?;
                    Value::IntervalDS( IntervalDS::new(day, hour, minute, second, nanosecond) )
                }
                _ => Value::Null,
            },
            Kind::Bfile => match &self.descs {
                Descs::Files(descs) => {
                    let (dir, name) = oci::lob_file_get_name(ctx.env, ctx.err, &descs[ix]).at("read_back", ctx.id)?;
                    Value::Bfile( Bfile::new(&dir, &name) )
                }
                _ => Value::Null,
            },
            Kind::Null | Kind::Lob { .. } | Kind::Cursor => Value::Null,
        };
        Ok(val)
    }

    /// Frees the temporary LOBs this bind created.
    pub(crate) fn close(&mut self, svc: &OCISvcCtx, err: &OCIError) -> Result<()> {
        let mut res = Ok(());
        for &ix in &self.temps {
            if let Some((loc, _)) = self.descs.lob(ix) {
                if let Err(e) = oci::lob_free_temporary(svc, err, loc) {
                    res = Err(e);
                }
            }
        }
        self.temps.clear();
        res
    }
}

fn ne8(bytes: &[u8]) -> [u8; 8] {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    raw
}

/**
Rewrites byte-slice arguments as arrays of `U8` when the configuration packs byte
slices into NUMBER arrays.
*/
pub(crate) fn pack_byte_slices(args: &mut [Arg], byte_slice: ColumnType) {
    if byte_slice.base() != ColumnType::U8 {
        return;
    }
    for arg in args.iter_mut() {
        if let Arg::In(Value::Bin(data), gct) = arg {
            if *gct == ColumnType::Default || gct.base() == ColumnType::Bin {
                let vals = mem::take(data).into_iter().map(Value::U8).collect();
                *arg = Arg::InArr(vals, ColumnType::U8);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_value() -> Result<()> {
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::I32(1)))?, Kind::Int);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::U8(1)))?, Kind::Uint);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::F32(1.0)))?, Kind::Float);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::Str("a".into())))?, Kind::Chars);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::Bool(true)))?, Kind::Bool);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::Null))?, Kind::Null);
        assert_eq!(kind_of(ColumnType::Default, None)?, Kind::Null);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::IntervalYM(IntervalYM::new(1, 2))))?, Kind::IntervalYM);
        assert_eq!(kind_of(ColumnType::Default, Some(&Value::Bfile(Bfile::new("D", "f"))))?, Kind::Bfile);
        Ok(())
    }

    #[test]
    fn dispatch_by_selector() -> Result<()> {
        assert_eq!(kind_of(ColumnType::OraI16, Some(&Value::Null))?, Kind::Int);
        assert_eq!(kind_of(ColumnType::Num, Some(&Value::F64(1.5)))?, Kind::Num);
        assert_eq!(kind_of(ColumnType::OraBin, None)?, Kind::Raw);
        assert_eq!(kind_of(ColumnType::Lob, Some(&Value::Str("a".into())))?, Kind::Lob { clob: true });
        assert_eq!(kind_of(ColumnType::Lob, Some(&Value::Bin(vec![1])))?, Kind::Lob { clob: false });
        assert!(kind_of(ColumnType::Lob, Some(&Value::I64(1))).is_err());
        Ok(())
    }

    #[test]
    fn integer_sources() {
        assert_eq!(integer_of(&Value::F64(3.0)), Some(3));
        assert_eq!(integer_of(&Value::F64(3.5)), None);
        assert_eq!(integer_of(&Value::Num(Num("-12".into()))), Some(-12));
        assert_eq!(integer_of(&Value::Num(Num("1.0E3".into()))), Some(1000));
        assert_eq!(integer_of(&Value::Bool(true)), None);
        assert_eq!(float_of(&Value::I8(-3)), Some(-3.0));
        assert_eq!(float_of(&Value::Bool(true)), None);
    }

    #[test]
    fn number_text() -> Result<()> {
        assert_eq!(float_text(0.0)?, "0");
        assert_eq!(float_text(2.5)?, "2.5");
        assert_eq!(float_text(1e20)?, "1e20");
        assert_eq!(float_text(1.5e-11)?, "1.5e-11");
        assert!(float_text(f64::NAN).is_err());
        assert_eq!(num_text(&Value::I16(-7), ColumnType::Num)?, "-7");
        assert!(num_text(&Value::Str("x1".into()), ColumnType::Num).is_err());
        assert!(num_text(&Value::Bool(false), ColumnType::Num).is_err());
        Ok(())
    }

    #[test]
    fn text_conversions() -> Result<()> {
        assert_eq!(text_of(&Value::Bool(true), ColumnType::Str, 'Y', 'N')?, "Y");
        assert_eq!(text_of(&Value::Bool(false), ColumnType::Str, 'Y', 'N')?, "N");
        assert_eq!(text_of(&Value::U32(42), ColumnType::Str, '1', '0')?, "42");
        assert!(text_of(&Value::Bin(vec![1]), ColumnType::Str, '1', '0').is_err());
        Ok(())
    }

    #[test]
    fn byte_slices_pack_into_numbers() {
        let mut args = [Arg::from(vec![1u8, 2, 3]), Arg::from(5i32)];
        pack_byte_slices(&mut args, ColumnType::Bin);
        assert!(!args[0].is_array());

        pack_byte_slices(&mut args, ColumnType::U8);
        match &args[0] {
            Arg::InArr(vals, ColumnType::U8) => assert_eq!(vals, &vec![Value::U8(1), Value::U8(2), Value::U8(3)]),
            _ => panic!("expected an array of u8"),
        }
        assert!(!args[1].is_array());
    }
}
