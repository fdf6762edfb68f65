//! Streaming LOB reader and LOB bind sources.

use crate::{
    Result, Error,
    drv,
    err::ResultExt,
    oci::{self, *},
    pool::buf::Buf,
    stmt::StmtInner,
};
use parking_lot::Mutex;
use std::{io, ops::Deref, sync::Arc};

/**
Source of an input LOB argument. The content is uploaded into a temporary LOB before
the statement executes. Readers are consumed in `lob_buffer_size` chunks.

# Example

```no_run
use ora::{Arg, LobSrc};

# fn test(ses: &ora::Ses) -> ora::Result<()> {
let file = std::fs::File::open("/tmp/blob.bin").map_err(|err| ora::Error::Interface(err.to_string()))?;
ses.prep_and_exe("INSERT INTO test_lobs (data) VALUES (:1)", &mut [Arg::lob(LobSrc::reader(file, false))])?;
ses.prep_and_exe("INSERT INTO test_lobs (text) VALUES (:1)", &mut [Arg::lob(LobSrc::Text("abc".into()))])?;
# Ok(()) }
```
*/
pub enum LobSrc {
    /// BLOB content
    Bytes(Vec<u8>),
    /// CLOB content
    Text(String),
    /// Streamed content. `clob` selects a CLOB, which must be valid UTF-8.
    Reader { src: Box<dyn io::Read + Send>, clob: bool },
}

impl LobSrc {
    pub fn reader(src: impl io::Read + Send + 'static, clob: bool) -> Self {
        LobSrc::Reader { src: Box::new(src), clob }
    }

    pub(crate) fn is_clob(&self) -> bool {
        match self {
            LobSrc::Bytes(_) => false,
            LobSrc::Text(_) => true,
            LobSrc::Reader { clob, .. } => *clob,
        }
    }
}

impl std::fmt::Debug for LobSrc {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LobSrc::Bytes(data) => write!(f, "Bytes({})", data.len()),
            LobSrc::Text(text) => write!(f, "Text({})", text.len()),
            LobSrc::Reader { clob, .. } => write!(f, "Reader {{ clob: {} }}", clob),
        }
    }
}

/// Appends the content of `src` to the (temporary) LOB `loc`.
pub(crate) fn write_all(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, src: LobSrc, chunk_size: usize) -> Result<()> {
    let chunk_size = chunk_size.max(4);
    match src {
        LobSrc::Bytes(data) => write_chunks(svc, err, loc, &data, chunk_size, false),
        LobSrc::Text(text) => write_chunks(svc, err, loc, text.as_bytes(), chunk_size, true),
        LobSrc::Reader { mut src, clob } => {
            let mut buf = Buf::new(chunk_size);
            let mut carry = 0;
            loop {
                let read = fill(&mut src, &mut buf[carry..])?;
                let end = carry + read;
                if end == 0 {
                    return Ok(());
                }
                let len = if clob { utf8_prefix(&buf[..end], read == 0)? } else { end };
                if len > 0 {
                    oci::lob_write_append(svc, err, loc, SQLCS_IMPLICIT, &buf[..len])?;
                }
                buf.copy_within(len..end, 0);
                carry = end - len;
                if read == 0 {
                    return Ok(());
                }
            }
        }
    }
}

fn write_chunks(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, data: &[u8], chunk_size: usize, text: bool) -> Result<()> {
    let mut rest = data;
    while !rest.is_empty() {
        let mut len = rest.len().min(chunk_size);
        // keep multi-byte characters in one piece
        while text && len < rest.len() && (rest[len] & 0xC0) == 0x80 {
            len -= 1;
        }
        oci::lob_write_append(svc, err, loc, SQLCS_IMPLICIT, &rest[..len])?;
        rest = &rest[len..];
    }
    Ok(())
}

/// Reads until `buf` is full or the source is exhausted.
fn fill(src: &mut dyn io::Read, buf: &mut [u8]) -> Result<usize> {
    let mut len = 0;
    while len < buf.len() {
        match src.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err( Error::msg(format!("cannot read LOB source: {}", err)) ),
        }
    }
    Ok(len)
}

/// Returns the length of the longest prefix of `data` that ends on a character boundary.
fn utf8_prefix(data: &[u8], at_end: bool) -> Result<usize> {
    match std::str::from_utf8(data) {
        Ok(_) => Ok(data.len()),
        Err(err) if err.error_len().is_none() && !at_end => Ok(err.valid_up_to()),
        Err(_) => Err( Error::bind("CLOB source is not valid UTF-8") ),
    }
}

/// Reads the whole content of a fetched LOB locator in chunks of at most `chunk_size` bytes.
pub(crate) fn read_all(env: &OCIEnv, svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, is_clob: bool, chunk_size: usize) -> Result<Vec<u8>> {
    let len = oci::lob_get_length(svc, err, loc)?;
    if len == 0 {
        return Ok(Vec::new());
    }
    let csfrm = if is_clob { oci::lob_char_set_form(env, err, loc)? } else { 0 };
    // a character takes at most 4 bytes
    let max_bytes = if is_clob { len.saturating_mul(4) } else { len };
    let mut buf = Buf::new(chunk_size.max(4).min(max_bytes as usize));
    let mut data = Vec::with_capacity(len.min(max_bytes) as usize);
    let mut offset = 1;
    while offset <= len {
        let (bytes, chars, done) = oci::lob_read(svc, err, loc, offset, csfrm, &mut buf)?;
        data.extend_from_slice(&buf[..bytes]);
        if done || bytes == 0 {
            break;
        }
        offset += if !is_clob {
            bytes as u64
        } else if chars > 0 {
            chars
        } else {
            count_chars(&buf[..bytes])
        };
    }
    Ok(data)
}

enum Locator {
    Clob(Descriptor<OCICLobLocator>),
    Blob(Descriptor<OCIBLobLocator>),
}

impl Deref for Locator {
    type Target = OCILobLocator;

    fn deref(&self) -> &OCILobLocator {
        match self {
            Locator::Clob(loc) => loc,
            Locator::Blob(loc) => loc,
        }
    }
}

struct LobState {
    loc: Locator,
    csfrm: u8,
    // 1-based; counts characters in CLOBs
    offset: u64,
    len: u64,
    open: bool,
    err: Handle<OCIError>,
}

/**
A LOB column value streamed from the server.

While a `Lob` is open its statement rejects every other call, fetching included, with
a protocol error. Closing the `Lob` (or dropping it) makes the statement usable again.

# Example

```no_run
use ora::ColumnType;
use std::io::Read;

# fn test(ses: &ora::Ses) -> ora::Result<()> {
let stmt = ses.prep("SELECT text FROM test_lobs")?;
stmt.set_gcts(vec![ColumnType::Lob]);
let rset = stmt.qry(&mut [])?;
if let Some(mut row) = rset.next()? {
    let mut lob = row.take(0).into_lob()?;
    let mut text = String::new();
    lob.read_to_string(&mut text).map_err(|err| ora::Error::Interface(err.to_string()))?;
    lob.close()?;
}
# Ok(()) }
```
*/
pub struct Lob {
    id: u64,
    is_clob: bool,
    state: Mutex<LobState>,
    stmt: Arc<StmtInner>,
}

impl Drop for Lob {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl Lob {
    /// Copies the fetched locator `src` and opens it for reading.
    pub(crate) fn new(stmt: &Arc<StmtInner>, src: &OCILobLocator, is_clob: bool) -> Result<Self> {
        let ses = stmt.ses();
        let env : &OCIEnv = ses.as_ref().as_ref();
        let svc : &OCISvcCtx = ses.as_ref().as_ref();
        let err = Handle::<OCIError>::new(env)?;
        let id = drv::next_id();
        let loc = if is_clob {
            let mut loc = Descriptor::<OCICLobLocator>::new(env)?;
            oci::lob_locator_assign(svc, &err, src, loc.as_mut_ptr()).at("lob", id)?;
            Locator::Clob(loc)
        } else {
            let mut loc = Descriptor::<OCIBLobLocator>::new(env)?;
            oci::lob_locator_assign(svc, &err, src, loc.as_mut_ptr()).at("lob", id)?;
            Locator::Blob(loc)
        };
        let csfrm = if is_clob { oci::lob_char_set_form(env, &err, &loc).at("lob", id)? } else { 0 };
        let len = oci::lob_get_length(svc, &err, &loc).at("lob", id)?;
        oci::lob_open(svc, &err, &loc, OCI_LOB_READONLY).at("lob", id)?;
        let state = LobState { loc, csfrm, offset: 1, len, open: true, err };
        Ok( Self { id, is_clob, state: Mutex::new(state), stmt: stmt.clone() } )
    }

    /// Returns the process-unique id of this LOB.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_clob(&self) -> bool {
        self.is_clob
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open && self.stmt.lob_is_open(self.id)
    }

    /// Returns the LOB length: characters for CLOBs, bytes for BLOBs.
    pub fn len(&self) -> u64 {
        self.state.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the locator into `dst`, so the LOB can be bound as an input argument.
    pub(crate) fn assign_to(&self, svc: &OCISvcCtx, err: &OCIError, dst: *mut *mut OCILobLocator) -> Result<()> {
        let state = self.state.lock();
        oci::lob_locator_assign(svc, err, &state.loc, dst).at("bind", self.id)
    }

    /**
    Closes the LOB and releases its statement. Closing a LOB twice is not an error.
    */
    pub fn close(&self) -> Result<()> {
        let registered = self.stmt.forget_lob(self.id);
        let mut state = self.state.lock();
        if !state.open {
            return Ok(());
        }
        state.open = false;
        if !registered {
            // the statement is gone; nothing can be sent for this locator
            return Ok(());
        }
        let svc : &OCISvcCtx = self.stmt.ses().as_ref().as_ref();
        oci::lob_close(svc, &state.err, &state.loc).at("lob_close", self.id)
    }

    fn read_chunk(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.stmt.lob_is_open(self.id) {
            return Err( Error::protocol("LOB is closed", self.id) );
        }
        let mut state = self.state.lock();
        if !state.open {
            return Err( Error::protocol("LOB is closed", self.id) );
        }
        if buf.is_empty() || state.offset > state.len {
            return Ok(0);
        }
        let svc : &OCISvcCtx = self.stmt.ses().as_ref().as_ref();
        let res = oci::lob_read(svc, &state.err, &state.loc, state.offset, state.csfrm, buf).at("lob_read", self.id);
        let (bytes, chars, done) = match res {
            Ok(res) => res,
            Err(err) => {
                self.stmt.ses().note(&err);
                return Err(err);
            }
        };
        let step = if !self.is_clob {
            bytes as u64
        } else if chars > 0 {
            chars
        } else {
            count_chars(&buf[..bytes])
        };
        state.offset += step;
        if done && bytes == 0 {
            state.offset = state.len + 1;
        }
        Ok(bytes)
    }
}

fn count_chars(data: &[u8]) -> u64 {
    data.iter().filter(|&&b| (b & 0xC0) != 0x80).count() as u64
}

impl io::Read for Lob {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf).map_err(io::Error::from)
    }
}

impl io::Read for &Lob {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_boundaries() -> Result<()> {
        let text = "añb€".as_bytes();
        assert_eq!(utf8_prefix(text, false)?, text.len());
        assert_eq!(utf8_prefix(&text[..2], false)?, 1);
        assert_eq!(utf8_prefix(&text[..6], false)?, 4);
        assert!(utf8_prefix(&text[..6], true).is_err());
        assert!(utf8_prefix(&[b'a', 0xFF, b'b'], false).is_err());
        assert_eq!(count_chars(text), 4);
        Ok(())
    }

    #[test]
    fn sources() {
        assert!(LobSrc::Text(String::new()).is_clob());
        assert!(!LobSrc::Bytes(Vec::new()).is_clob());
        let src = LobSrc::reader(io::Cursor::new(vec![1u8, 2, 3]), false);
        assert!(!src.is_clob());
        assert_eq!(format!("{:?}", src), "Reader { clob: false }");
    }

    #[test]
    fn sources_fill_whole_chunks() -> Result<()> {
        struct Trickle(Vec<u8>);
        impl io::Read for Trickle {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0.remove(0);
                Ok(1)
            }
        }
        let mut src = Trickle(b"abcdef".to_vec());
        let mut buf = [0u8; 4];
        assert_eq!(fill(&mut src, &mut buf)?, 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(fill(&mut src, &mut buf)?, 2);
        assert_eq!(fill(&mut src, &mut buf)?, 0);
        Ok(())
    }
}
