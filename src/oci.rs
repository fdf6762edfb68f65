//! Oracle OCI

#![allow(dead_code)]

use libc::{size_t, c_void};
use crate::{Result, Error};

pub(crate) mod ptr;
pub(crate) mod attr;
pub(crate) mod param;
pub(crate) mod handle;
pub(crate) mod desc;

pub(crate) use ptr::Ptr;
pub(crate) use handle::Handle;
pub(crate) use desc::{Descriptor, DescriptorType};

pub(crate) const OCI_DEFAULT                : u32 = 0;

// OCI Error Codes
pub(crate) const OCI_SUCCESS                : i32 = 0;
pub(crate) const OCI_SUCCESS_WITH_INFO      : i32 = 1;
pub(crate) const OCI_NEED_DATA              : i32 = 99;
pub(crate) const OCI_NO_DATA                : i32 = 100;
pub(crate) const OCI_ERROR                  : i32 = -1;
pub(crate) const OCI_INVALID_HANDLE         : i32 = -2;

// Handle Types
pub(crate) const OCI_HTYPE_ENV              : u32 = 1;
pub(crate) const OCI_HTYPE_ERROR            : u32 = 2;
pub(crate) const OCI_HTYPE_SVCCTX           : u32 = 3;
pub(crate) const OCI_HTYPE_STMT             : u32 = 4;
pub(crate) const OCI_HTYPE_BIND             : u32 = 5;
pub(crate) const OCI_HTYPE_DEFINE           : u32 = 6;
pub(crate) const OCI_HTYPE_SERVER           : u32 = 8;
pub(crate) const OCI_HTYPE_SESSION          : u32 = 9;

// Handle Definitions
#[repr(C)] pub struct OCIEnv                { _private: [u8; 0] }
#[repr(C)] pub struct OCIError              { _private: [u8; 0] }
#[repr(C)] pub struct OCISvcCtx             { _private: [u8; 0] }
#[repr(C)] pub struct OCIStmt               { _private: [u8; 0] }
#[repr(C)] pub struct OCIBind               { _private: [u8; 0] }
#[repr(C)] pub struct OCIDefine             { _private: [u8; 0] }
#[repr(C)] pub struct OCIServer             { _private: [u8; 0] }
#[repr(C)] pub struct OCISession            { _private: [u8; 0] }

// Descriptor Types
pub(crate) const OCI_DTYPE_LOB              : u32 = 50;  // lob locator
pub(crate) const OCI_DTYPE_PARAM            : u32 = 53;  // a parameter descriptor obtained from ocigparm
pub(crate) const OCI_DTYPE_FILE             : u32 = 56;  // File Lob locator
pub(crate) const OCI_DTYPE_INTERVAL_YM      : u32 = 62;  // Interval year month
pub(crate) const OCI_DTYPE_INTERVAL_DS      : u32 = 63;  // Interval day second
pub(crate) const OCI_DTYPE_TIMESTAMP_TZ     : u32 = 69;  // Timestamp with timezone

// Descriptor Definitions
#[repr(C)] pub struct OCILobLocator         { _private: [u8; 0] }
#[repr(C)] pub struct OCIParam              { _private: [u8; 0] }
#[repr(C)] pub struct OCIDateTime           { _private: [u8; 0] }
#[repr(C)] pub struct OCIInterval           { _private: [u8; 0] }

// Virtual descriptors
pub struct OCICLobLocator           {}
pub struct OCIBLobLocator           {}
pub struct OCIBFileLocator          {}
pub struct OCITimestampTZ           {}
pub struct OCIIntervalYearToMonth   {}
pub struct OCIIntervalDayToSecond   {}

/// Marker trait for OCI handles and descriptors
pub trait OCIStruct {}

macro_rules! mark_as_oci {
    ($($t:ty),+) => {
        $(
            impl OCIStruct for $t {}
        )+
    };
}

mark_as_oci!(OCIEnv, OCIError, OCISvcCtx, OCIStmt, OCIBind, OCIDefine, OCIServer, OCISession);
mark_as_oci!(OCILobLocator, OCIParam, OCIDateTime, OCIInterval);
mark_as_oci!(OCICLobLocator, OCIBLobLocator, OCIBFileLocator, OCITimestampTZ, OCIIntervalYearToMonth, OCIIntervalDayToSecond);

/// C mapping of the Oracle NUMBER
#[derive(Clone, Copy)]
#[repr(C)] pub struct OCINumber {
    pub(crate) bytes: [u8; 22]
}

impl Default for OCINumber {
    fn default() -> Self {
        Self { bytes: [0; 22] }
    }
}

// Data types
pub(crate) const SQLT_CHR               : u16 = 1;   // (ORANET TYPE) character string
pub(crate) const SQLT_NUM               : u16 = 2;   // (ORANET TYPE) oracle numeric
pub(crate) const SQLT_INT               : u16 = 3;   // (ORANET TYPE) integer
pub(crate) const SQLT_FLT               : u16 = 4;   // (ORANET TYPE) Floating point number
pub(crate) const SQLT_STR               : u16 = 5;   // zero terminated string
pub(crate) const SQLT_VNU               : u16 = 6;   // NUM with preceding length byte
pub(crate) const SQLT_LNG               : u16 = 8;   // long
pub(crate) const SQLT_RID               : u16 = 11;  // rowid
pub(crate) const SQLT_DAT               : u16 = 12;  // date in oracle format
pub(crate) const SQLT_BFLOAT            : u16 = 21;  // Native Binary float
pub(crate) const SQLT_BDOUBLE           : u16 = 22;  // NAtive binary double
pub(crate) const SQLT_BIN               : u16 = 23;  // binary data(DTYBIN)
pub(crate) const SQLT_LBI               : u16 = 24;  // long binary
pub(crate) const SQLT_UIN               : u16 = 68;  // unsigned integer
pub(crate) const SQLT_AFC               : u16 = 96;  // Ansi fixed char
pub(crate) const SQLT_IBFLOAT           : u16 = 100; // binary float canonical
pub(crate) const SQLT_IBDOUBLE          : u16 = 101; // binary double canonical
pub(crate) const SQLT_RDD               : u16 = 104; // rowid descriptor
pub(crate) const SQLT_CLOB              : u16 = 112; // character lob
pub(crate) const SQLT_BLOB              : u16 = 113; // binary lob
pub(crate) const SQLT_BFILE             : u16 = 114; // binary file lob
pub(crate) const SQLT_CFILE             : u16 = 115; // character file lob
pub(crate) const SQLT_RSET              : u16 = 116; // result set type

// datetimes and intervals
pub(crate) const SQLT_DATE              : u16 = 184; // ANSI Date
pub(crate) const SQLT_TIMESTAMP         : u16 = 187; // TIMESTAMP
pub(crate) const SQLT_TIMESTAMP_TZ      : u16 = 188; // TIMESTAMP WITH TIME ZONE
pub(crate) const SQLT_INTERVAL_YM       : u16 = 189; // INTERVAL YEAR TO MONTH
pub(crate) const SQLT_INTERVAL_DS       : u16 = 190; // INTERVAL DAY TO SECOND
pub(crate) const SQLT_TIMESTAMP_LTZ     : u16 = 232; // TIMESTAMP WITH LOCAL TZ

// Null indicator information
pub(crate) const OCI_IND_NOTNULL        : i16 = 0;
pub(crate) const OCI_IND_NULL           : i16 = -1;

// char set "form" information
pub(crate) const SQLCS_IMPLICIT         : u8 = 1;
pub(crate) const SQLCS_NCHAR            : u8 = 2;

// OBJECT Duration
pub(crate) const OCI_DURATION_SESSION   : u16 = 10;

// Character Sets
pub(crate) const AL32UTF8               : u16 = 873;
pub(crate) const UTF8                   : u16 = 871;

// Initialization Modes
pub(crate) const OCI_THREADED           : u32 = 1;

// Credential Types
pub(crate) const OCI_CRED_RDBMS         : u32 = 1;
pub(crate) const OCI_CRED_EXT           : u32 = 2;

// Session modes
pub(crate) const OCI_SYSDBA             : u32 = 0x0000_0002;
pub(crate) const OCI_SYSOPER            : u32 = 0x0000_0004;

// Handle attributes
pub(crate) const OCI_ATTR_DATA_SIZE         : u32 = 1;   // maximum size of the data
pub(crate) const OCI_ATTR_DATA_TYPE         : u32 = 2;   // the SQL type of the column/argument
pub(crate) const OCI_ATTR_NAME              : u32 = 4;   // the name of the column/argument
pub(crate) const OCI_ATTR_PRECISION         : u32 = 5;   // precision if number type
pub(crate) const OCI_ATTR_SCALE             : u32 = 6;   // scale if number type
pub(crate) const OCI_ATTR_IS_NULL           : u32 = 7;   // is it null ?
pub(crate) const OCI_ATTR_SERVER            : u32 = 6;
pub(crate) const OCI_ATTR_SESSION           : u32 = 7;
pub(crate) const OCI_ATTR_PREFETCH_ROWS     : u32 = 11;
pub(crate) const OCI_ATTR_PREFETCH_MEMORY   : u32 = 13;
pub(crate) const OCI_ATTR_PARAM_COUNT       : u32 = 18;  // number of columns in the select list
pub(crate) const OCI_ATTR_USERNAME          : u32 = 22;
pub(crate) const OCI_ATTR_PASSWORD          : u32 = 23;
pub(crate) const OCI_ATTR_STMT_TYPE         : u32 = 24;
pub(crate) const OCI_ATTR_CHARSET_FORM      : u32 = 32;
pub(crate) const OCI_ATTR_STMTCACHESIZE     : u32 = 176;
pub(crate) const OCI_ATTR_BIND_COUNT        : u32 = 190;
pub(crate) const OCI_ATTR_ROWS_FETCHED      : u32 = 197;
pub(crate) const OCI_ATTR_CHAR_SIZE         : u32 = 286;
pub(crate) const OCI_ATTR_MODULE            : u32 = 366;
pub(crate) const OCI_ATTR_ACTION            : u32 = 367;
pub(crate) const OCI_ATTR_DRIVER_NAME       : u32 = 424;
pub(crate) const OCI_ATTR_UB8_ROW_COUNT     : u32 = 457;

// Statement Types
pub(crate) const OCI_STMT_UNKNOWN           : u16 = 0;
pub(crate) const OCI_STMT_SELECT            : u16 = 1;
pub(crate) const OCI_STMT_UPDATE            : u16 = 2;
pub(crate) const OCI_STMT_DELETE            : u16 = 3;
pub(crate) const OCI_STMT_INSERT            : u16 = 4;
pub(crate) const OCI_STMT_CREATE            : u16 = 5;
pub(crate) const OCI_STMT_DROP              : u16 = 6;
pub(crate) const OCI_STMT_ALTER             : u16 = 7;
pub(crate) const OCI_STMT_BEGIN             : u16 = 8;
pub(crate) const OCI_STMT_DECLARE           : u16 = 9;
pub(crate) const OCI_STMT_CALL              : u16 = 10;
pub(crate) const OCI_STMT_MERGE             : u16 = 16;

// Parsing Syntax Types
pub(crate) const OCI_NTV_SYNTAX             : u32 = 1;

// Execution modes
pub(crate) const OCI_COMMIT_ON_SUCCESS      : u32 = 0x0000_0020;

pub(crate) const OCI_FETCH_NEXT             : u16 = 2;

// Transaction flags
pub(crate) const OCI_TRANS_NEW              : u32 = 0x0000_0001;

pub(crate) const OCI_TEMP_BLOB              : u8 = 1;
pub(crate) const OCI_TEMP_CLOB              : u8 = 2;

pub(crate) const OCI_LOB_READONLY           : u8 = 1;

pub(crate) const OCI_ONE_PIECE              : u8 = 0;

pub(crate) const OCI_ERROR_MAXMSG_SIZE      : usize = 3072;

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-0B6911A9-4B46-476C-BC5E-B87581666CD9
    fn OCIEnvNlsCreate(
        envhpp:     *mut *mut  OCIEnv,
        mode:       u32,
        ctxp:       *const c_void,
        malocfp:    *const c_void,
        ralocfp:    *const c_void,
        mfreefp:    *const c_void,
        xtramemsz:  size_t,
        usrmempp:   *const c_void,
        charset:    u16,
        ncharset:   u16
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-C5BF55F7-A110-4CB5-9663-5056590F12B5
    fn OCIHandleAlloc(
        parenth:    *const OCIEnv,
        hndlpp:     *mut *mut  c_void,
        hndl_type:  u32,
        xtramem_sz: size_t,
        usrmempp:   *const c_void
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-E87E9F91-D3DC-4F35-BE7C-F1EFBFEEBA0A
    pub(crate) fn OCIHandleFree(
        hndlp:      *mut c_void,
        hnd_type:   u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-E9EF2766-E078-49A7-B1D1-738E4BA4814F
    fn OCIDescriptorAlloc(
        parenth:    *const OCIEnv,
        descpp:     *mut *mut  c_void,
        desc_type:  u32,
        xtramem_sz: size_t,
        usrmempp:   *const c_void
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-A32BF051-3DC1-491C-AAFD-A46034DD1629
    pub(crate) fn OCIDescriptorFree(
        descp:      *mut c_void,
        desc_type:  u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-FA199A99-4D7A-42C2-BB0A-C20047B95DF9
    fn OCIAttrGet(
        trgthndlp:  *const c_void,
        trghndltyp: u32,
        attributep: *mut c_void,
        sizep:      *mut u32,
        attrtype:   u32,
        errhp:      *const OCIError
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-3741D7BD-7652-4D7A-8813-AC2AEA8D3B03
    fn OCIAttrSet(
        trgthndlp:  *const c_void,
        trghndltyp: u32,
        attributep: *const c_void,
        size:       u32,
        attrtype:   u32,
        errhp:      *const OCIError
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-35D2FF91-139B-4A5C-97C8-8BC29866CCA4
    fn OCIParamGet(
        hndlp:      *const c_void,
        htype:      u32,
        errhp:      *const OCIError,
        descr:      *mut *mut c_void,
        pos:        u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-4B99087C-74F6-498A-8310-D6645172390A
    pub(crate) fn OCIErrorGet(
        hndlp:      *const c_void,
        recordno:   u32,
        sqlstate:   *const c_void,
        errcodep:   *mut i32,
        bufp:       *mut u8,
        bufsiz:     u32,
        hnd_type:   u32,
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-B6291228-DA2F-4CE9-870A-F94243141757
    fn OCIServerAttach(
        srvhp:      *const OCIServer,
        errhp:      *const OCIError,
        dblink:     *const u8,
        dblink_len: u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-402B540A-05FF-464B-B9C8-B2E7B4ABD564
    fn OCIServerDetach(
        srvhp:      *const OCIServer,
        errhp:      *const OCIError,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-6FA7A4B6-4376-4E53-BA6F-A8E7F2C7D9D9
    fn OCIServerVersion(
        hndlp:      *const c_void,
        errhp:      *const OCIError,
        bufp:       *mut u8,
        bufsz:      u32,
        hndltype:   u8
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-31B1FDB3-056E-4AF9-9B89-8DA6AA156947
    fn OCISessionBegin(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        userhp:     *const OCISession,
        credt:      u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-2AE88BDC-2C44-4958-B26A-434B0407F06F
    fn OCISessionEnd(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        userhp:     *const OCISession,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-033BF96D-D88D-4F18-909A-3AB7C2F6C70F
    fn OCIPing(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-9A76DE49-5E95-4A7A-AEEB-7A4C5B6D5A24
    fn OCIBreak(
        hndlp:      *const c_void,
        errhp:      *const OCIError
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-0D1C1C3E-DF1E-4C58-8BE3-B25B2F3A8A0C
    fn OCIReset(
        hndlp:      *const c_void,
        errhp:      *const OCIError
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/transaction-functions.html#GUID-FDC3F1F4-9A4A-4C0C-A5C0-2C7A6E4A5E8F
    fn OCITransStart(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        timeout:    u32,
        flags:      u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/transaction-functions.html#GUID-DDAE3122-8769-4A30-8D78-EB2A3CCF77D4
    fn OCITransCommit(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        flags:      u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/transaction-functions.html#GUID-06EF9A0A-01A3-40CE-A0B7-DF0504A93366
    fn OCITransRollback(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        flags:      u32
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-E6C1DC67-D464-4D2A-9F19-737423D31779
    fn OCIStmtPrepare2(
        svchp:      *const OCISvcCtx,
        stmthp:     *mut *mut OCIStmt,
        errhp:      *const OCIError,
        stmttext:   *const u8,
        stmt_len:   u32,
        key:        *const u8,
        keylen:     u32,
        language:   u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-256034CE-2ADB-4BE5-BC8D-748307F2EA8E
    fn OCIStmtRelease(
        stmtp:      *const OCIStmt,
        errhp:      *const OCIError,
        key:        *const u8,
        keylen:     u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/bind-define-describe-functions.html#GUID-D28DF5A7-3C75-4E52-82F7-A5D6D5714E69
    fn OCIBindByPos2(
        stmtp:      *const OCIStmt,
        bindpp:     *mut *mut OCIBind,
        errhp:      *const OCIError,
        position:   u32,
        valuep:     *mut c_void,
        value_sz:   i64,
        dty:        u16,
        indp:       *mut c_void,
        alenp:      *mut u32,
        rcodep:     *mut u16,
        maxarr_len: u32,
        curelep:    *mut u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-98B26708-3E02-45C0-8258-5D5544F32BE9
    fn OCIStmtExecute(
        svchp:      *const OCISvcCtx,
        stmtp:      *const OCIStmt,
        errhp:      *const OCIError,
        iters:      u32,
        rowoff:     u32,
        snap_in:    *const c_void,  // *const OCISnapshot
        snap_out:   *mut c_void,    // *mut OCISnapshot
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-60B998F9-F213-43BA-AB84-76F1EC6A6687
    fn OCIStmtGetNextResult(
        stmtp:      *const OCIStmt,
        errhp:      *const OCIError,
        result:     *mut *mut OCIStmt,
        rtype:      *mut u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-DF585B90-58BA-45FC-B7CE-6F7F987C03B9
    fn OCIStmtFetch2(
        stmtp:      *const OCIStmt,
        errhp:      *const OCIError,
        nrows:      u32,
        orient:     u16,
        offset:     i16,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/bind-define-describe-functions.html#GUID-74939FB5-919E-4D24-B327-AFB532435061
    fn OCIDefineByPos2(
        stmtp:      *const OCIStmt,
        defnpp:     *mut *mut OCIDefine,
        errhp:      *const OCIError,
        position:   u32,
        valuep:     *mut c_void,
        value_sz:   i64,
        dty:        u16,
        indp:       *mut i16,
        rlenp:      *mut u32,
        rcodep:     *mut u16,
        mode:       u32
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-CBEB9238-6B47-4A08-8C8D-FC2E5ED56557
    fn OCILobClose(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-9B25760D-649E-4B83-A0AA-8C4F3C479BC8
    fn OCILobCharSetForm(
        envhp:      *const OCIEnv,
        errhp:      *const OCIError,
        src:        *const OCILobLocator,
        csform:     *mut u8
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-63F75EC5-EB14-4E25-B593-270FF814615A
    fn OCILobCreateTemporary(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
        csid:       u16,
        csfrm:      u8,
        lob_type:   u8,
        cache:      u8,
        duration:   u16,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-BF637A34-B18A-47EE-A060-93C4E79D1813
    fn OCILobFileGetName(
        envhp:      *const OCIEnv,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
        dir:        *mut u8,
        dir_len:    *mut u16,
        filename:   *mut u8,
        name_len:   *mut u16,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-507AC0EF-4CAB-437E-BB94-1FD77EDC1B5C
    fn OCILobFileSetName(
        envhp:      *const OCIEnv,
        errhp:      *const OCIError,
        filepp:     *mut *mut OCILobLocator,
        dir:        *const u8,
        dir_len:    u16,
        filename:   *const u8,
        name_len:   u16,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-E0FBF017-1B08-410C-9E53-F6E14008813A
    fn OCILobFreeTemporary(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-9BC0A78A-37CB-432F-AE2B-22C905608C4C
    fn OCILobGetLength2(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
        len:        *mut u64,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-F7887376-4B3C-430C-94A3-11FE96E26627
    fn OCILobLocatorAssign(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        src:        *const OCILobLocator,
        dst:        *mut *mut OCILobLocator,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-B007A3C7-999B-4AD7-8BF7-C6D14572F470
    fn OCILobOpen(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
        mode:       u8,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-6AC6E6DA-236B-4BF9-942F-9FCC4178FEDA
    fn OCILobRead2(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
        byte_cnt:   *mut u64,
        char_cnt:   *mut u64,
        offset:     u64,
        buf:        *mut u8,
        buf_len:    u64,
        piece:      u8,
        ctx:        *mut c_void,
        read_cb:    *const c_void,
        csid:       u16,
        csfrm:      u8,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/lob-functions.html#GUID-87D3275A-B042-4991-B261-AB531BB83CA2
    fn OCILobWriteAppend2(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        loc:        *const OCILobLocator,
        byte_cnt:   *mut u64,
        char_cnt:   *mut u64,
        buf:        *const u8,
        buf_len:    u64,
        piece:      u8,
        ctx:        *mut c_void,
        write_cb:   *const c_void,
        csid:       u16,
        csfrm:      u8,
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-FC053036-BE93-42D7-A82C-4DDB6843E167
    fn OCIDateTimeConstruct(
        hndl:       *const c_void,
        err:        *const OCIError,
        datetime:   *mut OCIDateTime,
        year:       i16,
        month:      u8,
        day:        u8,
        hour:       u8,
        min:        u8,
        sec:        u8,
        fsec:       u32,
        timezone:   *const u8,
        tz_len:     size_t
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-FE6F9482-913D-43FD-BE5A-FCD9FA7B83AD
    fn OCIDateTimeGetDate(
        hndl:       *const c_void,
        err:        *const OCIError,
        datetime:   *const OCIDateTime,
        year:       *mut i16,
        month:      *mut u8,
        day:        *mut u8,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-D935ABA2-DEEA-4ABA-AA9C-C27E3E5AC1FD
    fn OCIDateTimeGetTime(
        hndl:       *const c_void,
        err:        *const OCIError,
        datetime:   *const OCIDateTime,
        hour:       *mut u8,
        min:        *mut u8,
        sec:        *mut u8,
        fsec:       *mut u32,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-B8DA860B-FD7D-481B-8347-156969B6EE04
    fn OCIDateTimeGetTimeZoneOffset(
        hndl:       *const c_void,
        err:        *const OCIError,
        datetime:   *const OCIDateTime,
        hour:       *mut i8,
        min:        *mut i8,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-210C4C25-3E8D-4F6D-9502-20B258DACA60
    fn OCIIntervalGetDaySecond(
        hndl:       *const c_void,
        err:        *const OCIError,
        dy:         *mut i32,
        hr:         *mut i32,
        mm:         *mut i32,
        ss:         *mut i32,
        fsec:       *mut i32,
        interval:   *const OCIInterval,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-665EFBF6-5032-4BD3-B7A3-1C35C2D5A6B7
    fn OCIIntervalGetYearMonth(
        hndl:       *const c_void,
        err:        *const OCIError,
        yr:         *mut i32,
        mnth:       *mut i32,
        interval:   *const OCIInterval,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-303A876B-E1EA-4AF8-8BD1-FC133C5F3F84
    fn OCIIntervalSetDaySecond(
        hndl:       *const c_void,
        err:        *const OCIError,
        dy:         i32,
        hr:         i32,
        mm:         i32,
        ss:         i32,
        fsec:       i32,
        result:     *mut OCIInterval,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-date-datetime-and-interval-functions.html#GUID-07D8A23E-58E2-420B-B4CA-EF37420F7549
    fn OCIIntervalSetYearMonth(
        hndl:       *const c_void,
        err:        *const OCIError,
        yr:         i32,
        mnth:       i32,
        result:     *mut OCIInterval,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-NUMBER-functions.html#GUID-F2E458B5-BECC-482E-9223-B92BC696CA17
    fn OCINumberFromText(
        err:      *const OCIError,
        txt:      *const u8,
        txt_len:  u32,
        fmt:      *const u8,
        fmt_len:  u32,
        nls_par:  *const u8,
        nls_len:  u32,
        number:   *mut OCINumber
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/oci-NUMBER-functions.html#GUID-129A5433-6927-43B7-A10F-5FE6AA354232
    fn OCINumberToText(
        err:      *const OCIError,
        number:   *const OCINumber,
        fmt:      *const u8,
        fmt_len:  u32,
        nls_par:  *const u8,
        nls_len:  u32,
        buf_size: *mut u32,
        buf:      *mut u8
    ) -> i32;
}

// Turns an OCI return code into a `Result`. Non-negative codes (including
// OCI_SUCCESS_WITH_INFO and OCI_NO_DATA) are passed through for the caller.
macro_rules! ok_or_oci_err {
    (|$err:ident| $stmt:expr) => {{
        let res = unsafe { $stmt };
        if res < 0 {
            Err( Error::oci($err, res) )
        } else {
            Ok( res )
        }
    }};
}

macro_rules! ok_or_env_err {
    (|$env:ident| $stmt:expr) => {{
        let res = unsafe { $stmt };
        if res < 0 {
            Err( Error::env($env, res) )
        } else {
            Ok(())
        }
    }};
}

pub(crate) fn env_nls_create(envhpp: *mut *mut OCIEnv, mode: u32) -> Result<()> {
    let res = unsafe {
        OCIEnvNlsCreate(
            envhpp, mode,
            std::ptr::null(), std::ptr::null(), std::ptr::null(), std::ptr::null(), 0, std::ptr::null(),
            AL32UTF8, UTF8
        )
    };
    if res < 0 || unsafe { *envhpp }.is_null() {
        Err( Error::msg("Cannot create OCI environment") )
    } else {
        Ok(())
    }
}

pub(crate) fn handle_alloc(env: &OCIEnv, hndlpp: *mut *mut c_void, hndl_type: u32) -> Result<()> {
    ok_or_env_err!(|env|
        OCIHandleAlloc(env, hndlpp, hndl_type, 0, std::ptr::null())
    )
}

pub(crate) fn descriptor_alloc(env: &OCIEnv, descpp: *mut *mut c_void, desc_type: u32) -> Result<()> {
    ok_or_env_err!(|env|
        OCIDescriptorAlloc(env, descpp, desc_type, 0, std::ptr::null())
    )
}

pub(crate) fn attr_get(obj: *const c_void, obj_type: u32, val: *mut c_void, size: &mut u32, attr_type: u32, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIAttrGet(obj, obj_type, val, size, attr_type, err)
    ).map(|_| ())
}

pub(crate) fn attr_set(obj: *const c_void, obj_type: u32, val: *const c_void, size: u32, attr_type: u32, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIAttrSet(obj, obj_type, val, size, attr_type, err)
    ).map(|_| ())
}

pub(crate) fn param_get(obj: *const c_void, obj_type: u32, err: &OCIError, descr: *mut *mut c_void, pos: u32) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIParamGet(obj, obj_type, err, descr, pos)
    ).map(|_| ())
}

pub(crate) fn server_attach(srv: &OCIServer, err: &OCIError, dblink: &str) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIServerAttach(srv, err, dblink.as_ptr(), dblink.len() as u32, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn server_detach(srv: &OCIServer, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIServerDetach(srv, err, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn server_version(srv: &OCIServer, err: &OCIError) -> Result<String> {
    let mut buf = vec![0u8; 512];
    ok_or_oci_err!(|err|
        OCIServerVersion(srv as *const OCIServer as _, err, buf.as_mut_ptr(), buf.len() as u32, OCI_HTYPE_SERVER as u8)
    )?;
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf.truncate(len);
    Ok( String::from_utf8_lossy(&buf).trim_end().to_string() )
}

pub(crate) fn session_begin(svc: &OCISvcCtx, err: &OCIError, usr: &OCISession, cred: u32, mode: u32) -> Result<()> {
    ok_or_oci_err!(|err|
        OCISessionBegin(svc, err, usr, cred, mode)
    ).map(|_| ())
}

pub(crate) fn session_end(svc: &OCISvcCtx, err: &OCIError, usr: &OCISession) -> Result<()> {
    ok_or_oci_err!(|err|
        OCISessionEnd(svc, err, usr, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn ping(svc: &OCISvcCtx, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIPing(svc, err, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn break_call(hndl: *const c_void, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIBreak(hndl, err)
    ).map(|_| ())
}

pub(crate) fn reset(hndl: *const c_void, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIReset(hndl, err)
    ).map(|_| ())
}

pub(crate) fn trans_start(svc: &OCISvcCtx, err: &OCIError, timeout: u32, flags: u32) -> Result<()> {
    ok_or_oci_err!(|err|
        OCITransStart(svc, err, timeout, flags)
    ).map(|_| ())
}

pub(crate) fn trans_commit(svc: &OCISvcCtx, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCITransCommit(svc, err, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn trans_rollback(svc: &OCISvcCtx, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCITransRollback(svc, err, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn stmt_prepare(svc: &OCISvcCtx, stmtp: *mut *mut OCIStmt, err: &OCIError, sql: &str) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIStmtPrepare2(svc, stmtp, err, sql.as_ptr(), sql.len() as u32, std::ptr::null(), 0, OCI_NTV_SYNTAX, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn stmt_release(stmt: &OCIStmt, err: &OCIError) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIStmtRelease(stmt, err, std::ptr::null(), 0, OCI_DEFAULT)
    ).map(|_| ())
}

/// Returns OCI_SUCCESS or OCI_SUCCESS_WITH_INFO (or OCI_NO_DATA for queries).
pub(crate) fn stmt_execute(svc: &OCISvcCtx, stmt: &OCIStmt, err: &OCIError, iters: u32, mode: u32) -> Result<i32> {
    ok_or_oci_err!(|err|
        OCIStmtExecute(svc, stmt, err, iters, 0, std::ptr::null(), std::ptr::null_mut(), mode)
    )
}

/// Returns OCI_NO_DATA when there are no more implicit results.
pub(crate) fn stmt_get_next_result(stmt: &OCIStmt, err: &OCIError, result: *mut *mut OCIStmt, rtype: &mut u32) -> Result<i32> {
    ok_or_oci_err!(|err|
        OCIStmtGetNextResult(stmt, err, result, rtype, OCI_DEFAULT)
    )
}

/// Returns OCI_SUCCESS, OCI_SUCCESS_WITH_INFO or OCI_NO_DATA
pub(crate) fn stmt_fetch(stmt: &OCIStmt, err: &OCIError, nrows: u32) -> Result<i32> {
    ok_or_oci_err!(|err|
        OCIStmtFetch2(stmt, err, nrows, OCI_FETCH_NEXT, 0, OCI_DEFAULT)
    )
}

pub(crate) fn bind_by_pos(
    stmt: &OCIStmt, bindpp: *mut *mut OCIBind, err: &OCIError, pos: u32,
    valuep: *mut c_void, value_sz: i64, dty: u16,
    indp: *mut i16, alenp: *mut u32, rcodep: *mut u16,
    maxarr_len: u32, curelep: *mut u32
) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIBindByPos2(stmt, bindpp, err, pos, valuep, value_sz, dty, indp as _, alenp, rcodep, maxarr_len, curelep, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn define_by_pos(
    stmt: &OCIStmt, defnpp: *mut *mut OCIDefine, err: &OCIError, pos: u32,
    valuep: *mut c_void, value_sz: i64, dty: u16,
    indp: *mut i16, rlenp: *mut u32, rcodep: *mut u16
) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIDefineByPos2(stmt, defnpp, err, pos, valuep, value_sz, dty, indp, rlenp, rcodep, OCI_DEFAULT)
    ).map(|_| ())
}

pub(crate) fn lob_open(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, mode: u8) -> Result<()> {
    ok_or_oci_err!(|err|
        OCILobOpen(svc, err, loc, mode)
    ).map(|_| ())
}

pub(crate) fn lob_close(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator) -> Result<()> {
    ok_or_oci_err!(|err|
        OCILobClose(svc, err, loc)
    ).map(|_| ())
}

pub(crate) fn lob_get_length(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator) -> Result<u64> {
    let mut len = 0u64;
    ok_or_oci_err!(|err|
        OCILobGetLength2(svc, err, loc, &mut len)
    )?;
    Ok( len )
}

pub(crate) fn lob_char_set_form(env: &OCIEnv, err: &OCIError, loc: &OCILobLocator) -> Result<u8> {
    let mut csform = 0u8;
    ok_or_oci_err!(|err|
        OCILobCharSetForm(env, err, loc, &mut csform)
    )?;
    Ok( csform )
}

pub(crate) fn lob_locator_assign(svc: &OCISvcCtx, err: &OCIError, src: &OCILobLocator, dst: *mut *mut OCILobLocator) -> Result<()> {
    ok_or_oci_err!(|err|
        OCILobLocatorAssign(svc, err, src, dst)
    ).map(|_| ())
}

pub(crate) fn lob_create_temporary(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, csfrm: u8, lob_type: u8) -> Result<()> {
    ok_or_oci_err!(|err|
        OCILobCreateTemporary(svc, err, loc, 0, csfrm, lob_type, 0, OCI_DURATION_SESSION)
    ).map(|_| ())
}

pub(crate) fn lob_free_temporary(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator) -> Result<()> {
    ok_or_oci_err!(|err|
        OCILobFreeTemporary(svc, err, loc)
    ).map(|_| ())
}

/// Reads up to `buf.len()` bytes at the 1-based `offset`, which counts characters for
/// character LOBs and bytes otherwise. Returns `(bytes read, characters read, end reached)`.
pub(crate) fn lob_read(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, offset: u64, csfrm: u8, buf: &mut [u8]) -> Result<(usize, u64, bool)> {
    let mut byte_cnt = buf.len() as u64;
    let mut char_cnt = 0u64;
    let res = ok_or_oci_err!(|err|
        OCILobRead2(
            svc, err, loc, &mut byte_cnt, &mut char_cnt, offset,
            buf.as_mut_ptr(), buf.len() as u64, OCI_ONE_PIECE,
            std::ptr::null_mut(), std::ptr::null(), 0, csfrm
        )
    )?;
    Ok( (byte_cnt as usize, char_cnt, res == OCI_NO_DATA || byte_cnt == 0) )
}

pub(crate) fn lob_write_append(svc: &OCISvcCtx, err: &OCIError, loc: &OCILobLocator, csfrm: u8, buf: &[u8]) -> Result<usize> {
    let mut byte_cnt = buf.len() as u64;
    let mut char_cnt = 0u64;
    ok_or_oci_err!(|err|
        OCILobWriteAppend2(
            svc, err, loc, &mut byte_cnt, &mut char_cnt,
            buf.as_ptr(), buf.len() as u64, OCI_ONE_PIECE,
            std::ptr::null_mut(), std::ptr::null(), 0, csfrm
        )
    )?;
    Ok( byte_cnt as usize )
}

pub(crate) fn lob_file_get_name(env: &OCIEnv, err: &OCIError, loc: &OCILobLocator) -> Result<(String, String)> {
    let mut dir  = vec![0u8; 30];
    let mut name = vec![0u8; 255];
    let mut dir_len  = dir.len() as u16;
    let mut name_len = name.len() as u16;
    ok_or_oci_err!(|err|
        OCILobFileGetName(env, err, loc, dir.as_mut_ptr(), &mut dir_len, name.as_mut_ptr(), &mut name_len)
    )?;
    dir.truncate(dir_len as usize);
    name.truncate(name_len as usize);
    Ok( (String::from_utf8_lossy(&dir).into_owned(), String::from_utf8_lossy(&name).into_owned()) )
}

pub(crate) fn lob_file_set_name(env: &OCIEnv, err: &OCIError, locpp: *mut *mut OCILobLocator, dir: &str, name: &str) -> Result<()> {
    ok_or_oci_err!(|err|
        OCILobFileSetName(env, err, locpp, dir.as_ptr(), dir.len() as u16, name.as_ptr(), name.len() as u16)
    ).map(|_| ())
}

pub(crate) fn date_time_construct(
    env: &OCIEnv, err: &OCIError, dt: *mut OCIDateTime,
    year: i16, month: u8, day: u8, hour: u8, min: u8, sec: u8, fsec: u32, tz: &str
) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIDateTimeConstruct(env as *const OCIEnv as _, err, dt, year, month, day, hour, min, sec, fsec, tz.as_ptr(), tz.len())
    ).map(|_| ())
}

/// Returns `(year, month, day, hour, min, sec, fsec, tz_hour, tz_min)`
pub(crate) fn date_time_parts(env: &OCIEnv, err: &OCIError, dt: *const OCIDateTime) -> Result<(i16, u8, u8, u8, u8, u8, u32, i8, i8)> {
    let hndl = env as *const OCIEnv as *const c_void;
    let (mut year, mut month, mut day) = (0i16, 0u8, 0u8);
    ok_or_oci_err!(|err|
        OCIDateTimeGetDate(hndl, err, dt, &mut year, &mut month, &mut day)
    )?;
    let (mut hour, mut min, mut sec, mut fsec) = (0u8, 0u8, 0u8, 0u32);
    ok_or_oci_err!(|err|
        OCIDateTimeGetTime(hndl, err, dt, &mut hour, &mut min, &mut sec, &mut fsec)
    )?;
    let (mut tz_hour, mut tz_min) = (0i8, 0i8);
    ok_or_oci_err!(|err|
        OCIDateTimeGetTimeZoneOffset(hndl, err, dt, &mut tz_hour, &mut tz_min)
    )?;
    Ok( (year, month, day, hour, min, sec, fsec, tz_hour, tz_min) )
}

pub(crate) fn interval_get_year_month(env: &OCIEnv, err: &OCIError, int: *const OCIInterval) -> Result<(i32, i32)> {
    let (mut yr, mut mnth) = (0i32, 0i32);
    ok_or_oci_err!(|err|
        OCIIntervalGetYearMonth(env as *const OCIEnv as _, err, &mut yr, &mut mnth, int)
    )?;
    Ok( (yr, mnth) )
}

pub(crate) fn interval_set_year_month(env: &OCIEnv, err: &OCIError, yr: i32, mnth: i32, int: *mut OCIInterval) -> Result<()> {
    ok_or_oci_err!(|err|
        OCIIntervalSetYearMonth(env as *const OCIEnv as _, err, yr, mnth, int)
    ).map(|_| ())
}

/// Returns `(day, hour, minute, second, nanosecond)`
pub(crate) fn interval_get_day_second(env: &OCIEnv, err: &OCIError, int: *const OCIInterval) -> Result<(i32, i32, i32, i32, i32)> {
    let (mut dy, mut hr, mut mm, mut ss, mut fsec) = (0i32, 0i32, 0i32, 0i32, 0i32);
    ok_or_oci_err!(|err|
        OCIIntervalGetDaySecond(env as *const OCIEnv as _, err, &mut dy, &mut hr, &mut mm, &mut ss, &mut fsec, int)
    )?;
    Ok( (dy, hr, mm, ss, fsec) )
}

pub(crate) fn interval_set_day_second(env: &OCIEnv, err: &OCIError, parts: (i32, i32, i32, i32, i32), int: *mut OCIInterval) -> Result<()> {
    let (dy, hr, mm, ss, fsec) = parts;
    ok_or_oci_err!(|err|
        OCIIntervalSetDaySecond(env as *const OCIEnv as _, err, dy, hr, mm, ss, fsec, int)
    ).map(|_| ())
}

// Text-minimum format gives the shortest exact decimal rendering.
const NUM_FMT : &str = "TM9";
// Wide enough for 38 significant digits, a sign, a decimal point and an exponent.
const NUM_FROM_SCI_FMT  : &str = "9.99999999999999999999999999999999999999EEEE";
const NUM_FROM_TEXT_FMT : &str = "FM999999999999999999999999999999999999999.999999999999999999999999999999999999999";

pub(crate) fn number_to_text(err: &OCIError, num: &OCINumber) -> Result<String> {
    let mut buf = vec![0u8; 64];
    let mut len = buf.len() as u32;
    ok_or_oci_err!(|err|
        OCINumberToText(err, num, NUM_FMT.as_ptr(), NUM_FMT.len() as u32, std::ptr::null(), 0, &mut len, buf.as_mut_ptr())
    )?;
    buf.truncate(len as usize);
    Ok( String::from_utf8_lossy(&buf).trim().to_string() )
}

pub(crate) fn number_from_text(err: &OCIError, txt: &str, num: &mut OCINumber) -> Result<()> {
    let fmt = if txt.contains(|c| c == 'e' || c == 'E') { NUM_FROM_SCI_FMT } else { NUM_FROM_TEXT_FMT };
    ok_or_oci_err!(|err|
        OCINumberFromText(err, txt.as_ptr(), txt.len() as u32, fmt.as_ptr(), fmt.len() as u32, std::ptr::null(), 0, num)
    ).map(|_| ())
}
