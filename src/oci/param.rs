//! OCI Parameter descriptor functions

use crate::{Result, oci};
use super::*;
use libc::c_void;

/// Returns the describe parameter of the select-list column at `pos` (1-based).
pub(crate) fn get(pos: u32, stmt: &OCIStmt, err: &OCIError) -> Result<Descriptor<OCIParam>> {
    let mut descr = Ptr::<OCIParam>::null();
    oci::param_get(stmt as *const OCIStmt as _, OCI_HTYPE_STMT, err, descr.as_mut_ptr() as *mut *mut c_void, pos)?;
    Ok( Descriptor::from(descr) )
}
