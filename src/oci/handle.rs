//! OCI handles.

use crate::{Result, Error, oci};
use super::*;
use std::ops::Deref;

pub(crate) trait HandleType : OCIStruct {
    fn get_type() -> u32;
}

macro_rules! impl_handle_type {
    ($($oci_handle:ident => $id:ident),+) => {
        $(
            impl HandleType for $oci_handle {
                fn get_type() -> u32 { $id }
            }
        )+
    };
}

impl_handle_type!{
    OCIEnv      => OCI_HTYPE_ENV,
    OCIError    => OCI_HTYPE_ERROR,
    OCISvcCtx   => OCI_HTYPE_SVCCTX,
    OCIStmt     => OCI_HTYPE_STMT,
    OCIServer   => OCI_HTYPE_SERVER,
    OCISession  => OCI_HTYPE_SESSION
}

/// Owned OCI handle. The handle is freed when this wrapper is dropped.
pub(crate) struct Handle<T: HandleType> (Ptr<T>);

impl<T: HandleType> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: HandleType> AsRef<T> for Handle<T> {
    fn as_ref(&self) -> &T {
        self.0.deref()
    }
}

impl<T: HandleType> Drop for Handle<T> {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                OCIHandleFree(self.0.get() as _, T::get_type());
            }
        }
    }
}

impl<T: HandleType> Handle<T> {
    pub(crate) fn new(env: &OCIEnv) -> Result<Self> {
        let mut handle_ptr = Ptr::<T>::null();
        oci::handle_alloc(env, handle_ptr.as_mut_ptr() as _, T::get_type())?;
        if handle_ptr.is_null() {
            Err( Error::msg(format!("OCI returned NULL for handle {}", T::get_type())) )
        } else {
            Ok( Self(handle_ptr) )
        }
    }

    // Some handles (like OCIEnv) are allocated by their respective OCI*Create* APIs.
    // But we need to dispose of them (as handles) when it is time to drop them.
    pub(crate) fn from(handle_ptr: Ptr<T>) -> Self {
        Self(handle_ptr)
    }

    /// Gives up ownership of the handle. The caller becomes responsible for freeing it.
    pub(crate) fn release(mut self) -> Ptr<T> {
        let mut handle_ptr = Ptr::<T>::null();
        handle_ptr.swap(&mut self.0);
        handle_ptr
    }

    pub(crate) fn get_ptr(&self) -> Ptr<T> {
        self.0
    }

    /// Address OCI writes the handle into (REF CURSOR binds and defines).
    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut T {
        self.0.as_mut_ptr()
    }

    pub(crate) fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, err: &OCIError) -> Result<V> {
        attr::get::<V>(attr_type, T::get_type(), self.0.get() as _, err)
    }

    pub(crate) fn get_attr_into<V: attr::AttrGetInto>(&self, attr_type: u32, into: &mut V, err: &OCIError) -> Result<()> {
        attr::get_into::<V>(attr_type, into, T::get_type(), self.0.get() as _, err)
    }

    pub(crate) fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V, err: &OCIError) -> Result<()> {
        attr::set::<V>(attr_type, attr_val, T::get_type(), self.0.get() as _, err)
    }
}
