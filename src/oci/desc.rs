//! OCI descriptors

use crate::{Result, Error, oci};
use super::*;
use libc::c_void;

pub(crate) trait DescriptorType : OCIStruct {
    type OCIType : OCIStruct;
    fn get_type() -> u32;
}

macro_rules! impl_descr_type {
    ($($oci_desc:ident => $id:ident, $ret:ident),+) => {
        $(
            impl DescriptorType for $oci_desc {
                type OCIType = $ret;
                fn get_type() -> u32 { $id }
            }
        )+
    };
}

impl_descr_type!{
    OCICLobLocator          => OCI_DTYPE_LOB,           OCILobLocator,
    OCIBLobLocator          => OCI_DTYPE_LOB,           OCILobLocator,
    OCIBFileLocator         => OCI_DTYPE_FILE,          OCILobLocator,
    OCIParam                => OCI_DTYPE_PARAM,         OCIParam,
    OCITimestampTZ          => OCI_DTYPE_TIMESTAMP_TZ,  OCIDateTime,
    OCIIntervalYearToMonth  => OCI_DTYPE_INTERVAL_YM,   OCIInterval,
    OCIIntervalDayToSecond  => OCI_DTYPE_INTERVAL_DS,   OCIInterval
}

/// Owned OCI descriptor. The descriptor is freed when this wrapper is dropped.
///
/// The wrapper is transparent, so a `Vec<Descriptor<T>>` is the array of descriptor
/// pointers that array binds and defines hand to OCI.
#[repr(transparent)]
pub(crate) struct Descriptor<T: DescriptorType> {
    ptr: Ptr<T::OCIType>,
}

impl<T: DescriptorType> Drop for Descriptor<T> {
    fn drop(&mut self) {
        let ptr = self.ptr.get();
        if !ptr.is_null() {
            unsafe {
                OCIDescriptorFree(ptr as *mut c_void, T::get_type());
            }
        }
    }
}

impl<T: DescriptorType> Descriptor<T> {
    pub(crate) fn new(env: &OCIEnv) -> Result<Self> {
        let mut ptr = Ptr::<T::OCIType>::null();
        oci::descriptor_alloc(env, ptr.as_mut_ptr() as *mut *mut c_void, T::get_type())?;
        if ptr.is_null() {
            Err( Error::msg("OCIDescriptorAlloc returned NULL") )
        } else {
            Ok( Self { ptr } )
        }
    }

    pub(crate) fn from(ptr: Ptr<T::OCIType>) -> Self {
        Self { ptr }
    }

    pub(crate) fn get_ptr(&self) -> Ptr<T::OCIType> {
        self.ptr
    }

    pub(crate) fn get(&self) -> *mut T::OCIType {
        self.ptr.get()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut T::OCIType {
        self.ptr.as_mut_ptr()
    }

    pub(crate) fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, err: &OCIError) -> Result<V> {
        attr::get::<V>(attr_type, T::get_type(), self.ptr.get() as _, err)
    }
}

impl<T: DescriptorType> std::ops::Deref for Descriptor<T> {
    type Target = T::OCIType;

    fn deref(&self) -> &T::OCIType {
        &self.ptr
    }
}
