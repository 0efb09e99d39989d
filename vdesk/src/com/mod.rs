//! Manual bridge to the shell's reference-counted component objects.
//!
//! A native object is a pointer to a pointer to a table of `extern "system"` function
//! pointers. Every table starts with the three lifetime slots of [`IUnknownVtbl`], and the
//! remaining slots must be declared in exactly the order the host lays them out, whether
//! this crate calls them or not.
//!
//! [`ComPtr`] owns exactly one reference: it releases on drop, acquires on clone, and
//! adopts or detaches raw references only through the explicit `from_raw`/`into_raw` pair.

use crate::com::error::NativeError;
use crate::guid::Guid;
use std::ffi::c_void;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub mod error;
pub mod hstring;
pub mod interfaces;
pub mod manager_internal;

pub type RawPtr = *mut c_void;

/// Placeholder for a slot this crate never calls; it only keeps later slots aligned.
pub type Reserved = usize;

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    pub const S_OK: Self = Self(0);
    pub const S_FALSE: Self = Self(1);
    pub const E_NOTIMPL: Self = Self(0x8000_4001_u32 as i32);
    pub const E_UNEXPECTED: Self = Self(0x8000_FFFF_u32 as i32);
    pub const E_NOINTERFACE: Self = Self(0x8000_4002_u32 as i32);
    pub const E_POINTER: Self = Self(0x8000_4003_u32 as i32);
    pub const E_FAIL: Self = Self(0x8000_4005_u32 as i32);
    pub const E_ACCESSDENIED: Self = Self(0x8007_0005_u32 as i32);
    pub const E_OUTOFMEMORY: Self = Self(0x8007_000E_u32 as i32);
    pub const E_INVALIDARG: Self = Self(0x8007_0057_u32 as i32);
    pub const CO_E_NOTINITIALIZED: Self = Self(0x8004_01F0_u32 as i32);
    pub const REGDB_E_CLASSNOTREG: Self = Self(0x8004_0154_u32 as i32);
    pub const RPC_E_CHANGED_MODE: Self = Self(0x8001_0106_u32 as i32);
    pub const TYPE_E_ELEMENTNOTFOUND: Self = Self(0x8002_802B_u32 as i32);

    /// Success includes the "success with caveats" statuses such as `S_FALSE`.
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub fn ok(self) -> Result<(), NativeError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(NativeError::from(self))
        }
    }
}

#[repr(C)]
pub struct IUnknownVtbl {
    pub query_interface:
        unsafe extern "system" fn(this: RawPtr, iid: *const Guid, out: *mut RawPtr) -> HResult,
    pub add_ref: unsafe extern "system" fn(this: RawPtr) -> u32,
    pub release: unsafe extern "system" fn(this: RawPtr) -> u32,
}

/// A native contract.
///
/// # Safety
///
/// `Vtable` must be `#[repr(C)]`, begin with an [`IUnknownVtbl`], and declare every slot
/// up to the last one it exposes in the host's order.
pub unsafe trait Interface {
    type Vtable;
    const NAME: &'static str;
}

pub struct IUnknown;

unsafe impl Interface for IUnknown {
    type Vtable = IUnknownVtbl;
    const NAME: &'static str = "IUnknown";
}

pub struct ComPtr<I: Interface> {
    raw: NonNull<c_void>,
    _interface: PhantomData<I>,
}

impl<I: Interface> ComPtr<I> {
    /// Takes ownership of one reference; null yields `None`.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live object implementing `I` whose reference the caller owns
    /// and hands over.
    pub unsafe fn from_raw(raw: RawPtr) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self {
            raw,
            _interface: PhantomData,
        })
    }

    /// Gives up ownership without releasing; the caller now owes the release.
    pub fn into_raw(self) -> RawPtr {
        let raw = self.as_raw();
        std::mem::forget(self);
        raw
    }

    pub fn as_raw(&self) -> RawPtr {
        self.raw.as_ptr()
    }

    pub fn vtbl(&self) -> &I::Vtable {
        unsafe { &**self.raw.as_ptr().cast::<*const I::Vtable>() }
    }

    fn unknown(&self) -> &IUnknownVtbl {
        unsafe { &**self.raw.as_ptr().cast::<*const IUnknownVtbl>() }
    }

    /// Asks the object for another contract. The returned reference is independent of
    /// `self` and is released on its own.
    pub fn query<J: Interface>(&self, iid: &Guid) -> Result<ComPtr<J>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.unknown().query_interface)(self.as_raw(), iid, &mut out);
            adopt(status, out)
        }
    }

    /// Reinterprets this reference under a contract whose table extends `I`'s.
    ///
    /// # Safety
    ///
    /// The object's real table must be at least as long as `J::Vtable`.
    pub unsafe fn extended_vtbl<V>(&self) -> &V {
        unsafe { &**self.raw.as_ptr().cast::<*const V>() }
    }
}

impl<I: Interface> Clone for ComPtr<I> {
    fn clone(&self) -> Self {
        unsafe {
            (self.unknown().add_ref)(self.as_raw());
        }

        Self {
            raw: self.raw,
            _interface: PhantomData,
        }
    }
}

impl<I: Interface> Drop for ComPtr<I> {
    fn drop(&mut self) {
        unsafe {
            (self.unknown().release)(self.as_raw());
        }
    }
}

impl<I: Interface> Debug for ComPtr<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:p})", I::NAME, self.raw)
    }
}

/// Adopts an out-parameter reference before the status is inspected, so a reference
/// handed back alongside a failure status is still released.
///
/// # Safety
///
/// `out` must be null or an owned reference to an object implementing `I`.
pub unsafe fn adopt<I: Interface>(status: HResult, out: RawPtr) -> Result<ComPtr<I>, NativeError> {
    let adopted = unsafe { ComPtr::from_raw(out) };
    status.ok()?;
    adopted.ok_or(NativeError::Pointer)
}

/// Reads a NUL-terminated UTF-16 string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated UTF-16 buffer.
pub unsafe fn read_wide(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }

    let mut len = 0;
    unsafe {
        while *ptr.add(len) != 0 {
            len += 1;
        }

        String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
    }
}

pub fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}
