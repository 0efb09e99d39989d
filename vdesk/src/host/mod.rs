use crate::com::HResult;
use crate::com::RawPtr;
use crate::com::error::NativeError;
use crate::error::VirtualDesktopError;
use crate::guid::Guid;
use std::rc::Rc;

#[cfg(windows)]
pub mod win32;

/// The flat entry points the host exports outside of any object table.
pub trait Host {
    /// The running build, or 0 when it cannot be determined.
    fn build_number(&self) -> u32;

    /// Enters a single-threaded apartment on the calling thread.
    fn initialize(&self) -> HResult;
    fn uninitialize(&self);

    /// # Safety
    ///
    /// `out` must be valid for a pointer write.
    unsafe fn create_instance(&self, class: &Guid, iid: &Guid, out: *mut RawPtr) -> HResult;

    /// Lets any process take the foreground after the next switch.
    fn allow_set_foreground_window(&self) -> bool;

    fn window_text(&self, hwnd: isize) -> String;

    /// # Safety
    ///
    /// `ptr` must be null or a block from the task allocator that is not used afterwards.
    unsafe fn free_task_memory(&self, ptr: RawPtr);

    fn create_string(&self, text: &str) -> Result<RawPtr, NativeError>;

    /// # Safety
    ///
    /// `raw` must be a live runtime string.
    unsafe fn string_text(&self, raw: RawPtr) -> String;

    /// # Safety
    ///
    /// `raw` must be a runtime string the caller owns and does not use afterwards.
    unsafe fn delete_string(&self, raw: RawPtr);
}

#[cfg(windows)]
pub fn default_host() -> Result<Rc<dyn Host>, VirtualDesktopError> {
    Ok(Rc::new(win32::Win32Host))
}

#[cfg(not(windows))]
pub fn default_host() -> Result<Rc<dyn Host>, VirtualDesktopError> {
    Err(VirtualDesktopError::UnsupportedPlatform(std::env::consts::OS))
}
