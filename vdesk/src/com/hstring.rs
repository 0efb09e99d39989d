use crate::com::RawPtr;
use crate::com::error::NativeError;
use crate::host::Host;

/// An owned runtime string, deleted through the host that made it.
///
/// A null handle is the empty string.
pub struct HString<'h> {
    host: &'h dyn Host,
    raw: RawPtr,
}

impl<'h> HString<'h> {
    pub fn new(host: &'h dyn Host, text: &str) -> Result<Self, NativeError> {
        let raw = host.create_string(text)?;
        Ok(Self { host, raw })
    }

    /// # Safety
    ///
    /// `raw` must be null or a runtime string the caller owns and hands over.
    pub unsafe fn from_raw(host: &'h dyn Host, raw: RawPtr) -> Self {
        Self { host, raw }
    }

    pub fn as_raw(&self) -> RawPtr {
        self.raw
    }

    pub fn text(&self) -> String {
        if self.raw.is_null() {
            return String::new();
        }

        unsafe { self.host.string_text(self.raw) }
    }
}

impl Drop for HString<'_> {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { self.host.delete_string(self.raw) }
        }
    }
}
