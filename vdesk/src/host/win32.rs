#![allow(non_snake_case)]

use crate::com::HResult;
use crate::com::RawPtr;
use crate::com::error::NativeError;
use crate::com::to_wide;
use crate::guid::Guid;
use crate::host::Host;

const COINIT_APARTMENTTHREADED: u32 = 0x2;
const CLSCTX_LOCAL_SERVER: u32 = 0x4;
const ASFW_ANY: u32 = u32::MAX;

#[repr(C)]
struct OsVersionInfo {
    size: u32,
    major: u32,
    minor: u32,
    build: u32,
    platform: u32,
    service_pack: [u16; 128],
}

#[link(name = "ole32")]
unsafe extern "system" {
    fn CoInitializeEx(reserved: RawPtr, coinit: u32) -> HResult;
    fn CoUninitialize();
    fn CoCreateInstance(
        class: *const Guid,
        outer: RawPtr,
        context: u32,
        iid: *const Guid,
        out: *mut RawPtr,
    ) -> HResult;
    fn CoTaskMemFree(ptr: RawPtr);
}

#[link(name = "user32")]
unsafe extern "system" {
    fn AllowSetForegroundWindow(process_id: u32) -> i32;
    fn GetWindowTextLengthW(hwnd: isize) -> i32;
    fn GetWindowTextW(hwnd: isize, buffer: *mut u16, capacity: i32) -> i32;
}

#[link(name = "runtimeobject")]
unsafe extern "system" {
    fn WindowsCreateString(source: *const u16, length: u32, out: *mut RawPtr) -> HResult;
    fn WindowsDeleteString(string: RawPtr) -> HResult;
    fn WindowsGetStringRawBuffer(string: RawPtr, length: *mut u32) -> *const u16;
}

// reports the real build even to processes without a compatibility manifest
#[link(name = "ntdll")]
unsafe extern "system" {
    fn RtlGetVersion(info: *mut OsVersionInfo) -> i32;
}

pub struct Win32Host;

impl Host for Win32Host {
    fn build_number(&self) -> u32 {
        let mut info = OsVersionInfo {
            size: size_of::<OsVersionInfo>() as u32,
            major: 0,
            minor: 0,
            build: 0,
            platform: 0,
            service_pack: [0; 128],
        };

        match unsafe { RtlGetVersion(&mut info) } {
            0 => info.build,
            status => {
                tracing::warn!("RtlGetVersion failed with status {status:#010X}");
                0
            }
        }
    }

    fn initialize(&self) -> HResult {
        unsafe { CoInitializeEx(std::ptr::null_mut(), COINIT_APARTMENTTHREADED) }
    }

    fn uninitialize(&self) {
        unsafe { CoUninitialize() }
    }

    unsafe fn create_instance(&self, class: &Guid, iid: &Guid, out: *mut RawPtr) -> HResult {
        unsafe { CoCreateInstance(class, std::ptr::null_mut(), CLSCTX_LOCAL_SERVER, iid, out) }
    }

    fn allow_set_foreground_window(&self) -> bool {
        unsafe { AllowSetForegroundWindow(ASFW_ANY) != 0 }
    }

    fn window_text(&self, hwnd: isize) -> String {
        unsafe {
            let length = GetWindowTextLengthW(hwnd);
            if length <= 0 {
                return String::new();
            }

            let mut buffer = vec![0u16; length as usize + 1];
            let copied = GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32);
            buffer.truncate(copied.max(0) as usize);
            String::from_utf16_lossy(&buffer)
        }
    }

    unsafe fn free_task_memory(&self, ptr: RawPtr) {
        unsafe { CoTaskMemFree(ptr) }
    }

    fn create_string(&self, text: &str) -> Result<RawPtr, NativeError> {
        let wide = to_wide(text);
        let mut out = std::ptr::null_mut();
        unsafe { WindowsCreateString(wide.as_ptr(), (wide.len() - 1) as u32, &mut out) }.ok()?;
        Ok(out)
    }

    unsafe fn string_text(&self, raw: RawPtr) -> String {
        let mut length = 0;
        unsafe {
            let buffer = WindowsGetStringRawBuffer(raw, &mut length);
            if buffer.is_null() {
                return String::new();
            }

            String::from_utf16_lossy(std::slice::from_raw_parts(buffer, length as usize))
        }
    }

    unsafe fn delete_string(&self, raw: RawPtr) {
        if let Err(error) = unsafe { WindowsDeleteString(raw) }.ok() {
            tracing::debug!("WindowsDeleteString failed: {error}");
        }
    }
}
