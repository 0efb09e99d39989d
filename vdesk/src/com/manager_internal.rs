//! The desktop manager contract.
//!
//! The first seven slots share one shape across the modelled layouts. Everything after
//! `SwitchDesktop` moves around between builds, so the tail is read through the table
//! matching the resolved [`SlotLayout`].
//!
//! The 21H2 family (22000 to 22620, served by the 21313 profile) is not modelled. There
//! several of these slots take a monitor argument and the desktop table gains a monitor
//! slot after `GetID`, so desktop strings are only read from 22621 onwards.

use crate::com::ComPtr;
use crate::com::HResult;
use crate::com::IUnknownVtbl;
use crate::com::Interface;
use crate::com::RawPtr;
use crate::com::Reserved;
use crate::com::adopt;
use crate::com::error::NativeError;
use crate::com::hstring::HString;
use crate::com::interfaces::IApplicationView;
use crate::com::interfaces::IObjectArray;
use crate::com::interfaces::IVirtualDesktop;
use crate::guid::Guid;
use crate::profile::SlotLayout;

pub type CreateDesktopFn = unsafe extern "system" fn(this: RawPtr, out: *mut RawPtr) -> HResult;
pub type RemoveDesktopFn =
    unsafe extern "system" fn(this: RawPtr, desktop: RawPtr, fallback: RawPtr) -> HResult;
pub type FindDesktopFn =
    unsafe extern "system" fn(this: RawPtr, id: *const Guid, out: *mut RawPtr) -> HResult;
pub type SetDesktopStringFn =
    unsafe extern "system" fn(this: RawPtr, desktop: RawPtr, value: RawPtr) -> HResult;

#[repr(C)]
pub struct ManagerInternalVtbl<Tail> {
    pub base: IUnknownVtbl,
    pub get_count: unsafe extern "system" fn(this: RawPtr, count: *mut u32) -> HResult,
    pub move_view_to_desktop:
        unsafe extern "system" fn(this: RawPtr, view: RawPtr, desktop: RawPtr) -> HResult,
    pub can_view_move_desktops: Reserved,
    pub get_current_desktop: unsafe extern "system" fn(this: RawPtr, out: *mut RawPtr) -> HResult,
    pub get_desktops: unsafe extern "system" fn(this: RawPtr, out: *mut RawPtr) -> HResult,
    pub get_adjacent_desktop: Reserved,
    pub switch_desktop: unsafe extern "system" fn(this: RawPtr, desktop: RawPtr) -> HResult,
    pub tail: Tail,
}

#[repr(C)]
pub struct Win10Slots {
    pub create_desktop: CreateDesktopFn,
    pub remove_desktop: RemoveDesktopFn,
    pub find_desktop: FindDesktopFn,
}

#[repr(C)]
pub struct Win11Slots {
    pub create_desktop: CreateDesktopFn,
    pub move_desktop: Reserved,
    pub remove_desktop: RemoveDesktopFn,
    pub find_desktop: FindDesktopFn,
    pub get_desktop_switch_include_exclude_views: Reserved,
    pub set_name: SetDesktopStringFn,
    pub set_wallpaper: SetDesktopStringFn,
    pub update_wallpaper_for_all_desktops: Reserved,
}

#[repr(C)]
pub struct ForegroundSwitchSlots {
    pub switch_desktop_and_move_foreground_view: Reserved,
    pub rest: Win11Slots,
}

pub struct IVirtualDesktopManagerInternal;

unsafe impl Interface for IVirtualDesktopManagerInternal {
    type Vtable = ManagerInternalVtbl<()>;
    const NAME: &'static str = "IVirtualDesktopManagerInternal";
}

enum Tail<'a> {
    Win10(&'a Win10Slots),
    Win11(&'a Win11Slots),
}

pub struct DesktopManagerInternal {
    ptr: ComPtr<IVirtualDesktopManagerInternal>,
    layout: SlotLayout,
}

impl DesktopManagerInternal {
    /// # Safety
    ///
    /// `ptr` must have been obtained under the manager identity whose table matches
    /// `layout`.
    pub unsafe fn new(ptr: ComPtr<IVirtualDesktopManagerInternal>, layout: SlotLayout) -> Self {
        Self { ptr, layout }
    }

    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    fn raw(&self) -> RawPtr {
        self.ptr.as_raw()
    }

    fn tail(&self) -> Tail<'_> {
        unsafe {
            match self.layout {
                SlotLayout::Win10 => Tail::Win10(
                    &self
                        .ptr
                        .extended_vtbl::<ManagerInternalVtbl<Win10Slots>>()
                        .tail,
                ),
                SlotLayout::Win11 => Tail::Win11(
                    &self
                        .ptr
                        .extended_vtbl::<ManagerInternalVtbl<Win11Slots>>()
                        .tail,
                ),
                SlotLayout::Win11ForegroundSwitch => Tail::Win11(
                    &self
                        .ptr
                        .extended_vtbl::<ManagerInternalVtbl<ForegroundSwitchSlots>>()
                        .tail
                        .rest,
                ),
            }
        }
    }

    pub fn count(&self) -> Result<u32, NativeError> {
        let mut count = 0;
        unsafe { (self.ptr.vtbl().get_count)(self.raw(), &mut count) }.ok()?;
        Ok(count)
    }

    pub fn move_view_to_desktop(
        &self,
        view: &ComPtr<IApplicationView>,
        desktop: &ComPtr<IVirtualDesktop>,
    ) -> Result<(), NativeError> {
        unsafe {
            (self.ptr.vtbl().move_view_to_desktop)(self.raw(), view.as_raw(), desktop.as_raw())
        }
        .ok()
    }

    pub fn current_desktop(&self) -> Result<ComPtr<IVirtualDesktop>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.ptr.vtbl().get_current_desktop)(self.raw(), &mut out);
            adopt(status, out)
        }
    }

    pub fn desktops(&self) -> Result<ComPtr<IObjectArray>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.ptr.vtbl().get_desktops)(self.raw(), &mut out);
            adopt(status, out)
        }
    }

    pub fn switch_desktop(&self, desktop: &ComPtr<IVirtualDesktop>) -> Result<(), NativeError> {
        unsafe { (self.ptr.vtbl().switch_desktop)(self.raw(), desktop.as_raw()) }.ok()
    }

    pub fn create_desktop(&self) -> Result<ComPtr<IVirtualDesktop>, NativeError> {
        let create = match self.tail() {
            Tail::Win10(slots) => slots.create_desktop,
            Tail::Win11(slots) => slots.create_desktop,
        };

        let mut out = std::ptr::null_mut();
        unsafe {
            let status = create(self.raw(), &mut out);
            adopt(status, out)
        }
    }

    pub fn remove_desktop(
        &self,
        desktop: &ComPtr<IVirtualDesktop>,
        fallback: &ComPtr<IVirtualDesktop>,
    ) -> Result<(), NativeError> {
        let remove = match self.tail() {
            Tail::Win10(slots) => slots.remove_desktop,
            Tail::Win11(slots) => slots.remove_desktop,
        };

        unsafe { remove(self.raw(), desktop.as_raw(), fallback.as_raw()) }.ok()
    }

    pub fn find_desktop(&self, id: &Guid) -> Result<ComPtr<IVirtualDesktop>, NativeError> {
        let find = match self.tail() {
            Tail::Win10(slots) => slots.find_desktop,
            Tail::Win11(slots) => slots.find_desktop,
        };

        let mut out = std::ptr::null_mut();
        unsafe {
            let status = find(self.raw(), id, &mut out);
            adopt(status, out)
        }
    }

    pub fn set_name(
        &self,
        desktop: &ComPtr<IVirtualDesktop>,
        name: &HString<'_>,
    ) -> Result<(), NativeError> {
        match self.tail() {
            Tail::Win10(_) => Err(NativeError::NotImpl),
            Tail::Win11(slots) => {
                unsafe { (slots.set_name)(self.raw(), desktop.as_raw(), name.as_raw()) }.ok()
            }
        }
    }

    pub fn set_wallpaper(
        &self,
        desktop: &ComPtr<IVirtualDesktop>,
        path: &HString<'_>,
    ) -> Result<(), NativeError> {
        match self.tail() {
            Tail::Win10(_) => Err(NativeError::NotImpl),
            Tail::Win11(slots) => {
                unsafe { (slots.set_wallpaper)(self.raw(), desktop.as_raw(), path.as_raw()) }.ok()
            }
        }
    }
}
