#![allow(clippy::missing_safety_doc)]

use crate::com::ComPtr;
use crate::com::HResult;
use crate::com::IUnknownVtbl;
use crate::com::Interface;
use crate::com::RawPtr;
use crate::com::Reserved;
use crate::com::adopt;
use crate::com::error::NativeError;
use crate::com::hstring::HString;
use crate::com::read_wide;
use crate::com::to_wide;
use crate::guid::Guid;
use crate::host::Host;

pub const CLSID_IMMERSIVE_SHELL: Guid = Guid::from_u128(0xC2F03A33_21F5_47FA_B4BB_156362A2F239);
pub const CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL: Guid =
    Guid::from_u128(0xC5E0CDCA_7B6E_41B2_9FC4_D93975CC467B);
pub const CLSID_VIRTUAL_DESKTOP_PINNED_APPS: Guid =
    Guid::from_u128(0xB5A399E7_1C87_46B8_88E9_FC5747B171BD);

pub const IID_IUNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_C000_000000000046);
pub const IID_SERVICE_PROVIDER: Guid = Guid::from_u128(0x6D5140C1_7436_11CE_8034_00AA006009FA);
pub const IID_OBJECT_ARRAY: Guid = Guid::from_u128(0x92CA9DCD_5622_4BBA_A805_5E9F541BD8C9);
pub const IID_APPLICATION_VIEW: Guid = Guid::from_u128(0x372E1D3B_38D3_42E4_A15B_8AB2B178F513);
pub const IID_APPLICATION_VIEW_COLLECTION: Guid =
    Guid::from_u128(0x1841C6D7_4F9D_42C0_AF41_8747538F10E5);
pub const IID_VIRTUAL_DESKTOP_PINNED_APPS: Guid =
    Guid::from_u128(0x4CE81583_1E4C_4632_A621_07A53543148F);

pub type Bool = i32;

pub struct IServiceProvider;
pub struct IObjectArray;
pub struct IApplicationView;
pub struct IApplicationViewCollection;
pub struct IVirtualDesktopPinnedApps;
pub struct IVirtualDesktop;

#[repr(C)]
pub struct ServiceProviderVtbl {
    pub base: IUnknownVtbl,
    pub query_service: unsafe extern "system" fn(
        this: RawPtr,
        service: *const Guid,
        iid: *const Guid,
        out: *mut RawPtr,
    ) -> HResult,
}

#[repr(C)]
pub struct ObjectArrayVtbl {
    pub base: IUnknownVtbl,
    pub get_count: unsafe extern "system" fn(this: RawPtr, count: *mut u32) -> HResult,
    pub get_at: unsafe extern "system" fn(
        this: RawPtr,
        index: u32,
        iid: *const Guid,
        out: *mut RawPtr,
    ) -> HResult,
}

#[repr(C)]
pub struct ApplicationViewVtbl {
    pub base: IUnknownVtbl,
    pub get_iids: Reserved,
    pub get_runtime_class_name: Reserved,
    pub get_trust_level: Reserved,
    pub set_focus: unsafe extern "system" fn(this: RawPtr) -> HResult,
    pub switch_to: unsafe extern "system" fn(this: RawPtr) -> HResult,
    pub try_invoke_back: Reserved,
    pub get_thumbnail_window: unsafe extern "system" fn(this: RawPtr, hwnd: *mut isize) -> HResult,
    pub get_monitor: Reserved,
    pub get_visibility: unsafe extern "system" fn(this: RawPtr, visibility: *mut u32) -> HResult,
    pub set_cloak: Reserved,
    pub get_position: Reserved,
    pub set_position: Reserved,
    pub insert_after_window: Reserved,
    pub get_extended_frame_position: Reserved,
    pub get_app_user_model_id: unsafe extern "system" fn(this: RawPtr, id: *mut *mut u16) -> HResult,
    pub set_app_user_model_id: Reserved,
    pub is_equal_by_app_user_model_id: Reserved,
    pub get_view_state: Reserved,
    pub set_view_state: Reserved,
    pub get_neediness: Reserved,
    pub get_last_activation_timestamp: Reserved,
    pub set_last_activation_timestamp: Reserved,
    pub get_virtual_desktop_id: unsafe extern "system" fn(this: RawPtr, id: *mut Guid) -> HResult,
    pub set_virtual_desktop_id: Reserved,
    pub get_show_in_switchers: unsafe extern "system" fn(this: RawPtr, shown: *mut Bool) -> HResult,
}

#[repr(C)]
pub struct ApplicationViewCollectionVtbl {
    pub base: IUnknownVtbl,
    pub get_views: Reserved,
    pub get_views_by_z_order: unsafe extern "system" fn(this: RawPtr, out: *mut RawPtr) -> HResult,
    pub get_views_by_app_user_model_id: Reserved,
    pub get_view_for_hwnd:
        unsafe extern "system" fn(this: RawPtr, hwnd: isize, out: *mut RawPtr) -> HResult,
    pub get_view_for_application: Reserved,
    pub get_view_for_app_user_model_id: Reserved,
    pub get_view_in_focus: unsafe extern "system" fn(this: RawPtr, out: *mut RawPtr) -> HResult,
}

#[repr(C)]
pub struct VirtualDesktopPinnedAppsVtbl {
    pub base: IUnknownVtbl,
    pub is_app_id_pinned:
        unsafe extern "system" fn(this: RawPtr, app_id: *const u16, pinned: *mut Bool) -> HResult,
    pub pin_app_id: unsafe extern "system" fn(this: RawPtr, app_id: *const u16) -> HResult,
    pub unpin_app_id: unsafe extern "system" fn(this: RawPtr, app_id: *const u16) -> HResult,
    pub is_view_pinned:
        unsafe extern "system" fn(this: RawPtr, view: RawPtr, pinned: *mut Bool) -> HResult,
    pub pin_view: unsafe extern "system" fn(this: RawPtr, view: RawPtr) -> HResult,
    pub unpin_view: unsafe extern "system" fn(this: RawPtr, view: RawPtr) -> HResult,
}

/// The desktop contract shared by every supported build.
#[repr(C)]
pub struct VirtualDesktopVtbl {
    pub base: IUnknownVtbl,
    pub is_view_visible: Reserved,
    pub get_id: unsafe extern "system" fn(this: RawPtr, id: *mut Guid) -> HResult,
}

/// The desktop contract on builds whose desktops carry a name and a wallpaper.
#[repr(C)]
pub struct NamedVirtualDesktopVtbl {
    pub base: VirtualDesktopVtbl,
    pub get_name: unsafe extern "system" fn(this: RawPtr, name: *mut RawPtr) -> HResult,
    pub get_wallpaper: unsafe extern "system" fn(this: RawPtr, path: *mut RawPtr) -> HResult,
}

unsafe impl Interface for IServiceProvider {
    type Vtable = ServiceProviderVtbl;
    const NAME: &'static str = "IServiceProvider";
}

unsafe impl Interface for IObjectArray {
    type Vtable = ObjectArrayVtbl;
    const NAME: &'static str = "IObjectArray";
}

unsafe impl Interface for IApplicationView {
    type Vtable = ApplicationViewVtbl;
    const NAME: &'static str = "IApplicationView";
}

unsafe impl Interface for IApplicationViewCollection {
    type Vtable = ApplicationViewCollectionVtbl;
    const NAME: &'static str = "IApplicationViewCollection";
}

unsafe impl Interface for IVirtualDesktopPinnedApps {
    type Vtable = VirtualDesktopPinnedAppsVtbl;
    const NAME: &'static str = "IVirtualDesktopPinnedApps";
}

unsafe impl Interface for IVirtualDesktop {
    type Vtable = VirtualDesktopVtbl;
    const NAME: &'static str = "IVirtualDesktop";
}

fn out_bool(status: HResult, value: Bool) -> Result<bool, NativeError> {
    status.ok()?;
    Ok(value != 0)
}

impl ComPtr<IServiceProvider> {
    pub fn query_service<I: Interface>(
        &self,
        service: &Guid,
        iid: &Guid,
    ) -> Result<ComPtr<I>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.vtbl().query_service)(self.as_raw(), service, iid, &mut out);
            adopt(status, out)
        }
    }
}

impl ComPtr<IObjectArray> {
    pub fn count(&self) -> Result<u32, NativeError> {
        let mut count = 0;
        unsafe { (self.vtbl().get_count)(self.as_raw(), &mut count) }.ok()?;
        Ok(count)
    }

    pub fn get<I: Interface>(&self, index: u32, iid: &Guid) -> Result<ComPtr<I>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.vtbl().get_at)(self.as_raw(), index, iid, &mut out);
            adopt(status, out)
        }
    }

    /// Every element in order, each as its own reference. Elements already taken are
    /// released if a later one fails.
    pub fn elements<I: Interface>(&self, iid: &Guid) -> Result<Vec<ComPtr<I>>, NativeError> {
        (0..self.count()?).map(|index| self.get(index, iid)).collect()
    }
}

impl ComPtr<IApplicationView> {
    pub fn switch_to(&self) -> Result<(), NativeError> {
        unsafe { (self.vtbl().switch_to)(self.as_raw()) }.ok()
    }

    pub fn thumbnail_window(&self) -> Result<isize, NativeError> {
        let mut hwnd = 0;
        unsafe { (self.vtbl().get_thumbnail_window)(self.as_raw(), &mut hwnd) }.ok()?;
        Ok(hwnd)
    }

    /// The application identity, read and then handed back to the task allocator.
    pub fn app_user_model_id(&self, host: &dyn Host) -> Result<Option<String>, NativeError> {
        let mut raw = std::ptr::null_mut();
        let status = unsafe { (self.vtbl().get_app_user_model_id)(self.as_raw(), &mut raw) };

        let text = if raw.is_null() {
            None
        } else {
            unsafe {
                let text = read_wide(raw);
                host.free_task_memory(raw.cast());
                Some(text)
            }
        };

        status.ok()?;
        Ok(text.filter(|text| !text.is_empty()))
    }

    pub fn virtual_desktop_id(&self) -> Result<Guid, NativeError> {
        let mut id = Guid::zeroed();
        unsafe { (self.vtbl().get_virtual_desktop_id)(self.as_raw(), &mut id) }.ok()?;
        Ok(id)
    }

    pub fn show_in_switchers(&self) -> Result<bool, NativeError> {
        let mut shown = 0;
        let status = unsafe { (self.vtbl().get_show_in_switchers)(self.as_raw(), &mut shown) };
        out_bool(status, shown)
    }
}

impl ComPtr<IApplicationViewCollection> {
    pub fn views_by_z_order(&self) -> Result<ComPtr<IObjectArray>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.vtbl().get_views_by_z_order)(self.as_raw(), &mut out);
            adopt(status, out)
        }
    }

    pub fn view_for_hwnd(&self, hwnd: isize) -> Result<ComPtr<IApplicationView>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.vtbl().get_view_for_hwnd)(self.as_raw(), hwnd, &mut out);
            adopt(status, out)
        }
    }

    pub fn view_in_focus(&self) -> Result<ComPtr<IApplicationView>, NativeError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = (self.vtbl().get_view_in_focus)(self.as_raw(), &mut out);
            adopt(status, out)
        }
    }
}

impl ComPtr<IVirtualDesktopPinnedApps> {
    pub fn is_app_id_pinned(&self, app_id: &str) -> Result<bool, NativeError> {
        let app_id = to_wide(app_id);
        let mut pinned = 0;
        let status =
            unsafe { (self.vtbl().is_app_id_pinned)(self.as_raw(), app_id.as_ptr(), &mut pinned) };
        out_bool(status, pinned)
    }

    pub fn pin_app_id(&self, app_id: &str) -> Result<(), NativeError> {
        let app_id = to_wide(app_id);
        unsafe { (self.vtbl().pin_app_id)(self.as_raw(), app_id.as_ptr()) }.ok()
    }

    pub fn unpin_app_id(&self, app_id: &str) -> Result<(), NativeError> {
        let app_id = to_wide(app_id);
        unsafe { (self.vtbl().unpin_app_id)(self.as_raw(), app_id.as_ptr()) }.ok()
    }

    pub fn is_view_pinned(&self, view: &ComPtr<IApplicationView>) -> Result<bool, NativeError> {
        let mut pinned = 0;
        let status =
            unsafe { (self.vtbl().is_view_pinned)(self.as_raw(), view.as_raw(), &mut pinned) };
        out_bool(status, pinned)
    }

    pub fn pin_view(&self, view: &ComPtr<IApplicationView>) -> Result<(), NativeError> {
        unsafe { (self.vtbl().pin_view)(self.as_raw(), view.as_raw()) }.ok()
    }

    pub fn unpin_view(&self, view: &ComPtr<IApplicationView>) -> Result<(), NativeError> {
        unsafe { (self.vtbl().unpin_view)(self.as_raw(), view.as_raw()) }.ok()
    }
}

impl ComPtr<IVirtualDesktop> {
    pub fn id(&self) -> Result<Guid, NativeError> {
        let mut id = Guid::zeroed();
        unsafe { (self.vtbl().get_id)(self.as_raw(), &mut id) }.ok()?;
        Ok(id)
    }

    /// # Safety
    ///
    /// The desktop must have been obtained under an identity whose table is
    /// [`NamedVirtualDesktopVtbl`].
    pub unsafe fn name<'h>(&self, host: &'h dyn Host) -> Result<HString<'h>, NativeError> {
        let mut raw = std::ptr::null_mut();
        unsafe {
            let vtbl = self.extended_vtbl::<NamedVirtualDesktopVtbl>();
            let status = (vtbl.get_name)(self.as_raw(), &mut raw);
            let name = HString::from_raw(host, raw);
            status.ok()?;
            Ok(name)
        }
    }

    /// # Safety
    ///
    /// See [`Self::name`].
    pub unsafe fn wallpaper<'h>(&self, host: &'h dyn Host) -> Result<HString<'h>, NativeError> {
        let mut raw = std::ptr::null_mut();
        unsafe {
            let vtbl = self.extended_vtbl::<NamedVirtualDesktopVtbl>();
            let status = (vtbl.get_wallpaper)(self.as_raw(), &mut raw);
            let path = HString::from_raw(host, raw);
            status.ok()?;
            Ok(path)
        }
    }
}
