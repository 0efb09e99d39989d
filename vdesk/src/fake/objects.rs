use crate::com::HResult;
use crate::com::IUnknownVtbl;
use crate::com::RawPtr;
use crate::com::interfaces::ApplicationViewCollectionVtbl;
use crate::com::interfaces::ApplicationViewVtbl;
use crate::com::interfaces::Bool;
use crate::com::interfaces::CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL;
use crate::com::interfaces::CLSID_VIRTUAL_DESKTOP_PINNED_APPS;
use crate::com::interfaces::IID_APPLICATION_VIEW;
use crate::com::interfaces::IID_APPLICATION_VIEW_COLLECTION;
use crate::com::interfaces::IID_IUNKNOWN;
use crate::com::interfaces::IID_OBJECT_ARRAY;
use crate::com::interfaces::IID_SERVICE_PROVIDER;
use crate::com::interfaces::IID_VIRTUAL_DESKTOP_PINNED_APPS;
use crate::com::interfaces::NamedVirtualDesktopVtbl;
use crate::com::interfaces::ObjectArrayVtbl;
use crate::com::interfaces::ServiceProviderVtbl;
use crate::com::interfaces::VirtualDesktopPinnedAppsVtbl;
use crate::com::interfaces::VirtualDesktopVtbl;
use crate::com::manager_internal::ForegroundSwitchSlots;
use crate::com::manager_internal::ManagerInternalVtbl;
use crate::com::manager_internal::Win10Slots;
use crate::com::manager_internal::Win11Slots;
use crate::com::read_wide;
use crate::fake::Slot;
use crate::fake::WorldInner;
use crate::guid::Guid;
use crate::profile::SlotLayout;
use std::cell::Cell;
use std::cell::RefCell;
use std::ffi::c_void;

pub enum Kind {
    Shell,
    Manager,
    Collection,
    Pinned,
    Desktop(Guid),
    View(isize),
    Array(RefCell<Vec<RawPtr>>),
}

/// A native object as the bridge sees it: a table pointer first, then private data.
///
/// Objects are never freed while the world lives, so a release past zero is counted
/// instead of corrupting memory.
#[repr(C)]
pub struct FakeObject {
    vtbl: *const c_void,
    world: *const WorldInner,
    pub kind: Kind,
    pub refs: Cell<i64>,
}

impl FakeObject {
    pub fn new(world: &WorldInner, kind: Kind) -> Box<Self> {
        let vtbl = match &kind {
            Kind::Shell => table(&SHELL),
            Kind::Manager => match world.layout {
                SlotLayout::Win10 => table(&MANAGER_WIN10),
                SlotLayout::Win11 => table(&MANAGER_WIN11),
                SlotLayout::Win11ForegroundSwitch => table(&MANAGER_FOREGROUND_SWITCH),
            },
            Kind::Collection => table(&COLLECTION),
            Kind::Pinned => table(&PINNED),
            Kind::Desktop(_) => match world.layout.has_named_desktops() {
                true => table(&NAMED_DESKTOP),
                false => table(&DESKTOP),
            },
            Kind::View(_) => table(&VIEW),
            Kind::Array(_) => table(&ARRAY),
        };

        Box::new(Self {
            vtbl,
            world,
            kind,
            refs: Cell::new(0),
        })
    }

    pub fn add_ref(&self) -> u32 {
        self.refs.set(self.refs.get() + 1);
        self.refs.get() as u32
    }

    fn supports(&self, world: &WorldInner, iid: &Guid) -> bool {
        let own = match &self.kind {
            Kind::Shell => IID_SERVICE_PROVIDER,
            Kind::Manager => world.manager_iid,
            Kind::Collection => IID_APPLICATION_VIEW_COLLECTION,
            Kind::Pinned => IID_VIRTUAL_DESKTOP_PINNED_APPS,
            Kind::Desktop(_) => world.desktop_iid,
            Kind::View(_) => IID_APPLICATION_VIEW,
            Kind::Array(_) => IID_OBJECT_ARRAY,
        };

        *iid == own || *iid == IID_IUNKNOWN
    }
}

fn table<T>(vtbl: &'static T) -> *const c_void {
    (vtbl as *const T).cast()
}

unsafe fn object<'a>(this: RawPtr) -> &'a FakeObject {
    unsafe { &*this.cast::<FakeObject>() }
}

unsafe fn world<'a>(this: RawPtr) -> &'a WorldInner {
    unsafe { &*object(this).world }
}

pub fn hand_out(raw: RawPtr, out: *mut RawPtr) -> HResult {
    unsafe {
        object(raw).add_ref();
        *out = raw;
    }

    HResult::S_OK
}

pub fn desktop_id(raw: RawPtr) -> Option<Guid> {
    match unsafe { &object(raw).kind } {
        Kind::Desktop(id) => Some(*id),
        _ => None,
    }
}

pub fn view_hwnd(raw: RawPtr) -> Option<isize> {
    match unsafe { &object(raw).kind } {
        Kind::View(hwnd) => Some(*hwnd),
        _ => None,
    }
}

macro_rules! enter {
    ($this:expr, $slot:expr) => {{
        let world = unsafe { world($this) };
        if let Some(status) = world.enter($slot) {
            return status;
        }
        world
    }};
}

const UNKNOWN: IUnknownVtbl = IUnknownVtbl {
    query_interface,
    add_ref,
    release,
};

unsafe extern "system" fn query_interface(this: RawPtr, iid: *const Guid, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::QueryInterface);
    unsafe {
        *out = std::ptr::null_mut();
        if object(this).supports(world, &*iid) {
            hand_out(this, out)
        } else {
            HResult::E_NOINTERFACE
        }
    }
}

unsafe extern "system" fn add_ref(this: RawPtr) -> u32 {
    unsafe { object(this).add_ref() }
}

unsafe extern "system" fn release(this: RawPtr) -> u32 {
    let (object, world) = unsafe { (object(this), world(this)) };

    let refs = object.refs.get();
    if refs <= 0 {
        world.over_released.set(world.over_released.get() + 1);
        return 0;
    }

    object.refs.set(refs - 1);
    if refs == 1
        && let Kind::Array(elements) = &object.kind
    {
        for element in elements.take() {
            unsafe { release(element) };
        }
    }

    (refs - 1) as u32
}

static SHELL: ServiceProviderVtbl = ServiceProviderVtbl {
    base: UNKNOWN,
    query_service,
};

unsafe extern "system" fn query_service(
    this: RawPtr,
    service: *const Guid,
    iid: *const Guid,
    out: *mut RawPtr,
) -> HResult {
    let world = enter!(this, Slot::QueryService);
    let (service, iid) = unsafe { (*service, *iid) };
    unsafe { *out = std::ptr::null_mut() };

    if let Some(status) = world.state.borrow().service_failures.get(&iid) {
        return *status;
    }

    let kind = if service == CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL && iid == world.manager_iid {
        Kind::Manager
    } else if service == IID_APPLICATION_VIEW_COLLECTION && iid == IID_APPLICATION_VIEW_COLLECTION
    {
        Kind::Collection
    } else if service == CLSID_VIRTUAL_DESKTOP_PINNED_APPS && iid == IID_VIRTUAL_DESKTOP_PINNED_APPS
    {
        Kind::Pinned
    } else {
        return HResult::E_NOINTERFACE;
    };

    hand_out(world.allocate(kind), out)
}

static ARRAY: ObjectArrayVtbl = ObjectArrayVtbl {
    base: UNKNOWN,
    get_count: array_get_count,
    get_at: array_get_at,
};

fn elements(this: RawPtr) -> Vec<RawPtr> {
    match unsafe { &object(this).kind } {
        Kind::Array(elements) => elements.borrow().clone(),
        _ => Vec::new(),
    }
}

unsafe extern "system" fn array_get_count(this: RawPtr, count: *mut u32) -> HResult {
    enter!(this, Slot::GetCount);
    unsafe { *count = elements(this).len() as u32 };
    HResult::S_OK
}

unsafe extern "system" fn array_get_at(
    this: RawPtr,
    index: u32,
    iid: *const Guid,
    out: *mut RawPtr,
) -> HResult {
    let world = enter!(this, Slot::GetAt);
    unsafe { *out = std::ptr::null_mut() };

    if let Some((failing, status)) = world.state.borrow().element_failure
        && failing == index
    {
        return status;
    }

    match elements(this).get(index as usize) {
        None => HResult::E_INVALIDARG,
        Some(element) => {
            if unsafe { object(*element).supports(world, &*iid) } {
                hand_out(*element, out)
            } else {
                HResult::E_NOINTERFACE
            }
        }
    }
}

const fn manager_internal<Tail>(tail: Tail) -> ManagerInternalVtbl<Tail> {
    ManagerInternalVtbl {
        base: UNKNOWN,
        get_count: manager_get_count,
        move_view_to_desktop: manager_move_view_to_desktop,
        can_view_move_desktops: 0,
        get_current_desktop: manager_get_current_desktop,
        get_desktops: manager_get_desktops,
        get_adjacent_desktop: 0,
        switch_desktop: manager_switch_desktop,
        tail,
    }
}

const WIN11_SLOTS: Win11Slots = Win11Slots {
    create_desktop: manager_create_desktop,
    move_desktop: 0,
    remove_desktop: manager_remove_desktop,
    find_desktop: manager_find_desktop,
    get_desktop_switch_include_exclude_views: 0,
    set_name: manager_set_name,
    set_wallpaper: manager_set_wallpaper,
    update_wallpaper_for_all_desktops: 0,
};

static MANAGER_WIN10: ManagerInternalVtbl<Win10Slots> = manager_internal(Win10Slots {
    create_desktop: manager_create_desktop,
    remove_desktop: manager_remove_desktop,
    find_desktop: manager_find_desktop,
});

static MANAGER_WIN11: ManagerInternalVtbl<Win11Slots> = manager_internal(WIN11_SLOTS);

static MANAGER_FOREGROUND_SWITCH: ManagerInternalVtbl<ForegroundSwitchSlots> =
    manager_internal(ForegroundSwitchSlots {
        switch_desktop_and_move_foreground_view: 0,
        rest: WIN11_SLOTS,
    });

unsafe extern "system" fn manager_get_count(this: RawPtr, count: *mut u32) -> HResult {
    let world = enter!(this, Slot::GetDesktopCount);
    unsafe { *count = world.state.borrow().desktops.len() as u32 };
    HResult::S_OK
}

unsafe extern "system" fn manager_move_view_to_desktop(
    this: RawPtr,
    view: RawPtr,
    desktop: RawPtr,
) -> HResult {
    let world = enter!(this, Slot::MoveViewToDesktop);
    let (Some(hwnd), Some(id)) = (view_hwnd(view), desktop_id(desktop)) else {
        return HResult::E_INVALIDARG;
    };

    let mut state = world.state.borrow_mut();
    if !state.desktops.iter().any(|desk| desk.id == id) {
        return HResult::TYPE_E_ELEMENTNOTFOUND;
    }

    match state.views.iter_mut().find(|entry| entry.hwnd == hwnd) {
        Some(entry) => {
            entry.desktop = id;
            HResult::S_OK
        }
        None => HResult::TYPE_E_ELEMENTNOTFOUND,
    }
}

unsafe extern "system" fn manager_get_current_desktop(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::GetCurrentDesktop);
    let current = world.state.borrow().current_object();
    match current {
        Some(raw) => hand_out(raw, out),
        None => HResult::E_FAIL,
    }
}

unsafe extern "system" fn manager_get_desktops(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::GetDesktops);
    let objects = world
        .state
        .borrow()
        .desktops
        .iter()
        .map(|desk| desk.object)
        .collect();

    hand_out(world.array(objects), out)
}

unsafe extern "system" fn manager_switch_desktop(this: RawPtr, desktop: RawPtr) -> HResult {
    let world = enter!(this, Slot::SwitchDesktop);
    let Some(id) = desktop_id(desktop) else {
        return HResult::E_INVALIDARG;
    };

    let mut state = world.state.borrow_mut();
    if !state.desktops.iter().any(|desk| desk.id == id) {
        return HResult::TYPE_E_ELEMENTNOTFOUND;
    }

    state.current = id;
    HResult::S_OK
}

unsafe extern "system" fn manager_create_desktop(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::CreateDesktop);
    hand_out(world.push_desktop(), out)
}

unsafe extern "system" fn manager_remove_desktop(
    this: RawPtr,
    desktop: RawPtr,
    fallback: RawPtr,
) -> HResult {
    let world = enter!(this, Slot::RemoveDesktop);
    let (Some(removed), Some(fallback)) = (desktop_id(desktop), desktop_id(fallback)) else {
        return HResult::E_INVALIDARG;
    };

    let mut state = world.state.borrow_mut();
    let known = |id| state.desktops.iter().any(|desk| desk.id == id);
    if removed == fallback || !known(removed) || !known(fallback) {
        return HResult::E_INVALIDARG;
    }

    state.remove_desktop(removed, fallback);
    HResult::S_OK
}

unsafe extern "system" fn manager_find_desktop(
    this: RawPtr,
    id: *const Guid,
    out: *mut RawPtr,
) -> HResult {
    let world = enter!(this, Slot::FindDesktop);
    let id = unsafe { *id };
    let found = world
        .state
        .borrow()
        .desktops
        .iter()
        .find(|desk| desk.id == id)
        .map(|desk| desk.object);

    match found {
        Some(raw) => hand_out(raw, out),
        None => HResult::TYPE_E_ELEMENTNOTFOUND,
    }
}

unsafe extern "system" fn manager_set_name(this: RawPtr, desktop: RawPtr, name: RawPtr) -> HResult {
    let world = enter!(this, Slot::SetName);
    world.set_desktop_string(desktop, name, |desk, text| desk.name = text)
}

unsafe extern "system" fn manager_set_wallpaper(
    this: RawPtr,
    desktop: RawPtr,
    path: RawPtr,
) -> HResult {
    let world = enter!(this, Slot::SetWallpaper);
    world.set_desktop_string(desktop, path, |desk, text| desk.wallpaper = text)
}

static DESKTOP: VirtualDesktopVtbl = VirtualDesktopVtbl {
    base: UNKNOWN,
    is_view_visible: 0,
    get_id: desktop_get_id,
};

static NAMED_DESKTOP: NamedVirtualDesktopVtbl = NamedVirtualDesktopVtbl {
    base: VirtualDesktopVtbl {
        base: UNKNOWN,
        is_view_visible: 0,
        get_id: desktop_get_id,
    },
    get_name: desktop_get_name,
    get_wallpaper: desktop_get_wallpaper,
};

unsafe extern "system" fn desktop_get_id(this: RawPtr, id: *mut Guid) -> HResult {
    enter!(this, Slot::GetId);
    match desktop_id(this) {
        Some(own) => {
            unsafe { *id = own };
            HResult::S_OK
        }
        None => HResult::E_FAIL,
    }
}

unsafe extern "system" fn desktop_get_name(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::GetName);
    world.read_desktop_string(this, out, |desk| desk.name.clone())
}

unsafe extern "system" fn desktop_get_wallpaper(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::GetWallpaper);
    world.read_desktop_string(this, out, |desk| desk.wallpaper.clone())
}

static COLLECTION: ApplicationViewCollectionVtbl = ApplicationViewCollectionVtbl {
    base: UNKNOWN,
    get_views: 0,
    get_views_by_z_order: collection_get_views_by_z_order,
    get_views_by_app_user_model_id: 0,
    get_view_for_hwnd: collection_get_view_for_hwnd,
    get_view_for_application: 0,
    get_view_for_app_user_model_id: 0,
    get_view_in_focus: collection_get_view_in_focus,
};

unsafe extern "system" fn collection_get_views_by_z_order(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::GetViewsByZOrder);
    let objects = world
        .state
        .borrow()
        .views
        .iter()
        .map(|entry| entry.object)
        .collect();

    hand_out(world.array(objects), out)
}

fn view_object(world: &WorldInner, hwnd: isize) -> Option<RawPtr> {
    world
        .state
        .borrow()
        .views
        .iter()
        .find(|entry| entry.hwnd == hwnd)
        .map(|entry| entry.object)
}

unsafe extern "system" fn collection_get_view_for_hwnd(
    this: RawPtr,
    hwnd: isize,
    out: *mut RawPtr,
) -> HResult {
    let world = enter!(this, Slot::GetViewForHwnd);
    unsafe { *out = std::ptr::null_mut() };
    match view_object(world, hwnd) {
        Some(raw) => hand_out(raw, out),
        None => HResult::TYPE_E_ELEMENTNOTFOUND,
    }
}

unsafe extern "system" fn collection_get_view_in_focus(this: RawPtr, out: *mut RawPtr) -> HResult {
    let world = enter!(this, Slot::GetViewInFocus);
    unsafe { *out = std::ptr::null_mut() };
    let focused = world.state.borrow().focused;
    match focused.and_then(|hwnd| view_object(world, hwnd)) {
        Some(raw) => hand_out(raw, out),
        None => HResult::TYPE_E_ELEMENTNOTFOUND,
    }
}

static VIEW: ApplicationViewVtbl = ApplicationViewVtbl {
    base: UNKNOWN,
    get_iids: 0,
    get_runtime_class_name: 0,
    get_trust_level: 0,
    set_focus: view_set_focus,
    switch_to: view_switch_to,
    try_invoke_back: 0,
    get_thumbnail_window: view_get_thumbnail_window,
    get_monitor: 0,
    get_visibility: view_get_visibility,
    set_cloak: 0,
    get_position: 0,
    set_position: 0,
    insert_after_window: 0,
    get_extended_frame_position: 0,
    get_app_user_model_id: view_get_app_user_model_id,
    set_app_user_model_id: 0,
    is_equal_by_app_user_model_id: 0,
    get_view_state: 0,
    set_view_state: 0,
    get_neediness: 0,
    get_last_activation_timestamp: 0,
    set_last_activation_timestamp: 0,
    get_virtual_desktop_id: view_get_virtual_desktop_id,
    set_virtual_desktop_id: 0,
    get_show_in_switchers: view_get_show_in_switchers,
};

unsafe extern "system" fn view_set_focus(this: RawPtr) -> HResult {
    let world = enter!(this, Slot::SetFocus);
    world.state.borrow_mut().focused = view_hwnd(this);
    HResult::S_OK
}

unsafe extern "system" fn view_switch_to(this: RawPtr) -> HResult {
    let world = enter!(this, Slot::SwitchTo);
    world.state.borrow_mut().focused = view_hwnd(this);
    HResult::S_OK
}

unsafe extern "system" fn view_get_thumbnail_window(this: RawPtr, hwnd: *mut isize) -> HResult {
    enter!(this, Slot::GetThumbnailWindow);
    unsafe { *hwnd = view_hwnd(this).unwrap_or_default() };
    HResult::S_OK
}

unsafe extern "system" fn view_get_visibility(this: RawPtr, visibility: *mut u32) -> HResult {
    enter!(this, Slot::GetVisibility);
    unsafe { *visibility = 1 };
    HResult::S_OK
}

unsafe extern "system" fn view_get_app_user_model_id(this: RawPtr, id: *mut *mut u16) -> HResult {
    let world = enter!(this, Slot::GetAppUserModelId);
    let app_id = view_hwnd(this).and_then(|hwnd| {
        world
            .state
            .borrow()
            .views
            .iter()
            .find(|entry| entry.hwnd == hwnd)
            .and_then(|entry| entry.app_id.clone())
    });

    unsafe {
        *id = match app_id {
            Some(app_id) => world.allocate_task_memory(&app_id),
            None => std::ptr::null_mut(),
        };
    }

    HResult::S_OK
}

unsafe extern "system" fn view_get_virtual_desktop_id(this: RawPtr, id: *mut Guid) -> HResult {
    let world = enter!(this, Slot::GetVirtualDesktopId);
    match world.view_field(this, |entry| entry.desktop) {
        Some(desktop) => {
            unsafe { *id = desktop };
            HResult::S_OK
        }
        None => HResult::TYPE_E_ELEMENTNOTFOUND,
    }
}

unsafe extern "system" fn view_get_show_in_switchers(this: RawPtr, shown: *mut Bool) -> HResult {
    let world = enter!(this, Slot::GetShowInSwitchers);
    match world.view_field(this, |entry| entry.switchers) {
        Some(switchers) => {
            unsafe { *shown = Bool::from(switchers) };
            HResult::S_OK
        }
        None => HResult::TYPE_E_ELEMENTNOTFOUND,
    }
}

static PINNED: VirtualDesktopPinnedAppsVtbl = VirtualDesktopPinnedAppsVtbl {
    base: UNKNOWN,
    is_app_id_pinned: pinned_is_app_id_pinned,
    pin_app_id: pinned_pin_app_id,
    unpin_app_id: pinned_unpin_app_id,
    is_view_pinned: pinned_is_view_pinned,
    pin_view: pinned_pin_view,
    unpin_view: pinned_unpin_view,
};

unsafe extern "system" fn pinned_is_app_id_pinned(
    this: RawPtr,
    app_id: *const u16,
    pinned: *mut Bool,
) -> HResult {
    let world = enter!(this, Slot::IsAppIdPinned);
    let app_id = unsafe { read_wide(app_id) };
    let is_pinned = world.state.borrow().pinned_apps.contains(&app_id);
    unsafe { *pinned = Bool::from(is_pinned) };
    HResult::S_OK
}

unsafe extern "system" fn pinned_pin_app_id(this: RawPtr, app_id: *const u16) -> HResult {
    let world = enter!(this, Slot::PinAppId);
    let app_id = unsafe { read_wide(app_id) };
    world.state.borrow_mut().pinned_apps.insert(app_id);
    HResult::S_OK
}

unsafe extern "system" fn pinned_unpin_app_id(this: RawPtr, app_id: *const u16) -> HResult {
    let world = enter!(this, Slot::UnpinAppId);
    let app_id = unsafe { read_wide(app_id) };
    world.state.borrow_mut().pinned_apps.remove(&app_id);
    HResult::S_OK
}

unsafe extern "system" fn pinned_is_view_pinned(
    this: RawPtr,
    view: RawPtr,
    pinned: *mut Bool,
) -> HResult {
    let world = enter!(this, Slot::IsViewPinned);
    match world.view_field(view, |entry| entry.pinned) {
        Some(is_pinned) => {
            unsafe { *pinned = Bool::from(is_pinned) };
            HResult::S_OK
        }
        None => HResult::E_INVALIDARG,
    }
}

unsafe extern "system" fn pinned_pin_view(this: RawPtr, view: RawPtr) -> HResult {
    let world = enter!(this, Slot::PinView);
    world.set_view_pinned(view, true)
}

unsafe extern "system" fn pinned_unpin_view(this: RawPtr, view: RawPtr) -> HResult {
    let world = enter!(this, Slot::UnpinView);
    world.set_view_pinned(view, false)
}
