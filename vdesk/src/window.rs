use crate::com::ComPtr;
use crate::com::interfaces::IApplicationView;
use crate::desktop::Desktop;
use crate::error::VirtualDesktopError;
use crate::guid::Guid;
use crate::manager::Manager;
use serde::Serialize;
use std::cell::OnceCell;

/// A top-level application view.
///
/// The handle, title and application id are read once. The owning desktop is asked for
/// on every access since windows can be moved from outside this process at any time.
pub struct Window<'m> {
    manager: &'m Manager,
    view: ComPtr<IApplicationView>,
    hwnd: OnceCell<isize>,
    title: OnceCell<String>,
    app_id: OnceCell<Option<String>>,
}

impl<'m> Window<'m> {
    pub(crate) fn new(manager: &'m Manager, view: ComPtr<IApplicationView>) -> Self {
        Self {
            manager,
            view,
            hwnd: OnceCell::new(),
            title: OnceCell::new(),
            app_id: OnceCell::new(),
        }
    }

    /// The native window handle, 0 when the view does not expose one.
    pub fn hwnd(&self) -> isize {
        *self.hwnd.get_or_init(|| {
            self.view.thumbnail_window().unwrap_or_else(|error| {
                tracing::debug!("view has no window handle: {error}");
                0
            })
        })
    }

    /// Empty when there is no handle or the window has no text.
    pub fn title(&self) -> &str {
        self.title.get_or_init(|| match self.hwnd() {
            0 => String::new(),
            hwnd => self.manager.host().window_text(hwnd),
        })
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id
            .get_or_init(|| {
                self.view
                    .app_user_model_id(self.manager.host())
                    .unwrap_or_else(|error| {
                        tracing::debug!("view has no application id: {error}");
                        None
                    })
            })
            .as_deref()
    }

    pub fn is_shown_in_switchers(&self) -> bool {
        self.view.show_in_switchers().unwrap_or_else(|error| {
            tracing::debug!("could not read switcher visibility: {error}");
            false
        })
    }

    pub fn owning_desktop_id(&self) -> Result<Guid, VirtualDesktopError> {
        self.view
            .virtual_desktop_id()
            .map_err(VirtualDesktopError::native_call("GetVirtualDesktopId"))
    }

    pub fn owning_desktop(&self) -> Result<Desktop<'m>, VirtualDesktopError> {
        self.manager.find_desktop(&self.owning_desktop_id()?)
    }

    /// Owned by the desktop with `id`, or pinned to all of them. Failures count as no.
    pub(crate) fn belongs_to(&self, id: &Guid) -> bool {
        match self.owning_desktop_id() {
            Ok(owner) if owner == *id => true,
            Ok(_) => self.is_pinned().unwrap_or(false),
            Err(error) => {
                tracing::debug!("skipping window {}: {error}", self.hwnd());
                false
            }
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn move_to(&self, desktop: &Desktop<'_>) -> Result<(), VirtualDesktopError> {
        let target = desktop.id();

        self.manager
            .internal()
            .move_view_to_desktop(&self.view, desktop.ptr())
            .map_err(VirtualDesktopError::native_call("MoveViewToDesktop"))?;

        match target {
            Ok(id) => tracing::info!("moved window {} to desktop {id}", self.hwnd()),
            Err(error) => tracing::info!("moved window {}, target id is unreadable: {error}", self.hwnd()),
        }

        Ok(())
    }

    pub fn is_pinned(&self) -> Result<bool, VirtualDesktopError> {
        self.manager
            .pinned()
            .is_view_pinned(&self.view)
            .map_err(VirtualDesktopError::native_call("IsViewPinned"))
    }

    #[tracing::instrument(skip_all)]
    pub fn pin(&self) -> Result<(), VirtualDesktopError> {
        self.manager
            .pinned()
            .pin_view(&self.view)
            .map_err(VirtualDesktopError::native_call("PinView"))?;

        tracing::info!("pinned window {}", self.hwnd());

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn unpin(&self) -> Result<(), VirtualDesktopError> {
        self.manager
            .pinned()
            .unpin_view(&self.view)
            .map_err(VirtualDesktopError::native_call("UnpinView"))?;

        tracing::info!("unpinned window {}", self.hwnd());

        Ok(())
    }

    /// Returns whether the window is pinned afterwards.
    pub fn toggle_pin(&self) -> Result<bool, VirtualDesktopError> {
        if self.is_pinned()? {
            self.unpin()?;
            Ok(false)
        } else {
            self.pin()?;
            Ok(true)
        }
    }

    fn require_app_id(&self) -> Result<&str, VirtualDesktopError> {
        self.app_id().ok_or_else(|| {
            VirtualDesktopError::NotFound(format!("an application id for window {}", self.hwnd()))
        })
    }

    pub fn is_app_pinned(&self) -> Result<bool, VirtualDesktopError> {
        self.manager
            .pinned()
            .is_app_id_pinned(self.require_app_id()?)
            .map_err(VirtualDesktopError::native_call("IsAppIdPinned"))
    }

    /// Pins every window of this window's application.
    pub fn pin_app(&self) -> Result<(), VirtualDesktopError> {
        self.manager
            .pinned()
            .pin_app_id(self.require_app_id()?)
            .map_err(VirtualDesktopError::native_call("PinAppID"))
    }

    pub fn unpin_app(&self) -> Result<(), VirtualDesktopError> {
        self.manager
            .pinned()
            .unpin_app_id(self.require_app_id()?)
            .map_err(VirtualDesktopError::native_call("UnpinAppID"))
    }

    /// Brings the window to the foreground, switching to its desktop first if needed.
    #[tracing::instrument(skip_all)]
    pub fn focus(&self) -> Result<(), VirtualDesktopError> {
        let owner = self.owning_desktop()?;
        let current = self.manager.current_desktop()?;

        if owner.id()? != current.id()? {
            owner.switch_to()?;
            self.manager.config().settle.wait();
        }

        self.view
            .switch_to()
            .map_err(VirtualDesktopError::native_call("IApplicationView::SwitchTo"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowDetails {
    pub hwnd: isize,
    pub title: String,
    pub app_id: Option<String>,
    pub desktop_id: Guid,
    pub is_pinned: bool,
}

impl TryFrom<&Window<'_>> for WindowDetails {
    type Error = VirtualDesktopError;

    fn try_from(value: &Window<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            hwnd: value.hwnd(),
            title: value.title().to_string(),
            app_id: value.app_id().map(String::from),
            desktop_id: value.owning_desktop_id()?,
            is_pinned: value.is_pinned()?,
        })
    }
}
