use crate::com::ComPtr;
use crate::com::hstring::HString;
use crate::com::interfaces::IVirtualDesktop;
use crate::error::VirtualDesktopError;
use crate::guid::Guid;
use crate::manager::Manager;
use crate::manager::position_of;
use crate::window::Window;
use serde::Serialize;
use std::cell::OnceCell;
use std::fmt::Display;
use std::fmt::Formatter;

/// One virtual desktop, valid for as long as the manager that listed it.
///
/// Only the id is cached. The ordinal shifts whenever desktops are added, removed or
/// reordered, so it is recomputed on every access.
pub struct Desktop<'m> {
    manager: &'m Manager,
    ptr: ComPtr<IVirtualDesktop>,
    id: OnceCell<Guid>,
}

impl<'m> Desktop<'m> {
    pub(crate) fn new(manager: &'m Manager, ptr: ComPtr<IVirtualDesktop>) -> Self {
        Self {
            manager,
            ptr,
            id: OnceCell::new(),
        }
    }

    pub fn id(&self) -> Result<Guid, VirtualDesktopError> {
        if let Some(id) = self.id.get() {
            return Ok(*id);
        }

        let id = self
            .ptr
            .id()
            .map_err(VirtualDesktopError::native_call("IVirtualDesktop::GetID"))?;

        Ok(*self.id.get_or_init(|| id))
    }

    /// 1-based position in a fresh enumeration.
    pub fn numero(&self) -> Result<usize, VirtualDesktopError> {
        let id = self.id()?;
        let desktops = self.manager.desktops()?;

        position_of(&desktops, &id)?
            .map(|idx| idx + 1)
            .ok_or_else(|| VirtualDesktopError::NotFound(format!("desktop {id}")))
    }

    pub fn is_current(&self) -> Result<bool, VirtualDesktopError> {
        Ok(self.manager.current_desktop()?.id()? == self.id()?)
    }

    #[tracing::instrument(skip_all)]
    pub fn switch_to(&self) -> Result<(), VirtualDesktopError> {
        let id = self.id();

        if !self.manager.host().allow_set_foreground_window() {
            tracing::debug!("could not hand the foreground to other processes");
        }

        self.manager
            .internal()
            .switch_desktop(&self.ptr)
            .map_err(VirtualDesktopError::native_call("SwitchDesktop"))?;

        match id {
            Ok(id) => tracing::info!("switched to desktop {id}"),
            Err(error) => tracing::info!("switched desktops, target id is unreadable: {error}"),
        }

        Ok(())
    }

    /// Removes this desktop, moving its windows to `fallback`.
    #[tracing::instrument(skip_all)]
    pub fn remove(&self, fallback: &Desktop<'_>) -> Result<(), VirtualDesktopError> {
        if self.manager.desktop_count()? <= 1 {
            return Err(VirtualDesktopError::SoleDesktop);
        }

        let id = self.id()?;
        let fallback_id = fallback.id()?;
        if fallback_id == id {
            return Err(VirtualDesktopError::InvalidArgument(format!(
                "desktop {id} cannot be its own fallback"
            )));
        }

        self.manager
            .internal()
            .remove_desktop(&self.ptr, &fallback.ptr)
            .map_err(VirtualDesktopError::native_call("RemoveDesktop"))?;

        tracing::info!("removed desktop {id}, windows moved to {fallback_id}");

        Ok(())
    }

    /// Removes this desktop, moving its windows to the first other desktop in the list.
    pub fn remove_with_default_fallback(&self) -> Result<(), VirtualDesktopError> {
        let id = self.id()?;
        let desktops = self.manager.desktops()?;
        if desktops.len() <= 1 {
            return Err(VirtualDesktopError::SoleDesktop);
        }

        let mut fallback = None;
        for desktop in desktops {
            if desktop.id()? != id {
                fallback = Some(desktop);
                break;
            }
        }

        let fallback =
            fallback.ok_or_else(|| VirtualDesktopError::NotFound(format!("desktop {id}")))?;
        self.remove(&fallback)
    }

    /// Every switcher-eligible window on this desktop, pinned windows included.
    pub fn windows(&self) -> Result<Vec<Window<'m>>, VirtualDesktopError> {
        let id = self.id()?;

        Ok(self
            .manager
            .windows(None)?
            .into_iter()
            .filter(|window| window.belongs_to(&id))
            .collect())
    }

    pub fn name(&self) -> Result<String, VirtualDesktopError> {
        self.require(
            "desktop names",
            self.manager.profile().can_name_desktops(),
        )?;

        let name = unsafe { self.ptr.name(self.manager.host()) }
            .map_err(VirtualDesktopError::native_call("IVirtualDesktop::GetName"))?;

        Ok(name.text())
    }

    /// The name, or the host's default label for unnamed desktops.
    pub fn display_name(&self) -> Result<String, VirtualDesktopError> {
        if self.manager.profile().can_name_desktops() {
            let name = self.name()?;
            if !name.is_empty() {
                return Ok(name);
            }
        }

        Ok(format!("Desktop {}", self.numero()?))
    }

    #[tracing::instrument(skip(self))]
    pub fn rename(&self, name: &str) -> Result<(), VirtualDesktopError> {
        self.require(
            "renaming desktops",
            self.manager.profile().can_name_desktops(),
        )?;

        let host = self.manager.host();
        let name = HString::new(host, name)
            .map_err(VirtualDesktopError::native_call("WindowsCreateString"))?;

        self.manager
            .internal()
            .set_name(&self.ptr, &name)
            .map_err(VirtualDesktopError::native_call("SetName"))
    }

    pub fn wallpaper(&self) -> Result<String, VirtualDesktopError> {
        self.require(
            "desktop wallpapers",
            self.manager.profile().can_set_wallpaper(),
        )?;

        let path = unsafe { self.ptr.wallpaper(self.manager.host()) }
            .map_err(VirtualDesktopError::native_call("IVirtualDesktop::GetWallpaper"))?;

        Ok(path.text())
    }

    #[tracing::instrument(skip(self))]
    pub fn set_wallpaper(&self, path: &str) -> Result<(), VirtualDesktopError> {
        self.require(
            "desktop wallpapers",
            self.manager.profile().can_set_wallpaper(),
        )?;

        let host = self.manager.host();
        let path = HString::new(host, path)
            .map_err(VirtualDesktopError::native_call("WindowsCreateString"))?;

        self.manager
            .internal()
            .set_wallpaper(&self.ptr, &path)
            .map_err(VirtualDesktopError::native_call("SetWallpaper"))
    }

    fn require(&self, operation: &'static str, supported: bool) -> Result<(), VirtualDesktopError> {
        if supported {
            Ok(())
        } else {
            Err(VirtualDesktopError::UnsupportedOperation {
                operation,
                build: self.manager.build(),
            })
        }
    }

    pub(crate) fn ptr(&self) -> &ComPtr<IVirtualDesktop> {
        &self.ptr
    }
}

impl Display for Desktop<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id() {
            Ok(id) => write!(f, "Desktop({id})"),
            Err(_) => write!(f, "Desktop(?)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopDetails {
    pub id: Guid,
    pub numero: usize,
    pub name: String,
    pub is_current: bool,
}

impl TryFrom<&Desktop<'_>> for DesktopDetails {
    type Error = VirtualDesktopError;

    fn try_from(value: &Desktop<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id()?,
            numero: value.numero()?,
            name: value.display_name()?,
            is_current: value.is_current()?,
        })
    }
}
