use crate::com::ComPtr;
use crate::com::error::NativeError;
use crate::com::interfaces::CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL;
use crate::com::interfaces::CLSID_VIRTUAL_DESKTOP_PINNED_APPS;
use crate::com::interfaces::IApplicationViewCollection;
use crate::com::interfaces::IID_APPLICATION_VIEW;
use crate::com::interfaces::IID_APPLICATION_VIEW_COLLECTION;
use crate::com::interfaces::IID_VIRTUAL_DESKTOP_PINNED_APPS;
use crate::com::interfaces::IVirtualDesktopPinnedApps;
use crate::com::manager_internal::DesktopManagerInternal;
use crate::com::manager_internal::IVirtualDesktopManagerInternal;
use crate::config::ManagerConfig;
use crate::cycle_direction::CycleDirection;
use crate::desktop::Desktop;
use crate::error::VirtualDesktopError;
use crate::factory::Factory;
use crate::guid::Guid;
use crate::host::Host;
use crate::host::default_host;
use crate::profile::Profile;
use crate::session::Session;
use crate::window::Window;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// The entry point for every desktop and window.
///
/// Desktops and windows borrow the manager, so none of them can outlive it. The three
/// services are dropped before the session, which is dropped before the host.
pub struct Manager {
    internal: DesktopManagerInternal,
    views: ComPtr<IApplicationViewCollection>,
    pinned: ComPtr<IVirtualDesktopPinnedApps>,
    profile: Profile,
    config: ManagerConfig,
    session: Session,
    host: Rc<dyn Host>,
}

impl Manager {
    pub fn new(host: Rc<dyn Host>, config: ManagerConfig) -> Result<Self, VirtualDesktopError> {
        Self::connect(host, config)
            .map_err(|error| VirtualDesktopError::Initialization(Box::new(error)))
    }

    pub fn from_default_host(config: ManagerConfig) -> Result<Self, VirtualDesktopError> {
        Self::new(default_host()?, config)
    }

    #[tracing::instrument(skip_all)]
    fn connect(host: Rc<dyn Host>, config: ManagerConfig) -> Result<Self, VirtualDesktopError> {
        let session = Session::start(host.clone())?;

        let build = config
            .build_override
            .unwrap_or_else(|| host.build_number());
        let profile = Profile::resolve(build)?;
        tracing::info!(
            "build {build} resolved to the {} profile ({} layout)",
            profile.minimum_build,
            profile.layout
        );

        let factory = Factory::new(&*host);

        // each service comes from its own shell provider
        let internal = factory.query_service::<IVirtualDesktopManagerInternal>(
            factory.immersive_shell()?,
            &CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL,
            &profile.manager_iid,
        )?;
        let views = factory.query_service(
            factory.immersive_shell()?,
            &IID_APPLICATION_VIEW_COLLECTION,
            &IID_APPLICATION_VIEW_COLLECTION,
        )?;
        let pinned = factory.query_service(
            factory.immersive_shell()?,
            &CLSID_VIRTUAL_DESKTOP_PINNED_APPS,
            &IID_VIRTUAL_DESKTOP_PINNED_APPS,
        )?;

        tracing::info!("virtual desktop manager ready");

        Ok(Self {
            internal: unsafe { DesktopManagerInternal::new(internal, profile.layout) },
            views,
            pinned,
            profile,
            config,
            session,
            host,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn build(&self) -> u32 {
        self.profile.build
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn owns_session(&self) -> bool {
        self.session.is_owned()
    }

    pub(crate) fn host(&self) -> &dyn Host {
        &*self.host
    }

    pub(crate) fn internal(&self) -> &DesktopManagerInternal {
        &self.internal
    }

    pub(crate) fn pinned(&self) -> &ComPtr<IVirtualDesktopPinnedApps> {
        &self.pinned
    }

    /// In the host's enumeration order.
    pub fn desktops(&self) -> Result<Vec<Desktop<'_>>, VirtualDesktopError> {
        let array = self
            .internal
            .desktops()
            .map_err(VirtualDesktopError::native_call("GetDesktops"))?;

        Ok(array
            .elements(&self.profile.desktop_iid)
            .map_err(VirtualDesktopError::native_call("IObjectArray::GetAt"))?
            .into_iter()
            .map(|ptr| Desktop::new(self, ptr))
            .collect())
    }

    pub fn current_desktop(&self) -> Result<Desktop<'_>, VirtualDesktopError> {
        let ptr = self
            .internal
            .current_desktop()
            .map_err(VirtualDesktopError::native_call("GetCurrentDesktop"))?;

        Ok(Desktop::new(self, ptr))
    }

    /// Appends a desktop without switching to it.
    #[tracing::instrument(skip_all)]
    pub fn create_desktop(&self) -> Result<Desktop<'_>, VirtualDesktopError> {
        let ptr = self
            .internal
            .create_desktop()
            .map_err(VirtualDesktopError::native_call("CreateDesktop"))?;

        let desktop = Desktop::new(self, ptr);
        match desktop.id() {
            Ok(id) => tracing::info!("created desktop {id}"),
            Err(error) => tracing::info!("created a desktop, its id is unreadable: {error}"),
        }

        Ok(desktop)
    }

    pub fn desktop_count(&self) -> Result<usize, VirtualDesktopError> {
        let count = self
            .internal
            .count()
            .map_err(VirtualDesktopError::native_call("GetCount"))?;

        Ok(count as usize)
    }

    /// Switcher-eligible windows, top of the z-order first. With a desktop, only the
    /// windows it owns plus every pinned window.
    pub fn windows(
        &self,
        desktop: Option<&Desktop<'_>>,
    ) -> Result<Vec<Window<'_>>, VirtualDesktopError> {
        let desktop_id = desktop.map(Desktop::id).transpose()?;

        let array = self
            .views
            .views_by_z_order()
            .map_err(VirtualDesktopError::native_call("GetViewsByZOrder"))?;

        let views = array
            .elements(&IID_APPLICATION_VIEW)
            .map_err(VirtualDesktopError::native_call("IObjectArray::GetAt"))?;

        Ok(views
            .into_iter()
            .map(|view| Window::new(self, view))
            .filter(Window::is_shown_in_switchers)
            .filter(|window| desktop_id.is_none_or(|id| window.belongs_to(&id)))
            .collect())
    }

    /// `None` when nothing has focus or the host cannot say.
    pub fn current_window(&self) -> Option<Window<'_>> {
        match self.views.view_in_focus() {
            Ok(view) => Some(Window::new(self, view)),
            Err(error) => {
                tracing::debug!("no focused view: {error}");
                None
            }
        }
    }

    pub fn window_for_handle(&self, hwnd: isize) -> Result<Window<'_>, VirtualDesktopError> {
        match self.views.view_for_hwnd(hwnd) {
            Ok(view) => Ok(Window::new(self, view)),
            Err(NativeError::ElementNotFound | NativeError::InvalidArg) => Err(
                VirtualDesktopError::NotFound(format!("a view for window {hwnd:#x}")),
            ),
            Err(source) => Err(VirtualDesktopError::NativeCall {
                operation: "GetViewForHwnd",
                source,
            }),
        }
    }

    /// 1-based, like [`Desktop::numero`].
    pub fn desktop_by_numero(&self, numero: usize) -> Result<Desktop<'_>, VirtualDesktopError> {
        let desktops = self.desktops()?;
        let count = desktops.len();

        numero
            .checked_sub(1)
            .and_then(|idx| desktops.into_iter().nth(idx))
            .ok_or_else(|| {
                VirtualDesktopError::InvalidArgument(format!(
                    "desktop {numero} is out of range 1..={count}"
                ))
            })
    }

    /// The neighbour of `desktop`, wrapping around at either end.
    pub fn adjacent_desktop(
        &self,
        desktop: &Desktop<'_>,
        direction: CycleDirection,
    ) -> Result<Desktop<'_>, VirtualDesktopError> {
        let id = desktop.id()?;
        let desktops = self.desktops()?;

        let idx = position_of(&desktops, &id)?
            .ok_or_else(|| VirtualDesktopError::NotFound(format!("desktop {id}")))?;

        let len = NonZeroUsize::new(desktops.len())
            .ok_or_else(|| VirtualDesktopError::NotFound(format!("desktop {id}")))?;

        let next = direction.next_idx(idx, len);
        desktops
            .into_iter()
            .nth(next)
            .ok_or_else(|| VirtualDesktopError::NotFound(format!("desktop {}", next + 1)))
    }

    pub fn find_desktop(&self, id: &Guid) -> Result<Desktop<'_>, VirtualDesktopError> {
        match self.internal.find_desktop(id) {
            Ok(ptr) => Ok(Desktop::new(self, ptr)),
            Err(NativeError::ElementNotFound) => {
                Err(VirtualDesktopError::NotFound(format!("desktop {id}")))
            }
            Err(source) => Err(VirtualDesktopError::NativeCall {
                operation: "FindDesktop",
                source,
            }),
        }
    }
}

pub(crate) fn position_of(
    desktops: &[Desktop<'_>],
    id: &Guid,
) -> Result<Option<usize>, VirtualDesktopError> {
    for (idx, desktop) in desktops.iter().enumerate() {
        if desktop.id()? == *id {
            return Ok(Some(idx));
        }
    }

    Ok(None)
}
