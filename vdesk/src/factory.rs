use crate::com::ComPtr;
use crate::com::Interface;
use crate::com::adopt;
use crate::com::interfaces::CLSID_IMMERSIVE_SHELL;
use crate::com::interfaces::IID_SERVICE_PROVIDER;
use crate::com::interfaces::IServiceProvider;
use crate::error::VirtualDesktopError;
use crate::guid::Guid;
use crate::host::Host;

/// Creates root objects and resolves services through a provider.
pub struct Factory<'h> {
    host: &'h dyn Host,
}

impl<'h> Factory<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self { host }
    }

    pub fn create<I: Interface>(
        &self,
        class: &Guid,
        iid: &Guid,
    ) -> Result<ComPtr<I>, VirtualDesktopError> {
        let mut out = std::ptr::null_mut();
        unsafe {
            let status = self.host.create_instance(class, iid, &mut out);
            adopt(status, out)
        }
        .map_err(|source| VirtualDesktopError::Creation {
            class: *class,
            interface: *iid,
            source,
        })
    }

    pub fn immersive_shell(&self) -> Result<ComPtr<IServiceProvider>, VirtualDesktopError> {
        self.create(&CLSID_IMMERSIVE_SHELL, &IID_SERVICE_PROVIDER)
    }

    /// Takes the provider by value: it is released as soon as the query returns,
    /// whatever the outcome.
    pub fn query_service<I: Interface>(
        &self,
        provider: ComPtr<IServiceProvider>,
        service: &Guid,
        iid: &Guid,
    ) -> Result<ComPtr<I>, VirtualDesktopError> {
        let result = provider.query_service(service, iid);
        drop(provider);

        result.map_err(|source| VirtualDesktopError::Creation {
            class: *service,
            interface: *iid,
            source,
        })
    }
}
