use crate::com::error::NativeError;
use crate::guid::Guid;

#[derive(thiserror::Error, Debug)]
pub enum VirtualDesktopError {
    #[error("the virtual desktop manager could not be initialized")]
    Initialization(#[source] Box<VirtualDesktopError>),
    #[error("could not create {class} as {interface}")]
    Creation {
        class: Guid,
        interface: Guid,
        #[source]
        source: NativeError,
    },
    #[error("{operation} is not supported on build {build}")]
    UnsupportedOperation { operation: &'static str, build: u32 },
    #[error("build {build} is older than the oldest supported build ({baseline})")]
    UnsupportedBuild { build: u32, baseline: u32 },
    #[error("virtual desktops are not available on {0}")]
    UnsupportedPlatform(&'static str),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("the only remaining desktop cannot be removed")]
    SoleDesktop,
    #[error("{operation} failed")]
    NativeCall {
        operation: &'static str,
        #[source]
        source: NativeError,
    },
}

impl VirtualDesktopError {
    pub(crate) fn native_call(operation: &'static str) -> impl FnOnce(NativeError) -> Self {
        move |source| Self::NativeCall { operation, source }
    }

    /// The native status behind this error, if one was involved.
    pub fn native_status(&self) -> Option<crate::com::HResult> {
        match self {
            Self::Initialization(source) => source.native_status(),
            Self::Creation { source, .. } | Self::NativeCall { source, .. } => Some(source.code()),
            _ => None,
        }
    }
}
