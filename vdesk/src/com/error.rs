use crate::com::HResult;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeError {
    #[error("HRESULT::E_NOINTERFACE")]
    NoInterface,
    #[error("HRESULT::E_POINTER")]
    Pointer,
    #[error("HRESULT::E_INVALIDARG")]
    InvalidArg,
    #[error("HRESULT::E_FAIL")]
    Fail,
    #[error("HRESULT::E_NOTIMPL")]
    NotImpl,
    #[error("HRESULT::E_OUTOFMEMORY")]
    OutOfMemory,
    #[error("HRESULT::E_ACCESSDENIED")]
    AccessDenied,
    #[error("HRESULT::CO_E_NOTINITIALIZED")]
    NotInitialized,
    #[error("HRESULT::REGDB_E_CLASSNOTREG")]
    ClassNotRegistered,
    #[error("HRESULT::RPC_E_CHANGED_MODE")]
    ChangedMode,
    #[error("HRESULT::TYPE_E_ELEMENTNOTFOUND")]
    ElementNotFound,
    #[error("HRESULT::Unknown {0:#010X}")]
    Unknown(i32),
}

impl NativeError {
    /// The raw status this error was built from.
    pub fn code(&self) -> HResult {
        match self {
            Self::NoInterface => HResult::E_NOINTERFACE,
            Self::Pointer => HResult::E_POINTER,
            Self::InvalidArg => HResult::E_INVALIDARG,
            Self::Fail => HResult::E_FAIL,
            Self::NotImpl => HResult::E_NOTIMPL,
            Self::OutOfMemory => HResult::E_OUTOFMEMORY,
            Self::AccessDenied => HResult::E_ACCESSDENIED,
            Self::NotInitialized => HResult::CO_E_NOTINITIALIZED,
            Self::ClassNotRegistered => HResult::REGDB_E_CLASSNOTREG,
            Self::ChangedMode => HResult::RPC_E_CHANGED_MODE,
            Self::ElementNotFound => HResult::TYPE_E_ELEMENTNOTFOUND,
            Self::Unknown(code) => HResult(*code),
        }
    }
}

impl From<HResult> for NativeError {
    fn from(value: HResult) -> Self {
        match value {
            HResult::E_NOINTERFACE => Self::NoInterface,
            HResult::E_POINTER => Self::Pointer,
            HResult::E_INVALIDARG => Self::InvalidArg,
            HResult::E_FAIL => Self::Fail,
            HResult::E_NOTIMPL => Self::NotImpl,
            HResult::E_OUTOFMEMORY => Self::OutOfMemory,
            HResult::E_ACCESSDENIED => Self::AccessDenied,
            HResult::CO_E_NOTINITIALIZED => Self::NotInitialized,
            HResult::REGDB_E_CLASSNOTREG => Self::ClassNotRegistered,
            HResult::RPC_E_CHANGED_MODE => Self::ChangedMode,
            HResult::TYPE_E_ELEMENTNOTFOUND => Self::ElementNotFound,
            HResult(code) => Self::Unknown(code),
        }
    }
}
