use crate::com::HResult;
use crate::error::VirtualDesktopError;
use crate::host::Host;
use std::cell::Cell;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

/// The component runtime on the calling thread.
///
/// Holding an `Rc` keeps this type on the thread that started it.
pub struct Session {
    host: Rc<dyn Host>,
    /// Whether this session entered the runtime itself and owes a matching exit.
    owned: bool,
    torn_down: Cell<bool>,
}

impl Session {
    #[tracing::instrument(skip_all)]
    pub fn start(host: Rc<dyn Host>) -> Result<Self, VirtualDesktopError> {
        let owned = match host.initialize() {
            HResult::S_OK => {
                tracing::info!("component runtime initialized");
                true
            }
            HResult::S_FALSE => {
                tracing::debug!("component runtime already initialized on this thread");
                true
            }
            HResult::RPC_E_CHANGED_MODE => {
                tracing::warn!(
                    "this thread already runs a multithreaded apartment, borrowing it instead"
                );
                false
            }
            status => {
                return Err(VirtualDesktopError::NativeCall {
                    operation: "CoInitializeEx",
                    source: status.into(),
                });
            }
        };

        Ok(Self {
            host,
            owned,
            torn_down: Cell::new(false),
        })
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Leaves the runtime at most once. Never fails and never panics outward.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) || !self.owned {
            return;
        }

        if std::panic::catch_unwind(AssertUnwindSafe(|| self.host.uninitialize())).is_err() {
            tracing::error!("leaving the component runtime panicked, ignoring");
        } else {
            tracing::debug!("component runtime uninitialized");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
