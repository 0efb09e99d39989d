use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_SETTLE_MILLIS: u64 = 300;

/// What to do between switching desktops and focusing a window on the new desktop.
///
/// The switch animation finishes asynchronously and there is no completion signal to
/// wait on, so a focus request issued straight away can land on the old desktop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlePolicy {
    None,
    Fixed { millis: u64 },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::Fixed {
            millis: DEFAULT_SETTLE_MILLIS,
        }
    }
}

impl SettlePolicy {
    pub fn interval(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed { millis } => Duration::from_millis(*millis),
        }
    }

    pub fn wait(&self) {
        let interval = self.interval();
        if !interval.is_zero() {
            tracing::debug!("waiting {}ms for the desktop switch to settle", interval.as_millis());
            std::thread::sleep(interval);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub settle: SettlePolicy,
    /// Resolve the profile for this build instead of asking the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_override: Option<u32>,
}

impl ManagerConfig {
    /// A zero interval disables the wait.
    pub fn with_settle_millis(mut self, millis: u64) -> Self {
        self.settle = if millis == 0 {
            SettlePolicy::None
        } else {
            SettlePolicy::Fixed { millis }
        };

        self
    }
}
