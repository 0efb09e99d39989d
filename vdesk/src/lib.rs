#![warn(clippy::all)]

pub mod com;
pub mod config;
pub mod cycle_direction;
pub mod desktop;
pub mod error;
pub mod factory;
pub mod guid;
pub mod host;
pub mod manager;
pub mod profile;
pub mod session;
pub mod window;


pub use config::ManagerConfig;
pub use config::SettlePolicy;
pub use cycle_direction::CycleDirection;
pub use desktop::Desktop;
pub use desktop::DesktopDetails;
pub use error::VirtualDesktopError;
pub use guid::Guid;
pub use host::Host;
pub use host::default_host;
pub use manager::Manager;
pub use profile::Profile;
pub use profile::SlotLayout;
pub use window::Window;
pub use window::WindowDetails;
