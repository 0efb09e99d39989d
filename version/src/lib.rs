//! Build metadata for `vdeskc --version`.

shadow_rs::shadow!(build);

pub use build::LONG_VERSION;
