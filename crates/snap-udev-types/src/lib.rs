//! Shared snap model and error hierarchy for snap-udev.

pub mod error;
pub mod manifest;
pub mod snap;
pub mod validate;

pub use error::{ConfigError, InterfaceError, SnapError, SnapUdevError};
pub use snap::*;
