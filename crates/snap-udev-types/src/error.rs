//! Error hierarchy for snap-udev.

use thiserror::Error;

/// Top-level error type for rule generation.
#[derive(Debug, Error)]
pub enum SnapUdevError {
    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("Snap error: {0}")]
    Snap(#[from] SnapError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown {side} '{reference}' in connection")]
    UnknownEndpoint { side: &'static str, reference: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure returned by an interface callback.
///
/// The udev specification hands these back to its caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterfaceError {
    #[error("interface '{interface}': {message}")]
    Failed { interface: String, message: String },

    #[error("interface '{interface}' rejected attribute '{attr}': {message}")]
    InvalidAttribute {
        interface: String,
        attr: String,
        message: String,
    },
}

impl InterfaceError {
    /// Shorthand for a plain callback failure.
    pub fn failed(interface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            interface: interface.into(),
            message: message.into(),
        }
    }
}

/// Errors from loading or validating a snap manifest.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("Manifest parse error: {0}")]
    Parse(String),

    #[error("Manifest is missing '{key}'")]
    MissingKey { key: String },

    #[error("Invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },

    #[error("Invalid definition of {kind} '{name}': {message}")]
    InvalidDefinition {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("Snap '{snap}' declares '{name}' as both a plug and a slot")]
    DuplicateEndpoint { snap: String, name: String },
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Config file {path} could not be read: {message}")]
    Read { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
